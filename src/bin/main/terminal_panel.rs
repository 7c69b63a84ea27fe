//! Panel driver that paints the framebuffer into an ANSI true-color terminal.
//!
//! Two physical rows share one text row through the upper-half-block glyph.
//! Pixels are shown before brightness/bit-depth encoding so dim tiles stay
//! visible on a monitor.

use std::{
    fmt::Write as _,
    io::{self, Write},
    time::{Duration, Instant},
};

use matrix_panel::FrameBuffer;
use wideboy_core::display::PanelDriver;

const CURSOR_HOME: &str = "\x1b[H";
const RESET: &str = "\x1b[0m";
const UPPER_HALF: char = '\u{2580}';

#[derive(Debug)]
pub struct TerminalPanel<W> {
    out: W,
    interval: Duration,
    last_flush: Option<Instant>,
    frames: u64,
}

impl<W: Write> TerminalPanel<W> {
    pub fn new(out: W, interval: Duration) -> Self {
        Self {
            out,
            interval,
            last_flush: None,
            frames: 0,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PanelDriver for TerminalPanel<W> {
    type Error = io::Error;

    fn refresh_due(&mut self) -> bool {
        self.last_flush
            .is_none_or(|last| last.elapsed() >= self.interval)
    }

    fn flush(&mut self, frame: &FrameBuffer) -> Result<(), Self::Error> {
        self.last_flush = Some(Instant::now());
        self.frames += 1;

        let config = frame.config();
        let (width, height) = (config.width as usize, config.height as usize);
        let mut text = String::with_capacity(width * (height / 2 + 1) * 40);
        text.push_str(CURSOR_HOME);

        for py in (0..height).step_by(2) {
            for px in 0..width {
                let [tr, tg, tb] = frame.physical_pixel(px, py).unwrap_or_default();
                let [br, bg, bb] = frame.physical_pixel(px, py + 1).unwrap_or_default();
                let _ = write!(
                    text,
                    "\x1b[38;2;{tr};{tg};{tb}m\x1b[48;2;{br};{bg};{bb}m{UPPER_HALF}"
                );
            }
            text.push_str(RESET);
            text.push('\n');
        }
        let _ = writeln!(
            text,
            "refresh #{} rotation {}{}",
            self.frames,
            frame.rotation().degrees(),
            RESET
        );

        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}
