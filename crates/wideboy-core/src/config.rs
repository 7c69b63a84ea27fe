//! Board configuration read from the secrets file.
//!
//! Supported syntax is a flat subset of TOML:
//! - `key = value` pairs (quoted string, integer, float, boolean)
//! - `#` comments and blank lines
//! - `\"` and `\\` escapes inside quoted strings; any other escape is rejected
//!
//! Keys that are not recognised are skipped.

use core::{fmt, str::FromStr};

use heapless::String;
use log::debug;
use matrix_panel::{ColorOrder, MAX_BIT_DEPTH, PanelConfig};

pub const CONFIG_STRING_BYTES: usize = 32;
const DEFAULT_TIMEZONE: &str = "Europe/London";
const DEFAULT_MQTT_PREFIX: &str = "wideboyjr";

const _: () = assert!(DEFAULT_TIMEZONE.len() <= CONFIG_STRING_BYTES);
const _: () = assert!(DEFAULT_MQTT_PREFIX.len() <= CONFIG_STRING_BYTES);

#[derive(Clone, Debug, PartialEq)]
pub struct BoardConfig {
    pub debug: bool,
    pub brightness: f32,
    pub timezone: String<CONFIG_STRING_BYTES>,
    pub ntp_interval_secs: u32,
    pub matrix_width: u16,
    pub matrix_height: u16,
    pub matrix_bit_depth: u8,
    pub matrix_color_order: ColorOrder,
    pub mqtt_prefix: String<CONFIG_STRING_BYTES>,
    pub tile_cols: u16,
    pub tile_rows: u16,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            debug: false,
            brightness: 0.2,
            timezone: fixed(DEFAULT_TIMEZONE),
            ntp_interval_secs: 60 * 60 * 3,
            matrix_width: 64,
            matrix_height: 64,
            matrix_bit_depth: 4,
            matrix_color_order: ColorOrder::Rgb,
            mqtt_prefix: fixed(DEFAULT_MQTT_PREFIX),
            tile_cols: 2,
            tile_rows: 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// Line is not `key = value`.
    Syntax { line: usize },
    /// Value has the wrong type for its key.
    InvalidValue { line: usize, key: &'static str },
    /// Value parsed but is outside the accepted range.
    OutOfRange { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { line } => write!(f, "line {line}: expected `key = value`"),
            Self::InvalidValue { line, key } => write!(f, "line {line}: invalid value for {key}"),
            Self::OutOfRange { key } => write!(f, "{key} is out of range"),
        }
    }
}

impl BoardConfig {
    /// Parses secrets text over the defaults, then validates the result.
    pub fn from_secrets(input: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (index, raw) in input.lines().enumerate() {
            let line_no = index + 1;
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or(ConfigError::Syntax { line: line_no })?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                return Err(ConfigError::Syntax { line: line_no });
            }

            config.apply(line_no, key, value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(ConfigError::OutOfRange { key: "brightness" });
        }
        if self.matrix_width == 0 {
            return Err(ConfigError::OutOfRange {
                key: "matrix_width",
            });
        }
        if self.matrix_height == 0 {
            return Err(ConfigError::OutOfRange {
                key: "matrix_height",
            });
        }
        if self.matrix_bit_depth == 0 || self.matrix_bit_depth > MAX_BIT_DEPTH {
            return Err(ConfigError::OutOfRange {
                key: "matrix_bit_depth",
            });
        }
        if self.tile_cols == 0 {
            return Err(ConfigError::OutOfRange { key: "tile_cols" });
        }
        if self.tile_rows == 0 {
            return Err(ConfigError::OutOfRange { key: "tile_rows" });
        }
        Ok(())
    }

    pub fn panel_config(&self) -> PanelConfig {
        PanelConfig {
            width: self.matrix_width,
            height: self.matrix_height,
            bit_depth: self.matrix_bit_depth,
            color_order: self.matrix_color_order,
            brightness: self.brightness,
        }
    }

    fn apply(&mut self, line: usize, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "debug" => self.debug = parse_value(line, "debug", value)?,
            "brightness" => self.brightness = parse_value(line, "brightness", value)?,
            "timezone" => self.timezone = parse_string(line, "timezone", value)?,
            "ntp_interval" => {
                self.ntp_interval_secs = parse_value(line, "ntp_interval", value)?;
            }
            "matrix_width" => self.matrix_width = parse_value(line, "matrix_width", value)?,
            "matrix_height" => self.matrix_height = parse_value(line, "matrix_height", value)?,
            "matrix_bit_depth" => {
                self.matrix_bit_depth = parse_value(line, "matrix_bit_depth", value)?;
            }
            "matrix_color_order" => {
                let text = parse_string(line, "matrix_color_order", value)?;
                self.matrix_color_order =
                    text.parse().map_err(|_| ConfigError::InvalidValue {
                        line,
                        key: "matrix_color_order",
                    })?;
            }
            "mqtt_prefix" => self.mqtt_prefix = parse_string(line, "mqtt_prefix", value)?,
            "tile_cols" => self.tile_cols = parse_value(line, "tile_cols", value)?,
            "tile_rows" => self.tile_rows = parse_value(line, "tile_rows", value)?,
            other => debug!("config: ignoring key {}", other),
        }
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (index, ch) in line.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_value<T: FromStr>(line: usize, key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { line, key })
}

fn parse_string(
    line: usize,
    key: &'static str,
    value: &str,
) -> Result<String<CONFIG_STRING_BYTES>, ConfigError> {
    let inner = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or(ConfigError::InvalidValue { line, key })?;
    let invalid = ConfigError::InvalidValue { line, key };

    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        let ch = match ch {
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\')) => escaped,
                _ => return Err(invalid),
            },
            '"' => return Err(invalid),
            other => other,
        };
        out.push(ch).map_err(|_| invalid)?;
    }
    Ok(out)
}

/// Defaults only; their length is checked against the capacity at compile time.
fn fixed(text: &str) -> String<CONFIG_STRING_BYTES> {
    let mut out = String::new();
    let _ = out.push_str(text);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_defaults() {
        let config = BoardConfig::from_secrets("").unwrap();
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.ntp_interval_secs, 10_800);
        assert_eq!(config.mqtt_prefix.as_str(), "wideboyjr");
        assert_eq!(config.timezone.as_str(), "Europe/London");
    }

    #[test]
    fn overrides_are_applied() {
        let input = r#"
# matrix portal secrets
debug = true
brightness = 0.5
matrix_width = 128   # two panels chained
matrix_height = 32
matrix_bit_depth = 6
matrix_color_order = "GRB"
mqtt_prefix = "den#1"
ntp_interval = 600
tile_cols = 4
tile_rows = 1
ssid = "home"
"#;
        let config = BoardConfig::from_secrets(input).unwrap();

        assert!(config.debug);
        assert_eq!(config.brightness, 0.5);
        assert_eq!((config.matrix_width, config.matrix_height), (128, 32));
        assert_eq!(config.matrix_bit_depth, 6);
        assert_eq!(config.matrix_color_order, ColorOrder::Grb);
        assert_eq!(config.mqtt_prefix.as_str(), "den#1");
        assert_eq!(config.ntp_interval_secs, 600);
        assert_eq!((config.tile_cols, config.tile_rows), (4, 1));
    }

    #[test]
    fn malformed_line_reports_line_number() {
        assert_eq!(
            BoardConfig::from_secrets("debug = false\nbrightness\n"),
            Err(ConfigError::Syntax { line: 2 })
        );
    }

    #[test]
    fn wrong_type_is_invalid_value() {
        assert_eq!(
            BoardConfig::from_secrets("matrix_width = \"wide\""),
            Err(ConfigError::InvalidValue {
                line: 1,
                key: "matrix_width"
            })
        );
        assert_eq!(
            BoardConfig::from_secrets("matrix_color_order = \"RGBW\""),
            Err(ConfigError::InvalidValue {
                line: 1,
                key: "matrix_color_order"
            })
        );
        assert_eq!(
            BoardConfig::from_secrets("mqtt_prefix = wideboy"),
            Err(ConfigError::InvalidValue {
                line: 1,
                key: "mqtt_prefix"
            })
        );
    }

    #[test]
    fn escaped_quote_does_not_end_the_string() {
        let config =
            BoardConfig::from_secrets(r#"mqtt_prefix = "den \"a\" #2\\x" # trailing"#).unwrap();
        assert_eq!(config.mqtt_prefix.as_str(), r#"den "a" #2\x"#);

        assert_eq!(
            BoardConfig::from_secrets(r#"timezone = "Europe\nLondon""#),
            Err(ConfigError::InvalidValue {
                line: 1,
                key: "timezone"
            })
        );
        assert_eq!(
            BoardConfig::from_secrets(r#"timezone = "a"b""#),
            Err(ConfigError::InvalidValue {
                line: 1,
                key: "timezone"
            })
        );
    }

    #[test]
    fn defaults_fit_string_capacity() {
        let config = BoardConfig::default();
        assert_eq!(config.timezone.as_str(), DEFAULT_TIMEZONE);
        assert_eq!(config.mqtt_prefix.as_str(), DEFAULT_MQTT_PREFIX);
    }

    #[test]
    fn range_checks_run_after_parsing() {
        assert_eq!(
            BoardConfig::from_secrets("brightness = 1.2"),
            Err(ConfigError::OutOfRange { key: "brightness" })
        );
        assert_eq!(
            BoardConfig::from_secrets("matrix_bit_depth = 9"),
            Err(ConfigError::OutOfRange {
                key: "matrix_bit_depth"
            })
        );
        assert_eq!(
            BoardConfig::from_secrets("tile_rows = 0"),
            Err(ConfigError::OutOfRange { key: "tile_rows" })
        );
    }

    #[test]
    fn panel_config_projects_matrix_fields() {
        let config = BoardConfig::default();
        let panel = config.panel_config();

        assert_eq!(panel, PanelConfig::default());
    }
}
