//! Boot-time orientation resolution.
//!
//! How a raw acceleration vector maps to a cardinal angle belongs to the
//! sensor collaborator; this module only fixes the sampling contract: the
//! first (unsettled) reading is thrown away and exactly one more sample
//! is classified.

use matrix_panel::Rotation;

/// One 3-axis sample in m/s^2.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Acceleration {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Raw accelerometer access.
pub trait Accelerometer {
    type Error;

    fn acceleration(&mut self) -> Result<Acceleration, Self::Error>;
}

/// Anything that yields the panel's cardinal orientation.
pub trait OrientationSource {
    type Error;

    fn read_orientation(&mut self) -> Result<Rotation, Self::Error>;
}

/// Orientation known ahead of time, e.g. from configuration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FixedOrientation(pub Rotation);

impl OrientationSource for FixedOrientation {
    type Error = core::convert::Infallible;

    fn read_orientation(&mut self) -> Result<Rotation, Self::Error> {
        Ok(self.0)
    }
}

/// Accelerometer-backed source that drains the warm-up reading first.
///
/// `classify` is the sensor-specific mapping from one sample to an angle.
#[derive(Debug)]
pub struct SettledOrientation<A, F> {
    accelerometer: A,
    classify: F,
    warmed_up: bool,
}

impl<A, F> SettledOrientation<A, F>
where
    A: Accelerometer,
    F: FnMut(Acceleration) -> Rotation,
{
    pub fn new(accelerometer: A, classify: F) -> Self {
        Self {
            accelerometer,
            classify,
            warmed_up: false,
        }
    }

    pub fn release(self) -> A {
        self.accelerometer
    }
}

impl<A, F> OrientationSource for SettledOrientation<A, F>
where
    A: Accelerometer,
    F: FnMut(Acceleration) -> Rotation,
{
    type Error = A::Error;

    fn read_orientation(&mut self) -> Result<Rotation, Self::Error> {
        if !self.warmed_up {
            let _ = self.accelerometer.acceleration()?;
            self.warmed_up = true;
        }
        let sample = self.accelerometer.acceleration()?;
        Ok((self.classify)(sample))
    }
}
