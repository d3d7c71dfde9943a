/// Servo angle in degrees, always within `0..=180`.
#[derive(Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, serde::Serialize, serde::Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Angle(u8);

impl Angle {
    pub const MAX: Angle = Angle(180);

    pub const fn from_degrees(degrees: u8) -> Self {
        if degrees > Self::MAX.0 {
            Self::MAX
        } else {
            Self(degrees)
        }
    }

    pub fn to_degrees(&self) -> u8 {
        self.0
    }

    /// Pulse width for a standard hobby servo: 0.5ms at 0 degrees, 2.5ms at 180.
    pub fn pulse_width_us(&self) -> u32 {
        500 + (self.0 as u32 * 2000 / 180)
    }
}

impl From<u8> for Angle {
    fn from(degrees: u8) -> Self {
        Angle::from_degrees(degrees)
    }
}

impl From<Angle> for u8 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

/// Servo frame period, 50Hz.
pub const SERVO_PERIOD_US: u32 = 20_000;

pub trait Actuator {
    /// Start moving the arm. There is no position feedback.
    fn set_position(&self, angle: Angle);
}
