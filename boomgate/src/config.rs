use std::time::Duration;

use anyhow::{bail, Context};

use crate::hal::actuator::Angle;
use crate::hal::beam::BeamPolarity;

#[derive(Debug, Copy, Clone, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GateTimings {
    /// Physical travel time of the arm from closed to open
    pub open_duration_ms: u32,
    /// Physical travel time of the arm from open to closed
    pub close_duration_ms: u32,
    /// Longest the arm stays up, counted from the open command. Covers a dead beam sensor.
    pub pass_timeout_ms: u32,
}

impl GateTimings {
    pub fn open_duration(&self) -> Duration {
        Duration::from_millis(self.open_duration_ms as u64)
    }

    pub fn close_duration(&self) -> Duration {
        Duration::from_millis(self.close_duration_ms as u64)
    }

    pub fn pass_timeout(&self) -> Duration {
        Duration::from_millis(self.pass_timeout_ms as u64)
    }
}

impl Default for GateTimings {
    fn default() -> Self {
        Self {
            open_duration_ms: 3_000,
            close_duration_ms: 3_000,
            pass_timeout_ms: 15_000,
        }
    }
}

/// Servo angles of the two arm positions, depend on how the servo is mounted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ArmAngles {
    pub closed: Angle,
    pub open: Angle,
}

impl Default for ArmAngles {
    fn default() -> Self {
        Self {
            closed: Angle::from_degrees(0),
            open: Angle::from_degrees(90),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub timings: GateTimings,
    pub angles: ArmAngles,
    pub beam_polarity: BeamPolarity,
    pub tick_period_ms: u32,
    pub heartbeat_period_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timings: GateTimings::default(),
            angles: ArmAngles::default(),
            beam_polarity: BeamPolarity::default(),
            tick_period_ms: 10,
            heartbeat_period_ms: 500,
        }
    }
}

impl Config {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(s).context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration baked in at build time through `BOOMGATE_CONFIG`, if any.
    pub fn from_env_var() -> Option<anyhow::Result<Self>> {
        option_env!("BOOMGATE_CONFIG").map(Config::from_json)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let GateTimings {
            open_duration_ms,
            close_duration_ms,
            pass_timeout_ms,
        } = self.timings;

        if open_duration_ms == 0 || close_duration_ms == 0 {
            bail!("Arm travel durations must be non-zero");
        }

        if pass_timeout_ms <= open_duration_ms {
            bail!(
                "Pass timeout ({pass_timeout_ms}ms) must exceed open duration ({open_duration_ms}ms)"
            );
        }

        if self.angles.open == self.angles.closed {
            bail!("Open and closed angles must differ");
        }

        if self.tick_period_ms == 0 || self.heartbeat_period_ms == 0 {
            bail!("Loop periods must be non-zero");
        }

        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms as u64)
    }

    pub fn heartbeat_period(&self) -> Duration {
        Duration::from_millis(self.heartbeat_period_ms as u64)
    }
}
