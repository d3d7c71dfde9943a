pub trait BeamSensor {
    fn is_broken(&self) -> bool {
        self.state() == BeamState::Broken
    }

    fn is_clear(&self) -> bool {
        self.state() == BeamState::Clear
    }

    fn state(&self) -> BeamState;
}

/// Infrared beam across the lane. A vehicle in the lane breaks the beam.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum BeamState {
    #[default]
    Clear,
    Broken,
}

/// Electrical level the receiver drives when the beam is broken.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeamPolarity {
    #[default]
    ActiveLow,
    ActiveHigh,
}

impl BeamPolarity {
    pub fn state_from_level(&self, is_high: bool) -> BeamState {
        let broken = match self {
            BeamPolarity::ActiveLow => !is_high,
            BeamPolarity::ActiveHigh => is_high,
        };

        if broken {
            BeamState::Broken
        } else {
            BeamState::Clear
        }
    }
}
