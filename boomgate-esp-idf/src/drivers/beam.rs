use boomgate::hal::beam::{BeamPolarity, BeamSensor, BeamState};
use esp_idf_hal::gpio::{AnyIOPin, Input, PinDriver, Pull};

pub struct EspBeam {
    input: PinDriver<'static, AnyIOPin, Input>,
    polarity: BeamPolarity,
}

impl EspBeam {
    pub fn new(pin: AnyIOPin, polarity: BeamPolarity) -> anyhow::Result<EspBeam> {
        let mut input = PinDriver::input(pin)?;
        // Most receiver modules have an open collector output
        input.set_pull(Pull::Up)?;
        Ok(Self { input, polarity })
    }
}

impl BeamSensor for EspBeam {
    fn state(&self) -> BeamState {
        self.polarity.state_from_level(self.input.is_high())
    }
}
