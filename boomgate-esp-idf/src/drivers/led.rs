use std::cell::RefCell;

use boomgate::hal::led::StatusLed;
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

pub struct EspStatusLed {
    output: RefCell<PinDriver<'static, AnyOutputPin, Output>>,
}

impl EspStatusLed {
    pub fn new(pin: AnyOutputPin) -> anyhow::Result<EspStatusLed> {
        let output = PinDriver::output(pin)?;
        Ok(Self {
            output: RefCell::new(output),
        })
    }
}

impl StatusLed for EspStatusLed {
    fn set(&self, on: bool) {
        if let Ok(mut output) = self.output.try_borrow_mut() {
            let result = if on {
                output.set_high()
            } else {
                output.set_low()
            };

            if let Err(e) = result {
                log::error!("status led: {e}");
            }
        }
    }
}
