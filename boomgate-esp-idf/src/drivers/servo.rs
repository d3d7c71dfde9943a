use std::cell::RefCell;

use boomgate::hal::actuator::{Actuator, Angle, SERVO_PERIOD_US};
use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution, CHANNEL0, TIMER0};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::prelude::*;

/// Hobby servo on a LEDC channel, 50Hz frame.
pub struct EspServo {
    channel: RefCell<LedcDriver<'static>>,
}

impl EspServo {
    pub fn new(
        timer: TIMER0,
        channel: CHANNEL0,
        pin: impl Peripheral<P = impl OutputPin> + 'static,
    ) -> anyhow::Result<EspServo> {
        let timer_config = TimerConfig::default()
            .frequency(50.Hz().into())
            .resolution(Resolution::Bits14);
        let timer = LedcTimerDriver::new(timer, &timer_config)?;
        let channel = LedcDriver::new(channel, timer, pin)?;

        Ok(Self {
            channel: RefCell::new(channel),
        })
    }
}

fn duty_for(angle: Angle, max_duty: u32) -> u32 {
    (angle.pulse_width_us() as u64 * max_duty as u64 / SERVO_PERIOD_US as u64) as u32
}

impl Actuator for EspServo {
    fn set_position(&self, angle: Angle) {
        let Ok(mut channel) = self.channel.try_borrow_mut() else {
            log::error!("servo busy");
            return;
        };

        let duty = duty_for(angle, channel.get_max_duty());

        log::debug!("servo {}deg, duty {}", angle.to_degrees(), duty);

        if let Err(e) = channel.set_duty(duty) {
            log::error!("servo: {e}");
        }
    }
}
