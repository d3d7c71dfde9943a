use esp_idf_hal::gpio::{IOPin, OutputPin};
use esp_idf_hal::peripherals::Peripherals;

use crate::drivers::beam::EspBeam;
use crate::drivers::led::EspStatusLed;
use crate::drivers::servo::EspServo;
use crate::drivers::uart::EspCommandPort;
use boomgate::config::Config;
use boomgate::hal::actuator::Actuator;
use boomgate::hal::beam::BeamSensor;
use boomgate::hal::led::StatusLed;
use boomgate::hal::Platform;
use boomgate::svc::{Clock, CommandPort, StdClock};

pub enum BoardType {
    M5StampC3,
    RustDevKit,
}

pub struct PlatformImpl {
    servo: EspServo,
    beam: EspBeam,
    clock: StdClock,
    command_port: EspCommandPort,
    status_led: EspStatusLed,
}

impl PlatformImpl {
    pub fn new(board_type: BoardType, config: &Config) -> anyhow::Result<Self> {
        let peripherals = Peripherals::take().ok_or(anyhow::anyhow!("Peripherals already taken"))?;
        let pins = peripherals.pins;

        // UART1 carries commands, UART0 stays the log console
        let (beam_pin, servo_pin, led_pin, tx_pin, rx_pin) = match board_type {
            BoardType::M5StampC3 => (
                pins.gpio3.downgrade(),
                pins.gpio4.downgrade_output(),
                pins.gpio10.downgrade_output(),
                pins.gpio0.downgrade_output(),
                pins.gpio1.downgrade(),
            ),
            BoardType::RustDevKit => (
                pins.gpio9.downgrade(),
                pins.gpio6.downgrade_output(),
                pins.gpio7.downgrade_output(),
                pins.gpio0.downgrade_output(),
                pins.gpio1.downgrade(),
            ),
        };

        let servo = EspServo::new(
            peripherals.ledc.timer0,
            peripherals.ledc.channel0,
            servo_pin,
        )?;
        let beam = EspBeam::new(beam_pin, config.beam_polarity)?;
        let command_port = EspCommandPort::new(peripherals.uart1, tx_pin, rx_pin)?;
        let status_led = EspStatusLed::new(led_pin)?;

        Ok(Self {
            servo,
            beam,
            clock: StdClock::default(),
            command_port,
            status_led,
        })
    }
}

impl Platform for PlatformImpl {
    fn actuator(&self) -> &(dyn Actuator + '_) {
        &self.servo
    }

    fn beam(&self) -> &(dyn BeamSensor + '_) {
        &self.beam
    }

    fn clock(&self) -> &(dyn Clock + '_) {
        &self.clock
    }

    fn command_port(&self) -> &(dyn CommandPort + '_) {
        &self.command_port
    }

    fn status_led(&self) -> &(dyn StatusLed + '_) {
        &self.status_led
    }
}
