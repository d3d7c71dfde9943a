use std::cell::RefCell;
use std::collections::VecDeque;

use boomgate::svc::{CommandPort, LineAssembler};
use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::gpio::{AnyIOPin, InputPin, OutputPin};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::uart::{self, Uart, UartDriver};
use esp_idf_hal::units::Hertz;

const BAUD_RATE: u32 = 115_200;

pub struct EspCommandPort {
    uart: UartDriver<'static>,
    assembler: RefCell<LineAssembler>,
    lines: RefCell<VecDeque<String>>,
}

impl EspCommandPort {
    pub fn new<UART: Uart>(
        uart: impl Peripheral<P = UART> + 'static,
        tx: impl Peripheral<P = impl OutputPin> + 'static,
        rx: impl Peripheral<P = impl InputPin> + 'static,
    ) -> anyhow::Result<EspCommandPort> {
        let config = uart::config::Config::default().baudrate(Hertz(BAUD_RATE));
        let uart = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &config,
        )?;

        Ok(Self {
            uart,
            assembler: RefCell::new(LineAssembler::default()),
            lines: RefCell::new(VecDeque::new()),
        })
    }

    fn receive(&self) {
        let mut buf = [0u8; 64];

        loop {
            match self.uart.read(&mut buf, NON_BLOCK) {
                Ok(0) => break,
                Ok(n) => {
                    let lines = self.assembler.borrow_mut().extend(&buf[..n]);
                    self.lines.borrow_mut().extend(lines);
                }
                Err(e) => {
                    log::error!("uart read: {e}");
                    break;
                }
            }
        }
    }
}

impl CommandPort for EspCommandPort {
    fn poll_line(&self) -> Option<String> {
        if self.lines.borrow().is_empty() {
            self.receive();
        }

        self.lines.borrow_mut().pop_front()
    }

    fn write_line(&self, line: &str) {
        if let Err(e) = self.uart.write(line.as_bytes()) {
            log::error!("uart write: {e}");
        }
    }
}
