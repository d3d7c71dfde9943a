pub use clock::{Clock, Instant, ManualClock, StdClock};
pub use protocol::{Command, LineAssembler, Notification, Reply};

pub mod clock;
pub mod protocol;

/// Line-oriented command channel, usually a serial port.
pub trait CommandPort {
    /// Next complete command line, without its terminator. Never blocks.
    fn poll_line(&self) -> Option<String>;

    /// Write one already-terminated line.
    fn write_line(&self, line: &str);
}
