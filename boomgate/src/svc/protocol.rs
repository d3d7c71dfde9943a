//! Text protocol spoken on the command port.
//!
//! Inbound: one command token per line. Outbound: one reply per line, each
//! terminated by `\r\n`.

use std::fmt;
use std::str::FromStr;

use crate::app::gate::GateState;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Command {
    OpenGate,
    CloseGate,
    GetStatus,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::OpenGate => "OPEN_GATE",
            Command::CloseGate => "CLOSE_GATE",
            Command::GetStatus => "GET_STATUS",
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub struct UnknownCommand;

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown command")
    }
}

impl std::error::Error for UnknownCommand {}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN_GATE" => Ok(Command::OpenGate),
            "CLOSE_GATE" => Ok(Command::CloseGate),
            "GET_STATUS" => Ok(Command::GetStatus),
            _ => Err(UnknownCommand),
        }
    }
}

/// Emitted by the gate state machine, on transitions and on rejected commands.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Notification {
    Opening,
    Open,
    Closing,
    ClosingTimeout,
    Closed,
    Busy,
    NotOpen,
}

impl Notification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Notification::Opening => "OPENING",
            Notification::Open => "OPEN",
            Notification::Closing => "CLOSING",
            Notification::ClosingTimeout => "CLOSING (TIMEOUT)",
            Notification::Closed => "CLOSED",
            Notification::Busy => "BUSY",
            Notification::NotOpen => "NOT_OPEN",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Reply {
    Ready,
    Gate(Notification),
    Ack(Command),
    Status(GateState),
    Unknown,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ready => f.write_str("GATE CONTROLLER READY"),
            Reply::Gate(n) => write!(f, "GATE:{}", n.as_str()),
            Reply::Ack(cmd) => write!(f, "CMD:{} OK", cmd.as_str()),
            Reply::Status(state) => write!(f, "STATUS:{}", state.as_str()),
            Reply::Unknown => f.write_str("CMD:UNKNOWN"),
        }
    }
}

impl Reply {
    pub fn to_line(&self) -> String {
        format!("{self}\r\n")
    }
}

impl From<Notification> for Reply {
    fn from(n: Notification) -> Self {
        Reply::Gate(n)
    }
}

const RX_BUFFER_SIZE: usize = 64;
const MAX_COMMAND_LEN: usize = 31;

/// Splits a serial byte stream into command lines.
///
/// A line ends at `\n` or when the receive buffer is full. Anything after the
/// first CR or LF is dropped, commands are cut at 31 characters and blank
/// lines are skipped.
#[derive(Default, Debug)]
pub struct LineAssembler {
    buf: Vec<u8>,
}

impl LineAssembler {
    pub fn push(&mut self, byte: u8) -> Option<String> {
        if byte != b'\n' {
            self.buf.push(byte);
            if self.buf.len() < RX_BUFFER_SIZE - 1 {
                return None;
            }
            log::warn!("receive buffer full, line cut");
        }

        self.take_line()
    }

    pub fn extend(&mut self, bytes: &[u8]) -> Vec<String> {
        bytes.iter().filter_map(|&b| self.push(b)).collect()
    }

    fn take_line(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.buf);
        let end = raw
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
            .unwrap_or(raw.len())
            .min(MAX_COMMAND_LEN);

        let line = String::from_utf8_lossy(&raw[..end]).trim().to_string();

        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }
}
