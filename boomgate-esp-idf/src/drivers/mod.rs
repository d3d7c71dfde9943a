pub mod beam;
pub mod led;
pub mod servo;
pub mod uart;
