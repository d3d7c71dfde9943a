use crate::hal::actuator::Actuator;
use crate::hal::beam::BeamSensor;
use crate::hal::led::StatusLed;
use crate::svc::{Clock, CommandPort};

pub mod actuator;
pub mod beam;
pub mod led;

pub trait Platform {
    fn actuator(&self) -> &(dyn Actuator + '_);
    fn beam(&self) -> &(dyn BeamSensor + '_);
    fn clock(&self) -> &(dyn Clock + '_);
    fn command_port(&self) -> &(dyn CommandPort + '_);
    fn status_led(&self) -> &(dyn StatusLed + '_);
}
