use crate::app::edge::SensorEvent;
use crate::config::{ArmAngles, GateTimings};
use crate::hal::actuator::Actuator;
use crate::svc::{Instant, Notification};

#[derive(Default, Copy, Clone, Eq, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub enum GateState {
    /// Arm down, waiting for an open command
    #[default]
    Idle,
    Opening,
    /// Arm up, waiting for the vehicle to leave the beam
    Open,
    Closing,
    /// Arm down. Lasts one tick, then back to idle.
    Closed,
}

impl GateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Idle => "IDLE",
            GateState::Opening => "OPENING",
            GateState::Open => "OPEN",
            GateState::Closing => "CLOSING",
            GateState::Closed => "CLOSED",
        }
    }

    fn accepts_open(&self) -> bool {
        matches!(self, GateState::Idle | GateState::Closed)
    }
}

/// Open-loop arm controller. Travel is timed, the arm position is never read back.
#[derive(Debug, Clone)]
pub struct GateStateMachine {
    state: GateState,
    // Only meaningful while Opening and Open
    opening_started_at: Instant,
    // Only meaningful while Closing
    closing_started_at: Instant,
    vehicle_passed: bool,
    timings: GateTimings,
    angles: ArmAngles,
}

impl GateStateMachine {
    pub fn new(timings: GateTimings, angles: ArmAngles) -> Self {
        Self {
            state: GateState::Idle,
            opening_started_at: Instant::default(),
            closing_started_at: Instant::default(),
            vehicle_passed: false,
            timings,
            angles,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// A vehicle entered the beam during the current cycle.
    pub fn vehicle_passed(&self) -> bool {
        self.vehicle_passed
    }

    pub fn open(&mut self, now: Instant, actuator: &dyn Actuator) -> Notification {
        if !self.state.accepts_open() {
            log::warn!("open rejected, gate is {:?}", self.state);
            return Notification::Busy;
        }

        self.set_state(GateState::Opening);
        self.opening_started_at = now;
        actuator.set_position(self.angles.open);
        Notification::Opening
    }

    pub fn close(&mut self, now: Instant, actuator: &dyn Actuator) -> Notification {
        if self.state != GateState::Open {
            log::warn!("close rejected, gate is {:?}", self.state);
            return Notification::NotOpen;
        }

        self.start_closing(now, actuator);
        Notification::Closing
    }

    pub fn tick(
        &mut self,
        event: SensorEvent,
        now: Instant,
        actuator: &dyn Actuator,
    ) -> Option<Notification> {
        match self.state {
            GateState::Idle => None,

            GateState::Opening => {
                let elapsed = now.duration_since(self.opening_started_at);
                if elapsed >= self.timings.open_duration() {
                    self.set_state(GateState::Open);
                    Some(Notification::Open)
                } else {
                    None
                }
            }

            GateState::Open => match event {
                SensorEvent::VehicleExited => {
                    self.start_closing(now, actuator);
                    Some(Notification::Closing)
                }
                _ => {
                    if event == SensorEvent::VehicleEntered {
                        self.vehicle_passed = true;
                    }

                    let elapsed = now.duration_since(self.opening_started_at);
                    if elapsed >= self.timings.pass_timeout() {
                        log::warn!(
                            "no vehicle exit after {}ms, forcing close",
                            elapsed.as_millis()
                        );
                        self.start_closing(now, actuator);
                        Some(Notification::ClosingTimeout)
                    } else {
                        None
                    }
                }
            },

            GateState::Closing => {
                let elapsed = now.duration_since(self.closing_started_at);
                if elapsed >= self.timings.close_duration() {
                    self.set_state(GateState::Closed);
                    Some(Notification::Closed)
                } else {
                    None
                }
            }

            GateState::Closed => {
                self.vehicle_passed = false;
                self.set_state(GateState::Idle);
                None
            }
        }
    }

    fn start_closing(&mut self, now: Instant, actuator: &dyn Actuator) {
        self.set_state(GateState::Closing);
        self.closing_started_at = now;
        actuator.set_position(self.angles.closed);
    }

    fn set_state(&mut self, state: GateState) {
        log::info!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }
}
