use crate::hal::beam::BeamState;

#[derive(Default, Copy, Clone, Eq, PartialEq, Debug)]
pub enum SensorEvent {
    #[default]
    None,
    VehicleEntered,
    VehicleExited,
}

/// Turns periodic beam samples into one-shot vehicle events.
///
/// Only the previous sample is remembered: two edges between samples are
/// not observable.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct EdgeDetector {
    last_clear: bool,
}

impl EdgeDetector {
    /// Seed with the first real sample, so boot does not produce an edge.
    pub fn new(initial: BeamState) -> Self {
        Self {
            last_clear: initial == BeamState::Clear,
        }
    }

    /// `clear` is true while the beam is unbroken.
    pub fn sample(&mut self, clear: bool) -> SensorEvent {
        let event = match (self.last_clear, clear) {
            (true, false) => SensorEvent::VehicleEntered,
            (false, true) => SensorEvent::VehicleExited,
            _ => SensorEvent::None,
        };

        self.last_clear = clear;

        if event != SensorEvent::None {
            log::debug!("{:?}", event);
        }

        event
    }

    pub fn sample_state(&mut self, state: BeamState) -> SensorEvent {
        self.sample(state == BeamState::Clear)
    }
}
