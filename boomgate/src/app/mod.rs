use std::time::Duration;

use crate::app::edge::EdgeDetector;
use crate::app::gate::{GateState, GateStateMachine};
use crate::config::Config;
use crate::hal::led::StatusLed;
use crate::hal::Platform;
use crate::svc::{Command, Instant, Reply};

pub mod edge;
pub mod gate;

struct Services<'a> {
    led_controller: LedController<'a>,
    platform: &'a dyn Platform,
}

/// Runs the gate: call `update` once per tick period.
pub struct App<'a> {
    services: Services<'a>,
    edge_detector: EdgeDetector,
    gate: GateStateMachine,
}

impl<'a> App<'a> {
    pub fn new(platform: &'a dyn Platform, config: &Config) -> Self {
        let now = platform.clock().now();

        // The arm position is unknown at boot
        platform.actuator().set_position(config.angles.closed);

        let edge_detector = EdgeDetector::new(platform.beam().state());
        let gate = GateStateMachine::new(config.timings, config.angles);

        let led_controller = LedController {
            led: platform.status_led(),
            period: config.heartbeat_period(),
            last_toggle: now,
            is_on: false,
        };

        let services = Services {
            led_controller,
            platform,
        };

        let app = Self {
            services,
            edge_detector,
            gate,
        };

        log::info!("Gate controller ready");
        app.send(Reply::Ready);

        app
    }

    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    pub fn update(&mut self) {
        let platform = self.services.platform;
        let now = platform.clock().now();

        let event = self.edge_detector.sample_state(platform.beam().state());

        if let Some(notification) = self.gate.tick(event, now, platform.actuator()) {
            self.send(notification.into());
        }

        while let Some(line) = platform.command_port().poll_line() {
            self.handle_line(&line, now);
        }

        self.services.led_controller.update(now);
    }

    fn handle_line(&mut self, line: &str, now: Instant) {
        match line.parse::<Command>() {
            Ok(command) => self.handle_command(command, now),
            Err(_) => {
                log::warn!("Unknown command {:?}", line);
                self.send(Reply::Unknown);
            }
        }
    }

    fn handle_command(&mut self, command: Command, now: Instant) {
        let platform = self.services.platform;
        let actuator = platform.actuator();

        match command {
            Command::OpenGate => {
                let notification = self.gate.open(now, actuator);
                self.send(notification.into());
                self.send(Reply::Ack(command));
            }
            Command::CloseGate => {
                let notification = self.gate.close(now, actuator);
                self.send(notification.into());
                self.send(Reply::Ack(command));
            }
            Command::GetStatus => {
                self.send(Reply::Status(self.gate.state()));
            }
        }
    }

    fn send(&self, reply: Reply) {
        self.services
            .platform
            .command_port()
            .write_line(&reply.to_line());
    }
}

/// Blinks the status LED while the loop is running.
struct LedController<'a> {
    led: &'a dyn StatusLed,
    period: Duration,
    last_toggle: Instant,
    is_on: bool,
}

impl<'a> LedController<'a> {
    pub fn update(&mut self, now: Instant) {
        if now.duration_since(self.last_toggle) >= self.period {
            self.is_on = !self.is_on;
            self.last_toggle = now;
            self.led.set(self.is_on);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use insta::assert_debug_snapshot;

    use crate::hal::actuator::{Actuator, Angle};
    use crate::hal::beam::{BeamSensor, BeamState};
    use crate::svc::{Clock, CommandPort, ManualClock};

    use super::*;

    #[derive(Default)]
    struct MockActuator {
        positions: RefCell<Vec<u8>>,
    }

    impl Actuator for MockActuator {
        fn set_position(&self, angle: Angle) {
            self.positions.borrow_mut().push(angle.to_degrees());
        }
    }

    #[derive(Default)]
    struct MockBeam {
        state: Cell<BeamState>,
    }

    impl BeamSensor for MockBeam {
        fn state(&self) -> BeamState {
            self.state.get()
        }
    }

    #[derive(Default)]
    struct MockLed {
        is_on: Cell<bool>,
        toggles: Cell<usize>,
    }

    impl StatusLed for MockLed {
        fn set(&self, on: bool) {
            self.is_on.set(on);
            self.toggles.set(self.toggles.get() + 1);
        }
    }

    #[derive(Default)]
    struct MockPort {
        rx: RefCell<VecDeque<String>>,
        tx: RefCell<Vec<String>>,
    }

    impl CommandPort for MockPort {
        fn poll_line(&self) -> Option<String> {
            self.rx.borrow_mut().pop_front()
        }

        fn write_line(&self, line: &str) {
            self.tx.borrow_mut().push(line.to_string());
        }
    }

    #[derive(Default)]
    struct MockPlatform {
        actuator: MockActuator,
        beam: MockBeam,
        clock: ManualClock,
        port: MockPort,
        led: MockLed,
    }

    impl MockPlatform {
        fn command(&self, line: &str) {
            self.port.rx.borrow_mut().push_back(line.to_string());
        }

        fn set_beam(&self, state: BeamState) {
            self.beam.state.set(state);
        }

        fn sent(&self) -> Vec<String> {
            self.port.tx.borrow().clone()
        }

        fn positions(&self) -> Vec<u8> {
            self.actuator.positions.borrow().clone()
        }
    }

    impl Platform for MockPlatform {
        fn actuator(&self) -> &(dyn Actuator + '_) {
            &self.actuator
        }

        fn beam(&self) -> &(dyn BeamSensor + '_) {
            &self.beam
        }

        fn clock(&self) -> &(dyn Clock + '_) {
            &self.clock
        }

        fn command_port(&self) -> &(dyn CommandPort + '_) {
            &self.port
        }

        fn status_led(&self) -> &(dyn StatusLed + '_) {
            &self.led
        }
    }

    const TICK: Duration = Duration::from_millis(10);

    fn run_until(app: &mut App, platform: &MockPlatform, ms: u32) {
        while platform.clock.now().to_millis() < ms {
            platform.clock.advance(TICK);
            app.update();
        }
    }

    #[test]
    fn test_startup() {
        let platform = MockPlatform::default();
        platform.set_beam(BeamState::Broken);
        let mut app = App::new(&platform, &Config::default());

        assert_eq!(platform.positions(), vec![0]);
        assert_eq!(platform.sent(), vec!["GATE CONTROLLER READY\r\n"]);

        // A beam already broken at boot is not an entry
        app.update();
        assert_eq!(app.state(), GateState::Idle);
        assert_eq!(platform.sent().len(), 1);
    }

    #[test_log::test]
    fn test_vehicle_passes() {
        let platform = MockPlatform::default();
        let mut app = App::new(&platform, &Config::default());

        platform.command("OPEN_GATE");
        app.update();
        assert_eq!(app.state(), GateState::Opening);

        run_until(&mut app, &platform, 5_000);
        assert_eq!(app.state(), GateState::Open);

        platform.set_beam(BeamState::Broken);
        run_until(&mut app, &platform, 6_000);
        assert_eq!(app.state(), GateState::Open);

        platform.set_beam(BeamState::Clear);
        run_until(&mut app, &platform, 6_010);
        assert_eq!(app.state(), GateState::Closing);

        run_until(&mut app, &platform, 9_500);
        assert_eq!(app.state(), GateState::Idle);

        platform.command("GET_STATUS");
        app.update();

        assert_eq!(platform.positions(), vec![0, 90, 0]);
        assert_debug_snapshot!(platform.sent(), @r###"
        [
            "GATE CONTROLLER READY\r\n",
            "GATE:OPENING\r\n",
            "CMD:OPEN_GATE OK\r\n",
            "GATE:OPEN\r\n",
            "GATE:CLOSING\r\n",
            "GATE:CLOSED\r\n",
            "STATUS:IDLE\r\n",
        ]
        "###);
    }

    #[test_log::test]
    fn test_dead_sensor_times_out() {
        let platform = MockPlatform::default();
        let mut app = App::new(&platform, &Config::default());

        platform.command("OPEN_GATE");
        app.update();

        run_until(&mut app, &platform, 14_990);
        assert_eq!(app.state(), GateState::Open);

        run_until(&mut app, &platform, 15_000);
        assert_eq!(app.state(), GateState::Closing);

        run_until(&mut app, &platform, 20_000);
        assert_eq!(app.state(), GateState::Idle);

        assert_debug_snapshot!(platform.sent(), @r###"
        [
            "GATE CONTROLLER READY\r\n",
            "GATE:OPENING\r\n",
            "CMD:OPEN_GATE OK\r\n",
            "GATE:OPEN\r\n",
            "GATE:CLOSING (TIMEOUT)\r\n",
            "GATE:CLOSED\r\n",
        ]
        "###);
    }

    #[test]
    fn test_rejected_commands_are_acknowledged() {
        let platform = MockPlatform::default();
        let mut app = App::new(&platform, &Config::default());

        platform.command("CLOSE_GATE");
        platform.command("OPEN_GATE");
        app.update();

        run_until(&mut app, &platform, 1_000);
        platform.command("CLOSE_GATE");
        platform.command("OPEN_GATE");
        platform.command("GET_STATUS");
        app.update();

        assert_eq!(app.state(), GateState::Opening);
        assert_eq!(platform.positions(), vec![0, 90]);
        assert_debug_snapshot!(platform.sent(), @r###"
        [
            "GATE CONTROLLER READY\r\n",
            "GATE:NOT_OPEN\r\n",
            "CMD:CLOSE_GATE OK\r\n",
            "GATE:OPENING\r\n",
            "CMD:OPEN_GATE OK\r\n",
            "GATE:NOT_OPEN\r\n",
            "CMD:CLOSE_GATE OK\r\n",
            "GATE:BUSY\r\n",
            "CMD:OPEN_GATE OK\r\n",
            "STATUS:OPENING\r\n",
        ]
        "###);
    }

    #[test]
    fn test_explicit_close() {
        let platform = MockPlatform::default();
        let mut app = App::new(&platform, &Config::default());

        platform.command("OPEN_GATE");
        app.update();
        run_until(&mut app, &platform, 4_000);

        platform.command("CLOSE_GATE");
        app.update();
        assert_eq!(app.state(), GateState::Closing);
        assert_eq!(platform.positions(), vec![0, 90, 0]);

        let sent = platform.sent();
        assert_eq!(sent[sent.len() - 2], "GATE:CLOSING\r\n");
        assert_eq!(sent[sent.len() - 1], "CMD:CLOSE_GATE OK\r\n");
    }

    #[test]
    fn test_unknown_command() {
        let platform = MockPlatform::default();
        let mut app = App::new(&platform, &Config::default());

        platform.command("LIFT");
        platform.command("open_gate");
        app.update();

        assert_eq!(app.state(), GateState::Idle);
        assert_eq!(
            platform.sent(),
            vec![
                "GATE CONTROLLER READY\r\n",
                "CMD:UNKNOWN\r\n",
                "CMD:UNKNOWN\r\n"
            ]
        );
    }

    #[test]
    fn test_status_follows_cycle() {
        let platform = MockPlatform::default();
        let mut app = App::new(&platform, &Config::default());

        let status = |app: &mut App| {
            platform.command("GET_STATUS");
            app.update();
            platform.sent().last().cloned().unwrap()
        };

        assert_eq!(status(&mut app), "STATUS:IDLE\r\n");

        platform.command("OPEN_GATE");
        app.update();
        assert_eq!(status(&mut app), "STATUS:OPENING\r\n");

        run_until(&mut app, &platform, 3_500);
        assert_eq!(status(&mut app), "STATUS:OPEN\r\n");

        platform.command("CLOSE_GATE");
        app.update();
        assert_eq!(status(&mut app), "STATUS:CLOSING\r\n");
    }

    #[test]
    fn test_heartbeat() {
        let platform = MockPlatform::default();
        let mut app = App::new(&platform, &Config::default());

        run_until(&mut app, &platform, 490);
        assert_eq!(platform.led.toggles.get(), 0);

        run_until(&mut app, &platform, 500);
        assert_eq!(platform.led.toggles.get(), 1);
        assert!(platform.led.is_on.get());

        run_until(&mut app, &platform, 1_000);
        assert_eq!(platform.led.toggles.get(), 2);
        assert!(!platform.led.is_on.get());
    }
}
