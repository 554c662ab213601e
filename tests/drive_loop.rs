//! End-to-end control loop tests
//!
//! Drives the library the way the robot's periodic scheduler would: one
//! tick per period, command callbacks before the subsystem tick, and
//! preemption when a new command needs the drive.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use yantra_drive::commands::{
    Command, CommandDispatch, DefaultDriveCommand, DriveStyle, RotateToHeadingCommand,
};
use yantra_drive::config::DriveConfig;
use yantra_drive::devices::mock::{MockActuator, MockEncoder, MockGyro};
use yantra_drive::devices::Actuator;
use yantra_drive::oi::{OperatorInput, StickPosition};
use yantra_drive::subsystem::{DriveSubsystem, GyroDriveSubsystem};

type BoxedCommand = Box<dyn Command<GyroDriveSubsystem>>;

/// Dispatch handle backed by a shared queue
#[derive(Clone, Default)]
struct QueueDispatch {
    queue: Rc<RefCell<VecDeque<BoxedCommand>>>,
}

impl CommandDispatch<GyroDriveSubsystem> for QueueDispatch {
    fn schedule(&mut self, command: BoxedCommand) {
        self.queue.borrow_mut().push_back(command);
    }
}

/// Minimal single-subsystem scheduler.
///
/// Runs the active command if any, otherwise the default command. A
/// queued command preempts the active one: the active command's `on_end`
/// runs with `was_cancelled = true` before the new command starts.
struct TestScheduler {
    drive: GyroDriveSubsystem,
    default_command: DefaultDriveCommand<QueueDispatch>,
    queue: QueueDispatch,
    active: Option<BoxedCommand>,
    active_started: bool,
}

impl TestScheduler {
    fn new(drive: GyroDriveSubsystem, oi: Arc<dyn OperatorInput>, config: DriveConfig) -> Self {
        let queue = QueueDispatch::default();
        let default_command =
            DefaultDriveCommand::new(oi, DriveStyle::Tank, queue.clone(), config);
        Self {
            drive,
            default_command,
            queue,
            active: None,
            active_started: false,
        }
    }

    fn schedule(&mut self, command: BoxedCommand) {
        self.queue.queue.borrow_mut().push_back(command);
    }

    fn tick(&mut self) {
        // Newly scheduled command preempts the active one
        if let Some(next) = self.queue.queue.borrow_mut().pop_front() {
            if let Some(mut active) = self.active.take() {
                if self.active_started {
                    active.on_end(&mut self.drive, true);
                }
            }
            self.active = Some(next);
            self.active_started = false;
        }

        match &mut self.active {
            Some(command) => {
                if !self.active_started {
                    command.on_start(&mut self.drive);
                    self.active_started = true;
                }
                command.on_tick(&mut self.drive);
                self.drive.tick();
                if command.is_done(&mut self.drive) {
                    command.on_end(&mut self.drive, false);
                    self.active = None;
                }
            }
            None => {
                self.default_command.on_tick(&mut self.drive);
                self.drive.tick();
            }
        }
    }

    fn has_active(&self) -> bool {
        self.active.is_some()
    }
}

/// Scripted operator input shared with the scheduler
#[derive(Clone, Default)]
struct TestInput {
    state: Arc<Mutex<TestInputState>>,
}

#[derive(Default)]
struct TestInputState {
    cancel: bool,
    heading_request: Option<f64>,
    left_stick: StickPosition,
    right_stick: StickPosition,
}

impl OperatorInput for TestInput {
    fn cancel(&self) -> bool {
        self.state.lock().unwrap().cancel
    }
    fn reset(&self) -> bool {
        false
    }
    fn speed_pids_on(&self) -> bool {
        false
    }
    fn heading_request(&self) -> Option<f64> {
        self.state.lock().unwrap().heading_request
    }
    fn left_stick(&self) -> StickPosition {
        self.state.lock().unwrap().left_stick
    }
    fn right_stick(&self) -> StickPosition {
        self.state.lock().unwrap().right_stick
    }
}

struct Rig {
    left_motor: MockActuator,
    right_motor: MockActuator,
    left_encoder: MockEncoder,
    right_encoder: MockEncoder,
    gyro: MockGyro,
    oi: TestInput,
}

impl Rig {
    fn new() -> (Self, GyroDriveSubsystem) {
        let rig = Rig {
            left_motor: MockActuator::new(),
            right_motor: MockActuator::new(),
            left_encoder: MockEncoder::new(),
            right_encoder: MockEncoder::new(),
            gyro: MockGyro::new(),
            oi: TestInput::default(),
        };
        let base = DriveSubsystem::with_encoders(
            Box::new(rig.left_motor.clone()),
            Box::new(rig.right_motor.clone()),
            Some(Box::new(rig.left_encoder.clone())),
            Some(Box::new(rig.right_encoder.clone())),
            55.6,
            0.3,
            580.0,
        );
        let drive = GyroDriveSubsystem::new(
            base,
            Box::new(rig.gyro.clone()),
            9.0,
            0.0,
            0.6,
        );
        (rig, drive)
    }

    /// Integrate wheel outputs into the mock gyro, one 20ms tick at a
    /// turn rate of 180 deg/s for full differential output
    fn turn_step(&mut self, heading: &mut f64) {
        let differential =
            (self.left_motor.last_output() - self.right_motor.last_output()) / 2.0;
        *heading += differential * 180.0 * 0.02;
        self.gyro.set_angle(*heading);
    }
}

#[test]
fn speed_pid_first_tick_output() {
    let (rig, mut drive) = Rig::new();

    // Both encoders at rate 0; kP = 0.3 on both sides
    rig.left_encoder.set_rate(0.0);
    rig.right_encoder.set_rate(0.0);
    drive.drive_mut().enable_speed_pids();
    assert!(drive.drive().speed_pids_enabled());

    drive.drive_mut().set_speed(0.5, 0.5);
    // No actuation until the tick
    assert_eq!(rig.left_motor.last_output(), 0.0);

    drive.tick();
    // First tick, integrator starts at 0: output = 0.3 * 0.5
    assert!((rig.left_motor.last_output() - 0.15).abs() < 1e-9);
    assert!((rig.right_motor.last_output() - 0.15).abs() < 1e-9);
}

#[test]
fn rotate_command_converges_under_scheduler() {
    let (mut rig, drive) = Rig::new();
    let oi: Arc<dyn OperatorInput> = Arc::new(rig.oi.clone());
    let mut scheduler = TestScheduler::new(drive, oi, DriveConfig::default());

    scheduler.schedule(Box::new(RotateToHeadingCommand::new(
        90.0,
        5.0,
        Some(500),
        Arc::new(rig.oi.clone()),
    )));

    let mut heading = 0.0;
    let mut ticks = 0;
    while scheduler.has_active() || ticks == 0 {
        scheduler.tick();
        rig.turn_step(&mut heading);
        ticks += 1;
        assert!(ticks < 500, "rotate did not converge");
    }

    let error = (90.0 - heading).abs();
    assert!(error <= 6.0, "heading error {error} too large");
    // Braked on finish
    assert_eq!(rig.left_motor.last_output(), 0.0);
    assert_eq!(rig.right_motor.last_output(), 0.0);
}

#[test]
fn heading_request_preempts_and_control_returns() {
    let (mut rig, drive) = Rig::new();
    let oi: Arc<dyn OperatorInput> = Arc::new(rig.oi.clone());
    let mut scheduler = TestScheduler::new(drive, oi, DriveConfig::default());

    // Driver holds full forward on both sticks
    rig.oi.state.lock().unwrap().left_stick = StickPosition::new(0.0, -1.0);
    rig.oi.state.lock().unwrap().right_stick = StickPosition::new(0.0, -1.0);
    scheduler.tick();
    assert_eq!(rig.left_motor.last_output(), 1.0);

    // Heading request: the default command dispatches a rotate, which
    // takes the subsystem on the next tick
    rig.oi.state.lock().unwrap().heading_request = Some(90.0);
    scheduler.tick();
    rig.oi.state.lock().unwrap().heading_request = None;
    scheduler.tick();
    assert!(scheduler.has_active());

    let mut heading = 0.0;
    let mut ticks = 0;
    while scheduler.has_active() {
        scheduler.tick();
        rig.turn_step(&mut heading);
        ticks += 1;
        assert!(ticks < 500, "rotate did not converge");
    }

    // Default command resumes: sticks drive the wheels again
    scheduler.tick();
    assert_eq!(rig.left_motor.last_output(), 1.0);
    assert_eq!(rig.right_motor.last_output(), 1.0);
}

#[test]
fn cancel_ends_active_command() {
    let (rig, drive) = Rig::new();
    let oi: Arc<dyn OperatorInput> = Arc::new(rig.oi.clone());
    let mut scheduler = TestScheduler::new(drive, oi, DriveConfig::default());

    scheduler.schedule(Box::new(RotateToHeadingCommand::new(
        180.0,
        1.0,
        None,
        Arc::new(rig.oi.clone()),
    )));
    scheduler.tick();
    assert!(scheduler.has_active());

    rig.oi.state.lock().unwrap().cancel = true;
    scheduler.tick();
    assert!(!scheduler.has_active());
    // Rotate brakes on end
    assert_eq!(rig.left_motor.last_output(), 0.0);
}
