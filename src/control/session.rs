use super::battery::{BatteryClassification, BatteryWatch};
use super::motion_state::MotionState;
use super::translator::{self, OrientationSample};
use crate::config::Settings;
use crate::input::KeyAction;
use crate::link::{DroneClient, FlightCommand, LinkEvent};
use crate::{crit, event, info, warn};
use std::sync::Arc;
use strum_macros::Display;
use tokio::sync::mpsc::Receiver;

/// Whether the drone is believed to be airborne. Fed by keypresses and by
/// link telemetry; used for logging only, no command is gated on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
enum AirState {
    Grounded,
    Airborne,
}

#[derive(Debug, Display)]
pub enum SessionError {
    #[strum(to_string = "orientation source failed")]
    SourceFault,
}

/// The control session owns every piece of mutable session state: the
/// translator's motion state, the battery watch and the air state. All event
/// sources feed it over channels and are consumed on one task, which is what
/// holds the single-writer invariant without a lock.
pub struct ControlSession {
    client: DroneClient,
    settings: Arc<Settings>,
    orientation_rx: Receiver<OrientationSample>,
    telemetry_rx: Receiver<LinkEvent>,
    key_rx: Option<Receiver<KeyAction>>,
}

impl ControlSession {
    pub fn new(
        client: DroneClient,
        settings: Arc<Settings>,
        orientation_rx: Receiver<OrientationSample>,
        telemetry_rx: Receiver<LinkEvent>,
        key_rx: Option<Receiver<KeyAction>>,
    ) -> Self {
        Self { client, settings, orientation_rx, telemetry_rx, key_rx }
    }

    /// Runs until an orderly shutdown keypress or a source fault. The
    /// orientation channel closing is a fault (the bridge is useless without
    /// it); the telemetry and key channels closing only degrade the session.
    pub async fn run(self) -> Result<(), SessionError> {
        let Self { client, settings, mut orientation_rx, mut telemetry_rx, mut key_rx } = self;
        let policy = settings.policy();
        let mut motion_state = MotionState::Uninitialized;
        let mut battery_watch =
            BatteryWatch::new(settings.critical_battery_level, settings.warning_battery_level);
        let mut air_state = AirState::Grounded;
        let mut telemetry_open = true;
        let mut keys_open = key_rx.is_some();

        loop {
            tokio::select! {
                sample = orientation_rx.recv() => {
                    let Some(sample) = sample else {
                        return Err(SessionError::SourceFault);
                    };
                    motion_state = apply_sample(&client, &settings, sample, motion_state, policy);
                }
                telemetry = telemetry_rx.recv(), if telemetry_open => {
                    match telemetry {
                        Some(event) => apply_telemetry(
                            &client, &settings, event, &mut battery_watch, &mut air_state,
                        ),
                        None => {
                            warn!("link telemetry stream ended");
                            telemetry_open = false;
                        }
                    }
                }
                action = recv_key(&mut key_rx), if keys_open => {
                    match action {
                        Some(action) => {
                            if apply_key(&client, &settings, action, &mut air_state) {
                                info!("stopping, landing and shutting down");
                                return Ok(());
                            }
                        }
                        None => {
                            warn!("key input ended");
                            keys_open = false;
                        }
                    }
                }
            }
        }
    }
}

async fn recv_key(key_rx: &mut Option<Receiver<KeyAction>>) -> Option<KeyAction> {
    match key_rx.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn apply_sample(
    client: &DroneClient,
    settings: &Settings,
    sample: OrientationSample,
    motion_state: MotionState,
    policy: translator::TurnPolicy,
) -> MotionState {
    event!("orientation sample {}", sample.axis_value());
    let (command, new_state) = translator::translate(sample, motion_state, policy, settings.speed);
    if let Some(command) = command {
        if settings.debug {
            info!("motion state {motion_state} -> {new_state}, dispatching {command}");
        }
        client.dispatch(command);
    }
    new_state
}

fn apply_telemetry(
    client: &DroneClient,
    settings: &Settings,
    telemetry: LinkEvent,
    battery_watch: &mut BatteryWatch,
    air_state: &mut AirState,
) {
    match telemetry {
        LinkEvent::Battery { percent } => {
            let report = battery_watch.observe(percent);
            match report.classification {
                BatteryClassification::Critical => {
                    if report.entered_critical {
                        crit!("battery at {percent}%, forcing a landing");
                        client.dispatch(FlightCommand::Stop);
                        client.dispatch(FlightCommand::Land);
                        *air_state = AirState::Grounded;
                    } else {
                        crit!("battery at {percent}%, landing already forced");
                    }
                }
                BatteryClassification::Warning => {
                    if settings.log_battery {
                        warn!("battery at {percent}%, land before it runs out");
                    }
                }
                BatteryClassification::Nominal => {
                    if settings.log_battery {
                        info!("battery at {percent}%");
                    }
                }
            }
        }
        LinkEvent::Flying => {
            if *air_state != AirState::Airborne {
                info!("drone reported airborne");
            }
            *air_state = AirState::Airborne;
        }
        LinkEvent::Landed => {
            if *air_state != AirState::Grounded {
                info!("drone reported landed");
            }
            *air_state = AirState::Grounded;
        }
        LinkEvent::Altitude { metres } => {
            if settings.log_altitude {
                info!("altitude changed to {metres:.1}m");
            }
        }
    }
}

/// Applies one mapped keypress. Returns `true` on the orderly-shutdown key,
/// after the final stop/land pair has been enqueued.
fn apply_key(
    client: &DroneClient,
    settings: &Settings,
    action: KeyAction,
    air_state: &mut AirState,
) -> bool {
    let speed = settings.speed;
    if settings.debug {
        info!("keypress: {action}");
    }
    match action {
        KeyAction::TakeOff => {
            client.dispatch(FlightCommand::DisableEmergency);
            client.dispatch(FlightCommand::Stop);
            client.dispatch(FlightCommand::TakeOff);
            *air_state = AirState::Airborne;
        }
        KeyAction::Land => {
            client.dispatch(FlightCommand::Land);
            *air_state = AirState::Grounded;
        }
        KeyAction::Halt => client.dispatch(FlightCommand::Stop),
        KeyAction::Recover => client.dispatch(FlightCommand::DisableEmergency),
        KeyAction::Blink => client.dispatch(FlightCommand::AnimateLeds {
            animation: settings.blink_animation,
            rate_hz: settings.blink_rate_hz,
            duration_s: settings.blink_duration_s,
        }),
        KeyAction::StrafeLeft => client.dispatch(FlightCommand::Left { speed }),
        KeyAction::StrafeRight => client.dispatch(FlightCommand::Right { speed }),
        KeyAction::Forward => client.dispatch(FlightCommand::Forward { speed }),
        KeyAction::Backward => client.dispatch(FlightCommand::Backward { speed }),
        KeyAction::Down => client.dispatch(FlightCommand::Down { speed }),
        KeyAction::Up => client.dispatch(FlightCommand::Up { speed }),
        KeyAction::TurnLeft => client.dispatch(FlightCommand::CounterClockwise { speed }),
        KeyAction::TurnRight => client.dispatch(FlightCommand::Clockwise { speed }),
        KeyAction::Shutdown => {
            client.dispatch(FlightCommand::Stop);
            client.dispatch(FlightCommand::Land);
            *air_state = AirState::Grounded;
            return true;
        }
    }
    false
}
