use super::motion_state::MotionState;
use crate::link::FlightCommand;

/// One orientation sample from the head tracker, reduced to the signed
/// yaw-like axis in roughly `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    axis_value: f32,
}

impl OrientationSample {
    pub fn new(axis_value: f32) -> Self {
        Self { axis_value }
    }

    /// Builds a sample from a raw tracker angle, floored to two decimals
    /// before translation so that sensor jitter below a hundredth cannot
    /// flap across a zone boundary.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_raw(axis: f64) -> Self {
        Self { axis_value: ((axis * 100.0).floor() / 100.0) as f32 }
    }

    pub fn axis_value(&self) -> f32 {
        self.axis_value
    }
}

/// The active translation policy. The two variants keep the opposite sign
/// conventions and dead-zone semantics of the two control schemes they come
/// from; the choice is configuration, not a code path to be "fixed".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnPolicy {
    /// Three-zone policy with edge-triggered commands: a command is issued
    /// only when the sample enters a zone the session is not already in.
    /// Positive axis values turn counter-clockwise.
    Hysteresis { dead_zone_angle: f32 },
    /// Two-zone policy, level-triggered: every sample produces a command.
    /// Positive axis values turn clockwise.
    Magnitude { dead_zone_magnitude: f32 },
}

/// Maps one orientation sample plus the previous discrete state to an
/// optional flight command and the successor state. Total over all finite
/// axis values; non-finite input is filtered at the ingest boundary.
pub fn translate(
    sample: OrientationSample,
    prior_state: MotionState,
    policy: TurnPolicy,
    speed: f32,
) -> (Option<FlightCommand>, MotionState) {
    match policy {
        TurnPolicy::Hysteresis { dead_zone_angle } => {
            hysteresis(sample.axis_value(), prior_state, dead_zone_angle, speed)
        }
        TurnPolicy::Magnitude { dead_zone_magnitude } => {
            magnitude(sample.axis_value(), dead_zone_magnitude, speed)
        }
    }
}

/// The dead-zone is the closed interval `[-dead_zone_angle, dead_zone_angle]`,
/// so a value exactly on the boundary stops rather than turns.
fn hysteresis(
    axis_value: f32,
    prior_state: MotionState,
    dead_zone_angle: f32,
    speed: f32,
) -> (Option<FlightCommand>, MotionState) {
    if axis_value > dead_zone_angle {
        if prior_state == MotionState::Left {
            (None, prior_state)
        } else {
            (Some(FlightCommand::CounterClockwise { speed }), MotionState::Left)
        }
    } else if axis_value < -dead_zone_angle {
        if prior_state == MotionState::Right {
            (None, prior_state)
        } else {
            (Some(FlightCommand::Clockwise { speed }), MotionState::Right)
        }
    } else if prior_state == MotionState::Stopped {
        (None, prior_state)
    } else {
        (Some(FlightCommand::Stop), MotionState::Stopped)
    }
}

fn magnitude(
    axis_value: f32,
    dead_zone_magnitude: f32,
    speed: f32,
) -> (Option<FlightCommand>, MotionState) {
    if axis_value.abs() < dead_zone_magnitude {
        (Some(FlightCommand::Stop), MotionState::Stopped)
    } else if axis_value > 0.0 {
        (Some(FlightCommand::Clockwise { speed }), MotionState::Right)
    } else {
        (Some(FlightCommand::CounterClockwise { speed }), MotionState::Left)
    }
}
