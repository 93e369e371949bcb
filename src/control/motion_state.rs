use strum_macros::Display;

/// The last discrete rotation command issued over the link, held for the
/// lifetime of one control session. `Uninitialized` is the pre-first-sample
/// state and never recurs once a command has been issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MotionState {
    Left,
    Right,
    Stopped,
    Uninitialized,
}
