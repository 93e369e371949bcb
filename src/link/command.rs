use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Discrete commands accepted by the flight command link.
///
/// Each command is framed as one JSON object tagged with `cmd`; the link
/// daemon owning the drone wire protocol consumes the frames as-is. Speeds
/// are fractions of the drone's configured maximum, in `(0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Display)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum FlightCommand {
    Stop,
    TakeOff,
    Land,
    DisableEmergency,
    Clockwise { speed: f32 },
    CounterClockwise { speed: f32 },
    Left { speed: f32 },
    Right { speed: f32 },
    Forward { speed: f32 },
    Backward { speed: f32 },
    Up { speed: f32 },
    Down { speed: f32 },
    AnimateLeds {
        animation: LedAnimation,
        rate_hz: u8,
        duration_s: u8,
    },
    Config { key: String, value: String },
}

/// LED animation patterns understood by the drone firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LedAnimation {
    BlinkGreenRed,
    BlinkGreen,
    BlinkRed,
    BlinkOrange,
    SnakeGreenRed,
    Fire,
    Standard,
    Red,
    Green,
    RedSnake,
    Blank,
    RightMissile,
    LeftMissile,
    DoubleMissile,
    FrontLeftGreenOthersRed,
    FrontRightGreenOthersRed,
    RearRightGreenOthersRed,
    RearLeftGreenOthersRed,
    LeftGreenRightRed,
    LeftRedRightGreen,
    BlinkStandard,
}
