use crate::control::TurnPolicy;
use crate::link::LedAnimation;
use serde::Deserialize;
use std::env;
use strum_macros::Display;

/// Environment variable naming the settings file to load.
pub const CONFIG_PATH_VAR: &str = "VISOR_DRONE_CONFIG";
/// Environment variable overriding the link daemon address.
pub const DRONE_ADDR_VAR: &str = "VISOR_DRONE_ADDR";

const DEFAULT_CONFIG_PATH: &str = "visor-drone.toml";

/// Which of the two translation schemes is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TurnPolicyKind {
    Hysteresis,
    Magnitude,
}

/// All startup configuration. Resolved once in `main`, immutable afterwards;
/// there is no runtime reconfiguration surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Address of the link daemon owning the drone wire protocol.
    pub drone_address: String,
    /// TCP port the orientation endpoint listens on for head-tracker clients.
    pub orientation_port: u16,
    /// Movement speed handed to every motion command, in `(0, 1]`.
    pub speed: f32,
    pub turn_policy: TurnPolicyKind,
    /// Half-width of the hysteresis policy's dead-zone.
    pub dead_zone_angle: f32,
    /// Stop-zone radius of the magnitude policy.
    pub dead_zone_magnitude: f32,
    pub critical_battery_level: i32,
    pub warning_battery_level: i32,
    /// Whether terminal keypresses are captured and mapped to commands.
    pub key_mapping: bool,
    /// Whether nominal/warning battery samples are logged. The critical
    /// forced landing is not gated on this.
    pub log_battery: bool,
    pub log_altitude: bool,
    pub debug: bool,
    pub blink_animation: LedAnimation,
    pub blink_rate_hz: u8,
    pub blink_duration_s: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            drone_address: String::from("192.168.1.1:5556"),
            orientation_port: 8080,
            speed: 0.15,
            turn_policy: TurnPolicyKind::Hysteresis,
            dead_zone_angle: 0.3,
            dead_zone_magnitude: 0.45,
            critical_battery_level: 15,
            warning_battery_level: 20,
            key_mapping: true,
            log_battery: true,
            log_altitude: false,
            debug: true,
            blink_animation: LedAnimation::BlinkGreenRed,
            blink_rate_hz: 5,
            blink_duration_s: 2,
        }
    }
}

#[derive(Debug, Display)]
pub enum ConfigError {
    #[strum(to_string = "cannot read settings file {path}: {detail}")]
    Read { path: String, detail: String },
    #[strum(to_string = "cannot parse settings file {path}: {detail}")]
    Parse { path: String, detail: String },
    #[strum(to_string = "invalid settings: {detail}")]
    Invalid { detail: String },
}

impl Settings {
    /// Loads the settings file named by `VISOR_DRONE_CONFIG` (default
    /// `visor-drone.toml`); a missing file yields the defaults. The link
    /// daemon address may be overridden via `VISOR_DRONE_ADDR`.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| String::from(DEFAULT_CONFIG_PATH));
        let mut settings = match std::fs::read_to_string(&path) {
            Ok(raw) => Self::parse(&raw)
                .map_err(|detail| ConfigError::Parse { path: path.clone(), detail })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => {
                return Err(ConfigError::Read { path, detail: e.to_string() });
            }
        };
        if let Ok(addr) = env::var(DRONE_ADDR_VAR) {
            settings.drone_address = addr;
        }
        settings.validate()?;
        Ok(settings)
    }

    fn parse(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |detail: String| Err(ConfigError::Invalid { detail });
        if !self.speed.is_finite() || self.speed <= 0.0 || self.speed > 1.0 {
            return invalid(format!("speed {} not in (0, 1]", self.speed));
        }
        if !self.dead_zone_angle.is_finite() || self.dead_zone_angle < 0.0 {
            return invalid(format!("dead_zone_angle {} is negative", self.dead_zone_angle));
        }
        if !self.dead_zone_magnitude.is_finite() || self.dead_zone_magnitude < 0.0 {
            return invalid(format!(
                "dead_zone_magnitude {} is negative",
                self.dead_zone_magnitude
            ));
        }
        if self.critical_battery_level > self.warning_battery_level {
            return invalid(format!(
                "critical_battery_level {} above warning_battery_level {}",
                self.critical_battery_level, self.warning_battery_level
            ));
        }
        Ok(())
    }

    /// The concrete translation policy for the control session.
    pub fn policy(&self) -> TurnPolicy {
        match self.turn_policy {
            TurnPolicyKind::Hysteresis => {
                TurnPolicy::Hysteresis { dead_zone_angle: self.dead_zone_angle }
            }
            TurnPolicyKind::Magnitude => {
                TurnPolicy::Magnitude { dead_zone_magnitude: self.dead_zone_magnitude }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Settings, TurnPolicyKind};
    use crate::control::TurnPolicy;

    #[test]
    fn defaults_match_the_documented_surface() {
        let settings = Settings::default();
        assert_eq!(settings.turn_policy, TurnPolicyKind::Hysteresis);
        assert_eq!(settings.policy(), TurnPolicy::Hysteresis { dead_zone_angle: 0.3 });
        assert_eq!(settings.critical_battery_level, 15);
        assert_eq!(settings.warning_battery_level, 20);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings = Settings::parse("turn_policy = \"magnitude\"\nspeed = 0.4\n").unwrap();
        assert_eq!(settings.speed, 0.4);
        assert_eq!(settings.policy(), TurnPolicy::Magnitude { dead_zone_magnitude: 0.45 });
        assert_eq!(settings.orientation_port, 8080);
    }

    #[test]
    fn unknown_keys_and_policies_are_rejected() {
        assert!(Settings::parse("max_tilt = 0.3\n").is_err());
        assert!(Settings::parse("turn_policy = \"threeway\"\n").is_err());
    }

    #[test]
    fn thresholds_and_speed_are_validated() {
        let mut settings = Settings::default();
        settings.critical_battery_level = 30;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.speed = 0.0;
        assert!(settings.validate().is_err());
        settings.speed = 1.5;
        assert!(settings.validate().is_err());
    }
}
