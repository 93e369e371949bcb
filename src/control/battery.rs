use strum_macros::Display;

/// Battery classification, ordered by severity: `Nominal < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum BatteryClassification {
    Nominal,
    Warning,
    Critical,
}

/// Classifies a battery percent against the two thresholds. Total; values
/// outside `[0, 100]` are clamped before comparison.
pub fn classify(
    level: i32,
    critical_battery_level: i32,
    warning_battery_level: i32,
) -> BatteryClassification {
    let level = level.clamp(0, 100);
    if level <= critical_battery_level {
        BatteryClassification::Critical
    } else if level <= warning_battery_level {
        BatteryClassification::Warning
    } else {
        BatteryClassification::Nominal
    }
}

/// Outcome of observing one battery sample. `entered_critical` is set on the
/// transition into `Critical` only, so the forced landing fires exactly once
/// per excursion even though classification itself runs on every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryReport {
    pub classification: BatteryClassification,
    pub entered_critical: bool,
}

/// Watches the battery telemetry stream and edge-triggers the critical
/// transition. Holds no history beyond the previous classification.
#[derive(Debug)]
pub struct BatteryWatch {
    critical_battery_level: i32,
    warning_battery_level: i32,
    last: Option<BatteryClassification>,
}

impl BatteryWatch {
    pub fn new(critical_battery_level: i32, warning_battery_level: i32) -> Self {
        Self { critical_battery_level, warning_battery_level, last: None }
    }

    pub fn observe(&mut self, level: i32) -> BatteryReport {
        let classification =
            classify(level, self.critical_battery_level, self.warning_battery_level);
        let entered_critical = classification == BatteryClassification::Critical
            && self.last != Some(BatteryClassification::Critical);
        self.last = Some(classification);
        BatteryReport { classification, entered_critical }
    }
}
