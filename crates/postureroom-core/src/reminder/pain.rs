//! Self-reported discomfort log.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Body location of a pain report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PainLocation {
    Neck,
    UpperBack,
    LowerBack,
    Shoulders,
    Wrists,
    Other,
}

impl PainLocation {
    pub const ALL: [PainLocation; 6] = [
        PainLocation::Neck,
        PainLocation::UpperBack,
        PainLocation::LowerBack,
        PainLocation::Shoulders,
        PainLocation::Wrists,
        PainLocation::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PainLocation::Neck => "NECK",
            PainLocation::UpperBack => "UPPER_BACK",
            PainLocation::LowerBack => "LOWER_BACK",
            PainLocation::Shoulders => "SHOULDERS",
            PainLocation::Wrists => "WRISTS",
            PainLocation::Other => "OTHER",
        }
    }
}

impl fmt::Display for PainLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PainLocation {
    type Err = ValidationError;

    /// Case-insensitive; accepts `-` or `_` as separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        PainLocation::ALL
            .into_iter()
            .find(|loc| loc.as_str() == normalized)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "location".into(),
                message: format!("unknown pain location '{s}'"),
            })
    }
}

/// One pain report. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainLog {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Intended 0-10, not enforced.
    pub level: u8,
    pub location: PainLocation,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PainLog {
    pub fn new(
        timestamp: DateTime<Utc>,
        level: u8,
        location: PainLocation,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            level,
            location,
            notes,
        }
    }
}

/// Earliest timestamp included in a `days`-long window ending at `now`.
///
/// Windows reaching past the earliest representable instant start there.
pub fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::milliseconds(i64::from(days) * 86_400_000))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Aggregate over a window of pain logs, for charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainSummary {
    pub count: usize,
    pub average_level: Option<f64>,
    pub max_level: Option<u8>,
    pub by_location: BTreeMap<PainLocation, usize>,
}

impl PainSummary {
    pub fn from_logs<'a>(logs: impl IntoIterator<Item = &'a PainLog>) -> Self {
        let mut summary = PainSummary::default();
        let mut total: u64 = 0;
        for log in logs {
            summary.count += 1;
            total += u64::from(log.level);
            summary.max_level = Some(summary.max_level.map_or(log.level, |m| m.max(log.level)));
            *summary.by_location.entry(log.location).or_insert(0) += 1;
        }
        if summary.count > 0 {
            summary.average_level = Some(total as f64 / summary.count as f64);
        }
        summary
    }
}
