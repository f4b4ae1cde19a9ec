use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single condition within an alert rule.
///
/// The variant decides which constraints apply: duration expressions need a
/// long enough sampling window, cyclic expressions need a valid accounting
/// cycle (used for transfer quotas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleExpression {
    /// Threshold held for a number of seconds
    Duration(DurationRule),
    /// Quota accumulated over a repeating cycle
    Cyclic(CyclicRule),
}

impl RuleExpression {
    /// Metric this expression watches.
    pub fn metric(&self) -> &str {
        match self {
            RuleExpression::Duration(rule) => &rule.metric,
            RuleExpression::Cyclic(rule) => &rule.metric,
        }
    }

    /// Returns true for cyclic (transfer quota) expressions.
    #[inline]
    pub fn is_cyclic(&self) -> bool {
        matches!(self, RuleExpression::Cyclic(_))
    }
}

/// Threshold expression evaluated over a sliding window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationRule {
    /// Metric name (cpu, memory, load1, ...)
    #[serde(default)]
    pub metric: String,

    /// Lower bound of the healthy band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Upper bound of the healthy band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Window length in seconds
    pub duration: u64,
}

/// Transfer quota expression accumulated over a repeating cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclicRule {
    #[serde(default)]
    pub metric: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// When the first cycle began
    #[serde(default)]
    pub cycle_start: Option<DateTime<Utc>>,

    /// Number of `cycle_unit`s per cycle
    pub cycle_interval: u64,

    #[serde(default)]
    pub cycle_unit: CycleUnit,
}

/// Unit of a cyclic expression's interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleUnit {
    #[default]
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl CycleUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleUnit::Hour => "hour",
            CycleUnit::Day => "day",
            CycleUnit::Week => "week",
            CycleUnit::Month => "month",
            CycleUnit::Year => "year",
        }
    }
}

impl fmt::Display for CycleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
