use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::RuleExpression;

/// Ordered list of trigger task identifiers.
pub type TaskIds = SmallVec<[u64; 4]>;

/// Identifier assigned by the rule store.
pub type RuleId = u64;

/// An alert rule definition as stored and cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    /// Store-assigned identifier, stable across updates
    pub id: RuleId,

    /// Display label
    pub name: String,

    /// Conditions, all of which are checked by the evaluation engine
    pub rules: Vec<RuleExpression>,

    /// When notifications fire relative to state transitions
    #[serde(default)]
    pub trigger_mode: TriggerMode,

    /// Tasks to run when the rule starts failing
    #[serde(default)]
    pub fail_trigger_tasks: TaskIds,

    /// Tasks to run when the rule recovers
    #[serde(default)]
    pub recover_trigger_tasks: TaskIds,

    /// Notification group to alert (owned elsewhere)
    #[serde(default)]
    pub notification_group_id: u64,

    /// `None` when the client never said either way
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl AlertRule {
    /// Only an explicit `true` enables evaluation.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled == Some(true)
    }

    /// Returns true if any expression is a transfer quota cycle.
    pub fn has_cyclic_rules(&self) -> bool {
        self.rules.iter().any(RuleExpression::is_cyclic)
    }
}

/// Notification policy relative to trigger state transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Notify on every failing evaluation
    #[default]
    Always,
    /// Notify only when the trigger state changes
    OnChange,
}

impl TriggerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::Always => "always",
            TriggerMode::OnChange => "on_change",
        }
    }
}

/// Unrecognized trigger mode name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown trigger mode {0:?}")]
pub struct ParseTriggerModeError(String);

impl FromStr for TriggerMode {
    type Err = ParseTriggerModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(TriggerMode::Always),
            "on_change" => Ok(TriggerMode::OnChange),
            _ => Err(ParseTriggerModeError(s.to_string())),
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DurationRule;
    use smallvec::smallvec;

    fn sample_rule() -> AlertRule {
        AlertRule {
            id: 7,
            name: "High CPU".to_string(),
            rules: vec![RuleExpression::Duration(DurationRule {
                metric: "cpu".to_string(),
                min: None,
                max: Some(80.0),
                duration: 30,
            })],
            trigger_mode: TriggerMode::OnChange,
            fail_trigger_tasks: smallvec![1, 2],
            recover_trigger_tasks: smallvec![],
            notification_group_id: 3,
            enabled: None,
        }
    }

    #[test]
    fn test_enabled_is_tri_state() {
        let mut rule = sample_rule();
        assert!(!rule.is_enabled());

        rule.enabled = Some(false);
        assert!(!rule.is_enabled());

        rule.enabled = Some(true);
        assert!(rule.is_enabled());
    }

    #[test]
    fn test_trigger_mode_parsing() {
        assert_eq!("ON_CHANGE".parse::<TriggerMode>(), Ok(TriggerMode::OnChange));
        assert_eq!("always".parse::<TriggerMode>(), Ok(TriggerMode::Always));

        let err = "sometimes".parse::<TriggerMode>().unwrap_err();
        assert_eq!(err.to_string(), "unknown trigger mode \"sometimes\"");

        let json = serde_json::to_string(&TriggerMode::OnChange).unwrap();
        assert_eq!(json, "\"on_change\"");
    }

    #[test]
    fn test_rule_json_round_trip_keeps_unset_enabled() {
        let rule = sample_rule();
        let json = serde_json::to_string(&rule).unwrap();

        assert!(json.contains("\"enabled\":null"));

        let parsed: AlertRule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rule);
        assert!(!parsed.has_cyclic_rules());
    }
}
