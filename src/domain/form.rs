use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::expression::{CycleUnit, CyclicRule, DurationRule, RuleExpression};
use super::rule::{AlertRule, RuleId, TaskIds, TriggerMode};

/// Rule definition as submitted by clients on create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertRuleForm {
    /// Accepted on the wire but never trusted; the store or the path decides
    #[serde(default)]
    pub id: Option<RuleId>,

    pub name: String,

    #[serde(default)]
    pub rules: Vec<RuleForm>,

    #[serde(default)]
    pub fail_trigger_tasks: TaskIds,

    #[serde(default)]
    pub recover_trigger_tasks: TaskIds,

    #[serde(default)]
    pub notification_group_id: u64,

    /// Left as `None` when the client omits the field
    #[serde(default)]
    pub enable: Option<bool>,

    #[serde(default)]
    pub trigger_mode: TriggerMode,
}

/// Flat wire shape of a rule expression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleForm {
    /// Selects the cyclic (transfer quota) variant
    #[serde(default)]
    pub is_cyclic: bool,

    #[serde(default)]
    pub metric: String,

    #[serde(default)]
    pub min: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,

    #[serde(default)]
    pub duration: Option<u64>,

    #[serde(default)]
    pub cycle_interval: Option<u64>,

    #[serde(default)]
    pub cycle_start: Option<DateTime<Utc>>,

    #[serde(default)]
    pub cycle_unit: Option<CycleUnit>,
}

impl AlertRuleForm {
    /// Build a candidate rule carrying `id`.
    ///
    /// Every field comes from the form; nothing survives from any earlier
    /// version of the rule except the identifier passed in.
    pub fn into_rule(self, id: RuleId) -> AlertRule {
        AlertRule {
            id,
            name: self.name,
            rules: self.rules.into_iter().map(RuleExpression::from).collect(),
            trigger_mode: self.trigger_mode,
            fail_trigger_tasks: self.fail_trigger_tasks,
            recover_trigger_tasks: self.recover_trigger_tasks,
            notification_group_id: self.notification_group_id,
            enabled: self.enable,
        }
    }
}

impl From<RuleForm> for RuleExpression {
    // Missing numbers map to zero so the validator reports them.
    fn from(form: RuleForm) -> Self {
        if form.is_cyclic {
            RuleExpression::Cyclic(CyclicRule {
                metric: form.metric,
                min: form.min,
                max: form.max,
                cycle_start: form.cycle_start,
                cycle_interval: form.cycle_interval.unwrap_or(0),
                cycle_unit: form.cycle_unit.unwrap_or_default(),
            })
        } else {
            RuleExpression::Duration(DurationRule {
                metric: form.metric,
                min: form.min,
                max: form.max,
                duration: form.duration.unwrap_or(0),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_deserialization() {
        let json = r#"{
            "id": 99,
            "name": "Transfer quota",
            "rules": [
                {"is_cyclic": true, "metric": "transfer_out_cycle", "max": 1e12,
                 "cycle_interval": 1, "cycle_unit": "month",
                 "cycle_start": "2024-01-01T00:00:00Z"},
                {"metric": "cpu", "max": 90, "duration": 60}
            ],
            "fail_trigger_tasks": [4],
            "notification_group_id": 2,
            "trigger_mode": "on_change"
        }"#;

        let form: AlertRuleForm = serde_json::from_str(json).unwrap();

        assert_eq!(form.id, Some(99));
        assert_eq!(form.rules.len(), 2);
        assert!(form.rules[0].is_cyclic);
        assert!(form.enable.is_none());
        assert_eq!(form.trigger_mode, TriggerMode::OnChange);
    }

    #[test]
    fn test_into_rule_uses_given_id() {
        let form = AlertRuleForm {
            id: Some(99),
            name: "cpu".to_string(),
            rules: vec![RuleForm {
                metric: "cpu".to_string(),
                duration: Some(5),
                ..Default::default()
            }],
            enable: Some(false),
            ..Default::default()
        };

        let rule = form.into_rule(3);

        assert_eq!(rule.id, 3);
        assert_eq!(rule.enabled, Some(false));
        assert_eq!(
            rule.rules[0],
            RuleExpression::Duration(DurationRule {
                metric: "cpu".to_string(),
                min: None,
                max: None,
                duration: 5,
            })
        );
    }

    #[test]
    fn test_rule_form_maps_missing_numbers_to_zero() {
        let cyclic = RuleExpression::from(RuleForm {
            is_cyclic: true,
            ..Default::default()
        });

        match cyclic {
            RuleExpression::Cyclic(rule) => {
                assert_eq!(rule.cycle_interval, 0);
                assert_eq!(rule.cycle_unit, CycleUnit::Hour);
            }
            other => panic!("unexpected expression: {:?}", other),
        }

        let duration = RuleExpression::from(RuleForm::default());
        assert!(matches!(
            duration,
            RuleExpression::Duration(DurationRule { duration: 0, .. })
        ));
    }
}
