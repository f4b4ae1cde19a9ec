use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{AlertRule, CyclicRule, DurationRule, RuleExpression};

/// Shortest accepted sampling window, in seconds.
pub const MIN_DURATION_SECS: u64 = 3;

/// Shortest accepted cycle, in cycle units.
pub const MIN_CYCLE_INTERVAL: u64 = 1;

/// Reasons a rule definition is rejected.
///
/// `index` is the zero-based position of the offending expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("at least one rule must be defined")]
    EmptyRuleSet,

    #[error("rule {index}: Duration must be at least 3 (got {duration})")]
    DurationTooShort { index: usize, duration: u64 },

    #[error("rule {index}: cycle_interval must be at least 1 (got {cycle_interval})")]
    InvalidCycleInterval { index: usize, cycle_interval: u64 },

    #[error("rule {index}: cycle_start is not set")]
    MissingCycleStart { index: usize },

    #[error("rule {index}: cycle_start {cycle_start} is in the future")]
    FutureCycleStart {
        index: usize,
        cycle_start: DateTime<Utc>,
    },
}

/// Validate a candidate rule against the current time.
pub fn validate(rule: &AlertRule) -> Result<(), ValidationError> {
    validate_at(rule, Utc::now())
}

/// Validate a candidate rule against a fixed clock reading.
///
/// Expressions are checked in order and the first failure is returned.
pub fn validate_at(rule: &AlertRule, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if rule.rules.is_empty() {
        return Err(ValidationError::EmptyRuleSet);
    }

    for (index, expr) in rule.rules.iter().enumerate() {
        validate_expression(index, expr, now)?;
    }

    Ok(())
}

fn validate_expression(
    index: usize,
    expr: &RuleExpression,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    match expr {
        RuleExpression::Duration(rule) => validate_duration(index, rule),
        RuleExpression::Cyclic(rule) => validate_cycle(index, rule, now),
    }
}

fn validate_duration(index: usize, rule: &DurationRule) -> Result<(), ValidationError> {
    if rule.duration < MIN_DURATION_SECS {
        return Err(ValidationError::DurationTooShort {
            index,
            duration: rule.duration,
        });
    }
    Ok(())
}

fn validate_cycle(
    index: usize,
    rule: &CyclicRule,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if rule.cycle_interval < MIN_CYCLE_INTERVAL {
        return Err(ValidationError::InvalidCycleInterval {
            index,
            cycle_interval: rule.cycle_interval,
        });
    }

    let Some(cycle_start) = rule.cycle_start else {
        return Err(ValidationError::MissingCycleStart { index });
    };

    if cycle_start > now {
        return Err(ValidationError::FutureCycleStart { index, cycle_start });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CycleUnit, TriggerMode};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn rule_with(rules: Vec<RuleExpression>) -> AlertRule {
        AlertRule {
            id: 0,
            name: "test".to_string(),
            rules,
            trigger_mode: TriggerMode::Always,
            fail_trigger_tasks: Default::default(),
            recover_trigger_tasks: Default::default(),
            notification_group_id: 0,
            enabled: Some(true),
        }
    }

    fn duration(secs: u64) -> RuleExpression {
        RuleExpression::Duration(DurationRule {
            metric: "cpu".to_string(),
            min: None,
            max: Some(90.0),
            duration: secs,
        })
    }

    fn cyclic(interval: u64, start: Option<DateTime<Utc>>) -> RuleExpression {
        RuleExpression::Cyclic(CyclicRule {
            metric: "transfer_all_cycle".to_string(),
            min: None,
            max: Some(1e12),
            cycle_start: start,
            cycle_interval: interval,
            cycle_unit: CycleUnit::Month,
        })
    }

    #[test]
    fn test_empty_rule_set_rejected() {
        let result = validate_at(&rule_with(vec![]), now());
        assert_eq!(result, Err(ValidationError::EmptyRuleSet));
    }

    #[test]
    fn test_duration_threshold() {
        for secs in 0..MIN_DURATION_SECS {
            let result = validate_at(&rule_with(vec![duration(secs)]), now());
            assert_eq!(
                result,
                Err(ValidationError::DurationTooShort {
                    index: 0,
                    duration: secs
                })
            );
        }

        for secs in [3, 4, 5, 60, 86_400] {
            assert!(validate_at(&rule_with(vec![duration(secs)]), now()).is_ok());
        }
    }

    #[test]
    fn test_duration_message() {
        let err = validate_at(&rule_with(vec![duration(2)]), now()).unwrap_err();
        assert!(err.to_string().contains("Duration must be at least 3"));
    }

    #[test]
    fn test_cycle_interval_rejected() {
        let err = validate_at(&rule_with(vec![cyclic(0, Some(now()))]), now()).unwrap_err();

        assert_eq!(
            err,
            ValidationError::InvalidCycleInterval {
                index: 0,
                cycle_interval: 0
            }
        );
        assert!(err.to_string().contains("cycle_interval must be at least 1"));
    }

    #[test]
    fn test_interval_checked_before_start() {
        let err = validate_at(&rule_with(vec![cyclic(0, None)]), now()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCycleInterval { .. }));
    }

    #[test]
    fn test_missing_cycle_start_rejected() {
        let err = validate_at(&rule_with(vec![cyclic(1, None)]), now()).unwrap_err();
        assert_eq!(err, ValidationError::MissingCycleStart { index: 0 });
    }

    #[test]
    fn test_future_cycle_start_rejected() {
        let start = now() + Duration::seconds(1);
        let err = validate_at(&rule_with(vec![cyclic(1, Some(start))]), now()).unwrap_err();

        assert_eq!(
            err,
            ValidationError::FutureCycleStart {
                index: 0,
                cycle_start: start
            }
        );
    }

    #[test]
    fn test_cycle_start_at_now_accepted() {
        assert!(validate_at(&rule_with(vec![cyclic(1, Some(now()))]), now()).is_ok());

        let past = now() - Duration::days(30);
        assert!(validate_at(&rule_with(vec![cyclic(12, Some(past))]), now()).is_ok());
    }

    #[test]
    fn test_any_failing_expression_rejects_rule() {
        let rule = rule_with(vec![
            duration(10),
            cyclic(1, Some(now())),
            duration(1),
        ]);

        let err = validate_at(&rule, now()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DurationTooShort {
                index: 2,
                duration: 1
            }
        );
    }

    #[test]
    fn test_validation_is_deterministic() {
        let rule = rule_with(vec![cyclic(1, Some(now() + Duration::hours(1)))]);

        assert_eq!(validate_at(&rule, now()), validate_at(&rule, now()));
        assert!(validate_at(&rule, now() + Duration::hours(2)).is_ok());
    }
}
