pub mod expression;
pub mod form;
pub mod rule;

pub use expression::{CycleUnit, CyclicRule, DurationRule, RuleExpression};
pub use form::{AlertRuleForm, RuleForm};
pub use rule::{AlertRule, ParseTriggerModeError, RuleId, TaskIds, TriggerMode};
