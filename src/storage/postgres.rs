use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::domain::{AlertRule, RuleExpression, RuleId, TriggerMode};

use super::traits::RuleStore;

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, rules, trigger_mode, fail_trigger_tasks,
           recover_trigger_tasks, notification_group_id, enabled
    FROM alert_rules
"#;

/// PostgreSQL implementation of the RuleStore trait.
pub struct PostgresRuleStore {
    pool: PgPool,
}

impl PostgresRuleStore {
    /// Create a new PostgresRuleStore instance with a connection pool.
    pub async fn connect(
        database_url: &str,
        min_connections: u32,
        max_connections: u32,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(min_connections)
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn task_ids(ids: &[u64]) -> Vec<i64> {
    ids.iter().map(|id| *id as i64).collect()
}

fn row_to_rule(row: &PgRow) -> anyhow::Result<AlertRule> {
    let id: i64 = row.get("id");
    let rules: serde_json::Value = row.get("rules");
    let trigger_mode: String = row.get("trigger_mode");
    let fail_trigger_tasks: Vec<i64> = row.get("fail_trigger_tasks");
    let recover_trigger_tasks: Vec<i64> = row.get("recover_trigger_tasks");
    let notification_group_id: i64 = row.get("notification_group_id");

    let rules: Vec<RuleExpression> = serde_json::from_value(rules)
        .with_context(|| format!("alert rule {} has unreadable expressions", id))?;

    let trigger_mode: TriggerMode = trigger_mode
        .parse()
        .with_context(|| format!("alert rule {} has unknown trigger mode {:?}", id, trigger_mode))?;

    Ok(AlertRule {
        id: id as RuleId,
        name: row.get("name"),
        rules,
        trigger_mode,
        fail_trigger_tasks: fail_trigger_tasks.into_iter().map(|t| t as u64).collect(),
        recover_trigger_tasks: recover_trigger_tasks.into_iter().map(|t| t as u64).collect(),
        notification_group_id: notification_group_id as u64,
        enabled: row.get("enabled"),
    })
}

#[async_trait]
impl RuleStore for PostgresRuleStore {
    async fn create(&self, rule: &AlertRule) -> anyhow::Result<RuleId> {
        let rules = serde_json::to_value(&rule.rules)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO alert_rules (
                name,
                rules,
                trigger_mode,
                fail_trigger_tasks,
                recover_trigger_tasks,
                notification_group_id,
                enabled
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&rule.name)
        .bind(rules)
        .bind(rule.trigger_mode.as_str())
        .bind(task_ids(&rule.fail_trigger_tasks))
        .bind(task_ids(&rule.recover_trigger_tasks))
        .bind(rule.notification_group_id as i64)
        .bind(rule.enabled)
        .fetch_one(&self.pool)
        .await?;

        Ok(id as RuleId)
    }

    async fn fetch(&self, id: RuleId) -> anyhow::Result<Option<AlertRule>> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_rule).transpose()
    }

    async fn update(&self, rule: &AlertRule) -> anyhow::Result<bool> {
        let rules = serde_json::to_value(&rule.rules)?;

        let result = sqlx::query(
            r#"
            UPDATE alert_rules
            SET name = $2,
                rules = $3,
                trigger_mode = $4,
                fail_trigger_tasks = $5,
                recover_trigger_tasks = $6,
                notification_group_id = $7,
                enabled = $8,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(rule.id as i64)
        .bind(&rule.name)
        .bind(rules)
        .bind(rule.trigger_mode.as_str())
        .bind(task_ids(&rule.fail_trigger_tasks))
        .bind(task_ids(&rule.recover_trigger_tasks))
        .bind(rule.notification_group_id as i64)
        .bind(rule.enabled)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[RuleId]) -> anyhow::Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            DELETE FROM alert_rules
            WHERE id = ANY($1)
            "#,
        )
        .bind(task_ids(ids))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list(&self) -> anyhow::Result<Vec<AlertRule>> {
        let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_rule).collect()
    }
}
