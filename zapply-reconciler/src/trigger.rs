//! Trigger reconciliation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use zapply_zabbix::types::{enabled_to_status, status_to_enabled};
use zapply_zabbix::{ApiClient, Result};

use crate::Reconcile;

/// Default severity class, "average".
pub const DEFAULT_PRIORITY: &str = "3";

/// Desired trigger. `priority` is a severity class `"0"` through `"5"`;
/// empty selects [`DEFAULT_PRIORITY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerSpec {
    pub description: String,
    pub expression: String,
    pub priority: String,
    pub enabled: bool,
}

impl Default for TriggerSpec {
    fn default() -> Self {
        Self {
            description: String::new(),
            expression: String::new(),
            priority: String::new(),
            enabled: true,
        }
    }
}

impl TriggerSpec {
    fn effective_priority(&self) -> &str {
        if self.priority.is_empty() {
            DEFAULT_PRIORITY
        } else {
            &self.priority
        }
    }
}

/// Trigger as tracked by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerState {
    pub id: String,
    pub description: String,
    pub expression: String,
    pub priority: String,
    pub enabled: bool,
}

pub struct TriggerReconciler {
    client: Arc<ApiClient>,
}

impl TriggerReconciler {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Reconcile for TriggerReconciler {
    type Spec = TriggerSpec;
    type State = TriggerState;

    async fn create(&self, spec: &TriggerSpec) -> Result<String> {
        let id = self
            .client
            .trigger_create(
                &spec.description,
                &spec.expression,
                spec.effective_priority(),
                enabled_to_status(spec.enabled),
            )
            .await?;
        info!(trigger_id = %id, "created trigger");
        Ok(id)
    }

    async fn read(&self, id: &str) -> Result<Option<TriggerState>> {
        Ok(self
            .client
            .trigger_get(id)
            .await?
            .map(|trigger| TriggerState {
                id: trigger.trigger_id,
                description: trigger.description,
                expression: trigger.expression,
                priority: trigger.priority,
                enabled: status_to_enabled(&trigger.status),
            }))
    }

    async fn update(&self, id: &str, spec: &TriggerSpec) -> Result<()> {
        self.client
            .trigger_update(
                id,
                &spec.description,
                &spec.expression,
                spec.effective_priority(),
                enabled_to_status(spec.enabled),
            )
            .await?;
        info!(trigger_id = %id, "updated trigger");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.client.trigger_get(id).await?.is_none() {
            debug!(trigger_id = %id, "trigger already absent");
            return Ok(());
        }
        self.client.trigger_delete(id).await?;
        info!(trigger_id = %id, "deleted trigger");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_defaults_to_average() {
        assert_eq!(TriggerSpec::default().effective_priority(), "3");
        let spec = TriggerSpec {
            priority: "5".to_string(),
            ..Default::default()
        };
        assert_eq!(spec.effective_priority(), "5");
    }
}
