//! Host group reconciliation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use zapply_zabbix::{ApiClient, Result};

use crate::Reconcile;

/// Desired host group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostGroupSpec {
    pub name: String,
}

/// Host group as tracked by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroupState {
    pub id: String,
    pub name: String,
}

pub struct HostGroupReconciler {
    client: Arc<ApiClient>,
}

impl HostGroupReconciler {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Reconcile for HostGroupReconciler {
    type Spec = HostGroupSpec;
    type State = HostGroupState;

    async fn create(&self, spec: &HostGroupSpec) -> Result<String> {
        let id = self.client.hostgroup_create(&spec.name).await?;
        info!(group_id = %id, name = %spec.name, "created host group");
        Ok(id)
    }

    async fn read(&self, id: &str) -> Result<Option<HostGroupState>> {
        Ok(self
            .client
            .hostgroup_get(id)
            .await?
            .map(|group| HostGroupState {
                id: group.group_id,
                name: group.name,
            }))
    }

    async fn update(&self, id: &str, spec: &HostGroupSpec) -> Result<()> {
        self.client.hostgroup_update(id, &spec.name).await?;
        info!(group_id = %id, "updated host group");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.client.hostgroup_get(id).await?.is_none() {
            debug!(group_id = %id, "host group already absent");
            return Ok(());
        }
        self.client.hostgroup_delete(id).await?;
        info!(group_id = %id, "deleted host group");
        Ok(())
    }
}
