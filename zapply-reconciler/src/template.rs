//! Template reconciliation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use zapply_zabbix::resolve::resolve_host_groups;
use zapply_zabbix::{ApiClient, Result};

use crate::Reconcile;

/// Desired template. Group references may mix direct identifiers and
/// names; at least one of the two lists must be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSpec {
    /// Technical name.
    pub name: String,
    /// Visible name; empty falls back to the technical name.
    pub visible_name: String,
    pub group_ids: Vec<String>,
    pub group_names: Vec<String>,
}

impl TemplateSpec {
    fn effective_visible_name(&self) -> &str {
        if self.visible_name.is_empty() {
            &self.name
        } else {
            &self.visible_name
        }
    }
}

/// Template as tracked by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateState {
    pub id: String,
    pub name: String,
    pub visible_name: String,
    pub group_ids: Vec<String>,
}

pub struct TemplateReconciler {
    client: Arc<ApiClient>,
}

impl TemplateReconciler {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Reconcile for TemplateReconciler {
    type Spec = TemplateSpec;
    type State = TemplateState;

    async fn create(&self, spec: &TemplateSpec) -> Result<String> {
        let group_ids =
            resolve_host_groups(&self.client, &spec.group_ids, &spec.group_names).await?;
        let id = self
            .client
            .template_create(&spec.name, spec.effective_visible_name(), &group_ids)
            .await?;
        info!(template_id = %id, name = %spec.name, "created template");
        Ok(id)
    }

    async fn read(&self, id: &str) -> Result<Option<TemplateState>> {
        Ok(self
            .client
            .template_get(id)
            .await?
            .map(|template| TemplateState {
                id: template.template_id,
                name: template.host,
                visible_name: template.name,
                group_ids: template.groups.iter().map(|g| g.group_id.clone()).collect(),
            }))
    }

    async fn update(&self, id: &str, spec: &TemplateSpec) -> Result<()> {
        let group_ids =
            resolve_host_groups(&self.client, &spec.group_ids, &spec.group_names).await?;
        self.client
            .template_update(id, &spec.name, spec.effective_visible_name(), &group_ids)
            .await?;
        info!(template_id = %id, "updated template");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.client.template_get(id).await?.is_none() {
            debug!(template_id = %id, "template already absent");
            return Ok(());
        }
        self.client.template_delete(id).await?;
        info!(template_id = %id, "deleted template");
        Ok(())
    }
}
