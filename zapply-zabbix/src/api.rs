//! Typed wrappers for the per-object API methods.
//!
//! Each wrapper builds the method's parameter object, issues the call
//! through [`ApiClient::call`], and narrows the result. Get wrappers
//! return `Ok(None)` when the id matches nothing; delete wrappers send
//! the server's bulk shape, a one-element id array.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::types::{Host, HostGroup, HostInterface, Tag, Template, Trigger};

/// Parameters for `host.create` and `host.update`. Group and template
/// references must already be resolved to identifiers and interfaces
/// must already be expanded.
#[derive(Debug, Clone, Default)]
pub struct HostParams {
    pub host: String,
    pub visible_name: String,
    pub status: i32,
    pub interfaces: Vec<HostInterface>,
    pub group_ids: Vec<String>,
    pub template_ids: Vec<String>,
    pub tags: Vec<Tag>,
}

fn id_objects(key: &str, ids: &[String]) -> Vec<Value> {
    ids.iter().map(|id| json!({key: id})).collect()
}

fn first_id(method: &str, ids: Vec<String>) -> Result<String> {
    ids.into_iter()
        .next()
        .ok_or_else(|| Error::Decode(format!("{method} returned no id")))
}

#[derive(Deserialize)]
struct CreatedHosts {
    #[serde(default)]
    hostids: Vec<String>,
}

#[derive(Deserialize)]
struct CreatedGroups {
    #[serde(default)]
    groupids: Vec<String>,
}

#[derive(Deserialize)]
struct CreatedTemplates {
    #[serde(default)]
    templateids: Vec<String>,
}

#[derive(Deserialize)]
struct CreatedTriggers {
    #[serde(default)]
    triggerids: Vec<String>,
}

impl ApiClient {
    pub async fn host_create(&self, params: &HostParams) -> Result<String> {
        let mut body = json!({
            "host": params.host,
            "name": params.visible_name,
            "status": params.status,
            "interfaces": params.interfaces,
            "groups": id_objects("groupid", &params.group_ids),
            "tags": params.tags,
        });
        if !params.template_ids.is_empty() {
            body["templates"] = Value::Array(id_objects("templateid", &params.template_ids));
        }
        let created: CreatedHosts = self.call("host.create", body, true).await?;
        first_id("host.create", created.hostids)
    }

    /// Fetches one host with interfaces, groups, templates, and tags
    /// expanded, so a single round-trip yields the full record.
    pub async fn host_get(&self, id: &str) -> Result<Option<Host>> {
        let hosts: Vec<Host> = self
            .call(
                "host.get",
                json!({
                    "hostids": [id],
                    "output": ["hostid", "host", "name", "status"],
                    "selectInterfaces": "extend",
                    "selectGroups": ["groupid", "name"],
                    "selectParentTemplates": ["templateid", "host", "name"],
                    "selectTags": "extend",
                }),
                true,
            )
            .await?;
        Ok(hosts.into_iter().next())
    }

    /// Full-record update; only the visible name has partial semantics
    /// and is left out when empty.
    pub async fn host_update(&self, id: &str, params: &HostParams) -> Result<()> {
        let mut body = json!({
            "hostid": id,
            "host": params.host,
            "status": params.status,
            "interfaces": params.interfaces,
            "groups": id_objects("groupid", &params.group_ids),
            "tags": params.tags,
        });
        if !params.visible_name.is_empty() {
            body["name"] = Value::String(params.visible_name.clone());
        }
        if !params.template_ids.is_empty() {
            body["templates"] = Value::Array(id_objects("templateid", &params.template_ids));
        }
        self.call::<Value>("host.update", body, true).await?;
        Ok(())
    }

    pub async fn host_delete(&self, id: &str) -> Result<()> {
        self.call::<Value>("host.delete", json!([id]), true).await?;
        Ok(())
    }

    pub async fn hostgroup_create(&self, name: &str) -> Result<String> {
        let created: CreatedGroups = self
            .call("hostgroup.create", json!({"name": name}), true)
            .await?;
        first_id("hostgroup.create", created.groupids)
    }

    pub async fn hostgroup_get(&self, id: &str) -> Result<Option<HostGroup>> {
        let groups: Vec<HostGroup> = self
            .call(
                "hostgroup.get",
                json!({"groupids": [id], "output": ["groupid", "name"]}),
                true,
            )
            .await?;
        Ok(groups.into_iter().next())
    }

    pub async fn hostgroup_update(&self, id: &str, name: &str) -> Result<()> {
        self.call::<Value>(
            "hostgroup.update",
            json!({"groupid": id, "name": name}),
            true,
        )
        .await?;
        Ok(())
    }

    pub async fn hostgroup_delete(&self, id: &str) -> Result<()> {
        self.call::<Value>("hostgroup.delete", json!([id]), true)
            .await?;
        Ok(())
    }

    pub async fn template_create(
        &self,
        host: &str,
        name: &str,
        group_ids: &[String],
    ) -> Result<String> {
        let created: CreatedTemplates = self
            .call(
                "template.create",
                json!({
                    "host": host,
                    "name": name,
                    "groups": id_objects("groupid", group_ids),
                }),
                true,
            )
            .await?;
        first_id("template.create", created.templateids)
    }

    pub async fn template_get(&self, id: &str) -> Result<Option<Template>> {
        let templates: Vec<Template> = self
            .call(
                "template.get",
                json!({
                    "templateids": [id],
                    "output": ["templateid", "host", "name"],
                    "selectGroups": ["groupid"],
                }),
                true,
            )
            .await?;
        Ok(templates.into_iter().next())
    }

    /// Like [`ApiClient::host_update`], the visible name is left out when
    /// empty; everything else is sent in full.
    pub async fn template_update(
        &self,
        id: &str,
        host: &str,
        name: &str,
        group_ids: &[String],
    ) -> Result<()> {
        let mut body = json!({
            "templateid": id,
            "host": host,
            "groups": id_objects("groupid", group_ids),
        });
        if !name.is_empty() {
            body["name"] = Value::String(name.to_string());
        }
        self.call::<Value>("template.update", body, true).await?;
        Ok(())
    }

    pub async fn template_delete(&self, id: &str) -> Result<()> {
        self.call::<Value>("template.delete", json!([id]), true)
            .await?;
        Ok(())
    }

    pub async fn trigger_create(
        &self,
        description: &str,
        expression: &str,
        priority: &str,
        status: i32,
    ) -> Result<String> {
        let created: CreatedTriggers = self
            .call(
                "trigger.create",
                json!({
                    "description": description,
                    "expression": expression,
                    "priority": priority,
                    "status": status,
                }),
                true,
            )
            .await?;
        first_id("trigger.create", created.triggerids)
    }

    pub async fn trigger_get(&self, id: &str) -> Result<Option<Trigger>> {
        let triggers: Vec<Trigger> = self
            .call(
                "trigger.get",
                json!({
                    "triggerids": [id],
                    "output": ["triggerid", "description", "expression", "priority", "status"],
                }),
                true,
            )
            .await?;
        Ok(triggers.into_iter().next())
    }

    pub async fn trigger_update(
        &self,
        id: &str,
        description: &str,
        expression: &str,
        priority: &str,
        status: i32,
    ) -> Result<()> {
        self.call::<Value>(
            "trigger.update",
            json!({
                "triggerid": id,
                "description": description,
                "expression": expression,
                "priority": priority,
                "status": status,
            }),
            true,
        )
        .await?;
        Ok(())
    }

    pub async fn trigger_delete(&self, id: &str) -> Result<()> {
        self.call::<Value>("trigger.delete", json!([id]), true)
            .await?;
        Ok(())
    }
}
