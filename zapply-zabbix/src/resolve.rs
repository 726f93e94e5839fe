//! Name to identifier resolution for host-group and template references.
//!
//! Resolution re-runs in full on every invocation that references names;
//! nothing is cached across calls. Mixing identifiers and names yields
//! their union, first-seen order preserved.

use serde_json::json;

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::types::{HostGroup, Template};

/// Resolves host-group references to an ordered, de-duplicated identifier
/// list. Identifiers supplied directly come first; each name is then
/// looked up and its identifier appended unless already present. A host
/// must belong to at least one group, so both lists empty is a validation
/// failure before any remote call.
pub async fn resolve_host_groups(
    client: &ApiClient,
    ids: &[String],
    names: &[String],
) -> Result<Vec<String>> {
    if ids.is_empty() && names.is_empty() {
        return Err(Error::Validation {
            field: "group_ids".to_string(),
            message: "supply at least one host group id or name".to_string(),
        });
    }
    let mut resolved = Vec::with_capacity(ids.len() + names.len());
    push_unique(&mut resolved, ids.iter().cloned());
    for name in names {
        let id = host_group_id_by_name(client, name).await?;
        push_unique(&mut resolved, std::iter::once(id));
    }
    Ok(resolved)
}

/// Resolves template references like [`resolve_host_groups`], except that
/// empty references are valid: a host may carry no templates.
pub async fn resolve_templates(
    client: &ApiClient,
    ids: &[String],
    names: &[String],
) -> Result<Vec<String>> {
    let mut resolved = Vec::with_capacity(ids.len() + names.len());
    push_unique(&mut resolved, ids.iter().cloned());
    for name in names {
        let id = template_id_by_name(client, name).await?;
        push_unique(&mut resolved, std::iter::once(id));
    }
    Ok(resolved)
}

fn push_unique(out: &mut Vec<String>, ids: impl Iterator<Item = String>) {
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
}

async fn host_group_id_by_name(client: &ApiClient, name: &str) -> Result<String> {
    let mut groups: Vec<HostGroup> = client
        .call(
            "hostgroup.get",
            json!({
                "output": ["groupid", "name"],
                "filter": {"name": [name]},
            }),
            true,
        )
        .await?;
    match groups.len() {
        0 => Err(Error::NotFound {
            kind: "host group",
            name: name.to_string(),
        }),
        1 => Ok(groups.remove(0).group_id),
        _ => Err(Error::Ambiguous {
            kind: "host group",
            name: name.to_string(),
        }),
    }
}

// The technical name is filtered first; the visible name is only
// consulted when the technical name matches nothing. More than one
// technical-name match is immediately ambiguous, without fallback.
async fn template_id_by_name(client: &ApiClient, name: &str) -> Result<String> {
    let mut matches = templates_by_filter(client, "host", name).await?;
    match matches.len() {
        1 => return Ok(matches.remove(0).template_id),
        0 => {}
        _ => {
            return Err(Error::Ambiguous {
                kind: "template",
                name: name.to_string(),
            });
        }
    }

    let mut matches = templates_by_filter(client, "name", name).await?;
    match matches.len() {
        0 => Err(Error::NotFound {
            kind: "template",
            name: name.to_string(),
        }),
        1 => Ok(matches.remove(0).template_id),
        _ => Err(Error::Ambiguous {
            kind: "template",
            name: name.to_string(),
        }),
    }
}

async fn templates_by_filter(client: &ApiClient, field: &str, name: &str) -> Result<Vec<Template>> {
    client
        .call(
            "template.get",
            json!({
                "output": ["templateid", "host", "name"],
                "filter": {field: [name]},
            }),
            true,
        )
        .await
}
