//! Wire records for the four object kinds.
//!
//! Fields the server encodes inconsistently across versions go through
//! the named coercions in [`crate::codec`]; everything else decodes
//! plainly. Identifiers stay opaque strings end to end, the client never
//! fabricates one.

use serde::{Deserialize, Serialize};

use crate::codec;

/// Host record as returned by `host.get`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Host {
    #[serde(rename = "hostid", deserialize_with = "codec::flexible_string")]
    pub host_id: String,
    /// Technical name.
    pub host: String,
    /// Visible name; the server falls back to the technical name.
    #[serde(default)]
    pub name: String,
    /// Wire status code, `"0"` for enabled and `"1"` for disabled.
    #[serde(deserialize_with = "codec::flexible_string")]
    pub status: String,
    #[serde(default)]
    pub interfaces: Vec<HostInterface>,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
    #[serde(rename = "parentTemplates", default)]
    pub parent_templates: Vec<TemplateRef>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Host interface sub-record, sent in `host.create`/`host.update` and
/// returned by `host.get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostInterface {
    #[serde(
        rename = "interfaceid",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "codec::opt_flexible_string"
    )]
    pub interface_id: Option<String>,
    /// Interface kind code: 1 agent, 2 SNMP, 3 IPMI, 4 JMX.
    #[serde(rename = "type", deserialize_with = "codec::flexible_i32")]
    pub kind: i32,
    /// 1 when this is the primary interface of its kind.
    #[serde(deserialize_with = "codec::flexible_i32")]
    pub main: i32,
    /// 1 to connect by IP, 0 to connect by DNS name.
    #[serde(rename = "useip", deserialize_with = "codec::flexible_i32")]
    pub use_ip: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dns: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "codec::opt_flexible_string"
    )]
    pub port: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "codec::details_object_or_array"
    )]
    pub details: Option<SnmpDetails>,
}

/// SNMP parameters attached to an SNMP interface. Only protocol version 2
/// is supported by the reconcilers; other versions are rejected before a
/// remote call is made.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnmpDetails {
    #[serde(default, deserialize_with = "codec::flexible_i32")]
    pub version: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub community: String,
}

/// Host tag, a free-form key/value pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub tag: String,
    #[serde(default)]
    pub value: String,
}

/// Host group reference embedded in host and template records.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupRef {
    #[serde(rename = "groupid")]
    pub group_id: String,
    #[serde(default)]
    pub name: String,
}

/// Template reference embedded in host records.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateRef {
    #[serde(rename = "templateid")]
    pub template_id: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostGroup {
    #[serde(rename = "groupid")]
    pub group_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Template {
    #[serde(rename = "templateid")]
    pub template_id: String,
    /// Technical name.
    #[serde(default)]
    pub host: String,
    /// Visible name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
}

/// Trigger record. Priority and status ride the wire as string codes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trigger {
    #[serde(rename = "triggerid")]
    pub trigger_id: String,
    pub description: String,
    #[serde(default)]
    pub expression: String,
    pub priority: String,
    pub status: String,
}

/// Maps a wire status code to the enabled flag. `"0"` is enabled; any
/// other value, including one that does not parse, is disabled.
pub fn status_to_enabled(status: &str) -> bool {
    status.parse::<i64>().map(|v| v == 0).unwrap_or(false)
}

/// Maps the enabled flag to the wire status code.
pub fn enabled_to_status(enabled: bool) -> i32 {
    if enabled { 0 } else { 1 }
}
