//! Host reconciliation: interface expansion, tag conversion, and the
//! host lifecycle itself.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use zapply_zabbix::resolve::{resolve_host_groups, resolve_templates};
use zapply_zabbix::types::{
    Host, HostInterface, SnmpDetails, Tag, enabled_to_status, status_to_enabled,
};
use zapply_zabbix::{ApiClient, Error, HostParams, Result};

use crate::Reconcile;

/// Port used when an interface record leaves it empty or non-numeric.
pub const DEFAULT_PORT: &str = "10050";
/// The only SNMP protocol version the reconciler accepts.
pub const SNMP_DEFAULT_VERSION: i32 = 2;
/// Community macro applied when an SNMP interface carries no details.
pub const SNMP_DEFAULT_COMMUNITY: &str = "{$SNMP_COMMUNITY}";

/// Interface kind, mapped to the server's numeric type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    Agent,
    Snmp,
    Ipmi,
    Jmx,
}

impl InterfaceKind {
    pub fn code(self) -> i32 {
        match self {
            InterfaceKind::Agent => 1,
            InterfaceKind::Snmp => 2,
            InterfaceKind::Ipmi => 3,
            InterfaceKind::Jmx => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(InterfaceKind::Agent),
            2 => Some(InterfaceKind::Snmp),
            3 => Some(InterfaceKind::Ipmi),
            4 => Some(InterfaceKind::Jmx),
            _ => None,
        }
    }
}

/// SNMP parameters of a desired interface. Zero and empty select the
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnmpSpec {
    pub version: i32,
    pub community: String,
}

/// Desired interface record. `ip` is required when `use_ip` is set,
/// `dns` when it is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceSpec {
    pub kind: InterfaceKind,
    /// Primary interface of its kind.
    pub main: bool,
    /// Connect by IP rather than DNS name.
    pub use_ip: bool,
    pub ip: String,
    pub dns: String,
    pub port: String,
    pub snmp: Option<SnmpSpec>,
}

impl Default for InterfaceSpec {
    fn default() -> Self {
        Self {
            kind: InterfaceKind::Agent,
            main: true,
            use_ip: true,
            ip: String::new(),
            dns: String::new(),
            port: String::new(),
            snmp: None,
        }
    }
}

/// Desired host record. Group and template references may mix direct
/// identifiers and names; at least one group reference is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSpec {
    /// Technical name.
    pub name: String,
    /// Visible name; empty leaves the server value untouched on update.
    pub visible_name: String,
    pub enabled: bool,
    pub group_ids: Vec<String>,
    pub group_names: Vec<String>,
    pub template_ids: Vec<String>,
    pub template_names: Vec<String>,
    pub tags: BTreeMap<String, String>,
    pub interfaces: Vec<InterfaceSpec>,
}

impl Default for HostSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            visible_name: String::new(),
            enabled: true,
            group_ids: Vec::new(),
            group_names: Vec::new(),
            template_ids: Vec::new(),
            template_names: Vec::new(),
            tags: BTreeMap::new(),
            interfaces: Vec::new(),
        }
    }
}

/// Host as tracked by the orchestrator: identifiers resolved, interfaces
/// flattened back into desired-record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostState {
    pub id: String,
    pub name: String,
    pub visible_name: String,
    pub enabled: bool,
    pub group_ids: Vec<String>,
    pub group_names: Vec<String>,
    pub template_ids: Vec<String>,
    pub template_names: Vec<String>,
    pub tags: BTreeMap<String, String>,
    pub interfaces: Vec<InterfaceSpec>,
}

impl HostState {
    fn from_record(host: Host) -> Result<Self> {
        let interfaces = flatten_interfaces(&host.interfaces)?;
        Ok(Self {
            id: host.host_id,
            name: host.host,
            visible_name: host.name,
            enabled: status_to_enabled(&host.status),
            group_ids: host.groups.iter().map(|g| g.group_id.clone()).collect(),
            group_names: host.groups.iter().map(|g| g.name.clone()).collect(),
            template_ids: host
                .parent_templates
                .iter()
                .map(|t| t.template_id.clone())
                .collect(),
            // The technical name is the stable handle; fall back to the
            // visible name when the server omits it.
            template_names: host
                .parent_templates
                .iter()
                .map(|t| {
                    if t.host.is_empty() {
                        t.name.clone()
                    } else {
                        t.host.clone()
                    }
                })
                .collect(),
            tags: tags_to_map(&host.tags),
            interfaces,
        })
    }
}

/// Expands desired interface records into wire interfaces, applying the
/// port and SNMP defaults. Fails on the first invalid record, before any
/// remote call is made.
pub fn expand_interfaces(specs: &[InterfaceSpec]) -> Result<Vec<HostInterface>> {
    let mut out = Vec::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        if spec.use_ip && spec.ip.is_empty() {
            return Err(Error::Validation {
                field: format!("interfaces[{index}].ip"),
                message: "ip is required when use_ip is set".to_string(),
            });
        }
        if !spec.use_ip && spec.dns.is_empty() {
            return Err(Error::Validation {
                field: format!("interfaces[{index}].dns"),
                message: "dns is required when use_ip is not set".to_string(),
            });
        }

        let port = if !spec.port.is_empty() && spec.port.parse::<i64>().is_ok() {
            spec.port.clone()
        } else {
            if !spec.port.is_empty() {
                warn!(port = %spec.port, "non-numeric interface port, using default");
            }
            DEFAULT_PORT.to_string()
        };

        let details = if spec.kind == InterfaceKind::Snmp {
            let details = expand_snmp_details(spec.snmp.as_ref());
            if details.version != SNMP_DEFAULT_VERSION {
                return Err(Error::Validation {
                    field: format!("interfaces[{index}].snmp.version"),
                    message: format!(
                        "unsupported snmp version {}, only version 2 is supported",
                        details.version
                    ),
                });
            }
            Some(details)
        } else {
            None
        };

        out.push(HostInterface {
            interface_id: None,
            kind: spec.kind.code(),
            main: if spec.main { 1 } else { 0 },
            use_ip: if spec.use_ip { 1 } else { 0 },
            ip: spec.ip.clone(),
            dns: spec.dns.clone(),
            port: Some(port),
            details,
        });
    }
    Ok(out)
}

/// Fills in the SNMP defaults for an interface that carries none or only
/// partial details.
pub fn expand_snmp_details(spec: Option<&SnmpSpec>) -> SnmpDetails {
    let spec = spec.cloned().unwrap_or_default();
    SnmpDetails {
        version: if spec.version == 0 {
            SNMP_DEFAULT_VERSION
        } else {
            spec.version
        },
        community: if spec.community.is_empty() {
            SNMP_DEFAULT_COMMUNITY.to_string()
        } else {
            spec.community
        },
    }
}

/// Maps wire interfaces back into desired-record shape. Interface ids are
/// server-managed and dropped.
pub fn flatten_interfaces(interfaces: &[HostInterface]) -> Result<Vec<InterfaceSpec>> {
    let mut out = Vec::with_capacity(interfaces.len());
    for iface in interfaces {
        let kind = InterfaceKind::from_code(iface.kind)
            .ok_or_else(|| Error::Decode(format!("unknown interface type {}", iface.kind)))?;
        out.push(InterfaceSpec {
            kind,
            main: iface.main == 1,
            use_ip: iface.use_ip == 1,
            ip: iface.ip.clone(),
            dns: iface.dns.clone(),
            port: iface.port.clone().unwrap_or_default(),
            snmp: iface.details.as_ref().map(|d| SnmpSpec {
                version: d.version,
                community: d.community.clone(),
            }),
        });
    }
    Ok(out)
}

/// Converts the keyed tag map into the wire list.
pub fn tags_from_map(tags: &BTreeMap<String, String>) -> Vec<Tag> {
    tags.iter()
        .map(|(tag, value)| Tag {
            tag: tag.clone(),
            value: value.clone(),
        })
        .collect()
}

/// Converts the wire tag list back into a keyed map. Duplicate keys
/// collapse, the last value wins.
pub fn tags_to_map(tags: &[Tag]) -> BTreeMap<String, String> {
    tags.iter()
        .map(|t| (t.tag.clone(), t.value.clone()))
        .collect()
}

pub struct HostReconciler {
    client: Arc<ApiClient>,
}

impl HostReconciler {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    // Interfaces are validated locally before reference resolution, so an
    // invalid record never costs a remote call.
    async fn desired_params(&self, spec: &HostSpec) -> Result<HostParams> {
        let interfaces = expand_interfaces(&spec.interfaces)?;
        let group_ids =
            resolve_host_groups(&self.client, &spec.group_ids, &spec.group_names).await?;
        let template_ids =
            resolve_templates(&self.client, &spec.template_ids, &spec.template_names).await?;
        Ok(HostParams {
            host: spec.name.clone(),
            visible_name: spec.visible_name.clone(),
            status: enabled_to_status(spec.enabled),
            interfaces,
            group_ids,
            template_ids,
            tags: tags_from_map(&spec.tags),
        })
    }
}

#[async_trait]
impl Reconcile for HostReconciler {
    type Spec = HostSpec;
    type State = HostState;

    async fn create(&self, spec: &HostSpec) -> Result<String> {
        let params = self.desired_params(spec).await?;
        let id = self.client.host_create(&params).await?;
        info!(host_id = %id, host = %spec.name, "created host");
        Ok(id)
    }

    async fn read(&self, id: &str) -> Result<Option<HostState>> {
        let Some(host) = self.client.host_get(id).await? else {
            return Ok(None);
        };
        Ok(Some(HostState::from_record(host)?))
    }

    async fn update(&self, id: &str, spec: &HostSpec) -> Result<()> {
        let params = self.desired_params(spec).await?;
        self.client.host_update(id, &params).await?;
        info!(host_id = %id, "updated host");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.client.host_get(id).await?.is_none() {
            debug!(host_id = %id, "host already absent");
            return Ok(());
        }
        self.client.host_delete(id).await?;
        info!(host_id = %id, "deleted host");
        Ok(())
    }
}
