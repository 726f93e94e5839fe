//! Reconcilers for monitoring objects.
//!
//! Each reconciler drives one object kind (host, host group, template,
//! trigger) through its lifecycle against a shared
//! [`zapply_zabbix::ApiClient`], turning desired-state records into API
//! calls and wire records back into the state the orchestrator tracks.

pub mod host;
pub mod host_group;
pub mod template;
pub mod trigger;

use async_trait::async_trait;

use zapply_zabbix::Result;

pub use host::{HostReconciler, HostSpec, HostState, InterfaceKind, InterfaceSpec, SnmpSpec};
pub use host_group::{HostGroupReconciler, HostGroupSpec, HostGroupState};
pub use template::{TemplateReconciler, TemplateSpec, TemplateState};
pub use trigger::{TriggerReconciler, TriggerSpec, TriggerState};

/// Lifecycle operations for one object kind.
///
/// `read` reports a missing object as `Ok(None)` so the orchestrator
/// drops it from tracked state instead of failing, and `delete` treats a
/// missing object as success.
#[async_trait]
pub trait Reconcile: Send + Sync {
    /// Desired-state record supplied by the orchestrator.
    type Spec;
    /// Current-state record reported back to the orchestrator.
    type State;

    /// Create the object and return its server-assigned identifier.
    async fn create(&self, spec: &Self::Spec) -> Result<String>;

    /// Fetch the full current record, or `None` when the object is gone.
    async fn read(&self, id: &str) -> Result<Option<Self::State>>;

    /// Push the desired record in full; last write wins.
    async fn update(&self, id: &str, spec: &Self::Spec) -> Result<()>;

    /// Remove the object. Deleting an already-absent object succeeds.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Adopts an externally supplied identifier verbatim.
    fn import_from_id(&self, external_id: &str) -> String {
        external_id.to_string()
    }
}
