//! PowerDNS Authoritative HTTP API: wire types, the capability set the
//! convergence engine needs, and the reqwest implementation of it.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::zone::{MetadataKey, MetadataValue, ZoneKind};
use types::{PdnsZone, PdnsZoneCreate, ZoneRecord};

/// Operations the engine issues against the authoritative server.
///
/// Implementations perform exactly one logical request per call, no retries,
/// and report absence only through `get_zone` returning `Ok(None)`. Any
/// other failure is an `Err`.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    async fn get_zone(&self, name: &str) -> anyhow::Result<Option<ZoneRecord>>;

    async fn create_zone(&self, zone: &PdnsZoneCreate) -> anyhow::Result<PdnsZone>;

    async fn set_zone_kind(&self, name: &str, kind: ZoneKind) -> anyhow::Result<()>;

    async fn set_zone_masters(&self, name: &str, masters: &[String]) -> anyhow::Result<()>;

    async fn set_zone_account(&self, name: &str, account: &str) -> anyhow::Result<()>;

    async fn delete_zone(&self, name: &str) -> anyhow::Result<()>;

    /// Replace one metadata item wholesale; values that encode to nothing delete it.
    async fn set_metadata(
        &self,
        name: &str,
        key: MetadataKey,
        value: &MetadataValue,
    ) -> anyhow::Result<()>;

    async fn notify_zone(&self, name: &str) -> anyhow::Result<()>;

    async fn retrieve_zone(&self, name: &str) -> anyhow::Result<()>;
}
