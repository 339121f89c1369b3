//! Translation of the server's zone representation into [`ZoneDescriptor`].

use anyhow::Context;
use std::collections::BTreeMap;
use tracing::{debug, trace};

use super::metadata::MetadataKey;
use super::model::{ZoneDescriptor, ZoneInfo, ZoneKind};
use crate::error::ZoneError;
use crate::powerdns::ZoneApi;
use crate::powerdns::types::ZoneRecord;

/// Current state of `name`. Absence is only ever reported when the server
/// says so; every failure surfaces as [`ZoneError::Transport`].
pub async fn fetch<A: ZoneApi + ?Sized>(api: &A, name: &str) -> Result<ZoneDescriptor, ZoneError> {
    fetch_remote(api, name).await.map_err(ZoneError::Transport)
}

pub(crate) async fn fetch_remote<A: ZoneApi + ?Sized>(
    api: &A,
    name: &str,
) -> anyhow::Result<ZoneDescriptor> {
    match api.get_zone(name).await? {
        None => {
            debug!(zone = name, "zone not found");
            Ok(ZoneDescriptor::absent(name))
        }
        Some(record) => describe(&record),
    }
}

pub fn describe(record: &ZoneRecord) -> anyhow::Result<ZoneDescriptor> {
    let zone = &record.zone;
    let kind: ZoneKind = zone
        .kind
        .parse()
        .with_context(|| format!("zone {} has unsupported kind '{}'", zone.name, zone.kind))?;

    let mut metadata = BTreeMap::new();
    for item in &record.metadata {
        match MetadataKey::from_pdns_kind(&item.kind) {
            Some(key) => {
                metadata.insert(key, key.decode(&item.metadata));
            }
            None => {
                trace!(zone = %zone.name, kind = %item.kind, "leaving unmodelled metadata alone")
            }
        }
    }

    Ok(ZoneDescriptor::present(
        zone.name.clone(),
        ZoneInfo {
            kind,
            serial: zone.serial,
            dnssec: zone.dnssec,
            account: zone.account.clone(),
            nameservers: record.apex_nameservers(),
            masters: zone.masters.clone(),
            metadata,
            soa_edit: zone.soa_edit.clone(),
            soa_edit_api: zone.soa_edit_api.clone(),
            api_rectify: zone.api_rectify,
            nsec3param: zone.nsec3param.clone(),
            nsec3narrow: zone.nsec3narrow,
        },
    ))
}
