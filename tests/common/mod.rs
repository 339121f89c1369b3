//! In-memory stand-in for a PowerDNS Authoritative server.
//!
//! Holds zones and their raw metadata items the way the server stores them
//! and records every call, so tests can assert on exactly which requests the
//! engine issued.

#![allow(dead_code)]

use async_trait::async_trait;
use pdns_auth_zone::ZoneApi;
use pdns_auth_zone::powerdns::types::{
    PdnsMetadata, PdnsRecord, PdnsRrset, PdnsZone, PdnsZoneCreate, ZoneRecord,
};
use pdns_auth_zone::zone::{MetadataKey, MetadataValue, ZoneKind};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetZone(String),
    CreateZone(PdnsZoneCreate),
    SetKind(String, ZoneKind),
    SetMasters(String, Vec<String>),
    SetAccount(String, String),
    DeleteZone(String),
    SetMetadata(String, MetadataKey, MetadataValue),
    Notify(String),
    Retrieve(String),
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Call::GetZone(_))
    }

    fn op(&self) -> &'static str {
        match self {
            Call::GetZone(_) => "get_zone",
            Call::CreateZone(_) => "create_zone",
            Call::SetKind(..) => "set_zone_kind",
            Call::SetMasters(..) => "set_zone_masters",
            Call::SetAccount(..) => "set_zone_account",
            Call::DeleteZone(_) => "delete_zone",
            Call::SetMetadata(..) => "set_metadata",
            Call::Notify(_) => "notify_zone",
            Call::Retrieve(_) => "retrieve_zone",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredZone {
    pub kind: String,
    pub serial: u32,
    pub account: String,
    pub masters: Vec<String>,
    pub nameservers: Vec<String>,
    /// PowerDNS kind → items, as the server keeps them.
    pub metadata: BTreeMap<String, Vec<String>>,
}

#[derive(Default)]
pub struct MockPowerDns {
    zones: Mutex<BTreeMap<String, StoredZone>>,
    calls: Mutex<Vec<Call>>,
    /// Operation to fail, and which call of it (1-based); `None` fails every call.
    fail_on: Mutex<Option<(&'static str, Option<usize>)>>,
}

impl MockPowerDns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a zone directly, bypassing the call log.
    pub fn with_zone(self, name: &str, kind: &str) -> Self {
        self.zones.lock().unwrap().insert(
            name.to_string(),
            StoredZone {
                kind: kind.to_string(),
                serial: 2024010101,
                account: String::new(),
                masters: Vec::new(),
                nameservers: vec!["ns1.example.".to_string()],
                metadata: BTreeMap::new(),
            },
        );
        self
    }

    pub fn with_masters(self, name: &str, masters: &[&str]) -> Self {
        if let Some(zone) = self.zones.lock().unwrap().get_mut(name) {
            zone.masters = masters.iter().map(|m| m.to_string()).collect();
        }
        self
    }

    /// Seed a raw metadata item, bypassing the call log.
    pub fn with_metadata(self, name: &str, kind: &str, items: &[&str]) -> Self {
        if let Some(zone) = self.zones.lock().unwrap().get_mut(name) {
            zone.metadata.insert(
                kind.to_string(),
                items.iter().map(|i| i.to_string()).collect(),
            );
        }
        self
    }

    /// Make every subsequent call of `op` fail like a server error.
    pub fn fail_on(&self, op: &'static str) {
        *self.fail_on.lock().unwrap() = Some((op, None));
    }

    /// Fail only the `nth` call of `op`, counting from 1.
    pub fn fail_on_call(&self, op: &'static str, nth: usize) {
        *self.fail_on.lock().unwrap() = Some((op, Some(nth)));
    }

    pub fn zone(&self, name: &str) -> Option<StoredZone> {
        self.zones.lock().unwrap().get(name).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) -> anyhow::Result<()> {
        let op = call.op();
        let seen = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            calls.iter().filter(|c| c.op() == op).count()
        };
        let fails = match *self.fail_on.lock().unwrap() {
            Some((failing, nth)) if failing == op => nth.is_none_or(|n| n == seen),
            _ => false,
        };
        if fails {
            anyhow::bail!("PowerDNS {op} failed with 500 Internal Server Error");
        }
        Ok(())
    }

    fn with_existing<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut StoredZone) -> T,
    ) -> anyhow::Result<T> {
        let mut zones = self.zones.lock().unwrap();
        match zones.get_mut(name) {
            Some(zone) => Ok(f(zone)),
            None => anyhow::bail!(
                "PowerDNS request failed with 404 Not Found: Could not find domain '{name}'"
            ),
        }
    }
}

#[async_trait]
impl ZoneApi for MockPowerDns {
    async fn get_zone(&self, name: &str) -> anyhow::Result<Option<ZoneRecord>> {
        self.record(Call::GetZone(name.to_string()))?;
        let zones = self.zones.lock().unwrap();
        let Some(zone) = zones.get(name) else {
            return Ok(None);
        };
        Ok(Some(ZoneRecord {
            zone: PdnsZone {
                id: name.to_string(),
                name: name.to_string(),
                zone_type: Some("Zone".into()),
                kind: zone.kind.clone(),
                serial: zone.serial,
                account: zone.account.clone(),
                masters: zone.masters.clone(),
                soa_edit_api: "DEFAULT".into(),
                rrsets: Some(vec![PdnsRrset {
                    name: name.to_string(),
                    rrtype: "NS".into(),
                    ttl: 3600,
                    changetype: None,
                    records: zone
                        .nameservers
                        .iter()
                        .map(|ns| PdnsRecord {
                            content: ns.clone(),
                            disabled: false,
                        })
                        .collect(),
                    comments: Vec::new(),
                }]),
                ..Default::default()
            },
            metadata: zone
                .metadata
                .iter()
                .map(|(kind, items)| PdnsMetadata {
                    kind: kind.clone(),
                    metadata: items.clone(),
                })
                .collect(),
        }))
    }

    async fn create_zone(&self, zone: &PdnsZoneCreate) -> anyhow::Result<PdnsZone> {
        self.record(Call::CreateZone(zone.clone()))?;
        let mut zones = self.zones.lock().unwrap();
        if zones.contains_key(&zone.name) {
            anyhow::bail!("PowerDNS create_zone failed with 409 Conflict: Domain already exists");
        }
        zones.insert(
            zone.name.clone(),
            StoredZone {
                kind: zone.kind.clone(),
                serial: 1,
                account: zone.account.clone().unwrap_or_default(),
                masters: zone.masters.clone(),
                nameservers: zone.nameservers.clone(),
                metadata: BTreeMap::new(),
            },
        );
        Ok(PdnsZone {
            id: zone.name.clone(),
            name: zone.name.clone(),
            kind: zone.kind.clone(),
            serial: 1,
            ..Default::default()
        })
    }

    async fn set_zone_kind(&self, name: &str, kind: ZoneKind) -> anyhow::Result<()> {
        self.record(Call::SetKind(name.to_string(), kind))?;
        self.with_existing(name, |zone| zone.kind = kind.as_str().to_string())
    }

    async fn set_zone_masters(&self, name: &str, masters: &[String]) -> anyhow::Result<()> {
        self.record(Call::SetMasters(name.to_string(), masters.to_vec()))?;
        self.with_existing(name, |zone| zone.masters = masters.to_vec())
    }

    async fn set_zone_account(&self, name: &str, account: &str) -> anyhow::Result<()> {
        self.record(Call::SetAccount(name.to_string(), account.to_string()))?;
        self.with_existing(name, |zone| zone.account = account.to_string())
    }

    async fn delete_zone(&self, name: &str) -> anyhow::Result<()> {
        self.record(Call::DeleteZone(name.to_string()))?;
        if self.zones.lock().unwrap().remove(name).is_none() {
            anyhow::bail!("PowerDNS delete_zone failed with 404 Not Found");
        }
        Ok(())
    }

    async fn set_metadata(
        &self,
        name: &str,
        key: MetadataKey,
        value: &MetadataValue,
    ) -> anyhow::Result<()> {
        self.record(Call::SetMetadata(name.to_string(), key, value.clone()))?;
        let items = key.encode(value)?;
        self.with_existing(name, |zone| match items {
            Some(items) => {
                zone.metadata.insert(key.pdns_kind().to_string(), items);
            }
            None => {
                zone.metadata.remove(key.pdns_kind());
            }
        })
    }

    async fn notify_zone(&self, name: &str) -> anyhow::Result<()> {
        self.record(Call::Notify(name.to_string()))?;
        self.with_existing(name, |_| ())
    }

    async fn retrieve_zone(&self, name: &str) -> anyhow::Result<()> {
        self.record(Call::Retrieve(name.to_string()))?;
        self.with_existing(name, |_| ())
    }
}

/// Parse a request the way the binary reads a task file.
pub fn request(value: serde_json::Value) -> pdns_auth_zone::ZoneRequest {
    serde_json::from_value(value).expect("valid request document")
}
