//! Caller-facing input and its validation into a [`DesiredZone`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::metadata::MetadataKey;
use super::model::{DesiredZone, ZoneKind, ZoneProperties};
use crate::validation::{ValidationError, normalize_fqdn, validate_master_address};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneState {
    /// Report presence only.
    Exists,
    #[default]
    Present,
    Absent,
    /// Send NOTIFY to secondaries (or act on one, for Slave zones).
    Notify,
    /// Pull a fresh copy of a Slave zone from its master.
    Retrieve,
}

impl ZoneState {
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneState::Exists => "exists",
            ZoneState::Present => "present",
            ZoneState::Absent => "absent",
            ZoneState::Notify => "notify",
            ZoneState::Retrieve => "retrieve",
        }
    }
}

impl FromStr for ZoneState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exists" => Ok(ZoneState::Exists),
            "present" => Ok(ZoneState::Present),
            "absent" => Ok(ZoneState::Absent),
            "notify" => Ok(ZoneState::Notify),
            "retrieve" => Ok(ZoneState::Retrieve),
            other => Err(format!(
                "unknown state '{other}' (expected exists, present, absent, notify or retrieve)"
            )),
        }
    }
}

impl fmt::Display for ZoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertiesInput {
    pub kind: Option<ZoneKind>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub nameservers: Option<Vec<String>>,
    #[serde(default)]
    pub masters: Option<Vec<String>>,
}

/// One convergence request, as read from a task file or the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneRequest {
    pub name: String,
    #[serde(default)]
    pub state: ZoneState,
    /// Ignored unless `state` is `present`.
    #[serde(default)]
    pub properties: Option<PropertiesInput>,
    /// Ignored unless `state` is `present`.
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    /// Compute the outcome without issuing any mutating call.
    #[serde(default)]
    pub check_mode: bool,
    /// Refuse to act on an existing zone whose SOA serial differs.
    #[serde(default)]
    pub if_serial: Option<u32>,
}

impl ZoneRequest {
    pub fn new(name: impl Into<String>, state: ZoneState) -> Self {
        Self {
            name: name.into(),
            state,
            ..Default::default()
        }
    }

    /// Validate everything up front so that a bad request never reaches the server.
    pub fn desired(&self) -> Result<DesiredZone, ValidationError> {
        let mut desired = DesiredZone::new(normalize_fqdn(&self.name)?);
        if self.state != ZoneState::Present {
            return Ok(desired);
        }

        if let Some(props) = &self.properties {
            desired.properties = Some(props.validate()?);
        }

        for (name, raw) in self.metadata.iter().flatten() {
            let key = MetadataKey::from_name(name)?;
            if !key.spec().writable {
                return Err(ValidationError::ReadOnlyMetadataKey(name.clone()));
            }
            // Same as leaving the key out.
            if raw.is_null() {
                continue;
            }
            desired.metadata.insert(key, key.parse_value(raw)?);
        }

        Ok(desired)
    }
}

impl PropertiesInput {
    fn validate(&self) -> Result<ZoneProperties, ValidationError> {
        let kind = self.kind.ok_or(ValidationError::MissingKind)?;

        let nameservers = self
            .nameservers
            .iter()
            .flatten()
            .map(|ns| normalize_fqdn(ns))
            .collect::<Result<Vec<_>, _>>()?;
        if kind == ZoneKind::Slave && !nameservers.is_empty() {
            return Err(ValidationError::NameserversOnSlave);
        }

        if let Some(masters) = &self.masters {
            if kind != ZoneKind::Slave && !masters.is_empty() {
                return Err(ValidationError::MastersRequireSlave(kind.to_string()));
            }
            for addr in masters {
                validate_master_address(addr)?;
            }
        }

        Ok(ZoneProperties {
            kind,
            account: self.account.clone(),
            nameservers,
            masters: self.masters.clone(),
        })
    }
}
