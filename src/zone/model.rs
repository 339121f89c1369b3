use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::metadata::{MetadataKey, MetadataValue};
use crate::validation::ValidationError;

/// Replication role of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ZoneKind {
    Native,
    Master,
    Slave,
}

impl ZoneKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneKind::Native => "Native",
            ZoneKind::Master => "Master",
            ZoneKind::Slave => "Slave",
        }
    }
}

impl FromStr for ZoneKind {
    type Err = ValidationError;

    // PowerDNS 4.5+ also speaks of Primary/Secondary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(ZoneKind::Native),
            "master" | "primary" => Ok(ZoneKind::Master),
            "slave" | "secondary" => Ok(ZoneKind::Slave),
            _ => Err(ValidationError::UnknownKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for ZoneKind {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the server reports about an existing zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneInfo {
    pub kind: ZoneKind,
    pub serial: u32,
    pub dnssec: bool,
    pub account: String,
    pub nameservers: Vec<String>,
    pub masters: Vec<String>,
    /// Only the recognised items the server actually holds.
    pub metadata: BTreeMap<MetadataKey, MetadataValue>,
    pub soa_edit: String,
    pub soa_edit_api: String,
    pub api_rectify: bool,
    pub nsec3param: String,
    pub nsec3narrow: bool,
}

/// A zone as seen on the server at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDescriptor {
    pub name: String,
    pub info: Option<ZoneInfo>,
}

impl ZoneDescriptor {
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            info: None,
        }
    }

    pub fn present(name: impl Into<String>, info: ZoneInfo) -> Self {
        Self {
            name: name.into(),
            info: Some(info),
        }
    }

    pub fn exists(&self) -> bool {
        self.info.is_some()
    }

    pub fn kind(&self) -> Option<ZoneKind> {
        self.info.as_ref().map(|info| info.kind)
    }
}

/// Zone properties requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneProperties {
    pub kind: ZoneKind,
    pub account: Option<String>,
    /// Only sent on creation.
    pub nameservers: Vec<String>,
    /// `None` leaves the server's list alone.
    pub masters: Option<Vec<String>>,
}

impl ZoneProperties {
    pub fn new(kind: ZoneKind) -> Self {
        Self {
            kind,
            account: None,
            nameservers: Vec::new(),
            masters: None,
        }
    }
}

/// Validated target state for one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredZone {
    pub name: String,
    pub properties: Option<ZoneProperties>,
    /// Sparse overlay: keys not listed here are never touched.
    pub metadata: BTreeMap<MetadataKey, MetadataValue>,
}

impl DesiredZone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_properties(mut self, properties: ZoneProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_metadata(mut self, key: MetadataKey, value: MetadataValue) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("native".parse::<ZoneKind>().unwrap(), ZoneKind::Native);
        assert_eq!("MASTER".parse::<ZoneKind>().unwrap(), ZoneKind::Master);
        assert_eq!("Secondary".parse::<ZoneKind>().unwrap(), ZoneKind::Slave);
        assert!("Hint".parse::<ZoneKind>().is_err());
    }

    #[test]
    fn kind_serde_uses_server_spelling() {
        assert_eq!(
            serde_json::to_value(ZoneKind::Slave).unwrap(),
            serde_json::json!("Slave")
        );
        let kind: ZoneKind = serde_json::from_value(serde_json::json!("slave")).unwrap();
        assert_eq!(kind, ZoneKind::Slave);
    }

    #[test]
    fn absent_descriptor_has_no_kind() {
        let zone = ZoneDescriptor::absent("d1.example.");
        assert!(!zone.exists());
        assert_eq!(zone.kind(), None);
    }
}
