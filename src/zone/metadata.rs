//! Per-zone metadata keys, their value shapes, and the PowerDNS wire encoding.
//!
//! PowerDNS stores every metadata item as a list of strings. The meaning of
//! that list depends on the key, so each recognised key carries a
//! [`MetadataShape`] in [`METADATA_KEYS`], and values are held as a typed
//! [`MetadataValue`] once they leave the wire.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::validation::{ValidationError, validate_choice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKey {
    AllowAxfrFrom,
    AllowDnsupdateFrom,
    AlsoNotify,
    AxfrMasterTsig,
    AxfrSource,
    ForwardDnsupdate,
    GssAcceptorPrincipal,
    GssAllowAxfrPrincipal,
    Ixfr,
    LuaAxfrScript,
    NotifyDnsupdate,
    PublishCdnskey,
    PublishCds,
    SlaveRenotify,
    SoaEditDnsupdate,
    TsigAllowAxfr,
    TsigAllowDnsupdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataShape {
    /// Stored verbatim; empty means "not set".
    List,
    /// Single string; empty means "not set".
    Text,
    /// `"1"` / `"0"`.
    Flag,
    /// Enabled by the item existing at all.
    Presence,
}

#[derive(Debug)]
pub struct KeySpec {
    pub key: MetadataKey,
    /// Caller-facing name (`allow_axfr_from`)
    pub name: &'static str,
    /// PowerDNS metadata kind (`ALLOW-AXFR-FROM`)
    pub kind: &'static str,
    pub shape: MetadataShape,
    /// Report-only keys are decoded but never written.
    pub writable: bool,
    pub choices: &'static [&'static str],
}

const fn spec(
    key: MetadataKey,
    name: &'static str,
    kind: &'static str,
    shape: MetadataShape,
) -> KeySpec {
    KeySpec {
        key,
        name,
        kind,
        shape,
        writable: true,
        choices: &[],
    }
}

const fn read_only(mut s: KeySpec) -> KeySpec {
    s.writable = false;
    s
}

pub const SOA_EDIT_DNSUPDATE_CHOICES: &[&str] =
    &["DEFAULT", "INCREASE", "EPOCH", "SOA-EDIT", "SOA-EDIT-INCREASE"];

/// Indexed by `MetadataKey as usize`.
pub static METADATA_KEYS: [KeySpec; 17] = {
    use MetadataKey::*;
    use MetadataShape::*;
    [
        spec(AllowAxfrFrom, "allow_axfr_from", "ALLOW-AXFR-FROM", List),
        spec(AllowDnsupdateFrom, "allow_dnsupdate_from", "ALLOW-DNSUPDATE-FROM", List),
        spec(AlsoNotify, "also_notify", "ALSO-NOTIFY", List),
        read_only(spec(AxfrMasterTsig, "axfr_master_tsig", "AXFR-MASTER-TSIG", Text)),
        spec(AxfrSource, "axfr_source", "AXFR-SOURCE", Text),
        spec(ForwardDnsupdate, "forward_dnsupdate", "FORWARD-DNSUPDATE", Presence),
        spec(GssAcceptorPrincipal, "gss_acceptor_principal", "GSS-ACCEPTOR-PRINCIPAL", Text),
        spec(GssAllowAxfrPrincipal, "gss_allow_axfr_principal", "GSS-ALLOW-AXFR-PRINCIPAL", Text),
        spec(Ixfr, "ixfr", "IXFR", Flag),
        read_only(spec(LuaAxfrScript, "lua_axfr_script", "LUA-AXFR-SCRIPT", Text)),
        spec(NotifyDnsupdate, "notify_dnsupdate", "NOTIFY-DNSUPDATE", Flag),
        spec(PublishCdnskey, "publish_cdnskey", "PUBLISH-CDNSKEY", Flag),
        spec(PublishCds, "publish_cds", "PUBLISH-CDS", List),
        spec(SlaveRenotify, "slave_renotify", "SLAVE-RENOTIFY", Flag),
        KeySpec {
            choices: SOA_EDIT_DNSUPDATE_CHOICES,
            ..spec(SoaEditDnsupdate, "soa_edit_dnsupdate", "SOA-EDIT-DNSUPDATE", Text)
        },
        read_only(spec(TsigAllowAxfr, "tsig_allow_axfr", "TSIG-ALLOW-AXFR", List)),
        spec(TsigAllowDnsupdate, "tsig_allow_dnsupdate", "TSIG-ALLOW-DNSUPDATE", List),
    ]
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    List(Vec<String>),
    Text(String),
    Flag(bool),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::List(items) => write!(f, "[{}]", items.join(", ")),
            MetadataValue::Text(s) => write!(f, "{s:?}"),
            MetadataValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl MetadataKey {
    pub fn all() -> impl Iterator<Item = MetadataKey> {
        METADATA_KEYS.iter().map(|s| s.key)
    }

    pub fn spec(self) -> &'static KeySpec {
        &METADATA_KEYS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn pdns_kind(self) -> &'static str {
        self.spec().kind
    }

    pub fn shape(self) -> MetadataShape {
        self.spec().shape
    }

    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        METADATA_KEYS
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.key)
            .ok_or_else(|| ValidationError::UnknownMetadataKey(name.to_string()))
    }

    /// Metadata kinds are case-insensitive on the server side.
    pub fn from_pdns_kind(kind: &str) -> Option<Self> {
        METADATA_KEYS
            .iter()
            .find(|s| s.kind.eq_ignore_ascii_case(kind))
            .map(|s| s.key)
    }

    /// Value a fresh zone effectively has when the item is missing.
    ///
    /// Flags have none: an explicit `false` is stored as `"0"` and must not
    /// be confused with "never configured".
    pub fn implicit_value(self) -> Option<MetadataValue> {
        match self.shape() {
            MetadataShape::List => Some(MetadataValue::List(Vec::new())),
            MetadataShape::Text => Some(MetadataValue::Text(String::new())),
            MetadataShape::Presence => Some(MetadataValue::Flag(false)),
            MetadataShape::Flag => None,
        }
    }

    /// Typed value from caller input. `null` is not a value; requests drop
    /// such keys before they get here.
    pub fn parse_value(self, raw: &Value) -> Result<MetadataValue, ValidationError> {
        let spec = self.spec();
        let invalid = |expected| ValidationError::InvalidMetadataValue {
            key: spec.name.to_string(),
            expected,
        };

        match spec.shape {
            MetadataShape::List => match raw {
                Value::Array(items) => items
                    .iter()
                    .map(|item| scalar_to_string(item).ok_or_else(|| invalid("a list of strings")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(MetadataValue::List),
                other => scalar_to_string(other)
                    .map(|s| MetadataValue::List(vec![s]))
                    .ok_or_else(|| invalid("a list of strings")),
            },
            MetadataShape::Text => {
                let text = scalar_to_string(raw).ok_or_else(|| invalid("a string"))?;
                if !spec.choices.is_empty() && !text.is_empty() {
                    validate_choice(spec.name, &text, spec.choices)?;
                }
                Ok(MetadataValue::Text(text))
            }
            MetadataShape::Flag | MetadataShape::Presence => parse_bool(raw)
                .map(MetadataValue::Flag)
                .ok_or_else(|| invalid("a boolean")),
        }
    }

    /// Typed value from the items PowerDNS returned.
    pub fn decode(self, items: &[String]) -> MetadataValue {
        match self.shape() {
            MetadataShape::List => MetadataValue::List(items.to_vec()),
            MetadataShape::Text => {
                MetadataValue::Text(items.first().cloned().unwrap_or_default())
            }
            MetadataShape::Flag => {
                MetadataValue::Flag(items.first().is_some_and(|v| v.trim() == "1"))
            }
            MetadataShape::Presence => MetadataValue::Flag(true),
        }
    }

    /// Items to store for `value`, or `None` when the item must be deleted.
    pub fn encode(self, value: &MetadataValue) -> Result<Option<Vec<String>>, ValidationError> {
        let items = match (self.shape(), value) {
            (MetadataShape::List, MetadataValue::List(items)) => {
                (!items.is_empty()).then(|| items.clone())
            }
            (MetadataShape::Text, MetadataValue::Text(text)) => {
                (!text.is_empty()).then(|| vec![text.clone()])
            }
            (MetadataShape::Flag, MetadataValue::Flag(on)) => {
                Some(vec![if *on { "1" } else { "0" }.to_string()])
            }
            (MetadataShape::Presence, MetadataValue::Flag(on)) => on.then(|| vec![String::new()]),
            (shape, _) => {
                return Err(ValidationError::InvalidMetadataValue {
                    key: self.name().to_string(),
                    expected: match shape {
                        MetadataShape::List => "a list of strings",
                        MetadataShape::Text => "a string",
                        MetadataShape::Flag | MetadataShape::Presence => "a boolean",
                    },
                });
            }
        };
        Ok(items)
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Booleans arrive as JSON booleans or as the usual string synonyms.
fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" | "y" => Some(true),
            "0" | "false" | "no" | "off" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
