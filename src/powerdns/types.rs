use serde::{Deserialize, Serialize};

/// Entry of `GET /servers/{server}/zones?zone=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdnsZoneSummary {
    pub id: String,   // "example.com."
    pub name: String, // "example.com."
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdnsZone {
    pub id: String,   // "example.com." (escaped, see client::zone_id)
    pub name: String, // "example.com."
    #[serde(rename = "type", default)]
    pub zone_type: Option<String>, // "Zone"
    pub kind: String, // "Native", "Master", "Slave"
    #[serde(default)]
    pub serial: u32,
    #[serde(default)]
    pub dnssec: bool,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub masters: Vec<String>,
    #[serde(default)]
    pub soa_edit: String,
    #[serde(default)]
    pub soa_edit_api: String,
    #[serde(default)]
    pub api_rectify: bool,
    #[serde(default)]
    pub nsec3param: String,
    #[serde(default)]
    pub nsec3narrow: bool,
    pub rrsets: Option<Vec<PdnsRrset>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdnsRrset {
    pub name: String, // "www.example.com."
    #[serde(rename = "type")]
    pub rrtype: String, // "A", "NS", ...
    pub ttl: u32,
    pub changetype: Option<String>,
    pub records: Vec<PdnsRecord>,
    #[serde(default)]
    pub comments: Vec<PdnsComment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdnsRecord {
    pub content: String, // "192.0.2.1" or "ns1.example.net."
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdnsComment {
    pub content: String,
    pub account: String,
    pub modified_at: u64,
}

/// One zone metadata item (`GET /zones/{zone}/metadata`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsMetadata {
    pub kind: String, // "ALLOW-AXFR-FROM"
    #[serde(default)]
    pub metadata: Vec<String>,
}

// Used when creating a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsZoneCreate {
    pub name: String, // "d2.example."
    pub kind: String, // "Native"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<String>, // ["ns1.example.net."]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub masters: Vec<String>, // ["192.0.2.1"]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

// Body of `PUT /zones/{zone}`; only the populated fields are changed by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsZoneUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// Everything one fetch learns about a zone: properties plus its metadata items.
#[derive(Debug, Clone, Default)]
pub struct ZoneRecord {
    pub zone: PdnsZone,
    pub metadata: Vec<PdnsMetadata>,
}

impl ZoneRecord {
    /// Apex NS rrset contents, in server order.
    pub fn apex_nameservers(&self) -> Vec<String> {
        let Some(rrsets) = &self.zone.rrsets else {
            return Vec::new();
        };
        rrsets
            .iter()
            .filter(|rr| rr.rrtype == "NS" && rr.name.eq_ignore_ascii_case(&self.zone.name))
            .flat_map(|rr| rr.records.iter().map(|rec| rec.content.clone()))
            .collect()
    }
}
