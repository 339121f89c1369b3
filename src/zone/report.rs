use serde::{Serialize, Serializer};

use super::model::{ZoneDescriptor, ZoneInfo};

/// Outcome of one successful convergence run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergeReport {
    pub changed: bool,
    pub zone: ZoneDescriptor,
}

impl ConvergeReport {
    pub fn unchanged(zone: ZoneDescriptor) -> Self {
        Self {
            changed: false,
            zone,
        }
    }

    pub fn changed(zone: ZoneDescriptor) -> Self {
        Self {
            changed: true,
            zone,
        }
    }
}

// `{"name": ..., "exists": false}` for a missing zone, every field otherwise.
#[derive(Serialize)]
struct ZoneSnapshot<'a> {
    name: &'a str,
    exists: bool,
    #[serde(flatten)]
    info: Option<&'a ZoneInfo>,
}

impl Serialize for ZoneDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ZoneSnapshot {
            name: &self.name,
            exists: self.exists(),
            info: self.info.as_ref(),
        }
        .serialize(serializer)
    }
}
