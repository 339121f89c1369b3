//! Field-by-field comparison of desired and actual zone state.
//!
//! The plan lists mutations in the order they must be issued: kind, then
//! masters (the kind decides whether masters mean anything), then account,
//! then metadata in key order.

use std::collections::BTreeMap;
use std::fmt;

use super::metadata::{MetadataKey, MetadataValue};
use super::model::{DesiredZone, ZoneDescriptor, ZoneKind, ZoneProperties};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Zone is missing; create it and then write the listed metadata.
    Create {
        properties: ZoneProperties,
        metadata: Vec<(MetadataKey, MetadataValue)>,
    },
    SetKind(ZoneKind),
    SetMasters(Vec<String>),
    SetAccount(String),
    /// Replace one metadata item wholesale.
    SetMetadata(MetadataKey, MetadataValue),
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Create { properties, .. } => write!(f, "create {} zone", properties.kind),
            Mutation::SetKind(kind) => write!(f, "set kind {kind}"),
            Mutation::SetMasters(masters) => write!(f, "set masters [{}]", masters.join(", ")),
            Mutation::SetAccount(account) => write!(f, "set account {account:?}"),
            Mutation::SetMetadata(key, value) => write!(f, "set metadata {key} = {value}"),
        }
    }
}

/// Ordered mutations that take a zone from its actual to its desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationPlan {
    mutations: Vec<Mutation>,
}

impl MutationPlan {
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Whether converging to this plan changes the zone. Imperative modes
    /// (notify, retrieve) change it regardless; that is decided by the
    /// controller, not here.
    pub fn changed(&self) -> bool {
        !self.is_empty()
    }
}

impl IntoIterator for MutationPlan {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.into_iter()
    }
}

pub fn diff(desired: &DesiredZone, actual: &ZoneDescriptor) -> MutationPlan {
    let mut mutations = Vec::new();

    let Some(info) = &actual.info else {
        let properties = desired
            .properties
            .clone()
            .unwrap_or_else(|| ZoneProperties::new(ZoneKind::Native));
        mutations.push(Mutation::Create {
            properties,
            metadata: metadata_changes(&desired.metadata, &BTreeMap::new()),
        });
        return MutationPlan { mutations };
    };

    if let Some(props) = &desired.properties {
        if props.kind != info.kind {
            mutations.push(Mutation::SetKind(props.kind));
        }
        // Order is significant: the server returns masters as given.
        if props.kind == ZoneKind::Slave {
            if let Some(masters) = &props.masters {
                if masters != &info.masters {
                    mutations.push(Mutation::SetMasters(masters.clone()));
                }
            }
        }
        if let Some(account) = &props.account {
            if account != &info.account {
                mutations.push(Mutation::SetAccount(account.clone()));
            }
        }
    }

    mutations.extend(
        metadata_changes(&desired.metadata, &info.metadata)
            .into_iter()
            .map(|(key, value)| Mutation::SetMetadata(key, value)),
    );

    MutationPlan { mutations }
}

/// Desired items whose value differs from what the server holds. Items the
/// server holds but the caller did not mention are never returned.
pub fn metadata_changes(
    desired: &BTreeMap<MetadataKey, MetadataValue>,
    actual: &BTreeMap<MetadataKey, MetadataValue>,
) -> Vec<(MetadataKey, MetadataValue)> {
    desired
        .iter()
        .filter(|(key, want)| {
            let have = actual.get(*key).cloned().or_else(|| key.implicit_value());
            have.as_ref() != Some(*want)
        })
        .map(|(key, want)| (*key, want.clone()))
        .collect()
}
