//! Drives one zone towards the requested state.
//!
//! Every call to the server is awaited before the next is issued. Nothing is
//! rolled back: when a mutation fails, the ones before it stay applied and
//! are listed in [`ZoneError::Mutation`].

use std::future::Future;
use tracing::{info, warn};

use super::diff::{Mutation, MutationPlan, diff};
use super::fetch::{fetch, fetch_remote};
use super::model::{ZoneDescriptor, ZoneKind};
use super::report::ConvergeReport;
use super::request::{ZoneRequest, ZoneState};
use crate::error::ZoneError;
use crate::powerdns::ZoneApi;
use crate::powerdns::types::PdnsZoneCreate;

pub async fn converge<A: ZoneApi + ?Sized>(
    api: &A,
    request: &ZoneRequest,
) -> Result<ConvergeReport, ZoneError> {
    let desired = request.desired()?;
    let actual = fetch(api, &desired.name).await?;

    if let (Some(expected), Some(info)) = (request.if_serial, &actual.info) {
        if request.state != ZoneState::Exists && info.serial != expected {
            return Err(ZoneError::PreconditionFailed {
                zone: actual.name.clone(),
                expected,
                actual: info.serial,
            });
        }
    }

    let run = Run {
        api,
        check_mode: request.check_mode,
        applied: Vec::new(),
    };

    match request.state {
        ZoneState::Exists => Ok(ConvergeReport::unchanged(actual)),
        ZoneState::Absent => run.remove(actual).await,
        ZoneState::Notify | ZoneState::Retrieve => run.trigger(request.state, actual).await,
        ZoneState::Present => {
            let plan = diff(&desired, &actual);
            if !plan.changed() {
                info!(zone = %actual.name, "zone already converged");
                return Ok(ConvergeReport::unchanged(actual));
            }
            run.apply(actual, plan).await
        }
    }
}

struct Run<'a, A: ?Sized> {
    api: &'a A,
    check_mode: bool,
    applied: Vec<String>,
}

impl<A: ZoneApi + ?Sized> Run<'_, A> {
    async fn step<F>(&mut self, label: String, call: F) -> Result<(), ZoneError>
    where
        F: Future<Output = anyhow::Result<()>>,
    {
        info!(step = %label, "applying");
        match call.await {
            Ok(()) => {
                self.applied.push(label);
                Ok(())
            }
            Err(source) => {
                warn!(step = %label, error = %format!("{source:#}"), "step failed");
                Err(ZoneError::Mutation {
                    mutation: label,
                    applied: self.applied.clone(),
                    source,
                })
            }
        }
    }

    async fn remove(mut self, actual: ZoneDescriptor) -> Result<ConvergeReport, ZoneError> {
        if !actual.exists() {
            return Ok(ConvergeReport::unchanged(actual));
        }
        if self.check_mode {
            info!(zone = %actual.name, "would delete zone");
            return Ok(ConvergeReport::changed(actual));
        }
        let name = actual.name;
        let api = self.api;
        self.step(format!("delete zone {name}"), api.delete_zone(&name))
            .await?;
        Ok(ConvergeReport::changed(ZoneDescriptor::absent(name)))
    }

    /// Notify and retrieve are imperative: they always count as a change.
    async fn trigger(
        mut self,
        state: ZoneState,
        actual: ZoneDescriptor,
    ) -> Result<ConvergeReport, ZoneError> {
        let Some(kind) = actual.kind() else {
            return Err(ZoneError::NotFound(actual.name));
        };
        let api = self.api;
        match state {
            ZoneState::Notify => {
                if kind == ZoneKind::Native {
                    return Err(ZoneError::not_eligible(
                        &actual.name,
                        "NOTIFY cannot be requested for 'Native' zones",
                    ));
                }
                if !self.check_mode {
                    self.step(format!("notify zone {}", actual.name), api.notify_zone(&actual.name))
                        .await?;
                }
            }
            _ => {
                if kind != ZoneKind::Slave {
                    return Err(ZoneError::not_eligible(
                        &actual.name,
                        "Retrieval can only be requested for 'Slave' zones",
                    ));
                }
                if !self.check_mode {
                    self.step(
                        format!("retrieve zone {}", actual.name),
                        api.retrieve_zone(&actual.name),
                    )
                    .await?;
                }
            }
        }
        Ok(ConvergeReport::changed(actual))
    }

    async fn apply(
        mut self,
        actual: ZoneDescriptor,
        plan: MutationPlan,
    ) -> Result<ConvergeReport, ZoneError> {
        if self.check_mode {
            for mutation in plan.mutations() {
                info!(zone = %actual.name, %mutation, "would apply");
            }
            return Ok(ConvergeReport::changed(actual));
        }

        let api = self.api;
        let name = actual.name;
        for mutation in plan {
            let label = mutation.to_string();
            match mutation {
                Mutation::Create {
                    properties,
                    metadata,
                } => {
                    let is_slave = properties.kind == ZoneKind::Slave;
                    let body = PdnsZoneCreate {
                        name: name.clone(),
                        kind: properties.kind.as_str().to_string(),
                        nameservers: if is_slave {
                            Vec::new()
                        } else {
                            properties.nameservers
                        },
                        masters: if is_slave {
                            properties.masters.unwrap_or_default()
                        } else {
                            Vec::new()
                        },
                        account: properties.account,
                    };
                    self.step(format!("{label} {name}"), async {
                        api.create_zone(&body).await.map(|_| ())
                    })
                    .await?;
                    // A fresh zone has no metadata; each item is its own step.
                    for (key, value) in metadata {
                        let label = Mutation::SetMetadata(key, value.clone()).to_string();
                        self.step(label, api.set_metadata(&name, key, &value)).await?;
                    }
                }
                Mutation::SetKind(kind) => {
                    self.step(label, api.set_zone_kind(&name, kind)).await?;
                }
                Mutation::SetMasters(masters) => {
                    self.step(label, api.set_zone_masters(&name, &masters)).await?;
                }
                Mutation::SetAccount(account) => {
                    self.step(label, api.set_zone_account(&name, &account)).await?;
                }
                Mutation::SetMetadata(key, value) => {
                    self.step(label, api.set_metadata(&name, key, &value)).await?;
                }
            }
        }

        // Read back so the report matches what the next fetch will see.
        match fetch_remote(api, &name).await {
            Ok(zone) if zone.exists() => Ok(ConvergeReport::changed(zone)),
            Ok(_) => Err(ZoneError::Mutation {
                mutation: format!("read back zone {name}"),
                applied: self.applied,
                source: anyhow::anyhow!("zone {name} is missing after being written"),
            }),
            Err(source) => Err(ZoneError::Mutation {
                mutation: format!("read back zone {name}"),
                applied: self.applied,
                source,
            }),
        }
    }
}
