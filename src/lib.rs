//! Crate entrypoint wiring together configuration, the PowerDNS API client,
//! and the zone convergence engine.

pub mod config;
pub mod error;
pub mod powerdns;
pub mod validation;
pub mod zone;

pub use config::ApiConfig;
pub use error::{FailureReport, ZoneError};
pub use powerdns::ZoneApi;
pub use powerdns::client::PowerDnsClient;
pub use zone::{ConvergeReport, ZoneRequest, ZoneState, converge};
