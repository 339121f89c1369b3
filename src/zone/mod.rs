//! Zone convergence: model, remote-state adapter, diff engine, controller
//! and result reporting.

pub mod converge;
pub mod diff;
pub mod fetch;
pub mod metadata;
pub mod model;
pub mod report;
pub mod request;

pub use converge::converge;
pub use diff::{Mutation, MutationPlan, diff};
pub use fetch::fetch;
pub use metadata::{MetadataKey, MetadataShape, MetadataValue};
pub use model::{DesiredZone, ZoneDescriptor, ZoneInfo, ZoneKind, ZoneProperties};
pub use report::ConvergeReport;
pub use request::{PropertiesInput, ZoneRequest, ZoneState};
