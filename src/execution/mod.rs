//! Pipeline execution

pub mod enforcer;
pub mod pipeline;
pub mod plan;

pub use enforcer::PinEnforcer;
pub use pipeline::{EventHandler, PipelineEvent, ProvisioningPipeline};
pub use plan::{build_steps, Collaborators};
