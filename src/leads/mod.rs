//! Lead capture: registration records and the registration pipeline.

pub mod model;
pub mod pipeline;

pub use model::{Assessment, LeadStatus, Registration, Relation};
pub use pipeline::{RegistrationOutcome, RegistrationPipeline, RegistrationRequest};
