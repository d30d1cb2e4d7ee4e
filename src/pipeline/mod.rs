//! Article retrieval pipeline.
//!
//! - [`state`]: the pure pagination reducer and its events/effects
//! - [`plan`]: maps query + filters to a concrete gateway call
//! - [`retriever`]: executes fetch effects and reports back as events
//! - [`error`]: failure classification and user-facing tips

pub mod error;
pub mod plan;
pub mod retriever;
pub mod state;

pub use error::ErrorKind;
pub use plan::RequestPlan;
pub use retriever::Retriever;
pub use state::{reduce, Display, Effect, Event, FetchRequest, PageState, Phase};
