pub mod cli;
pub mod download;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod logging;
pub mod plan;

pub use error::FetchError;
pub use fetcher::{FetchRequest, Fetcher};
pub use plan::{FetchPlan, PlanEntry};
