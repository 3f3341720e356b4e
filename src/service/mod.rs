//! Pipeline orchestration.
//!
//! [`ResearchService`] wires a [`PaperSource`](crate::source::PaperSource), the
//! memoization caches and the models held by a [`ModelHub`]. Model work runs on
//! blocking threads so request tasks stay responsive.

pub mod error;
pub mod models;
pub mod research;

#[cfg(test)]
mod tests;

pub use error::ServiceError;
pub use models::{LoadedModels, ModelHub, ModelPaths};
pub use research::{FetchOutcome, ResearchService, ServiceSettings};
