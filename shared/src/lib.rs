//! Shared types and models for the ProdFlow production tracking platform
//!
//! This crate contains the domain model, the production-order status
//! workflow, and the pure calculators shared between the backend and the
//! API client.

pub mod calc;
pub mod models;
pub mod types;
pub mod validation;
pub mod workflow;

pub use calc::*;
pub use models::*;
pub use types::*;
pub use validation::*;
pub use workflow::*;
