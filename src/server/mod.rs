//! Server module for building the admin HTTP surface
//!
//! Provides a `ServerBuilder` that merges health routes with the
//! list/form-action routes of every registered dataset.

pub mod builder;
pub mod router;

pub use builder::ServerBuilder;
pub use router::{DatasetRouteState, dataset_routes, payload_from_multipart};
