//! Command implementations for recsync CLI

pub mod check;
pub mod introspect;
pub mod sync;

pub use check::run_check;
pub use introspect::{run_collections, run_fields, run_schema};
pub use sync::run_sync;
