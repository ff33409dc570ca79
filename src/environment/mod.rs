//! Isolated trial environments.
//!
//! Every trial gets a fresh virtual environment that is torn down when the
//! trial ends, so no files or metadata from one trial leak into the next.

pub mod backend;
pub mod executor;
pub mod venv;

pub use backend::{build_backend_metadata, BuildSystem};
pub use executor::{resolve_interpreter, TrialExecutor, VenvExecutor};
pub use venv::Venv;
