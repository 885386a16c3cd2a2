//! Strata - dependency-aware installation orchestrator
//!
//! Installs packages onto targets together with everything they depend on.
//! Installers discover their dependencies incrementally; shared dependencies
//! are installed once, reference counted, and torn down in reverse order
//! once their last requester is gone.

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod installation;
pub mod landscape;
pub mod manager;
pub mod merge;
pub mod registry;
pub mod secrets;
pub mod target;
pub mod ui;
pub mod version;

pub use error::{StrataError, StrataResult};
pub use installation::{ApplyOutcome, Installation, InstallationHelper, Installer};
pub use manager::PackageManager;
pub use registry::Registry;
pub use target::Target;
