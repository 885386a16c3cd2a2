//! CLI command implementations

pub mod apply;
pub mod config;
pub mod packages;

pub use apply::execute as apply;
pub use config::execute as config;
pub use packages::execute as packages;
