//! CLI command implementations

pub mod config;
pub mod status;
pub mod system_cache;

pub use config::execute as config;
pub use status::execute as status;
pub use system_cache::execute as system_cache;
