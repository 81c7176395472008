//! Process-level services shared by the REVEL8 binaries: configuration
//! parsed once at startup, and logger initialization.

pub mod config;
pub mod logging;

pub use config::Config;
