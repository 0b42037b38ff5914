//! # Harbor Host
//!
//! Script lifecycle and request serving for the Harbor script host:
//! - [`Script`]: the contract a deployed script implements (`main` for
//!   route registration, `fallback` for unclaimed requests)
//! - [`ScriptHost`]: loads a script once, seals the router, and serves
//!   requests with a per-request deadline; every request gets a response
//! - TOML configuration with environment expansion
//! - Filesystem-backed static assets

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod config;
pub mod host;
pub mod logging;
pub mod script;
pub mod static_fs;

pub use config::{load_from_file, load_from_str, HostConfig, LimitsConfig, LoggingConfig, StaticFilesConfig};
pub use host::ScriptHost;
pub use script::Script;
pub use static_fs::FsStaticAssets;
