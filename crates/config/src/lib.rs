//! Layered configuration.
//!
//! Values are merged from (later wins):
//! 1. built-in defaults,
//! 2. a TOML file (by default `config.toml` in the per-user config
//!    directory, see [`default_config_path`]),
//! 3. `DLORG_`-prefixed environment variables, with `__` separating nested
//!    keys (`DLORG_HTTP__TIMEOUT_SECS=10`).

pub mod error;
mod loader;
mod types;
mod validate;

pub use crate::loader::{default_config_path, load, load_from_str};
pub use crate::types::{Config, EndpointsConfig, HttpConfig, default_cache_path};
pub use crate::validate::validate;
