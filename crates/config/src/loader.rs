use crate::Config;
use crate::error::{ErrorKind, Result};
use directories::BaseDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const ENV_PREFIX: &str = "DLORG_";
const ENV_SEPARATOR: &str = "__";

/// `{user config dir}/dlorg/config.toml`, or `None` when no home directory
/// can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join("dlorg").join("config.toml"))
}

/// Loads configuration from defaults, a TOML file and the environment.
///
/// An explicit `path` must exist. Without one, the file at
/// [`default_config_path`] is used if present and silently skipped otherwise.
#[instrument]
pub fn load(path: Option<&Path>) -> Result<Config> {
    let file = match path {
        Some(path) if !path.exists() => exn::bail!(ErrorKind::FileNotFound(path.to_path_buf())),
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|path| path.exists()),
    };
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(file) = &file {
        debug!(path = %file.display(), "reading configuration file");
        figment = figment.merge(Toml::file(file));
    }
    figment
        .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
        .extract()
        .or_raise(|| ErrorKind::Parse)
}

/// Loads configuration from a TOML string layered over the defaults. The
/// environment is not consulted.
pub fn load_from_str(toml: &str) -> Result<Config> {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::string(toml))
        .extract()
        .or_raise(|| ErrorKind::Parse)
}
