use crate::Config;
use crate::error::{ErrorKind, Result};

const PLACEHOLDER: &str = "{id}";

/// Checks values that parse fine but can't work:
/// - both endpoint URLs contain the `{id}` placeholder,
/// - the HTTP timeout is not zero,
/// - the template is not blank.
///
/// Template *syntax* is checked when it is compiled, not here.
pub fn validate(config: &Config) -> Result<()> {
    for (key, url) in [("endpoints.work_url", &config.endpoints.work_url), ("endpoints.announce_url", &config.endpoints.announce_url)]
    {
        if !url.contains(PLACEHOLDER) {
            exn::bail!(ErrorKind::Invalid(format!("{key} must contain {PLACEHOLDER}")));
        }
    }
    if config.http.timeout_secs == 0 {
        exn::bail!(ErrorKind::Invalid("http.timeout_secs cannot be 0".to_string()));
    }
    if config.template.trim().is_empty() {
        exn::bail!(ErrorKind::Invalid("template cannot be empty".to_string()));
    }
    Ok(())
}
