use pitstop_core::{ConfigError, SiteConfig};

const SITE_JSON: &str = include_str!("../static/site.json");

/// Parse and validate the embedded site config.
///
/// # Errors
/// Returns the parse or validation failure.
pub fn embedded_site_config() -> Result<SiteConfig, ConfigError> {
    SiteConfig::from_json(SITE_JSON)
}

/// The embedded site config, or the built-in defaults if it is unusable.
#[must_use]
pub fn load_site_config() -> SiteConfig {
    embedded_site_config().unwrap_or_else(|err| {
        log::error!("Invalid site config, using defaults: {err}");
        SiteConfig::default()
    })
}
