//! Site configuration: section registry, reading selectors, font bounds.

use serde::{Deserialize, Serialize};

/// Section shown by the "back to main menu" buttons.
pub const MENU_SECTION_ID: &str = "menu-principal-section";
/// Section shown by the "back to detail index" buttons.
pub const DETAILS_SECTION_ID: &str = "manual-pitstop-detalhes-section";

/// Every top-level section the navigator manages, in page order.
pub const SECTION_IDS: &[&str] = &[
    "capa-section",
    MENU_SECTION_ID,
    DETAILS_SECTION_ID,
    "placeholder-content-section",
    "jornada-cliente-aa-content-section",
    "inbound30-content-main",
    "outbound30-content-main",
    "inbound60-content-main",
    "outbound60-content-main",
    "inbound90-content-main",
    "outbound90-content-main",
    "playbook-sec-1-content-main",
    "playbook-sec-arremaq-content-main",
    "playbook-sec-2-content-main",
    "playbook-sec-7-content-main",
    "playbook-sec-8-content-main",
    "playbook-sec-9-content-main",
    "playbook-sec-10-content-main",
    "playbook-sec-11-content-main",
    "box-identidade-content-section",
    "academia-repassadores-content-section",
    "training-center-content-section",
    "ai-tool-interaction-section",
    "gemini-tools-section",
    "openai-tools-section",
    "jira-tools-section",
    "slack-tools-section",
    "google-tools-section",
    "hubspot-tools-section",
    "apollo-tools-section",
];

/// Elements whose text is read aloud.
pub const READABLE_SELECTORS: &str = concat!(
    "h1, h2, h3, h4, h5, h6, p, li, strong, span.sentence-emoji + span, ",
    ".card-base-title, .card-base-description, .highlight-box-base p, ",
    ".interactive-summary strong, .interactive-content p",
);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid site config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("site config rejected: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub min_percent: f64,
    pub max_percent: f64,
    pub step_percent: f64,
    /// Browser default root size the percentages are relative to.
    pub base_px: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            min_percent: 60.0,
            max_percent: 140.0,
            step_percent: 10.0,
            base_px: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub sections: Vec<String>,
    pub menu_section: String,
    pub details_section: String,
    pub readable_selectors: String,
    pub speech_lang: String,
    pub font: FontConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            sections: SECTION_IDS.iter().map(ToString::to_string).collect(),
            menu_section: MENU_SECTION_ID.to_string(),
            details_section: DETAILS_SECTION_ID.to_string(),
            readable_selectors: READABLE_SELECTORS.to_string(),
            speech_lang: "pt-BR".to_string(),
            font: FontConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails [`SiteConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the registry and font bounds for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sections.is_empty() {
            return Err(ConfigError::Invalid("section registry is empty".into()));
        }
        for target in [&self.menu_section, &self.details_section] {
            if !self.sections.contains(target) {
                return Err(ConfigError::Invalid(format!(
                    "back target '{target}' is not a registered section"
                )));
            }
        }
        let font = &self.font;
        if !(font.min_percent > 0.0 && font.min_percent <= font.max_percent) {
            return Err(ConfigError::Invalid(format!(
                "font bounds {}..{} are inverted or non-positive",
                font.min_percent, font.max_percent
            )));
        }
        if font.base_px <= 0.0 {
            return Err(ConfigError::Invalid("font base must be positive".into()));
        }
        Ok(())
    }
}
