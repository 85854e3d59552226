use pitstop_core::SiteConfig;
use pitstop_core::config::{DETAILS_SECTION_ID, MENU_SECTION_ID};
use pitstop_web::config::{embedded_site_config, load_site_config};

#[test]
fn embedded_config_matches_built_in_defaults() {
    let embedded = embedded_site_config().expect("site.json parses and validates");
    assert_eq!(embedded, SiteConfig::default());
}

#[test]
fn loaded_config_registers_back_targets() {
    let config = load_site_config();
    assert!(config.sections.iter().any(|id| id == MENU_SECTION_ID));
    assert!(config.sections.iter().any(|id| id == DETAILS_SECTION_ID));
    assert_eq!(config.speech_lang, "pt-BR");
    assert!(config.font.min_percent < config.font.max_percent);
}
