use pitstop_core::headless::{CueLog, HeadlessPage};
use pitstop_core::storage::{FONT_SIZE_KEY, THEME_KEY};
use pitstop_core::{
    Cue, FontConfig, FontScaler, KeyValueStore, MemoryStore, Preferences, Theme, ThemeManager,
};

fn scaler(
    store: &MemoryStore,
    page: &HeadlessPage,
    cues: &CueLog,
) -> FontScaler<MemoryStore, HeadlessPage, CueLog> {
    FontScaler::new(
        Preferences::new(store.clone()),
        page.clone(),
        cues.clone(),
        FontConfig::default(),
    )
}

#[test]
fn repeated_increases_clamp_at_max() {
    let (store, page, cues) = (MemoryStore::new(), HeadlessPage::new(), CueLog::new());
    let fonts = scaler(&store, &page, &cues);
    let mut last = 0.0;
    for _ in 0..10 {
        last = fonts.increase();
        assert!((60.0..=140.0).contains(&last));
    }
    assert_eq!(last, 140.0);
    assert_eq!(page.inline_font_percent(), Some(140.0));
    assert_eq!(
        Preferences::new(store).read::<f64>(FONT_SIZE_KEY),
        Some(140.0)
    );
    assert_eq!(cues.cues(), vec![Cue::Click; 10]);
}

#[test]
fn repeated_decreases_floor_at_min() {
    let (store, page, cues) = (MemoryStore::new(), HeadlessPage::new(), CueLog::new());
    let fonts = scaler(&store, &page, &cues);
    let mut last = 0.0;
    for _ in 0..10 {
        last = fonts.decrease();
    }
    assert_eq!(last, 60.0);
    assert_eq!(page.inline_font_percent(), Some(60.0));
}

#[test]
fn adjustment_starts_from_computed_size() {
    let (store, page, cues) = (MemoryStore::new(), HeadlessPage::new(), CueLog::new());
    page.set_root_font_px(20.0);
    let fonts = scaler(&store, &page, &cues);
    assert_eq!(fonts.current_percent(), 125.0);
    assert_eq!(fonts.adjust(10.0), 135.0);
    assert_eq!(fonts.adjust(-200.0), 60.0);
}

#[test]
fn restore_applies_and_clamps_saved_size() {
    let (store, page, cues) = (MemoryStore::new(), HeadlessPage::new(), CueLog::new());
    let fonts = scaler(&store, &page, &cues);
    assert_eq!(fonts.restore(), None);
    assert_eq!(page.inline_font_percent(), None);

    store.set_item(FONT_SIZE_KEY, "120").unwrap();
    assert_eq!(fonts.restore(), Some(120.0));
    assert_eq!(page.inline_font_percent(), Some(120.0));

    store.set_item(FONT_SIZE_KEY, "300").unwrap();
    assert_eq!(fonts.restore(), Some(140.0));
    assert!(cues.cues().is_empty());
}

#[test]
fn alternating_steps_persist_exactly_what_is_applied() {
    for start_px in [16.0, 13.3] {
        let (store, page, cues) = (MemoryStore::new(), HeadlessPage::new(), CueLog::new());
        page.set_root_font_px(start_px);
        let fonts = scaler(&store, &page, &cues);
        let prefs = Preferences::new(store.clone());
        for step in 0..12 {
            let applied = if step % 3 == 2 {
                fonts.decrease()
            } else {
                fonts.increase()
            };
            assert_eq!(prefs.read::<f64>(FONT_SIZE_KEY), Some(applied));
            assert_eq!(page.inline_font_percent(), Some(applied));
        }
    }
}

#[test]
fn theme_falls_back_to_system_preference() {
    let store = MemoryStore::new();
    let page = HeadlessPage::new().prefers_dark(true);
    let themes = ThemeManager::new(Preferences::new(store.clone()), page.clone());
    assert_eq!(themes.initialize(&page), Theme::Dark);
    assert_eq!(page.theme(), Some(Theme::Dark));
    assert!(page.toggle_icon().unwrap().contains("fa-sun"));
    // Resolution alone never persists.
    assert!(store.is_empty());
}

#[test]
fn saved_theme_wins_over_system_preference() {
    let store = MemoryStore::new();
    Preferences::new(store.clone()).write(THEME_KEY, Theme::Light);
    let page = HeadlessPage::new().prefers_dark(true);
    let themes = ThemeManager::new(Preferences::new(store), page.clone());
    assert_eq!(themes.initialize(&page), Theme::Light);
    assert!(page.toggle_icon().unwrap().contains("fa-moon"));
}

#[test]
fn toggling_twice_restores_original_theme() {
    let store = MemoryStore::new();
    let page = HeadlessPage::new();
    let themes = ThemeManager::new(Preferences::new(store.clone()), page.clone());
    let original = themes.initialize(&page);

    assert_eq!(themes.toggle(), original.toggled());
    assert_eq!(themes.saved(), Some(original.toggled()));
    assert_eq!(themes.toggle(), original);
    assert_eq!(page.theme(), Some(original));
    assert_eq!(store.raw(THEME_KEY).as_deref(), Some("\"light\""));

    let transitions = page.transitions();
    assert_eq!(transitions.len(), 3);
    assert!(
        transitions
            .iter()
            .all(|(class, ms)| class == "theme-transition-active" && *ms == 500)
    );
}

#[test]
fn apply_without_toggle_control_only_touches_root() {
    let page = HeadlessPage::new().without_toggle();
    let themes = ThemeManager::new(Preferences::new(MemoryStore::new()), page.clone());
    themes.apply(Theme::Dark);
    assert_eq!(page.theme(), Some(Theme::Dark));
    assert_eq!(page.toggle_icon(), None);
}
