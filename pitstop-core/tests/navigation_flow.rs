use pitstop_core::config::{DETAILS_SECTION_ID, MENU_SECTION_ID, SECTION_IDS};
use pitstop_core::headless::{CueLog, HeadlessPage};
use pitstop_core::navigation::{BACK_TO_DETAILS_MARKER, NAVIGATE_MARKER, PREVIOUS_MARKER};
use pitstop_core::{
    Cue, CurrentSection, NavParams, NavTrigger, NavigationError, Navigator, SectionId, SiteConfig,
};
use serde_json::json;

fn setup() -> (Navigator<HeadlessPage, CueLog>, HeadlessPage, CueLog) {
    let page = HeadlessPage::new().with_sections(SECTION_IDS.iter().copied());
    let cues = CueLog::new();
    let nav = Navigator::new(&SiteConfig::default(), page.clone(), cues.clone());
    (nav, page, cues)
}

#[test]
fn sync_adopts_the_visible_section() {
    let (mut nav, _page, _cues) = setup();
    assert_eq!(nav.current(), &CurrentSection::Unknown);
    assert_eq!(
        nav.sync(),
        &CurrentSection::Showing(SectionId::new("capa-section"))
    );
}

#[test]
fn showing_menu_leaves_exactly_that_section_visible() {
    let (mut nav, page, cues) = setup();
    let shown = nav
        .show_section(MENU_SECTION_ID, NavParams::new())
        .expect("menu exists");

    assert_eq!(page.visible_sections(), vec![MENU_SECTION_ID.to_string()]);
    assert_eq!(shown.section_id, MENU_SECTION_ID);
    assert_eq!(
        nav.current(),
        &CurrentSection::Showing(SectionId::new(MENU_SECTION_ID))
    );
    assert_eq!(page.scrolls(), 1);
    assert_eq!(page.animation_refreshes(), 1);
    assert_eq!(page.announcements(), vec![shown]);
    assert_eq!(cues.cues(), vec![Cue::Transition]);
}

#[test]
fn unknown_target_changes_nothing() {
    let (mut nav, page, cues) = setup();
    nav.sync();
    let before = page.section_states();

    let err = nav
        .show_section("nonexistent-id", NavParams::new())
        .unwrap_err();

    assert_eq!(err, NavigationError::Unregistered("nonexistent-id".into()));
    assert_eq!(page.section_states(), before);
    assert_eq!(
        nav.current(),
        &CurrentSection::Showing(SectionId::new("capa-section"))
    );
    assert!(page.announcements().is_empty());
    assert_eq!(page.scrolls(), 0);
    assert_eq!(cues.cues(), vec![Cue::Transition]);
}

#[test]
fn registered_but_absent_section_changes_nothing() {
    let page = HeadlessPage::new().with_sections([
        "capa-section",
        MENU_SECTION_ID,
        DETAILS_SECTION_ID,
    ]);
    let mut nav = Navigator::new(&SiteConfig::default(), page.clone(), CueLog::new());
    let before = page.section_states();

    let err = nav
        .show_section("gemini-tools-section", NavParams::new())
        .unwrap_err();

    assert_eq!(
        err,
        NavigationError::MissingElement("gemini-tools-section".into())
    );
    assert_eq!(page.section_states(), before);
}

#[test]
fn params_travel_with_the_announcement() {
    let (mut nav, page, _cues) = setup();
    let trigger = NavTrigger::from_marker(
        NAVIGATE_MARKER,
        Some("inbound30-content-main"),
        Some(r#"{"etapa": 2}"#),
    )
    .expect("navigate trigger");

    nav.handle(trigger).unwrap();

    let announced = page.announcements();
    assert_eq!(announced.len(), 1);
    assert_eq!(announced[0].section_id, "inbound30-content-main");
    assert_eq!(
        serde_json::to_value(&announced[0]).unwrap(),
        json!({"sectionId": "inbound30-content-main", "params": {"etapa": 2}})
    );
}

#[test]
fn non_object_params_are_forwarded_as_written() {
    let (mut nav, page, _cues) = setup();
    let trigger = NavTrigger::from_marker(
        NAVIGATE_MARKER,
        Some("inbound30-content-main"),
        Some(r#"["etapa", 2]"#),
    )
    .expect("navigate trigger");

    nav.handle(trigger).unwrap();

    let announced = page.announcements();
    assert_eq!(announced[0].params.as_value(), &json!(["etapa", 2]));
}

#[test]
fn back_buttons_target_fixed_sections() {
    let (mut nav, page, _cues) = setup();
    nav.handle(NavTrigger::BackToMenu).unwrap();
    assert_eq!(page.visible_sections(), vec![MENU_SECTION_ID.to_string()]);

    let trigger = NavTrigger::from_marker(BACK_TO_DETAILS_MARKER, None, None).unwrap();
    nav.handle(trigger).unwrap();
    assert_eq!(page.visible_sections(), vec![DETAILS_SECTION_ID.to_string()]);
}

#[test]
fn sequence_buttons_only_play_a_cue() {
    let (mut nav, page, cues) = setup();
    nav.sync();
    let before = page.section_states();

    let trigger = NavTrigger::from_marker(PREVIOUS_MARKER, None, None).unwrap();
    assert_eq!(nav.handle(trigger).unwrap(), None);
    assert_eq!(nav.handle(NavTrigger::Next).unwrap(), None);

    assert_eq!(page.section_states(), before);
    assert_eq!(cues.cues(), vec![Cue::Transition, Cue::Transition]);
}

#[test]
fn every_registered_section_can_be_shown_alone() {
    let (mut nav, page, _cues) = setup();
    for id in SECTION_IDS {
        nav.show_section(id, NavParams::new()).unwrap();
        assert_eq!(page.visible_sections(), vec![(*id).to_string()]);
    }
}
