//! Page-lifetime state shared by every exported entry point.

use crate::a11y::{BrowserAlerts, DomFontSink, DomReadControl, collect_blocks};
use crate::audio::{PageSounds, ToneEngine};
use crate::config::load_site_config;
use crate::dom::{element_by_id, html_element_by_id, js_error_message, on_click};
use crate::navigation::{DomSectionView, wire_controls};
use crate::speech::WebSpeech;
use crate::storage::BrowserStore;
use crate::theme::{DomThemeSink, MediaSystemTheme, wire_toggle};
use once_cell::unsync::OnceCell;
use pitstop_core::{
    FontScaler, NavParams, NavTrigger, Navigator, Preferences, ReadAloud, ReadControl, SiteConfig,
    SoundBoard, Theme, ThemeManager, UtteranceEvent, UtteranceId, unique_emoji,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

pub type WebThemes = ThemeManager<BrowserStore, DomThemeSink>;
pub type WebFonts = FontScaler<BrowserStore, DomFontSink, PageSounds>;
pub type WebReader = ReadAloud<WebSpeech, DomReadControl, BrowserAlerts, PageSounds>;
pub type WebNavigator = Navigator<DomSectionView, PageSounds>;

struct ReaderBinding {
    reader: RefCell<WebReader>,
    container_id: String,
}

pub struct PageSession {
    config: SiteConfig,
    sounds: PageSounds,
    prefs: Preferences<BrowserStore>,
    fonts: WebFonts,
    rng: RefCell<SmallRng>,
    themes: RefCell<Option<Rc<WebThemes>>>,
    reader: RefCell<Option<Rc<ReaderBinding>>>,
    navigator: OnceCell<Rc<RefCell<WebNavigator>>>,
    navigation_wired: Cell<bool>,
}

thread_local! {
    static SESSION: OnceCell<Rc<PageSession>> = OnceCell::new();
}

/// The session for this page, created on first use.
#[must_use]
pub fn current() -> Rc<PageSession> {
    SESSION.with(|cell| {
        Rc::clone(cell.get_or_init(|| Rc::new(PageSession::new(load_site_config()))))
    })
}

fn seed_from_math_random() -> u64 {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
    seed
}

impl PageSession {
    #[must_use]
    pub fn new(config: SiteConfig) -> Self {
        let sounds: PageSounds = Rc::new(SoundBoard::new(ToneEngine::default()));
        let prefs = Preferences::new(BrowserStore);
        let fonts = FontScaler::new(
            prefs.clone(),
            DomFontSink,
            Rc::clone(&sounds),
            config.font.clone(),
        );
        Self {
            config,
            sounds,
            prefs,
            fonts,
            rng: RefCell::new(SmallRng::seed_from_u64(seed_from_math_random())),
            themes: RefCell::new(None),
            reader: RefCell::new(None),
            navigator: OnceCell::new(),
            navigation_wired: Cell::new(false),
        }
    }

    #[must_use]
    pub const fn sounds(&self) -> &PageSounds {
        &self.sounds
    }

    #[must_use]
    pub const fn prefs(&self) -> &Preferences<BrowserStore> {
        &self.prefs
    }

    pub fn unique_emoji(&self, pool: &[String], recent: &mut VecDeque<String>) -> String {
        unique_emoji(pool, recent, &mut *self.rng.borrow_mut())
    }

    /// Apply `theme` without persisting it. Without a toggle id the
    /// initialized manager's toggle, if any, gets the icon.
    pub fn apply_theme(&self, theme: Theme, toggle_id: Option<&str>) {
        match (toggle_id, self.themes.borrow().as_ref()) {
            (None, Some(themes)) => themes.apply(theme),
            _ => ThemeManager::new(self.prefs.clone(), DomThemeSink::new(toggle_id)).apply(theme),
        }
    }

    /// Resolve and apply the initial theme, then wire the toggle control.
    pub fn initialize_themes(&self, toggle_id: &str) -> Theme {
        let themes = Rc::new(ThemeManager::new(
            self.prefs.clone(),
            DomThemeSink::new(Some(toggle_id)),
        ));
        let applied = themes.initialize(&MediaSystemTheme);
        let handler = Rc::clone(&themes);
        wire_toggle(themes.sink(), move || {
            handler.toggle();
        });
        self.themes.replace(Some(themes));
        applied
    }

    pub fn adjust_font(&self, delta: f64) -> f64 {
        self.fonts.adjust(delta)
    }

    /// Restore the saved font size, then wire the font and read-aloud controls.
    pub fn initialize_accessibility(
        self: &Rc<Self>,
        increase_id: &str,
        decrease_id: &str,
        read_id: &str,
        container_id: &str,
    ) {
        self.fonts.restore();
        let step = self.config.font.step_percent;
        self.wire_button(increase_id, move |session| {
            session.adjust_font(step);
        });
        self.wire_button(decrease_id, move |session| {
            session.adjust_font(-step);
        });

        let engine = WebSpeech::detect();
        let control = DomReadControl::new(html_element_by_id(read_id));
        let binding = Rc::new(ReaderBinding {
            reader: RefCell::new(ReadAloud::new(
                engine.clone(),
                control.clone(),
                BrowserAlerts,
                Rc::clone(&self.sounds),
                self.config.speech_lang.clone(),
            )),
            container_id: container_id.to_string(),
        });

        match engine {
            Some(engine) => {
                let weak = Rc::downgrade(&binding);
                engine.set_listener(Rc::new(move |id: UtteranceId, event: UtteranceEvent| {
                    let Some(binding) = weak.upgrade() else {
                        return;
                    };
                    match binding.reader.try_borrow_mut() {
                        Ok(mut reader) => reader.handle_event(id, event),
                        Err(_) => log::debug!("Reader busy, dropping {event:?}"),
                    }
                }));
                self.wire_button(read_id, PageSession::read_page);
            }
            None => control.hide(),
        }
        self.reader.replace(Some(binding));
    }

    /// Toggle reading of the configured content container.
    pub fn read_page(&self) {
        let Some(binding) = self.reader.borrow().clone() else {
            log::warn!("Read-aloud controls are not initialized.");
            return;
        };
        let Ok(mut reader) = binding.reader.try_borrow_mut() else {
            return;
        };
        let blocks = if reader.is_supported() && !reader.is_speaking() {
            let Some(container) = element_by_id(&binding.container_id) else {
                log::error!("Content container for reading not found.");
                return;
            };
            collect_blocks(&container, &self.config.readable_selectors)
        } else {
            Vec::new()
        };
        reader.toggle(&blocks);
    }

    fn navigator(&self) -> &Rc<RefCell<WebNavigator>> {
        self.navigator.get_or_init(|| {
            Rc::new(RefCell::new(Navigator::new(
                &self.config,
                DomSectionView,
                Rc::clone(&self.sounds),
            )))
        })
    }

    /// Returns whether the section is now showing.
    pub fn show_section(&self, id: &str, params: NavParams) -> bool {
        let Ok(mut navigator) = self.navigator().try_borrow_mut() else {
            log::warn!("Navigation already in progress, ignoring '{id}'.");
            return false;
        };
        navigator.show_section(id, params).is_ok()
    }

    /// Sync with the visible section and wire every navigation control once.
    pub fn initialize_navigation(&self) {
        let navigator = Rc::clone(self.navigator());
        navigator.borrow_mut().sync();
        if self.navigation_wired.replace(true) {
            return;
        }
        wire_controls(&NavTrigger::MARKERS, move |trigger| {
            if let Ok(mut navigator) = navigator.try_borrow_mut() {
                // Failures are logged by the navigator.
                let _ = navigator.handle(trigger);
            }
        });
    }

    fn wire_button(self: &Rc<Self>, id: &str, action: impl Fn(&Self) + 'static) {
        let Some(button) = element_by_id(id) else {
            log::debug!("Control '{id}' not found, skipping.");
            return;
        };
        let session = Rc::downgrade(self);
        let wired = on_click(&button, move |_| {
            if let Some(session) = session.upgrade() {
                action(&session);
            }
        });
        if let Err(err) = wired {
            log::error!("Could not wire '{id}': {}", js_error_message(&err));
        }
    }
}
