//! Section navigation: exactly one registered section is visible at a time.

use crate::config::SiteConfig;
use crate::sound::{Cue, CuePlayer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Class that hides a section.
pub const HIDDEN_CLASS: &str = "hidden";
/// Event dispatched on the document after a section is shown.
pub const SECTION_SHOWN_EVENT: &str = "sectionShown";

pub const NAVIGATE_MARKER: &str = "navigate-to-section";
pub const BACK_TO_MENU_MARKER: &str = "back-to-menu-principal";
pub const BACK_TO_DETAILS_MARKER: &str = "back-to-manual-pitstop-detalhes";
pub const PREVIOUS_MARKER: &str = "btn-nav-playbook-prev";
pub const NEXT_MARKER: &str = "btn-nav-playbook-next";
pub const TARGET_ATTRIBUTE: &str = "data-target-id";
pub const PARAMS_ATTRIBUTE: &str = "data-params";

/// Parameters forwarded with a navigation. Usually an object, but any JSON
/// value a control carries is passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavParams(Value);

impl NavParams {
    /// An empty object.
    #[must_use]
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set `key` when the params are an object. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        match &mut self.0 {
            Value::Object(map) => map.insert(key.into(), value.into()),
            _ => None,
        }
    }

    /// `{}` or `null`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for NavParams {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for NavParams {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("section '{0}' is not registered")]
    Unregistered(String),
    #[error("section with id '{0}' not found")]
    MissingElement(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered set of sections the navigator hides and shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRegistry {
    ids: Vec<SectionId>,
}

impl SectionRegistry {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self { ids: Vec::new() };
        for id in ids {
            let id = SectionId::new(id);
            if !registry.ids.contains(&id) {
                registry.ids.push(id);
            }
        }
        registry
    }

    #[must_use]
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.sections.iter().cloned())
    }

    /// Look up a registered section by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SectionId> {
        self.ids.iter().find(|s| s.as_str() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionId> {
        self.ids.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Payload of the `sectionShown` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionShown {
    pub section_id: String,
    pub params: NavParams,
}

/// The page surface the navigator drives.
pub trait SectionView {
    /// Whether an element with this id exists in the document.
    fn contains(&self, id: &SectionId) -> bool;
    fn is_hidden(&self, id: &SectionId) -> bool;
    fn set_hidden(&self, id: &SectionId, hidden: bool);
    fn scroll_to_top(&self);
    /// Re-run scroll animations, when an animation library is present.
    fn refresh_animations(&self);
    fn announce(&self, shown: &SectionShown);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentSection {
    /// Not yet synced with the page.
    Unknown,
    Showing(SectionId),
}

/// User intent decoded from a clicked control.
#[derive(Debug, Clone, PartialEq)]
pub enum NavTrigger {
    Navigate { target: String, params: NavParams },
    BackToMenu,
    BackToDetails,
    Previous,
    Next,
}

impl NavTrigger {
    /// Build the trigger for a control carrying `marker`.
    ///
    /// `target` and `params` are the raw `data-target-id` and `data-params`
    /// attributes. Returns `None` for unknown markers and navigate controls
    /// without a target.
    #[must_use]
    pub fn from_marker(marker: &str, target: Option<&str>, params: Option<&str>) -> Option<Self> {
        match marker {
            NAVIGATE_MARKER => {
                let target = target.filter(|t| !t.is_empty())?;
                Some(Self::Navigate {
                    target: target.to_string(),
                    params: parse_params(params),
                })
            }
            BACK_TO_MENU_MARKER => Some(Self::BackToMenu),
            BACK_TO_DETAILS_MARKER => Some(Self::BackToDetails),
            PREVIOUS_MARKER => Some(Self::Previous),
            NEXT_MARKER => Some(Self::Next),
            _ => None,
        }
    }

    /// Every marker class with a registered handler.
    pub const MARKERS: [&'static str; 5] = [
        NAVIGATE_MARKER,
        BACK_TO_MENU_MARKER,
        BACK_TO_DETAILS_MARKER,
        PREVIOUS_MARKER,
        NEXT_MARKER,
    ];
}

/// Decode `data-params`. Malformed JSON is logged and yields `{}`.
#[must_use]
pub fn parse_params(raw: Option<&str>) -> NavParams {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return NavParams::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => NavParams::from(value),
        Err(err) => {
            log::error!("Failed to parse navigation button params: {err}");
            NavParams::new()
        }
    }
}

pub struct Navigator<V, P> {
    registry: SectionRegistry,
    view: V,
    cues: P,
    current: CurrentSection,
    menu: SectionId,
    details: SectionId,
}

impl<V: SectionView, P: CuePlayer> Navigator<V, P> {
    pub fn new(config: &SiteConfig, view: V, cues: P) -> Self {
        Self {
            registry: SectionRegistry::from_config(config),
            view,
            cues,
            current: CurrentSection::Unknown,
            menu: SectionId::new(config.menu_section.clone()),
            details: SectionId::new(config.details_section.clone()),
        }
    }

    #[must_use]
    pub const fn current(&self) -> &CurrentSection {
        &self.current
    }

    /// Adopt whichever registered section the page currently shows.
    pub fn sync(&mut self) -> &CurrentSection {
        self.current = self
            .registry
            .iter()
            .find(|id| self.view.contains(id) && !self.view.is_hidden(id))
            .map_or(CurrentSection::Unknown, |id| {
                CurrentSection::Showing(id.clone())
            });
        &self.current
    }

    /// Hide every registered section except `id`, then reveal `id`.
    ///
    /// The target is validated before any visibility changes, so a bad id
    /// leaves the page as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not registered or not present in the page.
    pub fn show_section(
        &mut self,
        id: &str,
        params: NavParams,
    ) -> Result<SectionShown, NavigationError> {
        self.cues.play(Cue::Transition);

        let target = match self.validate(id) {
            Ok(target) => target,
            Err(err) => {
                log::error!("{err}");
                return Err(err);
            }
        };

        for section in self.registry.iter() {
            if section != &target && self.view.contains(section) {
                self.view.set_hidden(section, true);
            }
        }
        self.view.set_hidden(&target, false);
        self.view.scroll_to_top();
        self.view.refresh_animations();

        let shown = SectionShown {
            section_id: target.to_string(),
            params,
        };
        log::info!("Navigating to section: {} {:?}", shown.section_id, shown.params);
        self.view.announce(&shown);
        self.current = CurrentSection::Showing(target);
        Ok(shown)
    }

    /// Act on a decoded control click.
    ///
    /// # Errors
    ///
    /// Propagates [`Navigator::show_section`] failures.
    pub fn handle(&mut self, trigger: NavTrigger) -> Result<Option<SectionShown>, NavigationError> {
        match trigger {
            NavTrigger::Navigate { target, params } => self.show_section(&target, params).map(Some),
            NavTrigger::BackToMenu => {
                let menu = self.menu.clone();
                self.show_section(menu.as_str(), NavParams::new()).map(Some)
            }
            NavTrigger::BackToDetails => {
                let details = self.details.clone();
                self.show_section(details.as_str(), NavParams::new())
                    .map(Some)
            }
            NavTrigger::Previous => {
                self.cues.play(Cue::Transition);
                log::info!(
                    "Previous button clicked. Sequential navigation is not implemented yet."
                );
                Ok(None)
            }
            NavTrigger::Next => {
                self.cues.play(Cue::Transition);
                log::info!("Next button clicked. Sequential navigation is not implemented yet.");
                Ok(None)
            }
        }
    }

    fn validate(&self, id: &str) -> Result<SectionId, NavigationError> {
        let target = self
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| NavigationError::Unregistered(id.to_string()))?;
        if !self.view.contains(&target) {
            return Err(NavigationError::MissingElement(id.to_string()));
        }
        Ok(target)
    }
}
