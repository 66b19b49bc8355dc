//! Explicit session state.
//!
//! A [`Session`] owns everything the playground mutates: the sources, the
//! active tab, the layout, the error history, and which isolated context is
//! currently loaded. The run controller and relay live in [`crate::run`] as
//! further methods on this type.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PlaygroundConfig;
use crate::error::{PlaygroundError, Result};
use crate::history::ErrorHistory;
use crate::record::{Clock, SystemClock, Timestamp};
use crate::run::ContextId;
use crate::share;
use crate::source::{ActiveTab, SourceSet};
use crate::template;

/// Presentation mode for the editor and preview panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutMode {
    #[default]
    SideBySide,
    StackedPreview,
}

impl LayoutMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::SideBySide => Self::StackedPreview,
            Self::StackedPreview => Self::SideBySide,
        }
    }

    /// Caption for the control that switches *to* the other mode.
    #[must_use]
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::SideBySide => "Full Preview",
            Self::StackedPreview => "Side by Side",
        }
    }
}

#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    pub(crate) config: PlaygroundConfig,
    pub(crate) sources: SourceSet,
    pub(crate) active_tab: ActiveTab,
    pub(crate) layout: LayoutMode,
    pub(crate) history: ErrorHistory,
    pub(crate) last_run: Option<Timestamp>,
    pub(crate) loaded: Option<ContextId>,
    pub(crate) next_context: u64,
    pub(crate) clock: C,
}

impl Default for Session<SystemClock> {
    fn default() -> Self {
        Self::new(PlaygroundConfig::default(), SystemClock)
    }
}

impl<C: Clock> Session<C> {
    /// Start a session with the default sources, or the configured initial
    /// template if it exists.
    pub fn new(config: PlaygroundConfig, clock: C) -> Self {
        let sources = config
            .initial_template
            .as_deref()
            .and_then(|name| {
                let found = template::find(name);
                if found.is_none() {
                    warn!(
                        target: "playground::session",
                        template = name,
                        "configured initial template not found; using defaults"
                    );
                }
                found
            })
            .map(|t| t.sources.clone())
            .unwrap_or_default();
        Self::with_sources(config, sources, clock)
    }

    pub fn with_sources(config: PlaygroundConfig, sources: SourceSet, clock: C) -> Self {
        let history = ErrorHistory::with_capacity(config.history_capacity);
        Self {
            config,
            sources,
            active_tab: ActiveTab::default(),
            layout: LayoutMode::default(),
            history,
            last_run: None,
            loaded: None,
            next_context: 1,
            clock,
        }
    }

    /// Start a session seeded from a share link. The link only wins when it
    /// carries all three parameters; otherwise this behaves like
    /// [`Session::new`].
    pub fn from_share_link(url: &str, config: PlaygroundConfig, clock: C) -> Result<Self> {
        match share::decode_share_link(url, &config.share)? {
            Some(sources) => {
                info!(target: "playground::session", "seeded sources from share link");
                Ok(Self::with_sources(config, sources, clock))
            }
            None => {
                debug!(
                    target: "playground::session",
                    "share link incomplete; keeping default sources"
                );
                Ok(Self::new(config, clock))
            }
        }
    }

    #[must_use]
    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut SourceSet {
        &mut self.sources
    }

    #[must_use]
    pub fn active_tab(&self) -> ActiveTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: ActiveTab) {
        self.active_tab = tab;
    }

    /// Content for the editing surface.
    #[must_use]
    pub fn active_content(&self) -> &str {
        self.sources.get(self.active_tab)
    }

    /// Content-changed callback from the editing surface. Never triggers a
    /// run.
    pub fn edit_active(&mut self, text: String) {
        self.sources.set(self.active_tab, text);
    }

    /// Overwrite all three buffers with the named template.
    pub fn apply_template(&mut self, name: &str) -> Result<()> {
        let template =
            template::find(name).ok_or_else(|| PlaygroundError::TemplateNotFound(name.to_owned()))?;
        self.sources = template.sources.clone();
        info!(target: "playground::session", template = name, "applied template");
        Ok(())
    }

    #[must_use]
    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn toggle_layout(&mut self) -> LayoutMode {
        self.layout = self.layout.toggled();
        self.layout
    }

    #[must_use]
    pub fn history(&self) -> &ErrorHistory {
        &self.history
    }

    pub fn clear_error(&mut self) {
        self.history.clear_current();
    }

    pub fn select_error(&mut self, id: crate::history::RecordId) -> bool {
        self.history.select(id)
    }

    #[must_use]
    pub fn last_run(&self) -> Option<Timestamp> {
        self.last_run
    }

    /// The isolated context currently receiving notifications, if any.
    #[must_use]
    pub fn loaded_context(&self) -> Option<ContextId> {
        self.loaded
    }

    /// Share link for the current sources.
    pub fn share_link(&self, base_url: &str) -> Result<String> {
        share::encode_share_link(base_url, &self.sources, &self.config.share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ManualClock;

    fn session() -> Session<ManualClock> {
        Session::new(PlaygroundConfig::default(), ManualClock::default())
    }

    #[test]
    fn edits_follow_the_active_tab() {
        let mut s = session();
        s.set_active_tab(ActiveTab::Script);
        s.edit_active("console.log(1)".into());
        assert_eq!(s.sources().script, "console.log(1)");
        assert_eq!(s.active_content(), "console.log(1)");
        assert_eq!(s.sources().markup, SourceSet::default().markup);
    }

    #[test]
    fn template_overwrites_every_field() {
        let mut s = session();
        s.sources_mut().style = "edited".into();
        s.apply_template("Counter App").unwrap();
        assert_eq!(s.sources(), &template::find("Counter App").unwrap().sources);
    }

    #[test]
    fn unknown_template_leaves_sources_alone() {
        let mut s = session();
        let before = s.sources().clone();
        let err = s.apply_template("Nope").unwrap_err();
        assert!(matches!(err, PlaygroundError::TemplateNotFound(name) if name == "Nope"));
        assert_eq!(s.sources(), &before);
    }

    #[test]
    fn layout_toggles_between_two_modes() {
        let mut s = session();
        assert_eq!(s.layout(), LayoutMode::SideBySide);
        assert_eq!(s.layout().toggle_label(), "Full Preview");
        assert_eq!(s.toggle_layout(), LayoutMode::StackedPreview);
        assert_eq!(s.toggle_layout(), LayoutMode::SideBySide);
    }

    #[test]
    fn initial_template_from_config() {
        let config = PlaygroundConfig {
            initial_template: Some("Todo List".into()),
            ..PlaygroundConfig::default()
        };
        let s = Session::new(config, ManualClock::default());
        assert_eq!(s.sources(), &template::find("Todo List").unwrap().sources);

        let config = PlaygroundConfig {
            initial_template: Some("Missing".into()),
            ..PlaygroundConfig::default()
        };
        let s = Session::new(config, ManualClock::default());
        assert_eq!(s.sources(), &SourceSet::default());
    }

    #[test]
    fn history_capacity_comes_from_config() {
        let config = PlaygroundConfig {
            history_capacity: 2,
            ..PlaygroundConfig::default()
        };
        let s = Session::new(config, ManualClock::default());
        assert_eq!(s.history().capacity(), 2);
    }
}
