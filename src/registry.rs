/// Per-tab display state owned by the coordinator
use std::collections::HashMap;

use crate::tab_data::{Fetch, FormattedLink, TabDisplayState, TabId, TabInfo};
use crate::text::truncate;

/// Display state for every known tab plus the tab the menu reflects
///
/// Each fetch is stamped with a generation drawn from a registry-wide counter.
/// A reply is applied only while its stamp is still the tab's current one, so
/// replies from a superseded load (or from a closed tab whose id was reused)
/// are dropped.
#[derive(Debug, Default)]
pub struct Registry {
    tabs: HashMap<TabId, TabDisplayState>,
    active_tab: Option<TabId>,
    next_generation: u64,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab_id: TabId) {
        self.active_tab = Some(tab_id);
    }

    pub fn is_active(&self, tab_id: TabId) -> bool {
        self.active_tab == Some(tab_id)
    }

    pub fn get(&self, tab_id: TabId) -> Option<&TabDisplayState> {
        self.tabs.get(&tab_id)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn is_loading(&self, tab_id: TabId) -> bool {
        self.tabs.get(&tab_id).is_some_and(|state| state.is_loading)
    }

    pub fn is_menu_visible(&self, tab_id: TabId) -> bool {
        self.tabs.get(&tab_id).is_some_and(|state| state.is_menu_visible)
    }

    /// Menus may only be built for the active tab once it has finished loading
    pub fn can_render(&self, tab_id: TabId) -> bool {
        self.is_active(tab_id) && !self.is_loading(tab_id)
    }

    /// Start a fresh entry for a tab that began loading
    pub fn begin_loading(&mut self, tab_id: TabId) {
        let generation = self.bump_generation();
        let selection_generation = self.bump_generation();
        self.tabs.insert(
            tab_id,
            TabDisplayState {
                is_loading: true,
                generation,
                selection_generation,
                ..TabDisplayState::default()
            },
        );
    }

    pub fn finish_loading(&mut self, tab_id: TabId) {
        self.entry(tab_id).is_loading = false;
    }

    pub fn set_menu_visible(&mut self, tab_id: TabId, visible: bool) {
        self.entry(tab_id).is_menu_visible = visible;
    }

    /// Reset the page fields ahead of a title and formatted-link fetch
    ///
    /// Returns the generation both replies must carry to be applied.
    pub fn begin_fetch(&mut self, tab: &TabInfo) -> u64 {
        let generation = self.bump_generation();
        let state = self.entry(tab.id);
        state.url_text = truncate(&tab.url);
        state.title_text = Fetch::NotLoaded;
        state.formatted_link = Fetch::NotLoaded;
        state.generation = generation;
        generation
    }

    /// Returns false when the reply belongs to a superseded fetch
    pub fn store_title(&mut self, tab_id: TabId, generation: u64, title: String) -> bool {
        match self.current(tab_id, generation) {
            Some(state) => {
                state.title_text = Fetch::from_text(title);
                true
            }
            None => false,
        }
    }

    /// Returns false when the reply belongs to a superseded fetch
    pub fn store_formatted_link(
        &mut self,
        tab_id: TabId,
        generation: u64,
        link: Option<FormattedLink>,
    ) -> bool {
        match self.current(tab_id, generation) {
            Some(state) => {
                state.formatted_link = Fetch::from_link(link);
                true
            }
            None => false,
        }
    }

    /// Stamp an outgoing selection request
    pub fn begin_selection_request(&mut self, tab_id: TabId) -> u64 {
        let generation = self.bump_generation();
        self.entry(tab_id).selection_generation = generation;
        generation
    }

    /// Apply a requested selection unless a newer one arrived meanwhile
    pub fn store_requested_selection(
        &mut self,
        tab_id: TabId,
        generation: u64,
        selection: String,
    ) -> bool {
        match self.tabs.get_mut(&tab_id) {
            Some(state) if state.selection_generation == generation => {
                state.selection_text = Fetch::from_text(selection);
                true
            }
            _ => false,
        }
    }

    /// Apply a selection pushed by the page; supersedes requests in flight
    pub fn push_selection(&mut self, tab_id: TabId, selection: String) {
        let generation = self.bump_generation();
        let state = self.entry(tab_id);
        state.selection_text = Fetch::from_text(selection);
        state.selection_generation = generation;
    }

    /// Drop a closed tab's entry
    pub fn evict(&mut self, tab_id: TabId) -> bool {
        if self.active_tab == Some(tab_id) {
            self.active_tab = None;
        }
        self.tabs.remove(&tab_id).is_some()
    }

    fn entry(&mut self, tab_id: TabId) -> &mut TabDisplayState {
        self.tabs.entry(tab_id).or_default()
    }

    fn current(&mut self, tab_id: TabId, generation: u64) -> Option<&mut TabDisplayState> {
        self.tabs
            .get_mut(&tab_id)
            .filter(|state| state.generation == generation)
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}
