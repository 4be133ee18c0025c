/// Tab state coordinator: keeps the action button and context menu in sync
/// with the active tab
///
/// Every platform event is handled by one async method. Work only suspends
/// inside `Host` calls, and after each of those the handler re-checks that
/// the tab is still active (and not loading) before touching visible UI.
/// Replies that belong to a superseded fetch are dropped by the registry.
use std::cell::RefCell;

use log::{debug, info};

use crate::error::{FlinkError, Result};
use crate::menu::{ClipboardPayload, MenuOption, OptionId, build_menu_options};
use crate::protocol::MenuEntry;
use crate::registry::Registry;
use crate::tab_data::{FormattedLink, TabChange, TabDisplayState, TabId, TabInfo};
use crate::text::truncate;


/// Browser surface the coordinator drives
///
/// Fetches resolve to `None` when the page did not answer. They may also never
/// resolve at all, which leaves the matching field unloaded.
#[allow(async_fn_in_trait)]
pub trait Host {
    /// Active tab of the current window
    async fn active_tab(&self) -> Option<TabInfo>;

    async fn get_tab(&self, tab_id: TabId) -> Option<TabInfo>;

    async fn fetch_open_graph_title(&self, tab_id: TabId) -> Option<String>;

    async fn fetch_formatted_link(&self, tab_id: TabId) -> Option<FormattedLink>;

    async fn fetch_selection(&self, tab_id: TabId) -> Option<String>;

    async fn write_clipboard(&self, payload: &ClipboardPayload) -> Result<()>;

    fn show_action(&self, tab_id: TabId);

    fn hide_action(&self, tab_id: TabId);

    /// Remove every context menu item
    fn clear_menu(&self);

    fn add_menu_item(&self, entry: &MenuEntry);
}

pub struct Coordinator<H> {
    host: H,
    registry: RefCell<Registry>,
}

impl<H: Host> Coordinator<H> {
    pub fn new(host: H) -> Self {
        Coordinator {
            host,
            registry: RefCell::new(Registry::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.registry.borrow().active_tab()
    }

    pub fn tab_state(&self, tab_id: TabId) -> Option<TabDisplayState> {
        self.registry.borrow().get(tab_id).cloned()
    }

    pub fn tracked_tabs(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Point at whatever tab is active when the extension starts
    pub async fn initialize(&self) {
        if let Some(tab) = self.host.active_tab().await {
            debug!("Initial active tab: {}", tab.id);
            self.registry.borrow_mut().set_active_tab(tab.id);
        }
    }

    /// Dispatch a `tabs.onUpdated` event
    pub async fn on_tab_updated(&self, tab_id: TabId, change: &TabChange, tab: &TabInfo) {
        if change.is_loading() {
            self.on_tab_loading_started(tab_id);
        }

        if change.is_complete() {
            self.on_tab_loading_completed(tab_id, tab).await;
        } else if change.title.is_some() {
            self.on_tab_title_changed(tab_id, tab).await;
        }
    }

    pub fn on_tab_loading_started(&self, tab_id: TabId) {
        debug!("Tab is loading, hiding page action button: {}", tab_id);
        let is_active = {
            let mut registry = self.registry.borrow_mut();
            registry.begin_loading(tab_id);
            registry.is_active(tab_id)
        };

        self.host.hide_action(tab_id);
        if is_active {
            self.host.clear_menu();
        }
    }

    pub async fn on_tab_loading_completed(&self, tab_id: TabId, tab: &TabInfo) {
        debug!("Tab loading is complete: {}", tab_id);
        {
            let mut registry = self.registry.borrow_mut();
            registry.finish_loading(tab_id);
            // Shown even for background tabs; only the menu is gated on focus
            registry.set_menu_visible(tab_id, true);
        }
        self.host.show_action(tab_id);

        let active = self.host.active_tab().await;
        if active.map(|t| t.id) != Some(tab_id) {
            debug!("Completed tab {} is not active, leaving menu alone", tab_id);
            return;
        }
        if self.registry.borrow().is_loading(tab_id) {
            return;
        }

        self.registry.borrow_mut().set_active_tab(tab_id);
        self.host.clear_menu();
        self.load_page(tab).await;
    }

    pub async fn on_tab_title_changed(&self, tab_id: TabId, tab: &TabInfo) {
        let refresh = {
            let registry = self.registry.borrow();
            registry.is_menu_visible(tab_id) && registry.is_active(tab_id)
        };
        if !refresh {
            return;
        }

        debug!("Tab title changed for active tab, refreshing menu: {}", tab_id);
        self.host.clear_menu();
        self.load_page(tab).await;
    }

    pub async fn on_tab_activated(&self, tab_id: TabId) {
        debug!("Tab activated: {}", tab_id);
        self.registry.borrow_mut().set_active_tab(tab_id);
        self.refresh(tab_id).await;
    }

    pub async fn on_window_focus_changed(&self, window_id: i32) {
        // -1 is the platform's "no window focused"
        if window_id <= 0 {
            return;
        }

        debug!("Window focus changed: {}", window_id);
        let Some(tab) = self.host.active_tab().await else {
            return;
        };
        self.registry.borrow_mut().set_active_tab(tab.id);
        self.refresh(tab.id).await;
    }

    pub fn on_tab_removed(&self, tab_id: TabId) {
        if self.registry.borrow_mut().evict(tab_id) {
            debug!("Evicted state for closed tab {}", tab_id);
        }
    }

    /// Store a selection pushed by the page and rebuild the menu if visible
    pub async fn on_selection_changed(&self, tab_id: TabId, selection: String) {
        debug!("Selection changed in tab {}", tab_id);
        let is_active = {
            let mut registry = self.registry.borrow_mut();
            registry.push_selection(tab_id, selection);
            registry.is_active(tab_id)
        };

        if is_active {
            self.rebuild_menu(tab_id).await;
        }
    }

    /// Copy the link behind a clicked context menu item
    pub async fn on_menu_clicked(&self, menu_item_id: &str, tab: &TabInfo) -> Result<()> {
        let option_id = OptionId::parse(menu_item_id)
            .ok_or_else(|| FlinkError::UnknownOption(menu_item_id.to_string()))?;
        self.copy_option(tab, option_id).await
    }

    pub async fn on_action_clicked(&self, tab: &TabInfo) -> Result<()> {
        self.copy_option(tab, OptionId::CopyLink).await
    }

    /// Current options for a tab, as listed by the popup
    pub async fn link_options(&self, tab_id: TabId) -> Vec<MenuEntry> {
        let Some(tab) = self.host.get_tab(tab_id).await else {
            return Vec::new();
        };

        let registry = self.registry.borrow();
        if registry.is_loading(tab_id) {
            return Vec::new();
        }
        let state = registry.get(tab_id).cloned().unwrap_or_default();
        build_menu_options(&tab, &state)
            .iter()
            .map(MenuOption::entry)
            .collect()
    }

    /// Copy a link for a tab chosen by id (popup clicks)
    pub async fn copy_link(&self, tab_id: TabId, option_id: OptionId) -> Result<()> {
        let tab = self
            .host
            .get_tab(tab_id)
            .await
            .ok_or(FlinkError::TabNotFound(tab_id))?;
        self.copy_option(&tab, option_id).await
    }

    async fn copy_option(&self, tab: &TabInfo, option_id: OptionId) -> Result<()> {
        let option = {
            let registry = self.registry.borrow();
            let state = registry.get(tab.id).cloned().unwrap_or_default();
            build_menu_options(tab, &state)
                .into_iter()
                .find(|option| option.id == option_id)
        };
        let option =
            option.ok_or_else(|| FlinkError::UnknownOption(option_id.as_str().to_string()))?;

        info!("Copying {} for tab {}", option_id.as_str(), tab.id);
        self.host.write_clipboard(&option.payload).await
    }

    /// Reset and rebuild the button and menu for a tab that just gained focus
    async fn refresh(&self, tab_id: TabId) {
        if self.registry.borrow().is_loading(tab_id) {
            debug!("Tab is loading, not refreshing page action: {}", tab_id);
            return;
        }

        let Some(tab) = self.host.get_tab(tab_id).await else {
            return;
        };
        if !self.registry.borrow().can_render(tab_id) {
            debug!("Tab {} lost focus before refresh", tab_id);
            return;
        }

        self.host.hide_action(tab_id);
        self.registry.borrow_mut().set_menu_visible(tab_id, false);
        self.host.clear_menu();
        self.host.show_action(tab_id);
        self.registry.borrow_mut().set_menu_visible(tab_id, true);

        self.load_page(&tab).await;
    }

    async fn load_page(&self, tab: &TabInfo) {
        futures::join!(self.populate_tab_state(tab), self.request_selection(tab.id));
    }

    /// Fetch the title and formatted link, publishing the menu once both arrive
    async fn populate_tab_state(&self, tab: &TabInfo) {
        let generation = self.registry.borrow_mut().begin_fetch(tab);

        let title = async {
            let title = match self.host.fetch_open_graph_title(tab.id).await {
                Some(og_title) if !og_title.is_empty() => {
                    debug!("Used Open Graph title for tab {}", tab.id);
                    truncate(&og_title)
                }
                _ => {
                    debug!("Used tab title for tab {}", tab.id);
                    truncate(&tab.title)
                }
            };

            if self.registry.borrow_mut().store_title(tab.id, generation, title) {
                self.try_build_menu(tab);
            } else {
                debug!("Discarding stale title for tab {}", tab.id);
            }
        };

        let link = async {
            let link = self.host.fetch_formatted_link(tab.id).await;
            if link.as_ref().is_none_or(FormattedLink::is_empty) {
                debug!("No formatted link text for tab {}", tab.id);
            }

            if self
                .registry
                .borrow_mut()
                .store_formatted_link(tab.id, generation, link)
            {
                self.try_build_menu(tab);
            } else {
                debug!("Discarding stale formatted link for tab {}", tab.id);
            }
        };

        futures::join!(title, link);
    }

    async fn request_selection(&self, tab_id: TabId) {
        let generation = self.registry.borrow_mut().begin_selection_request(tab_id);
        let selection = self.host.fetch_selection(tab_id).await.unwrap_or_default();

        if !self
            .registry
            .borrow_mut()
            .store_requested_selection(tab_id, generation, selection)
        {
            debug!("Discarding superseded selection for tab {}", tab_id);
            return;
        }

        self.rebuild_menu(tab_id).await;
    }

    /// Publish the menu once both page fetches have answered
    fn try_build_menu(&self, tab: &TabInfo) {
        let ready = {
            let registry = self.registry.borrow();
            if !registry.is_active(tab.id) {
                debug!("Skipping menu update, tab {} is not active", tab.id);
                return;
            }
            registry.get(tab.id).is_some_and(TabDisplayState::is_ready)
        };

        if ready {
            self.build_menu(tab);
        }
    }

    /// Rebuild from fresh tab info, without waiting for the page fetches
    async fn rebuild_menu(&self, tab_id: TabId) {
        if let Some(tab) = self.host.get_tab(tab_id).await {
            self.build_menu(&tab);
        }
    }

    fn build_menu(&self, tab: &TabInfo) {
        let entries: Vec<MenuEntry> = {
            let registry = self.registry.borrow();
            if !registry.can_render(tab.id) {
                return;
            }
            let Some(state) = registry.get(tab.id) else {
                return;
            };
            build_menu_options(tab, state)
                .iter()
                .map(MenuOption::entry)
                .collect()
        };

        self.host.clear_menu();
        for entry in &entries {
            self.host.add_menu_item(entry);
        }
    }
}
