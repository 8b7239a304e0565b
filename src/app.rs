//! Hamilton Map Editor application.
//!
//! `SectorApp` owns the sector store together with the two views bound to it:
//! - Map surface: base map, polygon drawing and shape editing
//! - Panel: sector list, detail form, reset and export
//!
//! Every message is routed through [`SectorApp::update`], after which both
//! views are re-synced with the store and pending changes are written to the
//! durable storage slot.

use crate::config::AppConfig;
use crate::constants::{APP_SUBTITLE, APP_TITLE};
use crate::format::{ExportFile, seed_sectors};
use crate::handlers;
use crate::map::{BaseMapView, MapSurface, ShapeView, ToolbarState};
use crate::message::Message;
use crate::model::{SectorInfo, SectorRecord};
use crate::panel::{Confirm, PanelState, PanelView};
use crate::state::{self, SectorStore};
use crate::storage::KeyValueStore;

/// Side effect requested by an update that the host has to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Offer a file for download
    Download(ExportFile),
}

/// The editor: store, map surface, panel and storage wired together.
pub struct SectorApp {
    config: AppConfig,
    store: SectorStore,
    surface: MapSurface,
    panel: PanelState,
    storage: Box<dyn KeyValueStore>,
    confirm: Box<dyn Confirm>,
}

impl SectorApp {
    /// Load the saved sectors (or the seed dataset) and set up the views.
    pub fn new(
        config: AppConfig,
        storage: Box<dyn KeyValueStore>,
        confirm: Box<dyn Confirm>,
    ) -> Self {
        let store = state::load_store(
            storage.as_ref(),
            &config.storage_key,
            seed_sectors(),
            config.defaults,
        );
        Self::with_store(config, store, storage, confirm)
    }

    /// Build around an existing store.
    pub fn with_store(
        config: AppConfig,
        store: SectorStore,
        storage: Box<dyn KeyValueStore>,
        confirm: Box<dyn Confirm>,
    ) -> Self {
        let surface = MapSurface::new(BaseMapView::from_config(&config.map));
        let mut panel = PanelState::new();
        panel.sync(&store);
        log::info!(
            "🗺️ {} ready with {} sectors",
            APP_TITLE,
            store.len()
        );
        Self {
            config,
            store,
            surface,
            panel,
            storage,
            confirm,
        }
    }

    /// Replace the confirmation policy.
    pub fn set_confirm(&mut self, confirm: Box<dyn Confirm>) {
        self.confirm = confirm;
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Process one message.
    pub fn update(&mut self, message: Message) -> Option<Effect> {
        let export = match message {
            Message::Map(msg) => {
                let events = handlers::handle_map_message(msg, &mut self.surface, &self.store);
                for event in events {
                    handlers::handle_map_event(event, &mut self.store);
                }
                None
            }
            Message::MapEvent(event) => {
                handlers::handle_map_event(event, &mut self.store);
                None
            }
            Message::Panel(msg) => self
                .panel
                .handle(msg, &self.store)
                .and_then(|command| self.run_command(command)),
            Message::Command(command) => self.run_command(command),
        };

        self.surface.sync_selection(&self.store);
        self.panel.sync(&self.store);
        self.persist();
        export.map(Effect::Download)
    }

    fn run_command(&mut self, command: crate::panel::PanelCommand) -> Option<ExportFile> {
        handlers::handle_command(
            command,
            &mut self.store,
            self.confirm.as_mut(),
            self.config.preferences.confirm_deletes,
        )
    }

    /// Write pending changes to the storage slot. Failures are logged only.
    fn persist(&mut self) {
        match state::flush(
            &mut self.store,
            self.storage.as_mut(),
            &self.config.storage_key,
        ) {
            Ok(Some(write)) => log::debug!("💾 Persisted ({:?})", write),
            Ok(None) => {}
            Err(e) => log::warn!("Failed to save sectors: {}", e),
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn title(&self) -> &'static str {
        APP_TITLE
    }

    pub fn subtitle(&self) -> &'static str {
        APP_SUBTITLE
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &SectorStore {
        &self.store
    }

    pub fn sectors(&self) -> &[SectorRecord] {
        self.store.sectors()
    }

    pub fn surface(&self) -> &MapSurface {
        &self.surface
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    pub fn selected_info(&self) -> Option<SectorInfo> {
        self.store.selected_info()
    }

    /// Render model of the map shapes.
    pub fn shapes(&self) -> Vec<ShapeView> {
        self.surface.shapes(&self.store)
    }

    pub fn toolbar(&self) -> ToolbarState {
        self.surface.toolbar(&self.store)
    }

    /// View model of the list and detail panel.
    pub fn panel_view(&self) -> PanelView {
        PanelView::build(&self.store, &self.panel)
    }
}
