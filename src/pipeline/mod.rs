//! Gallery render pipeline.
//!
//! Runs once per context-menu construction:
//!
//! ```text
//! Closed -> Opening -> Decorated -> (Filtered)* -> Closed
//! ```
//!
//! `Opening` builds the folder tree, then (for image loaders) refreshes
//! the tag store, preloads every thumbnail in one batch and triggers the
//! once-per-session cleanup. Nothing is painted until all of that has
//! completed. Later events only touch row visibility, tile tags and, for
//! deletions, the row list itself.
//!
//! Every mutation of the host menu is guarded by [`MenuSurface::is_open`]
//! and [`MenuSurface::row_exists`], so results arriving after the menu
//! closed still update the caches but never the page.


use std::collections::BTreeSet;

use folder_tabs::{detect_separator, FolderTree, TabNavigator};

use crate::api::GalleryApi;
use crate::config::GalleryConfig;
use crate::error::{GalleryError, GalleryResult};
use crate::layout::GridLayout;
use crate::menu::{MenuKind, MenuRequest, MenuSurface, TagBar, Tile};
use crate::message::GalleryEvent;
use crate::session::SessionFlags;
use crate::tags::{TagFilter, TagStore};
use crate::thumbnails::{cleanup_stale_once, is_concrete_file, ThumbnailCache};

/// Lifecycle of the current menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPhase {
    Closed,
    Opening,
    Decorated,
    Filtered,
}

/// State of the menu currently shown.
#[derive(Debug)]
struct OpenMenu {
    kind: MenuKind,
    identifiers: Vec<String>,
    tree: FolderTree,
    navigator: TabNavigator,
    filter: TagFilter,
}

/// Augments host menus with folder tabs, thumbnails and tags.
///
/// Owns the thumbnail cache and the tag store for the lifetime of the
/// page; construct one per page and feed it every menu opening.
#[derive(Debug)]
pub struct GalleryPipeline<A, S> {
    api: A,
    session: S,
    config: GalleryConfig,
    thumbnails: ThumbnailCache,
    tags: TagStore,
    service_available: bool,
    phase: MenuPhase,
    menu: Option<OpenMenu>,
}

impl<A: GalleryApi, S: SessionFlags> GalleryPipeline<A, S> {
    pub fn new(api: A, session: S, config: GalleryConfig) -> Self {
        Self {
            thumbnails: ThumbnailCache::new(&config),
            api,
            session,
            config,
            tags: TagStore::new(),
            service_available: false,
            phase: MenuPhase::Closed,
            menu: None,
        }
    }

    /// Check that the thumbnail service answers.
    ///
    /// An unavailable service only means every tile shows its fallback.
    pub async fn initialize(&mut self) -> bool {
        self.service_available = self.api.check_service().await;
        if self.service_available {
            log::info!("Thumbnail service available");
        } else {
            log::warn!("Thumbnail service unavailable, tiles will use fallbacks");
        }
        self.service_available
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn phase(&self) -> MenuPhase {
        self.phase
    }

    pub fn is_service_available(&self) -> bool {
        self.service_available
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    /// Identifiers of the open menu, in row order.
    pub fn identifiers(&self) -> &[String] {
        self.menu
            .as_ref()
            .map(|menu| menu.identifiers.as_slice())
            .unwrap_or_default()
    }

    /// Folder tree of the open menu.
    pub fn tree(&self) -> Option<&FolderTree> {
        self.menu.as_ref().map(|menu| &menu.tree)
    }

    /// Selected folder tabs of the open menu, top level first.
    pub fn active_path(&self) -> &[String] {
        self.menu
            .as_ref()
            .map(|menu| menu.navigator.active_path())
            .unwrap_or_default()
    }

    /// Active tag filter of the open menu.
    pub fn tag_filter(&self) -> Option<&TagFilter> {
        self.menu.as_ref().map(|menu| &menu.filter)
    }

    /// Augment a menu the host just constructed.
    pub async fn open<M: MenuSurface>(
        &mut self,
        request: &MenuRequest,
        surface: &mut M,
    ) -> MenuPhase {
        self.close();

        let kind = request.kind(&self.config.eligibility);
        if kind == MenuKind::Plain {
            return self.phase;
        }
        self.phase = MenuPhase::Opening;

        let (identifiers, decorated) = request.identifiers();
        if surface.row_count() != identifiers.len() {
            log::warn!(
                "Menu has {} rows for {} options",
                surface.row_count(),
                identifiers.len()
            );
        }

        let separator = if decorated {
            None
        } else {
            detect_separator(&identifiers, self.config.hierarchy.require_dot)
        };
        let tree = FolderTree::build(&identifiers, separator, |id| !is_concrete_file(id));
        let mut navigator = TabNavigator::new();
        navigator.sync_to_row(&tree, request.selected_index());

        if kind == MenuKind::Tabs && tree.is_flat() {
            log::debug!("Menu values are not path-like, leaving it alone");
            self.phase = MenuPhase::Closed;
            return self.phase;
        }

        if kind == MenuKind::Gallery {
            if let Err(e) = self.tags.load(&self.api).await {
                log::error!("Failed to load tags: {}", e);
            }
            self.thumbnails.preload_batch(&self.api, &identifiers).await;
            cleanup_stale_once(
                &self.api,
                &mut self.session,
                &self.config.thumbnails.cleanup_session_key,
                &identifiers,
            )
            .await;
        }

        if !surface.is_open() {
            log::debug!("Menu closed before it could be decorated");
            self.phase = MenuPhase::Closed;
            return self.phase;
        }

        self.menu = Some(OpenMenu {
            kind,
            identifiers,
            tree,
            navigator,
            filter: TagFilter::All,
        });

        self.render_tabs(surface);
        if kind == MenuKind::Gallery {
            self.decorate_rows(surface);
            self.render_tag_bar(surface);
            let layout = GridLayout::compute(surface.tab_strip_width(), &self.config.layout);
            surface.apply_grid(&layout);
        }

        let visible = self.apply_filters(surface);
        let has_tabs = self.tree().is_some_and(|tree| !tree.is_flat());
        if has_tabs || visible > self.config.layout.reposition_threshold {
            surface.reposition();
        }

        self.phase = MenuPhase::Decorated;
        log::debug!("Menu decorated as {:?}, {} rows visible", kind, visible);
        self.phase
    }

    /// Forget the current menu.
    pub fn close(&mut self) {
        self.menu = None;
        self.phase = MenuPhase::Closed;
    }

    /// Apply one user action to the open menu.
    ///
    /// Failures are shown through [`MenuSurface::notify`] and returned;
    /// state is left as it was before the action.
    pub async fn handle<M: MenuSurface>(
        &mut self,
        event: GalleryEvent,
        surface: &mut M,
    ) -> GalleryResult<()> {
        let Some(kind) = self.menu.as_ref().map(|menu| menu.kind) else {
            log::debug!("Ignoring {:?}, no menu open", event);
            return Ok(());
        };
        if event == GalleryEvent::Closed || !surface.is_open() {
            self.close();
            return Ok(());
        }
        if kind != MenuKind::Gallery && !matches!(event, GalleryEvent::TabClicked { .. }) {
            log::debug!("Ignoring {:?} on a tabs-only menu", event);
            return Ok(());
        }

        let is_filter = event.is_filter();
        let result = match event {
            GalleryEvent::TabClicked { depth, name } => {
                self.select_tab(depth, &name, surface);
                Ok(())
            }
            GalleryEvent::TagFilterSelected(filter) => self.select_tag_filter(filter, surface),
            GalleryEvent::CreateTag(name) => self.create_tag(&name, surface).await,
            GalleryEvent::RenameTag { old, new } => self.rename_tag(&old, &new, surface).await,
            GalleryEvent::DeleteTag(name) => self.delete_tag(&name, surface).await,
            GalleryEvent::ToggleImageTag { index, tag } => {
                self.toggle_image_tag(index, &tag, surface).await
            }
            GalleryEvent::DeleteRequested(index) => self.delete_row(index, surface).await,
            GalleryEvent::Closed => Ok(()),
        };

        match &result {
            Ok(()) if is_filter => self.phase = MenuPhase::Filtered,
            Ok(()) => {}
            Err(e) => {
                if e.is_conflict() {
                    log::warn!("{}", e);
                } else {
                    log::error!("Gallery action failed: {}", e);
                }
                if surface.is_open() {
                    surface.notify(&e.to_string());
                }
            }
        }
        result
    }

    fn select_tab<M: MenuSurface>(&mut self, depth: usize, name: &str, surface: &mut M) {
        let Some(menu) = self.menu.as_mut() else {
            return;
        };
        if !menu.navigator.select(&menu.tree, depth, name) {
            return;
        }
        // Folder tabs only decide visibility while no tag is active
        let reset_tag = menu.filter != TagFilter::All;
        menu.filter = TagFilter::All;
        let kind = menu.kind;

        self.render_tabs(surface);
        if reset_tag && kind == MenuKind::Gallery {
            self.render_tag_bar(surface);
        }
        self.apply_filters(surface);
    }

    fn select_tag_filter<M: MenuSurface>(
        &mut self,
        filter: TagFilter,
        surface: &mut M,
    ) -> GalleryResult<()> {
        if let TagFilter::Tag(tag) = &filter {
            if !self.tags.data().has_tag(tag) {
                return Err(GalleryError::tag_not_found(tag.as_str()));
            }
        }
        if let Some(menu) = self.menu.as_mut() {
            menu.filter = filter;
        }
        self.render_tag_bar(surface);
        self.apply_filters(surface);
        Ok(())
    }

    async fn create_tag<M: MenuSurface>(
        &mut self,
        name: &str,
        surface: &mut M,
    ) -> GalleryResult<()> {
        self.tags.create_tag(&self.api, name).await?;
        self.render_tag_bar(surface);
        Ok(())
    }

    async fn rename_tag<M: MenuSurface>(
        &mut self,
        old: &str,
        new: &str,
        surface: &mut M,
    ) -> GalleryResult<()> {
        self.tags.rename_tag(&self.api, old, new).await?;
        if let Some(menu) = self.menu.as_mut() {
            if menu.filter == TagFilter::Tag(old.to_string()) {
                menu.filter = TagFilter::Tag(new.trim().to_string());
            }
        }
        self.refresh_row_tags(surface);
        self.render_tag_bar(surface);
        self.apply_filters(surface);
        Ok(())
    }

    async fn delete_tag<M: MenuSurface>(
        &mut self,
        name: &str,
        surface: &mut M,
    ) -> GalleryResult<()> {
        self.tags.delete_tag(&self.api, name).await?;
        if let Some(menu) = self.menu.as_mut() {
            if menu.filter == TagFilter::Tag(name.to_string()) {
                menu.filter = TagFilter::All;
            }
        }
        self.refresh_row_tags(surface);
        self.render_tag_bar(surface);
        self.apply_filters(surface);
        Ok(())
    }

    async fn toggle_image_tag<M: MenuSurface>(
        &mut self,
        index: usize,
        tag: &str,
        surface: &mut M,
    ) -> GalleryResult<()> {
        let identifier = self.identifier_at(index)?;
        self.tags.toggle_image_tag(&self.api, &identifier, tag).await?;

        if surface.is_open() && surface.row_exists(index) {
            surface.set_row_tags(index, &self.tags.data().tags_for(&identifier));
        }
        self.render_tag_bar(surface);
        self.apply_filters(surface);
        Ok(())
    }

    async fn delete_row<M: MenuSurface>(
        &mut self,
        index: usize,
        surface: &mut M,
    ) -> GalleryResult<()> {
        let identifier = self.identifier_at(index)?;
        self.api.delete_file(&identifier).await?;
        log::info!("Deleted {}", identifier);

        if let Err(e) = self.tags.purge_image(&self.api, &identifier).await {
            log::error!("Failed to drop tags of deleted {}: {}", identifier, e);
        }

        if let Some(menu) = self.menu.as_mut() {
            menu.identifiers.remove(index);
            menu.tree = FolderTree::build(&menu.identifiers, menu.tree.separator(), |id| {
                !is_concrete_file(id)
            });
            menu.navigator.retain_valid(&menu.tree);
        }

        if surface.is_open() {
            if surface.row_exists(index) {
                surface.remove_row(index);
            }
            self.render_tabs(surface);
            self.apply_filters(surface);
        }
        Ok(())
    }

    /// Identifier of a live, concrete row.
    fn identifier_at(&self, index: usize) -> GalleryResult<String> {
        self.menu
            .as_ref()
            .and_then(|menu| menu.identifiers.get(index))
            .filter(|id| is_concrete_file(id))
            .cloned()
            .ok_or(GalleryError::RowOutOfRange { index })
    }

    fn render_tabs<M: MenuSurface>(&self, surface: &mut M) {
        let Some(menu) = &self.menu else {
            return;
        };
        if surface.is_open() && !menu.tree.is_flat() {
            surface.render_tab_rows(&menu.navigator.tab_rows(&menu.tree));
        }
    }

    fn render_tag_bar<M: MenuSurface>(&self, surface: &mut M) {
        let Some(menu) = &self.menu else {
            return;
        };
        if surface.is_open() {
            surface.render_tag_bar(&TagBar {
                tags: self.tags.tags().to_vec(),
                active: menu.filter.clone(),
            });
        }
    }

    fn decorate_rows<M: MenuSurface>(&self, surface: &mut M) {
        let Some(menu) = &self.menu else {
            return;
        };
        for (index, identifier) in menu.identifiers.iter().enumerate() {
            if !is_concrete_file(identifier) || !surface.row_exists(index) {
                continue;
            }
            surface.decorate_row(&Tile {
                index,
                identifier: identifier.clone(),
                thumbnail: self.thumbnails.resolve_display_reference(identifier),
                tags: self.tags.data().tags_for(identifier),
            });
        }
    }

    fn refresh_row_tags<M: MenuSurface>(&self, surface: &mut M) {
        let Some(menu) = &self.menu else {
            return;
        };
        if !surface.is_open() {
            return;
        }
        for (index, identifier) in menu.identifiers.iter().enumerate() {
            if is_concrete_file(identifier) && surface.row_exists(index) {
                surface.set_row_tags(index, &self.tags.data().tags_for(identifier));
            }
        }
    }

    /// Show the rows selected by the tag filter, or by the folder tabs
    /// when no tag is active. Returns the number of visible rows.
    fn apply_filters<M: MenuSurface>(&self, surface: &mut M) -> usize {
        let Some(menu) = &self.menu else {
            return 0;
        };
        if !surface.is_open() {
            return 0;
        }

        let visible: Option<BTreeSet<usize>> = match &menu.filter {
            TagFilter::All => menu.navigator.visible_rows(&menu.tree),
            filter => self.tags.visible_rows(filter, &menu.identifiers),
        }
        .map(|rows| rows.into_iter().collect());

        let mut shown = 0;
        for index in 0..menu.identifiers.len() {
            if !surface.row_exists(index) {
                break;
            }
            let show = visible.as_ref().is_none_or(|rows| rows.contains(&index));
            surface.set_row_visible(index, show);
            shown += usize::from(show);
        }
        shown
    }
}
