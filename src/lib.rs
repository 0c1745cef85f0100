//! Gallery Menu - image gallery augmentation for node-graph combo menus
//!
//! Turns the host editor's plain dropdown of file names into a thumbnail
//! gallery with folder tabs, per-image deletion and user tags. Runs
//! natively and on `wasm32`; the host supplies the menu through
//! [`MenuSurface`] and the backend through [`GalleryApi`].
//!
//! ```no_run
//! use gallery_menu::{
//!     GalleryConfig, GalleryPipeline, HeadlessMenu, HttpGalleryApi, MemorySession, MenuRequest,
//! };
//!
//! # async fn run() -> Result<(), gallery_menu::GalleryError> {
//! let config = GalleryConfig::new().with_base_url("http://127.0.0.1:8188");
//! gallery_menu::init_logging(config.log_level);
//!
//! let api = HttpGalleryApi::new(&config)?;
//! let mut pipeline = GalleryPipeline::new(api, MemorySession::new(), config);
//! pipeline.initialize().await;
//!
//! let values = ["a.png", "sub\\b.png"];
//! let request = MenuRequest::new("litecontextmenu dark", Some("LoadImage"), &values);
//! let mut menu = HeadlessMenu::new(&values);
//! pipeline.open(&request, &mut menu).await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod layout;
pub mod logging;
pub mod menu;
pub mod message;
pub mod pipeline;
pub mod session;
pub mod tags;
pub mod thumbnails;

pub use api::{GalleryApi, HttpGalleryApi, MemoryGalleryApi};
pub use config::{GalleryConfig, LogLevel};
pub use error::{GalleryError, GalleryResult};
pub use layout::{grid_columns, GridLayout};
pub use logging::init_logging;
pub use menu::{HeadlessMenu, MenuKind, MenuOption, MenuRequest, MenuSurface, TagBar, Tile};
pub use message::GalleryEvent;
pub use pipeline::{GalleryPipeline, MenuPhase};
#[cfg(target_arch = "wasm32")]
pub use session::BrowserSession;
pub use session::{MemorySession, SessionFlags};
pub use tags::{TagData, TagFilter, TagStore};
pub use thumbnails::{ThumbnailCache, ThumbnailRef};

// Re-export the hierarchy builder
pub use folder_tabs;
