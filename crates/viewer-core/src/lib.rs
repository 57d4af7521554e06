//! Viewer Core
//!
//! Coordination layer of the PDF viewer: file browsing, name filtering,
//! view state and the controller that drives a [`pdf_engine::PdfEngine`]
//! and a [`DisplaySurface`]. Nothing in here depends on a GUI toolkit.

pub mod browser;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod path_format;
pub mod surface;
pub mod view_state;

pub use browser::{EntryKind, FileBrowser, FileEntry};
pub use command::Command;
pub use config::ViewerConfig;
pub use controller::{ViewerController, OPEN_FAILURE_MESSAGE, RENDER_FAILURE_MESSAGE};
pub use error::{ViewerError, ViewerResult};
pub use filter::NameFilter;
pub use path_format::{format_display_path, format_path, is_pdf, DEFAULT_MAX_LEN};
pub use surface::{DisplaySurface, RecordingSurface, SurfaceContent};
pub use view_state::ViewState;
