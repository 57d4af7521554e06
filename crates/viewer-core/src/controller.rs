//! Viewer controller
//!
//! Owns the document handle and the view state, and is the only place that
//! talks to both the PDF engine and the display surface. Every operation is
//! synchronous; failures are turned into a visible surface state before the
//! error is handed back, so callers may drop the returned error.

use crate::browser::FileBrowser;
use crate::command::Command;
use crate::config::ViewerConfig;
use crate::error::{ViewerError, ViewerResult};
use crate::filter::NameFilter;
use crate::path_format::{format_display_path, is_pdf};
use crate::surface::DisplaySurface;
use crate::view_state::ViewState;
use pdf_engine::{DocumentHandle, OpenSource, PdfEngine, PdfEngineError, RenderRequest};
use std::path::{Path, PathBuf};

pub const OPEN_FAILURE_MESSAGE: &str = "Failed to open PDF";
pub const RENDER_FAILURE_MESSAGE: &str = "Failed to render page";
pub const NO_DOCUMENT_LABEL: &str = "No PDF loaded";
pub const PLACEHOLDER_MESSAGE: &str = "Select a PDF file on the left";

#[derive(Debug)]
struct OpenDocument {
    handle: DocumentHandle,
    path: PathBuf,
}

pub struct ViewerController<E: PdfEngine, S: DisplaySurface> {
    config: ViewerConfig,
    engine: E,
    surface: S,
    browser: FileBrowser,
    document: Option<OpenDocument>,
    view: ViewState,
}

impl<E: PdfEngine, S: DisplaySurface> ViewerController<E, S> {
    pub fn new(engine: E, surface: S, config: ViewerConfig) -> Self {
        let browser = FileBrowser::from_config(&config);
        let mut controller = Self {
            view: ViewState::opened(0, config.zoom_default),
            config,
            engine,
            surface,
            browser,
            document: None,
        };
        controller.show_empty(PLACEHOLDER_MESSAGE);
        controller
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.document.as_ref().map(|document| document.path.as_path())
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn browser(&self) -> &FileBrowser {
        &self.browser
    }

    pub fn dispatch(&mut self, command: Command) -> ViewerResult<()> {
        match command {
            Command::SelectFile(path) => self.select_file(&path),
            Command::NextPage => self.next_page(),
            Command::PrevPage => self.prev_page(),
            Command::ZoomIn => self.zoom_in(),
            Command::ZoomOut => self.zoom_out(),
            Command::ZoomReset => self.zoom_reset(),
            Command::FilterChanged(text) => {
                self.filter(&text);
                Ok(())
            }
            Command::ExpandDir(dir) => {
                self.browser.expand(&dir);
                Ok(())
            }
            Command::CollapseDir(dir) => {
                self.browser.collapse(&dir);
                Ok(())
            }
            Command::Shutdown => {
                self.shutdown();
                Ok(())
            }
        }
    }

    /// Opens `path` if it is an existing `.pdf` file. Anything else is
    /// rejected before the current document is touched.
    pub fn select_file(&mut self, path: &Path) -> ViewerResult<()> {
        if !is_pdf(path) {
            log::debug!("ignoring selection {}", path.display());
            return Err(ViewerError::InvalidSelection(path.to_path_buf()));
        }

        self.open_document(path)
    }

    /// Replaces the current document with `path` and shows its first page.
    pub fn open_document(&mut self, path: &Path) -> ViewerResult<()> {
        self.release_document();

        let handle = match self.engine.open(OpenSource::from(path)) {
            Ok(handle) => handle,
            Err(source) => return Err(self.fail_open(path, source)),
        };

        let page_count = match self.engine.page_count(handle) {
            Ok(0) => Err(PdfEngineError::Backend("document has no pages".to_owned())),
            other => other,
        };

        let page_count = match page_count {
            Ok(page_count) => page_count,
            Err(source) => {
                if let Err(err) = self.engine.close(handle) {
                    log::warn!("closing {} failed: {err}", path.display());
                }
                return Err(self.fail_open(path, source));
            }
        };

        log::info!("opened {} ({page_count} pages)", path.display());

        self.document = Some(OpenDocument { handle, path: path.to_path_buf() });
        self.view = ViewState::opened(page_count, self.config.zoom_default);
        self.surface.set_controls_enabled(true);
        self.render_current_page()?;
        self.surface.set_status(&format_display_path(path, self.config.status_max_len));

        Ok(())
    }

    /// Rasterizes the current page at the current zoom and refreshes the
    /// indicators. Without a document this does nothing.
    pub fn render_current_page(&mut self) -> ViewerResult<()> {
        let Some(document) = &self.document else {
            return Ok(());
        };

        let zoom = self.view.zoom_level;
        let request =
            RenderRequest { page_index: self.view.current_page, scale_x: zoom, scale_y: zoom };

        match self.engine.rasterize(document.handle, request) {
            Ok(raster) => {
                self.surface.show_page(&raster);
                self.surface.set_page_label(&self.view.page_label());
                self.surface.set_navigation(self.view.can_go_prev(), self.view.can_go_next());
                self.surface.set_zoom_label(&self.view.zoom_label());
                Ok(())
            }
            Err(source) => {
                let page = self.view.current_page;
                log::warn!(
                    "rendering page {} of {} failed: {source}",
                    page + 1,
                    document.path.display()
                );
                self.release_document();
                self.show_empty(RENDER_FAILURE_MESSAGE);
                Err(ViewerError::RenderFailure { page, source })
            }
        }
    }

    pub fn next_page(&mut self) -> ViewerResult<()> {
        if self.document.is_some() && self.view.next_page() {
            return self.render_current_page();
        }
        Ok(())
    }

    pub fn prev_page(&mut self) -> ViewerResult<()> {
        if self.document.is_some() && self.view.prev_page() {
            return self.render_current_page();
        }
        Ok(())
    }

    pub fn zoom_in(&mut self) -> ViewerResult<()> {
        self.zoom_by(self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> ViewerResult<()> {
        self.zoom_by(-self.config.zoom_step)
    }

    pub fn zoom_reset(&mut self) -> ViewerResult<()> {
        self.view.zoom_level = self.config.zoom_default;
        self.render_current_page()
    }

    fn zoom_by(&mut self, delta: f32) -> ViewerResult<()> {
        if self.view.zoom_by(delta, self.config.zoom_min, self.config.zoom_max) {
            return self.render_current_page();
        }
        Ok(())
    }

    /// Applies the search-box text to the file tree.
    pub fn filter(&mut self, text: &str) {
        let filter = NameFilter::from_text(text);
        log::debug!("file filter {:?}", filter.pattern());
        self.browser.set_filter(filter);
    }

    /// Releases the open document, if any.
    pub fn shutdown(&mut self) {
        self.release_document();
    }

    fn release_document(&mut self) {
        let Some(document) = self.document.take() else {
            return;
        };

        match self.engine.close(document.handle) {
            Ok(()) => log::info!("closed {}", document.path.display()),
            Err(err) => log::warn!("closing {} failed: {err}", document.path.display()),
        }
    }

    fn fail_open(&mut self, path: &Path, source: PdfEngineError) -> ViewerError {
        log::warn!("cannot open {}: {source}", path.display());
        self.show_empty(OPEN_FAILURE_MESSAGE);
        ViewerError::OpenFailure { path: path.to_path_buf(), source }
    }

    fn show_empty(&mut self, message: &str) {
        self.view = ViewState::opened(0, self.config.zoom_default);
        self.surface.show_message(message);
        self.surface.set_page_label(NO_DOCUMENT_LABEL);
        self.surface.set_zoom_label(&self.view.zoom_label());
        self.surface.set_status("");
        self.surface.set_controls_enabled(false);
    }
}

impl<E: PdfEngine, S: DisplaySurface> Drop for ViewerController<E, S> {
    fn drop(&mut self) {
        self.release_document();
    }
}
