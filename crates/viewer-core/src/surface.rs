//! Display side of the viewer.

use pdf_engine::RasterBuffer;

/// Where the controller puts pixels and indicator text. A GUI implements
/// this over its widgets; every call replaces the previous value.
pub trait DisplaySurface {
    /// Shows a rendered page in the scrollable viewport.
    fn show_page(&mut self, raster: &RasterBuffer);
    /// Replaces the viewport content with a plain message.
    fn show_message(&mut self, message: &str);
    fn set_page_label(&mut self, text: &str);
    fn set_zoom_label(&mut self, text: &str);
    fn set_status(&mut self, text: &str);
    fn set_navigation(&mut self, prev_enabled: bool, next_enabled: bool);
    /// Enables or disables every navigation and zoom control at once.
    fn set_controls_enabled(&mut self, enabled: bool);
}

/// What the viewport currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SurfaceContent {
    #[default]
    Empty,
    Page { width: u32, height: u32 },
    Message(String),
}

/// Headless surface that remembers the last value of every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSurface {
    pub content: SurfaceContent,
    pub page_label: String,
    pub zoom_label: String,
    pub status: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub zoom_enabled: bool,
    pub pages_shown: usize,
}

impl DisplaySurface for RecordingSurface {
    fn show_page(&mut self, raster: &RasterBuffer) {
        self.content = SurfaceContent::Page { width: raster.width, height: raster.height };
        self.pages_shown += 1;
    }

    fn show_message(&mut self, message: &str) {
        self.content = SurfaceContent::Message(message.to_owned());
    }

    fn set_page_label(&mut self, text: &str) {
        self.page_label = text.to_owned();
    }

    fn set_zoom_label(&mut self, text: &str) {
        self.zoom_label = text.to_owned();
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_owned();
    }

    fn set_navigation(&mut self, prev_enabled: bool, next_enabled: bool) {
        self.prev_enabled = prev_enabled;
        self.next_enabled = next_enabled;
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.prev_enabled = enabled;
        self.next_enabled = enabled;
        self.zoom_enabled = enabled;
    }
}
