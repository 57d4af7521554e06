//! egui implementation of the viewer's display surface.

use eframe::egui;
use pdf_engine::RasterBuffer;
use viewer_core::DisplaySurface;

/// Viewport texture plus indicator state, read back by the panels each frame.
///
/// Pages arrive as CPU images and are uploaded on the next frame, since the
/// controller runs without access to the egui context.
#[derive(Default)]
pub struct EguiSurface {
    pending: Option<egui::ColorImage>,
    texture: Option<egui::TextureHandle>,
    page_size: egui::Vec2,
    message: Option<String>,
    pub page_label: String,
    pub zoom_label: String,
    pub status: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub zoom_enabled: bool,
}

impl EguiSurface {
    /// Moves a freshly rendered page into the GPU texture.
    pub fn upload(&mut self, ctx: &egui::Context) {
        let Some(image) = self.pending.take() else {
            return;
        };

        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("pdf_page", image, egui::TextureOptions::LINEAR));
            }
        }
    }

    /// Texture and on-screen size of the current page, once uploaded.
    pub fn page(&self) -> Option<(&egui::TextureHandle, egui::Vec2)> {
        self.texture.as_ref().map(|texture| (texture, self.page_size))
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[cfg(test)]
    fn pending_size(&self) -> Option<[usize; 2]> {
        self.pending.as_ref().map(|image| image.size)
    }
}

impl DisplaySurface for EguiSurface {
    fn show_page(&mut self, raster: &RasterBuffer) {
        let size = [raster.width as usize, raster.height as usize];
        self.pending = Some(egui::ColorImage::from_rgba_unmultiplied(size, &raster.to_rgba8()));
        self.page_size = egui::vec2(raster.width as f32, raster.height as f32);
        self.message = None;
    }

    fn show_message(&mut self, message: &str) {
        self.pending = None;
        self.texture = None;
        self.message = Some(message.to_owned());
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

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_engine::PixelFormat;

    fn raster(width: u32, height: u32) -> RasterBuffer {
        RasterBuffer {
            width,
            height,
            stride: width as usize * 3,
            format: PixelFormat::Rgb8,
            samples: vec![200; width as usize * height as usize * 3],
        }
    }

    #[test]
    fn page_replaces_message_and_waits_for_upload() {
        let mut surface = EguiSurface::default();
        surface.show_message("Select a PDF file on the left");

        surface.show_page(&raster(4, 2));

        assert_eq!(surface.message(), None);
        assert_eq!(surface.pending_size(), Some([4, 2]));
        assert!(surface.page().is_none());
    }

    #[test]
    fn message_drops_pending_page() {
        let mut surface = EguiSurface::default();
        surface.show_page(&raster(4, 2));

        surface.show_message("Failed to open PDF");

        assert_eq!(surface.message(), Some("Failed to open PDF"));
        assert_eq!(surface.pending_size(), None);
    }

    #[test]
    fn controls_toggle_together() {
        let mut surface = EguiSurface::default();

        surface.set_controls_enabled(true);
        surface.set_navigation(false, true);

        assert!(!surface.prev_enabled);
        assert!(surface.next_enabled);
        assert!(surface.zoom_enabled);
    }
}
