//! PDF Viewer - egui front end
//!
//! File tree on the left, page viewport on the right. Every widget event is
//! turned into a [`Command`] and handed to the viewer controller.

mod file_tree;
mod surface;

use eframe::egui;
use pdf_engine::{best_available_engine, PdfEngine};
use surface::EguiSurface;
use viewer_core::{Command, ViewerConfig, ViewerController, ViewerError};

fn main() -> eframe::Result {
    #[cfg(debug_assertions)]
    env_logger::Builder::from_default_env().filter_level(log::LevelFilter::Debug).init();
    #[cfg(not(debug_assertions))]
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 820.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("PDF Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "PDF Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(PdfViewerApp::new(ViewerConfig::default())))),
    )
}

struct PdfViewerApp {
    viewer: ViewerController<Box<dyn PdfEngine>, EguiSurface>,
    search: String,
    commands: Vec<Command>,
}

impl PdfViewerApp {
    fn new(config: ViewerConfig) -> Self {
        log::info!("browsing from {}", config.browser_root.display());
        Self {
            viewer: ViewerController::new(best_available_engine(), EguiSurface::default(), config),
            search: String::new(),
            commands: Vec::new(),
        }
    }

    fn run_commands(&mut self) {
        for command in std::mem::take(&mut self.commands) {
            match self.viewer.dispatch(command) {
                Ok(()) | Err(ViewerError::InvalidSelection(_)) => {}
                Err(err) => log::warn!("{err}"),
            }
        }
    }
}

impl eframe::App for PdfViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.commands.push(Command::Shutdown);
        }

        self.handle_keyboard_shortcuts(ctx);
        self.draw_toolbar(ctx);
        self.draw_status_bar(ctx);
        self.draw_sidebar(ctx);
        self.run_commands();

        self.viewer.surface_mut().upload(ctx);
        self.draw_viewport(ctx);
    }
}

impl PdfViewerApp {
    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        ctx.input(|i| {
            let cmd_or_ctrl = i.modifiers.command || i.modifiers.ctrl;

            if i.key_pressed(egui::Key::ArrowLeft) || i.key_pressed(egui::Key::PageUp) {
                self.commands.push(Command::PrevPage);
            }
            if i.key_pressed(egui::Key::ArrowRight) || i.key_pressed(egui::Key::PageDown) {
                self.commands.push(Command::NextPage);
            }
            if cmd_or_ctrl && (i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals)) {
                self.commands.push(Command::ZoomIn);
            }
            if cmd_or_ctrl && i.key_pressed(egui::Key::Minus) {
                self.commands.push(Command::ZoomOut);
            }
            if cmd_or_ctrl && i.key_pressed(egui::Key::Num0) {
                self.commands.push(Command::ZoomReset);
            }
        });
    }

    fn draw_toolbar(&mut self, ctx: &egui::Context) {
        let surface = self.viewer.surface();
        let (prev, next, zoom) = (surface.prev_enabled, surface.next_enabled, surface.zoom_enabled);
        let zoom_label = surface.zoom_label.clone();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add_space(8.0);

                if ui.add_enabled(prev, egui::Button::new("◀ Previous")).clicked() {
                    self.commands.push(Command::PrevPage);
                }
                if ui.add_enabled(next, egui::Button::new("Next ▶")).clicked() {
                    self.commands.push(Command::NextPage);
                }

                ui.separator();

                if ui.add_enabled(zoom, egui::Button::new("−")).on_hover_text("Zoom out").clicked()
                {
                    self.commands.push(Command::ZoomOut);
                }
                if ui
                    .add_enabled(zoom, egui::Button::new(zoom_label))
                    .on_hover_text("Reset zoom")
                    .clicked()
                {
                    self.commands.push(Command::ZoomReset);
                }
                if ui.add_enabled(zoom, egui::Button::new("+")).on_hover_text("Zoom in").clicked()
                {
                    self.commands.push(Command::ZoomIn);
                }

                ui.separator();

                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.search)
                        .hint_text("Search file names...")
                        .desired_width(200.0),
                );
                if response.changed() {
                    self.commands.push(Command::FilterChanged(self.search.clone()));
                }
            });
        });
    }

    fn draw_status_bar(&mut self, ctx: &egui::Context) {
        let status = &self.viewer.surface().status;

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(status);
            });
        });
    }

    fn draw_sidebar(&mut self, ctx: &egui::Context) {
        let browser = self.viewer.browser();
        let root = browser.root().to_path_buf();
        let selected = self.viewer.current_path();
        let commands = &mut self.commands;

        egui::SidePanel::left("files").default_width(380.0).resizable(true).show(ctx, |ui| {
            ui.strong(format!("📁 {}", root.display()));
            ui.separator();

            egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                file_tree::draw_dir(ui, browser, &root, selected, commands);
            });
        });
    }

    fn draw_viewport(&mut self, ctx: &egui::Context) {
        let surface = self.viewer.surface();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(&surface.page_label);
            });
            ui.separator();

            if let Some(message) = surface.message() {
                ui.centered_and_justified(|ui| {
                    ui.heading(message);
                });
                return;
            }

            egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
                let Some((texture, size)) = surface.page() else {
                    return;
                };

                let available = ui.available_size();
                let padding_x = ((available.x - size.x) / 2.0).max(0.0);
                let padding_y = ((available.y - size.y) / 2.0).max(0.0);

                ui.add_space(padding_y);
                ui.horizontal(|ui| {
                    ui.add_space(padding_x);
                    ui.image((texture.id(), size));
                });
            });
        });
    }
}
