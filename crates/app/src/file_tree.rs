//! File tree side panel.

use chrono::{DateTime, Local};
use eframe::egui;
use std::path::Path;
use std::time::SystemTime;
use viewer_core::{Command, FileBrowser, FileEntry};

/// Draws the children of `dir` and queues a command for every click.
/// Directories are listed lazily: opening a header queues `ExpandDir`, and
/// the listing shows up on the next frame.
pub fn draw_dir(
    ui: &mut egui::Ui,
    browser: &FileBrowser,
    dir: &Path,
    selected: Option<&Path>,
    commands: &mut Vec<Command>,
) {
    let Some(children) = browser.children(dir) else {
        ui.weak("Loading…");
        commands.push(Command::ExpandDir(dir.to_path_buf()));
        return;
    };

    if children.is_empty() {
        ui.weak("(empty)");
        return;
    }

    for entry in children {
        if entry.is_dir() {
            draw_folder(ui, browser, entry, selected, commands);
        } else {
            draw_file(ui, entry, selected, commands);
        }
    }
}

fn draw_folder(
    ui: &mut egui::Ui,
    browser: &FileBrowser,
    entry: &FileEntry,
    selected: Option<&Path>,
    commands: &mut Vec<Command>,
) {
    let response = egui::CollapsingHeader::new(format!("📁 {}", entry.name))
        .id_salt(&entry.path)
        .default_open(false)
        .show(ui, |ui| draw_dir(ui, browser, &entry.path, selected, commands));

    response.header_response.on_hover_text(details(entry));

    if response.body_returned.is_none() && browser.is_expanded(&entry.path) {
        commands.push(Command::CollapseDir(entry.path.clone()));
    }
}

fn draw_file(
    ui: &mut egui::Ui,
    entry: &FileEntry,
    selected: Option<&Path>,
    commands: &mut Vec<Command>,
) {
    let is_selected = selected == Some(entry.path.as_path());

    ui.horizontal(|ui| {
        let response = ui
            .selectable_label(is_selected, format!("📄 {}", entry.name))
            .on_hover_text(details(entry));

        if response.clicked() {
            commands.push(Command::SelectFile(entry.path.clone()));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(entry.size_label());
        });
    });
}

/// Name, Size, Type and Modified columns as hover text.
fn details(entry: &FileEntry) -> String {
    let mut text = format!("Name: {}\nType: {}", entry.name, entry.type_label());

    if !entry.is_dir() {
        text.push_str(&format!("\nSize: {}", entry.size_label()));
    }

    if let Some(modified) = entry.modified {
        text.push_str(&format!("\nModified: {}", format_modified(modified)));
    }

    text
}

fn format_modified(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M").to_string()
}
