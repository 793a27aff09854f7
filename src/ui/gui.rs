use super::{ExtractorShell, Notice};
use crate::{Dispatcher, ExtractError, Result};
use eframe::egui;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::PathBuf;
use std::time::Duration;

const WINDOW_TITLE: &str = "PDF Image Extractor";
const START_GREEN: egui::Color32 = egui::Color32::from_rgb(0x4C, 0xAF, 0x50);

/// Open the extractor window and block until it is closed.
///
/// A run still in progress when the window closes is not waited for; it ends
/// with the process.
pub fn run_gui(dispatcher: Dispatcher) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(ExtractorApp {
                shell: ExtractorShell::new(dispatcher),
            }))
        }),
    )
    .map_err(|e| ExtractError::Gui(e.to_string()))
}

struct ExtractorApp {
    shell: ExtractorShell,
}

impl eframe::App for ExtractorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.shell.poll();

        egui::CentralPanel::default().show(ctx, |ui| {
            if folder_row(ui, "Input Folder:", self.shell.input_dir()) {
                self.shell.choose_input_dir(FileDialog::new().pick_folder());
            }
            if folder_row(ui, "Output Folder:", self.shell.output_dir()) {
                self.shell.choose_output_dir(FileDialog::new().pick_folder());
            }

            ui.add_space(10.0);
            let start = egui::Button::new(
                egui::RichText::new(self.shell.start_label()).color(egui::Color32::WHITE),
            )
            .fill(START_GREEN)
            .min_size(egui::vec2(ui.available_width(), 36.0));
            if ui.add_enabled(self.shell.can_start(), start).clicked() {
                self.shell.start();
            }
            ui.add_space(10.0);

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in self.shell.log_lines() {
                        ui.label(line);
                    }
                });
        });

        if let Some(notice) = self.shell.take_notice() {
            show_notice(&notice);
        }

        if self.shell.is_running() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

/// One "label / read-only path / Browse..." row. Returns `true` when the
/// browse button was clicked.
fn folder_row(ui: &mut egui::Ui, label: &str, folder: Option<&PathBuf>) -> bool {
    let mut clicked = false;
    ui.horizontal(|ui| {
        ui.add_sized([100.0, 20.0], egui::Label::new(label));

        let mut shown = folder.map(|f| f.display().to_string()).unwrap_or_default();
        let width = (ui.available_width() - 90.0).max(80.0);
        ui.add_sized(
            [width, 20.0],
            egui::TextEdit::singleline(&mut shown).interactive(false),
        );

        clicked = ui.button("Browse...").clicked();
    });
    clicked
}

fn show_notice(notice: &Notice) {
    let (level, title, message) = match notice {
        Notice::Error { title, message } => (MessageLevel::Error, title, message),
        Notice::Info { title, message } => (MessageLevel::Info, title, message),
    };

    MessageDialog::new()
        .set_level(level)
        .set_title(title.as_str())
        .set_description(message.as_str())
        .set_buttons(MessageButtons::Ok)
        .show();
}
