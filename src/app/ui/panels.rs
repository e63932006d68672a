use std::path::PathBuf;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::report::LinkScope;
use crate::session::Session;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) const MIN_ZOOM: f32 = 0.05;
    pub(in crate::app) const MAX_ZOOM: f32 = 6.0;
    pub(in crate::app) const WARNING_ROWS: usize = 200;

    pub(in crate::app) fn new(session: Session, path: PathBuf) -> Self {
        Self {
            session,
            path,
            search: String::new(),
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            fit_requested: false,
            layout_cache: None,
            transition: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("workbook-links");
                    ui.separator();
                    let file_name = self
                        .path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| self.path.display().to_string());
                    ui.label(file_name)
                        .on_hover_text(self.path.display().to_string());
                    ui.label(self.summary_text());

                    if ui
                        .button("Switch view")
                        .on_hover_text("Toggle between workbooks only and workbooks with sheets.")
                        .clicked()
                    {
                        self.session.toggle_level_of_detail();
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload report"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("view: {}", self.session.level().label()));
                        let warnings = self.session.report().warnings.len();
                        if warnings > 0 {
                            ui.colored_label(
                                egui::Color32::from_rgb(240, 190, 90),
                                format!("{warnings} skipped lines"),
                            );
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading link report...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    fn summary_text(&self) -> String {
        let report = self.session.report();
        format!(
            "workbooks: {}  sheets: {}  workbook links: {}  sheet links: {}",
            report.tree.workbook_count(),
            report.tree.sheet_count(),
            report.link_count(LinkScope::Workbook),
            report.link_count(LinkScope::Sheet),
        )
    }
}
