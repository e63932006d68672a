use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::layout::LevelOfDetail;
use crate::report::NodeId;

use super::super::ViewModel;

const SEARCH_RESULT_LIMIT: usize = 24;

impl ViewModel {
    /// Nodes whose name matches the search query, best score first.
    fn search_results(&self) -> Vec<(NodeId, i64)> {
        let query = self.search.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let tree = &self.session.report().tree;
        let level = self.session.level();
        let matcher = SkimMatcherV2::default();
        let mut results: Vec<(NodeId, i64)> = tree
            .ids()
            .filter(|id| *id != tree.root())
            .filter(|id| level == LevelOfDetail::WithSheets || !tree.node(*id).kind.is_sheet())
            .filter_map(|id| {
                matcher
                    .fuzzy_match(&tree.node(id).name, query)
                    .map(|score| (id, score))
            })
            .collect();

        results.sort_by(|left, right| right.1.cmp(&left.1).then(left.0.cmp(&right.0)));
        results.truncate(SEARCH_RESULT_LIMIT);
        results
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Level of detail");
        let mut level = self.session.level();
        ui.horizontal_wrapped(|ui| {
            ui.selectable_value(
                &mut level,
                LevelOfDetail::WorkbookOnly,
                LevelOfDetail::WorkbookOnly.label(),
            )
            .on_hover_text("Show workbooks and links between workbooks.");
            ui.selectable_value(
                &mut level,
                LevelOfDetail::WithSheets,
                LevelOfDetail::WithSheets.label(),
            )
            .on_hover_text("Expand workbooks into their sheets and show sheet links.");
        });
        if level != self.session.level() {
            self.session.set_level(level);
        }

        ui.separator();

        ui.label("Search (workbook, folder or sheet name)")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the diagram.");
        ui.text_edit_singleline(&mut self.search);

        let results = self.search_results();
        if !self.search.trim().is_empty() {
            if results.is_empty() {
                ui.small("No matching nodes in this view.");
            } else {
                let mut clicked = None;
                egui::ScrollArea::vertical()
                    .id_salt("search_results")
                    .max_height(180.0)
                    .show(ui, |ui| {
                        let tree = &self.session.report().tree;
                        for (id, _) in &results {
                            let node = tree.node(*id);
                            let label = format!("{} ({})", node.name, node.kind.label());
                            if ui
                                .selectable_label(self.selected == Some(*id), label)
                                .clicked()
                            {
                                clicked = Some(*id);
                            }
                        }
                    });
                if let Some(id) = clicked {
                    self.selected = Some(id);
                }
            }
        }

        ui.separator();

        let mut zoom = self.zoom;
        let zoom_slider = ui.add(
            egui::Slider::new(&mut zoom, Self::MIN_ZOOM..=Self::MAX_ZOOM)
                .logarithmic(true)
                .text("Zoom"),
        );
        if zoom_slider.changed() {
            self.zoom = zoom;
        }

        ui.horizontal(|ui| {
            if ui.button("Reset view").clicked() {
                self.reset_view();
            }
            if ui
                .button("Fit diagram")
                .on_hover_text("Zoom and pan so the whole diagram is visible.")
                .clicked()
            {
                self.fit_requested = true;
            }
        });

        ui.separator();

        let warnings = &self.session.report().warnings;
        ui.label(RichText::new(format!("Skipped lines ({})", warnings.len())).strong());
        if warnings.is_empty() {
            ui.small("Every line of the report was understood.");
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("warnings")
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for warning in warnings.iter().take(Self::WARNING_ROWS) {
                    ui.small(warning.to_string());
                }
                if warnings.len() > Self::WARNING_ROWS {
                    ui.small(format!(
                        "... and {} more",
                        warnings.len() - Self::WARNING_ROWS
                    ));
                }
            });
    }
}
