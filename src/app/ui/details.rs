use eframe::egui::{self, RichText, Ui};

use crate::report::{NodeId, NodeKind, ReportTree, ResolvedLink};

use super::super::ViewModel;

/// Links shown per direction before the list is cut off.
const LINK_ROWS: usize = 64;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected) = self.selected else {
            ui.label("Select a node from the diagram or the search results.");
            return;
        };

        let report = self.session.report();
        let Some(node) = report.tree.get(selected) else {
            ui.label("Selected node no longer exists in the loaded report.");
            return;
        };

        ui.label(RichText::new(node.name.as_str()).strong());
        ui.small(report.tree.path_names(selected).join(" / "));
        ui.add_space(6.0);

        ui.label(format!("Type: {}", node.kind.label()));
        match node.kind {
            NodeKind::Workbook { index } => {
                ui.label(format!("Workbook index: {index}"));
                ui.label(format!("Sheets: {}", node.children.len()));
            }
            NodeKind::Sheet { index } => {
                ui.label(format!("Sheet index: {index}"));
            }
            NodeKind::Root | NodeKind::Folder => {
                let workbooks = report
                    .tree
                    .descendants(selected)
                    .into_iter()
                    .filter(|id| report.tree.node(*id).kind.is_workbook())
                    .count();
                ui.label(format!("Workbooks below: {workbooks}"));
            }
        }

        let (outgoing, incoming) = report.link_totals(selected);
        ui.label(format!("References made: {outgoing}"));
        ui.label(format!("References received: {incoming}"));

        let outgoing_links: Vec<&ResolvedLink> = report
            .links
            .iter()
            .filter(|link| link.source == selected)
            .collect();
        let incoming_links: Vec<&ResolvedLink> = report
            .links
            .iter()
            .filter(|link| link.target == selected)
            .collect();

        ui.separator();
        let jump_to = egui::ScrollArea::vertical()
            .id_salt("detail_links")
            .auto_shrink([false, true])
            .show(ui, |ui| {
                ui.label(RichText::new("Links to").strong());
                let outgoing_jump = link_rows(ui, &report.tree, &outgoing_links, |link| link.target);

                ui.add_space(6.0);
                ui.label(RichText::new("Links from").strong());
                let incoming_jump = link_rows(ui, &report.tree, &incoming_links, |link| link.source);
                outgoing_jump.or(incoming_jump)
            })
            .inner;

        if let Some(id) = jump_to {
            self.selected = Some(id);
        }
    }
}

/// One clickable row per link; returns the endpoint the user clicked.
fn link_rows(
    ui: &mut Ui,
    tree: &ReportTree,
    links: &[&ResolvedLink],
    other_end: impl Fn(&ResolvedLink) -> NodeId,
) -> Option<NodeId> {
    if links.is_empty() {
        ui.small("none");
        return None;
    }

    let mut clicked = None;
    for link in links.iter().take(LINK_ROWS) {
        let other = other_end(link);
        let text = format!(
            "{} ({} link, {}x)",
            tree.node(other).name,
            link.scope().label(),
            link.count()
        );
        let row = ui.link(text).on_hover_text(format!(
            "line {}: {}",
            link.record.line, link.record.endpoints
        ));
        if row.clicked() {
            clicked = Some(other);
        }
    }

    if links.len() > LINK_ROWS {
        ui.small(format!("... and {} more", links.len() - LINK_ROWS));
    }
    clicked
}
