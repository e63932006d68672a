use std::collections::HashSet;

use eframe::egui::epaint::CubicBezierShape;
use eframe::egui::{
    self, Align2, Color32, FontId, Sense, Stroke, StrokeKind, Ui, pos2, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::layout::{LayoutState, Viewport};
use crate::report::NodeId;

use super::super::ViewModel;
use super::super::render_utils::{blend_color, dim_color, draw_background, edge_color, node_fill};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn search_matches(&self, frame: &LayoutState) -> HashSet<NodeId> {
        let query = self.search.trim();
        if query.is_empty() {
            return HashSet::new();
        }

        let tree = &self.session.report().tree;
        let matcher = SkimMatcherV2::default();
        frame
            .nodes
            .iter()
            .map(|layout| layout.node)
            .filter(|id| fuzzy_match_score(&matcher, &tree.node(*id).name, query).is_some())
            .collect()
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        let now = ui.input(|input| input.time);
        let viewport = Viewport::inside_canvas(rect.size(), self.session.config());
        self.refresh_layout(viewport, now);
        if self.settle_transition(now) || response.dragged() {
            ui.ctx().request_repaint();
        }

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let transform = self.transform(rect);
        draw_background(&painter, &transform);

        let Some(frame) = self.frame_at(now) else {
            ui.label("Nothing to draw.");
            return;
        };

        let report = self.session.report();
        let config = self.session.config();
        let zoom = self.zoom;
        let matches = self.search_matches(&frame);
        let hovered = Self::hovered_node(ui, &frame, &transform);

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let focus = hovered.or(self.selected);
        let highlight_color = Color32::from_rgb(245, 206, 93);
        let match_color = Color32::from_rgb(103, 196, 255);

        for layout in &frame.nodes {
            let screen_rect = transform.rect_to_screen(layout.rect());
            if !screen_rect.intersects(rect) {
                continue;
            }

            let node = report.tree.node(layout.node);
            let is_selected = self.selected == Some(layout.node);
            let is_hovered = hovered == Some(layout.node);
            let is_match = matches.contains(&layout.node);

            let base_fill = node_fill(node.kind);
            let fill = if is_hovered {
                blend_color(base_fill, Color32::from_rgb(255, 164, 101), 0.45)
            } else if is_match {
                blend_color(base_fill, match_color, 0.55)
            } else if !matches.is_empty() {
                dim_color(base_fill, 0.5)
            } else {
                base_fill
            };
            let stroke = if is_selected {
                Stroke::new(2.2, highlight_color)
            } else {
                Stroke::new(1.0, Color32::from_gray(20))
            };

            painter.rect_filled(screen_rect, 2.0, fill);
            painter.rect_stroke(screen_rect, 2.0, stroke, StrokeKind::Inside);

            let padding = config.small_padding * zoom;
            let font = FontId::proportional((layout.font_size * zoom).max(1.0));
            let text_color = Color32::from_gray(235);
            let wraps_sheets = node.kind.is_workbook() && layout.size.y > config.box_height;

            if wraps_sheets {
                painter.text(
                    pos2(screen_rect.left() + padding, screen_rect.top() - padding),
                    Align2::LEFT_BOTTOM,
                    &node.name,
                    font,
                    text_color,
                );
            } else if node.kind.is_workbook() {
                painter.text(
                    pos2(screen_rect.left() + padding, screen_rect.center().y),
                    Align2::LEFT_CENTER,
                    &node.name,
                    font,
                    text_color,
                );
            } else {
                painter.with_clip_rect(screen_rect.shrink(padding)).text(
                    pos2(screen_rect.left() + padding, screen_rect.center().y),
                    Align2::LEFT_CENTER,
                    &node.name,
                    font,
                    text_color,
                );
            }
        }

        let connector_stroke = Stroke::new(1.0, Color32::from_gray(204));
        for connector in &frame.connectors {
            painter.line_segment(
                [transform.to_screen(connector.from), transform.to_screen(connector.to)],
                connector_stroke,
            );
        }

        for edge in &frame.edges {
            let highlighted = focus.is_some_and(|id| id == edge.source || id == edge.target);
            let points = edge.points.map(|point| transform.to_screen(point));
            let width = (edge.stroke_width * zoom).max(0.5);
            painter.add(CubicBezierShape::from_points_stroke(
                points,
                false,
                Color32::TRANSPARENT,
                Stroke::new(width, edge_color(highlighted)),
            ));
        }

        if let Some(id) = hovered {
            let node = report.tree.node(id);
            let (outgoing, incoming) = report.link_totals(id);
            let mut panel_text = format!("name: {}  |  type: {}", node.name, node.kind.label());
            if let Some(index) = node.kind.report_index() {
                panel_text.push_str(&format!("  |  ix {index}"));
            }
            panel_text.push_str(&format!("  |  out {outgoing} / in {incoming}"));

            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        let pending_selection = response
            .clicked_by(egui::PointerButton::Primary)
            .then_some(hovered);
        let fit_bounds = self.fit_requested.then(|| frame.bounds());
        drop(frame);

        if let Some(selected) = pending_selection {
            self.selected = selected;
        }
        if let Some(bounds) = fit_bounds {
            self.fit_requested = false;
            self.fit_view(rect, bounds);
            ui.ctx().request_repaint();
        }
    }
}
