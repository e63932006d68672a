use eframe::egui::{self, Rect, Ui, Vec2};

use crate::layout::{LayoutState, Viewport};
use crate::report::NodeId;

use super::super::ViewModel;
use super::super::render_utils::ViewTransform;

impl ViewModel {
    pub(in crate::app) fn transform(&self, rect: Rect) -> ViewTransform {
        ViewTransform {
            canvas: rect,
            origin: Viewport::origin(self.session.config()),
            pan: self.pan,
            zoom: self.zoom,
        }
    }

    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let transform = self.transform(rect);
        let world_before = transform.to_world(pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.set_zoom_about(rect, self.zoom * zoom_factor, world_before, pointer);
    }

    /// Changes the zoom while keeping `world` under `screen`.
    pub(in crate::app) fn set_zoom_about(
        &mut self,
        rect: Rect,
        zoom: f32,
        world: egui::Pos2,
        screen: egui::Pos2,
    ) {
        self.zoom = zoom.clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        let origin = Viewport::origin(self.session.config());
        self.pan = screen - rect.left_top() - (world.to_vec2() + origin) * self.zoom;
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    pub(in crate::app) fn reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Zooms so that `bounds` (layout space) fills the canvas, centred.
    pub(in crate::app) fn fit_view(&mut self, rect: Rect, bounds: Rect) {
        if !bounds.is_positive() {
            return;
        }

        let padded = bounds.expand(self.session.config().margin);
        let zoom = (rect.width() / padded.width()).min(rect.height() / padded.height());
        self.set_zoom_about(rect, zoom, padded.center(), rect.center());
    }

    /// Topmost node under the pointer. Later nodes are painted above earlier ones,
    /// so sheets win over the workbook box around them.
    pub(in crate::app) fn hovered_node(
        ui: &Ui,
        frame: &LayoutState,
        transform: &ViewTransform,
    ) -> Option<NodeId> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !transform.canvas.contains(pointer) {
            return None;
        }

        frame
            .nodes
            .iter()
            .rev()
            .find(|layout| transform.rect_to_screen(layout.rect()).contains(pointer))
            .map(|layout| layout.node)
    }
}
