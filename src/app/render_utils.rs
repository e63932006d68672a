use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::report::NodeKind;

/// Maps layout space onto the canvas: layout origin offset, then zoom, then pan.
#[derive(Clone, Copy, Debug)]
pub(super) struct ViewTransform {
    pub(super) canvas: Rect,
    pub(super) origin: Vec2,
    pub(super) pan: Vec2,
    pub(super) zoom: f32,
}

impl ViewTransform {
    pub(super) fn to_screen(&self, world: Pos2) -> Pos2 {
        self.canvas.left_top() + self.pan + (world.to_vec2() + self.origin) * self.zoom
    }

    pub(super) fn rect_to_screen(&self, world: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(world.min), self.to_screen(world.max))
    }

    pub(super) fn to_world(&self, screen: Pos2) -> Pos2 {
        ((screen - self.canvas.left_top() - self.pan) / self.zoom - self.origin).to_pos2()
    }
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, transform: &ViewTransform) {
    let rect = transform.canvas;
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * transform.zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.left_top() + transform.pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn node_fill(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Root => Color32::from_rgba_unmultiplied(128, 128, 128, 60),
        NodeKind::Folder => Color32::from_rgba_unmultiplied(128, 128, 128, 77),
        NodeKind::Workbook { .. } => Color32::from_rgba_unmultiplied(96, 140, 190, 70),
        NodeKind::Sheet { .. } => Color32::from_rgba_unmultiplied(150, 150, 150, 90),
    }
}

pub(super) fn edge_color(highlighted: bool) -> Color32 {
    if highlighted {
        Color32::from_rgba_unmultiplied(255, 92, 72, 200)
    } else {
        Color32::from_rgba_unmultiplied(230, 40, 40, 77)
    }
}
