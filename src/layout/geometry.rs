use eframe::egui::{Pos2, pos2};

use crate::config::LayoutConfig;
use crate::report::{LinkScope, NodeId, ResolvedLink};

use super::NodeLayout;

/// Straight parent → child line of the tree itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connector {
    pub parent: NodeId,
    pub child: NodeId,
    pub from: Pos2,
    pub to: Pos2,
}

/// Cubic curve drawn for one cross-reference link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgePath {
    /// Position of the link in the report's resolved link list.
    pub link: usize,
    pub source: NodeId,
    pub target: NodeId,
    pub scope: LinkScope,
    pub count: u64,
    pub points: [Pos2; 4],
    pub stroke_width: f32,
}

pub(super) fn connector(parent: &NodeLayout, child: &NodeLayout, config: &LayoutConfig) -> Connector {
    Connector {
        parent: parent.node,
        child: child.node,
        from: pos2(parent.anchor.x + config.box_width, parent.anchor.y),
        to: child.anchor,
    }
}

/// Leaves the target box on its right side and enters the source box from the
/// left, bulging outward on both ends so the curve never follows a tree line.
pub(super) fn curve_points(source: &NodeLayout, target: &NodeLayout, config: &LayoutConfig) -> [Pos2; 4] {
    let start = pos2(target.anchor.x + target.size.x, target.anchor.y);
    let end = source.anchor;
    [
        start,
        pos2(start.x + config.edge_curve_offset, start.y),
        pos2(end.x - config.edge_curve_offset, end.y),
        end,
    ]
}

/// `None` for self-links, which have no geometry.
pub(super) fn edge_path(
    link: usize,
    resolved: &ResolvedLink,
    source: &NodeLayout,
    target: &NodeLayout,
    stroke_width: f32,
    config: &LayoutConfig,
) -> Option<EdgePath> {
    if resolved.is_self_link() {
        return None;
    }

    Some(EdgePath {
        link,
        source: resolved.source,
        target: resolved.target,
        scope: resolved.scope(),
        count: resolved.count(),
        points: curve_points(source, target, config),
        stroke_width,
    })
}
