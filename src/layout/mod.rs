mod cluster;
mod geometry;
mod reconcile;
mod scale;

use std::collections::HashMap;

use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::config::LayoutConfig;
use crate::report::{LinkScope, NodeId, Report};

pub use geometry::{Connector, EdgePath};
pub use reconcile::{reconcile, tween};
pub use scale::LogScale;

use cluster::visible_children;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LevelOfDetail {
    #[default]
    WorkbookOnly,
    WithSheets,
}

impl LevelOfDetail {
    pub fn toggled(self) -> Self {
        match self {
            Self::WorkbookOnly => Self::WithSheets,
            Self::WithSheets => Self::WorkbookOnly,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::WorkbookOnly => "Workbooks",
            Self::WithSheets => "Workbooks + sheets",
        }
    }

    /// The one link category drawn at this level.
    pub fn visible_scope(self) -> LinkScope {
        match self {
            Self::WorkbookOnly => LinkScope::Workbook,
            Self::WithSheets => LinkScope::Sheet,
        }
    }
}

/// Area the tree is fitted into: depth runs along `width`, siblings along `height`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Leaves room for the margins and for the boxes hanging right of the deepest column.
    pub fn inside_canvas(canvas: Vec2, config: &LayoutConfig) -> Self {
        Self::new(
            canvas.x - 4.0 * config.margin - 2.0 * config.box_width,
            canvas.y - 2.0 * config.margin,
        )
    }

    /// Offset of layout space inside the canvas.
    pub fn origin(config: &LayoutConfig) -> Vec2 {
        vec2(0.5 * config.box_width + config.margin, config.margin)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeLayout {
    pub node: NodeId,
    /// Left edge of the box, vertically centred.
    pub anchor: Pos2,
    pub size: Vec2,
    pub font_size: f32,
}

impl NodeLayout {
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(pos2(self.anchor.x, self.anchor.y - 0.5 * self.size.y), self.size)
    }
}

/// Everything a renderer needs for one frame at one level of detail.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutState {
    pub level: LevelOfDetail,
    /// Visible nodes, parents before children.
    pub nodes: Vec<NodeLayout>,
    pub connectors: Vec<Connector>,
    pub edges: Vec<EdgePath>,
    index: HashMap<NodeId, usize>,
}

impl LayoutState {
    fn from_parts(
        level: LevelOfDetail,
        nodes: Vec<NodeLayout>,
        connectors: Vec<Connector>,
        edges: Vec<EdgePath>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(position, layout)| (layout.node, position))
            .collect();
        Self {
            level,
            nodes,
            connectors,
            edges,
            index,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeLayout> {
        self.index.get(&id).map(|&position| &self.nodes[position])
    }

    pub fn bounds(&self) -> Rect {
        self.nodes
            .iter()
            .map(NodeLayout::rect)
            .reduce(|acc, rect| acc.union(rect))
            .unwrap_or(Rect::NOTHING)
    }
}

/// Lays out the part of `report` visible at `level`. Pure: the result depends on
/// the arguments only, so calling it again supersedes any earlier state.
pub fn compute_layout(
    report: &Report,
    level: LevelOfDetail,
    viewport: Viewport,
    config: &LayoutConfig,
) -> LayoutState {
    let tree = &report.tree;
    let positions = cluster::cluster(tree, level, vec2(viewport.width, viewport.height));

    let mut order = Vec::with_capacity(tree.len());
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        order.push(id);
        stack.extend(visible_children(tree, id, level).iter().rev().copied());
    }

    let mut nodes: Vec<NodeLayout> = Vec::with_capacity(order.len());
    let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(order.len());
    for &id in &order {
        let Some(anchor) = positions[id.index()] else {
            continue;
        };
        let node = tree.node(id);
        let mut layout = NodeLayout {
            node: id,
            anchor,
            size: vec2(config.box_width, config.box_height),
            font_size: config.large_font_size,
        };

        if node.kind.is_sheet() {
            layout.font_size = config.small_font_size;
            if let Some(parent) = node.parent.and_then(|parent| index.get(&parent)) {
                let parent: &NodeLayout = &nodes[*parent];
                layout.anchor.x = parent.anchor.x + config.margin;
            }
        }

        if node.kind.is_workbook() {
            let children = visible_children(tree, id, level);
            let first = children.first().and_then(|child| positions[child.index()]);
            let last = children.last().and_then(|child| positions[child.index()]);
            if let (Some(first), Some(last)) = (first, last) {
                layout.size = vec2(
                    config.box_width + 2.0 * config.margin,
                    last.y - first.y + config.box_height + 2.0 * config.margin,
                );
            }
        }

        index.insert(id, nodes.len());
        nodes.push(layout);
    }

    let mut connectors = Vec::new();
    for &id in &order {
        if tree.node(id).kind.is_workbook() {
            continue;
        }
        let Some(&parent) = index.get(&id) else {
            continue;
        };
        for child in visible_children(tree, id, level) {
            if let Some(&child) = index.get(child) {
                connectors.push(geometry::connector(&nodes[parent], &nodes[child], config));
            }
        }
    }

    let scale = LogScale::fit(report.count_range, config.stroke_width_range);
    let scope = level.visible_scope();
    let edges = report
        .links
        .iter()
        .enumerate()
        .filter(|(_, link)| link.scope() == scope)
        .filter_map(|(position, link)| {
            let source = &nodes[*index.get(&link.source)?];
            let target = &nodes[*index.get(&link.target)?];
            geometry::edge_path(
                position,
                link,
                source,
                target,
                scale.apply(link.count()),
                config,
            )
        })
        .collect();

    LayoutState::from_parts(level, nodes, connectors, edges)
}
