use eframe::egui::{Pos2, Vec2, pos2};

use crate::report::{NodeId, ReportTree};

use super::LevelOfDetail;

/// Children taking part in layout. Sheets stay in the tree but hang off
/// workbooks only when they are shown.
pub(super) fn visible_children(tree: &ReportTree, id: NodeId, level: LevelOfDetail) -> &[NodeId] {
    if level == LevelOfDetail::WorkbookOnly && tree.node(id).kind.is_workbook() {
        &[]
    } else {
        tree.children(id)
    }
}

fn separation(tree: &ReportTree, a: NodeId, b: NodeId) -> f32 {
    if tree.node(a).parent == tree.node(b).parent {
        1.0
    } else {
        2.0
    }
}

struct Cluster<'a> {
    tree: &'a ReportTree,
    level: LevelOfDetail,
    previous_leaf: Option<NodeId>,
    cursor: f32,
    /// Breadth in separation units and height above the deepest leaf.
    raw: Vec<Option<(f32, u32)>>,
}

impl Cluster<'_> {
    fn place(&mut self, id: NodeId) -> (f32, u32) {
        let tree = self.tree;
        let children = visible_children(tree, id, self.level);

        let placed = if children.is_empty() {
            let breadth = match self.previous_leaf {
                Some(previous) => self.cursor + separation(tree, previous, id),
                None => 0.0,
            };
            self.cursor = breadth;
            self.previous_leaf = Some(id);
            (breadth, 0)
        } else {
            let mut sum = 0.0;
            let mut height = 0;
            for &child in children {
                let (breadth, child_height) = self.place(child);
                sum += breadth;
                height = height.max(child_height + 1);
            }
            (sum / children.len() as f32, height)
        };

        self.raw[id.index()] = Some(placed);
        placed
    }

    fn edge_leaf(&self, mut id: NodeId, pick: fn(&[NodeId]) -> Option<&NodeId>) -> NodeId {
        while let Some(&next) = pick(visible_children(self.tree, id, self.level)) {
            id = next;
        }
        id
    }
}

/// Dendrogram placement of the visible tree: leaves evenly spaced along the breadth
/// axis (y), parents centred over their children, every leaf at full depth (x).
/// `extent.x` is the depth span, `extent.y` the breadth span. Hidden nodes get `None`.
pub(super) fn cluster(tree: &ReportTree, level: LevelOfDetail, extent: Vec2) -> Vec<Option<Pos2>> {
    let root = tree.root();
    let mut cluster = Cluster {
        tree,
        level,
        previous_leaf: None,
        cursor: 0.0,
        raw: vec![None; tree.len()],
    };
    let (_, root_height) = cluster.place(root);

    let left = cluster.edge_leaf(root, <[NodeId]>::first);
    let right = cluster.edge_leaf(root, <[NodeId]>::last);
    let breadth_of = |id: NodeId| cluster.raw[id.index()].map_or(0.0, |(breadth, _)| breadth);
    let low = breadth_of(left) - separation(tree, left, right) / 2.0;
    let high = breadth_of(right) + separation(tree, right, left) / 2.0;
    let span = high - low;

    cluster
        .raw
        .iter()
        .map(|placed| {
            placed.map(|(breadth, height)| {
                let depth = if root_height > 0 {
                    1.0 - height as f32 / root_height as f32
                } else {
                    0.0
                };
                pos2(depth * extent.x, (breadth - low) / span * extent.y)
            })
        })
        .collect()
}
