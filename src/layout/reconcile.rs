use std::collections::HashSet;
use std::hash::Hash;

use crate::config::LayoutConfig;
use crate::report::{NodeId, ReportTree};

use super::geometry::{EdgePath, connector, curve_points};
use super::{LayoutState, NodeLayout};

/// Membership change of one kind of element between two layout passes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diff<K> {
    pub entered: Vec<K>,
    pub retained: Vec<K>,
    pub exited: Vec<K>,
}

impl<K: Copy + Eq + Hash> Diff<K> {
    fn between(previous: impl IntoIterator<Item = K>, next: impl IntoIterator<Item = K>) -> Self {
        let previous = previous.into_iter().collect::<Vec<_>>();
        let next = next.into_iter().collect::<Vec<_>>();
        let before = previous.iter().copied().collect::<HashSet<_>>();
        let after = next.iter().copied().collect::<HashSet<_>>();

        let (retained, entered) = next.into_iter().partition(|key| before.contains(key));
        let exited = previous
            .into_iter()
            .filter(|key| !after.contains(key))
            .collect();

        Self {
            entered,
            retained,
            exited,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub nodes: Diff<NodeId>,
    pub connectors: Diff<(NodeId, NodeId)>,
    pub edges: Diff<usize>,
}

impl Reconciliation {
    pub fn is_unchanged(&self) -> bool {
        self.nodes.is_unchanged() && self.connectors.is_unchanged() && self.edges.is_unchanged()
    }
}

pub fn reconcile(previous: &LayoutState, next: &LayoutState) -> Reconciliation {
    Reconciliation {
        nodes: Diff::between(
            previous.nodes.iter().map(|node| node.node),
            next.nodes.iter().map(|node| node.node),
        ),
        connectors: Diff::between(
            previous.connectors.iter().map(|c| (c.parent, c.child)),
            next.connectors.iter().map(|c| (c.parent, c.child)),
        ),
        edges: Diff::between(
            previous.edges.iter().map(|edge| edge.link),
            next.edges.iter().map(|edge| edge.link),
        ),
    }
}

/// Intermediate frame `t` (0..=1) of the move from `previous` to `next`. Elements
/// only in `previous` are gone at once; new nodes grow out of their nearest
/// ancestor that was already on screen.
pub fn tween(
    previous: &LayoutState,
    next: &LayoutState,
    tree: &ReportTree,
    t: f32,
    config: &LayoutConfig,
) -> LayoutState {
    let t = t.clamp(0.0, 1.0);
    if t >= 1.0 {
        return next.clone();
    }

    let nodes = next
        .nodes
        .iter()
        .map(|target| {
            let start = previous
                .node(target.node)
                .copied()
                .or_else(|| entry_point(previous, tree, target))
                .unwrap_or(*target);
            NodeLayout {
                node: target.node,
                anchor: start.anchor + (target.anchor - start.anchor) * t,
                size: start.size + (target.size - start.size) * t,
                font_size: start.font_size + (target.font_size - start.font_size) * t,
            }
        })
        .collect::<Vec<_>>();

    let mut frame = LayoutState::from_parts(next.level, nodes, Vec::new(), Vec::new());

    frame.connectors = next
        .connectors
        .iter()
        .filter_map(|c| Some(connector(frame.node(c.parent)?, frame.node(c.child)?, config)))
        .collect();
    frame.edges = next
        .edges
        .iter()
        .filter_map(|edge| {
            let source = frame.node(edge.source)?;
            let target = frame.node(edge.target)?;
            Some(EdgePath {
                points: curve_points(source, target, config),
                ..*edge
            })
        })
        .collect();

    frame
}

fn entry_point(previous: &LayoutState, tree: &ReportTree, target: &NodeLayout) -> Option<NodeLayout> {
    let mut cursor = tree.node(target.node).parent;
    while let Some(ancestor) = cursor {
        if let Some(origin) = previous.node(ancestor) {
            return Some(NodeLayout {
                anchor: origin.anchor,
                ..*target
            });
        }
        cursor = tree.node(ancestor).parent;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LevelOfDetail, Viewport, compute_layout};
    use crate::report::{Report, parse_lines};

    fn report() -> Report {
        let parsed = parse_lines([
            "1 folderA/book1.xlsx",
            "Sheet1",
            "Sheet2",
            "2 folderA/book2.xlsx",
            "Sheet1",
            "#+ 1 2 5",
            "#+s 1 0 2 0 3",
        ])
        .expect("parses");
        Report::from_parsed(parsed).expect("resolves")
    }

    fn layouts(report: &Report) -> (LayoutState, LayoutState) {
        let config = LayoutConfig::default();
        let viewport = Viewport::new(640.0, 480.0);
        (
            compute_layout(report, LevelOfDetail::WorkbookOnly, viewport, &config),
            compute_layout(report, LevelOfDetail::WithSheets, viewport, &config),
        )
    }

    #[test]
    fn expanding_sheets_enters_sheet_nodes() {
        let report = report();
        let (collapsed, expanded) = layouts(&report);
        let diff = reconcile(&collapsed, &expanded);

        assert_eq!(diff.nodes.retained.len(), 4);
        assert_eq!(diff.nodes.entered.len(), 3);
        assert!(diff.nodes.exited.is_empty());
        assert!(
            diff.nodes
                .entered
                .iter()
                .all(|id| report.tree.node(*id).kind.is_sheet())
        );
        assert_eq!(diff.edges.entered, [1]);
        assert_eq!(diff.edges.exited, [0]);
        assert!(diff.connectors.is_unchanged());
    }

    #[test]
    fn collapsing_reverses_the_diff() {
        let report = report();
        let (collapsed, expanded) = layouts(&report);
        let forward = reconcile(&collapsed, &expanded);
        let backward = reconcile(&expanded, &collapsed);

        assert_eq!(backward.nodes.exited, forward.nodes.entered);
        assert_eq!(backward.nodes.entered, forward.nodes.exited);
        assert!(reconcile(&expanded, &expanded).is_unchanged());
    }

    #[test]
    fn tween_ends_match_layouts() {
        let report = report();
        let config = LayoutConfig::default();
        let (collapsed, expanded) = layouts(&report);

        let end = tween(&collapsed, &expanded, &report.tree, 1.0, &config);
        assert_eq!(end, expanded);

        let start = tween(&collapsed, &expanded, &report.tree, 0.0, &config);
        let book1 = report.registry.workbook(1).expect("book1");
        assert_eq!(start.node(book1), collapsed.node(book1));

        let sheet = report.tree.children(book1)[0];
        let sheet_start = start.node(sheet).expect("entered sheet");
        assert_eq!(sheet_start.anchor, collapsed.node(book1).expect("book1").anchor);
        assert_eq!(start.edges.len(), expanded.edges.len());
    }
}
