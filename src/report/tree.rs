#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Folder,
    Workbook { index: u32 },
    Sheet { index: usize },
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Folder => "folder",
            Self::Workbook { .. } => "workbook",
            Self::Sheet { .. } => "sheet",
        }
    }

    /// Workbook number or sheet position as written in the report.
    pub fn report_index(self) -> Option<usize> {
        match self {
            Self::Workbook { index } => Some(index as usize),
            Self::Sheet { index } => Some(index),
            Self::Root | Self::Folder => None,
        }
    }

    pub fn is_workbook(self) -> bool {
        matches!(self, Self::Workbook { .. })
    }

    pub fn is_sheet(self) -> bool {
        matches!(self, Self::Sheet { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Result of merging one declared path into the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Merged {
    /// Node the last path segment landed on.
    pub node: NodeId,
    /// `false` when the whole path already existed.
    pub created: bool,
}

/// Folder → workbook → sheet hierarchy. Nodes live in an arena and are owned by
/// their parent's `children` list; `NodeId`s stay valid for the life of the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportTree {
    nodes: Vec<TreeNode>,
}

impl Default for ReportTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportTree {
    pub const ROOT_NAME: &'static str = "primaryRoot";

    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode {
                name: Self::ROOT_NAME.to_owned(),
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn workbook_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.kind.is_workbook()).count()
    }

    pub fn sheet_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.kind.is_sheet()).count()
    }

    /// Pre-order walk starting at `from`, children in declaration order.
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Names from the first level below the root down to `id`.
    pub fn path_names(&self, id: NodeId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current);
            if node.kind != NodeKind::Root {
                names.push(node.name.as_str());
            }
            cursor = node.parent;
        }
        names.reverse();
        names
    }

    fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.node(*child).name == name)
    }

    fn push_child(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            name: name.to_owned(),
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Inserts `segments` below `at`, reusing every existing prefix. The final
    /// segment becomes the workbook node carrying `workbook_index`.
    ///
    /// Only the root and folders take children: a path that would continue below an
    /// existing workbook or sheet leaves the tree untouched and returns that node as `Err`.
    pub fn merge(
        &mut self,
        at: NodeId,
        segments: &[&str],
        workbook_index: u32,
    ) -> Result<Merged, NodeId> {
        let Some((head, rest)) = segments.split_first() else {
            return Ok(Merged {
                node: at,
                created: false,
            });
        };

        if let Some(existing) = self.child_named(at, head) {
            let container = matches!(self.node(existing).kind, NodeKind::Root | NodeKind::Folder);
            if !rest.is_empty() && !container {
                return Err(existing);
            }
            return self.merge(existing, rest, workbook_index);
        }

        let kind = if rest.is_empty() {
            NodeKind::Workbook {
                index: workbook_index,
            }
        } else {
            NodeKind::Folder
        };
        let created = self.push_child(at, head, kind);
        let merged = self.merge(created, rest, workbook_index)?;
        Ok(Merged {
            node: merged.node,
            created: true,
        })
    }

    /// Appends a sheet leaf; its index is the number of sheets already in `workbook`.
    pub fn push_sheet(&mut self, workbook: NodeId, name: &str) -> NodeId {
        let index = self
            .children(workbook)
            .iter()
            .filter(|child| self.node(**child).kind.is_sheet())
            .count();
        self.push_child(workbook, name, NodeKind::Sheet { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_prefix_is_merged_once() {
        let mut tree = ReportTree::new();
        let root = tree.root();
        let first = tree.merge(root, &["folderA", "book1.xlsx"], 1).expect("merges");
        let second = tree.merge(root, &["folderA", "book2.xlsx"], 2).expect("merges");

        assert!(first.created);
        assert!(second.created);
        assert_eq!(tree.children(root).len(), 1);

        let folder = tree.children(root)[0];
        assert_eq!(tree.node(folder).name, "folderA");
        assert_eq!(tree.node(folder).kind, NodeKind::Folder);
        assert_eq!(tree.children(folder), &[first.node, second.node]);
        assert_eq!(tree.node(first.node).kind, NodeKind::Workbook { index: 1 });
        assert_eq!(tree.node(second.node).kind, NodeKind::Workbook { index: 2 });
    }

    #[test]
    fn existing_path_returns_found_node() {
        let mut tree = ReportTree::new();
        let root = tree.root();
        let first = tree.merge(root, &["a", "b.xlsx"], 1).expect("merges");
        let again = tree.merge(root, &["a", "b.xlsx"], 7).expect("merges");

        assert!(!again.created);
        assert_eq!(again.node, first.node);
        assert_eq!(tree.node(again.node).kind, NodeKind::Workbook { index: 1 });
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn siblings_keep_insertion_order() {
        let mut tree = ReportTree::new();
        let root = tree.root();
        tree.merge(root, &["z.xlsx"], 1).expect("merges");
        tree.merge(root, &["a.xlsx"], 2).expect("merges");
        tree.merge(root, &["m", "q.xlsx"], 3).expect("merges");

        let names = tree
            .children(root)
            .iter()
            .map(|id| tree.node(*id).name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["z.xlsx", "a.xlsx", "m"]);
    }

    #[test]
    fn sheets_are_numbered_per_workbook() {
        let mut tree = ReportTree::new();
        let root = tree.root();
        let book = tree.merge(root, &["b.xlsx"], 4).expect("merges").node;
        let s0 = tree.push_sheet(book, "Sheet1");
        let s1 = tree.push_sheet(book, "Sheet2");

        assert_eq!(tree.node(s0).kind, NodeKind::Sheet { index: 0 });
        assert_eq!(tree.node(s1).kind, NodeKind::Sheet { index: 1 });
        assert_eq!(tree.node(s1).parent, Some(book));
        assert_eq!(tree.path_names(s1), ["b.xlsx", "Sheet2"]);
        assert_eq!(tree.descendants(root), [root, book, s0, s1]);
    }

    #[test]
    fn workbooks_and_sheets_take_no_children() {
        let mut tree = ReportTree::new();
        let root = tree.root();
        let book = tree.merge(root, &["a.xlsx"], 1).expect("merges").node;
        let sheet = tree.push_sheet(book, "S");
        let before = tree.clone();

        assert_eq!(tree.merge(root, &["a.xlsx", "b.xlsx"], 2), Err(book));
        assert_eq!(tree.merge(root, &["a.xlsx", "S", "c.xlsx"], 3), Err(book));
        assert_eq!(tree.merge(book, &["S", "c.xlsx"], 3), Err(sheet));
        assert_eq!(tree, before);
    }
}
