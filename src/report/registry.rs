use std::collections::HashMap;

use super::error::ReportError;
use super::link::{LinkEndpoints, LinkRecord, ResolvedLink, SheetRef};
use super::tree::{NodeId, NodeKind, ReportTree};

/// Lookup from report indices to tree nodes. Rebuilt for every loaded report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeRegistry {
    by_workbook: HashMap<u32, NodeId>,
    by_sheet: HashMap<u32, Vec<Option<NodeId>>>,
}

impl NodeRegistry {
    pub fn build(tree: &ReportTree) -> Self {
        let mut registry = Self::default();

        for id in tree.ids() {
            let node = tree.node(id);
            match node.kind {
                NodeKind::Workbook { index } => {
                    registry.by_workbook.entry(index).or_insert(id);
                }
                NodeKind::Sheet { index } => {
                    let Some(NodeKind::Workbook {
                        index: workbook_index,
                    }) = node.parent.map(|parent| tree.node(parent).kind)
                    else {
                        continue;
                    };

                    let sheets = registry.by_sheet.entry(workbook_index).or_default();
                    if sheets.len() <= index {
                        sheets.resize(index + 1, None);
                    }
                    sheets[index].get_or_insert(id);
                }
                NodeKind::Root | NodeKind::Folder => {}
            }
        }

        registry
    }

    pub fn workbook(&self, index: u32) -> Option<NodeId> {
        self.by_workbook.get(&index).copied()
    }

    pub fn sheet(&self, sheet: SheetRef) -> Option<NodeId> {
        self.by_sheet
            .get(&sheet.workbook)
            .and_then(|sheets| sheets.get(sheet.sheet))
            .copied()
            .flatten()
    }

    pub fn resolve(&self, record: LinkRecord) -> Result<ResolvedLink, ReportError> {
        let dangling = |missing: String| ReportError::DanglingReference {
            line: record.line,
            endpoints: record.endpoints,
            missing,
        };

        let (source, target) = match record.endpoints {
            LinkEndpoints::Workbook { source, target } => (
                self.workbook(source)
                    .ok_or_else(|| dangling(format!("workbook {source}")))?,
                self.workbook(target)
                    .ok_or_else(|| dangling(format!("workbook {target}")))?,
            ),
            LinkEndpoints::Sheet { source, target } => (
                self.sheet(source).ok_or_else(|| dangling(source.to_string()))?,
                self.sheet(target).ok_or_else(|| dangling(target.to_string()))?,
            ),
        };

        Ok(ResolvedLink {
            record,
            source,
            target,
        })
    }

    /// Resolves every record in order; the first unknown endpoint fails the batch.
    pub fn resolve_all(&self, records: &[LinkRecord]) -> Result<Vec<ResolvedLink>, ReportError> {
        records.iter().map(|record| self.resolve(*record)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::parse::parse_lines;

    const REPORT: [&str; 8] = [
        "1 folderA/book1.xlsx",
        "Sheet1",
        "Sheet2",
        "2 folderA/book2.xlsx",
        "Sheet1",
        "#+ 1 2 5",
        "#+s 1 0 2 0 3",
        "#$",
    ];

    #[test]
    fn resolves_workbook_and_sheet_links() {
        let report = parse_lines(REPORT).expect("parses");
        let registry = NodeRegistry::build(&report.tree);
        let links = registry.resolve_all(&report.links).expect("resolves");

        let book1 = registry.workbook(1).expect("book1");
        let book2 = registry.workbook(2).expect("book2");
        assert_eq!(report.tree.node(book1).name, "book1.xlsx");
        assert_eq!((links[0].source, links[0].target), (book1, book2));

        let sheet_a = report.tree.children(book1)[0];
        let sheet_b = report.tree.children(book2)[0];
        assert_eq!((links[1].source, links[1].target), (sheet_a, sheet_b));
        assert_eq!(links[1].count(), 3);
    }

    #[test]
    fn every_declared_index_is_registered() {
        let report = parse_lines(REPORT).expect("parses");
        let registry = NodeRegistry::build(&report.tree);

        for id in report.tree.ids() {
            let node = report.tree.node(id);
            match node.kind {
                NodeKind::Workbook { index } => assert_eq!(registry.workbook(index), Some(id)),
                NodeKind::Sheet { index } => {
                    let Some(parent) = node.parent else {
                        panic!("sheet without parent");
                    };
                    let NodeKind::Workbook { index: workbook } = report.tree.node(parent).kind
                    else {
                        panic!("sheet parent is not a workbook");
                    };
                    assert_eq!(
                        registry.sheet(SheetRef {
                            workbook,
                            sheet: index
                        }),
                        Some(id)
                    );
                }
                _ => {}
            }
        }
        assert_eq!(registry.workbook(3), None);
        assert_eq!(
            registry.sheet(SheetRef {
                workbook: 2,
                sheet: 1
            }),
            None
        );
    }

    #[test]
    fn unknown_workbook_is_dangling() {
        let report = parse_lines(["1 a.xlsx", "2 b.xlsx", "#+ 9 2 5"]).expect("parses");
        let registry = NodeRegistry::build(&report.tree);
        let error = registry.resolve_all(&report.links).expect_err("dangling");

        match error {
            ReportError::DanglingReference { line, missing, .. } => {
                assert_eq!(line, 3);
                assert_eq!(missing, "workbook 9");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unknown_sheet_is_dangling() {
        let report = parse_lines(["1 a.xlsx", "S", "#+s 1 0 1 4 2"]).expect("parses");
        let registry = NodeRegistry::build(&report.tree);
        let error = registry.resolve_all(&report.links).expect_err("dangling");
        assert!(matches!(error, ReportError::DanglingReference { line: 3, .. }));
    }
}
