use std::collections::HashSet;
use std::ops::ControlFlow;

use tracing::{debug, warn};

use super::error::{ParseWarning, ReportError};
use super::link::{LinkEndpoints, LinkRecord, SheetRef};
use super::tree::{NodeId, NodeKind, ReportTree};

const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xlsb", "xls"];

/// Smallest and largest link count seen in a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountRange {
    pub min: u64,
    pub max: u64,
}

impl CountRange {
    fn include(range: Option<Self>, count: u64) -> Self {
        match range {
            Some(range) => Self {
                min: range.min.min(count),
                max: range.max.max(count),
            },
            None => Self {
                min: count,
                max: count,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct ParsedReport {
    pub tree: ReportTree,
    pub links: Vec<LinkRecord>,
    pub count_range: Option<CountRange>,
    pub warnings: Vec<ParseWarning>,
    /// `true` when the `#$` end marker was reached.
    pub terminated: bool,
}

enum Cursor {
    Empty,
    Workbook(NodeId),
    Skipping { reported: bool },
}

/// Line-by-line reader of the link report. Feed lines in file order, stop as soon
/// as [`ReportParser::feed_line`] breaks, then call [`ReportParser::finish`].
pub struct ReportParser {
    tree: ReportTree,
    links: Vec<LinkRecord>,
    declared: HashSet<u32>,
    cursor: Cursor,
    count_range: Option<CountRange>,
    warnings: Vec<ParseWarning>,
    line_number: usize,
    terminated: bool,
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportParser {
    pub fn new() -> Self {
        Self {
            tree: ReportTree::new(),
            links: Vec::new(),
            declared: HashSet::new(),
            cursor: Cursor::Empty,
            count_range: None,
            warnings: Vec::new(),
            line_number: 0,
            terminated: false,
        }
    }

    pub fn feed_line(&mut self, raw: &str) -> Result<ControlFlow<()>, ReportError> {
        if self.terminated {
            return Ok(ControlFlow::Break(()));
        }

        self.line_number += 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if let Some(marker) = line.strip_prefix('#') {
            if marker.starts_with('$') {
                debug!(line = self.line_number, "end marker reached");
                self.terminated = true;
                return Ok(ControlFlow::Break(()));
            }
            if let Some(body) = marker.strip_prefix('+') {
                self.declare_link(body);
            }
            // `#%` and any other `#` line carry no structure.
            return Ok(ControlFlow::Continue(()));
        }

        if let Some((index, path)) = split_workbook_declaration(line) {
            self.declare_workbook(index, path);
        } else {
            self.declare_sheet(line.trim())?;
        }

        Ok(ControlFlow::Continue(()))
    }

    pub fn finish(self) -> Result<ParsedReport, ReportError> {
        if self.tree.workbook_count() == 0 {
            return Err(ReportError::EmptyReport);
        }

        if !self.warnings.is_empty() {
            warn!(
                skipped = self.warnings.len(),
                "report parsed with skipped lines"
            );
        }

        Ok(ParsedReport {
            tree: self.tree,
            links: self.links,
            count_range: self.count_range,
            warnings: self.warnings,
            terminated: self.terminated,
        })
    }

    fn warn(&mut self, message: String) {
        warn!(line = self.line_number, "{message}");
        self.warnings.push(ParseWarning {
            line: self.line_number,
            message,
        });
    }

    fn skip_workbook(&mut self, message: String) {
        self.warn(message);
        self.cursor = Cursor::Skipping { reported: false };
    }

    fn declare_workbook(&mut self, index: &str, path: &str) {
        let Ok(index) = index.parse::<u32>() else {
            self.skip_workbook(format!("workbook index {index} is out of range"));
            return;
        };

        if self.declared.contains(&index) {
            self.skip_workbook(format!("workbook index {index} is declared twice"));
            return;
        }

        let segments = path
            .trim_end()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();
        let Some(file_name) = segments.last().copied() else {
            self.skip_workbook(format!("workbook {index} has an empty path"));
            return;
        };

        let root = self.tree.root();
        let merged = match self.tree.merge(root, &segments, index) {
            Ok(merged) => merged,
            Err(blocker) => {
                let blocker = self.tree.node(blocker);
                self.skip_workbook(format!(
                    "path {path} of workbook {index} passes through existing {} {}",
                    blocker.kind.label(),
                    blocker.name
                ));
                return;
            }
        };
        let kind = self.tree.node(merged.node).kind;

        if !merged.created {
            match kind {
                NodeKind::Workbook { index: existing } => {
                    self.warn(format!(
                        "path {path} is already workbook {existing}; index {index} stays unregistered"
                    ));
                    self.cursor = Cursor::Workbook(merged.node);
                }
                _ => {
                    self.skip_workbook(format!(
                        "path {path} of workbook {index} names an existing {}",
                        kind.label()
                    ));
                }
            }
            return;
        }

        if !is_spreadsheet_name(file_name) {
            self.warn(format!(
                "workbook {index} file {file_name} has no spreadsheet extension"
            ));
        }

        debug!(index, path, "workbook declared");
        self.declared.insert(index);
        self.cursor = Cursor::Workbook(merged.node);
    }

    fn declare_sheet(&mut self, name: &str) -> Result<(), ReportError> {
        if name.is_empty() {
            self.warn("blank line skipped".to_owned());
            return Ok(());
        }

        match self.cursor {
            Cursor::Workbook(workbook) => {
                self.tree.push_sheet(workbook, name);
                Ok(())
            }
            Cursor::Skipping { reported: false } => {
                self.cursor = Cursor::Skipping { reported: true };
                self.warn("sheets of the skipped workbook are ignored".to_owned());
                Ok(())
            }
            Cursor::Skipping { reported: true } => Ok(()),
            Cursor::Empty => Err(ReportError::MalformedReport {
                line: self.line_number,
                reason: format!("sheet {name} appears before any workbook declaration"),
            }),
        }
    }

    fn declare_link(&mut self, body: &str) {
        match parse_link(body) {
            Ok((endpoints, count)) => {
                self.links.push(LinkRecord {
                    line: self.line_number,
                    endpoints,
                    count,
                });
                self.count_range = Some(CountRange::include(self.count_range, count));
            }
            Err(reason) => self.warn(format!("link skipped: {reason}")),
        }
    }
}

/// Parses a whole report held in memory.
pub fn parse_lines<I, S>(lines: I) -> Result<ParsedReport, ReportError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = ReportParser::new();
    for line in lines {
        if parser.feed_line(line.as_ref())?.is_break() {
            break;
        }
    }
    parser.finish()
}

/// Splits `<integer><whitespace><path>`.
fn split_workbook_declaration(line: &str) -> Option<(&str, &str)> {
    let digits_end = line.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }

    let (digits, rest) = line.split_at(digits_end);
    let path = rest.trim_start();
    if path.len() == rest.len() || path.trim_end().is_empty() {
        return None;
    }

    Some((digits, path))
}

fn is_spreadsheet_name(segment: &str) -> bool {
    segment.split('.').skip(1).any(|token| {
        SPREADSHEET_EXTENSIONS
            .iter()
            .any(|extension| token.eq_ignore_ascii_case(extension))
    })
}

fn parse_link(body: &str) -> Result<(LinkEndpoints, u64), String> {
    let tokens = body.split_whitespace().collect::<Vec<_>>();

    match tokens.as_slice() {
        ["s", source_book, source_sheet, target_book, target_sheet, count] => {
            let source = SheetRef {
                workbook: parse_number(source_book, "source workbook")?,
                sheet: parse_number(source_sheet, "source sheet")?,
            };
            let target = SheetRef {
                workbook: parse_number(target_book, "target workbook")?,
                sheet: parse_number(target_sheet, "target sheet")?,
            };
            Ok((
                LinkEndpoints::Sheet { source, target },
                parse_number(count, "count")?,
            ))
        }
        ["s", ..] => Err(format!(
            "sheet link needs 5 values, found {}",
            tokens.len() - 1
        )),
        ["b", source, target, count] | [source, target, count] => Ok((
            LinkEndpoints::Workbook {
                source: parse_number(source, "source workbook")?,
                target: parse_number(target, "target workbook")?,
            },
            parse_number(count, "count")?,
        )),
        _ => Err(format!(
            "workbook link needs 3 values, found {}",
            tokens.len()
        )),
    }
}

fn parse_number<T: std::str::FromStr>(token: &str, what: &str) -> Result<T, String> {
    token
        .parse::<T>()
        .map_err(|_| format!("invalid {what} {token:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_a() -> Vec<&'static str> {
        vec![
            "1 folderA/book1.xlsx",
            "Sheet1",
            "Sheet2",
            "2 folderA/book2.xlsx",
            "Sheet1",
            "#+ 1 2 5",
            "#$",
        ]
    }

    fn sheet_names(tree: &ReportTree, workbook: NodeId) -> Vec<(String, NodeKind)> {
        tree.children(workbook)
            .iter()
            .map(|id| (tree.node(*id).name.clone(), tree.node(*id).kind))
            .collect()
    }

    #[test]
    fn builds_tree_and_links() {
        let report = parse_lines(scenario_a()).expect("report parses");
        let tree = &report.tree;

        let top = tree.children(tree.root());
        assert_eq!(top.len(), 1);
        let folder = top[0];
        assert_eq!(tree.node(folder).name, "folderA");
        assert_eq!(tree.node(folder).kind, NodeKind::Folder);

        let books = tree.children(folder);
        assert_eq!(books.len(), 2);
        assert_eq!(tree.node(books[0]).kind, NodeKind::Workbook { index: 1 });
        assert_eq!(tree.node(books[1]).kind, NodeKind::Workbook { index: 2 });

        assert_eq!(
            sheet_names(tree, books[0]),
            [
                ("Sheet1".to_owned(), NodeKind::Sheet { index: 0 }),
                ("Sheet2".to_owned(), NodeKind::Sheet { index: 1 }),
            ]
        );
        assert_eq!(
            sheet_names(tree, books[1]),
            [("Sheet1".to_owned(), NodeKind::Sheet { index: 0 })]
        );

        assert_eq!(
            report.links,
            [LinkRecord {
                line: 6,
                endpoints: LinkEndpoints::Workbook { source: 1, target: 2 },
                count: 5,
            }]
        );
        assert_eq!(report.count_range, Some(CountRange { min: 5, max: 5 }));
        assert!(report.terminated);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn sheet_link_marker_may_be_attached_or_separate() {
        let attached = parse_lines(["1 a.xlsx", "S", "#+s 1 0 2 0 3"]).expect("parses");
        let separate = parse_lines(["1 a.xlsx", "S", "#+ s 1 0 2 0 3"]).expect("parses");

        let expected = LinkEndpoints::Sheet {
            source: SheetRef {
                workbook: 1,
                sheet: 0,
            },
            target: SheetRef {
                workbook: 2,
                sheet: 0,
            },
        };
        assert_eq!(attached.links[0].endpoints, expected);
        assert_eq!(attached.links[0].count, 3);
        assert_eq!(separate.links[0].endpoints, expected);
    }

    #[test]
    fn explicit_workbook_tag_is_accepted() {
        let report = parse_lines(["1 a.xlsx", "#+ b 1 1 9", "#+ 1 1 2"]).expect("parses");
        assert_eq!(report.links.len(), 2);
        assert_eq!(
            report.links[0].endpoints,
            LinkEndpoints::Workbook { source: 1, target: 1 }
        );
        assert_eq!(report.count_range, Some(CountRange { min: 2, max: 9 }));
    }

    #[test]
    fn sheet_before_workbook_is_malformed() {
        let error = parse_lines(["#% header", "Sheet1", "1 a.xlsx"]).expect_err("must fail");
        assert!(matches!(error, ReportError::MalformedReport { line: 2, .. }));
    }

    #[test]
    fn missing_end_marker_yields_same_tree() {
        let terminated = parse_lines(scenario_a()).expect("parses");
        let open_ended = parse_lines(&scenario_a()[..6]).expect("parses");

        assert_eq!(terminated.tree, open_ended.tree);
        assert_eq!(terminated.links, open_ended.links);
        assert!(!open_ended.terminated);
    }

    #[test]
    fn lines_after_end_marker_are_ignored() {
        let mut parser = ReportParser::new();
        assert!(parser.feed_line("1 a.xlsx").expect("ok").is_continue());
        assert!(parser.feed_line("#$ end").expect("ok").is_break());
        assert!(parser.feed_line("garbage").expect("ok").is_break());
        assert!(parser.feed_line("2 b.xlsx").expect("ok").is_break());

        let report = parser.finish().expect("parses");
        assert_eq!(report.tree.workbook_count(), 1);
        assert_eq!(report.tree.sheet_count(), 0);
    }

    #[test]
    fn unknown_hash_lines_are_no_ops() {
        let report = parse_lines(["#% start", "1 a.xlsx", "#", "# note", "#!x", "S1\r"])
            .expect("parses");
        assert_eq!(report.tree.sheet_count(), 1);
        assert!(report.links.is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(report.count_range, None);

        let book = report.tree.children(report.tree.root())[0];
        assert_eq!(sheet_names(&report.tree, book)[0].0, "S1");
    }

    #[test]
    fn malformed_links_are_skipped_with_warnings() {
        let report = parse_lines([
            "1 a.xlsx",
            "#+ 1 2",
            "#+ 1 x 3",
            "#+s 1 0 2",
            "#+ 1 2 -4",
            "#+ 1 2 4",
        ])
        .expect("parses");

        assert_eq!(report.links.len(), 1);
        assert_eq!(report.links[0].line, 6);
        let lines = report.warnings.iter().map(|w| w.line).collect::<Vec<_>>();
        assert_eq!(lines, [2, 3, 4, 5]);
    }

    #[test]
    fn skipped_workbook_takes_its_sheets_along() {
        let report = parse_lines([
            "1 a.xlsx",
            "A1",
            "1 b.xlsx",
            "B1",
            "B2",
            "2 c.xlsx",
            "C1",
        ])
        .expect("parses");

        let tree = &report.tree;
        assert_eq!(tree.workbook_count(), 2);
        assert_eq!(tree.sheet_count(), 2);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].line, 3);
        assert_eq!(report.warnings[1].line, 4);
    }

    #[test]
    fn redeclared_path_reuses_workbook() {
        let report =
            parse_lines(["1 d/a.xlsx", "S1", "2 d/a.xlsx", "S2"]).expect("parses");
        let tree = &report.tree;
        let folder = tree.children(tree.root())[0];
        let book = tree.children(folder)[0];

        assert_eq!(tree.children(folder).len(), 1);
        assert_eq!(
            sheet_names(tree, book),
            [
                ("S1".to_owned(), NodeKind::Sheet { index: 0 }),
                ("S2".to_owned(), NodeKind::Sheet { index: 1 }),
            ]
        );
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn workbook_declaration_shapes() {
        assert_eq!(
            split_workbook_declaration("12 dir/book.xlsx"),
            Some(("12", "dir/book.xlsx"))
        );
        assert_eq!(
            split_workbook_declaration("3\tmy book.xlsx"),
            Some(("3", "my book.xlsx"))
        );
        assert_eq!(split_workbook_declaration("12abc"), None);
        assert_eq!(split_workbook_declaration("Sheet 1"), None);
        assert_eq!(split_workbook_declaration("42"), None);
        assert_eq!(split_workbook_declaration("7   "), None);
    }

    #[test]
    fn spreadsheet_names() {
        assert!(is_spreadsheet_name("book.xlsx"));
        assert!(is_spreadsheet_name("Book.XLSM"));
        assert!(is_spreadsheet_name("legacy.xls"));
        assert!(!is_spreadsheet_name("xlsx"));
        assert!(!is_spreadsheet_name("notes.txt"));
    }

    #[test]
    fn report_without_workbooks_is_empty() {
        let error = parse_lines(["#% start", "#+ 1 2 3", "#$"]).expect_err("must fail");
        assert!(matches!(error, ReportError::EmptyReport));
    }

    #[test]
    fn non_spreadsheet_file_still_declares_workbook() {
        let report = parse_lines(["5 dir/data.csv", "S"]).expect("parses");
        assert_eq!(report.tree.workbook_count(), 1);
        assert_eq!(report.tree.sheet_count(), 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn path_through_workbook_is_skipped() {
        let report = parse_lines(["1 a.xlsx", "S", "2 a.xlsx/c.xlsx", "C1", "#+ 1 2 4"])
            .expect("parses");
        let tree = &report.tree;

        let book = tree.children(tree.root())[0];
        assert_eq!(tree.workbook_count(), 1);
        assert_eq!(
            sheet_names(tree, book),
            [("S".to_owned(), NodeKind::Sheet { index: 0 })]
        );
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].line, 3);
        assert!(report.warnings[0].message.contains("passes through existing workbook"));
    }

    #[test]
    fn path_through_sheet_is_skipped() {
        let report =
            parse_lines(["1 a.xlsx", "S", "2 a.xlsx/S/c.xlsx", "#+ 1 2 4"]).expect("parses");
        let tree = &report.tree;

        let book = tree.children(tree.root())[0];
        let sheet = tree.children(book)[0];
        assert!(tree.children(sheet).is_empty());
        assert_eq!(tree.workbook_count(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].line, 3);

        let error = crate::report::Report::from_parsed(report).expect_err("workbook 2 unknown");
        assert!(matches!(error, ReportError::DanglingReference { line: 4, .. }));
    }

    #[test]
    fn blank_lines_are_reported() {
        let report = parse_lines(["1 a.xlsx", "S1", "", "   ", "S2"]).expect("parses");
        let book = report.tree.children(report.tree.root())[0];

        assert_eq!(
            sheet_names(&report.tree, book),
            [
                ("S1".to_owned(), NodeKind::Sheet { index: 0 }),
                ("S2".to_owned(), NodeKind::Sheet { index: 1 }),
            ]
        );
        let lines = report.warnings.iter().map(|w| w.line).collect::<Vec<_>>();
        assert_eq!(lines, [3, 4]);
    }
}
