mod error;
mod link;
mod parse;
mod read;
mod registry;
mod tree;

use std::path::Path;

use tracing::info;

pub use error::{ParseWarning, ReportError};
pub use link::{LinkScope, ResolvedLink};
pub use parse::{CountRange, ParsedReport, parse_lines};
pub use registry::NodeRegistry;
pub use tree::{NodeId, NodeKind, ReportTree};

/// A fully loaded report: the tree plus links resolved against it.
#[derive(Clone, Debug)]
pub struct Report {
    pub tree: ReportTree,
    pub registry: NodeRegistry,
    pub links: Vec<ResolvedLink>,
    pub count_range: Option<CountRange>,
    pub warnings: Vec<ParseWarning>,
}

impl Report {
    pub fn from_parsed(parsed: ParsedReport) -> Result<Self, ReportError> {
        let registry = NodeRegistry::build(&parsed.tree);
        let links = registry.resolve_all(&parsed.links)?;

        Ok(Self {
            tree: parsed.tree,
            registry,
            links,
            count_range: parsed.count_range,
            warnings: parsed.warnings,
        })
    }

    pub fn link_count(&self, scope: LinkScope) -> usize {
        self.links.iter().filter(|link| link.scope() == scope).count()
    }

    /// Sum of link counts leaving and entering `node`, in that order.
    pub fn link_totals(&self, node: NodeId) -> (u64, u64) {
        self.links.iter().fold((0, 0), |(outgoing, incoming), link| {
            (
                outgoing + if link.source == node { link.count() } else { 0 },
                incoming + if link.target == node { link.count() } else { 0 },
            )
        })
    }
}

pub fn load_report(path: &Path) -> Result<Report, ReportError> {
    let parsed = read::read_report_file(path)?;
    let report = Report::from_parsed(parsed)?;

    info!(
        path = %path.display(),
        workbooks = report.tree.workbook_count(),
        sheets = report.tree.sheet_count(),
        workbook_links = report.link_count(LinkScope::Workbook),
        sheet_links = report.link_count(LinkScope::Sheet),
        warnings = report.warnings.len(),
        "report loaded"
    );

    Ok(report)
}
