use std::fmt;

use super::tree::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkScope {
    Workbook,
    Sheet,
}

impl LinkScope {
    pub fn label(self) -> &'static str {
        match self {
            Self::Workbook => "workbook",
            Self::Sheet => "sheet",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SheetRef {
    pub workbook: u32,
    pub sheet: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkEndpoints {
    Workbook { source: u32, target: u32 },
    Sheet { source: SheetRef, target: SheetRef },
}

impl LinkEndpoints {
    pub fn scope(self) -> LinkScope {
        match self {
            Self::Workbook { .. } => LinkScope::Workbook,
            Self::Sheet { .. } => LinkScope::Sheet,
        }
    }
}

impl fmt::Display for SheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sheet {} of workbook {}", self.sheet, self.workbook)
    }
}

impl fmt::Display for LinkEndpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook { source, target } => write!(f, "workbook {source} -> workbook {target}"),
            Self::Sheet { source, target } => write!(f, "{source} -> {target}"),
        }
    }
}

/// One `#+` declaration, still expressed in report indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkRecord {
    /// 1-based line in the report, kept for diagnostics.
    pub line: usize,
    pub endpoints: LinkEndpoints,
    pub count: u64,
}

impl LinkRecord {
    pub fn scope(&self) -> LinkScope {
        self.endpoints.scope()
    }
}

/// A link whose endpoints have been looked up in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedLink {
    pub record: LinkRecord,
    pub source: NodeId,
    pub target: NodeId,
}

impl ResolvedLink {
    pub fn scope(&self) -> LinkScope {
        self.record.scope()
    }

    pub fn count(&self) -> u64 {
        self.record.count
    }

    pub fn is_self_link(&self) -> bool {
        self.source == self.target
    }
}
