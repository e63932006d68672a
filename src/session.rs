use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::layout::{LayoutState, LevelOfDetail, Viewport, compute_layout};
use crate::report::Report;

/// The single report on screen and the level of detail it is shown at.
/// Loading a new report replaces everything; nothing carries over.
pub struct Session {
    report: Report,
    level: LevelOfDetail,
    config: LayoutConfig,
}

impl Session {
    pub fn on_report_loaded(report: Report, config: LayoutConfig) -> Self {
        info!(
            nodes = report.tree.len(),
            links = report.links.len(),
            "session started"
        );
        Self {
            report,
            level: LevelOfDetail::default(),
            config,
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn level(&self) -> LevelOfDetail {
        self.level
    }

    pub fn set_level(&mut self, level: LevelOfDetail) {
        if self.level != level {
            debug!(level = level.label(), "level of detail changed");
            self.level = level;
        }
    }

    pub fn toggle_level_of_detail(&mut self) -> LevelOfDetail {
        self.set_level(self.level.toggled());
        self.level
    }

    pub fn compute_layout(&self, viewport: Viewport) -> LayoutState {
        compute_layout(&self.report, self.level, viewport, &self.config)
    }
}
