//! Source host used by the CLI
//!
//! The CLI has no interpreter to hand source to, so "executing" a stream
//! means reading it to the end and recording what it claims to be.

use crate::error::LoaderResult;
use crate::mapping::SourceHost;
use crate::vfs::VirtualStream;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// One executed stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub reference: String,
    pub origin: Option<PathBuf>,
    pub size: u64,
}

/// [`SourceHost`] that records a [`LoadReport`] per stream
#[derive(Debug, Default)]
pub struct ReportingHost {
    reports: Mutex<Vec<LoadReport>>,
}

impl ReportingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports recorded since the last call
    pub fn take_reports(&self) -> Vec<LoadReport> {
        std::mem::take(
            &mut *self
                .reports
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl SourceHost for ReportingHost {
    fn execute(&self, stream: &mut VirtualStream) -> LoaderResult<()> {
        let text = stream.read_to_text()?;
        let (origin, size) = {
            let stat = stream.stat()?;
            (stat.origin.clone(), stat.size)
        };
        let report = LoadReport {
            reference: stream.reference().to_string(),
            origin,
            size,
        };
        debug!(
            "Executed {} ({} bytes read, {} reported)",
            report.reference,
            text.len(),
            report.size
        );
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(report);
        Ok(())
    }
}
