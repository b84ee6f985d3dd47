//! Ingestion driver: drain the project cursor into an uploader.

use anyhow::Result;
use std::time::Instant;

use crate::adapter::IngressAdapter;
use crate::ikontrol::Transport;
use crate::ingress::Uploader;

/// Totals of one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub projects: usize,
    pub bytes: u64,
}

/// Retrieve and upload every remaining project, in order. The first error aborts the run.
pub fn run_ingestion<T: Transport, U: Uploader + ?Sized>(
    adapter: &mut IngressAdapter<T>,
    uploader: &mut U,
) -> Result<IngestSummary> {
    let started = Instant::now();
    tracing::info!(
        projects = adapter.len(),
        strategy = %adapter.strategy(),
        "running the iKontrol ingress adapter"
    );

    let mut summary = IngestSummary::default();
    while adapter.has_more_projects() {
        let bundle = adapter.retrieve_next()?;
        uploader.upload(&bundle.filename, &bundle.data)?;
        summary.projects += 1;
        summary.bytes += bundle.data.len() as u64;
    }

    tracing::info!(
        projects = summary.projects,
        bytes = summary.bytes,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "finished the iKontrol ingress adapter"
    );
    Ok(summary)
}
