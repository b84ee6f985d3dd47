//! Project cursor: serves the project list one bundle at a time.
//!
//! The project ids are fetched once when the adapter is built. Callers check
//! [`IngressAdapter::has_more_projects`] before each
//! [`IngressAdapter::retrieve_next`]; retrieving past the end is a contract
//! violation reported as [`AdapterError::OutOfRange`].

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::bundle::{Bundle, BundleStrategy};
use crate::ikontrol::{CurlTransport, IKontrolClient, ProjectId, Transport};

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("project cursor out of range: position {position} of {count}")]
    OutOfRange { position: usize, count: usize },
}

/// Where the cursor stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Next retrieval produces the bundle at this position.
    Ready(usize),
    Exhausted,
}

pub struct IngressAdapter<T: Transport = CurlTransport> {
    client: IKontrolClient<T>,
    strategy: BundleStrategy,
    work_dir: PathBuf,
    project_ids: Vec<ProjectId>,
    position: usize,
    current: Option<ProjectId>,
}

impl<T: Transport> IngressAdapter<T> {
    /// Fetch the project list and start at the first project.
    pub fn new(client: IKontrolClient<T>, strategy: BundleStrategy, work_dir: PathBuf) -> Result<Self> {
        let project_ids = client
            .list_all_project_ids()
            .context("failed to list projects")?;
        tracing::info!(projects = project_ids.len(), %strategy, "project list loaded");
        Ok(Self {
            client,
            strategy,
            work_dir,
            project_ids,
            position: 0,
            current: None,
        })
    }

    pub fn strategy(&self) -> BundleStrategy {
        self.strategy
    }

    /// Number of projects in the run.
    pub fn len(&self) -> usize {
        self.project_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.project_ids.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn state(&self) -> CursorState {
        if self.has_more_projects() {
            CursorState::Ready(self.position)
        } else {
            CursorState::Exhausted
        }
    }

    pub fn has_more_projects(&self) -> bool {
        self.position < self.project_ids.len()
    }

    /// Project of the most recent retrieval.
    pub fn current_project(&self) -> Option<ProjectId> {
        self.current
    }

    /// File name of the most recently produced bundle; `None` before the first retrieval.
    pub fn filename(&self) -> Option<String> {
        self.current.map(|id| self.strategy.filename(id))
    }

    /// Advance to the next project and build its bundle.
    ///
    /// The cursor moves before the bundle is built, so a project whose
    /// bundling fails is not retried by the next call.
    pub fn retrieve_next(&mut self) -> Result<Bundle> {
        let Some(&project_id) = self.project_ids.get(self.position) else {
            return Err(AdapterError::OutOfRange {
                position: self.position,
                count: self.project_ids.len(),
            }
            .into());
        };
        self.current = Some(project_id);
        self.position += 1;

        tracing::debug!(%project_id, "receiving project data");
        let bundle = self
            .strategy
            .build(&self.client, project_id, &self.work_dir)
            .with_context(|| format!("failed to bundle project {}", project_id))?;
        tracing::debug!(%project_id, bytes = bundle.data.len(), "received project data");
        Ok(bundle)
    }
}
