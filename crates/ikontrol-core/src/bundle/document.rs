//! The per-project JSON document: project detail, schemes and cached tasks.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::ikontrol::{IKontrolClient, ProjectId, Record, Transport};

#[derive(Serialize)]
struct SchemesAndTasks<'a> {
    project: &'a Value,
    schemes: &'a [Record],
    tasks: &'a [Record],
}

pub(super) fn encode(project: &Value, schemes: &[Record], tasks: &[Record]) -> Result<Vec<u8>> {
    serde_json::to_vec(&SchemesAndTasks {
        project,
        schemes,
        tasks,
    })
    .context("failed to encode schemes-and-tasks document")
}

impl<T: Transport> IKontrolClient<T> {
    /// `{"project": .., "schemes": [..], "tasks": [..]}` as UTF-8 JSON.
    pub fn build_schemes_and_tasks_document(&self, project_id: ProjectId) -> Result<Vec<u8>> {
        let schemes = self.list_schemes(project_id)?;
        self.schemes_and_tasks_document(project_id, &schemes)
    }

    /// Same as [`build_schemes_and_tasks_document`](Self::build_schemes_and_tasks_document)
    /// with schemes that were already listed.
    pub(super) fn schemes_and_tasks_document(
        &self,
        project_id: ProjectId,
        schemes: &[Record],
    ) -> Result<Vec<u8>> {
        let project = self.get_project(project_id)?;
        let tasks = self.list_project_tasks(project_id);
        encode(&project, schemes, &tasks)
    }
}
