//! iKontrol API client.
//!
//! Translates domain operations (projects, schemes, tasks, documents) into
//! authenticated GETs against `{base}/{version}/{key}/{Resource}/{Action}` and
//! decodes the JSON responses. All task records are fetched once when the
//! client is built and served from memory afterwards.

mod endpoint;
mod records;
mod transport;

pub use endpoint::ApiBase;
pub use records::{ProjectId, Record, TASK_MASTER_TYPE_ID};
pub use transport::{CurlTransport, Transport};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::ApiConfig;
use records::{belongs_to_project, collect_ids, is_task_menu_item, parse_records};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct IKontrolClient<T: Transport = CurlTransport> {
    transport: T,
    base: ApiBase,
    from_date: NaiveDate,
    tasks: Vec<Record>,
}

impl IKontrolClient<CurlTransport> {
    /// Build a curl-backed client from the `[api]` config section.
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        let transport =
            CurlTransport::new(&api.username, &api.password).with_timeout(api.timeout());
        let base = ApiBase::new(&api.url, &api.version, &api.key);
        Self::new(transport, base, api.from_date)
    }
}

impl<T: Transport> IKontrolClient<T> {
    /// Create the client and populate the task cache.
    ///
    /// `from_date` is the default cutoff for scheme and task listings.
    pub fn new(transport: T, base: ApiBase, from_date: NaiveDate) -> Result<Self> {
        let mut client = Self {
            transport,
            base,
            from_date,
            tasks: Vec::new(),
        };
        client.tasks = client.fetch_all_tasks().context("failed to prefetch tasks")?;
        tracing::info!(tasks = client.tasks.len(), "task cache populated");
        Ok(client)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from_date
    }

    fn get(&self, resource: &str, action: &str, params: &[(&str, String)]) -> Result<Vec<u8>> {
        let url = self.base.endpoint(resource, action, params)?;
        self.transport
            .get(&url)
            .with_context(|| format!("{resource}/{action} request failed"))
    }

    fn get_records(
        &self,
        resource: &str,
        action: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Record>> {
        let body = self.get(resource, action, params)?;
        parse_records(&body, &format!("{resource}/{action}"))
    }

    /// Every project visible to the account.
    pub fn list_all_projects(&self) -> Result<Vec<Record>> {
        self.get_records("Project", "GetAll", &[])
    }

    /// Ids of every project, in upstream order. Projects without an `Id` are skipped.
    pub fn list_all_project_ids(&self) -> Result<Vec<ProjectId>> {
        let projects = self.list_all_projects()?;
        let ids = collect_ids(&projects).context("project list")?;
        Ok(ids.into_iter().map(ProjectId).collect())
    }

    /// Full detail of one project.
    pub fn get_project(&self, project_id: ProjectId) -> Result<Value> {
        let body = self.get("Project", "Get", &[("id", project_id.to_string())])?;
        serde_json::from_slice(&body).context("malformed Project/Get response")
    }

    /// Schemes of a project changed since the client's default cutoff.
    pub fn list_schemes(&self, project_id: ProjectId) -> Result<Vec<Record>> {
        self.list_schemes_since(project_id, self.from_date)
    }

    pub fn list_schemes_since(&self, project_id: ProjectId, from: NaiveDate) -> Result<Vec<Record>> {
        self.get_records(
            "Scheme",
            "GetByProjectId",
            &[
                ("projectId", project_id.to_string()),
                ("from", from.format(DATE_FORMAT).to_string()),
            ],
        )
    }

    /// Rendered PDF of a scheme response.
    pub fn download_scheme_response_pdf(&self, response_id: i64) -> Result<Vec<u8>> {
        self.get(
            "Scheme",
            "DownloadSchemeResponse",
            &[("responseId", response_id.to_string())],
        )
    }

    /// Server-side ZIP with every PDF iKontrol has set up for the project.
    pub fn download_project_zip(&self, project_id: ProjectId) -> Result<Vec<u8>> {
        self.get(
            "Documentation",
            "GetProjectZip",
            &[("projectId", project_id.to_string())],
        )
    }

    /// Tasks of one task type changed since the client's default cutoff.
    pub fn list_tasks_by_type(&self, task_type_id: i64) -> Result<Vec<Record>> {
        self.list_tasks_by_type_since(task_type_id, self.from_date)
    }

    pub fn list_tasks_by_type_since(&self, task_type_id: i64, from: NaiveDate) -> Result<Vec<Record>> {
        self.get_records(
            "Task",
            "Get",
            &[
                ("taskTypeId", task_type_id.to_string()),
                ("from", from.format(DATE_FORMAT).to_string()),
            ],
        )
    }

    /// All active menu items.
    pub fn list_menu_items(&self) -> Result<Vec<Record>> {
        self.get_records("MenuItem", "GetAll", &[])
    }

    /// Ids of the menu items that are task types.
    pub fn list_task_type_ids(&self) -> Result<Vec<i64>> {
        let task_types: Vec<Record> = self
            .list_menu_items()?
            .into_iter()
            .filter(is_task_menu_item)
            .collect();
        collect_ids(&task_types).context("menu item list")
    }

    fn fetch_all_tasks(&self) -> Result<Vec<Record>> {
        let mut tasks = Vec::new();
        for task_type_id in self.list_task_type_ids()? {
            let batch = self.list_tasks_by_type(task_type_id)?;
            tracing::debug!(task_type_id, count = batch.len(), "fetched tasks");
            tasks.extend(batch);
        }
        Ok(tasks)
    }

    /// The cached tasks of every task type.
    pub fn list_all_tasks(&self) -> &[Record] {
        &self.tasks
    }

    /// Cached tasks whose `ProjectId` equals `project_id`.
    pub fn list_project_tasks(&self, project_id: ProjectId) -> Vec<Record> {
        self.tasks
            .iter()
            .filter(|task| belongs_to_project(task, project_id))
            .cloned()
            .collect()
    }

    /// `(response id, PDF bytes)` for every scheme of the project that carries an `Id`.
    pub fn list_scheme_pdfs(&self, project_id: ProjectId) -> Result<Vec<(i64, Vec<u8>)>> {
        let schemes = self.list_schemes(project_id)?;
        self.download_scheme_pdfs(&schemes)
    }

    /// Download the response PDF of each already-listed scheme that carries an `Id`.
    pub fn download_scheme_pdfs(&self, schemes: &[Record]) -> Result<Vec<(i64, Vec<u8>)>> {
        let mut pdfs = Vec::new();
        for response_id in collect_ids(schemes).context("scheme list")? {
            let pdf = self.download_scheme_response_pdf(response_id)?;
            pdfs.push((response_id, pdf));
        }
        Ok(pdfs)
    }
}
