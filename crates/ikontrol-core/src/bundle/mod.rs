//! Bundle strategies: how one project's data becomes one deliverable payload.

mod archive;
mod document;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::ikontrol::{IKontrolClient, ProjectId, Transport};

/// Payload produced for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub project_id: ProjectId,
    /// `{project_id}.zip` or `{project_id}.json`.
    pub filename: String,
    pub data: Vec<u8>,
}

/// Selected once per run; every project is bundled the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BundleStrategy {
    /// Scheme-response PDFs plus the schemes-and-tasks JSON, zipped locally.
    #[default]
    #[serde(rename = "local-zip")]
    LocalZipAssembly,
    /// Only the schemes-and-tasks JSON document.
    #[serde(rename = "json")]
    DirectJsonDocument,
    /// The ZIP iKontrol assembles server-side.
    #[serde(rename = "upstream-zip")]
    UpstreamPrebuiltZip,
}

impl BundleStrategy {
    pub fn extension(self) -> &'static str {
        match self {
            BundleStrategy::LocalZipAssembly | BundleStrategy::UpstreamPrebuiltZip => "zip",
            BundleStrategy::DirectJsonDocument => "json",
        }
    }

    pub fn filename(self, project_id: ProjectId) -> String {
        format!("{}.{}", project_id, self.extension())
    }

    /// Fetch and assemble the payload for `project_id`.
    /// `work_dir` hosts staging files for local assembly and is left as it was found.
    pub fn build<T: Transport>(
        self,
        client: &IKontrolClient<T>,
        project_id: ProjectId,
        work_dir: &Path,
    ) -> Result<Bundle> {
        let data = match self {
            BundleStrategy::LocalZipAssembly => client.build_project_zip(project_id, work_dir)?,
            BundleStrategy::DirectJsonDocument => {
                client.build_schemes_and_tasks_document(project_id)?
            }
            BundleStrategy::UpstreamPrebuiltZip => client.download_project_zip(project_id)?,
        };
        Ok(Bundle {
            project_id,
            filename: self.filename(project_id),
            data,
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            BundleStrategy::LocalZipAssembly => "local-zip",
            BundleStrategy::DirectJsonDocument => "json",
            BundleStrategy::UpstreamPrebuiltZip => "upstream-zip",
        }
    }
}

impl fmt::Display for BundleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown bundle strategy {0:?} (expected local-zip, json or upstream-zip)")]
pub struct ParseStrategyError(String);

impl FromStr for BundleStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local-zip" | "zip" => Ok(BundleStrategy::LocalZipAssembly),
            "json" => Ok(BundleStrategy::DirectJsonDocument),
            "upstream-zip" => Ok(BundleStrategy::UpstreamPrebuiltZip),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client_with, FakeTransport};
    use serde_json::json;

    #[test]
    fn filenames_follow_extension() {
        let id = ProjectId(17);
        assert_eq!(BundleStrategy::LocalZipAssembly.filename(id), "17.zip");
        assert_eq!(BundleStrategy::DirectJsonDocument.filename(id), "17.json");
        assert_eq!(BundleStrategy::UpstreamPrebuiltZip.filename(id), "17.zip");
    }

    #[test]
    fn parse_and_display() {
        for strategy in [
            BundleStrategy::LocalZipAssembly,
            BundleStrategy::DirectJsonDocument,
            BundleStrategy::UpstreamPrebuiltZip,
        ] {
            assert_eq!(strategy.to_string().parse::<BundleStrategy>().unwrap(), strategy);
        }
        assert_eq!("ZIP".parse::<BundleStrategy>().unwrap(), BundleStrategy::LocalZipAssembly);
        assert!("tarball".parse::<BundleStrategy>().is_err());
    }

    #[test]
    fn upstream_strategy_passes_server_zip_through() {
        let fake = FakeTransport::new().raw(
            "/1/key/Documentation/GetProjectZip?projectId=4",
            b"server-zip".to_vec(),
        );
        let client = client_with(fake);
        let dir = tempfile::tempdir().unwrap();
        let bundle = BundleStrategy::UpstreamPrebuiltZip
            .build(&client, ProjectId(4), dir.path())
            .unwrap();
        assert_eq!(bundle.filename, "4.zip");
        assert_eq!(bundle.data, b"server-zip".to_vec());
    }

    #[test]
    fn json_strategy_builds_document() {
        let fake = FakeTransport::new()
            .json("/1/key/Project/Get?id=4", json!({"Id": 4}))
            .json(
                "/1/key/Scheme/GetByProjectId?projectId=4&from=1970-01-01",
                json!([]),
            );
        let client = client_with(fake);
        let dir = tempfile::tempdir().unwrap();
        let bundle = BundleStrategy::DirectJsonDocument
            .build(&client, ProjectId(4), dir.path())
            .unwrap();
        assert_eq!(bundle.filename, "4.json");
        let doc: serde_json::Value = serde_json::from_slice(&bundle.data).unwrap();
        assert_eq!(doc["project"]["Id"], json!(4));
    }
}
