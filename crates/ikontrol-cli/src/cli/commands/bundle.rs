//! `ikontrol-ingress bundle` – build one project's bundle and save it.

use anyhow::{Context, Result};
use ikontrol_core::config::AdapterConfig;
use ikontrol_core::ikontrol::{IKontrolClient, ProjectId};
use std::fs;
use std::path::{Path, PathBuf};

/// Build the bundle and write it to `out`, or to `./{project_id}.{zip|json}`.
/// Returns the path written.
pub fn run_bundle(cfg: &AdapterConfig, project_id: i64, out: Option<&Path>) -> Result<PathBuf> {
    cfg.validate_api()?;
    let client = IKontrolClient::from_config(&cfg.api)?;
    let bundle = cfg
        .bundle
        .strategy
        .build(&client, ProjectId(project_id), &cfg.bundle.work_dir())?;

    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&bundle.filename));
    fs::write(&path, &bundle.data).with_context(|| format!("write {}", path.display()))?;
    println!("{} ({} bytes)", path.display(), bundle.data.len());
    Ok(path)
}
