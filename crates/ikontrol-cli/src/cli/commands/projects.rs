//! `ikontrol-ingress projects` – list project ids.

use anyhow::Result;
use ikontrol_core::config::AdapterConfig;
use ikontrol_core::ikontrol::IKontrolClient;
use std::io::Write;

/// Write every project id, one per line, in upstream order.
pub fn run_projects(cfg: &AdapterConfig, out: &mut impl Write) -> Result<()> {
    cfg.validate_api()?;
    let client = IKontrolClient::from_config(&cfg.api)?;
    let ids = client.list_all_project_ids()?;
    if ids.is_empty() {
        writeln!(out, "No projects.")?;
    }
    for id in ids {
        writeln!(out, "{}", id)?;
    }
    Ok(())
}
