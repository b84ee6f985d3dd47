//! `ikontrol-ingress run` – bundle every project and upload it.

use anyhow::Result;
use ikontrol_core::adapter::IngressAdapter;
use ikontrol_core::config::AdapterConfig;
use ikontrol_core::ikontrol::IKontrolClient;
use ikontrol_core::ingress::{DirectoryUploader, HttpUploader, Uploader};
use ikontrol_core::run::run_ingestion;
use std::path::Path;

pub fn run_ingest(cfg: &AdapterConfig, output_dir: Option<&Path>) -> Result<()> {
    // The ingress target is only needed when actually uploading.
    match output_dir {
        Some(_) => cfg.validate_api()?,
        None => cfg.validate()?,
    }

    let client = IKontrolClient::from_config(&cfg.api)?;
    let mut adapter = IngressAdapter::new(client, cfg.bundle.strategy, cfg.bundle.work_dir())?;

    let mut uploader: Box<dyn Uploader> = match output_dir {
        Some(dir) => Box::new(DirectoryUploader::create(dir)?),
        None => Box::new(HttpUploader::from_config(&cfg.ingress).with_timeout(cfg.api.timeout())),
    };

    let summary = run_ingestion(&mut adapter, uploader.as_mut())?;
    if summary.projects == 0 {
        println!("No projects.");
    } else {
        println!(
            "Ingested {} project(s), {} bytes.",
            summary.projects, summary.bytes
        );
    }
    Ok(())
}
