//! Local ZIP assembly.
//!
//! Scheme PDFs and the JSON document are staged as files in a temporary
//! directory, deflated into a temporary archive and read back into memory.
//! Both temporaries live in the caller's work dir and are removed on every
//! exit path.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::ikontrol::{IKontrolClient, ProjectId, Transport};

/// Archive entry name of a scheme-response PDF.
fn scheme_pdf_name(response_id: i64) -> String {
    format!("Schemeresponse-{}.pdf", response_id)
}

fn document_name(project_id: ProjectId) -> String {
    format!("{}.json", project_id)
}

/// Copy a staged file into the archive under `name`.
fn add_staged<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    staged: &Path,
    name: &str,
    options: FileOptions,
) -> Result<()> {
    zip.start_file(name, options)
        .with_context(|| format!("start archive entry {name}"))?;
    let mut file = File::open(staged).with_context(|| format!("open {}", staged.display()))?;
    io::copy(&mut file, zip).with_context(|| format!("write archive entry {name}"))?;
    Ok(())
}

fn stage(dir: &Path, name: &str, data: &[u8]) -> Result<std::path::PathBuf> {
    let path = dir.join(name);
    fs::write(&path, data).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

impl<T: Transport> IKontrolClient<T> {
    /// ZIP with `Schemeresponse-{id}.pdf` per scheme response and `{project_id}.json`.
    pub fn build_project_zip(&self, project_id: ProjectId, work_dir: &Path) -> Result<Vec<u8>> {
        let staging = tempfile::Builder::new()
            .prefix(&format!("ikontrol-{}-", project_id))
            .tempdir_in(work_dir)
            .with_context(|| format!("create staging dir in {}", work_dir.display()))?;
        let archive = tempfile::Builder::new()
            .prefix(&format!("ikontrol-{}-", project_id))
            .suffix(".zip")
            .tempfile_in(work_dir)
            .with_context(|| format!("create archive in {}", work_dir.display()))?;

        let zip = ZipWriter::new(archive.as_file());
        self.write_to_zip(zip, staging.path(), project_id)?;
        let data = fs::read(archive.path()).context("read back project archive")?;

        staging.close().context("remove staging dir")?;
        archive.close().context("remove project archive")?;
        Ok(data)
    }

    /// Stage and add every entry, then finish the archive.
    fn write_to_zip<W: Write + Seek>(
        &self,
        mut zip: ZipWriter<W>,
        staging_dir: &Path,
        project_id: ProjectId,
    ) -> Result<()> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let schemes = self.list_schemes(project_id)?;
        for (response_id, pdf) in self.download_scheme_pdfs(&schemes)? {
            let name = scheme_pdf_name(response_id);
            let staged = stage(staging_dir, &name, &pdf)?;
            add_staged(&mut zip, &staged, &name, options)?;
        }

        let name = document_name(project_id);
        let document = self.schemes_and_tasks_document(project_id, &schemes)?;
        let staged = stage(staging_dir, &name, &document)?;
        add_staged(&mut zip, &staged, &name, options)?;

        zip.finish().context("finish project archive")?;
        Ok(())
    }
}
