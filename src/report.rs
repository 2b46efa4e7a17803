use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::ReportArgs;
use crate::formats::{ReportStatus, ResourceReportEntry};
use crate::ownership::Ownership;
use crate::page_table::PageTable;
use crate::resources::ResourceIndex;

pub fn run(args: ReportArgs) -> anyhow::Result<()> {
    let table = PageTable::load(Path::new(&args.pages)).context("load page table")?;
    let index = ResourceIndex::load(Path::new(&args.resources));
    let ownership = Ownership::resolve(&table, &index);

    let mut entries = index.report().to_vec();
    ownership.mark(&mut entries);
    write(&PathBuf::from(&args.out), entries)
}

/// Write report entries as JSON Lines, sorted by descriptor path.
pub fn write(out_path: &Path, mut entries: Vec<ResourceReportEntry>) -> anyhow::Result<()> {
    entries.sort_by(|a, b| a.file.cmp(&b.file));

    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create report dir: {}", parent.display()))?;
    }

    let file = std::fs::File::create(out_path)
        .with_context(|| format!("create report: {}", out_path.display()))?;
    let mut out = BufWriter::new(file);
    for entry in &entries {
        serde_json::to_writer(&mut out, entry).context("serialize report entry")?;
        out.write_all(b"\n").context("write report newline")?;
    }
    out.flush().context("flush report")?;

    let count = |status| entries.iter().filter(|e| e.status == status).count();
    tracing::info!(
        out = %out_path.display(),
        loaded = count(ReportStatus::Loaded),
        unmapped = entries.iter().filter(|e| e.mapped == Some(false)).count(),
        parse_errors = count(ReportStatus::ParseError),
        missing_owner = count(ReportStatus::MissingOwner),
        "wrote resource report"
    );
    Ok(())
}
