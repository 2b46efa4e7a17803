use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Only log warnings and errors (RUST_LOG takes precedence).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log per-page and per-resource detail (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Default log directive implied by the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Regenerate topic pages from the page table and resource descriptors.
    Generate(GenerateArgs),
    /// Write the resource mapping report without touching any page.
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Page table (CSV with a header row).
    #[arg(long, default_value = "assets/web_layout/pages.csv")]
    pub pages: String,

    /// Directory scanned recursively for `*.yaml` / `*.yml` resource descriptors.
    #[arg(long, default_value = "assets/resources")]
    pub resources: String,

    /// Output directory for generated pages (created if missing).
    #[arg(long, default_value = "pages")]
    pub out: String,

    /// Only regenerate these pages (repeatable).
    #[arg(long = "page-id", value_name = "ID")]
    pub page_ids: Vec<String>,

    /// Append a `_Page ID: <id>_` footer to every page.
    #[arg(long)]
    pub page_id_footer: bool,

    /// Public path under which resource figures are published.
    #[arg(long, default_value = crate::render::DEFAULT_ASSETS_ROOT)]
    pub assets_root: String,

    /// Also write the resource mapping report (JSON Lines) to this file.
    #[arg(long)]
    pub report: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Page table (CSV with a header row).
    #[arg(long, default_value = "assets/web_layout/pages.csv")]
    pub pages: String,

    /// Directory scanned recursively for resource descriptors.
    #[arg(long, default_value = "assets/resources")]
    pub resources: String,

    /// Output file path for the mapping report.
    #[arg(long)]
    pub out: String,
}
