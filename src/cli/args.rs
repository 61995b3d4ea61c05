use clap::Args;
use std::path::PathBuf;

/// Options shared by every command.
#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Workspace holding searchflow.toml and .searchflow/ (default: current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub workspace: Option<PathBuf>,

    /// Encoding used for printed documents
    #[arg(long, global = true, default_value = "json", value_name = "FORMAT")]
    pub output: OutputFormat,
}

#[derive(Args)]
pub struct FormArgs {
    /// Workflow config file (JSON or YAML)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Also run field and processor validation and print the problems found
    #[arg(long)]
    pub check: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Workflow template file (JSON or YAML)
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Only run graph-shape rules (ids, edges, cycles, declared inputs)
    #[arg(long)]
    pub structural: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Workflow config file (JSON or YAML)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Template name
    #[arg(long, value_name = "NAME")]
    pub name: String,

    /// Template description
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// Use case recorded on the template
    #[arg(long, value_name = "TEXT")]
    pub use_case: Option<String>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Transform file (JSON or YAML)
    #[arg(value_name = "TRANSFORM")]
    pub transform: PathBuf,
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Workflow config whose ingest processors are simulated
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Documents to push through the pipeline: an array of `_source` bodies
    #[arg(value_name = "DOCS")]
    pub docs: PathBuf,

    /// Request per-processor results (overrides backend.verbose_preview)
    #[arg(long)]
    pub verbose: bool,

    /// Index name used for the simulated documents (default: the config's index name)
    #[arg(long, value_name = "INDEX")]
    pub index: Option<String>,
}

#[derive(Clone, Copy, clap::ValueEnum, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}
