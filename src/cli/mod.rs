pub mod args;
pub mod commands;

pub use args::{BuildArgs, FormArgs, GlobalArgs, OutputFormat, ResolveArgs, SimulateArgs, ValidateArgs};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
WORKFLOW COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "searchflow")]
#[command(version = crate::VERSION)]
#[command(about = "Edit, validate and preview search and ingest pipeline workflows")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: inspect a config as form state, build a template, validate it, then simulate ingest against a backend."
)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Print the form state of a workflow config",
        long_about = "Form maps every field of the config to its form path, filling in type defaults for missing values.",
        after_help = "Example:\n    searchflow form ./workflow.json --check"
    )]
    Form(FormArgs),
    #[command(
        about = "Lint a workflow template",
        long_about = "Validate prints every diagnostic, most severe first, and exits non-zero when any has error severity.",
        after_help = "Example:\n    searchflow validate ./template.yaml"
    )]
    Validate(ValidateArgs),
    #[command(
        about = "Build a provisioning template from a workflow config",
        long_about = "Build turns the ingest and search sections of a config into pipeline and index nodes, then validates the result.",
        after_help = "Example:\n    searchflow build ./workflow.json --name \"Product search\""
    )]
    Build(BuildArgs),
    #[command(
        about = "Resolve a transform to its concrete value",
        long_about = "Resolve substitutes every template variable and reports unresolved or malformed references.",
        after_help = "Example:\n    searchflow resolve ./transform.json"
    )]
    Resolve(ResolveArgs),
    #[command(
        about = "Preview the ingest pipeline on sample documents",
        long_about = "Simulate sends the config's ingest processors and the given documents to the backend and reports which documents succeeded.",
        after_help = "Example:\n    searchflow simulate ./workflow.json ./docs.json --verbose"
    )]
    Simulate(SimulateArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Form(_) => "form",
            Command::Validate(_) => "validate",
            Command::Build(_) => "build",
            Command::Resolve(_) => "resolve",
            Command::Simulate(_) => "simulate",
        }
    }
}

pub async fn run(args: Args) -> crate::Result<()> {
    let context = commands::CommandContext::load(&args.global)?;
    let _logging = crate::logging::init(&context.config.logging, &context.workspace, true)?;
    tracing::debug!(command = args.command.name(), workspace = %context.workspace.display(), "starting command");

    match args.command {
        Command::Form(form_args) => commands::form(&context, form_args),
        Command::Validate(validate_args) => commands::validate(&context, validate_args),
        Command::Build(build_args) => commands::build(&context, build_args),
        Command::Resolve(resolve_args) => commands::resolve(&context, resolve_args),
        Command::Simulate(simulate_args) => commands::simulate(&context, simulate_args).await,
    }
}
