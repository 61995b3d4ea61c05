use crate::{
    cli::args::{
        BuildArgs, FormArgs, GlobalArgs, OutputFormat, ResolveArgs, SimulateArgs, ValidateArgs,
    },
    core::{
        backend::{BackendClient, PreviewRunner, SimulateIngestRequest},
        config::{ConfigLoader, SearchflowConfig},
        form::config_to_form,
        processor::ProcessorRouter,
        schema::WorkflowConfig,
        template::{lint_template, wire::ingest_pipeline, LintRegistry, TemplateBuilder, WorkflowTemplate},
        transform::{Transform, TransformEngine},
    },
    Result,
};
use anyhow::{anyhow, Context};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing::info;

const DEFAULT_PREVIEW_INDEX: &str = "preview-index";

/// Resolved workspace, configuration and output encoding for one invocation.
pub struct CommandContext {
    pub workspace: PathBuf,
    pub config: SearchflowConfig,
    pub output: OutputFormat,
}

impl CommandContext {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let workspace = match &global.workspace {
            Some(path) => path.clone(),
            None => env::current_dir().context("failed to resolve current directory")?,
        };
        let config = ConfigLoader::load_from_workspace(&workspace)?;
        Ok(Self {
            workspace,
            config,
            output: global.output,
        })
    }

    fn engine(&self) -> TransformEngine {
        TransformEngine::new(self.config.transform.max_nesting_depth)
    }

    fn print<T: Serialize>(&self, document: &T) -> Result<()> {
        let rendered = match self.output {
            OutputFormat::Json => serde_json::to_string_pretty(document)?,
            OutputFormat::Yaml => serde_yaml::to_string(document)?,
        };
        println!("{}", rendered.trim_end());
        Ok(())
    }
}

/// Read a JSON or YAML document. `.yaml`/`.yml` files are parsed as YAML, anything
/// else as JSON with YAML as fallback.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        return serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML in {}", path.display()));
    }
    match serde_json::from_str(&content) {
        Ok(document) => Ok(document),
        Err(json_err) => serde_yaml::from_str(&content).map_err(|_| {
            anyhow!("failed to parse {}: {}", path.display(), json_err)
        }),
    }
}

fn read_workflow_config(path: &Path) -> Result<WorkflowConfig> {
    let raw: Value = read_document(path)?;
    Ok(WorkflowConfig::from_json(raw)?)
}

pub fn form(context: &CommandContext, args: FormArgs) -> Result<()> {
    let config = read_workflow_config(&args.config)?;
    let state = config_to_form(&config);
    if !args.check {
        return context.print(&state);
    }

    let errors = ProcessorRouter::standard().validate_workflow(&config, &state, &context.engine());
    info!(errors = errors.len(), "validated form state");
    context.print(&json!({ "values": state, "errors": errors }))
}

pub fn validate(context: &CommandContext, args: ValidateArgs) -> Result<()> {
    let template: WorkflowTemplate = read_document(&args.template)?;
    let results = if args.structural {
        LintRegistry::structural().run(&template)
    } else {
        lint_template(&template)
    };

    if !results.is_empty() {
        context.print(&results)?;
    }

    let errors = results.iter().filter(|result| result.is_error()).count();
    info!(
        template = %template.name,
        diagnostics = results.len(),
        errors,
        "validated template"
    );
    if errors > 0 {
        return Err(anyhow!(
            "template '{}' has {} error(s)",
            template.name,
            errors
        ));
    }
    Ok(())
}

pub fn build(context: &CommandContext, args: BuildArgs) -> Result<()> {
    let config = read_workflow_config(&args.config)?;
    let mut builder = TemplateBuilder::new(args.name)
        .schema_version(context.config.ui.schema_version.clone())
        .engine(context.engine());
    if let Some(description) = args.description {
        builder = builder.description(description);
    }
    if let Some(use_case) = args.use_case {
        builder = builder.use_case(use_case);
    }
    let template = builder.build(&config)?;
    info!(template = %template.name, "built workflow template");
    context.print(&template)
}

pub fn resolve(context: &CommandContext, args: ResolveArgs) -> Result<()> {
    let transform: Transform = read_document(&args.transform)?;
    let resolved = context.engine().resolve(&transform)?;
    context.print(&resolved)
}

pub async fn simulate(context: &CommandContext, args: SimulateArgs) -> Result<()> {
    let config = read_workflow_config(&args.config)?;
    let sources: Vec<Value> = read_document(&args.docs)?;
    if sources.is_empty() {
        return Err(anyhow!("{} contains no documents", args.docs.display()));
    }

    let engine = context.engine();
    let pipeline = ingest_pipeline(&config.ingest.enrich.processors, None, &engine)?;
    let index = args.index.clone().unwrap_or_else(|| {
        config
            .ingest
            .index
            .name
            .typed_value()
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_PREVIEW_INDEX)
            .to_string()
    });
    let request =
        SimulateIngestRequest::from_sources(&index, serde_json::to_value(&pipeline)?, sources);

    let backend = &context.config.backend;
    let client = BackendClient::new(&backend.url, Duration::from_secs(backend.timeout_seconds))?;
    let runner = PreviewRunner::new(Arc::new(client));
    let verbose = args.verbose || backend.verbose_preview;
    let preview = runner
        .preview_ingest(request.pipeline, request.docs, verbose)
        .await?
        .ok_or_else(|| anyhow!("preview was superseded"))?;

    let failed = preview.failed().count();
    info!(
        docs = preview.docs.len(),
        failed,
        partial = preview.is_partial_failure(),
        "simulated ingest pipeline"
    );
    context.print(&preview)
}
