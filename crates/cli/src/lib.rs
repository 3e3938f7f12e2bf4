use anyhow::{anyhow, Context, Result};
use clap::Parser;
use recommend_indexer::resolve_workers;
use recommend_protocol::serialize_json;
use std::io;
use std::path::PathBuf;

pub mod config;
pub mod registry;
pub mod report;
pub mod tasks;

pub use config::{load_config, AppConfig, ConfigFile};
pub use registry::{DataTask, TaskRegistry};
pub use report::RunReport;
pub use tasks::{ProjectRecommendTask, Stage, UserRecommendTask};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "recommend")]
#[command(about = "Offline user/project recommendation batch job", long_about = None)]
#[command(version)]
struct Cli {
    /// Comma-separated input files, in the order the task expects
    #[arg(short, long, value_delimiter = ',')]
    input: Vec<PathBuf>,

    /// Output file (newline-delimited JSON, truncated if it exists)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (JSON, or TOML with a .toml extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Task to run (see --list-tasks)
    #[arg(short, long)]
    service: Option<String>,

    /// Opaque argument passed to the task
    #[arg(short, long)]
    arg: Option<String>,

    /// Workers for the primary file (overrides config and RECOMMEND_WORKERS)
    #[arg(long)]
    workers: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    quiet: bool,

    /// Print the run report as JSON on stdout (implies --quiet)
    #[arg(long)]
    json: bool,

    /// List registered tasks and their inputs, then exit
    #[arg(long)]
    list_tasks: bool,
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet || cli.json {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn list_tasks(registry: &TaskRegistry, json: bool) -> Result<()> {
    if json {
        let tasks: Vec<serde_json::Value> = registry
            .tasks()
            .map(|task| {
                serde_json::json!({
                    "name": task.name(),
                    "inputs": task.input_roles(),
                })
            })
            .collect();
        return print_stdout(&serialize_json(&tasks)?);
    }
    for task in registry.tasks() {
        print_stdout(&format!("{}\t{}", task.name(), task.input_roles().join(",")))?;
    }
    Ok(())
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = load_config(cli.config.as_deref())?;
    let workers = resolve_workers(cli.workers.or(config.workers));
    log::debug!("{}: {workers} worker(s)", config.app_name);

    let registry = TaskRegistry::with_builtin(&config, workers)?;
    if cli.list_tasks {
        return list_tasks(&registry, cli.json);
    }

    let service = cli.service.as_deref().ok_or_else(|| {
        anyhow!(
            "Missing --service (one of: {})",
            registry.names().join("|")
        )
    })?;
    let output = cli.output.as_deref().context("Missing --output")?;
    if cli.input.is_empty() {
        return Err(anyhow!("Missing --input"));
    }

    let task = registry.resolve(service)?;
    let report = task
        .run(&cli.input, output, cli.arg.as_deref())
        .await
        .with_context(|| format!("{service} failed"))?;

    if cli.json {
        print_stdout(&serialize_json(&report)?)?;
    } else {
        log::info!("{}", report.summary());
    }
    Ok(())
}
