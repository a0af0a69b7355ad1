//! rizom-stage CLI - stage and run RizomUV batch unwrap jobs

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rizom_stage_core::prelude::*;
use rizom_stage_core::PathResolver;
use rizom_stage_core::config::config_path;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rizom-stage")]
#[command(about = "Stage batch UV-unwrapping jobs for RizomUV", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the unwrap script for a job without writing anything
    Script {
        #[command(flatten)]
        job: JobArgs,
    },

    /// Write the unwrap script into the job directory and print the command line
    Setup {
        #[command(flatten)]
        job: JobArgs,

        /// Print the script as well
        #[arg(long)]
        show_script: bool,
    },

    /// Stage a job and run RizomUV on it
    Run {
        #[command(flatten)]
        job: JobArgs,

        /// Kill RizomUV after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Keep the generated script after the run
        #[arg(long)]
        keep_script: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration to disk
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args)]
struct JobArgs {
    /// Job settings file (JSON)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Input mesh, overrides `inputMeshFile`
    #[arg(short, long)]
    input: Option<String>,

    /// Output mesh, overrides `outputMeshFile`
    #[arg(short, long)]
    output: Option<String>,

    /// Job working directory
    #[arg(short, long, default_value = ".")]
    workdir: PathBuf,

    /// RizomUV executable, overrides the configuration
    #[arg(long)]
    executable: Option<PathBuf>,
}

impl JobArgs {
    async fn settings(&self) -> Result<RizomUvSettings> {
        let mut settings = match &self.settings {
            Some(path) => RizomUvSettings::load(path)
                .await
                .with_context(|| format!("Failed to read settings {}", path.display()))?,
            None => RizomUvSettings::default(),
        };
        if let Some(input) = &self.input {
            settings.input_mesh_file.clone_from(input);
        }
        if let Some(output) = &self.output {
            settings.output_mesh_file.clone_from(output);
        }
        Ok(settings)
    }

    fn config(&self) -> Result<ToolConfig> {
        let mut config = ToolConfig::load().context("Failed to load configuration")?;
        if let Some(executable) = &self.executable {
            config.executable.clone_from(executable);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr - stdout carries scripts and command lines
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Script { job } => {
            run_script(&job).await?;
        }
        Commands::Setup { job, show_script } => {
            run_stage(&job, show_script).await?;
        }
        Commands::Run {
            job,
            timeout,
            keep_script,
        } => {
            run_job(&job, timeout, keep_script).await?;
        }
        Commands::Config { init } => {
            show_config(init)?;
        }
    }

    Ok(())
}

async fn run_script(args: &JobArgs) -> Result<()> {
    let script = render_job_script(args).await?;
    println!("{}", script);

    Ok(())
}

async fn render_job_script(args: &JobArgs) -> Result<String> {
    let settings = args.settings().await?;
    let job = JobDirectory::new(absolute(&args.workdir)?);

    let input = job
        .resolve_path(&settings.input_mesh_file)
        .ok_or(Error::MissingInputMesh)?;
    let output = job
        .resolve_path(&settings.output_mesh_file)
        .ok_or(Error::MissingOutputMesh)?;

    Ok(RizomUvTool::render_script(&settings, &input, &output)?)
}

async fn stage(args: &JobArgs, config: &ToolConfig) -> Result<(JobDirectory, ToolSetup)> {
    let settings = args.settings().await?;
    let job = JobDirectory::new(absolute(&args.workdir)?);
    job.create()
        .await
        .with_context(|| format!("Failed to create job directory {}", job.root().display()))?;
    info!("Job directory: {}", job.root().display());

    let tool = RizomUvTool::new(&config.executable);
    info!("{} executable: {}", tool.name(), tool.executable().display());
    let setup = tool
        .setup_instance(&settings, &job)
        .await
        .with_context(|| format!("{} job setup failed", tool.name()))?;

    Ok((job, setup))
}

async fn run_stage(args: &JobArgs, show_script: bool) -> Result<()> {
    let config = args.config()?;
    let (_, setup) = stage(args, &config).await?;

    if show_script {
        println!("{}", setup.script);
        println!();
    }
    println!("{}", setup.command);

    Ok(())
}

async fn run_job(args: &JobArgs, timeout: Option<u64>, keep_script: bool) -> Result<()> {
    let mut config = args.config()?;
    if timeout.is_some() {
        config.timeout_secs = timeout;
    }
    config.keep_script |= keep_script;

    let (job, setup) = stage(args, &config).await?;
    let report = run_setup(&config, &setup, job.root()).await?;

    println!("{}", report);
    for path in &setup.outputs {
        if !report.missing_outputs.contains(path) {
            println!("  wrote {}", path.display());
        }
    }
    if !report.is_complete() {
        anyhow::bail!(
            "RizomUV did not write {} of {} requested output(s)",
            report.missing_outputs.len(),
            setup.outputs.len()
        );
    }

    Ok(())
}

fn show_config(init: bool) -> Result<()> {
    if init {
        let path = ToolConfig::default().save()?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = ToolConfig::load()?;
    match config_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no config directory)"),
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?
    );

    Ok(())
}

/// Absolute form of the job directory, so generated paths survive a
/// change of working directory in the external tool
fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("Failed to resolve job directory {}", path.display()))
}
