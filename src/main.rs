//! Nuke Deadline CLI
//!
//! Entry point for the `nuke-deadline` command-line tool.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use nuke_deadline::config::{default_studio_config_path, EffectiveConfig, PROJECT_CONFIG_PATH};
use nuke_deadline::telemetry::{self, LogFormat};
use nuke_deadline::{Context, Instance, MockTransport, NukeSubmitDeadline};
use nuke_scene::Scene;
use serde_json::json;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "nuke-deadline")]
#[command(about = "Submit Nuke renders to Deadline", version)]
struct Cli {
    /// Log format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one publish instance
    Submit {
        /// Instance data export (JSON)
        #[arg(long, short = 'i')]
        instance: PathBuf,

        /// Publish context export (JSON)
        #[arg(long)]
        context: PathBuf,

        /// Scene snapshot used for limit groups (JSON)
        #[arg(long)]
        scene: Option<PathBuf>,

        /// Path to project config file (default: .deadline/nuke.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Deadline Web Service URL
        #[arg(long)]
        url: Option<String>,

        /// Build payloads against an in-process mock service
        #[arg(long)]
        dry_run: bool,

        /// Print the updated instance as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration with provenance
    Config {
        /// Path to project config file (default: .deadline/nuke.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    if let Err(e) = telemetry::init(level, cli.log_format) {
        eprintln!("{}", e);
    }

    match cli.command {
        Commands::Submit {
            instance,
            context,
            scene,
            config,
            url,
            dry_run,
            json,
        } => run_submit(SubmitArgs {
            instance,
            context,
            scene,
            config,
            url,
            dry_run,
            json,
        }),
        Commands::Config { config } => run_config(config),
    }
}

struct SubmitArgs {
    instance: PathBuf,
    context: PathBuf,
    scene: Option<PathBuf>,
    config: Option<PathBuf>,
    url: Option<String>,
    dry_run: bool,
    json: bool,
}

fn load_config(project: Option<PathBuf>, url: Option<String>) -> EffectiveConfig {
    let studio = default_studio_config_path();
    let project = project.unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_PATH));
    let cli_overrides = url.map(|url| json!({"deadline": {"url": url}}));

    match EffectiveConfig::build(studio.as_deref(), Some(Path::new(&project)), cli_overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(10);
        }
    }
}

fn run_submit(args: SubmitArgs) {
    let config = load_config(args.config, args.url);
    let settings = match config.settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(10);
        }
    };

    let mut instance = match Instance::load(&args.instance) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(11);
        }
    };
    let context = match Context::load(&args.context) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(11);
        }
    };
    let scene = match args.scene.as_deref().map(Scene::load).transpose() {
        Ok(scene) => scene.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(11);
        }
    };

    let mut submitter = NukeSubmitDeadline::new(settings).with_scene(scene);
    let mock = MockTransport::new();
    if args.dry_run {
        submitter = submitter.with_transport(Arc::new(mock.clone()));
    }

    let outcome = match submitter.process(&mut instance, &context) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Submission failed: {}", e);
            process::exit(e.exit_code());
        }
    };

    if args.dry_run {
        for job in mock.service().jobs() {
            match serde_json::to_string_pretty(&job.payload) {
                Ok(payload) => println!("{}", payload),
                Err(e) => eprintln!("Error serializing payload: {}", e),
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&instance) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else if !args.dry_run {
        match outcome {
            None => println!("Instance {} is not rendered on the farm", instance.name),
            Some(outcome) => {
                println!("Submitted {} job(s) to {}", outcome.job_count(), outcome.deadline_url);
                if let Some(id) = outcome.render_job.as_ref().and_then(|r| r.job_id()) {
                    println!("  Render job: {}", id);
                }
                for id in &instance.baking_submission_jobs {
                    println!("  Baking job: {}", id);
                }
                println!("  Expected files: {}", outcome.expected_files);
            }
        }
    }
}

fn run_config(project: Option<PathBuf>) {
    let config = load_config(project, None);
    match config.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            process::exit(1);
        }
    }
}
