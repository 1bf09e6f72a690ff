use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use solid_core::{ShapeKind, classify};
use solid_kernel::{GeometryKernel, LoadState, NativeKernel};
use solid_pipeline::config::{MODULE_NAME_VAR, OUTPUT_DIR_VAR, RESOURCES_DIR_VAR};
use solid_pipeline::{Outcome, Settings};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "solid")]
#[command(version)]
#[command(about = "Generate OBJ solids from short text prompts")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify a prompt and write the matching solid as an OBJ file
    Generate {
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Show which shape a prompt maps to without generating anything
    Classify {
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Load the geometry module and report where it was found
    Kernel,
    /// Print the resolved configuration
    Config,
}

#[derive(Debug, Default, Args)]
struct Overrides {
    /// Directory OBJ files are written to [default: desktop]
    #[arg(long, global = true, env = OUTPUT_DIR_VAR)]
    output_dir: Option<PathBuf>,

    /// Bundled-resources directory searched after the working directory
    #[arg(long, global = true, env = RESOURCES_DIR_VAR)]
    resources_dir: Option<PathBuf>,

    /// Base name of the geometry module
    #[arg(long, global = true, env = MODULE_NAME_VAR)]
    module_name: Option<String>,
}

impl Overrides {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(dir) = self.output_dir {
            settings.output_dir = Some(dir);
        }
        if let Some(dir) = self.resources_dir {
            settings.resources_dir = Some(dir);
        }
        if let Some(name) = self.module_name {
            settings.module_name = name;
        }
        settings
    }
}

#[derive(Debug, Serialize)]
struct Classification<'a> {
    prompt: &'a str,
    shape: ShapeKind,
    shape_id: Option<i32>,
}

#[derive(Debug, Serialize)]
struct KernelReport {
    loaded: bool,
    module: String,
    path: Option<PathBuf>,
    error: Option<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.overrides.apply(Settings::from_env());
    run(cli.command, &settings, cli.json)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command, settings: &Settings, json: bool) -> anyhow::Result<ExitCode> {
    match command {
        Command::Generate { prompt } => {
            let pipeline = settings.native_pipeline();
            let outcome = pipeline.run(&prompt.join(" "));
            println!("{}", render_outcome(&outcome, json)?);
            Ok(ExitCode::from(exit_status(&outcome)))
        }
        Command::Classify { prompt } => {
            let prompt = prompt.join(" ");
            println!("{}", render_classification(&prompt, json)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Kernel => {
            let report = kernel_report(&NativeKernel::load(settings.kernel_search()));
            println!("{}", render_kernel(&report, json)?);
            Ok(if report.loaded {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Config => {
            let text = serde_json::to_string_pretty(settings).context("encoding settings")?;
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// 0 on success, 2 when rephrasing or another output directory may help,
/// 1 when the geometry module itself is at fault.
fn exit_status(outcome: &Outcome) -> u8 {
    if outcome.succeeded {
        0
    } else if outcome.is_recoverable() {
        2
    } else {
        1
    }
}

fn render_outcome(outcome: &Outcome, json: bool) -> anyhow::Result<String> {
    if json {
        return serde_json::to_string_pretty(outcome).context("encoding outcome");
    }
    Ok(match (&outcome.path, outcome.succeeded) {
        (Some(path), true) => format!("{}: {}", outcome.message, path.display()),
        _ if outcome.is_recoverable() => format!("warning: {}", outcome.message),
        _ => format!("error: {}", outcome.message),
    })
}

fn render_classification(prompt: &str, json: bool) -> anyhow::Result<String> {
    let shape = classify(prompt);
    let classification = Classification {
        prompt,
        shape,
        shape_id: shape.solid().map(|solid| solid.code()),
    };
    if json {
        return serde_json::to_string_pretty(&classification).context("encoding classification");
    }
    Ok(match classification.shape_id {
        Some(id) => format!("{shape} (shape id {id})"),
        None => shape.to_string(),
    })
}

fn kernel_report(kernel: &NativeKernel) -> KernelReport {
    let module = kernel.search().file_name().to_string_lossy().into_owned();
    let error = match kernel.ensure_loaded() {
        Ok(()) => None,
        Err(err) => Some(err.to_string()),
    };
    KernelReport {
        loaded: kernel.state() == LoadState::Loaded,
        module,
        path: kernel.module_path().map(PathBuf::from),
        error,
    }
}

fn render_kernel(report: &KernelReport, json: bool) -> anyhow::Result<String> {
    if json {
        return serde_json::to_string_pretty(report).context("encoding kernel report");
    }
    Ok(match (&report.path, &report.error) {
        (Some(path), _) => format!("{} loaded from {}", report.module, path.display()),
        (None, Some(error)) => format!("error: {error}"),
        (None, None) => format!("{} not loaded", report.module),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use solid_kernel::{KernelSearch, NativeKernel};
    use solid_pipeline::{Outcome, PipelineError, Settings};

    use super::{
        Cli, Command, exit_status, kernel_report, render_classification, render_kernel,
        render_outcome,
    };

    #[test]
    fn joins_trailing_prompt_words() {
        let cli = Cli::try_parse_from(["solid", "generate", "a", "round", "ball"])
            .expect("arguments should parse");
        match cli.command {
            Command::Generate { prompt } => assert_eq!(prompt.join(" "), "a round ball"),
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::try_parse_from([
            "solid",
            "--output-dir",
            "/srv/models",
            "--module-name",
            "geometry_v2",
            "kernel",
        ])
        .expect("arguments should parse");
        let settings = cli.overrides.apply(Settings::default());
        assert_eq!(settings.output_dir, Some(PathBuf::from("/srv/models")));
        assert_eq!(settings.module_name, "geometry_v2");
        assert_eq!(settings.resources_dir, None);
    }

    #[test]
    fn generate_requires_a_prompt() {
        assert!(Cli::try_parse_from(["solid", "generate"]).is_err());
    }

    #[test]
    fn renders_success_with_path() {
        let outcome = Outcome::generated(PathBuf::from("/out/cube_model_20240101_000000.obj"));
        let text = render_outcome(&outcome, false).expect("render should succeed");
        assert_eq!(text, "generated: /out/cube_model_20240101_000000.obj");
        assert_eq!(exit_status(&outcome), 0);
    }

    #[test]
    fn recoverable_failures_render_as_warnings() {
        let outcome = Outcome::failed(&PipelineError::UnrecognizedPrompt);
        let text = render_outcome(&outcome, false).expect("render should succeed");
        assert_eq!(text, "warning: shape not recognized");
        assert_eq!(exit_status(&outcome), 2);
    }

    #[test]
    fn json_outcome_is_machine_readable() {
        let outcome = Outcome::failed(&PipelineError::EmptyPrompt);
        let text = render_outcome(&outcome, true).expect("render should succeed");
        let value: serde_json::Value = serde_json::from_str(&text).expect("output should be JSON");
        assert_eq!(value["succeeded"], false);
        assert_eq!(value["message"], "empty prompt");
    }

    #[test]
    fn classification_reports_shape_id() {
        assert_eq!(
            render_classification("a round ball", false).expect("render should succeed"),
            "sphere (shape id 2)"
        );
        assert_eq!(
            render_classification("a floating idea", false).expect("render should succeed"),
            "unknown"
        );
        let json = render_classification("a box", true).expect("render should succeed");
        let value: serde_json::Value = serde_json::from_str(&json).expect("output should be JSON");
        assert_eq!(value["shape"], "cube");
        assert_eq!(value["shape_id"], 1);
    }

    #[test]
    fn missing_kernel_is_reported_with_searched_dirs() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let kernel = NativeKernel::load(KernelSearch::default().with_dir(dir.path()));

        let report = kernel_report(&kernel);
        assert!(!report.loaded);
        assert!(report.path.is_none());
        let text = render_kernel(&report, false).expect("render should succeed");
        assert!(text.starts_with("error: geometry module"));
        assert!(text.contains(&dir.path().display().to_string()));
    }

    #[test]
    fn generate_with_missing_kernel_is_fatal() {
        let module_dir = tempfile::tempdir().expect("temp dir should be created");
        let out_dir = tempfile::tempdir().expect("temp dir should be created");
        let settings = Settings {
            output_dir: Some(out_dir.path().to_path_buf()),
            resources_dir: Some(module_dir.path().to_path_buf()),
            module_name: "geometry_missing_for_test".to_string(),
        };

        let outcome = settings.native_pipeline().run("a standard cube");
        assert!(!outcome.succeeded);
        assert_eq!(exit_status(&outcome), 1);
        assert!(
            render_outcome(&outcome, false)
                .expect("render should succeed")
                .starts_with("error:")
        );
    }
}
