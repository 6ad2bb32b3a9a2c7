use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use haven_launch::core::config::{Environment, Interpreter};
use haven_launch::core::downloader::Downloader;
use haven_launch::core::java;
use haven_launch::core::launch::{self, LaunchPlan, Loader};
use haven_launch::core::props::HostProperties;
use haven_launch::core::state::LauncherSettings;
use haven_launch::{LauncherError, LauncherResult};

#[derive(Parser)]
#[command(name = "haven-launch")]
#[command(about = "Interpret a launch file and start the application it describes")]
struct Cli {
    /// Host property override visible as `${p:NAME}`, e.g. `-D channel=beta`
    #[arg(short = 'D', value_name = "NAME=VALUE", value_parser = parse_property, global = true)]
    properties: Vec<(String, String)>,

    /// Cache directory for downloaded resources
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, fetch and launch a launch file
    Run {
        /// Path or URL of the launch file
        source: String,
        /// Java binary to use instead of auto-detection
        #[arg(long)]
        java: Option<PathBuf>,
        /// Print the command line instead of starting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Interpret a local launch file and print the resulting descriptor as JSON
    Check {
        /// Path to the launch file
        file: PathBuf,
    },
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))
}

#[tokio::main]
async fn main() -> ExitCode {
    haven_launch::init_logging();
    let cli = Cli::parse();

    let mut settings = LauncherSettings::load();
    if let Some(dir) = cli.cache_dir {
        settings.cache_dir = dir;
    }
    let properties = HostProperties::detect()
        .extend(settings.properties.clone())
        .extend(cli.properties);

    let result = match cli.command {
        Commands::Run {
            source,
            java,
            dry_run,
        } => {
            if java.is_some() {
                settings.java_path = java;
            }
            run(&source, &settings, properties, dry_run).await
        }
        Commands::Check { file } => check(&file, properties),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("haven-launch: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    source: &str,
    settings: &LauncherSettings,
    properties: HostProperties,
    dry_run: bool,
) -> LauncherResult<ExitCode> {
    let downloader = Downloader::new(&settings.cache_dir)?.with_concurrency(settings.concurrency);
    let os = properties.os_name().to_string();
    let arch = properties.os_arch().to_string();
    let properties = Arc::new(properties);

    let source = launch::source_resource(source)?;
    let desc = Loader::new(&downloader, properties).load(&source).await?;

    let natives_dir = settings.cache_dir.join("natives");
    let plan = LaunchPlan::prepare(&desc, &downloader, &os, &arch, &natives_dir).await?;
    let java_bin = java::resolve_java_binary(settings.java_path.as_deref())?;
    let command = launch::build_command(&desc, &plan, &java_bin)?;

    if dry_run {
        println!("{}", command.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut child = launch::spawn(&desc, &command)?;
    let status = tokio::task::spawn_blocking(move || child.wait())
        .await
        .map_err(|e| LauncherError::JavaExecution(e.to_string()))??;
    info!("Application exited with {}", status);

    Ok(match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    })
}

fn check(file: &std::path::Path, properties: HostProperties) -> LauncherResult<ExitCode> {
    let source = launch::source_resource(&file.to_string_lossy())?;
    let text = std::fs::read_to_string(file).map_err(|source| LauncherError::Io {
        path: file.to_path_buf(),
        source,
    })?;

    let mut interp = Interpreter::new(Arc::new(properties));
    interp.read(text.as_bytes(), Environment::from_resource(&source))?;
    println!("{}", serde_json::to_string_pretty(interp.descriptor())?);
    Ok(ExitCode::SUCCESS)
}
