use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use papercast::Pipeline;
use papercast::cli::{Cli, Commands, ConfigAction};
use papercast::config::Config;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Generate {
            input,
            duration,
            output,
            name,
            save_script,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(minutes) = duration {
                config.generation.target_minutes = minutes;
            }
            if let Some(dir) = output {
                config.output.dir = dir;
            }

            let document_name = name.unwrap_or_else(|| match &input {
                Some(path) => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "document".to_string()),
                None => "stdin".to_string(),
            });
            let text = read_input(input.as_deref())?;

            let spinner = (!cli.quiet).then(|| make_spinner(&document_name));
            let pipeline = Pipeline::new(config);
            let result = pipeline.generate_podcast(&text, &document_name).await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            let podcast = result?;
            if save_script {
                let script_path = podcast.audio_path.with_extension("txt");
                std::fs::write(&script_path, &podcast.script)
                    .with_context(|| format!("failed to write {}", script_path.display()))?;
                if !cli.quiet {
                    eprintln!("Script written to {}", script_path.display());
                }
            }
            if cli.quiet {
                println!("{}", podcast.audio_path.display());
            } else {
                eprintln!(
                    "{} {}",
                    "Episode ready:".green().bold(),
                    podcast.audio_path.display()
                );
            }
        }

        Commands::Config { action } => run_config_action(action, cli.config.as_deref())?,

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "papercast", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("papercast={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.map(PathBuf::from).unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    Ok(config.with_env_overrides())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn make_spinner(document_name: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Producing podcast from {document_name}…"));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn run_config_action(action: ConfigAction, config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Init => {
            if path.exists() {
                anyhow::bail!("config file already exists at {}", path.display());
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let rendered = toml::to_string_pretty(&Config::default())?;
            std::fs::write(&path, rendered)?;
            eprintln!("Wrote default config to {}", path.display());
        }
        ConfigAction::Show => {
            let config = Config::load_or_default(&path)?.with_env_overrides();
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}
