use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vidscribe::cli::{Cli, Commands};
use vidscribe::config::Config;
use vidscribe::output;
use vidscribe::platform::{classify, Platform};
use vidscribe::server::{self, AppState};
use vidscribe::utils::validate_language_code;
use vidscribe::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = Config::load().await?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(&config).await?;
        }
        Commands::Fetch {
            url,
            languages,
            timestamps,
            format,
        } => {
            let config = Config::load().await?;
            let reference = classify(&url)?;

            let languages = if languages.is_empty() {
                config.transcript.default_languages.clone()
            } else {
                for code in &languages {
                    validate_language_code(code)?;
                }
                languages
            };

            let state = AppState::from_config(&config)?;

            tracing::info!(
                "Fetching {} transcript for {}",
                reference.platform().display_name(),
                reference.canonical()
            );

            let progress = if cli.quiet {
                ProgressBar::hidden()
            } else {
                ProgressBar::new_spinner()
            };
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
            );
            progress.enable_steady_tick(Duration::from_millis(120));
            progress.set_message(format!("Fetching transcript ({})...", languages.join(", ")));

            let outcome = state.orchestrator.resolve(&reference, &languages).await;
            progress.finish_and_clear();

            match outcome {
                Ok(resolution) => {
                    output::print_to_console(
                        &resolution,
                        reference.canonical(),
                        &format,
                        timestamps,
                    )?;
                }
                Err(err) => {
                    eprintln!("Could not fetch transcript:");
                    for hint in err.suggestions(reference.platform()) {
                        eprintln!("   • {}", hint);
                    }
                    return Err(err.into());
                }
            }
        }
        Commands::Classify { url } => {
            let reference = classify(&url)?;
            println!("Platform: {}", reference.platform());
            println!("URL: {}", reference.canonical());
            if let Some(id) = reference.video_id() {
                println!("Video ID: {}", id);
            }
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                println!("Configuration is read from ./config.yaml or the user config directory (vidscribe/config.yaml).");
                println!("Run `vidscribe config --show` to print the effective settings.");
            }
        }
        Commands::Platforms => {
            println!("Supported platforms:");
            for platform in Platform::supported() {
                let hosts = match platform {
                    Platform::Youtube => "youtube.com, youtu.be, bare 11-character ids",
                    Platform::TikTok => "tiktok.com",
                    Platform::Twitter => "twitter.com, x.com",
                    Platform::Unknown => continue,
                };
                println!("  • {} ({})", platform.display_name(), hosts);
            }
            println!("  • Other URLs are passed to the transcript API as-is");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("vidscribe=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidscribe=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
