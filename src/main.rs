//! Stream Readiness Tester - Main CLI Application
//!
//! Measures latency, jitter and sustained upload throughput, then tells
//! whether the connection is fit for live streaming.

use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::process;
use stream_readiness_tester::{
    app::App,
    cli::{Action, Cli},
    client::{HttpClient, NetworkClient},
    config::{display_config_summary, load_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    logging::LoggerFactory,
    output::OutputFormatterFactory,
    store::FileStore,
    LONG_VERSION, PKG_NAME,
};

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose);

    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);
        print_error_suggestions(&e, reporter.verbose);

        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    let action = cli.action();
    let terminal_colors = cli.use_colors();

    if cli.debug {
        eprintln!("{} {}", PKG_NAME, LONG_VERSION);
        eprintln!("Debug mode enabled");
    }

    let mut config = load_config(cli)?;
    config.enable_color &= terminal_colors;
    if !config.enable_color {
        colored::control::set_override(false);
    }

    if config.debug {
        eprintln!("\nConfiguration Summary:");
        eprintln!("{}\n", display_config_summary(&config));
    }

    let factory = LoggerFactory::new(config.clone());
    let logger = Arc::new(factory.create_logger(PKG_NAME).await);

    let mut store = FileStore::open(config.store_path.clone())?;
    if let Some(warning) = store.take_warning() {
        logger.warn(&warning).log().await;
    }
    logger.debug("Preference store opened")
        .field("path", store.path().display().to_string())
        .log()
        .await;

    let mut renderer = OutputFormatterFactory::create_renderer(&config);
    let mut app = if action.needs_network() {
        let client: Arc<dyn HttpClient> = Arc::new(NetworkClient::with_timeout(config.timeout())?);
        App::new(config.clone(), client, store, logger.clone())
    } else {
        App::offline(config.clone(), store, logger.clone())
    };

    match action {
        Action::RunTest => {
            let report = app.run_test(renderer.as_target()).await?;
            renderer.record_report(&report);
            println!("{}", renderer.render()?);
        }
        Action::SignIn(name) => {
            app.restore_view(renderer.as_target())?;
            if !app.sign_in(&name, renderer.as_target())? {
                logger.warn("Ignoring blank display name").log().await;
            }
            println!("{}", renderer.render()?);
        }
        Action::SignOut => {
            app.restore_view(renderer.as_target())?;
            app.sign_out(renderer.as_target())?;
            println!("{}", renderer.render()?);
        }
        Action::ToggleTheme => {
            app.restore_view(renderer.as_target())?;
            let theme = app.toggle_theme(renderer.as_target())?;
            println!("{}", renderer.render()?);
            if !config.json {
                println!("Theme switched to {}", theme);
            }
        }
        Action::ShowLast => {
            let snapshot = app.last_result()?;
            println!("{}", renderer.render_snapshot(snapshot.as_ref())?);
        }
    }

    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError, verbose: bool) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - Verify URL formats (must start with http:// or https://)");
            eprintln!("  - Sample counts must be between 1 and 100");
            eprintln!("  - Run with --help to list every option");

            for warning in EnvManager::validate_current_env() {
                eprintln!("  {}", warning);
            }
            if let Ok(Some(warnings)) = EnvManager::check_env_file(Path::new(".env")) {
                for warning in warnings {
                    eprintln!("  .env {}", warning);
                }
            }
            if verbose {
                eprintln!();
                eprintln!("{}", EnvManager::display_env_help());
            }
        }
        AppError::Network(_) | AppError::HttpRequest(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check your internet connection");
            eprintln!("  - Verify firewall or proxy settings");
            eprintln!("  - Try a different endpoint with --latency-url or --upload-url");
            eprintln!("  - Drop --strict to record failed samples instead of aborting");
        }
        AppError::Timeout(_) => {
            eprintln!();
            eprintln!("Timeout help:");
            eprintln!("  - Increase the per-request timeout with --timeout");
            eprintln!("  - Reduce the upload size with --payload-kb");
        }
        AppError::Store(_) => {
            eprintln!();
            eprintln!("Preference store help:");
            eprintln!("  - Check permissions on the store file");
            eprintln!("  - Point to another file with --store or SRT_STORE_PATH");
        }
        _ => {}
    }
}
