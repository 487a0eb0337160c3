//! Prometheus Speedtest Exporter - server binary

use clap::Parser;
use prometheus_speedtest::{
    app::App,
    cli::Cli,
    config::{load_config, EnvManager},
    error::{AppError, Result},
};
use std::process;

#[tokio::main]
async fn main() {
    // A panicking measurement task is reported as a failed scrape, so the
    // hook must not terminate the process
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
    }));

    let cli = Cli::parse();

    if cli.version {
        println!("{}", Cli::version_line());
        if cli.verbose {
            println!("  commit: {}", option_env!("GIT_COMMIT").unwrap_or("unknown"));
            println!("  built:  {}", option_env!("BUILD_TIME").unwrap_or("unknown"));
            println!("  target: {}", option_env!("TARGET_TRIPLE").unwrap_or("unknown"));
        }
        return;
    }

    if cli.print_env_example {
        print!("{}", EnvManager::create_example_env_content());
        return;
    }

    let use_color = cli.use_colors();
    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    let config = load_config(cli)?;
    App::new(config).run().await
}

/// Hints for the failures an operator is most likely to hit
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Check the command-line options, environment variables and .env file.");
            eprintln!("Run with --help for the supported options.");
        }
        AppError::Server(message) if message.contains("bind") => {
            eprintln!();
            eprintln!("Another process may already be listening on this port; try --port.");
        }
        _ => {}
    }
}
