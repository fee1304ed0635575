use clap::{CommandFactory, Parser};
use std::process;
use taskscript::cli::{self, Args};
use tokio_util::sync::CancellationToken;

fn main() {
    let args = Args::parse();

    let Some(command) = args.command else {
        // No subcommand: print usage and exit cleanly
        let _ = Args::command().print_help();
        println!();
        process::exit(0);
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        // Ctrl+C cancels the token; workers finish their current record
        let signal_token = cancellation_token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                    signal_token.cancel();
                }
                Err(e) => eprintln!("Failed to install CTRL+C signal handler: {}", e),
            }
        });

        cli::run(command, cancellation_token).await
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
