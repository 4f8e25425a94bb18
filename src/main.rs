//! Main entry point for the batchzip CLI application.
//!
//! This binary extracts zip archives in two modes: a batch mode driven by a
//! CSV manifest over a directory of archives, and a single-file mode for
//! ad-hoc extraction. An interrupt (ctrl-c, and SIGTERM on unix) cancels
//! in-flight work cooperatively.

use anyhow::{Result, bail};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use batchzip::{Cli, unzip_dir, unzip_file};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    spawn_signal_listener(cancel.clone());

    // On any failure, print the full aggregated report and exit non-zero.
    if let Err(err) = run(&cli, cancel).await {
        println!();
        println!("errors:");
        println!("{err:#}");
        println!();
        println!("exit status 1");
        std::process::exit(1);
    }
}

/// Dispatch to batch or single-file mode based on the flags given.
async fn run(cli: &Cli, cancel: CancellationToken) -> Result<()> {
    if let Some(dir_path) = &cli.dir {
        let Some(csv_path) = &cli.csv else {
            bail!("--dir needs --csv: provide the manifest listing the archives to extract");
        };
        return unzip_dir(dir_path, csv_path, cli.max_jobs(), cancel).await;
    }

    if let Some(file_path) = &cli.file {
        let password = cli.password.as_deref().unwrap_or_default();
        return unzip_file(file_path, password, cancel).await;
    }

    bail!(
        "provide --dir with --csv to extract a directory of archives, \
         or --file (optionally with --password) to extract a single one"
    );
}

/// Cancel the token once the process is asked to stop.
///
/// Extraction observes the token between entries and before each read, so
/// cancellation shortens in-flight work instead of tearing the process
/// down mid-write.
fn spawn_signal_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let Ok(mut terminate) = signal(SignalKind::terminate()) else {
        let _ = tokio::signal::ctrl_c().await;
        return;
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
