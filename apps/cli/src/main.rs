use std::{collections::VecDeque, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    history::HistoryTable, notifications::ToastKind, DetectionApi, DetectionClient, FilePicker,
    NoFilePicker, PickedImage, UiEvent, UploadCoordinator,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "fusacheck", version, about = "Classify tomato leaf images for fusarium wilt")]
struct Args {
    /// Config file; defaults to ./fusacheck.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Treat the session as authenticated (enables history).
    #[arg(long, global = true)]
    logged_in: bool,
    /// Cookie header value identifying the authenticated session.
    #[arg(long, global = true)]
    session_cookie: Option<String>,
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload images and print each classification.
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Submit through the drag-and-drop channel instead of the file picker.
        #[arg(long)]
        drop: bool,
    },
    /// Print the detection history of the logged-in user.
    History,
}

/// Hands out the command-line paths one per picker invocation.
struct QueuedPathPicker {
    paths: VecDeque<PathBuf>,
}

impl FilePicker for QueuedPathPicker {
    fn pick(&mut self, _accept: &[&str]) -> Option<PathBuf> {
        self.paths.pop_front()
    }
}

fn init_logging(debug: bool, config_level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(config_level.unwrap_or("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_api(settings: &Settings) -> Result<Arc<dyn DetectionApi>> {
    let client = match &settings.session_cookie {
        Some(cookie) => DetectionClient::with_session_cookie(&settings.server_url, cookie)
            .context("failed to build authenticated client")?,
        None => DetectionClient::new(&settings.server_url),
    };
    Ok(Arc::new(client))
}

fn print_toasts(coordinator: &mut UploadCoordinator) {
    let now = std::time::Instant::now();
    for toast in coordinator.view_mut().toasts.visible(now) {
        let prefix = match toast.kind {
            ToastKind::Success => "ok",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        };
        eprintln!("[{prefix}] {}", toast.message);
    }
}

async fn classify(settings: &Settings, files: Vec<PathBuf>, drop: bool) -> Result<()> {
    let picker: Box<dyn FilePicker> = if drop {
        Box::new(NoFilePicker)
    } else {
        Box::new(QueuedPathPicker {
            paths: files.iter().cloned().collect(),
        })
    };
    let mut coordinator =
        UploadCoordinator::new(build_api(settings)?, picker, settings.session_context());
    coordinator.start();
    print_toasts(&mut coordinator);

    let mut failures = 0usize;
    for path in &files {
        if drop {
            let image = match PickedImage::load(path).await {
                Ok(image) => image,
                Err(err) => {
                    eprintln!("{}: {}", path.display(), err.user_message());
                    failures += 1;
                    continue;
                }
            };
            coordinator.drop_files(vec![image]).await;
        } else {
            coordinator.select_file().await;
        }

        let alerts = coordinator.view_mut().take_alerts();
        if alerts.is_empty() && coordinator.view().modal_visible() {
            println!("== {}", path.display());
            print!("{}", render::modal(coordinator.view()));
            coordinator.dispatch(UiEvent::CloseButtonClicked).await;
        } else {
            for alert in alerts {
                eprintln!("{}: {alert}", path.display());
            }
            failures += 1;
        }
        coordinator.pump().await;
    }

    coordinator.settle().await;
    if coordinator.state().is_logged_in() {
        println!();
        print!("{}", render::history(coordinator.view()));
    }

    info!(
        uploads = files.len(),
        failures, "classification run finished"
    );
    if failures > 0 {
        bail!("{failures} of {} uploads failed", files.len());
    }
    Ok(())
}

async fn history(settings: &Settings) -> Result<()> {
    if !settings.logged_in {
        bail!("history requires a logged-in session; pass --logged-in and --session-cookie");
    }
    if settings.session_cookie.is_none() {
        warn!("no session cookie configured; the server will likely refuse the history request");
    }

    let mut coordinator = UploadCoordinator::new(
        build_api(settings)?,
        Box::new(NoFilePicker),
        settings.session_context(),
    );
    coordinator.start();
    coordinator.settle().await;

    print!("{}", render::history(coordinator.view()));
    if coordinator.view().history == HistoryTable::Failed {
        bail!("failed to load detection history from {}", settings.server_url);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if args.logged_in {
        settings.logged_in = true;
    }
    if let Some(cookie) = args.session_cookie {
        settings.session_cookie = Some(cookie);
    }
    init_logging(args.debug, settings.log_level.as_deref());

    match args.command {
        Command::Classify { files, drop } => classify(&settings, files, drop).await,
        Command::History => history(&settings).await,
    }
}
