use std::{
    path::PathBuf,
    process::ExitCode,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{Alerts, FormController, HttpRentApi, ReconcilePolicy, ValuationForm};
use shared::domain::{RoomId, RoomLabels};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(about = "Submit room valuations and follow the rent allocation")]
struct Cli {
    /// Config file (defaults to ./rentsplit.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    total_rent: Option<f64>,
    /// `auto_balance` or `remaining_display`.
    #[arg(long)]
    policy: Option<ReconcilePolicy>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show how many roommates have submitted, and the result once all have.
    Status,
    /// Enter valuations and send them.
    Submit {
        #[arg(long)]
        name: String,
        /// Room edit as ROOM=AMOUNT (ROOM is 1, 2 or 3), applied in order.
        #[arg(long = "set", value_name = "ROOM=AMOUNT", value_parser = parse_edit)]
        edits: Vec<(RoomId, String)>,
    },
    /// Apply room edits locally and print the reconciled fields.
    Balance {
        #[arg(long = "set", value_name = "ROOM=AMOUNT", value_parser = parse_edit)]
        edits: Vec<(RoomId, String)>,
    },
    /// Fetch and print the room assignments.
    Results,
    /// Clear all submissions on the server.
    Reset,
    /// Poll until every roommate has submitted, then print the result.
    Watch {
        /// Seconds between polls.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
        #[arg(long)]
        max_polls: Option<usize>,
    },
}

fn parse_edit(raw: &str) -> Result<(RoomId, String), String> {
    let (room, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ROOM=AMOUNT, got '{raw}'"))?;
    let room = RoomId::parse(room).ok_or_else(|| format!("unknown room '{room}'"))?;
    Ok((room, amount.trim().to_string()))
}

/// Prints alerts to stderr and remembers whether any were raised.
#[derive(Default)]
struct TerminalAlerts {
    raised: AtomicUsize,
}

impl TerminalAlerts {
    fn raised(&self) -> usize {
        self.raised.load(Ordering::Relaxed)
    }
}

impl Alerts for TerminalAlerts {
    fn alert(&self, message: &str) {
        self.raised.fetch_add(1, Ordering::Relaxed);
        eprintln!("error: {message}");
    }
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(v) = &self.server_url {
            settings.server_url = v.clone();
        }
        if let Some(v) = self.total_rent {
            settings.total_rent = v;
        }
        if let Some(v) = self.policy {
            settings.policy = v;
        }
    }
}

fn print_form(form: &ValuationForm, labels: &RoomLabels) {
    for room in RoomId::ALL {
        println!("{room} {:<22} {}", labels.label(room), form.field(room));
    }
    if form.policy() == ReconcilePolicy::AutoBalance {
        println!("total {:.2}", form.total_rent());
    } else {
        println!("{}", form.remaining());
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);
    settings.validate()?;
    debug!(
        server_url = %settings.server_url,
        total_rent = settings.total_rent,
        policy = ?settings.policy,
        "settings loaded"
    );

    if let Command::Balance { edits } = &cli.command {
        let mut form = ValuationForm::new(settings.total_rent, settings.policy);
        for (room, amount) in edits {
            form.edit(*room, amount);
        }
        print_form(&form, &settings.room_labels);
        return Ok(ExitCode::SUCCESS);
    }

    let api = HttpRentApi::new(&settings.server_url, settings.request_timeout)
        .context("failed to set up http client")?;
    let alerts = Arc::new(TerminalAlerts::default());
    let mut controller =
        FormController::new(Arc::new(api), alerts.clone(), settings.form_options());

    match cli.command {
        Command::Status => {
            controller.load().await;
            print!("{}", controller.progress());
            print!("{}", controller.results());
        }
        Command::Submit { name, edits } => {
            controller.set_name(name);
            for (room, amount) in &edits {
                controller.edit_room(*room, amount);
            }
            print_form(controller.form(), controller.room_labels());
            if controller.submit().await {
                println!("valuations submitted");
                print!("{}", controller.progress());
                print!("{}", controller.results());
            }
        }
        Command::Balance { .. } => {}
        Command::Results => {
            if controller.show_results().await {
                print!("{}", controller.results());
            }
        }
        Command::Reset => {
            if controller.reset().await {
                println!("submissions cleared");
                print!("{}", controller.progress());
            }
        }
        Command::Watch {
            interval,
            max_polls,
        } => {
            let interval = interval.map_or(settings.poll_interval, Duration::from_secs);
            let done = controller.watch(interval, max_polls).await;
            print!("{}", controller.progress());
            if done {
                print!("{}", controller.results());
            }
        }
    }

    Ok(if alerts.raised() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
