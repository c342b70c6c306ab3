use anyhow::{Context, Result};
use clap::Parser;
use room_juggler::monitor::DEFAULT_PROGRESS_EVERY;
use room_juggler::{CancelFlag, JuggleConfig, JuggleOptions, Roster, RoomJugglerJob};
use std::fs;
use std::io::{self, Read, Write};
use tokio::signal;
use tracing_subscriber::EnvFilter;

const DEFAULT_SEED: u64 = 20250906;

#[derive(Parser, Debug)]
#[command(name = "room-juggler")]
#[command(about = "Assign guests to rooms so roommate wishes come true", long_about = None)]
struct Args {
    /// Verbose output level (-v debug, -vv trace) unless RUST_LOG is set
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Random seed (fixed default for reproducible runs)
    #[arg(long)]
    seed: Option<u64>,

    /// Roster JSON path ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Report JSON path ("-" for stdout)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Move attempts per temperature
    #[arg(long)]
    n_iter: Option<usize>,

    /// Cooling factor, strictly between 0 and 1
    #[arg(long)]
    beta: Option<f64>,

    /// Initial temperature
    #[arg(long)]
    t0: Option<f64>,

    /// Temperature floor
    #[arg(long)]
    t_min: Option<f64>,

    /// Temperature steps between progress lines (shown with -v)
    #[arg(long, default_value_t = DEFAULT_PROGRESS_EVERY)]
    progress_every: usize,
}

impl Args {
    fn config(&self, from_roster: Option<JuggleOptions>) -> Result<JuggleConfig> {
        let mut options = from_roster.unwrap_or_default();
        if let Some(n_iter) = self.n_iter {
            options.n_iter = n_iter;
        }
        if let Some(beta) = self.beta {
            options.beta = beta;
        }
        if let Some(t0) = self.t0 {
            options.t_0 = t0;
        }
        if let Some(t_min) = self.t_min {
            options.t_min = t_min;
        }
        JuggleConfig::try_from(options).context("invalid annealing configuration")
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut input_json = String::new();
    if args.input == "-" {
        io::stdin().read_to_string(&mut input_json)?;
    } else {
        input_json = fs::read_to_string(&args.input)
            .with_context(|| format!("failed to read roster file: {}", &args.input))?;
    }

    let roster = Roster::from_json(&input_json).context("failed to parse roster")?;
    let config = args.config(roster.config)?;
    let lists = roster.into_lists()?;
    let mut job = RoomJugglerJob::new(&lists)?.with_progress_every(args.progress_every);
    let seed = args.seed.unwrap_or(DEFAULT_SEED);

    tracing::info!(
        seed,
        n_iter = config.n_iter(),
        beta = config.beta(),
        t_0 = config.t_0(),
        t_min = config.t_min(),
        total_iter = config.n_total_iter(),
        "starting"
    );

    let cancel = CancelFlag::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Ok(()) = signal::ctrl_c().await {
            tracing::warn!("received Ctrl+C, stopping after the current temperature step");
            cancel_for_signal.cancel();
        }
    });

    let job = tokio::task::spawn_blocking(move || {
        job.run(&config, seed, &cancel).map(|()| job)
    })
    .await
    .context("solver task failed")??;

    let report = job.report();
    for partition in &report.partitions {
        tracing::info!("{}", partition.summary());
    }

    let serialized = serde_json::to_string_pretty(&report)?;
    if args.output == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(serialized.as_bytes())?;
        stdout.write_all(b"\n")?;
    } else {
        fs::write(&args.output, serialized)
            .with_context(|| format!("failed to write report file: {}", &args.output))?;
    }

    Ok(())
}
