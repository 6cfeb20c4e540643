use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use rasp_simulation::*;

#[derive(Parser)]
#[command(name = "rasp")]
#[command(version)]
#[command(about = "Model rocket altitude simulator driven by batch files", long_about = None)]
struct Cli {
    /// Batch files to run, in order
    #[arg(required_unless_present = "list_motors")]
    batch: Vec<PathBuf>,

    /// Suppress the telemetry table and informational logging
    #[arg(short, long)]
    quiet: bool,

    /// Motor file to use instead of the one named by each batch file
    #[arg(short, long)]
    motors: Option<PathBuf>,

    /// Print the motor catalog and exit
    #[arg(long)]
    list_motors: bool,

    /// Write retained telemetry samples of the last launch as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the full results of the last launch as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), InputError> {
    if cli.list_motors {
        let path = cli
            .motors
            .clone()
            .unwrap_or_else(|| BatchConfig::default().motor_path(None));
        let catalog = MotorCatalog::load(&path)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        catalog.write_listing(&mut out, false)?;
        return Ok(());
    }

    for batch in &cli.batch {
        run_batch(cli, batch)?;
    }

    Ok(())
}

fn run_batch(cli: &Cli, batch: &Path) -> Result<(), InputError> {
    info!("running batch file {}", batch.display());
    let text = fs::read_to_string(batch)?;
    let batch_dir = batch.parent();

    run_script(&text, |action, config| match action {
        Action::Dump => {
            let stderr = io::stderr();
            let mut out = stderr.lock();
            config.dump(&mut out)?;
            Ok(())
        }
        Action::Launch => launch(cli, config, batch_dir),
    })?;

    Ok(())
}

fn launch(cli: &Cli, config: &BatchConfig, batch_dir: Option<&Path>) -> Result<(), InputError> {
    let motor_path = match &cli.motors {
        Some(path) => path.clone(),
        None => config.motor_path(batch_dir),
    };
    let catalog = MotorCatalog::load(&motor_path)?;

    let mut flight = config.to_flight(&catalog)?;
    if cli.quiet {
        flight.options.verbose = false;
    }

    let results = simulate(&flight)?;
    let motor_file = motor_path.display().to_string();

    match config.output_path() {
        Some(path) => {
            let mut out = BufWriter::new(File::create(&path)?);
            write_report(&mut out, &flight, &results, &motor_file)?;
            out.flush()?;
            info!("report written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_report(&mut out, &flight, &results, &motor_file)?;
        }
    }

    if let Some(path) = &cli.csv {
        let mut out = BufWriter::new(File::create(path)?);
        write_csv(&mut out, &results)?;
        out.flush()?;
    }
    if let Some(path) = &cli.json {
        let out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(out, &results)?;
    }

    Ok(())
}
