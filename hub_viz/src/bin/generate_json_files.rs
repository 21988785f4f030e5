use clap::Parser;
use hub_viz::{generate_forecast_json_files, generate_options_file, logging, HubConfig, WritePolicy};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Generate predtimechart forecast json files and the options file for a hub.
#[derive(Parser)]
#[command(name = "hub-viz-forecasts")]
#[command(version)]
struct Cli {
    /// Hub directory to read forecasts from
    hub_dir: PathBuf,
    /// predtimechart-config.yml describing how to visualize the hub
    ptc_config_file: PathBuf,
    /// Directory to write forecast json files to
    forecasts_out_dir: PathBuf,
    /// File to write the options json to
    options_out_file: PathBuf,
    /// Rewrite every file, including frozen older reference dates
    #[arg(long)]
    regenerate: bool,
}

fn run(cli: &Cli) -> hub_viz::Result<()> {
    let hub = HubConfig::load(&cli.hub_dir, &cli.ptc_config_file)?;
    let policy = WritePolicy::from_regenerate_flag(cli.regenerate);

    let written = generate_forecast_json_files(&hub, &cli.forecasts_out_dir, policy)?;
    generate_options_file(&hub, &cli.options_out_file)?;
    info!("done: {} forecast file(s) generated", written.len());
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    info!("hub_dir={}, regenerate={}", cli.hub_dir.display(), cli.regenerate);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
