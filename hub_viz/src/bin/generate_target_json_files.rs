use clap::Parser;
use hub_viz::dates::format_date;
use hub_viz::{generate_target_json_files, logging, HubConfig, VizError, WritePolicy};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Generate predtimechart target data json files for a hub.
///
/// Exits quietly when the hub has no target data. A configured
/// `target_data_file_name` that does not exist is an error.
#[derive(Parser)]
#[command(name = "hub-viz-targets")]
#[command(version)]
struct Cli {
    /// Hub directory to read target data from
    hub_dir: PathBuf,
    /// predtimechart-config.yml describing how to visualize the hub
    ptc_config_file: PathBuf,
    /// Directory to write target json files to
    target_out_dir: PathBuf,
    /// Rewrite every file, including frozen older reference dates
    #[arg(long)]
    regenerate: bool,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    info!("hub_dir={}, regenerate={}", cli.hub_dir.display(), cli.regenerate);

    let hub = match HubConfig::load(&cli.hub_dir, &cli.ptc_config_file) {
        Ok(hub) => hub,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let today = chrono::Local::now().date_naive();
    let policy = WritePolicy::from_regenerate_flag(cli.regenerate);
    match generate_target_json_files(&hub, &cli.target_out_dir, policy, today) {
        Ok(written) => {
            info!("done: {} target file(s) generated as of {}", written.len(), format_date(today));
            ExitCode::SUCCESS
        }
        Err(VizError::TargetDataNotFound(path)) => {
            error!("target data file not found: {}", path.display());
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
