//! Command execution for the CLI

use std::io::Write;

use anyhow::{anyhow, Result};
use tracing::info;

use crate::adapters::toml_config::AppConfig;
use crate::app::AppContainer;
use crate::cli::args::{CommandArgs, ConvertArgs, PreviewArgs};
use crate::engine::ProgressSnapshot;
use crate::utils::Utils;

/// Run a conversion and write the result next to the input
pub async fn execute_convert(
    container: &dyn AppContainer,
    config: &AppConfig,
    args: ConvertArgs,
) -> Result<()> {
    let mut request = args.settings.to_request()?;
    request.output_dir = args.output_dir.or_else(|| config.output.dir.clone());
    request.overwrite = args.overwrite || config.output.overwrite;

    info!("Executing convert command for {}", request.input_path.display());

    let response = container
        .convert_interactor()
        .execute(&request, print_progress)
        .await;
    finish_progress_line();

    let response = response.map_err(|e| anyhow!("Conversion failed: {}", e))?;
    let report = &response.report;

    eprintln!(
        "{} -> {} ({:.0}% of original) in {}",
        Utils::format_file_size(report.source_size),
        Utils::format_file_size(report.output_size),
        report.size_ratio() * 100.0,
        Utils::format_duration(std::time::Duration::from_secs_f64(report.elapsed_secs.max(0.0)))
    );

    if args.report {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", response.output_path.display());
    }
    Ok(())
}

/// Print the engine arguments for the given settings
pub async fn execute_command(container: &dyn AppContainer, args: CommandArgs) -> Result<()> {
    let request = args.settings.to_request()?;
    let command = container
        .convert_interactor()
        .plan(&request)
        .await
        .map_err(|e| anyhow!("{}", e))?;

    if args.json {
        println!("{}", serde_json::to_string(&command)?);
    } else {
        println!("{}", command.join(" "));
    }
    Ok(())
}

/// Encode a short preview clip
pub async fn execute_preview(container: &dyn AppContainer, args: PreviewArgs) -> Result<()> {
    let request = args.to_request()?;
    let path = container
        .preview_interactor()
        .execute(&request)
        .await
        .map_err(|e| anyhow!("Preview failed: {}", e))?;
    println!("{}", path.display());
    Ok(())
}

fn print_progress(snapshot: ProgressSnapshot) {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "\r{:>3}% ({})    ", snapshot.percent, snapshot.eta_label());
    let _ = stderr.flush();
}

fn finish_progress_line() {
    eprintln!();
}
