use crate::cli::MergeArgs;
use crate::config::PartialRunConfig;
use crate::error::Result;
use crate::ui::{CliProgressHandler, UiEvent};
use fepforge::{engine::progress::ProgressReporter, workflows::merge};
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(args: MergeArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let partial_config = PartialRunConfig::from_optional_file(args.config.as_deref())?;
    let final_config = partial_config.merge_with_merge_args(&args)?;

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    for &direction in &final_config.directions {
        let prefix = final_config.prefix(direction);
        info!(
            "Merging {} {} result files with prefix '{}' from {:?}",
            final_config.num_processes, direction, prefix, &final_config.input_dir
        );
        let path = tokio::task::block_in_place(|| {
            merge::run(
                direction,
                final_config.num_processes,
                prefix,
                &final_config.input_dir,
                &final_config.output_dir,
                &reporter,
            )
        })?;
        println!("Merged {} results written to: {}", direction, path.display());
    }

    Ok(())
}
