use crate::cli::PrepareArgs;
use crate::config::{PartialRunConfig, PrepareConfig};
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use fepforge::{
    core::models::direction::Direction,
    core::models::lambda::WindowSchedule,
    engine::{plan::plan_segment, progress::ProgressReporter},
    workflows::prepare::{self, PreparedRun, Templates},
};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Serialize)]
struct DryRunSummary {
    num_windows: usize,
    window_size: f64,
    process: Vec<ProcessSummary>,
}

#[derive(Serialize)]
struct ProcessSummary {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    gpu_device: Option<u32>,
    lambda_from: f64,
    lambda_to: f64,
    forward: WindowSchedule,
    backward: WindowSchedule,
}

fn summarize(config: &PrepareConfig, prepared: &PreparedRun) -> Result<DryRunSummary> {
    let run_config = &config.run_config;
    let process = prepared
        .assignments
        .iter()
        .map(|assignment| -> Result<ProcessSummary> {
            let forward = plan_segment(assignment, Direction::Forward, run_config)
                .map_err(|e| CliError::Core(e.into()))?;
            let backward = plan_segment(assignment, Direction::Backward, run_config)
                .map_err(|e| CliError::Core(e.into()))?;
            Ok(ProcessSummary {
                index: assignment.process_index,
                gpu_device: assignment.gpu_device,
                lambda_from: assignment.lambda_sub_range.from(),
                lambda_to: assignment.lambda_sub_range.to(),
                forward: forward.schedule(),
                backward: backward.schedule(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DryRunSummary {
        num_windows: run_config.num_windows,
        window_size: run_config.window_size().abs(),
        process,
    })
}

pub async fn run(args: PrepareArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let partial_config = PartialRunConfig::from_optional_file(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let final_config = partial_config.merge_with_prepare_args(&args)?;

    info!(
        "Loading templates {:?} and {:?}",
        &final_config.forward_template, &final_config.backward_template
    );
    let templates = Templates::load(&final_config.forward_template, &final_config.backward_template)?;

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let prepared = tokio::task::block_in_place(|| {
        prepare::plan(&final_config.run_config, &templates, &reporter)
    })?;

    if final_config.dry_run {
        let summary = summarize(&final_config, &prepared)?;
        let rendered = toml::to_string(&summary).map_err(|e| CliError::Other(e.into()))?;
        println!("{}", rendered);
        return Ok(());
    }

    let written = tokio::task::block_in_place(|| {
        prepare::write(&prepared, &final_config.output_dir, &reporter)
    })?;

    println!(
        "Prepared {} processes ({} windows) in {}:",
        prepared.assignments.len(),
        final_config.run_config.num_windows,
        final_config.output_dir.display()
    );
    for path in &written {
        println!("  {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn prepare_args(extra: &[&str]) -> PrepareArgs {
        let mut args = vec!["fepforge", "prepare"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Prepare(args) => args,
            _ => panic!("Expected 'prepare' subcommand"),
        }
    }

    fn write_templates(dir: &std::path::Path) -> (String, String) {
        let forward = dir.join("fwd.template");
        let backward = dir.join("bwd.template");
        fs::write(&forward, "structure ionized.psf\noutputname old\n").unwrap();
        fs::write(&backward, "structure ionized.psf\nbincoordinates old.coor\n").unwrap();
        (
            forward.to_string_lossy().into_owned(),
            backward.to_string_lossy().into_owned(),
        )
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn prepare_writes_configurations_and_script() {
        let dir = tempdir().unwrap();
        let (forward, backward) = write_templates(dir.path());
        let out = dir.path().join("out");
        let args = prepare_args(&[
            "--forward-template",
            &forward,
            "--backward-template",
            &backward,
            "-o",
            out.to_str().unwrap(),
            "-n",
            "2",
            "-w",
            "4",
            "--no-gpu",
        ]);
        let (sender, _receiver) = mpsc::channel(64);

        run(args, sender).await.unwrap();

        for name in [
            "forward.0.namd",
            "forward.1.namd",
            "backward.0.namd",
            "backward.1.namd",
            "run.sh",
        ] {
            assert!(out.join(name).is_file(), "missing {}", name);
        }
        let config = fs::read_to_string(out.join("forward.1.namd")).unwrap();
        assert!(config.contains("structure ionized.psf"));
        assert!(!config.contains("outputname old"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let (forward, backward) = write_templates(dir.path());
        let out = dir.path().join("dry");
        let args = prepare_args(&[
            "--forward-template",
            &forward,
            "--backward-template",
            &backward,
            "-o",
            out.to_str().unwrap(),
            "-n",
            "2",
            "-w",
            "4",
            "--devices",
            "0,1",
            "--dry-run",
        ]);
        let (sender, _receiver) = mpsc::channel(64);

        run(args, sender).await.unwrap();

        assert!(!out.exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_template_is_reported() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.template");
        let args = prepare_args(&[
            "--forward-template",
            missing.to_str().unwrap(),
            "--backward-template",
            missing.to_str().unwrap(),
            "-o",
            dir.path().to_str().unwrap(),
        ]);
        let (sender, _receiver) = mpsc::channel(64);

        let result = run(args, sender).await;
        assert!(matches!(result, Err(CliError::Core(_))));
    }

    #[test]
    fn summary_serializes_schedules_as_toml() {
        let dir = tempdir().unwrap();
        let (forward, backward) = write_templates(dir.path());
        let args = prepare_args(&[
            "--forward-template",
            &forward,
            "--backward-template",
            &backward,
            "-n",
            "2",
            "-w",
            "4",
            "--devices",
            "5,6",
        ]);
        let config = PartialRunConfig::default()
            .merge_with_prepare_args(&args)
            .unwrap();
        let templates =
            Templates::load(&config.forward_template, &config.backward_template).unwrap();
        let prepared =
            prepare::plan(&config.run_config, &templates, &ProgressReporter::new()).unwrap();

        let summary = summarize(&config, &prepared).unwrap();
        assert_eq!(summary.process.len(), 2);
        assert_eq!(summary.process[1].gpu_device, Some(6));
        assert_eq!(summary.process[0].forward.len(), 2);
        assert_eq!(summary.process[0].backward.len(), 2);

        let rendered = toml::to_string(&summary).unwrap();
        assert!(rendered.contains("num_windows = 4"));
        assert!(rendered.contains("[[process]]"));
    }
}
