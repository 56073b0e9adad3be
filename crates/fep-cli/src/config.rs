mod defaults;

use crate::cli::{GpuMode, MergeArgs, MergeDirection, PrepareArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use defaults::DefaultsConfig;
use fepforge::core::models::direction::Direction;
use fepforge::engine::config::{RunConfig, RunConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialRunSection {
    #[serde(rename = "namd-binary")]
    namd_binary: Option<PathBuf>,
    #[serde(rename = "num-processes")]
    num_processes: Option<usize>,
    #[serde(rename = "threads-per-process")]
    threads_per_process: Option<usize>,
    #[serde(rename = "single-node-gpu")]
    single_node_gpu: Option<bool>,
    #[serde(rename = "gpu-devices")]
    gpu_devices: Option<Vec<u32>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialFepSection {
    #[serde(rename = "lambda-start")]
    lambda_start: Option<f64>,
    #[serde(rename = "lambda-end")]
    lambda_end: Option<f64>,
    #[serde(rename = "num-windows")]
    num_windows: Option<usize>,
    #[serde(rename = "steps-per-window")]
    steps_per_window: Option<u64>,
    #[serde(rename = "equilibration-steps")]
    equilibration_steps: Option<u64>,
    #[serde(rename = "forward-template")]
    forward_template: Option<PathBuf>,
    #[serde(rename = "backward-template")]
    backward_template: Option<PathBuf>,
    #[serde(rename = "forward-prefix")]
    forward_prefix: Option<String>,
    #[serde(rename = "backward-prefix")]
    backward_prefix: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    run: Option<PartialRunSection>,
    fep: Option<PartialFepSection>,
}

/// Fully resolved settings for the `prepare` command.
#[derive(Debug)]
pub struct PrepareConfig {
    pub run_config: RunConfig,
    pub forward_template: PathBuf,
    pub backward_template: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
}

/// Fully resolved settings for the `merge` command.
#[derive(Debug)]
pub struct MergeConfig {
    pub directions: Vec<Direction>,
    pub num_processes: usize,
    pub forward_prefix: String,
    pub backward_prefix: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl MergeConfig {
    pub fn prefix(&self, direction: Direction) -> &str {
        match direction {
            Direction::Forward => &self.forward_prefix,
            Direction::Backward => &self.backward_prefix,
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `path` if given, otherwise starts from an empty configuration.
    pub fn from_optional_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_prepare_args(mut self, args: &PrepareArgs) -> Result<PrepareConfig> {
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let run = self.run.take().unwrap_or_default();
        let fep = self.fep.take().unwrap_or_default();

        let single_node_gpu = Self::merge_gpu_mode(args.gpu, run.single_node_gpu)
            .unwrap_or(defaults.single_node_gpu);
        let gpu_devices = match &args.devices {
            Some(list) => {
                parser::parse_device_list(list).map_err(|e| CliError::Argument(e.to_string()))?
            }
            None => run.gpu_devices.unwrap_or_default(),
        };

        let run_config = RunConfigBuilder::new()
            .namd_binary(
                args.namd_binary
                    .clone()
                    .or(run.namd_binary)
                    .unwrap_or_else(|| PathBuf::from(&defaults.namd_binary)),
            )
            .num_processes(
                args.num_processes
                    .or(run.num_processes)
                    .unwrap_or(defaults.num_processes),
            )
            .threads_per_process(
                args.threads_per_process
                    .or(run.threads_per_process)
                    .unwrap_or(defaults.threads_per_process),
            )
            .single_node_gpu(single_node_gpu)
            .gpu_devices(gpu_devices)
            .lambda_start(
                args.lambda_start
                    .or(fep.lambda_start)
                    .unwrap_or(defaults.lambda_start),
            )
            .lambda_end(
                args.lambda_end
                    .or(fep.lambda_end)
                    .unwrap_or(defaults.lambda_end),
            )
            .num_windows(
                args.num_windows
                    .or(fep.num_windows)
                    .unwrap_or(defaults.num_windows),
            )
            .steps_per_window(
                args.steps_per_window
                    .or(fep.steps_per_window)
                    .unwrap_or(defaults.steps_per_window),
            )
            .equilibration_steps(
                args.equilibration_steps
                    .or(fep.equilibration_steps)
                    .unwrap_or(defaults.equilibration_steps),
            )
            .forward_prefix(
                args.forward_prefix
                    .clone()
                    .or(fep.forward_prefix)
                    .unwrap_or(defaults.forward_prefix),
            )
            .backward_prefix(
                args.backward_prefix
                    .clone()
                    .or(fep.backward_prefix)
                    .unwrap_or(defaults.backward_prefix),
            )
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(PrepareConfig {
            run_config,
            forward_template: args
                .forward_template
                .clone()
                .or(fep.forward_template)
                .unwrap_or_else(|| PathBuf::from(defaults.forward_template)),
            backward_template: args
                .backward_template
                .clone()
                .or(fep.backward_template)
                .unwrap_or_else(|| PathBuf::from(defaults.backward_template)),
            output_dir: args.output_dir.clone(),
            dry_run: args.dry_run,
        })
    }

    pub fn merge_with_merge_args(mut self, args: &MergeArgs) -> Result<MergeConfig> {
        let defaults = DefaultsConfig::default();
        let run = self.run.take().unwrap_or_default();
        let fep = self.fep.take().unwrap_or_default();

        let num_processes = args
            .num_processes
            .or(run.num_processes)
            .unwrap_or(defaults.num_processes);
        if num_processes == 0 {
            return Err(CliError::Config(
                "The number of processes must be at least 1.".to_string(),
            ));
        }

        let directions = match args.direction {
            MergeDirection::Forward => vec![Direction::Forward],
            MergeDirection::Backward => vec![Direction::Backward],
            MergeDirection::Both => Direction::BOTH.to_vec(),
        };

        Ok(MergeConfig {
            directions,
            num_processes,
            forward_prefix: args
                .forward_prefix
                .clone()
                .or(fep.forward_prefix)
                .unwrap_or(defaults.forward_prefix),
            backward_prefix: args
                .backward_prefix
                .clone()
                .or(fep.backward_prefix)
                .unwrap_or(defaults.backward_prefix),
            input_dir: args.input_dir.clone(),
            output_dir: args
                .output_dir
                .clone()
                .unwrap_or_else(|| args.input_dir.clone()),
        })
    }

    fn merge_gpu_mode(cli_flags: GpuMode, file_val: Option<bool>) -> Option<bool> {
        if cli_flags.gpu {
            Some(true)
        } else if cli_flags.no_gpu {
            Some(false)
        } else {
            file_val
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = parser::parse_key_value(kv_pair)
                .map_err(|e| CliError::Config(e.to_string()))?;

            match key {
                "run.namd-binary" => {
                    self.run.get_or_insert_with(Default::default).namd_binary = Some(PathBuf::from(value_str));
                }
                "run.num-processes" => {
                    self.run.get_or_insert_with(Default::default).num_processes =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "run.threads-per-process" => {
                    self.run.get_or_insert_with(Default::default).threads_per_process =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "run.single-node-gpu" => {
                    self.run.get_or_insert_with(Default::default).single_node_gpu =
                        Some(parse_value(key, value_str, "boolean")?);
                }
                "run.gpu-devices" => {
                    let devices = parser::parse_device_list(value_str)
                        .map_err(|e| CliError::Config(format!("{} ({})", e, key)))?;
                    self.run.get_or_insert_with(Default::default).gpu_devices = Some(devices);
                }
                "fep.lambda-start" => {
                    self.fep.get_or_insert_with(Default::default).lambda_start =
                        Some(parse_value(key, value_str, "float")?);
                }
                "fep.lambda-end" => {
                    self.fep.get_or_insert_with(Default::default).lambda_end =
                        Some(parse_value(key, value_str, "float")?);
                }
                "fep.num-windows" => {
                    self.fep.get_or_insert_with(Default::default).num_windows =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "fep.steps-per-window" => {
                    self.fep.get_or_insert_with(Default::default).steps_per_window =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "fep.equilibration-steps" => {
                    self.fep.get_or_insert_with(Default::default).equilibration_steps =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "fep.forward-template" => {
                    self.fep.get_or_insert_with(Default::default).forward_template =
                        Some(PathBuf::from(value_str));
                }
                "fep.backward-template" => {
                    self.fep.get_or_insert_with(Default::default).backward_template =
                        Some(PathBuf::from(value_str));
                }
                "fep.forward-prefix" => {
                    self.fep.get_or_insert_with(Default::default).forward_prefix = Some(value_str.to_string());
                }
                "fep.backward-prefix" => {
                    self.fep.get_or_insert_with(Default::default).backward_prefix = Some(value_str.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
