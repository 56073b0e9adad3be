use crate::core::io::naming::FileNaming;
use crate::core::models::direction::Direction;
use crate::core::models::lambda::{LambdaError, LambdaRange};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Parameter '{0}' must be at least 1")]
    ZeroCount(&'static str),

    #[error(
        "The number of processes ({processes}) exceeds the number of windows ({windows}); every process needs at least one window"
    )]
    TooManyProcesses { processes: usize, windows: usize },

    #[error(
        "The number of GPU devices ({devices}) does not match the number of parallel processes ({processes})"
    )]
    GpuDeviceMismatch { devices: usize, processes: usize },

    #[error("Equilibration steps ({equilibration}) exceed steps per window ({steps})")]
    EquilibrationTooLong { equilibration: u64, steps: u64 },

    #[error("File prefix for {0} output must not be empty")]
    EmptyPrefix(Direction),

    #[error("Forward and backward prefixes are both '{0}'; their files would collide")]
    PrefixCollision(String),

    #[error("Invalid lambda range: {0}")]
    Lambda(#[from] LambdaError),
}

/// How each NAMD process is accelerated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Acceleration {
    #[default]
    Cpu,
    /// One GPU per process on a single node, listed in process-index order.
    SingleNodeGpu { devices: Vec<u32> },
}

impl Acceleration {
    pub fn is_gpu(&self) -> bool {
        matches!(self, Acceleration::SingleNodeGpu { .. })
    }

    pub fn device_for(&self, process_index: usize) -> Option<u32> {
        match self {
            Acceleration::Cpu => None,
            Acceleration::SingleNodeGpu { devices } => devices.get(process_index).copied(),
        }
    }
}

/// Immutable global settings of one preparation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub namd_binary: PathBuf,
    pub num_processes: usize,
    pub threads_per_process: usize,
    pub acceleration: Acceleration,
    pub lambda_range: LambdaRange,
    pub num_windows: usize,
    pub steps_per_window: u64,
    pub equilibration_steps: u64,
    pub forward_prefix: String,
    pub backward_prefix: String,
}

impl RunConfig {
    /// Signed width of a single stratified window.
    pub fn window_size(&self) -> f64 {
        self.lambda_range.span() / self.num_windows as f64
    }

    pub fn prefix(&self, direction: Direction) -> &str {
        match direction {
            Direction::Forward => &self.forward_prefix,
            Direction::Backward => &self.backward_prefix,
        }
    }

    pub fn naming(&self, direction: Direction) -> FileNaming {
        FileNaming::new(self.prefix(direction), self.num_processes)
    }
}

#[derive(Default)]
pub struct RunConfigBuilder {
    namd_binary: Option<PathBuf>,
    num_processes: Option<usize>,
    threads_per_process: Option<usize>,
    single_node_gpu: bool,
    gpu_devices: Vec<u32>,
    lambda_start: Option<f64>,
    lambda_end: Option<f64>,
    num_windows: Option<usize>,
    steps_per_window: Option<u64>,
    equilibration_steps: Option<u64>,
    forward_prefix: Option<String>,
    backward_prefix: Option<String>,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namd_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.namd_binary = Some(path.into());
        self
    }
    pub fn num_processes(mut self, n: usize) -> Self {
        self.num_processes = Some(n);
        self
    }
    pub fn threads_per_process(mut self, n: usize) -> Self {
        self.threads_per_process = Some(n);
        self
    }
    pub fn single_node_gpu(mut self, enabled: bool) -> Self {
        self.single_node_gpu = enabled;
        self
    }
    pub fn gpu_devices(mut self, devices: Vec<u32>) -> Self {
        self.gpu_devices = devices;
        self
    }
    pub fn lambda_start(mut self, value: f64) -> Self {
        self.lambda_start = Some(value);
        self
    }
    pub fn lambda_end(mut self, value: f64) -> Self {
        self.lambda_end = Some(value);
        self
    }
    pub fn num_windows(mut self, n: usize) -> Self {
        self.num_windows = Some(n);
        self
    }
    pub fn steps_per_window(mut self, steps: u64) -> Self {
        self.steps_per_window = Some(steps);
        self
    }
    pub fn equilibration_steps(mut self, steps: u64) -> Self {
        self.equilibration_steps = Some(steps);
        self
    }
    pub fn forward_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.forward_prefix = Some(prefix.into());
        self
    }
    pub fn backward_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.backward_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> Result<RunConfig, ConfigError> {
        let num_processes = self
            .num_processes
            .ok_or(ConfigError::MissingParameter("num_processes"))?;
        let num_windows = self
            .num_windows
            .ok_or(ConfigError::MissingParameter("num_windows"))?;
        let threads_per_process = self.threads_per_process.unwrap_or(1);

        if num_processes == 0 {
            return Err(ConfigError::ZeroCount("num_processes"));
        }
        if num_windows == 0 {
            return Err(ConfigError::ZeroCount("num_windows"));
        }
        if threads_per_process == 0 {
            return Err(ConfigError::ZeroCount("threads_per_process"));
        }
        if num_processes > num_windows {
            return Err(ConfigError::TooManyProcesses {
                processes: num_processes,
                windows: num_windows,
            });
        }

        let acceleration = if self.single_node_gpu {
            let devices = if self.gpu_devices.is_empty() {
                (0..num_processes as u32).collect()
            } else if self.gpu_devices.len() != num_processes {
                return Err(ConfigError::GpuDeviceMismatch {
                    devices: self.gpu_devices.len(),
                    processes: num_processes,
                });
            } else {
                self.gpu_devices
            };
            Acceleration::SingleNodeGpu { devices }
        } else {
            Acceleration::Cpu
        };

        let lambda_range = LambdaRange::new(
            self.lambda_start
                .ok_or(ConfigError::MissingParameter("lambda_start"))?,
            self.lambda_end
                .ok_or(ConfigError::MissingParameter("lambda_end"))?,
        )?;

        let steps_per_window = self
            .steps_per_window
            .ok_or(ConfigError::MissingParameter("steps_per_window"))?;
        let equilibration_steps = self
            .equilibration_steps
            .ok_or(ConfigError::MissingParameter("equilibration_steps"))?;
        if equilibration_steps > steps_per_window {
            return Err(ConfigError::EquilibrationTooLong {
                equilibration: equilibration_steps,
                steps: steps_per_window,
            });
        }

        let forward_prefix = self
            .forward_prefix
            .ok_or(ConfigError::MissingParameter("forward_prefix"))?;
        let backward_prefix = self
            .backward_prefix
            .ok_or(ConfigError::MissingParameter("backward_prefix"))?;
        if forward_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix(Direction::Forward));
        }
        if backward_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix(Direction::Backward));
        }
        if forward_prefix == backward_prefix {
            return Err(ConfigError::PrefixCollision(forward_prefix));
        }

        Ok(RunConfig {
            namd_binary: self
                .namd_binary
                .ok_or(ConfigError::MissingParameter("namd_binary"))?,
            num_processes,
            threads_per_process,
            acceleration,
            lambda_range,
            num_windows,
            steps_per_window,
            equilibration_steps,
            forward_prefix,
            backward_prefix,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn base_builder() -> RunConfigBuilder {
        RunConfigBuilder::new()
            .namd_binary("namd2")
            .num_processes(16)
            .threads_per_process(1)
            .lambda_start(0.0)
            .lambda_end(1.0)
            .num_windows(50)
            .steps_per_window(50000)
            .equilibration_steps(10000)
            .forward_prefix("forward")
            .backward_prefix("backward")
    }

    #[test]
    fn build_succeeds_with_all_parameters() {
        let config = base_builder().build().unwrap();
        assert_eq!(config.num_processes, 16);
        assert_eq!(config.acceleration, Acceleration::Cpu);
        assert!((config.window_size() - 0.02).abs() < 1e-12);
        assert_eq!(config.naming(Direction::Backward).stem(3), "backward.03");
    }

    #[test]
    fn build_fails_on_missing_parameter() {
        let result = RunConfigBuilder::new().num_processes(1).num_windows(1).build();
        assert!(matches!(result, Err(ConfigError::MissingParameter(_))));
    }

    #[test]
    fn threads_default_to_one() {
        let config = RunConfigBuilder::new()
            .namd_binary("namd3")
            .num_processes(2)
            .num_windows(4)
            .lambda_start(0.0)
            .lambda_end(1.0)
            .steps_per_window(100)
            .equilibration_steps(10)
            .forward_prefix("f")
            .backward_prefix("b")
            .build()
            .unwrap();
        assert_eq!(config.threads_per_process, 1);
    }

    #[test]
    fn empty_gpu_device_list_defaults_to_one_device_per_process() {
        let config = base_builder()
            .num_processes(4)
            .single_node_gpu(true)
            .build()
            .unwrap();
        assert_eq!(
            config.acceleration,
            Acceleration::SingleNodeGpu {
                devices: vec![0, 1, 2, 3]
            }
        );
        assert_eq!(config.acceleration.device_for(2), Some(2));
    }

    #[test]
    fn mismatched_gpu_device_list_is_rejected() {
        let result = base_builder()
            .num_processes(4)
            .single_node_gpu(true)
            .gpu_devices(vec![0, 1])
            .build();
        assert_eq!(
            result,
            Err(ConfigError::GpuDeviceMismatch {
                devices: 2,
                processes: 4
            })
        );
    }

    #[test]
    fn device_list_is_ignored_without_gpu_mode() {
        let config = base_builder().gpu_devices(vec![0, 1]).build().unwrap();
        assert_eq!(config.acceleration, Acceleration::Cpu);
        assert_eq!(config.acceleration.device_for(0), None);
    }

    #[test]
    fn more_processes_than_windows_is_rejected() {
        let result = base_builder().num_processes(51).build();
        assert!(matches!(
            result,
            Err(ConfigError::TooManyProcesses {
                processes: 51,
                windows: 50
            })
        ));
    }

    #[test]
    fn zero_counts_are_rejected() {
        assert_eq!(
            base_builder().num_processes(0).build(),
            Err(ConfigError::ZeroCount("num_processes"))
        );
        assert_eq!(
            base_builder().num_windows(0).build(),
            Err(ConfigError::ZeroCount("num_windows"))
        );
        assert_eq!(
            base_builder().threads_per_process(0).build(),
            Err(ConfigError::ZeroCount("threads_per_process"))
        );
    }

    #[test]
    fn degenerate_lambda_range_is_rejected() {
        let result = base_builder().lambda_start(0.3).lambda_end(0.3).build();
        assert!(matches!(result, Err(ConfigError::Lambda(_))));
    }

    #[test]
    fn equilibration_longer_than_window_is_rejected() {
        let result = base_builder()
            .steps_per_window(100)
            .equilibration_steps(200)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::EquilibrationTooLong { .. })
        ));
    }

    #[test]
    fn colliding_or_empty_prefixes_are_rejected() {
        assert_eq!(
            base_builder().backward_prefix("forward").build(),
            Err(ConfigError::PrefixCollision("forward".to_string()))
        );
        assert_eq!(
            base_builder().forward_prefix(" ").build(),
            Err(ConfigError::EmptyPrefix(Direction::Forward))
        );
    }
}
