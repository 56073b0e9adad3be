use super::config::{Acceleration, ConfigError, RunConfig};
use crate::core::models::assignment::ProcessAssignment;
use crate::core::models::lambda::LambdaRange;
use tracing::debug;

/// Splits `global_range` into one contiguous sub-range per process.
///
/// Every process except the last gets `floor(num_windows / num_processes)`
/// windows; the last one takes whatever is left of the global span. Sub-ranges
/// are laid out in lambda order by increasing process index.
///
/// Boundaries are computed directly from the process index rather than by
/// accumulation, so adjacent sub-ranges share bit-identical endpoints and the
/// last sub-range ends exactly at `global_range.to()`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if either count is zero, if there are more
/// processes than windows, or if single-node GPU mode does not list exactly
/// one device per process.
pub fn partition(
    global_range: LambdaRange,
    num_windows: usize,
    num_processes: usize,
    acceleration: &Acceleration,
) -> Result<Vec<ProcessAssignment>, ConfigError> {
    if num_processes == 0 {
        return Err(ConfigError::ZeroCount("num_processes"));
    }
    if num_windows == 0 {
        return Err(ConfigError::ZeroCount("num_windows"));
    }
    if num_processes > num_windows {
        return Err(ConfigError::TooManyProcesses {
            processes: num_processes,
            windows: num_windows,
        });
    }
    if let Acceleration::SingleNodeGpu { devices } = acceleration {
        if devices.len() != num_processes {
            return Err(ConfigError::GpuDeviceMismatch {
                devices: devices.len(),
                processes: num_processes,
            });
        }
    }

    let window_size = global_range.span() / num_windows as f64;
    let windows_per_process = num_windows / num_processes;
    let stride = windows_per_process as f64 * window_size;
    let last = num_processes - 1;
    debug!(
        window_size,
        windows_per_process,
        last_process_width = global_range.span() - stride * last as f64,
        "Partitioning lambda range"
    );

    let boundary = |index: usize| -> f64 {
        if index == 0 {
            global_range.from()
        } else if index > last {
            global_range.to()
        } else {
            global_range.from() + stride * index as f64
        }
    };

    (0..num_processes)
        .map(|index| -> Result<ProcessAssignment, ConfigError> {
            let sub_range = LambdaRange::new(boundary(index), boundary(index + 1))?;
            Ok(ProcessAssignment::new(
                index,
                sub_range,
                acceleration.device_for(index),
            ))
        })
        .collect()
}

/// Partitions the global range of a validated [`RunConfig`].
pub fn partition_run(config: &RunConfig) -> Result<Vec<ProcessAssignment>, ConfigError> {
    partition(
        config.lambda_range,
        config.num_windows,
        config.num_processes,
        &config.acceleration,
    )
}
