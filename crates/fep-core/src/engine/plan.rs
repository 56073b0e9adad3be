use super::config::RunConfig;
use super::schedule::{generate_backward, generate_forward};
use crate::core::models::assignment::ProcessAssignment;
use crate::core::models::direction::Direction;
use crate::core::models::lambda::{LambdaError, Window, WindowSchedule};
use crate::core::utils::numeric::format_lambda;
use tracing::info;

/// One simulation leg together with its run-control settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub window: Window,
    pub equilibration_steps: u64,
    pub run_steps: u64,
    pub first_timestep: u64,
}

/// Restart files a backward segment resumes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartInputs {
    pub coordinates: String,
    pub velocities: String,
    pub extended_system: String,
}

/// Everything needed to write one process's configuration in one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    pub direction: Direction,
    pub process_index: usize,
    pub output_stem: String,
    pub result_file: String,
    pub restart_inputs: Option<RestartInputs>,
    pub legs: Vec<Leg>,
}

impl SegmentPlan {
    pub fn schedule(&self) -> WindowSchedule {
        WindowSchedule::new(self.legs.iter().map(|leg| leg.window).collect())
    }
}

/// Plans the segment of `assignment` in `direction`.
///
/// A backward segment always restarts from the forward restart files of the
/// same process index.
pub fn plan_segment(
    assignment: &ProcessAssignment,
    direction: Direction,
    config: &RunConfig,
) -> Result<SegmentPlan, LambdaError> {
    let sub_range = &assignment.lambda_sub_range;
    let window_size = config.window_size();
    let index = assignment.process_index;
    let naming = config.naming(direction);

    let (schedule, start, end) = match direction {
        Direction::Forward => (
            generate_forward(sub_range, window_size)?,
            sub_range.from(),
            sub_range.to(),
        ),
        Direction::Backward => (
            generate_backward(sub_range, window_size)?,
            sub_range.to(),
            sub_range.from(),
        ),
    };
    info!(
        "Generate config ({}): lambda start = {}, end = {}, stride = {} ; index = {}",
        direction,
        format_lambda(start),
        format_lambda(end),
        format_lambda(window_size.abs()),
        naming.label(index)
    );

    let restart_inputs = match direction {
        Direction::Forward => None,
        Direction::Backward => {
            let forward = config.naming(Direction::Forward);
            Some(RestartInputs {
                coordinates: forward.coordinates_file(index),
                velocities: forward.velocities_file(index),
                extended_system: forward.extended_system_file(index),
            })
        }
    };

    let legs = schedule
        .iter()
        .map(|&window| Leg {
            window,
            equilibration_steps: config.equilibration_steps,
            run_steps: config.steps_per_window,
            first_timestep: 0,
        })
        .collect();

    Ok(SegmentPlan {
        direction,
        process_index: index,
        output_stem: naming.stem(index),
        result_file: naming.result_file(index),
        restart_inputs,
        legs,
    })
}
