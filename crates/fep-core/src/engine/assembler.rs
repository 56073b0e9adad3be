use super::config::{Acceleration, RunConfig};
use super::plan::SegmentPlan;
use crate::core::io::namd::{Directive, DirectiveDocument};
use crate::core::models::assignment::ProcessAssignment;
use crate::core::models::direction::Direction;
use crate::core::utils::numeric::format_lambda;
use phf::{Set, phf_set};
use std::fmt;
use std::path::PathBuf;

pub const OUTPUT_NAME: &str = "outputname";
pub const RESTART_NAME: &str = "restartname";
pub const BIN_COORDINATES: &str = "bincoordinates";
pub const BIN_VELOCITIES: &str = "binvelocities";
pub const EXTENDED_SYSTEM: &str = "extendedsystem";
pub const ALCH_OUT_FILE: &str = "alchOutFile";
pub const ALCH_LAMBDA: &str = "alchLambda";
pub const ALCH_LAMBDA2: &str = "alchLambda2";
pub const ALCH_EQUIL_STEPS: &str = "alchEquilSteps";
pub const FIRST_TIMESTEP: &str = "firsttimestep";
pub const RUN: &str = "run";
pub const CUDA_SOA_INTEGRATE: &str = "CUDASOAintegrate";
pub const ALCH_PME_CUDA: &str = "alchPMECUDA";

// Lowercase; template keys are lowercased before lookup.
static RESERVED_COMMON: Set<&'static str> = phf_set! {
    "outputname", "restartname", "alchoutfile", "alchlambda", "alchlambda2",
    "alchequilsteps", "firsttimestep", "run", "alchpmecuda", "cudasoaintegrate",
};

static RESERVED_RESTART_INPUTS: Set<&'static str> = phf_set! {
    "bincoordinates", "binvelocities", "extendedsystem",
};

/// Returns `true` if `key` is controlled by the generator in `direction`.
pub fn is_reserved(key: &str, direction: Direction) -> bool {
    let key = key.to_ascii_lowercase();
    RESERVED_COMMON.contains(key.as_str())
        || (direction == Direction::Backward && RESERVED_RESTART_INPUTS.contains(key.as_str()))
}

/// Blanks every template line whose first token is a reserved directive.
///
/// Applying this to its own output returns an identical document.
pub fn strip_reserved(template: &DirectiveDocument, direction: Direction) -> DirectiveDocument {
    template.blank_directives(|key| is_reserved(key, direction))
}

/// Directives that enable the GPU-resident integrator and alchemical PME.
pub fn gpu_directives() -> [Directive; 2] {
    [
        Directive::new(CUDA_SOA_INTEGRATE, "on"),
        Directive::new(ALCH_PME_CUDA, "on"),
    ]
}

fn header_block(plan: &SegmentPlan) -> Vec<Directive> {
    let mut block = vec![
        Directive::new(OUTPUT_NAME, &plan.output_stem),
        Directive::new(RESTART_NAME, &plan.output_stem),
    ];
    if let Some(inputs) = &plan.restart_inputs {
        block.push(Directive::new(BIN_COORDINATES, &inputs.coordinates));
        block.push(Directive::new(BIN_VELOCITIES, &inputs.velocities));
        block.push(Directive::new(EXTENDED_SYSTEM, &inputs.extended_system));
    }
    block.push(Directive::new(ALCH_OUT_FILE, &plan.result_file));
    block
}

/// A finished configuration document and the file it belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub process_index: usize,
    pub direction: Direction,
    pub file_name: String,
    pub document: DirectiveDocument,
}

/// Merges a template with a segment plan into a complete configuration.
///
/// Layout: the stripped template, a blank line, the GPU directives when
/// single-node GPU mode is on, then the header block and one block per leg,
/// each preceded by a blank line.
pub fn assemble(template: &DirectiveDocument, plan: &SegmentPlan, config: &RunConfig) -> GeneratedArtifact {
    let mut document = strip_reserved(template, plan.direction);

    document.push_blank();
    if config.acceleration.is_gpu() {
        for directive in gpu_directives() {
            document.push_directive(&directive);
        }
    }

    document.push_block(&header_block(plan));
    for leg in &plan.legs {
        document.push_block(&[
            Directive::new(ALCH_LAMBDA, format_lambda(leg.window.lambda1)),
            Directive::new(ALCH_LAMBDA2, format_lambda(leg.window.lambda2)),
            Directive::new(ALCH_EQUIL_STEPS, leg.equilibration_steps),
            Directive::new(FIRST_TIMESTEP, leg.first_timestep),
            Directive::new(RUN, leg.run_steps),
        ]);
    }

    GeneratedArtifact {
        process_index: plan.process_index,
        direction: plan.direction,
        file_name: config.naming(plan.direction).config_file(plan.process_index),
        document,
    }
}

/// The shell command that runs one generated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub binary: PathBuf,
    pub device: Option<u32>,
    pub threads: usize,
    pub input_file: String,
    pub log_file: String,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' +idlepoll ", self.binary.display())?;
        if let Some(device) = self.device {
            write!(f, "+devices {} ", device)?;
        }
        write!(
            f,
            "+p{} '{}' > {}",
            self.threads, self.input_file, self.log_file
        )
    }
}

/// Derives, without running it, the command line for one process and direction.
pub fn invocation(
    assignment: &ProcessAssignment,
    direction: Direction,
    config: &RunConfig,
) -> Invocation {
    let naming = config.naming(direction);
    let index = assignment.process_index;
    let device = match config.acceleration {
        Acceleration::SingleNodeGpu { .. } => assignment.gpu_device,
        Acceleration::Cpu => None,
    };
    Invocation {
        binary: config.namd_binary.clone(),
        device,
        threads: config.threads_per_process,
        input_file: naming.config_file(index),
        log_file: naming.log_file(index),
    }
}
