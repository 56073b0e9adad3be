use crate::core::io::namd::DirectiveDocument;
use crate::core::io::traits::TextDocument;
use crate::core::models::assignment::ProcessAssignment;
use crate::core::models::direction::Direction;
use crate::engine::assembler::{GeneratedArtifact, assemble, invocation};
use crate::engine::config::RunConfig;
use crate::engine::error::EngineError;
use crate::engine::partition::partition_run;
use crate::engine::plan::plan_segment;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::script::{JobPair, RUN_SCRIPT_NAME, RunScript};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Forward and backward input templates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Templates {
    pub forward: DirectiveDocument,
    pub backward: DirectiveDocument,
}

impl Templates {
    pub fn load(forward: &Path, backward: &Path) -> Result<Self, EngineError> {
        let read = |path: &Path| {
            debug!("Reading template {:?}", path);
            DirectiveDocument::read_from_path(path).map_err(|source| EngineError::Template {
                path: path.to_path_buf(),
                source,
            })
        };
        Ok(Self {
            forward: read(forward)?,
            backward: read(backward)?,
        })
    }

    pub fn get(&self, direction: Direction) -> &DirectiveDocument {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }
}

/// Everything a preparation run produces, held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRun {
    pub assignments: Vec<ProcessAssignment>,
    pub artifacts: Vec<GeneratedArtifact>,
    pub script: RunScript,
}

/// Computes every artifact of a run without touching the filesystem.
#[instrument(skip_all, name = "plan_workflow")]
pub fn plan(
    config: &RunConfig,
    templates: &Templates,
    reporter: &ProgressReporter,
) -> Result<PreparedRun, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Partitioning lambda windows".to_string(),
    });
    let assignments = partition_run(config)?;
    info!(
        "Partitioned {} windows over {} processes (window size {:.7}).",
        config.num_windows,
        config.num_processes,
        config.window_size().abs()
    );
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Assembling configurations".to_string(),
    });
    reporter.report(Progress::TaskStart {
        total: assignments.len() as u64,
    });

    let mut artifacts = Vec::with_capacity(assignments.len() * 2);
    let mut jobs = Vec::with_capacity(assignments.len());
    for assignment in &assignments {
        for direction in Direction::BOTH {
            let segment = plan_segment(assignment, direction, config)?;
            artifacts.push(assemble(templates.get(direction), &segment, config));
        }
        jobs.push(JobPair {
            forward: invocation(assignment, Direction::Forward, config),
            backward: invocation(assignment, Direction::Backward, config),
        });
        reporter.report(Progress::TaskIncrement { amount: 1 });
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    Ok(PreparedRun {
        assignments,
        artifacts,
        script: RunScript { jobs },
    })
}

/// Writes a prepared run into `output_dir`, creating it if needed.
///
/// Returns the paths written, configuration files first and the run script last.
#[instrument(skip_all, name = "write_workflow")]
pub fn write(
    prepared: &PreparedRun,
    output_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<Vec<PathBuf>, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Writing files".to_string(),
    });
    fs::create_dir_all(output_dir).map_err(|source| EngineError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(prepared.artifacts.len() + 1);
    for artifact in &prepared.artifacts {
        let path = output_dir.join(&artifact.file_name);
        debug!("Writing {} configuration {:?}", artifact.direction, path);
        fs::write(&path, artifact.document.to_string()).map_err(|source| EngineError::Io {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }

    let script_path = output_dir.join(RUN_SCRIPT_NAME);
    fs::write(&script_path, prepared.script.to_string()).map_err(|source| EngineError::Io {
        path: script_path.clone(),
        source,
    })?;
    make_executable(&script_path)?;
    written.push(script_path);

    reporter.report(Progress::PhaseFinish);
    info!("Wrote {} files to {:?}.", written.len(), output_dir);
    Ok(written)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), EngineError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| {
        EngineError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), EngineError> {
    Ok(())
}

/// Plans a run and writes it out. Nothing is written if planning fails.
pub fn run(
    config: &RunConfig,
    templates: &Templates,
    output_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<PreparedRun, EngineError> {
    let prepared = plan(config, templates, reporter)?;
    write(&prepared, output_dir, reporter)?;
    Ok(prepared)
}
