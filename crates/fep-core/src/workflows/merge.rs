use crate::core::io::fepout::ResultStream;
use crate::core::io::namd::DocumentError;
use crate::core::io::naming::FileNaming;
use crate::core::io::traits::TextDocument;
use crate::core::models::direction::Direction;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Process indices in the order their result streams are concatenated.
///
/// Process indices increase with lambda. Backward runs traverse each
/// sub-range downwards, so restoring a monotonic lambda order for them means
/// concatenating from the highest index down.
pub fn merge_order(direction: Direction, num_processes: usize) -> Vec<usize> {
    match direction {
        Direction::Forward => (0..num_processes).collect(),
        Direction::Backward => (0..num_processes).rev().collect(),
    }
}

fn load_streams(
    direction: Direction,
    naming: &FileNaming,
    num_processes: usize,
    input_dir: &Path,
) -> Result<Vec<ResultStream>, EngineError> {
    merge_order(direction, num_processes)
        .into_iter()
        .map(|index| {
            let path = input_dir.join(naming.result_file(index));
            debug!("Reading result stream {:?}", path);
            ResultStream::read_from_path(&path).map_err(|e| match e {
                DocumentError::Io(source) => EngineError::MissingResult { path, source },
            })
        })
        .collect()
}

/// Concatenates the per-process result streams of one direction.
///
/// The first stream in merge order is kept whole; every later stream loses
/// its two-line header.
///
/// # Errors
///
/// Returns [`EngineError::MissingResult`] if any expected stream cannot be
/// read. No partial output is produced.
pub fn merge(
    direction: Direction,
    num_processes: usize,
    prefix: &str,
    input_dir: &Path,
) -> Result<Vec<u8>, EngineError> {
    let naming = FileNaming::new(prefix, num_processes);
    let streams = load_streams(direction, &naming, num_processes, input_dir)?;

    let mut merged = Vec::new();
    for (position, stream) in streams.iter().enumerate() {
        let result = if position == 0 {
            stream.write_all(&mut merged)
        } else {
            stream.write_records(&mut merged)
        };
        // Writing into a Vec<u8> cannot fail.
        result.map_err(|source| EngineError::Io {
            path: PathBuf::from(naming.merged_result_file()),
            source,
        })?;
    }
    Ok(merged)
}

/// Merges one direction and writes `<prefix>_merged.fepout` into `output_dir`.
#[instrument(skip_all, name = "merge_workflow", fields(direction = %direction))]
pub fn run(
    direction: Direction,
    num_processes: usize,
    prefix: &str,
    input_dir: &Path,
    output_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<PathBuf, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: format!("Merging {} results", direction),
    });
    let merged = merge(direction, num_processes, prefix, input_dir)?;

    fs::create_dir_all(output_dir).map_err(|source| EngineError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let path = output_dir.join(FileNaming::new(prefix, num_processes).merged_result_file());
    fs::write(&path, &merged).map_err(|source| EngineError::Io {
        path: path.clone(),
        source,
    })?;

    info!(
        "Merged {} {} result streams into {:?} ({} bytes).",
        num_processes,
        direction,
        path,
        merged.len()
    );
    reporter.report(Progress::PhaseFinish);
    Ok(path)
}
