use super::assembler::Invocation;
use std::fmt;

pub const RUN_SCRIPT_NAME: &str = "run.sh";

/// Forward and backward commands of one process; backward runs only if
/// forward succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPair {
    pub forward: Invocation,
    pub backward: Invocation,
}

/// A POSIX shell script launching every job pair in the background.
///
/// Pairs run concurrently with no ordering between them; the script waits for
/// all of them and reports the elapsed wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunScript {
    pub jobs: Vec<JobPair>,
}

impl fmt::Display for RunScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#!/bin/sh")?;
        writeln!(f, "cd \"$(dirname \"$0\")\" || exit 1")?;
        writeln!(f, "START=$(date +%s)")?;
        for job in &self.jobs {
            writeln!(f, "{{ {} && {}; }} &", job.forward, job.backward)?;
        }
        writeln!(f, "wait")?;
        writeln!(f, "END=$(date +%s)")?;
        writeln!(f, "DIFF=$(( $END - $START ))")?;
        writeln!(f, "echo \"It took $DIFF seconds\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn invocation(prefix: &str, index: usize) -> Invocation {
        Invocation {
            binary: PathBuf::from("namd2"),
            device: Some(index as u32),
            threads: 2,
            input_file: format!("{prefix}.{index}.namd"),
            log_file: format!("{prefix}.{index}.log"),
        }
    }

    #[test]
    fn script_chains_backward_after_forward_and_backgrounds_each_pair() {
        let script = RunScript {
            jobs: (0..2)
                .map(|i| JobPair {
                    forward: invocation("forward", i),
                    backward: invocation("backward", i),
                })
                .collect(),
        };
        let text = script.to_string();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "#!/bin/sh");
        assert_eq!(lines[2], "START=$(date +%s)");
        assert_eq!(
            lines[3],
            "{ 'namd2' +idlepoll +devices 0 +p2 'forward.0.namd' > forward.0.log && \
             'namd2' +idlepoll +devices 0 +p2 'backward.0.namd' > backward.0.log; } &"
        );
        assert!(lines[4].contains("'forward.1.namd'"));
        assert_eq!(lines[5], "wait");
        assert_eq!(lines.last(), Some(&"echo \"It took $DIFF seconds\""));
    }

    #[test]
    fn empty_script_still_waits() {
        let text = RunScript::default().to_string();
        assert!(text.contains("\nwait\n"));
    }
}
