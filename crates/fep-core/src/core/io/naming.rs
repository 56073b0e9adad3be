/// Index-qualified file naming shared by the generator and the merger.
///
/// Every per-process file is `<prefix>.<label>.<ext>`, where the label is the
/// process index zero-padded to the decimal width of the process count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNaming {
    prefix: String,
    width: usize,
}

impl FileNaming {
    pub fn new(prefix: impl Into<String>, num_processes: usize) -> Self {
        Self {
            prefix: prefix.into(),
            width: num_processes.to_string().len(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn label(&self, index: usize) -> String {
        format!("{:0width$}", index, width = self.width)
    }

    /// `<prefix>.<label>`, used for `outputname` and `restartname`.
    pub fn stem(&self, index: usize) -> String {
        format!("{}.{}", self.prefix, self.label(index))
    }

    pub fn config_file(&self, index: usize) -> String {
        format!("{}.namd", self.stem(index))
    }

    pub fn log_file(&self, index: usize) -> String {
        format!("{}.log", self.stem(index))
    }

    pub fn result_file(&self, index: usize) -> String {
        format!("{}.fepout", self.stem(index))
    }

    pub fn coordinates_file(&self, index: usize) -> String {
        format!("{}.coor", self.stem(index))
    }

    pub fn velocities_file(&self, index: usize) -> String {
        format!("{}.vel", self.stem(index))
    }

    pub fn extended_system_file(&self, index: usize) -> String {
        format!("{}.xsc", self.stem(index))
    }

    pub fn merged_result_file(&self) -> String {
        format!("{}_merged.fepout", self.prefix)
    }
}
