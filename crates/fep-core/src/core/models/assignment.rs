use super::lambda::LambdaRange;
use serde::Serialize;

/// The slice of the global lambda range owned by one worker process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessAssignment {
    pub process_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_device: Option<u32>,
    pub lambda_sub_range: LambdaRange,
}

impl ProcessAssignment {
    pub fn new(process_index: usize, lambda_sub_range: LambdaRange, gpu_device: Option<u32>) -> Self {
        Self {
            process_index,
            lambda_sub_range,
            gpu_device,
        }
    }
}
