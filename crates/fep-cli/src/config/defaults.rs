pub struct DefaultsConfig {
    pub namd_binary: String,
    pub num_processes: usize,
    pub threads_per_process: usize,
    pub single_node_gpu: bool,
    pub lambda_start: f64,
    pub lambda_end: f64,
    pub num_windows: usize,
    pub steps_per_window: u64,
    pub equilibration_steps: u64,
    pub forward_template: String,
    pub backward_template: String,
    pub forward_prefix: String,
    pub backward_prefix: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            namd_binary: "namd2".to_string(),
            num_processes: 16,
            threads_per_process: 1,
            single_node_gpu: true,
            lambda_start: 0.0,
            lambda_end: 1.0,
            num_windows: 50,
            steps_per_window: 50000,
            equilibration_steps: 10000,
            forward_template: "forward.template".to_string(),
            backward_template: "backward.template".to_string(),
            forward_prefix: "forward".to_string(),
            backward_prefix: "backward".to_string(),
        }
    }
}
