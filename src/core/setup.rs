use crate::core::step_sequence::{StepResult, StepSequence};
use crate::utils::error::Result;

pub struct SetupEngine {
    sequence: StepSequence,
}

impl SetupEngine {
    pub fn new(sequence: StepSequence) -> Self {
        Self { sequence }
    }

    pub fn new_with_monitoring(sequence: StepSequence, monitor_enabled: bool) -> Self {
        Self {
            sequence: sequence.with_monitoring(monitor_enabled),
        }
    }

    pub async fn run(&mut self) -> Result<Vec<StepResult>> {
        println!("Starting environment setup...");
        println!("Steps: {}", self.sequence.step_names().join(" -> "));

        let results = self.sequence.execute_all().await?;

        for result in &results {
            println!(
                "  {} - {} ({:?})",
                result.step_name, result.report.summary, result.duration
            );
        }
        println!("Completed {} steps", results.len());

        Ok(results)
    }
}
