pub mod python;
pub mod requirements;
pub mod setup;
pub mod step_sequence;

pub use crate::domain::model::{CommandOutput, StepReport};
pub use crate::domain::ports::{CommandRunner, ConfigProvider};
pub use crate::utils::error::Result;
