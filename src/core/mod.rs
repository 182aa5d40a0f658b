pub mod launcher;
pub mod plan;

pub use crate::domain::model::{Invocation, LaunchReport, Platform, Step};
pub use crate::domain::ports::{CommandRunner, Console, PortProbe};
pub use crate::utils::error::Result;
