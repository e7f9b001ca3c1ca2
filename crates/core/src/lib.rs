//! fontgen core - batch font conversion jobs.

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod job;
pub mod paths;
pub mod subset;

pub use batch::{BatchResult, JobReport, run_batch};
pub use config::{Configuration, InputType, PathCase, SubsetCategory, TargetFormat};
pub use engine::{FontEngine, FontModel, SfntEngine, SfntFont};
pub use error::{Error, ParseOptionError, Result};
pub use host::{DestinationPrompt, DirectorySelection, JobReporter, LogReporter, Modifiers, NoPrompt};
pub use job::{JobOutcome, OutputFile, Payload, Preparation, prepare, process, run_job};
pub use subset::CodePointSubset;
