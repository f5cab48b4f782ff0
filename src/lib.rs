pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{HttpSource, LocalStorage};
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{CurriculumConfig, FieldOverride, ProgramConfig};

pub use core::{etl::EtlEngine, pipeline::CurriculumPipeline};
pub use utils::error::{EtlError, Result};
