pub mod builder;
pub mod enrich;
pub mod etl;
pub mod finalize;
pub mod linker;
pub mod normalize;
pub mod pipeline;

pub use crate::domain::model::{Category, CurriculumOutput, Focus, Module, ProgramOutput, Term};
pub use crate::domain::ports::{ConfigProvider, DocumentSource, Pipeline, Storage};
pub use crate::domain::raw::CurriculumSnapshot;
pub use crate::utils::error::Result;
