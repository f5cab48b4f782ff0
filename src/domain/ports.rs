use crate::config::toml_config::{FieldOverride, ProgramConfig};
use crate::domain::model::CurriculumOutput;
use crate::domain::raw::CurriculumSnapshot;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn programs(&self) -> &[ProgramConfig];
    fn overrides(&self) -> &BTreeMap<String, Vec<FieldOverride>>;
    fn deactivation_cutoff_year(&self) -> i32;
    fn request_timeout(&self) -> Option<Duration>;
}

/// Source of the linked JSON documents. Paths are relative to the service root.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<CurriculumSnapshot>;
    async fn transform(&self, data: CurriculumSnapshot) -> Result<CurriculumOutput>;
    async fn load(&self, result: CurriculumOutput) -> Result<String>;
}
