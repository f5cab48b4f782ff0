use crate::core::builder::{self, ModuleCatalog};
use crate::core::{enrich, finalize, linker};
use crate::core::{ConfigProvider, DocumentSource, Pipeline, Storage};
use crate::domain::model::{CurriculumOutput, ProgramOutput};
use crate::domain::raw::{
    CurriculumSnapshot, FetchOutcome, ModuleDetail, ProgramSnapshot, RootDocument,
};
use crate::utils::error::{EtlError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

pub const MODULES_FILE: &str = "modules.json";
pub const CATEGORIES_FILE: &str = "categories.json";
pub const FOCUSES_FILE: &str = "focuses.json";

/// Crawls every configured program revision and writes the front-end's JSON files.
pub struct CurriculumPipeline<S: Storage, D: DocumentSource, C: ConfigProvider> {
    storage: S,
    source: D,
    config: C,
}

impl<S: Storage, D: DocumentSource, C: ConfigProvider> CurriculumPipeline<S, D, C> {
    pub fn new(storage: S, source: D, config: C) -> Self {
        Self {
            storage,
            source,
            config,
        }
    }

    async fn fetch_document<T: DeserializeOwned + Send>(&self, path: &str) -> Result<T> {
        let value = self.source.fetch_json(path).await?;
        serde_json::from_value(value).map_err(|e| EtlError::DocumentError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Failures of linked documents are kept as data for the transform stage.
    async fn fetch_outcome<T: DeserializeOwned + Send>(&self, path: &str) -> FetchOutcome<T> {
        match self.fetch_document(path).await {
            Ok(document) => FetchOutcome::Fetched(document),
            Err(e) => {
                tracing::debug!("Fetching '{}' failed: {}", path, e);
                FetchOutcome::Failed(e.to_string())
            }
        }
    }

    async fn write_json<T: Serialize + Sync + ?Sized>(&self, path: &str, value: &T) -> Result<()> {
        let data = to_pretty_json(value)?;
        tracing::debug!("💾 Writing {} ({} bytes)", path, data.len());
        self.storage.write_file(path, data.as_bytes()).await
    }
}

#[async_trait::async_trait]
impl<S: Storage, D: DocumentSource, C: ConfigProvider> Pipeline for CurriculumPipeline<S, D, C> {
    async fn extract(&self) -> Result<CurriculumSnapshot> {
        let mut snapshot = CurriculumSnapshot::default();

        for program in self.config.programs() {
            tracing::info!("📥 Fetching program '{}' ({})", program.id, program.root);
            let root: RootDocument = self.fetch_document(&program.root).await?;

            let mut extra_modules = BTreeMap::new();
            for path in &program.extra_modules {
                match self.fetch_document::<ModuleDetail>(path).await {
                    Ok(detail) => {
                        // The extra document doubles as the module's detail document.
                        snapshot
                            .details
                            .insert(path.clone(), FetchOutcome::Fetched(detail.clone()));
                        extra_modules.insert(path.clone(), detail);
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Extra module document '{}' skipped: {}", path, e);
                    }
                }
            }

            let detail_urls: Vec<String> = builder::module_entries(&root)
                .map(|assignment| assignment.url.clone())
                .collect();
            for url in detail_urls {
                if url.is_empty() || snapshot.details.contains_key(&url) {
                    continue;
                }
                let outcome = self.fetch_outcome(&url).await;
                snapshot.details.insert(url, outcome);
            }

            let mut focus_documents = BTreeMap::new();
            for specialization in &root.spezialisierungen {
                if focus_documents.contains_key(&specialization.url) {
                    continue;
                }
                let outcome = self.fetch_outcome(&specialization.url).await;
                focus_documents.insert(specialization.url.clone(), outcome);
            }

            tracing::debug!(
                "Program '{}': {} assignments, {} extra modules, {} focus documents",
                program.id,
                root.zuordnungen.len(),
                extra_modules.len(),
                focus_documents.len()
            );

            snapshot.programs.push(ProgramSnapshot {
                program: program.clone(),
                root,
                extra_modules,
                focus_documents,
            });
        }

        let failed = snapshot
            .details
            .values()
            .filter(|outcome| outcome.fetched().is_none())
            .count();
        tracing::info!(
            "Fetched {} programs, {} detail documents ({} failed)",
            snapshot.programs.len(),
            snapshot.details.len(),
            failed
        );

        Ok(snapshot)
    }

    async fn transform(&self, data: CurriculumSnapshot) -> Result<CurriculumOutput> {
        let mut catalog = ModuleCatalog::default();
        let mut passes = Vec::with_capacity(data.programs.len());

        for program in &data.programs {
            let mut pass = builder::build_program(&program.program, &program.root, &program.extra_modules);
            catalog.merge(std::mem::take(&mut pass.modules));
            passes.push(pass);
        }

        let report = enrich::enrich_catalog(&mut catalog, &data.details, self.config.deactivation_cutoff_year());
        tracing::info!(
            "Enriched {} modules ({} without details, {} unscheduled, {} deactivated)",
            report.enriched,
            report.failed,
            report.unscheduled,
            report.deactivated
        );

        let overridden = enrich::apply_overrides(&mut catalog, self.config.overrides());
        tracing::debug!("Applied overrides to {} modules", overridden);

        let dropped = linker::resolve_dependencies(&mut catalog);
        if dropped > 0 {
            tracing::info!("Dropped {} unresolvable recommendation edges", dropped);
        }

        let removed = finalize::remove_inactive(&mut catalog);
        tracing::info!("Removed {} deactivated or excluded modules", removed.len());

        let mut programs = Vec::with_capacity(passes.len());
        for (pass, program) in passes.iter().zip(&data.programs) {
            let focuses = linker::link_focuses(&pass.specializations, &program.focus_documents, &mut catalog);
            let categories = linker::link_categories(pass, &catalog);
            programs.push(ProgramOutput {
                program_id: pass.program_id.clone(),
                categories,
                focuses,
            });
        }

        let modules = finalize::finalize_modules(catalog)?;
        tracing::info!("Transformed {} modules across {} programs", modules.len(), programs.len());

        Ok(CurriculumOutput { modules, programs })
    }

    async fn load(&self, result: CurriculumOutput) -> Result<String> {
        self.write_json(MODULES_FILE, &result.modules).await?;

        for program in &result.programs {
            self.write_json(&format!("{}/{}", program.program_id, CATEGORIES_FILE), &program.categories)
                .await?;
            self.write_json(&format!("{}/{}", program.program_id, FOCUSES_FILE), &program.focuses)
                .await?;
        }

        Ok(self.config.output_path().to_string())
    }
}

/// Two-space indented JSON with a trailing newline.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}
