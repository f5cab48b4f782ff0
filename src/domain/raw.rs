//! Payloads as served by the study-program service.
//!
//! Field names follow the service's schema; every collection defaults to empty
//! because older curriculum revisions omit whole sections.

use crate::config::toml_config::ProgramConfig;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Root document of one curriculum revision (`allStudies/<id>.json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RootDocument {
    #[serde(default)]
    pub kredits: Vec<CreditRequirement>,
    #[serde(default)]
    pub zuordnungen: Vec<ModuleAssignment>,
    #[serde(default)]
    pub spezialisierungen: Vec<Specialization>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditRequirement {
    #[serde(rename = "minKredits", default)]
    pub min_kredits: u32,
    #[serde(default)]
    pub kategorien: Vec<RawCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCategory {
    pub kuerzel: String,
    #[serde(default)]
    pub bezeichnung: String,
    #[serde(default)]
    pub kreditpunkte: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleAssignment {
    pub kuerzel: String,
    #[serde(default)]
    pub bezeichnung: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "istAbschlussArbeit", default)]
    pub ist_abschluss_arbeit: bool,
    #[serde(rename = "istPflichtmodul", default)]
    pub ist_pflichtmodul: bool,
    #[serde(rename = "semEmpfehlung", default)]
    pub sem_empfehlung: Option<u32>,
    #[serde(default)]
    pub kategorien: Vec<RawCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Specialization {
    pub kuerzel: String,
    #[serde(default)]
    pub bezeichnung: String,
    pub url: String,
}

/// A bare reference to another document, as used in recommendations and focus lists.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRef {
    pub kuerzel: String,
    #[serde(default)]
    pub bezeichnung: String,
    #[serde(default)]
    pub url: String,
}

/// Detail document of a single module.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleDetail {
    pub kuerzel: Option<String>,
    pub bezeichnung: Option<String>,
    pub kreditpunkte: Option<u32>,
    pub zustand: Option<String>,
    pub durchfuehrungen: Option<Schedule>,
    #[serde(default)]
    pub empfehlungen: Vec<DocumentRef>,
    pub nachfolger: Option<DocumentRef>,
    pub vorgaenger: Option<DocumentRef>,
    #[serde(default)]
    pub kategorien: Vec<RawCategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schedule {
    #[serde(rename = "beginSemester")]
    pub begin_semester: Option<String>,
    #[serde(rename = "endSemester")]
    pub end_semester: Option<String>,
    #[serde(rename = "endJahr")]
    pub end_jahr: Option<i32>,
}

/// Document behind a specialization's `url`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FocusDocument {
    #[serde(default)]
    pub zuordnungen: Vec<DocumentRef>,
}

/// Result of fetching one linked document. Failures are data, not control flow.
#[derive(Debug, Clone)]
pub enum FetchOutcome<T> {
    Fetched(T),
    Failed(String),
}

impl<T> FetchOutcome<T> {
    pub fn fetched(&self) -> Option<&T> {
        match self {
            FetchOutcome::Fetched(document) => Some(document),
            FetchOutcome::Failed(_) => None,
        }
    }
}

/// Every document fetched for one program revision.
#[derive(Debug, Clone)]
pub struct ProgramSnapshot {
    pub program: ProgramConfig,
    pub root: RootDocument,
    /// Extra module documents keyed by their path.
    pub extra_modules: BTreeMap<String, ModuleDetail>,
    /// Focus documents keyed by the specialization's `url`.
    pub focus_documents: BTreeMap<String, FetchOutcome<FocusDocument>>,
}

/// Output of the extract stage: all raw documents of a run.
#[derive(Debug, Clone, Default)]
pub struct CurriculumSnapshot {
    pub programs: Vec<ProgramSnapshot>,
    /// Module detail documents keyed by the module's `url`, shared across programs.
    pub details: BTreeMap<String, FetchOutcome<ModuleDetail>>,
}
