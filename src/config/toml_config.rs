use crate::core::ConfigProvider;
use crate::domain::model::Term;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://studien.rj.ost.ch/";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "data";
/// Deactivated modules whose last run ends before this year are dropped.
pub const DEFAULT_DEACTIVATION_CUTOFF_YEAR: i32 = 2025;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// One curriculum revision to crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Also the name of the program's output subdirectory.
    pub id: String,
    /// Path of the root document relative to the base URL.
    pub root: String,
    #[serde(default)]
    pub excluded_modules: Vec<String>,
    /// Module documents that belong to the program but are not listed in its root document.
    #[serde(default)]
    pub extra_modules: Vec<String>,
}

/// A single (field, value) correction for a module whose source data is wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldOverride {
    Term(Term),
    SuccessorModuleId(String),
    PredecessorModuleId(String),
    NoSuccessor,
    NoPredecessor,
    IsDeactivated(bool),
    Ects(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_cutoff_year")]
    pub deactivation_cutoff_year: i32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: Option<u64>,
    #[serde(default = "default_programs")]
    pub programs: Vec<ProgramConfig>,
    #[serde(default = "default_overrides")]
    pub overrides: BTreeMap<String, Vec<FieldOverride>>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_DIRECTORY.to_string()
}

fn default_cutoff_year() -> i32 {
    DEFAULT_DEACTIVATION_CUTOFF_YEAR
}

fn default_request_timeout() -> Option<u64> {
    Some(DEFAULT_REQUEST_TIMEOUT_SECONDS)
}

pub fn default_programs() -> Vec<ProgramConfig> {
    vec![ProgramConfig {
        id: "I".to_string(),
        root: "allStudies/10191_I.json".to_string(),
        excluded_modules: ["SecSW", "WSLS", "WIoT", "RKI"]
            .iter()
            .map(|id| id.to_string())
            .collect(),
        extra_modules: Vec::new(),
    }]
}

/// Known errors in the service's data.
pub fn default_overrides() -> BTreeMap<String, Vec<FieldOverride>> {
    BTreeMap::from([
        ("SE1".to_string(), vec![FieldOverride::Term(Term::Autumn)]),
        ("SE2".to_string(), vec![FieldOverride::Term(Term::Spring)]),
        (
            "PF".to_string(),
            vec![FieldOverride::SuccessorModuleId("SEP1".to_string())],
        ),
        (
            "SEP1".to_string(),
            vec![FieldOverride::PredecessorModuleId("PF".to_string())],
        ),
    ])
}

impl Default for CurriculumConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_path: default_output_path(),
            deactivation_cutoff_year: DEFAULT_DEACTIVATION_CUTOFF_YEAR,
            request_timeout_seconds: default_request_timeout(),
            programs: default_programs(),
            overrides: default_overrides(),
        }
    }
}

impl CurriculumConfig {
    /// Load the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse the configuration from a TOML string; missing keys fall back to the built-in defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<regex::Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn program(&self, id: &str) -> Option<&ProgramConfig> {
        self.programs.iter().find(|program| program.id == id)
    }
}

impl ConfigProvider for CurriculumConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn programs(&self) -> &[ProgramConfig] {
        &self.programs
    }

    fn overrides(&self) -> &BTreeMap<String, Vec<FieldOverride>> {
        &self.overrides
    }

    fn deactivation_cutoff_year(&self) -> i32 {
        self.deactivation_cutoff_year
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for CurriculumConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_range("deactivation_cutoff_year", self.deactivation_cutoff_year, 2000, 2100)?;

        if self.programs.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "programs".to_string(),
            });
        }
        for program in &self.programs {
            validation::validate_non_empty_string("programs.id", &program.id)?;
            validation::validate_path("programs.id", &program.id)?;
            validation::validate_non_empty_string("programs.root", &program.root)?;
            for path in &program.extra_modules {
                validation::validate_non_empty_string("programs.extra_modules", path)?;
            }
        }
        validation::validate_unique("programs.id", self.programs.iter().map(|p| p.id.as_str()))?;

        if let Some(0) = self.request_timeout_seconds {
            return Err(EtlError::InvalidConfigValueError {
                field: "request_timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }

        Ok(())
    }
}
