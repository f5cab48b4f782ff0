use serde::{Deserialize, Serialize};

/// Semester a module is offered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    #[serde(rename = "HS")]
    Autumn,
    #[serde(rename = "FS")]
    Spring,
    /// Begin and end markers disagree, the module runs in both semesters.
    #[serde(rename = "both")]
    Both,
    #[default]
    #[serde(rename = "")]
    Unscheduled,
}

impl Term {
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "HS" => Some(Term::Autumn),
            "FS" => Some(Term::Spring),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRef {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
    /// Credits the module earns in this category.
    pub ects: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusRef {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub required_credits: u32,
    /// Sum of the member modules' `ects`.
    pub total_ects: u32,
    pub modules: Vec<ModuleRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub name: String,
    pub url: String,
    pub is_thesis: bool,
    pub is_required: bool,
    pub recommended_semester: Option<u32>,
    pub ects: u32,
    #[serde(skip)]
    pub is_deactivated: bool,
    /// Set when the defining program lists the module in its exclusions.
    #[serde(skip)]
    pub is_excluded: bool,
    pub term: Term,
    pub categories: Vec<CategoryRef>,
    pub focuses: Vec<FocusRef>,
    pub recommended_module_ids: Vec<String>,
    pub dependent_module_ids: Vec<String>,
    pub successor_module_id: Option<String>,
    pub predecessor_module_id: Option<String>,
    pub categories_for_coloring: Vec<String>,
}

impl Module {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            is_thesis: false,
            is_required: false,
            recommended_semester: None,
            ects: 0,
            is_deactivated: false,
            is_excluded: false,
            term: Term::Unscheduled,
            categories: Vec::new(),
            focuses: Vec::new(),
            recommended_module_ids: Vec::new(),
            dependent_module_ids: Vec::new(),
            successor_module_id: None,
            predecessor_module_id: None,
            categories_for_coloring: Vec::new(),
        }
    }

    pub fn to_ref(&self) -> ModuleRef {
        ModuleRef {
            id: self.id.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
        }
    }

    /// False once the module is deactivated or excluded; such modules are dropped before output.
    pub fn is_active(&self) -> bool {
        !self.is_deactivated && !self.is_excluded
    }

    pub fn add_dependent(&mut self, module_id: &str) {
        if !self.dependent_module_ids.iter().any(|id| id == module_id) {
            self.dependent_module_ids.push(module_id.to_string());
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Focus {
    pub id: String,
    pub name: String,
    pub url: String,
    pub modules: Vec<ModuleRef>,
}

impl Focus {
    pub fn to_ref(&self) -> FocusRef {
        FocusRef {
            id: self.id.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
        }
    }
}

/// Output files of one program revision.
#[derive(Debug, Clone)]
pub struct ProgramOutput {
    pub program_id: String,
    pub categories: Vec<Category>,
    pub focuses: Vec<Focus>,
}

/// Everything the load stage writes: one shared module list plus per-program files.
#[derive(Debug, Clone)]
pub struct CurriculumOutput {
    pub modules: Vec<Module>,
    pub programs: Vec<ProgramOutput>,
}
