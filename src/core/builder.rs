//! Construction of category and module records from a program's root document.

use crate::config::toml_config::ProgramConfig;
use crate::core::normalize;
use crate::domain::model::{Category, CategoryRef, Module};
use crate::domain::raw::{ModuleAssignment, ModuleDetail, RawCategory, RootDocument, Specialization};
use std::collections::{BTreeMap, BTreeSet};

/// Modules of all programs in a run, keyed by normalized id.
///
/// Passes never share this map; each returns its own modules and the caller
/// merges them with [`ModuleCatalog::merge`].
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    modules: BTreeMap<String, Module>,
}

impl ModuleCatalog {
    /// Last write wins: a module id produced by a later source replaces the earlier record.
    pub fn merge(&mut self, modules: BTreeMap<String, Module>) {
        for (id, module) in modules {
            if let Some(previous) = self.modules.insert(id, module) {
                tracing::debug!("🔁 Module '{}' redefined by a later source", previous.id);
            }
        }
    }

    pub fn insert(&mut self, module: Module) {
        self.modules.insert(module.id.clone(), module);
    }

    pub fn get(&self, id: &str) -> Option<&Module> {
        self.modules.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Module> {
        self.modules.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&Module) -> bool) {
        self.modules.retain(|_, module| keep(module));
    }

    pub fn into_modules(self) -> Vec<Module> {
        self.modules.into_values().collect()
    }
}

impl FromIterator<Module> for ModuleCatalog {
    fn from_iter<I: IntoIterator<Item = Module>>(iter: I) -> Self {
        let mut catalog = ModuleCatalog::default();
        for module in iter {
            catalog.insert(module);
        }
        catalog
    }
}

/// Records built from one program revision before they are merged into the run.
#[derive(Debug, Clone, Default)]
pub struct ProgramPass {
    pub program_id: String,
    pub categories: BTreeMap<String, Category>,
    /// Category id to the ids of this program's modules counting towards it.
    pub memberships: BTreeMap<String, BTreeSet<String>>,
    pub modules: BTreeMap<String, Module>,
    pub specializations: Vec<Specialization>,
}

/// Assignments of the root document that become modules, in document order.
pub fn module_entries(root: &RootDocument) -> impl Iterator<Item = &ModuleAssignment> {
    root.zuordnungen
        .iter()
        .filter(|assignment| accepts_module(&assignment.kuerzel))
}

/// Whether a raw module code of this program becomes a module record.
///
/// Excluded modules are still built so that their cross-references survive;
/// the finalizer drops them from the output.
pub fn accepts_module(raw_code: &str) -> bool {
    let id = normalize::module_id(raw_code);
    if normalize::is_category_placeholder(&id) {
        tracing::debug!("Skipping category placeholder '{}'", raw_code);
        return false;
    }
    true
}

pub fn is_excluded(program: &ProgramConfig, module_id: &str) -> bool {
    program.excluded_modules.iter().any(|excluded| excluded == module_id)
}

pub fn build_program(
    program: &ProgramConfig,
    root: &RootDocument,
    extra_modules: &BTreeMap<String, ModuleDetail>,
) -> ProgramPass {
    let mut pass = ProgramPass {
        program_id: program.id.clone(),
        categories: build_categories(root),
        specializations: root.spezialisierungen.clone(),
        ..Default::default()
    };

    for assignment in module_entries(root) {
        let mut module = Module::new(
            normalize::module_id(&assignment.kuerzel),
            normalize::module_name(&assignment.kuerzel, &assignment.bezeichnung),
            assignment.url.clone(),
        );
        module.is_thesis = assignment.ist_abschluss_arbeit;
        module.is_required = assignment.ist_pflichtmodul;
        module.recommended_semester = assignment.sem_empfehlung;
        module.is_excluded = is_excluded(program, &module.id);
        assign_categories(&mut module, &assignment.kategorien);
        pass.add_module(module);
    }

    for (path, detail) in extra_modules {
        let Some(code) = detail.kuerzel.as_deref() else {
            tracing::warn!("⚠️ Extra module document '{}' has no code, skipped", path);
            continue;
        };
        if !accepts_module(code) {
            continue;
        }
        let name = detail.bezeichnung.as_deref().unwrap_or(code);
        let mut module = Module::new(
            normalize::module_id(code),
            normalize::module_name(code, name),
            path.clone(),
        );
        module.is_excluded = is_excluded(program, &module.id);
        assign_categories(&mut module, &detail.kategorien);
        pass.add_module(module);
    }

    tracing::debug!(
        "Program '{}': {} categories, {} modules, {} specializations",
        pass.program_id,
        pass.categories.len(),
        pass.modules.len(),
        pass.specializations.len()
    );
    pass
}

impl ProgramPass {
    /// Within one pass the later entry wins as well.
    fn add_module(&mut self, module: Module) {
        for category in &module.categories {
            self.memberships
                .entry(category.id.clone())
                .or_default()
                .insert(module.id.clone());
        }
        self.modules.insert(module.id.clone(), module);
    }
}

fn build_categories(root: &RootDocument) -> BTreeMap<String, Category> {
    let mut categories = BTreeMap::new();

    for requirement in &root.kredits {
        let Some(raw) = requirement.kategorien.first() else {
            tracing::warn!("⚠️ Credit requirement without category, skipped");
            continue;
        };
        if normalize::is_helper_category(&raw.kuerzel) {
            continue;
        }

        let id = normalize::category_id(&raw.kuerzel);
        categories.insert(
            id.clone(),
            Category {
                id,
                name: raw.bezeichnung.clone(),
                required_credits: requirement.min_kredits,
                total_ects: 0,
                modules: Vec::new(),
            },
        );
    }

    categories
}

fn assign_categories(module: &mut Module, categories: &[RawCategory]) {
    module.categories = categories
        .iter()
        .map(|category| CategoryRef {
            id: normalize::category_id(&category.kuerzel),
            name: category.bezeichnung.clone(),
            ects: category.kreditpunkte,
        })
        .collect();
    module.ects = categories.first().map(|c| c.kreditpunkte).unwrap_or(0);
}
