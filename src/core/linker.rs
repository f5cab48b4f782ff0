//! Cross-references between modules, focuses and categories.

use crate::core::builder::{ModuleCatalog, ProgramPass};
use crate::core::normalize;
use crate::domain::model::{Category, Focus, Module, ModuleRef};
use crate::domain::raw::{FetchOutcome, FocusDocument, Specialization};
use std::collections::{BTreeMap, BTreeSet};

/// Fills `dependentModuleIds` from the recommendation edges. Returns the number of dropped edges.
///
/// A recommendation of a missing, deactivated or excluded module is carried over to the
/// module that replaced it, found through `predecessorModuleId`.
pub fn resolve_dependencies(catalog: &mut ModuleCatalog) -> usize {
    let mut dropped = 0;

    for id in catalog.ids() {
        let recommended = match catalog.get(&id) {
            Some(module) => module.recommended_module_ids.clone(),
            None => continue,
        };

        for target in recommended {
            if let Some(module) = catalog.get_mut(&target) {
                module.add_dependent(&id);
                if module.is_active() {
                    continue;
                }
            }

            match find_active_successor(catalog, &target) {
                Some(successor) => {
                    tracing::debug!("Recommendation {} -> {} moved to successor {}", id, target, successor);
                    if let Some(module) = catalog.get_mut(&successor) {
                        module.add_dependent(&id);
                    }
                }
                None => {
                    tracing::warn!("⚠️ Recommendation {} -> {} has no active target, dropped", id, target);
                    dropped += 1;
                }
            }
        }
    }

    dropped
}

/// Follows the predecessor chain forward from `retired` until an active module is found.
fn find_active_successor(catalog: &ModuleCatalog, retired: &str) -> Option<String> {
    let mut visited = BTreeSet::from([retired.to_string()]);
    let mut current = retired.to_string();

    loop {
        let successor = catalog
            .iter()
            .find(|module| module.predecessor_module_id.as_deref() == Some(current.as_str()))?;
        if successor.is_active() {
            return Some(successor.id.clone());
        }
        if !visited.insert(successor.id.clone()) {
            return None;
        }
        current = successor.id.clone();
    }
}

/// Builds one program's focuses and adds the matching focus reference to each linked module.
pub fn link_focuses(
    specializations: &[Specialization],
    documents: &BTreeMap<String, FetchOutcome<FocusDocument>>,
    catalog: &mut ModuleCatalog,
) -> Vec<Focus> {
    let mut focuses = Vec::with_capacity(specializations.len());

    for specialization in specializations {
        let mut focus = Focus {
            id: specialization.kuerzel.clone(),
            name: specialization.bezeichnung.clone(),
            url: specialization.url.clone(),
            modules: Vec::new(),
        };
        let focus_ref = focus.to_ref();

        let document = match documents.get(&specialization.url) {
            Some(FetchOutcome::Fetched(document)) => document,
            Some(FetchOutcome::Failed(reason)) => {
                tracing::warn!("⚠️ Focus '{}' document unavailable ({}), no modules linked", focus.id, reason);
                focuses.push(focus);
                continue;
            }
            None => {
                tracing::warn!("⚠️ Focus '{}' document was not fetched, no modules linked", focus.id);
                focuses.push(focus);
                continue;
            }
        };

        let mut linked = BTreeMap::new();
        for reference in &document.zuordnungen {
            let module_id = normalize::focus_module_id(&reference.kuerzel);
            let Some(module) = catalog.get_mut(&module_id) else {
                tracing::debug!("Focus {} -> {} points outside the tracked modules", focus.id, module_id);
                continue;
            };
            if !module.focuses.iter().any(|f| f.id == focus_ref.id) {
                module.focuses.push(focus_ref.clone());
            }
            linked.insert(module_id, module.to_ref());
        }

        focus.modules = linked.into_values().collect();
        focuses.push(focus);
    }

    focuses
}

/// A program's categories with the surviving member modules, sorted by id.
pub fn link_categories(pass: &ProgramPass, catalog: &ModuleCatalog) -> Vec<Category> {
    pass.categories
        .values()
        .map(|category| {
            let members: Vec<&Module> = pass
                .memberships
                .get(&category.id)
                .into_iter()
                .flatten()
                .filter_map(|module_id| catalog.get(module_id))
                .collect();
            Category {
                total_ects: members.iter().map(|module| module.ects).sum(),
                modules: members.iter().map(|module| module.to_ref()).collect::<Vec<ModuleRef>>(),
                ..category.clone()
            }
        })
        .collect()
}
