use crate::core::builder::ModuleCatalog;
use crate::domain::model::Module;
use crate::utils::error::{EtlError, Result};
use std::collections::{BTreeSet, HashSet};

/// Drops deactivated and excluded modules from the run. Returns the removed ids.
pub fn remove_inactive(catalog: &mut ModuleCatalog) -> Vec<String> {
    let mut removed = Vec::new();
    for module in catalog.iter() {
        if module.is_deactivated {
            tracing::debug!("🗑️ Module '{}' is deactivated and removed", module.id);
        } else if module.is_excluded {
            tracing::debug!("🗑️ Module '{}' is excluded and removed", module.id);
        } else {
            continue;
        }
        removed.push(module.id.clone());
    }

    catalog.retain(Module::is_active);
    removed
}

/// Freezes the catalog into the serialized module list.
pub fn finalize_modules(catalog: ModuleCatalog) -> Result<Vec<Module>> {
    let mut modules = catalog.into_modules();
    ensure_unique_ids(&modules)?;

    let present: HashSet<String> = modules.iter().map(|module| module.id.clone()).collect();
    for module in &mut modules {
        module
            .dependent_module_ids
            .retain(|id| present.contains(id));
        module.categories_for_coloring = module
            .categories
            .iter()
            .map(|category| category.id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
    }

    Ok(modules)
}

pub fn ensure_unique_ids(modules: &[Module]) -> Result<()> {
    let mut seen = HashSet::with_capacity(modules.len());
    for module in modules {
        if !seen.insert(module.id.as_str()) {
            return Err(EtlError::DuplicateModuleId {
                id: module.id.clone(),
            });
        }
    }
    Ok(())
}
