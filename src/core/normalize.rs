//! Mapping of raw institutional codes to the stable ids used in the output.
//!
//! Every table here must keep two invariants: no raw code maps to an empty id,
//! and no two semantically distinct codes map to the same id. Collisions are
//! fixed by editing the tables, never at runtime.

const MODULE_PREFIX: &str = "M_";

/// Alternate spelling of the project-work suffix, collapsed into [`PROJECT_WORK_SUFFIX`].
const PROJECT_WORK_MARKER: &str = "_p";
const PROJECT_WORK_SUFFIX: &str = "p";
pub const PROJECT_WORK_NAME_SUFFIX: &str = " (Projektarbeit)";

/// Namespace markers in front of category codes.
const CATEGORY_MARKERS: &[&str] = &["I-Kat_", "I_Kat_", "Kat_", "I-", "I_"];

/// Legacy category ids and the category that replaced them.
const CATEGORY_ALIASES: &[(&str, &str)] = &[("IKTS-help", "GWR")];

/// Raw code of the pseudo-category that only hosts ids remapped into [`CATEGORY_ALIASES`].
pub const HELPER_CATEGORY_CODE: &str = "Kat_IKTS-help";

/// Categories are also listed as pseudo-modules (`M_KatAufbauInf`).
const CATEGORY_PLACEHOLDER_PREFIX: &str = "Kat";

/// Focus documents still reference some modules by an outdated code.
const FOCUS_MODULE_ALIASES: &[(&str, &str)] = &[("FunProg", "FP")];

pub fn module_id(raw: &str) -> String {
    let id = strip_non_empty(raw, MODULE_PREFIX);
    match id.strip_suffix(PROJECT_WORK_MARKER) {
        Some(base) if !base.is_empty() => format!("{}{}", base, PROJECT_WORK_SUFFIX),
        _ => id.to_string(),
    }
}

/// True when the raw code is the underscore variant of a project-work module.
pub fn is_project_work(raw: &str) -> bool {
    let id = strip_non_empty(raw, MODULE_PREFIX);
    id.len() > PROJECT_WORK_MARKER.len() && id.ends_with(PROJECT_WORK_MARKER)
}

/// Display name of a module, marked when the raw code denotes project work.
pub fn module_name(raw_code: &str, name: &str) -> String {
    if is_project_work(raw_code) && !name.ends_with(PROJECT_WORK_NAME_SUFFIX) {
        format!("{}{}", name, PROJECT_WORK_NAME_SUFFIX)
    } else {
        name.to_string()
    }
}

pub fn category_id(raw: &str) -> String {
    let mut id = raw;
    // Markers can be stacked (`I-Kat_`); strip until none is left.
    while let Some(rest) = strip_longest_marker(id) {
        id = rest;
    }

    lookup_alias(CATEGORY_ALIASES, id).to_string()
}

fn strip_longest_marker(id: &str) -> Option<&str> {
    CATEGORY_MARKERS
        .iter()
        .filter_map(|marker| id.strip_prefix(marker))
        .filter(|rest| !rest.is_empty())
        .min_by_key(|rest| rest.len())
}

pub fn is_helper_category(raw: &str) -> bool {
    raw == HELPER_CATEGORY_CODE
}

pub fn is_category_placeholder(module_id: &str) -> bool {
    module_id.starts_with(CATEGORY_PLACEHOLDER_PREFIX)
}

pub fn focus_module_id(raw: &str) -> String {
    let id = module_id(raw);
    lookup_alias(FOCUS_MODULE_ALIASES, &id).to_string()
}

fn strip_non_empty<'a>(raw: &'a str, prefix: &str) -> &'a str {
    match raw.strip_prefix(prefix) {
        Some(rest) if !rest.is_empty() => rest,
        _ => raw,
    }
}

fn lookup_alias<'a>(table: &'a [(&'a str, &'a str)], id: &'a str) -> &'a str {
    table
        .iter()
        .find(|(legacy, _)| *legacy == id)
        .map(|(_, current)| *current)
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_prefix_is_stripped() {
        assert_eq!(module_id("M_AD1"), "AD1");
        assert_eq!(module_id("AD1"), "AD1");
        // Only the leading marker counts.
        assert_eq!(module_id("M_M_X"), "M_X");
    }

    #[test]
    fn test_project_work_variants_share_one_id() {
        assert_eq!(module_id("M_SEP_p"), "SEPp");
        assert_eq!(module_id("M_SEPp"), "SEPp");
        assert!(is_project_work("M_SEP_p"));
        assert!(!is_project_work("M_SEPp"));
        assert_eq!(
            module_name("M_SEP_p", "Software Engineering Projekt"),
            "Software Engineering Projekt (Projektarbeit)"
        );
        assert_eq!(
            module_name("M_SEPp", "Software Engineering Projekt"),
            "Software Engineering Projekt"
        );
    }

    #[test]
    fn test_project_work_suffix_is_not_appended_twice() {
        let name = module_name("M_BAI_p", "Bachelorarbeit (Projektarbeit)");
        assert_eq!(name, "Bachelorarbeit (Projektarbeit)");
    }

    #[test]
    fn test_category_markers_longest_match_wins() {
        assert_eq!(category_id("I-Kat_Math"), "Math");
        assert_eq!(category_id("I_Kat_Math"), "Math");
        assert_eq!(category_id("Kat_Inf"), "Inf");
        assert_eq!(category_id("I-GWR"), "GWR");
        assert_eq!(category_id("I_Inf"), "Inf");
        assert_eq!(category_id("Inf"), "Inf");
    }

    #[test]
    fn test_legacy_category_is_remapped() {
        assert_eq!(category_id("Kat_IKTS-help"), "GWR");
        assert_eq!(category_id("IKTS-help"), "GWR");
        assert!(is_helper_category("Kat_IKTS-help"));
        assert!(!is_helper_category("Kat_GWR"));
    }

    #[test]
    fn test_normalizer_never_produces_empty_ids() {
        for raw in ["M_", "_p", "M__p", "Kat_", "I-", "I-Kat_", "I_"] {
            assert!(!module_id(raw).is_empty(), "module id of {raw:?}");
            assert!(!category_id(raw).is_empty(), "category id of {raw:?}");
        }
        for marker in CATEGORY_MARKERS {
            assert_ne!(category_id(&format!("{marker}X")), "");
        }
    }

    #[test]
    fn test_category_placeholder_detection() {
        assert!(is_category_placeholder(&module_id("M_KatAufbauInf")));
        assert!(!is_category_placeholder(&module_id("M_AD1")));
    }

    #[test]
    fn test_focus_module_alias() {
        assert_eq!(focus_module_id("M_FunProg"), "FP");
        assert_eq!(focus_module_id("M_AD1"), "AD1");
    }
}
