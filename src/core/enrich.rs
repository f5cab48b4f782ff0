//! Enrichment of built modules from their detail documents, followed by manual overrides.

use crate::config::toml_config::FieldOverride;
use crate::core::builder::ModuleCatalog;
use crate::core::normalize;
use crate::domain::model::{Module, Term};
use crate::domain::raw::{FetchOutcome, ModuleDetail, Schedule};
use std::collections::{BTreeMap, BTreeSet};

/// Value of `zustand` for modules that are no longer offered.
pub const DEACTIVATED_STATUS: &str = "deaktiviert";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub enriched: usize,
    pub failed: usize,
    pub unscheduled: usize,
    pub deactivated: usize,
}

/// Applies every module's detail document. Modules whose document is missing or
/// failed to load keep their constructed defaults.
pub fn enrich_catalog(
    catalog: &mut ModuleCatalog,
    details: &BTreeMap<String, FetchOutcome<ModuleDetail>>,
    cutoff_year: i32,
) -> EnrichmentReport {
    let mut report = EnrichmentReport::default();
    let predecessors = named_predecessors(catalog, details);

    for id in catalog.ids() {
        let Some(url) = catalog.get(&id).map(|module| module.url.clone()) else {
            continue;
        };
        let detail = match details.get(&url) {
            Some(FetchOutcome::Fetched(detail)) => detail,
            Some(FetchOutcome::Failed(reason)) => {
                tracing::warn!("⚠️ Detail document of '{}' unavailable ({}), keeping defaults", id, reason);
                report.failed += 1;
                continue;
            }
            None => {
                tracing::warn!("⚠️ No detail document fetched for '{}' ({})", id, url);
                report.failed += 1;
                continue;
            }
        };

        apply_detail(catalog, &id, detail, &predecessors, cutoff_year);

        if let Some(module) = catalog.get(&id) {
            report.enriched += 1;
            if module.term == Term::Unscheduled {
                report.unscheduled += 1;
            }
            if module.is_deactivated {
                report.deactivated += 1;
            }
        }
    }

    report
}

/// Ids that a tracked module names as its predecessor, whether or not they are tracked themselves.
fn named_predecessors(
    catalog: &ModuleCatalog,
    details: &BTreeMap<String, FetchOutcome<ModuleDetail>>,
) -> BTreeSet<String> {
    catalog
        .iter()
        .filter_map(|module| details.get(&module.url)?.fetched()?.vorgaenger.as_ref())
        .map(|reference| normalize::module_id(&reference.kuerzel))
        .collect()
}

fn apply_detail(
    catalog: &mut ModuleCatalog,
    id: &str,
    detail: &ModuleDetail,
    predecessors: &BTreeSet<String>,
    cutoff_year: i32,
) {
    let successor = detail.nachfolger.as_ref().map(|r| normalize::module_id(&r.kuerzel));
    let predecessor = detail.vorgaenger.as_ref().map(|r| normalize::module_id(&r.kuerzel));

    let mut recommended = Vec::new();
    for reference in &detail.empfehlungen {
        let target = normalize::module_id(&reference.kuerzel);
        // A retired module that a tracked module replaces stays resolvable through its successor.
        if !catalog.contains(&target) && !predecessors.contains(&target) {
            tracing::debug!("Recommendation {} -> {} points outside the tracked modules", id, target);
        } else if !recommended.contains(&target) {
            recommended.push(target);
        }
    }

    let Some(module) = catalog.get_mut(id) else {
        return;
    };

    // Needed for modules whose credits do not count towards the program's own categories.
    if module.ects == 0 {
        if let Some(credits) = detail.kreditpunkte {
            module.ects = credits;
        }
    }

    module.term = resolve_term(detail.durchfuehrungen.as_ref());
    if detail.durchfuehrungen.is_none() {
        tracing::warn!("⚠️ Module '{}' has no scheduling information", id);
    }

    for target in recommended {
        if !module.recommended_module_ids.contains(&target) {
            module.recommended_module_ids.push(target);
        }
    }

    module.is_deactivated = is_deactivated(detail, cutoff_year);

    if let Some(successor) = &successor {
        module.successor_module_id = Some(successor.clone());
    }
    if let Some(predecessor) = &predecessor {
        module.predecessor_module_id = Some(predecessor.clone());
    }

    // Reverse links: first writer wins.
    if let Some(other) = successor.as_deref().and_then(|s| catalog.get_mut(s)) {
        if other.predecessor_module_id.is_none() {
            other.predecessor_module_id = Some(id.to_string());
        }
    }
    if let Some(other) = predecessor.as_deref().and_then(|p| catalog.get_mut(p)) {
        if other.successor_module_id.is_none() {
            other.successor_module_id = Some(id.to_string());
        }
    }
}

pub fn resolve_term(schedule: Option<&Schedule>) -> Term {
    let Some(schedule) = schedule else {
        return Term::Unscheduled;
    };
    let begin = schedule.begin_semester.as_deref().and_then(Term::from_marker);
    let end = schedule.end_semester.as_deref().and_then(Term::from_marker);

    match (begin, end) {
        (Some(begin), Some(end)) if begin == end => begin,
        (Some(_), Some(_)) => Term::Both,
        (None, Some(end)) => end,
        (Some(begin), None) => begin,
        (None, None) => Term::Unscheduled,
    }
}

/// A deactivated module still counts while it runs one more cohort.
pub fn is_deactivated(detail: &ModuleDetail, cutoff_year: i32) -> bool {
    if detail.zustand.as_deref() != Some(DEACTIVATED_STATUS) {
        return false;
    }
    match &detail.durchfuehrungen {
        None => true,
        Some(schedule) => schedule.end_jahr.is_some_and(|year| year < cutoff_year),
    }
}

/// Runs after all enrichment so that overrides win over every inferred value.
pub fn apply_overrides(catalog: &mut ModuleCatalog, overrides: &BTreeMap<String, Vec<FieldOverride>>) -> usize {
    let mut applied = 0;
    for (id, fields) in overrides {
        let Some(module) = catalog.get_mut(id) else {
            tracing::debug!("Override for unknown module '{}' ignored", id);
            continue;
        };
        for field in fields {
            apply_override(module, field);
        }
        applied += 1;
    }
    applied
}

fn apply_override(module: &mut Module, field: &FieldOverride) {
    tracing::debug!("🔧 Override on '{}': {:?}", module.id, field);
    match field {
        FieldOverride::Term(term) => module.term = *term,
        FieldOverride::SuccessorModuleId(id) => module.successor_module_id = Some(id.clone()),
        FieldOverride::PredecessorModuleId(id) => module.predecessor_module_id = Some(id.clone()),
        FieldOverride::NoSuccessor => module.successor_module_id = None,
        FieldOverride::NoPredecessor => module.predecessor_module_id = None,
        FieldOverride::IsDeactivated(deactivated) => module.is_deactivated = *deactivated,
        FieldOverride::Ects(ects) => module.ects = *ects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUTOFF: i32 = 2025;

    fn catalog(ids: &[&str]) -> ModuleCatalog {
        ids.iter()
            .map(|id| Module::new(*id, *id, format!("module/M_{}.json", id)))
            .collect()
    }

    fn detail(json: serde_json::Value) -> FetchOutcome<ModuleDetail> {
        FetchOutcome::Fetched(serde_json::from_value(json).unwrap())
    }

    fn details(entries: Vec<(&str, FetchOutcome<ModuleDetail>)>) -> BTreeMap<String, FetchOutcome<ModuleDetail>> {
        entries
            .into_iter()
            .map(|(id, outcome)| (format!("module/M_{}.json", id), outcome))
            .collect()
    }

    #[test]
    fn test_ects_back_filled_only_when_zero() {
        let mut catalog = catalog(&["AD1", "RheKI"]);
        catalog.get_mut("AD1").unwrap().ects = 4;
        let details = details(vec![
            ("AD1", detail(serde_json::json!({"kreditpunkte": 6}))),
            ("RheKI", detail(serde_json::json!({"kreditpunkte": 2}))),
        ]);

        enrich_catalog(&mut catalog, &details, CUTOFF);

        assert_eq!(catalog.get("AD1").unwrap().ects, 4);
        assert_eq!(catalog.get("RheKI").unwrap().ects, 2);
    }

    #[test]
    fn test_term_resolution() {
        let schedule = |begin: Option<&str>, end: Option<&str>| Schedule {
            begin_semester: begin.map(str::to_string),
            end_semester: end.map(str::to_string),
            end_jahr: None,
        };

        assert_eq!(resolve_term(None), Term::Unscheduled);
        assert_eq!(resolve_term(Some(&schedule(Some("HS"), Some("HS")))), Term::Autumn);
        assert_eq!(resolve_term(Some(&schedule(Some("FS"), Some("FS")))), Term::Spring);
        assert_eq!(resolve_term(Some(&schedule(Some("HS"), Some("FS")))), Term::Both);
        assert_eq!(resolve_term(Some(&schedule(Some("?"), Some("FS")))), Term::Spring);
        assert_eq!(resolve_term(Some(&schedule(None, Some("HS")))), Term::Autumn);
        assert_eq!(resolve_term(Some(&schedule(Some("FS"), None))), Term::Spring);
        assert_eq!(resolve_term(Some(&schedule(None, None))), Term::Unscheduled);
    }

    #[test]
    fn test_deactivation_rules() {
        let no_schedule: ModuleDetail =
            serde_json::from_value(serde_json::json!({"zustand": "deaktiviert"})).unwrap();
        let ended: ModuleDetail = serde_json::from_value(serde_json::json!({
            "zustand": "deaktiviert",
            "durchfuehrungen": {"endSemester": "FS", "endJahr": 2023}
        }))
        .unwrap();
        let last_cohort: ModuleDetail = serde_json::from_value(serde_json::json!({
            "zustand": "deaktiviert",
            "durchfuehrungen": {"endSemester": "FS", "endJahr": 2025}
        }))
        .unwrap();
        let active: ModuleDetail = serde_json::from_value(serde_json::json!({
            "zustand": "aktiv",
            "durchfuehrungen": {"endJahr": 2020}
        }))
        .unwrap();

        assert!(is_deactivated(&no_schedule, CUTOFF));
        assert!(is_deactivated(&ended, CUTOFF));
        assert!(!is_deactivated(&last_cohort, CUTOFF));
        assert!(!is_deactivated(&active, CUTOFF));
    }

    #[test]
    fn test_recommendations_only_for_known_modules() {
        let mut catalog = catalog(&["AD1", "AD2"]);
        let details = details(vec![(
            "AD2",
            detail(serde_json::json!({
                "empfehlungen": [{"kuerzel": "M_AD1"}, {"kuerzel": "M_Extern"}, {"kuerzel": "M_AD1"}]
            })),
        )]);

        enrich_catalog(&mut catalog, &details, CUTOFF);

        assert_eq!(catalog.get("AD2").unwrap().recommended_module_ids, vec!["AD1"]);
        assert!(catalog.get("AD1").unwrap().recommended_module_ids.is_empty());
    }

    #[test]
    fn test_untracked_predecessor_stays_recommended_and_resolves_to_successor() {
        let mut catalog = catalog(&["A", "C"]);
        let details = details(vec![
            ("A", detail(serde_json::json!({"empfehlungen": [{"kuerzel": "M_B"}, {"kuerzel": "M_Extern"}]}))),
            ("C", detail(serde_json::json!({"vorgaenger": {"kuerzel": "M_B"}}))),
        ]);

        enrich_catalog(&mut catalog, &details, CUTOFF);
        let dropped = crate::core::linker::resolve_dependencies(&mut catalog);

        assert_eq!(catalog.get("A").unwrap().recommended_module_ids, vec!["B"]);
        assert_eq!(catalog.get("C").unwrap().predecessor_module_id.as_deref(), Some("B"));
        assert_eq!(catalog.get("C").unwrap().dependent_module_ids, vec!["A"]);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_successor_and_predecessor_links_first_writer_wins() {
        let mut catalog = catalog(&["PF", "SEP1", "SEP2"]);
        let details = details(vec![
            ("PF", detail(serde_json::json!({"nachfolger": {"kuerzel": "M_SEP1"}}))),
            ("SEP2", detail(serde_json::json!({"vorgaenger": {"kuerzel": "M_SEP1"}}))),
            ("SEP1", detail(serde_json::json!({}))),
        ]);

        enrich_catalog(&mut catalog, &details, CUTOFF);

        assert_eq!(catalog.get("PF").unwrap().successor_module_id.as_deref(), Some("SEP1"));
        assert_eq!(catalog.get("SEP1").unwrap().predecessor_module_id.as_deref(), Some("PF"));
        assert_eq!(catalog.get("SEP1").unwrap().successor_module_id.as_deref(), Some("SEP2"));
        assert_eq!(catalog.get("SEP2").unwrap().predecessor_module_id.as_deref(), Some("SEP1"));
    }

    #[test]
    fn test_reverse_link_does_not_overwrite_existing_link() {
        let mut catalog = catalog(&["A", "B", "C"]);
        let details = details(vec![
            ("A", detail(serde_json::json!({"nachfolger": {"kuerzel": "M_C"}}))),
            ("B", detail(serde_json::json!({"nachfolger": {"kuerzel": "M_C"}}))),
        ]);

        enrich_catalog(&mut catalog, &details, CUTOFF);

        assert_eq!(catalog.get("C").unwrap().predecessor_module_id.as_deref(), Some("A"));
        assert_eq!(catalog.get("B").unwrap().successor_module_id.as_deref(), Some("C"));
    }

    #[test]
    fn test_failed_detail_keeps_defaults() {
        let mut catalog = catalog(&["AD1", "AD2"]);
        catalog.get_mut("AD1").unwrap().ects = 4;
        let details = details(vec![(
            "AD1",
            FetchOutcome::Failed("API returned HTTP 500".to_string()),
        )]);

        let report = enrich_catalog(&mut catalog, &details, CUTOFF);

        let module = catalog.get("AD1").unwrap();
        assert_eq!(module.ects, 4);
        assert!(!module.is_deactivated);
        assert_eq!(module.term, Term::Unscheduled);
        assert_eq!(report.failed, 2);
        assert_eq!(report.enriched, 0);
    }

    #[test]
    fn test_enrichment_report_counts() {
        let mut catalog = catalog(&["OLD", "NEW"]);
        let details = details(vec![
            ("OLD", detail(serde_json::json!({"zustand": "deaktiviert"}))),
            ("NEW", detail(serde_json::json!({"durchfuehrungen": {"beginSemester": "HS", "endSemester": "HS"}}))),
        ]);

        let report = enrich_catalog(&mut catalog, &details, CUTOFF);

        assert_eq!(
            report,
            EnrichmentReport {
                enriched: 2,
                failed: 0,
                unscheduled: 1,
                deactivated: 1
            }
        );
        assert!(catalog.get("OLD").unwrap().is_deactivated);
        assert_eq!(catalog.get("NEW").unwrap().term, Term::Autumn);
    }

    #[test]
    fn test_overrides_win_over_detail_content() {
        let mut catalog = catalog(&["SE1", "PF", "OLD"]);
        let details = details(vec![
            ("SE1", detail(serde_json::json!({"durchfuehrungen": {"beginSemester": "HS", "endSemester": "HS"}}))),
            ("PF", detail(serde_json::json!({"nachfolger": {"kuerzel": "M_Wrong"}}))),
            ("OLD", detail(serde_json::json!({"zustand": "aktiv"}))),
        ]);
        let overrides = BTreeMap::from([
            ("SE1".to_string(), vec![FieldOverride::Term(Term::Spring)]),
            ("PF".to_string(), vec![FieldOverride::NoSuccessor, FieldOverride::Ects(3)]),
            ("OLD".to_string(), vec![FieldOverride::IsDeactivated(true)]),
            ("Missing".to_string(), vec![FieldOverride::Term(Term::Autumn)]),
        ]);

        enrich_catalog(&mut catalog, &details, CUTOFF);
        let applied = apply_overrides(&mut catalog, &overrides);

        assert_eq!(applied, 3);
        assert_eq!(catalog.get("SE1").unwrap().term, Term::Spring);
        assert_eq!(catalog.get("PF").unwrap().successor_module_id, None);
        assert_eq!(catalog.get("PF").unwrap().ects, 3);
        assert!(catalog.get("OLD").unwrap().is_deactivated);
        assert!(!catalog.contains("Missing"));
    }

    #[test]
    fn test_override_beats_reverse_link_inference() {
        let mut catalog = catalog(&["PF", "SEP1", "X"]);
        let details = details(vec![
            // X is processed after PF and would otherwise become PF's successor.
            ("X", detail(serde_json::json!({"vorgaenger": {"kuerzel": "M_PF"}}))),
        ]);
        let overrides = BTreeMap::from([(
            "PF".to_string(),
            vec![FieldOverride::SuccessorModuleId("SEP1".to_string())],
        )]);

        enrich_catalog(&mut catalog, &details, CUTOFF);
        assert_eq!(catalog.get("PF").unwrap().successor_module_id.as_deref(), Some("X"));

        apply_overrides(&mut catalog, &overrides);
        assert_eq!(catalog.get("PF").unwrap().successor_module_id.as_deref(), Some("SEP1"));
    }
}
