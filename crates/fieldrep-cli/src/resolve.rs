//! Working-area resolution.
//!
//! [`resolve_working_area`] accepts either a numeric id or a label. Labels
//! match case-insensitively, first exactly and then as a prefix. A prefix
//! that matches more than one area is rejected with the candidates listed.

use anyhow::{Result, bail};

use fieldrep_core::wizard::AreaRef;
use fieldrep_store::models::WorkingArea;

/// Find the area `reference` names among `areas`.
pub fn resolve_working_area<'a>(areas: &'a [WorkingArea], reference: &AreaRef) -> Result<&'a WorkingArea> {
    match reference {
        AreaRef::Id(id) => match areas.iter().find(|a| a.id == *id) {
            Some(area) => Ok(area),
            None => bail!("no working area with id {id}; run `fieldrep areas` to list them"),
        },
        AreaRef::Label(label) => resolve_label(areas, label),
    }
}

fn resolve_label<'a>(areas: &'a [WorkingArea], label: &str) -> Result<&'a WorkingArea> {
    let needle = label.trim().to_lowercase();
    if needle.is_empty() {
        bail!("working area must not be blank");
    }

    if let Some(area) = areas
        .iter()
        .find(|a| a.display_name().to_lowercase() == needle)
    {
        return Ok(area);
    }

    let matches: Vec<&WorkingArea> = areas
        .iter()
        .filter(|a| a.display_name().to_lowercase().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [] => bail!("no working area matches {label:?}; run `fieldrep areas` to list them"),
        [area] => Ok(area),
        many => {
            let names: Vec<String> = many
                .iter()
                .map(|a| format!("{} ({})", a.display_name(), a.id))
                .collect();
            bail!("{label:?} matches several working areas: {}", names.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(id: i64, label: &str) -> WorkingArea {
        WorkingArea {
            id,
            state: "Karnataka".to_string(),
            city: "Bengaluru".to_string(),
            district: "East".to_string(),
            label: label.to_string(),
        }
    }

    fn areas() -> Vec<WorkingArea> {
        vec![
            area(7, "Indiranagar"),
            area(8, "Koramangala"),
            area(9, "Koramangala 5th Block"),
            area(10, "HSR Layout"),
        ]
    }

    #[test]
    fn resolves_by_id() {
        let areas = areas();
        let found = resolve_working_area(&areas, &AreaRef::Id(10)).unwrap();
        assert_eq!(found.label, "HSR Layout");
    }

    #[test]
    fn unknown_id_is_an_error() {
        let err = resolve_working_area(&areas(), &AreaRef::Id(99)).unwrap_err();
        assert!(err.to_string().contains("no working area with id 99"));
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        let areas = areas();
        let found = resolve_working_area(&areas, &AreaRef::Label("indira".to_string())).unwrap();
        assert_eq!(found.id, 7);
    }

    #[test]
    fn exact_label_beats_longer_prefix_matches() {
        let areas = areas();
        let found = resolve_working_area(&areas, &AreaRef::Label("KORAMANGALA".to_string())).unwrap();
        assert_eq!(found.id, 8);
    }

    #[test]
    fn ambiguous_prefix_lists_candidates() {
        let err = resolve_working_area(&areas(), &AreaRef::Label("kora".to_string())).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Koramangala (8)"), "{msg}");
        assert!(msg.contains("Koramangala 5th Block (9)"), "{msg}");
    }

    #[test]
    fn unmatched_label_is_an_error() {
        let err = resolve_working_area(&areas(), &AreaRef::Label("Whitefield".to_string())).unwrap_err();
        assert!(err.to_string().contains("no working area matches"));
    }

    #[test]
    fn unlabelled_area_matches_on_city() {
        let areas = vec![area(3, "")];
        let found = resolve_working_area(&areas, &AreaRef::Label("bengaluru".to_string())).unwrap();
        assert_eq!(found.id, 3);
    }
}
