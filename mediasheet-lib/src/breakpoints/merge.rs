//! Maps breakpoints of an imported fragment onto a project's breakpoints.

use std::collections::HashMap;

use super::Breakpoint;

/// Two breakpoints describe the same media when their widths and condition
/// agree. Labels and ids are not compared.
pub fn equal_media(a: &Breakpoint, b: &Breakpoint) -> bool {
    a.min_width == b.min_width
        && a.max_width == b.max_width
        && a.trimmed_condition() == b.trimmed_condition()
}

/// Maps each fragment breakpoint id to the first existing breakpoint with
/// equal media. Fragment breakpoints without a match are left out.
pub fn build_merged_breakpoint_ids(
    fragment: &[Breakpoint],
    existing: &[Breakpoint],
) -> HashMap<String, String> {
    let mut merged_ids = HashMap::new();
    for fragment_breakpoint in fragment {
        if let Some(matched) = existing
            .iter()
            .find(|existing_breakpoint| equal_media(fragment_breakpoint, existing_breakpoint))
        {
            merged_ids.insert(fragment_breakpoint.id.clone(), matched.id.clone());
        }
    }
    merged_ids
}

/// Result of folding a fragment's breakpoints into a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Fragment id to project id, for every fragment breakpoint.
    pub id_map: HashMap<String, String>,
    /// Fragment breakpoints that had no match, re-keyed with fresh ids.
    pub added: Vec<Breakpoint>,
}

/// Reuses matching project breakpoints and creates the rest under ids from
/// `new_id`.
pub fn merge_breakpoints<F>(
    fragment: &[Breakpoint],
    existing: &[Breakpoint],
    mut new_id: F,
) -> MergeOutcome
where
    F: FnMut() -> String,
{
    let mut outcome = MergeOutcome {
        id_map: build_merged_breakpoint_ids(fragment, existing),
        added: Vec::new(),
    };

    for fragment_breakpoint in fragment {
        if outcome.id_map.contains_key(&fragment_breakpoint.id) {
            continue;
        }
        // Two unmatched fragment breakpoints with equal media share one copy.
        if let Some(added) = outcome
            .added
            .iter()
            .find(|added| equal_media(added, fragment_breakpoint))
        {
            let added_id = added.id.clone();
            outcome
                .id_map
                .insert(fragment_breakpoint.id.clone(), added_id);
            continue;
        }
        let created = Breakpoint {
            id: new_id(),
            ..fragment_breakpoint.clone()
        };
        log::debug!(
            "fragment breakpoint {} has no match, created {}",
            fragment_breakpoint.id,
            created.id
        );
        outcome
            .id_map
            .insert(fragment_breakpoint.id.clone(), created.id.clone());
        outcome.added.push(created);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_label_is_not_part_of_equality() {
        let fragment = vec![Breakpoint::min("f-tablet", "Tablet", 768)];
        let existing = vec![
            Breakpoint::base("base", "Base"),
            Breakpoint::min("tablet", "Medium screens", 768),
        ];
        let merged = build_merged_breakpoint_ids(&fragment, &existing);
        assert_eq!(merged.get("f-tablet").map(String::as_str), Some("tablet"));
    }

    #[test]
    fn test_no_overlap_is_empty() {
        let fragment = vec![
            Breakpoint::min("f1", "Wide", 1440),
            Breakpoint::max("f2", "Small", 320),
        ];
        let existing = vec![
            Breakpoint::min("e1", "Desktop", 1280),
            Breakpoint::max("e2", "Mobile", 479),
        ];
        assert!(build_merged_breakpoint_ids(&fragment, &existing).is_empty());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let fragment = vec![Breakpoint::max("f", "Mobile", 479)];
        let existing = vec![
            Breakpoint::max("first", "Mobile", 479),
            Breakpoint::max("second", "Mobile again", 479),
        ];
        let merged = build_merged_breakpoint_ids(&fragment, &existing);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged["f"], "first");
    }

    #[test]
    fn test_base_and_condition_matching() {
        let fragment = vec![
            Breakpoint::base("f-base", "Base"),
            Breakpoint::custom("f-dark", "Dark", "prefers-color-scheme:dark"),
            Breakpoint::custom("f-light", "Light", "prefers-color-scheme:light"),
        ];
        let existing = vec![
            Breakpoint::custom("dark", "Dark mode", " prefers-color-scheme:dark"),
            Breakpoint::base("base", "Base"),
        ];
        let merged = build_merged_breakpoint_ids(&fragment, &existing);
        assert_eq!(merged.get("f-base").map(String::as_str), Some("base"));
        assert_eq!(merged.get("f-dark").map(String::as_str), Some("dark"));
        assert_eq!(merged.get("f-light"), None);
    }

    #[test]
    fn test_merge_creates_missing_breakpoints() {
        let fragment = vec![
            Breakpoint::base("f-base", "Base"),
            Breakpoint::min("f-wide", "Wide", 1920),
            Breakpoint::min("f-wide-2", "Wide copy", 1920),
        ];
        let existing = vec![Breakpoint::base("base", "Base")];

        let mut counter = 0;
        let outcome = merge_breakpoints(&fragment, &existing, || {
            counter += 1;
            format!("new-{}", counter)
        });

        assert_eq!(outcome.added, vec![Breakpoint::min("new-1", "Wide", 1920)]);
        assert_eq!(outcome.id_map["f-base"], "base");
        assert_eq!(outcome.id_map["f-wide"], "new-1");
        assert_eq!(outcome.id_map["f-wide-2"], "new-1");
    }
}
