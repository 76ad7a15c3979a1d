//! Previews a media condition by rewriting matching `@media` rules of a
//! [`StyleDocument`] to `all` or `not all`.
//!
//! Every rewritten rule is remembered with its original text and restored
//! before the next condition is applied.

use crate::style::media_condition::{
    media_query_matches_value, parse_media_condition, MediaCondition,
};
use crate::style::owned_css::{OwnedRule, StyleDocument};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ModifiedRule {
    sheet: usize,
    path: Vec<usize>,
    original_media_text: String,
}

#[derive(Debug, Default)]
pub struct MediaSimulator {
    modified: Vec<ModifiedRule>,
    active: Option<MediaCondition>,
}

impl MediaSimulator {
    pub fn new() -> Self {
        MediaSimulator::default()
    }

    /// The condition currently applied, if any.
    pub fn active_condition(&self) -> Option<&MediaCondition> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        !self.modified.is_empty()
    }

    /// Restores previous changes, then simulates `condition`.
    ///
    /// `None` or a condition that does not parse only restores.
    pub fn simulate(&mut self, document: &mut StyleDocument, condition: Option<&str>) {
        self.restore(document);

        let Some(condition) = condition else {
            return;
        };
        let Some(parsed) = parse_media_condition(condition) else {
            log::warn!("cannot simulate media condition '{}'", condition);
            return;
        };

        for (sheet_index, sheet) in document.sheets.iter_mut().enumerate() {
            let rules = match sheet.rules_mut() {
                Ok(rules) => rules,
                Err(error) => {
                    log::debug!("skipping stylesheet {}: {}", sheet_index, error);
                    continue;
                }
            };
            let mut path = Vec::new();
            rewrite_rules(rules, &parsed, sheet_index, &mut path, &mut self.modified);
        }

        log::debug!(
            "simulating {}: {} and rewrote {} media rules",
            parsed.feature,
            parsed.value,
            self.modified.len()
        );
        self.active = Some(parsed);
    }

    /// Puts every rewritten rule back to its original media text.
    pub fn restore(&mut self, document: &mut StyleDocument) {
        for modified in self.modified.drain(..).rev() {
            let Some(sheet) = document.sheets.get_mut(modified.sheet) else {
                continue;
            };
            match sheet.rule_at_mut(&modified.path) {
                Ok(Some(rule)) => {
                    rule.set_media_text(&modified.original_media_text);
                }
                Ok(None) => log::warn!(
                    "media rule at {:?} in stylesheet {} is gone",
                    modified.path,
                    modified.sheet
                ),
                Err(error) => {
                    log::debug!("cannot restore stylesheet {}: {}", modified.sheet, error)
                }
            }
        }
        self.active = None;
    }
}

fn rewrite_rules(
    rules: &mut [OwnedRule],
    condition: &MediaCondition,
    sheet: usize,
    path: &mut Vec<usize>,
    modified: &mut Vec<ModifiedRule>,
) {
    for (index, rule) in rules.iter_mut().enumerate() {
        path.push(index);

        let replacement: Option<&'static str> = rule.media_text().and_then(|media_text| {
            if !media_text.to_ascii_lowercase().contains(&condition.feature) {
                return None;
            }
            let matches =
                media_query_matches_value(media_text, &condition.feature, &condition.value);
            Some(if matches { "all" } else { "not all" })
        });
        if let Some(replacement) = replacement {
            if let Some(original_media_text) = rule.set_media_text(replacement) {
                modified.push(ModifiedRule {
                    sheet,
                    path: path.clone(),
                    original_media_text,
                });
            }
        }

        if let Some(children) = rule.children_mut() {
            rewrite_rules(children, condition, sheet, path, modified);
        }
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::owned_css::{OwnedStylesheet, SheetOrigin};
    use pretty_assertions::assert_eq;

    const SHEET: &str = r#"
        .s0 { color: black; }
        @media (prefers-color-scheme: dark) {
            .s1 { color: white; }
        }
        @media (prefers-color-scheme: light) {
            .s2 { color: black; }
        }
        @supports (display: grid) {
            @media (min-width: 768px) and (prefers-color-scheme: dark) {
                .s3 { display: grid; }
            }
        }
        @media (orientation: portrait) {
            .s4 { width: 100%; }
        }
    "#;

    fn media_texts(document: &StyleDocument) -> Vec<String> {
        fn collect(rules: &[OwnedRule], out: &mut Vec<String>) {
            for rule in rules {
                if let Some(text) = rule.media_text() {
                    out.push(text.to_string());
                }
                collect(rule.children(), out);
            }
        }
        let mut out = Vec::new();
        for sheet in &document.sheets {
            if let Ok(rules) = sheet.rules() {
                collect(rules, &mut out);
            }
        }
        out
    }

    fn document() -> StyleDocument {
        let mut document = StyleDocument::new();
        document.add_css(SHEET).unwrap();
        document
    }

    #[test]
    fn test_simulate_rewrites_matching_feature() {
        let mut document = document();
        let mut simulator = MediaSimulator::new();
        simulator.simulate(&mut document, Some("prefers-color-scheme:dark"));

        assert_eq!(
            media_texts(&document),
            vec!["all", "not all", "all", "(orientation: portrait)"]
        );
        assert!(simulator.is_active());
        assert_eq!(
            simulator.active_condition().map(|c| c.value.as_str()),
            Some("dark")
        );
    }

    #[test]
    fn test_restore_round_trip() {
        let mut document = document();
        let before = media_texts(&document);
        let mut simulator = MediaSimulator::new();

        simulator.simulate(&mut document, Some("prefers-color-scheme:light"));
        assert_ne!(media_texts(&document), before);

        simulator.simulate(&mut document, None);
        assert_eq!(media_texts(&document), before);
        assert!(!simulator.is_active());
        assert!(simulator.active_condition().is_none());
    }

    #[test]
    fn test_switching_conditions_does_not_leak() {
        let mut document = document();
        let mut simulator = MediaSimulator::new();
        simulator.simulate(&mut document, Some("prefers-color-scheme:dark"));
        simulator.simulate(&mut document, Some("orientation:landscape"));

        assert_eq!(
            media_texts(&document),
            vec![
                "(prefers-color-scheme: dark)",
                "(prefers-color-scheme: light)",
                "(min-width: 768px) and (prefers-color-scheme: dark)",
                "not all",
            ]
        );
    }

    #[test]
    fn test_invalid_condition_only_restores() {
        let mut document = document();
        let before = media_texts(&document);
        let mut simulator = MediaSimulator::new();
        simulator.simulate(&mut document, Some("prefers-color-scheme:dark"));
        simulator.simulate(&mut document, Some("garbage"));
        assert_eq!(media_texts(&document), before);
        assert!(!simulator.is_active());
    }

    #[test]
    fn test_cross_origin_sheets_are_skipped() {
        let mut document = StyleDocument::new();
        document.push(OwnedStylesheet::parse(SHEET, SheetOrigin::CrossOrigin).unwrap());
        document.add_css(SHEET).unwrap();

        let mut simulator = MediaSimulator::new();
        simulator.simulate(&mut document, Some("orientation:portrait"));

        let foreign = document.sheets[0].clone();
        assert!(foreign.rules().is_err());
        assert_eq!(
            media_texts(&document),
            vec![
                "(prefers-color-scheme: dark)",
                "(prefers-color-scheme: light)",
                "(min-width: 768px) and (prefers-color-scheme: dark)",
                "all",
            ]
        );
    }
}
