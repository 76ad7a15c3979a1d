//! Generates class-scoped CSS rules grouped into one `@media` block per
//! breakpoint.
//!
//! An engine is a single render pass: breakpoints are registered first, then
//! rules are appended to them. Class names come from a counter owned by the
//! engine, so independent engines never share state.

use std::collections::HashMap;
use thiserror::Error;

use crate::breakpoints::{media_text, Breakpoint};
use crate::style::owned_css::{OwnedStylesheet, SheetOrigin, StyleDocument, StyleSheetError};
use crate::style::value::{serialize_style, Style};

/// Id of the `<style>` element written when constructable sheets are
/// unavailable.
pub const STYLE_ELEMENT_ID: &str = "mediasheet-styles";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Unknown breakpoint: {0}")]
    UnknownBreakpoint(String),
}

/// The class name and rule text produced by [`CssEngine::add_rule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHandle {
    pub class_name: String,
    pub css_text: String,
}

#[derive(Debug, Clone)]
struct MediaRule {
    breakpoint_id: String,
    media_text: String,
    rules: Vec<RuleHandle>,
}

impl MediaRule {
    fn css_text(&self) -> Option<String> {
        if self.rules.is_empty() {
            return None;
        }
        let body = self
            .rules
            .iter()
            .map(|rule| format!("  {}", rule.css_text))
            .collect::<Vec<_>>()
            .join("\n");
        Some(format!("@media {} {{\n{}\n}}", self.media_text, body))
    }
}

/// Somewhere the generated CSS can be mounted.
pub trait StyleHost {
    /// Whether the host can adopt a constructed stylesheet directly.
    fn supports_constructable_sheets(&self) -> bool;

    /// Replaces the host's adopted sheet with `css_text`.
    fn adopt_sheet(&mut self, css_text: &str);

    /// Creates or updates a `<style>` element's text.
    fn write_style_element(&mut self, element_id: &str, css_text: &str);
}

#[derive(Debug, Default)]
pub struct CssEngine {
    media_rules: Vec<MediaRule>,
    index_by_breakpoint: HashMap<String, usize>,
    next_id: u64,
}

impl CssEngine {
    pub fn new() -> Self {
        CssEngine::default()
    }

    /// Registers an empty media rule for `breakpoint`.
    ///
    /// Registering the same id twice keeps the first registration.
    pub fn add_breakpoint(&mut self, breakpoint: &Breakpoint) {
        if self.index_by_breakpoint.contains_key(&breakpoint.id) {
            log::debug!("breakpoint {} already registered", breakpoint.id);
            return;
        }
        self.index_by_breakpoint
            .insert(breakpoint.id.clone(), self.media_rules.len());
        self.media_rules.push(MediaRule {
            breakpoint_id: breakpoint.id.clone(),
            media_text: media_text(breakpoint),
            rules: Vec::new(),
        });
    }

    pub fn has_breakpoint(&self, breakpoint_id: &str) -> bool {
        self.index_by_breakpoint.contains_key(breakpoint_id)
    }

    /// Breakpoint ids in registration order.
    pub fn breakpoint_ids(&self) -> impl Iterator<Item = &str> {
        self.media_rules
            .iter()
            .map(|media_rule| media_rule.breakpoint_id.as_str())
    }

    pub fn add_rule(
        &mut self,
        style: &Style,
        breakpoint_id: &str,
    ) -> Result<RuleHandle, EngineError> {
        self.push_rule(style, breakpoint_id, None)
    }

    /// Like [`CssEngine::add_rule`], with a pseudo-class or pseudo-element
    /// appended to the selector, e.g. `:hover`.
    pub fn add_rule_with_state(
        &mut self,
        style: &Style,
        breakpoint_id: &str,
        state: &str,
    ) -> Result<RuleHandle, EngineError> {
        self.push_rule(style, breakpoint_id, Some(state))
    }

    fn push_rule(
        &mut self,
        style: &Style,
        breakpoint_id: &str,
        state: Option<&str>,
    ) -> Result<RuleHandle, EngineError> {
        let index = *self
            .index_by_breakpoint
            .get(breakpoint_id)
            .ok_or_else(|| EngineError::UnknownBreakpoint(breakpoint_id.to_string()))?;

        let class_name = format!("s{}", self.next_id);
        self.next_id += 1;

        let selector = match state {
            Some(state) => format!(".{}{}", class_name, state),
            None => format!(".{}", class_name),
        };
        let handle = RuleHandle {
            css_text: format!("{} {{ {} }}", selector, serialize_style(style)),
            class_name,
        };
        self.media_rules[index].rules.push(handle.clone());
        Ok(handle)
    }

    /// All non-empty media blocks in registration order.
    pub fn css_text(&self) -> String {
        self.media_rules
            .iter()
            .filter_map(MediaRule::css_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Drops breakpoints and rules. Class names keep counting up.
    pub fn clear(&mut self) {
        self.media_rules.clear();
        self.index_by_breakpoint.clear();
    }

    /// Writes the current CSS into `host`, adopting a constructed sheet when
    /// the host supports it.
    pub fn mount(&self, host: &mut dyn StyleHost) {
        let css_text = self.css_text();
        if host.supports_constructable_sheets() {
            host.adopt_sheet(&css_text);
        } else {
            host.write_style_element(STYLE_ELEMENT_ID, &css_text);
        }
    }
}

/// Collects mounted CSS as plain text, for server rendering.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StringHost {
    pub css_text: String,
}

impl StyleHost for StringHost {
    fn supports_constructable_sheets(&self) -> bool {
        false
    }

    fn adopt_sheet(&mut self, css_text: &str) {
        self.css_text = css_text.to_string();
    }

    fn write_style_element(&mut self, _element_id: &str, css_text: &str) {
        self.css_text = css_text.to_string();
    }
}

/// A [`StyleDocument`] that remembers which of its sheets holds the
/// engine's output.
#[derive(Debug, Default)]
pub struct DocumentHost {
    pub document: StyleDocument,
    mounted_sheet: Option<usize>,
    last_error: Option<StyleSheetError>,
}

impl DocumentHost {
    pub fn new(document: StyleDocument) -> Self {
        DocumentHost {
            document,
            mounted_sheet: None,
            last_error: None,
        }
    }

    /// Parse failure from the last mount, if any. Mounting never fails; a
    /// sheet that cannot be parsed leaves the previous one in place.
    pub fn last_error(&self) -> Option<&StyleSheetError> {
        self.last_error.as_ref()
    }

    fn replace_sheet(&mut self, css_text: &str) {
        let sheet = match OwnedStylesheet::parse(css_text, SheetOrigin::SameOrigin) {
            Ok(sheet) => sheet,
            Err(error) => {
                log::warn!("generated CSS was not mounted: {}", error);
                self.last_error = Some(error);
                return;
            }
        };
        self.last_error = None;
        match self.mounted_sheet {
            Some(index) if index < self.document.sheets.len() => {
                self.document.sheets[index] = sheet;
            }
            _ => self.mounted_sheet = Some(self.document.push(sheet)),
        }
    }
}

impl StyleHost for DocumentHost {
    fn supports_constructable_sheets(&self) -> bool {
        true
    }

    fn adopt_sheet(&mut self, css_text: &str) {
        self.replace_sheet(css_text);
    }

    fn write_style_element(&mut self, _element_id: &str, css_text: &str) {
        self.replace_sheet(css_text);
    }
}
