// A fully-owned CSS stylesheet model: a walkable rule tree whose media rules
// can be rewritten in place.
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::{style::StyleRule, CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use lightningcss::targets::{Features, Targets};
use lightningcss::traits::ToCss;
use std::fmt;
use thiserror::Error;

/// Where a stylesheet was loaded from. Cross-origin sheets cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetOrigin {
    SameOrigin,
    CrossOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleSheetError {
    #[error("failed to parse stylesheet: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SheetAccessError {
    #[error("cannot access rules of a cross-origin stylesheet")]
    CrossOrigin,
}

#[derive(Debug, Clone)]
pub struct OwnedStylesheet {
    pub origin: SheetOrigin,
    rules: Vec<OwnedRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Supports,
    Layer,
    Container,
}

impl GroupKind {
    fn at_keyword(self) -> &'static str {
        match self {
            GroupKind::Supports => "@supports",
            GroupKind::Layer => "@layer",
            GroupKind::Container => "@container",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OwnedRule {
    Style {
        /// e.g. "div", ".s0", "#header"
        selectors: Vec<String>,
        declarations: Vec<OwnedDeclaration>,
    },
    Media {
        media_text: String,
        rules: Vec<OwnedRule>,
    },
    /// `@supports`, `@layer` and `@container` blocks.
    Group {
        kind: GroupKind,
        prelude: String,
        rules: Vec<OwnedRule>,
    },
    Other {
        css_text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedDeclaration {
    pub property: String,
    pub value: String,
}

impl OwnedRule {
    /// Nested rules of grouping rules; empty for everything else.
    pub fn children(&self) -> &[OwnedRule] {
        match self {
            OwnedRule::Media { rules, .. } | OwnedRule::Group { rules, .. } => rules,
            OwnedRule::Style { .. } | OwnedRule::Other { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<OwnedRule>> {
        match self {
            OwnedRule::Media { rules, .. } | OwnedRule::Group { rules, .. } => Some(rules),
            OwnedRule::Style { .. } | OwnedRule::Other { .. } => None,
        }
    }

    pub fn media_text(&self) -> Option<&str> {
        match self {
            OwnedRule::Media { media_text, .. } => Some(media_text),
            _ => None,
        }
    }

    /// Replaces the media text of a media rule and returns the old text.
    pub fn set_media_text(&mut self, text: &str) -> Option<String> {
        match self {
            OwnedRule::Media { media_text, .. } => {
                Some(std::mem::replace(media_text, text.to_string()))
            }
            _ => None,
        }
    }

    fn write_css(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            OwnedRule::Style {
                selectors,
                declarations,
            } => {
                let body = declarations
                    .iter()
                    .map(|decl| format!("{}: {}", decl.property, decl.value))
                    .collect::<Vec<_>>()
                    .join("; ");
                out.push_str(&format!("{}{} {{ {} }}\n", indent, selectors.join(", "), body));
            }
            OwnedRule::Media { media_text, rules } => {
                write_block(out, &indent, &format!("@media {}", media_text), rules, depth);
            }
            OwnedRule::Group {
                kind,
                prelude,
                rules,
            } => {
                let header = if prelude.is_empty() {
                    kind.at_keyword().to_string()
                } else {
                    format!("{} {}", kind.at_keyword(), prelude)
                };
                write_block(out, &indent, &header, rules, depth);
            }
            OwnedRule::Other { css_text } => {
                out.push_str(&format!("{}{}\n", indent, css_text));
            }
        }
    }
}

fn write_block(out: &mut String, indent: &str, header: &str, rules: &[OwnedRule], depth: usize) {
    out.push_str(&format!("{}{} {{\n", indent, header));
    for rule in rules {
        rule.write_css(out, depth + 1);
    }
    out.push_str(&format!("{}}}\n", indent));
}

impl fmt::Display for OwnedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_css(&mut out, 0);
        f.write_str(out.trim_end())
    }
}

impl OwnedStylesheet {
    pub fn new(origin: SheetOrigin, rules: Vec<OwnedRule>) -> Self {
        OwnedStylesheet { origin, rules }
    }

    /// Parse a raw CSS string (LightningCSS) and convert it to a fully-owned stylesheet.
    pub fn parse(css_text: &str, origin: SheetOrigin) -> Result<Self, StyleSheetError> {
        let sheet = LightningStyleSheet::parse(css_text, ParserOptions::default())
            .map_err(|e| StyleSheetError::Parse(e.to_string()))?;
        Ok(OwnedStylesheet {
            origin,
            rules: convert_rules(&sheet.rules),
        })
    }

    pub fn rules(&self) -> Result<&[OwnedRule], SheetAccessError> {
        match self.origin {
            SheetOrigin::SameOrigin => Ok(&self.rules),
            SheetOrigin::CrossOrigin => Err(SheetAccessError::CrossOrigin),
        }
    }

    pub fn rules_mut(&mut self) -> Result<&mut Vec<OwnedRule>, SheetAccessError> {
        match self.origin {
            SheetOrigin::SameOrigin => Ok(&mut self.rules),
            SheetOrigin::CrossOrigin => Err(SheetAccessError::CrossOrigin),
        }
    }

    /// Follows child indexes from the top level down to one rule.
    pub fn rule_at_mut(
        &mut self,
        path: &[usize],
    ) -> Result<Option<&mut OwnedRule>, SheetAccessError> {
        let rules = self.rules_mut()?;
        let Some((first, rest)) = path.split_first() else {
            return Ok(None);
        };
        let mut current = rules.get_mut(*first);
        for index in rest {
            current = current
                .and_then(|rule| rule.children_mut())
                .and_then(|rules| rules.get_mut(*index));
        }
        Ok(current)
    }

    pub fn to_css(&self) -> Result<String, SheetAccessError> {
        let mut out = String::new();
        for rule in self.rules()? {
            rule.write_css(&mut out, 0);
        }
        Ok(out)
    }
}

/// Media text printed with `min-`/`max-` prefixes instead of range syntax.
fn media_printer_options() -> PrinterOptions<'static> {
    PrinterOptions {
        targets: Targets {
            include: Features::MediaRangeSyntax,
            ..Targets::default()
        },
        ..PrinterOptions::default()
    }
}

fn convert_rules(list: &CssRuleList<'_>) -> Vec<OwnedRule> {
    let mut owned_rules = Vec::new();
    for rule in &list.0 {
        let owned = match rule {
            CssRule::Style(style_rule) => convert_style_rule(style_rule),
            CssRule::Media(media_rule) => OwnedRule::Media {
                media_text: media_rule
                    .query
                    .to_css_string(media_printer_options())
                    .unwrap_or_else(|_| "not all".to_string()),
                rules: convert_rules(&media_rule.rules),
            },
            CssRule::Supports(supports_rule) => OwnedRule::Group {
                kind: GroupKind::Supports,
                prelude: group_prelude(rule, GroupKind::Supports),
                rules: convert_rules(&supports_rule.rules),
            },
            CssRule::LayerBlock(layer_rule) => OwnedRule::Group {
                kind: GroupKind::Layer,
                prelude: group_prelude(rule, GroupKind::Layer),
                rules: convert_rules(&layer_rule.rules),
            },
            CssRule::Container(container_rule) => OwnedRule::Group {
                kind: GroupKind::Container,
                prelude: group_prelude(rule, GroupKind::Container),
                rules: convert_rules(&container_rule.rules),
            },
            other => match other.to_css_string(PrinterOptions::default()) {
                Ok(css_text) if !css_text.trim().is_empty() => OwnedRule::Other {
                    css_text: css_text.trim().to_string(),
                },
                _ => continue,
            },
        };
        owned_rules.push(owned);
    }
    owned_rules
}

/// The text between the at-keyword and the opening brace of a grouping rule.
fn group_prelude(rule: &CssRule<'_>, kind: GroupKind) -> String {
    let printed = match rule.to_css_string(PrinterOptions::default()) {
        Ok(printed) => printed,
        Err(_) => return String::new(),
    };
    let header = printed.split('{').next().unwrap_or_default();
    header
        .trim()
        .trim_start_matches(kind.at_keyword())
        .trim()
        .to_string()
}

/// Helper to copy a single StyleRule's selectors + declarations into an OwnedRule.
fn convert_style_rule(style_rule: &StyleRule<'_>) -> OwnedRule {
    let mut selectors = Vec::new();
    for selector in &style_rule.selectors.0 {
        if let Ok(sel_str) = selector.to_css_string(PrinterOptions::default()) {
            selectors.push(sel_str);
        }
    }

    let block = &style_rule.declarations;
    let mut declarations = Vec::new();
    for property in block
        .declarations
        .iter()
        .chain(block.important_declarations.iter())
    {
        let Ok(value) = property.value_to_css_string(PrinterOptions::default()) else {
            continue;
        };
        declarations.push(OwnedDeclaration {
            property: property.property_id().name().to_string(),
            value,
        });
    }

    OwnedRule::Style {
        selectors,
        declarations,
    }
}

/// Every stylesheet of one document, in document order.
#[derive(Debug, Clone, Default)]
pub struct StyleDocument {
    pub sheets: Vec<OwnedStylesheet>,
}

impl StyleDocument {
    pub fn new() -> Self {
        StyleDocument { sheets: Vec::new() }
    }

    pub fn push(&mut self, sheet: OwnedStylesheet) -> usize {
        self.sheets.push(sheet);
        self.sheets.len() - 1
    }

    /// Parses `css_text` and appends it as a same-origin sheet.
    pub fn add_css(&mut self, css_text: &str) -> Result<usize, StyleSheetError> {
        let sheet = OwnedStylesheet::parse(css_text, SheetOrigin::SameOrigin)?;
        Ok(self.push(sheet))
    }
}
