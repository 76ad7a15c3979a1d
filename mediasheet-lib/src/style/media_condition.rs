//! Parsing of single media features and matching against media query lists.

use cssparser::{ParseError, Parser, ParserInput, ToCss, Token};
use serde::{Deserialize, Serialize};

/// A `feature: value` pair, both lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCondition {
    pub feature: String,
    pub value: String,
}

/// Parses `feature:value` or `(feature: value)`.
///
/// Returns `None` for anything that is not exactly one plain media feature.
pub fn parse_media_condition(condition: &str) -> Option<MediaCondition> {
    let trimmed = condition.trim();
    if trimmed.is_empty() {
        return None;
    }
    let wrapped = if trimmed.starts_with('(') {
        trimmed.to_string()
    } else {
        format!("({})", trimmed)
    };

    let mut input = ParserInput::new(&wrapped);
    let mut parser = Parser::new(&mut input);
    let parsed = parser
        .parse_entirely(|parser| {
            parser.expect_parenthesis_block()?;
            parser.parse_nested_block(|nested| {
                nested.parse_entirely(parse_plain_feature)
            })
        })
        .ok()?;
    Some(parsed)
}

fn parse_plain_feature<'i, 't>(
    parser: &mut Parser<'i, 't>,
) -> Result<MediaCondition, ParseError<'i, ()>> {
    let feature = parser.expect_ident()?.to_ascii_lowercase();
    parser.expect_colon()?;
    let value = parser.next()?.clone();
    let value = match value {
        Token::Number { .. } => {
            let numerator = value.to_css_string();
            if parser.is_exhausted() {
                numerator
            } else {
                parser.expect_delim('/')?;
                let denominator = parser.expect_number()?;
                format!("{}/{}", numerator, denominator)
            }
        }
        Token::Ident(_) | Token::Dimension { .. } | Token::Percentage { .. } => {
            value.to_css_string()
        }
        _ => return Err(parser.new_unexpected_token_error(value)),
    };
    // `parse_entirely` at the call site rejects trailing tokens.
    Ok(MediaCondition {
        feature,
        value: value.to_ascii_lowercase(),
    })
}

/// Features of one media query and whether it is negated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct QueryParts {
    negated: bool,
    features: Vec<MediaCondition>,
}

/// Splits a media query list into its queries.
///
/// Tokens that do not form a feature are skipped, so malformed queries end up
/// with no features and never match.
fn parse_media_query_list(media_text: &str) -> Vec<QueryParts> {
    let mut input = ParserInput::new(media_text);
    let mut parser = Parser::new(&mut input);
    let mut queries = vec![QueryParts::default()];

    loop {
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Comma => queries.push(QueryParts::default()),
            Token::Ident(ref ident) if ident.eq_ignore_ascii_case("not") => {
                if let Some(query) = queries.last_mut() {
                    query.negated = true;
                }
            }
            Token::ParenthesisBlock => {
                if let Some(query) = queries.last_mut() {
                    let _ = parser.parse_nested_block(|nested| {
                        collect_condition(nested, query);
                        Ok::<(), ParseError<'_, ()>>(())
                    });
                }
            }
            _ => {}
        }
    }

    queries
}

/// Walks a parenthesized condition, recording plain features and any `not`.
fn collect_condition(parser: &mut Parser<'_, '_>, query: &mut QueryParts) {
    if let Ok(feature) = parser.try_parse(|parser| parser.parse_entirely(parse_plain_feature)) {
        query.features.push(feature);
        return;
    }

    loop {
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Ident(ref ident) if ident.eq_ignore_ascii_case("not") => {
                query.negated = true;
            }
            Token::ParenthesisBlock => {
                let _ = parser.parse_nested_block(|nested| {
                    collect_condition(nested, query);
                    Ok::<(), ParseError<'_, ()>>(())
                });
            }
            _ => {}
        }
    }
}

/// True if a non-negated query in `media_text` contains `feature: value`.
///
/// Comparison ignores ASCII case. Negated queries never count, even when the
/// literal pair appears in them.
pub fn media_query_matches_value(media_text: &str, feature: &str, value: &str) -> bool {
    parse_media_query_list(media_text)
        .iter()
        .filter(|query| !query.negated)
        .any(|query| {
            query.features.iter().any(|candidate| {
                candidate.feature.eq_ignore_ascii_case(feature)
                    && candidate.value.eq_ignore_ascii_case(value)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(feature: &str, value: &str) -> Option<MediaCondition> {
        Some(MediaCondition {
            feature: feature.to_string(),
            value: value.to_string(),
        })
    }

    #[test]
    fn test_parse_bare_and_wrapped() {
        assert_eq!(
            parse_media_condition("orientation:portrait"),
            condition("orientation", "portrait")
        );
        assert_eq!(
            parse_media_condition("( hover : none )"),
            condition("hover", "none")
        );
        assert_eq!(
            parse_media_condition("Prefers-Color-Scheme:DARK"),
            condition("prefers-color-scheme", "dark")
        );
        assert_eq!(
            parse_media_condition("min-width: 768px"),
            condition("min-width", "768px")
        );
        assert_eq!(
            parse_media_condition("aspect-ratio: 16/9"),
            condition("aspect-ratio", "16/9")
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_media_condition(""), None);
        assert_eq!(parse_media_condition("   "), None);
        assert_eq!(parse_media_condition("invalid"), None);
        assert_eq!(parse_media_condition("orientation:"), None);
        assert_eq!(parse_media_condition(":portrait"), None);
        assert_eq!(parse_media_condition("(orientation: portrait) and (hover: none)"), None);
        assert_eq!(parse_media_condition("orientation: portrait landscape"), None);
        assert_eq!(parse_media_condition("min-width: 768px 1024px"), None);
        assert_eq!(parse_media_condition("aspect-ratio: 16/"), None);
        assert_eq!(parse_media_condition("aspect-ratio: 16/9/3"), None);
    }

    #[test]
    fn test_matches_plain_query() {
        assert!(media_query_matches_value(
            "(prefers-color-scheme: dark)",
            "prefers-color-scheme",
            "dark"
        ));
        assert!(media_query_matches_value(
            "screen and (PREFERS-COLOR-SCHEME: Dark)",
            "prefers-color-scheme",
            "dark"
        ));
        assert!(!media_query_matches_value(
            "(prefers-color-scheme: light)",
            "prefers-color-scheme",
            "dark"
        ));
    }

    #[test]
    fn test_any_query_in_list_matches() {
        assert!(media_query_matches_value(
            "print, (orientation: landscape) and (hover: hover)",
            "hover",
            "hover"
        ));
    }

    #[test]
    fn test_negated_queries_never_match() {
        assert!(!media_query_matches_value(
            "not all and (prefers-color-scheme: dark)",
            "prefers-color-scheme",
            "dark"
        ));
        assert!(!media_query_matches_value(
            "(not (prefers-color-scheme: dark))",
            "prefers-color-scheme",
            "dark"
        ));
        assert!(media_query_matches_value(
            "not print, (prefers-color-scheme: dark)",
            "prefers-color-scheme",
            "dark"
        ));
    }

    #[test]
    fn test_garbage_media_text() {
        assert!(!media_query_matches_value("", "hover", "none"));
        assert!(!media_query_matches_value("((((", "hover", "none"));
    }
}
