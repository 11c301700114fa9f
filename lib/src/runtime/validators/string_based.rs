use crate::model::ConstraintKind;
use crate::report::ValidationResult;
use crate::runtime::{Evaluator, FocusContext};
use oxigraph::model::Term;
use regex::Regex;
use std::collections::BTreeMap;

/// String form used by length and pattern checks. Blank nodes have none.
fn string_value(term: &Term) -> Option<&str> {
    match term {
        Term::NamedNode(nn) => Some(nn.as_str()),
        Term::Literal(lit) => Some(lit.value()),
        _ => None,
    }
}

pub(crate) fn length(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    kind: ConstraintKind,
    limit: u64,
) -> Vec<ValidationResult> {
    let is_min = kind == ConstraintKind::MinLength;
    let mut results = Vec::new();
    for vn in ctx.value_nodes {
        let message = match string_value(vn) {
            None => Some(format!(
                "Blank node {} found where string length constraints apply",
                vn
            )),
            Some(s) => {
                let len = s.chars().count() as u64;
                if is_min && len < limit {
                    Some(format!(
                        "Value {} has length {} which is less than minLength {}",
                        vn, len, limit
                    ))
                } else if !is_min && len > limit {
                    Some(format!(
                        "Value {} has length {} which is greater than maxLength {}",
                        vn, len, limit
                    ))
                } else {
                    None
                }
            }
        };
        if let Some(message) = message {
            results.push(ev.failure(ctx, kind, Some(vn.clone()), message));
        }
    }
    results
}

pub(crate) fn pattern(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    pattern: &str,
    flags: Option<&str>,
    regex: &Regex,
) -> Vec<ValidationResult> {
    ctx.value_nodes
        .iter()
        .filter(|vn| !string_value(vn).is_some_and(|s| regex.is_match(s)))
        .map(|vn| {
            let message = match flags {
                Some(flags) => format!(
                    "Value {} does not match pattern \"{}\" with flags \"{}\"",
                    vn, pattern, flags
                ),
                None => format!("Value {} does not match pattern \"{}\"", vn, pattern),
            };
            ev.failure(ctx, ConstraintKind::Pattern, Some(vn.clone()), message)
        })
        .collect()
}

/// Basic language range matching from RFC 4647, as in SPARQL `langMatches`.
fn lang_matches(tag: &str, range: &str) -> bool {
    if range == "*" {
        return !tag.is_empty();
    }
    let tag = tag.to_ascii_lowercase();
    let range = range.to_ascii_lowercase();
    tag == range
        || tag
            .strip_prefix(&range)
            .is_some_and(|rest| rest.starts_with('-'))
}

pub(crate) fn language_in(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    languages: &[String],
) -> Vec<ValidationResult> {
    ctx.value_nodes
        .iter()
        .filter(|vn| {
            let tag = match vn {
                Term::Literal(lit) => lit.language(),
                _ => None,
            };
            !tag.is_some_and(|tag| languages.iter().any(|range| lang_matches(tag, range)))
        })
        .map(|vn| {
            ev.failure(
                ctx,
                ConstraintKind::LanguageIn,
                Some(vn.clone()),
                format!(
                    "Value {} does not have a language tag in [{}]",
                    vn,
                    languages.join(", ")
                ),
            )
        })
        .collect()
}

/// One result per language tag used by more than one value node.
pub(crate) fn unique_lang(ev: &Evaluator<'_>, ctx: &FocusContext<'_>) -> Vec<ValidationResult> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for vn in ctx.value_nodes {
        if let Term::Literal(lit) = vn {
            if let Some(tag) = lit.language() {
                *counts.entry(tag.to_ascii_lowercase()).or_default() += 1;
            }
        }
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(tag, count)| {
            ev.failure(
                ctx,
                ConstraintKind::UniqueLang,
                None,
                format!("Language tag \"{}\" is used by {} values", tag, count),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::lang_matches;

    #[test]
    fn language_ranges() {
        assert!(lang_matches("en-US", "en"));
        assert!(lang_matches("EN", "en"));
        assert!(!lang_matches("english", "en"));
        assert!(lang_matches("fr", "*"));
    }
}
