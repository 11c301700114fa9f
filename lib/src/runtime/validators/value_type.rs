use crate::error::BackendError;
use crate::model::ConstraintKind;
use crate::report::ValidationResult;
use crate::runtime::{Evaluator, FocusContext};
use crate::types::NodeKind;
use oxigraph::model::vocab::{rdf, xsd};
use oxigraph::model::{NamedNode, NamedNodeRef, Term};
use oxsdatatypes::{
    Boolean, Date, DateTime, DayTimeDuration, Double, Duration, Float, GDay, GMonth, GMonthDay,
    GYear, GYearMonth, Time, YearMonthDuration,
};
use std::cmp::Ordering;
use std::str::FromStr;

pub(crate) fn class(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    class: &Term,
) -> Result<Vec<ValidationResult>, BackendError> {
    let index = ev.class_index()?;
    Ok(ctx
        .value_nodes
        .iter()
        .filter(|vn| !index.is_instance_of(vn, class))
        .map(|vn| {
            ev.failure(
                ctx,
                ConstraintKind::Class,
                Some(vn.clone()),
                format!("Value {} is not an instance of class {}", vn, class),
            )
        })
        .collect())
}

pub(crate) fn datatype(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    datatype: &NamedNode,
) -> Vec<ValidationResult> {
    let target = datatype.as_ref();
    let mut results = Vec::new();
    for vn in ctx.value_nodes {
        let problem = match vn {
            Term::Literal(lit) if target == rdf::LANG_STRING => {
                lit.language().is_none().then(|| {
                    format!("Value {} is not a language-tagged string", vn)
                })
            }
            Term::Literal(lit) => {
                let actual = lit.datatype();
                // xsd:integer literals are accepted where xsd:decimal is expected
                let matches =
                    actual == target || (target == xsd::DECIMAL && actual == xsd::INTEGER);
                if !matches {
                    Some(format!("Value {} does not have datatype {}", vn, datatype))
                } else if !is_valid_lexical_form(lit.value(), target) {
                    Some(format!(
                        "Value {} has an invalid lexical form for datatype {}",
                        vn, datatype
                    ))
                } else {
                    None
                }
            }
            _ => Some(format!(
                "Value {} is not a literal, expected datatype {}",
                vn, datatype
            )),
        };
        if let Some(message) = problem {
            results.push(ev.failure(ctx, ConstraintKind::Datatype, Some(vn.clone()), message));
        }
    }
    results
}

pub(crate) fn node_kind(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    kind: NodeKind,
) -> Vec<ValidationResult> {
    ctx.value_nodes
        .iter()
        .filter(|vn| !kind.matches(vn))
        .map(|vn| {
            ev.failure(
                ctx,
                ConstraintKind::NodeKind,
                Some(vn.clone()),
                format!("Value {} does not have node kind {}", vn, kind),
            )
        })
        .collect()
}

fn trim_leading_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}

/// Sign and digits of an `xsd:integer` lexical form. Arbitrary size.
fn parse_integer(input: &str) -> Option<(bool, &str)> {
    let (negative, digits) = match input.as_bytes().first() {
        Some(b'+') => (false, &input[1..]),
        Some(b'-') => (true, &input[1..]),
        _ => (false, input),
    };
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let digits = trim_leading_zeros(digits);
    Some((negative && digits != "0", digits))
}

fn at_most(digits: &str, bound: &str) -> bool {
    digits.len().cmp(&bound.len()).then_with(|| digits.cmp(bound)) != Ordering::Greater
}

/// `min_abs` bounds negative values, `max` bounds the rest. `None` forbids negatives.
fn integer_within(input: &str, min_abs: Option<&str>, max: &str) -> bool {
    match (parse_integer(input), min_abs) {
        (Some((true, digits)), Some(min_abs)) => at_most(digits, min_abs),
        (Some((true, _)), None) => false,
        (Some((false, digits)), _) => at_most(digits, max),
        (None, _) => false,
    }
}

fn is_valid_decimal(input: &str) -> bool {
    let unsigned = input.strip_prefix(['+', '-']).unwrap_or(input);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    (!whole.is_empty() || !fraction.is_empty())
        && whole.bytes().all(|c| c.is_ascii_digit())
        && fraction.bytes().all(|c| c.is_ascii_digit())
}

fn is_valid_lexical_form(value: &str, datatype: NamedNodeRef<'_>) -> bool {
    if datatype == xsd::STRING {
        true
    } else if datatype == xsd::BOOLEAN {
        Boolean::from_str(value).is_ok()
    } else if datatype == xsd::DECIMAL {
        is_valid_decimal(value)
    } else if datatype == xsd::INTEGER {
        parse_integer(value).is_some()
    } else if datatype == xsd::LONG {
        integer_within(value, Some("9223372036854775808"), "9223372036854775807")
    } else if datatype == xsd::INT {
        integer_within(value, Some("2147483648"), "2147483647")
    } else if datatype == xsd::SHORT {
        integer_within(value, Some("32768"), "32767")
    } else if datatype == xsd::BYTE {
        integer_within(value, Some("128"), "127")
    } else if datatype == xsd::UNSIGNED_LONG {
        integer_within(value, None, "18446744073709551615")
    } else if datatype == xsd::UNSIGNED_INT {
        integer_within(value, None, "4294967295")
    } else if datatype == xsd::UNSIGNED_SHORT {
        integer_within(value, None, "65535")
    } else if datatype == xsd::UNSIGNED_BYTE {
        integer_within(value, None, "255")
    } else if datatype == xsd::NON_NEGATIVE_INTEGER {
        matches!(parse_integer(value), Some((false, _)))
    } else if datatype == xsd::POSITIVE_INTEGER {
        matches!(parse_integer(value), Some((false, digits)) if digits != "0")
    } else if datatype == xsd::NON_POSITIVE_INTEGER {
        matches!(parse_integer(value), Some((negative, digits)) if negative || digits == "0")
    } else if datatype == xsd::NEGATIVE_INTEGER {
        matches!(parse_integer(value), Some((true, _)))
    } else if datatype == xsd::DOUBLE {
        Double::from_str(value).is_ok()
    } else if datatype == xsd::FLOAT {
        Float::from_str(value).is_ok()
    } else if datatype == xsd::DATE {
        Date::from_str(value).is_ok()
    } else if datatype == xsd::TIME {
        Time::from_str(value).is_ok()
    } else if datatype == xsd::DATE_TIME {
        DateTime::from_str(value).is_ok()
    } else if datatype == xsd::G_YEAR {
        GYear::from_str(value).is_ok()
    } else if datatype == xsd::G_MONTH {
        GMonth::from_str(value).is_ok()
    } else if datatype == xsd::G_DAY {
        GDay::from_str(value).is_ok()
    } else if datatype == xsd::G_YEAR_MONTH {
        GYearMonth::from_str(value).is_ok()
    } else if datatype == xsd::G_MONTH_DAY {
        GMonthDay::from_str(value).is_ok()
    } else if datatype == xsd::DURATION {
        Duration::from_str(value).is_ok()
    } else if datatype == xsd::YEAR_MONTH_DURATION {
        YearMonthDuration::from_str(value).is_ok()
    } else if datatype == xsd::DAY_TIME_DURATION {
        DayTimeDuration::from_str(value).is_ok()
    } else {
        // no lexical rules known for other datatypes
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_integers() {
        assert!(is_valid_lexical_form("127", xsd::BYTE));
        assert!(is_valid_lexical_form("-128", xsd::BYTE));
        assert!(!is_valid_lexical_form("128", xsd::BYTE));
        assert!(!is_valid_lexical_form("-1", xsd::UNSIGNED_INT));
        assert!(is_valid_lexical_form("-0", xsd::UNSIGNED_INT));
        assert!(is_valid_lexical_form("000255", xsd::UNSIGNED_BYTE));
        assert!(!is_valid_lexical_form("0", xsd::POSITIVE_INTEGER));
        assert!(is_valid_lexical_form("99999999999999999999999", xsd::INTEGER));
    }

    #[test]
    fn decimals_and_others() {
        assert!(is_valid_lexical_form("1.5", xsd::DECIMAL));
        assert!(is_valid_lexical_form(".5", xsd::DECIMAL));
        assert!(is_valid_lexical_form("5.", xsd::DECIMAL));
        assert!(!is_valid_lexical_form(".", xsd::DECIMAL));
        assert!(!is_valid_lexical_form("1e3", xsd::DECIMAL));
        assert!(is_valid_lexical_form("1e3", xsd::DOUBLE));
        assert!(!is_valid_lexical_form("yes", xsd::BOOLEAN));
        assert!(is_valid_lexical_form("2024-02-29", xsd::DATE));
    }
}
