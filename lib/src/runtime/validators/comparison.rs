use oxigraph::model::vocab::{rdf, xsd};
use oxigraph::model::{LiteralRef, NamedNodeRef, Term};
use oxsdatatypes::{Date, DateTime, Decimal, Time};
use std::cmp::Ordering;
use std::str::FromStr;

const DECIMAL_TYPES: &[NamedNodeRef<'static>] = &[
    xsd::DECIMAL,
    xsd::INTEGER,
    xsd::LONG,
    xsd::INT,
    xsd::SHORT,
    xsd::BYTE,
    xsd::NON_NEGATIVE_INTEGER,
    xsd::POSITIVE_INTEGER,
    xsd::NON_POSITIVE_INTEGER,
    xsd::NEGATIVE_INTEGER,
    xsd::UNSIGNED_LONG,
    xsd::UNSIGNED_INT,
    xsd::UNSIGNED_SHORT,
    xsd::UNSIGNED_BYTE,
];

enum Comparable {
    Decimal(Decimal),
    Float(f64),
    DateTime(DateTime),
    Date(Date),
    Time(Time),
    Text(String, Option<String>),
}

fn comparable(lit: LiteralRef<'_>) -> Option<Comparable> {
    let datatype = lit.datatype();
    let value = lit.value();
    if DECIMAL_TYPES.contains(&datatype) {
        Decimal::from_str(value).ok().map(Comparable::Decimal)
    } else if datatype == xsd::FLOAT || datatype == xsd::DOUBLE {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
            .map(Comparable::Float)
    } else if datatype == xsd::DATE_TIME || datatype == xsd::DATE_TIME_STAMP {
        DateTime::from_str(value).ok().map(Comparable::DateTime)
    } else if datatype == xsd::DATE {
        Date::from_str(value).ok().map(Comparable::Date)
    } else if datatype == xsd::TIME {
        Time::from_str(value).ok().map(Comparable::Time)
    } else if datatype == xsd::STRING || datatype == rdf::LANG_STRING {
        Some(Comparable::Text(
            value.to_string(),
            lit.language().map(str::to_ascii_lowercase),
        ))
    } else {
        None
    }
}

fn decimal_as_f64(value: &Decimal) -> Option<f64> {
    value.to_string().parse::<f64>().ok()
}

/// Orders two literals the way SPARQL's `<` does for the common XSD types.
///
/// Returns `None` for non-literals, for values of incomparable types, and for
/// strings with different language tags. Callers treat `None` as a failure.
pub(crate) fn compare_terms(left: &Term, right: &Term) -> Option<Ordering> {
    let (Term::Literal(left_lit), Term::Literal(right_lit)) = (left, right) else {
        return None;
    };
    match (
        comparable(left_lit.as_ref())?,
        comparable(right_lit.as_ref())?,
    ) {
        (Comparable::Decimal(l), Comparable::Decimal(r)) => l.partial_cmp(&r),
        (Comparable::Float(l), Comparable::Float(r)) => l.partial_cmp(&r),
        (Comparable::Decimal(l), Comparable::Float(r)) => decimal_as_f64(&l)?.partial_cmp(&r),
        (Comparable::Float(l), Comparable::Decimal(r)) => l.partial_cmp(&decimal_as_f64(&r)?),
        (Comparable::DateTime(l), Comparable::DateTime(r)) => l.partial_cmp(&r),
        (Comparable::Date(l), Comparable::Date(r)) => l.partial_cmp(&r),
        (Comparable::Time(l), Comparable::Time(r)) => l.partial_cmp(&r),
        (Comparable::Text(l, l_lang), Comparable::Text(r, r_lang)) if l_lang == r_lang => {
            Some(l.cmp(&r))
        }
        _ => None,
    }
}
