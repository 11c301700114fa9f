use super::{
    literal_bool, literal_string, literal_u64, sparql_prologue, values, ParsingContext,
    PredicateObjects,
};
use crate::error::{Result, ShapeError};
use crate::model::{Constraint, SparqlConstraint};
use crate::types::{NodeKind, ShapeID};
use oxigraph::model::{NamedNode, NamedNodeRef, Term};
use regex::RegexBuilder;

/// Parses all constraint components attached to `shape`.
///
/// Components come out in a fixed order (value type, cardinality, range,
/// string, property pair, logical, shape-based, other); repeated values of the
/// same parameter keep the lexicographic order of their objects.
pub(crate) fn parse_components(
    ctx: &ParsingContext<'_, '_>,
    shape: &Term,
    map: &PredicateObjects,
    closed: bool,
) -> Result<Vec<Constraint>> {
    let sh = &ctx.sh;
    let mut constraints = Vec::new();

    for class in values(map, sh.class) {
        constraints.push(Constraint::Class {
            class: class.clone(),
        });
    }
    for datatype in values(map, sh.datatype) {
        constraints.push(Constraint::Datatype {
            datatype: iri_param(shape, sh.datatype, datatype)?,
        });
    }
    for kind in values(map, sh.node_kind) {
        let kind = NodeKind::from_term(kind).ok_or_else(|| ShapeError::InvalidConstraint {
            shape: shape.clone(),
            message: format!("{} is not a node kind", kind),
        })?;
        constraints.push(Constraint::NodeKind { kind });
    }

    for count in values(map, sh.min_count) {
        constraints.push(Constraint::MinCount {
            count: literal_u64(shape, sh.min_count, count)?,
        });
    }
    for count in values(map, sh.max_count) {
        constraints.push(Constraint::MaxCount {
            count: literal_u64(shape, sh.max_count, count)?,
        });
    }

    for value in values(map, sh.min_exclusive) {
        constraints.push(Constraint::MinExclusive {
            value: value.clone(),
        });
    }
    for value in values(map, sh.min_inclusive) {
        constraints.push(Constraint::MinInclusive {
            value: value.clone(),
        });
    }
    for value in values(map, sh.max_exclusive) {
        constraints.push(Constraint::MaxExclusive {
            value: value.clone(),
        });
    }
    for value in values(map, sh.max_inclusive) {
        constraints.push(Constraint::MaxInclusive {
            value: value.clone(),
        });
    }

    for length in values(map, sh.min_length) {
        constraints.push(Constraint::MinLength {
            length: literal_u64(shape, sh.min_length, length)?,
        });
    }
    for length in values(map, sh.max_length) {
        constraints.push(Constraint::MaxLength {
            length: literal_u64(shape, sh.max_length, length)?,
        });
    }
    let flags = values(map, sh.flags).first().and_then(literal_string);
    for pattern in values(map, sh.pattern) {
        let pattern = literal_string(pattern).ok_or_else(|| ShapeError::InvalidConstraint {
            shape: shape.clone(),
            message: format!("sh:pattern expects a string, got {}", pattern),
        })?;
        constraints.push(build_pattern(shape, pattern, flags.clone())?);
    }
    for list in values(map, sh.language_in) {
        let languages = ctx
            .parse_list(shape, sh.language_in, list)?
            .iter()
            .map(|t| {
                literal_string(t).ok_or_else(|| ShapeError::InvalidConstraint {
                    shape: shape.clone(),
                    message: format!("sh:languageIn member {} is not a string", t),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        constraints.push(Constraint::LanguageIn { languages });
    }
    for flag in values(map, sh.unique_lang) {
        match literal_bool(flag) {
            Some(true) => constraints.push(Constraint::UniqueLang),
            Some(false) => {}
            None => {
                return Err(ShapeError::InvalidConstraint {
                    shape: shape.clone(),
                    message: format!("sh:uniqueLang expects a boolean, got {}", flag),
                })
            }
        }
    }

    type PairConstraint = fn(NamedNode) -> Constraint;
    let property_pairs: [(NamedNodeRef<'_>, PairConstraint); 4] = [
        (sh.equals, |property: NamedNode| Constraint::Equals { property }),
        (sh.disjoint, |property: NamedNode| Constraint::Disjoint { property }),
        (sh.less_than, |property: NamedNode| Constraint::LessThan { property }),
        (sh.less_than_or_equals, |property: NamedNode| {
            Constraint::LessThanOrEquals { property }
        }),
    ];
    for (predicate, build) in property_pairs {
        for property in values(map, predicate) {
            constraints.push(build(iri_param(shape, predicate, property)?));
        }
    }

    for child in values(map, sh.not) {
        constraints.push(Constraint::Not {
            shape: ctx.shape_ref(shape, child)?,
        });
    }
    type LogicalConstraint = fn(Vec<ShapeID>) -> Constraint;
    let logical: [(NamedNodeRef<'_>, LogicalConstraint); 3] = [
        (sh.and_, |shapes: Vec<ShapeID>| Constraint::And { shapes }),
        (sh.or_, |shapes: Vec<ShapeID>| Constraint::Or { shapes }),
        (sh.xone, |shapes: Vec<ShapeID>| Constraint::Xone { shapes }),
    ];
    for (predicate, build) in logical {
        for list in values(map, predicate) {
            let shapes = ctx
                .parse_list(shape, predicate, list)?
                .iter()
                .map(|member| ctx.shape_ref(shape, member))
                .collect::<Result<Vec<_>>>()?;
            constraints.push(build(shapes));
        }
    }

    for child in values(map, sh.node) {
        constraints.push(Constraint::Node {
            shape: ctx.shape_ref(shape, child)?,
        });
    }
    for child in values(map, sh.property) {
        constraints.push(Constraint::Property {
            shape: ctx.shape_ref(shape, child)?,
        });
    }
    let qualified_min = match values(map, sh.qualified_min_count).first() {
        Some(t) => Some(literal_u64(shape, sh.qualified_min_count, t)?),
        None => None,
    };
    let qualified_max = match values(map, sh.qualified_max_count).first() {
        Some(t) => Some(literal_u64(shape, sh.qualified_max_count, t)?),
        None => None,
    };
    let disjoint = values(map, sh.qualified_value_shapes_disjoint)
        .first()
        .and_then(literal_bool)
        .unwrap_or(false);
    for child in values(map, sh.qualified_value_shape) {
        if qualified_min.is_none() && qualified_max.is_none() {
            log::warn!(
                "sh:qualifiedValueShape on {} has neither qualifiedMinCount nor qualifiedMaxCount",
                shape
            );
        }
        constraints.push(Constraint::QualifiedValueShape {
            shape: ctx.shape_ref(shape, child)?,
            min_count: qualified_min,
            max_count: qualified_max,
            disjoint,
            earlier_siblings: Vec::new(),
        });
    }

    if closed {
        // filled in once every property shape has been parsed
        constraints.push(Constraint::Closed {
            allowed: Vec::new(),
        });
    }
    for value in values(map, sh.has_value) {
        constraints.push(Constraint::HasValue {
            value: value.clone(),
        });
    }
    for list in values(map, sh.in_) {
        constraints.push(Constraint::In {
            values: ctx.parse_list(shape, sh.in_, list)?,
        });
    }
    for node in values(map, sh.sparql) {
        constraints.push(Constraint::Sparql(parse_sparql(ctx, shape, node)?));
    }

    Ok(constraints)
}

fn iri_param(shape: &Term, predicate: NamedNodeRef<'_>, term: &Term) -> Result<NamedNode> {
    match term {
        Term::NamedNode(nn) => Ok(nn.clone()),
        other => Err(ShapeError::InvalidConstraint {
            shape: shape.clone(),
            message: format!("{} expects an IRI, got {}", predicate, other),
        }),
    }
}

fn build_pattern(shape: &Term, pattern: String, flags: Option<String>) -> Result<Constraint> {
    let flag_chars = flags.as_deref().unwrap_or("");
    // `q` takes the pattern as a plain string
    let source = if flag_chars.contains('q') {
        regex::escape(&pattern)
    } else {
        pattern.clone()
    };
    let mut builder = RegexBuilder::new(&source);
    for flag in flag_chars.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'q' => {}
            other => log::warn!("Ignoring unsupported regex flag '{}' on {}", other, shape),
        }
    }
    let regex = builder.build().map_err(|e| ShapeError::InvalidPattern {
        shape: shape.clone(),
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;
    Ok(Constraint::Pattern {
        pattern,
        flags,
        regex,
    })
}

fn parse_sparql(
    ctx: &ParsingContext<'_, '_>,
    shape: &Term,
    node: &Term,
) -> Result<SparqlConstraint> {
    let sh = &ctx.sh;
    let select = ctx
        .view
        .object(node, sh.select)?
        .as_ref()
        .and_then(literal_string)
        .ok_or_else(|| ShapeError::InvalidConstraint {
            shape: shape.clone(),
            message: format!("sh:sparql constraint {} has no sh:select", node),
        })?;
    let deactivated = ctx
        .view
        .object(node, sh.deactivated)?
        .as_ref()
        .and_then(literal_bool)
        .unwrap_or(false);
    Ok(SparqlConstraint {
        node: node.clone(),
        select: format!("{}{}", sparql_prologue(ctx, node)?, select),
        message: ctx.view.object(node, sh.message)?.as_ref().and_then(literal_string),
        deactivated,
    })
}
