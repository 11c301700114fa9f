//! Builds a [`ShapesModel`] from the triples of one shapes graph.

pub(crate) mod components;

use crate::backend::{term_from_subject, GraphView};
use crate::error::{Result, ShapeError};
use crate::model::ids::IDLookupTable;
use crate::model::{Constraint, Shape, ShapesModel};
use crate::named_nodes::{OWL, RDF, RDFS, SHACL};
use crate::types::{Path, Severity, ShapeID, Target};
use log::{debug, warn};
use oxigraph::model::{NamedNode, NamedNodeRef, Term};
use std::collections::{HashMap, HashSet};

/// Property paths nested deeper than this are rejected as malformed.
const MAX_PATH_DEPTH: usize = 64;

pub(crate) type PredicateObjects = HashMap<NamedNode, Vec<Term>>;

pub(crate) struct ParsingContext<'a, 'v> {
    pub(crate) view: &'a GraphView<'v>,
    pub(crate) lookup: IDLookupTable<ShapeID>,
    pub(crate) sh: SHACL,
    pub(crate) rdf: RDF,
}

impl<'a, 'v> ParsingContext<'a, 'v> {
    fn new(view: &'a GraphView<'v>) -> Self {
        Self {
            view,
            lookup: IDLookupTable::new(),
            sh: SHACL::new(),
            rdf: RDF::new(),
        }
    }

    /// All predicate/object pairs of `subject`, objects in [`GraphView::sort_terms`] order.
    pub(crate) fn predicate_objects(&self, subject: &Term) -> Result<PredicateObjects> {
        let mut grouped: HashMap<NamedNode, Vec<Term>> = HashMap::new();
        for triple in self.view.triples_for_subject(subject)? {
            grouped.entry(triple.predicate).or_default().push(triple.object);
        }
        let mut map: PredicateObjects = HashMap::with_capacity(grouped.len());
        for (predicate, objects) in grouped {
            let mut objects = self.sort_terms(objects)?;
            objects.dedup();
            map.insert(predicate, objects);
        }
        Ok(map)
    }

    pub(crate) fn sort_terms(&self, terms: Vec<Term>) -> Result<Vec<Term>> {
        Ok(self.view.sort_terms(terms)?)
    }

    /// Resolves a reference to another shape.
    pub(crate) fn shape_ref(&self, referrer: &Term, referenced: &Term) -> Result<ShapeID> {
        if let Term::Literal(_) = referenced {
            return Err(ShapeError::InvalidConstraint {
                shape: referrer.clone(),
                message: format!("literal {} cannot be used as a shape", referenced),
            });
        }
        let undefined = || ShapeError::UndefinedShape {
            referrer: referrer.clone(),
            referenced: referenced.clone(),
        };
        if matches!(referenced, Term::NamedNode(_)) && !self.view.is_described(referenced)? {
            return Err(undefined());
        }
        self.lookup.get(referenced).ok_or_else(undefined)
    }

    /// Reads an RDF list starting at `head`.
    pub(crate) fn parse_list(
        &self,
        shape: &Term,
        predicate: NamedNodeRef<'_>,
        head: &Term,
    ) -> Result<Vec<Term>> {
        let malformed = |message: String| ShapeError::MalformedList {
            shape: shape.clone(),
            predicate: predicate.to_string(),
            message,
        };
        let mut items = Vec::new();
        let mut visited = HashSet::new();
        let mut current = head.clone();
        loop {
            if let Term::NamedNode(nn) = &current {
                if nn.as_ref() == self.rdf.nil {
                    return Ok(items);
                }
            }
            if let Term::Literal(_) = current {
                return Err(malformed(format!("{} is a literal, not a list node", current)));
            }
            if !visited.insert(current.clone()) {
                return Err(malformed(format!("list is cyclic at {}", current)));
            }
            let firsts = self.view.objects(&current, self.rdf.first)?;
            let rests = self.view.objects(&current, self.rdf.rest)?;
            match (firsts.as_slice(), rests.as_slice()) {
                ([first], [rest]) => {
                    items.push(first.clone());
                    current = rest.clone();
                }
                _ => {
                    return Err(malformed(format!(
                        "{} must have exactly one rdf:first and one rdf:rest",
                        current
                    )))
                }
            }
        }
    }
}

pub(crate) fn values<'m>(map: &'m PredicateObjects, predicate: NamedNodeRef<'_>) -> &'m [Term] {
    map.get(&predicate.into_owned())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub(crate) fn literal_u64(shape: &Term, predicate: NamedNodeRef<'_>, term: &Term) -> Result<u64> {
    match term {
        Term::Literal(lit) => lit.value().trim().parse::<u64>().map_err(|_| {
            ShapeError::InvalidConstraint {
                shape: shape.clone(),
                message: format!("{} expects a non-negative integer, got {}", predicate, term),
            }
        }),
        _ => Err(ShapeError::InvalidConstraint {
            shape: shape.clone(),
            message: format!("{} expects a literal, got {}", predicate, term),
        }),
    }
}

pub(crate) fn literal_bool(term: &Term) -> Option<bool> {
    match term {
        Term::Literal(lit) => match lit.value() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn literal_string(term: &Term) -> Option<String> {
    match term {
        Term::Literal(lit) => Some(lit.value().to_string()),
        _ => None,
    }
}

fn bool_param(
    shape: &Term,
    map: &PredicateObjects,
    predicate: NamedNodeRef<'_>,
) -> Result<Option<bool>> {
    match values(map, predicate).first() {
        None => Ok(None),
        Some(term) => literal_bool(term)
            .map(Some)
            .ok_or_else(|| ShapeError::InvalidConstraint {
                shape: shape.clone(),
                message: format!("{} expects a boolean, got {}", predicate, term),
            }),
    }
}

/// Every node the shapes graph uses as a shape, in [`GraphView::sort_terms`] order.
fn discover_shapes(ctx: &ParsingContext<'_, '_>) -> Result<Vec<Term>> {
    let sh = &ctx.sh;
    let mut found: HashSet<Term> = HashSet::new();

    for class in [sh.node_shape, sh.property_shape] {
        found.extend(
            ctx.view
                .subjects(ctx.rdf.type_, &Term::NamedNode(class.into_owned()))?,
        );
    }
    for predicate in [
        sh.target_class,
        sh.target_node,
        sh.target_subjects_of,
        sh.target_objects_of,
        sh.target,
        sh.path,
    ] {
        for triple in ctx.view.triples(None, Some(predicate), None)? {
            found.insert(term_from_subject(triple.subject));
        }
    }
    for predicate in [sh.node, sh.property, sh.not, sh.qualified_value_shape] {
        for triple in ctx.view.triples(None, Some(predicate), None)? {
            if !matches!(triple.object, Term::Literal(_)) {
                found.insert(triple.object);
            }
        }
    }
    for predicate in [sh.and_, sh.or_, sh.xone] {
        for triple in ctx.view.triples(None, Some(predicate), None)? {
            let owner = term_from_subject(triple.subject);
            for member in ctx.parse_list(&owner, predicate, &triple.object)? {
                if !matches!(member, Term::Literal(_)) {
                    found.insert(member);
                }
            }
        }
    }

    ctx.sort_terms(found.into_iter().collect())
}

fn parse_path(
    ctx: &ParsingContext<'_, '_>,
    shape: &Term,
    term: &Term,
    depth: usize,
) -> Result<Path> {
    let invalid = |message: String| ShapeError::InvalidPath {
        shape: shape.clone(),
        message,
    };
    if depth > MAX_PATH_DEPTH {
        return Err(invalid("path expression nests too deeply".to_string()));
    }
    let sh = &ctx.sh;
    match term {
        Term::NamedNode(nn) => Ok(Path::Simple(nn.clone())),
        Term::BlankNode(_) => {
            if !ctx.view.objects(term, ctx.rdf.first)?.is_empty() {
                let members = ctx.parse_list(shape, sh.path, term)?;
                if members.len() < 2 {
                    return Err(invalid("sequence path needs at least two members".to_string()));
                }
                let steps = members
                    .iter()
                    .map(|m| parse_path(ctx, shape, m, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                return Ok(Path::Sequence(steps));
            }
            if let Some(inner) = ctx.view.object(term, sh.inverse_path)? {
                let inner = parse_path(ctx, shape, &inner, depth + 1)?;
                return Ok(Path::Inverse(Box::new(inner)));
            }
            if let Some(list) = ctx.view.object(term, sh.alternative_path)? {
                let members = ctx.parse_list(shape, sh.alternative_path, &list)?;
                if members.len() < 2 {
                    return Err(invalid(
                        "alternative path needs at least two members".to_string(),
                    ));
                }
                let branches = members
                    .iter()
                    .map(|m| parse_path(ctx, shape, m, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                return Ok(Path::Alternative(branches));
            }
            if let Some(inner) = ctx.view.object(term, sh.zero_or_more_path)? {
                let inner = parse_path(ctx, shape, &inner, depth + 1)?;
                return Ok(Path::ZeroOrMore(Box::new(inner)));
            }
            if let Some(inner) = ctx.view.object(term, sh.one_or_more_path)? {
                let inner = parse_path(ctx, shape, &inner, depth + 1)?;
                return Ok(Path::OneOrMore(Box::new(inner)));
            }
            if let Some(inner) = ctx.view.object(term, sh.zero_or_one_path)? {
                let inner = parse_path(ctx, shape, &inner, depth + 1)?;
                return Ok(Path::ZeroOrOne(Box::new(inner)));
            }
            Err(invalid(format!("{} is not a path expression", term)))
        }
        _ => Err(invalid(format!("{} cannot be used as a path", term))),
    }
}

/// `PREFIX` declarations collected from `sh:prefixes` / `sh:declare`.
pub(crate) fn sparql_prologue(ctx: &ParsingContext<'_, '_>, node: &Term) -> Result<String> {
    let sh = &ctx.sh;
    let mut declarations = Vec::new();
    let owners = ctx.sort_terms(ctx.view.objects(node, sh.prefixes)?)?;
    for owner in owners {
        for declaration in ctx.view.objects(&owner, sh.declare)? {
            let prefix = ctx.view.object(&declaration, sh.prefix)?;
            let namespace = ctx.view.object(&declaration, sh.namespace)?;
            match (
                prefix.as_ref().and_then(literal_string),
                namespace.as_ref().and_then(literal_string),
            ) {
                (Some(prefix), Some(namespace)) => {
                    declarations.push(format!("PREFIX {}: <{}>", prefix, namespace))
                }
                _ => warn!("Ignoring incomplete sh:declare {} on {}", declaration, owner),
            }
        }
    }
    declarations.sort();
    declarations.dedup();
    let mut prologue = declarations.join("\n");
    if !prologue.is_empty() {
        prologue.push('\n');
    }
    Ok(prologue)
}

fn parse_targets(
    ctx: &ParsingContext<'_, '_>,
    shape: &Term,
    map: &PredicateObjects,
) -> Result<Vec<Target>> {
    let sh = &ctx.sh;
    let mut targets = Vec::new();
    for class in values(map, sh.target_class) {
        targets.push(Target::Class(class.clone()));
    }
    for node in values(map, sh.target_node) {
        targets.push(Target::Node(node.clone()));
    }
    for (predicate, build) in [
        (sh.target_subjects_of, Target::SubjectsOf as fn(NamedNode) -> Target),
        (sh.target_objects_of, Target::ObjectsOf as fn(NamedNode) -> Target),
    ] {
        for object in values(map, predicate) {
            match object {
                Term::NamedNode(p) => targets.push(build(p.clone())),
                other => {
                    return Err(ShapeError::InvalidConstraint {
                        shape: shape.clone(),
                        message: format!("{} expects an IRI, got {}", predicate, other),
                    })
                }
            }
        }
    }
    for target in values(map, sh.target) {
        match ctx.view.object(target, sh.select)?.as_ref().and_then(literal_string) {
            Some(select) => targets.push(Target::Select {
                query: format!("{}{}", sparql_prologue(ctx, target)?, select),
            }),
            None => warn!("Ignoring sh:target {} on {} without sh:select", target, shape),
        }
    }

    if let Term::NamedNode(_) = shape {
        let types = values(map, ctx.rdf.type_);
        let rdfs_class = Term::NamedNode(RDFS::new().class.into_owned());
        let owl_class = Term::NamedNode(OWL::new().class.into_owned());
        if types.iter().any(|t| *t == rdfs_class || *t == owl_class) {
            targets.push(Target::ImplicitClass(shape.clone()));
        }
    }
    Ok(targets)
}

fn parse_shape(ctx: &ParsingContext<'_, '_>, id: ShapeID, term: &Term) -> Result<Shape> {
    let sh = &ctx.sh;
    let map = ctx.predicate_objects(term)?;

    let path = match values(&map, sh.path) {
        [] => None,
        [path] => Some(parse_path(ctx, term, path, 0)?),
        _ => {
            return Err(ShapeError::InvalidPath {
                shape: term.clone(),
                message: "a shape can declare at most one sh:path".to_string(),
            })
        }
    };

    let severity = match values(&map, sh.severity).first() {
        None => Severity::default(),
        Some(value) => Severity::from_term(value).unwrap_or_else(|| {
            warn!("Unknown severity {} on {}, using sh:Violation", value, term);
            Severity::Violation
        }),
    };

    let closed = bool_param(term, &map, sh.closed)?.unwrap_or(false);
    let mut ignored_properties = Vec::new();
    for list in values(&map, sh.ignored_properties) {
        for item in ctx.parse_list(term, sh.ignored_properties, list)? {
            match item {
                Term::NamedNode(p) => ignored_properties.push(p),
                other => {
                    return Err(ShapeError::InvalidConstraint {
                        shape: term.clone(),
                        message: format!("sh:ignoredProperties member {} is not an IRI", other),
                    })
                }
            }
        }
    }

    let targets = parse_targets(ctx, term, &map)?;
    let constraints = components::parse_components(ctx, term, &map, closed)?;
    debug!(
        "Shape {} ({}): {} target(s), {} constraint(s)",
        term,
        id,
        targets.len(),
        constraints.len()
    );

    Ok(Shape {
        id,
        term: term.clone(),
        path,
        targets,
        severity,
        deactivated: bool_param(term, &map, sh.deactivated)?.unwrap_or(false),
        message: values(&map, sh.message).iter().find_map(literal_string),
        constraints,
        closed,
        ignored_properties,
    })
}

pub(crate) fn run_parser(
    view: &GraphView<'_>,
    association: Option<NamedNode>,
) -> Result<ShapesModel> {
    let mut ctx = ParsingContext::new(view);
    let terms = discover_shapes(&ctx)?;
    for term in &terms {
        ctx.lookup.get_or_create_id(term.clone());
    }

    let mut shapes = Vec::with_capacity(terms.len());
    for (index, term) in terms.iter().enumerate() {
        shapes.push(parse_shape(&ctx, ShapeID(index as u64), term)?);
    }

    let parents = link_property_shapes(&shapes)?;
    resolve_closed_predicates(&mut shapes);
    resolve_qualified_siblings(&mut shapes, &parents);

    Ok(ShapesModel {
        lookup: ctx.lookup,
        shapes,
        parents,
        association,
    })
}

/// Maps each property shape to the shapes that use it via `sh:property`.
fn link_property_shapes(shapes: &[Shape]) -> Result<HashMap<ShapeID, Vec<ShapeID>>> {
    let mut parents: HashMap<ShapeID, Vec<ShapeID>> = HashMap::new();
    for shape in shapes {
        for child in shape.property_shapes() {
            let child_shape = &shapes[child.0 as usize];
            if child_shape.path.is_none() {
                return Err(ShapeError::InvalidConstraint {
                    shape: shape.term.clone(),
                    message: format!("sh:property value {} has no sh:path", child_shape.term),
                });
            }
            let entry = parents.entry(child).or_default();
            if !entry.contains(&shape.id) {
                entry.push(shape.id);
            }
        }
    }
    Ok(parents)
}

fn resolve_closed_predicates(shapes: &mut [Shape]) {
    let allowed_by_shape: Vec<Vec<NamedNode>> = shapes
        .iter()
        .map(|shape| {
            let mut allowed: Vec<NamedNode> = shape
                .property_shapes()
                .filter_map(|id| shapes[id.0 as usize].path.as_ref())
                .filter_map(|path| path.as_predicate().cloned())
                .chain(shape.ignored_properties().iter().cloned())
                .collect();
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            allowed.dedup();
            allowed
        })
        .collect();
    for (shape, predicates) in shapes.iter_mut().zip(allowed_by_shape) {
        for constraint in shape.constraints.iter_mut() {
            if let Constraint::Closed { allowed } = constraint {
                *allowed = predicates.clone();
            }
        }
    }
}

/// Qualified shapes declared on sibling property shapes, in sibling order.
/// Only the siblings before the current one are kept: those claim shared values first.
fn resolve_qualified_siblings(shapes: &mut [Shape], parents: &HashMap<ShapeID, Vec<ShapeID>>) {
    let mut updates: Vec<(ShapeID, ShapeID, Vec<ShapeID>)> = Vec::new();
    for shape in shapes.iter() {
        for constraint in &shape.constraints {
            let Constraint::QualifiedValueShape {
                shape: qualified,
                disjoint: true,
                ..
            } = constraint
            else {
                continue;
            };
            let mut earlier = Vec::new();
            let mut parent_ids = parents.get(&shape.id).cloned().unwrap_or_default();
            parent_ids.sort();
            for parent in parent_ids {
                let mut ordered: Vec<(ShapeID, ShapeID)> = Vec::new();
                for sibling in shapes[parent.0 as usize].property_shapes() {
                    for c in &shapes[sibling.0 as usize].constraints {
                        if let Constraint::QualifiedValueShape { shape: q, .. } = c {
                            ordered.push((sibling, *q));
                        }
                    }
                }
                if let Some(position) = ordered
                    .iter()
                    .position(|(p, q)| *p == shape.id && q == qualified)
                {
                    earlier.extend(
                        ordered[..position]
                            .iter()
                            .filter(|(p, _)| *p != shape.id)
                            .map(|(_, q)| *q),
                    );
                }
            }
            earlier.sort();
            earlier.dedup();
            updates.push((shape.id, *qualified, earlier));
        }
    }
    for (owner, qualified, earlier) in updates {
        for constraint in shapes[owner.0 as usize].constraints.iter_mut() {
            if let Constraint::QualifiedValueShape {
                shape,
                earlier_siblings,
                ..
            } = constraint
            {
                if *shape == qualified {
                    *earlier_siblings = earlier.clone();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GraphScope;
    use crate::test_utils::store_from_turtle;

    const PREFIXES: &str = r#"
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        @prefix ex: <http://example.org/> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
    "#;

    fn parse(shapes: &str) -> Result<ShapesModel> {
        let store = store_from_turtle(&format!("{PREFIXES}{shapes}"))
            .map_err(|e| ShapeError::Backend(crate::error::BackendError(e.to_string())))?;
        let view = GraphView::new(&store, GraphScope::Default);
        ShapesModel::from_view(&view, None)
    }

    fn ex(local: &str) -> Term {
        Term::NamedNode(NamedNode::new_unchecked(format!("http://example.org/{local}")))
    }

    #[test]
    fn undefined_shape_reference_is_rejected() {
        let err = parse("ex:S a sh:NodeShape ; sh:targetClass ex:C ; sh:node ex:Missing .")
            .err()
            .expect("expected a structural error");
        assert!(
            matches!(err, ShapeError::UndefinedShape { ref referenced, .. } if *referenced == ex("Missing")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn ignored_properties_must_be_a_list() {
        let err = parse("ex:S a sh:NodeShape ; sh:closed true ; sh:ignoredProperties ex:notAList .")
            .err()
            .expect("expected a structural error");
        assert!(matches!(err, ShapeError::MalformedList { .. }), "{err}");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = parse(r#"ex:S a sh:NodeShape ; sh:pattern "(unclosed" ."#)
            .err()
            .expect("expected a structural error");
        assert!(matches!(err, ShapeError::InvalidPattern { .. }), "{err}");
    }

    #[test]
    fn shapes_are_enumerated_in_term_order() -> Result<()> {
        let model = parse(
            r#"
            ex:B a sh:NodeShape ; sh:targetNode ex:x ; sh:property ex:P .
            ex:A a sh:NodeShape ; sh:targetNode ex:y .
            ex:P sh:path ex:p ; sh:minCount 1 .
            "#,
        )?;
        let terms: Vec<String> = model.shapes().iter().map(|s| s.term().to_string()).collect();
        assert_eq!(
            terms,
            vec![
                "<http://example.org/A>",
                "<http://example.org/B>",
                "<http://example.org/P>"
            ]
        );
        let p = model.shape_by_iri(&ex("P")).expect("P is a shape");
        assert!(p.is_property_shape());
        let b = model.shape_by_iri(&ex("B")).expect("B is a shape");
        assert_eq!(model.parents_of(p.id()), &[b.id()]);
        assert_eq!(model.shapes_targeting_anything().count(), 2);
        Ok(())
    }

    #[test]
    fn duplicate_declarations_merge() -> Result<()> {
        let model = parse(
            r#"
            ex:S a sh:NodeShape ; sh:targetClass ex:C .
            ex:S sh:nodeKind sh:IRI .
            ex:S sh:targetNode ex:n .
            "#,
        )?;
        assert_eq!(model.len(), 1);
        let s = model.shape_by_iri(&ex("S")).expect("S is a shape");
        assert_eq!(s.targets().len(), 2);
        assert_eq!(s.constraints().len(), 1);
        Ok(())
    }

    #[test]
    fn implicit_class_target_and_complex_path() -> Result<()> {
        let model = parse(
            r#"
            ex:Person a rdfs:Class, sh:NodeShape ; sh:property [
                sh:path ( ex:knows [ sh:zeroOrMorePath ex:friend ] ) ;
                sh:maxCount 3
            ] .
            "#,
        )?;
        let person = model.shape_by_iri(&ex("Person")).expect("Person is a shape");
        assert_eq!(person.targets(), &[Target::ImplicitClass(ex("Person"))]);
        let prop = model
            .shape(person.property_shapes().next().expect("one property shape"))
            .expect("property shape exists");
        assert_eq!(
            prop.path().map(|p| p.to_sparql_path()),
            Some("(<http://example.org/knows> / <http://example.org/friend>*)".to_string())
        );
        Ok(())
    }

    #[test]
    fn closed_shape_collects_allowed_predicates() -> Result<()> {
        let model = parse(
            r#"
            ex:S a sh:NodeShape ; sh:closed true ;
                sh:ignoredProperties ( ex:ignored ) ;
                sh:property [ sh:path ex:p1 ] .
            "#,
        )?;
        let s = model.shape_by_iri(&ex("S")).expect("S is a shape");
        assert!(s.is_closed());
        assert_eq!(
            s.ignored_properties(),
            &[NamedNode::new_unchecked("http://example.org/ignored")]
        );
        let allowed = s
            .constraints()
            .iter()
            .find_map(|c| match c {
                Constraint::Closed { allowed } => Some(allowed.clone()),
                _ => None,
            })
            .expect("closed constraint present");
        let names: Vec<&str> = allowed.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["http://example.org/ignored", "http://example.org/p1"]);
        Ok(())
    }

    #[test]
    fn blank_property_shapes_order_by_content() -> Result<()> {
        let doc = "ex:S a sh:NodeShape ; sh:property [ sh:path ex:b ; sh:minCount 1 ] , [ sh:path ex:a ; sh:minCount 1 ] .";
        let paths = |model: &ShapesModel| -> Vec<String> {
            model
                .shapes()
                .iter()
                .filter_map(|s| s.path().map(|p| p.to_string()))
                .collect()
        };
        let first = parse(doc)?;
        let second = parse(doc)?;
        assert_eq!(
            paths(&first),
            vec!["<http://example.org/a>", "<http://example.org/b>"]
        );
        assert_eq!(paths(&first), paths(&second));
        Ok(())
    }
}
