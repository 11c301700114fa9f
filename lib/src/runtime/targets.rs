use super::Evaluator;
use crate::backend::term_from_subject;
use crate::model::Shape;
use crate::types::{dedup, Target};
use oxigraph::model::Term;

impl Evaluator<'_> {
    /// Focus nodes of `shape` in this evaluator's graph: the union of all of its
    /// targets, first occurrence wins.
    ///
    /// The error is a message for an anomaly result.
    pub(crate) fn focus_nodes(&self, shape: &Shape) -> Result<Vec<Term>, String> {
        let mut nodes = Vec::new();
        for target in &shape.targets {
            match target {
                Target::Node(node) => nodes.push(node.clone()),
                Target::Class(class) | Target::ImplicitClass(class) => {
                    let index = self.class_index().map_err(|e| e.to_string())?;
                    nodes.extend(index.instances_of(class));
                }
                Target::SubjectsOf(predicate) => {
                    let triples = self
                        .view()
                        .triples(None, Some(predicate.as_ref()), None)
                        .map_err(|e| e.to_string())?;
                    let subjects = triples.into_iter().map(|t| term_from_subject(t.subject));
                    nodes.extend(self.stable_order(dedup(subjects))?);
                }
                Target::ObjectsOf(predicate) => {
                    let triples = self
                        .view()
                        .triples(None, Some(predicate.as_ref()), None)
                        .map_err(|e| e.to_string())?;
                    let objects = triples.into_iter().map(|t| t.object);
                    nodes.extend(self.stable_order(dedup(objects))?);
                }
                Target::Select { query } => {
                    let selected = self
                        .sparql()
                        .select_targets(query, self.view().scope())
                        .map_err(|e| format!("SPARQL target failed: {}", e))?;
                    nodes.extend(self.stable_order(dedup(selected))?);
                }
            }
        }
        Ok(dedup(nodes))
    }

    fn stable_order(&self, terms: Vec<Term>) -> Result<Vec<Term>, String> {
        self.view().sort_terms(terms).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::{GraphScope, GraphView};
    use crate::config::ValidationConfig;
    use crate::model::ShapesModel;
    use crate::runtime::Evaluator;
    use crate::sparql::UnsupportedSparql;
    use crate::test_utils::store_from_trig;
    use crate::trace::NullTraceSink;
    use oxigraph::model::{NamedNode, Term};

    fn ex(local: &str) -> Term {
        Term::NamedNode(NamedNode::new_unchecked(format!("http://example.org/{local}")))
    }

    #[test]
    fn targets_union_without_duplicates() -> Result<(), Box<dyn std::error::Error>> {
        let store = store_from_trig(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
            ex:S a sh:NodeShape ;
                sh:targetNode ex:alice ;
                sh:targetClass ex:Person ;
                sh:targetSubjectsOf ex:knows ;
                sh:targetObjectsOf ex:knows .
            ex:Student rdfs:subClassOf ex:Person .
            ex:alice a ex:Student ; ex:knows ex:bob .
            ex:carol a ex:Person .
            "#,
        )?;
        let view = GraphView::new(&store, GraphScope::Default);
        let model = ShapesModel::from_view(&view, None)?;
        let config = ValidationConfig::default();
        let evaluator = Evaluator::new(&model, view, &config, &UnsupportedSparql, &NullTraceSink);
        let shape = model.shape_by_iri(&ex("S")).ok_or("shape missing")?;
        let focus = evaluator.focus_nodes(shape)?;
        assert_eq!(focus, vec![ex("alice"), ex("carol"), ex("bob")]);
        Ok(())
    }

    #[test]
    fn unknown_class_selects_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let store = store_from_trig(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:S a sh:NodeShape ; sh:targetClass ex:Nothing .
            "#,
        )?;
        let view = GraphView::new(&store, GraphScope::Default);
        let model = ShapesModel::from_view(&view, None)?;
        let config = ValidationConfig::default();
        let evaluator = Evaluator::new(&model, view, &config, &UnsupportedSparql, &NullTraceSink);
        let shape = model.shape_by_iri(&ex("S")).ok_or("shape missing")?;
        assert!(evaluator.focus_nodes(shape)?.is_empty());
        Ok(())
    }

    #[test]
    fn blank_subjects_order_by_their_triples() -> Result<(), Box<dyn std::error::Error>> {
        let doc = r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:S a sh:NodeShape ; sh:targetSubjectsOf ex:v .
            [] ex:v 3 . [] ex:v 1 . [] ex:v 2 .
            "#;
        let mut runs = Vec::new();
        for _ in 0..2 {
            let store = store_from_trig(doc)?;
            let view = GraphView::new(&store, GraphScope::Default);
            let model = ShapesModel::from_view(&view, None)?;
            let config = ValidationConfig::default();
            let evaluator =
                Evaluator::new(&model, view.clone(), &config, &UnsupportedSparql, &NullTraceSink);
            let shape = model.shape_by_iri(&ex("S")).ok_or("shape missing")?;
            let keys = evaluator
                .focus_nodes(shape)?
                .iter()
                .map(|node| view.sort_key(node))
                .collect::<Result<Vec<_>, _>>()?;
            runs.push(keys);
        }
        assert_eq!(runs[0].len(), 3);
        assert!(runs[0][0].contains("\"1\""));
        assert!(runs[0][2].contains("\"3\""));
        assert_eq!(runs[0], runs[1]);
        Ok(())
    }
}
