use crate::backend::{term_from_subject, GraphView};
use crate::error::BackendError;
use crate::named_nodes::{RDF, RDFS};
use fixedbitset::FixedBitSet;
use oxigraph::model::Term;
use std::collections::{HashMap, HashSet};

/// `rdf:type` membership with `rdfs:subClassOf` closure for one data graph.
///
/// Subclass edges are only read from the same graph as the instances, so a
/// class hierarchy in one named graph never affects another.
pub(crate) struct ClassIndex {
    term_to_id: HashMap<Term, usize>,
    descendants_by_super: Vec<FixedBitSet>,
    /// Typed subjects in [`GraphView::sort_terms`] order.
    subjects: Vec<(Term, FixedBitSet)>,
    subject_index: HashMap<Term, usize>,
}

impl ClassIndex {
    pub(crate) fn build(view: &GraphView<'_>) -> Result<Self, BackendError> {
        let rdf = RDF::new();
        let rdfs = RDFS::new();
        let mut term_to_id: HashMap<Term, usize> = HashMap::new();
        let mut intern = |term: Term| {
            let next = term_to_id.len();
            *term_to_id.entry(term).or_insert(next)
        };

        let mut parent_edges: Vec<(usize, usize)> = Vec::new();
        for triple in view.triples(None, Some(rdfs.sub_class_of), None)? {
            let sub_id = intern(term_from_subject(triple.subject));
            let super_id = intern(triple.object);
            parent_edges.push((sub_id, super_id));
        }

        let mut types_by_subject: HashMap<Term, Vec<usize>> = HashMap::new();
        for triple in view.triples(None, Some(rdf.type_), None)? {
            let class_id = intern(triple.object);
            types_by_subject
                .entry(term_from_subject(triple.subject))
                .or_default()
                .push(class_id);
        }
        let mut keyed = types_by_subject
            .into_iter()
            .map(|(subject, class_ids)| Ok((view.sort_key(&subject)?, subject, class_ids)))
            .collect::<Result<Vec<_>, BackendError>>()?;
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        let subject_types: Vec<(Term, Vec<usize>)> = keyed
            .into_iter()
            .map(|(_, subject, class_ids)| (subject, class_ids))
            .collect();
        let subject_index: HashMap<Term, usize> = subject_types
            .iter()
            .enumerate()
            .map(|(i, (subject, _))| (subject.clone(), i))
            .collect();

        let class_count = term_to_id.len();
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); class_count];
        for (child, parent) in parent_edges {
            if !parents[child].contains(&parent) {
                parents[child].push(parent);
            }
        }

        // every class is its own descendant; cycles in subClassOf are fine
        let mut descendants_by_super: Vec<FixedBitSet> = (0..class_count)
            .map(|_| FixedBitSet::with_capacity(class_count))
            .collect();
        for subclass in 0..class_count {
            let mut visited = HashSet::new();
            let mut stack = vec![subclass];
            while let Some(node) = stack.pop() {
                if !visited.insert(node) {
                    continue;
                }
                descendants_by_super[node].insert(subclass);
                stack.extend(parents[node].iter().copied());
            }
        }

        let subjects = subject_types
            .into_iter()
            .map(|(subject, class_ids)| {
                let mut bits = FixedBitSet::with_capacity(class_count);
                for class_id in class_ids {
                    bits.insert(class_id);
                }
                (subject, bits)
            })
            .collect();

        Ok(ClassIndex {
            term_to_id,
            descendants_by_super,
            subjects,
            subject_index,
        })
    }

    fn class_bitset(&self, class: &Term) -> Option<&FixedBitSet> {
        let class_id = self.term_to_id.get(class).copied()?;
        self.descendants_by_super.get(class_id)
    }

    /// All instances of `class`, transitively through `rdfs:subClassOf`.
    pub(crate) fn instances_of(&self, class: &Term) -> Vec<Term> {
        let Some(descendants) = self.class_bitset(class) else {
            return Vec::new();
        };
        self.subjects
            .iter()
            .filter(|(_, types)| types.intersection(descendants).next().is_some())
            .map(|(subject, _)| subject.clone())
            .collect()
    }

    pub(crate) fn is_instance_of(&self, node: &Term, class: &Term) -> bool {
        let (Some(descendants), Some(index)) =
            (self.class_bitset(class), self.subject_index.get(node))
        else {
            return false;
        };
        self.subjects[*index]
            .1
            .intersection(descendants)
            .next()
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GraphScope;
    use crate::test_utils::store_from_trig;
    use oxigraph::model::NamedNode;

    fn ex(local: &str) -> Term {
        Term::NamedNode(NamedNode::new_unchecked(format!("http://example.org/{local}")))
    }

    #[test]
    fn subclass_closure_stays_inside_the_graph() -> Result<(), Box<dyn std::error::Error>> {
        let store = store_from_trig(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
            ex:g1 {
                ex:Dog rdfs:subClassOf ex:Animal .
                ex:Puppy rdfs:subClassOf ex:Dog .
                ex:rex a ex:Puppy .
                ex:tom a ex:Cat .
            }
            ex:g2 {
                ex:Cat rdfs:subClassOf ex:Animal .
            }
            "#,
        )?;
        let g1 = GraphView::new(
            &store,
            GraphScope::Named(NamedNode::new_unchecked("http://example.org/g1")),
        );
        let index = ClassIndex::build(&g1)?;
        assert_eq!(index.instances_of(&ex("Animal")), vec![ex("rex")]);
        assert!(index.is_instance_of(&ex("rex"), &ex("Dog")));
        assert!(index.is_instance_of(&ex("tom"), &ex("Cat")));
        assert!(!index.is_instance_of(&ex("tom"), &ex("Animal")));
        assert!(index.instances_of(&ex("Unknown")).is_empty());
        Ok(())
    }
}
