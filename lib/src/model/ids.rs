use oxigraph::model::Term;
use std::collections::HashMap;
use std::hash::Hash;

/// Bidirectional map between RDF terms and dense numeric identifiers.
#[derive(Debug, Clone)]
pub(crate) struct IDLookupTable<IdType: Copy + Eq + Hash> {
    id_map: HashMap<Term, IdType>,
    id_to_term: Vec<Term>,
}

impl<IdType: Copy + Eq + Hash + From<u64> + Into<u64>> IDLookupTable<IdType> {
    pub(crate) fn new() -> Self {
        Self {
            id_map: HashMap::new(),
            id_to_term: Vec::new(),
        }
    }

    pub(crate) fn get_or_create_id(&mut self, term: Term) -> IdType {
        if let Some(&id) = self.id_map.get(&term) {
            return id;
        }
        let id: IdType = (self.id_to_term.len() as u64).into();
        self.id_map.insert(term.clone(), id);
        self.id_to_term.push(term);
        id
    }

    pub(crate) fn get(&self, term: &Term) -> Option<IdType> {
        self.id_map.get(term).copied()
    }

    pub(crate) fn get_term(&self, id: IdType) -> Option<&Term> {
        let index: u64 = id.into();
        self.id_to_term.get(index as usize)
    }

    pub(crate) fn len(&self) -> usize {
        self.id_to_term.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShapeID;
    use oxigraph::model::NamedNode;

    #[test]
    fn ids_are_dense_and_stable() {
        let mut table: IDLookupTable<ShapeID> = IDLookupTable::new();
        let a = Term::NamedNode(NamedNode::new_unchecked("http://example.org/a"));
        let b = Term::NamedNode(NamedNode::new_unchecked("http://example.org/b"));
        assert_eq!(table.get_or_create_id(a.clone()), ShapeID(0));
        assert_eq!(table.get_or_create_id(b.clone()), ShapeID(1));
        assert_eq!(table.get_or_create_id(a.clone()), ShapeID(0));
        assert_eq!(table.get_term(ShapeID(1)), Some(&b));
        assert_eq!(table.len(), 2);
    }
}
