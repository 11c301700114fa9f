use oxigraph::model::NamedNodeRef;

const SH: &str = "http://www.w3.org/ns/shacl#";

macro_rules! sh {
    ($local:literal) => {
        NamedNodeRef::new_unchecked(concat!("http://www.w3.org/ns/shacl#", $local))
    };
}

/// Terms of the SHACL vocabulary used by the parser, the evaluator and the report.
pub struct SHACL {
    pub class: NamedNodeRef<'static>,
    pub node: NamedNodeRef<'static>,
    pub property: NamedNodeRef<'static>,
    pub qualified_value_shape: NamedNodeRef<'static>,
    pub qualified_min_count: NamedNodeRef<'static>,
    pub qualified_max_count: NamedNodeRef<'static>,
    pub qualified_value_shapes_disjoint: NamedNodeRef<'static>,
    pub min_count: NamedNodeRef<'static>,
    pub max_count: NamedNodeRef<'static>,
    pub not: NamedNodeRef<'static>,
    pub node_kind: NamedNodeRef<'static>,
    pub datatype: NamedNodeRef<'static>,
    pub min_exclusive: NamedNodeRef<'static>,
    pub min_inclusive: NamedNodeRef<'static>,
    pub max_exclusive: NamedNodeRef<'static>,
    pub max_inclusive: NamedNodeRef<'static>,
    pub min_length: NamedNodeRef<'static>,
    pub max_length: NamedNodeRef<'static>,
    pub pattern: NamedNodeRef<'static>,
    pub flags: NamedNodeRef<'static>,
    pub language_in: NamedNodeRef<'static>,
    pub unique_lang: NamedNodeRef<'static>,
    pub node_shape: NamedNodeRef<'static>,
    pub property_shape: NamedNodeRef<'static>,
    pub and_: NamedNodeRef<'static>,
    pub or_: NamedNodeRef<'static>,
    pub xone: NamedNodeRef<'static>,
    pub path: NamedNodeRef<'static>,
    pub inverse_path: NamedNodeRef<'static>,
    pub alternative_path: NamedNodeRef<'static>,
    pub zero_or_more_path: NamedNodeRef<'static>,
    pub one_or_more_path: NamedNodeRef<'static>,
    pub zero_or_one_path: NamedNodeRef<'static>,

    pub target: NamedNodeRef<'static>,
    pub target_class: NamedNodeRef<'static>,
    pub target_node: NamedNodeRef<'static>,
    pub target_objects_of: NamedNodeRef<'static>,
    pub target_subjects_of: NamedNodeRef<'static>,

    pub equals: NamedNodeRef<'static>,
    pub disjoint: NamedNodeRef<'static>,
    pub less_than: NamedNodeRef<'static>,
    pub less_than_or_equals: NamedNodeRef<'static>,

    pub closed: NamedNodeRef<'static>,
    pub ignored_properties: NamedNodeRef<'static>,
    pub has_value: NamedNodeRef<'static>,
    pub in_: NamedNodeRef<'static>, // `in` is a reserved keyword in Rust

    // NodeKind instances
    pub iri: NamedNodeRef<'static>,
    pub literal: NamedNodeRef<'static>,
    pub blank_node: NamedNodeRef<'static>,
    pub blank_node_or_iri: NamedNodeRef<'static>,
    pub blank_node_or_literal: NamedNodeRef<'static>,
    pub iri_or_literal: NamedNodeRef<'static>,

    // Severities
    pub severity: NamedNodeRef<'static>,
    pub info: NamedNodeRef<'static>,
    pub warning: NamedNodeRef<'static>,
    pub violation: NamedNodeRef<'static>,

    pub deactivated: NamedNodeRef<'static>,
    pub message: NamedNodeRef<'static>,

    // SPARQL
    pub sparql: NamedNodeRef<'static>,
    pub select: NamedNodeRef<'static>,
    pub prefixes: NamedNodeRef<'static>,
    pub declare: NamedNodeRef<'static>,
    pub prefix: NamedNodeRef<'static>,
    pub namespace: NamedNodeRef<'static>,

    // Validation Report
    pub validation_report: NamedNodeRef<'static>,
    pub conforms: NamedNodeRef<'static>,
    pub result: NamedNodeRef<'static>,
    pub validation_result: NamedNodeRef<'static>,
    pub focus_node: NamedNodeRef<'static>,
    pub value: NamedNodeRef<'static>,
    pub result_path: NamedNodeRef<'static>,
    pub source_shape: NamedNodeRef<'static>,
    pub source_constraint: NamedNodeRef<'static>,
    pub source_constraint_component: NamedNodeRef<'static>,
    pub result_message: NamedNodeRef<'static>,
    pub result_severity: NamedNodeRef<'static>,
}

impl SHACL {
    pub fn new() -> Self {
        SHACL {
            class: sh!("class"),
            node: sh!("node"),
            property: sh!("property"),
            qualified_value_shape: sh!("qualifiedValueShape"),
            qualified_min_count: sh!("qualifiedMinCount"),
            qualified_max_count: sh!("qualifiedMaxCount"),
            qualified_value_shapes_disjoint: sh!("qualifiedValueShapesDisjoint"),
            min_count: sh!("minCount"),
            max_count: sh!("maxCount"),
            not: sh!("not"),
            node_kind: sh!("nodeKind"),
            datatype: sh!("datatype"),
            min_exclusive: sh!("minExclusive"),
            min_inclusive: sh!("minInclusive"),
            max_exclusive: sh!("maxExclusive"),
            max_inclusive: sh!("maxInclusive"),
            min_length: sh!("minLength"),
            max_length: sh!("maxLength"),
            pattern: sh!("pattern"),
            flags: sh!("flags"),
            language_in: sh!("languageIn"),
            unique_lang: sh!("uniqueLang"),
            node_shape: sh!("NodeShape"),
            property_shape: sh!("PropertyShape"),
            and_: sh!("and"),
            or_: sh!("or"),
            xone: sh!("xone"),
            path: sh!("path"),
            inverse_path: sh!("inversePath"),
            alternative_path: sh!("alternativePath"),
            zero_or_more_path: sh!("zeroOrMorePath"),
            one_or_more_path: sh!("oneOrMorePath"),
            zero_or_one_path: sh!("zeroOrOnePath"),
            target: sh!("target"),
            target_class: sh!("targetClass"),
            target_node: sh!("targetNode"),
            target_objects_of: sh!("targetObjectsOf"),
            target_subjects_of: sh!("targetSubjectsOf"),
            equals: sh!("equals"),
            disjoint: sh!("disjoint"),
            less_than: sh!("lessThan"),
            less_than_or_equals: sh!("lessThanOrEquals"),
            closed: sh!("closed"),
            ignored_properties: sh!("ignoredProperties"),
            has_value: sh!("hasValue"),
            in_: sh!("in"),
            iri: sh!("IRI"),
            literal: sh!("Literal"),
            blank_node: sh!("BlankNode"),
            blank_node_or_iri: sh!("BlankNodeOrIRI"),
            blank_node_or_literal: sh!("BlankNodeOrLiteral"),
            iri_or_literal: sh!("IRIOrLiteral"),
            severity: sh!("severity"),
            info: sh!("Info"),
            warning: sh!("Warning"),
            violation: sh!("Violation"),
            deactivated: sh!("deactivated"),
            message: sh!("message"),
            sparql: sh!("sparql"),
            select: sh!("select"),
            prefixes: sh!("prefixes"),
            declare: sh!("declare"),
            prefix: sh!("prefix"),
            namespace: sh!("namespace"),
            validation_report: sh!("ValidationReport"),
            conforms: sh!("conforms"),
            result: sh!("result"),
            validation_result: sh!("ValidationResult"),
            focus_node: sh!("focusNode"),
            value: sh!("value"),
            result_path: sh!("resultPath"),
            source_shape: sh!("sourceShape"),
            source_constraint: sh!("sourceConstraint"),
            source_constraint_component: sh!("sourceConstraintComponent"),
            result_message: sh!("resultMessage"),
            result_severity: sh!("resultSeverity"),
        }
    }

    /// IRI of a constraint component, e.g. `sh:MinCountConstraintComponent`.
    pub fn component(local_name: &str) -> String {
        format!("{SH}{local_name}ConstraintComponent")
    }

    pub fn namespace() -> &'static str {
        SH
    }
}

impl Default for SHACL {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RDF {
    pub type_: NamedNodeRef<'static>,
    pub first: NamedNodeRef<'static>,
    pub rest: NamedNodeRef<'static>,
    pub nil: NamedNodeRef<'static>,
    pub lang_string: NamedNodeRef<'static>,
}

impl RDF {
    pub fn new() -> Self {
        RDF {
            type_: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
            first: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#first"),
            rest: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#rest"),
            nil: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#nil"),
            lang_string: NamedNodeRef::new_unchecked(
                "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString",
            ),
        }
    }
}

pub struct RDFS {
    pub sub_class_of: NamedNodeRef<'static>,
    pub class: NamedNodeRef<'static>,
}

impl RDFS {
    pub fn new() -> Self {
        RDFS {
            sub_class_of: NamedNodeRef::new_unchecked(
                "http://www.w3.org/2000/01/rdf-schema#subClassOf",
            ),
            class: NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Class"),
        }
    }
}

pub struct OWL {
    pub class: NamedNodeRef<'static>,
}

impl OWL {
    pub fn new() -> Self {
        OWL {
            class: NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class"),
        }
    }
}
