//! Reading graphs and datasets from disk.

use log::info;
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{Graph, Triple};
use oxigraph::store::Store;
use shifty_ds::ValidationMode;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Whether a file holds one graph or a set of named graphs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputKind {
    Graph,
    Dataset,
}

/// RDF syntax and input kind, decided by file extension.
pub fn input_format(path: &Path) -> Result<(RdfFormat, InputKind), Box<dyn Error>> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let resolved = match ext.as_str() {
        "trig" => (RdfFormat::TriG, InputKind::Dataset),
        "nq" | "nquads" => (RdfFormat::NQuads, InputKind::Dataset),
        "ttl" => (RdfFormat::Turtle, InputKind::Graph),
        "nt" => (RdfFormat::NTriples, InputKind::Graph),
        "rdf" | "owl" => (RdfFormat::RdfXml, InputKind::Graph),
        "n3" => (RdfFormat::N3, InputKind::Graph),
        _ => {
            return Err(format!(
                "Unsupported RDF format for {} (expected .trig, .nq, .nquads, .ttl, .nt, .rdf, .owl or .n3)",
                path.display()
            )
            .into())
        }
    };
    Ok(resolved)
}

/// Auto mode: a shapes dataset means SHACL-DS, anything else plain SHACL.
pub fn resolve_mode(
    forced: Option<ValidationMode>,
    shapes: &Path,
) -> Result<ValidationMode, Box<dyn Error>> {
    if let Some(mode) = forced {
        return Ok(mode);
    }
    let (_, kind) = input_format(shapes)?;
    Ok(match kind {
        InputKind::Dataset => ValidationMode::Dataset,
        InputKind::Graph => ValidationMode::Classic,
    })
}

/// Loads `path` into a fresh store. Graph inputs land in the default graph.
pub fn load_store(path: &Path) -> Result<Store, Box<dyn Error>> {
    let (format, _) = input_format(path)?;
    let file = File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    let store = Store::new()?;
    let mut count = 0usize;
    for quad in RdfParser::from_format(format).for_reader(BufReader::new(file)) {
        let quad = quad.map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
        store.insert(&quad)?;
        count += 1;
    }
    info!("Loaded {} quad(s) from {}", count, path.display());
    Ok(store)
}

/// Loads `path` as a single graph, merging named graphs into it.
pub fn load_graph(path: &Path) -> Result<Graph, Box<dyn Error>> {
    let (format, _) = input_format(path)?;
    let file = File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    let mut graph = Graph::new();
    for quad in RdfParser::from_format(format).for_reader(BufReader::new(file)) {
        let quad = quad.map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::GraphNameRef;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn extensions_decide_format_and_mode() -> Result<(), Box<dyn Error>> {
        assert_eq!(
            input_format(Path::new("shapes.TRIG"))?,
            (RdfFormat::TriG, InputKind::Dataset)
        );
        assert_eq!(
            input_format(Path::new("data.owl"))?,
            (RdfFormat::RdfXml, InputKind::Graph)
        );
        assert!(input_format(Path::new("data.json")).is_err());

        assert_eq!(
            resolve_mode(None, Path::new("shapes.nq"))?,
            ValidationMode::Dataset
        );
        assert_eq!(
            resolve_mode(None, Path::new("shapes.ttl"))?,
            ValidationMode::Classic
        );
        assert_eq!(
            resolve_mode(Some(ValidationMode::Dataset), Path::new("shapes.ttl"))?,
            ValidationMode::Dataset
        );
        Ok(())
    }

    #[test]
    fn graph_files_load_into_the_default_graph() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let ttl = dir.path().join("data.ttl");
        fs::write(&ttl, "<http://example.org/a> <http://example.org/p> 1 .\n")?;
        let trig = dir.path().join("data.trig");
        fs::write(
            &trig,
            "<http://example.org/g> { <http://example.org/a> <http://example.org/p> 1 . }\n",
        )?;

        let store = load_store(&ttl)?;
        let in_default = store
            .quads_for_pattern(None, None, None, Some(GraphNameRef::DefaultGraph))
            .count();
        assert_eq!(in_default, 1);

        let store = load_store(&trig)?;
        assert_eq!(store.named_graphs().count(), 1);

        let graph = load_graph(&trig)?;
        assert_eq!(graph.len(), 1);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        assert!(load_store(&dir.path().join("absent.ttl")).is_err());
    }
}
