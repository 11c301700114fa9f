//! Helpers for loading inline RDF in tests.

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::store::Store;
use std::error::Error;

fn load(data: &str, format: RdfFormat) -> Result<Store, Box<dyn Error>> {
    let store = Store::new()?;
    for quad in RdfParser::from_format(format).for_reader(data.as_bytes()) {
        store.insert(&quad?)?;
    }
    Ok(store)
}

/// Loads a TriG document; triples outside graph blocks go to the default graph.
pub fn store_from_trig(data: &str) -> Result<Store, Box<dyn Error>> {
    load(data, RdfFormat::TriG)
}

/// Loads a Turtle document into the default graph.
pub fn store_from_turtle(data: &str) -> Result<Store, Box<dyn Error>> {
    load(data, RdfFormat::Turtle)
}
