//! t3doc: extract a cross-referenced symbol graph from TADS 3 library
//! sources and render it as a documentation site.
//!
//! The pipeline is: [`intake`] pre-scans the inputs, [`order`] puts every
//! file after the files it includes, [`parser`] classifies each line into the
//! [`graph::SymbolGraph`], and [`graph::SymbolGraph::link`] resolves names,
//! merges `modify` blocks and sorts everything for [`render`].

pub mod cursor;
pub mod error;
pub mod graph;
pub mod intake;
pub mod lexer;
pub mod macros;
pub mod model;
pub mod order;
pub mod parser;
pub mod render;

pub use error::{Error, Result};

use graph::SymbolGraph;
use model::SourceFile;
use std::path::PathBuf;

/// Knobs for the parse stage.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Directory holding macro-expanded copies of the inputs, by short name.
    pub mirror_dir: Option<PathBuf>,
    /// Expand `#define` macros while reading instead of relying on mirrors.
    pub expand_macros: bool,
}

/// Order, parse and link pre-scanned `files` into a finished graph.
pub fn build(files: Vec<SourceFile>, options: &ParseOptions) -> Result<SymbolGraph> {
    let files = order::dependency_order(files)?;
    let mut graph = SymbolGraph::new(files);
    parser::Parser::new(&mut graph, options).parse_all()?;
    graph.link();
    Ok(graph)
}
