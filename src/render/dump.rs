//! Plain-text dump of the linked graph for eyeballing what the parser saw.
//!
//! ```text
//! class Thing : object Mentionable // Anything in the game world.
//! 	property name // the name
//! 	method moveInto ( dest ) //
//! ```

use crate::graph::SymbolGraph;
use crate::model::DeclId;
use crate::render::base_name;
use std::io::{self, Write};

/// Write every class, then every object, with its members.
pub fn dump(graph: &SymbolGraph, out: &mut impl Write) -> io::Result<()> {
    for &id in graph.classes.iter().chain(&graph.objects) {
        dump_decl(graph, id, out)?;
    }
    Ok(())
}

fn dump_decl(graph: &SymbolGraph, id: DeclId, out: &mut impl Write) -> io::Result<()> {
    let decl = graph.decl(id);
    write!(out, "{} {} :", decl.kind_label(), decl.name())?;
    if let Some(shape) = decl.class_or_object() {
        for base in &shape.bases {
            write!(out, " {}", base_name(graph, base))?;
        }
    }
    writeln!(out, " // {}", decl.symbol.description)?;

    let Some(body) = decl.body() else {
        return Ok(());
    };
    for &p in &body.properties {
        let prop = graph.decl(p);
        writeln!(out, "\tproperty {} // {}", prop.name(), prop.symbol.description)?;
    }
    for &m in &body.methods {
        let method = graph.decl(m);
        write!(out, "\tmethod {} (", method.name())?;
        for param in method.params().unwrap_or_default() {
            write!(out, " {}", param)?;
        }
        writeln!(out, " ) // {}", method.symbol.description)?;
    }
    Ok(())
}
