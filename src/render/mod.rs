//! Renderer module: trait-based format dispatch plus the site layout shared
//! by every format.
//!
//! A site is one page per class, object and grammar production under
//! `objects/`, one page per source file under `files/`, and an `index` page
//! listing everything.

pub mod dump;
pub mod json;
pub mod markdown;

use crate::error::{Error, Result};
use crate::graph::SymbolGraph;
use crate::model::*;
use anyhow::anyhow;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const OBJECT_DIR: &str = "objects";
pub const FILE_DIR: &str = "files";
pub const INDEX_PAGE: &str = "index";

/// Version shown when none was given.
const DEFAULT_VERSION: &str = "3";

/// Run-wide values shown on the index page.
#[derive(Debug, Clone, Default)]
pub struct SiteInfo {
    pub version: String,
    pub introduction: String,
}

impl SiteInfo {
    pub fn version(&self) -> &str {
        if self.version.is_empty() {
            DEFAULT_VERSION
        } else {
            &self.version
        }
    }

    /// The introduction with `$$VERSION$$` replaced.
    pub fn introduction_text(&self) -> String {
        self.introduction.replace("$$VERSION$$", self.version())
    }
}

/// Trait for rendering the pages of a linked [`SymbolGraph`].
pub trait Renderer {
    fn index(&self, graph: &SymbolGraph, site: &SiteInfo) -> String;
    /// Page of a class, object or grammar production.
    fn declaration(&self, graph: &SymbolGraph, id: DeclId) -> String;
    fn source_file(&self, graph: &SymbolGraph, file: &SourceFile) -> String;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> anyhow::Result<Box<dyn Renderer>> {
    match format {
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use markdown or json", format)),
    }
}

/// Write every page of the site below `out_dir`; returns the written paths.
pub fn write_site(
    graph: &SymbolGraph,
    site: &SiteInfo,
    renderer: &dyn Renderer,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let ext = renderer.file_extension();
    for dir in [OBJECT_DIR, FILE_DIR] {
        let path = out_dir.join(dir);
        fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
    }

    let mut written = Vec::new();
    let mut write = |stem: String, content: String| -> Result<()> {
        let path = out_dir.join(format!("{stem}.{ext}"));
        log::debug!("writing {}", path.display());
        fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
        written.push(path);
        Ok(())
    };

    for &id in page_decls(graph) {
        if let Some(stem) = page_stem(graph, id) {
            write(stem, renderer.declaration(graph, id))?;
        }
    }
    for file in &graph.files {
        write(file_page_stem(&file.short_name), renderer.source_file(graph, file))?;
    }
    write(INDEX_PAGE.to_string(), renderer.index(graph, site))?;

    Ok(written)
}

// -- Page addressing ---------------------------------------------------------

/// Declarations that get a page of their own, in index order.
fn page_decls(graph: &SymbolGraph) -> impl Iterator<Item = &DeclId> {
    graph
        .classes
        .iter()
        .chain(&graph.objects)
        .chain(&graph.grammar_productions)
}

pub fn file_page_stem(short_name: &str) -> String {
    format!("{FILE_DIR}/{short_name}")
}

/// Page a declaration is documented on, relative to the site root and
/// without extension. Members live on their owner's page, file-level
/// symbols on their file's page; an unresolved `modify` has no page.
pub fn page_stem(graph: &SymbolGraph, id: DeclId) -> Option<String> {
    let decl = graph.decl(id);
    match &decl.kind {
        DeclKind::Class(_) | DeclKind::Object(_) | DeclKind::GrammarProduction(_) => {
            decl.body().map(|b| format!("{OBJECT_DIR}/{}", b.file_name))
        }
        DeclKind::Patch(p) => p.target.and_then(|t| page_stem(graph, t)),
        DeclKind::Method(_) | DeclKind::Property(_) => {
            let owner = decl.member()?.owner;
            page_stem(graph, owner)
        }
        _ => Some(file_page_stem(&decl.symbol.source.file)),
    }
}

/// Path from one page to another, both given as stems.
pub fn relative_link(from_stem: &str, to_stem: &str, ext: &str) -> String {
    let depth = from_stem.matches('/').count();
    format!("{}{to_stem}.{ext}", "../".repeat(depth))
}

// -- Shared views ------------------------------------------------------------

/// Members a class or object inherits but does not redefine, grouped by the
/// ancestor they come from, nearest ancestor first.
pub fn inherited_members(graph: &SymbolGraph, id: DeclId, methods: bool) -> Vec<(DeclId, Vec<DeclId>)> {
    let mut seen: HashSet<String> = graph
        .decl(id)
        .body()
        .map(|b| member_list(b, methods).iter().map(|&m| graph.name(m).to_string()).collect())
        .unwrap_or_default();
    let mut visited = HashSet::from([id]);
    let mut groups = Vec::new();
    collect_inherited(graph, id, methods, &mut seen, &mut visited, &mut groups);
    groups
}

fn collect_inherited(
    graph: &SymbolGraph,
    id: DeclId,
    methods: bool,
    seen: &mut HashSet<String>,
    visited: &mut HashSet<DeclId>,
    groups: &mut Vec<(DeclId, Vec<DeclId>)>,
) {
    for base in resolved_bases(graph, id) {
        if !visited.insert(base) {
            continue;
        }
        if let Some(body) = graph.decl(base).body() {
            let fresh: Vec<DeclId> = member_list(body, methods)
                .iter()
                .copied()
                .filter(|&m| seen.insert(graph.name(m).to_string()))
                .collect();
            if !fresh.is_empty() {
                groups.push((base, fresh));
            }
        }
        collect_inherited(graph, base, methods, seen, visited, groups);
    }
}

fn member_list(body: &Body, methods: bool) -> &[DeclId] {
    if methods {
        &body.methods
    } else {
        &body.properties
    }
}

fn resolved_bases(graph: &SymbolGraph, id: DeclId) -> Vec<DeclId> {
    graph
        .decl(id)
        .class_or_object()
        .map(|shape| {
            shape
                .bases
                .iter()
                .filter_map(|b| match b {
                    BaseRef::Decl(d) => Some(*d),
                    BaseRef::Name(_) => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Display name of a base reference.
pub fn base_name<'a>(graph: &'a SymbolGraph, base: &'a BaseRef) -> &'a str {
    match base {
        BaseRef::Name(name) => name,
        BaseRef::Decl(id) => graph.name(*id),
    }
}

/// Parameter list as written in a signature.
pub fn signature(name: &str, params: &[String]) -> String {
    format!("{}({})", name, params.join(", "))
}

/// Non-empty `modify` descriptions applied to a declaration, with where
/// each one was written.
pub fn patch_notes(graph: &SymbolGraph, id: DeclId) -> Vec<(&SourceLoc, &str)> {
    let Some(shape) = graph.decl(id).class_or_object() else {
        return Vec::new();
    };
    shape
        .patches
        .iter()
        .map(|&p| &graph.decl(p).symbol)
        .filter(|s| !s.description.is_empty())
        .map(|s| (&s.source, s.description.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::build_from_sources;

    const SOURCE: &str = "\
/* things */
class Thing: object
    name = nil
    desc() { }
;
class Container: Thing
    name = 'box'
    open() { }
;
";

    #[test]
    fn unknown_format_is_rejected() {
        let err = create_renderer("html").err().unwrap();
        assert!(err.to_string().contains("unknown format: html"));
        assert_eq!(create_renderer("md").unwrap().file_extension(), "md");
    }

    #[test]
    fn members_live_on_their_owner_page() {
        let graph = build_from_sources(&[("thing.t", SOURCE)]);
        let thing = graph.find_class("Thing").unwrap();
        let name = graph.find_member(thing, "name", false).unwrap();
        assert_eq!(page_stem(&graph, thing).unwrap(), "objects/Thing");
        assert_eq!(page_stem(&graph, name).unwrap(), "objects/Thing");
    }

    #[test]
    fn relative_links_climb_out_of_subdirectories() {
        assert_eq!(relative_link("objects/Thing", "files/thing.t", "md"), "../files/thing.t.md");
        assert_eq!(relative_link("index", "objects/Thing", "json"), "objects/Thing.json");
    }

    #[test]
    fn inherited_members_skip_redefinitions() {
        let graph = build_from_sources(&[("thing.t", SOURCE)]);
        let container = graph.find_class("Container").unwrap();
        let thing = graph.find_class("Thing").unwrap();

        let props = inherited_members(&graph, container, false);
        assert!(props.is_empty());

        let methods = inherited_members(&graph, container, true);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].0, thing);
        let names: Vec<&str> = methods[0].1.iter().map(|&m| graph.name(m)).collect();
        assert_eq!(names, vec!["desc"]);
    }

    #[test]
    fn introduction_gets_the_version() {
        let mut site = SiteInfo {
            version: String::new(),
            introduction: "TADS $$VERSION$$ library".to_string(),
        };
        assert_eq!(site.introduction_text(), "TADS 3 library");
        site.version = "3.1.3".to_string();
        assert_eq!(site.introduction_text(), "TADS 3.1.3 library");
    }

    #[test]
    fn site_has_a_page_per_declaration_and_file() {
        let graph = build_from_sources(&[("thing.t", SOURCE)]);
        let dir = tempfile::tempdir().unwrap();
        let renderer = create_renderer("markdown").unwrap();
        let written = write_site(&graph, &SiteInfo::default(), renderer.as_ref(), dir.path()).unwrap();

        assert_eq!(written.len(), 4);
        assert!(dir.path().join("objects/Thing.md").is_file());
        assert!(dir.path().join("objects/Container.md").is_file());
        assert!(dir.path().join("files/thing.t.md").is_file());
        assert!(dir.path().join("index.md").is_file());
    }
}
