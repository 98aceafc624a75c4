//! The symbol graph: an arena of declarations plus the name-keyed indexes the
//! renderer walks.
//!
//! Classification appends to the graph file by file; [`SymbolGraph::link`]
//! then resolves names into [`DeclId`] links exactly once.

mod link;

use crate::macros::MacroDef;
use crate::model::*;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct SymbolGraph {
    decls: Vec<Decl>,
    groups: Vec<EnumGroup>,
    /// Input files; parse order until linking, then sorted by short name.
    pub files: Vec<SourceFile>,
    pub classes: Vec<DeclId>,
    pub objects: Vec<DeclId>,
    pub grammar_productions: Vec<DeclId>,
    pub functions: Vec<DeclId>,
    pub macros: Vec<DeclId>,
    pub templates: Vec<DeclId>,
    /// `modify` blocks in the order they were read.
    pub patches: Vec<DeclId>,
    pub messages: Vec<DeclId>,
    pub enum_groups: Vec<EnumGroupId>,
    /// Every enum of every group; filled by the link pass.
    pub enums: Vec<DeclId>,
    /// Lower-cased generated file names handed out so far.
    file_names: HashSet<String>,
}

impl SymbolGraph {
    pub fn new(files: Vec<SourceFile>) -> Self {
        SymbolGraph {
            files,
            ..Default::default()
        }
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.0]
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.0]
    }

    pub fn name(&self, id: DeclId) -> &str {
        self.decl(id).name()
    }

    pub fn enum_group(&self, id: EnumGroupId) -> &EnumGroup {
        &self.groups[id.0]
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// Append a declaration to the arena. Indexing it is up to the caller.
    pub fn add_decl(&mut self, decl: Decl) -> DeclId {
        self.decls.push(decl);
        DeclId(self.decls.len() - 1)
    }

    pub fn add_enum_group(&mut self, group: EnumGroup) -> EnumGroupId {
        self.groups.push(group);
        let id = EnumGroupId(self.groups.len() - 1);
        self.enum_groups.push(id);
        id
    }

    pub(crate) fn enum_group_mut(&mut self, id: EnumGroupId) -> &mut EnumGroup {
        &mut self.groups[id.0]
    }

    pub fn file_index(&self, short_name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.short_name == short_name)
    }

    /// Hand out an output file name for `name` that no earlier declaration
    /// uses, ignoring case: `Widget`, then `widget1`, `widget2`, ...
    pub fn allocate_file_name(&mut self, name: &str) -> String {
        let mut candidate = name.to_string();
        let mut suffix = 1;
        while self.file_names.contains(&candidate.to_lowercase()) {
            candidate = format!("{name}{suffix}");
            suffix += 1;
        }
        self.file_names.insert(candidate.to_lowercase());
        candidate
    }

    pub fn find_class(&self, name: &str) -> Option<DeclId> {
        self.classes.iter().copied().find(|&id| self.name(id) == name)
    }

    /// Classes are searched before objects.
    pub fn find_class_or_object(&self, name: &str) -> Option<DeclId> {
        self.find_class(name)
            .or_else(|| self.objects.iter().copied().find(|&id| self.name(id) == name))
    }

    pub fn find_grammar_production(&self, name: &str) -> Option<DeclId> {
        self.grammar_productions
            .iter()
            .copied()
            .find(|&id| self.name(id) == name)
    }

    /// Macros visible while parsing a file: its own, then those of every
    /// file it includes, depth first, in lookup priority order.
    pub fn visible_macros(&self, file: usize) -> Vec<MacroDef> {
        let mut seen = HashSet::new();
        let mut defs = Vec::new();
        self.collect_macros(file, &mut seen, &mut defs);
        defs
    }

    fn collect_macros(&self, file: usize, seen: &mut HashSet<usize>, defs: &mut Vec<MacroDef>) {
        if !seen.insert(file) {
            return;
        }
        for &id in &self.files[file].macros {
            let decl = self.decl(id);
            if let DeclKind::Macro(m) = &decl.kind {
                defs.push(MacroDef {
                    name: decl.symbol.name.clone(),
                    params: m.params.clone(),
                    body: m.body.clone(),
                });
            }
        }
        for include in &self.files[file].includes {
            if let Some(index) = self.file_index(include) {
                self.collect_macros(index, seen, defs);
            }
        }
    }

    /// Display order: case-insensitive name, then source file, then line.
    pub fn compare(&self, a: DeclId, b: DeclId) -> Ordering {
        compare_symbols(&self.decl(a).symbol, &self.decl(b).symbol)
    }

    pub fn sort_ids(&self, ids: &mut [DeclId]) {
        ids.sort_by(|&a, &b| self.compare(a, b));
    }

    /// The members of `id` named `name`, if `id` has a body.
    pub fn find_member(&self, id: DeclId, name: &str, methods: bool) -> Option<DeclId> {
        let body = self.decl(id).body()?;
        let list = if methods { &body.methods } else { &body.properties };
        list.iter().copied().find(|&m| self.name(m) == name)
    }
}

pub(crate) fn compare_symbols(a: &Symbol, b: &Symbol) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.source.file.to_lowercase().cmp(&b.source.file.to_lowercase()))
        .then_with(|| a.source.line.cmp(&b.source.line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, file: &str, line: usize) -> Decl {
        Decl {
            symbol: Symbol {
                name: name.to_string(),
                description: String::new(),
                source: SourceLoc::new(file, line),
            },
            kind: DeclKind::Class(ClassDecl::default()),
        }
    }

    #[test]
    fn file_names_are_unique_ignoring_case() {
        let mut graph = SymbolGraph::default();
        assert_eq!(graph.allocate_file_name("Widget"), "Widget");
        assert_eq!(graph.allocate_file_name("widget"), "widget1");
        assert_eq!(graph.allocate_file_name("WIDGET"), "WIDGET2");
        assert_eq!(graph.allocate_file_name("Gadget"), "Gadget");
    }

    #[test]
    fn file_names_are_deterministic() {
        let run = || {
            let mut graph = SymbolGraph::default();
            ["Widget", "widget", "Widget"]
                .iter()
                .map(|n| graph.allocate_file_name(n))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn sort_is_case_insensitive_then_location() {
        let mut graph = SymbolGraph::default();
        let b = graph.add_decl(class("beta", "a.t", 1));
        let a2 = graph.add_decl(class("Alpha", "b.t", 5));
        let a1 = graph.add_decl(class("alpha", "a.t", 9));
        let mut ids = vec![b, a2, a1];
        graph.sort_ids(&mut ids);
        assert_eq!(ids, vec![a1, a2, b]);
    }

    #[test]
    fn visible_macros_follow_includes_once() {
        let mut a = SourceFile::new("a.h");
        a.includes = vec!["b.h".to_string()];
        let mut b = SourceFile::new("b.h");
        b.includes = vec!["a.h".to_string()];
        let mut graph = SymbolGraph::new(vec![a, b]);
        let id = graph.add_decl(Decl {
            symbol: Symbol {
                name: "TRUE_".to_string(),
                description: String::new(),
                source: SourceLoc::new("b.h", 1),
            },
            kind: DeclKind::Macro(MacroDecl {
                params: vec![],
                body: "true".to_string(),
            }),
        });
        graph.files[1].macros.push(id);

        let defs = graph.visible_macros(0);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "TRUE_");
    }
}
