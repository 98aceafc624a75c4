//! GitHub-flavored markdown renderer.
//!
//! Pages link to each other with relative paths so the output directory can
//! be browsed as-is or dropped into a docs site.

use crate::graph::SymbolGraph;
use crate::model::*;
use crate::render::{
    base_name, file_page_stem, inherited_members, page_stem, patch_notes, relative_link, signature, Renderer,
    SiteInfo, FILE_DIR, INDEX_PAGE,
};
use std::collections::HashSet;

const EXT: &str = "md";

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn index(&self, graph: &SymbolGraph, site: &SiteInfo) -> String {
        let from = INDEX_PAGE;
        let mut lines: Vec<String> = Vec::new();
        lines.push(format!("# TADS {} Library Reference\n", site.version()));

        let intro = site.introduction_text();
        if !intro.trim().is_empty() {
            lines.push(intro.trim_end().to_string());
            lines.push(String::new());
        }

        lines.push("## Files\n".to_string());
        for file in &graph.files {
            let target = file_page_stem(&file.short_name);
            lines.push(format!(
                "* [{}]({})",
                file.short_name,
                relative_link(from, &target, EXT)
            ));
        }
        lines.push(String::new());

        let actions: Vec<DeclId> = graph
            .classes
            .iter()
            .copied()
            .filter(|&id| graph.decl(id).as_class().is_some_and(|c| c.action))
            .collect();

        index_section(&mut lines, graph, from, "Classes", &graph.classes);
        index_section(&mut lines, graph, from, "Actions", &actions);
        index_section(&mut lines, graph, from, "Grammar", &graph.grammar_productions);
        index_section(&mut lines, graph, from, "Objects", &graph.objects);
        index_section(&mut lines, graph, from, "Functions", &graph.functions);
        index_section(&mut lines, graph, from, "Macros", &graph.macros);
        index_section(&mut lines, graph, from, "Enums", &graph.enums);
        index_section(&mut lines, graph, from, "Templates", &graph.templates);

        lines.join("\n")
    }

    fn declaration(&self, graph: &SymbolGraph, id: DeclId) -> String {
        let Some(from) = page_stem(graph, id) else {
            return String::new();
        };
        let decl = graph.decl(id);
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!("# {} {}\n", decl.kind_label(), decl.name()));
        lines.push(source_line(graph, &from, id));
        lines.push(String::new());

        if decl.symbol.description.is_empty() {
            lines.push("_no description available_".to_string());
        } else {
            lines.push(decl.symbol.description.clone());
        }
        lines.push(String::new());

        for (loc, text) in patch_notes(graph, id) {
            lines.push(format!("_Modified in {}:_\n", location_link(&from, loc)));
            lines.push(text.to_string());
            lines.push(String::new());
        }

        match &decl.kind {
            DeclKind::Class(class) => {
                lines.push("```".to_string());
                lines.push(declaration_text(graph, id));
                lines.push("```\n".to_string());

                lines.push("## Superclass Tree\n".to_string());
                parent_tree(&mut lines, graph, &from, id, 0, &mut HashSet::new());
                lines.push(String::new());

                lines.push("## Subclass Tree\n".to_string());
                if class.subclasses.is_empty() {
                    lines.push("_(none)_".to_string());
                } else {
                    child_tree(&mut lines, graph, &from, id, 0, &mut HashSet::new());
                }
                lines.push(String::new());

                lines.push("## Global Objects\n".to_string());
                link_list(&mut lines, graph, &from, &class.global_objects);
            }
            DeclKind::Object(_) => {
                lines.push("```".to_string());
                lines.push(declaration_text(graph, id));
                lines.push("```\n".to_string());

                lines.push("## Superclass Tree\n".to_string());
                parent_tree(&mut lines, graph, &from, id, 0, &mut HashSet::new());
                lines.push(String::new());
            }
            DeclKind::GrammarProduction(prod) => {
                lines.push("## Match Rules\n".to_string());
                if prod.match_classes.is_empty() {
                    lines.push("_(none)_".to_string());
                }
                for &class in &prod.match_classes {
                    lines.push(format!("### {}\n", link_to(graph, &from, class)));
                    if let Some(rule) = graph.decl(class).as_class().and_then(|c| c.grammar.as_ref()) {
                        lines.push("```".to_string());
                        lines.push(rule.rule.clone());
                        lines.push("```".to_string());
                    }
                    lines.push(String::new());
                }
            }
            _ => {}
        }

        member_summary(&mut lines, graph, &from, id, false);
        member_summary(&mut lines, graph, &from, id, true);
        member_details(&mut lines, graph, &from, id, false);
        member_details(&mut lines, graph, &from, id, true);

        lines.join("\n")
    }

    fn source_file(&self, graph: &SymbolGraph, file: &SourceFile) -> String {
        let from = file_page_stem(&file.short_name);
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!("# {}\n", file.short_name));
        lines.push(format!("_{} lines_\n", file.line_count));
        if file.description.is_empty() {
            lines.push("_no description available_".to_string());
        } else {
            lines.push(file.description.clone());
        }
        lines.push(String::new());

        if !file.includes.is_empty() {
            lines.push("## Includes\n".to_string());
            for include in &file.includes {
                let target = file_page_stem(include);
                lines.push(format!("* [{}]({})", include, relative_link(&from, &target, EXT)));
            }
            lines.push(String::new());
        }

        lines.push("## Classes\n".to_string());
        link_list(&mut lines, graph, &from, &file.classes);
        lines.push("## Objects\n".to_string());
        link_list(&mut lines, graph, &from, &file.objects);

        symbol_details(&mut lines, graph, "Functions", &file.functions, |decl| {
            decl.params().map(|p| signature(decl.name(), p))
        });
        symbol_details(&mut lines, graph, "Macros", &file.macros, |decl| match &decl.kind {
            DeclKind::Macro(m) if m.params.is_empty() => Some(format!("#define {} {}", decl.name(), m.body)),
            DeclKind::Macro(m) => Some(format!("#define {} {}", signature(decl.name(), &m.params), m.body)),
            _ => None,
        });
        enum_details(&mut lines, graph, file);
        symbol_details(&mut lines, graph, "Templates", &file.templates, |decl| match &decl.kind {
            DeclKind::Template(t) => Some(format!("{} template {}", decl.name(), t.body)),
            _ => None,
        });

        lines.join("\n")
    }

    fn file_extension(&self) -> &str {
        EXT
    }
}

// -- Building blocks -----------------------------------------------------------

/// GitHub heading anchor: lower case, only alphanumerics, spaces and
/// hyphens, spaces turned into hyphens.
fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

fn link_to(graph: &SymbolGraph, from: &str, id: DeclId) -> String {
    match page_stem(graph, id) {
        Some(target) => format!("[{}]({})", graph.name(id), relative_link(from, &target, EXT)),
        None => graph.name(id).to_string(),
    }
}

fn location_link(from: &str, loc: &SourceLoc) -> String {
    let target = file_page_stem(&loc.file);
    format!("[{}]({}) line {}", loc.file, relative_link(from, &target, EXT), loc.line)
}

fn source_line(graph: &SymbolGraph, from: &str, id: DeclId) -> String {
    let decl = graph.decl(id);
    let mut line = format!("Declared in {}", location_link(from, &decl.symbol.source));
    if let Some(shape) = decl.class_or_object() {
        if !shape.patched_at.is_empty() {
            let mods: Vec<String> = shape.patched_at.iter().map(|loc| location_link(from, loc)).collect();
            line.push_str(&format!("; modified in {}", mods.join(", ")));
        }
    }
    line
}

/// The declaration as it would be written: `class Thing: object, Mentionable`.
fn declaration_text(graph: &SymbolGraph, id: DeclId) -> String {
    let decl = graph.decl(id);
    if let Some(original) = decl.as_class().and_then(|c| c.original_definition.as_ref()) {
        return original.clone();
    }
    let mut text = match &decl.kind {
        DeclKind::Class(c) if c.intrinsic => format!("intrinsic class {}", decl.name()),
        DeclKind::Class(_) => format!("class {}", decl.name()),
        DeclKind::Object(o) if o.transient => format!("transient {}", decl.name()),
        _ => decl.name().to_string(),
    };
    if let Some(shape) = decl.class_or_object() {
        let bases: Vec<&str> = shape.bases.iter().map(|b| base_name(graph, b)).collect();
        if !bases.is_empty() {
            text.push_str(": ");
            text.push_str(&bases.join(", "));
        }
    }
    text
}

fn index_section(lines: &mut Vec<String>, graph: &SymbolGraph, from: &str, title: &str, ids: &[DeclId]) {
    if ids.is_empty() {
        return;
    }
    lines.push(format!("## {}\n", title));
    for &id in ids {
        let decl = graph.decl(id);
        let label = match page_stem(graph, id) {
            Some(target) if target.starts_with(FILE_DIR) => format!(
                "[{}]({}#{})",
                decl.name(),
                relative_link(from, &target, EXT),
                github_slug(decl.name())
            ),
            _ => link_to(graph, from, id),
        };
        lines.push(format!("* {} ({})", label, decl.symbol.source.file));
    }
    lines.push(String::new());
}

fn link_list(lines: &mut Vec<String>, graph: &SymbolGraph, from: &str, ids: &[DeclId]) {
    if ids.is_empty() {
        lines.push("_(none)_".to_string());
    } else {
        let links: Vec<String> = ids.iter().map(|&id| link_to(graph, from, id)).collect();
        lines.push(links.join(" &nbsp; "));
    }
    lines.push(String::new());
}

fn parent_tree(
    lines: &mut Vec<String>,
    graph: &SymbolGraph,
    from: &str,
    id: DeclId,
    depth: usize,
    visited: &mut HashSet<DeclId>,
) {
    let indent = "  ".repeat(depth);
    if depth == 0 {
        lines.push(format!("{}* **{}**", indent, graph.name(id)));
    } else {
        lines.push(format!("{}* {}", indent, link_to(graph, from, id)));
    }
    if !visited.insert(id) {
        return;
    }
    let Some(shape) = graph.decl(id).class_or_object() else {
        return;
    };
    for base in &shape.bases {
        match base {
            BaseRef::Decl(parent) => parent_tree(lines, graph, from, *parent, depth + 1, visited),
            BaseRef::Name(name) => lines.push(format!("{}  * {}", indent, name)),
        }
    }
}

fn child_tree(
    lines: &mut Vec<String>,
    graph: &SymbolGraph,
    from: &str,
    id: DeclId,
    depth: usize,
    visited: &mut HashSet<DeclId>,
) {
    let indent = "  ".repeat(depth);
    if depth == 0 {
        lines.push(format!("{}* **{}**", indent, graph.name(id)));
    } else {
        lines.push(format!("{}* {}", indent, link_to(graph, from, id)));
    }
    if !visited.insert(id) {
        return;
    }
    if let Some(class) = graph.decl(id).as_class() {
        for &child in &class.subclasses {
            child_tree(lines, graph, from, child, depth + 1, visited);
        }
    }
}

fn member_summary(lines: &mut Vec<String>, graph: &SymbolGraph, from: &str, id: DeclId, methods: bool) {
    let title = if methods { "Summary of Methods" } else { "Summary of Properties" };
    lines.push(format!("## {}\n", title));

    let own: Vec<DeclId> = graph
        .decl(id)
        .body()
        .map(|b| if methods { b.methods.clone() } else { b.properties.clone() })
        .unwrap_or_default();
    let inherited = inherited_members(graph, id, methods);
    if own.is_empty() && inherited.is_empty() {
        lines.push("_(none)_".to_string());
        lines.push(String::new());
        return;
    }

    if !own.is_empty() {
        let entries: Vec<String> = own
            .iter()
            .map(|&m| format!("[`{}`](#{})", graph.name(m), github_slug(graph.name(m))))
            .collect();
        lines.push(entries.join(" "));
        lines.push(String::new());
    }
    for (ancestor, members) in inherited {
        let Some(target) = page_stem(graph, ancestor) else {
            continue;
        };
        let page = relative_link(from, &target, EXT);
        lines.push(format!("Inherited from `{}`:\n", graph.name(ancestor)));
        let entries: Vec<String> = members
            .iter()
            .map(|&m| format!("[`{}`]({}#{})", graph.name(m), page, github_slug(graph.name(m))))
            .collect();
        lines.push(entries.join(" "));
        lines.push(String::new());
    }
}

fn member_details(lines: &mut Vec<String>, graph: &SymbolGraph, from: &str, id: DeclId, methods: bool) {
    lines.push(format!("## {}\n", if methods { "Methods" } else { "Properties" }));
    let Some(body) = graph.decl(id).body() else {
        return;
    };
    let list = if methods { &body.methods } else { &body.properties };
    if list.is_empty() {
        lines.push("_(none)_".to_string());
        lines.push(String::new());
        return;
    }

    for &m in list {
        let decl = graph.decl(m);
        lines.push(format!("### {}\n", decl.name()));

        let shown = match decl.params() {
            Some(params) => signature(decl.name(), params),
            None => decl.name().to_string(),
        };
        let mut badges = vec![format!("`{}`", shown)];
        if let Some(member) = decl.member() {
            if member.overridden {
                badges.push("_overridden_".to_string());
            }
            if member.interface_only {
                badges.push("_interface only_".to_string());
            }
        }
        lines.push(badges.join(" "));
        lines.push(String::new());
        lines.push(source_line_member(from, decl));
        lines.push(String::new());
        if !decl.symbol.description.is_empty() {
            lines.push(decl.symbol.description.clone());
            lines.push(String::new());
        }
    }
}

fn source_line_member(from: &str, decl: &Decl) -> String {
    let mut line = format!("Defined in {}", location_link(from, &decl.symbol.source));
    if let Some(member) = decl.member() {
        if !member.patched_at.is_empty() {
            let mods: Vec<String> = member.patched_at.iter().map(|loc| location_link(from, loc)).collect();
            line.push_str(&format!("; modified in {}", mods.join(", ")));
        }
    }
    line
}

/// Heading, code block and description for each file-level symbol.
fn symbol_details(
    lines: &mut Vec<String>,
    graph: &SymbolGraph,
    title: &str,
    ids: &[DeclId],
    code: impl Fn(&Decl) -> Option<String>,
) {
    if ids.is_empty() {
        return;
    }
    lines.push(format!("## {}\n", title));
    for &id in ids {
        let decl = graph.decl(id);
        lines.push(format!("### {}\n", decl.name()));
        if let Some(code) = code(decl) {
            lines.push("```".to_string());
            lines.push(code);
            lines.push("```".to_string());
        }
        lines.push(format!("_line {}_\n", decl.symbol.source.line));
        if !decl.symbol.description.is_empty() {
            lines.push(decl.symbol.description.clone());
            lines.push(String::new());
        }
    }
}

fn enum_details(lines: &mut Vec<String>, graph: &SymbolGraph, file: &SourceFile) {
    if file.enum_groups.is_empty() {
        return;
    }
    lines.push("## Enums\n".to_string());
    for &group_id in &file.enum_groups {
        let group = graph.enum_group(group_id);
        for &e in &group.enums {
            lines.push(format!("<a id=\"{}\"></a>", github_slug(graph.name(e))));
        }
        let names: Vec<&str> = group.enums.iter().map(|&e| graph.name(e)).collect();
        lines.push(format!("### {}\n", names.join(", ")));
        lines.push(format!("_line {}_\n", group.source.line));
        if !group.description.is_empty() {
            lines.push(group.description.clone());
            lines.push(String::new());
        }
    }
}
