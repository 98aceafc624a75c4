//! JSON renderer: structured output for tooling integration.
//!
//! Every page is one JSON object. Cross references carry the target page
//! stem (relative to the site root, without extension) so consumers can
//! pick their own link format.

use crate::graph::SymbolGraph;
use crate::model::*;
use crate::render::{inherited_members, page_stem, patch_notes, Renderer, SiteInfo};
use serde_json::{json, Value};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn index(&self, graph: &SymbolGraph, site: &SiteInfo) -> String {
        let actions: Vec<DeclId> = graph
            .classes
            .iter()
            .copied()
            .filter(|&id| graph.decl(id).as_class().is_some_and(|c| c.action))
            .collect();
        let files: Vec<Value> = graph
            .files
            .iter()
            .map(|f| json!({ "name": f.short_name, "header": f.is_header }))
            .collect();

        let page = json!({
            "version": site.version(),
            "introduction": site.introduction_text(),
            "files": files,
            "classes": refs(graph, &graph.classes),
            "actions": refs(graph, &actions),
            "grammar": refs(graph, &graph.grammar_productions),
            "objects": refs(graph, &graph.objects),
            "functions": refs(graph, &graph.functions),
            "macros": refs(graph, &graph.macros),
            "enums": refs(graph, &graph.enums),
            "templates": refs(graph, &graph.templates),
            "messages": graph.messages.iter().map(|&id| message(graph, id)).collect::<Vec<_>>(),
        });
        format!("{:#}\n", page)
    }

    fn declaration(&self, graph: &SymbolGraph, id: DeclId) -> String {
        let decl = graph.decl(id);
        let mut page = json!({
            "kind": decl.kind_label(),
            "name": decl.name(),
            "description": decl.symbol.description,
            "source": decl.symbol.source,
        });
        let Value::Object(fields) = &mut page else {
            return String::new();
        };

        if let Some(body) = decl.body() {
            fields.insert("file_name".into(), json!(body.file_name));
            fields.insert("properties".into(), members(graph, &body.properties));
            fields.insert("methods".into(), members(graph, &body.methods));
            fields.insert("inherited_properties".into(), inherited(graph, id, false));
            fields.insert("inherited_methods".into(), inherited(graph, id, true));
        }

        if let Some(shape) = decl.class_or_object() {
            let bases: Vec<Value> = shape
                .bases
                .iter()
                .map(|b| match b {
                    BaseRef::Name(name) => json!({ "name": name }),
                    BaseRef::Decl(d) => reference(graph, *d),
                })
                .collect();
            let notes: Vec<Value> = patch_notes(graph, id)
                .into_iter()
                .map(|(loc, text)| json!({ "source": loc, "description": text }))
                .collect();
            fields.insert("bases".into(), json!(bases));
            fields.insert("modified_in".into(), json!(shape.patched_at));
            fields.insert("modifications".into(), json!(notes));
        }

        match &decl.kind {
            DeclKind::Class(class) => {
                fields.insert("intrinsic".into(), json!(class.intrinsic));
                fields.insert("action".into(), json!(class.action));
                fields.insert("original_definition".into(), json!(class.original_definition));
                fields.insert("subclasses".into(), refs(graph, &class.subclasses));
                fields.insert("global_objects".into(), refs(graph, &class.global_objects));
                if let Some(grammar) = &class.grammar {
                    fields.insert("rule".into(), json!(grammar.rule));
                    fields.insert("production".into(), reference(graph, grammar.production));
                }
            }
            DeclKind::Object(object) => {
                fields.insert("transient".into(), json!(object.transient));
                fields.insert("action".into(), json!(object.action));
            }
            DeclKind::GrammarProduction(prod) => {
                let rules: Vec<Value> = prod
                    .match_classes
                    .iter()
                    .map(|&class| {
                        let mut entry = reference(graph, class);
                        let grammar = graph.decl(class).as_class().and_then(|c| c.grammar.as_ref());
                        if let (Value::Object(fields), Some(grammar)) = (&mut entry, grammar) {
                            fields.insert("rule".into(), json!(grammar.rule));
                        }
                        entry
                    })
                    .collect();
                fields.insert("match_classes".into(), json!(rules));
            }
            _ => {}
        }

        format!("{:#}\n", page)
    }

    fn source_file(&self, graph: &SymbolGraph, file: &SourceFile) -> String {
        let macros: Vec<Value> = file
            .macros
            .iter()
            .map(|&id| {
                let decl = graph.decl(id);
                let body = match &decl.kind {
                    DeclKind::Macro(m) => m.body.as_str(),
                    _ => "",
                };
                json!({
                    "name": decl.name(),
                    "params": decl.params(),
                    "body": body,
                    "description": decl.symbol.description,
                    "line": decl.symbol.source.line,
                })
            })
            .collect();
        let templates: Vec<Value> = file
            .templates
            .iter()
            .map(|&id| {
                let decl = graph.decl(id);
                let body = match &decl.kind {
                    DeclKind::Template(t) => t.body.as_str(),
                    _ => "",
                };
                json!({
                    "name": decl.name(),
                    "body": body,
                    "description": decl.symbol.description,
                    "line": decl.symbol.source.line,
                })
            })
            .collect();
        let enums: Vec<Value> = file
            .enum_groups
            .iter()
            .map(|&group_id| {
                let group = graph.enum_group(group_id);
                let names: Vec<&str> = group.enums.iter().map(|&e| graph.name(e)).collect();
                json!({
                    "names": names,
                    "description": group.description,
                    "line": group.source.line,
                })
            })
            .collect();

        let page = json!({
            "name": file.short_name,
            "header": file.is_header,
            "lines": file.line_count,
            "description": file.description,
            "includes": file.includes,
            "classes": refs(graph, &file.classes),
            "objects": refs(graph, &file.objects),
            "functions": members(graph, &file.functions),
            "macros": macros,
            "enums": enums,
            "templates": templates,
        });
        format!("{:#}\n", page)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

/// Name, source and page of a declaration.
fn reference(graph: &SymbolGraph, id: DeclId) -> Value {
    let decl = graph.decl(id);
    json!({
        "name": decl.name(),
        "source": decl.symbol.source,
        "page": page_stem(graph, id),
    })
}

fn refs(graph: &SymbolGraph, ids: &[DeclId]) -> Value {
    Value::Array(ids.iter().map(|&id| reference(graph, id)).collect())
}

/// Methods, properties and functions with their details.
fn members(graph: &SymbolGraph, ids: &[DeclId]) -> Value {
    let list = ids
        .iter()
        .map(|&id| {
            let decl = graph.decl(id);
            let mut entry = json!({
                "name": decl.name(),
                "description": decl.symbol.description,
                "source": decl.symbol.source,
            });
            if let Value::Object(fields) = &mut entry {
                if let Some(params) = decl.params() {
                    fields.insert("params".into(), json!(params));
                }
                if let Some(member) = decl.member() {
                    fields.insert("overridden".into(), json!(member.overridden));
                    fields.insert("interface_only".into(), json!(member.interface_only));
                    fields.insert("modified_in".into(), json!(member.patched_at));
                }
            }
            entry
        })
        .collect();
    Value::Array(list)
}

fn inherited(graph: &SymbolGraph, id: DeclId, methods: bool) -> Value {
    let groups = inherited_members(graph, id, methods)
        .into_iter()
        .map(|(ancestor, members)| {
            let names: Vec<&str> = members.iter().map(|&m| graph.name(m)).collect();
            json!({ "from": reference(graph, ancestor), "names": names })
        })
        .collect();
    Value::Array(groups)
}

fn message(graph: &SymbolGraph, id: DeclId) -> Value {
    let decl = graph.decl(id);
    let (kind, text) = match &decl.kind {
        DeclKind::Message(m) => (Some(m.kind), m.text.as_str()),
        _ => (None, ""),
    };
    json!({
        "kind": kind,
        "name": decl.name(),
        "text": text,
        "source": decl.symbol.source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::build_from_sources;

    const SOURCE: &str = "\
/* things */
class Thing: object
    name = nil
    moveInto(dest) { }
;
modify Thing
    /* moves the thing */
    moveInto(dest) { }
;
class Container: Thing
    moveInto(dest) { }
;
";

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn class_page_carries_members_and_links() {
        let graph = build_from_sources(&[("thing.t", SOURCE)]);
        let thing = graph.find_class("Thing").unwrap();
        let page = parse(&JsonRenderer.declaration(&graph, thing));

        assert_eq!(page["kind"], "class");
        assert_eq!(page["name"], "Thing");
        assert_eq!(page["source"]["line"], 2);
        assert_eq!(page["bases"][0]["name"], "object");
        assert_eq!(page["modified_in"][0]["line"], 6);
        assert_eq!(page["properties"][0]["name"], "name");
        assert_eq!(page["methods"][0]["params"][0], "dest");
        assert_eq!(page["methods"][0]["modified_in"][0]["file"], "thing.t");
        assert_eq!(page["subclasses"][0]["page"], "objects/Container");
    }

    #[test]
    fn overrides_are_flagged() {
        let graph = build_from_sources(&[("thing.t", SOURCE)]);
        let container = graph.find_class("Container").unwrap();
        let page = parse(&JsonRenderer.declaration(&graph, container));
        assert_eq!(page["methods"][0]["overridden"], true);
        assert_eq!(page["bases"][0]["page"], "objects/Thing");
        assert_eq!(page["inherited_properties"][0]["names"][0], "name");
    }

    #[test]
    fn index_and_file_pages() {
        let graph = build_from_sources(&[("thing.t", SOURCE)]);
        let site = SiteInfo {
            version: "3.1.3".to_string(),
            introduction: String::new(),
        };
        let index = parse(&JsonRenderer.index(&graph, &site));
        assert_eq!(index["version"], "3.1.3");
        assert_eq!(index["classes"].as_array().unwrap().len(), 2);
        assert_eq!(index["files"][0]["name"], "thing.t");

        let file = parse(&JsonRenderer.source_file(&graph, &graph.files[0]));
        assert_eq!(file["description"], "things");
        assert_eq!(file["lines"], 12);
        assert_eq!(file["classes"][1]["name"], "Thing");
    }
}
