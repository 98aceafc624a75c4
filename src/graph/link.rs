//! The link pass: runs once after every file has been classified.
//!
//! Order matters. Patches are merged before bases are linked so that patched
//! members take part in override detection, and per-file lists are finalised
//! only after the global sort.

use super::SymbolGraph;
use crate::model::*;
use std::collections::HashSet;

impl SymbolGraph {
    pub fn link(&mut self) {
        self.sort_collections();
        self.merge_patches();
        self.link_bases();
        self.collect_grammar_members();
        self.sort_members();
        self.post_process_files();
        self.mark_overrides();
        self.flatten_enums();
    }

    fn sorted(&self, mut ids: Vec<DeclId>) -> Vec<DeclId> {
        self.sort_ids(&mut ids);
        ids
    }

    // -- Sorting ---------------------------------------------------------------

    fn sort_collections(&mut self) {
        self.files
            .sort_by(|a, b| a.short_name.to_lowercase().cmp(&b.short_name.to_lowercase()));

        let ids = std::mem::take(&mut self.classes);
        self.classes = self.sorted(ids);
        let ids = std::mem::take(&mut self.objects);
        self.objects = self.sorted(ids);
        let ids = std::mem::take(&mut self.grammar_productions);
        self.grammar_productions = self.sorted(ids);
        let ids = std::mem::take(&mut self.functions);
        self.functions = self.sorted(ids);
        let ids = std::mem::take(&mut self.macros);
        self.macros = self.sorted(ids);
        let ids = std::mem::take(&mut self.templates);
        self.templates = self.sorted(ids);
        let ids = std::mem::take(&mut self.messages);
        self.messages = self.sorted(ids);
    }

    fn sort_members(&mut self) {
        let holders: Vec<DeclId> = self
            .classes
            .iter()
            .chain(&self.objects)
            .chain(&self.grammar_productions)
            .copied()
            .collect();
        for id in holders {
            let Some(body) = self.decl(id).body() else {
                continue;
            };
            let methods = self.sorted(body.methods.clone());
            let properties = self.sorted(body.properties.clone());
            let global_objects = self
                .decl(id)
                .as_class()
                .map(|c| self.sorted(c.global_objects.clone()));
            let match_classes = match &self.decl(id).kind {
                DeclKind::GrammarProduction(g) => Some(self.sorted(g.match_classes.clone())),
                _ => None,
            };

            let decl = self.decl_mut(id);
            if let Some(body) = decl.body_mut() {
                body.methods = methods;
                body.properties = properties;
            }
            match &mut decl.kind {
                DeclKind::Class(c) => {
                    if let Some(objects) = global_objects {
                        c.global_objects = objects;
                    }
                }
                DeclKind::GrammarProduction(g) => {
                    if let Some(classes) = match_classes {
                        g.match_classes = classes;
                    }
                }
                _ => {}
            }
        }
    }

    // -- Patches ---------------------------------------------------------------

    fn merge_patches(&mut self) {
        for patch in self.patches.clone() {
            let name = self.name(patch).to_string();
            let Some(target) = self.find_class_or_object(&name) else {
                log::debug!("modify {name}: no class or object of that name");
                continue;
            };
            let source = self.decl(patch).symbol.source.clone();
            let (methods, properties) = match self.decl(patch).body() {
                Some(body) => (body.methods.clone(), body.properties.clone()),
                None => continue,
            };
            for method in methods {
                self.merge_member(target, method, true);
            }
            for property in properties {
                self.merge_member(target, property, false);
            }

            let file_name = self
                .decl(target)
                .body()
                .map(|b| b.file_name.clone())
                .unwrap_or_default();
            if let Some(shape) = self.decl_mut(target).class_or_object_mut() {
                shape.patched_at.push(source);
                shape.patches.push(patch);
            }
            if let DeclKind::Patch(p) = &mut self.decl_mut(patch).kind {
                p.target = Some(target);
                p.body.file_name = file_name;
            }
        }
    }

    /// Add a patch member to `target`, or record the patch on the member of
    /// the same name it already has.
    fn merge_member(&mut self, target: DeclId, member: DeclId, method: bool) {
        let name = self.name(member).to_string();
        match self.find_member(target, &name, method) {
            Some(existing) => {
                let source = self.decl(member).symbol.source.clone();
                if let Some(info) = self.decl_mut(existing).member_mut() {
                    info.patched_at.push(source);
                    info.patches.push(member);
                }
            }
            None => {
                if let Some(body) = self.decl_mut(target).body_mut() {
                    if method {
                        body.methods.push(member);
                    } else {
                        body.properties.push(member);
                    }
                }
            }
        }
    }

    // -- Inheritance -----------------------------------------------------------

    fn link_bases(&mut self) {
        let holders: Vec<DeclId> = self.classes.iter().chain(&self.objects).copied().collect();
        for id in holders {
            let is_class = self.decl(id).as_class().is_some();
            let Some(shape) = self.decl(id).class_or_object() else {
                continue;
            };
            let bases = shape.bases.clone();

            let mut resolved = Vec::with_capacity(bases.len());
            for base in bases {
                let name = match base {
                    BaseRef::Name(name) => name,
                    linked => {
                        resolved.push(linked);
                        continue;
                    }
                };
                let Some(target) = self.find_class_or_object(&name) else {
                    log::debug!("{}: base {name} is not a known class or object", self.name(id));
                    resolved.push(BaseRef::Name(name));
                    continue;
                };
                if let Some(class) = self.decl_mut(target).as_class_mut() {
                    let links = if is_class {
                        &mut class.subclasses
                    } else {
                        &mut class.global_objects
                    };
                    if !links.contains(&id) {
                        links.push(id);
                    }
                }
                resolved.push(BaseRef::Decl(target));
            }

            if let Some(shape) = self.decl_mut(id).class_or_object_mut() {
                shape.bases = resolved;
            }
        }
    }

    /// Resolved bases of `id` that are classes.
    fn class_bases(&self, id: DeclId) -> Vec<DeclId> {
        let Some(shape) = self.decl(id).class_or_object() else {
            return Vec::new();
        };
        shape
            .bases
            .iter()
            .filter_map(|b| match b {
                BaseRef::Decl(base) if self.decl(*base).as_class().is_some() => Some(*base),
                _ => None,
            })
            .collect()
    }

    /// True when some ancestor class of `id` declares a member called `name`.
    fn inherits_member(&self, id: DeclId, name: &str, method: bool) -> bool {
        let mut visited = HashSet::from([id]);
        let mut pending = self.class_bases(id);
        while let Some(base) = pending.pop() {
            if !visited.insert(base) {
                continue;
            }
            if self.find_member(base, name, method).is_some() {
                return true;
            }
            pending.extend(self.class_bases(base));
        }
        false
    }

    fn mark_overrides(&mut self) {
        let mut overridden = Vec::new();
        for &id in self.classes.iter().chain(&self.objects) {
            let Some(body) = self.decl(id).body() else {
                continue;
            };
            for (members, method) in [(&body.methods, true), (&body.properties, false)] {
                for &member in members {
                    if self.inherits_member(id, self.name(member), method) {
                        overridden.push(member);
                    }
                }
            }
        }
        for member in overridden {
            if let Some(info) = self.decl_mut(member).member_mut() {
                info.overridden = true;
            }
        }
    }

    // -- Grammar ---------------------------------------------------------------

    /// A production's members are those of all of its match classes.
    fn collect_grammar_members(&mut self) {
        for production in self.grammar_productions.clone() {
            let DeclKind::GrammarProduction(g) = &self.decl(production).kind else {
                continue;
            };
            let mut methods = g.body.methods.clone();
            let mut properties = g.body.properties.clone();
            for &class in &g.match_classes {
                let Some(body) = self.decl(class).body() else {
                    continue;
                };
                for &method in &body.methods {
                    if !methods.contains(&method) {
                        methods.push(method);
                    }
                }
                for &property in &body.properties {
                    if !properties.contains(&property) {
                        properties.push(property);
                    }
                }
            }
            if let Some(body) = self.decl_mut(production).body_mut() {
                body.methods = methods;
                body.properties = properties;
            }
        }
    }

    // -- Files and enums -------------------------------------------------------

    fn post_process_files(&mut self) {
        for index in 0..self.files.len() {
            let file = &self.files[index];
            let classes = self.sorted(file.classes.clone());
            let objects = self.sorted(file.objects.clone());
            let functions = self.sorted(file.functions.clone());
            let macros = self.sorted(file.macros.clone());
            let templates = self.sorted(file.templates.clone());
            let groups = file.enum_groups.clone();

            let mut enums = Vec::new();
            for &group in &groups {
                let members = self.sorted(self.enum_group(group).enums.clone());
                enums.extend(members.iter().copied());
                self.enum_group_mut(group).enums = members;
            }
            let enums = self.sorted(enums);
            let groups = self.sorted_groups(groups);

            let file = &mut self.files[index];
            file.classes = classes;
            file.objects = objects;
            file.functions = functions;
            file.macros = macros;
            file.templates = templates;
            file.enum_groups = groups;
            file.enums = enums;
        }
    }

    /// Enum groups sort by the name of their first member.
    fn sorted_groups(&self, mut groups: Vec<EnumGroupId>) -> Vec<EnumGroupId> {
        let key = |group: EnumGroupId| {
            self.enum_group(group)
                .enums
                .first()
                .map(|&id| self.name(id).to_lowercase())
                .unwrap_or_default()
        };
        groups.sort_by_key(|&g| key(g));
        groups
    }

    fn flatten_enums(&mut self) {
        let groups = std::mem::take(&mut self.enum_groups);
        let enums: Vec<DeclId> = groups
            .iter()
            .flat_map(|&g| self.enum_group(g).enums.iter().copied())
            .collect();
        self.enums = self.sorted(enums);
        self.enum_groups = self.sorted_groups(groups);
    }
}
