//! Symbol model: every declaration kind layered over one common record.
//!
//! Declarations live in the [`SymbolGraph`](crate::graph::SymbolGraph) arena
//! and refer to each other by [`DeclId`]. Forward links (base classes) start
//! out as plain names and are resolved by the link pass, which also fills in
//! the back links (subclasses, global objects).

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Stable handle of a declaration in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeclId(pub(crate) usize);

impl DeclId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of an enum group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EnumGroupId(pub(crate) usize);

/// Where a symbol was found: source file short name plus 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLoc {
    pub file: String,
    pub line: usize,
}

impl SourceLoc {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        SourceLoc {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Attributes shared by everything extracted from a source file.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    /// The block comment immediately preceding the declaration.
    pub description: String,
    pub source: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct Decl {
    pub symbol: Symbol,
    pub kind: DeclKind,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    Class(ClassDecl),
    Object(ObjectDecl),
    GrammarProduction(GrammarProduction),
    /// A `modify NAME` block, merged into its target by the link pass.
    Patch(PatchDecl),
    Function(FunctionDecl),
    Macro(MacroDecl),
    Template(TemplateDecl),
    Method(MethodDecl),
    Property(PropertyDecl),
    Enum(EnumDecl),
    Message(MessageDecl),
}

/// Mergeable member set of a declaration that gets its own output page.
#[derive(Debug, Clone, Default)]
pub struct Body {
    /// Generated output file name, unique across the run ignoring case.
    pub file_name: String,
    pub methods: Vec<DeclId>,
    pub properties: Vec<DeclId>,
}

/// A base-class reference: a name until the link pass resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseRef {
    Name(String),
    Decl(DeclId),
}

/// State shared by classes and objects.
#[derive(Debug, Clone, Default)]
pub struct ClassOrObject {
    pub body: Body,
    pub bases: Vec<BaseRef>,
    /// Locations of `modify` blocks applied to this declaration.
    pub patched_at: Vec<SourceLoc>,
    pub patches: Vec<DeclId>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassDecl {
    pub shape: ClassOrObject,
    pub intrinsic: bool,
    pub action: bool,
    pub grammar: Option<GrammarRule>,
    /// The macro invocation the class was written as (`VerbRule(Take)`,
    /// `DefineTAction(Take)`), when known.
    pub original_definition: Option<String>,
    /// Declaration order, never sorted.
    pub subclasses: Vec<DeclId>,
    pub global_objects: Vec<DeclId>,
}

#[derive(Debug, Clone)]
pub struct GrammarRule {
    /// Token-list alternatives; line breaks of the source are kept.
    pub rule: String,
    pub production: DeclId,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectDecl {
    pub shape: ClassOrObject,
    pub transient: bool,
    pub action: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GrammarProduction {
    pub body: Body,
    pub match_classes: Vec<DeclId>,
}

#[derive(Debug, Clone, Default)]
pub struct PatchDecl {
    pub body: Body,
    pub target: Option<DeclId>,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionDecl {
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MacroDecl {
    pub params: Vec<String>,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateDecl {
    pub body: String,
}

/// Bookkeeping common to methods and properties.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    /// The class, object or patch the member was declared in.
    pub owner: DeclId,
    pub overridden: bool,
    /// Declared on a `//` line: documented but not defined.
    pub interface_only: bool,
    pub patched_at: Vec<SourceLoc>,
    pub patches: Vec<DeclId>,
}

impl MemberInfo {
    pub fn new(owner: DeclId, interface_only: bool) -> Self {
        MemberInfo {
            owner,
            overridden: false,
            interface_only,
            patched_at: Vec::new(),
            patches: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub member: MemberInfo,
    pub params: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub member: MemberInfo,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub group: EnumGroupId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageKind {
    BMsg,
    DMsg,
}

#[derive(Debug, Clone)]
pub struct MessageDecl {
    pub kind: MessageKind,
    pub text: String,
}

/// Enums declared together on one source line.
#[derive(Debug, Clone)]
pub struct EnumGroup {
    pub description: String,
    pub source: SourceLoc,
    pub enums: Vec<DeclId>,
}

impl Decl {
    pub fn name(&self) -> &str {
        &self.symbol.name
    }

    /// Lower-case label of the declaration kind.
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            DeclKind::Class(_) => "class",
            DeclKind::Object(_) => "object",
            DeclKind::GrammarProduction(_) => "grammar",
            DeclKind::Patch(_) => "modify",
            DeclKind::Function(_) => "function",
            DeclKind::Macro(_) => "macro",
            DeclKind::Template(_) => "template",
            DeclKind::Method(_) => "method",
            DeclKind::Property(_) => "property",
            DeclKind::Enum(_) => "enum",
            DeclKind::Message(_) => "message",
        }
    }

    pub fn as_class(&self) -> Option<&ClassDecl> {
        match &self.kind {
            DeclKind::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut ClassDecl> {
        match &mut self.kind {
            DeclKind::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn class_or_object(&self) -> Option<&ClassOrObject> {
        match &self.kind {
            DeclKind::Class(c) => Some(&c.shape),
            DeclKind::Object(o) => Some(&o.shape),
            _ => None,
        }
    }

    pub fn class_or_object_mut(&mut self) -> Option<&mut ClassOrObject> {
        match &mut self.kind {
            DeclKind::Class(c) => Some(&mut c.shape),
            DeclKind::Object(o) => Some(&mut o.shape),
            _ => None,
        }
    }

    /// Member set of classes, objects, grammar productions and patches.
    pub fn body(&self) -> Option<&Body> {
        match &self.kind {
            DeclKind::Class(c) => Some(&c.shape.body),
            DeclKind::Object(o) => Some(&o.shape.body),
            DeclKind::GrammarProduction(g) => Some(&g.body),
            DeclKind::Patch(p) => Some(&p.body),
            _ => None,
        }
    }

    pub fn body_mut(&mut self) -> Option<&mut Body> {
        match &mut self.kind {
            DeclKind::Class(c) => Some(&mut c.shape.body),
            DeclKind::Object(o) => Some(&mut o.shape.body),
            DeclKind::GrammarProduction(g) => Some(&mut g.body),
            DeclKind::Patch(p) => Some(&mut p.body),
            _ => None,
        }
    }

    pub fn member(&self) -> Option<&MemberInfo> {
        match &self.kind {
            DeclKind::Method(m) => Some(&m.member),
            DeclKind::Property(p) => Some(&p.member),
            _ => None,
        }
    }

    pub fn member_mut(&mut self) -> Option<&mut MemberInfo> {
        match &mut self.kind {
            DeclKind::Method(m) => Some(&mut m.member),
            DeclKind::Property(p) => Some(&mut p.member),
            _ => None,
        }
    }

    /// Parameter list of functions, methods and macros.
    pub fn params(&self) -> Option<&[String]> {
        match &self.kind {
            DeclKind::Function(f) => Some(&f.params),
            DeclKind::Method(m) => Some(&m.params),
            DeclKind::Macro(m) => Some(&m.params),
            _ => None,
        }
    }
}

/// One input file and the declarations found in it.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name without directory; what `#include` refers to.
    pub short_name: String,
    pub is_header: bool,
    /// Short names of the files this one `#include`s.
    pub includes: Vec<String>,
    pub line_count: usize,
    /// The first block comment of the file.
    pub description: String,
    pub classes: Vec<DeclId>,
    pub objects: Vec<DeclId>,
    pub functions: Vec<DeclId>,
    pub macros: Vec<DeclId>,
    pub templates: Vec<DeclId>,
    pub enum_groups: Vec<EnumGroupId>,
    /// Filled from `enum_groups` by the link pass.
    pub enums: Vec<DeclId>,
}

impl SourceFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let short_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let is_header = path.extension().and_then(|e| e.to_str()) == Some("h");
        SourceFile {
            path: path.to_path_buf(),
            short_name,
            is_header,
            ..Default::default()
        }
    }
}
