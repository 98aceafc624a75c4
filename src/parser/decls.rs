//! Recognisers for the individual declaration shapes.
//!
//! Each one is handed the rest of the line after its keyword. Those that can
//! span lines pull continuations from the cursor and fail with
//! [`Error::UnexpectedEof`](crate::error::Error::UnexpectedEof) when the file
//! ends first.

use super::{FileContext, Parser};
use crate::cursor::LineCursor;
use crate::error::Result;
use crate::lexer::{is_symbol_char, next_token, peek_token};
use crate::macros::MacroDef;
use crate::model::*;
use regex::Regex;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

static RE_MESSAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([BD]Msg)\s*\(").unwrap());

static RE_ACTION_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Define\w*Action(?:Sub)?\b").unwrap());

static RE_BOILERPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:Copyright |(?:\.\s+)?This file is part of TADS 3)").unwrap());

// -- Declarations -------------------------------------------------------------

impl Parser<'_> {
    fn push_class(&mut self, ctx: &FileContext, symbol: Symbol, class: ClassDecl) -> DeclId {
        let id = self.graph.add_decl(Decl {
            symbol,
            kind: DeclKind::Class(class),
        });
        self.graph.classes.push(id);
        self.graph.files[ctx.file].classes.push(id);
        id
    }

    /// `class NAME: BASE, BASE`
    pub(super) fn class(&mut self, ctx: &mut FileContext, mut rest: &str, original: &str, at: usize) {
        let description = ctx.take_comment();
        let name = next_token(&mut rest);
        if name.is_empty() || next_token(&mut rest) != ":" {
            return;
        }

        let mut class = ClassDecl::default();
        class.shape.bases = base_list(rest);
        if RE_ACTION_DEFINITION.is_match(original) {
            class.action = true;
            class.original_definition = Some(up_to_close_paren(original));
        }
        class.shape.body.file_name = self.graph.allocate_file_name(name);

        let id = self.push_class(ctx, ctx.symbol(name, description, at), class);
        ctx.open(id);
    }

    /// `intrinsic class NAME 'id/version': BASE`
    pub(super) fn intrinsic_class(&mut self, ctx: &mut FileContext, mut rest: &str, at: usize) {
        let description = ctx.take_comment();
        let name = next_token(&mut rest);
        if name.is_empty() {
            return;
        }

        let mut class = ClassDecl {
            intrinsic: true,
            ..Default::default()
        };
        if let Some(colon) = rest.find(':') {
            let mut bases = &rest[colon + 1..];
            loop {
                match next_token(&mut bases) {
                    "," => {}
                    base if base.starts_with(is_symbol_char) => {
                        class.shape.bases.push(BaseRef::Name(base.to_string()))
                    }
                    _ => break,
                }
            }
        }
        class.shape.body.file_name = self.graph.allocate_file_name(name);

        let id = self.push_class(ctx, ctx.symbol(name, description, at), class);
        ctx.open(id);
    }

    /// `grammar NAME(TAG): RULE : BASES` or `VerbRule(TAG) RULE : BASES`.
    /// The rule may span lines; it ends at the first `:` outside quotes.
    pub(super) fn grammar(
        &mut self,
        ctx: &mut FileContext,
        cursor: &mut LineCursor,
        mut rest: &str,
        original: &str,
        at: usize,
    ) -> Result<()> {
        let description = ctx.take_comment();
        let mut original_rest = original;
        let verb_rule = next_token(&mut original_rest) == "VerbRule";

        let mut name = next_token(&mut rest).to_string();
        if name.is_empty() {
            return Ok(());
        }
        let mut original_definition = None;
        let tagged = name == "(" || peek_token(rest) == "(";
        if tagged {
            if name != "(" {
                next_token(&mut rest);
            }
            let tag = next_token(&mut rest);
            if next_token(&mut rest) != ")" {
                return Ok(());
            }
            if verb_rule {
                name = "VerbRule".to_string();
                original_definition = Some(up_to_close_paren(original));
            }
            name = format!("{name}({tag})");
        }

        if peek_token(rest) == ":" {
            next_token(&mut rest);
        } else if !verb_rule {
            return Ok(());
        }

        let mut pieces = Vec::new();
        let mut quote = None;
        let mut line = rest.to_string();
        let tail = loop {
            if let Some(end) = rule_end(&line, &mut quote) {
                let piece = line[..end].trim_end();
                if !piece.trim().is_empty() {
                    pieces.push(piece.to_string());
                }
                break line[end + 1..].to_string();
            }
            if !line.trim().is_empty() {
                pieces.push(line.trim_end().to_string());
            }
            line = cursor.require_line()?;
        };

        let root = name.split('(').next().unwrap_or_default().to_string();
        let mut class = ClassDecl::default();
        class.shape.bases = base_list(&tail);
        class.original_definition = original_definition;
        class.shape.body.file_name = self.graph.allocate_file_name(&name);
        let production = self.grammar_production(ctx, &root, at);
        class.grammar = Some(GrammarRule {
            rule: pieces.join("\n").trim().to_string(),
            production,
        });

        let id = self.push_class(ctx, ctx.symbol(name, description, at), class);
        if let DeclKind::GrammarProduction(g) = &mut self.graph.decl_mut(production).kind {
            g.match_classes.push(id);
        }
        ctx.open(id);
        Ok(())
    }

    fn grammar_production(&mut self, ctx: &FileContext, root: &str, at: usize) -> DeclId {
        if let Some(id) = self.graph.find_grammar_production(root) {
            return id;
        }
        let production = GrammarProduction {
            body: Body {
                file_name: self.graph.allocate_file_name(root),
                ..Default::default()
            },
            match_classes: Vec::new(),
        };
        let id = self.graph.add_decl(Decl {
            symbol: ctx.symbol(root, String::new(), at),
            kind: DeclKind::GrammarProduction(production),
        });
        self.graph.grammar_productions.push(id);
        id
    }

    /// `modify NAME`; merged into its target by the link pass.
    pub(super) fn modify(&mut self, ctx: &mut FileContext, mut rest: &str, at: usize) {
        let description = ctx.take_comment();
        let name = next_token(&mut rest);
        if name.is_empty() {
            return;
        }
        let id = self.graph.add_decl(Decl {
            symbol: ctx.symbol(name, description, at),
            kind: DeclKind::Patch(PatchDecl::default()),
        });
        self.graph.patches.push(id);
        ctx.open(id);
    }

    /// `NAME: BASE, BASE` at column 0.
    pub(super) fn object(
        &mut self,
        ctx: &mut FileContext,
        name: &str,
        mut rest: &str,
        transient: bool,
        action: bool,
        at: usize,
    ) {
        let description = ctx.take_comment();
        if name.is_empty() {
            return;
        }

        let mut object = ObjectDecl {
            transient,
            action,
            ..Default::default()
        };
        loop {
            let base = next_token(&mut rest);
            if base.is_empty() {
                break;
            }
            if base.contains("Action") {
                object.action = true;
            }
            object.shape.bases.push(BaseRef::Name(base.to_string()));
            if next_token(&mut rest) != "," {
                break;
            }
        }
        object.shape.body.file_name = self.graph.allocate_file_name(name);

        let id = self.graph.add_decl(Decl {
            symbol: ctx.symbol(name, description, at),
            kind: DeclKind::Object(object),
        });
        self.graph.objects.push(id);
        self.graph.files[ctx.file].objects.push(id);
        ctx.open(id);
    }

    /// `DefineTAction(Take)`: object `Take` of class `TAction`.
    pub(super) fn action_definition(&mut self, ctx: &mut FileContext, macro_name: &str, mut rest: &str, at: usize) {
        let class = macro_name.strip_prefix("Define").unwrap_or(macro_name);
        let name = next_token(&mut rest);
        self.object(ctx, name, class, false, true, at);
    }

    // -- Members and functions ------------------------------------------------

    /// `    NAME = VALUE` inside a class, object or `modify` block.
    pub(super) fn property(&mut self, ctx: &mut FileContext, name: &str, interface_only: bool, at: usize) {
        let Some(owner) = ctx.current else {
            return;
        };
        let description = ctx.take_comment();
        let id = self.graph.add_decl(Decl {
            symbol: ctx.symbol(name, description, at),
            kind: DeclKind::Property(PropertyDecl {
                member: MemberInfo::new(owner, interface_only),
            }),
        });
        if let Some(body) = self.graph.decl_mut(owner).body_mut() {
            body.properties.push(id);
        }
    }

    /// `    NAME(ARGS)` or `    NAME {` inside a class, object or `modify`
    /// block.
    pub(super) fn method(
        &mut self,
        ctx: &mut FileContext,
        cursor: &mut LineCursor,
        name: &str,
        rest: &str,
        interface_only: bool,
        at: usize,
    ) -> Result<()> {
        let Some(owner) = ctx.current else {
            return Ok(());
        };
        let Some((mut params, _)) = parse_arg_list(cursor, rest)? else {
            return Ok(());
        };

        let mut name = name.to_string();
        if (name == "dobjFor" || name == "iobjFor") && params.len() == 1 {
            name = format!("{name}({})", params[0]);
            params.clear();
        }

        let description = ctx.take_comment();
        let id = self.graph.add_decl(Decl {
            symbol: ctx.symbol(name, description, at),
            kind: DeclKind::Method(MethodDecl {
                member: MemberInfo::new(owner, interface_only),
                params,
            }),
        });
        if let Some(body) = self.graph.decl_mut(owner).body_mut() {
            body.methods.push(id);
        }
        Ok(())
    }

    /// `NAME(ARGS)` at column 0 or inside an intrinsic function set.
    pub(super) fn function(&mut self, ctx: &mut FileContext, cursor: &mut LineCursor, name: &str, rest: &str, at: usize) -> Result<()> {
        let description = ctx.take_comment();
        let Some((params, _)) = parse_arg_list(cursor, rest)? else {
            return Ok(());
        };
        let id = self.graph.add_decl(Decl {
            symbol: ctx.symbol(name, description, at),
            kind: DeclKind::Function(FunctionDecl { params }),
        });
        self.graph.functions.push(id);
        self.graph.files[ctx.file].functions.push(id);
        Ok(())
    }

    // -- Header-only forms ----------------------------------------------------

    /// `#define NAME(ARGS) BODY`, continued by trailing backslashes. An
    /// argument list only counts when `(` directly follows the name.
    pub(super) fn define(&mut self, ctx: &mut FileContext, cursor: &mut LineCursor, mut rest: &str, at: usize) -> Result<()> {
        let description = ctx.take_comment();
        let name = next_token(&mut rest).to_string();
        if name.is_empty() {
            return Ok(());
        }

        let mut params = Vec::new();
        let mut line = rest.to_string();
        if let Some(args) = rest.strip_prefix('(') {
            let Some((list, remainder)) = parse_arg_list(cursor, args)? else {
                return Ok(());
            };
            params = list;
            line = remainder;
        }

        let mut pieces = Vec::new();
        let mut line = line.trim().to_string();
        loop {
            let continued = line.ends_with('\\');
            let piece = line.trim_end_matches('\\').trim_end();
            if !piece.is_empty() {
                pieces.push(piece.to_string());
            }
            if !continued {
                break;
            }
            line = cursor.require_line()?.trim().to_string();
        }
        let body = pieces.join("\n");

        cursor.define_macro(MacroDef {
            name: name.clone(),
            params: params.clone(),
            body: body.clone(),
        });
        let id = self.graph.add_decl(Decl {
            symbol: ctx.symbol(name, description, at),
            kind: DeclKind::Macro(MacroDecl { params, body }),
        });
        self.graph.macros.push(id);
        self.graph.files[ctx.file].macros.push(id);
        Ok(())
    }

    /// `enum A, B, C;`: one group per line. A line that ends before the `;`
    /// records nothing.
    pub(super) fn enums(&mut self, ctx: &mut FileContext, mut rest: &str, at: usize) {
        let description = ctx.take_comment();
        let mut names = Vec::new();
        loop {
            match next_token(&mut rest) {
                ";" => break,
                "" => {
                    log::debug!("{}:{}: enum without `;` skipped", ctx.short_name, at);
                    return;
                }
                "," => {}
                name => names.push(name),
            }
        }

        let group = self.graph.add_enum_group(EnumGroup {
            description,
            source: SourceLoc::new(ctx.short_name.clone(), at),
            enums: Vec::new(),
        });
        let members = names
            .into_iter()
            .map(|name| {
                self.graph.add_decl(Decl {
                    symbol: ctx.symbol(name, String::new(), at),
                    kind: DeclKind::Enum(EnumDecl { group }),
                })
            })
            .collect();
        self.graph.enum_group_mut(group).enums = members;
        self.graph.files[ctx.file].enum_groups.push(group);
    }

    /// `NAME template BODY;`, where the body may span lines.
    pub(super) fn template(
        &mut self,
        ctx: &mut FileContext,
        cursor: &mut LineCursor,
        name: &str,
        rest: &str,
        at: usize,
    ) -> Result<()> {
        let description = ctx.take_comment();
        let mut body = rest.trim().to_string();
        let mut line = body.clone();
        'scan: loop {
            let mut tokens = line.as_str();
            loop {
                match next_token(&mut tokens) {
                    ";" => break 'scan,
                    "" => break,
                    _ => {}
                }
            }
            line = cursor.require_line()?.trim().to_string();
            body.push(' ');
            body.push_str(&line);
        }

        let id = self.graph.add_decl(Decl {
            symbol: ctx.symbol(name, description, at),
            kind: DeclKind::Template(TemplateDecl { body }),
        });
        self.graph.templates.push(id);
        self.graph.files[ctx.file].templates.push(id);
        Ok(())
    }

    // -- Comments and messages ------------------------------------------------

    /// A block comment. The first one in a file describes the file; later
    /// ones wait for the next declaration.
    pub(super) fn comment(&mut self, ctx: &mut FileContext, cursor: &mut LineCursor, rest: &str) -> Result<()> {
        ctx.comment.clear();
        let text = match rest.find("*/") {
            Some(end) => rest[..end].trim().to_string(),
            None => {
                let mut text = CommentText::default();
                let mut line = rest.to_string();
                loop {
                    if let Some(end) = line.find("*/") {
                        text.push_line(&line[..end]);
                        break;
                    }
                    text.push_line(&line);
                    line = cursor.require_line()?;
                }
                text.finish()
            }
        };

        if ctx.first_comment {
            ctx.first_comment = false;
            self.graph.files[ctx.file].description = text;
        } else {
            ctx.comment = text;
        }
        Ok(())
    }

    /// Record any `BMsg(name, text)` / `DMsg(...)` call on the line. The text
    /// runs until a line containing `)`. A call without a name is skipped.
    pub(super) fn message(&mut self, ctx: &mut FileContext, cursor: &mut LineCursor, line: &str, at: usize) -> Result<()> {
        let Some(caps) = RE_MESSAGE.captures(line) else {
            return Ok(());
        };
        let kind = match &caps[1] {
            "BMsg" => MessageKind::BMsg,
            _ => MessageKind::DMsg,
        };
        let mut rest = &line[caps.get(0).map_or(line.len(), |m| m.end())..];

        let mut words = Vec::new();
        loop {
            match next_token(&mut rest) {
                "," | "" => break,
                ")" => return Ok(()),
                word => words.push(word),
            }
        }
        if words.is_empty() {
            return Ok(());
        }
        let name = words.join(" ");

        let mut text = rest.trim().to_string();
        let mut scanned = rest.to_string();
        while !scanned.contains(')') {
            scanned = cursor.require_line()?;
            text.push(' ');
            text.push_str(scanned.trim());
        }

        let id = self.graph.add_decl(Decl {
            symbol: ctx.symbol(name, String::new(), at),
            kind: DeclKind::Message(MessageDecl { kind, text }),
        });
        self.graph.messages.push(id);
        Ok(())
    }
}

// -- Helpers ------------------------------------------------------------------

/// `A, B, C` up to the first token that is not followed by a comma.
fn base_list(mut rest: &str) -> Vec<BaseRef> {
    let mut bases = Vec::new();
    loop {
        let name = next_token(&mut rest);
        if name.is_empty() {
            break;
        }
        bases.push(BaseRef::Name(name.to_string()));
        if next_token(&mut rest) != "," {
            break;
        }
    }
    bases
}

/// The trimmed line up to and including its first `)`.
fn up_to_close_paren(line: &str) -> String {
    let line = line.trim();
    match line.find(')') {
        Some(end) => line[..=end].to_string(),
        None => line.to_string(),
    }
}

/// Byte offset of the first `:` outside quotes. `quote` carries an open
/// string across lines; a backslash escapes the next character.
fn rule_end(line: &str, quote: &mut Option<char>) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            ':' if quote.is_none() => return Some(i),
            '\'' | '"' => match *quote {
                Some(q) if q == c => *quote = None,
                Some(_) => {}
                None => *quote = Some(c),
            },
            _ => {}
        }
    }
    None
}

/// Parse a parameter list up to `)` (or `{`), pulling lines as needed.
/// Returns the parameters and what is left of the closing line, or `None`
/// when a blank line interrupts the list.
///
/// `[name]` is a list parameter, `?` marks the previous one optional.
fn parse_arg_list(cursor: &mut LineCursor, rest: &str) -> Result<Option<(Vec<String>, String)>> {
    let mut params: Vec<String> = Vec::new();
    let mut line = rest.to_string();
    loop {
        let mut tokens = line.as_str();
        loop {
            match next_token(&mut tokens) {
                ")" | "{" => return Ok(Some((params, tokens.to_string()))),
                "" => break,
                "," => {}
                "[" => {
                    let inner = next_token(&mut tokens);
                    if next_token(&mut tokens) == "]" {
                        params.push(format!("[{inner}]"));
                    } else {
                        params.push(inner.to_string());
                    }
                }
                "?" => match params.last_mut() {
                    Some(last) => last.push('?'),
                    None => params.push("?".to_string()),
                },
                param => params.push(param.to_string()),
            }
        }
        line = cursor.require_line()?;
        if line.trim().is_empty() {
            return Ok(None);
        }
    }
}

/// Accumulates a block comment's lines into paragraphs.
#[derive(Default)]
struct CommentText {
    paragraphs: Vec<String>,
}

impl CommentText {
    fn push_line(&mut self, raw: &str) {
        let line = raw.trim();
        let line = if line == "*" {
            self.paragraphs.push(String::new());
            ""
        } else if let Some(rest) = line.strip_prefix("*. ") {
            self.paragraphs.push(String::new());
            rest
        } else if let Some(rest) = line.strip_prefix("* ") {
            rest
        } else {
            line
        };

        let line = line.trim();
        if line.is_empty() || RE_BOILERPLATE.is_match(line) {
            return;
        }
        if self.paragraphs.is_empty() {
            self.paragraphs.push(String::new());
        }
        if let Some(current) = self.paragraphs.last_mut() {
            for word in line.split_whitespace() {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
        }
    }

    fn finish(self) -> String {
        self.paragraphs
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_end_skips_quoted_colons() {
        let mut quote = None;
        assert_eq!(rule_end("'a:b' : X", &mut quote), Some(6));
        assert_eq!(rule_end(r"'it\'s:' : X", &mut quote), Some(9));
    }

    #[test]
    fn rule_end_carries_quote_state() {
        let mut quote = None;
        assert_eq!(rule_end("'open", &mut quote), None);
        assert_eq!(quote, Some('\''));
        assert_eq!(rule_end("still: here' : X", &mut quote), Some(13));
        assert_eq!(quote, None);
    }

    #[test]
    fn base_list_stops_at_non_comma() {
        assert_eq!(
            base_list(" A, B {"),
            vec![BaseRef::Name("A".to_string()), BaseRef::Name("B".to_string())]
        );
        assert!(base_list("   ").is_empty());
    }

    #[test]
    fn close_paren_prefix() {
        assert_eq!(up_to_close_paren("  DefineTAction(Take)  "), "DefineTAction(Take)");
        assert_eq!(up_to_close_paren("VerbRule(Take) 'take' : X"), "VerbRule(Take)");
        assert_eq!(up_to_close_paren("no paren"), "no paren");
    }

    #[test]
    fn comment_decoration_is_stripped() {
        let mut text = CommentText::default();
        for line in ["", " *   One", " *   two.", " *", " *.  Three."] {
            text.push_line(line);
        }
        assert_eq!(text.finish(), "One two.\n\nThree.");
    }

    #[test]
    fn action_definition_pattern() {
        assert!(RE_ACTION_DEFINITION.is_match("DefineTAction(Take)"));
        assert!(RE_ACTION_DEFINITION.is_match("  DefineTIActionSub(PutIn, TIAction)"));
        assert!(!RE_ACTION_DEFINITION.is_match("DefineLangDir(north)"));
        assert!(!RE_ACTION_DEFINITION.is_match("class TakeAction: TAction"));
    }
}
