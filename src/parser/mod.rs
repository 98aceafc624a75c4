//! Declaration classifier: a line-by-line state machine over one file at a
//! time.
//!
//! Each line is routed by its leading-space count (0 for declarations, 4 for
//! members) and its first one or two tokens. Anything that does not match a
//! known shape is skipped; this is an extractor, not a validating parser.

mod decls;

use crate::cursor::{LineCursor, SourceLine};
use crate::error::{Error, Result};
use crate::graph::SymbolGraph;
use crate::lexer::next_token;
use crate::macros::MacroEngine;
use crate::model::{DeclId, SourceFile, SourceLoc, Symbol};
use crate::ParseOptions;

// -- Parser state -------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    TopLevel,
    InClassOrObjectBody,
    /// Inside a global function; members are not recognised until a `}` at
    /// column 0.
    InFunctionBody,
    /// Inside an `intrinsic '...'` function set; calls at any depth are
    /// function declarations.
    InIntrinsicFunctionBlock,
}

/// Per-file context threaded through every line.
#[derive(Debug)]
pub struct FileContext {
    pub file: usize,
    pub short_name: String,
    pub is_header: bool,
    pub state: State,
    /// The most recent comment not yet attached to a declaration.
    pub comment: String,
    /// No comment has been seen yet; the first one describes the file.
    pub first_comment: bool,
    /// Class, object or `modify` block that receives members.
    pub current: Option<DeclId>,
}

impl FileContext {
    pub fn new(file: usize, source: &SourceFile) -> Self {
        FileContext {
            file,
            short_name: source.short_name.clone(),
            is_header: source.is_header,
            state: State::TopLevel,
            comment: String::new(),
            first_comment: true,
            current: None,
        }
    }

    fn take_comment(&mut self) -> String {
        std::mem::take(&mut self.comment)
    }

    fn symbol(&self, name: impl Into<String>, description: String, line: usize) -> Symbol {
        Symbol {
            name: name.into(),
            description,
            source: SourceLoc::new(self.short_name.clone(), line),
        }
    }

    /// Make `id` the receiver of the following member lines.
    fn open(&mut self, id: DeclId) {
        self.current = Some(id);
        self.state = State::InClassOrObjectBody;
    }

    fn accepts_members(&self, indent: usize) -> bool {
        indent == 4 && self.state != State::InFunctionBody
    }
}

/// Calls with these names never declare anything.
const IGNORED_CALLS: &[&str] = &["DefDigit", "defOrdinal", "defTeen", "defTens", "defDigit", "if", "//"];

/// Action-defining macros; `DefineTAction(Take)` declares object `Take` of
/// class `TAction`.
const ACTION_MACROS: &[&str] = &[
    "DefineIAction",
    "DefineTAction",
    "DefineTIAction",
    "DefineLiteralAction",
    "DefineLiteralTAction",
    "DefineTopicAction",
    "DefineTopicTAction",
    "DefineSystemAction",
    "DefineAction",
];

// -- Public API ---------------------------------------------------------------

pub struct Parser<'g> {
    graph: &'g mut SymbolGraph,
    options: &'g ParseOptions,
    /// `DefineLangDir` is recorded once per run.
    lang_dir_seen: bool,
}

impl<'g> Parser<'g> {
    pub fn new(graph: &'g mut SymbolGraph, options: &'g ParseOptions) -> Self {
        Parser {
            graph,
            options,
            lang_dir_seen: false,
        }
    }

    /// Parse every file of the graph in its current order.
    pub fn parse_all(&mut self) -> Result<()> {
        for index in 0..self.graph.files.len() {
            self.parse_file(index)?;
        }
        Ok(())
    }

    pub fn parse_file(&mut self, index: usize) -> Result<()> {
        let file = &self.graph.files[index];
        log::info!("parsing {} ({} lines)", file.path.display(), file.line_count);

        let mut cursor = LineCursor::open(file)?;
        if let Some(dir) = &self.options.mirror_dir {
            cursor = cursor.with_mirror_dir(dir);
        }
        if self.options.expand_macros {
            let engine = MacroEngine::from_scope(self.graph.visible_macros(index));
            cursor = cursor.with_macros(engine);
        }
        self.parse_lines(index, &mut cursor)
    }

    /// Classify every line `cursor` yields as part of file `index`.
    pub fn parse_lines(&mut self, index: usize, cursor: &mut LineCursor) -> Result<()> {
        let mut ctx = FileContext::new(index, &self.graph.files[index]);
        while let Some(line) = cursor.next_line()? {
            match self.process_line(&mut ctx, cursor, line) {
                Ok(()) => {}
                Err(Error::UnexpectedEof { file, line }) => {
                    log::warn!("{file}: unterminated construct at end of file (line {line})");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    // -- Line processing ------------------------------------------------------

    fn process_line(&mut self, ctx: &mut FileContext, cursor: &mut LineCursor, line: SourceLine) -> Result<()> {
        // `propertyset` lines are read from the original source
        let text = match &line.mirror {
            Some(mirror) if !mirror.trim().starts_with("propertyset ") => mirror.as_str(),
            _ => line.text.as_str(),
        };
        let text = text.trim_end();
        if text.is_empty() {
            return Ok(());
        }
        let body = text.trim_start_matches(' ');
        let indent = text.len() - body.len();
        let at = line.number;

        if !ctx.is_header {
            self.message(ctx, cursor, body, at)?;
        }

        let mut rest = body;
        let mut token = next_token(&mut rest);
        let mut transient = false;
        if token == "transient" {
            transient = true;
            token = next_token(&mut rest);
        }

        match token {
            "intrinsic" => {
                match next_token(&mut rest) {
                    "class" => self.intrinsic_class(ctx, rest, at),
                    "'" => ctx.state = State::InIntrinsicFunctionBlock,
                    _ => {}
                }
                return Ok(());
            }
            "class" => {
                ctx.state = State::TopLevel;
                self.class(ctx, rest, &line.text, at);
                return Ok(());
            }
            "grammar" | "VerbRule" => {
                ctx.state = State::TopLevel;
                return self.grammar(ctx, cursor, rest, &line.text, at);
            }
            "modify" => {
                ctx.state = State::TopLevel;
                self.modify(ctx, rest, at);
                return Ok(());
            }
            "/*" => return self.comment(ctx, cursor, rest),
            "enum" if ctx.is_header => {
                self.enums(ctx, rest, at);
                return Ok(());
            }
            "#" => {
                token = next_token(&mut rest);
                if ctx.is_header && token == "define" {
                    return self.define(ctx, cursor, rest, at);
                }
            }
            _ => {}
        }

        let mut interface_only = false;
        if token == "//" && indent == 4 {
            interface_only = true;
            token = next_token(&mut rest);
        }
        if token == "}" && indent == 0 {
            ctx.state = State::TopLevel;
        }

        let token2 = next_token(&mut rest);
        // commented-out member lines only count in these shapes
        if interface_only && !matches!(token2, "=" | "(" | "{") {
            return Ok(());
        }
        if ctx.is_header && token2 == "template" {
            ctx.state = State::TopLevel;
            return self.template(ctx, cursor, token, rest, at);
        }

        match token2 {
            "=" => {
                if ctx.accepts_members(indent) {
                    self.property(ctx, token, interface_only, at);
                }
            }
            ":" => {
                if indent == 0 && ctx.state != State::InFunctionBody {
                    self.object(ctx, token, rest, transient, false, at);
                }
            }
            "(" => return self.call(ctx, cursor, token, rest, indent, interface_only, at),
            "{" => {
                if ctx.accepts_members(indent) {
                    let rest = format!("{{{rest}");
                    return self.method(ctx, cursor, token, &rest, interface_only, at);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// `name(...)`: an action definition, a function or a method, depending
    /// on indentation and state.
    #[allow(clippy::too_many_arguments)]
    fn call(
        &mut self,
        ctx: &mut FileContext,
        cursor: &mut LineCursor,
        name: &str,
        rest: &str,
        indent: usize,
        interface_only: bool,
        at: usize,
    ) -> Result<()> {
        if ACTION_MACROS.contains(&name) {
            self.action_definition(ctx, name, rest, at);
            return Ok(());
        }
        if IGNORED_CALLS.contains(&name) {
            return Ok(());
        }
        if name == "DefineLangDir" {
            if self.lang_dir_seen {
                return Ok(());
            }
            self.lang_dir_seen = true;
        }

        if indent == 0 {
            self.function(ctx, cursor, name, rest, at)?;
            if ctx.state != State::InIntrinsicFunctionBlock {
                ctx.state = State::InFunctionBody;
            }
        } else if ctx.state == State::InIntrinsicFunctionBlock {
            self.function(ctx, cursor, name, rest, at)?;
        } else if ctx.accepts_members(indent) {
            self.method(ctx, cursor, name, rest, interface_only, at)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use std::io::Cursor;

    fn parse_with(files: &[(&str, &str)], mirrors: &[Option<&str>]) -> SymbolGraph {
        let mut graph = SymbolGraph::new(files.iter().map(|(name, _)| SourceFile::new(name)).collect());
        let options = ParseOptions::default();
        let mut parser = Parser::new(&mut graph, &options);
        for (index, (name, text)) in files.iter().enumerate() {
            let mut cursor = LineCursor::new(*name, Cursor::new(text.as_bytes().to_vec()));
            if let Some(Some(mirror)) = mirrors.get(index) {
                cursor = cursor.with_mirror(Cursor::new(mirror.as_bytes().to_vec()));
            }
            parser.parse_lines(index, &mut cursor).unwrap();
        }
        graph
    }

    fn parse(files: &[(&str, &str)]) -> SymbolGraph {
        parse_with(files, &[])
    }

    fn names(graph: &SymbolGraph, ids: &[DeclId]) -> Vec<String> {
        ids.iter().map(|&id| graph.name(id).to_string()).collect()
    }

    fn class_named(graph: &SymbolGraph, name: &str) -> DeclId {
        graph
            .find_class(name)
            .unwrap_or_else(|| panic!("no class {name}"))
    }

    #[test]
    fn class_with_bases_and_members() {
        let src = "\
/* Thing library. */

/*
 *   A simulation object.
 */
class Thing: VocabObject, Mentionable
    /* the object's name */
    name = nil
    location = nil

    moveInto(dest, [args]) { }
    dobjFor(Take)
    {
    }
    construct {
    }
;
";
        let graph = parse(&[("thing.t", src)]);
        assert_eq!(graph.files[0].description, "Thing library.");

        let thing = class_named(&graph, "Thing");
        let decl = graph.decl(thing);
        assert_eq!(decl.symbol.description, "A simulation object.");
        assert_eq!(decl.symbol.source, SourceLoc::new("thing.t", 6));
        let shape = decl.class_or_object().unwrap();
        assert_eq!(
            shape.bases,
            vec![
                BaseRef::Name("VocabObject".to_string()),
                BaseRef::Name("Mentionable".to_string())
            ]
        );

        let body = decl.body().unwrap();
        assert_eq!(names(&graph, &body.properties), vec!["name", "location"]);
        assert_eq!(graph.decl(body.properties[0]).symbol.description, "the object's name");
        assert_eq!(names(&graph, &body.methods), vec!["moveInto", "dobjFor(Take)", "construct"]);
        assert_eq!(
            graph.decl(body.methods[0]).params(),
            Some(&["dest".to_string(), "[args]".to_string()][..])
        );
        assert_eq!(graph.decl(body.methods[1]).params(), Some(&[][..]));
        assert_eq!(graph.decl(body.properties[0]).member().unwrap().owner, thing);
        assert_eq!(graph.files[0].classes, vec![thing]);
    }

    #[test]
    fn interface_only_members() {
        let src = "\
class Actor: Thing
    // pcReferralPerson = ThirdPerson
    // notifyMove(obj, dest)
    // this is just prose
;
";
        let graph = parse(&[("actor.t", src)]);
        let body = graph.decl(class_named(&graph, "Actor")).body().unwrap();
        assert_eq!(names(&graph, &body.properties), vec!["pcReferralPerson"]);
        assert_eq!(names(&graph, &body.methods), vec!["notifyMove"]);
        assert!(graph.decl(body.methods[0]).member().unwrap().interface_only);
    }

    #[test]
    fn function_body_hides_members() {
        let src = "\
/* utilities */
class Thing: object
;

/* say hello */
sayHello(who, greeting?, ...)
{
    x = 1;
    foo(x);
}
    lateProp = 2
";
        let graph = parse(&[("util.t", src)]);
        assert_eq!(names(&graph, &graph.functions), vec!["sayHello"]);
        let hello = graph.decl(graph.functions[0]);
        assert_eq!(hello.symbol.description, "say hello");
        assert_eq!(
            hello.params(),
            Some(&["who".to_string(), "greeting?".to_string(), "...".to_string()][..])
        );

        // after the closing brace members attach to the last open class again
        let body = graph.decl(class_named(&graph, "Thing")).body().unwrap();
        assert_eq!(names(&graph, &body.properties), vec!["lateProp"]);
        assert!(body.methods.is_empty());
    }

    #[test]
    fn intrinsic_function_block() {
        let src = "\
intrinsic 'tads-gen/030008'
{
    dataType(val);
    getArg(idx);
}
intrinsic class BigNumber 'bignumber/030001': Object
{
}
";
        let graph = parse(&[("tadsgen.h", src)]);
        assert_eq!(names(&graph, &graph.functions), vec!["dataType", "getArg"]);
        let big = graph.decl(class_named(&graph, "BigNumber"));
        let class = big.as_class().unwrap();
        assert!(class.intrinsic);
        assert_eq!(class.shape.bases, vec![BaseRef::Name("Object".to_string())]);
    }

    #[test]
    fn header_macros_enums_and_templates() {
        let src = "\
/* adv3 header */
#define MAX(a, b) ((a) > (b) ? (a) : (b))
#define gActor (libGlobal.curActor)
#define askForDobj(action) \\
    (gAction.retryWithMissingDobj(action))
/* object colours */
enum RED, GREEN, BLUE;
Thing template 'vocabWords' 'name'
    @location? \"desc\"?;
";
        let graph = parse(&[("adv3.h", src)]);

        assert_eq!(names(&graph, &graph.macros), vec!["MAX", "gActor", "askForDobj"]);
        match &graph.decl(graph.macros[0]).kind {
            DeclKind::Macro(m) => {
                assert_eq!(m.params, vec!["a", "b"]);
                assert_eq!(m.body, "((a) > (b) ? (a) : (b))");
            }
            other => panic!("expected a macro, got {other:?}"),
        }
        match &graph.decl(graph.macros[1]).kind {
            DeclKind::Macro(m) => {
                assert!(m.params.is_empty());
                assert_eq!(m.body, "(libGlobal.curActor)");
            }
            other => panic!("expected a macro, got {other:?}"),
        }
        match &graph.decl(graph.macros[2]).kind {
            DeclKind::Macro(m) => assert_eq!(m.body, "(gAction.retryWithMissingDobj(action))"),
            other => panic!("expected a macro, got {other:?}"),
        }

        assert_eq!(graph.enum_groups.len(), 1);
        let group = graph.enum_group(graph.enum_groups[0]);
        assert_eq!(group.description, "object colours");
        assert_eq!(names(&graph, &group.enums), vec!["RED", "GREEN", "BLUE"]);

        assert_eq!(names(&graph, &graph.templates), vec!["Thing"]);
        match &graph.decl(graph.templates[0]).kind {
            DeclKind::Template(t) => assert_eq!(t.body, "'vocabWords' 'name' @location? \"desc\"?;"),
            other => panic!("expected a template, got {other:?}"),
        }
    }

    #[test]
    fn enum_without_semicolon_is_skipped() {
        let src = "/* adv3 header */\n/* dangling */\nenum A, B\nenum C;\n";
        let graph = parse(&[("adv3.h", src)]);
        assert_eq!(graph.enum_groups.len(), 1);
        let group = graph.enum_group(graph.enum_groups[0]);
        assert_eq!(names(&graph, &group.enums), vec!["C"]);
        assert_eq!(group.description, "");
        assert_eq!(graph.files[0].enum_groups.len(), 1);
    }

    #[test]
    fn header_only_forms_are_ignored_in_source_files() {
        let src = "#define X 1\nenum A, B;\n";
        let graph = parse(&[("thing.t", src)]);
        assert!(graph.macros.is_empty());
        assert!(graph.enum_groups.is_empty());
    }

    #[test]
    fn grammar_rules_share_a_production() {
        let src = "\
grammar predicate(Take): 'take' dobjList
    | 'get' dobjList
    : TakeAction
    verbPhrase = 'take/taking (what)'
;
VerbRule(Drop) ('drop' | 'put' 'down') dobjList : DropAction
;
grammar predicate(Wait): 'wait' | 'z' : IAction
;
";
        let graph = parse(&[("grammar.t", src)]);
        assert_eq!(
            names(&graph, &graph.classes),
            vec!["predicate(Take)", "VerbRule(Drop)", "predicate(Wait)"]
        );

        let take = graph.decl(class_named(&graph, "predicate(Take)"));
        let class = take.as_class().unwrap();
        let rule = class.grammar.as_ref().unwrap();
        assert_eq!(rule.rule, "'take' dobjList\n    | 'get' dobjList");
        assert_eq!(class.shape.bases, vec![BaseRef::Name("TakeAction".to_string())]);
        assert_eq!(names(&graph, &class.shape.body.properties), vec!["verbPhrase"]);

        let drop = graph.decl(class_named(&graph, "VerbRule(Drop)")).as_class().unwrap();
        assert_eq!(drop.original_definition.as_deref(), Some("VerbRule(Drop)"));
        assert_eq!(drop.grammar.as_ref().unwrap().rule, "('drop' | 'put' 'down') dobjList");

        assert_eq!(names(&graph, &graph.grammar_productions), vec!["predicate", "VerbRule"]);
        let predicate = graph.find_grammar_production("predicate").unwrap();
        match &graph.decl(predicate).kind {
            DeclKind::GrammarProduction(g) => assert_eq!(g.match_classes.len(), 2),
            other => panic!("expected a production, got {other:?}"),
        }
        assert_eq!(rule.production, predicate);
    }

    #[test]
    fn quoted_colon_does_not_end_a_rule() {
        let src = "grammar literalPhrase(quoted): '\"' ':' '\"' : LiteralProd\n;\n";
        let graph = parse(&[("grammar.t", src)]);
        let class = graph.decl(class_named(&graph, "literalPhrase(quoted)")).as_class().unwrap();
        assert_eq!(class.grammar.as_ref().unwrap().rule, "'\"' ':' '\"'");
        assert_eq!(class.shape.bases, vec![BaseRef::Name("LiteralProd".to_string())]);
    }

    #[test]
    fn objects_and_actions() {
        let src = "\
transient libGlobal: object
    curActor = nil
;
DefineTAction(Take)
;
me: Actor
;
";
        let graph = parse(&[("misc.t", src)]);
        assert_eq!(names(&graph, &graph.objects), vec!["libGlobal", "Take", "me"]);

        let lib = graph.decl(graph.objects[0]);
        match &lib.kind {
            DeclKind::Object(o) => {
                assert!(o.transient);
                assert!(!o.action);
            }
            other => panic!("expected an object, got {other:?}"),
        }
        assert_eq!(names(&graph, &lib.body().unwrap().properties), vec!["curActor"]);

        match &graph.decl(graph.objects[1]).kind {
            DeclKind::Object(o) => {
                assert!(o.action);
                assert_eq!(o.shape.bases, vec![BaseRef::Name("TAction".to_string())]);
            }
            other => panic!("expected an object, got {other:?}"),
        }
    }

    #[test]
    fn mirror_reveals_action_classes() {
        let src = "DefineTAction(Take)\n    actionTime = 1\n;\n";
        let mirror = "class TakeAction: TAction\n    actionTime = 1\n;\n";
        let graph = parse_with(&[("actions.t", src)], &[Some(mirror)]);

        assert!(graph.objects.is_empty());
        let class = graph.decl(class_named(&graph, "TakeAction")).as_class().unwrap();
        assert!(class.action);
        assert_eq!(class.original_definition.as_deref(), Some("DefineTAction(Take)"));
        assert_eq!(class.shape.body.properties.len(), 1);
    }

    #[test]
    fn propertyset_lines_come_from_the_source() {
        let src = "class Door: Thing\n    isOpen = nil\n;\n";
        let mirror = "class Door: Thing\n    propertyset 'is*'\n;\n";
        let graph = parse_with(&[("door.t", src)], &[Some(mirror)]);
        let body = graph.decl(class_named(&graph, "Door")).body().unwrap();
        assert_eq!(names(&graph, &body.properties), vec!["isOpen"]);
    }

    #[test]
    fn modify_blocks_collect_members() {
        let src = "modify Thing\n    counter = 1\n    reset() { }\n;\n";
        let graph = parse(&[("extra.t", src)]);
        assert_eq!(graph.patches.len(), 1);
        let patch = graph.decl(graph.patches[0]);
        assert_eq!(patch.name(), "Thing");
        let body = patch.body().unwrap();
        assert_eq!(names(&graph, &body.properties), vec!["counter"]);
        assert_eq!(names(&graph, &body.methods), vec!["reset"]);
        assert!(graph.files[0].classes.is_empty());
    }

    #[test]
    fn messages_span_lines() {
        let src = "\
class Thing: object
    cannotTake = DMsg(cannot take, '{The subj dobj} {is} too heavy
        to carry. ')
    weight = 10
;
";
        let graph = parse(&[("msg.t", src)]);
        assert_eq!(graph.messages.len(), 1);
        let msg = graph.decl(graph.messages[0]);
        assert_eq!(msg.name(), "cannot take");
        match &msg.kind {
            DeclKind::Message(m) => {
                assert_eq!(m.kind, MessageKind::DMsg);
                assert!(m.text.starts_with("'{The subj dobj} {is} too heavy"));
                assert!(m.text.ends_with("to carry. ')"));
            }
            other => panic!("expected a message, got {other:?}"),
        }
        let body = graph.decl(class_named(&graph, "Thing")).body().unwrap();
        assert_eq!(names(&graph, &body.properties), vec!["cannotTake", "weight"]);
    }

    #[test]
    fn messages_without_a_name_are_skipped() {
        let src = "\
class Thing: object
    blank = DMsg()
    unnamed = BMsg(, 'nothing here')
    named = BMsg(too dark, 'It is too dark. ')
;
";
        let graph = parse(&[("msg.t", src)]);
        assert_eq!(names(&graph, &graph.messages), vec!["too dark"]);
        let body = graph.decl(class_named(&graph, "Thing")).body().unwrap();
        assert_eq!(names(&graph, &body.properties), vec!["blank", "unnamed", "named"]);
    }

    #[test]
    fn lang_dir_is_recorded_once_per_run() {
        let graph = parse(&[
            ("en_us.t", "DefineLangDir(north, 'north')\n}\n"),
            ("de_de.t", "DefineLangDir(north, 'norden')\n}\n"),
        ]);
        assert_eq!(names(&graph, &graph.functions), vec!["DefineLangDir"]);
        assert_eq!(graph.decl(graph.functions[0]).symbol.source.file, "en_us.t");
    }

    #[test]
    fn argument_list_spans_lines() {
        let src = "\
class Thing: object
    describe(pov,
             [lst])
    {
    }
;
";
        let graph = parse(&[("thing.t", src)]);
        let body = graph.decl(class_named(&graph, "Thing")).body().unwrap();
        assert_eq!(
            graph.decl(body.methods[0]).params(),
            Some(&["pov".to_string(), "[lst]".to_string()][..])
        );
    }

    #[test]
    fn unterminated_comment_ends_the_file_quietly() {
        let graph = parse(&[("bad.t", "class A: object\n;\n/* never closed\n * still going\n")]);
        assert_eq!(graph.classes.len(), 1);
    }

    #[test]
    fn copyright_lines_are_skipped() {
        let src = "\
/*
 *   Copyright (c) 2000 Michael J. Roberts.
 *   This file is part of TADS 3.
 *
 *   The adv3 library.
 */
";
        let graph = parse(&[("adv3.h", src)]);
        assert_eq!(graph.files[0].description, "The adv3 library.");
    }

    #[test]
    fn comment_paragraphs_are_kept() {
        let src = "\
/* file */
/*
 *   First paragraph
 *   continues.
 *
 *   Second paragraph.
 */
class Room: Thing
;
";
        let graph = parse(&[("room.t", src)]);
        let room = graph.decl(class_named(&graph, "Room"));
        assert_eq!(
            room.symbol.description,
            "First paragraph continues.\n\nSecond paragraph."
        );
    }

    #[test]
    fn duplicate_names_get_distinct_pages() {
        let graph = parse(&[("a.t", "class Widget: object\n;\nwidget: Widget\n;\n")]);
        let class = graph.decl(graph.classes[0]).body().unwrap();
        let object = graph.decl(graph.objects[0]).body().unwrap();
        assert_eq!(class.file_name, "Widget");
        assert_eq!(object.file_name, "widget1");
    }
}
