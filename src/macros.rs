//! Text-substitution macro engine.
//!
//! Holds the `#define`s visible to one file (its own plus those of every file
//! it transitively includes) and expands invocations line by line:
//!
//! 1. parameters are substituted into the body (whole identifiers only),
//! 2. `#@name` and `#name` wrap the following identifier in single quotes,
//! 3. `##` pastes its neighbours together; two quoted strings that meet at a
//!    paste are merged into one literal.
//!
//! The result is rescanned until a pass changes nothing, bounded by
//! [`MAX_EXPANSION_PASSES`]. Argument lists track parenthesis nesting but are
//! not aware of string literals, so a `)` or `,` inside quotes splits them.

use crate::error::{Error, Result};
use crate::lexer::find_symbol;
use std::collections::HashMap;

/// Rescan limit for one line before it is considered self-referential.
pub const MAX_EXPANSION_PASSES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: String,
}

/// Outcome of expanding one line.
#[derive(Debug, PartialEq, Eq)]
pub enum Expansion {
    Complete(String),
    /// A parameterised invocation's argument list is still open at the end of
    /// the line; append the next line and try again.
    Incomplete,
}

#[derive(Debug, Default, Clone)]
pub struct MacroEngine {
    defs: HashMap<String, MacroDef>,
}

enum Args {
    Absent,
    Unclosed,
    Found(Vec<String>, usize),
}

struct Pass {
    text: String,
    expanded: Option<String>,
    unclosed: bool,
}

impl MacroEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from definitions in lookup priority order: the first definition
    /// of a name wins.
    pub fn from_scope(defs: impl IntoIterator<Item = MacroDef>) -> Self {
        let mut engine = Self::new();
        for def in defs {
            engine.defs.entry(def.name.clone()).or_insert(def);
        }
        engine
    }

    /// Add a definition, shadowing any earlier one of the same name.
    pub fn define(&mut self, def: MacroDef) {
        self.defs.insert(def.name.clone(), def);
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Expand a line, reporting an argument list left open at its end.
    pub fn expand_line(&self, line: &str) -> Result<Expansion> {
        self.expand(line, true)
    }

    /// Expand a line, treating an unclosed invocation as plain text.
    pub fn expand_available(&self, line: &str) -> Result<String> {
        match self.expand(line, false)? {
            Expansion::Complete(text) => Ok(text),
            Expansion::Incomplete => Ok(line.to_string()),
        }
    }

    fn expand(&self, line: &str, wait_for_args: bool) -> Result<Expansion> {
        let mut text = line.to_string();
        let mut last = String::new();
        for pass in 0..MAX_EXPANSION_PASSES {
            let step = self.expand_pass(&text);
            if pass == 0 && step.unclosed && wait_for_args {
                return Ok(Expansion::Incomplete);
            }
            match step.expanded {
                Some(name) => {
                    last = name;
                    text = step.text;
                }
                None => return Ok(Expansion::Complete(text)),
            }
        }
        Err(Error::MacroExpansionLoop {
            name: last,
            limit: MAX_EXPANSION_PASSES,
        })
    }

    fn expand_pass(&self, text: &str) -> Pass {
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut offset = 0;
        let mut expanded = None;
        let mut unclosed = false;

        while let Some((start, end)) = find_symbol(text, offset) {
            offset = end;
            let Some(def) = self.defs.get(&text[start..end]) else {
                continue;
            };

            if def.params.is_empty() {
                out.push_str(&text[copied..start]);
                out.push_str(&def.body);
                copied = end;
                expanded = Some(def.name.clone());
                continue;
            }

            match invocation_args(text, end) {
                Args::Found(args, close) => {
                    out.push_str(&text[copied..start]);
                    out.push_str(&def.expand(&args));
                    copied = close;
                    offset = close;
                    expanded = Some(def.name.clone());
                }
                Args::Unclosed => unclosed = true,
                Args::Absent => {}
            }
        }
        out.push_str(&text[copied..]);

        Pass {
            text: out,
            expanded,
            unclosed,
        }
    }
}

impl MacroDef {
    /// Expand the body for the given argument values. A count mismatch is
    /// logged and yields the unexpanded body.
    pub fn expand(&self, args: &[String]) -> String {
        if args.len() != self.params.len() {
            log::warn!(
                "macro {}: expected {} argument(s), got {}",
                self.name,
                self.params.len(),
                args.len()
            );
            return self.body.clone();
        }
        let substituted = substitute(&self.body, &self.params, args);
        paste(&stringize(&substituted))
    }
}

/// Collect the argument list that starts right after the macro name.
fn invocation_args(text: &str, pos: usize) -> Args {
    let rest = &text[pos..];
    if !rest.starts_with('(') {
        return Args::Absent;
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for (i, c) in rest.char_indices().skip(1) {
        match c {
            ',' if depth == 0 => args.push(std::mem::take(&mut current).trim().to_string()),
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' if depth > 0 => {
                depth -= 1;
                current.push(c);
            }
            ')' => {
                args.push(current.trim().to_string());
                return Args::Found(args, pos + i + 1);
            }
            _ => current.push(c),
        }
    }
    Args::Unclosed
}

/// Replace whole-identifier occurrences of each parameter with its argument.
fn substitute(body: &str, params: &[String], args: &[String]) -> String {
    let mut out = String::with_capacity(body.len());
    let mut copied = 0;
    let mut offset = 0;
    while let Some((start, end)) = find_symbol(body, offset) {
        offset = end;
        if let Some(i) = params.iter().position(|p| p == &body[start..end]) {
            out.push_str(&body[copied..start]);
            out.push_str(&args[i]);
            copied = end;
        }
    }
    out.push_str(&body[copied..]);
    out
}

/// Apply `#@name` then `#name`: quote the identifier that follows.
fn stringize(text: &str) -> String {
    let mut text = text.to_string();

    while let Some(n) = text.find("#@") {
        text = quote_next_symbol(&text, n, 2);
    }

    let mut i = 0;
    while i < text.len() {
        let bytes = text.as_bytes();
        if bytes[i] != b'#' {
            i += 1;
            continue;
        }
        let pasted = (i > 0 && bytes[i - 1] == b'#') || bytes.get(i + 1) == Some(&b'#');
        if pasted {
            i += 1;
            continue;
        }
        text = quote_next_symbol(&text, i, 1);
        i += 1;
    }
    text
}

/// Replace the operator of `width` bytes at `at` and the identifier after it
/// with the quoted identifier. Without a following identifier the operator is
/// dropped.
fn quote_next_symbol(text: &str, at: usize, width: usize) -> String {
    match find_symbol(text, at + width) {
        Some((start, end)) => format!("{}'{}'{}", &text[..at], &text[start..end], &text[end..]),
        None => format!("{}{}", &text[..at], &text[at + width..]),
    }
}

/// Apply `##`, merging adjacent string literals.
fn paste(text: &str) -> String {
    let mut text = text.to_string();
    while let Some(n) = text.find("##") {
        let left = text[..n].trim_end();
        let right = text[n + 2..].trim_start();
        let merged = ['"', '\'']
            .iter()
            .find(|q| left.ends_with(**q) && right.starts_with(**q))
            .map(|_| format!("{}{}", &left[..left.len() - 1], &right[1..]));
        text = merged.unwrap_or_else(|| format!("{left}{right}"));
    }
    text
}
