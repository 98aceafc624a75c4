//! Pull-based line cursor over one source file.
//!
//! The classifier reads a line with [`LineCursor::next_line`] and pulls
//! continuation lines (comment bodies, macro bodies, grammar rules, argument
//! lists) with [`LineCursor::require_line`], which fails at end of input.
//! An optional mirror reader (the macro-expanded copy of the file) advances
//! in lock step with the source.

use crate::error::{Error, Result};
use crate::macros::{Expansion, MacroDef, MacroEngine};
use crate::model::SourceFile;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One line handed to the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based number of the raw source line this came from.
    pub number: usize,
    /// The line as read, or its in-process macro expansion.
    pub text: String,
    /// The corresponding line of the mirror file.
    pub mirror: Option<String>,
}

/// Joined lines tried for one unclosed argument list before giving up.
const MAX_ARGUMENT_LINES: usize = 16;

/// A raw line with its number and mirror line.
struct RawLine {
    number: usize,
    text: String,
    mirror: Option<String>,
}

struct Input {
    file: String,
    path: PathBuf,
    source: Box<dyn BufRead>,
    mirror: Option<Box<dyn BufRead>>,
    /// Lines read ahead and handed back, served before the source.
    replay: VecDeque<RawLine>,
    /// Number of the line most recently returned by `read`.
    number: usize,
    /// Lines consumed from the source so far.
    consumed: usize,
}

pub struct LineCursor {
    input: Input,
    macros: Option<MacroEngine>,
    /// Remaining pieces of a multi-line expansion.
    pending: VecDeque<String>,
}

impl Input {
    /// Read the next raw line, advancing the mirror with it.
    fn read(&mut self) -> Result<Option<RawLine>> {
        if let Some(line) = self.replay.pop_front() {
            self.number = line.number;
            return Ok(Some(line));
        }
        let Some(text) = read_lossy(&mut self.source).map_err(|e| Error::io(&self.path, e))? else {
            return Ok(None);
        };
        self.consumed += 1;
        self.number = self.consumed;
        let mirror = match self.mirror.as_mut() {
            Some(reader) => read_lossy(reader).map_err(|e| Error::io(&self.path, e))?,
            None => None,
        };
        Ok(Some(RawLine {
            number: self.number,
            text,
            mirror,
        }))
    }

    /// Hand `lines` back to be read again, and rewind the line number.
    fn unread(&mut self, lines: Vec<RawLine>, number: usize) {
        for line in lines.into_iter().rev() {
            self.replay.push_front(line);
        }
        self.number = number;
    }
}

impl LineCursor {
    pub fn new(file: impl Into<String>, source: impl BufRead + 'static) -> Self {
        let file = file.into();
        LineCursor {
            input: Input {
                path: PathBuf::from(&file),
                file,
                source: Box::new(source),
                mirror: None,
                replay: VecDeque::new(),
                number: 0,
                consumed: 0,
            },
            macros: None,
            pending: VecDeque::new(),
        }
    }

    /// Open a source file for reading. The handle is released when the
    /// cursor is dropped.
    pub fn open(file: &SourceFile) -> Result<Self> {
        let handle = File::open(&file.path).map_err(|e| Error::io(&file.path, e))?;
        let mut cursor = Self::new(file.short_name.clone(), BufReader::new(handle));
        cursor.input.path = file.path.clone();
        Ok(cursor)
    }

    pub fn with_mirror(mut self, mirror: impl BufRead + 'static) -> Self {
        self.input.mirror = Some(Box::new(mirror));
        self
    }

    /// Attach the mirror file `dir/<short name>` if it exists.
    pub fn with_mirror_dir(self, dir: &Path) -> Self {
        let path = dir.join(&self.input.file);
        match File::open(&path) {
            Ok(handle) => self.with_mirror(BufReader::new(handle)),
            Err(e) => {
                log::warn!(
                    "no macro-expanded copy of {} ({}): {}",
                    self.input.file,
                    path.display(),
                    e
                );
                self
            }
        }
    }

    pub fn with_macros(mut self, engine: MacroEngine) -> Self {
        self.macros = Some(engine);
        self
    }

    /// Make a definition found in this file visible to the following lines.
    pub fn define_macro(&mut self, def: MacroDef) {
        if let Some(engine) = self.macros.as_mut() {
            engine.define(def);
        }
    }

    pub fn file(&self) -> &str {
        &self.input.file
    }

    /// Number of the raw line most recently read.
    pub fn line_number(&self) -> usize {
        self.input.number
    }

    /// The next line, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<SourceLine>> {
        if let Some(text) = self.pending.pop_front() {
            return Ok(Some(SourceLine {
                number: self.input.number,
                text,
                mirror: None,
            }));
        }

        let Some(RawLine { text: raw, mirror, .. }) = self.input.read()? else {
            return Ok(None);
        };
        let text = match self.macros.as_ref() {
            Some(engine) => expand_with_continuation(engine, &mut self.input, raw)?,
            None => raw,
        };

        let mut pieces = text.split('\n').map(|piece| piece.trim_end_matches('\r').to_string());
        let first = pieces.next().unwrap_or_default();
        self.pending.extend(pieces);

        Ok(Some(SourceLine {
            number: self.input.number,
            text: first,
            mirror,
        }))
    }

    /// The text of the next line; running out of input is an error.
    pub fn require_line(&mut self) -> Result<String> {
        match self.next_line()? {
            Some(line) => Ok(line.text),
            None => Err(Error::UnexpectedEof {
                file: self.input.file.clone(),
                line: self.input.number,
            }),
        }
    }
}

/// Expand `raw`, joining following lines while an invocation's argument list
/// is still open. Joining stops at a blank line, after a line ending in `;`
/// or after [`MAX_ARGUMENT_LINES`] lines; then only `raw` is expanded and the
/// lines pulled so far are read again on their own.
fn expand_with_continuation(engine: &MacroEngine, input: &mut Input, raw: String) -> Result<String> {
    let number = input.number;
    let mut joined = raw.clone();
    let mut pulled: Vec<RawLine> = Vec::new();
    loop {
        if let Expansion::Complete(text) = engine.expand_line(&joined)? {
            return Ok(text);
        }
        let last = pulled.last().map_or(raw.as_str(), |line| line.text.as_str());
        let next = if pulled.len() < MAX_ARGUMENT_LINES && !last.trim_end().ends_with(';') {
            input.read()?
        } else {
            None
        };
        match next {
            Some(line) if !line.text.trim().is_empty() => {
                joined.push(' ');
                joined.push_str(line.text.trim());
                pulled.push(line);
            }
            blank => {
                log::debug!("{}:{}: argument list left open", input.file, number);
                pulled.extend(blank);
                input.unread(pulled, number);
                return engine.expand_available(&raw);
            }
        }
    }
}

/// Read one line, tolerating invalid UTF-8 and CRLF endings.
fn read_lossy(reader: &mut dyn BufRead) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
