//! Input intake: turn paths into [`SourceFile`]s and pre-scan them for line
//! counts and `#include` targets before anything is parsed.

use crate::error::{Error, Result};
use crate::model::SourceFile;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static RE_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*#include\s*(?:"([^"]*)"|<([^>]*)>)"#).unwrap());

/// Short names of the files a source text `#include`s, in order.
pub fn scan_includes(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| RE_INCLUDE.captures(line))
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Read `file` once, recording its line count and include targets.
pub fn prescan(file: &mut SourceFile) -> Result<()> {
    let bytes = std::fs::read(&file.path).map_err(|e| Error::io(&file.path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    file.line_count = text.lines().count();
    file.includes = scan_includes(&text);
    Ok(())
}

/// Build and pre-scan a [`SourceFile`] for every path.
pub fn load(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path| {
            let mut file = SourceFile::new(path);
            prescan(&mut file)?;
            Ok(file)
        })
        .collect()
}
