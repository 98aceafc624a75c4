//! Parse order: every file comes after all the files it `#include`s.

use crate::error::{Error, Result};
use crate::model::SourceFile;
use std::collections::HashMap;

/// Reorder `files` so that each file follows its includes.
///
/// Each pass moves every file whose includes are all placed; passes repeat
/// until one places nothing. Files left over at that point are part of (or
/// depend on) an include cycle.
pub fn dependency_order(files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
    let index: HashMap<&str, usize> = files
        .iter()
        .enumerate()
        .map(|(i, f)| (f.short_name.as_str(), i))
        .collect();

    let mut deps = Vec::with_capacity(files.len());
    for file in &files {
        let mut targets = Vec::with_capacity(file.includes.len());
        for include in &file.includes {
            let Some(&target) = index.get(include.as_str()) else {
                return Err(Error::UnknownInclude {
                    file: file.short_name.clone(),
                    include: include.clone(),
                });
            };
            targets.push(target);
        }
        deps.push(targets);
    }

    let mut placed = vec![false; files.len()];
    let mut order = Vec::with_capacity(files.len());
    loop {
        let mut progress = false;
        for i in 0..files.len() {
            if !placed[i] && deps[i].iter().all(|&d| placed[d]) {
                placed[i] = true;
                order.push(i);
                progress = true;
            }
        }
        if !progress {
            break;
        }
    }

    if order.len() != files.len() {
        let files = files
            .iter()
            .zip(&placed)
            .filter(|(_, done)| !**done)
            .map(|(f, _)| f.short_name.clone())
            .collect();
        return Err(Error::CyclicDependency { files });
    }

    let mut slots: Vec<Option<SourceFile>> = files.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, includes: &[&str]) -> SourceFile {
        let mut f = SourceFile::new(name);
        f.includes = includes.iter().map(|s| s.to_string()).collect();
        f
    }

    fn names(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.short_name.as_str()).collect()
    }

    fn position(files: &[SourceFile], name: &str) -> usize {
        files.iter().position(|f| f.short_name == name).unwrap()
    }

    #[test]
    fn includes_come_first() {
        let files = vec![
            file("thing.t", &["adv3.h"]),
            file("adv3.h", &["tads.h"]),
            file("tads.h", &[]),
        ];
        let order = dependency_order(files).unwrap();
        assert_eq!(names(&order), vec!["tads.h", "adv3.h", "thing.t"]);
    }

    #[test]
    fn transitive_includes_precede() {
        let files = vec![
            file("a.t", &["b.h"]),
            file("b.h", &["c.h"]),
            file("d.t", &["c.h", "a.t"]),
            file("c.h", &[]),
        ];
        let order = dependency_order(files).unwrap();
        assert!(position(&order, "c.h") < position(&order, "b.h"));
        assert!(position(&order, "b.h") < position(&order, "a.t"));
        assert!(position(&order, "a.t") < position(&order, "d.t"));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn cycle_is_an_error() {
        let files = vec![
            file("ok.h", &[]),
            file("a.h", &["b.h"]),
            file("b.h", &["a.h"]),
            file("c.t", &["a.h"]),
        ];
        match dependency_order(files) {
            Err(Error::CyclicDependency { files }) => assert_eq!(files, vec!["a.h", "b.h", "c.t"]),
            other => panic!("expected a cycle error, got {:?}", other.map(|f| f.len())),
        }
    }

    #[test]
    fn unknown_include_is_an_error() {
        let files = vec![file("thing.t", &["missing.h"])];
        match dependency_order(files) {
            Err(Error::UnknownInclude { file, include }) => {
                assert_eq!(file, "thing.t");
                assert_eq!(include, "missing.h");
            }
            other => panic!("expected an unknown include, got {:?}", other.map(|f| f.len())),
        }
    }
}
