//! Comment extraction from `SourceCodeInfo`.

use std::fmt;

use ahash::AHashMap;
use protograph_descriptor::SourceCodeInfo;

use crate::location::SourcePath;

/// A comment string exactly as `protoc` reports it (leading `//` stripped).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Comments(String);

impl Comments {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Renders each line prefixed with `//`, always ending in a newline.
/// An empty comment renders as nothing.
impl fmt::Display for Comments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        for line in self.0.strip_suffix('\n').unwrap_or(&self.0).split('\n') {
            writeln!(f, "//{line}")?;
        }
        Ok(())
    }
}

/// Leading, trailing and detached comments attached to one declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentSet {
    pub leading_detached: Vec<Comments>,
    pub leading: Comments,
    pub trailing: Comments,
}

impl CommentSet {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty() && self.leading_detached.is_empty()
    }
}

/// Per-file lookup table from structural path to comments.
///
/// Matching is on the whole path; `[4, 0]` never answers for `[4, 0, 2, 1]`.
#[derive(Debug, Default)]
pub struct CommentIndex {
    by_path: AHashMap<Vec<i32>, CommentSet>,
}

impl CommentIndex {
    pub fn new(info: Option<&SourceCodeInfo>) -> Self {
        let mut by_path = AHashMap::new();
        for loc in info.map(|i| i.location.as_slice()).unwrap_or_default() {
            // protoc emits one location per declaration; keep the first if not.
            by_path.entry(loc.path.clone()).or_insert_with(|| CommentSet {
                leading_detached: loc
                    .leading_detached_comments
                    .iter()
                    .map(|c| Comments::new(c.as_str()))
                    .collect(),
                leading: Comments::new(loc.leading_comments.clone().unwrap_or_default()),
                trailing: Comments::new(loc.trailing_comments.clone().unwrap_or_default()),
            });
        }
        Self { by_path }
    }

    pub fn lookup(&self, path: &SourcePath) -> CommentSet {
        self.by_path
            .get(path.as_slice())
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protograph_descriptor::Location as RawLocation;

    fn info(entries: Vec<(Vec<i32>, &str)>) -> SourceCodeInfo {
        SourceCodeInfo {
            location: entries
                .into_iter()
                .map(|(path, leading)| RawLocation {
                    path,
                    leading_comments: Some(leading.to_string()),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn lookup_is_exact_match_only() {
        let index = CommentIndex::new(Some(&info(vec![(vec![4, 0], " Foo\n")])));

        let hit = index.lookup(&SourcePath::new(vec![4, 0]));
        assert_eq!(hit.leading.as_str(), " Foo\n");

        assert!(index.lookup(&SourcePath::new(vec![4, 0, 2, 1])).is_empty());
        assert!(index.lookup(&SourcePath::new(vec![4, 1])).is_empty());
        assert!(index.lookup(&SourcePath::new(vec![4])).is_empty());
    }

    #[test]
    fn missing_source_info_yields_empty_sets() {
        let index = CommentIndex::new(None);
        assert!(index.is_empty());
        let set = index.lookup(&SourcePath::new(vec![5, 0]));
        assert_eq!(set, CommentSet::default());
        assert_eq!(set.leading.to_string(), "");
    }

    #[test]
    fn first_location_for_a_path_wins() {
        let index = CommentIndex::new(Some(&info(vec![
            (vec![6, 0], " first\n"),
            (vec![6, 0], " second\n"),
        ])));
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup(&SourcePath::new(vec![6, 0])).leading.as_str(), " first\n");
    }

    #[test]
    fn detached_and_trailing_are_kept_in_order() {
        let raw = SourceCodeInfo {
            location: vec![RawLocation {
                path: vec![4, 0, 2, 0],
                trailing_comments: Some(" after\n".to_string()),
                leading_detached_comments: vec![" one\n".to_string(), " two\n".to_string()],
                ..Default::default()
            }],
        };
        let set = CommentIndex::new(Some(&raw)).lookup(&SourcePath::new(vec![4, 0, 2, 0]));
        assert!(set.leading.is_empty());
        assert_eq!(set.trailing.as_str(), " after\n");
        let detached: Vec<&str> = set.leading_detached.iter().map(|c| c.as_str()).collect();
        assert_eq!(detached, vec![" one\n", " two\n"]);
    }

    #[test]
    fn display_prefixes_every_line() {
        assert_eq!(Comments::new(" a\n b\n").to_string(), "// a\n// b\n");
        assert_eq!(Comments::new(" no newline").to_string(), "// no newline\n");
        assert_eq!(Comments::default().to_string(), "");
    }
}
