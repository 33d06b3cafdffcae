//! Common items useful for working with configuration elements but not
//! themselves part of the configuration language.
use core::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use std::{hash::Hash, hash::Hasher};

// Static singleton for the common empty FileId value to avoid repeated
// allocations, particularly in test code which frequently uses
// FileId::default().
static EMPTY_FILE_ID: LazyLock<Arc<str>> = LazyLock::new(|| Arc::from(""));

/// FileId identifies the origin of a configuration element.
///
/// FileId is normally useful in the context of source positions where a
/// source position is in a configuration document. It can also represent
/// entries that are built in to the generator (the reserved symbol table).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FileId {
    /// An element from a configuration document. The string is the file path.
    File(Arc<str>),
    /// Built in to the generator (reserved symbols, primitive types).
    /// These have no source document.
    BuiltIn,
}

impl FileId {
    /// Creates an empty file identifier.
    pub fn new() -> Self {
        FileId::default()
    }

    /// Creates a file identifier from the path.
    pub fn from_path(path: &Path) -> Self {
        FileId::File(Arc::from(path.to_string_lossy().as_ref()))
    }

    /// Creates a file identifier from the slice. The slice
    /// is normally the file path.
    pub fn from_string(path: &str) -> Self {
        FileId::File(Arc::from(path))
    }

    /// Creates a file identifier for built-in entries.
    pub fn builtin() -> Self {
        FileId::BuiltIn
    }

    /// Returns true if this FileId represents a built-in entry.
    pub fn is_builtin(&self) -> bool {
        matches!(self, FileId::BuiltIn)
    }
}

impl Default for FileId {
    fn default() -> Self {
        FileId::File(EMPTY_FILE_ID.clone())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileId::File(path) => write!(f, "{}", path),
            FileId::BuiltIn => write!(f, "<builtin>"),
        }
    }
}

/// Location in a document of a configuration element instance.
///
/// The location is defined by indices in the source document.
#[derive(Debug, Clone)]
pub struct SourceSpan {
    /// The position of the starting character (0-indexed).
    pub start: usize,
    /// The position of the ending character (0-indexed).
    ///
    /// Equals the start position for a length of 1 character.
    pub end: usize,
    pub file_id: FileId,
}

impl SourceSpan {
    pub fn range(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            file_id: FileId::default(),
        }
    }

    pub fn with_file_id(&self, file_id: &FileId) -> Self {
        Self {
            start: self.start,
            end: self.end,
            file_id: file_id.clone(),
        }
    }

    /// Creates a SourceSpan for built-in entries. These have no meaningful
    /// source position.
    pub fn builtin() -> Self {
        Self {
            start: 0,
            end: 0,
            file_id: FileId::builtin(),
        }
    }

    /// Returns true if this span represents a built-in entry.
    pub fn is_builtin(&self) -> bool {
        self.file_id.is_builtin()
    }
}

impl Default for SourceSpan {
    fn default() -> Self {
        SourceSpan::range(0, 0)
    }
}

impl PartialEq for SourceSpan {
    fn eq(&self, _other: &Self) -> bool {
        // Two source spans are equal by default. When comparing elements,
        // we rarely want to know that they were declared at the same
        // position. With this, we can use derived PartialEq implementations
        // on containing types.
        true
    }
}
impl Eq for SourceSpan {}

/// Defines an element that has a location in a configuration document.
pub trait Located {
    /// Get the source position of the object.
    fn span(&self) -> SourceSpan;
}

/// Implements Identifier.
///
/// Symbol names in the configuration language are case insensitive.
/// This class ensures that we do case insensitive comparisons
/// and can use containers as appropriate.
pub struct Id {
    pub original: String,
    pub lower_case: String,
    pub span: SourceSpan,
}

impl Id {
    /// Converts a `&str` into an `Identifier`.
    pub fn from(str: &str) -> Self {
        Id {
            original: String::from(str),
            lower_case: String::from(str).to_lowercase(),
            span: SourceSpan::default(),
        }
    }

    pub fn with_position(mut self, loc: SourceSpan) -> Self {
        self.span = loc;
        self
    }

    /// Converts an `Identifier` into a lower case `String`.
    pub fn lower_case(&self) -> &String {
        &self.lower_case
    }

    pub fn original(&self) -> &String {
        &self.original
    }
}

impl Clone for Id {
    fn clone(&self) -> Self {
        Id::from(self.original.as_str()).with_position(self.span.clone())
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.lower_case == other.lower_case
    }
}
impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lower_case.hash(state);
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Located for Id {
    fn span(&self) -> SourceSpan {
        self.span.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_when_different_case_then_equal() {
        assert_eq!(Id::from("Motor_1"), Id::from("MOTOR_1"));
    }

    #[test]
    fn id_when_display_then_preserves_original() {
        let id = Id::from("Motor_1");
        assert_eq!(format!("{id}"), "Motor_1");
    }

    #[test]
    fn file_id_when_display_then_returns_value() {
        let file_id = FileId::from_string("plant/line1.cfg");
        assert_eq!(format!("{file_id}"), "plant/line1.cfg");
    }

    #[test]
    fn file_id_builtin_when_display_then_returns_builtin_marker() {
        let file_id = FileId::builtin();
        assert_eq!(format!("{file_id}"), "<builtin>");
        assert!(file_id.is_builtin());
    }

    #[test]
    fn source_span_when_compared_then_position_is_ignored() {
        assert_eq!(SourceSpan::range(0, 4), SourceSpan::range(10, 20));
    }
}
