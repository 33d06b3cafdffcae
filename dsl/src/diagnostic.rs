//! Provides definition for diagnostics, which are normally errors and
//! warnings associated with one compilation run of a device.
//!
//! There exist crates that make this easy, but we need to carry the
//! colliding prior definition alongside the offending one so that a user
//! can locate the responsible configuration entry, and no one crate does
//! exactly that.

use s7gen_problems::Problem;

use crate::core::SourceSpan;

/// A label that refers to some range in a configuration document and is
/// associated with a message related to that range.
///
/// Normally this indicates the location of an error along with a text
/// message describing that position.
#[derive(Debug)]
pub struct Label {
    /// The position of the label.
    pub span: SourceSpan,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    pub fn span(span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    /// A "position" that refers to a document in its entirety rather than
    /// a particular range.
    pub fn file(span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            span: SourceSpan::range(0, 0).with_file_id(&span.file_id),
            message: message.into(),
        }
    }
}

/// A diagnostic. Diagnostics have a code that is indicative of the category,
/// a primary location and a possibly non-zero set of secondary locations.
#[derive(Debug)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    description: String,

    /// The primary or first location.
    pub primary: Label,

    /// Additional descriptions beyond the constant description.
    pub described: Vec<String>,

    /// Additional information about the diagnostic, such as the location
    /// of a colliding prior definition.
    pub secondary: Vec<Label>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code and with the specified label.
    ///
    /// The label associates the problem to a particular configuration entry.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code().to_string(),
            description: problem.message().to_string(),
            primary,
            described: vec![],
            secondary: vec![],
        }
    }

    /// Creates a "todo" diagnostic associated with a file and line in the
    /// Rust source code.
    ///
    /// Unlike other uses of problem, the location in this is related to the
    /// generator rather than a configuration document.
    pub fn todo(file: &str, line: u32) -> Self {
        Diagnostic::problem(
            Problem::NotImplemented,
            Label::span(
                SourceSpan::default(),
                format!("Not implemented at {}#L{}", file, line),
            ),
        )
    }

    /// Adds to the problem description (primary text) additional context
    /// about the problem.
    ///
    /// This is similar to adding primary and secondary items except that
    /// this forms part of the main description and does not need to be
    /// related to a position in a document.
    pub fn with_context(mut self, description: &str, item: &str) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    pub fn with_secondary(mut self, label: Label) -> Self {
        self.secondary.push(label);
        self
    }

    /// Returns the description for the diagnostic. This may add in other
    /// data in addition that is part of the diagnostic.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_when_no_context_then_constant_message() {
        let diagnostic = Diagnostic::problem(
            Problem::SymbolNameInUse,
            Label::span(SourceSpan::default(), "second declaration"),
        );
        assert_eq!("P0004", diagnostic.code);
        assert_eq!("Symbol name is already declared", diagnostic.description());
    }

    #[test]
    fn description_when_context_then_appends_items() {
        let diagnostic = Diagnostic::problem(
            Problem::BlockNumberInUse,
            Label::span(SourceSpan::default(), "explicit number"),
        )
        .with_context("number", "12");
        assert_eq!(
            "Block number is already assigned (number=12)",
            diagnostic.description()
        );
    }
}
