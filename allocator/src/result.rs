use s7gen_dsl::diagnostic::Diagnostic;

/// Defines a result type for the resolution passes.
///
/// A pass either completes or stops at the first conflict with a
/// diagnostic error.
pub(crate) type PassResult = Result<(), Diagnostic>;
