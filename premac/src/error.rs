use std::io;
use thiserror::Error;

/// Errors that can occur during preprocessing
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// An `#include` could not be resolved against the local directory or
    /// any search path
    #[error("include file \"{0}\" cannot be found")]
    IncludeNotFound(String),

    /// A file included itself, directly or through other files
    #[error("include cycle detected for \"{0}\"")]
    IncludeCycle(String),

    /// `#elif`, `#else` or `#endif` without a matching `#if`
    #[error("unexpected #{0} with no open conditional")]
    UnmatchedConditional(&'static str),

    /// A conditional block was still open at the end of a file
    #[error("unterminated #if/#ifdef/#ifndef at end of file")]
    UnterminatedConditional,

    /// A `/* ... */` comment was still open at the end of a file
    #[error("unterminated block comment at end of file")]
    UnterminatedComment,

    /// A function-like macro's argument list ran past the end of the input
    #[error("unterminated macro argument list in \"{0}\"")]
    UnterminatedArguments(String),

    /// A string literal with no closing quote
    #[error("unterminated string literal in \"{0}\"")]
    UnterminatedString(String),

    /// A function-like macro invoked with the wrong number of arguments
    #[error("macro \"{name}\" expects {expected} arguments, got {found}")]
    ArityMismatch {
        /// The invoked macro
        name: String,
        /// The required argument count ("2", or "at least 1" for variadics)
        expected: String,
        /// The number of arguments actually supplied
        found: usize,
    },

    /// The substitution counter exceeded its bound, almost always because of
    /// mutually recursive macros
    #[error("macro expansion limit exceeded in \"{0}\"")]
    ExpansionLimit(String),

    /// Parameter-list validation failed when the macro was defined
    #[error("invalid parameter list for macro \"{name}\": {reason}")]
    InvalidParameters {
        /// The macro being defined
        name: String,
        /// What was wrong with the list
        reason: String,
    },

    /// A `#error` directive in an active region
    #[error("#error {0}")]
    ErrorDirective(String),

    /// An expression could not be evaluated
    #[error("cannot evaluate \"{expr}\": {reason}")]
    Evaluation {
        /// The expression as written
        expr: String,
        /// Why evaluation failed
        reason: String,
    },

    /// I/O failure while reading an included file
    #[error(transparent)]
    Io(#[from] io::Error),
}
