use crate::task::Aborted;

/// Structural errors found while parsing CIF text.
///
/// Every error is fatal to the whole parse and carries the 1-based line
/// number it was detected on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CifParseError {
    /// A data name in a single-row category was not followed by a value
    #[error("Expected value (line {line})")]
    ExpectedValue {
        /// Line of the offending token
        line: usize,
    },

    /// The values of a loop do not fill a whole number of rows
    #[error(
        "The number of values for loop starting at line {line} is not a multiple of the number of columns ({values} values, {columns} columns)"
    )]
    MalformedLoopRowCount {
        /// Line of the `loop_` keyword
        line: usize,
        /// Number of values read
        values: usize,
        /// Number of data names declared
        columns: usize,
    },

    /// A `loop_` keyword not followed by any data name
    #[error("Loop starting at line {line} declares no data names")]
    EmptyLoop {
        /// Line of the `loop_` keyword
        line: usize,
    },

    /// A save frame header inside another save frame
    #[error("Save frames cannot be nested (line {line})")]
    NestedSaveFrame {
        /// Line of the inner `save_` header
        line: usize,
    },

    /// A `data_` header inside a save frame
    #[error("Unexpected data block inside a save frame (line {line})")]
    DataBlockInsideSaveFrame {
        /// Line of the `data_` header
        line: usize,
    },

    /// Input ended while a save frame was still open
    #[error("Unfinished save frame ({header}) (line {line})")]
    UnterminatedSaveFrame {
        /// Header of the open save frame
        header: String,
        /// Last line of the input
        line: usize,
    },

    /// A top-level token that is neither a block header, loop, nor data name
    #[error("Unexpected token '{token}', expected data_, loop_, or data name (line {line})")]
    UnexpectedToken {
        /// Text of the offending token
        token: String,
        /// Line of the offending token
        line: usize,
    },
}

impl CifParseError {
    /// Line the error was detected on.
    pub fn line(&self) -> usize {
        match self {
            CifParseError::ExpectedValue { line }
            | CifParseError::MalformedLoopRowCount { line, .. }
            | CifParseError::EmptyLoop { line }
            | CifParseError::NestedSaveFrame { line }
            | CifParseError::DataBlockInsideSaveFrame { line }
            | CifParseError::UnterminatedSaveFrame { line, .. }
            | CifParseError::UnexpectedToken { line, .. } => *line,
        }
    }
}

/// Errors that end a parse run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReaderError {
    /// The input is not valid CIF
    #[error("CIF parse error: {0}")]
    Parse(#[from] CifParseError),

    /// Cancellation was requested before the parse finished
    #[error("Parsing aborted at line {line}")]
    Aborted {
        /// Line the tokenizer had reached
        line: usize,
        /// Progress at the time of the abort
        #[source]
        source: Aborted,
    },
}

impl ReaderError {
    /// Line the parse stopped at.
    pub fn line(&self) -> usize {
        match self {
            ReaderError::Parse(e) => e.line(),
            ReaderError::Aborted { line, .. } => *line,
        }
    }

    /// Returns `true` for a cancelled run rather than malformed input.
    pub fn is_aborted(&self) -> bool {
        matches!(self, ReaderError::Aborted { .. })
    }
}

/// Outcome of a parse run: the document, or a line-numbered error.
pub type ReaderResult<T> = Result<T, ReaderError>;
