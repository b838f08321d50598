use thiserror::Error;

/// Failures while loading a lookup table.
#[derive(Debug, Error)]
pub enum LutError {
    #[error("Failed to read lookup table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lookup table has no header line")]
    MissingHeader,

    #[error("Invalid lookup table header on line {line}: expected `grid_size num_actions`, found `{content}`")]
    InvalidHeader { line: usize, content: String },

    #[error("Invalid value `{token}` on line {line}")]
    Parse { line: usize, token: String },

    #[error("State {state} has {found} rewards, table rows hold {expected}")]
    WidthMismatch {
        state: u64,
        expected: usize,
        found: usize,
    },
}
