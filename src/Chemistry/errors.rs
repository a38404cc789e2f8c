//! Error taxonomy shared by the registry, the formula parser, molecules and reactions.
//!
//! Every failure is reported at the point where it is detected and carries the
//! offending input (symbol, formula fragment, equation) so callers can show it
//! verbatim. Parser errors pass through `Molecule` construction unchanged.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChemError {
    #[error("unknown element symbol '{symbol}'")]
    UnknownElement { symbol: String },
    #[error("element '{symbol}' is registered more than once")]
    DuplicateElement { symbol: String },
    #[error("no electron configuration for atomic number {atomic_number} (supported range 1..={max})")]
    UnsupportedAtomicNumber { atomic_number: u32, max: u32 },
    #[error("formula syntax error at position {position} near '{fragment}': {reason}")]
    FormulaSyntax {
        position: usize,
        fragment: String,
        reason: String,
    },
    #[error("invalid data for element '{symbol}': {reason}")]
    InvalidElementData { symbol: String, reason: String },
    #[error("invalid reaction equation '{equation}': {reason}")]
    InvalidEquation { equation: String, reason: String },
    #[error("atom registry is already initialized")]
    RegistryAlreadyInitialized,
    #[error("element table error: {0}")]
    ElementTable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChemError {
    pub(crate) fn syntax(position: usize, fragment: impl Into<String>, reason: impl Into<String>) -> Self {
        ChemError::FormulaSyntax {
            position,
            fragment: fragment.into(),
            reason: reason.into(),
        }
    }
}
