//! Atom value type and the electron configuration derived from the atomic number.
use crate::Chemistry::errors::ChemError;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Order in which subshells are filled (Klechkowski rule), as (n, l) pairs.
const FILLING_ORDER: [(u32, u32); 19] = [
    (1, 0),
    (2, 0),
    (2, 1),
    (3, 0),
    (3, 1),
    (4, 0),
    (3, 2),
    (4, 1),
    (5, 0),
    (4, 2),
    (5, 1),
    (6, 0),
    (4, 3),
    (5, 2),
    (6, 1),
    (7, 0),
    (5, 3),
    (6, 2),
    (7, 1),
];

const SUBSHELL_LETTERS: [char; 4] = ['s', 'p', 'd', 'f'];

/// Maximum number of electrons a subshell with orbital quantum number `l` can hold.
pub fn subshell_capacity(l: u32) -> u32 {
    (2 * l + 1) * 2
}

/// Highest atomic number the filling order can describe (118 with 7p filled).
pub fn max_configured_atomic_number() -> u32 {
    FILLING_ORDER
        .iter()
        .map(|&(_, l)| subshell_capacity(l))
        .sum()
}

/// One uppercase ASCII letter followed by zero or more lowercase ASCII letters.
pub fn is_element_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => chars.all(|c| c.is_ascii_lowercase()),
        _ => false,
    }
}

/// Electron configuration for `atomic_number` electrons, e.g. `["1s2", "2s2", "2p4"]` for oxygen.
pub fn electron_configuration(atomic_number: u32) -> Result<Vec<String>, ChemError> {
    let max = max_configured_atomic_number();
    if atomic_number == 0 || atomic_number > max {
        return Err(ChemError::UnsupportedAtomicNumber { atomic_number, max });
    }
    let mut config = Vec::new();
    let mut remaining = atomic_number;
    for &(n, l) in FILLING_ORDER.iter() {
        if remaining == 0 {
            break;
        }
        let electrons = subshell_capacity(l).min(remaining);
        remaining -= electrons;
        config.push(format!("{}{}{}", n, SUBSHELL_LETTERS[l as usize], electrons));
    }
    Ok(config)
}

/// A chemical element with its fixed physical constants.
///
/// Equality, ordering and hashing look at the symbol only, so two atoms built
/// separately for the same element are the same key in a composition map.
#[derive(Debug, Clone)]
pub struct Atom {
    symbol: String,
    atomic_number: u32,
    atomic_mass: f64,
}

impl Atom {
    /// Builds an atom after checking the symbol grammar, a positive atomic number and a positive finite mass.
    pub fn new(symbol: &str, atomic_number: u32, atomic_mass: f64) -> Result<Self, ChemError> {
        if !is_element_symbol(symbol) {
            return Err(ChemError::InvalidElementData {
                symbol: symbol.to_string(),
                reason: "symbol must be an uppercase letter followed by lowercase letters".to_string(),
            });
        }
        if atomic_number == 0 {
            return Err(ChemError::InvalidElementData {
                symbol: symbol.to_string(),
                reason: "atomic number must be positive".to_string(),
            });
        }
        if !atomic_mass.is_finite() || atomic_mass <= 0.0 {
            return Err(ChemError::InvalidElementData {
                symbol: symbol.to_string(),
                reason: format!("atomic mass must be a positive number, got {}", atomic_mass),
            });
        }
        Ok(Self {
            symbol: symbol.to_string(),
            atomic_number,
            atomic_mass,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    /// Atomic mass in atomic mass units (g/mol).
    pub fn atomic_mass(&self) -> f64 {
        self.atomic_mass
    }

    pub fn electron_configuration(&self) -> Result<Vec<String>, ChemError> {
        electron_configuration(self.atomic_number)
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.symbol.cmp(&other.symbol)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.symbol, self.atomic_number, self.atomic_mass)
    }
}
