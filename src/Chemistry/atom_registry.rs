//! # Atom Registry
//!
//! ## Purpose
//! Read-only table mapping element symbols to [`Atom`]s. The table is built once,
//! validated on construction, and never mutated afterwards.
//!
//! ## Architecture
//! - **ElementRecord**: serializable row of the element table (symbol, atomic number, atomic mass)
//! - **AtomRegistry**: validated symbol -> Atom map with lookups
//! - **Global Access**: a `OnceLock` holding the process-wide registry. It is installed
//!   explicitly with [`init_atom_registry`] or lazily with the built-in table on first use
//!
//! ## Usage
//! ```rust
//! use chempkg::Chemistry::atom_registry::atom_registry;
//!
//! let oxygen = atom_registry().lookup("O").unwrap();
//! assert_eq!(oxygen.atomic_number(), 8);
//! ```
use crate::Chemistry::atom::Atom;
use crate::Chemistry::errors::ChemError;
use crate::Utils::load_from_file::load_elements_from_file;
use crate::config::ChemConfig;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::OnceLock;

/// One row of an element table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub symbol: String,
    pub atomic_number: u32,
    pub atomic_mass: f64,
}

impl ElementRecord {
    pub fn new(symbol: &str, atomic_number: u32, atomic_mass: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            atomic_number,
            atomic_mass,
        }
    }
}

/// Built-in teaching table: rounded masses so that hand calculations come out even.
const BUILTIN_ELEMENTS: &[(&str, u32, f64)] = &[
    ("H", 1, 1.0),
    ("C", 6, 12.0),
    ("O", 8, 16.0),
    ("N", 7, 14.0),
    ("Ca", 20, 40.0),
    ("P", 15, 31.0),
    ("K", 19, 39.0),
    ("S", 16, 32.0),
    ("Na", 11, 23.0),
    ("Cl", 17, 35.5),
    ("Fe", 26, 56.0),
    ("I", 53, 127.0),
    ("F", 9, 19.0),
    ("Co", 27, 59.0),
    ("Mo", 42, 96.0),
];

pub fn builtin_records() -> Vec<ElementRecord> {
    BUILTIN_ELEMENTS
        .iter()
        .map(|&(symbol, number, mass)| ElementRecord::new(symbol, number, mass))
        .collect()
}

#[derive(Debug, Clone)]
pub struct AtomRegistry {
    atoms: HashMap<String, Atom>,
}

impl AtomRegistry {
    /// Registry over the built-in teaching table.
    pub fn builtin() -> Result<Self, ChemError> {
        Self::from_records(builtin_records())
    }

    /// Validates every record and fails on the first duplicated symbol instead of overwriting it.
    pub fn from_records(records: Vec<ElementRecord>) -> Result<Self, ChemError> {
        let mut atoms = HashMap::with_capacity(records.len());
        for record in records {
            let atom = Atom::new(&record.symbol, record.atomic_number, record.atomic_mass)?;
            match atoms.entry(record.symbol) {
                Entry::Occupied(entry) => {
                    return Err(ChemError::DuplicateElement {
                        symbol: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(atom);
                }
            }
        }
        Ok(Self { atoms })
    }

    /// Registry described by a configuration: the configured element table file if any, the built-in table otherwise.
    pub fn from_config(config: &ChemConfig) -> Result<Self, ChemError> {
        match &config.element_table {
            Some(path) => {
                let records = load_elements_from_file(path)?;
                let registry = Self::from_records(records)?;
                info!("atom registry built from '{}' with {} elements", path, registry.len());
                Ok(registry)
            }
            None => Self::builtin(),
        }
    }

    pub fn lookup(&self, symbol: &str) -> Result<&Atom, ChemError> {
        self.atoms.get(symbol).ok_or_else(|| ChemError::UnknownElement {
            symbol: symbol.to_string(),
        })
    }

    pub fn lookup_by_number(&self, atomic_number: u32) -> Option<&Atom> {
        self.atoms
            .values()
            .find(|atom| atom.atomic_number() == atomic_number)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.atoms.contains_key(symbol)
    }

    /// Sorted list of registered symbols.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.atoms.keys().map(|s| s.as_str()).collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn electron_configuration(&self, atom: &Atom) -> Result<Vec<String>, ChemError> {
        atom.electron_configuration()
    }
}

/// Process-wide registry. Written at most once, read freely afterwards.
static GLOBAL_ATOM_REGISTRY: OnceLock<AtomRegistry> = OnceLock::new();

/// Installs `registry` as the process-wide registry.
///
/// # Returns
/// * `Ok(&AtomRegistry)` - the installed registry
/// * `Err(ChemError::RegistryAlreadyInitialized)` - if a registry (custom or built-in) is already in place
pub fn init_atom_registry(registry: AtomRegistry) -> Result<&'static AtomRegistry, ChemError> {
    let count = registry.len();
    GLOBAL_ATOM_REGISTRY
        .set(registry)
        .map_err(|_| ChemError::RegistryAlreadyInitialized)?;
    info!("atom registry initialized with {} elements", count);
    GLOBAL_ATOM_REGISTRY
        .get()
        .ok_or(ChemError::RegistryAlreadyInitialized)
}

/// Builds the registry described by `config` and installs it.
pub fn init_atom_registry_from_config(
    config: &ChemConfig,
) -> Result<&'static AtomRegistry, ChemError> {
    let registry = AtomRegistry::from_config(config)?;
    init_atom_registry(registry)
}

/// Returns the process-wide registry, installing the built-in table on first use.
///
/// The built-in table goes through the same validation as any other table. Should it
/// ever fail, the error is logged and the registry stays empty, so every lookup
/// reports `UnknownElement` instead of using a partly valid table.
pub fn atom_registry() -> &'static AtomRegistry {
    GLOBAL_ATOM_REGISTRY.get_or_init(|| match AtomRegistry::builtin() {
        Ok(registry) => {
            info!("atom registry initialized with {} built-in elements", registry.len());
            registry
        }
        Err(e) => {
            error!("built-in element table is invalid: {}", e);
            AtomRegistry {
                atoms: HashMap::new(),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_duplicate_row_fails_fast() {
        let mut records = builtin_records();
        records.push(ElementRecord::new("H", 1, 1.008));
        match AtomRegistry::from_records(records) {
            Err(ChemError::DuplicateElement { symbol }) => assert_eq!(symbol, "H"),
            other => panic!("expected DuplicateElement, got {:?}", other),
        }
    }

    #[test]
    fn test_builtin_table_is_valid() {
        let registry = AtomRegistry::builtin().unwrap();
        assert_eq!(registry.len(), BUILTIN_ELEMENTS.len());
        assert!(!registry.is_empty());
        assert_eq!(
            registry.symbols(),
            vec![
                "C", "Ca", "Cl", "Co", "F", "Fe", "H", "I", "K", "Mo", "N", "Na", "O", "P", "S"
            ]
        );
    }

    #[test]
    fn test_lookup_roundtrips_symbol() {
        let registry = AtomRegistry::builtin().unwrap();
        for symbol in registry.symbols() {
            let first = registry.lookup(symbol).unwrap();
            let second = registry.lookup(symbol).unwrap();
            assert_eq!(first.symbol(), symbol);
            assert_eq!(first, second);
            assert_eq!(first.atomic_mass(), second.atomic_mass());
        }
        assert_eq!(registry.lookup("Cl").unwrap().atomic_mass(), 35.5);
        assert_eq!(registry.lookup_by_number(26).unwrap().symbol(), "Fe");
        assert!(registry.lookup_by_number(2).is_none());
    }

    #[test]
    fn test_unknown_element() {
        let registry = AtomRegistry::builtin().unwrap();
        match registry.lookup("Xe") {
            Err(ChemError::UnknownElement { symbol }) => assert_eq!(symbol, "Xe"),
            other => panic!("expected UnknownElement, got {:?}", other),
        }
        assert!(!registry.contains("Xe"));
        assert!(registry.contains("Na"));
    }

    #[test]
    fn test_duplicate_fails_fast() {
        let records = vec![
            ElementRecord::new("H", 1, 1.0),
            ElementRecord::new("O", 8, 16.0),
            ElementRecord::new("H", 1, 1.008),
        ];
        match AtomRegistry::from_records(records) {
            Err(ChemError::DuplicateElement { symbol }) => assert_eq!(symbol, "H"),
            other => panic!("expected DuplicateElement, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_record_rejected() {
        let records = vec![ElementRecord::new("He", 2, 0.0)];
        assert!(matches!(
            AtomRegistry::from_records(records),
            Err(ChemError::InvalidElementData { .. })
        ));
    }

    #[test]
    fn test_registry_electron_configuration() {
        let registry = AtomRegistry::builtin().unwrap();
        let na = registry.lookup("Na").unwrap();
        assert_eq!(
            registry.electron_configuration(na).unwrap(),
            vec!["1s2", "2s2", "2p6", "3s1"]
        );
    }

    #[test]
    fn test_from_config() {
        let mut table = NamedTempFile::new().unwrap();
        write!(
            table,
            "ELEMENTS\n[{{\"symbol\": \"He\", \"atomic_number\": 2, \"atomic_mass\": 4.0026}}]\n"
        )
        .unwrap();
        let config = ChemConfig {
            element_table: Some(table.path().to_str().unwrap().to_string()),
            ..ChemConfig::default()
        };
        let registry = AtomRegistry::from_config(&config).unwrap();
        assert_eq!(registry.symbols(), vec!["He"]);

        let registry = AtomRegistry::from_config(&ChemConfig::default()).unwrap();
        assert!(registry.contains("Mo"));
    }

    #[test]
    fn test_global_registry_is_set_once() {
        let first = atom_registry();
        let second = atom_registry();
        assert!(std::ptr::eq(first, second));
        assert!(first.contains("C"));
        // lazily installed table is the full validated built-in one
        assert_eq!(first.len(), BUILTIN_ELEMENTS.len());
        assert_eq!(first.symbols(), AtomRegistry::builtin().unwrap().symbols());
        assert!(matches!(
            init_atom_registry(AtomRegistry::builtin().unwrap()),
            Err(ChemError::RegistryAlreadyInitialized)
        ));
    }
}
