//! Molecules built from formulas: atomic composition, molar mass and the
//! element composition matrix of a set of substances.
use crate::Chemistry::atom::Atom;
use crate::Chemistry::errors::ChemError;
use crate::Chemistry::formula_parser::{FormulaParser, Phase};
use log::info;
use nalgebra::DMatrix;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A substance parsed from its formula.
///
/// Two molecules compare equal when their compositions match, whatever formula
/// text produced them (`C2H5OH` and `C2H6O` are the same molecule here).
#[derive(Debug, Clone)]
pub struct Molecule {
    formula: String,
    phase: Option<Phase>,
    atoms: HashMap<Atom, u32>,
    weight: f64,
}

impl Molecule {
    /// Parses `formula` against the process-wide atom registry.
    pub fn new(formula: &str) -> Result<Self, ChemError> {
        Self::with_parser(formula, &FormulaParser::new())
    }

    /// Parses `formula` with a specific parser (custom registry or named groups).
    pub fn with_parser(formula: &str, parser: &FormulaParser<'_>) -> Result<Self, ChemError> {
        let (composition, phase) = parser.parse_with_phase(formula)?;
        // summed in symbol order so the same composition always gives the same bits
        let weight: f64 = composition
            .iter()
            .map(|(atom, count)| atom.atomic_mass() * *count as f64)
            .sum();
        // the parser already merged repeated symbols, so collecting cannot overwrite
        let atoms: HashMap<Atom, u32> = composition.into_iter().collect();
        Ok(Self {
            formula: formula.to_string(),
            phase,
            atoms,
            weight,
        })
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn atoms(&self) -> &HashMap<Atom, u32> {
        &self.atoms
    }

    /// Molar mass in g/mol, the sum of count x atomic mass over the composition.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Number of `atom` in the molecule; 0 when absent.
    pub fn atom_count(&self, atom: &Atom) -> u32 {
        self.atoms.get(atom).copied().unwrap_or(0)
    }

    /// Same as [`Molecule::atom_count`] but keyed by symbol.
    pub fn count_of(&self, symbol: &str) -> u32 {
        self.atoms
            .iter()
            .find(|(atom, _)| atom.symbol() == symbol)
            .map(|(_, &count)| count)
            .unwrap_or(0)
    }

    /// Share of the molar mass contributed by `atom`, between 0 and 1.
    pub fn mass_fraction(&self, atom: &Atom) -> f64 {
        match self.atoms.get_key_value(atom) {
            Some((stored, &count)) if self.weight > 0.0 => {
                stored.atomic_mass() * count as f64 / self.weight
            }
            _ => 0.0,
        }
    }

    /// Composition sorted by symbol.
    pub fn sorted_atoms(&self) -> Vec<(&Atom, u32)> {
        let mut atoms: Vec<(&Atom, u32)> = self.atoms.iter().map(|(a, &c)| (a, c)).collect();
        atoms.sort_by(|a, b| a.0.cmp(b.0));
        atoms
    }

    /// Hill notation: C first, then H, then the rest alphabetically; without carbon everything is alphabetical.
    pub fn hill_formula(&self) -> String {
        fn append(buf: &mut String, symbol: &str, count: u32) {
            buf.push_str(symbol);
            if count > 1 {
                buf.push_str(&count.to_string());
            }
        }
        let mut result = String::new();
        let carbon = self.count_of("C");
        let has_carbon = carbon > 0;
        if has_carbon {
            append(&mut result, "C", carbon);
            let hydrogen = self.count_of("H");
            if hydrogen > 0 {
                append(&mut result, "H", hydrogen);
            }
        }
        for (atom, count) in self.sorted_atoms() {
            let symbol = atom.symbol();
            if has_carbon && (symbol == "C" || symbol == "H") {
                continue;
            }
            append(&mut result, symbol, count);
        }
        result
    }
}

impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        self.atoms == other.atoms
    }
}

impl Eq for Molecule {}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formula)
    }
}

/// Molar masses of a list of formulas, in the same order.
pub fn molar_masses(formulas: &[&str]) -> Result<Vec<f64>, ChemError> {
    formulas
        .iter()
        .map(|formula| Molecule::new(formula).map(|m| m.weight()))
        .collect()
}

/// Element composition matrix: one row per molecule, one column per element.
/// Columns follow the returned symbol list, which is sorted.
pub fn composition_matrix(molecules: &[Molecule]) -> (DMatrix<f64>, Vec<String>) {
    let symbols: Vec<String> = molecules
        .iter()
        .flat_map(|m| m.atoms().keys().map(|a| a.symbol().to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut matrix = DMatrix::zeros(molecules.len(), symbols.len());
    for (i, molecule) in molecules.iter().enumerate() {
        for (j, symbol) in symbols.iter().enumerate() {
            matrix[(i, j)] = molecule.count_of(symbol) as f64;
        }
    }
    info!(
        "composition matrix {}x{} over elements {:?}",
        matrix.nrows(),
        matrix.ncols(),
        symbols
    );
    (matrix, symbols)
}
