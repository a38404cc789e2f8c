//! Reaction balance checking.
//!
//! A reaction side is a list of `(Molecule, coefficient)` pairs. Each side is reduced to
//! per-element totals (coefficient x atom count, summed over the side) and the reaction
//! is balanced when both sides give exactly the same totals. Elements whose total is
//! zero are left out of the maps, so "absent" and "zero" compare the same.
use crate::Chemistry::atom::Atom;
use crate::Chemistry::errors::ChemError;
use crate::Chemistry::formula_parser::FormulaParser;
use crate::Chemistry::molecule::Molecule;
use log::{debug, info};
use prettytable::{Table, row};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Separators accepted between the two sides of an equation, longest first.
const SIDE_SEPARATORS: [&str; 4] = ["<=>", "=>", "->", "="];

/// Coefficient-weighted element totals of one side. Repeated molecules add up.
pub fn element_totals(side: &[(Molecule, u32)]) -> HashMap<Atom, u128> {
    let mut totals: HashMap<Atom, u128> = HashMap::new();
    for (molecule, coefficient) in side {
        for (atom, &count) in molecule.atoms() {
            let contribution = *coefficient as u128 * count as u128;
            if contribution > 0 {
                *totals.entry(atom.clone()).or_insert(0) += contribution;
            }
        }
    }
    totals
}

/// `true` when every element has the same coefficient-weighted total on both sides.
///
/// Two empty sides are balanced; an empty side against a non-empty one is not.
pub fn valid_reaction(reactants: &[(Molecule, u32)], products: &[(Molecule, u32)]) -> bool {
    let reactant_totals = element_totals(reactants);
    let product_totals = element_totals(products);
    debug!(
        "reactant totals {:?}, product totals {:?}",
        reactant_totals, product_totals
    );
    reactant_totals == product_totals
}

/// One side of a reaction equation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionSide(pub Vec<(Molecule, u32)>);

impl ReactionSide {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, molecule: Molecule, coefficient: u32) {
        self.0.push((molecule, coefficient));
    }

    pub fn with(mut self, molecule: Molecule, coefficient: u32) -> Self {
        self.push(molecule, coefficient);
        self
    }

    pub fn terms(&self) -> &[(Molecule, u32)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn element_totals(&self) -> HashMap<Atom, u128> {
        element_totals(&self.0)
    }

    /// Total mass of the side in grams per mole of reaction.
    pub fn mass(&self) -> f64 {
        self.0
            .iter()
            .map(|(molecule, coefficient)| molecule.weight() * *coefficient as f64)
            .sum()
    }
}

impl From<Vec<(Molecule, u32)>> for ReactionSide {
    fn from(terms: Vec<(Molecule, u32)>) -> Self {
        Self(terms)
    }
}

impl fmt::Display for ReactionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .0
            .iter()
            .map(|(molecule, coefficient)| {
                if *coefficient == 1 {
                    molecule.formula().to_string()
                } else {
                    format!("{} {}", coefficient, molecule.formula())
                }
            })
            .collect();
        f.write_str(&terms.join(" + "))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reaction {
    pub reactants: ReactionSide,
    pub products: ReactionSide,
}

impl Reaction {
    pub fn new(reactants: ReactionSide, products: ReactionSide) -> Self {
        Self {
            reactants,
            products,
        }
    }

    /// Parses an equation such as `2H2 + O2 = 2H2O` with the process-wide registry.
    pub fn from_equation(equation: &str) -> Result<Self, ChemError> {
        Self::from_equation_with(equation, &FormulaParser::new())
    }

    /// Parses an equation with a specific formula parser.
    ///
    /// The sides are separated by exactly one of `<=>`, `=>`, `->` or `=`; terms by `+`.
    /// A term is an optional positive integer coefficient followed by a formula,
    /// spaces around terms and after the coefficient are ignored.
    pub fn from_equation_with(
        equation: &str,
        parser: &FormulaParser<'_>,
    ) -> Result<Self, ChemError> {
        let invalid = |reason: &str| ChemError::InvalidEquation {
            equation: equation.to_string(),
            reason: reason.to_string(),
        };
        let separator = SIDE_SEPARATORS
            .iter()
            .find(|sep| equation.contains(*sep))
            .ok_or_else(|| invalid("no side separator ('=', '->', '=>' or '<=>')"))?;
        let sides: Vec<&str> = equation.split(*separator).collect();
        let repeated = sides.len() != 2
            || sides
                .iter()
                .any(|side| SIDE_SEPARATORS.iter().any(|sep| side.contains(*sep)));
        if repeated {
            return Err(invalid("side separator must appear exactly once"));
        }
        let reactants = parse_side(sides[0], parser, &invalid)?;
        let products = parse_side(sides[1], parser, &invalid)?;
        let reaction = Self::new(reactants, products);
        info!("parsed reaction {}", reaction);
        Ok(reaction)
    }

    pub fn is_balanced(&self) -> bool {
        valid_reaction(self.reactants.terms(), self.products.terms())
    }

    /// Product total minus reactant total for every element whose totals differ.
    pub fn imbalance(&self) -> BTreeMap<String, i128> {
        let reactant_totals = self.reactants.element_totals();
        let product_totals = self.products.element_totals();
        let atoms: BTreeSet<&Atom> = reactant_totals.keys().chain(product_totals.keys()).collect();
        atoms
            .into_iter()
            .filter_map(|atom| {
                let left = reactant_totals.get(atom).copied().unwrap_or(0) as i128;
                let right = product_totals.get(atom).copied().unwrap_or(0) as i128;
                (left != right).then(|| (atom.symbol().to_string(), right - left))
            })
            .collect()
    }

    /// Per-element totals of both sides as a table.
    pub fn balance_table(&self) -> Table {
        let reactant_totals = self.reactants.element_totals();
        let product_totals = self.products.element_totals();
        let atoms: BTreeSet<&Atom> = reactant_totals.keys().chain(product_totals.keys()).collect();
        let mut table = Table::new();
        table.set_titles(row!["Element", "Reactants", "Products", "Balanced"]);
        for atom in atoms {
            let left = reactant_totals.get(atom).copied().unwrap_or(0);
            let right = product_totals.get(atom).copied().unwrap_or(0);
            let balanced = if left == right { "yes" } else { "no" };
            table.add_row(row![atom.symbol(), left, right, balanced]);
        }
        table
    }

    pub fn print_balance_table(&self) {
        println!("{}", self);
        self.balance_table().printstd();
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.reactants, self.products)
    }
}

fn parse_side(
    text: &str,
    parser: &FormulaParser<'_>,
    invalid: &dyn Fn(&str) -> ChemError,
) -> Result<ReactionSide, ChemError> {
    if text.trim().is_empty() {
        return Err(invalid("reaction side is empty"));
    }
    let mut side = ReactionSide::new();
    for term in text.split('+') {
        let term = term.trim();
        if term.is_empty() {
            return Err(invalid("empty term"));
        }
        let digits_end = term
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(term.len());
        let coefficient = if digits_end == 0 {
            1
        } else {
            term[..digits_end]
                .parse::<u32>()
                .map_err(|_| invalid("coefficient is too large"))?
        };
        if coefficient == 0 {
            return Err(invalid("coefficient must be positive"));
        }
        let formula = term[digits_end..].trim_start();
        if formula.is_empty() {
            return Err(invalid("coefficient without a formula"));
        }
        side.push(Molecule::with_parser(formula, parser)?, coefficient);
    }
    Ok(side)
}
