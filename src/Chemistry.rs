//! Atoms, molecules and reactions for teaching elementary chemistry.
//!
//! Data flows one way: a formula string is scanned by `formula_parser` into an aggregated
//! `(Atom, count)` list, `molecule` turns it into a composition with a molar mass, and
//! `reaction` compares coefficient-weighted compositions of the two sides of an equation.
//! Element constants come from the read-only `atom_registry`.
//!
//! # Examples
//! ```
//! use chempkg::Chemistry::molecule::Molecule;
//! use chempkg::Chemistry::reaction::valid_reaction;
//!
//! let water = Molecule::new("H2O").unwrap();
//! assert!((water.weight() - 18.0).abs() < 1e-6);
//!
//! let h2 = Molecule::new("H2").unwrap();
//! let o2 = Molecule::new("O2").unwrap();
//! assert!(valid_reaction(&[(h2, 2), (o2, 1)], &[(water, 2)]));
//! ```

pub mod atom;
/// static element table: symbol -> atomic number and atomic mass, plus the process-wide instance
pub mod atom_registry;
pub mod errors;
/// Module to parse chemical formulae with nested groups into atomic composition
///
///  # Examples
/// ```
/// use chempkg::Chemistry::formula_parser::parse_formula;
/// let composition = parse_formula("Ca(OH)2").unwrap();
/// let counts: Vec<(&str, u32)> = composition.iter().map(|(a, c)| (a.symbol(), *c)).collect();
/// assert_eq!(counts, vec![("Ca", 1), ("H", 2), ("O", 2)]);
/// ```
pub mod formula_parser;
/// Molar mass, composition and the element composition matrix
pub mod molecule;
/// Stoichiometric balance of reaction equations
///
///  # Examples
/// ```
/// use chempkg::Chemistry::reaction::Reaction;
/// let reaction = Reaction::from_equation("CH4 + 2O2 -> CO2 + 2H2O").unwrap();
/// assert!(reaction.is_balanced());
/// ```
pub mod reaction;
