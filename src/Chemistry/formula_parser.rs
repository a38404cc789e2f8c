//! # Formula Parser
//!
//! Turns a chemical formula such as `Ca(OH)2` or `K4[Fe(CN)6]` into an aggregated
//! list of `(Atom, count)` pairs.
//!
//! ## Grammar
//! ```text
//! formula  := item+ phase?
//! item     := symbol count? | open item+ close count?
//! symbol   := [A-Z][a-z]*
//! count    := [0-9]+            (must be > 0)
//! open     := '(' | '[' | '{'   close must be the matching kind
//! phase    := "(g)" | "(l)" | "(s)" | "(c)" | "(aq)"   (only at the very end)
//! ```
//! Whitespace is never skipped: a blank anywhere in the formula is a syntax error.
//!
//! ## Algorithm
//! The scanner walks the characters once, keeping an explicit stack of open groups.
//! Each frame collects the tokens produced inside its group; when the matching
//! closing delimiter arrives the frame is popped, every token is multiplied by the
//! trailing multiplier and handed to the enclosing frame. Nesting depth is therefore
//! bounded by memory, not by the call stack. After scanning, counts for the same
//! symbol are summed and each symbol is resolved through the [`AtomRegistry`].
//!
//! ## Named groups
//! A parser built with [`FormulaParser::with_group`] expands abbreviations such as
//! `Me` (CH3) or `Ph` (C6H5) wherever they appear as a symbol, e.g. `C6H5Me`.
use crate::Chemistry::atom::{Atom, is_element_symbol};
use crate::Chemistry::atom_registry::{AtomRegistry, atom_registry};
use crate::Chemistry::errors::ChemError;
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One `(symbol, count)` pair of the expanded, not yet aggregated token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaToken {
    pub symbol: String,
    pub count: u32,
}

/// Physical state annotation that may trail a formula, e.g. `H2O(l)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Gas,
    Liquid,
    Solid,
    Condensed,
    Aqueous,
}

const PHASE_MARKS: [(&str, Phase); 5] = [
    ("(aq)", Phase::Aqueous),
    ("(g)", Phase::Gas),
    ("(l)", Phase::Liquid),
    ("(s)", Phase::Solid),
    ("(c)", Phase::Condensed),
];

impl Phase {
    pub fn mark(&self) -> &'static str {
        match self {
            Phase::Gas => "(g)",
            Phase::Liquid => "(l)",
            Phase::Solid => "(s)",
            Phase::Condensed => "(c)",
            Phase::Aqueous => "(aq)",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mark())
    }
}

/// Splits a trailing phase mark off the formula body. A bare mark with nothing before it is left alone.
pub fn split_phase(formula: &str) -> (&str, Option<Phase>) {
    for (mark, phase) in PHASE_MARKS {
        if let Some(body) = formula.strip_suffix(mark) {
            if !body.is_empty() {
                return (body, Some(phase));
            }
        }
    }
    (formula, None)
}

fn closing_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

fn is_closing(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

struct Frame {
    open: char,
    open_pos: usize,
    tokens: Vec<FormulaToken>,
}

fn current<'a>(
    stack: &'a mut Vec<Frame>,
    root: &'a mut Vec<FormulaToken>,
) -> &'a mut Vec<FormulaToken> {
    match stack.last_mut() {
        Some(frame) => &mut frame.tokens,
        None => root,
    }
}

fn fragment(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end.min(chars.len())].iter().collect()
}

/// Reads an optional run of digits starting at `i`; returns the value and the index after it.
fn read_count(chars: &[char], mut i: usize) -> Result<(Option<u32>, usize), ChemError> {
    let start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if start == i {
        return Ok((None, i));
    }
    let digits = fragment(chars, start, i);
    let value: u32 = digits
        .parse()
        .map_err(|_| ChemError::syntax(start, digits.clone(), "count is too large"))?;
    if value == 0 {
        return Err(ChemError::syntax(start, digits, "count must be positive"));
    }
    Ok((Some(value), i))
}

/// Appends `tokens` to `target` with every count multiplied by `factor`; `None` on overflow.
fn push_scaled(target: &mut Vec<FormulaToken>, tokens: &[FormulaToken], factor: u32) -> Option<()> {
    for token in tokens {
        target.push(FormulaToken {
            symbol: token.symbol.clone(),
            count: token.count.checked_mul(factor)?,
        });
    }
    Some(())
}

fn scan(
    body: &str,
    groups: &HashMap<String, Vec<FormulaToken>>,
) -> Result<Vec<FormulaToken>, ChemError> {
    let chars: Vec<char> = body.chars().collect();
    if chars.is_empty() {
        return Err(ChemError::syntax(0, "", "empty formula"));
    }
    let mut root: Vec<FormulaToken> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_uppercase() {
            let start = i;
            i += 1;
            while i < chars.len() && chars[i].is_ascii_lowercase() {
                i += 1;
            }
            let symbol = fragment(&chars, start, i);
            let (count, next) = read_count(&chars, i)?;
            i = next;
            let count = count.unwrap_or(1);
            trace!("symbol {} x{} at position {}", symbol, count, start);
            let target = current(&mut stack, &mut root);
            match groups.get(&symbol) {
                Some(group_tokens) => push_scaled(target, group_tokens, count).ok_or_else(|| {
                    ChemError::syntax(start, symbol.clone(), "count is too large")
                })?,
                None => target.push(FormulaToken { symbol, count }),
            }
        } else if c.is_ascii_lowercase() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_lowercase() {
                i += 1;
            }
            return Err(ChemError::syntax(
                start,
                fragment(&chars, start, i),
                "element symbol must start with an uppercase letter",
            ));
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            return Err(ChemError::syntax(
                start,
                fragment(&chars, start, i),
                "count must follow an element symbol or a closing delimiter",
            ));
        } else if closing_for(c).is_some() {
            stack.push(Frame {
                open: c,
                open_pos: i,
                tokens: Vec::new(),
            });
            i += 1;
        } else if is_closing(c) {
            let frame = stack.pop().ok_or_else(|| {
                ChemError::syntax(i, c.to_string(), "unmatched closing delimiter")
            })?;
            if closing_for(frame.open) != Some(c) {
                return Err(ChemError::syntax(
                    frame.open_pos,
                    fragment(&chars, frame.open_pos, i + 1),
                    format!("'{}' closed by '{}'", frame.open, c),
                ));
            }
            if frame.tokens.is_empty() {
                return Err(ChemError::syntax(
                    frame.open_pos,
                    fragment(&chars, frame.open_pos, i + 1),
                    "empty group",
                ));
            }
            let close_pos = i;
            let (multiplier, next) = read_count(&chars, i + 1)?;
            i = next;
            let multiplier = multiplier.unwrap_or(1);
            trace!("group {}..={} x{}", frame.open_pos, close_pos, multiplier);
            let target = current(&mut stack, &mut root);
            push_scaled(target, &frame.tokens, multiplier).ok_or_else(|| {
                ChemError::syntax(
                    frame.open_pos,
                    fragment(&chars, frame.open_pos, i),
                    "count is too large",
                )
            })?;
        } else if c.is_whitespace() {
            return Err(ChemError::syntax(
                i,
                c.to_string(),
                "whitespace is not allowed in a formula",
            ));
        } else {
            return Err(ChemError::syntax(i, c.to_string(), "unexpected character"));
        }
    }
    if let Some(frame) = stack.pop() {
        return Err(ChemError::syntax(
            frame.open_pos,
            fragment(&chars, frame.open_pos, chars.len()),
            "unmatched opening delimiter",
        ));
    }
    Ok(root)
}

/// Expanded token stream of `formula`, groups multiplied out but repeated symbols kept apart.
pub fn tokenize_formula(formula: &str) -> Result<Vec<FormulaToken>, ChemError> {
    let (body, _) = split_phase(formula);
    scan(body, &HashMap::new())
}

/// Sums the counts of every symbol in the token stream.
///
/// Tokens no longer carry source positions, so a total that overflows `u32` is
/// reported against the whole formula: position 0, fragment set to the symbol.
pub fn aggregate_tokens(tokens: &[FormulaToken]) -> Result<BTreeMap<String, u32>, ChemError> {
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();
    for token in tokens {
        let total = totals.entry(token.symbol.clone()).or_insert(0);
        *total = total
            .checked_add(token.count)
            .ok_or_else(|| ChemError::syntax(0, token.symbol.clone(), "total count is too large"))?;
    }
    Ok(totals)
}

/// Parser bound to an atom registry, optionally aware of named groups.
#[derive(Debug, Clone)]
pub struct FormulaParser<'a> {
    registry: &'a AtomRegistry,
    groups: HashMap<String, Vec<FormulaToken>>,
}

impl FormulaParser<'static> {
    /// Parser over the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(atom_registry())
    }
}

impl Default for FormulaParser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FormulaParser<'a> {
    pub fn with_registry(registry: &'a AtomRegistry) -> Self {
        Self {
            registry,
            groups: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &'a AtomRegistry {
        self.registry
    }

    /// Registers a named group, e.g. `("Me", "CH3")`. The group formula may use groups registered before it.
    pub fn with_group(mut self, name: &str, formula: &str) -> Result<Self, ChemError> {
        if !is_element_symbol(name) {
            return Err(ChemError::InvalidElementData {
                symbol: name.to_string(),
                reason: "group name must look like an element symbol".to_string(),
            });
        }
        if self.registry.contains(name) {
            return Err(ChemError::InvalidElementData {
                symbol: name.to_string(),
                reason: "group name collides with a registered element".to_string(),
            });
        }
        let tokens = scan(formula, &self.groups)?;
        debug!("named group {} = {}", name, formula);
        self.groups.insert(name.to_string(), tokens);
        Ok(self)
    }

    pub fn with_groups(mut self, groups: &[(&str, &str)]) -> Result<Self, ChemError> {
        for (name, formula) in groups {
            self = self.with_group(name, formula)?;
        }
        Ok(self)
    }

    pub fn tokenize(&self, formula: &str) -> Result<Vec<FormulaToken>, ChemError> {
        let (body, _) = split_phase(formula);
        scan(body, &self.groups)
    }

    /// Aggregated composition plus the trailing phase mark, if any. Pairs are sorted by symbol.
    pub fn parse_with_phase(
        &self,
        formula: &str,
    ) -> Result<(Vec<(Atom, u32)>, Option<Phase>), ChemError> {
        let (body, phase) = split_phase(formula);
        let tokens = scan(body, &self.groups)?;
        let totals = aggregate_tokens(&tokens)?;
        let atoms = totals
            .into_iter()
            .map(|(symbol, count)| Ok((self.registry.lookup(&symbol)?.clone(), count)))
            .collect::<Result<Vec<_>, ChemError>>()?;
        debug!("parsed formula {}: {:?}", formula, atoms);
        Ok((atoms, phase))
    }

    pub fn parse(&self, formula: &str) -> Result<Vec<(Atom, u32)>, ChemError> {
        Ok(self.parse_with_phase(formula)?.0)
    }
}

/// Parses `formula` against the process-wide registry.
pub fn parse_formula(formula: &str) -> Result<Vec<(Atom, u32)>, ChemError> {
    FormulaParser::new().parse(formula)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(formula: &str) -> Vec<(String, u32)> {
        parse_formula(formula)
            .unwrap()
            .into_iter()
            .map(|(atom, count)| (atom.symbol().to_string(), count))
            .collect()
    }

    fn pairs(items: &[(&str, u32)]) -> Vec<(String, u32)> {
        let mut v: Vec<(String, u32)> = items.iter().map(|(s, c)| (s.to_string(), *c)).collect();
        v.sort();
        v
    }

    fn syntax_position(formula: &str) -> usize {
        match parse_formula(formula) {
            Err(ChemError::FormulaSyntax { position, .. }) => position,
            other => panic!("expected FormulaSyntax for {:?}, got {:?}", formula, other),
        }
    }

    #[test]
    fn test_simple_formulas() {
        assert_eq!(counts("H2O"), pairs(&[("H", 2), ("O", 1)]));
        assert_eq!(counts("C6H8O6"), pairs(&[("C", 6), ("H", 8), ("O", 6)]));
        assert_eq!(counts("NaCl"), pairs(&[("Na", 1), ("Cl", 1)]));
        assert_eq!(counts("C2H5OH"), pairs(&[("C", 2), ("H", 6), ("O", 1)]));
        assert_eq!(counts("C5H6OOH"), pairs(&[("C", 5), ("H", 7), ("O", 2)]));
    }

    #[test]
    fn test_groups() {
        assert_eq!(counts("Ca(OH)2"), pairs(&[("Ca", 1), ("O", 2), ("H", 2)]));
        assert_eq!(counts("Na(NO3)2"), pairs(&[("Na", 1), ("N", 2), ("O", 6)]));
        assert_eq!(counts("Ca(NO3)2"), pairs(&[("Ca", 1), ("N", 2), ("O", 6)]));
        assert_eq!(counts("(NH4)2SO4"), pairs(&[("N", 2), ("H", 8), ("S", 1), ("O", 4)]));
        assert_eq!(counts("C(OOH)2N(ClO)3"), pairs(&[("C", 1), ("O", 7), ("H", 2), ("N", 1), ("Cl", 3)]));
        assert_eq!(counts("(H)"), pairs(&[("H", 1)]));
    }

    #[test]
    fn test_nested_groups() {
        assert_eq!(
            counts("K4[Fe(CN)6]"),
            pairs(&[("K", 4), ("Fe", 1), ("C", 6), ("N", 6)])
        );
        assert_eq!(
            counts("Ca3(PO4)2"),
            pairs(&[("Ca", 3), ("P", 2), ("O", 8)])
        );
        assert_eq!(counts("{[(H2)2]3}2"), pairs(&[("H", 24)]));
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 10_000;
        let formula = format!("{}H{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(counts(&formula), pairs(&[("H", 1)]));
    }

    #[test]
    fn test_order_does_not_matter() {
        assert_eq!(parse_formula("H2O").unwrap(), parse_formula("OH2").unwrap());
        assert_eq!(parse_formula("HOH").unwrap(), parse_formula("H2O").unwrap());
        assert_eq!(
            parse_formula("Ca(OH)2").unwrap(),
            parse_formula("CaO2H2").unwrap()
        );
        assert_eq!(parse_formula("C2H5OH").unwrap(), parse_formula("C2H5OH").unwrap());
    }

    #[test]
    fn test_tokenize_keeps_repeats() {
        let tokens = tokenize_formula("C2H5OH").unwrap();
        let symbols: Vec<(&str, u32)> = tokens.iter().map(|t| (t.symbol.as_str(), t.count)).collect();
        assert_eq!(symbols, vec![("C", 2), ("H", 5), ("O", 1), ("H", 1)]);

        let tokens = tokenize_formula("Mg(OH)2").unwrap();
        let symbols: Vec<(&str, u32)> = tokens.iter().map(|t| (t.symbol.as_str(), t.count)).collect();
        assert_eq!(symbols, vec![("Mg", 1), ("O", 2), ("H", 2)]);
    }

    #[test]
    fn test_aggregate_tokens() {
        let tokens = tokenize_formula("CH3COOH").unwrap();
        let totals = aggregate_tokens(&tokens).unwrap();
        assert_eq!(totals.get("C"), Some(&2));
        assert_eq!(totals.get("H"), Some(&4));
        assert_eq!(totals.get("O"), Some(&2));
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(syntax_position(""), 0);
        assert_eq!(syntax_position("Ca(OH2"), 2);
        assert_eq!(syntax_position("CaOH)2"), 4);
        assert_eq!(syntax_position("h2O"), 0);
        assert_eq!(syntax_position("H2o"), 2);
        assert_eq!(syntax_position("2H2O"), 0);
        assert_eq!(syntax_position("(2)"), 1);
        assert_eq!(syntax_position("Ca(OH]2"), 2);
        assert_eq!(syntax_position("H2()"), 2);
        assert_eq!(syntax_position("H0"), 1);
        assert_eq!(syntax_position("H2O+"), 3);
        assert_eq!(syntax_position("H99999999999"), 1);
    }

    #[test]
    fn test_syntax_error_carries_fragment() {
        match parse_formula("Ca(OH2") {
            Err(ChemError::FormulaSyntax { fragment, reason, .. }) => {
                assert_eq!(fragment, "(OH2");
                assert_eq!(reason, "unmatched opening delimiter");
            }
            other => panic!("unexpected {:?}", other),
        }
        match parse_formula("2H") {
            Err(ChemError::FormulaSyntax { fragment, .. }) => assert_eq!(fragment, "2"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_is_rejected() {
        assert_eq!(syntax_position("H2 O"), 2);
        assert_eq!(syntax_position(" H2O"), 0);
        assert_eq!(syntax_position("H2O "), 3);
        assert_eq!(syntax_position("H2\tO"), 2);
    }

    #[test]
    fn test_multiplier_overflow() {
        assert!(matches!(
            parse_formula("(H4000000000)2"),
            Err(ChemError::FormulaSyntax { .. })
        ));
        assert!(matches!(
            parse_formula("(H2)4000000000"),
            Err(ChemError::FormulaSyntax { .. })
        ));
    }

    #[test]
    fn test_total_count_overflow_points_at_whole_formula() {
        match parse_formula("OH3000000000H3000000000") {
            Err(ChemError::FormulaSyntax {
                position,
                fragment,
                reason,
            }) => {
                assert_eq!(position, 0);
                assert_eq!(fragment, "H");
                assert_eq!(reason, "total count is too large");
            }
            other => panic!("expected FormulaSyntax, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_element() {
        match parse_formula("XeF4") {
            Err(ChemError::UnknownElement { symbol }) => assert_eq!(symbol, "Xe"),
            other => panic!("expected UnknownElement, got {:?}", other),
        }
        assert!(matches!(
            parse_formula("Hoo"),
            Err(ChemError::UnknownElement { .. })
        ));
    }

    #[test]
    fn test_phase_marks() {
        let parser = FormulaParser::new();
        let (atoms, phase) = parser.parse_with_phase("H2O(g)").unwrap();
        assert_eq!(phase, Some(Phase::Gas));
        assert_eq!(atoms, parse_formula("H2O").unwrap());
        let (_, phase) = parser.parse_with_phase("NaCl(aq)").unwrap();
        assert_eq!(phase, Some(Phase::Aqueous));
        let (_, phase) = parser.parse_with_phase("Ca(OH)2(s)").unwrap();
        assert_eq!(phase, Some(Phase::Solid));
        let (_, phase) = parser.parse_with_phase("Ca(OH)2").unwrap();
        assert_eq!(phase, None);
        // a lone mark has no body and is parsed as a formula
        assert!(matches!(
            parser.parse_with_phase("(g)"),
            Err(ChemError::FormulaSyntax { .. })
        ));
        // uppercase (S) is a sulfur group, not a phase
        assert_eq!(counts("Fe(S)"), pairs(&[("Fe", 1), ("S", 1)]));
        assert_eq!(split_phase("CO2(g)"), ("CO2", Some(Phase::Gas)));
        assert_eq!(Phase::Liquid.to_string(), "(l)");
    }

    #[test]
    fn test_named_groups() {
        let parser = FormulaParser::new()
            .with_groups(&[("Me", "CH3"), ("Ph", "C6H5")])
            .unwrap();
        let toluene = parser.parse("C6H5Me").unwrap();
        let expected = parse_formula("C7H8").unwrap();
        assert_eq!(toluene, expected);
        let xylene = parser.parse("C6H4(Me)2").unwrap();
        assert_eq!(xylene, parse_formula("C8H10").unwrap());
        let biphenyl = parser.parse("Ph2").unwrap();
        assert_eq!(biphenyl, parse_formula("C12H10").unwrap());
        // groups may build on earlier groups
        let parser = parser.with_group("Et", "MeCH2").unwrap();
        assert_eq!(parser.parse("EtOH").unwrap(), parse_formula("C2H6O").unwrap());
    }

    #[test]
    fn test_named_group_validation() {
        assert!(matches!(
            FormulaParser::new().with_group("Co", "CO"),
            Err(ChemError::InvalidElementData { .. })
        ));
        assert!(matches!(
            FormulaParser::new().with_group("me", "CH3"),
            Err(ChemError::InvalidElementData { .. })
        ));
        assert!(matches!(
            FormulaParser::new().with_group("Me", "CH3)"),
            Err(ChemError::FormulaSyntax { .. })
        ));
    }

    #[test]
    fn test_custom_registry() {
        use crate::Chemistry::atom_registry::ElementRecord;
        let registry = AtomRegistry::from_records(vec![
            ElementRecord::new("He", 2, 4.0026),
            ElementRecord::new("Ne", 10, 20.18),
        ])
        .unwrap();
        let parser = FormulaParser::with_registry(&registry);
        let atoms = parser.parse("HeNe2").unwrap();
        assert_eq!(atoms.len(), 2);
        assert!(matches!(
            parser.parse("H2O"),
            Err(ChemError::UnknownElement { .. })
        ));
    }
}
