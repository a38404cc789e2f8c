use crate::Chemistry::atom_registry::atom_registry;
use crate::Chemistry::formula_parser::{FormulaParser, tokenize_formula};
use crate::Chemistry::molecule::{Molecule, composition_matrix, molar_masses};
use crate::Chemistry::reaction::{Reaction, valid_reaction};
use crate::Kinetics::decomposition::FirstOrderDecomposition;
use std::error::Error;

pub const TASKS: [&str; 5] = [
    "atoms and electron configurations",
    "formula parsing and molar masses",
    "reaction balance",
    "composition matrix",
    "first-order decomposition",
];

pub fn chem_examples(task: usize, steps: usize) -> Result<(), Box<dyn Error>> {
    match task {
        0 => {
            // ATOMS
            let registry = atom_registry();
            for symbol in registry.symbols() {
                let atom = registry.lookup(symbol)?;
                println!(
                    "{}: {}",
                    atom,
                    registry.electron_configuration(atom)?.join(" ")
                );
            }
        }
        1 => {
            // FORMULAE
            let tokens = tokenize_formula("K4[Fe(CN)6]")?;
            println!("expanded tokens of K4[Fe(CN)6]: {:?}", tokens);
            for formula in ["H2O", "C2H5OH", "Ca(OH)2", "Ca3(PO4)2", "H2O(g)"] {
                let molecule = Molecule::new(formula)?;
                println!(
                    "{:<12} Hill: {:<10} M = {} g/mol",
                    molecule.formula(),
                    molecule.hill_formula(),
                    molecule.weight()
                );
            }
            let parser = FormulaParser::new().with_group("Me", "CH3")?;
            let xylene = Molecule::with_parser("C6H4(Me)2", &parser)?;
            println!("xylene C6H4(Me)2 = {}, M = {} g/mol", xylene.hill_formula(), xylene.weight());
            println!("molar masses: {:?}", molar_masses(&["NaCl", "KI", "CO2"])?);
            if let Err(e) = Molecule::new("Ca(OH2") {
                println!("rejected: {}", e);
            }
        }
        2 => {
            // REACTIONS
            let h2 = Molecule::new("H2")?;
            let o2 = Molecule::new("O2")?;
            let water = Molecule::new("H2O")?;
            println!(
                "2 H2 + O2 -> 2 H2O balanced: {}",
                valid_reaction(&[(h2.clone(), 2), (o2.clone(), 1)], &[(water.clone(), 2)])
            );
            println!(
                "H2 + O2 -> H2O balanced: {}",
                valid_reaction(&[(h2, 1), (o2, 1)], &[(water, 1)])
            );
            for equation in ["CH4 + 2O2 = CO2 + 2H2O", "Fe + O2 = Fe2O3"] {
                let reaction = Reaction::from_equation(equation)?;
                reaction.print_balance_table();
                if !reaction.is_balanced() {
                    println!("imbalance (products - reactants): {:?}", reaction.imbalance());
                }
            }
        }
        3 => {
            // COMPOSITION MATRIX
            let molecules = ["H2O", "NaCl", "C3H8", "CH4"]
                .iter()
                .map(|f| Molecule::new(f))
                .collect::<Result<Vec<_>, _>>()?;
            let (matrix, symbols) = composition_matrix(&molecules);
            println!("elements: {:?}", symbols);
            println!("{}", matrix);
        }
        4 => {
            // KINETICS
            let mut model = FirstOrderDecomposition::new();
            model.set_problem(1.0, 0.2, 20.0, steps)?;
            model.solve()?;
            model.pretty_print()?;
            println!("half-life: {} s", model.half_life());
        }
        _ => {
            return Err(format!(
                "unknown task {}, expected 0..{}",
                task,
                TASKS.len() - 1
            )
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tasks_run() {
        for task in 0..TASKS.len() {
            chem_examples(task, 5).unwrap();
        }
        assert!(chem_examples(TASKS.len(), 5).is_err());
    }
}
