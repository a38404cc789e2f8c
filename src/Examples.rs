/// numbered demonstration tasks run by the binary
pub mod chem_examples;
