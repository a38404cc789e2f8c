/// reading element tables from text documents with a JSON section
pub mod load_from_file;
