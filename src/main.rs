use chempkg::Chemistry::atom_registry::init_atom_registry_from_config;
use chempkg::Examples::chem_examples::{TASKS, chem_examples};
use chempkg::config::{ChemConfig, DEFAULT_CONFIG_FILE};
use log::error;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::process::ExitCode;

pub fn main() -> ExitCode {
    let config = match ChemConfig::load(DEFAULT_CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cannot read {}: {}", DEFAULT_CONFIG_FILE, e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = TermLogger::init(
        config.level_filter(),
        ConfigBuilder::new().set_time_level(log::LevelFilter::Off).build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("logger initialization failed, continuing without logs: {}", e);
    }
    if let Err(e) = init_atom_registry_from_config(&config) {
        error!("atom registry initialization failed: {}", e);
        return ExitCode::FAILURE;
    }

    let tasks: Vec<usize> = match std::env::args().nth(1) {
        Some(arg) => match arg.parse() {
            Ok(task) => vec![task],
            Err(_) => {
                error!("task must be a number from 0 to {}", TASKS.len() - 1);
                return ExitCode::FAILURE;
            }
        },
        None => (0..TASKS.len()).collect(),
    };
    for task in tasks {
        println!("\n___________{}___________", TASKS.get(task).copied().unwrap_or("?"));
        if let Err(e) = chem_examples(task, config.default_steps) {
            error!("task {} failed: {}", task, e);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
