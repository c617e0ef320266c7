//! CLI subcommand implementations for the `cidades` binary.

pub mod doctor;
pub mod harvest_cmd;
pub mod states_cmd;
