//! `spravochnik`: open the reference tables and print them.
//!
//! Takes no arguments. Settings come from `spravochnik.toml`,
//! `spravochnik.yaml` and `SPRAVOCHNIK_*` environment variables in the
//! current directory.

mod table;

use std::process::ExitCode;

use tracing::{error, info};

use spravochnik::{
    bootstrap, catalog, open_view, Department, Professor, SpravochnikConfig, Table, APP_TITLE,
};
use spravochnik_fields::Entity;
use spravochnik_store::Store;

fn main() -> ExitCode {
    let config = match SpravochnikConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    configure_logging(&config.log_level);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &SpravochnikConfig) -> anyhow::Result<()> {
    let store = bootstrap(config)?;
    println!("{APP_TITLE}");
    for &table in catalog() {
        println!();
        println!("{table}");
        match table {
            Table::Departments => print_table::<Department>(&store)?,
            Table::Professors => print_table::<Professor>(&store)?,
        }
    }
    Ok(())
}

fn print_table<E: Entity>(store: &Store) -> anyhow::Result<()> {
    let view = open_view::<E>(store)?;
    let rendered = table::render_view(&view)?;
    info!(table = %E::entity_def().name, rows = view.row_count(), "table shown");
    println!("{rendered}");
    view.close()?;
    Ok(())
}

fn configure_logging(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|e| {
        eprintln!("Warning: invalid log level '{log_level}': {e}");
        EnvFilter::new("info")
    });

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
