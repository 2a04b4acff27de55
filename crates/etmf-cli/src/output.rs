//! Terminal output for CLI commands.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// How list results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned table
    #[default]
    Table,
    /// Pretty-printed JSON array
    Json,
}

/// Prints `rows` in `format`.
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table if rows.is_empty() => println!("(no rows)"),
        OutputFormat::Table => {
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            println!("{table}");
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("ok: {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("error: {msg}");
}

/// Prints one labelled field of a record.
pub fn print_kv(key: &str, value: impl std::fmt::Display) {
    println!("{key:>14}  {value}");
}
