use serde::Serialize;
use tri_catalog::SchemaCatalog;

use crate::cli::root_commands::CatalogArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output;

#[derive(Serialize)]
struct TableSummary<'a> {
    name: &'a str,
    summary: &'a str,
    join_keys: String,
}

/// Handle `tri catalog`.
pub fn handle(args: &CatalogArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let catalog = SchemaCatalog::triathlon();
    let Some(name) = &args.table else {
        let summaries: Vec<TableSummary<'_>> = catalog
            .all()
            .iter()
            .map(|table| TableSummary {
                name: &table.name,
                summary: &table.summary,
                join_keys: table.join_keys.join(", "),
            })
            .collect();
        return output::output(&summaries, flags.format);
    };

    let table = catalog.require(name)?;
    match flags.format {
        OutputFormat::Table => {
            println!("{}", table.schema_text.trim());
            Ok(())
        }
        format => output::output(table, format),
    }
}
