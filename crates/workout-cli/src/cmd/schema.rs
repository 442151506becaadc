use crate::output::{print_json, print_table};
use anyhow::Result;
use workout_core::{Config, NotionClient};

pub fn run(config: Config, database: Option<&str>, json: bool) -> Result<()> {
    let database_id = database
        .map(str::to_string)
        .unwrap_or_else(|| config.template_entries_db_id.clone());
    let client = NotionClient::new(&config)?;
    let rt = super::runtime()?;

    let schema = rt.block_on(client.retrieve_database(&database_id))?;

    if json {
        return print_json(&schema);
    }

    println!("{} ({})\n", schema.title, schema.id);
    let rows = schema
        .properties
        .into_iter()
        .map(|(name, kind)| vec![name, kind])
        .collect();
    print_table(&["PROPERTY", "TYPE"], rows);
    Ok(())
}
