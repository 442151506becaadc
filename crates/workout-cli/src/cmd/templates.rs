use crate::output::{print_json, print_table};
use anyhow::Result;
use workout_core::Config;

#[derive(serde::Serialize)]
struct TemplateSummary<'a> {
    template_id: &'a str,
    entries: usize,
}

pub fn run(config: Config, json: bool) -> Result<()> {
    let service = super::build_service(config)?;
    let rt = super::runtime()?;

    let index = rt.block_on(service.build_template_index())?;
    let summary: Vec<TemplateSummary<'_>> = index
        .templates()
        .map(|(id, entries)| TemplateSummary {
            template_id: id.as_str(),
            entries: entries.len(),
        })
        .collect();

    if json {
        return print_json(&summary);
    }

    if summary.is_empty() {
        println!("No template entries found.");
        return Ok(());
    }

    let rows = summary
        .iter()
        .map(|s| vec![s.template_id.to_string(), s.entries.to_string()])
        .collect();
    print_table(&["TEMPLATE", "ENTRIES"], rows);
    println!(
        "\n{} template(s), {} entr{}.",
        index.template_count(),
        index.entry_count(),
        if index.entry_count() == 1 { "y" } else { "ies" }
    );
    Ok(())
}
