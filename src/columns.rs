//! Target-column order preview for a set of inputs.
//!
//! Segments the inputs, plans the column order the consolidation engine
//! would use, and lists every column with its classification.

use std::collections::HashSet;

use anyhow::Result;
use log::info;

use crate::{
    cli::ColumnsArgs,
    order,
    schema::ReferenceSchema,
    segment::PROVENANCE_COLUMNS,
    table, workbook,
};

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let reference = ReferenceSchema::resolve(args.schema.as_deref())?;
    let (tables, _) = workbook::read_and_segment(&args.inputs);

    let mut discovered: HashSet<String> = HashSet::new();
    for extracted in &tables {
        discovered.extend(extracted.columns.iter().map(|name| name.trim().to_string()));
    }
    if discovered.is_empty() {
        info!("No columns discovered in the provided input(s)");
        return Ok(());
    }

    let plan = order::plan_column_order(&discovered, &reference);
    let rows: Vec<Vec<String>> = plan
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            vec![
                (idx + 1).to_string(),
                name.clone(),
                classify(name, &reference).to_string(),
            ]
        })
        .collect();
    let headers = vec![
        "#".to_string(),
        "column".to_string(),
        "kind".to_string(),
    ];
    table::print_table(&headers, &rows);
    info!(
        "Planned {} column(s) from {} table(s)",
        plan.len(),
        tables.len()
    );
    Ok(())
}

fn classify(name: &str, reference: &ReferenceSchema) -> &'static str {
    if PROVENANCE_COLUMNS.contains(&name) {
        "provenance"
    } else if order::is_question_column(name) {
        "question"
    } else if reference.contains(name) {
        "reference"
    } else {
        "unexpected"
    }
}
