//! CSV rendering
//!
//! A single mapping becomes a header row and one value row. A list of
//! mappings takes its header from the first element. Empty lists and lists
//! whose elements disagree on their key set are rejected.

use std::collections::BTreeSet;

use ::csv::{Terminator, WriterBuilder};
use serde_json::{Map, Value};
use tracing::debug;

use super::{ContentKind, RenderError, value_type_name};

pub(super) fn render(content: &Value, kind: ContentKind) -> Result<String, RenderError> {
    debug!(?kind, "csv::render: called");
    match (kind, content) {
        (ContentKind::Object, Value::Object(map)) => {
            let header: Vec<&str> = map.keys().map(String::as_str).collect();
            let row: Vec<String> = map.values().map(cell).collect();
            write_rows(&header, std::iter::once(row))
        }
        (ContentKind::List, Value::Array(items)) => render_list(items),
        (kind, other) => Err(RenderError::MalformedPayload(format!(
            "{:?} payload cannot hold a {}",
            kind,
            value_type_name(other)
        ))),
    }
}

fn render_list(items: &[Value]) -> Result<String, RenderError> {
    let rows: Vec<&Map<String, Value>> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object().ok_or_else(|| {
                RenderError::MalformedPayload(format!(
                    "list element {} is a {}, expected a mapping",
                    index,
                    value_type_name(item)
                ))
            })
        })
        .collect::<Result<_, _>>()?;

    let Some(first) = rows.first() else {
        debug!("csv::render_list: empty list");
        return Err(RenderError::MalformedPayload(
            "empty list has no element to derive a header from".to_string(),
        ));
    };

    let header: Vec<&str> = first.keys().map(String::as_str).collect();
    let expected: BTreeSet<&str> = header.iter().copied().collect();

    for (index, row) in rows.iter().enumerate().skip(1) {
        let keys: BTreeSet<&str> = row.keys().map(String::as_str).collect();
        if keys != expected {
            debug!(index, "csv::render_list: heterogeneous element");
            return Err(RenderError::MalformedPayload(format!(
                "list element {} has keys {:?}, expected {:?}",
                index, keys, expected
            )));
        }
    }

    let values = rows
        .iter()
        .map(|row| header.iter().map(|key| cell(&row[*key])).collect::<Vec<_>>());
    write_rows(&header, values)
}

fn write_rows<I>(header: &[&str], rows: I) -> Result<String, RenderError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RenderError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Text of a single CSV cell
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        // nested structures keep their JSON form
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
