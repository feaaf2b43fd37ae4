//! Field mapping: source records to remote payloads

use std::borrow::Cow;
use std::collections::BTreeMap;

use encoding_rs::Encoding;
use recsync_connectors::{Record, SqlValue};
use serde_json::Value;

use crate::config::FieldMapping;
use crate::remote::Payload;
use crate::template::Template;
use crate::{Error, Result};

const ELLIPSIS: &str = "...";
const LINE_JOINER: &str = " | ";

/// Resolve an encoding label such as `utf-8`, `latin1` or `cp1252`.
pub fn lookup_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::configuration(format!("unknown text encoding '{label}'")))
}

struct PreparedField {
    name: String,
    template: Template,
    integer: bool,
    max_length: Option<usize>,
}

/// A field mapping checked and compiled for one encoding.
pub struct Transformer {
    fields: Vec<PreparedField>,
    encoding: &'static Encoding,
}

impl Transformer {
    /// Fails with a configuration error on a literal `src`, a bad
    /// `max_length` or an unknown encoding.
    pub fn new(mapping: &FieldMapping, encoding: &str) -> Result<Self> {
        let encoding = lookup_encoding(encoding)?;
        let mut fields = Vec::with_capacity(mapping.len());
        for (name, rule) in mapping.iter() {
            let max_length = rule.max_length(name)?;
            if let Some(template) = rule.template(name)? {
                fields.push(PreparedField {
                    name: name.clone(),
                    template,
                    integer: rule.is_integer(),
                    max_length,
                });
            }
        }
        Ok(Self { fields, encoding })
    }

    /// Map one record to its payload.
    pub fn apply(&self, record: &Record) -> Result<Payload> {
        let values = normalize(record, self.encoding);
        let mut payload = Payload::new();
        for field in &self.fields {
            let rendered =
                field
                    .template
                    .render(&values)
                    .map_err(|missing| Error::TemplateRender {
                        field: field.name.clone(),
                        template: field.template.source().to_string(),
                        missing,
                    })?;
            payload.insert(field.name.clone(), coerce(field, rendered)?);
        }
        Ok(payload)
    }

    /// Map every record; the first failure fails the whole batch.
    pub fn apply_all(&self, records: &[Record]) -> Result<Vec<Payload>> {
        records.iter().map(|r| self.apply(r)).collect()
    }
}

/// Map `records` to payloads in input order.
pub fn transform(records: &[Record], mapping: &FieldMapping, encoding: &str) -> Result<Vec<Payload>> {
    Transformer::new(mapping, encoding)?.apply_all(records)
}

/// Map a single record.
pub fn transform_one(record: &Record, mapping: &FieldMapping, encoding: &str) -> Result<Payload> {
    Transformer::new(mapping, encoding)?.apply(record)
}

/// Stringify every value: nulls become empty, blobs are decoded.
pub fn normalize(record: &Record, encoding: &'static Encoding) -> BTreeMap<String, String> {
    record
        .iter()
        .map(|(column, value)| {
            let text = match value {
                SqlValue::Null => String::new(),
                SqlValue::Blob(bytes) => decode(column, bytes, encoding).into_owned(),
                other => other.to_string(),
            };
            (column.clone(), text)
        })
        .collect()
}

fn decode<'a>(column: &str, bytes: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
        return text;
    }
    tracing::warn!(
        column,
        encoding = encoding.name(),
        "value is not valid in the configured encoding; decoding lossily"
    );
    encoding.decode_without_bom_handling(bytes).0
}

fn coerce(field: &PreparedField, rendered: String) -> Result<Value> {
    if field.integer {
        return rendered
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| Error::TypeCoercion {
                field: field.name.clone(),
                value: rendered,
                expected: "an integer".to_string(),
            });
    }
    let Some(max_length) = field.max_length else {
        return Ok(Value::String(rendered));
    };
    let text = truncate(&rendered, max_length);
    if text.chars().count() < one_line(&rendered).chars().count() {
        tracing::info!(
            field = %field.name,
            max_length,
            original = %rendered,
            truncated = %text,
            "value truncated"
        );
    }
    Ok(Value::String(text))
}

/// Trim, drop carriage returns and join lines with ` | `.
pub fn one_line(text: &str) -> String {
    text.trim().replace('\r', "").replace('\n', LINE_JOINER)
}

/// Flatten to one line and cut to `max_length` characters, marking the cut
/// with `...`.
///
/// Limits shorter than the marker cut without it.
pub fn truncate(text: &str, max_length: usize) -> String {
    let line = one_line(text);
    if line.chars().count() <= max_length {
        return line;
    }
    if max_length < ELLIPSIS.len() {
        return line.chars().take(max_length).collect();
    }
    let mut cut: String = line.chars().take(max_length - ELLIPSIS.len()).collect();
    cut.push_str(ELLIPSIS);
    cut
}
