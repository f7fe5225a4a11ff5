//! Projection of mapped rows into table, CSV or JSON output.

use serde::{Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Value};

use crate::engine::{query::ROW_NUMBER_COLUMN, types::Row};
use crate::error::AppResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsFormat {
    #[default]
    #[serde(alias = "datatable", alias = "html", alias = "pdf")]
    Table,
    Csv,
    Json,
}

/// How a null cell reads in table output. CSV and JSON ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullDisplay {
    #[default]
    Dimmed,
    Blank,
    #[serde(alias = "null")]
    Literal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeOptions {
    pub hide_row_number_column: bool,
    pub null_display: NullDisplay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell {
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dimmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<TableCell>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderedResult {
    /// The row set was empty.
    NoRecords,
    Table(TableView),
    Csv { text: String },
    Json { text: String },
}

pub fn shape(rows: &[Row], format: ResultsFormat, options: ShapeOptions) -> AppResult<RenderedResult> {
    let Some(first) = rows.first() else {
        return Ok(RenderedResult::NoRecords);
    };

    // First row's key order is canonical for every row.
    let columns: Vec<&str> = first
        .keys()
        .map(String::as_str)
        .filter(|c| !(options.hide_row_number_column && c.eq_ignore_ascii_case(ROW_NUMBER_COLUMN)))
        .collect();

    Ok(match format {
        ResultsFormat::Table => RenderedResult::Table(table(rows, &columns, options.null_display)),
        ResultsFormat::Csv => RenderedResult::Csv { text: csv(rows, &columns) },
        ResultsFormat::Json => RenderedResult::Json {
            text: json(rows, options.hide_row_number_column)?,
        },
    })
}

fn table(rows: &[Row], columns: &[&str], nulls: NullDisplay) -> TableView {
    let rows = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| match row.get(*c) {
                    None | Some(Value::Null) => null_cell(nulls),
                    Some(v) => TableCell {
                        text: scalar_text(v),
                        dimmed: false,
                    },
                })
                .collect()
        })
        .collect();

    TableView {
        headers: columns.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

fn null_cell(nulls: NullDisplay) -> TableCell {
    match nulls {
        NullDisplay::Dimmed => TableCell {
            text: "null".into(),
            dimmed: true,
        },
        NullDisplay::Blank => TableCell {
            text: String::new(),
            dimmed: false,
        },
        NullDisplay::Literal => TableCell {
            text: "null".into(),
            dimmed: false,
        },
    }
}

fn csv(rows: &[Row], columns: &[&str]) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, columns.iter().map(|c| c.to_string()));
    for row in rows {
        push_csv_line(
            &mut out,
            columns.iter().map(|c| match row.get(*c) {
                None | Some(Value::Null) => String::new(),
                Some(v) => scalar_text(v),
            }),
        );
    }
    out
}

fn push_csv_line(out: &mut String, fields: impl Iterator<Item = String>) {
    let quoted: Vec<String> = fields
        .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
        .collect();
    out.push_str(&quoted.join(","));
    out.push_str("\r\n");
}

fn json(rows: &[Row], hide_row_number_column: bool) -> AppResult<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"     "));
    if hide_row_number_column {
        let projected: Vec<Row> = rows
            .iter()
            .map(|r| {
                r.iter()
                    .filter(|(k, _)| !k.eq_ignore_ascii_case(ROW_NUMBER_COLUMN))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .collect();
        projected.serialize(&mut ser)?;
    } else {
        rows.serialize(&mut ser)?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::testing::row;

    fn table_of(r: RenderedResult) -> TableView {
        match r {
            RenderedResult::Table(t) => t,
            other => panic!("expected table, got {other:?}"),
        }
    }

    fn opts(hide: bool, nulls: NullDisplay) -> ShapeOptions {
        ShapeOptions {
            hide_row_number_column: hide,
            null_display: nulls,
        }
    }

    #[test]
    fn empty_rows_signal_no_records() {
        for format in [ResultsFormat::Table, ResultsFormat::Csv, ResultsFormat::Json] {
            assert_eq!(shape(&[], format, ShapeOptions::default()).unwrap(), RenderedResult::NoRecords);
        }
    }

    #[test]
    fn null_display_policies() {
        let rows = vec![row(&[("a", Value::Null)])];

        let blank = table_of(shape(&rows, ResultsFormat::Table, opts(false, NullDisplay::Blank)).unwrap());
        assert_eq!(blank.rows[0][0].text, "");

        let literal = table_of(shape(&rows, ResultsFormat::Table, opts(false, NullDisplay::Literal)).unwrap());
        assert_eq!(literal.rows[0][0].text, "null");
        assert!(!literal.rows[0][0].dimmed);

        let dimmed = table_of(shape(&rows, ResultsFormat::Table, opts(false, NullDisplay::Dimmed)).unwrap());
        assert!(dimmed.rows[0][0].dimmed);
    }

    #[test]
    fn csv_ignores_null_policy() {
        let rows = vec![row(&[("a", Value::Null)])];
        for nulls in [NullDisplay::Dimmed, NullDisplay::Blank, NullDisplay::Literal] {
            let out = shape(&rows, ResultsFormat::Csv, opts(false, nulls)).unwrap();
            assert_eq!(
                out,
                RenderedResult::Csv {
                    text: "\"a\"\r\n\"\"\r\n".into()
                }
            );
        }
    }

    #[test]
    fn row_number_column_is_dropped_everywhere() {
        let rows = vec![
            row(&[("rownumber", json!(1)), ("id", json!(10)), ("name", json!("Ada"))]),
            row(&[("rownumber", json!(2)), ("id", json!(11)), ("name", json!("Grace"))]),
        ];
        let t = table_of(shape(&rows, ResultsFormat::Table, opts(true, NullDisplay::Dimmed)).unwrap());
        assert_eq!(t.headers, vec!["id", "name"]);
        assert_eq!(t.rows[0][0].text, "10");
        assert_eq!(t.rows[1][0].text, "11");
        assert_eq!(t.rows[1][1].text, "Grace");

        let RenderedResult::Csv { text } = shape(&rows, ResultsFormat::Csv, opts(true, NullDisplay::Dimmed)).unwrap()
        else {
            panic!("expected csv");
        };
        assert_eq!(text, "\"id\",\"name\"\r\n\"10\",\"Ada\"\r\n\"11\",\"Grace\"\r\n");

        let RenderedResult::Json { text } = shape(&rows, ResultsFormat::Json, opts(true, NullDisplay::Dimmed)).unwrap()
        else {
            panic!("expected json");
        };
        assert!(!text.contains("rownumber"));
    }

    #[test]
    fn row_number_column_kept_unless_hidden() {
        let rows = vec![row(&[("rownumber", json!(1)), ("id", json!(10))])];
        let t = table_of(shape(&rows, ResultsFormat::Table, opts(false, NullDisplay::Dimmed)).unwrap());
        assert_eq!(t.headers, vec!["rownumber", "id"]);
    }

    #[test]
    fn first_row_order_is_canonical() {
        let rows = vec![
            row(&[("id", json!(1)), ("name", json!("a"))]),
            row(&[("name", json!("b")), ("id", json!(2))]),
            row(&[("id", json!(3))]),
        ];
        let t = table_of(shape(&rows, ResultsFormat::Table, opts(false, NullDisplay::Blank)).unwrap());
        assert_eq!(t.rows[1][0].text, "2");
        assert_eq!(t.rows[1][1].text, "b");
        assert_eq!(t.rows[2][1].text, "");
    }

    #[test]
    fn csv_doubles_embedded_quotes() {
        let rows = vec![row(&[("memo", json!("say \"hi\"")), ("ok", json!(true))])];
        let RenderedResult::Csv { text } = shape(&rows, ResultsFormat::Csv, ShapeOptions::default()).unwrap() else {
            panic!("expected csv");
        };
        assert_eq!(text, "\"memo\",\"ok\"\r\n\"say \"\"hi\"\"\",\"true\"\r\n");
    }

    #[test]
    fn json_keeps_nulls_structurally() {
        let rows = vec![row(&[("a", Value::Null)])];
        let RenderedResult::Json { text } = shape(&rows, ResultsFormat::Json, opts(false, NullDisplay::Blank)).unwrap()
        else {
            panic!("expected json");
        };
        let back: Vec<Row> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn format_aliases_parse() {
        let f: ResultsFormat = serde_json::from_str("\"datatable\"").unwrap();
        assert_eq!(f, ResultsFormat::Table);
        let n: NullDisplay = serde_json::from_str("\"null\"").unwrap();
        assert_eq!(n, NullDisplay::Literal);
    }
}
