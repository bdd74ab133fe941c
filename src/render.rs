//! Terminal presentation of answers.

use crate::pipeline::{Answer, MessageLevel, Outcome};
use crate::types::{AssistantError, Result, Table};
use colored::Colorize;
use comfy_table::{ContentArrangement, Table as TextTable};
use serde_json::json;
use std::io::Write;

/// How tables are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Display collaborator: shows the SQL, a table, or one classified message.
pub trait Presenter {
    fn show_sql(&mut self, sql: &str) -> Result<()>;

    fn show_table(&mut self, table: &Table) -> Result<()>;

    fn show_message(&mut self, level: MessageLevel, text: &str) -> Result<()>;

    /// Show a whole answer: SQL first (if any), then the outcome.
    fn present(&mut self, answer: &Answer) -> Result<()> {
        if let Some(sql) = &answer.sql {
            self.show_sql(sql)?;
        }
        match &answer.outcome {
            Outcome::Table(table) => self.show_table(table),
            Outcome::Failed(failure) => self.show_message(failure.level(), &failure.to_string()),
        }
    }
}

/// Writes answers to a terminal (or any writer).
pub struct TerminalPresenter<W: Write> {
    out: W,
    format: OutputFormat,
    show_sql: bool,
    color: bool,
}

impl TerminalPresenter<std::io::Stdout> {
    pub fn stdout(format: OutputFormat, show_sql: bool) -> Self {
        Self::new(std::io::stdout(), format, show_sql, true)
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, format: OutputFormat, show_sql: bool, color: bool) -> Self {
        Self {
            out,
            format,
            show_sql,
            color,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn show_sql(&mut self, sql: &str) -> Result<()> {
        // Machine formats keep stdout parseable
        if !self.show_sql || self.format != OutputFormat::Table {
            return Ok(());
        }
        let header = if self.color {
            "Generated SQL:".bold().to_string()
        } else {
            "Generated SQL:".to_string()
        };
        writeln!(self.out, "{}\n{}\n", header, sql)?;
        Ok(())
    }

    fn show_table(&mut self, table: &Table) -> Result<()> {
        let rendered = match self.format {
            OutputFormat::Table => render_table(table),
            OutputFormat::Json => render_json(table)?,
            OutputFormat::Csv => render_csv(table)?,
        };
        writeln!(self.out, "{}", rendered.trim_end())?;
        Ok(())
    }

    fn show_message(&mut self, level: MessageLevel, text: &str) -> Result<()> {
        let label = format!("{}:", level);
        let label = match (self.color, level) {
            (false, _) => label,
            (true, MessageLevel::Error) => label.red().bold().to_string(),
            (true, MessageLevel::Warning) => label.yellow().bold().to_string(),
            (true, MessageLevel::Info) => label.cyan().bold().to_string(),
        };
        writeln!(self.out, "{} {}", label, text)?;
        Ok(())
    }
}

const TABLE_PRESET: &str = "││──╞═╪╡│    ┬┴┌┐└┘";

/// Box-drawn table with a header row. Nulls are empty cells.
pub fn render_table(table: &Table) -> String {
    let mut rendered = TextTable::new();
    rendered
        .load_preset(TABLE_PRESET)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(table.columns());

    for row in table.rows() {
        rendered.add_row(row.iter().map(|v| v.to_string()));
    }

    rendered.to_string()
}

/// `{"columns": [...], "rows": [[...]]}` with typed JSON values.
pub fn render_json(table: &Table) -> Result<String> {
    let rows: Vec<Vec<serde_json::Value>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|v| v.to_json()).collect())
        .collect();

    Ok(serde_json::to_string_pretty(&json!({
        "columns": table.columns(),
        "rows": rows,
    }))?)
}

/// CSV with a header line.
pub fn render_csv(table: &Table) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AssistantError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AssistantError::config(format!("CSV output is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Failure;
    use crate::types::{RawResult, SqlValue};

    fn sample() -> Table {
        Table::try_from_raw(RawResult {
            columns: vec!["City".into(), "Total_Sales".into()],
            rows: vec![
                vec![SqlValue::from("City1"), SqlValue::Real(120.5)],
                vec![SqlValue::from("City, North"), SqlValue::Null],
            ],
        })
        .unwrap()
    }

    fn present(answer: &Answer, format: OutputFormat) -> String {
        let mut presenter = TerminalPresenter::new(Vec::new(), format, true, false);
        presenter.present(answer).unwrap();
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn test_render_table() {
        let out = render_table(&sample());
        assert!(out.contains("City1"));
        assert!(out.contains("120.5"));
        assert!(out.lines().next().unwrap().starts_with('┌'));
    }

    #[test]
    fn test_render_json() {
        let out: serde_json::Value = serde_json::from_str(&render_json(&sample()).unwrap()).unwrap();
        assert_eq!(out["columns"], json!(["City", "Total_Sales"]));
        assert_eq!(out["rows"][0], json!(["City1", 120.5]));
        assert_eq!(out["rows"][1][1], serde_json::Value::Null);
    }

    #[test]
    fn test_render_csv() {
        let out = render_csv(&sample()).unwrap();
        assert_eq!(out, "City,Total_Sales\nCity1,120.5\n\"City, North\",\n");
    }

    #[test]
    fn test_present_message() {
        let answer = Answer {
            sql: Some("SELECT 1".into()),
            outcome: Failure::NoData.into(),
        };
        let out = present(&answer, OutputFormat::Table);
        assert!(out.starts_with("Generated SQL:\nSELECT 1\n"));
        assert!(out.ends_with("warning: No data returned.\n"));
    }

    #[test]
    fn test_machine_formats_skip_sql() {
        let answer = Answer {
            sql: Some("SELECT 1".into()),
            outcome: Outcome::Table(sample()),
        };
        let out = present(&answer, OutputFormat::Csv);
        assert!(out.starts_with("City,Total_Sales"));
    }
}
