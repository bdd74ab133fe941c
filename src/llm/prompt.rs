//! Instruction context sent with every question.

use crate::schema::{TableSchema, SALES_TABLE};
use crate::types::{AssistantError, Result};

/// A worked question → SQL pair used to steer the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub question: String,
    pub sql: String,
}

impl Example {
    pub fn new(question: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            sql: sql.into(),
        }
    }
}

/// Immutable prompt: task description, schema, and ordered examples.
///
/// Rendered once on construction; [`InstructionContext::text`] is what the
/// text generator receives.
#[derive(Debug, Clone)]
pub struct InstructionContext {
    schema: TableSchema,
    examples: Vec<Example>,
    text: String,
}

impl InstructionContext {
    /// Build and validate a context.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::ConfigError` if the table name is not a plain
    /// identifier, a column is unnamed, or an example has a blank question
    /// or query
    pub fn new(schema: TableSchema, examples: Vec<Example>) -> Result<Self> {
        if !is_identifier(&schema.name) {
            return Err(AssistantError::config(format!(
                "Table name '{}' must be a plain SQL identifier",
                schema.name
            )));
        }
        if schema.columns.is_empty() || schema.columns.iter().any(|c| c.name.trim().is_empty()) {
            return Err(AssistantError::config(format!(
                "Table '{}' needs named columns",
                schema.name
            )));
        }
        if let Some(idx) = examples
            .iter()
            .position(|e| e.question.trim().is_empty() || e.sql.trim().is_empty())
        {
            return Err(AssistantError::config(format!("Example {} is incomplete", idx + 1)));
        }

        Ok(Self::from_parts(schema, examples))
    }

    /// The sales assistant's context for `sales_data`.
    pub fn sales() -> Self {
        Self::from_parts(TableSchema::sales_data(), sales_examples())
    }

    /// The sales context with the table renamed in schema and examples.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::ConfigError` if `table` is not a plain
    /// identifier
    pub fn sales_for_table(table: &str) -> Result<Self> {
        let examples: Vec<Example> = sales_examples()
            .into_iter()
            .map(|e| Example::new(e.question, e.sql.replace(SALES_TABLE, table)))
            .collect();
        Self::new(TableSchema::sales_data_named(table), examples)
    }

    fn from_parts(schema: TableSchema, examples: Vec<Example>) -> Self {
        let text = render(&schema, &examples);
        Self {
            schema,
            examples,
            text,
        }
    }

    pub fn table(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Look up the worked query for a question, exact match.
    pub fn example_sql(&self, question: &str) -> Option<&str> {
        self.examples
            .iter()
            .find(|e| e.question == question)
            .map(|e| e.sql.as_str())
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn render(schema: &TableSchema, examples: &[Example]) -> String {
    let mut text = String::from(
        "You are a SQL expert. Convert the user's natural language request into a valid SQL query.\n",
    );
    text.push_str(&format!(
        "Assume the database is SQLite and there is a table called '{}' with the following columns:\n{}.\n",
        schema.name,
        schema.column_list()
    ));
    for column in &schema.columns {
        text.push_str(&format!("- {} ({}): {}\n", column.name, column.sql_type, column.description));
    }
    text.push_str("Only return the SQL query. Do not include explanations or extra text.\n");

    if !examples.is_empty() {
        text.push_str("\nExamples:\n");
        for (i, example) in examples.iter().enumerate() {
            text.push_str(&format!(
                "\n{}. \"{}\" means:\n   {}\n",
                i + 1,
                example.question,
                example.sql
            ));
        }
    }

    text
}

fn sales_examples() -> Vec<Example> {
    vec![
        Example::new(
            "Show total sales and quantity per city",
            "SELECT City, SUM(Sales) AS Total_Sales, SUM(Quantity) AS Total_Quantity FROM sales_data GROUP BY City",
        ),
        Example::new(
            "Which city had the highest sales in 2024",
            "SELECT City, SUM(Sales) AS Total_Sales FROM sales_data WHERE sale_date BETWEEN '2024-01-01' AND '2024-12-31' GROUP BY City ORDER BY Total_Sales DESC LIMIT 1",
        ),
        Example::new(
            "Get monthly sales for Product 2 in 2025",
            "SELECT strftime('%Y-%m', sale_date) AS Month, SUM(Sales) AS Total_Sales FROM sales_data WHERE Product_Name = 'Product 2' AND sale_date BETWEEN '2025-01-01' AND '2025-12-31' GROUP BY Month ORDER BY Month",
        ),
        Example::new(
            "Show top 3 cities by total quantity sold",
            "SELECT City, SUM(Quantity) AS Total_Quantity FROM sales_data GROUP BY City ORDER BY Total_Quantity DESC LIMIT 3",
        ),
        Example::new(
            "List product names with their total sales",
            "SELECT Product_Name, SUM(Sales) FROM sales_data GROUP BY Product_Name",
        ),
        Example::new(
            "Find total quantity sold for each channel in the last 6 months",
            "SELECT Channel, SUM(Quantity) FROM sales_data WHERE sale_date >= date('now', '-6 months') GROUP BY Channel",
        ),
        Example::new(
            "What is the average sales per transaction for Product 2",
            "SELECT AVG(Sales) FROM sales_data WHERE Product_Name = 'Product 2'",
        ),
        Example::new(
            "Rank cities based on total sales",
            "SELECT City, SUM(Sales) AS Total_Sales, RANK() OVER (ORDER BY SUM(Sales) DESC) AS Rank FROM sales_data GROUP BY City",
        ),
        Example::new(
            "Get sales in City1 for Channel 1 in October 2024",
            "SELECT * FROM sales_data WHERE City = 'City1' AND Channel = 'Channel 1' AND sale_date BETWEEN '2024-10-01' AND '2024-10-31'",
        ),
        Example::new(
            "Compare sales in January and February 2025",
            "SELECT strftime('%Y-%m', sale_date) AS Month, SUM(Sales) FROM sales_data WHERE sale_date BETWEEN '2025-01-01' AND '2025-02-28' GROUP BY Month",
        ),
        Example::new(
            "What are the monthly sales across platform1 since Jan 2025?",
            "SELECT strftime('%Y-%m', sale_date) AS Month, SUM(Sales) AS Total_Sales FROM sales_data WHERE Channel = 'Channel 1' AND sale_date >= '2025-01-01' GROUP BY Month ORDER BY Month;",
        ),
        Example::new(
            "What is the share of units sold across various platforms since Jan 2025?",
            "SELECT Channel, SUM(Quantity) AS Total_Quantity, (SUM(Quantity) / (SELECT SUM(Quantity) FROM sales_data WHERE sale_date >= '2025-01-01')) * 100 AS Share_Percent FROM sales_data WHERE sale_date >= '2025-01-01' GROUP BY Channel;",
        ),
        Example::new(
            "Can you tell me the top 5 days with the highest daily units sold?",
            "SELECT sale_date, SUM(Quantity) AS Total_Quantity FROM sales_data GROUP BY sale_date ORDER BY Total_Quantity DESC LIMIT 5;",
        ),
    ]
}
