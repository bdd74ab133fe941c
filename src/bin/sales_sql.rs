//! sales-sql CLI
//!
//! Ask questions about the sales table in plain English.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sales_sql::config::{expand_path, Config};
use sales_sql::llm::{InstructionContext, LlmClient, QuerySynthesizer};
use sales_sql::render::{OutputFormat, Presenter, TerminalPresenter};
use sales_sql::store::{import, list_tables, SqliteStore};
use sales_sql::{Answer, MessageLevel, Pipeline, StatementRunner};
use std::fs::File;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// sales-sql - natural language questions over a SQLite sales table
#[derive(Parser)]
#[command(name = "sales-sql")]
#[command(about = "Ask questions about sales data in plain English", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database file (default: sales_data.db)
    #[arg(long, global = true, env = "SALES_SQL_DB")]
    db: Option<PathBuf>,

    /// Model name; selects the provider (gemini-*, claude-*, otherwise OpenAI)
    #[arg(long, global = true, env = "SALES_SQL_MODEL")]
    model: Option<String>,

    /// JSON config file
    #[arg(long, global = true, env = "SALES_SQL_CONFIG")]
    config: Option<PathBuf>,

    /// Refuse statements that modify data and open the database read-only
    #[arg(long, global = true)]
    reject_mutations: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one question
    Ask {
        /// Question in natural language
        question: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Do not print the generated SQL
        #[arg(long)]
        no_sql: bool,
    },

    /// Answer questions from stdin until EOF, `exit`, or `quit`
    Repl {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Do not print the generated SQL
        #[arg(long)]
        no_sql: bool,
    },

    /// Run a SQL statement through the table check and result shaping
    Query {
        /// SQL statement
        sql: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List tables in the database
    Tables,

    /// Create the sales table, optionally loading rows from CSV
    Init {
        /// CSV with header sale_date,Channel,Product_Name,City,Quantity,Sales
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Print the instructions sent to the model
    Prompt,
}

impl Cli {
    /// File config, then flags and environment on top.
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(&expand_path(path)?)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(db) = &self.db {
            config.store.path = expand_path(db)?;
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if self.reject_mutations {
            config.store.reject_mutations = true;
        }

        tracing::debug!(?config, "Resolved configuration");
        Ok(config)
    }
}

fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline<SqliteStore>> {
    let mut llm = config.llm.clone();
    llm.fill_key_from_env()?;

    let context = Arc::new(InstructionContext::sales_for_table(&config.store.table)?);
    let client = LlmClient::new(llm)?;
    tracing::debug!(provider = ?client.provider(), table = context.table(), "Pipeline ready");
    let synthesizer = QuerySynthesizer::new(Arc::new(client), context);

    Ok(Pipeline::new(synthesizer, SqliteStore::from_config(&config.store))
        .reject_mutations(config.store.reject_mutations))
}

fn exit_code(answer: &Answer) -> ExitCode {
    if answer.outcome.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn repl(pipeline: &Pipeline<SqliteStore>, presenter: &mut impl Presenter) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        write!(stdout, "? ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let question = line.trim();
        if matches!(question, "exit" | "quit") {
            break;
        }

        let answer = pipeline.ask(question).await;
        if let Err(e) = presenter.present(&answer) {
            tracing::warn!(error = %e, "Failed to display answer");
        }
        writeln!(stdout)?;
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    sales_sql::telemetry::init_logging(cli.verbose)?;
    let config = cli.resolve_config()?;

    match cli.command {
        Commands::Ask {
            question,
            format,
            no_sql,
        } => {
            let pipeline = build_pipeline(&config)?;
            let answer = pipeline.ask(&question).await;
            TerminalPresenter::stdout(format, !no_sql).present(&answer)?;
            Ok(exit_code(&answer))
        }

        Commands::Repl { format, no_sql } => {
            let pipeline = build_pipeline(&config)?;
            let mut presenter = TerminalPresenter::stdout(format, !no_sql);
            repl(&pipeline, &mut presenter).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Query { sql, format } => {
            let runner = StatementRunner::new(SqliteStore::from_config(&config.store), &config.store.table)
                .reject_mutations(config.store.reject_mutations);
            let answer = Answer {
                sql: None,
                outcome: runner.run(sql.trim()),
            };
            TerminalPresenter::stdout(format, false).present(&answer)?;
            Ok(exit_code(&answer))
        }

        Commands::Tables => {
            let store = SqliteStore::from_config(&config.store);
            let mut presenter = TerminalPresenter::stdout(OutputFormat::Table, false);
            match list_tables(&store) {
                Ok(tables) if tables.is_empty() => {
                    presenter.show_message(MessageLevel::Warning, "No tables in the database.")?;
                    Ok(ExitCode::SUCCESS)
                }
                Ok(tables) => {
                    for table in tables {
                        println!("{}", table);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    presenter.show_message(
                        MessageLevel::Error,
                        &format!("SQLite error while listing tables: {}", e),
                    )?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Commands::Init { csv } => {
            let store = SqliteStore::from_config(&config.store);
            let context = InstructionContext::sales_for_table(&config.store.table)?;
            let schema = context.schema();

            match csv {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("opening {}", path.display()))?;
                    let rows = import::import_csv(&store, schema, file)?;
                    println!("Imported {} rows into {} ({})", rows, schema.name, store.path().display());
                }
                None => {
                    import::initialize(&store, schema)?;
                    println!("Table {} ready in {}", schema.name, store.path().display());
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Prompt => {
            println!("{}", InstructionContext::sales_for_table(&config.store.table)?.text());
            Ok(ExitCode::SUCCESS)
        }
    }
}
