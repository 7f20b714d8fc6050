//! Interactive shell
//!
//! Reads one command per line, runs it against the engine and prints the
//! outcome. Engine errors are reported and the loop continues; only I/O
//! failures on the terminal end the session.

use std::io::{self, Write};

use crate::executor::{AutoConfirm, DbError, DbResult, Engine, Predicate};
use crate::observability::{Logger, Timer};
use crate::schema::{SchemaStore, Value};
use crate::storage::{DocumentStore, LocalStore, RecordStore};

use super::args::Cli;
use super::config::Config;
use super::display::format_records;
use super::errors::CliResult;
use super::io::{LineSource, Prompter, TerminalSource, PROMPT};
use super::parser::{parse_command, Command};

const HELP: &str = "
***Data Operations***
Commands:
  create_table <table_name> <col1:type> .. - create table
  list_tables - show all tables
  drop_table <table_name> - delete table
  insert into <table> values (<val1>, ..) - insert record
  select from <table> [where <col> = <val>] - read records
  update <table> set <col>=<val> where <col>=<val> - update record
  delete from <table> where <col> = <val> - delete record
  info <table_name> - show table information

General:
  help - show help
  exit - exit program
";

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Main CLI entry point
///
/// Parses arguments, resolves configuration and runs the shell on the
/// terminal. This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = Config::resolve(&cli)?;
    Logger::set_min_severity(config.severity()?);

    let engine = Engine::new(
        LocalStore::new("."),
        SchemaStore::new(config.metadata_file.clone()),
        RecordStore::new(config.data_dir.clone()),
    );
    Logger::info(
        "SHELL_STARTED",
        &[
            ("data_dir", config.data_dir.as_str()),
            ("metadata_file", config.metadata_file.as_str()),
        ],
    );

    let mut input = TerminalSource::new()?;
    let mut output = io::stdout();
    Shell::new(engine, config).run(&mut input, &mut output)
}

/// Command loop bound to one engine.
pub struct Shell<S: DocumentStore> {
    engine: Engine<S>,
    config: Config,
}

impl<S: DocumentStore> Shell<S> {
    pub fn new(engine: Engine<S>, config: Config) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    /// Prints the banner and help, then runs commands until `exit` or end
    /// of input.
    pub fn run(&mut self, input: &mut dyn LineSource, output: &mut dyn Write) -> CliResult<()> {
        writeln!(output, "\n***Database***")?;
        write!(output, "{}", HELP)?;

        loop {
            let Some(line) = input.read_line(PROMPT, &mut *output)? else {
                writeln!(output)?;
                return Ok(());
            };

            if self.execute_line(&line, input, output)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Parses and runs one input line.
    pub fn execute_line(&mut self, line: &str, input: &mut dyn LineSource, output: &mut dyn Write) -> CliResult<Flow> {
        match parse_command(line) {
            Ok(None) => Ok(Flow::Continue),
            Ok(Some(command)) => self.execute(command, input, output),
            Err(e) => {
                writeln!(output, "{}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Runs one parsed command.
    pub fn execute(&mut self, command: Command, input: &mut dyn LineSource, output: &mut dyn Write) -> CliResult<Flow> {
        match command {
            Command::Help => write!(output, "{}", HELP)?,
            Command::Exit => {
                writeln!(output, "Goodbye!")?;
                return Ok(Flow::Exit);
            }
            Command::ListTables => self.list_tables(output)?,
            Command::CreateTable { table, columns } => self.create_table(&table, &columns, output)?,
            Command::DropTable { table } => self.drop_table(&table, input, output)?,
            Command::Info { table } => self.info(&table, output)?,
            Command::Insert { table, values } => self.insert(&table, &values, output)?,
            Command::Select { table, predicate } => self.select(&table, predicate.as_ref(), output)?,
            Command::Update { table, set, predicate } => self.update(&table, &set, &predicate, output)?,
            Command::Delete { table, predicate } => self.delete(&table, &predicate, input, output)?,
        }
        Ok(Flow::Continue)
    }

    fn list_tables(&mut self, output: &mut dyn Write) -> CliResult<()> {
        if let Some(names) = report(output, self.engine.list_tables())? {
            if names.is_empty() {
                writeln!(output, "No tables found.")?;
            }
            for name in names {
                writeln!(output, "- {}", name)?;
            }
        }
        Ok(())
    }

    fn create_table(&mut self, table: &str, columns: &[String], output: &mut dyn Write) -> CliResult<()> {
        if let Some(schema) = report(output, self.engine.create_table(table, columns))? {
            writeln!(
                output,
                "Table \"{}\" created successfully with columns: {}",
                table,
                schema.columns_summary()
            )?;
        }
        Ok(())
    }

    fn drop_table(&mut self, table: &str, input: &mut dyn LineSource, output: &mut dyn Write) -> CliResult<()> {
        let result = if self.config.confirm_destructive {
            self.engine.drop_table(table, &mut Prompter::new(&mut *input, &mut *output))
        } else {
            self.engine.drop_table(table, &mut AutoConfirm)
        };

        if report(output, result)?.is_some() {
            writeln!(output, "Table \"{}\" deleted successfully.", table)?;
        }
        Ok(())
    }

    fn info(&mut self, table: &str, output: &mut dyn Write) -> CliResult<()> {
        if let Some(info) = report(output, self.engine.info(table))? {
            writeln!(output, "Table: {}", info.name())?;
            writeln!(output, "Columns: {}", info.columns_summary())?;
            writeln!(output, "Record count: {}", info.record_count)?;
        }
        Ok(())
    }

    fn insert(&mut self, table: &str, values: &[Value], output: &mut dyn Write) -> CliResult<()> {
        let timer = Timer::new();
        let result = self.engine.insert(table, values);

        if let Some(id) = report(output, result)? {
            writeln!(output, "Record with ID={} added to table \"{}\" successfully.", id, table)?;
        }
        self.print_timing(output, "insert", &timer)
    }

    fn select(&mut self, table: &str, predicate: Option<&Predicate>, output: &mut dyn Write) -> CliResult<()> {
        let misses = self.engine.cache().stats().misses;
        let timer = Timer::new();
        let result = self.engine.select(table, predicate);

        // Cache hits skip the lookup entirely, so they are not timed.
        if self.engine.cache().stats().misses > misses {
            self.print_timing(output, "select", &timer)?;
        }

        let Some(records) = report(output, result)? else {
            return Ok(());
        };
        let Some(catalog) = report(output, self.engine.catalog())? else {
            return Ok(());
        };
        let columns = catalog.get(table).map(|s| s.columns.as_slice()).unwrap_or_default();
        writeln!(output, "{}", format_records(&records, columns))?;
        Ok(())
    }

    fn update(
        &mut self,
        table: &str,
        set: &[(String, Value)],
        predicate: &Predicate,
        output: &mut dyn Write,
    ) -> CliResult<()> {
        if let Some(ids) = report(output, self.engine.update(table, set, predicate))? {
            if ids.is_empty() {
                writeln!(output, "No records matching the condition found.")?;
            }
            for id in ids {
                writeln!(output, "Record with ID={} in table \"{}\" updated successfully.", id, table)?;
            }
        }
        Ok(())
    }

    fn delete(
        &mut self,
        table: &str,
        predicate: &Predicate,
        input: &mut dyn LineSource,
        output: &mut dyn Write,
    ) -> CliResult<()> {
        let result = if self.config.confirm_destructive {
            self.engine.delete(table, predicate, &mut Prompter::new(&mut *input, &mut *output))
        } else {
            self.engine.delete(table, predicate, &mut AutoConfirm)
        };

        if let Some(ids) = report(output, result)? {
            if ids.is_empty() {
                writeln!(output, "No records matching the condition found.")?;
            }
            for id in ids {
                writeln!(output, "Record with ID={} deleted from table \"{}\" successfully.", id, table)?;
            }
        }
        Ok(())
    }

    fn print_timing(&self, output: &mut dyn Write, function: &str, timer: &Timer) -> CliResult<()> {
        if self.config.show_timing {
            writeln!(output, "Function {} executed in {} seconds.", function, timer.elapsed_secs())?;
        }
        Ok(())
    }
}

/// Prints an engine error and yields `None`, or passes the value through.
fn report<T>(output: &mut dyn Write, result: DbResult<T>) -> CliResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e @ (DbError::Cancelled | DbError::Internal(_))) => {
            writeln!(output, "{}", e)?;
            Ok(None)
        }
        Err(e) => {
            writeln!(output, "Error: {}", e)?;
            Ok(None)
        }
    }
}
