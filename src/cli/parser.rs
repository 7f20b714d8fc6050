//! Shell command parser
//!
//! A line is first split shell-style (quotes group words and are removed),
//! then the words after the command name are rejoined and matched against
//! the command's pattern.
//!
//! Literals: `'x'`/`"x"` -> string, `true`/`false` (any case) -> bool,
//! base-10 integer -> int, anything else -> bare string.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::executor::Predicate;
use crate::schema::Value;

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    ListTables,
    CreateTable { table: String, columns: Vec<String> },
    DropTable { table: String },
    Info { table: String },
    Insert { table: String, values: Vec<Value> },
    Select { table: String, predicate: Option<Predicate> },
    Update { table: String, set: Vec<(String, Value)>, predicate: Predicate },
    Delete { table: String, predicate: Predicate },
}

impl Command {
    /// Name used in timing lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Exit => "exit",
            Self::ListTables => "list_tables",
            Self::CreateTable { .. } => "create_table",
            Self::DropTable { .. } => "drop_table",
            Self::Info { .. } => "info",
            Self::Insert { .. } => "insert",
            Self::Select { .. } => "select",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Command parsing error: {0}")]
    Tokenize(String),

    #[error("Command '{0}' not found. Type 'help' for available commands.")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

pub const CREATE_TABLE_USAGE: &str = "create_table <table_name> <col1:type> ...";
pub const DROP_TABLE_USAGE: &str = "drop_table <table_name>";
pub const INFO_USAGE: &str = "info <table_name>";
pub const INSERT_USAGE: &str = "insert into <table> values (<val1>, <val2>, ...)";
pub const SELECT_USAGE: &str = "select from <table> [where <column> = <value>]";
pub const UPDATE_USAGE: &str = "update <table> set <col>=<val> where <col>=<val>";
pub const DELETE_USAGE: &str = "delete from <table> where <column> = <value>";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let words = tokenize(line.trim())?;
    let Some((first, rest)) = words.split_first() else {
        return Ok(None);
    };

    let command = match first.to_lowercase().as_str() {
        "help" => Command::Help,
        "exit" => Command::Exit,
        "list_tables" => Command::ListTables,
        "create_table" => match rest {
            [table, columns @ ..] if !columns.is_empty() => Command::CreateTable {
                table: table.clone(),
                columns: columns.to_vec(),
            },
            _ => return Err(ParseError::Usage(CREATE_TABLE_USAGE)),
        },
        "drop_table" => Command::DropTable {
            table: rest.first().cloned().ok_or(ParseError::Usage(DROP_TABLE_USAGE))?,
        },
        "info" => Command::Info {
            table: rest.first().cloned().ok_or(ParseError::Usage(INFO_USAGE))?,
        },
        "insert" => parse_insert(&rest.join(" "))?,
        "select" => parse_select(&rest.join(" "))?,
        "update" => parse_update(&rest.join(" "))?,
        "delete" => parse_delete(&rest.join(" "))?,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("command pattern is valid"))
}

fn insert_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)^into\s+(\w+)\s+values\s*\((.+)\)")
}

fn where_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)^from\s+(\w+)\s+where\s+(.+)")
}

fn from_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)^from\s+(\w+)")
}

fn update_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)^(\w+)\s+set\s+(.+?)\s+where\s+(.+)")
}

fn condition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^(\w+)\s*=\s*(.+)")
}

fn parse_insert(rest: &str) -> Result<Command, ParseError> {
    let caps = insert_re().captures(rest).ok_or(ParseError::Usage(INSERT_USAGE))?;
    Ok(Command::Insert {
        table: caps[1].to_string(),
        values: parse_values_list(&caps[2]),
    })
}

fn parse_select(rest: &str) -> Result<Command, ParseError> {
    if let Some(caps) = where_re().captures(rest) {
        let (column, value) = parse_condition(&caps[2]).ok_or(ParseError::Usage(SELECT_USAGE))?;
        return Ok(Command::Select {
            table: caps[1].to_string(),
            predicate: Some(Predicate::eq(column, value)),
        });
    }

    let caps = from_re().captures(rest).ok_or(ParseError::Usage(SELECT_USAGE))?;
    Ok(Command::Select {
        table: caps[1].to_string(),
        predicate: None,
    })
}

fn parse_update(rest: &str) -> Result<Command, ParseError> {
    let caps = update_re().captures(rest).ok_or(ParseError::Usage(UPDATE_USAGE))?;
    let set = parse_condition(&caps[2]).ok_or(ParseError::Usage(UPDATE_USAGE))?;
    let (column, value) = parse_condition(&caps[3]).ok_or(ParseError::Usage(UPDATE_USAGE))?;

    Ok(Command::Update {
        table: caps[1].to_string(),
        set: vec![set],
        predicate: Predicate::eq(column, value),
    })
}

fn parse_delete(rest: &str) -> Result<Command, ParseError> {
    let caps = where_re().captures(rest).ok_or(ParseError::Usage(DELETE_USAGE))?;
    let (column, value) = parse_condition(&caps[2]).ok_or(ParseError::Usage(DELETE_USAGE))?;

    Ok(Command::Delete {
        table: caps[1].to_string(),
        predicate: Predicate::eq(column, value),
    })
}

/// Parses `column = value`.
pub fn parse_condition(text: &str) -> Option<(String, Value)> {
    let caps = condition_re().captures(text.trim())?;
    Some((caps[1].to_string(), parse_value(&caps[2])))
}

/// Parses one literal.
pub fn parse_value(text: &str) -> Value {
    let text = text.trim();

    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return Value::Str(text[1..text.len() - 1].to_string());
        }
    }

    if text.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    match text.parse::<i64>() {
        Ok(n) => Value::Int(n),
        Err(_) => Value::Str(text.to_string()),
    }
}

/// Splits a comma-separated value list. Commas inside quotes do not split.
pub fn parse_values_list(text: &str) -> Vec<Value> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in text.chars() {
        match (c, quote) {
            ('"' | '\'', None) => {
                quote = Some(c);
                current.push(c);
            }
            (c, Some(q)) if c == q => {
                quote = None;
                current.push(c);
            }
            (',', None) => {
                values.push(parse_value(&current));
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if !current.trim().is_empty() {
        values.push(parse_value(&current));
    }

    values
}

/// Shell-style word splitting.
///
/// Whitespace separates words; single quotes take everything literally;
/// double quotes allow `\"` and `\\`; a backslash outside quotes escapes
/// the next character.
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(ParseError::Tokenize("No closing quotation".into())),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(ParseError::Tokenize("No closing quotation".into())),
                        },
                        Some(c) => current.push(c),
                        None => return Err(ParseError::Tokenize("No closing quotation".into())),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(c) => current.push(c),
                    None => return Err(ParseError::Tokenize("No escaped character".into())),
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}
