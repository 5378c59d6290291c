use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Chainable, Error, Result};
use crate::format::{Format, Toml, Yaml};

/// Metadata at the head of a content document. Every field defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: String,
    pub description: String,
    /// Kept as written; never validated as a calendar date.
    pub date: String,
    pub draft: bool,
    /// Every other key, such as the terms of each taxonomy.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// The structured-data dialect of a front-matter block, implied by its
/// delimiter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dialect {
    /// Delimited by `---`.
    Yaml,
    /// Delimited by `+++`.
    Toml,
}

/// A document split into its front matter and body.
#[derive(Debug)]
pub struct Extracted<'a> {
    pub front_matter: FrontMatter,
    pub body: &'a str,
    /// Set when a block was opened but couldn't be used. `front_matter` is
    /// then the default and `body` is the whole input.
    pub error: Option<Error>,
}

impl FrontMatter {
    /// The terms listed under `taxonomy`: a single scalar or a list of them.
    /// Numbers and booleans are taken as written.
    pub fn terms(&self, taxonomy: &str) -> Vec<String> {
        use serde_json::Value;

        match self.extra.get(taxonomy) {
            Some(Value::Array(terms)) => terms.iter().filter_map(scalar_term).collect(),
            Some(term) => scalar_term(term).into_iter().collect(),
            None => vec![],
        }
    }
}

fn scalar_term(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::String(term) => Some(term.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Dialect {
    pub fn delimiter(self) -> &'static str {
        match self {
            Dialect::Yaml => "---",
            Dialect::Toml => "+++",
        }
    }

    fn detect(line: &str) -> Option<Self> {
        [Dialect::Yaml, Dialect::Toml].into_iter()
            .find(|dialect| line.trim_end() == dialect.delimiter())
    }

    /// Parses a metadata block written in this dialect. Blocks with no
    /// content yield the default front matter.
    pub fn parse(self, block: &str) -> Result<FrontMatter> {
        if block.trim().is_empty() {
            return Ok(FrontMatter::default());
        }

        match self {
            Dialect::Yaml => Ok(Yaml::from_str(block)?),
            Dialect::Toml => {
                let mut table: toml::Table = Toml::from_str(block)?;
                stringify_datetimes(&mut table);
                Ok(toml::Value::Table(table).try_into()?)
            }
        }
    }
}

/// TOML has a native datetime type. Front matter keeps dates as the text the
/// author wrote, so datetimes are turned back into strings before mapping.
fn stringify_datetimes(table: &mut toml::Table) {
    for (_, value) in table.iter_mut() {
        stringify_datetime(value);
    }
}

fn stringify_datetime(value: &mut toml::Value) {
    match value {
        toml::Value::Datetime(datetime) => *value = toml::Value::String(datetime.to_string()),
        toml::Value::Table(table) => stringify_datetimes(table),
        toml::Value::Array(values) => values.iter_mut().for_each(stringify_datetime),
        _ => {}
    }
}

/// Splits the line at the head of `input` from the rest, excluding the line
/// terminator.
fn split_line(input: &str) -> (&str, &str) {
    match input.split_once('\n') {
        Some((line, rest)) => (line.strip_suffix('\r').unwrap_or(line), rest),
        None => (input, ""),
    }
}

/// Splits `input` into front matter and body.
///
/// A block opens only when the first line is exactly `---` or `+++` and
/// closes at the next line consisting of the same delimiter. Input without an
/// opening delimiter is all body. An unterminated or unparseable block is
/// reported in [`Extracted::error`] with default front matter and the full
/// input as the body, so no content is ever dropped.
pub fn extract(input: &str) -> Extracted<'_> {
    let content = input.strip_prefix('\u{feff}').unwrap_or(input);
    let (first, mut rest) = split_line(content);
    let Some(dialect) = Dialect::detect(first) else {
        return Extracted { front_matter: FrontMatter::default(), body: input, error: None };
    };

    let block_start = rest;
    let mut block_len = 0;
    let closed = loop {
        if rest.is_empty() {
            break None;
        }

        let (line, next) = split_line(rest);
        if line.trim_end() == dialect.delimiter() {
            break Some(next);
        }

        block_len += rest.len() - next.len();
        rest = next;
    };

    let parsed = match closed {
        Some(body) => dialect.parse(&block_start[..block_len])
            .map(|front_matter| (front_matter, body))
            .chain_with(|| error! {
                "malformed front matter",
                "dialect" => dialect.delimiter(),
            }),
        None => err! {
            "unterminated front matter",
            "expected closing delimiter" => dialect.delimiter(),
        },
    };

    match parsed {
        Ok((front_matter, body)) => Extracted { front_matter, body, error: None },
        Err(e) => Extracted { front_matter: FrontMatter::default(), body: input, error: Some(e) },
    }
}
