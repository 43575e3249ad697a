//! Directory group name to inventory site name mapping.
//!
//! The mapping arrives as a single string argument. Two notations are
//! accepted: a JSON object, and the dictionary-literal form that existing
//! management policies already pass (`{'Group': 'Site'}`), which allows
//! single-quoted strings and a trailing comma.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maps a matched group's name to the site its devices belong in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteMapping {
    entries: BTreeMap<String, String>,
}

impl SiteMapping {
    /// Build from already separated entries. Rejects empty mappings and
    /// blank keys or site names.
    pub fn from_entries(entries: BTreeMap<String, String>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::InvalidSiteMapping(
                "mapping has no entries".to_string(),
            ));
        }
        for (group, site) in &entries {
            if group.trim().is_empty() {
                return Err(ConfigError::InvalidSiteMapping(
                    "mapping contains an empty group name".to_string(),
                ));
            }
            if site.trim().is_empty() {
                return Err(ConfigError::InvalidSiteMapping(format!(
                    "group '{}' maps to an empty site name",
                    group
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Parse the string form of the mapping.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let trimmed = input.trim();
        let entries = match serde_json::from_str::<BTreeMap<String, String>>(trimmed) {
            Ok(entries) => entries,
            Err(_) => LiteralParser::new(trimmed).parse()?,
        };
        Self::from_entries(entries)
    }

    /// Target site for `group`, if mapped.
    pub fn site_for(&self, group: &str) -> Option<&str> {
        self.entries.get(group).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct LiteralParser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> LiteralParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn parse(mut self) -> Result<BTreeMap<String, String>, ConfigError> {
        let mut entries = BTreeMap::new();

        self.skip_whitespace();
        self.expect('{')?;
        loop {
            self.skip_whitespace();
            if self.chars.peek() == Some(&'}') {
                self.chars.next();
                break;
            }

            let key = self.string()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.string()?;

            if entries.contains_key(&key) {
                return Err(invalid(format!("duplicate group '{}'", key)));
            }
            entries.insert(key, value);

            self.skip_whitespace();
            match self.chars.next() {
                Some(',') => continue,
                Some('}') => break,
                Some(other) => return Err(invalid(format!("unexpected '{}'", other))),
                None => return Err(invalid("unterminated mapping")),
            }
        }

        self.skip_whitespace();
        if let Some(trailing) = self.chars.next() {
            return Err(invalid(format!("unexpected '{}' after mapping", trailing)));
        }
        Ok(entries)
    }

    fn string(&mut self) -> Result<String, ConfigError> {
        let quote = match self.chars.next() {
            Some(q @ ('\'' | '"')) => q,
            Some(other) => return Err(invalid(format!("expected quoted string, found '{}'", other))),
            None => return Err(invalid("expected quoted string")),
        };

        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => return Ok(value),
                Some('\\') => match self.chars.next() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => value.push(c),
                    Some(c) => {
                        value.push('\\');
                        value.push(c);
                    }
                    None => return Err(invalid("unterminated string")),
                },
                Some(c) => value.push(c),
                None => return Err(invalid("unterminated string")),
            }
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), ConfigError> {
        match self.chars.next() {
            Some(c) if c == wanted => Ok(()),
            Some(c) => Err(invalid(format!("expected '{}', found '{}'", wanted, c))),
            None => Err(invalid(format!("expected '{}'", wanted))),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidSiteMapping(message.into())
}
