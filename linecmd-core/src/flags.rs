//! Declarative flag parsing for a command's own arguments.
//!
//! A [`FlagParser`] walks tokens left to right and matches each one against
//! the aliases of its declared [`FlagSpec`]s. Value flags consume the next
//! token verbatim; switches record an empty string.

use std::fmt::Write as _;

use crate::error::{FlagError, SpecError};

/// A single flag a command accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlagSpec {
    name: String,
    aliases: Vec<String>,
    description: String,
    takes_value: bool,
    required: bool,
}

impl FlagSpec {
    fn new<I, S>(name: &str, aliases: I, takes_value: bool) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if name.is_empty() {
            return Err(SpecError::EmptyField { field: "name" });
        }
        let aliases: Vec<String> = aliases.into_iter().map(Into::into).collect();
        if aliases.is_empty() {
            return Err(SpecError::NoAliases);
        }
        if let Some(index) = aliases.iter().position(String::is_empty) {
            return Err(SpecError::EmptyAlias { index });
        }
        Ok(Self {
            name: name.to_string(),
            aliases,
            description: String::new(),
            takes_value,
            required: false,
        })
    }

    /// A flag that consumes the following token as its value.
    pub fn value<I, S>(name: &str, aliases: I) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, aliases, true)
    }

    /// A boolean flag with no value.
    pub fn switch<I, S>(name: &str, aliases: I) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, aliases, false)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The alias used to refer to this flag in diagnostics.
    pub fn primary_alias(&self) -> &str {
        &self.aliases[0]
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn takes_value(&self) -> bool {
        self.takes_value
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn matches(&self, token: &str) -> bool {
        self.aliases.iter().any(|alias| alias == token)
    }
}

/// Flags found by [`FlagParser::parse`], indexed like the parser's declarations.
#[derive(Debug, Clone)]
pub struct ParsedFlags<'p> {
    flags: &'p [FlagSpec],
    values: Vec<Option<String>>,
}

impl<'p> ParsedFlags<'p> {
    fn position(&self, key: &str) -> Option<usize> {
        self.flags
            .iter()
            .position(|flag| flag.name == key)
            .or_else(|| self.flags.iter().position(|flag| flag.matches(key)))
    }

    /// Value of the flag named `key` or having `key` as an alias.
    ///
    /// Names take precedence over aliases when one flag's name is another's alias.
    ///
    /// Switches that were present yield `Some("")`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key)
            .and_then(|i| self.values[i].as_deref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present flags with their values, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'p FlagSpec, &str)> + '_ {
        self.flags
            .iter()
            .zip(&self.values)
            .filter_map(|(flag, value)| value.as_deref().map(|v| (flag, v)))
    }
}

/// Parses tokens against a fixed set of declared flags.
#[derive(Debug, Clone, Default)]
pub struct FlagParser {
    flags: Vec<FlagSpec>,
}

impl FlagParser {
    pub fn new<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = FlagSpec>,
    {
        Self {
            flags: flags.into_iter().collect(),
        }
    }

    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }

    fn find(&self, token: &str) -> Option<usize> {
        self.flags.iter().position(|flag| flag.matches(token))
    }

    /// Parse `tokens`.
    ///
    /// An unknown token aborts immediately, before required flags are checked.
    /// Missing required flags are reported together.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ParsedFlags<'_>, FlagError> {
        let mut values: Vec<Option<String>> = vec![None; self.flags.len()];
        let mut tokens = tokens.iter().map(AsRef::as_ref);

        while let Some(token) = tokens.next() {
            let i = self.find(token).ok_or_else(|| FlagError::UnknownArgument {
                token: token.to_string(),
            })?;
            let value = if self.flags[i].takes_value {
                tokens.next().ok_or_else(|| FlagError::MissingValue {
                    flag: token.to_string(),
                })?
            } else {
                ""
            };
            values[i] = Some(value.to_string());
        }

        let missing: Vec<String> = self
            .flags
            .iter()
            .zip(&values)
            .filter(|(flag, value)| flag.required && value.is_none())
            .map(|(flag, _)| flag.primary_alias().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(FlagError::MissingRequired { flags: missing });
        }

        Ok(ParsedFlags {
            flags: &self.flags,
            values,
        })
    }

    /// One line per declared flag, e.g. `  --name, -n <value>  Who to greet (required)`.
    pub fn usage(&self) -> String {
        let heads: Vec<String> = self
            .flags
            .iter()
            .map(|flag| {
                let mut head = flag.aliases.join(", ");
                if flag.takes_value {
                    head.push_str(" <value>");
                }
                head
            })
            .collect();
        let width = heads.iter().map(|h| h.chars().count()).max().unwrap_or(0);

        let mut out = String::new();
        for (flag, head) in self.flags.iter().zip(&heads) {
            let mut line = format!("  {head:<width$}");
            if !flag.description.is_empty() {
                line.push_str("  ");
                line.push_str(&flag.description);
            }
            if flag.required {
                line.push_str(" (required)");
            }
            let _ = writeln!(out, "{}", line.trim_end());
        }
        out
    }
}
