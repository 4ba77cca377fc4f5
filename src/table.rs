// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::any::type_name;
use std::borrow::Cow;

use crate::error::CompileError;
use crate::kind::KindTag;
use crate::registry::Registry;
use crate::spec::{Opt, OptionSpec};
use crate::value::{OptValue, Value};

/// Prefix stripped from setter names by [option_name_for()].
const SETTER_PREFIX: &str = "set_";

/// One row of a declarative option table.
///
/// Tables let a program describe its options as data, for example from a
/// `const` array or generated code:
///
/// ```rust
/// use optgram::{KindTag, OptionRow, Registry};
///
/// const OPTIONS: &[OptionRow] = &[
///     OptionRow::new("verbose", KindTag::Flag).short(&['v']),
///     OptionRow::new("output", KindTag::Path).description("Where to write results."),
///     OptionRow::new("file", KindTag::String).positional().list(),
/// ];
///
/// let mut registry = Registry::new();
/// let handles = registry.declare(OPTIONS);
/// let registry = registry.compile().unwrap();
///
/// let result = registry.parse(vec!["-v", "a.txt"]).unwrap();
///
/// assert_eq!(result.value(&handles[0]).unwrap().map(|v| v.to_string()), Some("true".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRow {
    /// Canonical name.
    pub name: Cow<'static, str>,
    /// The built-in kind of the option.
    pub kind: KindTag,
    /// Short names.
    pub short: &'static [char],
    /// Matched by non-option tokens.
    pub positional: bool,
    /// Must be specified.
    pub required: bool,
    /// May be specified more than once.
    pub list: bool,
    /// Overrides the kind's metavar.
    pub metavar: Option<&'static str>,
    /// Help text.
    pub description: &'static str,
}

impl OptionRow {
    /// Create a row for an option with no short names, flags or
    /// description.
    pub const fn new(name: &'static str, kind: KindTag) -> Self {
        OptionRow {
            name: Cow::Borrowed(name),
            kind,
            short: &[],
            positional: false,
            required: false,
            list: false,
            metavar: None,
            description: "",
        }
    }

    /// Create a row whose kind is the default kind for `T`.
    ///
    /// Fails if `T` has no default kind.
    pub fn of<T: OptValue>(name: &str) -> Result<Self, CompileError> {
        let kind = T::default_kind().ok_or_else(|| CompileError::InvalidKind {
            option: name.into(),
            reason: format!("no default option kind for type {}", type_name::<T>()),
        })?;

        Ok(OptionRow {
            name: Cow::Owned(name.into()),
            ..OptionRow::new("", kind)
        })
    }

    /// Specify the short names.
    pub const fn short(mut self, short: &'static [char]) -> Self {
        self.short = short;
        self
    }

    /// Make the option positional.
    pub const fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    /// Make the option required.
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allow the option to be repeated.
    pub const fn list(mut self) -> Self {
        self.list = true;
        self
    }

    /// Specify the metavar.
    pub const fn metavar(mut self, metavar: &'static str) -> Self {
        self.metavar = Some(metavar);
        self
    }

    /// Specify the help text.
    pub const fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    fn spec(&self) -> OptionSpec<Value> {
        let mut spec = OptionSpec::<Value>::with_kind(&self.name, self.kind.kind());

        spec.info.default = self.kind.default_value();

        spec = self.short.iter().fold(spec, |spec, c| spec.short(*c));

        if self.positional {
            spec = spec.positional();
        }

        if self.required {
            spec = spec.required();
        }

        if self.list {
            spec = spec.list();
        }

        if let Some(metavar) = self.metavar {
            spec = spec.metavar(metavar);
        }

        if !self.description.is_empty() {
            spec = spec.description(self.description);
        }

        spec
    }
}

impl Registry {
    /// Register every row of a table, returning the handles in table
    /// order.
    pub fn declare(&mut self, rows: &[OptionRow]) -> Vec<Opt<Value>> {
        rows.iter().map(|row| self.register(row.spec())).collect()
    }
}

/// Derive a long option name from a field or setter name: `set_` is
/// stripped and underscores become dashes.
///
/// ```rust
/// use optgram::option_name_for;
///
/// assert_eq!(option_name_for("set_block_size"), "block-size");
/// assert_eq!(option_name_for("dry_run"), "dry-run");
/// ```
pub fn option_name_for(ident: &str) -> String {
    let name = match ident.strip_prefix(SETTER_PREFIX) {
        Some(rest) if !rest.is_empty() => rest,
        _ => ident,
    };

    name.replace('_', "-")
}
