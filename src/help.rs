// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::io::{self, Write};

use crate::error::Result;
use crate::registry::{get_args, CompiledRegistry};
use crate::result::ParseResult;
use crate::spec::{long_name_usage, OptionInfo};

const USAGE_PREFIX_SPACES: &str = "    ";

/// Column at which option descriptions start.
const DESCRIPTION_COLUMN: usize = 30;

const LINE_WIDTH: usize = 78;

/// Shown for a positional option without a metavar.
const POSITIONAL_PLACEHOLDER: &str = "ARG";

/// Single form of an option for the usage line.
fn simple_usage(option: &OptionInfo) -> String {
    if option.is_positional() {
        option.metavar().unwrap_or(POSITIONAL_PLACEHOLDER).into()
    } else {
        option.label()
    }
}

/// Usage form with arity decorations:
///
/// - `X`: required.
/// - `[ X ]`: optional.
/// - `( X )+`: required, may be repeated.
/// - `( X )*`: optional, may be repeated.
fn decorated_usage(option: &OptionInfo) -> String {
    let usage = simple_usage(option);

    match (option.is_required(), option.is_list()) {
        (true, false) => usage,
        (false, false) => format!("[ {} ]", usage),
        (true, true) => format!("( {} )+", usage),
        (false, true) => format!("( {} )*", usage),
    }
}

/// Every way the option can be written.
fn exhaustive_usage(option: &OptionInfo) -> String {
    let mut forms: Vec<String> = option
        .long_names()
        .iter()
        .map(|name| long_name_usage(name, option.metavar()))
        .collect();

    for c in option.short_names() {
        let form = match option.metavar() {
            Some(metavar) => format!("-{} {}", c, metavar),
            None => format!("-{}", c),
        };

        forms.push(form);
    }

    if option.is_positional() {
        forms.push(simple_usage(option));
    }

    forms.join(", ")
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::<String>::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }

        if !line.is_empty() {
            line.push(' ');
        }

        line.push_str(word);
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines
}

impl CompiledRegistry {
    /// The one line usage statement.
    pub fn usage(&self) -> String {
        let mut usage = format!("Usage: {}", self.command_name());

        let help = self.option(self.help_option()).ok().map(|o| o.name());

        for option in self.options().filter(|o| Some(o.name()) != help) {
            usage.push(' ');
            usage.push_str(&decorated_usage(option));
        }

        usage
    }

    /// The usage statement, the program description and a summary of
    /// every option.
    pub fn help(&self) -> String {
        let mut lines = vec![self.usage()];

        if let Some(description) = self.description() {
            lines.push("".into());

            for line in wrap(description, LINE_WIDTH - USAGE_PREFIX_SPACES.len()) {
                lines.push(format!("{}{}", USAGE_PREFIX_SPACES, line));
            }
        }

        lines.push("".into());
        lines.push("Options:".into());

        let indent = " ".repeat(DESCRIPTION_COLUMN);

        for option in self.options() {
            let usage = format!("{}{}", USAGE_PREFIX_SPACES, exhaustive_usage(option));

            let description = option
                .description()
                .map(|d| wrap(d, LINE_WIDTH - DESCRIPTION_COLUMN))
                .unwrap_or_default();

            let mut description = description.into_iter();

            // Long forms get the description on the next line.
            if usage.len() < DESCRIPTION_COLUMN {
                match description.next() {
                    Some(first) => lines.push(format!("{:<width$}{}", usage, first, width = DESCRIPTION_COLUMN)),
                    None => lines.push(usage),
                }
            } else {
                lines.push(usage);
            }

            for line in description {
                lines.push(format!("{}{}", indent, line));
            }
        }

        lines.push("".into());

        lines.join("\n")
    }

    /// Write the text returned by [CompiledRegistry::help()].
    pub fn write_help<W>(&self, writer: &mut W) -> Result<()>
    where
        W: Write,
    {
        writer.write_all(self.help().as_bytes())?;

        Ok(())
    }

    /// Parse and validate the arguments, handling help and errors.
    ///
    /// - If the arguments are invalid, an error message and the help text
    ///   are written to `writer` and `Ok(None)` is returned.
    /// - If help was requested, the help text is written to `writer` and
    ///   `Ok(None)` is returned, even if other options are missing.
    /// - Otherwise the result is returned.
    ///
    /// An error is only returned if `writer` fails.
    pub fn run<W, I, S>(&self, writer: &mut W, args: I) -> Result<Option<ParseResult<'_>>>
    where
        W: Write,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let checked = self.parse_unvalidated(args).and_then(|result| {
            if !result.is_help_requested() {
                result.validate()?;
            }

            Ok(result)
        });

        match checked {
            Ok(result) if result.is_help_requested() => {
                log::debug!("help requested");

                self.write_help(writer)?;

                Ok(None)
            }
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                writeln!(writer, "ERROR: {}", e)?;
                writeln!(writer)?;

                self.write_help(writer)?;

                Ok(None)
            }
        }
    }

    /// Like [CompiledRegistry::run()], using the program's arguments and
    /// writing to standard error.
    pub fn run_env(&self) -> Result<Option<ParseResult<'_>>> {
        self.run(&mut io::stderr(), get_args())
    }
}
