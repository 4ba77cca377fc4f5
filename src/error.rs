// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use thiserror::Error;

/// A defect in the set of option specifications.
///
/// Raised by `Registry::compile()` before any argument is read. A registry
/// that fails to compile cannot be used for parsing.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum CompileError {
    /// Two options share a long name (compared case-insensitively).
    #[error("multiple options with same name '{name}': {first} and {second}")]
    DuplicateLongName {
        /// The (case-folded) long name.
        name: String,
        /// The option registered first.
        first: String,
        /// The option registered second.
        second: String,
    },

    /// Two options share a short name.
    #[error("multiple options with same short name '{name}': {first} and {second}")]
    DuplicateShortName {
        /// The short name.
        name: char,
        /// The option registered first.
        first: String,
        /// The option registered second.
        second: String,
    },

    /// More than one option claims the positional slot.
    #[error("multiple positional options: {first} and {second}")]
    DuplicatePositional {
        /// The option registered first.
        first: String,
        /// The option registered second.
        second: String,
    },

    /// A long or short name that can never be matched on a command line.
    #[error("invalid name {name:?} for option {option}: {reason}")]
    InvalidName {
        /// The option carrying the name.
        option: String,
        /// The offending name.
        name: String,
        /// Why the name is rejected.
        reason: String,
    },

    /// The option kind cannot be built as configured.
    #[error("cannot construct option {option}: {reason}")]
    InvalidKind {
        /// The option (or type) concerned.
        option: String,
        /// Why the kind is rejected.
        reason: String,
    },
}

/// A defect in the argument vector relative to a valid registry.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ParseError {
    //------------------------------
    // Grammar errors
    //------------------------------
    /// A `--name` token with no matching long name.
    #[error("don't understand option '{token}'")]
    UnknownLongOption {
        /// The option token as seen (without any `=value` tail).
        token: String,
    },

    /// A character in a short option cluster with no matching short name.
    #[error("don't understand option '-{option}' in option list '{cluster}'")]
    UnknownShortOption {
        /// The unknown short name.
        option: char,
        /// The whole cluster token, for context.
        cluster: String,
    },

    /// A non-option token but no positional option is registered.
    #[error("don't understand option '{token}': no positional arguments allowed")]
    NoPositional {
        /// The positional token.
        token: String,
    },

    /// An `@file` directive could not be expanded.
    #[error("cannot read argument file '{path}': {reason}")]
    ArgFile {
        /// The file name after the `@`.
        path: String,
        /// The underlying failure.
        reason: String,
    },

    /// Too many `@file` directives were expanded in a single parse.
    #[error("too many argument files (limit is {limit})")]
    ArgFileLimit {
        /// The configured expansion limit.
        limit: usize,
    },

    //------------------------------
    // Conversion errors
    //------------------------------
    /// The token does not convert to the option's kind.
    #[error("bad value '{value}' for option {option}: expected {expected}")]
    BadValue {
        /// The option being converted.
        option: String,
        /// The offending text.
        value: String,
        /// What the kind accepts.
        expected: String,
    },

    /// The option needs an argument but the command line ended.
    #[error("missing argument for option {option}")]
    MissingArgument {
        /// The option lacking its argument.
        option: String,
    },

    /// `--name=value` was given for an option that takes no argument.
    #[error("option {option} does not take an argument (got '{value}')")]
    UnexpectedArgument {
        /// The option.
        option: String,
        /// The unwanted value.
        value: String,
    },

    //------------------------------
    // Validation errors
    //------------------------------
    /// A required option was not specified.
    #[error("missing required option {option}")]
    MissingRequired {
        /// The missing option.
        option: String,
    },

    /// A non-list option was specified more than once.
    #[error("{option} can only be specified once, was specified {count} times")]
    TooManyMatches {
        /// The option.
        option: String,
        /// Number of matches found.
        count: usize,
    },
}

impl ParseError {
    /// Convenience constructor for conversion failures, for use by
    /// custom option kinds.
    pub fn bad_value(option: &str, value: &str, expected: &str) -> Self {
        ParseError::BadValue {
            option: option.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// A defect in how the caller queries a `ParseResult`.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum UseError {
    /// A singleton value was requested for an option with several matches.
    #[error("ambiguous: asked for singleton value of option {option}, which has {count} matches")]
    Ambiguous {
        /// The option.
        option: String,
        /// Number of matches found.
        count: usize,
    },

    /// The option handle belongs to a different registry.
    #[error("option {option} does not belong to this registry")]
    ForeignOption {
        /// Canonical name of the option.
        option: String,
    },

    /// The stored value is not of the requested type.
    #[error("value of option {option} is not a {expected}")]
    TypeMismatch {
        /// The option.
        option: String,
        /// The requested type.
        expected: String,
    },
}

/// The error type.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// Option specification error (programmer error).
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Command-line error (user error).
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Result query error (programmer error).
    #[error(transparent)]
    Use(#[from] UseError),

    /// Help or error text could not be written.
    #[error("failed to write output: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

/// Convenience type that allows a function to be defined as returning a
/// [Result], but which only requires the success type to be specified,
/// defaulting the error type to this crates `Error` type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
