// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::fs;

use log::debug;

use crate::error::ParseError;
use crate::registry::CompiledRegistry;
use crate::result::{ParseMatch, ParseResult};
use crate::stream::TokenStream;

const LONG_OPT_PREFIX: &str = "--";
const SHORT_OPT_PREFIX: char = '-';
const ARG_FILE_PREFIX: char = '@';
const TERMINATOR: &str = "--";

/// How the next token on the command line is handled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TokenClass {
    /// `--`: the end of the options.
    Terminator,
    /// `@file`: read more arguments from a file.
    ArgFile,
    /// `--name` or `--name=value`.
    Long,
    /// `-abc`: one or more short options.
    ShortCluster,
    /// Anything else.
    Positional,
}

impl TokenClass {
    fn of(token: &str, arg_files: bool) -> Self {
        if token == TERMINATOR {
            TokenClass::Terminator
        } else if arg_files && token.starts_with(ARG_FILE_PREFIX) {
            TokenClass::ArgFile
        } else if token.len() > LONG_OPT_PREFIX.len() && token.starts_with(LONG_OPT_PREFIX) {
            TokenClass::Long
        } else if token.len() > 1 && token.starts_with(SHORT_OPT_PREFIX) {
            TokenClass::ShortCluster
        } else {
            TokenClass::Positional
        }
    }
}

impl CompiledRegistry {
    /// Parse the specified arguments (without the program name), without
    /// checking required options or repeated non-list options.
    pub fn parse_unvalidated<I, S>(&self, args: I) -> Result<ParseResult<'_>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Grammar::new(self, TokenStream::new(args)).run()
    }

    /// Parse the specified arguments (without the program name) and
    /// validate the result.
    ///
    /// # Example
    ///
    /// ```rust
    /// use optgram::{OptionSpec, Registry};
    ///
    /// let mut registry = Registry::new();
    /// let count = registry.register(OptionSpec::integer("count").short('c'));
    /// let registry = registry.compile().unwrap();
    ///
    /// let result = registry.parse(vec!["-c", "0x1F"]).unwrap();
    ///
    /// assert_eq!(result.value(&count).unwrap(), Some(31));
    /// ```
    pub fn parse<I, S>(&self, args: I) -> Result<ParseResult<'_>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let result = self.parse_unvalidated(args)?;

        result.validate()?;

        Ok(result)
    }
}

struct Grammar<'r> {
    registry: &'r CompiledRegistry,
    stream: TokenStream,
    result: ParseResult<'r>,

    /// Number of `@file` directives expanded so far.
    arg_files: usize,
}

impl<'r> Grammar<'r> {
    fn new(registry: &'r CompiledRegistry, stream: TokenStream) -> Self {
        Grammar {
            registry,
            stream,
            result: ParseResult::new(registry),
            arg_files: 0,
        }
    }

    fn run(mut self) -> Result<ParseResult<'r>, ParseError> {
        let settings = *self.registry.settings();

        while let Some(token) = self.stream.consume() {
            match TokenClass::of(&token, settings.arg_files_enabled()) {
                TokenClass::Terminator => {
                    if settings.stops_at_terminator() {
                        debug!("terminator: ignoring {} arguments", self.stream.remaining());
                        break;
                    }

                    debug!("terminator: {} positional arguments", self.stream.remaining());

                    while let Some(token) = self.stream.consume() {
                        self.positional(token)?;
                    }
                }
                TokenClass::ArgFile => self.arg_file(&token)?,
                TokenClass::Long => self.long_option(&token)?,
                TokenClass::ShortCluster => self.short_cluster(&token)?,
                TokenClass::Positional => self.positional(token)?,
            }
        }

        Ok(self.result)
    }

    fn arg_file(&mut self, token: &str) -> Result<(), ParseError> {
        let path = &token[ARG_FILE_PREFIX.len_utf8()..];

        if path.is_empty() {
            return Err(ParseError::ArgFile {
                path: path.into(),
                reason: "no file name specified".into(),
            });
        }

        let limit = self.registry.settings().max_arg_files();

        if self.arg_files >= limit {
            return Err(ParseError::ArgFileLimit { limit });
        }

        self.arg_files += 1;

        let contents = fs::read_to_string(path).map_err(|e| ParseError::ArgFile {
            path: path.into(),
            reason: e.to_string(),
        })?;

        let tokens: Vec<&str> = contents.lines().filter(|l| !l.is_empty()).collect();

        debug!("argument file {:?}: {} arguments", path, tokens.len());

        self.stream.prepend_all(tokens);

        Ok(())
    }

    fn long_option(&mut self, token: &str) -> Result<(), ParseError> {
        let body = &token[LONG_OPT_PREFIX.len()..];

        let (name, tail) = match body.split_once('=') {
            Some((name, tail)) => (name, Some(tail)),
            None => (body, None),
        };

        let name_seen = format!("{}{}", LONG_OPT_PREFIX, name);

        let index = self
            .registry
            .long_index(name)
            .ok_or_else(|| ParseError::UnknownLongOption {
                token: name_seen.clone(),
            })?;

        let info = self.registry.info(index);

        debug!("long option {:?} -> {}", name_seen, info.name());

        // The value of "--name=value" becomes the next token.
        let before = tail.map(|tail| {
            self.stream.prepend(tail);
            self.stream.remaining()
        });

        let value = info.kind().convert(&mut self.stream, &info.label())?;

        if let (Some(tail), Some(before)) = (tail, before) {
            if self.stream.remaining() >= before {
                return Err(ParseError::UnexpectedArgument {
                    option: info.label(),
                    value: tail.into(),
                });
            }
        }

        self.result
            .add_match(ParseMatch::new(info, index, Some(name_seen), value));

        Ok(())
    }

    fn short_cluster(&mut self, token: &str) -> Result<(), ParseError> {
        let mut matches = Vec::new();

        debug!("short option cluster {:?}", token);

        // Each option reads its own arguments in turn, so "-ab x y" gives
        // 'x' to 'a' and 'y' to 'b'.
        for c in token.chars().skip(1) {
            let index = self
                .registry
                .short_index(c)
                .ok_or_else(|| ParseError::UnknownShortOption {
                    option: c,
                    cluster: token.into(),
                })?;

            let info = self.registry.info(index);

            let value = info.kind().convert(&mut self.stream, &info.label())?;

            let name_seen = format!("{}{}", SHORT_OPT_PREFIX, c);

            matches.push(ParseMatch::new(info, index, Some(name_seen), value));
        }

        self.result.add_matches(matches);

        Ok(())
    }

    fn positional(&mut self, token: String) -> Result<(), ParseError> {
        let index = match self.registry.positional_index() {
            Some(index) => index,
            None => return Err(ParseError::NoPositional { token }),
        };

        let info = self.registry.info(index);

        debug!("positional argument {:?} -> {}", token, info.name());

        // The option's own conversion reads the token.
        self.stream.prepend(token.as_str());
        let before = self.stream.remaining();

        let value = info.kind().convert(&mut self.stream, &info.label())?;

        if self.stream.remaining() >= before {
            return Err(ParseError::UnexpectedArgument {
                option: info.label(),
                value: token,
            });
        }

        self.result.add_match(ParseMatch::new(info, index, None, value));

        Ok(())
    }
}
