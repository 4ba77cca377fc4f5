// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

#![deny(missing_docs)]
#![forbid(unsafe_code)]

//! Typed command-line argument parsing with a GNU `getopt`-style grammar.
//!
//! To understand what is and is not supported, see the
//! [Limitations](#limitations) section.
//!
//! ---
//!
//! Table of contents:
//!
//! * [Overview](#overview)
//! * [Quickstart](#quickstart)
//! * [Examples](#examples)
//! * [Details](#details)
//! * [Terminology](#terminology)
//! * [Summary of features and behaviour](#summary-of-features-and-behaviour)
//! * [Limitations](#limitations)
//!
//! ---
//!
//! # Overview
//!
//! Options are described up front, each with a kind that decides how many
//! arguments it takes and what type its value has. The command-line is
//! then parsed into a [ParseResult] holding every match in the order it
//! was found, which is queried with the typed handles returned when the
//! options were registered.
//!
//! # Quickstart
//!
//! > **Note:** If you are not familiar with command-line handling,
//! > see the [terminology](#terminology) section.
//!
//! 1. Create a [Registry] and register an [OptionSpec] for each option
//!    you want to support. Keep the [Opt] handle that `register()`
//!    returns.
//!
//!    ```rust
//!    use optgram::{OptionSpec, Registry};
//!
//!    let mut registry = Registry::new().command("myprog");
//!
//!    // Support "--count=N", "--count N" and "-c N".
//!    let count = registry.register(OptionSpec::integer("count").short('c').default_value(1));
//!
//!    // Support "-v" and "--verbose".
//!    let verbose = registry.register(OptionSpec::flag("verbose").short('v'));
//!
//!    // Collect all non-option arguments.
//!    let files = registry.register(OptionSpec::path("file").positional().list());
//!    ```
//!
//! 1. Compile the registry. This fails if two options share a name.
//!
//!    ```rust
//!    # use optgram::{OptionSpec, Registry};
//!    #
//!    # let mut registry = Registry::new();
//!    # let count = registry.register(OptionSpec::integer("count").short('c'));
//!    #
//!    let registry = registry.compile().unwrap();
//!    ```
//!
//! 1. Parse the command-line and query the result with the handles.
//!
//!    ```rust
//!    # use optgram::{OptionSpec, Registry};
//!    #
//!    # let mut registry = Registry::new();
//!    # let count = registry.register(OptionSpec::integer("count").short('c').default_value(1));
//!    # let verbose = registry.register(OptionSpec::flag("verbose").short('v'));
//!    # let files = registry.register(OptionSpec::path("file").positional().list());
//!    # let registry = registry.compile().unwrap();
//!    #
//!    let result = registry.parse(vec!["-vc", "3", "a.txt", "b.txt"]).unwrap();
//!
//!    assert_eq!(result.value(&count).unwrap(), Some(3));
//!    assert_eq!(result.value(&verbose).unwrap(), Some(true));
//!    assert_eq!(result.values(&files).unwrap().len(), 2);
//!    ```
//!
//! Most programs will want [CompiledRegistry::run_env()] rather than
//! [CompiledRegistry::parse()]: it reads the program's arguments, and
//! prints an error and the help text (or just the help text for `--help`)
//! rather than returning a result the program can use.
//!
//! # Examples
//!
//! ```rust
//! use optgram::{OptionSpec, Registry, Result};
//!
//! fn main() -> Result<()> {
//!     let mut registry = Registry::new()
//!         .command("greet")
//!         .description("Say hello.");
//!
//!     let name = registry.register(OptionSpec::string("name").short('n').required());
//!     let times = registry.register(OptionSpec::integer("times").default_value(1));
//!     let shout = registry.register(OptionSpec::flag("shout"));
//!
//!     let registry = registry.compile()?;
//!
//!     let result = match registry.run(&mut std::io::stderr(), vec!["-n", "world", "--times=2"])? {
//!         Some(result) => result,
//!         None => return Ok(()),
//!     };
//!
//!     for _ in 0..result.value_or(&times, 1)? {
//!         let mut greeting = format!("hello, {}", result.value_or(&name, String::new())?);
//!
//!         if result.value_or(&shout, false)? {
//!             greeting = greeting.to_uppercase();
//!         }
//!
//!         println!("{}", greeting);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! For further examples, try out the programs in the `demos/` directory:
//!
//! ```bash
//! $ cargo run --example simple -- -a foo -d -a bar -d -a baz
//! $ cargo run --example positional-args-only -- one two "hello world" three "foo bar" four "the end"
//! $ cargo run --example option-and-positional-args -- "posn 1" -d "posn 2" -a "hello world" -a "foo bar" "the end" -d
//! $ RUST_LOG=optgram=debug cargo run --example error-handler -- --level 0x10 -- -x
//! ```
//!
//! # Details
//!
//! ## Terminology
//!
//! > **Note:** For further details, see `getopt(3)`.
//!
//! - An "argument" is a value passed to a program on the command-line.
//!
//!   Arguments can be "options" or "positional arguments".
//!
//! - A "long option" starts with two dashes (`--verbose`). Long names are
//!   case-insensitive and an option may have several. The option's
//!   argument can be given as the next argument (`--out file`) or joined
//!   with an equals sign (`--out=file`).
//!
//! - A "short option" is a dash followed by a single character (`-v`).
//!   Short names are case-sensitive. Several short options can be
//!   combined ("clustered") into one argument: `-vx` is `-v -x`. Each
//!   option in a cluster takes its own argument in turn, so `-ab x y`
//!   gives `x` to `-a` and `y` to `-b`.
//!
//! - Options that do not take an argument are called "flags".
//!
//! - A "positional argument" is an argument that is not an option. At most
//!   one option can be positional; it receives every positional argument.
//!
//! - The special argument `--` means "end of all options": everything after
//!   it is a positional argument, even if it starts with a dash.
//!
//! - An argument of the form `@file` is replaced by the lines of `file`,
//!   one argument per line (empty lines are ignored).
//!
//! ## Option kinds
//!
//! | Constructor                   | Value type | Arguments | Example                  |
//! |-------------------------------|------------|-----------|--------------------------|
//! | [OptionSpec::string()]        | `String`   | 1         | `--name=bob`             |
//! | [OptionSpec::integer()]       | `i64`      | 1         | `-n 0x1F`, `-n 017`      |
//! | [OptionSpec::double()]        | `f64`      | 1         | `--ratio=1.5e3`          |
//! | [OptionSpec::boolean()]       | `bool`     | 1         | `--sure=true`            |
//! | [OptionSpec::flag()]          | `bool`     | 0         | `--verbose`              |
//! | [OptionSpec::enumeration()]   | `String`   | 1         | `--mode=fast`            |
//! | [OptionSpec::path()]          | `PathBuf`  | 1         | `--out=dir\file.txt`     |
//! | [OptionSpec::uri()]           | `Url`      | 1         | `--src=C:\data\in.csv`   |
//! | [OptionSpec::custom()]        | any        | any       |                          |
//!
//! ## Errors
//!
//! - [CompileError]: the options themselves are wrong (a programming
//!   error), reported by [Registry::compile()].
//! - [ParseError]: the command-line is wrong (a user error).
//! - [UseError]: a [ParseResult] was queried incorrectly (a programming
//!   error), for example asking for the single value of an option that was
//!   specified twice.
//!
//! ## Logging
//!
//! The parser logs each argument it handles at `debug` level using the
//! [`log`](https://crates.io/crates/log) crate.
//!
//! # Summary of features and behaviour
//!
//! - Typed values: no string conversion in the caller.
//! - Options and positional arguments can be intermingled.
//! - Matches are recorded in command-line order.
//! - Options can be required, and can be allowed to repeat.
//! - Options can have default values.
//! - Every registry has a `--help` (`-h`, `-?`) option, and generates a
//!   help statement.
//! - Options can be declared with a table ([OptionRow]) rather than code.
//!
//! # Limitations
//!
//! - Options and their arguments must be separate (or joined with `=`
//!   for long options).
//!
//!   **Example:** '`-d 3`' is valid, but '`-d3`' is not.
//!
//! - Options with optional arguments are not supported.
//!
//!   **Explanation:** An option either always takes an argument or never
//!   does.
//!
//! - Only one option can be positional.

mod error;
mod help;
mod kind;
mod parser;
mod registry;
mod result;
mod spec;
mod stream;
mod table;
mod value;

pub use error::{CompileError, Error, ParseError, Result, UseError};
pub use kind::{normalise_path, parse_boolean, parse_integer, parse_uri, Converter, Kind, KindTag};
pub use registry::{
    get_args, CompiledRegistry, Registry, Settings, DEFAULT_ARG_FILE_LIMIT, HELP_OPTION,
};
pub use result::{ParseMatch, ParseResult};
pub use spec::{Opt, OptionInfo, OptionRef, OptionSpec};
pub use stream::TokenStream;
pub use table::{option_name_for, OptionRow};
pub use value::{OptValue, Value};
