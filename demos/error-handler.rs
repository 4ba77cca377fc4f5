// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

/// An example showing how to handle errors without `run()`, and how a
/// custom option kind reports bad values.
use std::process::exit;

use optgram::{get_args, OptionSpec, ParseError, Registry, Result};

#[derive(Clone, Debug, PartialEq)]
struct Vowel(char);

impl optgram::OptValue for Vowel {
    fn from_value(value: &optgram::Value) -> Option<Self> {
        value.downcast_ref::<Vowel>().cloned()
    }

    fn into_value(self) -> optgram::Value {
        optgram::Value::custom(self)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut registry = Registry::new().command("error-handler");

    // Only accept single vowels.
    let vowel = registry.register(
        OptionSpec::custom("vowel", |stream, option| {
            let text = stream.require(option)?;

            match text.as_str() {
                "a" | "e" | "i" | "o" | "u" => Ok(Vowel(text.chars().next().unwrap_or('a'))),
                _ => Err(ParseError::bad_value(option, &text, "a vowel")),
            }
        })
        .short('v')
        .metavar("VOWEL")
        .list(),
    );

    let level = registry.register(OptionSpec::integer("level").short('l').default_value(0));
    let rest = registry.register(OptionSpec::string("rest").positional().list());

    let registry = registry.compile()?;

    let result = match registry.parse(get_args()) {
        Ok(result) => result,
        Err(ParseError::UnknownLongOption { token }) => {
            eprintln!("ERROR: no such option: {} (try --help)", token);
            exit(1);
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            eprintln!("{}", registry.usage());
            exit(1);
        }
    };

    if result.is_help_requested() {
        print!("{}", registry.help());
        return Ok(());
    }

    println!("INFO: vowels: {:?}", result.values(&vowel)?);
    println!("INFO: level: {}", result.value_or(&level, 0)?);
    println!("INFO: rest: {:?}", result.values(&rest)?);

    Ok(())
}
