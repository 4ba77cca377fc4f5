// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

/// An example showing how to handle positional arguments and options.
use optgram::{OptionSpec, Registry, Result};

fn main() -> Result<()> {
    env_logger::init();

    let mut registry = Registry::new()
        .command("option-and-positional-args")
        .description("Options and positional arguments can be mixed freely.");

    registry.register(OptionSpec::string("add").short('a').list());
    registry.register(OptionSpec::flag("debug").short('d').list());
    registry.register(
        OptionSpec::string("arg")
            .positional()
            .list()
            .description("Any argument that is not an option."),
    );

    let registry = registry.compile()?;

    let result = match registry.run_env()? {
        Some(result) => result,
        None => return Ok(()),
    };

    // Matches are in command-line order, whatever their kind.
    for m in &result {
        match m.name_seen() {
            Some(name) => println!("INFO: found option {} ({})", name, m),
            None => println!("INFO: found positional argument {:?}", m.value().to_string()),
        }
    }

    let all: Vec<String> = result
        .matches_with_defaults()
        .iter()
        .map(|m| m.to_string())
        .collect();

    println!("INFO: all matches, with defaults: {}", all.join(" "));

    Ok(())
}
