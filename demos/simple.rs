// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

/// A simple example showing how to handle options that need arguments.
use optgram::{OptionSpec, Registry, Result};

fn main() -> Result<()> {
    env_logger::init();

    let mut registry = Registry::new()
        .command("simple")
        .description("Show the options that were specified, in order.");

    // Support "-a <value>", which may be repeated.
    let a = registry.register(
        OptionSpec::string("alpha")
            .short('a')
            .list()
            .description("Any string value."),
    );

    // Support "-b <number>".
    let b = registry.register(
        OptionSpec::integer("beta")
            .short('b')
            .default_value(7)
            .description("An integer (decimal, 0x hex, 0b binary or 0 octal)."),
    );

    // Support "-d" flag option, which may also be repeated.
    let d = registry.register(
        OptionSpec::flag("debug")
            .short('d')
            .list()
            .description("Flag option."),
    );

    let registry = registry.compile()?;

    let result = match registry.run_env()? {
        Some(result) => result,
        None => return Ok(()),
    };

    for m in &result {
        println!(
            "INFO: option: {:?}, seen as: {:?}, value: {}",
            m.option().name(),
            m.name_seen(),
            m.value()
        );
    }

    println!("INFO: -a values: {:?}", result.values(&a)?);
    println!("INFO: -b value: {:?}", result.value(&b)?);
    println!("INFO: -d count: {}", result.matches_for(&d)?.len());

    Ok(())
}
