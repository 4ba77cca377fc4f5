// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

/// An example showing how to handle positional arguments (like `echo(1)`)
/// only.
use optgram::{OptionSpec, Registry, Result};

fn main() -> Result<()> {
    env_logger::init();

    let mut registry = Registry::new().command("positional-args-only");

    let words = registry.register(
        OptionSpec::string("word")
            .positional()
            .list()
            .metavar("WORD")
            .description("A word to echo."),
    );

    let registry = registry.compile()?;

    let result = match registry.run_env()? {
        Some(result) => result,
        None => return Ok(()),
    };

    for (i, word) in result.values(&words)?.iter().enumerate() {
        println!("INFO: positional argument {}: {:?}", i, word);
    }

    Ok(())
}
