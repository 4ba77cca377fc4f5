// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::collections::{hash_map::Entry, HashMap};
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use crate::error::{CompileError, UseError};
use crate::spec::{Opt, OptionInfo, OptionRef, OptionSpec};

/// Canonical name of the built-in help option.
pub const HELP_OPTION: &str = "help";

const HELP_SHORT_NAMES: [char; 2] = ['h', '?'];
const HELP_DESCRIPTION: &str = "Print an informative help message.";

/// Default number of `@file` expansions allowed per parse.
pub const DEFAULT_ARG_FILE_LIMIT: usize = 64;

/// Command name used in usage text if none is set and the process
/// arguments do not provide one.
const DEFAULT_COMMAND: &str = "program";

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Get a list of all command-line arguments specified to the program with
/// the program name (the first argument) removed.
pub fn get_args() -> Vec<String> {
    env::args().skip(1).collect()
}

/// Settings used to control the parsers behaviour.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Settings {
    /// If set, tokens starting with `@` are not argument file directives.
    no_arg_files: bool,

    /// Maximum number of `@file` expansions per parse.
    arg_file_limit: usize,

    /// If set, tokens after `--` are ignored rather than being
    /// treated as positional arguments.
    stop_at_terminator: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            no_arg_files: false,
            arg_file_limit: DEFAULT_ARG_FILE_LIMIT,
            stop_at_terminator: false,
        }
    }
}

impl Settings {
    /// Create a new settings object.
    pub fn new() -> Self {
        Settings::default()
    }

    /// Treat tokens starting with `@` as ordinary arguments rather than
    /// as the name of a file to read further arguments from.
    pub fn no_arg_files(self) -> Self {
        Settings {
            no_arg_files: true,
            ..self
        }
    }

    /// Specify how many `@file` directives may be expanded during a
    /// single parse (including directives found inside argument files).
    pub fn arg_file_limit(self, arg_file_limit: usize) -> Self {
        Settings {
            arg_file_limit,
            ..self
        }
    }

    /// Stop parsing at `--`, silently ignoring any arguments after it.
    ///
    /// By default, every argument after `--` is handed to the positional
    /// option, even if it starts with a dash.
    pub fn stop_at_terminator(self) -> Self {
        Settings {
            stop_at_terminator: true,
            ..self
        }
    }

    pub(crate) fn arg_files_enabled(&self) -> bool {
        !self.no_arg_files
    }

    pub(crate) fn max_arg_files(&self) -> usize {
        self.arg_file_limit
    }

    pub(crate) fn stops_at_terminator(&self) -> bool {
        self.stop_at_terminator
    }
}

/// The set of options a program supports, before compilation.
///
/// Every registry starts out with a `--help` flag (`-h`, `-?`).
///
/// A clone is a separate registry: handles from one are foreign to the
/// other.
#[derive(Debug)]
pub struct Registry {
    id: u64,
    command: Option<String>,
    description: Option<String>,
    settings: Settings,
    options: Vec<OptionInfo>,
    help: Opt<bool>,
}

impl Clone for Registry {
    fn clone(&self) -> Self {
        let id = NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed);

        let help = Opt::new(
            OptionRef {
                registry: id,
                index: self.help.option.index,
            },
            HELP_OPTION,
        );

        Registry {
            id,
            command: self.command.clone(),
            description: self.description.clone(),
            settings: self.settings,
            options: self.options.clone(),
            help,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a new registry containing only the help option.
    pub fn new() -> Self {
        let id = NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed);

        let help_spec = HELP_SHORT_NAMES
            .iter()
            .fold(OptionSpec::flag(HELP_OPTION), |spec, c| spec.short(*c))
            .description(HELP_DESCRIPTION);

        let help = Opt::new(OptionRef { registry: id, index: 0 }, HELP_OPTION);

        Registry {
            id,
            command: None,
            description: None,
            settings: Settings::default(),
            options: vec![help_spec.info],
            help,
        }
    }

    /// Specify the command name shown in usage text.
    pub fn command(self, command: &str) -> Self {
        Registry {
            command: Some(command.into()),
            ..self
        }
    }

    /// Specify the program description shown in help text.
    pub fn description(self, description: &str) -> Self {
        Registry {
            description: Some(description.into()),
            ..self
        }
    }

    /// Specify any settings for the parser.
    pub fn settings(self, settings: Settings) -> Self {
        Registry { settings, ..self }
    }

    /// Register an option, returning the handle used to query results.
    ///
    /// Name clashes are only detected by [Registry::compile()].
    pub fn register<A>(&mut self, spec: OptionSpec<A>) -> Opt<A> {
        let option = OptionRef {
            registry: self.id,
            index: self.options.len(),
        };

        let opt = Opt::new(option, spec.info.name());

        self.options.push(spec.info);

        opt
    }

    /// The built-in help flag.
    pub fn help_option(&self) -> &Opt<bool> {
        &self.help
    }

    /// The options registered so far, in registration order.
    pub fn options(&self) -> impl Iterator<Item = &OptionInfo> {
        self.options.iter()
    }

    /// Build the name lookup indices, checking for conflicting names.
    ///
    /// Consumes the registry: no options can be added once it is compiled.
    pub fn compile(self) -> Result<CompiledRegistry, CompileError> {
        let mut by_name = IndexMap::<String, usize>::new();
        let mut by_long = HashMap::<String, usize>::new();
        let mut by_short = HashMap::<char, usize>::new();
        let mut positional: Option<usize> = None;

        for (index, option) in self.options.iter().enumerate() {
            check_kind(option)?;

            for name in &option.long_names {
                check_long_name(option, name)?;

                match by_long.entry(name.to_lowercase()) {
                    Entry::Occupied(entry) => {
                        let first = *entry.get();

                        // Repeating a name on the same option is harmless.
                        if first != index {
                            return Err(CompileError::DuplicateLongName {
                                name: entry.key().clone(),
                                first: self.options[first].label(),
                                second: option.label(),
                            });
                        }
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(index);
                    }
                }
            }

            for name in &option.short_names {
                check_short_name(option, *name)?;

                match by_short.entry(*name) {
                    Entry::Occupied(entry) => {
                        let first = *entry.get();

                        if first != index {
                            return Err(CompileError::DuplicateShortName {
                                name: *name,
                                first: self.options[first].label(),
                                second: option.label(),
                            });
                        }
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(index);
                    }
                }
            }

            if option.positional {
                if let Some(first) = positional {
                    return Err(CompileError::DuplicatePositional {
                        first: self.options[first].label(),
                        second: option.label(),
                    });
                }

                positional = Some(index);
            }

            by_name.insert(option.name().into(), index);
        }

        log::debug!(
            "compiled {} options ({} long names, {} short names, positional: {:?})",
            by_name.len(),
            by_long.len(),
            by_short.len(),
            positional.map(|i| self.options[i].name())
        );

        Ok(CompiledRegistry {
            id: self.id,
            command: self.command,
            description: self.description,
            settings: self.settings,
            options: self.options,
            by_name,
            by_long,
            by_short,
            positional,
            help: self.help,
        })
    }
}

fn check_kind(option: &OptionInfo) -> Result<(), CompileError> {
    let invalid = |reason: String| CompileError::InvalidKind {
        option: option.label(),
        reason,
    };

    if let Some(defect) = &option.defect {
        return Err(invalid(defect.clone()));
    }

    option.kind.check().map_err(invalid)?;

    // A positional option that consumes nothing would never advance
    // past the token it matched.
    if option.positional && option.kind.arity() == Some(0) {
        return Err(invalid("a positional option must take an argument".into()));
    }

    Ok(())
}

fn check_long_name(option: &OptionInfo, name: &str) -> Result<(), CompileError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.starts_with('-') {
        "name starts with '-'"
    } else if name.contains('=') {
        "name contains '='"
    } else if name.chars().any(char::is_whitespace) {
        "name contains whitespace"
    } else {
        return Ok(());
    };

    Err(CompileError::InvalidName {
        option: option.label(),
        name: name.into(),
        reason: reason.into(),
    })
}

fn check_short_name(option: &OptionInfo, name: char) -> Result<(), CompileError> {
    if name != '-' && name != '=' && !name.is_whitespace() {
        return Ok(());
    }

    Err(CompileError::InvalidName {
        option: option.label(),
        name: name.to_string(),
        reason: "not usable as a short name".into(),
    })
}

/// A validated, immutable set of options, ready for parsing.
///
/// A compiled registry can be used for any number of parses.
#[derive(Clone, Debug)]
pub struct CompiledRegistry {
    id: u64,
    command: Option<String>,
    description: Option<String>,
    settings: Settings,
    options: Vec<OptionInfo>,

    /// Canonical name to option, in registration order.
    by_name: IndexMap<String, usize>,

    /// Case-folded long name to option.
    by_long: HashMap<String, usize>,

    by_short: HashMap<char, usize>,
    positional: Option<usize>,
    help: Opt<bool>,
}

impl CompiledRegistry {
    /// Returns the option with the specified canonical name.
    pub fn by_name(&self, name: &str) -> Option<&OptionInfo> {
        self.by_name.get(name).map(|i| &self.options[*i])
    }

    /// Returns the option with the specified long name (case-insensitive).
    pub fn by_long_name(&self, name: &str) -> Option<&OptionInfo> {
        self.long_index(name).map(|i| &self.options[i])
    }

    /// Returns the option with the specified short name.
    pub fn by_short_name(&self, name: char) -> Option<&OptionInfo> {
        self.short_index(name).map(|i| &self.options[i])
    }

    /// Returns the positional option, if any.
    pub fn positional(&self) -> Option<&OptionInfo> {
        self.positional.map(|i| &self.options[i])
    }

    /// All options, in registration order.
    pub fn options(&self) -> impl Iterator<Item = &OptionInfo> {
        self.by_name.values().map(move |i| &self.options[*i])
    }

    /// Returns the number of registered options (including `--help`).
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Always `false`: the help option is always registered.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Returns the description of the option behind a handle.
    pub fn option<A>(&self, opt: &Opt<A>) -> Result<&OptionInfo, UseError> {
        self.index_of(opt).map(|i| &self.options[i])
    }

    /// The built-in help flag.
    pub fn help_option(&self) -> &Opt<bool> {
        &self.help
    }

    /// The parser settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The program description, if set.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The command name for usage text.
    ///
    /// If none was set, the file name of the running program is used.
    pub fn command_name(&self) -> String {
        if let Some(command) = &self.command {
            return command.clone();
        }

        env::args()
            .next()
            .and_then(|arg0| {
                Path::new(&arg0)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| DEFAULT_COMMAND.into())
    }

    pub(crate) fn info(&self, index: usize) -> &OptionInfo {
        &self.options[index]
    }

    pub(crate) fn by_name_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn long_index(&self, name: &str) -> Option<usize> {
        self.by_long.get(&name.to_lowercase()).copied()
    }

    pub(crate) fn short_index(&self, name: char) -> Option<usize> {
        self.by_short.get(&name).copied()
    }

    pub(crate) fn positional_index(&self) -> Option<usize> {
        self.positional
    }

    pub(crate) fn index_of<A>(&self, opt: &Opt<A>) -> Result<usize, UseError> {
        let option = opt.option;

        if option.registry != self.id || option.index >= self.options.len() {
            return Err(UseError::ForeignOption {
                option: opt.name.clone(),
            });
        }

        Ok(option.index)
    }
}
