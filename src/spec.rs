// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::error::ParseError;
use crate::kind::Kind;
use crate::stream::TokenStream;
use crate::value::{OptValue, Value};

const LONG_OPT_PREFIX: &str = "--";

/// Read-only description of a registered option.
///
/// This is what help generation and lookups see; it never changes once
/// the option has been registered.
#[derive(Clone, Debug)]
pub struct OptionInfo {
    pub(crate) long_names: Vec<String>,
    pub(crate) short_names: Vec<char>,
    pub(crate) positional: bool,
    pub(crate) required: bool,
    pub(crate) list: bool,
    pub(crate) default: Option<Value>,
    pub(crate) metavar: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) kind: Kind,

    /// Set by builder calls that cannot be honoured; reported by
    /// `compile()`.
    pub(crate) defect: Option<String>,
}

impl OptionInfo {
    fn new(name: &str, kind: Kind) -> Self {
        OptionInfo {
            long_names: vec![name.into()],
            short_names: Vec::new(),
            positional: false,
            required: false,
            list: false,
            default: None,
            metavar: kind.default_metavar(),
            description: None,
            kind,
            defect: None,
        }
    }

    /// The canonical name (always the first long name).
    pub fn name(&self) -> &str {
        &self.long_names[0]
    }

    /// All long names, canonical name first.
    pub fn long_names(&self) -> &[String] {
        &self.long_names
    }

    /// All short names.
    pub fn short_names(&self) -> &[char] {
        &self.short_names
    }

    /// Set if bare (non-option) tokens are matched to this option.
    pub fn is_positional(&self) -> bool {
        self.positional
    }

    /// Set if the option must be specified.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Set if the option may be specified more than once.
    pub fn is_list(&self) -> bool {
        self.list
    }

    /// Value used when the option is not specified.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Placeholder for the option's argument in usage text.
    pub fn metavar(&self) -> Option<&str> {
        self.metavar.as_deref()
    }

    /// Description for help text.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The option's kind.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Simple usage form (`--name=METAVAR`) used to identify the option
    /// in messages.
    pub fn label(&self) -> String {
        long_name_usage(self.name(), self.metavar())
    }
}

impl fmt::Display for OptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub(crate) fn long_name_usage(name: &str, metavar: Option<&str>) -> String {
    match metavar {
        Some(metavar) => format!("{}{}={}", LONG_OPT_PREFIX, name, metavar),
        None => format!("{}{}", LONG_OPT_PREFIX, name),
    }
}

/// Builder for an option whose values have type `A`.
///
/// Create one with the constructor for the kind you need, configure it,
/// then pass it to `Registry::register()` to get a typed [Opt] handle:
///
/// ```rust
/// use optgram::{OptionSpec, Registry};
///
/// let mut registry = Registry::new();
///
/// let count = registry.register(
///     OptionSpec::integer("count")
///         .short('c')
///         .default_value(1)
///         .description("Number of repetitions."),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct OptionSpec<A> {
    pub(crate) info: OptionInfo,
    marker: PhantomData<fn() -> A>,
}

impl<A> OptionSpec<A> {
    pub(crate) fn with_kind(name: &str, kind: Kind) -> Self {
        OptionSpec {
            info: OptionInfo::new(name, kind),
            marker: PhantomData,
        }
    }

    /// Add a long name (`--name`); long names are case-insensitive.
    pub fn name(mut self, name: &str) -> Self {
        self.info.long_names.push(name.into());
        self
    }

    /// Add a short name (`-c`).
    pub fn short(mut self, name: char) -> Self {
        self.info.short_names.push(name);
        self
    }

    /// Match bare (non-option) tokens to this option.
    pub fn positional(mut self) -> Self {
        self.info.positional = true;
        self
    }

    /// Specify that the option must be provided on the command-line.
    pub fn required(mut self) -> Self {
        self.info.required = true;
        self
    }

    /// Allow the option to be specified more than once.
    pub fn list(mut self) -> Self {
        self.info.list = true;
        self
    }

    /// Specify the placeholder shown for the argument in usage text.
    pub fn metavar(mut self, metavar: &str) -> Self {
        self.info.metavar = Some(metavar.into());
        self
    }

    /// Show no argument placeholder in usage text.
    pub fn no_metavar(mut self) -> Self {
        self.info.metavar = None;
        self
    }

    /// Specify the help text for the option.
    pub fn description(mut self, description: &str) -> Self {
        self.info.description = Some(description.into());
        self
    }

    /// Read-only view of the configuration so far.
    pub fn info(&self) -> &OptionInfo {
        &self.info
    }
}

impl<A: OptValue> OptionSpec<A> {
    /// Specify the value returned when the option is not specified.
    pub fn default_value(mut self, value: A) -> Self {
        self.info.default = Some(value.into_value());
        self
    }

    /// Create an option of a user-defined kind.
    ///
    /// `converter` receives the token stream (positioned just after the
    /// option name, or at the token itself for a positional option) and
    /// the option's label for error messages. It must consume the tokens
    /// it uses.
    pub fn custom<F>(name: &str, converter: F) -> Self
    where
        F: Fn(&mut TokenStream, &str) -> Result<A, ParseError> + Send + Sync + 'static,
    {
        let converter = Arc::new(move |stream: &mut TokenStream, option: &str| {
            converter(stream, option).map(OptValue::into_value)
        });

        OptionSpec::with_kind(
            name,
            Kind::Custom {
                converter,
                metavar: None,
            },
        )
    }
}

impl OptionSpec<String> {
    /// Create a string option.
    pub fn string(name: &str) -> Self {
        OptionSpec::with_kind(name, Kind::String)
    }

    /// Create an option accepting one of the specified (case-sensitive)
    /// values.
    pub fn enumeration(name: &str, symbols: &[&str]) -> Self {
        let symbols = symbols.iter().map(|s| s.to_string()).collect();

        OptionSpec::with_kind(name, Kind::Enumeration { symbols })
    }
}

impl OptionSpec<i64> {
    /// Create an integer option.
    pub fn integer(name: &str) -> Self {
        OptionSpec::with_kind(name, Kind::Integer)
    }
}

impl OptionSpec<f64> {
    /// Create a floating point option.
    pub fn double(name: &str) -> Self {
        OptionSpec::with_kind(name, Kind::Double)
    }
}

impl OptionSpec<bool> {
    /// Create an option that takes a `true`/`false` argument.
    ///
    /// For an option without an argument, use [OptionSpec::flag()].
    pub fn boolean(name: &str) -> Self {
        OptionSpec::with_kind(name, Kind::Boolean)
    }

    /// Create a flag: no argument, `true` if specified, `false` if not.
    pub fn flag(name: &str) -> Self {
        let kind = Kind::Flag {
            value_if_present: true,
        };

        OptionSpec::with_kind(name, kind).default_value(false)
    }

    /// Invert a flag: `false` if specified, `true` if not.
    ///
    /// Only flags can be inverted; using this on a boolean option is
    /// reported when the registry is compiled.
    pub fn invert(mut self) -> Self {
        match self.info.kind {
            Kind::Flag {
                ref mut value_if_present,
            } => {
                *value_if_present = false;
                self.info.default = Some(Value::Boolean(true));
            }
            _ => self.info.defect = Some("only flags can be inverted".into()),
        }

        self
    }
}

impl OptionSpec<PathBuf> {
    /// Create a file name option.
    pub fn path(name: &str) -> Self {
        OptionSpec::with_kind(name, Kind::Path)
    }
}

impl OptionSpec<Url> {
    /// Create a URI option.
    pub fn uri(name: &str) -> Self {
        OptionSpec::with_kind(name, Kind::Uri)
    }
}

/// Untyped identity of a registered option: the registry it belongs to
/// and its registration index.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct OptionRef {
    pub(crate) registry: u64,
    pub(crate) index: usize,
}

/// Typed handle to a registered option, used to query a `ParseResult`.
///
/// Handles are only valid for the registry that created them.
pub struct Opt<A> {
    pub(crate) option: OptionRef,
    pub(crate) name: String,
    marker: PhantomData<fn() -> A>,
}

impl<A> Opt<A> {
    pub(crate) fn new(option: OptionRef, name: &str) -> Self {
        Opt {
            option,
            name: name.into(),
            marker: PhantomData,
        }
    }

    /// Canonical name of the option.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Untyped identity of the option.
    pub fn option_ref(&self) -> OptionRef {
        self.option
    }
}

impl Opt<Value> {
    /// View an untyped handle, such as one from `Registry::declare()`, as
    /// a handle for values of type `T`.
    ///
    /// Queries through the typed handle fail with a type mismatch if the
    /// option's values are not of type `T`.
    pub fn typed<T>(&self) -> Opt<T> {
        Opt::new(self.option, &self.name)
    }
}

// Derives would needlessly require `A: Clone` etc.
impl<A> Clone for Opt<A> {
    fn clone(&self) -> Self {
        Opt::new(self.option, &self.name)
    }
}

impl<A> fmt::Debug for Opt<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Opt")
            .field("name", &self.name)
            .field("option", &self.option)
            .finish()
    }
}

impl<A> PartialEq for Opt<A> {
    fn eq(&self, other: &Opt<A>) -> bool {
        self.option == other.option
    }
}

impl<A> Eq for Opt<A> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_spec_defaults() {
        let spec = OptionSpec::string("output");
        let info = spec.info();

        assert_eq!(info.name(), "output");
        assert_eq!(info.long_names(), &["output".to_string()]);
        assert!(info.short_names().is_empty());
        assert!(!info.is_positional());
        assert!(!info.is_required());
        assert!(!info.is_list());
        assert_eq!(info.default_value(), None);
        assert_eq!(info.metavar(), Some("STRING"));
        assert_eq!(info.description(), None);
        assert_eq!(info.label(), "--output=STRING");
    }

    #[test]
    fn test_option_spec_builder() {
        let spec = OptionSpec::integer("count")
            .name("number")
            .short('c')
            .short('n')
            .positional()
            .required()
            .list()
            .metavar("N")
            .default_value(7)
            .description("how many");

        let info = spec.info();

        assert_eq!(info.long_names(), &["count".to_string(), "number".to_string()]);
        assert_eq!(info.short_names(), &['c', 'n']);
        assert!(info.is_positional());
        assert!(info.is_required());
        assert!(info.is_list());
        assert_eq!(info.metavar(), Some("N"));
        assert_eq!(info.default_value(), Some(&Value::Integer(7)));
        assert_eq!(info.description(), Some("how many"));
        assert_eq!(info.to_string(), "--count=N");
    }

    #[test]
    fn test_flags() {
        let flag = OptionSpec::flag("verbose");

        assert_eq!(flag.info().default_value(), Some(&Value::Boolean(false)));
        assert_eq!(flag.info().metavar(), None);
        assert_eq!(flag.info().label(), "--verbose");

        let inverted = OptionSpec::flag("color").invert();

        assert_eq!(inverted.info().default_value(), Some(&Value::Boolean(true)));
        assert!(inverted.info().defect.is_none());

        match inverted.info().kind() {
            Kind::Flag { value_if_present } => assert!(!value_if_present),
            kind => panic!("unexpected kind {:?}", kind),
        }

        // Booleans take an argument so cannot be inverted.
        let boolean = OptionSpec::boolean("sure").invert();

        assert!(boolean.info().defect.is_some());
        assert_eq!(boolean.info().metavar(), Some("BOOLEAN"));
    }

    #[test]
    fn test_kind_constructors() {
        assert_eq!(OptionSpec::double("ratio").info().metavar(), Some("DOUBLE"));
        assert_eq!(OptionSpec::path("input").info().metavar(), Some("FILE"));
        assert_eq!(OptionSpec::uri("source").info().metavar(), Some("URI"));
        assert_eq!(
            OptionSpec::enumeration("mode", &["fast", "slow"]).info().metavar(),
            Some("{fast|slow}")
        );
        assert_eq!(
            OptionSpec::string("x").no_metavar().info().label(),
            "--x"
        );
    }

    #[test]
    fn test_custom_spec() {
        let spec = OptionSpec::custom("pair", |stream, option| {
            let a = stream.require(option)?;
            let b = stream.require(option)?;

            Ok(format!("{}:{}", a, b))
        })
        .metavar("A B");

        let mut stream = TokenStream::new(vec!["x", "y"]);
        let value = spec.info().kind().convert(&mut stream, "--pair=A B");

        assert_eq!(value, Ok(Value::String("x:y".into())));
        assert_eq!(spec.info().label(), "--pair=A B");
    }

    #[test]
    fn test_opt_handle() {
        let option = OptionRef {
            registry: 3,
            index: 1,
        };

        let a: Opt<i64> = Opt::new(option, "count");
        let b = a.clone();

        assert_eq!(a, b);
        assert_eq!(b.name(), "count");
        assert_eq!(b.option_ref(), option);

        let untyped: Opt<Value> = Opt::new(option, "count");
        let typed: Opt<i64> = untyped.typed();

        assert_eq!(typed, a);
    }
}
