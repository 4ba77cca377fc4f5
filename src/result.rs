// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::any::type_name;
use std::fmt;
use std::slice;

use crate::error::{ParseError, UseError};
use crate::registry::CompiledRegistry;
use crate::spec::{Opt, OptionInfo};
use crate::value::{OptValue, Value};

/// A single resolved occurrence of an option.
#[derive(Clone, Debug)]
pub struct ParseMatch<'r> {
    option: &'r OptionInfo,
    index: usize,
    name_seen: Option<String>,
    value: Value,
    synthesized: bool,
}

impl<'r> ParseMatch<'r> {
    pub(crate) fn new(
        option: &'r OptionInfo,
        index: usize,
        name_seen: Option<String>,
        value: Value,
    ) -> Self {
        ParseMatch {
            option,
            index,
            name_seen,
            value,
            synthesized: false,
        }
    }

    fn synthesize(option: &'r OptionInfo, index: usize, value: Value) -> Self {
        ParseMatch {
            option,
            index,
            name_seen: None,
            value,
            synthesized: true,
        }
    }

    /// The option that matched.
    pub fn option(&self) -> &'r OptionInfo {
        self.option
    }

    /// The option name as written on the command line (`--out`, `-o`).
    ///
    /// `None` for positional matches and synthesized defaults.
    pub fn name_seen(&self) -> Option<&str> {
        self.name_seen.as_deref()
    }

    /// The converted value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Set if the match represents a default value rather than something
    /// specified on the command line.
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }
}

impl fmt::Display for ParseMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "--{}={}", self.option.name(), self.value)
    }
}

/// The outcome of a parse: every match, in command-line order.
#[derive(Clone, Debug)]
pub struct ParseResult<'r> {
    registry: &'r CompiledRegistry,
    matches: Vec<ParseMatch<'r>>,

    /// Per option (by registration index), positions in `matches`.
    by_option: Vec<Vec<usize>>,
}

impl<'r> ParseResult<'r> {
    pub(crate) fn new(registry: &'r CompiledRegistry) -> Self {
        ParseResult {
            registry,
            matches: Vec::new(),
            by_option: vec![Vec::new(); registry.len()],
        }
    }

    pub(crate) fn add_match(&mut self, m: ParseMatch<'r>) {
        self.by_option[m.index].push(self.matches.len());
        self.matches.push(m);
    }

    pub(crate) fn add_matches<I>(&mut self, matches: I)
    where
        I: IntoIterator<Item = ParseMatch<'r>>,
    {
        for m in matches {
            self.add_match(m);
        }
    }

    /// Check required options were specified and that only list options
    /// were specified more than once.
    pub fn validate(&self) -> Result<(), ParseError> {
        for (index, found) in self.by_option.iter().enumerate() {
            let info = self.registry.info(index);

            if info.is_required() && found.is_empty() {
                return Err(ParseError::MissingRequired {
                    option: info.label(),
                });
            }
        }

        for (index, found) in self.by_option.iter().enumerate() {
            let info = self.registry.info(index);

            if found.len() > 1 && !info.is_list() {
                return Err(ParseError::TooManyMatches {
                    option: info.label(),
                    count: found.len(),
                });
            }
        }

        log::debug!("validated {} matches", self.matches.len());

        Ok(())
    }

    /// All matches, in the order they were found.
    pub fn matches(&self) -> &[ParseMatch<'r>] {
        &self.matches
    }

    /// Iterate over all matches, in the order they were found.
    pub fn iter(&self) -> slice::Iter<'_, ParseMatch<'r>> {
        self.matches.iter()
    }

    /// Number of matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Returns `true` if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// The matches for one option, in the order they were found.
    pub fn matches_for<A>(&self, opt: &Opt<A>) -> Result<Vec<&ParseMatch<'r>>, UseError> {
        let index = self.registry.index_of(opt)?;

        Ok(self.by_option[index]
            .iter()
            .map(|i| &self.matches[*i])
            .collect())
    }

    /// The options that matched at least once, in order of first match.
    pub fn involved(&self) -> Vec<&'r OptionInfo> {
        let mut seen = vec![false; self.by_option.len()];

        self.matches
            .iter()
            .filter(|m| !std::mem::replace(&mut seen[m.index], true))
            .map(|m| m.option)
            .collect()
    }

    /// The value of a single-valued option.
    ///
    /// Returns the option's default if it was not specified. It is an
    /// error to call this for an option that matched more than once, even
    /// for a list option.
    pub fn value<A: OptValue>(&self, opt: &Opt<A>) -> Result<Option<A>, UseError> {
        let index = self.registry.index_of(opt)?;
        let info = self.registry.info(index);

        let default = match info.default_value() {
            Some(value) => Some(extract::<A>(info, value)?),
            None => None,
        };

        self.single_value(index, default)
    }

    /// Like [ParseResult::value()], but with `default` used in place of
    /// the option's own default.
    pub fn value_or<A: OptValue>(&self, opt: &Opt<A>, default: A) -> Result<A, UseError> {
        let index = self.registry.index_of(opt)?;

        self.single_value(index, None)
            .map(|value| value.unwrap_or(default))
    }

    fn single_value<A: OptValue>(&self, index: usize, default: Option<A>) -> Result<Option<A>, UseError> {
        let info = self.registry.info(index);

        match self.by_option[index].as_slice() {
            [] => Ok(default),
            [i] => extract(info, &self.matches[*i].value).map(Some),
            found => Err(UseError::Ambiguous {
                option: info.label(),
                count: found.len(),
            }),
        }
    }

    /// All values of an option, in the order they were found.
    ///
    /// If the option was not specified, the result holds the option's
    /// default (if it has one).
    pub fn values<A: OptValue>(&self, opt: &Opt<A>) -> Result<Vec<A>, UseError> {
        let index = self.registry.index_of(opt)?;
        let info = self.registry.info(index);

        let default = match info.default_value() {
            Some(value) => Some(extract::<A>(info, value)?),
            None => None,
        };

        self.all_values(index, default)
    }

    /// Like [ParseResult::values()], but with `default` used in place of
    /// the option's own default.
    pub fn values_or<A: OptValue>(&self, opt: &Opt<A>, default: A) -> Result<Vec<A>, UseError> {
        let index = self.registry.index_of(opt)?;

        self.all_values(index, Some(default))
    }

    fn all_values<A: OptValue>(&self, index: usize, default: Option<A>) -> Result<Vec<A>, UseError> {
        let info = self.registry.info(index);
        let found = &self.by_option[index];

        if found.is_empty() {
            return Ok(default.into_iter().collect());
        }

        found
            .iter()
            .map(|i| extract(info, &self.matches[*i].value))
            .collect()
    }

    /// Store the value of an option in `slot`.
    ///
    /// `slot` is left alone if the option was not specified and has no
    /// default. Returns `true` if `slot` was written.
    pub fn assign<A: OptValue>(&self, opt: &Opt<A>, slot: &mut A) -> Result<bool, UseError> {
        match self.value(opt)? {
            Some(value) => {
                *slot = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns `true` if the built-in help option was specified.
    pub fn is_help_requested(&self) -> bool {
        self.registry
            .index_of(self.registry.help_option())
            .map(|index| {
                self.by_option[index]
                    .iter()
                    .any(|i| self.matches[*i].value == Value::Boolean(true))
            })
            .unwrap_or(false)
    }

    /// All matches, followed by a synthesized match for each option that
    /// was not specified but has a default value.
    pub fn matches_with_defaults(&self) -> Vec<ParseMatch<'r>> {
        let mut all = self.matches.clone();

        for (index, found) in self.by_option.iter().enumerate() {
            if !found.is_empty() {
                continue;
            }

            let info = self.registry.info(index);

            if let Some(value) = info.default_value() {
                all.push(ParseMatch::synthesize(info, index, value.clone()));
            }
        }

        all
    }
}

fn extract<A: OptValue>(info: &OptionInfo, value: &Value) -> Result<A, UseError> {
    A::from_value(value).ok_or_else(|| UseError::TypeMismatch {
        option: info.label(),
        expected: type_name::<A>().into(),
    })
}

impl<'a, 'r> IntoIterator for &'a ParseResult<'r> {
    type Item = &'a ParseMatch<'r>;
    type IntoIter = slice::Iter<'a, ParseMatch<'r>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ParseResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, m) in self.matches.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }

            write!(f, "{}", m)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::registry::Registry;
    use crate::spec::OptionSpec;

    struct Fixture {
        registry: CompiledRegistry,
        name: Opt<String>,
        count: Opt<i64>,
        tags: Opt<String>,
        verbose: Opt<bool>,
    }

    fn fixture() -> Fixture {
        let mut registry = Registry::new();

        let name = registry.register(OptionSpec::string("name").short('n').required());
        let count = registry.register(OptionSpec::integer("count").short('c').default_value(3));
        let tags = registry.register(OptionSpec::string("tag").list());
        let verbose = registry.register(OptionSpec::flag("verbose").short('v'));

        Fixture {
            registry: registry.compile().unwrap(),
            name,
            count,
            tags,
            verbose,
        }
    }

    fn add<'r>(result: &mut ParseResult<'r>, registry: &'r CompiledRegistry, name: &str, value: Value) {
        let index = registry.by_name_index(name).unwrap();
        let info = registry.info(index);

        result.add_match(ParseMatch::new(info, index, Some(format!("--{}", name)), value));
    }

    #[test]
    fn test_validate() {
        let f = fixture();

        let result = ParseResult::new(&f.registry);
        assert_eq!(
            result.validate(),
            Err(ParseError::MissingRequired {
                option: "--name=STRING".into()
            })
        );

        let mut result = ParseResult::new(&f.registry);
        add(&mut result, &f.registry, "name", Value::String("a".into()));
        assert_eq!(result.validate(), Ok(()));

        add(&mut result, &f.registry, "tag", Value::String("x".into()));
        add(&mut result, &f.registry, "tag", Value::String("y".into()));
        assert_eq!(result.validate(), Ok(()));

        add(&mut result, &f.registry, "count", Value::Integer(1));
        add(&mut result, &f.registry, "count", Value::Integer(2));
        assert_eq!(
            result.validate(),
            Err(ParseError::TooManyMatches {
                option: "--count=INTEGER".into(),
                count: 2,
            })
        );
    }

    #[test]
    fn test_required_checked_before_arity() {
        let f = fixture();

        let mut result = ParseResult::new(&f.registry);
        add(&mut result, &f.registry, "count", Value::Integer(1));
        add(&mut result, &f.registry, "count", Value::Integer(2));

        assert_eq!(
            result.validate(),
            Err(ParseError::MissingRequired {
                option: "--name=STRING".into()
            })
        );
    }

    #[test]
    fn test_single_values() {
        let f = fixture();

        let mut result = ParseResult::new(&f.registry);

        // Defaults.
        assert_eq!(result.value(&f.count), Ok(Some(3)));
        assert_eq!(result.value(&f.name), Ok(None));
        assert_eq!(result.value(&f.verbose), Ok(Some(false)));
        assert_eq!(result.value_or(&f.count, 9), Ok(9));
        assert_eq!(result.value_or(&f.name, "anon".to_string()), Ok("anon".to_string()));

        add(&mut result, &f.registry, "count", Value::Integer(5));
        add(&mut result, &f.registry, "tag", Value::String("x".into()));
        add(&mut result, &f.registry, "tag", Value::String("y".into()));

        assert_eq!(result.value(&f.count), Ok(Some(5)));
        assert_eq!(result.value_or(&f.count, 9), Ok(5));

        // Ambiguous even though the option is a list.
        assert_eq!(
            result.value(&f.tags),
            Err(UseError::Ambiguous {
                option: "--tag=STRING".into(),
                count: 2,
            })
        );
    }

    #[test]
    fn test_all_values() {
        let f = fixture();

        let mut result = ParseResult::new(&f.registry);

        assert_eq!(result.values(&f.count), Ok(vec![3]));
        assert_eq!(result.values(&f.tags), Ok(vec![]));
        assert_eq!(result.values_or(&f.tags, "none".to_string()), Ok(vec!["none".to_string()]));

        add(&mut result, &f.registry, "tag", Value::String("x".into()));
        add(&mut result, &f.registry, "count", Value::Integer(1));
        add(&mut result, &f.registry, "tag", Value::String("y".into()));

        assert_eq!(result.values(&f.tags), Ok(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(result.values_or(&f.count, 7), Ok(vec![1]));
    }

    #[test]
    fn test_assign() {
        let f = fixture();

        let mut result = ParseResult::new(&f.registry);
        add(&mut result, &f.registry, "name", Value::String("bob".into()));

        let mut name = String::new();
        let mut count = 0;
        let mut tag = "unset".to_string();

        assert_eq!(result.assign(&f.name, &mut name), Ok(true));
        assert_eq!(result.assign(&f.count, &mut count), Ok(true));
        assert_eq!(result.assign(&f.tags, &mut tag), Ok(false));

        assert_eq!(name, "bob");
        assert_eq!(count, 3);
        assert_eq!(tag, "unset");
    }

    #[test]
    fn test_use_errors() {
        let f = fixture();
        let other = fixture();

        let result = ParseResult::new(&f.registry);

        assert_eq!(
            result.value(&other.count),
            Err(UseError::ForeignOption {
                option: "count".into()
            })
        );

        // A handle of the wrong type for the stored value.
        let index = f.registry.by_name_index("count").unwrap();
        let wrong: Opt<String> = Opt::new(f.count.option_ref(), "count");
        assert_eq!(index, wrong.option_ref().index);

        match result.value(&wrong) {
            Err(UseError::TypeMismatch { option, .. }) => assert_eq!(option, "--count=INTEGER"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_ordering_and_display() {
        let f = fixture();

        let mut result = ParseResult::new(&f.registry);
        add(&mut result, &f.registry, "tag", Value::String("x".into()));
        add(&mut result, &f.registry, "verbose", Value::Boolean(true));
        add(&mut result, &f.registry, "tag", Value::String("y".into()));

        let names: Vec<&str> = result.involved().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["tag", "verbose"]);

        let tags: Vec<String> = result
            .matches_for(&f.tags)
            .unwrap()
            .iter()
            .map(|m| m.value().to_string())
            .collect();
        assert_eq!(tags, vec!["x", "y"]);

        assert_eq!(result.len(), 3);
        assert_eq!(result.to_string(), "--tag=x --verbose=true --tag=y");
        assert_eq!((&result).into_iter().count(), 3);
        assert!(!result.is_help_requested());
    }

    #[test]
    fn test_matches_with_defaults() {
        let f = fixture();

        let mut result = ParseResult::new(&f.registry);
        add(&mut result, &f.registry, "count", Value::Integer(1));

        let all = result.matches_with_defaults();

        let rendered: Vec<String> = all.iter().map(|m| m.to_string()).collect();

        // The help and verbose flags have defaults; count was specified.
        assert_eq!(rendered, vec!["--count=1", "--help=false", "--verbose=false"]);

        assert!(!all[0].is_synthesized());
        assert!(all[1].is_synthesized());
        assert_eq!(all[1].name_seen(), None);
        assert_eq!(all[0].name_seen(), Some("--count"));

        // Synthesized matches are not part of the result itself.
        assert_eq!(result.len(), 1);
    }
}
