// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::env;
use std::fmt;
use std::path::{PathBuf, MAIN_SEPARATOR};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use url::Url;

use crate::error::ParseError;
use crate::stream::TokenStream;
use crate::value::Value;

/// Win32 drive letter specification (`C:\...` or `C:/...`).
const DRIVE_LETTER_PATTERN: &str = r"^[A-Za-z]:[\\/]";

/// Win32 UNC path (`\\server\share`, in either slash convention).
const UNC_PATTERN: &str = r"^[\\/][\\/]";

const FILE_SCHEME: &str = "file:";

/// A user-supplied conversion routine.
///
/// It is given the token stream and the option's display name (for error
/// messages) and must consume the tokens it needs.
pub type Converter = Arc<dyn Fn(&mut TokenStream, &str) -> Result<Value, ParseError> + Send + Sync>;

/// The kind of an option: how many tokens it consumes and how they are
/// converted into a [Value].
#[derive(Clone)]
pub enum Kind {
    /// One token, verbatim.
    String,
    /// One token: `0x` hex, `0b` binary, leading `0` octal, else decimal.
    Integer,
    /// One token in decimal or scientific notation.
    Double,
    /// One token; the first character decides (`0`/`f` or `1`/`t`).
    Boolean,
    /// No tokens; yields `value_if_present`.
    Flag {
        /// The value produced when the flag is specified.
        value_if_present: bool,
    },
    /// One token that must exactly match one of `symbols`.
    Enumeration {
        /// The accepted values (case-sensitive).
        symbols: Vec<String>,
    },
    /// One token, with path separators normalised to the host convention.
    Path,
    /// One token, parsed as a URI (file names are turned into `file:` URIs).
    Uri,
    /// A user-defined kind.
    Custom {
        /// The conversion routine.
        converter: Converter,
        /// Label for the argument in usage text.
        metavar: Option<String>,
    },
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Kind::Flag { value_if_present } => f
                .debug_struct("Flag")
                .field("value_if_present", value_if_present)
                .finish(),
            Kind::Enumeration { symbols } => f
                .debug_struct("Enumeration")
                .field("symbols", symbols)
                .finish(),
            Kind::Custom { metavar, .. } => f
                .debug_struct("Custom")
                .field("metavar", metavar)
                .finish_non_exhaustive(),
            _ => write!(f, "{}", self.name()),
        }
    }
}

impl Kind {
    /// Short, human readable name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::String => "String",
            Kind::Integer => "Integer",
            Kind::Double => "Double",
            Kind::Boolean => "Boolean",
            Kind::Flag { .. } => "Flag",
            Kind::Enumeration { .. } => "Enumeration",
            Kind::Path => "Path",
            Kind::Uri => "Uri",
            Kind::Custom { .. } => "Custom",
        }
    }

    /// The metavar shown in usage text when the option does not set one.
    pub fn default_metavar(&self) -> Option<String> {
        let metavar = match self {
            Kind::String => "STRING".into(),
            Kind::Integer => "INTEGER".into(),
            Kind::Double => "DOUBLE".into(),
            Kind::Boolean => "BOOLEAN".into(),
            Kind::Flag { .. } => return None,
            Kind::Enumeration { symbols } => format!("{{{}}}", symbols.join("|")),
            Kind::Path => "FILE".into(),
            Kind::Uri => "URI".into(),
            Kind::Custom { metavar, .. } => {
                metavar.clone().unwrap_or_else(|| "VALUE".into())
            }
        };

        Some(metavar)
    }

    /// Number of tokens consumed per match, if fixed.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Kind::Flag { .. } => Some(0),
            Kind::Custom { .. } => None,
            _ => Some(1),
        }
    }

    /// Check that the kind is usable.
    pub(crate) fn check(&self) -> Result<(), String> {
        if let Kind::Enumeration { symbols } = self {
            if symbols.is_empty() {
                return Err("enumeration has no symbols".into());
            }

            for (i, symbol) in symbols.iter().enumerate() {
                if symbols[..i].contains(symbol) {
                    return Err(format!("enumeration symbol {:?} declared twice", symbol));
                }
            }
        }

        Ok(())
    }

    /// Consume the tokens for one match of an option of this kind and
    /// convert them.
    ///
    /// `option` identifies the option in error messages.
    pub fn convert(&self, stream: &mut TokenStream, option: &str) -> Result<Value, ParseError> {
        match self {
            Kind::String => Ok(Value::String(stream.require(option)?)),
            Kind::Integer => {
                let text = stream.require(option)?;

                parse_integer(&text)
                    .map(Value::Integer)
                    .ok_or_else(|| ParseError::bad_value(option, &text, "integer"))
            }
            Kind::Double => {
                let text = stream.require(option)?;

                text.trim()
                    .parse::<f64>()
                    .map(Value::Double)
                    .map_err(|_| ParseError::bad_value(option, &text, "double"))
            }
            Kind::Boolean => {
                let text = stream.require(option)?;

                parse_boolean(&text)
                    .map(Value::Boolean)
                    .ok_or_else(|| ParseError::bad_value(option, &text, "'true' or 'false'"))
            }
            Kind::Flag { value_if_present } => Ok(Value::Boolean(*value_if_present)),
            Kind::Enumeration { symbols } => {
                let text = stream.require(option)?;

                if symbols.iter().any(|s| *s == text) {
                    Ok(Value::Symbol(text))
                } else {
                    let expected = format!("one of {}", symbols.join(", "));
                    Err(ParseError::bad_value(option, &text, &expected))
                }
            }
            Kind::Path => {
                let text = stream.require(option)?;

                Ok(Value::Path(normalise_path(&text)))
            }
            Kind::Uri => {
                let text = stream.require(option)?;

                parse_uri(&text)
                    .map(Value::Uri)
                    .map_err(|reason| ParseError::bad_value(option, &text, &reason))
            }
            Kind::Custom { converter, .. } => converter(stream, option),
        }
    }
}

/// Tag naming a built-in kind, for declarative option tables.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum KindTag {
    /// [Kind::String].
    String,
    /// [Kind::Integer].
    Integer,
    /// [Kind::Double].
    Double,
    /// [Kind::Boolean].
    Boolean,
    /// [Kind::Flag], `true` when present.
    Flag,
    /// [Kind::Flag], `false` when present.
    InvertedFlag,
    /// [Kind::Path].
    Path,
    /// [Kind::Uri].
    Uri,
    /// [Kind::Enumeration] with the given symbols.
    Enumeration(&'static [&'static str]),
}

impl KindTag {
    /// Build the kind this tag names.
    pub fn kind(self) -> Kind {
        match self {
            KindTag::String => Kind::String,
            KindTag::Integer => Kind::Integer,
            KindTag::Double => Kind::Double,
            KindTag::Boolean => Kind::Boolean,
            KindTag::Flag => Kind::Flag {
                value_if_present: true,
            },
            KindTag::InvertedFlag => Kind::Flag {
                value_if_present: false,
            },
            KindTag::Path => Kind::Path,
            KindTag::Uri => Kind::Uri,
            KindTag::Enumeration(symbols) => Kind::Enumeration {
                symbols: symbols.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    /// The value an option of this kind yields when not specified.
    pub fn default_value(self) -> Option<Value> {
        match self {
            KindTag::Flag => Some(Value::Boolean(false)),
            KindTag::InvertedFlag => Some(Value::Boolean(true)),
            _ => None,
        }
    }
}

/// Parse an integer, recognising `0x` (hex), `0b` (binary) and
/// leading-zero (octal) prefixes after an optional sign.
pub fn parse_integer(text: &str) -> Option<i64> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (radix, digits) = if let Some(d) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (16, d)
    } else if let Some(d) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        (2, d)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    // from_str_radix() would accept a second sign after the prefix.
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };

    i64::try_from(value).ok()
}

/// Parse a boolean from its first character (case-insensitive).
pub fn parse_boolean(text: &str) -> Option<bool> {
    match text.chars().next()?.to_ascii_lowercase() {
        '0' | 'f' => Some(false),
        '1' | 't' => Some(true),
        _ => None,
    }
}

/// Accept either slash convention, producing host separators.
pub fn normalise_path(text: &str) -> PathBuf {
    let normalised: String = text
        .chars()
        .map(|c| match c {
            '/' | '\\' => MAIN_SEPARATOR,
            _ => c,
        })
        .collect();

    PathBuf::from(normalised)
}

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> Result<&'static Regex, String> {
    if let Some(re) = cell.get() {
        return Ok(re);
    }

    let re = Regex::new(pattern).map_err(|e| format!("URI (bad pattern {:?}: {})", pattern, e))?;

    Ok(cell.get_or_init(|| re))
}

fn is_drive_letter_path(text: &str) -> Result<bool, String> {
    static RE: OnceLock<Regex> = OnceLock::new();

    Ok(compiled(&RE, DRIVE_LETTER_PATTERN)?.is_match(text))
}

fn is_unc_path(text: &str) -> Result<bool, String> {
    static RE: OnceLock<Regex> = OnceLock::new();

    Ok(compiled(&RE, UNC_PATTERN)?.is_match(text))
}

/// Parse a URI, turning drive-letter and UNC file names into `file:`
/// URIs and normalising backslashes to forward slashes.
///
/// Relative references are resolved against the current directory.
pub fn parse_uri(text: &str) -> Result<Url, String> {
    if text.is_empty() {
        return Err("URI".into());
    }

    let value = if is_drive_letter_path(text)? {
        format!("{}///{}", FILE_SCHEME, text)
    } else if is_unc_path(text)? {
        format!("{}{}", FILE_SCHEME, text)
    } else {
        text.to_string()
    };

    let value = value.replace('\\', "/");

    match Url::parse(&value) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let cwd = env::current_dir().map_err(|e| format!("URI ({})", e))?;
            let base = Url::from_directory_path(&cwd)
                .map_err(|_| format!("URI (bad current directory {})", cwd.display()))?;

            base.join(&value).map_err(|e| format!("URI ({})", e))
        }
        Err(e) => Err(format!("URI ({})", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPT: &str = "--test=VALUE";

    fn convert_one(kind: &Kind, token: &str) -> Result<Value, ParseError> {
        let mut stream = TokenStream::new(vec![token]);

        kind.convert(&mut stream, OPT)
    }

    #[test]
    fn test_parse_integer() {
        #[derive(Debug)]
        struct TestData<'a> {
            text: &'a str,
            result: Option<i64>,
        }

        let tests = &[
            TestData {
                text: "42",
                result: Some(42),
            },
            TestData {
                text: "0x1F",
                result: Some(31),
            },
            TestData {
                text: "0X1f",
                result: Some(31),
            },
            TestData {
                text: "017",
                result: Some(15),
            },
            TestData {
                text: "0b101",
                result: Some(5),
            },
            TestData {
                text: "0",
                result: Some(0),
            },
            TestData {
                text: "00",
                result: Some(0),
            },
            TestData {
                text: "-42",
                result: Some(-42),
            },
            TestData {
                text: "+7",
                result: Some(7),
            },
            TestData {
                text: "-0x10",
                result: Some(-16),
            },
            TestData {
                text: "-9223372036854775808",
                result: Some(i64::MIN),
            },
            TestData {
                text: "9223372036854775808",
                result: None,
            },
            TestData {
                text: "0xzz",
                result: None,
            },
            TestData {
                text: "0x",
                result: None,
            },
            TestData {
                text: "0x-1",
                result: None,
            },
            TestData {
                text: "08",
                result: None,
            },
            TestData {
                text: "0b102",
                result: None,
            },
            TestData {
                text: "",
                result: None,
            },
            TestData {
                text: "-",
                result: None,
            },
            TestData {
                text: "12abc",
                result: None,
            },
            TestData {
                text: " 1",
                result: None,
            },
        ];

        for (i, d) in tests.iter().enumerate() {
            let msg = format!("test[{}]: {:?}", i, d);

            assert_eq!(parse_integer(d.text), d.result, "{}", msg);
        }
    }

    #[test]
    fn test_parse_boolean() {
        let tests = &[
            ("true", Some(true)),
            ("T", Some(true)),
            ("1", Some(true)),
            ("tomato", Some(true)),
            ("false", Some(false)),
            ("F", Some(false)),
            ("0", Some(false)),
            ("yes", None),
            ("no", None),
            ("", None),
        ];

        for (i, (text, result)) in tests.iter().enumerate() {
            let msg = format!("test[{}]: {:?}", i, text);

            assert_eq!(parse_boolean(text), *result, "{}", msg);
        }
    }

    #[test]
    fn test_convert_errors() {
        #[derive(Debug)]
        struct TestData<'a> {
            kind: Kind,
            token: &'a str,
            result: Result<Value, ParseError>,
        }

        let tests = &[
            TestData {
                kind: Kind::Integer,
                token: "0xzz",
                result: Err(ParseError::bad_value(OPT, "0xzz", "integer")),
            },
            TestData {
                kind: Kind::Double,
                token: "1.5e3",
                result: Ok(Value::Double(1500.0)),
            },
            TestData {
                kind: Kind::Double,
                token: "-0.25",
                result: Ok(Value::Double(-0.25)),
            },
            TestData {
                kind: Kind::Double,
                token: "one",
                result: Err(ParseError::bad_value(OPT, "one", "double")),
            },
            TestData {
                kind: Kind::Boolean,
                token: "",
                result: Err(ParseError::bad_value(OPT, "", "'true' or 'false'")),
            },
            TestData {
                kind: Kind::Boolean,
                token: "maybe",
                result: Err(ParseError::bad_value(OPT, "maybe", "'true' or 'false'")),
            },
            TestData {
                kind: Kind::String,
                token: "-looks-like-an-option",
                result: Ok(Value::String("-looks-like-an-option".into())),
            },
            TestData {
                kind: Kind::Enumeration {
                    symbols: vec!["red".into(), "green".into()],
                },
                token: "green",
                result: Ok(Value::Symbol("green".into())),
            },
            TestData {
                kind: Kind::Enumeration {
                    symbols: vec!["red".into(), "green".into()],
                },
                // Case sensitive.
                token: "Green",
                result: Err(ParseError::bad_value(OPT, "Green", "one of red, green")),
            },
        ];

        for (i, d) in tests.iter().enumerate() {
            let msg = format!("test[{}]: {:?}", i, d);

            let result = convert_one(&d.kind, d.token);

            assert_eq!(result, d.result, "{}", msg);
        }
    }

    #[test]
    fn test_flag_consumes_nothing() {
        let mut stream = TokenStream::new(vec!["next"]);

        let present = Kind::Flag {
            value_if_present: true,
        };
        let inverted = Kind::Flag {
            value_if_present: false,
        };

        assert_eq!(present.convert(&mut stream, OPT), Ok(Value::Boolean(true)));
        assert_eq!(inverted.convert(&mut stream, OPT), Ok(Value::Boolean(false)));
        assert_eq!(stream.remaining(), 1);
        assert_eq!(present.arity(), Some(0));
    }

    #[test]
    fn test_missing_argument() {
        let mut stream = TokenStream::default();

        for kind in [Kind::String, Kind::Integer, Kind::Double, Kind::Path, Kind::Uri] {
            let msg = format!("kind: {:?}", kind);

            let result = kind.convert(&mut stream, OPT);

            assert_eq!(
                result,
                Err(ParseError::MissingArgument { option: OPT.into() }),
                "{}",
                msg
            );
        }
    }

    #[test]
    fn test_normalise_path() {
        let expected: PathBuf = ["a", "b", "c.txt"].iter().collect::<PathBuf>();

        assert_eq!(normalise_path("a/b/c.txt"), expected);
        assert_eq!(normalise_path("a\\b\\c.txt"), expected);
        assert_eq!(normalise_path("a/b\\c.txt"), expected);
    }

    #[test]
    fn test_parse_uri() {
        let url = parse_uri("http://example.com/x\\y").unwrap();
        assert_eq!(url.as_str(), "http://example.com/x/y");

        let url = parse_uri("C:\\Temp\\file.txt").unwrap();
        assert_eq!(url.scheme(), "file");
        assert_eq!(url.path(), "/C:/Temp/file.txt");

        let url = parse_uri("\\\\server\\share\\doc").unwrap();
        assert_eq!(url.scheme(), "file");
        assert_eq!(url.host_str(), Some("server"));
        assert_eq!(url.path(), "/share/doc");

        let url = parse_uri("data/input.txt").unwrap();
        let base = Url::from_directory_path(env::current_dir().unwrap()).unwrap();
        assert_eq!(url, base.join("data/input.txt").unwrap());

        assert!(parse_uri("").is_err());
        assert!(parse_uri("http://[::1").is_err());
    }

    #[test]
    fn test_custom_kind() {
        let converter: Converter = Arc::new(|stream, option| {
            let a = stream.require(option)?;
            let b = stream.require(option)?;

            Ok(Value::String(format!("{}..{}", a, b)))
        });

        let kind = Kind::Custom {
            converter,
            metavar: Some("FROM TO".into()),
        };

        let mut stream = TokenStream::new(vec!["1", "9", "rest"]);

        assert_eq!(kind.convert(&mut stream, OPT), Ok(Value::String("1..9".into())));
        assert_eq!(stream.peek(), Some("rest"));
        assert_eq!(kind.arity(), None);
        assert_eq!(kind.default_metavar(), Some("FROM TO".into()));
    }

    #[test]
    fn test_default_metavars() {
        assert_eq!(Kind::String.default_metavar(), Some("STRING".into()));
        assert_eq!(Kind::Path.default_metavar(), Some("FILE".into()));
        assert_eq!(KindTag::Flag.kind().default_metavar(), None);

        let kind = Kind::Enumeration {
            symbols: vec!["a".into(), "b".into()],
        };
        assert_eq!(kind.default_metavar(), Some("{a|b}".into()));
    }

    #[test]
    fn test_check() {
        assert!(Kind::String.check().is_ok());

        let empty = Kind::Enumeration { symbols: vec![] };
        assert!(empty.check().is_err());

        let twice = Kind::Enumeration {
            symbols: vec!["a".into(), "a".into()],
        };
        assert!(twice.check().is_err());
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(KindTag::Flag.default_value(), Some(Value::Boolean(false)));
        assert_eq!(KindTag::InvertedFlag.default_value(), Some(Value::Boolean(true)));
        assert_eq!(KindTag::Integer.default_value(), None);
        assert_eq!(KindTag::Uri.kind().name(), "Uri");

        let colours = KindTag::Enumeration(&["red", "green"]);
        assert_eq!(colours.default_value(), None);
        assert_eq!(colours.kind().default_metavar(), Some("{red|green}".into()));
        assert!(colours.kind().check().is_ok());
        assert!(KindTag::Enumeration(&[]).kind().check().is_err());
    }

    #[test]
    fn test_file_name_patterns() {
        let tests = &[
            ("C:\\x", true, false),
            ("c:/x", true, false),
            ("C:x", false, false),
            ("\\\\server\\share", false, true),
            ("//server/share", false, true),
            ("/tmp", false, false),
            ("http://host/", false, false),
        ];

        for (i, (text, drive, unc)) in tests.iter().enumerate() {
            let msg = format!("test[{}]: {:?}", i, text);

            assert_eq!(is_drive_letter_path(text), Ok(*drive), "{}", msg);
            assert_eq!(is_unc_path(text), Ok(*unc), "{}", msg);
        }
    }
}
