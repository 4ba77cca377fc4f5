// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::collections::VecDeque;

use crate::error::ParseError;

/// Cursor over the command-line tokens still to be parsed.
///
/// Option kinds read their argument tokens from the stream. Only one token
/// of lookahead ([TokenStream::peek()]) is available, but a kind may
/// consume as many tokens as it needs.
///
/// Tokens can be spliced back in front of the cursor with
/// [TokenStream::prepend()]; the parser uses this to turn the value of
/// `--name=value` into an ordinary next token and to expand `@file`
/// directives.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenStream {
    tokens: VecDeque<String>,

    /// Number of tokens handed out so far.
    consumed: usize,
}

impl TokenStream {
    /// Create a stream over the specified tokens (without the program name).
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TokenStream {
            tokens: tokens.into_iter().map(Into::into).collect(),
            consumed: 0,
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> Option<&str> {
        self.tokens.front().map(String::as_str)
    }

    /// Consume and return the next token.
    pub fn consume(&mut self) -> Option<String> {
        let token = self.tokens.pop_front()?;
        self.consumed += 1;

        Some(token)
    }

    /// Consume the next token, failing with [ParseError::MissingArgument]
    /// for `option` if the stream is exhausted.
    ///
    /// This is what every value-taking kind uses to read its argument.
    pub fn require(&mut self, option: &str) -> Result<String, ParseError> {
        self.consume().ok_or_else(|| ParseError::MissingArgument {
            option: option.into(),
        })
    }

    /// Splice a single token in immediately ahead of the cursor.
    pub fn prepend(&mut self, token: impl Into<String>) {
        let token = token.into();

        log::trace!("prepending token {:?}", token);

        self.tokens.push_front(token);
    }

    /// Splice a sequence of tokens in immediately ahead of the cursor,
    /// preserving their order.
    pub fn prepend_all<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: DoubleEndedIterator,
        S: Into<String>,
    {
        for token in tokens.into_iter().rev() {
            self.prepend(token);
        }
    }

    /// Returns `true` if there are no tokens left.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the number of tokens left.
    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }

    /// Returns the number of tokens consumed since the stream was created.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_and_consume() {
        let mut stream = TokenStream::new(vec!["-a", "foo"]);

        assert_eq!(stream.remaining(), 2);
        assert_eq!(stream.peek(), Some("-a"));

        // Peeking must not move the cursor.
        assert_eq!(stream.peek(), Some("-a"));
        assert_eq!(stream.consumed(), 0);

        assert_eq!(stream.consume(), Some("-a".to_string()));
        assert_eq!(stream.consume(), Some("foo".to_string()));
        assert_eq!(stream.consumed(), 2);

        assert!(stream.is_empty());
        assert_eq!(stream.peek(), None);
        assert_eq!(stream.consume(), None);
        assert_eq!(stream.consumed(), 2);
    }

    #[test]
    fn test_prepend() {
        let mut stream = TokenStream::new(vec!["--out=file", "rest"]);

        let token = stream.consume().unwrap();
        let (_, tail) = token.split_once('=').unwrap();

        stream.prepend(tail);

        assert_eq!(stream.remaining(), 2);
        assert_eq!(stream.consume(), Some("file".to_string()));
        assert_eq!(stream.consume(), Some("rest".to_string()));
    }

    #[test]
    fn test_prepend_all() {
        let mut stream = TokenStream::new(vec!["@args", "last"]);

        let _ = stream.consume();
        stream.prepend_all(vec!["one", "two", "three"]);

        let all: Vec<String> = std::iter::from_fn(|| stream.consume()).collect();

        assert_eq!(all, vec!["one", "two", "three", "last"]);
    }

    #[test]
    fn test_require() {
        let mut stream = TokenStream::new(vec!["value"]);

        assert_eq!(stream.require("--name=STRING"), Ok("value".to_string()));

        let result = stream.require("--name=STRING");

        assert_eq!(
            result,
            Err(ParseError::MissingArgument {
                option: "--name=STRING".into()
            })
        );
    }

    #[test]
    fn test_empty_stream() {
        let stream = TokenStream::new(Vec::<String>::new());
        let def_stream = TokenStream::default();

        assert!(stream.is_empty());
        assert_eq!(stream, def_stream);
    }
}
