//! Scan sessions.
//!
//! A [`Scanner`] owns only per-scan state: the subject string, the cursor,
//! and the current lexer state tag. The rules live in a shared, immutable
//! [`RuleSet`]. One configured rule set can drive any number of
//! independent sessions (see [`Scanner::fork`]); a single session is not
//! safe for concurrent use.

use std::fmt;
use std::sync::Arc;

use crate::error::ScanError;
use crate::rules::{LexerState, NextState, RuleSet, Stateless};
use crate::token::{Token, TokenType};

/// A scanner without lexer states: only the default rule list exists.
pub type StatelessScanner<T> = Scanner<T, Stateless>;

/// A scan session over one subject string.
///
/// `produce()` is the only operation that mutates the cursor; `set_input`
/// resets it wholesale.
pub struct Scanner<T: TokenType, S: LexerState> {
    rules: Arc<RuleSet<T, S>>,
    input: String,
    /// Current read position (byte offset).
    offset: usize,
    /// Region limit; scanning stops here even if more input follows.
    end: usize,
    /// Start offset of the most recently produced token.
    previous_token_offset: usize,
    /// Current lexer state; `None` is the default state.
    state: Option<S>,
}

impl<T: TokenType, S: LexerState> Scanner<T, S> {
    /// Create a session over an empty subject.
    pub fn new(rules: Arc<RuleSet<T, S>>) -> Self {
        Scanner {
            rules,
            input: String::new(),
            offset: 0,
            end: 0,
            previous_token_offset: 0,
            state: None,
        }
    }

    /// Reset the session to scan `input` from the start, in the default
    /// state.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
        self.offset = 0;
        self.end = self.input.len();
        self.previous_token_offset = 0;
        self.state = None;
    }

    /// Restrict scanning to `start..end` of the current input.
    ///
    /// Offsets are clamped to the input length and inward to character
    /// boundaries, so a boundary inside a multi-byte character shrinks
    /// the region rather than splitting the character. `start` must not
    /// exceed `end`.
    pub fn set_region(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end, "region start {start} past end {end}");
        let mut end = end.min(self.input.len());
        while !self.input.is_char_boundary(end) {
            end -= 1;
        }
        let mut start = start.min(end);
        while !self.input.is_char_boundary(start) {
            start += 1;
        }
        self.offset = start;
        self.end = end;
        self.previous_token_offset = start;
    }

    /// The subject string.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current read position (byte offset into the subject).
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Start offset of the most recently produced token.
    pub fn previous_token_offset(&self) -> usize {
        self.previous_token_offset
    }

    /// The current lexer state; `None` is the default state.
    pub fn current_state(&self) -> Option<S> {
        self.state
    }

    /// Force the lexer state, e.g. when resuming inside a sub-pattern.
    pub fn set_current_state(&mut self, state: Option<S>) {
        self.state = state;
    }

    /// A new session sharing this session's rules, with a fresh cursor and
    /// the default state. Cheap: the rule tables are not copied.
    pub fn fork(&self) -> Self {
        Scanner::new(Arc::clone(&self.rules))
    }

    /// Produce the next token.
    ///
    /// Returns `Ok(None)` once the region is exhausted. Tries the current
    /// state's rules in registration order; the first rule whose pattern
    /// matches anchored at the current offset fires, the cursor advances
    /// past the match, and the state transitions per the rule. If no rule
    /// matches, the offending character, offset, full subject, and the
    /// token types legal in the current state are reported.
    pub fn produce(&mut self) -> Result<Option<Token<T>>, ScanError> {
        if self.offset >= self.end {
            return Ok(None);
        }
        let haystack = &self.input[self.offset..self.end];
        for rule in self.rules.rules_for(self.state) {
            let Some(captures) = rule.pattern.captures(haystack) else {
                continue;
            };
            let Some(whole) = captures.get(0) else {
                continue;
            };
            // A zero-length match cannot advance the cursor; treat it as
            // no match so scanning always terminates.
            if whole.end() == 0 {
                continue;
            }
            let captured = (1..captures.len())
                .map(|i| captures.get(i).map(|m| m.as_str().to_owned()))
                .collect();
            let token = Token::new(rule.token_type, whole.as_str(), captured);
            self.previous_token_offset = self.offset;
            self.offset += whole.end();
            self.state = match rule.next {
                NextState::Remain => self.state,
                NextState::Default => None,
                NextState::State(s) => Some(s),
            };
            return Ok(Some(token));
        }
        let character = self.input[self.offset..self.end]
            .chars()
            .next()
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        Err(ScanError::UnexpectedCharacter {
            character,
            offset: self.offset,
            input: self.input.clone(),
            expected: self.rules.expected_in(self.state),
        })
    }
}

/// Positional context for diagnostics: parsers embed this in their error
/// messages.
impl<T: TokenType, S: LexerState> fmt::Display for Scanner<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "offset {} of {:?}",
            self.previous_token_offset, self.input
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSetBuilder;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::fmt;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Tt {
        Word,
        Number,
        Space,
        TimeStart,
        Minute,
    }

    impl fmt::Display for Tt {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum St {
        Time,
    }

    fn word_rules() -> Arc<RuleSet<Tt, Stateless>> {
        let mut builder = RuleSetBuilder::new();
        builder.rule("[a-z]+", Tt::Word).expect("pattern");
        builder.rule("[0-9]+", Tt::Number).expect("pattern");
        builder.rule(" +", Tt::Space).expect("pattern");
        builder.build()
    }

    fn scan_all(scanner: &mut StatelessScanner<Tt>) -> Vec<Token<Tt>> {
        let mut out = Vec::new();
        while let Some(token) = scanner.produce().expect("scan") {
            out.push(token);
        }
        out
    }

    #[test]
    fn first_registered_rule_wins_over_longer_later_match() {
        // "ab" is matched by both rules; the first one (one char) fires
        // even though the second would match more input.
        let mut builder: RuleSetBuilder<Tt, Stateless> = RuleSetBuilder::new();
        builder.rule("[a-z]", Tt::Word).expect("pattern");
        builder.rule("[a-z]+", Tt::Number).expect("pattern");
        let mut scanner = Scanner::new(builder.build());
        scanner.set_input("ab");
        let tokens = scan_all(&mut scanner);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_type, Tt::Word);
        assert_eq!(tokens[0].text, "a");
        assert_eq!(tokens[1].token_type, Tt::Word);
    }

    #[test]
    fn tokens_are_contiguous_and_consume_everything() {
        let mut scanner = Scanner::new(word_rules());
        scanner.set_input("foo 17 bar");
        let tokens = scan_all(&mut scanner);
        let total: usize = tokens.iter().map(|t| t.text.len()).sum();
        assert_eq!(total, "foo 17 bar".len());
        assert_eq!(
            tokens.iter().map(|t| t.token_type).collect::<Vec<_>>(),
            vec![Tt::Word, Tt::Space, Tt::Number, Tt::Space, Tt::Word]
        );
    }

    #[test]
    fn no_match_reports_expected_token_types() {
        let mut scanner = Scanner::new(word_rules());
        scanner.set_input("foo!");
        assert_eq!(scan_all_until_error(&mut scanner), 1);
        let err = scanner.produce().expect_err("scan error");
        match err {
            ScanError::UnexpectedCharacter {
                character,
                offset,
                input,
                expected,
            } => {
                assert_eq!(character, '!');
                assert_eq!(offset, 3);
                assert_eq!(input, "foo!");
                assert_eq!(expected, vec!["Word", "Number", "Space"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    fn scan_all_until_error(scanner: &mut StatelessScanner<Tt>) -> usize {
        let mut n = 0;
        while let Ok(Some(_)) = scanner.produce() {
            n += 1;
        }
        n
    }

    #[test]
    fn stateful_time_of_day_sub_pattern() {
        // "12:" enters the Time state, where only a two-digit minute is
        // legal; the minute returns to the default state.
        let mut builder: RuleSetBuilder<Tt, St> = RuleSetBuilder::new();
        builder.rule("[a-z]+", Tt::Word).expect("pattern");
        builder.rule(" +", Tt::Space).expect("pattern");
        builder
            .rule_to("[0-9]{1,2}:", Tt::TimeStart, NextState::State(St::Time))
            .expect("pattern");
        builder
            .state_rule(&[St::Time], "[0-9]{2}", Tt::Minute, NextState::Default)
            .expect("pattern");
        let mut scanner = Scanner::new(builder.build());
        scanner.set_input("at 12:34 sharp");

        let mut kinds = Vec::new();
        let mut states = Vec::new();
        while let Some(token) = scanner.produce().expect("scan") {
            kinds.push(token.token_type);
            states.push(scanner.current_state());
        }
        assert_eq!(
            kinds,
            vec![
                Tt::Word,
                Tt::Space,
                Tt::TimeStart,
                Tt::Minute,
                Tt::Space,
                Tt::Word
            ]
        );
        // In the Time state exactly after "12:".
        assert_eq!(states[2], Some(St::Time));
        assert_eq!(states[3], None);
    }

    #[test]
    fn time_state_rejects_default_tokens() {
        let mut builder: RuleSetBuilder<Tt, St> = RuleSetBuilder::new();
        builder
            .rule_to("[0-9]{1,2}:", Tt::TimeStart, NextState::State(St::Time))
            .expect("pattern");
        builder
            .state_rule(&[St::Time], "[0-9]{2}", Tt::Minute, NextState::Default)
            .expect("pattern");
        let mut scanner = Scanner::new(builder.build());
        scanner.set_input("12:xx");
        scanner.produce().expect("time start");
        let err = scanner.produce().expect_err("minute required");
        match err {
            ScanError::UnexpectedCharacter { expected, .. } => {
                assert_eq!(expected, vec!["Minute"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn fork_shares_rules_but_not_cursor() {
        let mut scanner = Scanner::new(word_rules());
        scanner.set_input("abc def");
        scanner.produce().expect("scan");
        let mut child = scanner.fork();
        child.set_input("xyz");
        assert_eq!(scan_all(&mut child).len(), 1);
        // Parent picks up where it left off.
        let next = scanner.produce().expect("scan").expect("token");
        assert_eq!(next.token_type, Tt::Space);
    }

    #[test]
    fn set_region_limits_the_scan() {
        let mut scanner = Scanner::new(word_rules());
        scanner.set_input("abc def");
        scanner.set_region(4, 7);
        let tokens = scan_all(&mut scanner);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "def");
    }

    #[test]
    fn set_region_clamps_to_char_boundaries() {
        let mut scanner = Scanner::new(word_rules());
        scanner.set_input("\u{e9} abc");
        // Byte 1 is inside the two-byte 'é'; the region shrinks to the
        // next boundary instead of slicing mid-character.
        scanner.set_region(1, 5);
        let tokens = scan_all(&mut scanner);
        assert_eq!(
            tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(),
            vec![" ", "ab"]
        );
    }

    #[test]
    fn forced_state_resumes_inside_the_sub_pattern() {
        let mut builder: RuleSetBuilder<Tt, St> = RuleSetBuilder::new();
        builder.rule("[a-z]+", Tt::Word).expect("pattern");
        builder
            .rule_to("[0-9]{1,2}:", Tt::TimeStart, NextState::State(St::Time))
            .expect("pattern");
        builder
            .state_rule(&[St::Time], "[0-9]{2}", Tt::Minute, NextState::Default)
            .expect("pattern");
        let mut scanner = Scanner::new(builder.build());
        scanner.set_input("34x");
        scanner.set_current_state(Some(St::Time));
        let minute = scanner.produce().expect("scan").expect("token");
        assert_eq!(minute.token_type, Tt::Minute);
        assert_eq!(minute.text, "34");
        // The minute rule transitions back to the default state.
        assert_eq!(scanner.current_state(), None);
        let word = scanner.produce().expect("scan").expect("token");
        assert_eq!(word.token_type, Tt::Word);
    }

    #[test]
    fn captures_are_exposed_per_group() {
        let mut builder: RuleSetBuilder<Tt, Stateless> = RuleSetBuilder::new();
        builder
            .rule("([a-z]+)=([0-9]+)?", Tt::Word)
            .expect("pattern");
        let mut scanner = Scanner::new(builder.build());
        scanner.set_input("key=");
        let token = scanner.produce().expect("scan").expect("token");
        assert_eq!(token.captured(0), Some("key"));
        assert_eq!(token.captured(1), None);
        assert_eq!(token.captured_count(), 2);
    }

    proptest! {
        /// Scanning any subject built from the rule alphabet consumes
        /// exactly the whole input, with contiguous token spans.
        #[test]
        fn full_consumption(subject in "[a-z 0-9]{0,40}") {
            let mut scanner = Scanner::new(word_rules());
            scanner.set_input(subject.clone());
            let mut consumed = 0;
            while let Some(token) = scanner.produce().expect("scan") {
                prop_assert_eq!(scanner.previous_token_offset(), consumed);
                consumed += token.text.len();
            }
            prop_assert_eq!(consumed, subject.len());
        }
    }
}
