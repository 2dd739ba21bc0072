//! Compiled scan rules.
//!
//! [`RuleSetBuilder`] is the configuration phase: rules are registered in
//! priority order, optionally bound to lexer states. [`RuleSetBuilder::build`]
//! freezes everything into an immutable [`RuleSet`], which scan sessions
//! share via `Arc`. A session never observes rule mutation.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::error::ScanError;
use crate::token::TokenType;

/// Marker for lexer state enums of a stateful scanner.
///
/// The default state is *not* part of this enum; it is represented as
/// `None` wherever a state is optional.
pub trait LexerState: Copy + Eq + Hash + fmt::Debug {}

impl<S> LexerState for S where S: Copy + Eq + Hash + fmt::Debug {}

/// State enum for scanners that have no states besides the default.
///
/// Uninhabited, so a `Scanner<T, Stateless>` can only ever be in the
/// default state and only the default rule list exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stateless {}

/// Where the scanner goes after a rule fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextState<S> {
    /// Stay in whatever state the rule fired in.
    Remain,
    /// Go (back) to the default state.
    Default,
    /// Go to the given non-default state.
    State(S),
}

/// One compiled scan rule.
pub(crate) struct Rule<T: TokenType, S: LexerState> {
    pub(crate) pattern: Regex,
    pub(crate) token_type: T,
    pub(crate) next: NextState<S>,
}

impl<T: TokenType, S: LexerState> fmt::Debug for Rule<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern.as_str())
            .field("token_type", &self.token_type)
            .field("next", &self.next)
            .finish()
    }
}

/// Compile a rule pattern with `lookingAt` semantics: the match must start
/// exactly at the cursor but need not consume the rest of the input.
fn compile_anchored(pattern: &str) -> Result<Regex, ScanError> {
    Regex::new(&format!(r"\A(?:{pattern})")).map_err(|e| ScanError::Pattern {
        pattern: pattern.to_owned(),
        message: e.to_string(),
    })
}

enum Registration<T: TokenType, S: LexerState> {
    /// Applies in the default state only.
    Default(Rule<T, S>),
    /// Applies in the listed non-default states.
    States(Vec<S>, Rule<T, S>),
    /// Applies in every non-default state.
    AnyState(Rule<T, S>),
}

/// Configuration-phase rule registration.
///
/// Rules apply in the order they are registered: the first rule whose
/// pattern matches at the current offset fires, even if a later rule would
/// match more input.
pub struct RuleSetBuilder<T: TokenType, S: LexerState> {
    registrations: Vec<Registration<T, S>>,
    /// States seen so far, in first-mention order. A state mentioned only
    /// as a transition target still gets a rule list (the any-state rules).
    states: Vec<S>,
}

impl<T: TokenType, S: LexerState> Default for RuleSetBuilder<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TokenType, S: LexerState> RuleSetBuilder<T, S> {
    pub fn new() -> Self {
        RuleSetBuilder {
            registrations: Vec::new(),
            states: Vec::new(),
        }
    }

    fn note_state(&mut self, state: S) {
        if !self.states.contains(&state) {
            self.states.push(state);
        }
    }

    fn note_next(&mut self, next: NextState<S>) {
        if let NextState::State(s) = next {
            self.note_state(s);
        }
    }

    /// Register a default-state rule that stays in the default state.
    pub fn rule(&mut self, pattern: &str, token_type: T) -> Result<&mut Self, ScanError> {
        self.rule_to(pattern, token_type, NextState::Remain)
    }

    /// Register a default-state rule with an explicit next state.
    pub fn rule_to(
        &mut self,
        pattern: &str,
        token_type: T,
        next: NextState<S>,
    ) -> Result<&mut Self, ScanError> {
        let rule = Rule {
            pattern: compile_anchored(pattern)?,
            token_type,
            next,
        };
        self.note_next(next);
        self.registrations.push(Registration::Default(rule));
        Ok(self)
    }

    /// Register a rule applying in one or several non-default states.
    pub fn state_rule(
        &mut self,
        states: &[S],
        pattern: &str,
        token_type: T,
        next: NextState<S>,
    ) -> Result<&mut Self, ScanError> {
        let rule = Rule {
            pattern: compile_anchored(pattern)?,
            token_type,
            next,
        };
        for &s in states {
            self.note_state(s);
        }
        self.note_next(next);
        self.registrations
            .push(Registration::States(states.to_vec(), rule));
        Ok(self)
    }

    /// Register a rule applying in *any* non-default state.
    pub fn any_state_rule(
        &mut self,
        pattern: &str,
        token_type: T,
        next: NextState<S>,
    ) -> Result<&mut Self, ScanError> {
        let rule = Rule {
            pattern: compile_anchored(pattern)?,
            token_type,
            next,
        };
        self.note_next(next);
        self.registrations.push(Registration::AnyState(rule));
        Ok(self)
    }

    /// Freeze the registered rules into an immutable, shareable rule set.
    pub fn build(self) -> Arc<RuleSet<T, S>> {
        let mut default_rules = Vec::new();
        let mut state_rules: FxHashMap<S, Vec<Rule<T, S>>> = self
            .states
            .iter()
            .map(|&s| (s, Vec::new()))
            .collect();

        // Distribute registrations, preserving relative order within each
        // state's list.
        for registration in self.registrations {
            match registration {
                Registration::Default(rule) => default_rules.push(rule),
                Registration::States(states, rule) => {
                    for state in states {
                        if let Some(list) = state_rules.get_mut(&state) {
                            list.push(rule.clone_rule());
                        }
                    }
                }
                Registration::AnyState(rule) => {
                    for list in state_rules.values_mut() {
                        list.push(rule.clone_rule());
                    }
                }
            }
        }

        Arc::new(RuleSet {
            default_rules,
            state_rules,
        })
    }
}

impl<T: TokenType, S: LexerState> Rule<T, S> {
    /// Compiled `Regex` is cheaply cloneable (internally ref-counted), so
    /// distributing one registration over several state lists is cheap.
    fn clone_rule(&self) -> Self {
        Rule {
            pattern: self.pattern.clone(),
            token_type: self.token_type,
            next: self.next,
        }
    }
}

/// An immutable, compiled set of scan rules.
///
/// This is the shared half of the grammar/session split: sessions
/// ([`Scanner`](crate::Scanner)) hold an `Arc<RuleSet>` plus their own
/// cursor and state.
pub struct RuleSet<T: TokenType, S: LexerState> {
    default_rules: Vec<Rule<T, S>>,
    state_rules: FxHashMap<S, Vec<Rule<T, S>>>,
}

impl<T: TokenType, S: LexerState> RuleSet<T, S> {
    /// The ordered rule list for the given state (`None` = default state).
    ///
    /// A state with no rules of its own yields an empty list, which makes
    /// every character a scan error there.
    pub(crate) fn rules_for(&self, state: Option<S>) -> &[Rule<T, S>] {
        match state {
            None => &self.default_rules,
            Some(s) => self.state_rules.get(&s).map_or(&[], Vec::as_slice),
        }
    }

    /// Display names of the token types legal in the given state, in rule
    /// order, deduplicated. This is what scan errors report.
    pub(crate) fn expected_in(&self, state: Option<S>) -> Vec<String> {
        let mut seen = Vec::new();
        for rule in self.rules_for(state) {
            let name = rule.token_type.to_string();
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }
}

impl<T: TokenType, S: LexerState> fmt::Debug for RuleSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("default_rules", &self.default_rules.len())
            .field("states", &self.state_rules.len())
            .finish()
    }
}
