// ─── Conditional Evaluator ───
// `when TEST... : DIRECTIVE...` guard chains.

use std::cmp::Ordering;

use regex::Regex;

use super::compare::{param_compare, version_compare};
use super::descriptor::compile_full_match;
use super::environment::Environment;
use super::expand::expand;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::props::PropertySource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Relation {
    fn holds(self, ord: Ordering) -> bool {
        match self {
            Relation::Greater => ord == Ordering::Greater,
            Relation::GreaterOrEqual => ord != Ordering::Less,
            Relation::Less => ord == Ordering::Less,
            Relation::LessOrEqual => ord != Ordering::Greater,
        }
    }
}

/// One test of a chain. Borrowed words are expanded only at evaluation.
#[derive(Debug)]
enum Test<'w> {
    Empty(&'w str),
    NonEmpty(&'w str),
    Equal(&'w str, &'w str),
    NotEqual(&'w str, &'w str),
    /// Pattern is taken literally; only the subject is expanded.
    Matches(Regex, &'w str),
    Param(Relation, &'w str, &'w str),
    Version(Relation, &'w str, &'w str),
}

impl Test<'_> {
    fn passes(&self, env: &Environment, props: &dyn PropertySource) -> LauncherResult<bool> {
        let x = |word: &str| expand(word, env, props);
        Ok(match *self {
            Test::Empty(w) => x(w)?.is_empty(),
            Test::NonEmpty(w) => !x(w)?.is_empty(),
            Test::Equal(a, b) => x(a)? == x(b)?,
            Test::NotEqual(a, b) => x(a)? != x(b)?,
            Test::Matches(ref pattern, subject) => pattern.is_match(&x(subject)?),
            Test::Param(rel, a, b) => rel.holds(param_compare(&x(a)?, &x(b)?)),
            Test::Version(rel, a, b) => rel.holds(version_compare(&x(a)?, &x(b)?)),
        })
    }
}

/// A parsed guard chain and the directive it guards.
#[derive(Debug)]
pub struct Conditional<'w> {
    tests: Vec<Test<'w>>,
    body: &'w [String],
}

impl<'w> Conditional<'w> {
    /// Parse the words of a `when` line, keyword included.
    pub fn parse(words: &'w [String]) -> LauncherResult<Self> {
        let mut tests = Vec::new();
        let mut rest = words.get(1..).unwrap_or_default();

        loop {
            let Some((op, tail)) = rest.split_first() else {
                return Err(LauncherError::UnterminatedConditional(words.join(" ")));
            };
            let op = op.as_str();
            if op == ":" {
                return Ok(Self { tests, body: tail });
            }

            let arity = match op {
                "!" => 1,
                "==" | "!=" | ">" | ">=" | "<" | "<=" | ".>" | ".>=" | ".<" | ".<=" => 2,
                _ if op.starts_with("~=") => 2,
                _ => 0,
            };
            if tail.len() < arity {
                return Err(LauncherError::MissingOperand {
                    operator: op.to_string(),
                    words: words.join(" "),
                });
            }
            let a = tail.first().map(String::as_str).unwrap_or_default();
            let b = tail.get(1).map(String::as_str).unwrap_or_default();

            let test = match op {
                "!" => Test::Empty(a),
                "==" => Test::Equal(a, b),
                "!=" => Test::NotEqual(a, b),
                ">" => Test::Param(Relation::Greater, a, b),
                ">=" => Test::Param(Relation::GreaterOrEqual, a, b),
                "<" => Test::Param(Relation::Less, a, b),
                "<=" => Test::Param(Relation::LessOrEqual, a, b),
                ".>" => Test::Version(Relation::Greater, a, b),
                ".>=" => Test::Version(Relation::GreaterOrEqual, a, b),
                ".<" => Test::Version(Relation::Less, a, b),
                ".<=" => Test::Version(Relation::LessOrEqual, a, b),
                _ if op.starts_with("~=") => {
                    Test::Matches(compile_full_match(a, op[2..].contains('i'))?, b)
                }
                _ => Test::NonEmpty(op),
            };
            tests.push(test);
            rest = &tail[arity..];
        }
    }

    /// Evaluate left to right, stopping at the first failing test.
    pub fn holds(&self, env: &Environment, props: &dyn PropertySource) -> LauncherResult<bool> {
        for test in &self.tests {
            if !test.passes(env, props)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Directive words following the `:` terminator.
    pub fn body(&self) -> &'w [String] {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::words::split_words;
    use std::collections::HashMap;

    fn eval(line: &str, env: &Environment) -> LauncherResult<Option<Vec<String>>> {
        let words = split_words(line).unwrap();
        let props: HashMap<String, String> =
            HashMap::from([("os.name".to_string(), "Windows 10".to_string())]);
        let cond = Conditional::parse(&words)?;
        Ok(cond.holds(env, &props)?.then(|| cond.body().to_vec()))
    }

    fn passes(line: &str) -> bool {
        let env = Environment::new()
            .with_parameter("v".into(), "1.8.0".into())
            .with_parameter("n".into(), "12".into());
        eval(line, &env).unwrap().is_some()
    }

    #[test]
    fn equality_tests() {
        assert!(passes("when == a a : title x"));
        assert!(!passes("when == a b : title x"));
        assert!(passes("when != a b : title x"));
        assert!(passes("when == ${n} 12 : title x"));
    }

    #[test]
    fn emptiness_tests() {
        assert!(passes("when ${n} : title x"));
        assert!(!passes("when ${absent} : title x"));
        assert!(passes("when ! ${absent} : title x"));
        assert!(!passes("when ! ${n} : title x"));
    }

    #[test]
    fn numeric_relations() {
        assert!(passes("when > ${n} 9 : t"));
        assert!(passes("when >= 12 ${n} : t"));
        assert!(!passes("when < ${n} 12 : t"));
        assert!(passes("when <= ${n} 12 : t"));
        assert!(passes("when < abc 0 : t"));
    }

    #[test]
    fn version_relations() {
        assert!(passes("when .> ${v} 1.7.9 : t"));
        assert!(passes("when .< ${v} 1.10 : t"));
        assert!(passes("when .>= ${v} 1.8.0 : t"));
        assert!(!passes("when .<= ${v} 1.8 : t"));
    }

    #[test]
    fn regex_matches_fully_and_honours_case_flag() {
        assert!(passes("when ~=i win.* ${p:os.name} : t"));
        assert!(!passes("when ~= win.* ${p:os.name} : t"));
        assert!(!passes("when ~=i win ${p:os.name} : t"));
    }

    #[test]
    fn regex_pattern_is_not_expanded() {
        // `$]` would be a malformed expansion if the pattern were expanded.
        assert!(passes("when ~= [$]x $$x : t"));
        assert!(!passes("when ~= [$]x x : t"));
    }

    #[test]
    fn empty_chain_always_passes() {
        assert_eq!(
            eval("when : set a b", &Environment::new()).unwrap(),
            Some(vec!["set".to_string(), "a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn short_circuit_skips_later_expansion_errors() {
        assert!(!passes("when == a b $bad : t"));
    }

    #[test]
    fn missing_terminator_is_an_error() {
        assert!(matches!(
            eval("when == a a title x", &Environment::new()),
            Err(LauncherError::UnterminatedConditional(_))
        ));
        assert!(matches!(
            eval("when", &Environment::new()),
            Err(LauncherError::UnterminatedConditional(_))
        ));
    }

    #[test]
    fn missing_operands_are_an_error() {
        assert!(matches!(
            eval("when ==", &Environment::new()),
            Err(LauncherError::MissingOperand { .. })
        ));
        assert!(matches!(
            eval("when .>= 1", &Environment::new()),
            Err(LauncherError::MissingOperand { .. })
        ));
        assert!(matches!(
            eval("when !", &Environment::new()),
            Err(LauncherError::MissingOperand { .. })
        ));
    }
}
