use std::fmt;

use crate::diag::ParseLog;
use crate::registry::TypeHandle;

/// Descriptor of one `%…%` placeholder after name resolution: the singular
/// type name, whether the slot accepts multiple values, and the requested
/// tense shift (`-1` past, `0` present, `+1` future).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarInfo {
    pub name: String,
    pub is_plural: bool,
    pub time: i32,
}

/// Owned snapshot of one `<…>` regex slot match, in source-pattern order.
#[derive(Debug, Clone)]
pub struct RegexMatch {
    groups: Vec<Option<String>>,
}

impl RegexMatch {
    pub(crate) fn from_captures(caps: &regex::Captures<'_>) -> Self {
        RegexMatch {
            groups: caps
                .iter()
                .map(|m| m.map(|m| m.as_str().to_string()))
                .collect(),
        }
    }

    /// Text of capture group `i`; group 0 is the whole matched span.
    pub fn group(&self, i: usize) -> Option<&str> {
        self.groups.get(i).and_then(|g| g.as_deref())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// Outcome of matching one pattern against the whole input: the source
/// text, one binding slot per placeholder, and the regex slot matches.
///
/// Slots of optional placeholders that went unbound (and had no default to
/// bind) stay `None`.
#[derive(Debug)]
pub struct MatchResult {
    pub source: String,
    pub bindings: Vec<Option<Box<dyn Expr>>>,
    pub regexes: Vec<RegexMatch>,
    pub(crate) matched_chars: usize,
}

impl MatchResult {
    pub(crate) fn new(source: &str, slots: usize, matched_chars: usize) -> Self {
        MatchResult {
            source: source.to_string(),
            bindings: (0..slots).map(|_| None).collect(),
            regexes: Vec::new(),
            matched_chars,
        }
    }

    /// Move binding `i` out of the result. Convenient in `init`
    /// implementations that claim their slots one by one.
    pub fn take_binding(&mut self, i: usize) -> Option<Box<dyn Expr>> {
        self.bindings.get_mut(i).and_then(Option::take)
    }
}

/// A runtime expression produced by a definition's factory, or bound into a
/// placeholder slot.
///
/// `init` runs once, right after the factory, with the full match; returning
/// `false` rejects the match (silently when nothing was logged, as a ranked
/// semantic error otherwise).
pub trait Expr: fmt::Debug {
    fn init(&mut self, _m: MatchResult, _pattern_index: usize, _log: &mut ParseLog) -> bool {
        true
    }

    /// Name of the registered type this expression produces.
    fn type_name(&self) -> &str;

    /// Whether this expression yields exactly one value.
    fn is_single(&self) -> bool {
        true
    }

    /// Switch the expression to a past (`-1`) or future (`+1`) view.
    /// Returns `false` when the expression has no such state.
    fn set_time(&mut self, _time: i32) -> bool {
        false
    }

    /// Convert to the target type, or hand `self` back so the caller can
    /// still render it in a diagnostic. A typical implementation accepts
    /// the universal type and its own type:
    ///
    /// ```ignore
    /// fn into_converted(self: Box<Self>, to: &TypeHandle) -> Result<Box<dyn Expr>, Box<dyn Expr>> {
    ///     if to.is_universal() || to.name() == self.type_name() { Ok(self) } else { Err(self) }
    /// }
    /// ```
    fn into_converted(self: Box<Self>, to: &TypeHandle) -> Result<Box<dyn Expr>, Box<dyn Expr>>;

    /// Human-readable rendering used in diagnostics.
    fn render(&self) -> String;
}

/// An event header produced by an event definition's factory. Bindings
/// reaching `init` are literals: event headers are parsed statically.
pub trait Event: fmt::Debug {
    fn init(&mut self, _m: MatchResult, _pattern_index: usize, _log: &mut ParseLog) -> bool {
        true
    }

    fn render(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_match_result_has_unbound_slots() {
        let m = MatchResult::new("give sword to alice", 2, 4);
        assert_eq!(m.bindings.len(), 2);
        assert!(m.bindings.iter().all(Option::is_none));
        assert_eq!(m.source, "give sword to alice");
    }

    #[test]
    fn take_binding_leaves_none_behind() {
        #[derive(Debug)]
        struct Probe;
        impl Expr for Probe {
            fn type_name(&self) -> &str {
                "probe"
            }
            fn into_converted(
                self: Box<Self>,
                _to: &TypeHandle,
            ) -> Result<Box<dyn Expr>, Box<dyn Expr>> {
                Ok(self)
            }
            fn render(&self) -> String {
                "probe".into()
            }
        }

        let mut m = MatchResult::new("x", 1, 0);
        m.bindings[0] = Some(Box::new(Probe));
        assert!(m.take_binding(0).is_some());
        assert!(m.take_binding(0).is_none());
        assert!(m.take_binding(7).is_none());
    }

    #[test]
    fn regex_match_exposes_groups() {
        let re = regex::Regex::new(r"^(\d+)(?:\.(\d+))?$").unwrap();
        let caps = re.captures("42").unwrap();
        let m = RegexMatch::from_captures(&caps);
        assert_eq!(m.group(0), Some("42"));
        assert_eq!(m.group(1), Some("42"));
        assert_eq!(m.group(2), None);
        assert_eq!(m.group_count(), 3);
    }
}
