//! Leaf literals.
//!
//! A placeholder span that resolves to no registered variable falls back to
//! an [`UnparsedLiteral`]: the raw text split into an ordered list with an
//! and/or flag, pending conversion to a typed [`LiteralList`] through the
//! target type's literal parser.

use std::sync::OnceLock;

use regex::Regex;

use crate::diag::ParseLog;
use crate::lang::expr::Expr;
use crate::registry::english::with_article;
use crate::registry::{Registry, TypeHandle};

/// Matches text up to a list separator without ever crossing a quoted
/// region, so quoted commas and conjunctions stay inside their part.
pub const WILDCARD: &str = r#"[^"]*?(?:"[^"]*?"[^"]*?)*?"#;

/// Matches one quoted string; `""` is an embedded quote.
pub const STRING_MATCHER: &str = r#""[^"]*?(?:""[^"]*)*?""#;

fn list_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^({WILDCARD})(,\s*|,?\s+and\s+|,?\s+n?or\s+)"))
            .expect("list splitter regex")
    })
}

/// A separator that is a bare comma, contributing no conjunction.
fn is_bare_comma(sep: &str) -> bool {
    sep.strip_prefix(',')
        .is_some_and(|rest| rest.chars().all(char::is_whitespace))
}

/// An untyped literal list: trimmed parts plus whether they are joined by
/// `and` (the default) or `or`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsedLiteral {
    parts: Vec<String>,
    is_and: bool,
}

impl UnparsedLiteral {
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn is_and(&self) -> bool {
        self.is_and
    }

    /// Convert every part through the type's literal parser. Any part the
    /// parser rejects fails the whole conversion with an error in `log`.
    pub(crate) fn convert(
        self,
        to: &TypeHandle,
        registry: &Registry,
        log: &mut ParseLog,
    ) -> Option<LiteralList> {
        let parse = registry.type_info(to.name()).and_then(|t| t.parse);
        let Some(parse) = parse else {
            log.error(format!(
                "'{}' cannot be understood as {}",
                self.render(),
                with_article(to.display())
            ));
            return None;
        };
        let mut items = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            match parse(part) {
                Some(value) => items.push(value),
                None => {
                    log.error(format!(
                        "'{part}' is not {}",
                        with_article(to.display())
                    ));
                    return None;
                }
            }
        }
        Some(LiteralList {
            type_name: to.name().to_string(),
            items,
            is_and: self.is_and,
        })
    }
}

impl Expr for UnparsedLiteral {
    fn type_name(&self) -> &str {
        TypeHandle::UNIVERSAL
    }

    fn is_single(&self) -> bool {
        self.parts.len() == 1
    }

    fn into_converted(self: Box<Self>, to: &TypeHandle) -> Result<Box<dyn Expr>, Box<dyn Expr>> {
        if to.is_universal() {
            Ok(self)
        } else {
            Err(self)
        }
    }

    fn render(&self) -> String {
        join_list(self.parts.iter().map(String::as_str), self.is_and)
    }
}

/// A typed literal list produced by converting an [`UnparsedLiteral`].
#[derive(Debug)]
pub struct LiteralList {
    type_name: String,
    items: Vec<Box<dyn Expr>>,
    is_and: bool,
}

impl LiteralList {
    pub fn items(&self) -> &[Box<dyn Expr>] {
        &self.items
    }

    pub fn is_and(&self) -> bool {
        self.is_and
    }

    pub fn into_items(self) -> Vec<Box<dyn Expr>> {
        self.items
    }
}

impl Expr for LiteralList {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn is_single(&self) -> bool {
        self.items.len() == 1
    }

    fn set_time(&mut self, time: i32) -> bool {
        self.items.iter_mut().all(|item| item.set_time(time))
    }

    fn into_converted(self: Box<Self>, to: &TypeHandle) -> Result<Box<dyn Expr>, Box<dyn Expr>> {
        if to.is_universal() || to.name() == self.type_name {
            Ok(self)
        } else {
            Err(self)
        }
    }

    fn render(&self) -> String {
        join_list(self.items.iter().map(|i| i.render()), self.is_and)
    }
}

fn join_list<S: AsRef<str>>(parts: impl Iterator<Item = S>, is_and: bool) -> String {
    let parts: Vec<String> = parts.map(|s| s.as_ref().to_string()).collect();
    match parts.len() {
        0 => String::new(),
        1 => parts.into_iter().next().unwrap_or_default(),
        _ => {
            let conjunction = if is_and { "and" } else { "or" };
            let head = parts[..parts.len() - 1].join(", ");
            format!("{head} {conjunction} {}", parts[parts.len() - 1])
        }
    }
}

/// Split `input` into an [`UnparsedLiteral`].
///
/// The first `and`/`or`/`nor` separator fixes the conjunction; conflicting
/// or missing conjunctions warn and default to `and`.
pub(crate) fn split_literal_list(input: &str, log: &mut ParseLog) -> UnparsedLiteral {
    let re = list_splitter();
    let mut parts = Vec::new();
    let mut offset = 0;
    let mut is_and = true;
    let mut conjunction_seen = false;
    while let Some(caps) = re.captures(&input[offset..]) {
        let (Some(part), Some(sep)) = (caps.get(1), caps.get(2)) else {
            break;
        };
        if !is_bare_comma(sep.as_str()) {
            let sep_is_and = sep.as_str().contains("and");
            if !conjunction_seen {
                is_and = sep_is_and;
                conjunction_seen = true;
            } else if sep_is_and != is_and {
                log.warning(format!(
                    "list has multiple 'and' or 'or', will default to 'and': {input}"
                ));
                is_and = true;
            }
        }
        parts.push(part.as_str().trim().to_string());
        offset += sep.end();
    }
    if !conjunction_seen && !parts.is_empty() {
        log.warning(format!(
            "list is missing 'and' or 'or', will default to 'and': {input}"
        ));
    }
    parts.push(input[offset..].trim().to_string());
    UnparsedLiteral { parts, is_and }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Level;
    use rstest::rstest;

    fn split(input: &str) -> (UnparsedLiteral, Vec<String>) {
        let mut log = ParseLog::new();
        let lit = split_literal_list(input, &mut log);
        let warnings = log
            .take()
            .into_iter()
            .filter(|d| d.level == Level::Warning)
            .map(|d| d.message)
            .collect();
        (lit, warnings)
    }

    #[rstest]
    #[case::single("diamond sword", &["diamond sword"], true)]
    #[case::and_list("a, b and c", &["a", "b", "c"], true)]
    #[case::or_list("a, b or c", &["a", "b", "c"], false)]
    #[case::nor_list("a nor b", &["a", "b"], false)]
    #[case::comma_and("a, and b", &["a", "and b"], true)]
    fn splitting(#[case] input: &str, #[case] expected: &[&str], #[case] is_and: bool) {
        let (lit, _) = split(input);
        assert_eq!(lit.parts(), expected);
        assert_eq!(lit.is_and(), is_and);
    }

    #[test]
    fn bare_commas_warn_and_default_to_and() {
        let (lit, warnings) = split("a, b, c");
        assert_eq!(lit.parts(), &["a", "b", "c"]);
        assert!(lit.is_and());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("missing 'and' or 'or'"));
    }

    #[test]
    fn conflicting_conjunctions_warn_and_force_and() {
        let (lit, warnings) = split("a and b or c");
        assert_eq!(lit.parts(), &["a", "b", "c"]);
        assert!(lit.is_and());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("multiple 'and' or 'or'"));
    }

    #[test]
    fn repeated_same_conjunction_does_not_warn() {
        let (lit, warnings) = split("a and b and c");
        assert_eq!(lit.parts(), &["a", "b", "c"]);
        assert!(lit.is_and());
        assert!(warnings.is_empty());
    }

    #[test]
    fn quoted_regions_keep_their_commas() {
        let (lit, warnings) = split(r#""a, b" and c"#);
        assert_eq!(lit.parts(), &[r#""a, b""#, "c"]);
        assert!(lit.is_and());
        assert!(warnings.is_empty());
    }

    #[test]
    fn quoted_conjunction_is_not_a_separator() {
        let (lit, _) = split(r#""fish and chips""#);
        assert_eq!(lit.parts(), &[r#""fish and chips""#]);
    }

    #[test]
    fn single_part_never_warns() {
        let (lit, warnings) = split("alice");
        assert_eq!(lit.parts(), &["alice"]);
        assert!(warnings.is_empty());
    }

    #[rstest]
    #[case(&["a"], true, "a")]
    #[case(&["a", "b"], true, "a and b")]
    #[case(&["a", "b", "c"], false, "a, b or c")]
    fn rendering(#[case] parts: &[&str], #[case] is_and: bool, #[case] expected: &str) {
        let lit = UnparsedLiteral {
            parts: parts.iter().map(|s| s.to_string()).collect(),
            is_and,
        };
        assert_eq!(lit.render(), expected);
    }

    #[test]
    fn singleness_follows_part_count() {
        let (one, _) = split("alice");
        let (two, _) = split("alice and bob");
        assert!(one.is_single());
        assert!(!two.is_single());
    }
}
