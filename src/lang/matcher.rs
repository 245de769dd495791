//! Pattern-to-input matching engine.
//!
//! Matches one pattern against the whole input with recursive backtracking:
//! over the pattern tree (optional groups present/absent, alternation
//! branches in order) and over how input is split between placeholder
//! spans. Placeholder spans are resolved by recursively parsing them as
//! sub-expressions; failures feed a per-request best-error slot so the
//! driver can surface the single most informative diagnostic.

use crate::diag::ParseLog;
use crate::lang::error::{ApiError, ErrorQuality, ParseError, PatternError};
use crate::lang::expr::{Expr, MatchResult, RegexMatch};
use crate::lang::literal::split_literal_list;
use crate::lang::pattern::{
    Pattern, has_only, next_matching, next_plain, next_quote, next_unescaped, parse_slot,
    split_alternation,
};
use crate::registry::english::with_article;
use crate::registry::{Registry, TypeHandle};

/// Best user-input error seen so far in one parse request. `submit` keeps
/// the slot monotone: only a strictly better quality replaces the message,
/// so the earliest error of a given quality wins.
#[derive(Debug, Default)]
pub(crate) struct BestError {
    pub(crate) quality: ErrorQuality,
    pub(crate) message: Option<String>,
}

impl BestError {
    pub(crate) fn submit(&mut self, quality: ErrorQuality, message: impl FnOnce() -> String) {
        if quality > self.quality {
            self.quality = quality;
            self.message = Some(message());
        }
    }

    /// Adopt a nested parser's best error if it beats ours.
    pub(crate) fn promote_from(&mut self, inner: &BestError) {
        if inner.quality > self.quality {
            self.quality = inner.quality;
            self.message.clone_from(&inner.message);
        }
    }
}

/// Context of one parse request over one input string. Nested placeholder
/// parses get a fresh context over the placeholder span.
pub(crate) struct ExprParser<'r> {
    pub(crate) registry: &'r Registry,
    source: String,
    expr: Vec<char>,
    parse_static: bool,
    pub(crate) best: BestError,
}

/// Below this many matched literal characters, a failed placeholder span is
/// not worth a "'…' is not a …" diagnostic: the pattern barely fit at all.
const MIN_CONTEXT_FOR_ERROR: usize = 5;

impl<'r> ExprParser<'r> {
    pub(crate) fn new(registry: &'r Registry, input: &str, parse_static: bool) -> Self {
        ExprParser {
            registry,
            source: input.to_string(),
            expr: input.chars().collect(),
            parse_static,
            best: BestError::default(),
        }
    }

    pub(crate) fn input_is_empty(&self) -> bool {
        self.expr.is_empty()
    }

    /// Match `pat` starting at input index `i` and pattern index `j`.
    /// Success means both ran out together.
    pub(crate) fn match_at(
        &mut self,
        pat: &Pattern,
        i: usize,
        j: usize,
        log: &mut ParseLog,
    ) -> Result<Option<MatchResult>, ParseError> {
        let chars = pat.chars();
        let (mut i, mut j) = (i, j);
        let mut matched_chars = 0usize;

        while j < chars.len() {
            match chars[j] {
                '[' => {
                    if let Some(res) = self.match_at(pat, i, j + 1, log)? {
                        return Ok(Some(res));
                    }
                    let mut end = next_matching(chars, ']', '[', j + 1).ok_or_else(|| {
                        PatternError::UnclosedBracket {
                            pattern: pat.text().into(),
                            close: ']',
                        }
                    })?;
                    // The group is absent: swallow the padding space that
                    // kept the phrase natural when it was present.
                    if (has_only(chars, &['[', '('], 0, j) || chars[j - 1] == ' ')
                        && end + 1 < chars.len()
                        && chars[end + 1] == ' '
                    {
                        end += 1;
                    }
                    j = end + 1;
                }
                '(' => {
                    let end = next_matching(chars, ')', '(', j + 1).ok_or_else(|| {
                        PatternError::UnclosedBracket {
                            pattern: pat.text().into(),
                            close: ')',
                        }
                    })?;
                    for start in split_alternation(chars, j + 1, end) {
                        if let Some(res) = self.match_at(pat, i, start, log)? {
                            return Ok(Some(res));
                        }
                    }
                    return Ok(None);
                }
                '%' => return self.match_placeholder(pat, i, j, matched_chars, log),
                '<' => return self.match_regex_slot(pat, i, j, log),
                ')' | ']' => j += 1,
                '|' => {
                    // This alternative matched; skip to the end of the group.
                    j = next_matching(chars, ')', '(', j + 1).ok_or_else(|| {
                        PatternError::UnclosedBracket {
                            pattern: pat.text().into(),
                            close: ')',
                        }
                    })? + 1;
                }
                ' ' => {
                    if i == self.expr.len() || (i > 0 && self.expr[i - 1] == ' ') {
                        j += 1;
                    } else if self.expr[i] != ' ' {
                        return Ok(None);
                    } else {
                        matched_chars += 1;
                        i += 1;
                        j += 1;
                    }
                }
                head => {
                    let head = if head == '\\' {
                        j += 1;
                        if j == chars.len() {
                            return Err(PatternError::TrailingBackslash {
                                pattern: pat.text().into(),
                            }
                            .into());
                        }
                        chars[j]
                    } else {
                        head
                    };
                    if i == self.expr.len() || !eq_ignore_case(head, self.expr[i]) {
                        return Ok(None);
                    }
                    matched_chars += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        if i == self.expr.len() {
            Ok(Some(MatchResult::new(
                &self.source,
                pat.slot_count(),
                matched_chars,
            )))
        } else {
            Ok(None)
        }
    }

    /// Resolve the placeholder opening at `j`: search candidate right
    /// boundaries `i2` upward, require the rest of the pattern to match the
    /// rest of the input, then parse the span as a sub-expression of the
    /// declared type.
    fn match_placeholder(
        &mut self,
        pat: &Pattern,
        i: usize,
        j: usize,
        matched_chars: usize,
        log: &mut ParseLog,
    ) -> Result<Option<MatchResult>, ParseError> {
        let chars = pat.chars();
        if i == self.expr.len() {
            return Ok(None);
        }
        let end = next_unescaped(chars, '%', j + 1).ok_or_else(|| {
            PatternError::OddPercentCount {
                pattern: pat.text().into(),
            }
        })?;
        let body: String = chars[j + 1..end].iter().collect();
        let (vi, _optional) = parse_slot(&body, pat.text())?;
        let ty = self
            .registry
            .type_handle(&vi.name)
            .ok_or_else(|| ApiError::UnknownType(vi.name.clone()))?;

        let mut i2 = if end == chars.len() - 1 {
            // Final placeholder: greedy, take everything.
            self.expr.len()
        } else if self.expr[i] == '"' {
            match next_quote(&self.expr, i + 1) {
                Some(close) => close + 1,
                None => return Ok(None),
            }
        } else {
            i + 1
        };

        while i2 <= self.expr.len() {
            if i2 < self.expr.len() && self.expr[i2] == '"' {
                // Spans may not split quoted regions: snap past the quote.
                match next_quote(&self.expr, i2 + 1) {
                    Some(close) => i2 = close + 1,
                    None => return Ok(None),
                }
            }
            if let Some(mut res) = self.match_at(pat, i2, end + 1, log)? {
                let span: String = self.expr[i..i2].iter().collect();
                match self.resolve_var(&ty, &span, self.parse_static, log)? {
                    Some(mut value) => {
                        if !vi.is_plural && !value.is_single() {
                            self.best.submit(ErrorQuality::Semantic, || {
                                format!(
                                    "this expression can only accept a single {}, but multiple are given.",
                                    ty.display()
                                )
                            });
                            return Ok(None);
                        }
                        if vi.time != 0 && !value.set_time(vi.time) {
                            self.best.submit(ErrorQuality::Semantic, || {
                                format!(
                                    "{} does not have a {} state",
                                    value.render(),
                                    if vi.time == -1 { "past" } else { "future" }
                                )
                            });
                            return Ok(None);
                        }
                        res.bindings[pat.slot_index(j)] = Some(value);
                        return Ok(Some(res));
                    }
                    None => {
                        if res.matched_chars + matched_chars >= MIN_CONTEXT_FOR_ERROR {
                            self.best.submit(ErrorQuality::NotAVariable, || {
                                format!("'{span}' is not {}", with_article(ty.display()))
                            });
                        }
                    }
                }
            }
            i2 += 1;
        }
        Ok(None)
    }

    /// Match the `<…>` regex slot opening at `j` against every input split
    /// point whose remainder lets the rest of the pattern match.
    fn match_regex_slot(
        &mut self,
        pat: &Pattern,
        i: usize,
        j: usize,
        log: &mut ParseLog,
    ) -> Result<Option<MatchResult>, ParseError> {
        let chars = pat.chars();
        let end = next_plain(chars, '>', j + 1).ok_or_else(|| PatternError::UnclosedRegex {
            pattern: pat.text().into(),
        })?;
        let re = pat.regex_at(j).ok_or_else(|| PatternError::UnclosedRegex {
            pattern: pat.text().into(),
        })?;
        for i2 in (i + 1)..=self.expr.len() {
            if let Some(mut res) = self.match_at(pat, i2, end + 1, log)? {
                let span: String = self.expr[i..i2].iter().collect();
                if let Some(caps) = re.captures(&span) {
                    // Prepend: the tail's slots resolved first, source order
                    // is restored by inserting at the front.
                    res.regexes.insert(0, RegexMatch::from_captures(&caps));
                    return Ok(Some(res));
                }
            }
        }
        Ok(None)
    }

    /// Parse a placeholder span as a sub-expression of type `ty`: first as
    /// a registered variable (unless parsing statically), then as a
    /// literal.
    pub(crate) fn resolve_var(
        &mut self,
        ty: &TypeHandle,
        span: &str,
        literal_only: bool,
        log: &mut ParseLog,
    ) -> Result<Option<Box<dyn Expr>>, ParseError> {
        if !literal_only {
            log.start_sub();
            let mut inner = ExprParser::new(self.registry, span, false);
            let parsed = inner.parse_candidates(self.registry.variables(), log);
            log.stop_sub();
            match parsed? {
                Some(value) => {
                    return match value.into_converted(ty) {
                        Ok(converted) => Ok(Some(converted)),
                        Err(value) => {
                            self.best.submit(ErrorQuality::WrongType, || {
                                format!(
                                    "{} {} not {}",
                                    value.render(),
                                    if value.is_single() { "is" } else { "are" },
                                    with_article(ty.display())
                                )
                            });
                            Ok(None)
                        }
                    };
                }
                None => self.best.promote_from(&inner.best),
            }
        }
        let literal = split_literal_list(span, log);
        if ty.is_universal() {
            return Ok(Some(Box::new(literal)));
        }
        log.start_sub();
        let converted = literal.convert(ty, self.registry, log);
        let sub = log.stop_sub();
        match converted {
            Some(list) => Ok(Some(Box::new(list))),
            None => {
                self.best.submit(ErrorQuality::NotAVariable, || {
                    sub.last_error().map(str::to_string).unwrap_or_else(|| {
                        format!("'{span}' is not {}", with_article(ty.display()))
                    })
                });
                Ok(None)
            }
        }
    }
}

fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
