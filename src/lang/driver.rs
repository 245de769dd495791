//! Candidate search and the public parsing entry points.
//!
//! Tries every pattern of every candidate definition in registration order
//! and returns the first one that matches, binds, and initializes. Error
//! surfacing follows the quality ranking: a semantic error anywhere aborts
//! the whole search, weaker errors surface only when nothing matched.

use tracing::debug;

use crate::diag::ParseLog;
use crate::lang::error::{ApiError, ErrorQuality, ParseError, PatternError};
use crate::lang::expr::{Event, Expr, MatchResult};
use crate::lang::literal::split_literal_list;
use crate::lang::matcher::ExprParser;
use crate::lang::pattern::{Pattern, next_placeholder, next_unescaped, parse_slot};
use crate::registry::english::with_article;
use crate::registry::{EventInfo, ExpressionInfo, Registry};

impl<'r> ExprParser<'r> {
    /// Try every pattern of every candidate in order; return the first
    /// expression that matches and accepts its bindings.
    pub(crate) fn parse_candidates(
        &mut self,
        candidates: &[ExpressionInfo],
        log: &mut ParseLog,
    ) -> Result<Option<Box<dyn Expr>>, ParseError> {
        if self.input_is_empty() {
            return Err(ApiError::EmptyInput.into());
        }
        for info in candidates {
            for (pattern_index, text) in info.patterns.iter().enumerate() {
                let pat = Pattern::compile(text)?;
                if let Some(mut res) = self.match_at(&pat, 0, 0, log)? {
                    self.bind_defaults(&pat, &mut res)?;
                    let mut expr = (info.build)();
                    log.start_sub();
                    let accepted = expr.init(res, pattern_index, log);
                    let sub = log.stop_sub();
                    if !accepted {
                        if !sub.has_errors() {
                            // Silent reject: the candidate bowed out.
                            continue;
                        }
                        self.best.submit(ErrorQuality::Semantic, || {
                            sub.last_error().unwrap_or_default().to_string()
                        });
                        return Ok(self.surface_best(log));
                    }
                    log.commit(sub);
                    return Ok(Some(expr));
                }
                if self.best.quality == ErrorQuality::Semantic {
                    return Ok(self.surface_best(log));
                }
            }
        }
        Ok(self.surface_best(log))
    }

    /// Same search over event definitions; bindings are literals because
    /// event headers parse statically.
    pub(crate) fn parse_event_candidates<'e>(
        &mut self,
        candidates: &'e [EventInfo],
        log: &mut ParseLog,
    ) -> Result<Option<(&'e EventInfo, Box<dyn Event>)>, ParseError> {
        if self.input_is_empty() {
            return Err(ApiError::EmptyInput.into());
        }
        for info in candidates {
            for (pattern_index, text) in info.patterns.iter().enumerate() {
                let pat = Pattern::compile(text)?;
                if let Some(mut res) = self.match_at(&pat, 0, 0, log)? {
                    self.bind_defaults(&pat, &mut res)?;
                    let mut event = (info.build)();
                    log.start_sub();
                    let accepted = event.init(res, pattern_index, log);
                    let sub = log.stop_sub();
                    if !accepted {
                        if !sub.has_errors() {
                            continue;
                        }
                        self.best.submit(ErrorQuality::Semantic, || {
                            sub.last_error().unwrap_or_default().to_string()
                        });
                        self.surface_best_unit(log);
                        return Ok(None);
                    }
                    log.commit(sub);
                    return Ok(Some((info, event)));
                }
                if self.best.quality == ErrorQuality::Semantic {
                    self.surface_best_unit(log);
                    return Ok(None);
                }
            }
        }
        self.surface_best_unit(log);
        Ok(None)
    }

    /// Bind the registered default of every still-unbound mandatory slot.
    /// A missing or incompatible default is a bug in the definition, not in
    /// the input.
    fn bind_defaults(&mut self, pat: &Pattern, res: &mut MatchResult) -> Result<(), ParseError> {
        let chars = pat.chars();
        let mut from = 0;
        let mut slot = 0;
        while let Some(open) = next_placeholder(chars, from) {
            let close = next_unescaped(chars, '%', open + 1).ok_or_else(|| {
                PatternError::OddPercentCount {
                    pattern: pat.text().into(),
                }
            })?;
            if res.bindings[slot].is_none() {
                let body: String = chars[open + 1..close].iter().collect();
                let (vi, optional) = parse_slot(&body, pat.text())?;
                if !optional {
                    let provider = self
                        .registry
                        .type_info(&vi.name)
                        .and_then(|t| t.default)
                        .ok_or_else(|| ApiError::NoDefault(vi.name.clone()))?;
                    let mut value = provider();
                    if !vi.is_plural && !value.is_single() {
                        return Err(ApiError::DefaultNotSingle(vi.name).into());
                    }
                    if vi.time != 0 && !value.set_time(vi.time) {
                        return Err(ApiError::DefaultHasNoTime(vi.name).into());
                    }
                    res.bindings[slot] = Some(value);
                }
            }
            slot += 1;
            from = close + 1;
        }
        Ok(())
    }

    /// Surface the best recorded error into the sink, always yielding
    /// "nothing parsed".
    fn surface_best<T>(&self, log: &mut ParseLog) -> Option<T> {
        self.surface_best_unit(log);
        None
    }

    fn surface_best_unit(&self, log: &mut ParseLog) {
        if let Some(message) = &self.best.message {
            debug!("parse failed: {message}");
            log.error(message.clone());
        }
    }
}

/// Parse `input` as one of `candidates`, or — when `allow_literal_fallback`
/// is set — as an untyped literal list when no candidate matches.
///
/// `Ok(None)` means the input didn't parse; the most informative diagnostic
/// (or `default_error`) is committed to `log`. `Err(_)` means a broken
/// definition, independent of the input.
pub fn parse_expression(
    registry: &Registry,
    input: &str,
    candidates: &[ExpressionInfo],
    allow_literal_fallback: bool,
    default_error: &str,
    log: &mut ParseLog,
) -> Result<Option<Box<dyn Expr>>, ParseError> {
    log.start_sub();
    let mut parser = ExprParser::new(registry, input, false);
    let parsed = parser.parse_candidates(candidates, log);
    let sub = log.stop_sub();
    match parsed? {
        Some(expr) => {
            log.commit(sub);
            Ok(Some(expr))
        }
        None if allow_literal_fallback => {
            Ok(Some(Box::new(split_literal_list(input, log))))
        }
        None => {
            log.commit_errors(sub, default_error);
            Ok(None)
        }
    }
}

/// Parse `input` as a literal of the named registered type (`object` for
/// the universal type).
pub fn parse_literal(
    registry: &Registry,
    input: &str,
    type_name: &str,
    log: &mut ParseLog,
) -> Result<Option<Box<dyn Expr>>, ParseError> {
    if input.is_empty() {
        return Err(ApiError::EmptyInput.into());
    }
    let ty = registry
        .type_handle(type_name)
        .ok_or_else(|| ApiError::UnknownType(type_name.to_string()))?;
    let literal = split_literal_list(input, log);
    if ty.is_universal() {
        return Ok(Some(Box::new(literal)));
    }
    log.start_sub();
    let converted = literal.convert(&ty, registry, log);
    let sub = log.stop_sub();
    match converted {
        Some(list) => Ok(Some(Box::new(list))),
        None => {
            log.commit_errors(
                sub,
                &format!("'{input}' is not {}", with_article(ty.display())),
            );
            Ok(None)
        }
    }
}

/// Parse `input` as an event header. Placeholders resolve statically (no
/// nested variables), so every binding handed to the event is a literal.
pub fn parse_event<'r>(
    registry: &'r Registry,
    input: &str,
    default_error: &str,
    log: &mut ParseLog,
) -> Result<Option<(&'r EventInfo, Box<dyn Event>)>, ParseError> {
    log.start_sub();
    let mut parser = ExprParser::new(registry, input, true);
    let parsed = parser.parse_event_candidates(registry.events(), log);
    let sub = log.stop_sub();
    match parsed? {
        Some(pair) => {
            log.commit(sub);
            debug!("parsed event '{}'", pair.0.name);
            Ok(Some(pair))
        }
        None => {
            log.commit_errors(sub, default_error);
            Ok(None)
        }
    }
}
