//! Pattern syntax walker.
//!
//! Patterns are a small DSL: literal text (case-insensitive), `[optional]`
//! groups, `(a|b)` alternation groups, `%type%` placeholders, `<regex>`
//! slots, and `\x` escapes. This module owns all bracket scanning and
//! validates a pattern once per attempt; the match engine then walks the
//! validated source string directly.

use regex::Regex;

use crate::lang::error::PatternError;
use crate::lang::expr::VarInfo;
use crate::registry::english;

/// A validated pattern, ready for the match engine. Regex slots are
/// compiled here so that an invalid regex surfaces as an author error even
/// when matching never reaches it.
#[derive(Debug)]
pub(crate) struct Pattern {
    text: String,
    chars: Vec<char>,
    regexes: Vec<(usize, Regex)>,
}

impl Pattern {
    pub(crate) fn compile(text: &str) -> Result<Pattern, PatternError> {
        let chars: Vec<char> = text.chars().collect();
        let mut regexes = Vec::new();
        let mut stack: Vec<char> = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '\\' => {
                    if i + 1 == chars.len() {
                        return Err(PatternError::TrailingBackslash {
                            pattern: text.into(),
                        });
                    }
                    i += 1;
                }
                '[' | '(' => stack.push(chars[i]),
                ']' => {
                    if stack.pop() != Some('[') {
                        return Err(PatternError::MismatchedBracket {
                            pattern: text.into(),
                            found: ']',
                        });
                    }
                }
                ')' => {
                    if stack.pop() != Some('(') {
                        return Err(PatternError::MismatchedBracket {
                            pattern: text.into(),
                            found: ')',
                        });
                    }
                }
                '%' => {
                    let close = next_unescaped(&chars, '%', i + 1).ok_or_else(|| {
                        PatternError::OddPercentCount {
                            pattern: text.into(),
                        }
                    })?;
                    let body: String = chars[i + 1..close].iter().collect();
                    parse_slot(&body, text)?;
                    i = close;
                }
                '<' => {
                    let close = next_plain(&chars, '>', i + 1).ok_or_else(|| {
                        PatternError::UnclosedRegex {
                            pattern: text.into(),
                        }
                    })?;
                    let src: String = chars[i + 1..close].iter().collect();
                    // Anchored so the slot must cover its whole input span.
                    let re = Regex::new(&format!("^(?:{src})$")).map_err(|source| {
                        PatternError::BadRegex {
                            pattern: text.into(),
                            source,
                        }
                    })?;
                    regexes.push((i, re));
                    i = close;
                }
                _ => {}
            }
            i += 1;
        }
        if let Some(open) = stack.pop() {
            return Err(PatternError::UnclosedBracket {
                pattern: text.into(),
                close: if open == '[' { ']' } else { ')' },
            });
        }
        check_alternation_slots(&chars, text)?;
        Ok(Pattern {
            text: text.into(),
            chars,
            regexes,
        })
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn chars(&self) -> &[char] {
        &self.chars
    }

    /// The compiled regex of the `<…>` slot opening at `open`.
    pub(crate) fn regex_at(&self, open: usize) -> Option<&Regex> {
        self.regexes
            .iter()
            .find(|(at, _)| *at == open)
            .map(|(_, re)| re)
    }

    /// Number of placeholder slots in the whole pattern.
    pub(crate) fn slot_count(&self) -> usize {
        count_percents(&self.chars, 0, self.chars.len()) / 2
    }

    /// Slot index of the placeholder whose opening `%` sits at `j`.
    pub(crate) fn slot_index(&self, j: usize) -> usize {
        count_percents(&self.chars, 0, j) / 2
    }
}

/// Slot indices are path-independent only if every branch of an alternation
/// declares the same number of placeholders; reject patterns where they
/// don't.
fn check_alternation_slots(chars: &[char], text: &str) -> Result<(), PatternError> {
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '%' => {
                if let Some(close) = next_unescaped(chars, '%', i + 1) {
                    i = close;
                }
            }
            '<' => {
                if let Some(close) = next_plain(chars, '>', i + 1) {
                    i = close;
                }
            }
            '(' => {
                let end = next_matching(chars, ')', '(', i + 1).ok_or_else(|| {
                    PatternError::UnclosedBracket {
                        pattern: text.into(),
                        close: ')',
                    }
                })?;
                let starts = split_alternation(chars, i + 1, end);
                if starts.len() > 1 {
                    let mut counts = Vec::with_capacity(starts.len());
                    for (k, &start) in starts.iter().enumerate() {
                        let branch_end = starts.get(k + 1).map(|&s| s - 1).unwrap_or(end);
                        counts.push(count_percents(chars, start, branch_end));
                    }
                    if counts.windows(2).any(|w| w[0] != w[1]) {
                        return Err(PatternError::UnbalancedPlaceholders {
                            pattern: text.into(),
                        });
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    Ok(())
}

/// Parse a placeholder body `[-]name[@time]` into its slot descriptor,
/// also reporting whether the leading `-` marked it optional.
pub(crate) fn parse_slot(body: &str, pattern: &str) -> Result<(VarInfo, bool), PatternError> {
    let (optional, rest) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let (name, time) = match rest.split_once('@') {
        Some((name, time)) => {
            let time = time.parse::<i32>().map_err(|_| PatternError::BadTime {
                pattern: pattern.into(),
                value: time.into(),
            })?;
            (name, time)
        }
        None => (rest, 0),
    };
    let (name, is_plural) = english::singular(name);
    Ok((
        VarInfo {
            name,
            is_plural,
            time,
        },
        optional,
    ))
}

/// Index of the `close` bracket balancing `open`, scanning from `from`.
/// Escapes consume the next character; placeholder bodies and regex slots
/// are opaque.
pub(crate) fn next_matching(chars: &[char], close: char, open: char, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = from;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 1;
        } else if c == close {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        } else if c == open {
            depth += 1;
        } else if c == '%' {
            i = next_unescaped(chars, '%', i + 1)?;
        } else if c == '<' {
            i = next_plain(chars, '>', i + 1)?;
        }
        i += 1;
    }
    None
}

/// Index of the next unescaped `c` at or after `from`.
pub(crate) fn next_unescaped(chars: &[char], c: char, from: usize) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '\\' {
            i += 1;
        } else if chars[i] == c {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Index of the next `c` at or after `from`, with no escape handling.
pub(crate) fn next_plain(chars: &[char], c: char, from: usize) -> Option<usize> {
    (from..chars.len()).find(|&i| chars[i] == c)
}

/// Index of the `"` closing an input quoted region scanned from `from`.
/// A `""` digraph is an embedded quote and does not terminate the region.
pub(crate) fn next_quote(chars: &[char], from: usize) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '"' {
            if i + 1 == chars.len() || chars[i + 1] != '"' {
                return Some(i);
            }
            i += 1;
        }
        i += 1;
    }
    None
}

/// Branch start indices of the alternation group spanning `from..end`.
/// Nested groups, placeholder bodies, and regex slots are opaque.
pub(crate) fn split_alternation(chars: &[char], from: usize, end: usize) -> Vec<usize> {
    let mut starts = vec![from];
    let mut depth = 0usize;
    let mut i = from;
    while i < end {
        match chars[i] {
            '\\' => i += 1,
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => starts.push(i + 1),
            '%' => {
                match next_unescaped(chars, '%', i + 1) {
                    Some(close) => i = close,
                    None => break,
                }
            }
            '<' => {
                match next_plain(chars, '>', i + 1) {
                    Some(close) => i = close,
                    None => break,
                }
            }
            _ => {}
        }
        i += 1;
    }
    starts
}

/// True when `chars[start..end]` contains only characters from `allowed`.
pub(crate) fn has_only(chars: &[char], allowed: &[char], start: usize, end: usize) -> bool {
    chars[start..end].iter().all(|c| allowed.contains(c))
}

/// Count of unescaped `%` in `chars[start..end]`, regex slots excluded.
fn count_percents(chars: &[char], start: usize, end: usize) -> usize {
    let mut count = 0;
    let mut i = start;
    while i < end {
        match chars[i] {
            '\\' => i += 1,
            '%' => count += 1,
            '<' => {
                if let Some(close) = next_plain(chars, '>', i + 1) {
                    i = close;
                }
            }
            _ => {}
        }
        i += 1;
    }
    count
}

/// Index of the opening `%` of the next placeholder at or after `from`.
pub(crate) fn next_placeholder(chars: &[char], from: usize) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '%' => return Some(i),
            '<' => i = next_plain(chars, '>', i + 1)?,
            _ => {}
        }
        i += 1;
    }
    None
}
