//! Pattern-directed expression parser for an embeddable near-English
//! scripting language.
//!
//! Script authors write phrases like `give diamond sword to alice`;
//! extension authors register definitions whose patterns describe the
//! phrases they answer to (`give %itemtype% to %player%`). Given an input
//! string and the registered candidates, the parser finds the first
//! definition whose pattern matches, recursively parses every `%…%` span as
//! a typed sub-expression, and reports the single most informative
//! diagnostic when nothing fits.
//!
//! Pattern syntax: literal text (case-insensitive), `[optional]` groups,
//! `(a|b)` alternation groups, `%type%` placeholders with plurality and
//! `@-1`/`@+1` tense modifiers, `<regex>` slots, and `\x` escapes.
//!
//! Entry points: [`parse_expression`], [`parse_literal`], [`parse_event`],
//! all reading definitions from a [`Registry`] and reporting through a
//! [`ParseLog`].

pub mod diag;
pub mod lang;
pub mod registry;

pub use diag::{Diagnostic, Level, ParseLog, SubLog};
pub use lang::{
    ApiError, ErrorQuality, Event, Expr, LiteralList, MatchResult, ParseError, PatternError,
    RegexMatch, STRING_MATCHER, UnparsedLiteral, VarInfo, WILDCARD, parse_event, parse_expression,
    parse_literal,
};
pub use registry::{
    DefaultProvider, EventInfo, ExpressionInfo, LiteralParser, Registry, TypeHandle, TypeInfo,
};
