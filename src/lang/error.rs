/// Errors in a registered pattern string. These are bugs in an extension,
/// not in user input: they abort the whole parse attempt.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("\"{pattern}\": missing closing bracket '{close}'")]
    UnclosedBracket { pattern: String, close: char },
    #[error("\"{pattern}\": unexpected '{found}'")]
    MismatchedBracket { pattern: String, found: char },
    #[error("\"{pattern}\": odd number of '%'")]
    OddPercentCount { pattern: String },
    #[error("\"{pattern}\": missing closing regex bracket '>'")]
    UnclosedRegex { pattern: String },
    #[error("\"{pattern}\": must not end with a backslash")]
    TrailingBackslash { pattern: String },
    #[error("\"{pattern}\": invalid regex: {source}")]
    BadRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("\"{pattern}\": invalid time modifier '@{value}'")]
    BadTime { pattern: String, value: String },
    #[error("\"{pattern}\": alternation branches declare different placeholder counts")]
    UnbalancedPlaceholders { pattern: String },
}

/// Misuse of the parser by the host or an extension: unregistered types,
/// defaults incompatible with the pattern that requests them, or handing
/// the parser an empty string.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("empty expression")]
    EmptyInput,
    #[error("unknown type '{0}' in pattern")]
    UnknownType(String),
    #[error(
        "the type '{0}' does not provide a default value; either allow the slot to stay empty (with %-{0}%) or make it mandatory"
    )]
    NoDefault(String),
    #[error(
        "the default value of '{0}' is not a single value; allow multiple elements in the pattern or make the slot mandatory"
    )]
    DefaultNotSingle(String),
    #[error(
        "the default value of '{0}' does not have distinct time states; either allow the slot to stay empty (with %-{0}%) or make it mandatory"
    )]
    DefaultHasNoTime(String),
}

/// Fatal failure of a parse call. User-input failures are not errors in
/// this sense: they come back as `Ok(None)` with a ranked diagnostic in the
/// sink.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed pattern: {0}")]
    Pattern(#[from] PatternError),
    #[error("definition error: {0}")]
    Api(#[from] ApiError),
}

/// Ranking of user-input diagnostics, weakest first. A parse attempt keeps
/// the single best error across every candidate and every nested parse;
/// promotion is strictly-greater, so on ties the earliest recorded wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorQuality {
    #[default]
    None,
    NotAVariable,
    WrongType,
    Semantic,
}
