//! Definition registries consulted by the parser.
//!
//! The host registers expression, variable, event, and type definitions up
//! front; the parser reads them and never mutates them. Registration order
//! is candidate order: the first definition whose pattern matches wins.

pub(crate) mod english;

use crate::lang::{Event, Expr};

/// Parses one trimmed literal-list part into a value of the type, or
/// rejects it.
pub type LiteralParser = fn(&str) -> Option<Box<dyn Expr>>;

/// Produces the implicit value bound to an absent optional placeholder.
pub type DefaultProvider = fn() -> Box<dyn Expr>;

/// A statement- or variable-level expression definition: the patterns it
/// answers to, and a factory for fresh instances.
pub struct ExpressionInfo {
    pub patterns: Vec<String>,
    pub build: fn() -> Box<dyn Expr>,
}

/// An event-header definition.
pub struct EventInfo {
    pub name: String,
    pub patterns: Vec<String>,
    pub build: fn() -> Box<dyn Event>,
}

/// A registered value type: placeholder names resolve against `name`,
/// diagnostics use `display` (e.g. name `entitytype`, display
/// `entity type`).
#[derive(Default)]
pub struct TypeInfo {
    pub name: String,
    pub display: String,
    pub parse: Option<LiteralParser>,
    pub default: Option<DefaultProvider>,
}

/// Resolved reference to a registered type (or to the universal type, which
/// is always available).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHandle {
    name: String,
    display: String,
}

impl TypeHandle {
    /// Name of the universal type: every value converts to it.
    pub const UNIVERSAL: &'static str = "object";

    pub(crate) fn universal() -> Self {
        TypeHandle {
            name: Self::UNIVERSAL.to_string(),
            display: Self::UNIVERSAL.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn is_universal(&self) -> bool {
        self.name == Self::UNIVERSAL
    }
}

#[derive(Default)]
pub struct Registry {
    expressions: Vec<ExpressionInfo>,
    variables: Vec<ExpressionInfo>,
    events: Vec<EventInfo>,
    types: Vec<TypeInfo>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a statement-level expression candidate.
    pub fn register_expression(
        &mut self,
        patterns: impl IntoIterator<Item = impl Into<String>>,
        build: fn() -> Box<dyn Expr>,
    ) {
        self.expressions.push(ExpressionInfo {
            patterns: patterns.into_iter().map(Into::into).collect(),
            build,
        });
    }

    /// Register a variable candidate, tried when resolving `%…%` slots.
    pub fn register_variable(
        &mut self,
        patterns: impl IntoIterator<Item = impl Into<String>>,
        build: fn() -> Box<dyn Expr>,
    ) {
        self.variables.push(ExpressionInfo {
            patterns: patterns.into_iter().map(Into::into).collect(),
            build,
        });
    }

    pub fn register_event(
        &mut self,
        name: impl Into<String>,
        patterns: impl IntoIterator<Item = impl Into<String>>,
        build: fn() -> Box<dyn Event>,
    ) {
        self.events.push(EventInfo {
            name: name.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            build,
        });
    }

    /// Register a value type. An empty `display` falls back to `name`.
    pub fn register_type(&mut self, mut info: TypeInfo) {
        if info.display.is_empty() {
            info.display = info.name.clone();
        }
        self.types.push(info);
    }

    pub fn expressions(&self) -> &[ExpressionInfo] {
        &self.expressions
    }

    pub fn variables(&self) -> &[ExpressionInfo] {
        &self.variables
    }

    pub fn events(&self) -> &[EventInfo] {
        &self.events
    }

    pub fn type_handle(&self, name: &str) -> Option<TypeHandle> {
        if name == TypeHandle::UNIVERSAL {
            return Some(TypeHandle::universal());
        }
        self.types.iter().find(|t| t.name == name).map(|t| TypeHandle {
            name: t.name.clone(),
            display: t.display.clone(),
        })
    }

    pub(crate) fn type_info(&self, name: &str) -> Option<&TypeInfo> {
        self.types.iter().find(|t| t.name == name)
    }
}
