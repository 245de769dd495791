#![allow(
    dead_code,
    reason = "shared demo model: not every item is used in every test binary"
)]

use phrasal::{
    Diagnostic, Event, Expr, ExpressionInfo, MatchResult, ParseLog, Registry, TypeHandle, TypeInfo,
    parse_expression,
};

/// A plain typed value, as produced by the demo literal parsers. Worlds
/// have distinct time states; nothing else does.
#[derive(Debug)]
pub struct Value {
    ty: &'static str,
    text: String,
    time: i32,
}

impl Value {
    pub fn boxed(ty: &'static str, text: &str) -> Box<dyn Expr> {
        Box::new(Value {
            ty,
            text: text.to_string(),
            time: 0,
        })
    }
}

impl Expr for Value {
    fn type_name(&self) -> &str {
        self.ty
    }

    fn set_time(&mut self, time: i32) -> bool {
        if self.ty == "world" {
            self.time = time;
            true
        } else {
            false
        }
    }

    fn into_converted(self: Box<Self>, to: &TypeHandle) -> Result<Box<dyn Expr>, Box<dyn Expr>> {
        if to.is_universal() || to.name() == self.ty {
            Ok(self)
        } else {
            Err(self)
        }
    }

    fn render(&self) -> String {
        self.text.clone()
    }
}

/// The variable `[the] attacker`, resolving to a player.
#[derive(Debug)]
pub struct Attacker;

impl Expr for Attacker {
    fn type_name(&self) -> &str {
        "player"
    }

    fn into_converted(self: Box<Self>, to: &TypeHandle) -> Result<Box<dyn Expr>, Box<dyn Expr>> {
        if to.is_universal() || to.name() == "player" {
            Ok(self)
        } else {
            Err(self)
        }
    }

    fn render(&self) -> String {
        "the attacker".to_string()
    }
}

/// Expression probe: records its bindings, pattern index, and regex slot
/// matches, and renders them as `#index[part|part](regex,regex)`.
#[derive(Debug, Default)]
pub struct Probe {
    parts: Vec<String>,
    pattern_index: usize,
    regexes: Vec<String>,
}

impl Expr for Probe {
    fn init(&mut self, m: MatchResult, pattern_index: usize, _log: &mut ParseLog) -> bool {
        self.parts = m
            .bindings
            .iter()
            .map(|b| b.as_ref().map(|v| v.render()).unwrap_or_else(|| "~".into()))
            .collect();
        self.regexes = m
            .regexes
            .iter()
            .filter_map(|r| r.group(0))
            .map(String::from)
            .collect();
        self.pattern_index = pattern_index;
        true
    }

    fn type_name(&self) -> &str {
        TypeHandle::UNIVERSAL
    }

    fn into_converted(self: Box<Self>, to: &TypeHandle) -> Result<Box<dyn Expr>, Box<dyn Expr>> {
        if to.is_universal() {
            Ok(self)
        } else {
            Err(self)
        }
    }

    fn render(&self) -> String {
        let mut out = format!("#{}[{}]", self.pattern_index, self.parts.join("|"));
        if !self.regexes.is_empty() {
            out.push_str(&format!("({})", self.regexes.join(",")));
        }
        out
    }
}

pub fn probe() -> Box<dyn Expr> {
    Box::<Probe>::default()
}

/// Event probe with the same rendering scheme as [`Probe`].
#[derive(Debug, Default)]
pub struct EventProbe {
    parts: Vec<String>,
    pattern_index: usize,
}

impl Event for EventProbe {
    fn init(&mut self, m: MatchResult, pattern_index: usize, _log: &mut ParseLog) -> bool {
        self.parts = m
            .bindings
            .iter()
            .map(|b| b.as_ref().map(|v| v.render()).unwrap_or_else(|| "~".into()))
            .collect();
        self.pattern_index = pattern_index;
        true
    }

    fn render(&self) -> String {
        format!("#{}[{}]", self.pattern_index, self.parts.join("|"))
    }
}

pub fn event_probe() -> Box<dyn Event> {
    Box::<EventProbe>::default()
}

fn parse_world(s: &str) -> Option<Box<dyn Expr>> {
    (!s.trim().is_empty()).then(|| Value::boxed("world", s))
}

fn default_world() -> Box<dyn Expr> {
    Value::boxed("world", "main")
}

fn parse_player(s: &str) -> Option<Box<dyn Expr>> {
    (!s.is_empty() && s.chars().all(char::is_alphanumeric)).then(|| Value::boxed("player", s))
}

fn parse_itemtype(s: &str) -> Option<Box<dyn Expr>> {
    (!s.is_empty() && s.chars().all(|c| c.is_alphabetic() || c == ' '))
        .then(|| Value::boxed("itemtype", s))
}

fn parse_entitytype(s: &str) -> Option<Box<dyn Expr>> {
    ["pig", "cow", "zombie"]
        .contains(&s)
        .then(|| Value::boxed("entitytype", s))
}

fn parse_block(s: &str) -> Option<Box<dyn Expr>> {
    ["dirt", "stone", "sand"]
        .contains(&s)
        .then(|| Value::boxed("block", s))
}

fn parse_string(s: &str) -> Option<Box<dyn Expr>> {
    (s.len() >= 2 && s.starts_with('"') && s.ends_with('"'))
        .then(|| Value::boxed("string", s))
}

/// The registry every integration test parses against: a handful of value
/// types and the `[the] attacker` variable.
pub fn demo_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_type(TypeInfo {
        name: "world".into(),
        parse: Some(parse_world),
        default: Some(default_world),
        ..Default::default()
    });
    registry.register_type(TypeInfo {
        name: "player".into(),
        parse: Some(parse_player),
        ..Default::default()
    });
    registry.register_type(TypeInfo {
        name: "itemtype".into(),
        display: "item type".into(),
        parse: Some(parse_itemtype),
        ..Default::default()
    });
    registry.register_type(TypeInfo {
        name: "entitytype".into(),
        display: "entity type".into(),
        parse: Some(parse_entitytype),
        ..Default::default()
    });
    registry.register_type(TypeInfo {
        name: "block".into(),
        parse: Some(parse_block),
        ..Default::default()
    });
    registry.register_type(TypeInfo {
        name: "string".into(),
        parse: Some(parse_string),
        ..Default::default()
    });
    registry.register_variable(["[the] attacker"], || Box::new(Attacker));
    registry
}

pub fn candidates(patterns: &[&str]) -> Vec<ExpressionInfo> {
    vec![ExpressionInfo {
        patterns: patterns.iter().map(|s| s.to_string()).collect(),
        build: probe,
    }]
}

/// Parse with the probe and hand back its rendering plus whatever reached
/// the committed log.
pub fn parse_rendered(
    registry: &Registry,
    input: &str,
    candidates: &[ExpressionInfo],
) -> (Option<String>, Vec<Diagnostic>) {
    let mut log = ParseLog::new();
    let parsed = parse_expression(
        registry,
        input,
        candidates,
        false,
        "can't understand this",
        &mut log,
    )
    .expect("definitions are well-formed")
    .map(|e| e.render());
    (parsed, log.take())
}
