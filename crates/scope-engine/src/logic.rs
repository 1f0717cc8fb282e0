//! JSON-Logic evaluation for filter predicates.
//!
//! A predicate is a JSON tree where an object with a single key is an
//! operation (`{"op": [args...]}`) and everything else is a literal.
//!
//! # Variables
//!
//! `var` paths are dotted. The first segment selects a root:
//!
//! | Root | Binds to |
//! |------|----------|
//! | `entity` | the candidate being filtered |
//! | `actor` | the acting entity |
//! | `location` | the ambient location (`null` if none) |
//! | anything else | a context variable from the bundle |
//!
//! Entity roots resolve lazily through the gateway: `entity.id` is the id,
//! `entity.components.<type>.<field>...` reads component data. A missing
//! path under a known root is `null`; an unknown root is an error.
//!
//! # Operators
//!
//! `var`, `missing`, `if`, `and`, `or`, `!`, `!!`, `==`, `!=`, `===`, `!==`,
//! `<`, `<=`, `>`, `>=`, `in`, `cat`, `+`, `-`, `*`, `/`, `%`, `min`, `max`,
//! plus the domain operators:
//!
//! - `has_component: [path, component]` checks a component on the entity
//!   at `path` (`"entity"`, `"actor"`, `"location"` or a variable holding an
//!   id)
//! - `condition_ref: name` evaluates a named condition from the bundle
//!
//! # Example
//!
//! ```
//! use scope_engine::context::ContextBundle;
//! use scope_engine::entity::{EntityId, InMemoryGateway};
//! use scope_engine::logic::LogicEnv;
//! use serde_json::json;
//!
//! let mut gateway = InMemoryGateway::new();
//! gateway.insert_component("npc_1", "core:stats", json!({ "level": 7 }));
//!
//! let bundle = ContextBundle::new(&gateway).with_variable("min_level", json!(5));
//! let actor = EntityId::new("hero");
//! let candidate = EntityId::new("npc_1").into();
//! let env = LogicEnv::new(&bundle, &actor).with_entity(&candidate);
//!
//! let logic = json!({ ">=": [
//!     { "var": "entity.components.core:stats.level" },
//!     { "var": "min_level" }
//! ] });
//! assert_eq!(env.evaluate(&logic).unwrap(), json!(true));
//! ```

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::candidate::Candidate;
use crate::context::ContextBundle;
use crate::entity::EntityId;
use crate::error::LogicError;

type Result<T> = std::result::Result<T, LogicError>;

static NULL: Value = Value::Null;

/// JSON-Logic truthiness.
///
/// ```
/// use scope_engine::logic::truthy;
/// use serde_json::json;
///
/// assert!(!truthy(&json!(0)));
/// assert!(!truthy(&json!("")));
/// assert!(!truthy(&json!([])));
/// assert!(truthy(&json!({})));
/// assert!(truthy(&json!("0")));
/// ```
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

// =============================================================================
// Environment
// =============================================================================

/// Variable bindings for one predicate evaluation.
#[derive(Debug, Clone, Copy)]
pub struct LogicEnv<'a> {
    bundle: &'a ContextBundle<'a>,
    actor: &'a EntityId,
    entity: Option<&'a Candidate>,
}

impl<'a> LogicEnv<'a> {
    /// Creates an environment with no candidate bound to `entity`.
    #[must_use]
    pub fn new(bundle: &'a ContextBundle<'a>, actor: &'a EntityId) -> Self {
        Self {
            bundle,
            actor,
            entity: None,
        }
    }

    /// Binds the candidate under test.
    #[must_use]
    pub fn with_entity(mut self, candidate: &'a Candidate) -> Self {
        self.entity = Some(candidate);
        self
    }

    /// Evaluates a predicate.
    ///
    /// # Errors
    ///
    /// Returns a [`LogicError`] for unknown operators or variables, invalid
    /// operands, unknown or cyclic condition references, and gateway
    /// failures.
    pub fn evaluate(&self, logic: &Value) -> Result<Value> {
        Evaluator {
            env: self,
            active: Vec::new(),
        }
        .eval(logic)
    }

    /// Resolves a dotted variable path.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::UnknownVariable`] if the root is not bound, or a
    /// gateway error from a component read.
    pub fn lookup(&self, path: &str) -> Result<Value> {
        let mut segments = path.split('.').filter(|s| !s.is_empty());
        let Some(root) = segments.next() else {
            return match self.entity {
                Some(candidate) => self.candidate_path(candidate, &[]),
                None => Ok(Value::Null),
            };
        };
        let rest: Vec<&str> = segments.collect();

        match root {
            "entity" => match self.entity {
                Some(candidate) => self.candidate_path(candidate, &rest),
                None => Ok(Value::Null),
            },
            "actor" => self.entity_path(self.actor, &rest),
            "location" => match self.bundle.location() {
                Some(location) => self.entity_path(location, &rest),
                None => Ok(Value::Null),
            },
            name => match self.bundle.variables().get(name) {
                Some(value) => Ok(walk(value, &rest)),
                None => Err(LogicError::UnknownVariable {
                    name: path.to_string(),
                }),
            },
        }
    }

    fn candidate_path(&self, candidate: &Candidate, rest: &[&str]) -> Result<Value> {
        match candidate {
            Candidate::Entity(id) => self.entity_path(id, rest),
            Candidate::Value(value) => Ok(walk(value, rest)),
            Candidate::SlotAccess(_) => Ok(Value::Null),
        }
    }

    fn entity_path(&self, id: &EntityId, rest: &[&str]) -> Result<Value> {
        match rest {
            [] | ["id"] => Ok(Value::String(id.as_str().to_string())),
            ["components", component, tail @ ..] => {
                let data = self.bundle.gateway().component_data(id, component)?;
                Ok(data.map_or(Value::Null, |data| walk(&data, tail)))
            }
            _ => Ok(Value::Null),
        }
    }
}

fn walk(value: &Value, path: &[&str]) -> Value {
    let mut current = value;
    for segment in path {
        let next = match current {
            Value::Object(map) => map.get(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Value::Null,
        }
    }
    current.clone()
}

// =============================================================================
// Evaluator
// =============================================================================

struct Evaluator<'e, 'a> {
    env: &'e LogicEnv<'a>,
    /// Condition ids currently being evaluated, for cycle detection.
    active: Vec<String>,
}

impl Evaluator<'_, '_> {
    fn eval(&mut self, logic: &Value) -> Result<Value> {
        match logic {
            Value::Array(items) => Ok(Value::Array(self.eval_all(items)?)),
            Value::Object(map) => match single_entry(map) {
                Some((op, args)) => self.apply(op, args),
                None => Ok(logic.clone()),
            },
            literal => Ok(literal.clone()),
        }
    }

    fn eval_all(&mut self, items: &[Value]) -> Result<Vec<Value>> {
        items.iter().map(|item| self.eval(item)).collect()
    }

    fn apply(&mut self, op: &str, args: &Value) -> Result<Value> {
        let operands = operands(args);
        match op {
            "var" => self.var(operands),
            "missing" => self.missing(operands),
            "if" | "?:" => self.branch(operands),
            "and" => self.short_circuit(operands, false),
            "or" => self.short_circuit(operands, true),
            "has_component" => self.has_component(operands),
            "condition_ref" => self.condition_ref(operands),
            _ => {
                let values = self.eval_all(operands)?;
                apply_pure(op, &values)
            }
        }
    }

    fn var(&mut self, operands: &[Value]) -> Result<Value> {
        let path = match operands.first() {
            Some(expr) => self.eval(expr)?,
            None => Value::Null,
        };
        let path = match path {
            Value::String(path) => path,
            Value::Number(n) => n.to_string(),
            Value::Null => String::new(),
            other => {
                return Err(LogicError::invalid(
                    "var",
                    format!("path must be a string, found {other}"),
                ))
            }
        };

        let value = self.env.lookup(&path)?;
        match operands.get(1) {
            Some(default) if value.is_null() => self.eval(default),
            _ => Ok(value),
        }
    }

    fn missing(&mut self, operands: &[Value]) -> Result<Value> {
        let mut keys = self.eval_all(operands)?;
        if let Some(Value::Array(inner)) = keys.first() {
            keys = inner.clone();
        }

        let mut missing = Vec::new();
        for key in keys {
            let Value::String(path) = &key else {
                return Err(LogicError::invalid("missing", "keys must be strings"));
            };
            let absent = match self.env.lookup(path) {
                Ok(value) => value.is_null() || value == Value::String(String::new()),
                Err(LogicError::UnknownVariable { .. }) => true,
                Err(e) => return Err(e),
            };
            if absent {
                missing.push(key);
            }
        }
        Ok(Value::Array(missing))
    }

    fn branch(&mut self, operands: &[Value]) -> Result<Value> {
        let mut pairs = operands.chunks_exact(2);
        for pair in pairs.by_ref() {
            if truthy(&self.eval(&pair[0])?) {
                return self.eval(&pair[1]);
            }
        }
        match pairs.remainder() {
            [otherwise] => self.eval(otherwise),
            _ => Ok(Value::Null),
        }
    }

    /// `and` stops at the first falsy operand, `or` at the first truthy one.
    fn short_circuit(&mut self, operands: &[Value], stop_when: bool) -> Result<Value> {
        let mut last = Value::Null;
        for operand in operands {
            last = self.eval(operand)?;
            if truthy(&last) == stop_when {
                return Ok(last);
            }
        }
        Ok(last)
    }

    fn has_component(&mut self, operands: &[Value]) -> Result<Value> {
        let [target, component] = operands else {
            return Err(LogicError::invalid("has_component", "expects [path, component]"));
        };
        let target = match target {
            Value::String(path) => self.env.lookup(path)?,
            expr => self.eval(expr)?,
        };
        let Value::String(component) = self.eval(component)? else {
            return Err(LogicError::invalid("has_component", "component must be a string"));
        };

        match target {
            Value::String(id) => {
                let gateway = self.env.bundle.gateway();
                Ok(Value::Bool(gateway.has_component(&EntityId::from(id), &component)?))
            }
            Value::Null => Ok(Value::Bool(false)),
            other => Err(LogicError::invalid(
                "has_component",
                format!("target must be an entity id, found {other}"),
            )),
        }
    }

    fn condition_ref(&mut self, operands: &[Value]) -> Result<Value> {
        let name = match operands.first() {
            Some(expr) => self.eval(expr)?,
            None => Value::Null,
        };
        let Value::String(name) = name else {
            return Err(LogicError::invalid("condition_ref", "expects a condition id"));
        };

        let bundle = self.env.bundle;
        let logic = bundle
            .condition(&name)
            .ok_or_else(|| LogicError::UnknownCondition { name: name.clone() })?;
        if self.active.contains(&name) {
            return Err(LogicError::ConditionCycle { name });
        }

        self.active.push(name);
        let result = self.eval(logic);
        self.active.pop();
        result
    }
}

fn single_entry(map: &Map<String, Value>) -> Option<(&str, &Value)> {
    if map.len() != 1 {
        return None;
    }
    map.iter().next().map(|(op, args)| (op.as_str(), args))
}

fn operands(args: &Value) -> &[Value] {
    match args {
        Value::Array(items) => items,
        single => std::slice::from_ref(single),
    }
}

// =============================================================================
// Pure Operators
// =============================================================================

fn apply_pure(op: &str, values: &[Value]) -> Result<Value> {
    let first = values.first().unwrap_or(&NULL);
    let second = values.get(1).unwrap_or(&NULL);

    match op {
        "==" => Ok(Value::Bool(loose_eq(first, second))),
        "!=" => Ok(Value::Bool(!loose_eq(first, second))),
        "===" => Ok(Value::Bool(strict_eq(first, second))),
        "!==" => Ok(Value::Bool(!strict_eq(first, second))),
        "<" => compare(op, values, Ordering::is_lt),
        "<=" => compare(op, values, Ordering::is_le),
        ">" => compare(op, values, Ordering::is_gt),
        ">=" => compare(op, values, Ordering::is_ge),
        "!" => Ok(Value::Bool(!truthy(first))),
        "!!" => Ok(Value::Bool(truthy(first))),
        "in" => Ok(Value::Bool(contains(first, second))),
        "cat" => Ok(Value::String(values.iter().map(display).collect())),
        "+" => Ok(number(numbers(op, values)?.iter().sum())),
        "*" => {
            let factors = numbers(op, values)?;
            if factors.is_empty() {
                return Err(LogicError::invalid(op, "expects at least one operand"));
            }
            Ok(number(factors.iter().product()))
        }
        "-" => match numbers(op, values)?.as_slice() {
            [a] => Ok(number(-a)),
            [a, b] => Ok(number(a - b)),
            _ => Err(LogicError::invalid(op, "expects one or two operands")),
        },
        "/" | "%" => {
            let [a, b] = numbers(op, values)?[..] else {
                return Err(LogicError::invalid(op, "expects two operands"));
            };
            if b == 0.0 {
                return Err(LogicError::invalid(op, "division by zero"));
            }
            Ok(number(if op == "/" { a / b } else { a % b }))
        }
        "min" => Ok(numbers(op, values)?.into_iter().reduce(f64::min).map_or(Value::Null, number)),
        "max" => Ok(numbers(op, values)?.into_iter().reduce(f64::max).map_or(Value::Null, number)),
        _ => Err(LogicError::UnknownOperator {
            operator: op.to_string(),
        }),
    }
}

fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse().ok(),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn numbers(op: &str, values: &[Value]) -> Result<Vec<f64>> {
    values
        .iter()
        .map(|value| {
            to_number(value)
                .ok_or_else(|| LogicError::invalid(op, format!("{value} is not a number")))
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn number(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

#[allow(clippy::float_cmp)]
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => a == b,
        _ => match (to_number(a), to_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

#[allow(clippy::float_cmp)]
fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => to_number(a)?.partial_cmp(&to_number(b)?),
    }
}

fn compare(op: &str, values: &[Value], accept: fn(Ordering) -> bool) -> Result<Value> {
    if values.len() < 2 {
        return Err(LogicError::invalid(op, "expects at least two operands"));
    }
    let holds = values
        .windows(2)
        .all(|pair| ordering(&pair[0], &pair[1]).is_some_and(accept));
    Ok(Value::Bool(holds))
}

fn contains(needle: &Value, haystack: &Value) -> bool {
    match haystack {
        Value::String(text) => text.contains(display(needle).as_str()),
        Value::Array(items) => items.iter().any(|item| strict_eq(item, needle)),
        _ => false,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
