//! Schema description and schema-driven deep merge.
//!
//! A [`Shape`] describes the structure the renderer consumes. [`merge`] walks
//! the shape, not the runtime type of either value, so an untrusted source can
//! never change the structure of the result: records keep exactly their
//! declared fields, lists stay lists, scalars stay scalars of their kind.
//!
//! Lists are atomic. A usable source list replaces the default list wholesale
//! and is never mixed element-by-element with default entries.

use serde_json::{Map, Number, Value};

/// Tagged description of one position in the schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text,
    Number,
    /// Non-negative integer that fits in `u32`.
    Integer,
    Bool,
    /// String restricted to a token set. The first token is the fallback.
    Enum(&'static [&'static str]),
    /// May be absent; absent values are omitted from records.
    Optional(Box<Shape>),
    /// Sequence of `item`, with an exact length when `len` is set.
    List { item: Box<Shape>, len: Option<usize> },
    Record(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
}

pub fn field(name: &'static str, shape: Shape) -> Field {
    Field { name, shape }
}

impl Shape {
    pub fn optional(inner: Shape) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn fixed_list(item: Shape, len: usize) -> Self {
        Self::List {
            item: Box::new(item),
            len: Some(len),
        }
    }

    pub fn list(item: Shape) -> Self {
        Self::List {
            item: Box::new(item),
            len: None,
        }
    }

    pub fn record(fields: Vec<Field>) -> Self {
        Self::Record(fields)
    }

    /// Whether `value` can stand in at this position (possibly after coercion).
    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Record(_) => value.is_object(),
            Self::List { .. } => value.is_array(),
            Self::Optional(_) => true,
            scalar => scalar.coerce(value).is_some(),
        }
    }

    /// Convert a scalar source value to this scalar kind, if it sensibly can.
    fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Text, Value::String(_)) => Some(value.clone()),
            (Self::Text, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::Text, Value::Bool(b)) => Some(Value::String(b.to_string())),

            (Self::Number, Value::Number(_)) => Some(value.clone()),
            (Self::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),

            (Self::Integer, Value::Number(n)) => {
                if n.as_u64().is_some_and(|i| i <= u64::from(u32::MAX)) {
                    Some(value.clone())
                } else {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(f))
                        .map(|f| Value::from(f as u32))
                }
            }
            (Self::Integer, Value::String(s)) => s.trim().parse::<u32>().ok().map(Value::from),

            (Self::Bool, Value::Bool(_)) => Some(value.clone()),
            (Self::Bool, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },

            (Self::Enum(tokens), Value::String(s)) => {
                let wanted = s.trim();
                tokens
                    .iter()
                    .find(|t| t.eq_ignore_ascii_case(wanted))
                    .map(|t| Value::String((*t).to_string()))
            }

            _ => None,
        }
    }

    /// Type-neutral placeholder for this position.
    pub fn zero(&self) -> Value {
        match self {
            Self::Text => Value::String(String::new()),
            Self::Number | Self::Integer => Value::from(0),
            Self::Bool => Value::Bool(false),
            Self::Enum(tokens) => Value::String(tokens.first().copied().unwrap_or_default().to_string()),
            Self::Optional(_) => Value::Null,
            Self::List { .. } => Value::Array(Vec::new()),
            Self::Record(fields) => {
                let mut out = Map::new();
                for f in fields {
                    let zero = f.shape.zero();
                    if !zero.is_null() {
                        out.insert(f.name.to_string(), zero);
                    }
                }
                Value::Object(out)
            }
        }
    }

    /// Force a value into this shape without any default content to draw on.
    ///
    /// Used for the elements of an accepted source list: fields that are
    /// missing or unusable become [`Shape::zero`] placeholders.
    fn conform(&self, value: &Value) -> Value {
        match self {
            Self::Record(fields) => {
                let Some(obj) = value.as_object() else {
                    return self.zero();
                };
                let mut out = Map::new();
                for f in fields {
                    let conformed = match obj.get(f.name) {
                        Some(v) if !v.is_null() && f.shape.accepts(v) => f.shape.conform(v),
                        _ => f.shape.zero(),
                    };
                    if !conformed.is_null() {
                        out.insert(f.name.to_string(), conformed);
                    }
                }
                Value::Object(out)
            }
            Self::List { item, .. } => match value.as_array() {
                Some(items) => Value::Array(conform_items(item, items)),
                None => Value::Array(Vec::new()),
            },
            Self::Optional(inner) => {
                if value.is_null() || !inner.accepts(value) {
                    Value::Null
                } else {
                    inner.conform(value)
                }
            }
            scalar => scalar.coerce(value).unwrap_or_else(|| scalar.zero()),
        }
    }

    /// Report every place where `value` does not have exactly this shape.
    ///
    /// No coercion is applied; list lengths are checked against `len`.
    pub fn check(&self, value: &Value) -> Vec<String> {
        let mut out = Vec::new();
        self.check_at(value, "$", &mut out);
        out
    }

    fn check_at(&self, value: &Value, path: &str, out: &mut Vec<String>) {
        match self {
            Self::Record(fields) => {
                let Some(obj) = value.as_object() else {
                    out.push(format!("{path}: expected object"));
                    return;
                };
                for f in fields {
                    let child = format!("{path}.{}", f.name);
                    match obj.get(f.name) {
                        Some(v) => f.shape.check_at(v, &child, out),
                        None if matches!(f.shape, Self::Optional(_)) => {}
                        None => out.push(format!("{child}: missing")),
                    }
                }
                for key in obj.keys() {
                    if !fields.iter().any(|f| f.name == key) {
                        out.push(format!("{path}.{key}: unexpected field"));
                    }
                }
            }
            Self::List { item, len } => {
                let Some(items) = value.as_array() else {
                    out.push(format!("{path}: expected array"));
                    return;
                };
                if let Some(n) = len {
                    if items.len() != *n {
                        out.push(format!("{path}: expected {n} entries, found {}", items.len()));
                    }
                }
                for (i, v) in items.iter().enumerate() {
                    item.check_at(v, &format!("{path}[{i}]"), out);
                }
            }
            Self::Optional(inner) => {
                if !value.is_null() {
                    inner.check_at(value, path, out);
                }
            }
            Self::Text if value.is_string() => {}
            Self::Number if value.is_number() => {}
            Self::Integer if value.as_u64().is_some_and(|i| i <= u64::from(u32::MAX)) => {}
            Self::Bool if value.is_boolean() => {}
            Self::Enum(tokens) if value.as_str().is_some_and(|s| tokens.contains(&s)) => {}
            scalar => out.push(format!("{path}: expected {}", scalar.kind_name())),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Number => "number",
            Self::Integer => "non-negative integer",
            Self::Bool => "boolean",
            Self::Enum(_) => "enumerated token",
            Self::Optional(_) => "optional value",
            Self::List { .. } => "array",
            Self::Record(_) => "object",
        }
    }
}

/// Conformed entries of `items`, skipping nulls and entries of the wrong kind.
fn conform_items(item: &Shape, items: &[Value]) -> Vec<Value> {
    items
        .iter()
        .filter(|v| !v.is_null() && item.accepts(v))
        .map(|v| item.conform(v))
        .collect()
}

/// Merge an untrusted `source` onto `defaults`, guided by `shape`.
///
/// - Null or absent source: the default is kept.
/// - Record: every declared field is merged recursively; fields the shape
///   does not declare are dropped. A non-object source keeps the default.
/// - List: the usable entries of the source list are taken wholesale,
///   each conformed to the item shape. Null entries and entries of the
///   wrong kind are dropped. With no usable entry the default list is kept.
/// - Scalar: the source is taken when it coerces to the scalar kind.
///
/// Total: never panics and always returns a value of `shape`'s structure
/// provided `defaults` itself has that structure.
pub fn merge(shape: &Shape, defaults: &Value, source: &Value) -> Value {
    if source.is_null() {
        return defaults.clone();
    }

    match shape {
        Shape::Record(fields) => {
            let Some(src) = source.as_object() else {
                return defaults.clone();
            };
            let mut out = Map::new();
            for f in fields {
                let d = defaults.get(f.name).unwrap_or(&Value::Null);
                let s = src.get(f.name).unwrap_or(&Value::Null);
                let merged = merge(&f.shape, d, s);
                if !merged.is_null() {
                    out.insert(f.name.to_string(), merged);
                }
            }
            Value::Object(out)
        }
        Shape::List { item, .. } => {
            let kept = source
                .as_array()
                .map(|items| conform_items(item, items))
                .unwrap_or_default();
            if kept.is_empty() {
                defaults.clone()
            } else {
                Value::Array(kept)
            }
        }
        Shape::Optional(inner) => merge(inner, defaults, source),
        scalar => scalar.coerce(source).unwrap_or_else(|| defaults.clone()),
    }
}
