//! Style expressions
//!
//! Builders for the subset of the Mapbox style-expression language the map
//! declares, plus an evaluator so declared paint values and filters can be
//! checked against feature properties without a renderer.

use crate::data::geojson::Properties;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A style expression, stored in its JSON form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expression(Value);

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// `["get", key]`
    pub fn get(key: &str) -> Self {
        Self(json!(["get", key]))
    }

    /// `["has", key]`
    pub fn has(key: &str) -> Self {
        Self(json!(["has", key]))
    }

    /// `["!", expr]`
    pub fn not(inner: Expression) -> Self {
        Self(json!(["!", inner.0]))
    }

    /// `["==", a, b]`
    pub fn eq(left: Expression, right: Expression) -> Self {
        Self(json!(["==", left.0, right.0]))
    }

    /// `["zoom"]`
    pub fn zoom() -> Self {
        Self(json!(["zoom"]))
    }

    /// `["step", input, base, stop1, out1, ...]`: `base` below the first
    /// stop, otherwise the output of the highest stop not above `input`
    pub fn step(
        input: Expression,
        base: Expression,
        stops: impl IntoIterator<Item = (f64, Expression)>,
    ) -> Self {
        let mut parts = vec![json!("step"), input.0, base.0];
        for (stop, output) in stops {
            parts.push(Value::from(stop));
            parts.push(output.0);
        }
        Self(Value::Array(parts))
    }

    /// `["interpolate", ["linear"], input, stop1, out1, ...]`
    pub fn interpolate_linear(
        input: Expression,
        stops: impl IntoIterator<Item = (f64, Expression)>,
    ) -> Self {
        let mut parts = vec![json!("interpolate"), json!(["linear"]), input.0];
        for (stop, output) in stops {
            parts.push(Value::from(stop));
            parts.push(output.0);
        }
        Self(Value::Array(parts))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Evaluates against a feature's properties at a zoom level
    pub fn evaluate(&self, properties: &Properties, zoom: f64) -> Value {
        evaluate(&self.0, properties, zoom)
    }
}

impl From<Expression> for Value {
    fn from(expression: Expression) -> Self {
        expression.0
    }
}

/// Evaluates an expression in JSON form.
///
/// Unsupported operators evaluate to `null`; plain values evaluate to
/// themselves.
pub fn evaluate(expression: &Value, properties: &Properties, zoom: f64) -> Value {
    let Some(parts) = expression.as_array() else {
        return expression.clone();
    };
    let Some(op) = parts.first().and_then(Value::as_str) else {
        return expression.clone();
    };
    let arg = |i: usize| -> Value {
        parts
            .get(i)
            .map(|v| evaluate(v, properties, zoom))
            .unwrap_or(Value::Null)
    };

    match op {
        "literal" => parts.get(1).cloned().unwrap_or(Value::Null),
        "get" => arg(1)
            .as_str()
            .and_then(|key| properties.get(key))
            .cloned()
            .unwrap_or(Value::Null),
        "has" => Value::Bool(
            arg(1)
                .as_str()
                .map(|key| properties.contains_key(key))
                .unwrap_or(false),
        ),
        "!" => Value::Bool(!arg(1).as_bool().unwrap_or(false)),
        "==" => Value::Bool(values_equal(&arg(1), &arg(2))),
        "zoom" => Value::from(zoom),
        "step" => evaluate_step(parts, properties, zoom),
        "interpolate" => evaluate_interpolate(parts, properties, zoom),
        _ => Value::Null,
    }
}

fn evaluate_step(parts: &[Value], properties: &Properties, zoom: f64) -> Value {
    let Some(input) = parts.get(1).and_then(|v| evaluate(v, properties, zoom).as_f64()) else {
        return Value::Null;
    };
    let null = Value::Null;
    let mut output = parts.get(2).unwrap_or(&null);
    for pair in parts.get(3..).unwrap_or_default().chunks_exact(2) {
        match pair[0].as_f64() {
            Some(stop) if input >= stop => output = &pair[1],
            _ => break,
        }
    }
    evaluate(output, properties, zoom)
}

fn evaluate_interpolate(parts: &[Value], properties: &Properties, zoom: f64) -> Value {
    if parts.get(1) != Some(&json!(["linear"])) {
        return Value::Null;
    }
    let Some(input) = parts.get(2).and_then(|v| evaluate(v, properties, zoom).as_f64()) else {
        return Value::Null;
    };

    let stops: Vec<(f64, f64)> = parts
        .get(3..)
        .unwrap_or_default()
        .chunks_exact(2)
        .filter_map(|pair| {
            let stop = pair[0].as_f64()?;
            let output = evaluate(&pair[1], properties, zoom).as_f64()?;
            Some((stop, output))
        })
        .collect();

    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Value::Null;
    };
    if input <= first.0 {
        return Value::from(first.1);
    }
    if input >= last.0 {
        return Value::from(last.1);
    }

    for window in stops.windows(2) {
        let (lo, hi) = (window[0], window[1]);
        if input >= lo.0 && input <= hi.0 {
            let t = (input - lo.0) / (hi.0 - lo.0);
            return Value::from(lo.1 + (hi.1 - lo.1) * t);
        }
    }
    Value::Null
}

/// Equality with numbers compared as `f64`, so `1` equals `1.0`
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}
