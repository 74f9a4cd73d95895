//! Aggregate reducers (SUM, AVERAGE, MAX, MIN, COUNT).
//!
//! Every reducer accepts a single `Dynamic` that may be a scalar or an
//! arbitrarily nested array (ranges arrive as arrays of rows). The input is
//! flattened and filtered down to its numeric operands first: integers and
//! floats that are not NaN. Blanks, strings, booleans and anything else are
//! skipped, never counted and never an error.
//!
//! An empty operand sequence yields `0` for every reducer.

use rhai::Dynamic;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Sum,
    Average,
    Max,
    Min,
    Count,
}

pub struct AggregateBuiltin {
    pub name: &'static str,
    pub kind: Aggregate,
    pub description: &'static str,
}

pub const AGGREGATES: &[AggregateBuiltin] = &[
    AggregateBuiltin {
        name: "SUM",
        kind: Aggregate::Sum,
        description: "Sum of the numeric arguments",
    },
    AggregateBuiltin {
        name: "AVERAGE",
        kind: Aggregate::Average,
        description: "Arithmetic mean of the numeric arguments",
    },
    AggregateBuiltin {
        name: "MAX",
        kind: Aggregate::Max,
        description: "Largest numeric argument",
    },
    AggregateBuiltin {
        name: "MIN",
        kind: Aggregate::Min,
        description: "Smallest numeric argument",
    },
    AggregateBuiltin {
        name: "COUNT",
        kind: Aggregate::Count,
        description: "Number of numeric arguments",
    },
];

impl Aggregate {
    pub fn name(self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Average => "AVERAGE",
            Aggregate::Max => "MAX",
            Aggregate::Min => "MIN",
            Aggregate::Count => "COUNT",
        }
    }

    pub fn apply(self, input: &Dynamic) -> f64 {
        self.reduce(&numeric_operands(input))
    }

    /// Reduce an already-filtered operand sequence.
    pub fn reduce(self, operands: &[f64]) -> f64 {
        if operands.is_empty() {
            return 0.0;
        }
        match self {
            Aggregate::Sum => operands.iter().fold(0.0, |acc, v| acc + v),
            Aggregate::Average => {
                operands.iter().fold(0.0, |acc, v| acc + v) / operands.len() as f64
            }
            Aggregate::Max => operands.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregate::Min => operands.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregate::Count => operands.len() as f64,
        }
    }
}

/// Flatten `input` and keep its non-NaN numeric values in order.
pub fn numeric_operands(input: &Dynamic) -> Vec<f64> {
    let mut out = Vec::new();
    collect_numeric(input, &mut out);
    out
}

fn collect_numeric(value: &Dynamic, out: &mut Vec<f64>) {
    if value.is_array() {
        if let Ok(items) = value.clone().into_array() {
            for item in &items {
                collect_numeric(item, out);
            }
        }
        return;
    }

    let n = if let Ok(f) = value.as_float() {
        f
    } else if let Ok(i) = value.as_int() {
        i as f64
    } else {
        return;
    };
    if !n.is_nan() {
        out.push(n);
    }
}
