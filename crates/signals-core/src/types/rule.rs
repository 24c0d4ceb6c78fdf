//! Signal rule AST and its evaluation over a candle table.
//!
//! Rules are plain data, so they can be declared in configuration:
//!
//! ```toml
//! [enter]
//! type = "all"
//!
//! [[enter.conditions]]
//! type = "compare"
//! left = "rsi"
//! op = "lt"
//! right = 45.0
//!
//! [[enter.conditions]]
//! type = "crossed_above"
//! left = "macd"
//! right = "macdsignal"
//! ```
//!
//! An operand is a constant, a column name, or a column reference with
//! `shift` (lag in candles) and `scale` (multiplier). Evaluation yields a
//! [`Mask`]; undefined operands evaluate false at that position.

use serde::{Deserialize, Serialize};

use crate::error::StrategyError;
use crate::types::{CandleTable, Comparison, Mask, Series, Signals};

fn default_scale() -> f64 {
    1.0
}

fn is_zero(v: &usize) -> bool {
    *v == 0
}

fn is_one(v: &f64) -> bool {
    *v == 1.0
}

/// Reference to a table column, optionally lagged and scaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub column: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub shift: usize,
    #[serde(default = "default_scale", skip_serializing_if = "is_one")]
    pub scale: f64,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "OperandRepr")]
pub enum Operand {
    Constant(f64),
    Column(ColumnRef),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OperandRepr {
    Constant(f64),
    Name(String),
    Column(ColumnRef),
}

impl From<OperandRepr> for Operand {
    fn from(repr: OperandRepr) -> Self {
        match repr {
            OperandRepr::Constant(v) => Operand::Constant(v),
            OperandRepr::Name(name) => col(name),
            OperandRepr::Column(column) => Operand::Column(column),
        }
    }
}

/// Column operand with no lag and unit scale.
pub fn col(name: impl Into<String>) -> Operand {
    Operand::Column(ColumnRef {
        column: name.into(),
        shift: 0,
        scale: 1.0,
    })
}

/// Constant operand.
pub fn lit(value: f64) -> Operand {
    Operand::Constant(value)
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Constant(value)
    }
}

impl From<&str> for Operand {
    fn from(name: &str) -> Self {
        col(name)
    }
}

impl Operand {
    /// Lag a column operand by `periods` more candles.
    pub fn shifted(self, periods: usize) -> Self {
        match self {
            Operand::Column(mut c) => {
                c.shift += periods;
                Operand::Column(c)
            }
            constant => constant,
        }
    }

    /// Multiply the operand by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        match self {
            Operand::Column(mut c) => {
                c.scale *= factor;
                Operand::Column(c)
            }
            Operand::Constant(v) => Operand::Constant(v * factor),
        }
    }

    /// Materialise the operand as a series aligned with `table`.
    pub fn resolve(&self, table: &CandleTable) -> Result<Series, StrategyError> {
        match self {
            Operand::Constant(v) => Ok(Series::constant(table.len(), *v)),
            Operand::Column(c) => {
                let series = table
                    .column(&c.column)
                    .ok_or_else(|| StrategyError::UnknownColumn(c.column.clone()))?;
                let lagged = if c.shift == 0 {
                    series.clone()
                } else {
                    series.lag(c.shift)
                };
                Ok(if c.scale == 1.0 { lagged } else { lagged * c.scale })
            }
        }
    }

    fn column_name(&self) -> Option<&str> {
        match self {
            Operand::Column(c) => Some(&c.column),
            Operand::Constant(_) => None,
        }
    }

    pub fn compare(self, op: Comparison, right: impl Into<Operand>) -> Condition {
        Condition::Compare {
            left: self,
            op,
            right: right.into(),
        }
    }

    pub fn gt(self, right: impl Into<Operand>) -> Condition {
        self.compare(Comparison::Gt, right)
    }

    pub fn ge(self, right: impl Into<Operand>) -> Condition {
        self.compare(Comparison::Ge, right)
    }

    pub fn lt(self, right: impl Into<Operand>) -> Condition {
        self.compare(Comparison::Lt, right)
    }

    pub fn le(self, right: impl Into<Operand>) -> Condition {
        self.compare(Comparison::Le, right)
    }

    pub fn equals(self, right: impl Into<Operand>) -> Condition {
        self.compare(Comparison::Eq, right)
    }

    pub fn not_equals(self, right: impl Into<Operand>) -> Condition {
        self.compare(Comparison::Ne, right)
    }

    pub fn crossed_above(self, right: impl Into<Operand>) -> Condition {
        Condition::CrossedAbove {
            left: self,
            right: right.into(),
        }
    }

    pub fn crossed_below(self, right: impl Into<Operand>) -> Condition {
        Condition::CrossedBelow {
            left: self,
            right: right.into(),
        }
    }
}

/// Boolean condition evaluated per candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Compare {
        left: Operand,
        op: Comparison,
        right: Operand,
    },
    CrossedAbove {
        left: Operand,
        right: Operand,
    },
    CrossedBelow {
        left: Operand,
        right: Operand,
    },
    /// Conjunction; empty is always true.
    All { conditions: Vec<Condition> },
    /// Disjunction; empty is always false.
    Any { conditions: Vec<Condition> },
}

impl Condition {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::All { conditions }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Any { conditions }
    }

    /// Evaluate the condition at every candle of `table`.
    pub fn evaluate(&self, table: &CandleTable) -> Result<Mask, StrategyError> {
        match self {
            Condition::Compare { left, op, right } => match (left, right) {
                (_, Operand::Constant(v)) => Ok(left.resolve(table)?.compare_scalar(*op, *v)),
                (Operand::Constant(v), _) => {
                    Ok(right.resolve(table)?.compare_scalar(op.flipped(), *v))
                }
                _ => Ok(left.resolve(table)?.compare(*op, &right.resolve(table)?)?),
            },
            Condition::CrossedAbove { left, right } => {
                Ok(left.resolve(table)?.cross_above(&right.resolve(table)?)?)
            }
            Condition::CrossedBelow { left, right } => {
                Ok(left.resolve(table)?.cross_below(&right.resolve(table)?)?)
            }
            Condition::All { conditions } => {
                let mut mask = Mask::all_true(table.len());
                for condition in conditions {
                    mask = mask.and(&condition.evaluate(table)?)?;
                }
                Ok(mask)
            }
            Condition::Any { conditions } => {
                let mut mask = Mask::all_false(table.len());
                for condition in conditions {
                    mask = mask.or(&condition.evaluate(table)?)?;
                }
                Ok(mask)
            }
        }
    }

    /// Every column name referenced by the condition, in order of first use.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Compare { left, right, .. }
            | Condition::CrossedAbove { left, right }
            | Condition::CrossedBelow { left, right } => {
                for name in [left, right].into_iter().filter_map(Operand::column_name) {
                    if !out.contains(&name) {
                        out.push(name);
                    }
                }
            }
            Condition::All { conditions } | Condition::Any { conditions } => {
                for condition in conditions {
                    condition.collect_columns(out);
                }
            }
        }
    }
}

/// Paired entry and exit conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRule {
    pub enter: Condition,
    pub exit: Condition,
}

impl SignalRule {
    pub fn evaluate(&self, table: &CandleTable) -> Result<Signals, StrategyError> {
        let enter = self.enter.evaluate(table)?;
        let exit = self.exit.evaluate(table)?;
        Ok(Signals::new(enter, exit)?)
    }
}
