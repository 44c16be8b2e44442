//! Runtime value type for property expressions.
//!
//! Evaluation is dynamically typed; every expression reduces to a single
//! [`Value`]. Binary operators pick a common target type for their operands
//! (floats win over ints, strings only for `+`) and combine in that domain.
//! Pairs with no usable target reduce to [`Value::Absent`], which also
//! absorbs every downstream operation.

use std::fmt;

/// Result of evaluating a property expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value: unknown symbols, failed parses, impossible coercions.
    Absent,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

/// Binary operator recognised by the expression grammar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Target domain for combining two operands.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    Bool,
    Float,
    Int,
    Str,
}

impl Default for Value {
    fn default() -> Self {
        Value::Absent
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "Undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Value {
    /// Returns `true` for [`Value::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Coerce to boolean: `Absent`, zero, `""`, `"0"`, `"false"`, and lists
    /// are falsy.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Absent => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
            Value::List(_) => false,
        }
    }

    /// Coerce to `i64` (0 when the string does not parse as an integer).
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Absent => 0,
            Value::Bool(b) => i64::from(*b),
            Value::Int(n) => *n,
            Value::Float(x) => *x as i64,
            Value::Str(s) => s.trim().parse().unwrap_or(0),
            Value::List(_) => 0,
        }
    }

    /// Coerce to `f64` (0.0 when the string does not parse as a number).
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Absent => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Int(n) => *n as f64,
            Value::Float(x) => *x,
            Value::Str(s) => s.trim().parse().unwrap_or(0.0),
            Value::List(_) => 0.0,
        }
    }

    /// Coerce to a string (clones for Str, formats for the other variants).
    pub fn as_str(&self) -> String {
        self.to_string()
    }

    /// Name of the type this value carries.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "undefined",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "real",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    // ── Binary coercion ───────────────────────────────────────────────────────

    /// The target type this value already has, if it is a scalar.
    fn target(&self) -> Option<Target> {
        match self {
            Value::Bool(_) => Some(Target::Bool),
            Value::Float(_) => Some(Target::Float),
            Value::Int(_) => Some(Target::Int),
            Value::Str(_) => Some(Target::Str),
            Value::Absent | Value::List(_) => None,
        }
    }

    /// Whether this value converts into any scalar target at all.
    fn is_scalar(&self) -> bool {
        !matches!(self, Value::Absent | Value::List(_))
    }

    /// Combine two operands under `op`.
    ///
    /// Targets are tried in a fixed priority order; the first target where
    /// one operand already has that type and the other converts decides the
    /// domain. Booleans never host arithmetic, and strings only concatenate,
    /// so both are skipped where they do not apply. No usable target means
    /// [`Value::Absent`].
    pub fn combine(&self, rhs: &Value, op: BinOp) -> Value {
        for target in [Target::Bool, Target::Float, Target::Int, Target::Str] {
            if target == Target::Bool {
                continue;
            }
            if target == Target::Str && op != BinOp::Add {
                continue;
            }
            let hit = (self.target() == Some(target) && rhs.is_scalar())
                || (rhs.target() == Some(target) && self.is_scalar());
            if !hit {
                continue;
            }
            return match target {
                Target::Float => Self::combine_float(self.as_float(), rhs.as_float(), op),
                Target::Int => Self::combine_int(self.as_int(), rhs.as_int(), op),
                Target::Str => Value::Str(self.as_str() + &rhs.as_str()),
                Target::Bool => Value::Absent,
            };
        }
        Value::Absent
    }

    fn combine_int(a: i64, b: i64, op: BinOp) -> Value {
        match op {
            BinOp::Add => Value::Int(a.wrapping_add(b)),
            BinOp::Sub => Value::Int(a.wrapping_sub(b)),
            BinOp::Mul => Value::Int(a.wrapping_mul(b)),
            BinOp::Div => {
                if b == 0 {
                    Value::Absent
                } else {
                    Value::Int(a.wrapping_div(b))
                }
            }
            // Exponentiation always computes in the float domain.
            BinOp::Pow => Value::Float((a as f64).powf(b as f64)),
        }
    }

    fn combine_float(a: f64, b: f64, op: BinOp) -> Value {
        match op {
            BinOp::Add => Value::Float(a + b),
            BinOp::Sub => Value::Float(a - b),
            BinOp::Mul => Value::Float(a * b),
            BinOp::Div => {
                if b == 0.0 {
                    Value::Absent
                } else {
                    Value::Float(a / b)
                }
            }
            BinOp::Pow => Value::Float(a.powf(b)),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    /// A single-element list collapses to its element.
    fn from(mut items: Vec<Value>) -> Self {
        if items.len() == 1 {
            items.remove(0)
        } else {
            Value::List(items)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::approx_constant)]
    fn display_scalars() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Float(3.14).to_string(), "3.14");
        assert_eq!(Value::Float(5.0).to_string(), "5");
        assert_eq!(Value::Str("hello".into()).to_string(), "hello");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Absent.to_string(), "Undefined");
    }

    #[test]
    fn display_list() {
        let v = Value::List(vec![Value::Int(1), Value::Str("a".into()), Value::Float(2.5)]);
        assert_eq!(v.to_string(), "[1, a, 2.5]");
        assert_eq!(Value::List(vec![]).to_string(), "[]");
    }

    #[test]
    fn as_bool() {
        assert!(Value::Bool(true).as_bool());
        assert!(Value::Int(1).as_bool());
        assert!(!Value::Int(0).as_bool());
        assert!(Value::Str("hello".into()).as_bool());
        assert!(!Value::Str("".into()).as_bool());
        assert!(!Value::Str("0".into()).as_bool());
        assert!(!Value::Str("False".into()).as_bool());
        assert!(!Value::Absent.as_bool());
        assert!(!Value::List(vec![Value::Int(1)]).as_bool());
    }

    #[test]
    fn as_int_coercions() {
        assert_eq!(Value::Int(5).as_int(), 5);
        assert_eq!(Value::Float(3.9).as_int(), 3);
        assert_eq!(Value::Str("42".into()).as_int(), 42);
        assert_eq!(Value::Str("3.5".into()).as_int(), 0);
        assert_eq!(Value::Str("abc".into()).as_int(), 0);
        assert_eq!(Value::Bool(true).as_int(), 1);
        assert_eq!(Value::Absent.as_int(), 0);
    }

    #[test]
    fn as_float_coercions() {
        assert_eq!(Value::Int(5).as_float(), 5.0);
        assert_eq!(Value::Str("2.5".into()).as_float(), 2.5);
        assert_eq!(Value::Str("abc".into()).as_float(), 0.0);
        assert_eq!(Value::Bool(true).as_float(), 1.0);
    }

    #[test]
    fn int_arithmetic() {
        let a = Value::Int(10);
        let b = Value::Int(3);
        assert_eq!(a.combine(&b, BinOp::Add), Value::Int(13));
        assert_eq!(a.combine(&b, BinOp::Sub), Value::Int(7));
        assert_eq!(a.combine(&b, BinOp::Mul), Value::Int(30));
        assert_eq!(a.combine(&b, BinOp::Div), Value::Int(3));
    }

    #[test]
    fn division_by_zero_is_absent() {
        assert_eq!(Value::Int(1).combine(&Value::Int(0), BinOp::Div), Value::Absent);
        assert_eq!(
            Value::Float(1.0).combine(&Value::Float(0.0), BinOp::Div),
            Value::Absent
        );
        assert_eq!(
            Value::Float(1.0).combine(&Value::Float(-0.0), BinOp::Div),
            Value::Absent
        );
        // A divisor that converts to zero counts as zero.
        assert_eq!(
            Value::Int(1).combine(&Value::Str("junk".into()), BinOp::Div),
            Value::Absent
        );
    }

    #[test]
    fn float_wins_over_int() {
        assert_eq!(
            Value::Int(2).combine(&Value::Float(2.5), BinOp::Mul),
            Value::Float(5.0)
        );
        assert_eq!(
            Value::Float(2.4).combine(&Value::Float(0.5), BinOp::Div),
            Value::Float(4.8)
        );
    }

    #[test]
    fn pow_stays_float() {
        assert_eq!(Value::Int(2).combine(&Value::Int(3), BinOp::Pow), Value::Float(8.0));
        assert_eq!(
            Value::Float(2.0).combine(&Value::Int(-1), BinOp::Pow),
            Value::Float(0.5)
        );
    }

    #[test]
    fn string_concat_only_for_add() {
        let a = Value::Str("STRING1 ".into());
        let b = Value::Str("STRING2".into());
        assert_eq!(a.combine(&b, BinOp::Add), Value::Str("STRING1 STRING2".into()));
        assert_eq!(a.combine(&b, BinOp::Mul), Value::Absent);
        assert_eq!(a.combine(&b, BinOp::Sub), Value::Absent);
    }

    #[test]
    fn numeric_string_converts_to_int() {
        // One side is exactly Int, the other converts, so the domain is Int.
        assert_eq!(
            Value::Int(4).combine(&Value::Str("3".into()), BinOp::Add),
            Value::Int(7)
        );
        // Non-numeric strings convert to 0 in a numeric domain.
        assert_eq!(
            Value::Str("a".into()).combine(&Value::Int(2), BinOp::Add),
            Value::Int(2)
        );
    }

    #[test]
    fn two_strings_concatenate_rather_than_add() {
        assert_eq!(
            Value::Str("2".into()).combine(&Value::Str("2".into()), BinOp::Add),
            Value::Str("22".into())
        );
    }

    #[test]
    fn string_plus_float_is_float() {
        // Float outranks Str in the priority order.
        assert_eq!(
            Value::Str("x".into()).combine(&Value::Float(2.5), BinOp::Add),
            Value::Float(2.5)
        );
    }

    #[test]
    fn bool_operands_convert_but_never_host() {
        assert_eq!(
            Value::Bool(true).combine(&Value::Int(1), BinOp::Add),
            Value::Int(2)
        );
        assert_eq!(
            Value::Bool(true).combine(&Value::Str("x".into()), BinOp::Add),
            Value::Str("truex".into())
        );
        // Two bools have no hosting target.
        assert_eq!(
            Value::Bool(true).combine(&Value::Bool(false), BinOp::Add),
            Value::Absent
        );
    }

    #[test]
    fn absent_absorbs() {
        assert_eq!(Value::Absent.combine(&Value::Int(1), BinOp::Add), Value::Absent);
        assert_eq!(Value::Int(1).combine(&Value::Absent, BinOp::Mul), Value::Absent);
        assert_eq!(Value::Absent.combine(&Value::Absent, BinOp::Add), Value::Absent);
    }

    #[test]
    fn lists_never_combine() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(list.combine(&Value::Int(1), BinOp::Add), Value::Absent);
        assert_eq!(Value::Str("x".into()).combine(&list, BinOp::Add), Value::Absent);
    }

    #[test]
    fn int_overflow_wraps() {
        assert_eq!(
            Value::Int(i64::MAX).combine(&Value::Int(1), BinOp::Add),
            Value::Int(i64::MIN)
        );
        assert_eq!(
            Value::Int(i64::MIN).combine(&Value::Int(-1), BinOp::Div),
            Value::Int(i64::MIN)
        );
    }

    #[test]
    fn vec_collapse() {
        assert_eq!(Value::from(vec![Value::Int(7)]), Value::Int(7));
        assert_eq!(
            Value::from(vec![Value::Int(1), Value::Int(2)]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn type_name() {
        assert_eq!(Value::Absent.type_name(), "undefined");
        assert_eq!(Value::Bool(false).type_name(), "bool");
        assert_eq!(Value::Int(0).type_name(), "integer");
        assert_eq!(Value::Float(0.0).type_name(), "real");
        assert_eq!(Value::Str("".into()).type_name(), "string");
        assert_eq!(Value::List(vec![]).type_name(), "list");
    }

    #[test]
    fn from_impls() {
        let v: Value = 42i64.into();
        assert_eq!(v, Value::Int(42));
        let v: Value = "hi".into();
        assert_eq!(v, Value::Str("hi".into()));
        let v: Value = true.into();
        assert_eq!(v, Value::Bool(true));
        let v: Value = 2.5f64.into();
        assert_eq!(v, Value::Float(2.5));
    }
}
