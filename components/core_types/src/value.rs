//! Lox value representation.
//!
//! A [`Value`] is a small `Copy` tagged union. Heap objects are never owned
//! by a value: the [`Value::Object`] variant carries an [`ObjRef`] handle into
//! the object registry of the VM that created it.

use std::fmt;

/// Non-owning handle to an object in a heap registry.
///
/// Handles are plain indices. They stay valid for the whole lifetime of the
/// heap that issued them because objects are never freed individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef(u32);

impl ObjRef {
    /// Create a handle for registry slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in 32 bits. That caps one heap at
    /// `u32::MAX` objects; since objects live until teardown, a program
    /// that allocates more has already exhausted memory in practice.
    pub fn new(index: usize) -> Self {
        let index = u32::try_from(index).expect("heap registry exceeded u32::MAX objects");
        ObjRef(index)
    }

    /// Registry slot this handle points at.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Represents any Lox value.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// assert!(Value::Nil.is_falsy());
/// assert!(Value::Bool(false).is_falsy());
/// assert!(!Value::Number(0.0).is_falsy());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    /// The absent value
    #[default]
    Nil,
    /// `true` or `false`
    Bool(bool),
    /// IEEE 754 double-precision number
    Number(f64),
    /// Reference to a heap object
    Object(ObjRef),
}

impl Value {
    /// Returns whether this value counts as false in a condition.
    ///
    /// Only `nil` and `false` are falsy. Every number (including zero) and
    /// every object is truthy.
    pub fn is_falsy(&self) -> bool {
        matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Returns the number payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the object handle, if any.
    pub fn as_object(&self) -> Option<ObjRef> {
        match self {
            Value::Object(r) => Some(*r),
            _ => None,
        }
    }

    /// Name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<ObjRef> for Value {
    fn from(r: ObjRef) -> Self {
        Value::Object(r)
    }
}

/// Scalar display form.
///
/// Objects render as their handle because their contents live in a heap this
/// type cannot see; the heap provides the full rendering.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Object(r) => write!(f, "<object {}>", r),
        }
    }
}

/// Significant digits printed for a number.
const PRECISION: i32 = 6;

/// Render `n` like C's `printf("%g")`: six significant digits, trailing
/// zeros dropped, exponent form below `1e-4` and from `1e6` up.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Round to the printed precision first; rounding can bump the exponent.
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, n);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, n)).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}
