// src/utils/precision.rs
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::Value;
use std::cmp::Ordering;

/// Строка, которую получает вызывающий код, если на вход пришло не число.
pub const FALLBACK: &str = "0.0";

/// Number of decimals `compare` shows when the caller has no preference.
pub const DEFAULT_PRECISION: u32 = 2;

// Below this value (and with precision >= 5) we round instead of truncating.
const SMALL_VALUE_THRESHOLD: f64 = 0.0001;
const SMALL_VALUE_MIN_PRECISION: f64 = 5.0;
const SMALL_VALUE_DECIMALS: usize = 5;

// 2^127, every i128 is below it
const I128_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// A numeric input, kept in its own kind so that ordering stays exact.
///
/// Floats are always finite. Equality and ordering work across kinds:
/// `Int(3) == Float(3.0)`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i128),
    Float(f64),
    Decimal(Decimal),
}

impl Number {
    /// Lossy view used for formatting only.
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
            Self::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let ordering = match (*self, *other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(&b),
            (Self::Decimal(a), Self::Decimal(b)) => a.cmp(&b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(&b)?,
            (Self::Int(a), Self::Float(b)) => cmp_int_float(a, b),
            (Self::Float(a), Self::Int(b)) => cmp_int_float(b, a).reverse(),
            (Self::Int(a), Self::Decimal(b)) => cmp_int_decimal(a, b),
            (Self::Decimal(a), Self::Int(b)) => cmp_int_decimal(b, a).reverse(),
            (Self::Float(a), Self::Decimal(b)) => cmp_float_decimal(a, b)?,
            (Self::Decimal(a), Self::Float(b)) => cmp_float_decimal(b, a)?.reverse(),
        };
        Some(ordering)
    }
}

fn cmp_int_float(i: i128, f: f64) -> Ordering {
    if f >= I128_BOUND {
        return Ordering::Less;
    }
    if f < -I128_BOUND {
        return Ordering::Greater;
    }
    // Floats this large are whole numbers, so the cast is exact.
    let floor = f.floor();
    match i.cmp(&(floor as i128)) {
        Ordering::Equal if f > floor => Ordering::Less,
        ordering => ordering,
    }
}

fn cmp_int_decimal(i: i128, d: Decimal) -> Ordering {
    match Decimal::from_i128(i) {
        Some(i) => i.cmp(&d),
        // Out of Decimal range, so larger in magnitude than any Decimal.
        None if i > 0 => Ordering::Greater,
        None => Ordering::Less,
    }
}

fn cmp_float_decimal(f: f64, d: Decimal) -> Option<Ordering> {
    match Decimal::from_f64_retain(f) {
        Some(f) => Some(f.cmp(&d)),
        None => f.partial_cmp(&d.to_f64()?),
    }
}

/// Anything the formatters accept as input.
///
/// Returning `None` marks the value as non-numeric, which makes the formatters
/// fall back to [`FALLBACK`] instead of failing. Strings are never numeric, even
/// when their content would parse. NaN and infinities are not numbers either.
pub trait AsNumber {
    fn as_number(&self) -> Option<Number>;
}

macro_rules! impl_as_number_for_int {
    ($($t:ty),*) => {
        $(
            impl AsNumber for $t {
                fn as_number(&self) -> Option<Number> {
                    Some(Number::Int(i128::from(*self)))
                }
            }
        )*
    };
}

impl_as_number_for_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl AsNumber for isize {
    fn as_number(&self) -> Option<Number> {
        Some(Number::Int(*self as i128))
    }
}

impl AsNumber for usize {
    fn as_number(&self) -> Option<Number> {
        Some(Number::Int(*self as i128))
    }
}

impl AsNumber for u128 {
    fn as_number(&self) -> Option<Number> {
        match i128::try_from(*self) {
            Ok(i) => Some(Number::Int(i)),
            Err(_) => (*self as f64).as_number(),
        }
    }
}

impl AsNumber for f64 {
    fn as_number(&self) -> Option<Number> {
        self.is_finite().then_some(Number::Float(*self))
    }
}

impl AsNumber for f32 {
    fn as_number(&self) -> Option<Number> {
        f64::from(*self).as_number()
    }
}

// true/false ведут себя как 1/0
impl AsNumber for bool {
    fn as_number(&self) -> Option<Number> {
        Some(Number::Int(i128::from(*self)))
    }
}

impl AsNumber for Decimal {
    fn as_number(&self) -> Option<Number> {
        Some(Number::Decimal(*self))
    }
}

impl AsNumber for Number {
    fn as_number(&self) -> Option<Number> {
        Some(*self)
    }
}

impl AsNumber for Value {
    fn as_number(&self) -> Option<Number> {
        let Value::Number(n) = self else {
            return None;
        };
        n.as_i64()
            .map(|i| Number::Int(i128::from(i)))
            .or_else(|| n.as_u64().map(|u| Number::Int(i128::from(u))))
            .or_else(|| n.as_f64().and_then(|f| f.as_number()))
    }
}

impl AsNumber for str {
    fn as_number(&self) -> Option<Number> {
        None
    }
}

impl AsNumber for String {
    fn as_number(&self) -> Option<Number> {
        None
    }
}

impl<T: AsNumber> AsNumber for Option<T> {
    fn as_number(&self) -> Option<Number> {
        self.as_ref().and_then(AsNumber::as_number)
    }
}

impl<T: AsNumber + ?Sized> AsNumber for &T {
    fn as_number(&self) -> Option<Number> {
        (**self).as_number()
    }
}

/// Formats `value` with `precision` decimals, cutting the tail off instead of rounding.
///
/// The cut goes through `floor`, so negative values move away from zero:
/// `-3.14159` at 2 decimals becomes `-3.15`.
/// Values below `0.0001` asked for at least 5 decimals are rounded to exactly 5.
/// Non-numeric input on either side yields `"0.0"`.
///
/// Пример: truncate(3.14159, 2) -> "3.14"
pub fn truncate<V: AsNumber, P: AsNumber>(value: V, precision: P) -> String {
    let (Some(value), Some(precision)) = (value.as_number(), precision.as_number()) else {
        return FALLBACK.to_string();
    };
    let (f, n) = (value.to_f64(), precision.to_f64());
    if !f.is_finite() || !n.is_finite() {
        return FALLBACK.to_string();
    }

    if f < SMALL_VALUE_THRESHOLD && n >= SMALL_VALUE_MIN_PRECISION {
        return format!("{:.*}", SMALL_VALUE_DECIMALS, f);
    }

    // floor(f * 10^n) / 10^n; adding 0.0 turns -0.0 into 0.0
    let scale = pow10(n);
    let truncated = ((f * scale).floor() + 0.0) / scale;
    if !truncated.is_finite() {
        return FALLBACK.to_string();
    }

    format!("{:.*}", shown_decimals(n), truncated)
}

/// Describes how `val1` relates to `val2`: `"label: 5.00 > 3.00"`.
///
/// The ordering is decided on the exact values; both sides are then shown through
/// [`truncate`], so `3.001` vs `3.0` reads `"3.00 > 3.00"`. An empty label drops
/// the prefix. Non-numeric values compare as equal.
pub fn compare<A, B, P>(val1: A, val2: B, label: &str, precision: P) -> String
where
    A: AsNumber,
    B: AsNumber,
    P: AsNumber,
{
    let ordering = val1
        .as_number()
        .zip(val2.as_number())
        .and_then(|(a, b)| a.partial_cmp(&b))
        .unwrap_or(Ordering::Equal);

    let sign = match ordering {
        Ordering::Greater => '>',
        Ordering::Less => '<',
        Ordering::Equal => '=',
    };

    let body = format!(
        "{} {} {}",
        truncate(&val1, &precision),
        sign,
        truncate(&val2, &precision)
    );

    if label.is_empty() {
        body
    } else {
        format!("{}: {}", label, body)
    }
}

fn pow10(n: f64) -> f64 {
    if n.fract() == 0.0 && n.abs() <= f64::from(i32::MAX) {
        10f64.powi(n as i32)
    } else {
        10f64.powf(n)
    }
}

// Fractional precision shows its integer part, negative precision shows none.
fn shown_decimals(n: f64) -> usize {
    if n <= 0.0 {
        0
    } else {
        n.floor() as usize
    }
}
