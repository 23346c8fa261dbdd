//! Numeric backends for the loss formulas
//!
//! The engine is generic over [`NumericBackend`] so that tests and quick
//! estimates can run on `f64` while production tables use exact rationals.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

use crate::error::{LossError, LossResult};

/// Arithmetic needed to evaluate the M/M/c/K formulas
pub trait NumericBackend: Send + Sync {
    /// Number representation used by this backend
    type Real: Clone + fmt::Debug + Send + Sync;

    /// Short name used in error messages
    fn name(&self) -> &'static str;

    fn from_f64(&self, value: f64) -> LossResult<Self::Real>;

    fn from_u64(&self, value: u64) -> Self::Real;

    fn power(&self, base: &Self::Real, exponent: u32) -> Self::Real;

    fn factorial(&self, n: u32) -> Self::Real;

    fn add(&self, a: &Self::Real, b: &Self::Real) -> Self::Real;

    fn subtract(&self, a: &Self::Real, b: &Self::Real) -> Self::Real;

    fn multiply(&self, a: &Self::Real, b: &Self::Real) -> Self::Real;

    /// Divide, failing on a zero divisor; `context` names the quantity being computed
    fn divide(&self, a: &Self::Real, b: &Self::Real, context: &'static str) -> LossResult<Self::Real>;

    /// Exact test for the value one
    fn is_one(&self, value: &Self::Real) -> bool;

    /// Convert to a finite `f64`
    fn to_f64(&self, value: &Self::Real) -> LossResult<f64>;
}

/// Exact arithmetic on arbitrary-precision rationals
///
/// Every finite `f64` converts exactly, so the only rounding happens in the
/// final [`NumericBackend::to_f64`] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactBackend;

impl NumericBackend for ExactBackend {
    type Real = BigRational;

    fn name(&self) -> &'static str {
        "exact"
    }

    fn from_f64(&self, value: f64) -> LossResult<BigRational> {
        BigRational::from_float(value).ok_or_else(|| LossError::NonRepresentable {
            backend: self.name(),
            value: value.to_string(),
        })
    }

    fn from_u64(&self, value: u64) -> BigRational {
        BigRational::from_integer(BigInt::from(value))
    }

    fn power(&self, base: &BigRational, exponent: u32) -> BigRational {
        num_traits::pow(base.clone(), exponent as usize)
    }

    fn factorial(&self, n: u32) -> BigRational {
        let product = (2..=n).fold(BigInt::one(), |acc, k| acc * BigInt::from(k));
        BigRational::from_integer(product)
    }

    fn add(&self, a: &BigRational, b: &BigRational) -> BigRational {
        a + b
    }

    fn subtract(&self, a: &BigRational, b: &BigRational) -> BigRational {
        a - b
    }

    fn multiply(&self, a: &BigRational, b: &BigRational) -> BigRational {
        a * b
    }

    fn divide(&self, a: &BigRational, b: &BigRational, context: &'static str) -> LossResult<BigRational> {
        if b.is_zero() {
            return Err(LossError::DivisionByZero(context));
        }
        Ok(a / b)
    }

    fn is_one(&self, value: &BigRational) -> bool {
        value.is_one()
    }

    fn to_f64(&self, value: &BigRational) -> LossResult<f64> {
        value
            .to_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| LossError::NonRepresentable {
                backend: self.name(),
                value: value.to_string(),
            })
    }
}

/// Plain double-precision arithmetic
///
/// Overflows once `u^K` or `K!` leave the `f64` range; the overflow surfaces
/// as [`LossError::NonRepresentable`] from [`NumericBackend::to_f64`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Float64Backend;

impl NumericBackend for Float64Backend {
    type Real = f64;

    fn name(&self) -> &'static str {
        "f64"
    }

    fn from_f64(&self, value: f64) -> LossResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(LossError::NonRepresentable {
                backend: self.name(),
                value: value.to_string(),
            })
        }
    }

    fn from_u64(&self, value: u64) -> f64 {
        value as f64
    }

    fn power(&self, base: &f64, exponent: u32) -> f64 {
        base.powf(exponent as f64)
    }

    fn factorial(&self, n: u32) -> f64 {
        (2..=n).fold(1.0, |acc, k| acc * k as f64)
    }

    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn subtract(&self, a: &f64, b: &f64) -> f64 {
        a - b
    }

    fn multiply(&self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    fn divide(&self, a: &f64, b: &f64, context: &'static str) -> LossResult<f64> {
        if *b == 0.0 {
            return Err(LossError::DivisionByZero(context));
        }
        Ok(a / b)
    }

    fn is_one(&self, value: &f64) -> bool {
        *value == 1.0
    }

    fn to_f64(&self, value: &f64) -> LossResult<f64> {
        self.from_f64(*value)
    }
}
