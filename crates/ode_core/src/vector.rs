//! Dynamically sized numeric vector used as a packed integration state.

use crate::error::VectorError;
use crate::traits::Scalar;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::ops::{
    Add, AddAssign, Deref, DerefMut, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// Returns true when `a` and `b` differ by at most the machine epsilon of `T`.
pub fn equal<T: Scalar>(a: T, b: T) -> bool {
    approx_equal(a, b, T::epsilon())
}

/// Returns true when `|a - b| <= epsilon`.
pub fn approx_equal<T: Scalar>(a: T, b: T, epsilon: T) -> bool {
    (a - b).abs() <= epsilon
}

/// An ordered sequence of floating-point values with elementwise arithmetic.
///
/// Binary operations between two vectors require equal lengths and division
/// requires a non-zero divisor. The operators panic when these preconditions
/// are violated; the `checked_*` methods report a [`VectorError`] instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericVector<T> {
    data: Vec<T>,
}

fn expect_ok<V>(result: Result<V, VectorError>) -> V {
    result.unwrap_or_else(|err| panic!("{err}"))
}

impl<T: Scalar> NumericVector<T> {
    /// Creates a zero-filled vector of `len` elements.
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![T::zero(); len],
        }
    }

    /// Consumes the vector and returns its elements.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    fn map(&self, f: impl Fn(T) -> T) -> Self {
        Self {
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    fn map_in_place(&mut self, f: impl Fn(T) -> T) {
        for value in &mut self.data {
            *value = f(*value);
        }
    }

    fn zip_in_place(&mut self, rhs: &Self, f: impl Fn(T, T) -> T) -> Result<(), VectorError> {
        if self.data.len() != rhs.data.len() {
            return Err(VectorError::LengthMismatch {
                left: self.data.len(),
                right: rhs.data.len(),
            });
        }
        for (a, &b) in self.data.iter_mut().zip(&rhs.data) {
            *a = f(*a, b);
        }
        Ok(())
    }

    /// Elementwise sum, or an error when the lengths differ.
    pub fn checked_add(&self, rhs: &Self) -> Result<Self, VectorError> {
        let mut out = self.clone();
        out.zip_in_place(rhs, |a, b| a + b)?;
        Ok(out)
    }

    /// Elementwise difference, or an error when the lengths differ.
    pub fn checked_sub(&self, rhs: &Self) -> Result<Self, VectorError> {
        let mut out = self.clone();
        out.zip_in_place(rhs, |a, b| a - b)?;
        Ok(out)
    }

    /// Divides every element by `x`, or errors when `x` is within epsilon of zero.
    pub fn checked_div(&self, x: T) -> Result<Self, VectorError> {
        if equal(x, T::zero()) {
            return Err(VectorError::DivisionByZero);
        }
        Ok(self.map(|v| v / x))
    }

    pub fn checked_dot(&self, rhs: &Self) -> Result<T, VectorError> {
        if self.data.len() != rhs.data.len() {
            return Err(VectorError::LengthMismatch {
                left: self.data.len(),
                right: rhs.data.len(),
            });
        }
        Ok(self
            .data
            .iter()
            .zip(&rhs.data)
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b))
    }

    /// Dot product. Panics when the lengths differ.
    pub fn dot(&self, rhs: &Self) -> T {
        expect_ok(self.checked_dot(rhs))
    }

    /// Adds `x` to every element.
    pub fn add_scalar(&self, x: T) -> Self {
        self.map(|v| v + x)
    }

    /// Subtracts `x` from every element.
    pub fn sub_scalar(&self, x: T) -> Self {
        self.map(|v| v - x)
    }

    pub fn add_scalar_assign(&mut self, x: T) {
        self.map_in_place(|v| v + x);
    }

    pub fn sub_scalar_assign(&mut self, x: T) {
        self.map_in_place(|v| v - x);
    }

    /// p-norm of the vector.
    ///
    /// `p = 0` yields zero, `p = 1` the sum of absolute values, `p = 2` the
    /// Euclidean norm and larger `p` the general `(Σ|x_i|^p)^(1/p)`.
    pub fn norm(&self, p: u32) -> T {
        match p {
            0 => T::zero(),
            1 => self.data.iter().fold(T::zero(), |acc, &v| acc + v.abs()),
            2 => self
                .data
                .iter()
                .fold(T::zero(), |acc, &v| acc + v * v)
                .sqrt(),
            _ => {
                let p = T::from_u32(p).unwrap();
                self.data
                    .iter()
                    .fold(T::zero(), |acc, &v| acc + v.abs().powf(p))
                    .powf(T::one() / p)
            }
        }
    }

    /// Euclidean norm.
    pub fn length(&self) -> T {
        self.norm(2)
    }

    /// Scales the vector to unit length, or errors when its length is zero.
    pub fn try_normalize(&mut self) -> Result<(), VectorError> {
        let length = self.length();
        if equal(length, T::zero()) {
            return Err(VectorError::ZeroLength);
        }
        self.map_in_place(|v| v / length);
        Ok(())
    }

    /// Scales the vector to unit length. Panics when its length is zero.
    pub fn normalize(&mut self) {
        expect_ok(self.try_normalize());
    }

    pub fn make_zero(&mut self) -> &mut Self {
        self.map_in_place(|_| T::zero());
        self
    }

    /// True when every element is within epsilon of zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&v| equal(v, T::zero()))
    }

    /// True when every element is within epsilon of one.
    pub fn is_unity(&self) -> bool {
        self.data.iter().all(|&v| equal(v, T::one()))
    }
}

impl<T> Deref for NumericVector<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for NumericVector<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> From<Vec<T>> for NumericVector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T, const N: usize> From<[T; N]> for NumericVector<T> {
    fn from(values: [T; N]) -> Self {
        Self {
            data: Vec::from(values),
        }
    }
}

impl<T> FromIterator<T> for NumericVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<T: Scalar + nalgebra::Scalar> From<DVector<T>> for NumericVector<T> {
    fn from(vector: DVector<T>) -> Self {
        Self {
            data: vector.iter().copied().collect(),
        }
    }
}

impl<T: Scalar + nalgebra::Scalar> From<NumericVector<T>> for DVector<T> {
    fn from(vector: NumericVector<T>) -> Self {
        DVector::from_vec(vector.into_vec())
    }
}

impl<T: Scalar> Neg for NumericVector<T> {
    type Output = Self;
    fn neg(mut self) -> Self {
        self.map_in_place(|v| -v);
        self
    }
}

impl<T: Scalar> Add for NumericVector<T> {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self += &rhs;
        self
    }
}

impl<T: Scalar> Sub for NumericVector<T> {
    type Output = Self;
    fn sub(mut self, rhs: Self) -> Self {
        self -= &rhs;
        self
    }
}

impl<'a, T: Scalar> Add<&'a NumericVector<T>> for &'a NumericVector<T> {
    type Output = NumericVector<T>;
    fn add(self, rhs: &'a NumericVector<T>) -> NumericVector<T> {
        expect_ok(self.checked_add(rhs))
    }
}

impl<'a, T: Scalar> Sub<&'a NumericVector<T>> for &'a NumericVector<T> {
    type Output = NumericVector<T>;
    fn sub(self, rhs: &'a NumericVector<T>) -> NumericVector<T> {
        expect_ok(self.checked_sub(rhs))
    }
}

impl<T: Scalar> Mul<T> for NumericVector<T> {
    type Output = Self;
    fn mul(mut self, rhs: T) -> Self {
        self *= rhs;
        self
    }
}

impl<T: Scalar> Div<T> for NumericVector<T> {
    type Output = Self;
    fn div(mut self, rhs: T) -> Self {
        self /= rhs;
        self
    }
}

impl<T: Scalar> AddAssign<&NumericVector<T>> for NumericVector<T> {
    fn add_assign(&mut self, rhs: &NumericVector<T>) {
        expect_ok(self.zip_in_place(rhs, |a, b| a + b));
    }
}

impl<T: Scalar> SubAssign<&NumericVector<T>> for NumericVector<T> {
    fn sub_assign(&mut self, rhs: &NumericVector<T>) {
        expect_ok(self.zip_in_place(rhs, |a, b| a - b));
    }
}

impl<T: Scalar> AddAssign for NumericVector<T> {
    fn add_assign(&mut self, rhs: Self) {
        *self += &rhs;
    }
}

impl<T: Scalar> SubAssign for NumericVector<T> {
    fn sub_assign(&mut self, rhs: Self) {
        *self -= &rhs;
    }
}

impl<T: Scalar> MulAssign<T> for NumericVector<T> {
    fn mul_assign(&mut self, rhs: T) {
        self.map_in_place(|v| v * rhs);
    }
}

impl<T: Scalar> DivAssign<T> for NumericVector<T> {
    fn div_assign(&mut self, rhs: T) {
        if equal(rhs, T::zero()) {
            panic!("{}", VectorError::DivisionByZero);
        }
        self.map_in_place(|v| v / rhs);
    }
}
