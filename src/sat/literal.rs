#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Literals: a variable together with a polarity.
//!
//! Literals use the DIMACS convention. The magnitude names the variable and
//! the sign gives the polarity, so `3` asserts variable 3 true and `-3`
//! asserts it false. Variable `0` is never a valid variable.

use core::ops::{Neg, Not};
use std::fmt;

/// A propositional variable, numbered from 1.
pub type Variable = u32;

/// Largest variable a literal can carry, so that both polarities fit an
/// `i32`.
pub const MAX_VARIABLE: Variable = i32::MAX.unsigned_abs();

/// A signed literal in DIMACS form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(i32);

impl Literal {
    /// Builds the literal of `var` with the given polarity
    /// (`true` = positive occurrence). `var` must not exceed
    /// `MAX_VARIABLE`; `Cnf` rejects larger variable counts.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn new(var: Variable, polarity: bool) -> Self {
        debug_assert!(var <= MAX_VARIABLE);
        let var = var as i32;
        if polarity { Self(var) } else { Self(-var) }
    }

    /// Wraps a DIMACS integer. The caller guarantees `value != 0`;
    /// `Cnf::new` rejects zero before any literal is built.
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn to_i32(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0.unsigned_abs()
    }

    /// `true` for a positive literal.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        !self.polarity()
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self(-self.0)
    }

    /// Index of the literal's variable, for use with per-variable vectors.
    #[must_use]
    pub const fn index(self) -> usize {
        self.variable() as usize
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

impl From<Literal> for i32 {
    fn from(lit: Literal) -> Self {
        lit.to_i32()
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_neg() {
        assert_eq!(Literal::new(1, false).negated(), Literal::new(1, true));
        assert_eq!(-Literal::new(1, true), Literal::new(1, false));
        assert_eq!(!Literal::from(-4), Literal::from(4));
    }

    #[test]
    fn test_literal_parts() {
        let lit = Literal::from_i32(-7);
        assert_eq!(lit.variable(), 7);
        assert_eq!(lit.index(), 7);
        assert!(!lit.polarity());
        assert!(lit.is_negated());
        assert_eq!(lit.to_string(), "-7");

        let largest = Literal::new(MAX_VARIABLE, false);
        assert_eq!(largest.to_i32(), -i32::MAX);
        assert_eq!(largest.negated().variable(), MAX_VARIABLE);

        let lit = Literal::new(12, true);
        assert_eq!(lit.to_i32(), 12);
        assert!(lit.polarity());
    }
}
