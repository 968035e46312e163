//! Directional-derivative seeding for local coupling expressions.
//!
//! A coupling constraint is written once as an expression over dual numbers;
//! seeding each operand of interest with a unit derivative direction and
//! evaluating the expression propagates exact partials through every
//! arithmetic operation, so the Jacobian entries fall out of the result
//! without hand-derived derivatives. The derivative vector length is the
//! number of active directions for the current local evaluation and is reset
//! for every evaluation.

use nalgebra::{DVector, Dyn, U1};
use num_dual::{Derivative, DualDVec64};

/// Seed `value` as derivative direction `direction` out of `ndir` active
/// directions.
pub fn seed(value: f64, direction: usize, ndir: usize) -> DualDVec64 {
    debug_assert!(direction < ndir);
    DualDVec64::new(value, Derivative::derivative_generic(Dyn(ndir), U1, direction))
}

/// Seed a pair of operands with two directions: direction 0 tracks the first
/// operand, direction 1 the second.
pub fn seed_pair(a: f64, b: f64) -> (DualDVec64, DualDVec64) {
    (seed(a, 0, 2), seed(b, 1, 2))
}

/// Partials of an evaluated expression with respect to all `ndir` seeded
/// directions.
pub fn gradient(x: DualDVec64, ndir: usize) -> DVector<f64> {
    x.eps.unwrap_generic(Dyn(ndir), U1)
}
