//! Multi-region interface coupling and Jacobian assembly for a parallel
//! finite-volume device simulator.
//!
//! Several independently discretized regions can attach unknowns to the same
//! geometric mesh point. This crate merges those co-located unknowns into a
//! single representative row of the global sparse system: it groups the
//! per-region entries, plans the row folding that conserves the flux already
//! accumulated into dependent rows, reserves the Jacobian sparsity the
//! coupling will touch, and assembles the coupling residual and its exact
//! partial derivatives via forward-mode automatic differentiation.
//!
//! Mesh construction, the distributed matrix/vector internals and the outer
//! Newton driver are external collaborators; they are consumed through the
//! narrow interfaces in [`discretization::node_index`] and [`system`].

pub mod coupling;
pub mod discretization;
pub mod numerics;
pub mod system;
