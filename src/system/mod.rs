//! Narrow interface to the distributed matrix/vector layer.
//!
//! All mutation is two-phase: inserts are queued, then a collective
//! [`flush`](SystemMatrix::flush) barrier merges them. Additive and
//! overwrite inserts must never mix within one pass; the provided
//! `ensure_additive` helpers force a flush when an incompatible pending
//! state is observed.

pub mod serial;

use thiserror::Error;

use crate::discretization::node_index::NodeId;

/// Pending-write mode of a distributed system object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InsertMode {
    /// No pending writes since the last flush.
    #[default]
    Unset,
    /// Pending writes accumulate into existing values.
    Add,
    /// Pending writes replace existing values.
    Overwrite,
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    /// An interface node with no valid region entry: upstream mesh/region
    /// misclassification.
    #[error("interface node {0:?} has no valid region entry")]
    OrphanInterfaceNode(NodeId),
    /// Signals an inconsistent node index and must not be masked.
    #[error("row {row} out of range for vector of length {len}")]
    RowOutOfRange { row: usize, len: usize },
    /// Signals an inconsistent node index and must not be masked.
    #[error("entry ({row}, {col}) out of range for {nrows}x{ncols} matrix")]
    EntryOutOfRange {
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    },
}

/// Global residual vector under two-phase mutation.
pub trait SystemVector {
    fn len(&self) -> usize;

    fn insert_mode(&self) -> InsertMode;

    fn set_insert_mode(&mut self, mode: InsertMode);

    /// Queue a value at `row`; the current insert mode decides whether the
    /// flush merges it additively or by overwrite.
    fn add(&mut self, row: usize, value: f64) -> Result<(), AssemblyError>;

    /// Collective barrier merging all pending inserts.
    fn flush(&mut self);

    /// Zero the given rows; pending inserts to them are dropped.
    fn clear_rows(&mut self, rows: &[usize]);

    /// Make additive inserts safe: a pending overwrite state is flushed
    /// first rather than reported as an error.
    fn ensure_additive(&mut self) {
        if !matches!(self.insert_mode(), InsertMode::Add | InsertMode::Unset) {
            self.flush();
        }
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Global Jacobian matrix under two-phase mutation.
pub trait SystemMatrix {
    fn nrows(&self) -> usize;

    fn ncols(&self) -> usize;

    fn insert_mode(&self) -> InsertMode;

    fn set_insert_mode(&mut self, mode: InsertMode);

    /// Queue a value at (`row`, `col`). Inserting an explicit zero reserves
    /// the location in the sparsity pattern.
    fn add(&mut self, row: usize, col: usize, value: f64) -> Result<(), AssemblyError>;

    /// Collective barrier merging all pending inserts.
    fn flush(&mut self);

    /// Zero the values of the given rows; their sparsity is kept.
    fn clear_rows(&mut self, rows: &[usize]);

    /// Make additive inserts safe: a pending overwrite state is flushed
    /// first rather than reported as an error.
    fn ensure_additive(&mut self) {
        if !matches!(self.insert_mode(), InsertMode::Add | InsertMode::Unset) {
            self.flush();
        }
    }
}
