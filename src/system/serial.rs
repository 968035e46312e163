//! Single-process reference implementation of the system interfaces.
//!
//! Stands in for the distributed matrix/vector layer in tests and serial
//! runs: the "collective" flush barrier degenerates to merging the local
//! pending buffer. Assembled matrix entries live in an ordered map so
//! repeated passes accumulate in a fixed order and runs are bit-repeatable.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};

use super::{AssemblyError, InsertMode, SystemMatrix, SystemVector};
use crate::coupling::redirect::RowRedirectionPlan;

pub struct SerialVector {
    values: DVector<f64>,
    pending: Vec<(usize, f64)>,
    mode: InsertMode,
}

impl SerialVector {
    pub fn zeros(n: usize) -> Self {
        Self {
            values: DVector::zeros(n),
            pending: Vec::new(),
            mode: InsertMode::Unset,
        }
    }

    /// Merged values; call [`flush`](SystemVector::flush) first to include
    /// pending inserts.
    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    pub fn get(&self, row: usize) -> f64 {
        self.values[row]
    }

    /// Consume a redirection plan: add each source row into its destination
    /// row, then clear the sources. Forces a flush so the folded values are
    /// the fully merged ones. A degenerate pair with `src == dst` is a
    /// no-op, including its clear.
    pub fn fold_rows(&mut self, plan: &RowRedirectionPlan) {
        self.flush();
        for (&src, &dst) in plan.src_rows.iter().zip(&plan.dst_rows) {
            if src == dst {
                continue;
            }
            let v = self.values[src];
            self.values[dst] += v;
        }
        self.clear_rows(&effective_clears(plan));
    }
}

impl SystemVector for SerialVector {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn insert_mode(&self) -> InsertMode {
        self.mode
    }

    fn set_insert_mode(&mut self, mode: InsertMode) {
        self.mode = mode;
    }

    fn add(&mut self, row: usize, value: f64) -> Result<(), AssemblyError> {
        if row >= self.values.len() {
            return Err(AssemblyError::RowOutOfRange {
                row,
                len: self.values.len(),
            });
        }
        self.pending.push((row, value));
        Ok(())
    }

    fn flush(&mut self) {
        let overwrite = self.mode == InsertMode::Overwrite;
        for (row, value) in self.pending.drain(..) {
            if overwrite {
                self.values[row] = value;
            } else {
                self.values[row] += value;
            }
        }
        self.mode = InsertMode::Unset;
    }

    fn clear_rows(&mut self, rows: &[usize]) {
        self.pending.retain(|&(row, _)| !rows.contains(&row));
        for &row in rows {
            self.values[row] = 0.0;
        }
    }
}

pub struct SerialMatrix {
    nrows: usize,
    ncols: usize,
    entries: BTreeMap<(usize, usize), f64>,
    pending: Vec<(usize, usize, f64)>,
    mode: InsertMode,
}

impl SerialMatrix {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            entries: BTreeMap::new(),
            pending: Vec::new(),
            mode: InsertMode::Unset,
        }
    }

    /// Number of allocated (possibly zero-valued) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.entries.contains_key(&(row, col))
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries.get(&(row, col)).copied().unwrap_or(0.0)
    }

    /// Dense copy of the merged entries, for handing to a direct solver.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.nrows, self.ncols);
        for (&(row, col), &value) in &self.entries {
            dense[(row, col)] = value;
        }
        dense
    }

    /// Consume a redirection plan: add each source row into its destination
    /// row, then clear the sources (keeping their sparsity). A degenerate
    /// pair with `src == dst` is a no-op, including its clear.
    pub fn fold_rows(&mut self, plan: &RowRedirectionPlan) {
        self.flush();
        for (&src, &dst) in plan.src_rows.iter().zip(&plan.dst_rows) {
            if src == dst {
                continue;
            }
            let row: Vec<(usize, f64)> = self
                .entries
                .range((src, 0)..(src + 1, 0))
                .map(|(&(_, col), &v)| (col, v))
                .collect();
            for (col, v) in row {
                *self.entries.entry((dst, col)).or_insert(0.0) += v;
            }
        }
        self.clear_rows(&effective_clears(plan));
    }
}

/// Clear list of a plan minus its degenerate (source == destination) pairs.
fn effective_clears(plan: &RowRedirectionPlan) -> Vec<usize> {
    plan.clear_rows
        .iter()
        .zip(&plan.dst_rows)
        .filter(|&(&src, &dst)| src != dst)
        .map(|(&src, _)| src)
        .collect()
}

impl SystemMatrix for SerialMatrix {
    fn nrows(&self) -> usize {
        self.nrows
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    fn insert_mode(&self) -> InsertMode {
        self.mode
    }

    fn set_insert_mode(&mut self, mode: InsertMode) {
        self.mode = mode;
    }

    fn add(&mut self, row: usize, col: usize, value: f64) -> Result<(), AssemblyError> {
        if row >= self.nrows || col >= self.ncols {
            return Err(AssemblyError::EntryOutOfRange {
                row,
                col,
                nrows: self.nrows,
                ncols: self.ncols,
            });
        }
        self.pending.push((row, col, value));
        Ok(())
    }

    fn flush(&mut self) {
        let overwrite = self.mode == InsertMode::Overwrite;
        for (row, col, value) in self.pending.drain(..) {
            let slot = self.entries.entry((row, col)).or_insert(0.0);
            if overwrite {
                *slot = value;
            } else {
                *slot += value;
            }
        }
        self.mode = InsertMode::Unset;
    }

    fn clear_rows(&mut self, rows: &[usize]) {
        self.pending.retain(|&(row, _, _)| !rows.contains(&row));
        for &row in rows {
            for (_, value) in self.entries.range_mut((row, 0)..(row + 1, 0)) {
                *value = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_add_then_flush_accumulates() {
        let mut f = SerialVector::zeros(3);
        f.add(1, 2.0).unwrap();
        f.add(1, 0.5).unwrap();
        f.flush();
        assert_eq!(f.get(1), 2.5);
        assert_eq!(f.insert_mode(), InsertMode::Unset);
    }

    #[test]
    fn vector_overwrite_mode_replaces() {
        let mut f = SerialVector::zeros(2);
        f.add(0, 1.0).unwrap();
        f.flush();
        f.set_insert_mode(InsertMode::Overwrite);
        f.add(0, 5.0).unwrap();
        f.flush();
        assert_eq!(f.get(0), 5.0);
    }

    #[test]
    fn vector_out_of_range_is_fatal() {
        let mut f = SerialVector::zeros(2);
        assert!(matches!(
            f.add(2, 1.0),
            Err(AssemblyError::RowOutOfRange { row: 2, len: 2 })
        ));
    }

    #[test]
    fn vector_fold_conserves_and_clears() {
        let mut f = SerialVector::zeros(4);
        f.add(0, 1.0).unwrap();
        f.add(2, 0.25).unwrap();
        let plan = RowRedirectionPlan {
            src_rows: vec![2],
            dst_rows: vec![0],
            clear_rows: vec![2],
        };
        f.fold_rows(&plan);
        assert_eq!(f.get(0), 1.25);
        assert_eq!(f.get(2), 0.0);
    }

    #[test]
    fn degenerate_fold_is_harmless() {
        let mut f = SerialVector::zeros(2);
        f.add(0, 1.0).unwrap();
        let plan = RowRedirectionPlan {
            src_rows: vec![0],
            dst_rows: vec![0],
            clear_rows: vec![0],
        };
        f.fold_rows(&plan);
        assert_eq!(f.get(0), 1.0);
    }

    #[test]
    fn matrix_zero_insert_reserves_pattern() {
        let mut jac = SerialMatrix::zeros(3, 3);
        jac.add(0, 2, 0.0).unwrap();
        jac.flush();
        assert!(jac.contains(0, 2));
        assert_eq!(jac.get(0, 2), 0.0);
        assert_eq!(jac.nnz(), 1);
    }

    #[test]
    fn matrix_clear_rows_keeps_sparsity() {
        let mut jac = SerialMatrix::zeros(2, 2);
        jac.add(0, 0, 3.0).unwrap();
        jac.add(0, 1, -1.0).unwrap();
        jac.add(1, 1, 2.0).unwrap();
        jac.flush();
        jac.clear_rows(&[0]);
        assert_eq!(jac.get(0, 0), 0.0);
        assert_eq!(jac.get(0, 1), 0.0);
        assert_eq!(jac.get(1, 1), 2.0);
        assert_eq!(jac.nnz(), 3);
    }

    #[test]
    fn matrix_fold_moves_whole_row() {
        let mut jac = SerialMatrix::zeros(3, 3);
        jac.add(2, 0, 1.0).unwrap();
        jac.add(2, 2, -1.0).unwrap();
        jac.add(0, 0, 2.0).unwrap();
        let plan = RowRedirectionPlan {
            src_rows: vec![2],
            dst_rows: vec![0],
            clear_rows: vec![2],
        };
        jac.fold_rows(&plan);
        assert_eq!(jac.get(0, 0), 3.0);
        assert_eq!(jac.get(0, 2), -1.0);
        assert_eq!(jac.get(2, 0), 0.0);
        assert_eq!(jac.get(2, 2), 0.0);
        assert!(jac.contains(2, 0));
    }

    #[test]
    fn matrix_out_of_range_is_fatal() {
        let mut jac = SerialMatrix::zeros(2, 2);
        assert!(jac.add(0, 5, 0.0).is_err());
        assert!(jac.add(5, 0, 0.0).is_err());
    }
}
