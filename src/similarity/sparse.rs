use crate::{ingest::SparseRatingMatrix, models::ItemId};

use super::VectorSpace;

/// Cosine space over the item columns of a sparse rating matrix
///
/// Keeps a user→items index next to the matrix so the similarities of one
/// item are found by walking only the users who rated it and the other items
/// those users rated.
pub struct SparseItemSpace<'a> {
    matrix: &'a SparseRatingMatrix,
    norms: Vec<f64>,
    row_ptr: Vec<usize>,
    row_items: Vec<u32>,
    row_values: Vec<f32>,
}

impl<'a> SparseItemSpace<'a> {
    pub fn new(matrix: &'a SparseRatingMatrix) -> Self {
        let n_items = matrix.n_items();
        let n_users = matrix.n_users();

        let mut norms = Vec::with_capacity(n_items);
        let mut row_counts = vec![0usize; n_users];
        for col in 0..n_items {
            let (rows, values) = matrix.column(col);
            let sq: f64 = values.iter().map(|&v| f64::from(v) * f64::from(v)).sum();
            norms.push(sq.sqrt());
            for &row in rows {
                row_counts[row as usize] += 1;
            }
        }

        let mut row_ptr = Vec::with_capacity(n_users + 1);
        row_ptr.push(0);
        for count in &row_counts {
            let last = row_ptr[row_ptr.len() - 1];
            row_ptr.push(last + count);
        }

        // Columns are visited in ascending order, so each user's items end up sorted.
        let mut cursor = row_ptr.clone();
        let mut row_items = vec![0u32; matrix.nnz()];
        let mut row_values = vec![0f32; matrix.nnz()];
        for col in 0..n_items {
            let (rows, values) = matrix.column(col);
            for (&row, &value) in rows.iter().zip(values) {
                let slot = cursor[row as usize];
                row_items[slot] = col as u32;
                row_values[slot] = value;
                cursor[row as usize] += 1;
            }
        }

        Self {
            matrix,
            norms,
            row_ptr,
            row_items,
            row_values,
        }
    }

    fn user_row(&self, row: usize) -> (&[u32], &[f32]) {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        (&self.row_items[range.clone()], &self.row_values[range])
    }
}

impl VectorSpace for SparseItemSpace<'_> {
    fn item_ids(&self) -> &[ItemId] {
        self.matrix.item_ids()
    }

    fn cosine_similarities(&self, index: usize) -> Vec<(usize, f64)> {
        let norm = self.norms[index];
        if norm == 0.0 {
            return Vec::new();
        }

        let n_items = self.norms.len();
        let mut dots = vec![0f64; n_items];
        let mut seen = vec![false; n_items];
        let mut touched = Vec::new();

        let (rows, values) = self.matrix.column(index);
        for (&row, &value) in rows.iter().zip(values) {
            let (items, item_values) = self.user_row(row as usize);
            for (&other, &other_value) in items.iter().zip(item_values) {
                let other = other as usize;
                if other == index {
                    continue;
                }
                if !seen[other] {
                    seen[other] = true;
                    touched.push(other);
                }
                dots[other] += f64::from(value) * f64::from(other_value);
            }
        }

        touched
            .into_iter()
            .filter_map(|other| {
                let denom = norm * self.norms[other];
                if denom == 0.0 {
                    return None;
                }
                let score = dots[other] / denom;
                (score != 0.0 && score.is_finite()).then_some((other, score))
            })
            .collect()
    }
}
