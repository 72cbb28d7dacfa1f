use chrono::NaiveDate;
use serde::Deserialize;
use std::io::{BufRead, Lines};

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, Rating, UserId},
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// How a repeated (user, item) observation is handled
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// The later observation replaces the earlier one
    #[default]
    Overwrite,
    /// The build fails with `AppError::DuplicateRating`
    Reject,
}

/// Streaming parser over Netflix-style rating blocks
///
/// A block is a header line `<item_id>:` followed by data lines
/// `<user_id>,<rating>,<date>`. Blank lines are skipped; any other line is a
/// parse error and ends the stream.
pub struct RatingBlocks<R> {
    lines: Lines<R>,
    origin: String,
    line_no: usize,
    current_item: Option<ItemId>,
    failed: bool,
}

impl<R: BufRead> RatingBlocks<R> {
    pub fn new(origin: &str, reader: R) -> Self {
        Self {
            lines: reader.lines(),
            origin: origin.to_string(),
            line_no: 0,
            current_item: None,
            failed: false,
        }
    }

    fn fail(&mut self, message: impl Into<String>) -> Option<AppResult<Rating>> {
        self.failed = true;
        Some(Err(AppError::parse(&self.origin, self.line_no, message)))
    }
}

impl<R: BufRead> Iterator for RatingBlocks<R> {
    type Item = AppResult<Rating>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(AppError::Io(e)));
                }
            };
            self.line_no += 1;

            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            if let Some(header) = line.strip_suffix(':') {
                match header.trim().parse::<ItemId>() {
                    Ok(item_id) => {
                        self.current_item = Some(item_id);
                        continue;
                    }
                    Err(_) => return self.fail(format!("invalid item header '{}'", line)),
                }
            }

            let Some(item_id) = self.current_item else {
                return self.fail("rating line before any item header");
            };

            return match parse_data_line(line) {
                Ok((user_id, value, date)) => Some(Ok(Rating {
                    user_id,
                    item_id,
                    value,
                    date,
                })),
                Err(message) => self.fail(message),
            };
        }
    }
}

fn parse_data_line(line: &str) -> Result<(UserId, f32, NaiveDate), String> {
    let mut fields = line.splitn(3, ',');
    let (Some(user), Some(value), Some(date)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(format!("expected '<user>,<rating>,<date>', got '{}'", line));
    };

    let user_id = user
        .trim()
        .parse::<UserId>()
        .map_err(|_| format!("invalid user id '{}'", user))?;
    let value = value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid rating '{}'", value))?;
    let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| format!("invalid rating date '{}'", date))?;

    Ok((user_id, value, date))
}

/// Parses a whole block-format input into rating observations
pub fn parse_rating_blocks<R: BufRead>(origin: &str, reader: R) -> AppResult<Vec<Rating>> {
    RatingBlocks::new(origin, reader).collect()
}

/// Sparse user×item rating matrix in compressed-column form
///
/// Columns are items in ascending id order, rows are users in ascending id
/// order. Only observed ratings are stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRatingMatrix {
    item_ids: Vec<ItemId>,
    user_ids: Vec<UserId>,
    col_ptr: Vec<usize>,
    row_idx: Vec<u32>,
    values: Vec<f32>,
}

impl SparseRatingMatrix {
    pub fn n_items(&self) -> usize {
        self.item_ids.len()
    }

    pub fn n_users(&self) -> usize {
        self.user_ids.len()
    }

    /// Number of stored ratings
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn item_index(&self, item_id: ItemId) -> Option<usize> {
        self.item_ids.binary_search(&item_id).ok()
    }

    /// Row indices and values of one item column
    pub fn column(&self, col: usize) -> (&[u32], &[f32]) {
        let range = self.col_ptr[col]..self.col_ptr[col + 1];
        (&self.row_idx[range.clone()], &self.values[range])
    }

    /// Looks up a single observed rating
    pub fn get(&self, user_id: UserId, item_id: ItemId) -> Option<f32> {
        let col = self.item_index(item_id)?;
        let row = self.user_ids.binary_search(&user_id).ok()? as u32;
        let (rows, values) = self.column(col);
        rows.binary_search(&row).ok().map(|pos| values[pos])
    }
}

/// Accumulates rating observations from one or more sources into a matrix
#[derive(Debug)]
pub struct RatingMatrixBuilder {
    policy: DuplicatePolicy,
    observations: Vec<(ItemId, UserId, f32)>,
}

impl RatingMatrixBuilder {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            observations: Vec::new(),
        }
    }

    pub fn push(&mut self, rating: Rating) {
        self.observations
            .push((rating.item_id, rating.user_id, rating.value));
    }

    /// Reads a block-format source, returning the number of ratings read
    ///
    /// A parse error aborts the whole build; callers should drop the builder.
    pub fn read_blocks<R: BufRead>(&mut self, origin: &str, reader: R) -> AppResult<usize> {
        let before = self.observations.len();
        for rating in RatingBlocks::new(origin, reader) {
            self.push(rating?);
        }
        let read = self.observations.len() - before;
        tracing::info!(origin = %origin, ratings = read, "Parsed rating blocks");
        Ok(read)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn build(self) -> AppResult<SparseRatingMatrix> {
        let mut observations = self.observations;

        // Stable: equal (item, user) keys keep insertion order, so the last one is the latest.
        observations.sort_by_key(|&(item, user, _)| (item, user));

        let mut deduped: Vec<(ItemId, UserId, f32)> = Vec::with_capacity(observations.len());
        let mut duplicates = 0usize;
        for obs in observations {
            match deduped.last_mut() {
                Some(last) if last.0 == obs.0 && last.1 == obs.1 => {
                    if self.policy == DuplicatePolicy::Reject {
                        return Err(AppError::DuplicateRating {
                            user_id: obs.1,
                            item_id: obs.0,
                        });
                    }
                    duplicates += 1;
                    last.2 = obs.2;
                }
                _ => deduped.push(obs),
            }
        }

        if duplicates > 0 {
            tracing::warn!(duplicates, "Overwrote duplicate ratings");
        }

        let mut user_ids: Vec<UserId> = deduped.iter().map(|&(_, user, _)| user).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut item_ids = Vec::new();
        let mut col_ptr = vec![0];
        let mut row_idx = Vec::with_capacity(deduped.len());
        let mut values = Vec::with_capacity(deduped.len());

        for (item, user, value) in deduped {
            if item_ids.last() != Some(&item) {
                if !item_ids.is_empty() {
                    col_ptr.push(row_idx.len());
                }
                item_ids.push(item);
            }
            // Every user was collected above
            let row = user_ids.binary_search(&user).unwrap_or_default() as u32;
            row_idx.push(row);
            values.push(value);
        }
        if !item_ids.is_empty() {
            col_ptr.push(row_idx.len());
        }

        tracing::info!(
            items = item_ids.len(),
            users = user_ids.len(),
            ratings = values.len(),
            "Built sparse rating matrix"
        );

        Ok(SparseRatingMatrix {
            item_ids,
            user_ids,
            col_ptr,
            row_idx,
            values,
        })
    }
}

impl Default for RatingMatrixBuilder {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}
