pub mod imdb;
pub mod ratings;
pub mod titles;

pub use imdb::load_imdb_catalog;
pub use ratings::{
    parse_rating_blocks, DuplicatePolicy, RatingBlocks, RatingMatrixBuilder, SparseRatingMatrix,
};
pub use titles::parse_title_table;
