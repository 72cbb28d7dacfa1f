pub mod discovery;
pub mod pipeline;
pub mod recommendations;

pub use discovery::filter_and_rank;
pub use recommendations::{match_percent, recommend};
