//! # Recommend Search
//!
//! Scoring and ranking of recommendation candidates.
//!
//! - [`score`] turns an [`recommend_indexer::ActivityIndex`] into scored records
//! - [`sort`] orders any [`Sortable`] collection by a [`Selector`] and an [`Ordering`]
//! - [`settings`] carries the per-task weights and output size

mod error;
mod records;
pub mod score;
pub mod settings;
pub mod sort;
mod value;

pub use error::{RankError, Result};
pub use score::{
    project_activity, score_projects, score_users, user_activity, ActivityCounts,
    EntityActivity, ScoreWeights,
};
pub use settings::{TaskOverrides, TaskSettings, DEFAULT_MAX_OUTPUT_COUNT};
pub use sort::{compare_floats, rank_top_k, top_k, Ordering, Selector, Sorter, Step};
pub use value::{Record, Sortable, Value, ValueKind};
