//! # Recommend Indexer
//!
//! Turns tab-delimited activity logs into an in-memory [`ActivityIndex`].
//!
//! ## Pipeline
//!
//! ```text
//! Auxiliary files (sequential)
//!     │
//!     ├──> Record Parser (drops malformed lines)
//!     │      └─> Activity events / profile lines
//!     │
//!     └──> Activity Index (append-only fold)
//!
//! Primary file (concurrent)
//!     │
//!     ├──> Producer ──bounded queue──> Workers (N)
//!     │                                  └─> Profile upserts under one lock
//!     │
//!     └──> Completion awaiter ──> Reducer (IngestStats)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use recommend_indexer::{
//!     ingest_activity_file, ActivityIndex, ActivitySource, EntityKind, PrimaryPipeline,
//! };
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> recommend_indexer::Result<()> {
//!     let mut index = ActivityIndex::new();
//!     ingest_activity_file(&mut index, Path::new("ideas.tsv"), ActivitySource::ProjectIdeas).await?;
//!
//!     let pipeline = PrimaryPipeline::new(EntityKind::Project, 4);
//!     let (profiles, stats) = pipeline.run(Path::new("projects.tsv"), index.take_profiles()).await?;
//!     index.restore_profiles(profiles);
//!
//!     println!("Indexed {} projects from {} lines", index.profiles().len(), stats.lines_read);
//!     Ok(())
//! }
//! ```

mod error;
mod index;
mod ingest;
mod limits;
mod lines;
mod parse;
mod pipeline;
mod stats;

pub use error::{IndexerError, Result};
pub use index::{
    upsert_entity, ActivityIndex, ActivityKind, ActorHistory, Profile, ProfileMap, SubjectHistory,
};
pub use ingest::{ingest_activity_file, ingest_profile_file, ActivitySource, FoldTarget};
pub use limits::{
    clamp_workers, parse_workers, resolve_workers, workers_from_env, DEFAULT_WORKERS,
    MAX_WORKERS, WORKERS_ENV,
};
pub use lines::{open_lines, LineStream};
pub use parse::{
    normalize_line, parse_comment_line, parse_date_time, parse_idea_line, parse_profile_line,
    parse_project_line, parse_project_relation_line, parse_user_line, parse_user_relation_line,
    zero_instant, ActivityEvent, EntityKind, EntityLine, ProfileLine, Timestamp,
    DATE_TIME_FORMAT, FIELD_DELIMITER,
};
pub use pipeline::PrimaryPipeline;
pub use stats::IngestStats;
