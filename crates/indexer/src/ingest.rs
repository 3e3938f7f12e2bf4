//! Sequential folding of auxiliary source files into the [`ActivityIndex`].
//!
//! Only failing to open or read a file is an error. Lines that do not parse are counted as
//! skipped and otherwise ignored.

use crate::error::Result;
use crate::index::{ActivityIndex, ActivityKind};
use crate::lines::open_lines;
use crate::parse::{
    parse_comment_line, parse_idea_line, parse_profile_line, parse_project_relation_line,
    parse_user_relation_line, ActivityEvent,
};
use crate::stats::IngestStats;
use std::path::Path;
use std::time::Instant;

/// Where events of an activity file are folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldTarget {
    /// subject -> actor -> timestamps
    BySubject,
    /// actor -> timestamps
    ByActor,
}

/// Role of an auxiliary activity file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySource {
    /// Ideas, credited to the project they were submitted to
    ProjectIdeas,
    /// Comments, credited to the project they were made on
    ProjectComments,
    /// Follow/join rows, credited to the project
    ProjectRelations,
    /// Ideas, credited to their author
    UserIdeas,
    /// Comments, credited to their author
    UserComments,
    /// Follow rows, credited to the followed user
    UserRelations,
}

impl ActivitySource {
    pub fn kind(self) -> ActivityKind {
        match self {
            Self::ProjectIdeas | Self::UserIdeas => ActivityKind::Idea,
            Self::ProjectComments | Self::UserComments => ActivityKind::Comment,
            Self::ProjectRelations | Self::UserRelations => ActivityKind::Relation,
        }
    }

    pub fn target(self) -> FoldTarget {
        match self {
            Self::UserIdeas | Self::UserComments => FoldTarget::ByActor,
            _ => FoldTarget::BySubject,
        }
    }

    pub fn parse_line(self, line: &str) -> Option<ActivityEvent> {
        match self {
            Self::ProjectIdeas | Self::UserIdeas => parse_idea_line(line),
            Self::ProjectComments | Self::UserComments => parse_comment_line(line),
            Self::ProjectRelations => parse_project_relation_line(line),
            Self::UserRelations => parse_user_relation_line(line),
        }
    }

    /// Fold one already-normalized line. Returns whether the line was accepted.
    pub fn fold_line(self, index: &mut ActivityIndex, line: &str) -> bool {
        let Some(event) = self.parse_line(line) else {
            return false;
        };
        match self.target() {
            FoldTarget::BySubject => index.record_relation(self.kind(), &event),
            FoldTarget::ByActor => index.record_actor(self.kind(), &event),
        }
        true
    }
}

/// Fold every line of an activity file into `index`.
pub async fn ingest_activity_file(
    index: &mut ActivityIndex,
    path: &Path,
    source: ActivitySource,
) -> Result<IngestStats> {
    let started = Instant::now();
    let mut stats = IngestStats::new(1);
    let mut lines = open_lines(path).await?;

    while let Some(line) = lines.next_line().await? {
        if source.fold_line(index, &line) {
            stats.add_accepted();
        } else {
            stats.add_skipped();
        }
    }

    stats.finish(started);
    log::debug!(
        "Folded {} ({source:?}): {} accepted, {} skipped",
        path.display(),
        stats.accepted,
        stats.skipped
    );
    Ok(stats)
}

/// Fold the user profile file (descriptions) into `index`.
pub async fn ingest_profile_file(index: &mut ActivityIndex, path: &Path) -> Result<IngestStats> {
    let started = Instant::now();
    let mut stats = IngestStats::new(1);
    let mut lines = open_lines(path).await?;

    while let Some(line) = lines.next_line().await? {
        match parse_profile_line(&line) {
            Some(profile) => {
                index.upsert_description(profile);
                stats.add_accepted();
            }
            None => stats.add_skipped(),
        }
    }

    stats.finish(started);
    log::debug!(
        "Folded profiles {}: {} accepted, {} skipped",
        path.display(),
        stats.accepted,
        stats.skipped
    );
    Ok(stats)
}
