//! Time-windowed activity scoring.
//!
//! ```text
//! score = basic_weight  * (lifetime ideas + comments + relations)
//!       + action_weight * (recent   ideas + comments + relations)
//! ```
//!
//! An event is recent when its timestamp is at or after `now - window_days`.

use chrono::{DateTime, Duration, Utc};
use recommend_indexer::{zero_instant, ActivityIndex, ActivityKind, Profile, Timestamp};
use recommend_protocol::{EntityId, ProjectRecommendation, UserRecommendation};
use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_BASIC_WEIGHT: f64 = 0.4;
pub const DEFAULT_USER_ACTION_WEIGHT: f64 = 0.6;
pub const DEFAULT_USER_WINDOW_DAYS: i64 = 30;

pub const DEFAULT_PROJECT_BASIC_WEIGHT: f64 = 0.3;
pub const DEFAULT_PROJECT_ACTION_WEIGHT: f64 = 0.7;
pub const DEFAULT_PROJECT_WINDOW_DAYS: i64 = 7;

/// Weights and window of one task type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub basic_weight: f64,
    pub action_weight: f64,
    pub window_days: i64,
}

impl ScoreWeights {
    pub const fn user_defaults() -> Self {
        Self {
            basic_weight: DEFAULT_USER_BASIC_WEIGHT,
            action_weight: DEFAULT_USER_ACTION_WEIGHT,
            window_days: DEFAULT_USER_WINDOW_DAYS,
        }
    }

    pub const fn project_defaults() -> Self {
        Self {
            basic_weight: DEFAULT_PROJECT_BASIC_WEIGHT,
            action_weight: DEFAULT_PROJECT_ACTION_WEIGHT,
            window_days: DEFAULT_PROJECT_WINDOW_DAYS,
        }
    }

    /// Earliest instant that still counts as recent.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Timestamp {
        Duration::try_days(self.window_days)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or_else(zero_instant)
    }

    pub fn score(&self, activity: &EntityActivity) -> f64 {
        self.basic_weight * activity.lifetime_total() as f64
            + self.action_weight * activity.recent_total() as f64
    }
}

/// Lifetime and recent-window counts of one activity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityCounts {
    pub lifetime: usize,
    pub recent: usize,
}

impl ActivityCounts {
    pub fn from_timestamps<'a>(
        timestamps: impl IntoIterator<Item = &'a Timestamp>,
        cutoff: Timestamp,
    ) -> Self {
        let mut counts = Self::default();
        for at in timestamps {
            counts.lifetime += 1;
            if *at >= cutoff {
                counts.recent += 1;
            }
        }
        counts
    }
}

/// Per-kind counts of one candidate entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityActivity {
    pub ideas: ActivityCounts,
    pub comments: ActivityCounts,
    pub relations: ActivityCounts,
}

impl EntityActivity {
    pub fn lifetime_total(&self) -> usize {
        self.ideas.lifetime + self.comments.lifetime + self.relations.lifetime
    }

    pub fn recent_total(&self) -> usize {
        self.ideas.recent + self.comments.recent + self.relations.recent
    }
}

fn subject_counts(
    index: &ActivityIndex,
    kind: ActivityKind,
    subject: EntityId,
    cutoff: Timestamp,
) -> ActivityCounts {
    index
        .subject_history(kind, subject)
        .map(|actors| ActivityCounts::from_timestamps(actors.values().flatten(), cutoff))
        .unwrap_or_default()
}

fn actor_counts(
    index: &ActivityIndex,
    kind: ActivityKind,
    actor: EntityId,
    cutoff: Timestamp,
) -> ActivityCounts {
    index
        .actor_history(kind, actor)
        .map(|timestamps| ActivityCounts::from_timestamps(timestamps, cutoff))
        .unwrap_or_default()
}

/// Profiles in ascending id order, so equal scores keep a stable order downstream.
fn candidates(index: &ActivityIndex) -> Vec<&Profile> {
    let mut profiles: Vec<&Profile> = index.profiles().values().collect();
    profiles.sort_by_key(|profile| profile.id);
    profiles
}

/// Activity of a user: their own ideas and comments, plus the follows they received.
pub fn user_activity(index: &ActivityIndex, user: EntityId, cutoff: Timestamp) -> EntityActivity {
    EntityActivity {
        ideas: actor_counts(index, ActivityKind::Idea, user, cutoff),
        comments: actor_counts(index, ActivityKind::Comment, user, cutoff),
        relations: subject_counts(index, ActivityKind::Relation, user, cutoff),
    }
}

/// Activity of a project: ideas, comments and follow/join rows made against it.
pub fn project_activity(
    index: &ActivityIndex,
    project: EntityId,
    cutoff: Timestamp,
) -> EntityActivity {
    EntityActivity {
        ideas: subject_counts(index, ActivityKind::Idea, project, cutoff),
        comments: subject_counts(index, ActivityKind::Comment, project, cutoff),
        relations: subject_counts(index, ActivityKind::Relation, project, cutoff),
    }
}

/// Score every user that has a profile entry.
pub fn score_users(
    index: &ActivityIndex,
    weights: &ScoreWeights,
    now: DateTime<Utc>,
) -> Vec<UserRecommendation> {
    let cutoff = weights.cutoff(now);
    candidates(index)
        .into_iter()
        .map(|profile| {
            let activity = user_activity(index, profile.id, cutoff);
            UserRecommendation {
                id: profile.id,
                name: profile.name.clone(),
                description: profile.description.clone(),
                score: weights.score(&activity),
            }
        })
        .collect()
}

/// Score every project that has a profile entry.
pub fn score_projects(
    index: &ActivityIndex,
    weights: &ScoreWeights,
    now: DateTime<Utc>,
) -> Vec<ProjectRecommendation> {
    let cutoff = weights.cutoff(now);
    candidates(index)
        .into_iter()
        .map(|profile| {
            let activity = project_activity(index, profile.id, cutoff);
            ProjectRecommendation {
                id: profile.id,
                title: profile.name.clone(),
                score: weights.score(&activity),
            }
        })
        .collect()
}
