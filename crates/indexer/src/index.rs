use crate::parse::{ActivityEvent, EntityLine, ProfileLine, Timestamp};
use recommend_protocol::EntityId;
use serde::Serialize;
use std::collections::HashMap;

/// Kind of activity recorded in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Idea,
    Comment,
    Relation,
}

impl ActivityKind {
    pub const ALL: [Self; 3] = [Self::Idea, Self::Comment, Self::Relation];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Comment => "comment",
            Self::Relation => "relation",
        }
    }
}

/// actor id -> timestamps of that actor's events
pub type ActorHistory = HashMap<EntityId, Vec<Timestamp>>;

/// subject id -> actor id -> timestamps
pub type SubjectHistory = HashMap<EntityId, ActorHistory>;

pub type ProfileMap = HashMap<EntityId, Profile>;

/// Mutable per-entity record assembled from the profile and primary files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub last_active_at: Option<Timestamp>,
    pub owner: Option<EntityId>,
}

impl Profile {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// Insert or update the profile described by a primary entity line.
///
/// Fields not carried by the line (the description) are left untouched.
pub fn upsert_entity(profiles: &mut ProfileMap, line: EntityLine) {
    let profile = profiles
        .entry(line.id)
        .or_insert_with(|| Profile::new(line.id));
    profile.name = line.name;
    profile.last_active_at = Some(line.last_active_at);
    if line.owner.is_some() {
        profile.owner = line.owner;
    }
}

/// In-memory aggregate of every ingested source for one run.
#[derive(Debug, Default)]
pub struct ActivityIndex {
    relation_activity: HashMap<ActivityKind, SubjectHistory>,
    actor_activity: HashMap<ActivityKind, ActorHistory>,
    profiles: ProfileMap,
}

impl ActivityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` under its subject and actor.
    pub fn record_relation(&mut self, kind: ActivityKind, event: &ActivityEvent) {
        self.relation_activity
            .entry(kind)
            .or_default()
            .entry(event.subject)
            .or_default()
            .entry(event.actor)
            .or_default()
            .push(event.at);
    }

    /// Append `event` under its actor only.
    pub fn record_actor(&mut self, kind: ActivityKind, event: &ActivityEvent) {
        self.actor_activity
            .entry(kind)
            .or_default()
            .entry(event.actor)
            .or_default()
            .push(event.at);
    }

    pub fn upsert_description(&mut self, line: ProfileLine) {
        self.profiles
            .entry(line.id)
            .or_insert_with(|| Profile::new(line.id))
            .description = line.description;
    }

    pub fn upsert_entity(&mut self, line: EntityLine) {
        upsert_entity(&mut self.profiles, line);
    }

    pub fn subject_history(&self, kind: ActivityKind, subject: EntityId) -> Option<&ActorHistory> {
        self.relation_activity.get(&kind)?.get(&subject)
    }

    pub fn actor_history(&self, kind: ActivityKind, actor: EntityId) -> Option<&[Timestamp]> {
        self.actor_activity
            .get(&kind)?
            .get(&actor)
            .map(Vec::as_slice)
    }

    pub fn profiles(&self) -> &ProfileMap {
        &self.profiles
    }

    pub fn profile(&self, id: EntityId) -> Option<&Profile> {
        self.profiles.get(&id)
    }

    /// Move the profile mapping out, e.g. to hand it to the concurrent pipeline.
    pub fn take_profiles(&mut self) -> ProfileMap {
        std::mem::take(&mut self.profiles)
    }

    pub fn restore_profiles(&mut self, profiles: ProfileMap) {
        self.profiles = profiles;
    }

    /// Total number of timestamps recorded for `kind`, across both mappings.
    pub fn event_count(&self, kind: ActivityKind) -> usize {
        let by_subject: usize = self
            .relation_activity
            .get(&kind)
            .map(|subjects| {
                subjects
                    .values()
                    .flat_map(HashMap::values)
                    .map(Vec::len)
                    .sum::<usize>()
            })
            .unwrap_or(0);
        let by_actor: usize = self
            .actor_activity
            .get(&kind)
            .map(|actors| actors.values().map(Vec::len).sum::<usize>())
            .unwrap_or(0);
        by_subject + by_actor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_date_time, parse_idea_line};
    use pretty_assertions::assert_eq;

    fn event(subject: EntityId, actor: EntityId) -> ActivityEvent {
        ActivityEvent {
            subject,
            actor,
            at: parse_date_time("2023-01-01 00:00:00"),
        }
    }

    #[test]
    fn repeated_pairs_append_every_time() {
        let mut index = ActivityIndex::new();
        for _ in 0..5 {
            index.record_relation(ActivityKind::Idea, &event(1, 2));
        }
        index.record_relation(ActivityKind::Idea, &event(1, 3));

        let history = index.subject_history(ActivityKind::Idea, 1).unwrap();
        assert_eq!(history[&2].len(), 5);
        assert_eq!(history[&3].len(), 1);
        assert_eq!(index.event_count(ActivityKind::Idea), 6);
        assert_eq!(index.event_count(ActivityKind::Comment), 0);
    }

    #[test]
    fn actor_history_is_keyed_by_actor() {
        let mut index = ActivityIndex::new();
        index.record_actor(ActivityKind::Comment, &event(10, 7));
        index.record_actor(ActivityKind::Comment, &event(11, 7));

        assert_eq!(index.actor_history(ActivityKind::Comment, 7).unwrap().len(), 2);
        assert!(index.actor_history(ActivityKind::Comment, 10).is_none());
        assert!(index.actor_history(ActivityKind::Idea, 7).is_none());
    }

    #[test]
    fn malformed_line_never_reaches_the_index() {
        let mut index = ActivityIndex::new();
        for line in ["1\t2\t3", "1\tx\t3\t2023-01-01 00:00:00", "1\t\t3\tdate"] {
            if let Some(event) = parse_idea_line(line) {
                index.record_relation(ActivityKind::Idea, &event);
            }
        }
        assert_eq!(index.event_count(ActivityKind::Idea), 0);
        assert!(index.subject_history(ActivityKind::Idea, 1).is_none());
    }

    #[test]
    fn entity_upsert_keeps_existing_description() {
        let mut index = ActivityIndex::new();
        index.upsert_description(ProfileLine {
            id: 4,
            description: "maker".to_string(),
        });
        index.upsert_entity(EntityLine {
            id: 4,
            name: "dana".to_string(),
            owner: None,
            last_active_at: parse_date_time("2023-02-02 00:00:00"),
        });

        let profile = index.profile(4).unwrap();
        assert_eq!(profile.name, "dana");
        assert_eq!(profile.description, "maker");
        assert!(profile.last_active_at.is_some());
    }

    #[test]
    fn take_and_restore_profiles_round_trips_ownership() {
        let mut index = ActivityIndex::new();
        index.upsert_description(ProfileLine {
            id: 1,
            description: "a".to_string(),
        });
        let profiles = index.take_profiles();
        assert!(index.profiles().is_empty());
        index.restore_profiles(profiles);
        assert_eq!(index.profiles().len(), 1);
    }
}
