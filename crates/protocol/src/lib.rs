use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod ndjson;

pub use ndjson::{write_ndjson, EmitReport};

/// Identity of a user or project as found in the source logs.
pub type EntityId = i64;

/// One "user to follow" recommendation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserRecommendation {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub score: f64,
}

impl fmt::Display for UserRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[UserRecommendation](id={} name={:?} score={:.3})",
            self.id, self.name, self.score
        )
    }
}

/// One "project to join" recommendation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProjectRecommendation {
    pub id: EntityId,
    pub title: String,
    pub score: f64,
}

impl fmt::Display for ProjectRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ProjectRecommendation](id={} title={:?} score={:.3})",
            self.id, self.title, self.score
        )
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn user_recommendation_matches_public_shape() {
        let rec = UserRecommendation {
            id: 7,
            name: "alice".to_string(),
            description: "rustacean".to_string(),
            score: 1.5,
        };
        let raw = serialize_json(&rec).unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["id"], 7);
        assert_eq!(parsed["name"], "alice");
        assert_eq!(parsed["description"], "rustacean");
        assert_eq!(parsed["score"], 1.5);
        assert_eq!(parsed.as_object().unwrap().len(), 4);
    }

    #[test]
    fn project_recommendation_has_title_and_no_description() {
        let rec = ProjectRecommendation {
            id: 3,
            title: "rocket".to_string(),
            score: 0.0,
        };
        let parsed: Value = serde_json::from_str(&serialize_json(&rec).unwrap()).unwrap();
        assert_eq!(parsed["title"], "rocket");
        assert!(parsed.get("description").is_none());
        assert_eq!(parsed["score"], 0.0);
    }
}
