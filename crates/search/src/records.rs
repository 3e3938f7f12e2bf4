use crate::value::{Record, Sortable, Value};
use recommend_protocol::{ProjectRecommendation, UserRecommendation};

impl Record for UserRecommendation {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "id" => Some(self.id.sort_value()),
            "name" => Some(self.name.sort_value()),
            "description" => Some(self.description.sort_value()),
            "score" => Some(self.score.sort_value()),
            _ => None,
        }
    }

    fn field_at(&self, index: usize) -> Option<Value<'_>> {
        match index {
            0 => Some(self.id.sort_value()),
            1 => Some(self.name.sort_value()),
            2 => Some(self.description.sort_value()),
            3 => Some(self.score.sort_value()),
            _ => None,
        }
    }
}

impl Sortable for UserRecommendation {
    fn sort_value(&self) -> Value<'_> {
        Value::Record(self)
    }
}

impl Record for ProjectRecommendation {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "id" => Some(self.id.sort_value()),
            "title" => Some(self.title.sort_value()),
            "score" => Some(self.score.sort_value()),
            _ => None,
        }
    }

    fn field_at(&self, index: usize) -> Option<Value<'_>> {
        match index {
            0 => Some(self.id.sort_value()),
            1 => Some(self.title.sort_value()),
            2 => Some(self.score.sort_value()),
            _ => None,
        }
    }
}

impl Sortable for ProjectRecommendation {
    fn sort_value(&self) -> Value<'_> {
        Value::Record(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::sort::{ci_asc_by_field, rank_top_k, sort, Ordering, Selector};
    use pretty_assertions::assert_eq;
    use recommend_protocol::{ProjectRecommendation, UserRecommendation};

    fn user(id: i64, name: &str, score: f64) -> UserRecommendation {
        UserRecommendation {
            id,
            name: name.to_string(),
            description: String::new(),
            score,
        }
    }

    #[test]
    fn users_rank_by_score_and_truncate() {
        let users = vec![
            user(1, "a", 0.5),
            user(2, "b", 3.0),
            user(3, "c", 1.5),
            user(4, "d", 3.0),
        ];
        let ranked = rank_top_k(users, "score", 3).unwrap();
        let ids: Vec<i64> = ranked.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 4, 3]);
    }

    #[test]
    fn users_sort_by_name_case_insensitively() {
        let mut users = vec![user(1, "Zed", 0.0), user(2, "amy", 0.0), user(3, "Bob", 0.0)];
        ci_asc_by_field(&mut users, "name").unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["amy", "Bob", "Zed"]);
    }

    #[test]
    fn projects_expose_positional_fields() {
        let mut projects = vec![
            ProjectRecommendation {
                id: 1,
                title: "b".into(),
                score: 1.0,
            },
            ProjectRecommendation {
                id: 2,
                title: "a".into(),
                score: 2.0,
            },
        ];
        sort(&mut projects, Selector::field_path([1]), Ordering::Ascending).unwrap();
        assert_eq!(projects[0].id, 2);
        assert!(rank_top_k(projects, "description", 1).is_err());
    }
}
