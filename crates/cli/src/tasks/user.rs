use super::{create_output, emit, ingest_auxiliary, validate_inputs, StageTracker};
use crate::registry::DataTask;
use crate::report::RunReport;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use recommend_indexer::{
    ingest_profile_file, ActivityIndex, ActivitySource, EntityKind, PrimaryPipeline,
};
use recommend_search::{rank_top_k, score_users, TaskSettings};
use std::path::{Path, PathBuf};

const NAME: &str = "UserRecommend";
const INPUT_ROLES: &[&str] = &["user", "user profile", "idea", "comment", "user relation"];

/// "Users to follow": ranks users by their own ideas and comments plus the follows they get.
#[derive(Debug, Clone)]
pub struct UserRecommendTask {
    settings: TaskSettings,
    workers: usize,
}

impl UserRecommendTask {
    pub fn new(settings: TaskSettings, workers: usize) -> Self {
        Self { settings, workers }
    }
}

#[async_trait]
impl DataTask for UserRecommendTask {
    fn name(&self) -> &'static str {
        NAME
    }

    fn input_roles(&self) -> &'static [&'static str] {
        INPUT_ROLES
    }

    async fn run(&self, inputs: &[PathBuf], output: &Path, arg: Option<&str>) -> Result<RunReport> {
        let mut stages = StageTracker::start(NAME);
        if let Some(arg) = arg {
            log::debug!("{NAME}: argument {arg:?}");
        }
        validate_inputs(NAME, INPUT_ROLES, inputs, output)?;
        let (users, profiles, ideas, comments, relations) =
            (&inputs[0], &inputs[1], &inputs[2], &inputs[3], &inputs[4]);

        stages.advance();
        let mut index = ActivityIndex::new();
        let mut auxiliary = ingest_profile_file(&mut index, profiles)
            .await
            .with_context(|| format!("Failed to ingest {}", profiles.display()))?;
        let activity = ingest_auxiliary(
            &mut index,
            &[
                (ideas.as_path(), ActivitySource::UserIdeas),
                (comments.as_path(), ActivitySource::UserComments),
                (relations.as_path(), ActivitySource::UserRelations),
            ],
        )
        .await?;
        auxiliary.merge(&activity);
        let file = create_output(output)?;

        stages.advance();
        let pipeline = PrimaryPipeline::new(EntityKind::User, self.workers);
        let (merged, primary) = pipeline
            .run(users, index.take_profiles())
            .await
            .with_context(|| format!("Failed to ingest {}", users.display()))?;

        stages.advance();
        index.restore_profiles(merged);
        log::debug!(
            "{NAME}: {} workers done, {} profiles",
            primary.workers,
            index.profiles().len()
        );

        stages.advance();
        let scored = score_users(&index, &self.settings.weights, Utc::now());
        let candidates = scored.len();

        stages.advance();
        let ranked = rank_top_k(scored, "score", self.settings.max_output_count)?;

        stages.advance();
        let emitted = emit(file, output, &ranked)?;

        stages.advance();
        Ok(RunReport {
            task: NAME.to_string(),
            auxiliary,
            primary,
            candidates,
            emitted,
            output: output.to_path_buf(),
            time_ms: stages.elapsed_ms(),
        })
    }
}
