use super::{create_output, emit, ingest_auxiliary, validate_inputs, StageTracker};
use crate::registry::DataTask;
use crate::report::RunReport;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use recommend_indexer::{ActivityIndex, ActivitySource, EntityKind, PrimaryPipeline};
use recommend_search::{rank_top_k, score_projects, TaskSettings};
use std::path::{Path, PathBuf};

const NAME: &str = "ProjectRecommend";
const INPUT_ROLES: &[&str] = &["project", "idea", "comment", "project relation"];

/// "Projects to join": ranks projects by the ideas, comments and follows/joins they receive.
#[derive(Debug, Clone)]
pub struct ProjectRecommendTask {
    settings: TaskSettings,
    workers: usize,
}

impl ProjectRecommendTask {
    pub fn new(settings: TaskSettings, workers: usize) -> Self {
        Self { settings, workers }
    }
}

#[async_trait]
impl DataTask for ProjectRecommendTask {
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
        let (projects, ideas, comments, relations) =
            (&inputs[0], &inputs[1], &inputs[2], &inputs[3]);

        stages.advance();
        let mut index = ActivityIndex::new();
        let auxiliary = ingest_auxiliary(
            &mut index,
            &[
                (ideas.as_path(), ActivitySource::ProjectIdeas),
                (comments.as_path(), ActivitySource::ProjectComments),
                (relations.as_path(), ActivitySource::ProjectRelations),
            ],
        )
        .await?;
        let file = create_output(output)?;

        stages.advance();
        let pipeline = PrimaryPipeline::new(EntityKind::Project, self.workers);
        let (profiles, primary) = pipeline
            .run(projects, index.take_profiles())
            .await
            .with_context(|| format!("Failed to ingest {}", projects.display()))?;

        stages.advance();
        index.restore_profiles(profiles);
        log::debug!(
            "{NAME}: {} workers done, {} projects",
            primary.workers,
            index.profiles().len()
        );

        stages.advance();
        let scored = score_projects(&index, &self.settings.weights, Utc::now());
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
