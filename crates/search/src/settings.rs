use crate::score::ScoreWeights;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_OUTPUT_COUNT: usize = 100;

/// Everything one recommendation task needs besides its input files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskSettings {
    pub weights: ScoreWeights,
    pub max_output_count: usize,
}

impl TaskSettings {
    pub const fn user_defaults() -> Self {
        Self {
            weights: ScoreWeights::user_defaults(),
            max_output_count: DEFAULT_MAX_OUTPUT_COUNT,
        }
    }

    pub const fn project_defaults() -> Self {
        Self {
            weights: ScoreWeights::project_defaults(),
            max_output_count: DEFAULT_MAX_OUTPUT_COUNT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let ScoreWeights {
            basic_weight,
            action_weight,
            window_days,
        } = self.weights;
        if !basic_weight.is_finite() {
            return Err(anyhow!("basic_weight must be finite, got {basic_weight}"));
        }
        if !action_weight.is_finite() {
            return Err(anyhow!("action_weight must be finite, got {action_weight}"));
        }
        if window_days < 0 {
            return Err(anyhow!("window_days must be >= 0, got {window_days}"));
        }
        Ok(())
    }
}

/// Partial task settings as written in a config file. Missing keys keep the task defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskOverrides {
    pub basic_weight: Option<f64>,
    pub action_weight: Option<f64>,
    pub window_days: Option<i64>,
    pub max_output_count: Option<usize>,
}

impl TaskOverrides {
    pub fn apply(&self, base: TaskSettings) -> Result<TaskSettings> {
        let settings = TaskSettings {
            weights: ScoreWeights {
                basic_weight: self.basic_weight.unwrap_or(base.weights.basic_weight),
                action_weight: self.action_weight.unwrap_or(base.weights.action_weight),
                window_days: self.window_days.unwrap_or(base.weights.window_days),
            },
            max_output_count: self.max_output_count.unwrap_or(base.max_output_count),
        };
        settings.validate()?;
        Ok(settings)
    }
}
