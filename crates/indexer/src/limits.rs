pub const DEFAULT_WORKERS: usize = 1;
pub const MAX_WORKERS: usize = 64;
pub const WORKERS_ENV: &str = "RECOMMEND_WORKERS";

pub fn clamp_workers(value: usize) -> usize {
    value.clamp(1, MAX_WORKERS)
}

pub fn parse_workers(raw: Option<&str>, default_value: usize) -> usize {
    clamp_workers(
        raw.map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(default_value),
    )
}

pub fn workers_from_env() -> usize {
    let raw = std::env::var(WORKERS_ENV).ok();
    parse_workers(raw.as_deref(), DEFAULT_WORKERS)
}

/// Worker count for the primary pipeline: an explicit value wins over the environment.
pub fn resolve_workers(explicit: Option<usize>) -> usize {
    explicit.map_or_else(workers_from_env, clamp_workers)
}
