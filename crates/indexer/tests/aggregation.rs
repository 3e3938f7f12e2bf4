use recommend_indexer::{
    ingest_activity_file, ingest_profile_file, ActivityIndex, ActivityKind, ActivitySource,
    EntityKind, PrimaryPipeline,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, name: &str, body: &str) -> PathBuf {
    let path = root.join(name);
    std::fs::write(&path, body).expect("write fixture");
    path
}

#[tokio::test]
async fn user_sources_build_a_complete_index() {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();

    let profiles = write(root, "profiles.tsv", "1\t1\tRust Fan\t2023-01-01 00:00:00\n");
    let ideas = write(
        root,
        "ideas.tsv",
        "1\t100\t1\t2023-01-01 00:00:00\n2\t100\t1\t2023-01-02 00:00:00\n3\t100\t2\tgarbage\n",
    );
    let comments = write(
        root,
        "comments.tsv",
        "1\t100\t2\t9\tidea\t2023-01-01 00:00:00\nshort\tline\n",
    );
    let relations = write(
        root,
        "relations.tsv",
        "1\t2\t1\t2023-01-01 00:00:00\n2\t3\t1\t2023-01-01 00:00:00\n",
    );
    let users = write(
        root,
        "users.tsv",
        "1\tAlice\t2023-01-01 00:00:00\t2022-01-01 00:00:00\n\
         2\tBob\t2023-01-01 00:00:00\t2022-01-01 00:00:00\n\
         3\tCarol\t2023-01-01 00:00:00\t2022-01-01 00:00:00",
    );

    let mut index = ActivityIndex::new();
    ingest_profile_file(&mut index, &profiles).await.expect("profiles");
    ingest_activity_file(&mut index, &ideas, ActivitySource::UserIdeas)
        .await
        .expect("ideas");
    ingest_activity_file(&mut index, &comments, ActivitySource::UserComments)
        .await
        .expect("comments");
    ingest_activity_file(&mut index, &relations, ActivitySource::UserRelations)
        .await
        .expect("relations");

    let (profiles, stats) = PrimaryPipeline::new(EntityKind::User, 2)
        .run(&users, index.take_profiles())
        .await
        .expect("primary");
    index.restore_profiles(profiles);

    assert_eq!(stats.accepted, 3);
    assert_eq!(index.profiles().len(), 3);
    assert_eq!(index.profile(1).unwrap().description, "rust fan");
    assert_eq!(index.profile(3).unwrap().name, "carol");

    // The garbled date still counts; it just lands at the zero instant.
    assert_eq!(index.actor_history(ActivityKind::Idea, 1).unwrap().len(), 2);
    assert_eq!(index.actor_history(ActivityKind::Idea, 2).unwrap().len(), 1);
    assert_eq!(index.actor_history(ActivityKind::Comment, 2).unwrap().len(), 1);

    let followers = index.subject_history(ActivityKind::Relation, 1).unwrap();
    assert_eq!(followers.len(), 2);
    assert_eq!(index.event_count(ActivityKind::Relation), 2);
}

#[tokio::test]
async fn n_identical_lines_record_n_timestamps() {
    let temp = TempDir::new().expect("tempdir");
    let body = "1\t7\t8\tjoin\t2023-03-03 03:03:03\n".repeat(17);
    let relations = write(temp.path(), "relations.tsv", &body);

    let mut index = ActivityIndex::new();
    let stats = ingest_activity_file(&mut index, &relations, ActivitySource::ProjectRelations)
        .await
        .expect("relations");

    assert_eq!(stats.accepted, 17);
    let history = index.subject_history(ActivityKind::Relation, 7).unwrap();
    assert_eq!(history[&8].len(), 17);
}

#[tokio::test]
async fn worker_count_does_not_change_profile_count() {
    let temp = TempDir::new().expect("tempdir");
    let mut body = String::new();
    for id in 0..1_000 {
        body.push_str(&format!("{id}\tproject {id}\t{}\t2023-01-01 00:00:00\n", id % 13));
    }
    let projects = write(temp.path(), "projects.tsv", &body);

    let mut counts = Vec::new();
    for workers in [1, 2, 8] {
        let (profiles, _) = PrimaryPipeline::new(EntityKind::Project, workers)
            .run(&projects, Default::default())
            .await
            .expect("primary");
        counts.push(profiles.len());
    }
    assert_eq!(counts, vec![1_000, 1_000, 1_000]);
}
