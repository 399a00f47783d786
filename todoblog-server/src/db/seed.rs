//! Sample data for a fresh to-do table

use tracing::{debug, info};

use super::error::DbError;
use super::repos::TodoRepo;
use crate::models::NewTodo;

const SAMPLE_TODOS: [(&str, &str, bool); 2] = [
    ("Sample Task 1", "This is a sample description.", false),
    ("Sample Task 2", "This is another sample description.", true),
];

/// Insert the sample to-dos when the table is empty.
///
/// Returns the number of rows inserted; zero when any row already exists.
pub async fn seed_todos_if_empty(repo: &TodoRepo<'_>) -> Result<usize, DbError> {
    seed_if_empty(repo, &SAMPLE_TODOS).await
}

/// Every sample is validated before the first insert, so a bad row leaves
/// the table untouched.
async fn seed_if_empty(
    repo: &TodoRepo<'_>,
    samples: &[(&str, &str, bool)],
) -> Result<usize, DbError> {
    if repo.count().await? > 0 {
        debug!("todo_items not empty, skipping seed");
        return Ok(0);
    }

    let rows = samples
        .iter()
        .map(|(task, description, done)| {
            NewTodo::parse(task, description, *done).map_err(|errors| DbError::InvalidSeed {
                task: (*task).to_owned(),
                reason: errors.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    for todo in &rows {
        repo.create(todo).await?;
    }

    info!(rows = rows.len(), "seeded sample to-dos");
    Ok(rows.len())
}
