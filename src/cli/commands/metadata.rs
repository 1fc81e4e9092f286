use super::{finish, FETCH_CONCURRENCY};
use crate::core::error::Result;
use crate::output;
use crate::pypi::{PackageQuery, PypiClient};
use colored::Colorize;
use futures::StreamExt;

pub async fn execute(packages: Vec<String>, description: bool, json: bool) -> Result<()> {
    let queries = packages
        .iter()
        .map(|p| PackageQuery::new(p))
        .collect::<Result<Vec<_>>>()?;

    let client = PypiClient::new()?;
    let total = queries.len();

    let mut fetches = futures::stream::iter(queries.into_iter().map(|query| {
        let client = &client;
        async move {
            let outcome = client.metadata(&query).await;
            (query, outcome)
        }
    }))
    .buffered(FETCH_CONCURRENCY);

    let mut failures = Vec::new();
    while let Some((_query, outcome)) = fetches.next().await {
        match outcome {
            Ok(meta) => {
                println!("{}", output::render_metadata(&meta, description, json));
            }
            Err(e) => {
                if total > 1 {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                }
                failures.push(e);
            }
        }
    }

    finish(total, failures)
}
