use super::{finish, FETCH_CONCURRENCY};
use crate::core::error::Result;
use crate::output;
use crate::pypi::{PackageQuery, PypiClient};
use colored::Colorize;
use futures::StreamExt;

pub async fn execute(
    packages: Vec<String>,
    latest: bool,
    prerelease: bool,
    json: bool,
) -> Result<()> {
    // Validate every name before touching the network.
    let queries = packages
        .iter()
        .map(|p| PackageQuery::new(p))
        .collect::<Result<Vec<_>>>()?;

    let client = PypiClient::new()?;
    let total = queries.len();

    // Bounded pool, results in argument order; one package's failure
    // never cancels the others.
    let mut fetches = futures::stream::iter(queries.into_iter().map(|query| {
        let client = &client;
        async move {
            let outcome = client.resolve(&query).await;
            (query, outcome)
        }
    }))
    .buffered(FETCH_CONCURRENCY);

    let mut failures = Vec::new();
    while let Some((query, outcome)) = fetches.next().await {
        match outcome {
            Ok(mut result) => {
                if !prerelease {
                    let order = client.order();
                    result.versions.retain(|r| !order.is_prerelease(&r.version));
                }
                if latest {
                    println!(
                        "{}",
                        output::render_latest(query.name(), result.versions.first(), json)
                    );
                } else {
                    println!("{}", output::render_versions(&result, json));
                }
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
