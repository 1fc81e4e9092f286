use super::finish;
use crate::core::error::Result;
use crate::output;
use crate::pypi::version::parse_lenient;
use crate::pypi::{DependencyReport, PackageQuery, PypiClient};
use colored::Colorize;
use tracing::info;

/// Arguments are interleaved `<package> [version]` pairs; a missing or
/// `latest` version resolves against the index first.
pub async fn execute(args: Vec<String>, json: bool) -> Result<()> {
    let pairs = parse_pairs(&args)?;
    let client = PypiClient::new()?;
    let total = pairs.len();

    // Sequential on purpose: a `latest` pair costs two index calls and
    // the pair list is usually short.
    let mut failures = Vec::new();
    for (query, version) in pairs {
        match resolve_deps(&client, &query, version.as_deref()).await {
            Ok(report) => println!("{}", output::render_deps(&report, json)),
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

async fn resolve_deps(
    client: &PypiClient,
    query: &PackageQuery,
    version: Option<&str>,
) -> Result<DependencyReport> {
    let version = match version {
        Some(v) if !v.eq_ignore_ascii_case("latest") => v.to_string(),
        _ => {
            let latest = client.latest_version(query).await?;
            info!("resolved '{}' latest to {}", query.name(), latest);
            latest
        }
    };
    client.dependencies(query, &version).await
}

fn parse_pairs(args: &[String]) -> Result<Vec<(PackageQuery, Option<String>)>> {
    let mut pairs = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let query = PackageQuery::new(&args[i])?;
        i += 1;

        let version = if i < args.len() && looks_like_version(&args[i]) {
            let v = args[i].clone();
            i += 1;
            Some(v)
        } else {
            None
        };
        pairs.push((query, version));
    }
    Ok(pairs)
}

/// Heuristic matching the CLI grammar: `latest`, anything semver-like,
/// or a dotted digit-leading token ("2.0.0rc1") is read as a version.
/// Dot-free tokens such as the package name `2captcha` are not.
fn looks_like_version(arg: &str) -> bool {
    arg.eq_ignore_ascii_case("latest")
        || parse_lenient(arg).is_some()
        || (arg.contains('.') && arg.chars().next().is_some_and(|c| c.is_ascii_digit()))
}
