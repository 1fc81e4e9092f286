use crate::pypi::types::{DependencyReport, PackageMetadata, QueryResult, VersionRecord};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

/// Rendering never fails: output types serialize infallibly and
/// unknown/missing fields are omitted.
fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).expect("output types serialize infallibly")
}

#[derive(Serialize)]
struct LatestOutput<'a> {
    package: &'a str,
    latest: Option<&'a str>,
}

/// Full version listing, newest first.
pub fn render_versions(result: &QueryResult, json: bool) -> String {
    if json {
        return to_json(result);
    }

    let package = result.query.name();
    if result.versions.is_empty() {
        return format!("No versions found for package {}.", package.cyan());
    }

    let mut out = String::new();
    let _ = writeln!(out, "Available versions for {}:", package.cyan().bold());
    for record in &result.versions {
        match record.release_date {
            Some(date) => {
                let _ = writeln!(
                    out,
                    "  {}  ({})",
                    record.version,
                    date.format("%Y-%m-%d").to_string().yellow()
                );
            }
            None => {
                let _ = writeln!(out, "  {}", record.version);
            }
        }
    }
    out.pop();
    out
}

/// Only the highest-precedence version.
pub fn render_latest(package: &str, record: Option<&VersionRecord>, json: bool) -> String {
    if json {
        return to_json(&LatestOutput {
            package,
            latest: record.map(|r| r.version.as_str()),
        });
    }

    match record {
        Some(r) => format!(
            "Latest version of {}: {}",
            package.cyan(),
            r.version.green()
        ),
        None => format!("No versions found for package {}.", package.cyan()),
    }
}

/// Package metadata block. The long description is opt-in.
pub fn render_metadata(meta: &PackageMetadata, show_description: bool, json: bool) -> String {
    if json {
        if show_description {
            return to_json(meta);
        }
        let mut trimmed = meta.clone();
        trimmed.description = None;
        return to_json(&trimmed);
    }

    let field = |v: &Option<String>| v.as_deref().unwrap_or("").to_string();

    let mut out = String::new();
    let _ = writeln!(out, "Metadata for {}:", meta.name.cyan().bold());
    let _ = writeln!(out, "  Name: {}", meta.name);
    let _ = writeln!(out, "  Version: {}", meta.version);
    let _ = writeln!(out, "  Summary: {}", field(&meta.summary));
    let _ = writeln!(out, "  Author: {}", field(&meta.author));
    let _ = writeln!(out, "  Author Email: {}", field(&meta.author_email));
    let _ = writeln!(out, "  License: {}", field(&meta.license));
    let _ = writeln!(out, "  Home Page: {}", field(&meta.home_page));
    let _ = writeln!(out, "  Repository URL: {}", field(&meta.project_url));
    if show_description {
        let _ = writeln!(out, "  Description: {}", field(&meta.description));
    } else {
        let _ = writeln!(
            out,
            "\nTo include the description in the output, use the {} flag.",
            "--description".cyan()
        );
    }
    out.pop();
    out
}

/// requires_dist listing for one package version.
pub fn render_deps(report: &DependencyReport, json: bool) -> String {
    if json {
        return to_json(report);
    }

    if report.dependencies.is_empty() {
        return format!(
            "No dependencies found for package {} version {}.",
            report.package.cyan(),
            report.version
        );
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Dependencies for {} version {}:",
        report.package.cyan().bold(),
        report.version
    );
    for dep in &report.dependencies {
        let _ = writeln!(out, "  - {dep}");
    }
    out.pop();
    out
}
