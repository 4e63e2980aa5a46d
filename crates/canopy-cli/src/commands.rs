//! CLI command implementations.

use canopy_client::CatalogClient;
use canopy_core::{
    build_hierarchy, categorize, pick_selection, DataModel, SearchIndex, SearchKind, TreeNode,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    Ok(spinner)
}

/// List federations with their data models.
pub async fn federations(url: &str) -> Result<()> {
    let client = CatalogClient::new(url)?;
    let progress = spinner("Fetching federations...")?;
    let federations = client.federations_with_models().await?;
    progress.finish_and_clear();

    if federations.is_empty() {
        println!("No federations available");
        return Ok(());
    }

    for (federation, models) in federations {
        println!(
            "{} {} {}",
            federation.code.cyan().bold(),
            federation.title,
            format!("({} models)", models.len()).dimmed()
        );
        if !federation.institutions.is_empty() {
            println!("  {}", federation.institutions.dimmed());
        }
        for model in models {
            println!(
                "  {} {} {}",
                "•".dimmed(),
                model.label,
                model.version.as_deref().unwrap_or("").dimmed()
            );
        }
    }
    Ok(())
}

/// List data models grouped by study design.
pub async fn models(url: &str, federation: Option<&str>, released_only: bool) -> Result<()> {
    let client = CatalogClient::new(url)?;
    let progress = spinner("Fetching data models...")?;

    let mut models = match federation {
        Some(code) => {
            let federations = client.federations_with_models().await?;
            let matched = federations
                .into_iter()
                .find(|(f, _)| f.code == code)
                .ok_or_else(|| format!("no federation with code '{}'", code))?;
            matched.1
        }
        None => client.list_data_models().await?,
    };
    progress.finish_and_clear();

    if released_only {
        models.retain(|m| m.released);
    }

    if models.is_empty() {
        println!("No data models available");
        return Ok(());
    }

    let split = categorize(models);
    print_model_group("Cross-sectional", &split.cross_sectional);
    print_model_group("Longitudinal", &split.longitudinal);
    Ok(())
}

fn print_model_group(title: &str, models: &[DataModel]) {
    if models.is_empty() {
        return;
    }
    println!("{}", title.cyan().bold());
    for model in models {
        let release_marker = if model.released { "●" } else { "○" };
        println!(
            "  {} {} {} {}",
            release_marker,
            model.label,
            model.version.as_deref().unwrap_or("").dimmed(),
            model.uuid.to_string().dimmed()
        );
    }
}

/// Print a model's hierarchy as a colored tree.
pub async fn show(url: &str, target: &str, latest: bool, depth: Option<usize>) -> Result<()> {
    let model = resolve_model(url, target, latest).await?;
    let root = build_hierarchy(&model)?;
    let index = SearchIndex::build(&root);

    println!(
        "{} {} {}",
        root.name.cyan().bold(),
        model.version.as_deref().unwrap_or("").dimmed(),
        format!(
            "({} variables, {} groups)",
            index.variable_count(),
            index.group_count().saturating_sub(1)
        )
        .dimmed()
    );
    for (position, child) in root.children.iter().enumerate() {
        let last = position + 1 == root.children.len();
        print_tree(child, "", last, 1, depth);
    }
    Ok(())
}

fn print_tree(node: &TreeNode, prefix: &str, last: bool, depth: usize, limit: Option<usize>) {
    let branch = if last { "└─" } else { "├─" };
    let label = if node.is_group() {
        let count = node.variable_count.unwrap_or(0);
        format!(
            "{} {}",
            node.name.blue().bold(),
            format!("({})", count).dimmed()
        )
    } else {
        node.name.to_string()
    };
    println!("{}{} {}", prefix, branch.dimmed(), label);

    let child_prefix = format!("{}{}", prefix, if last { "   " } else { "│  " });
    if limit.is_some_and(|l| depth >= l) {
        if node.has_children() {
            println!("{}{} {}", child_prefix, "└─".dimmed(), "…".dimmed());
        }
        return;
    }
    for (position, child) in node.children.iter().enumerate() {
        let last_child = position + 1 == node.children.len();
        print_tree(child, &child_prefix, last_child, depth + 1, limit);
    }
}

/// Search a model's variables or groups.
pub async fn search(
    url: &str,
    target: &str,
    query: &str,
    groups: bool,
    var_type: Option<&str>,
) -> Result<()> {
    let model = resolve_model(url, target, false).await?;
    let root = build_hierarchy(&model)?;
    let index = SearchIndex::build(&root);

    let kind = if groups {
        SearchKind::Groups
    } else {
        SearchKind::Variables
    };
    let matches = index.query(query, kind, var_type);

    if matches.is_empty() {
        println!("No matches found for \"{}\"", query);
        return Ok(());
    }

    println!("Found {} matches:\n", matches.len());
    for entry in matches {
        let type_note = entry
            .var_type
            .as_deref()
            .map(|t| format!(" [{}]", t))
            .unwrap_or_default();
        println!(
            "  {}{} {}",
            entry.name.cyan(),
            type_note.yellow(),
            entry.display_path.dimmed()
        );
    }
    Ok(())
}

/// Export a model document as pretty JSON.
pub async fn export(url: &str, uuid: Uuid, output: &Path) -> Result<()> {
    let client = CatalogClient::new(url)?;
    let progress = spinner("Fetching data model...")?;
    let bytes = client.export_json(uuid).await?;
    progress.finish_and_clear();

    fs::write(output, bytes)?;
    println!("{} Exported to {}", "✓".green(), output.display());
    Ok(())
}

/// Resolves a command target to a model document.
///
/// A target is tried as a local JSON file first, then as a UUID fetched
/// from the backend, and finally as a code/label query against the full
/// model listing.
async fn resolve_model(url: &str, target: &str, latest: bool) -> Result<DataModel> {
    if Path::new(target).exists() {
        let text = fs::read_to_string(target)?;
        return Ok(DataModel::from_json(&text)?);
    }

    let client = CatalogClient::new(url)?;
    if let Ok(uuid) = target.parse::<Uuid>() {
        return Ok(client.get_data_model(uuid).await?);
    }

    tracing::debug!(%target, "resolving target as a model query");

    let progress = spinner("Fetching data models...")?;
    let models = client.list_data_models().await?;
    progress.finish_and_clear();

    let split = categorize(models);
    pick_selection(&split, Some(target), latest)
        .cloned()
        .ok_or_else(|| format!("no data model matches '{}'", target).into())
}
