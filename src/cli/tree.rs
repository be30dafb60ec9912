//! Tree and pages commands

use anyhow::{Context, Result};
use serde::Serialize;

use super::output::Output;
use crate::domain::{LogicalStructure, Node, PhysicalStructure, Workpiece};
use crate::validation::MetadataValidator;

fn load(document: &str) -> Result<Workpiece> {
    MetadataValidator::default()
        .load_workpiece(document)
        .with_context(|| format!("Failed to open document {}", document))
}

/// Prints the logical or physical structure tree
pub fn tree(output: &Output, document: &str, physical: bool) -> Result<()> {
    let workpiece = load(document)?;
    output.verbose_ctx(
        "tree",
        &format!(
            "{} logical, {} physical structures",
            workpiece.all_logical_structures().len(),
            workpiece.all_physical_structures().len()
        ),
    );

    if output.is_json() {
        if physical {
            output.data(&workpiece.physical_root);
        } else {
            output.data(&workpiece.logical_root);
        }
    } else if physical {
        print_physical(output, &workpiece.physical_root, 0);
    } else {
        print_logical(output, &workpiece.logical_root, 0);
    }

    Ok(())
}

fn print_metadata<T: Node>(output: &Output, node: &T, depth: usize) {
    if !output.is_verbose() {
        return;
    }
    for metadata in node.metadata() {
        println!("{}  · {}", "  ".repeat(depth), metadata);
    }
}

fn print_logical(output: &Output, structure: &LogicalStructure, depth: usize) {
    let mut line = format!("{}{}", "  ".repeat(depth), structure);
    if !structure.views.is_empty() {
        let targets: Vec<_> = structure.views.iter().map(|view| view.physical.as_str()).collect();
        line.push_str(&format!(" -> {}", targets.join(", ")));
    }
    if let Some(link) = &structure.link {
        line.push_str(&format!(" => {}", link.uri));
    }
    println!("{}", line);
    print_metadata(output, structure, depth);

    for child in structure.children() {
        print_logical(output, child, depth + 1);
    }
}

fn print_physical(output: &Output, structure: &PhysicalStructure, depth: usize) {
    println!("{}{}", "  ".repeat(depth), structure);
    print_metadata(output, structure, depth);

    for child in structure.children() {
        print_physical(output, child, depth + 1);
    }
}

#[derive(Serialize)]
struct MediaFileRow<'a> {
    #[serde(rename = "use")]
    use_name: &'a str,
    mime_type: &'a str,
    uri: &'a str,
}

#[derive(Serialize)]
struct PageRow<'a> {
    id: &'a str,
    order: i32,
    orderlabel: Option<&'a str>,
    #[serde(rename = "type")]
    division_type: Option<&'a str>,
    media_files: Vec<MediaFileRow<'a>>,
    logical: Vec<&'a str>,
}

/// Lists media units in page order with their files and viewers
pub fn pages(output: &Output, document: &str) -> Result<()> {
    let workpiece = load(document)?;

    let rows: Vec<PageRow<'_>> = workpiece
        .all_physical_structures_sorted()
        .into_iter()
        .filter(|structure| structure.id != workpiece.physical_root.id)
        .map(|structure| PageRow {
            id: structure.id.as_str(),
            order: structure.order(),
            orderlabel: structure.orderlabel(),
            division_type: structure.division_type(),
            media_files: structure
                .media_files
                .iter()
                .map(|(variant, uri)| MediaFileRow {
                    use_name: &variant.use_name,
                    mime_type: &variant.mime_type,
                    uri,
                })
                .collect(),
            logical: workpiece
                .logical_structures_viewing(&structure.id)
                .into_iter()
                .map(|logical| logical.id.as_str())
                .collect(),
        })
        .collect();

    output.verbose_ctx("pages", &format!("Found {} media units", rows.len()));

    if output.is_json() {
        output.data(&rows);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No media units.");
        return Ok(());
    }

    println!("{:>6}  {:<10} {:<16} TYPE", "ORDER", "LABEL", "ID");
    println!("{}", "-".repeat(60));
    for row in &rows {
        println!(
            "{:>6}  {:<10} {:<16} {}",
            row.order,
            row.orderlabel.unwrap_or("-"),
            row.id,
            row.division_type.unwrap_or("-")
        );
        for file in &row.media_files {
            println!("{:>8}{} ({}) {}", "", file.use_name, file.mime_type, file.uri);
        }
        if !row.logical.is_empty() {
            println!("{:>8}in {}", "", row.logical.join(", "));
        }
    }

    Ok(())
}
