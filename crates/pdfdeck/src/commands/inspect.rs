use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use pdfdeck::{PageSource, SlideGraph};

#[derive(Debug, Serialize)]
pub struct Report {
    pub file: String,
    pub layout: &'static str,
    pub pages: usize,
    pub slides: Vec<SlideReport>,
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SlideReport {
    /// 1-indexed
    pub number: usize,
    pub label: String,
    /// 1-indexed physical pages, one per overlay
    pub pages: Vec<usize>,
    pub notes: Option<String>,
    pub links: usize,
    pub media: usize,
}

pub fn run(file: &Path, json: bool) -> Result<()> {
    let (document, graph) =
        pdfdeck::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let report = build_report(&file.display().to_string(), &document, &graph)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

pub fn build_report(name: &str, source: &impl PageSource, graph: &SlideGraph) -> Result<Report> {
    let mut slides = Vec::with_capacity(graph.slide_count());
    let mut diagnostics = Vec::new();

    for (number, group) in graph.groups().iter().enumerate() {
        let first = graph
            .node(group.first())
            .context("Slide without a first page")?;
        let mut links = 0;
        let mut media = 0;
        for &page in group.members() {
            let resolved = graph.links(page, source)?;
            links += resolved.items().len();
            diagnostics.extend(resolved.diagnostics().iter().map(ToString::to_string));

            let resolved = graph.media(page, source)?;
            media += resolved.items().len();
            diagnostics.extend(resolved.diagnostics().iter().map(ToString::to_string));
        }

        slides.push(SlideReport {
            number: number + 1,
            label: first.label().to_string(),
            pages: group.members().iter().map(|p| p + 1).collect(),
            notes: group
                .members()
                .iter()
                .filter_map(|&p| graph.node(p))
                .find_map(|node| super::note_source(graph, node)),
            links,
            media,
        });
    }

    Ok(Report {
        file: name.to_string(),
        layout: graph.mode().name(),
        pages: source.page_count(),
        slides,
        diagnostics,
    })
}

fn print_report(report: &Report) {
    println!(
        "{}: {} pages, {} slides, notes layout {}",
        report.file.bold(),
        report.pages,
        report.slides.len(),
        report.layout.cyan()
    );
    println!();

    for slide in &report.slides {
        let pages = match slide.pages.as_slice() {
            [single] => format!("page {single}"),
            [first, .., last] => format!("pages {first}-{last} ({} overlays)", slide.pages.len()),
            [] => String::new(),
        };
        let mut line = format!(
            "{:>4}  {:<8} {}",
            slide.number,
            format!("\"{}\"", slide.label),
            pages
        );
        if let Some(notes) = &slide.notes {
            line.push_str(&format!("  notes: {notes}"));
        }
        if slide.links > 0 {
            line.push_str(&format!("  links: {}", slide.links));
        }
        if slide.media > 0 {
            line.push_str(&format!("  media: {}", slide.media));
        }
        println!("{line}");
    }

    if !report.diagnostics.is_empty() {
        println!();
        println!("{}", "Diagnostics:".yellow().bold());
        for diagnostic in &report.diagnostics {
            println!("  {diagnostic}");
        }
    }
}
