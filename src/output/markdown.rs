//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of the item
//! database: totals, per-language counts and the latest run.

use crate::output::stats::CrawlStatistics;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of `stats` to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(std::io::Error)` - Failed to write summary
pub fn generate_markdown_summary(stats: &CrawlStatistics, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(stats);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats harvest statistics as markdown
pub fn format_markdown_summary(stats: &CrawlStatistics) -> String {
    let mut md = String::new();

    md.push_str("# News-Harvest Summary\n\n");

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total Items**: {}\n", stats.total_items));
    md.push_str(&format!("- **Languages**: {}\n\n", stats.total_languages));

    if !stats.items_by_language.is_empty() {
        md.push_str("## Items by Language\n\n");
        md.push_str("| Language | Items |\n");
        md.push_str("|----------|-------|\n");
        for (language, count) in &stats.items_by_language {
            md.push_str(&format!("| {} | {} |\n", escape_cell(language), count));
        }
        md.push('\n');
    }

    md.push_str("## Latest Run\n\n");
    match &stats.latest_run {
        Some(run) => {
            md.push_str(&format!("- **Run ID**: {}\n", run.id));
            md.push_str(&format!("- **Status**: {}\n", run.status));
            md.push_str(&format!("- **Started**: {}\n", run.started_at));
            if let Some(finished) = &run.finished_at {
                md.push_str(&format!("- **Finished**: {}\n", finished));
            }
            md.push_str(&format!("- **Config Hash**: {}\n", run.config_hash));
            md.push_str(&format!(
                "- **Listing Pages**: {} fetched, {} failed\n",
                run.report.pages_fetched, run.report.pages_failed
            ));
            md.push_str(&format!("- **Blocks Seen**: {}\n", run.report.blocks_seen));
            md.push_str(&format!(
                "- **Items Inserted**: {}\n",
                run.report.items_inserted
            ));
            md.push_str(&format!("- **Duplicates**: {}\n", run.report.duplicates));
            md.push_str(&format!(
                "- **Extraction Failures**: {}\n",
                run.report.extraction_failures
            ));
            md.push_str(&format!(
                "- **Transport Failures**: {}\n",
                run.report.transport_failures
            ));
        }
        None => md.push_str("No crawl runs recorded.\n"),
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
