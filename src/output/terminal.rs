// Colored terminal output for batch summaries and similarity reports.

use colored::Colorize;

use crate::analysis::category::Category;
use crate::pipeline::batch::BatchReport;

/// Print the score totals and per-category document counts for a batch.
pub fn display_summary(report: &BatchReport) {
    println!(
        "\n{}",
        format!(
            "=== Batch Summary ({} classified, {} skipped) ===",
            report.records.len(),
            report.failures.len()
        )
        .bold()
    );

    println!("\n  {}", "Total scores".dimmed());
    for (category, score) in report.total_scores.iter() {
        println!("    {:<10} {:>6}", colorize_category(category), score);
    }

    println!("\n  {}", "Documents per category".dimmed());
    for category in Category::ALL {
        let count = report
            .category_counts
            .get(category.as_str())
            .copied()
            .unwrap_or(0);
        println!("    {:<10} {:>6}", colorize_category(category), count);
    }

    if !report.indexed && !report.records.is_empty() {
        println!(
            "\n  {} batch was not added to the similarity index",
            "Warning:".yellow()
        );
    }

    for failure in &report.failures {
        println!("  {} {}", "Skipped:".red(), failure);
    }
}

/// Print key terms and the plain-text report for every document.
pub fn display_results(report: &BatchReport) {
    println!("\n{}", "=== Detailed Results ===".bold());

    for (record, result) in report.records.iter().zip(&report.results) {
        println!();
        if !record.key_terms.is_empty() {
            println!("{}", format!("Key terms: {}", record.key_terms.join(", ")).dimmed());
        }
        print!("{result}");
    }
}

fn colorize_category(category: Category) -> colored::ColoredString {
    let label = category.as_str();
    match category {
        Category::Medical => label.bright_green(),
        Category::Financial => label.bright_yellow(),
        Category::Legal => label.bright_blue(),
        Category::Resume => label.bright_magenta(),
        Category::Other => label.normal(),
    }
}
