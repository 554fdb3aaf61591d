//! Terminal summary of a finished crawl

use super::{CrawlReport, DomainReport};

/// Prints the crawl report to stdout
pub fn print_summary(report: &CrawlReport) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Domains crawled: {}", report.domains.len());
    println!("  Completed: {}", report.completed_count());
    println!("  Failed: {}", report.failed_count());
    println!("  Product URLs found: {}", report.total_products());
    println!("  Duration: {:.1}s", report.duration_seconds());
    println!();

    println!("Domains:");
    // Most productive first
    let mut domains: Vec<&DomainReport> = report.domains.iter().collect();
    domains.sort_by(|a, b| b.products.len().cmp(&a.products.len()).then(a.domain.cmp(&b.domain)));

    for domain in domains {
        match domain.error() {
            None => println!(
                "  {}: {} products, {} pages ({} failed, {} partial) in {:.1}s",
                domain.domain,
                domain.products.len(),
                domain.stats.pages_visited,
                domain.stats.pages_failed,
                domain.stats.partial_extractions,
                domain.duration_seconds()
            ),
            Some(error) => println!("  {}: FAILED ({})", domain.domain, error),
        }
    }
    println!();

    let visited: usize = report.domains.iter().map(|d| d.stats.pages_visited).sum();
    let failed: usize = report.domains.iter().map(|d| d.stats.pages_failed).sum();
    let rendered = visited.saturating_sub(failed);
    let success_rate = if visited > 0 {
        (rendered as f64 / visited as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages rendered)",
        success_rate, rendered, visited
    );
}
