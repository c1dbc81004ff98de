//! Console reporter with colored output

use crate::analyzer::engine::AggregateStats;
use crate::{Feature, Finding, GradeResult, Grade};
use colored::Colorize;

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show every finding
    verbose: bool,
}

/// Findings printed per essay unless verbose
const FINDING_LIMIT: usize = 8;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Report a single grade result
    pub fn report(&self, result: &GradeResult) {
        self.print_header(result);
        self.print_grade(result);
        self.print_breakdown(result);
        if !result.findings.is_empty() {
            self.print_findings(&result.findings);
        }
        println!();
    }

    /// Report multiple results with summary
    pub fn report_many(&self, results: &[GradeResult], stats: &AggregateStats) {
        for result in results {
            self.report(result);
            println!("{}", "─".repeat(60));
        }
        self.print_summary(stats);
    }

    /// One line per essay
    pub fn report_quiet(&self, result: &GradeResult) {
        println!(
            "{}: {:.3} ({})",
            display_name(result),
            result.final_score,
            self.colorize_grade(result.grade)
        );
    }

    fn print_header(&self, result: &GradeResult) {
        println!();
        println!("{}", format!("Essay: {}", display_name(result)).bold());
        println!(
            "   Sentences: {} | Tokens: {}",
            result.stats.sentences, result.stats.tokens
        );
        println!();
    }

    fn print_grade(&self, result: &GradeResult) {
        let grade = self.colorize_grade(result.grade);
        println!(
            "   Grade: {} (model output {:.3})",
            grade.bold(),
            result.final_score
        );
        match result.agrees_with_expected() {
            Some(true) => println!("   {}", "matches the expected grade".dimmed()),
            Some(false) => {
                if let Some(expected) = result.expected_grade {
                    println!(
                        "   {}",
                        format!("expected {}", expected).yellow()
                    );
                }
            }
            None => {}
        }
        println!();
    }

    fn print_breakdown(&self, result: &GradeResult) {
        println!("   {}", "Sub-scores:".bold());
        for feature in Feature::ALL {
            let score = result.scores.get(feature);
            let (good, max) = score_scale(feature, score);
            let bar = self.create_mini_bar(good, max);
            let score_str = format!("{}/{}", score, max);
            let colored_score = if !self.use_colors {
                score_str.normal()
            } else if good * 5 >= max * 4 {
                score_str.green()
            } else if good * 5 >= max * 3 {
                score_str.yellow()
            } else {
                score_str.red()
            };
            let measure = result
                .stats
                .measures
                .get(&feature)
                .map(|m| format!(" (measure {:.3})", m))
                .unwrap_or_default();
            println!(
                "   {} {} {}{}",
                bar,
                colored_score,
                feature.title(),
                measure.dimmed()
            );
        }
        println!();
    }

    fn print_findings(&self, findings: &[Finding]) {
        println!("   {}", "Findings:".bold());
        let shown = if self.verbose {
            findings.len()
        } else {
            findings.len().min(FINDING_LIMIT)
        };
        for finding in &findings[..shown] {
            self.print_finding(finding);
        }
        if shown < findings.len() {
            println!(
                "   {} {} more (use --verbose to show)",
                "ℹ".blue(),
                findings.len() - shown
            );
        }
    }

    fn print_finding(&self, finding: &Finding) {
        let location = format!("S{}", finding.location);
        println!(
            "   {} {} [{}] {}",
            "⚠".yellow(),
            location.dimmed(),
            finding.feature.to_string().dimmed(),
            finding.message
        );
        if let Some(ref suggestion) = finding.suggestion {
            println!("       {} {}", "→".dimmed(), suggestion.italic());
        }
    }

    fn print_summary(&self, stats: &AggregateStats) {
        println!();
        println!("{}", "═".repeat(60));
        println!("{}", "Summary".bold());
        println!("{}", "═".repeat(60));
        println!("   Essays graded:  {}", stats.essays_graded.to_string().bold());
        println!(
            "   High / Low:     {} / {}",
            stats.high.to_string().green(),
            stats.low.to_string().red()
        );
        println!("   Mean output:    {:.3}", stats.mean_final_score);
        for (feature, mean) in &stats.mean_scores {
            println!("   {:<24}{:.2}", format!("{}:", feature.title()), mean);
        }
        println!("   Total findings: {}", stats.total_findings);
        if let Some(accuracy) = stats.accuracy {
            println!(
                "   Agreement:      {}/{} ({:.1}%)",
                stats.agreements,
                stats.with_expected_grade,
                accuracy * 100.0
            );
        }
        println!();
    }

    fn colorize_grade(&self, grade: Grade) -> colored::ColoredString {
        let s = grade.to_string().to_uppercase();
        if !self.use_colors {
            return s.normal();
        }
        match grade {
            Grade::High => s.green().bold(),
            Grade::Low => s.red().bold(),
        }
    }

    fn create_mini_bar(&self, good: u8, max: u8) -> String {
        let filled = (good as usize * 10) / max.max(1) as usize;
        let empty = 10 - filled.min(10);
        format!("[{}{}]", "▓".repeat(filled.min(10)), "░".repeat(empty))
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn display_name(result: &GradeResult) -> String {
    match &result.file_path {
        Some(path) => path.display().to_string(),
        None => result.essay_id.clone(),
    }
}

/// (goodness, maximum) for a sub-score; spelling counts misspelling bands so
/// it is inverted
fn score_scale(feature: Feature, score: u8) -> (u8, u8) {
    match feature {
        Feature::Spelling => (4u8.saturating_sub(score), 4),
        _ => (score.min(5), 5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_scale_inverts_spelling() {
        assert_eq!(score_scale(Feature::Spelling, 0), (4, 4));
        assert_eq!(score_scale(Feature::Spelling, 4), (0, 4));
        assert_eq!(score_scale(Feature::Grammar, 3), (3, 5));
    }

    #[test]
    fn test_mini_bar_width() {
        let reporter = ConsoleReporter::new().without_colors();
        assert_eq!(reporter.create_mini_bar(5, 5), format!("[{}]", "▓".repeat(10)));
        assert_eq!(reporter.create_mini_bar(0, 5), format!("[{}]", "░".repeat(10)));
        assert_eq!(reporter.create_mini_bar(0, 0).chars().count(), 12);
    }
}
