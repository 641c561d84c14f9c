//! Terminal and JSON rendering of a finished run.
//!
//! Text output mirrors the two charts analysts look at: the top-K bar chart
//! and the trust score histogram. JSON carries the same data for tooling.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::config::Config;
use crate::pipeline::{RunSummary, TrustReport};
use crate::rank::LeaderboardEntry;
use crate::trust::{grade_counts, score_to_grade};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins over the observed range of `scores`. The last bin
/// includes its upper edge; a zero-width range is widened by 0.5 each side.
pub fn histogram(scores: &[f64], bins: usize) -> Vec<HistogramBin> {
    if scores.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + i as f64 * width,
            upper: if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width },
            count: 0,
        })
        .collect();
    for &s in scores {
        let idx = (((s - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a RunSummary,
    top: &'a [LeaderboardEntry],
    histogram: Vec<HistogramBin>,
    grades: BTreeMap<&'static str, usize>,
}

pub struct Reporter {
    top_k: usize,
    bins: usize,
    bar_width: usize,
}

impl Reporter {
    pub fn new(config: &Config) -> Self {
        Self {
            top_k: config.leaderboard.top_k,
            bins: config.report.histogram_bins,
            bar_width: config.report.bar_width,
        }
    }

    pub fn render(&self, report: &TrustReport, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text(report)),
            OutputFormat::Json => self.render_json(report),
        }
    }

    pub fn render_json(&self, report: &TrustReport) -> anyhow::Result<String> {
        let out = JsonReport {
            summary: &report.summary,
            top: report.leaderboard.top(self.top_k),
            histogram: histogram(&report.distribution, self.bins),
            grades: grade_counts(&report.distribution),
        };
        Ok(serde_json::to_string_pretty(&out)?)
    }

    pub fn render_text(&self, report: &TrustReport) -> String {
        let mut out = String::new();
        let summary = &report.summary;

        if report.leaderboard.is_empty() {
            writeln!(out, "No reviewers to rank ({} reviews).", summary.reviews).ok();
            return out;
        }

        writeln!(
            out,
            "{} reviewers ranked from {} reviews",
            report.leaderboard.len(),
            summary.reviews
        ).ok();
        if let Some(window) = &summary.recency {
            writeln!(
                out,
                "Recent activity counted from {} to {}",
                window.cutoff.format("%Y-%m-%d"),
                window.global_max_date.format("%Y-%m-%d")
            ).ok();
        }

        let top = report.leaderboard.top(self.top_k);
        let id_width = top.iter().map(|e| e.reviewer_id.chars().count()).max().unwrap_or(0).max(8);
        writeln!(out).ok();
        writeln!(out, "Top {} most trusted reviewers", top.len()).ok();
        writeln!(out, "{:>4}  {:<id_width$}  {:>6}  {:<5}", "rank", "reviewer", "score", "grade").ok();
        for entry in top {
            writeln!(
                out,
                "{:>4}  {:<id_width$}  {:>6.4}  {:<5}  {}",
                entry.rank,
                entry.reviewer_id,
                entry.trust_score,
                score_to_grade(entry.trust_score),
                self.bar(entry.trust_score, 1.0),
            ).ok();
        }

        let bins = histogram(&report.distribution, self.bins);
        let peak = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        writeln!(out).ok();
        writeln!(out, "Trust score distribution ({} bins)", bins.len()).ok();
        for bin in &bins {
            writeln!(
                out,
                "[{:.3}, {:.3}] {:>6}  {}",
                bin.lower,
                bin.upper,
                bin.count,
                self.bar(bin.count as f64, peak as f64),
            ).ok();
        }

        let grades = grade_counts(&report.distribution);
        let line: Vec<String> = grades.iter().map(|(g, n)| format!("{}={}", g, n)).collect();
        writeln!(out).ok();
        writeln!(out, "Grades: {}", line.join(" ")).ok();
        out
    }

    fn bar(&self, value: f64, full: f64) -> String {
        if full <= 0.0 || !value.is_finite() {
            return String::new();
        }
        let len = ((value / full) * self.bar_width as f64).round().max(0.0) as usize;
        "#".repeat(len.min(self.bar_width))
    }
}
