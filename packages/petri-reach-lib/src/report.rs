use std::fmt::Display;

use crate::analysis::AnalysisResult;

const FILE_HEADER: &str = "filename";
const BOUNDED_HEADER: &str = "bounded";
const STATS_HEADER: &str = "Nodes / Edges resp. m, m'";
const BOUNDED_WIDTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub file_name: String,
    pub bounded: bool,
    /// `nodes / edges` for bounded nets, `m / m'` for unbounded ones.
    pub stats: String,
}

impl ReportRow {
    pub fn new(file_name: impl Into<String>, result: &AnalysisResult) -> Self {
        let stats = match result.witness() {
            None => format!("{} / {}", result.node_count(), result.edge_count()),
            Some(witness) => format!("{} / {}", witness.dominated, witness.dominating),
        };

        ReportRow {
            file_name: file_name.into(),
            bounded: result.is_bounded(),
            stats,
        }
    }
}

/// Plain text table with one row per analysed net:
///
/// ```text
/// filename  | bounded    | Nodes / Edges resp. m, m'
/// --------- | ---------- | -------------------------
/// net.pnml  | yes        | 2 / 2
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    rows: Vec<ReportRow>,
}

impl AnalysisReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, file_name: impl Into<String>, result: &AnalysisResult) {
        self.rows.push(ReportRow::new(file_name, result));
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    fn file_width(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.file_name.chars().count() + 2)
            .fold(9, usize::max)
    }

    fn stats_width(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.stats.chars().count() + 2)
            .fold(STATS_HEADER.len(), usize::max)
    }
}

impl Display for AnalysisReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file_width = self.file_width();
        let stats_width = self.stats_width();
        let bounded_width = BOUNDED_WIDTH;

        writeln!(
            f,
            "{:<file_width$} | {:<bounded_width$} | {:<stats_width$}",
            FILE_HEADER, BOUNDED_HEADER, STATS_HEADER
        )?;
        writeln!(
            f,
            "{} | {} | {}",
            "-".repeat(file_width),
            "-".repeat(bounded_width),
            "-".repeat(stats_width)
        )?;

        for row in &self.rows {
            writeln!(
                f,
                "{:<file_width$} | {:<bounded_width$} | {:<stats_width$}",
                row.file_name,
                if row.bounded { "yes" } else { "no" },
                row.stats
            )?;
        }

        Ok(())
    }
}
