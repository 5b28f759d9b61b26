// 📊 Results - tallies, percentages, and rankings
//
// Pure computations over a candidate slice: calling them twice without an
// intervening vote yields identical reports.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{Candidate, Party};

// ============================================================================
// RESULT ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// 1-based position after sorting by votes
    pub rank: usize,
    pub name: String,
    /// Party name or "Independent"
    pub party: String,
    pub votes: u32,
    pub percentage: f64,
}

impl ResultRow {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.party)
    }
}

// ============================================================================
// RESULTS REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsReport {
    /// Heading shown above the table
    pub heading: String,
    pub total_votes: u32,
    pub registered_voters: usize,
    pub rows: Vec<ResultRow>,
}

impl ResultsReport {
    pub fn winner(&self) -> Option<&ResultRow> {
        self.rows.first().filter(|row| row.votes > 0)
    }

    pub fn turnout(&self) -> f64 {
        turnout_percentage(self.total_votes, self.registered_voters)
    }

    /// One line per candidate, percentages at one decimal place
    pub fn lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| {
                format!(
                    "{}. {} - {} votes ({:.1}%)",
                    row.rank,
                    row.label(),
                    row.votes,
                    row.percentage
                )
            })
            .collect()
    }
}

impl fmt::Display for ResultsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.heading)?;

        if self.rows.is_empty() {
            return writeln!(f, "No candidates registered.");
        }

        writeln!(f, "Total votes cast: {}", self.total_votes)?;
        writeln!(f, "Total registered voters: {}", self.registered_voters)?;
        writeln!(f)?;
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

// ============================================================================
// TALLY
// ============================================================================

/// Rank candidates by votes, highest first.
///
/// The sort is stable, so tied candidates keep their registration order.
pub fn tally(
    heading: &str,
    candidates: &[Candidate],
    parties: &[Party],
    registered_voters: usize,
) -> ResultsReport {
    let total_votes = total_votes(candidates);

    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.vote_count().cmp(&a.vote_count()));

    let rows = ranked
        .into_iter()
        .enumerate()
        .map(|(i, c)| ResultRow {
            rank: i + 1,
            name: c.name().to_string(),
            party: c.party_name(parties).to_string(),
            votes: c.vote_count(),
            percentage: vote_percentage(c.vote_count(), total_votes),
        })
        .collect();

    ResultsReport {
        heading: heading.to_string(),
        total_votes,
        registered_voters,
        rows,
    }
}

/// Saturates at u32::MAX rather than wrapping
pub fn total_votes(candidates: &[Candidate]) -> u32 {
    sum_votes(candidates.iter().map(|c| c.vote_count()))
}

pub fn sum_votes(counts: impl IntoIterator<Item = u32>) -> u32 {
    counts.into_iter().fold(0, u32::saturating_add)
}

/// votes / total * 100, or 0.0 when nobody has voted
pub fn vote_percentage(votes: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(votes) / f64::from(total) * 100.0
    }
}

/// Votes cast as a share of registered voters
pub fn turnout_percentage(total_votes: u32, total_voters: usize) -> f64 {
    if total_voters == 0 {
        0.0
    } else {
        f64::from(total_votes) / total_voters as f64 * 100.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
