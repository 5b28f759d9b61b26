// 📤 CSV Export - candidates, voters, and parties as three spreadsheet files
//
// <base>_candidates.csv  Index,Name,Party,Votes,VotePercentage
// <base>_voters.csv      UniqueId,FirstName,LastName,Age,Phone,Address,HasVoted
// <base>_parties.csv     PartyName,MemberCount,Members
//
// Text fields are always quoted, so addresses and ';'-joined member lists
// survive commas. Percentages are relative to the ballot the candidate is on
// (flat ballot or its region), at two decimals.

use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::election::Election;
use crate::entities::Candidate;
use crate::error::{ElectionError, Result};
use crate::results::{total_votes, vote_percentage};

#[derive(Debug, Serialize)]
struct CandidateRow<'a> {
    #[serde(rename = "Index")]
    index: usize,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Party")]
    party: &'a str,
    #[serde(rename = "Votes")]
    votes: u32,
    #[serde(rename = "VotePercentage")]
    vote_percentage: String,
}

#[derive(Debug, Serialize)]
struct VoterRow<'a> {
    #[serde(rename = "UniqueId")]
    unique_id: u32,
    #[serde(rename = "FirstName")]
    first_name: &'a str,
    #[serde(rename = "LastName")]
    last_name: &'a str,
    #[serde(rename = "Age")]
    age: u32,
    #[serde(rename = "Phone")]
    phone: &'a str,
    #[serde(rename = "Address")]
    address: &'a str,
    #[serde(rename = "HasVoted")]
    has_voted: &'static str,
}

#[derive(Debug, Serialize)]
struct PartyRow<'a> {
    #[serde(rename = "PartyName")]
    party_name: &'a str,
    #[serde(rename = "MemberCount")]
    member_count: usize,
    #[serde(rename = "Members")]
    members: String,
}

/// The three files an export produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub candidates: PathBuf,
    pub voters: PathBuf,
    pub parties: PathBuf,
}

impl ExportPaths {
    pub fn for_base(base: &str) -> Self {
        ExportPaths {
            candidates: PathBuf::from(format!("{}_candidates.csv", base)),
            voters: PathBuf::from(format!("{}_voters.csv", base)),
            parties: PathBuf::from(format!("{}_parties.csv", base)),
        }
    }
}

fn open_writer(path: &Path) -> Result<csv::Writer<File>> {
    let file = File::create(path).map_err(|e| ElectionError::open_failed(path, e))?;
    Ok(csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(file))
}

fn finish(mut writer: csv::Writer<File>, path: &Path) -> Result<()> {
    writer.flush().map_err(|e| ElectionError::write_failed(path, e))
}

impl Election {
    pub fn export_to_csv(&self, base: &str) -> Result<ExportPaths> {
        let paths = ExportPaths::for_base(base);

        self.export_candidates(&paths.candidates)?;
        self.export_voters(&paths.voters)?;
        self.export_parties(&paths.parties)?;

        info!(base, "Election exported to CSV");
        Ok(paths)
    }

    fn export_candidates(&self, path: &Path) -> Result<()> {
        let mut writer = open_writer(path)?;

        let ballots = std::iter::once(self.candidates())
            .chain(self.regions().iter().map(|r| r.candidates()));

        let mut index = 0;
        for ballot in ballots {
            let ballot_total = total_votes(ballot);
            for candidate in ballot {
                writer.serialize(self.candidate_row(index, candidate, ballot_total))?;
                index += 1;
            }
        }

        finish(writer, path)
    }

    fn candidate_row<'a>(&'a self, index: usize, candidate: &'a Candidate, total: u32) -> CandidateRow<'a> {
        CandidateRow {
            index,
            name: candidate.name(),
            party: candidate.party_name(self.parties()),
            votes: candidate.vote_count(),
            vote_percentage: format!("{:.2}", vote_percentage(candidate.vote_count(), total)),
        }
    }

    fn export_voters(&self, path: &Path) -> Result<()> {
        let mut writer = open_writer(path)?;

        for voter in self.all_voters() {
            writer.serialize(VoterRow {
                unique_id: voter.unique_id(),
                first_name: voter.first_name(),
                last_name: voter.last_name(),
                age: voter.age(),
                phone: voter.phone(),
                address: voter.address(),
                has_voted: if voter.has_voted() { "Yes" } else { "No" },
            })?;
        }

        finish(writer, path)
    }

    fn export_parties(&self, path: &Path) -> Result<()> {
        let mut writer = open_writer(path)?;

        for party in self.parties() {
            writer.serialize(PartyRow {
                party_name: party.name(),
                member_count: party.members().len(),
                members: party.members_joined(),
            })?;
        }

        finish(writer, path)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::VoterRegistration;

    fn create_test_election() -> Election {
        let mut election = Election::new("E");
        let green = election.create_party("Green");
        election.add_candidate("Alice", Some(green)).unwrap();
        election.add_candidate("Bob", None).unwrap();
        election
            .register_voter(&VoterRegistration::new(
                "Jane", "Doe", "5551234567", "12 Main Street, Apt 4", "111111111", "25",
            ))
            .unwrap();
        election
            .register_voter(&VoterRegistration::new(
                "John", "Roe", "5559876543", "9 Side Road", "222222222", "40",
            ))
            .unwrap();
        election.cast_vote(111111111, 0).unwrap();
        election.cast_vote(222222222, 0).unwrap();
        election
    }

    fn export(election: &Election) -> (tempfile::TempDir, ExportPaths) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("out");
        let paths = election.export_to_csv(base.to_str().unwrap()).unwrap();
        (dir, paths)
    }

    #[test]
    fn test_export_paths() {
        let paths = ExportPaths::for_base("run1");
        assert_eq!(paths.candidates, PathBuf::from("run1_candidates.csv"));
        assert_eq!(paths.voters, PathBuf::from("run1_voters.csv"));
        assert_eq!(paths.parties, PathBuf::from("run1_parties.csv"));
    }

    #[test]
    fn test_candidates_csv() {
        let (_dir, paths) = export(&create_test_election());
        let text = std::fs::read_to_string(&paths.candidates).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "\"Index\",\"Name\",\"Party\",\"Votes\",\"VotePercentage\"");
        assert_eq!(lines[1], "0,\"Alice\",\"Green\",2,100.00");
        assert_eq!(lines[2], "1,\"Bob\",\"Independent\",0,0.00");
    }

    #[test]
    fn test_voters_csv_keeps_address_with_comma() {
        let (_dir, paths) = export(&create_test_election());

        let mut reader = csv::Reader::from_path(&paths.voters).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["UniqueId", "FirstName", "LastName", "Age", "Phone", "Address", "HasVoted"]
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "111111111");
        assert_eq!(&rows[0][5], "12 Main Street, Apt 4");
        assert_eq!(&rows[0][6], "Yes");
    }

    #[test]
    fn test_parties_csv() {
        let mut election = create_test_election();
        let green = election.find_party_by_name("Green").unwrap();
        election.add_candidate("Carol", Some(green)).unwrap();
        let (_dir, paths) = export(&election);

        let text = std::fs::read_to_string(&paths.parties).unwrap();
        assert!(text.contains("\"Green\",2,\"Alice;Carol\""));
    }

    #[test]
    fn test_regional_percentages_are_per_region() {
        let mut election = Election::new("E");
        let north = election.create_region("North District", "NORTH").unwrap();
        election.add_candidate_to_region("Alice", None, north).unwrap();
        election.add_candidate_to_region("Bob", None, north).unwrap();
        for (id, choice) in [("111111111", 0), ("222222222", 0), ("333333333", 1)] {
            election
                .register_voter_in_region(
                    &VoterRegistration::new("Jane", "Doe", "5551234567", "12 Main Street", id, "30"),
                    north,
                )
                .unwrap();
            election.cast_vote_in_region(id.parse().unwrap(), choice, north).unwrap();
        }

        let (_dir, paths) = export(&election);
        let text = std::fs::read_to_string(&paths.candidates).unwrap();

        assert!(text.contains("0,\"Alice\",\"Independent\",2,66.67"));
        assert!(text.contains("1,\"Bob\",\"Independent\",1,33.33"));
    }

    #[test]
    fn test_export_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("missing").join("out");

        let result = Election::new("E").export_to_csv(base.to_str().unwrap());
        assert!(matches!(result, Err(ElectionError::FileOpenFailed { .. })));
    }
}
