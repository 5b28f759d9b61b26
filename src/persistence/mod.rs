// 💾 Persistence - section-based text snapshot of a whole election
//
// File layout (section and key names are a stable contract):
//
//   COMPLETE_ELECTION_DATA
//   ======================
//
//   [ELECTION_INFO]   Title, TotalCandidates, TotalVoters, TotalParties, TotalRegions
//   [REGIONS]         Region<i>_Name, Region<i>_Code
//   [PARTIES]         Party<i>, Party<i>_Members (';'-joined; backslash escapes ';' and itself)
//   [CANDIDATES]      Candidate<i>_Name/_Votes/_Party[/_Region]
//   [VOTERS]          Voter<i>_FirstName/_LastName/_Phone/_Address/_UniqueId/_Age/_HasVoted[/_Region]
//   [VOTING_SUMMARY]  TotalVotesCast, VoterTurnout
//
// Saving goes Election → ElectionDocument → text; loading goes the other way.
// The document is a plain value so each half can be tested on its own.

pub mod decode;
pub mod encode;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{info, warn};

use crate::election::Election;
use crate::entities::{Candidate, Party, PartyId, Region, RegionId, Voter, INDEPENDENT};
use crate::error::{ElectionError, Result};

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ElectionInfo,
    Regions,
    Parties,
    Candidates,
    Voters,
    VotingSummary,
    /// Any header we do not understand; its lines are skipped
    Unknown,
}

impl Section {
    pub fn from_header(name: &str) -> Self {
        match name {
            "ELECTION_INFO" => Section::ElectionInfo,
            "REGIONS" => Section::Regions,
            "PARTIES" => Section::Parties,
            "CANDIDATES" => Section::Candidates,
            "VOTERS" => Section::Voters,
            "VOTING_SUMMARY" => Section::VotingSummary,
            _ => Section::Unknown,
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            Section::ElectionInfo => "[ELECTION_INFO]",
            Section::Regions => "[REGIONS]",
            Section::Parties => "[PARTIES]",
            Section::Candidates => "[CANDIDATES]",
            Section::Voters => "[VOTERS]",
            Section::VotingSummary => "[VOTING_SUMMARY]",
            Section::Unknown => "[UNKNOWN]",
        }
    }
}

// ============================================================================
// DOCUMENT SCHEMA
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElectionDocument {
    pub title: Option<String>,
    pub regions: Vec<RegionRecord>,
    pub parties: Vec<PartyRecord>,
    pub candidates: Vec<CandidateRecord>,
    pub voters: Vec<VoterRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartyRecord {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub name: String,
    pub votes: u32,
    /// Party name, or "Independent"
    pub party: String,
    /// Region code; None for the flat ballot
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoterRecord {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub unique_id: u32,
    pub age: u32,
    pub has_voted: bool,
    pub region: Option<String>,
}

/// What a load actually restored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub regions: usize,
    pub parties: usize,
    pub candidates: usize,
    pub voters: usize,
    /// Lines or records that were malformed or broke an invariant
    pub skipped: usize,
}

impl std::fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Loaded: {} regions, {} parties, {} candidates, {} voters",
            self.regions, self.parties, self.candidates, self.voters
        )
    }
}

// ============================================================================
// ELECTION ENTRY POINTS
// ============================================================================

impl Election {
    pub fn save_complete_election_data(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let document = encode::document_from(self);

        let file = File::create(path).map_err(|e| ElectionError::open_failed(path, e))?;
        let mut writer = BufWriter::new(file);
        encode::write_document(&document, &mut writer)
            .map_err(|e| ElectionError::write_failed(path, e))?;

        info!(
            path = %path.display(),
            candidates = document.candidates.len(),
            voters = document.voters.len(),
            "Complete election data saved"
        );
        Ok(())
    }

    /// Replace this election with the file's contents.
    ///
    /// If the file cannot be opened or read, the election is left untouched.
    pub fn load_complete_election_data(&mut self, path: impl AsRef<Path>) -> Result<LoadSummary> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| ElectionError::open_failed(path, e))?;
        let (document, malformed) = decode::read_document(BufReader::new(file))
            .map_err(|e| ElectionError::open_failed(path, e))?;

        let fallback_title = self.title.clone();
        let (rebuilt, mut summary) = rebuild(document, &fallback_title);
        summary.skipped += malformed;
        *self = rebuilt;

        info!(path = %path.display(), skipped = summary.skipped, "{}", summary);
        Ok(summary)
    }
}

// ============================================================================
// REBUILD
// ============================================================================

/// Turn a decoded document into a fresh Election, re-checking every invariant.
///
/// Records that would break an invariant are dropped with a warning.
pub fn rebuild(document: ElectionDocument, fallback_title: &str) -> (Election, LoadSummary) {
    let mut election = Election::new(document.title.as_deref().unwrap_or(fallback_title));
    let mut summary = LoadSummary::default();

    for record in document.regions {
        if election.region_by_code(&record.code).is_some() {
            warn!(region = %record.code, "Skipping duplicate region code");
            summary.skipped += 1;
            continue;
        }
        election.regions.push(Region::new(&record.name, &record.code));
        summary.regions += 1;
    }

    // Rosters come from the saved member lists, not from re-adding candidates
    for record in document.parties {
        let mut party = Party::new(&record.name);
        for member in &record.members {
            party.add_member(member);
        }
        election.parties.push(party);
        summary.parties += 1;
    }

    // The election-wide vote total must fit in a u32
    let mut loaded_votes: u32 = 0;
    for record in document.candidates {
        let Some(running) = loaded_votes.checked_add(record.votes) else {
            warn!(candidate = %record.name, votes = record.votes, "Skipping candidate whose votes overflow the election total");
            summary.skipped += 1;
            continue;
        };
        if restore_candidate(&mut election, record) {
            loaded_votes = running;
            summary.candidates += 1;
        } else {
            summary.skipped += 1;
        }
    }

    for record in document.voters {
        if restore_voter(&mut election, record) {
            summary.voters += 1;
        } else {
            summary.skipped += 1;
        }
    }

    (election, summary)
}

fn resolve_party(election: &Election, name: &str) -> Option<PartyId> {
    if name == INDEPENDENT {
        return None;
    }
    let found = election.find_party_by_name(name);
    if found.is_none() {
        warn!(party = name, "Candidate references unknown party; loading as independent");
    }
    found
}

/// Regional codes that no longer exist fall back to the flat list
fn resolve_region(election: &Election, code: Option<&str>) -> Option<RegionId> {
    let code = code?;
    let found = election.region_by_code(code);
    if found.is_none() {
        warn!(region = code, "Record references unknown region; loading on the flat list");
    }
    found
}

fn restore_candidate(election: &mut Election, record: CandidateRecord) -> bool {
    let party = resolve_party(election, &record.party);
    let region = resolve_region(election, record.region.as_deref());

    let candidate = Candidate::with_votes(&record.name, party, region, record.votes);

    let Some(region) = region else {
        election.candidates.push(candidate);
        return true;
    };

    if election.candidate_registry.contains_key(&record.name) {
        warn!(candidate = %record.name, "Skipping candidate already registered in a region");
        return false;
    }

    let target = &mut election.regions[region.index()];
    if target.add_candidate(candidate, &election.parties).is_err() {
        return false;
    }
    election
        .candidate_registry
        .entry(record.name)
        .or_default()
        .insert(target.code().to_string());
    true
}

fn restore_voter(election: &mut Election, record: VoterRecord) -> bool {
    if election.registered_voter_ids.contains(&record.unique_id) {
        warn!(voter_id = record.unique_id, "Skipping duplicate voter ID");
        return false;
    }

    let region = resolve_region(election, record.region.as_deref());
    let mut voter = Voter::new(
        &record.first_name,
        &record.last_name,
        &record.phone,
        &record.address,
        record.unique_id,
        record.age,
        region,
    );
    if record.has_voted && voter.mark_as_voted().is_err() {
        return false;
    }

    match region {
        Some(region) => {
            if election.regions[region.index()].add_voter(voter).is_err() {
                return false;
            }
        }
        None => election.voters.push(voter),
    }

    election.registered_voter_ids.insert(record.unique_id);
    true
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::VoterRegistration;

    fn registration(first: &str, id: &str) -> VoterRegistration {
        VoterRegistration::new(first, "Doe", "5551234567", "12 Main Street, Apt 4", id, "30")
    }

    fn create_test_election() -> Election {
        let mut election = Election::new("City Council");
        let north = election.create_region("North District", "NORTH").unwrap();
        let south = election.create_region("South District", "SOUTH").unwrap();
        let green = election.create_party("Green");
        let blue = election.create_party("Blue");

        election.add_candidate("Flat Fred", Some(blue)).unwrap();
        election.add_candidate_to_region("Alice", Some(green), north).unwrap();
        election.add_candidate_to_region("Bob", None, north).unwrap();
        election.add_candidate_to_region("Carol", Some(green), south).unwrap();

        election.register_voter(&registration("Flat", "100000000")).unwrap();
        election.register_voter_in_region(&registration("Jane", "111111111"), north).unwrap();
        election.register_voter_in_region(&registration("John", "222222222"), north).unwrap();
        election.register_voter_in_region(&registration("Sara", "333333333"), south).unwrap();

        election.cast_vote(100000000, 0).unwrap();
        election.cast_vote_in_region(111111111, 0, north).unwrap();
        election.cast_vote_in_region(333333333, 0, south).unwrap();
        election
    }

    #[test]
    fn test_section_headers() {
        assert_eq!(Section::from_header("VOTERS"), Section::Voters);
        assert_eq!(Section::from_header("SOMETHING_NEW"), Section::Unknown);
        assert_eq!(Section::Regions.header(), "[REGIONS]");
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("election.txt");

        let saved = create_test_election();
        saved.save_complete_election_data(&path).unwrap();

        let mut loaded = Election::new("placeholder");
        let summary = loaded.load_complete_election_data(&path).unwrap();

        assert_eq!(summary.regions, 2);
        assert_eq!(summary.parties, 2);
        assert_eq!(summary.candidates, 4);
        assert_eq!(summary.voters, 4);
        assert_eq!(summary.skipped, 0);

        assert_eq!(loaded.title(), "City Council");
        let party_names: Vec<&str> = loaded.parties().iter().map(|p| p.name()).collect();
        assert_eq!(party_names, vec!["Green", "Blue"]);
        assert_eq!(loaded.parties()[0].members(), saved.parties()[0].members());

        assert_eq!(loaded.candidates()[0].label(loaded.parties()), "Flat Fred (Blue)");
        assert_eq!(loaded.candidates()[0].vote_count(), 1);

        let north = loaded.region_by_code("NORTH").unwrap();
        let region = loaded.region(north).unwrap();
        assert_eq!(region.candidate_lines(loaded.parties()), vec![
            "0. Alice (Green) - Votes: 1",
            "1. Bob (Independent) - Votes: 0",
        ]);
        assert!(region.has_voter(111111111));

        let voter = loaded.find_voter(111111111).unwrap();
        assert_eq!(voter.full_name(), "Jane Doe");
        assert_eq!(voter.address(), "12 Main Street, Apt 4");
        assert_eq!(voter.age(), 30);
        assert!(voter.has_voted());
        assert!(!loaded.has_voter_voted(222222222));
    }

    #[test]
    fn test_loaded_election_keeps_enforcing_invariants() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("election.txt");
        create_test_election().save_complete_election_data(&path).unwrap();

        let mut loaded = Election::default();
        loaded.load_complete_election_data(&path).unwrap();
        let north = loaded.region_by_code("NORTH").unwrap();
        let south = loaded.region_by_code("SOUTH").unwrap();
        let green = loaded.find_party_by_name("Green").unwrap();

        let moved = loaded.add_candidate_to_region("Alice", None, south);
        assert!(matches!(moved, Err(ElectionError::CandidateAlreadyInAnotherRegion(_))));

        let dup = loaded.register_voter(&registration("Jane", "111111111"));
        assert!(matches!(dup, Err(ElectionError::DuplicateVoterId(_))));

        let twice = loaded.cast_vote_in_region(111111111, 1, north);
        assert!(matches!(twice, Err(ElectionError::AlreadyVoted(_))));

        assert!(!loaded.can_candidate_be_added_to_region("Dave", Some(green), north));
        loaded.cast_vote_in_region(222222222, 1, north).unwrap();
    }

    #[test]
    fn test_load_replaces_existing_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.txt");

        let mut flat = Election::new("Flat Only");
        flat.add_candidate("Newcomer", None).unwrap();
        flat.save_complete_election_data(&path).unwrap();

        let mut election = create_test_election();
        let summary = election.load_complete_election_data(&path).unwrap();

        assert_eq!(summary.candidates, 1);
        assert_eq!(election.title(), "Flat Only");
        let names: Vec<&str> = election.all_candidates().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Newcomer"]);
        assert_eq!(election.total_voter_count(), 0);
        assert!(election.parties().is_empty());
        assert!(election.find_voter(111111111).is_none());

        // A file without [REGIONS] leaves no region behind
        assert!(election.regions().is_empty());
        assert!(election.region_by_code("NORTH").is_none());

        // Old IDs and candidate names are free again
        election.register_voter(&registration("Jane", "111111111")).unwrap();
        let north = election.create_region("North District", "NORTH").unwrap();
        election.add_candidate_to_region("Alice", None, north).unwrap();
    }

    #[test]
    fn test_roster_names_with_separator_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.txt");

        let mut election = Election::new("E");
        let party = election.create_party("Green");
        election.add_candidate("Smith; Jones", Some(party)).unwrap();
        election.add_candidate("Lee", Some(party)).unwrap();
        election.save_complete_election_data(&path).unwrap();

        let mut loaded = Election::default();
        loaded.load_complete_election_data(&path).unwrap();

        assert_eq!(loaded.parties()[0].members().to_vec(), vec!["Smith; Jones", "Lee"]);
    }

    #[test]
    fn test_rebuild_skips_votes_that_overflow_total() {
        let document = ElectionDocument {
            title: None,
            regions: vec![],
            parties: vec![],
            candidates: vec![
                CandidateRecord { name: "A".into(), votes: u32::MAX, party: INDEPENDENT.into(), region: None },
                CandidateRecord { name: "B".into(), votes: 1, party: INDEPENDENT.into(), region: None },
                CandidateRecord { name: "C".into(), votes: 0, party: INDEPENDENT.into(), region: None },
            ],
            voters: vec![],
        };

        let (election, summary) = rebuild(document, "E");

        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.skipped, 1);
        let names: Vec<&str> = election.candidates().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(election.total_votes_cast(), u32::MAX);
    }

    #[test]
    fn test_load_missing_file_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut election = create_test_election();

        let result = election.load_complete_election_data(dir.path().join("nope.txt"));
        assert!(matches!(result, Err(ElectionError::FileOpenFailed { .. })));
        assert_eq!(election.title(), "City Council");
        assert_eq!(election.total_voter_count(), 4);
    }

    #[test]
    fn test_rebuild_drops_records_that_break_invariants() {
        let document = ElectionDocument {
            title: None,
            regions: vec![
                RegionRecord { name: "North".into(), code: "N".into() },
                RegionRecord { name: "Again".into(), code: "N".into() },
            ],
            parties: vec![PartyRecord { name: "Green".into(), members: vec![] }],
            candidates: vec![
                CandidateRecord { name: "A".into(), votes: 0, party: "Green".into(), region: Some("N".into()) },
                CandidateRecord { name: "B".into(), votes: 0, party: "Green".into(), region: Some("N".into()) },
                CandidateRecord { name: "C".into(), votes: 2, party: "Nobody".into(), region: Some("GONE".into()) },
            ],
            voters: vec![],
        };

        let (election, summary) = rebuild(document, "Fallback");

        assert_eq!(election.title(), "Fallback");
        assert_eq!(summary.regions, 1);
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.skipped, 2);

        // Unknown party and region: independent on the flat ballot
        assert_eq!(election.candidates()[0].label(election.parties()), "C (Independent)");
        assert_eq!(election.candidates()[0].vote_count(), 2);
    }
}
