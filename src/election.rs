// 🗳️ Election Aggregate - the root of the entity graph
//
// Owns the party and region arenas, the election-wide voter-ID set, and the
// candidate-name registry. Every mutation goes through a method here, and
// every method checks all of its preconditions before touching state, so a
// rejected call leaves the election exactly as it was.
//
// Two paths coexist:
// - regional: add_candidate_to_region / register_voter_in_region / cast_vote_in_region
// - legacy flat: add_candidate / register_voter / cast_vote (no regional checks)

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::io::Write as _;
use std::path::Path;
use tracing::{info, warn};

use crate::entities::{Candidate, Party, PartyId, Region, RegionId, Voter};
use crate::error::{ElectionError, Result};
use crate::results::{self, ResultsReport};
use crate::validation::{validate_voter_input, VoterRegistration};

#[derive(Debug, Clone, Default)]
pub struct Election {
    pub(crate) title: String,

    /// Legacy flat ballot (no region)
    pub(crate) candidates: Vec<Candidate>,

    /// Legacy flat voter roll (no region)
    pub(crate) voters: Vec<Voter>,

    pub(crate) parties: Vec<Party>,
    pub(crate) regions: Vec<Region>,

    /// Every registered voter ID, flat and regional
    pub(crate) registered_voter_ids: HashSet<u32>,

    /// Candidate name → codes of the regions it was registered in (append-only)
    pub(crate) candidate_registry: HashMap<String, BTreeSet<String>>,
}

impl Election {
    pub fn new(title: &str) -> Self {
        Election {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    // ========================================================================
    // REGIONS
    // ========================================================================

    pub fn create_region(&mut self, name: &str, code: &str) -> Result<RegionId> {
        if self.region_by_code(code).is_some() {
            let e = ElectionError::DuplicateRegionCode(code.to_string());
            warn!("{}", e);
            return Err(e);
        }

        let id = RegionId(self.regions.len());
        self.regions.push(Region::new(name, code));
        info!(region = code, "Region '{}' created", name);
        Ok(id)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    pub fn region_by_code(&self, code: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .position(|r| r.code() == code)
            .map(RegionId)
    }

    /// 1-based lookup, as shown in region listings
    pub fn region_by_index(&self, index: usize) -> Option<RegionId> {
        (index >= 1 && index <= self.regions.len()).then(|| RegionId(index - 1))
    }

    fn region_ref(&self, id: RegionId) -> Result<&Region> {
        self.regions
            .get(id.index())
            .ok_or_else(|| ElectionError::UnknownRegion(format!("#{}", id.index())))
    }

    fn check_party(&self, party: Option<PartyId>) -> Result<()> {
        match party {
            Some(id) if id.index() >= self.parties.len() => {
                Err(ElectionError::UnknownParty(id.index()))
            }
            _ => Ok(()),
        }
    }

    // ========================================================================
    // PARTIES
    // ========================================================================

    /// Always creates a new party, even if the name is already taken
    pub fn create_party(&mut self, name: &str) -> PartyId {
        let id = PartyId(self.parties.len());
        self.parties.push(Party::new(name));
        info!("Party '{}' created", name);
        id
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn party(&self, id: PartyId) -> Option<&Party> {
        self.parties.get(id.index())
    }

    /// 1-based lookup, as shown in party listings
    pub fn party_by_index(&self, index: usize) -> Option<PartyId> {
        (index >= 1 && index <= self.parties.len()).then(|| PartyId(index - 1))
    }

    /// First party carrying this exact name
    pub fn find_party_by_name(&self, name: &str) -> Option<PartyId> {
        self.parties
            .iter()
            .position(|p| p.name() == name)
            .map(PartyId)
    }

    // ========================================================================
    // CANDIDATES
    // ========================================================================

    /// Legacy flat registration: no regional checks at all
    pub fn add_candidate(&mut self, name: &str, party: Option<PartyId>) -> Result<()> {
        self.check_party(party)?;

        self.candidates.push(Candidate::new(name, party, None));
        if let Some(id) = party {
            self.parties[id.index()].add_member(name);
        }

        info!(candidate = name, "Candidate added to flat ballot");
        Ok(())
    }

    /// Regional registration, enforcing all three candidate rules
    pub fn add_candidate_to_region(
        &mut self,
        name: &str,
        party: Option<PartyId>,
        region: RegionId,
    ) -> Result<()> {
        self.region_ref(region)?;
        self.check_party(party)?;

        // The name is reserved once used, even in the same region
        if self.candidate_registry.contains_key(name) {
            let e = ElectionError::CandidateAlreadyInAnotherRegion(name.to_string());
            warn!("{}", e);
            return Err(e);
        }

        let target = &mut self.regions[region.index()];
        target.add_candidate(Candidate::new(name, party, Some(region)), &self.parties)?;

        let code = target.code().to_string();
        if let Some(id) = party {
            self.parties[id.index()].add_member(name);
        }
        self.candidate_registry
            .entry(name.to_string())
            .or_default()
            .insert(code.clone());

        info!(candidate = name, region = %code, "Candidate registered in region");
        Ok(())
    }

    /// Would add_candidate_to_region succeed? (no side effects)
    pub fn can_candidate_be_added_to_region(
        &self,
        name: &str,
        party: Option<PartyId>,
        region: RegionId,
    ) -> bool {
        let Ok(target) = self.region_ref(region) else {
            return false;
        };

        self.check_party(party).is_ok()
            && !self.candidate_registry.contains_key(name)
            && target.check_candidate(name, party, &self.parties).is_ok()
    }

    /// Region codes this candidate name is registered under
    pub fn regions_for_candidate(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.candidate_registry.get(name)
    }

    /// Flat ballot only
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Flat ballot followed by every region's ballot
    pub fn all_candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates
            .iter()
            .chain(self.regions.iter().flat_map(|r| r.candidates()))
    }

    // ========================================================================
    // VOTERS
    // ========================================================================

    pub fn register_voter(&mut self, input: &VoterRegistration) -> Result<u32> {
        let voter = self.prepare_voter(input, None)?;
        let id = voter.unique_id();

        self.voters.push(voter);
        self.registered_voter_ids.insert(id);

        info!(voter_id = id, "Voter registered");
        Ok(id)
    }

    pub fn register_voter_in_region(
        &mut self,
        input: &VoterRegistration,
        region: RegionId,
    ) -> Result<u32> {
        self.region_ref(region)?;
        let voter = self.prepare_voter(input, Some(region))?;
        let id = voter.unique_id();

        let target = &mut self.regions[region.index()];
        target.add_voter(voter)?;
        self.registered_voter_ids.insert(id);

        info!(voter_id = id, region = %target.code(), "Voter registered in region");
        Ok(id)
    }

    /// Validate fields, parse numbers, and check the election-wide ID set
    fn prepare_voter(&self, input: &VoterRegistration, region: Option<RegionId>) -> Result<Voter> {
        if let Err(errors) = validate_voter_input(input) {
            warn!(fields = errors.len(), "Voter registration failed validation");
            return Err(ElectionError::ValidationFailed(errors));
        }

        let (unique_id, age) = parse_numbers(input)?;

        if self.registered_voter_ids.contains(&unique_id) {
            let e = ElectionError::DuplicateVoterId(unique_id);
            warn!("{}", e);
            return Err(e);
        }

        Ok(Voter::new(
            input.first_name.trim(),
            input.last_name.trim(),
            input.phone.trim(),
            input.address.trim(),
            unique_id,
            age,
            region,
        ))
    }

    /// Flat voter roll only
    pub fn voters(&self) -> &[Voter] {
        &self.voters
    }

    /// Flat voters followed by every region's voters
    pub fn all_voters(&self) -> impl Iterator<Item = &Voter> {
        self.voters
            .iter()
            .chain(self.regions.iter().flat_map(|r| r.voters()))
    }

    pub fn find_voter(&self, voter_id: u32) -> Option<&Voter> {
        self.all_voters().find(|v| v.unique_id() == voter_id)
    }

    pub fn is_voter_registered(&self, voter_id: u32) -> bool {
        self.registered_voter_ids.contains(&voter_id)
    }

    pub fn has_voter_voted(&self, voter_id: u32) -> bool {
        self.find_voter(voter_id).is_some_and(|v| v.has_voted())
    }

    pub fn is_voter_in_region(&self, voter_id: u32, region: RegionId) -> bool {
        self.region(region).is_some_and(|r| r.has_voter(voter_id))
    }

    // ========================================================================
    // VOTING
    // ========================================================================

    /// Legacy flat vote: the voter must be on the flat roll
    pub fn cast_vote(&mut self, voter_id: u32, candidate_index: usize) -> Result<()> {
        let count = self.candidates.len();
        let voter = self
            .voters
            .iter_mut()
            .find(|v| v.unique_id() == voter_id)
            .ok_or(ElectionError::VoterNotFound(voter_id))
            .inspect_err(|e| warn!("Voting failed: {}", e))?;

        if voter.has_voted() {
            let e = ElectionError::AlreadyVoted(voter_id);
            warn!("Voting failed: {}", e);
            return Err(e);
        }
        if candidate_index >= count {
            let e = ElectionError::InvalidCandidateIndex {
                index: candidate_index,
                count,
            };
            warn!("Voting failed: {}", e);
            return Err(e);
        }

        voter.mark_as_voted()?;
        self.candidates[candidate_index].receive_vote();

        info!(voter_id, candidate_index, "Vote cast");
        Ok(())
    }

    /// Regional vote: only voters registered in this region may vote here
    pub fn cast_vote_in_region(
        &mut self,
        voter_id: u32,
        candidate_index: usize,
        region: RegionId,
    ) -> Result<()> {
        self.region_ref(region)?;
        let target = &mut self.regions[region.index()];
        let code = target.code().to_string();

        target
            .record_vote(voter_id, candidate_index)
            .inspect_err(|e| warn!(region = %code, "Voting failed: {}", e))?;

        info!(voter_id, candidate_index, region = %code, "Vote cast in region");
        Ok(())
    }

    // ========================================================================
    // RESULTS
    // ========================================================================

    /// Flat-ballot results
    pub fn results(&self) -> ResultsReport {
        results::tally(
            &format!("Election Results: {}", self.title),
            &self.candidates,
            &self.parties,
            self.voters.len(),
        )
    }

    pub fn results_in_region(&self, region: RegionId) -> Result<ResultsReport> {
        let target = self.region_ref(region)?;
        Ok(results::tally(
            &format!("Election Results for Region: {}", target.name()),
            target.candidates(),
            &self.parties,
            target.voters().len(),
        ))
    }

    pub fn display_results(&self) -> String {
        self.results().to_string()
    }

    pub fn display_results_in_region(&self, region: RegionId) -> Result<String> {
        Ok(self.results_in_region(region)?.to_string())
    }

    /// Votes across every ballot, flat and regional
    pub fn total_votes_cast(&self) -> u32 {
        results::sum_votes(self.all_candidates().map(|c| c.vote_count()))
    }

    pub fn total_voter_count(&self) -> usize {
        self.voters.len() + self.regions.iter().map(|r| r.voters().len()).sum::<usize>()
    }

    /// Plain-text results report: flat ballot, then one block per region
    pub fn save_results_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let report = self.render_results_report();

        let mut file = std::fs::File::create(path).map_err(|e| ElectionError::open_failed(path, e))?;
        file.write_all(report.as_bytes())
            .map_err(|e| ElectionError::write_failed(path, e))?;

        info!(path = %path.display(), "Results saved");
        Ok(())
    }

    fn render_results_report(&self) -> String {
        ResultsFile {
            election: self,
            generated: Utc::now(),
        }
        .to_string()
    }

    // ========================================================================
    // LISTINGS
    // ========================================================================

    /// Flat ballot with 0-based ballot indices
    pub fn candidate_lines(&self) -> Vec<String> {
        self.candidates
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {} - Votes: {}", i, c.label(&self.parties), c.vote_count()))
            .collect()
    }

    pub fn candidate_lines_in_region(&self, region: RegionId) -> Result<Vec<String>> {
        Ok(self.region_ref(region)?.candidate_lines(&self.parties))
    }

    /// Flat voter roll; never shows who a voter chose
    pub fn voter_lines(&self) -> Vec<String> {
        self.voters
            .iter()
            .map(|v| {
                format!(
                    "ID: {} | {} | Age: {} | Voted: {}",
                    v.unique_id(),
                    v.full_name(),
                    v.age(),
                    if v.has_voted() { "Yes" } else { "No" }
                )
            })
            .collect()
    }

    pub fn voter_lines_in_region(&self, region: RegionId) -> Result<Vec<String>> {
        Ok(self.region_ref(region)?.voter_lines())
    }

    pub fn party_lines(&self) -> Vec<String> {
        self.parties
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {} (Members: {})", i + 1, p.name(), p.members().len()))
            .collect()
    }

    pub fn region_lines(&self) -> Vec<String> {
        self.regions
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}. {}", i + 1, r.summary_line()))
            .collect()
    }
}

/// Body of save_results_to_file: flat ballot, then one block per region
struct ResultsFile<'a> {
    election: &'a Election,
    generated: DateTime<Utc>,
}

impl fmt::Display for ResultsFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let election = self.election;
        let parties = election.parties.as_slice();

        writeln!(f, "Election Results: {}", election.title)?;
        writeln!(f, "================================")?;
        writeln!(f, "Generated: {}", self.generated.to_rfc3339())?;
        writeln!(f)?;

        let global = election.results();
        writeln!(f, "Total votes cast: {}", global.total_votes)?;
        writeln!(f, "Total registered voters: {}", global.registered_voters)?;
        writeln!(f)?;
        for candidate in &election.candidates {
            writeln!(f, "{}: {} votes", candidate.label(parties), candidate.vote_count())?;
        }

        for region in &election.regions {
            writeln!(f)?;
            writeln!(f, "Region: {} ({})", region.name(), region.code())?;
            writeln!(f, "--------------------------------")?;
            writeln!(f, "Total votes cast: {}", region.total_votes())?;
            writeln!(f, "Total registered voters: {}", region.voters().len())?;
            for candidate in region.candidates() {
                writeln!(f, "{}: {} votes", candidate.label(parties), candidate.vote_count())?;
            }
        }
        Ok(())
    }
}

/// ID and age from already-validated strings
fn parse_numbers(input: &VoterRegistration) -> Result<(u32, u32)> {
    let unique_id = input.unique_id.trim().parse::<u32>();
    let age = input.age.trim().parse::<u32>();

    match (unique_id, age) {
        (Ok(unique_id), Ok(age)) => Ok((unique_id, age)),
        _ => Err(ElectionError::ValidationFailed(vec![
            crate::validation::FieldError::new("unique_id", "Invalid number format in ID or age."),
        ])),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(id: &str, age: &str) -> VoterRegistration {
        VoterRegistration::new("Jane", "Doe", "5551234567", "12 Main Street", id, age)
    }

    /// Election "E" with NORTH/SOUTH and party "P"
    fn create_test_election() -> (Election, RegionId, RegionId, PartyId) {
        let mut election = Election::new("E");
        let north = election.create_region("North District", "NORTH").unwrap();
        let south = election.create_region("South District", "SOUTH").unwrap();
        let party = election.create_party("P");
        (election, north, south, party)
    }

    #[test]
    fn test_regional_scenario() {
        let (mut election, north, south, p) = create_test_election();

        assert!(election.add_candidate_to_region("Alice", Some(p), north).is_ok());

        let moved = election.add_candidate_to_region("Alice", Some(p), south);
        assert!(matches!(moved, Err(ElectionError::CandidateAlreadyInAnotherRegion(_))));

        let same_party = election.add_candidate_to_region("Bob", Some(p), north);
        assert!(matches!(same_party, Err(ElectionError::PartyAlreadyRepresented { .. })));

        let id = election
            .register_voter_in_region(&registration("111111111", "25"), north)
            .unwrap();
        assert_eq!(id, 111111111);

        let wrong_region = election.cast_vote_in_region(111111111, 0, south);
        assert!(matches!(wrong_region, Err(ElectionError::VoterNotInRegion { .. })));

        election.cast_vote_in_region(111111111, 0, north).unwrap();
        let alice = &election.region(north).unwrap().candidates()[0];
        assert_eq!(alice.name(), "Alice");
        assert_eq!(alice.vote_count(), 1);

        let twice = election.cast_vote_in_region(111111111, 0, north);
        assert!(matches!(twice, Err(ElectionError::AlreadyVoted(111111111))));
        assert_eq!(election.region(north).unwrap().candidates()[0].vote_count(), 1);
    }

    #[test]
    fn test_duplicate_region_code_rejected() {
        let (mut election, _, _, _) = create_test_election();
        let result = election.create_region("Another North", "NORTH");
        assert!(matches!(result, Err(ElectionError::DuplicateRegionCode(_))));
        assert_eq!(election.regions().len(), 2);
    }

    #[test]
    fn test_candidate_name_reserved_even_in_same_region() {
        let (mut election, north, _, _) = create_test_election();
        election.add_candidate_to_region("Alice", None, north).unwrap();

        let again = election.add_candidate_to_region("Alice", None, north);
        assert!(matches!(again, Err(ElectionError::CandidateAlreadyInAnotherRegion(_))));
        assert_eq!(election.region(north).unwrap().candidates().len(), 1);

        let codes = election.regions_for_candidate("Alice").unwrap();
        assert_eq!(codes.iter().collect::<Vec<_>>(), vec!["NORTH"]);
    }

    #[test]
    fn test_rejected_party_candidate_leaves_state_unchanged() {
        let (mut election, north, _, p) = create_test_election();
        election.add_candidate_to_region("Alice", Some(p), north).unwrap();

        assert!(election.add_candidate_to_region("Bob", Some(p), north).is_err());

        assert_eq!(election.party(p).unwrap().members(), ["Alice".to_string()]);
        assert!(election.regions_for_candidate("Bob").is_none());
        // Bob was never reserved, so another region can still take him
        assert!(!election.can_candidate_be_added_to_region("Bob", Some(p), north));
        assert!(election.can_candidate_be_added_to_region("Bob", None, north));
    }

    #[test]
    fn test_same_party_allowed_in_different_regions() {
        let (mut election, north, south, p) = create_test_election();
        election.add_candidate_to_region("Alice", Some(p), north).unwrap();
        election.add_candidate_to_region("Bob", Some(p), south).unwrap();

        assert_eq!(
            election.party(p).unwrap().members(),
            ["Alice".to_string(), "Bob".to_string()]
        );
    }

    #[test]
    fn test_create_party_never_deduplicates() {
        let mut election = Election::new("E");
        let first = election.create_party("Green");
        let second = election.create_party("Green");

        assert_ne!(first, second);
        assert_eq!(election.parties().len(), 2);
        assert_eq!(election.find_party_by_name("Green"), Some(first));
        assert_eq!(election.party_by_index(2), Some(second));
        assert_eq!(election.party_by_index(0), None);
    }

    #[test]
    fn test_unknown_handles_rejected() {
        let mut election = Election::new("E");
        let region = election.create_region("North District", "NORTH").unwrap();

        let bad_party = election.add_candidate_to_region("Alice", Some(PartyId(9)), region);
        assert!(matches!(bad_party, Err(ElectionError::UnknownParty(9))));

        let bad_region = election.add_candidate_to_region("Alice", None, RegionId(9));
        assert!(matches!(bad_region, Err(ElectionError::UnknownRegion(_))));
        assert!(election.regions_for_candidate("Alice").is_none());
    }

    #[test]
    fn test_registration_boundaries() {
        let mut election = Election::new("E");

        assert!(election.register_voter(&registration("100000001", "18")).is_ok());
        assert!(election.register_voter(&registration("100000002", "17")).is_err());
        assert!(election.register_voter(&registration("10000003", "30")).is_err());
        assert!(election.register_voter(&registration("1000000004", "30")).is_err());
        assert_eq!(election.voters().len(), 1);
    }

    #[test]
    fn test_validation_reports_all_fields() {
        let mut election = Election::new("E");
        let input = VoterRegistration::new("J", "Doe", "555", "12 Main Street", "111111111", "17");

        let err = election.register_voter(&input).unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["first_name", "phone", "age"]);
        assert!(!election.is_voter_registered(111111111));
    }

    #[test]
    fn test_voter_id_unique_across_regions_and_flat_roll() {
        let (mut election, north, south, _) = create_test_election();
        election
            .register_voter_in_region(&registration("111111111", "25"), north)
            .unwrap();

        let other_region = election.register_voter_in_region(&registration("111111111", "40"), south);
        assert!(matches!(other_region, Err(ElectionError::DuplicateVoterId(111111111))));

        let flat = election.register_voter(&registration("111111111", "40"));
        assert!(matches!(flat, Err(ElectionError::DuplicateVoterId(111111111))));

        assert!(election.is_voter_in_region(111111111, north));
        assert!(!election.is_voter_in_region(111111111, south));
        assert_eq!(election.total_voter_count(), 1);
    }

    #[test]
    fn test_registered_fields_are_trimmed() {
        let mut election = Election::new("E");
        let input = VoterRegistration::new(" Jane ", "Doe", "5551234567 ", " 12 Main Street", " 123456789", "30 ");
        election.register_voter(&input).unwrap();

        let voter = election.find_voter(123456789).unwrap();
        assert_eq!(voter.first_name(), "Jane");
        assert_eq!(voter.phone(), "5551234567");
        assert_eq!(voter.address(), "12 Main Street");
        assert_eq!(voter.age(), 30);
    }

    #[test]
    fn test_flat_vote_state_machine() {
        let mut election = Election::new("E");
        election.add_candidate("Alice", None).unwrap();
        election.register_voter(&registration("111111111", "25")).unwrap();

        assert!(matches!(
            election.cast_vote(222222222, 0),
            Err(ElectionError::VoterNotFound(222222222))
        ));
        assert!(matches!(
            election.cast_vote(111111111, 1),
            Err(ElectionError::InvalidCandidateIndex { index: 1, count: 1 })
        ));
        assert!(!election.has_voter_voted(111111111));

        election.cast_vote(111111111, 0).unwrap();
        assert!(election.has_voter_voted(111111111));
        assert_eq!(election.candidates()[0].vote_count(), 1);

        assert!(matches!(
            election.cast_vote(111111111, 0),
            Err(ElectionError::AlreadyVoted(111111111))
        ));
        assert_eq!(election.candidates()[0].vote_count(), 1);
    }

    #[test]
    fn test_regional_voter_cannot_use_flat_ballot() {
        let (mut election, north, _, _) = create_test_election();
        election.add_candidate("Flat Candidate", None).unwrap();
        election
            .register_voter_in_region(&registration("111111111", "25"), north)
            .unwrap();

        let result = election.cast_vote(111111111, 0);
        assert!(matches!(result, Err(ElectionError::VoterNotFound(_))));
    }

    #[test]
    fn test_legacy_add_candidate_adds_member() {
        let mut election = Election::new("E");
        let party = election.create_party("Green");
        election.add_candidate("Alice", Some(party)).unwrap();
        election.add_candidate("Bob", Some(party)).unwrap();

        assert_eq!(election.candidates().len(), 2);
        assert_eq!(election.party(party).unwrap().members().len(), 2);
        assert!(election.regions_for_candidate("Alice").is_none());
    }

    #[test]
    fn test_results_in_region() {
        let (mut election, north, _, p) = create_test_election();
        election.add_candidate_to_region("Alice", Some(p), north).unwrap();
        election.add_candidate_to_region("Bob", None, north).unwrap();
        election
            .register_voter_in_region(&registration("111111111", "25"), north)
            .unwrap();
        election
            .register_voter_in_region(&registration("222222222", "25"), north)
            .unwrap();
        election.cast_vote_in_region(111111111, 1, north).unwrap();

        let report = election.results_in_region(north).unwrap();
        assert_eq!(report.heading, "Election Results for Region: North District");
        assert_eq!(report.total_votes, 1);
        assert_eq!(report.registered_voters, 2);
        assert_eq!(report.rows[0].label(), "Bob (Independent)");
        assert_eq!(report.rows[1].label(), "Alice (P)");

        let first = election.display_results_in_region(north).unwrap();
        let second = election.display_results_in_region(north).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("1. Bob (Independent) - 1 votes (100.0%)"));
        assert_eq!(election.total_votes_cast(), 1);
    }

    #[test]
    fn test_listings() {
        let (mut election, north, _, p) = create_test_election();
        election.add_candidate("Flat", None).unwrap();
        election.add_candidate_to_region("Alice", Some(p), north).unwrap();
        election.register_voter(&registration("111111111", "25")).unwrap();

        assert_eq!(election.candidate_lines(), vec!["0. Flat (Independent) - Votes: 0"]);
        assert_eq!(
            election.candidate_lines_in_region(north).unwrap(),
            vec!["0. Alice (P) - Votes: 0"]
        );
        assert_eq!(
            election.voter_lines(),
            vec!["ID: 111111111 | Jane Doe | Age: 25 | Voted: No"]
        );
        assert_eq!(election.party_lines(), vec!["1. P (Members: 1)"]);
        assert_eq!(election.region_lines().len(), 2);
        assert_eq!(election.region_by_index(1), Some(north));
        assert_eq!(election.region_by_index(3), None);
    }

    #[test]
    fn test_save_results_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        let (mut election, north, _, p) = create_test_election();
        election.add_candidate_to_region("Alice", Some(p), north).unwrap();
        election.save_results_to_file(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Election Results: E\n"));
        assert!(contents.contains("Generated: "));
        assert!(contents.contains("Region: North District (NORTH)"));
        assert!(contents.contains("Alice (P): 0 votes"));
    }

    #[test]
    fn test_results_file_layout() {
        let (mut election, north, _, p) = create_test_election();
        election.add_candidate("Bob", None).unwrap();
        election.add_candidate_to_region("Alice", Some(p), north).unwrap();
        let generated = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);

        let text = ResultsFile { election: &election, generated }.to_string();

        let expected = "Election Results: E\n\
                        ================================\n\
                        Generated: 2026-01-02T03:04:05+00:00\n\
                        \n\
                        Total votes cast: 0\n\
                        Total registered voters: 0\n\
                        \n\
                        Bob (Independent): 0 votes\n\
                        \n\
                        Region: North District (NORTH)\n\
                        --------------------------------\n\
                        Total votes cast: 0\n\
                        Total registered voters: 0\n\
                        Alice (P): 0 votes\n\
                        \n\
                        Region: South District (SOUTH)\n\
                        --------------------------------\n\
                        Total votes cast: 0\n\
                        Total registered voters: 0\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_save_results_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("results.txt");

        let result = Election::new("E").save_results_to_file(&path);
        assert!(matches!(result, Err(ElectionError::FileOpenFailed { .. })));
    }
}
