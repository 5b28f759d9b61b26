// 🗺️ Region Entity - one geographic subdivision of an election
//
// Owns its own ballot (ordered candidates), its voter roll, and the set of
// parties present. Enforces two regional rules locally:
// - no two candidates with the same name
// - no two candidates from the same party (parties compared by name)
//
// Cross-region candidate uniqueness needs a view of every region, so the
// Election enforces it, not the Region.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::candidate::Candidate;
use super::party::{Party, PartyId};
use super::voter::Voter;
use crate::error::{ElectionError, Result};

/// Stable handle into the Election's region arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub usize);

impl RegionId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Region {
    name: String,
    code: String,

    /// Ballot order: index i is what voters pass to cast a vote
    candidates: Vec<Candidate>,

    voters: Vec<Voter>,

    /// Parties with a candidate here (registration order, no repeats)
    parties: Vec<PartyId>,

    /// Local voter IDs for O(1) membership checks
    voter_ids: HashSet<u32>,
}

impl Region {
    pub fn new(name: &str, code: &str) -> Self {
        Region {
            name: name.to_string(),
            code: code.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    // ========================================================================
    // CANDIDATES
    // ========================================================================

    /// Check both local rules without mutating anything
    pub fn check_candidate(
        &self,
        name: &str,
        party: Option<PartyId>,
        parties: &[Party],
    ) -> Result<()> {
        if self.is_candidate_in_region(name) {
            return Err(ElectionError::DuplicateCandidateInRegion {
                name: name.to_string(),
                region: self.name.clone(),
            });
        }

        if let Some(party) = party {
            if self.has_party_candidate(party, parties) {
                let party_name = parties
                    .get(party.index())
                    .map(|p| p.name().to_string())
                    .ok_or(ElectionError::UnknownParty(party.index()))?;
                return Err(ElectionError::PartyAlreadyRepresented {
                    party: party_name,
                    region: self.name.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn add_candidate(&mut self, candidate: Candidate, parties: &[Party]) -> Result<()> {
        if let Err(e) = self.check_candidate(candidate.name(), candidate.party(), parties) {
            warn!(region = %self.code, candidate = %candidate.name(), "{}", e);
            return Err(e);
        }

        if let Some(party) = candidate.party() {
            self.register_party(party, parties);
        }

        debug!(region = %self.code, candidate = %candidate.name(), "Candidate added to region");
        self.candidates.push(candidate);
        Ok(())
    }

    /// Does any candidate here belong to a party with this party's name?
    pub fn has_party_candidate(&self, party: PartyId, parties: &[Party]) -> bool {
        let Some(wanted) = parties.get(party.index()).map(|p| p.name()) else {
            return false;
        };

        self.candidates.iter().any(|c| {
            c.party()
                .and_then(|id| parties.get(id.index()))
                .is_some_and(|p| p.name() == wanted)
        })
    }

    pub fn is_candidate_in_region(&self, name: &str) -> bool {
        self.candidates.iter().any(|c| c.name() == name)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    // ========================================================================
    // PARTIES
    // ========================================================================

    /// Idempotent: a party already present (by name) is not added twice
    pub fn register_party(&mut self, party: PartyId, parties: &[Party]) {
        if !self.has_party(party, parties) {
            self.parties.push(party);
        }
    }

    pub fn has_party(&self, party: PartyId, parties: &[Party]) -> bool {
        let Some(wanted) = parties.get(party.index()).map(|p| p.name()) else {
            return false;
        };

        self.parties
            .iter()
            .filter_map(|id| parties.get(id.index()))
            .any(|p| p.name() == wanted)
    }

    pub fn parties(&self) -> &[PartyId] {
        &self.parties
    }

    // ========================================================================
    // VOTERS
    // ========================================================================

    pub fn add_voter(&mut self, voter: Voter) -> Result<()> {
        let id = voter.unique_id();
        if self.voter_ids.contains(&id) {
            let e = ElectionError::DuplicateVoterInRegion {
                id,
                region: self.name.clone(),
            };
            warn!(region = %self.code, "{}", e);
            return Err(e);
        }

        debug!(region = %self.code, voter_id = id, "Voter assigned to region");
        self.voters.push(voter);
        self.voter_ids.insert(id);
        Ok(())
    }

    pub fn has_voter(&self, voter_id: u32) -> bool {
        self.voter_ids.contains(&voter_id)
    }

    pub fn can_voter_vote_in_region(&self, voter_id: u32) -> bool {
        self.has_voter(voter_id)
    }

    pub fn voters(&self) -> &[Voter] {
        &self.voters
    }

    pub fn voter(&self, voter_id: u32) -> Option<&Voter> {
        self.voters.iter().find(|v| v.unique_id() == voter_id)
    }

    // ========================================================================
    // VOTING
    // ========================================================================

    /// All checks first, then both mutations together
    pub fn record_vote(&mut self, voter_id: u32, candidate_index: usize) -> Result<&Candidate> {
        if !self.can_voter_vote_in_region(voter_id) {
            return Err(ElectionError::VoterNotInRegion {
                id: voter_id,
                region: self.name.clone(),
            });
        }

        let count = self.candidates.len();
        let voter = self
            .voters
            .iter_mut()
            .find(|v| v.unique_id() == voter_id)
            .ok_or_else(|| ElectionError::VoterNotInRegion {
                id: voter_id,
                region: self.name.clone(),
            })?;

        if voter.has_voted() {
            return Err(ElectionError::AlreadyVoted(voter_id));
        }
        if candidate_index >= count {
            return Err(ElectionError::InvalidCandidateIndex {
                index: candidate_index,
                count,
            });
        }

        voter.mark_as_voted()?;
        let candidate = &mut self.candidates[candidate_index];
        candidate.receive_vote();
        Ok(candidate)
    }

    pub fn total_votes(&self) -> u32 {
        crate::results::total_votes(&self.candidates)
    }

    // ========================================================================
    // LISTINGS
    // ========================================================================

    /// "North District (NORTH) - Parties: 1, Candidates: 2, Voters: 3"
    pub fn summary_line(&self) -> String {
        format!(
            "{} ({}) - Parties: {}, Candidates: {}, Voters: {}",
            self.name,
            self.code,
            self.parties.len(),
            self.candidates.len(),
            self.voters.len()
        )
    }

    pub fn candidate_lines(&self, parties: &[Party]) -> Vec<String> {
        self.candidates
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {} - Votes: {}", i, c.label(parties), c.vote_count()))
            .collect()
    }

    pub fn voter_lines(&self) -> Vec<String> {
        self.voters
            .iter()
            .map(|v| {
                let mut line = format!("{} (ID: {})", v.full_name(), v.unique_id());
                if v.has_voted() {
                    line.push_str(" [VOTED]");
                }
                line
            })
            .collect()
    }
}
