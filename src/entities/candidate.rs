// 🗳️ Candidate Entity - name, optional party, optional region, vote counter
//
// The vote count only ever grows: the single mutation is receive_vote().

use serde::{Deserialize, Serialize};

use super::party::{Party, PartyId};
use super::region::RegionId;

/// Label used for candidates without a party
pub const INDEPENDENT: &str = "Independent";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    name: String,

    /// Party handle (shared with other candidates, not owned)
    party: Option<PartyId>,

    /// Region handle (None on the legacy flat path)
    region: Option<RegionId>,

    votes: u32,
}

impl Candidate {
    pub fn new(name: &str, party: Option<PartyId>, region: Option<RegionId>) -> Self {
        Candidate {
            name: name.to_string(),
            party,
            region,
            votes: 0,
        }
    }

    /// Rebuild a candidate from a snapshot with its saved count
    pub(crate) fn with_votes(
        name: &str,
        party: Option<PartyId>,
        region: Option<RegionId>,
        votes: u32,
    ) -> Self {
        Candidate {
            votes,
            ..Candidate::new(name, party, region)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn party(&self) -> Option<PartyId> {
        self.party
    }

    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    pub fn is_in_region(&self, region: RegionId) -> bool {
        self.region == Some(region)
    }

    pub fn is_independent(&self) -> bool {
        self.party.is_none()
    }

    pub fn vote_count(&self) -> u32 {
        self.votes
    }

    pub fn receive_vote(&mut self) {
        self.votes = self.votes.saturating_add(1);
    }

    /// Party name resolved against the arena, or "Independent"
    pub fn party_name<'a>(&self, parties: &'a [Party]) -> &'a str {
        self.party
            .and_then(|id| parties.get(id.index()))
            .map(|p| p.name())
            .unwrap_or(INDEPENDENT)
    }

    /// "Name (Party)" or "Name (Independent)"
    pub fn label(&self, parties: &[Party]) -> String {
        format!("{} ({})", self.name, self.party_name(parties))
    }
}
