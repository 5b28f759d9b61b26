// 🏛️ Party Entity - named affiliation with a member roster
//
// A party never votes and never belongs to a region; regions only record
// that a party is present. Parties live in the Election's arena and are
// referenced everywhere else through a PartyId handle.

use serde::{Deserialize, Serialize};

/// Stable handle into the Election's party arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartyId(pub usize);

impl PartyId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Party name (case-sensitive, fixed at creation)
    name: String,

    /// Candidate names in the order they joined
    members: Vec<String>,
}

impl Party {
    pub fn new(name: &str) -> Self {
        Party {
            name: name.to_string(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn add_member(&mut self, member: &str) {
        self.members.push(member.to_string());
    }

    /// Members joined with `;` (file and CSV representation)
    pub fn members_joined(&self) -> String {
        self.members.join(";")
    }
}
