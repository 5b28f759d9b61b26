// 🧑 Voter Entity - identity, eligibility, and the one-way voted flag
//
// State machine: Registered(unvoted) → Voted. There is no way back.

use serde::{Deserialize, Serialize};

use super::region::RegionId;
use crate::error::{ElectionError, Result};
use crate::validation::MIN_AGE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    first_name: String,
    last_name: String,
    phone: String,
    address: String,

    /// Globally unique across the whole election
    unique_id: u32,

    age: u32,

    /// Region handle (None on the legacy flat path)
    region: Option<RegionId>,

    voted: bool,
}

impl Voter {
    pub fn new(
        first_name: &str,
        last_name: &str,
        phone: &str,
        address: &str,
        unique_id: u32,
        age: u32,
        region: Option<RegionId>,
    ) -> Self {
        Voter {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            unique_id,
            age,
            region,
            voted: false,
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn unique_id(&self) -> u32 {
        self.unique_id
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    pub fn can_vote_in_region(&self, region: RegionId) -> bool {
        self.region == Some(region)
    }

    pub fn has_voted(&self) -> bool {
        self.voted
    }

    pub fn is_eligible(&self) -> bool {
        self.age >= MIN_AGE
    }

    /// Flip the voted flag; a second call is rejected
    pub fn mark_as_voted(&mut self) -> Result<()> {
        if self.voted {
            return Err(ElectionError::AlreadyVoted(self.unique_id));
        }
        self.voted = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_voter() -> Voter {
        Voter::new("Jane", "Doe", "5551234567", "12 Main Street", 111111111, 25, None)
    }

    #[test]
    fn test_voter_creation() {
        let voter = create_test_voter();
        assert_eq!(voter.full_name(), "Jane Doe");
        assert_eq!(voter.unique_id(), 111111111);
        assert!(voter.is_eligible());
        assert!(!voter.has_voted());
    }

    #[test]
    fn test_mark_as_voted_only_once() {
        let mut voter = create_test_voter();
        assert!(voter.mark_as_voted().is_ok());
        assert!(voter.has_voted());

        let second = voter.mark_as_voted();
        assert!(matches!(second, Err(ElectionError::AlreadyVoted(111111111))));
        assert!(voter.has_voted());
    }

    #[test]
    fn test_region_membership() {
        let voter = Voter::new("Jane", "Doe", "5551234567", "12 Main St", 1, 30, Some(RegionId(2)));
        assert!(voter.can_vote_in_region(RegionId(2)));
        assert!(!voter.can_vote_in_region(RegionId(0)));
    }
}
