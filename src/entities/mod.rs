// Entity Models - the leaves of the election graph
//
// Parties and regions live in arenas owned by the Election and are referred
// to by handle (PartyId, RegionId). Candidates and voters carry handles,
// never owning references, so the Election stays the single owner.

pub mod party;
pub mod candidate;
pub mod voter;
pub mod region;

pub use party::{Party, PartyId};
pub use candidate::{Candidate, INDEPENDENT};
pub use voter::Voter;
pub use region::{Region, RegionId};
