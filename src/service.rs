// 🏛️ Election Service - multi-election registry behind one lock
//
// Maps named operations onto Election methods and wraps every outcome in a
// uniform ServiceResponse envelope. All routed calls, including the
// check-then-write vote sequence, run while holding the registry mutex.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::election::Election;
use crate::entities::{PartyId, RegionId};
use crate::error::ElectionError;
use crate::validation::VoterRegistration;

// ============================================================================
// RESPONSE ENVELOPE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub data: Vec<String>,
}

impl ServiceResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Vec::new(),
        }
    }

    pub fn ok_with(message: impl Into<String>, data: Vec<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Vec::new(),
        }
    }

    /// Error envelope; validation failures list each field problem in `data`
    pub fn failure(err: &ElectionError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            data: err.field_errors().iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// SERVICE
// ============================================================================

#[derive(Debug)]
struct ServiceState {
    elections: BTreeMap<u32, Election>,
    next_id: u32,
    running: bool,
}

impl Default for ServiceState {
    fn default() -> Self {
        ServiceState {
            elections: BTreeMap::new(),
            next_id: 1,
            running: false,
        }
    }
}

#[derive(Debug)]
pub struct ElectionService {
    state: Mutex<ServiceState>,
    config: AppConfig,
}

impl ElectionService {
    pub fn new(config: AppConfig) -> Self {
        ElectionService {
            state: Mutex::new(ServiceState::default()),
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Every operation validates before it mutates, so a panicked holder
    /// cannot have left an election half-updated.
    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_election<F>(&self, election_id: u32, f: F) -> ServiceResponse
    where
        F: FnOnce(&mut Election) -> ServiceResponse,
    {
        let mut state = self.lock();
        match state.elections.get_mut(&election_id) {
            Some(election) => f(election),
            None => {
                warn!(election_id, "Election not found");
                ServiceResponse::error("Election not found.")
            }
        }
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    pub fn start(&self) -> ServiceResponse {
        let mut state = self.lock();
        if state.running {
            return ServiceResponse::ok("Service is already running.");
        }
        state.running = true;
        info!("Election service started");
        ServiceResponse::ok("Service started.")
    }

    /// Snapshot every live election, then mark the service stopped.
    ///
    /// Writes `election_<id>_shutdown.txt` per election and the shared file
    /// (holding the lowest-numbered election) into the data directory.
    pub fn stop(&self) -> ServiceResponse {
        let mut state = self.lock();
        if !state.running {
            return ServiceResponse::ok("Service is not running.");
        }

        let mut saved = Vec::new();
        let mut failures = Vec::new();

        for (id, election) in &state.elections {
            let path = self.config.shutdown_snapshot_path(*id);
            match election.save_complete_election_data(&path) {
                Ok(()) => saved.push(path.display().to_string()),
                Err(e) => {
                    warn!(election_id = id, "Shutdown snapshot failed: {}", e);
                    failures.push(e.to_string());
                }
            }
        }

        if let Some(election) = state.elections.values().next() {
            let path = self.config.shared_file_path();
            match election.save_complete_election_data(&path) {
                Ok(()) => saved.push(path.display().to_string()),
                Err(e) => {
                    warn!("Shared snapshot failed: {}", e);
                    failures.push(e.to_string());
                }
            }
        }

        state.running = false;
        info!(snapshots = saved.len(), "Election service stopped");

        if failures.is_empty() {
            ServiceResponse::ok_with("Service stopped.", saved)
        } else {
            ServiceResponse {
                success: false,
                message: "Service stopped, but some snapshots failed.".to_string(),
                data: failures,
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    // ========================================================================
    // ELECTION REGISTRY
    // ========================================================================

    pub fn create_election(&self, title: &str) -> u32 {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.elections.insert(id, Election::new(title));
        info!(election_id = id, "Election '{}' created", title);
        id
    }

    pub fn election_exists(&self, election_id: u32) -> bool {
        self.lock().elections.contains_key(&election_id)
    }

    pub fn active_election_ids(&self) -> Vec<u32> {
        self.lock().elections.keys().copied().collect()
    }

    /// Run a read-only query against one election under the lock
    pub fn inspect<T>(&self, election_id: u32, f: impl FnOnce(&Election) -> T) -> Option<T> {
        self.lock().elections.get(&election_id).map(f)
    }

    // ========================================================================
    // ADMIN OPERATIONS
    // ========================================================================

    pub fn create_region(&self, election_id: u32, name: &str, code: &str) -> ServiceResponse {
        self.with_election(election_id, |election| match election.create_region(name, code) {
            Ok(_) => ServiceResponse::ok(format!("Region '{}' ({}) created.", name, code)),
            Err(e) => ServiceResponse::failure(&e),
        })
    }

    pub fn create_party(&self, election_id: u32, party_name: &str) -> ServiceResponse {
        self.with_election(election_id, |election| {
            election.create_party(party_name);
            ServiceResponse::ok(format!("Party '{}' created successfully.", party_name))
        })
    }

    pub fn add_candidate(&self, election_id: u32, name: &str) -> ServiceResponse {
        self.with_election(election_id, |election| match election.add_candidate(name, None) {
            Ok(()) => ServiceResponse::ok(format!("Candidate '{}' added successfully.", name)),
            Err(e) => ServiceResponse::failure(&e),
        })
    }

    /// Flat-ballot candidate; the party is looked up by name and created if missing
    pub fn add_candidate_with_party(
        &self,
        election_id: u32,
        name: &str,
        party_name: &str,
    ) -> ServiceResponse {
        self.with_election(election_id, |election| {
            let party = party_by_name_or_create(election, party_name);
            match election.add_candidate(name, Some(party)) {
                Ok(()) => ServiceResponse::ok(format!(
                    "Candidate '{}' added to party '{}'.",
                    name, party_name
                )),
                Err(e) => ServiceResponse::failure(&e),
            }
        })
    }

    /// Regional candidate; `party_name` None means independent
    pub fn add_candidate_to_region(
        &self,
        election_id: u32,
        name: &str,
        party_name: Option<&str>,
        region_code: &str,
    ) -> ServiceResponse {
        self.with_election(election_id, |election| {
            let region = match region_for(election, region_code) {
                Ok(region) => region,
                Err(response) => return response,
            };
            // A party that does not exist yet cannot already be represented, so
            // previewing with the existing party (or none) covers every rule.
            // The party is only created once the candidate is known to fit.
            let existing = party_name.and_then(|p| election.find_party_by_name(p));
            if !election.can_candidate_be_added_to_region(name, existing, region) {
                return match election.add_candidate_to_region(name, existing, region) {
                    Err(e) => ServiceResponse::failure(&e),
                    Ok(()) => added_to_region(name, region_code),
                };
            }

            let party = party_name.map(|p| party_by_name_or_create(election, p));
            match election.add_candidate_to_region(name, party, region) {
                Ok(()) => added_to_region(name, region_code),
                Err(e) => ServiceResponse::failure(&e),
            }
        })
    }

    // ========================================================================
    // VOTER OPERATIONS
    // ========================================================================

    pub fn register_voter(&self, election_id: u32, input: &VoterRegistration) -> ServiceResponse {
        self.with_election(election_id, |election| match election.register_voter(input) {
            Ok(id) => ServiceResponse::ok(format!("Voter {} registered successfully.", id)),
            Err(e) => ServiceResponse::failure(&e),
        })
    }

    pub fn register_voter_in_region(
        &self,
        election_id: u32,
        input: &VoterRegistration,
        region_code: &str,
    ) -> ServiceResponse {
        self.with_election(election_id, |election| {
            let region = match region_for(election, region_code) {
                Ok(region) => region,
                Err(response) => return response,
            };
            match election.register_voter_in_region(input, region) {
                Ok(id) => ServiceResponse::ok(format!(
                    "Voter {} registered in region {}.",
                    id, region_code
                )),
                Err(e) => ServiceResponse::failure(&e),
            }
        })
    }

    pub fn cast_vote(&self, election_id: u32, voter_id: u32, candidate_index: usize) -> ServiceResponse {
        self.with_election(election_id, |election| {
            match election.cast_vote(voter_id, candidate_index) {
                Ok(()) => ServiceResponse::ok("Vote cast successfully."),
                Err(e) => ServiceResponse::failure(&e),
            }
        })
    }

    pub fn cast_vote_in_region(
        &self,
        election_id: u32,
        voter_id: u32,
        candidate_index: usize,
        region_code: &str,
    ) -> ServiceResponse {
        self.with_election(election_id, |election| {
            let region = match region_for(election, region_code) {
                Ok(region) => region,
                Err(response) => return response,
            };
            match election.cast_vote_in_region(voter_id, candidate_index, region) {
                Ok(()) => ServiceResponse::ok(format!("Vote cast in region {}.", region_code)),
                Err(e) => ServiceResponse::failure(&e),
            }
        })
    }

    pub fn check_voter_registration(&self, election_id: u32, voter_id: u32) -> ServiceResponse {
        self.with_election(election_id, |election| {
            let yes_no = |b: bool| if b { "Yes" } else { "No" };
            let mut status = vec![
                format!("Registered: {}", yes_no(election.is_voter_registered(voter_id))),
                format!("Has Voted: {}", yes_no(election.has_voter_voted(voter_id))),
            ];
            if let Some(region) = election
                .find_voter(voter_id)
                .and_then(|v| v.region())
                .and_then(|id| election.region(id))
            {
                status.push(format!("Region: {}", region.code()));
            }
            ServiceResponse::ok_with("Voter status retrieved.", status)
        })
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Flat ballot first, then each region's ballot prefixed with its code
    pub fn get_candidates(&self, election_id: u32) -> ServiceResponse {
        self.with_election(election_id, |election| {
            let mut lines = election.candidate_lines();
            for region in election.regions() {
                lines.extend(
                    region
                        .candidate_lines(election.parties())
                        .into_iter()
                        .map(|line| format!("[{}] {}", region.code(), line)),
                );
            }
            ServiceResponse::ok_with("Candidates retrieved.", lines)
        })
    }

    pub fn get_voters(&self, election_id: u32) -> ServiceResponse {
        self.with_election(election_id, |election| {
            let mut lines = election.voter_lines();
            for region in election.regions() {
                lines.extend(
                    region
                        .voter_lines()
                        .into_iter()
                        .map(|line| format!("[{}] {}", region.code(), line)),
                );
            }
            ServiceResponse::ok_with("Voters retrieved.", lines)
        })
    }

    pub fn get_parties(&self, election_id: u32) -> ServiceResponse {
        self.with_election(election_id, |election| {
            ServiceResponse::ok_with("Parties retrieved.", election.party_lines())
        })
    }

    pub fn get_regions(&self, election_id: u32) -> ServiceResponse {
        self.with_election(election_id, |election| {
            ServiceResponse::ok_with("Regions retrieved.", election.region_lines())
        })
    }

    /// Flat results (when there is a flat ballot) followed by every region's
    pub fn get_election_results(&self, election_id: u32) -> ServiceResponse {
        self.with_election(election_id, |election| {
            let mut lines = Vec::new();
            if !election.candidates().is_empty() || election.regions().is_empty() {
                lines.extend(election.display_results().lines().map(str::to_string));
            }
            for index in 0..election.regions().len() {
                if let Ok(text) = election.display_results_in_region(RegionId(index)) {
                    lines.extend(text.lines().map(str::to_string));
                }
            }
            ServiceResponse::ok_with("Election results retrieved.", lines)
        })
    }

    pub fn get_region_results(&self, election_id: u32, region_code: &str) -> ServiceResponse {
        self.with_election(election_id, |election| {
            let region = match region_for(election, region_code) {
                Ok(region) => region,
                Err(response) => return response,
            };
            match election.display_results_in_region(region) {
                Ok(text) => ServiceResponse::ok_with(
                    "Region results retrieved.",
                    text.lines().map(str::to_string).collect(),
                ),
                Err(e) => ServiceResponse::failure(&e),
            }
        })
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    pub fn save_election_results(&self, election_id: u32, filename: &str) -> ServiceResponse {
        self.with_election(election_id, |election| {
            match election.save_results_to_file(filename) {
                Ok(()) => ServiceResponse::ok(format!("Election results saved to '{}'.", filename)),
                Err(e) => ServiceResponse::failure(&e),
            }
        })
    }

    pub fn save_complete_election_data(&self, election_id: u32, filename: &str) -> ServiceResponse {
        self.with_election(election_id, |election| {
            match election.save_complete_election_data(filename) {
                Ok(()) => ServiceResponse::ok(format!(
                    "Complete election data saved to '{}'.",
                    filename
                )),
                Err(e) => ServiceResponse::failure(&e),
            }
        })
    }

    pub fn load_election_data(&self, election_id: u32, filename: &str) -> ServiceResponse {
        self.with_election(election_id, |election| {
            match election.load_complete_election_data(filename) {
                Ok(summary) => ServiceResponse::ok_with(
                    format!("Election data loaded from '{}'.", filename),
                    vec![summary.to_string()],
                ),
                Err(e) => ServiceResponse::failure(&e),
            }
        })
    }

    pub fn export_election_to_csv(&self, election_id: u32, base_filename: &str) -> ServiceResponse {
        self.with_election(election_id, |election| match election.export_to_csv(base_filename) {
            Ok(paths) => ServiceResponse::ok_with(
                format!(
                    "Election data exported to CSV files with base name '{}'.",
                    base_filename
                ),
                [paths.candidates, paths.voters, paths.parties]
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect(),
            ),
            Err(e) => ServiceResponse::failure(&e),
        })
    }

    /// Where the last `stop` wrote (or would write) a given election
    pub fn shutdown_snapshot_path(&self, election_id: u32) -> PathBuf {
        self.config.shutdown_snapshot_path(election_id)
    }
}

impl Drop for ElectionService {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn party_by_name_or_create(election: &mut Election, party_name: &str) -> PartyId {
    election
        .find_party_by_name(party_name)
        .unwrap_or_else(|| election.create_party(party_name))
}

fn region_for(election: &Election, code: &str) -> Result<RegionId, ServiceResponse> {
    election.region_by_code(code).ok_or_else(|| {
        warn!(region = code, "Unknown region code");
        ServiceResponse::failure(&ElectionError::UnknownRegion(code.to_string()))
    })
}

fn added_to_region(name: &str, region_code: &str) -> ServiceResponse {
    ServiceResponse::ok(format!(
        "Candidate '{}' added to region {}.",
        name, region_code
    ))
}

// ============================================================================
// TESTS
// ============================================================================
