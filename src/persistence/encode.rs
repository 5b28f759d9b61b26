// Encoder: Election → ElectionDocument → section text

use std::io::{self, Write};

use super::{CandidateRecord, ElectionDocument, PartyRecord, RegionRecord, Section, VoterRecord};
use crate::election::Election;
use crate::entities::{Candidate, Voter};
use crate::results::{sum_votes, turnout_percentage};

pub const FILE_MARKER: &str = "COMPLETE_ELECTION_DATA";

/// Snapshot every entity: flat candidates first, then each region's ballot in order
pub fn document_from(election: &Election) -> ElectionDocument {
    let regions = election
        .regions()
        .iter()
        .map(|r| RegionRecord {
            name: r.name().to_string(),
            code: r.code().to_string(),
        })
        .collect();

    let parties = election
        .parties()
        .iter()
        .map(|p| PartyRecord {
            name: p.name().to_string(),
            members: p.members().to_vec(),
        })
        .collect();

    let region_code = |c: &Candidate| {
        c.region()
            .and_then(|id| election.region(id))
            .map(|r| r.code().to_string())
    };
    let candidates = election
        .all_candidates()
        .map(|c| CandidateRecord {
            name: c.name().to_string(),
            votes: c.vote_count(),
            party: c.party_name(election.parties()).to_string(),
            region: region_code(c),
        })
        .collect();

    let voter_region = |v: &Voter| {
        v.region()
            .and_then(|id| election.region(id))
            .map(|r| r.code().to_string())
    };
    let voters = election
        .all_voters()
        .map(|v| VoterRecord {
            first_name: v.first_name().to_string(),
            last_name: v.last_name().to_string(),
            phone: v.phone().to_string(),
            address: v.address().to_string(),
            unique_id: v.unique_id(),
            age: v.age(),
            has_voted: v.has_voted(),
            region: voter_region(v),
        })
        .collect();

    ElectionDocument {
        title: Some(election.title().to_string()),
        regions,
        parties,
        candidates,
        voters,
    }
}

/// Values are single-line: embedded line breaks become spaces
fn clean(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Roster members are ';'-joined; a ';' or backslash inside a name is backslash-escaped
pub fn join_members(members: &[String]) -> String {
    members
        .iter()
        .map(|m| m.replace('\\', "\\\\").replace(';', "\\;"))
        .collect::<Vec<_>>()
        .join(";")
}

pub fn write_document<W: Write>(document: &ElectionDocument, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", FILE_MARKER)?;
    writeln!(out, "{}", "=".repeat(FILE_MARKER.len()))?;
    writeln!(out)?;

    writeln!(out, "{}", Section::ElectionInfo.header())?;
    writeln!(out, "Title={}", clean(document.title.as_deref().unwrap_or_default()))?;
    writeln!(out, "TotalCandidates={}", document.candidates.len())?;
    writeln!(out, "TotalVoters={}", document.voters.len())?;
    writeln!(out, "TotalParties={}", document.parties.len())?;
    writeln!(out, "TotalRegions={}", document.regions.len())?;
    writeln!(out)?;

    writeln!(out, "{}", Section::Regions.header())?;
    for (i, region) in document.regions.iter().enumerate() {
        writeln!(out, "Region{}_Name={}", i, clean(&region.name))?;
        writeln!(out, "Region{}_Code={}", i, clean(&region.code))?;
    }
    writeln!(out)?;

    writeln!(out, "{}", Section::Parties.header())?;
    for (i, party) in document.parties.iter().enumerate() {
        writeln!(out, "Party{}={}", i, clean(&party.name))?;
        writeln!(out, "Party{}_Members={}", i, clean(&join_members(&party.members)))?;
    }
    writeln!(out)?;

    writeln!(out, "{}", Section::Candidates.header())?;
    for (i, candidate) in document.candidates.iter().enumerate() {
        writeln!(out, "Candidate{}_Name={}", i, clean(&candidate.name))?;
        writeln!(out, "Candidate{}_Votes={}", i, candidate.votes)?;
        writeln!(out, "Candidate{}_Party={}", i, clean(&candidate.party))?;
        if let Some(code) = &candidate.region {
            writeln!(out, "Candidate{}_Region={}", i, clean(code))?;
        }
    }
    writeln!(out)?;

    writeln!(out, "{}", Section::Voters.header())?;
    for (i, voter) in document.voters.iter().enumerate() {
        writeln!(out, "Voter{}_FirstName={}", i, clean(&voter.first_name))?;
        writeln!(out, "Voter{}_LastName={}", i, clean(&voter.last_name))?;
        writeln!(out, "Voter{}_Phone={}", i, clean(&voter.phone))?;
        writeln!(out, "Voter{}_Address={}", i, clean(&voter.address))?;
        writeln!(out, "Voter{}_UniqueId={}", i, voter.unique_id)?;
        writeln!(out, "Voter{}_Age={}", i, voter.age)?;
        writeln!(out, "Voter{}_HasVoted={}", i, if voter.has_voted { 1 } else { 0 })?;
        if let Some(code) = &voter.region {
            writeln!(out, "Voter{}_Region={}", i, clean(code))?;
        }
    }
    writeln!(out)?;

    let total_votes = sum_votes(document.candidates.iter().map(|c| c.votes));
    writeln!(out, "{}", Section::VotingSummary.header())?;
    writeln!(out, "TotalVotesCast={}", total_votes)?;
    writeln!(
        out,
        "VoterTurnout={:.2}%",
        turnout_percentage(total_votes, document.voters.len())
    )?;

    out.flush()
}
