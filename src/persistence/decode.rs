// Decoder: section text → ElectionDocument
//
// Streams the input line by line, remembers the current section, and feeds
// each key=value pair into a per-section record builder keyed by index.
// Field order inside a record does not matter; a record is only emitted once
// every field it needs is present and parses. A candidate's vote count is
// parsed per line, so a bad _Votes value costs that line, not the candidate.

use std::collections::BTreeMap;
use std::io::{self, BufRead};
use tracing::{debug, warn};

use super::encode::FILE_MARKER;
use super::{CandidateRecord, ElectionDocument, PartyRecord, RegionRecord, Section, VoterRecord};

// ============================================================================
// KEY PARSING
// ============================================================================

/// "Candidate3_Votes" with prefix "Candidate" → (3, Some("Votes")); "Party0" → (0, None)
pub fn split_indexed_key<'a>(key: &'a str, prefix: &str) -> Option<(usize, Option<&'a str>)> {
    let rest = key.strip_prefix(prefix)?;
    let (digits, field) = match rest.split_once('_') {
        Some((digits, field)) => (digits, Some(field)),
        None => (rest, None),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, field))
}

/// Inverse of encode::join_members. Files written before escaping existed
/// contain no backslashes, so they split exactly as before.
pub fn split_members(value: &str) -> Vec<String> {
    let mut members = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            },
            ';' => members.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    members.push(current);

    members.retain(|m| !m.is_empty());
    members
}

// ============================================================================
// RECORD BUILDERS
// ============================================================================

#[derive(Debug, Default)]
struct PartialRegion {
    name: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Default)]
struct PartialParty {
    name: Option<String>,
    members: Vec<String>,
}

#[derive(Debug, Default)]
struct PartialCandidate {
    name: Option<String>,
    votes: Option<u32>,
    party: Option<String>,
    region: Option<String>,
}

#[derive(Debug, Default)]
struct PartialVoter {
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    unique_id: Option<String>,
    age: Option<String>,
    has_voted: Option<String>,
    region: Option<String>,
}

#[derive(Debug, Default)]
struct Builders {
    title: Option<String>,
    regions: BTreeMap<usize, PartialRegion>,
    parties: BTreeMap<usize, PartialParty>,
    candidates: BTreeMap<usize, PartialCandidate>,
    voters: BTreeMap<usize, PartialVoter>,
}

impl Builders {
    /// Returns false when the key is not one this section understands
    fn accept(&mut self, section: Section, key: &str, value: &str) -> bool {
        let value = value.to_string();

        match section {
            Section::ElectionInfo => {
                if key == "Title" {
                    self.title = Some(value);
                }
                // Totals are derived, never trusted
                true
            }
            Section::VotingSummary | Section::Unknown => true,
            Section::Regions => {
                let Some((i, Some(field))) = split_indexed_key(key, "Region") else {
                    return false;
                };
                let slot = self.regions.entry(i).or_default();
                match field {
                    "Name" => slot.name = Some(value),
                    "Code" => slot.code = Some(value),
                    _ => return false,
                }
                true
            }
            Section::Parties => {
                let Some((i, field)) = split_indexed_key(key, "Party") else {
                    return false;
                };
                let slot = self.parties.entry(i).or_default();
                match field {
                    None => slot.name = Some(value),
                    Some("Members") => {
                        slot.members = split_members(&value);
                    }
                    Some(_) => return false,
                }
                true
            }
            Section::Candidates => {
                let Some((i, Some(field))) = split_indexed_key(key, "Candidate") else {
                    return false;
                };
                let slot = self.candidates.entry(i).or_default();
                match field {
                    "Name" => slot.name = Some(value),
                    "Votes" => match value.trim().parse() {
                        Ok(votes) => slot.votes = Some(votes),
                        Err(_) => {
                            warn!(index = i, value = %value, "Unparseable vote count; candidate kept with 0 votes");
                            return false;
                        }
                    },
                    "Party" => slot.party = Some(value),
                    "Region" => slot.region = Some(value),
                    _ => return false,
                }
                true
            }
            Section::Voters => {
                let Some((i, Some(field))) = split_indexed_key(key, "Voter") else {
                    return false;
                };
                let slot = self.voters.entry(i).or_default();
                match field {
                    "FirstName" => slot.first_name = Some(value),
                    "LastName" => slot.last_name = Some(value),
                    "Phone" => slot.phone = Some(value),
                    "Address" => slot.address = Some(value),
                    "UniqueId" => slot.unique_id = Some(value),
                    "Age" => slot.age = Some(value),
                    "HasVoted" => slot.has_voted = Some(value),
                    "Region" => slot.region = Some(value),
                    _ => return false,
                }
                true
            }
        }
    }

    /// Emit every complete record in index order; returns the incomplete count too
    fn finish(self) -> (ElectionDocument, usize) {
        let mut incomplete = 0;

        let regions = self
            .regions
            .into_iter()
            .filter_map(|(i, r)| match (r.name, r.code) {
                (Some(name), Some(code)) => Some(RegionRecord { name, code }),
                _ => {
                    warn!(index = i, "Incomplete region record skipped");
                    incomplete += 1;
                    None
                }
            })
            .collect();

        let parties = self
            .parties
            .into_iter()
            .filter_map(|(i, p)| match p.name {
                Some(name) => Some(PartyRecord {
                    name,
                    members: p.members,
                }),
                None => {
                    warn!(index = i, "Party members without a party name skipped");
                    incomplete += 1;
                    None
                }
            })
            .collect();

        let candidates = self
            .candidates
            .into_iter()
            .filter_map(|(i, c)| {
                let record = finish_candidate(c);
                if record.is_none() {
                    warn!(index = i, "Incomplete candidate record skipped");
                    incomplete += 1;
                }
                record
            })
            .collect();

        let voters = self
            .voters
            .into_iter()
            .filter_map(|(i, v)| {
                let record = finish_voter(v);
                if record.is_none() {
                    warn!(index = i, "Incomplete voter record skipped");
                    incomplete += 1;
                }
                record
            })
            .collect();

        let document = ElectionDocument {
            title: self.title,
            regions,
            parties,
            candidates,
            voters,
        };
        (document, incomplete)
    }
}

/// A candidate needs a name; missing votes mean zero, a missing party means independent
fn finish_candidate(c: PartialCandidate) -> Option<CandidateRecord> {
    Some(CandidateRecord {
        name: c.name?,
        votes: c.votes.unwrap_or(0),
        party: c.party.unwrap_or_else(|| crate::entities::INDEPENDENT.to_string()),
        region: c.region,
    })
}

/// A voter needs all seven identity fields, each parseable
fn finish_voter(v: PartialVoter) -> Option<VoterRecord> {
    Some(VoterRecord {
        first_name: v.first_name?,
        last_name: v.last_name?,
        phone: v.phone?,
        address: v.address?,
        unique_id: v.unique_id?.trim().parse().ok()?,
        age: v.age?.trim().parse().ok()?,
        has_voted: v.has_voted? == "1",
        region: v.region,
    })
}

// ============================================================================
// READER
// ============================================================================

/// Parse a whole snapshot. Returns the document and the number of lines or
/// records that had to be skipped.
pub fn read_document<R: BufRead>(mut reader: R) -> io::Result<(ElectionDocument, usize)> {
    let mut builders = Builders::default();
    let mut section = Section::Unknown;
    let mut skipped = 0;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&raw);
        let line = text.trim_end_matches(['\n', '\r']);

        if line.is_empty() || line.starts_with('=') || line == FILE_MARKER {
            continue;
        }

        if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
            section = Section::from_header(&line[1..line.len() - 1]);
            if section == Section::Unknown {
                debug!(header = line, "Skipping unknown section");
            }
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            skipped += 1;
            continue;
        };

        if !builders.accept(section, key, value) {
            debug!(key, "Skipping unrecognised key");
            skipped += 1;
        }
    }

    let (document, incomplete) = builders.finish();
    Ok((document, skipped + incomplete))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode(text: &str) -> (ElectionDocument, usize) {
        read_document(Cursor::new(text.as_bytes())).unwrap()
    }

    #[test]
    fn test_split_indexed_key() {
        assert_eq!(split_indexed_key("Party0", "Party"), Some((0, None)));
        assert_eq!(split_indexed_key("Party12_Members", "Party"), Some((12, Some("Members"))));
        assert_eq!(split_indexed_key("Candidate3_Votes", "Candidate"), Some((3, Some("Votes"))));
        assert_eq!(split_indexed_key("PartyX", "Party"), None);
        assert_eq!(split_indexed_key("Party", "Party"), None);
        assert_eq!(split_indexed_key("Voter1_Age", "Party"), None);
    }

    #[test]
    fn test_split_members_honours_escapes() {
        assert_eq!(split_members("Alice;Bob"), vec!["Alice", "Bob"]);
        assert_eq!(split_members("A\\;B;C\\\\D"), vec!["A;B", "C\\D"]);
        assert_eq!(split_members(""), Vec::<String>::new());
        assert_eq!(split_members("Trailing\\"), vec!["Trailing\\"]);
    }

    #[test]
    fn test_legacy_file_without_regions() {
        let text = "COMPLETE_ELECTION_DATA\n\
                    ======================\n\
                    \n\
                    [ELECTION_INFO]\n\
                    Title=Old Election\n\
                    TotalCandidates=1\n\
                    \n\
                    [PARTIES]\n\
                    Party0=Green\n\
                    Party0_Members=Alice\n\
                    \n\
                    [CANDIDATES]\n\
                    Candidate0_Name=Alice\n\
                    Candidate0_Votes=2\n\
                    Candidate0_Party=Green\n\
                    \n\
                    [VOTING_SUMMARY]\n\
                    TotalVotesCast=2\n\
                    VoterTurnout=0.00%\n";

        let (document, skipped) = decode(text);

        assert_eq!(skipped, 0);
        assert_eq!(document.title.as_deref(), Some("Old Election"));
        assert!(document.regions.is_empty());
        assert_eq!(document.parties[0].members, vec!["Alice"]);
        assert_eq!(document.candidates[0].votes, 2);
        assert_eq!(document.candidates[0].region, None);
    }

    #[test]
    fn test_field_order_is_free_and_voter_needs_all_fields() {
        let text = "[VOTERS]\r\n\
                    Voter0_HasVoted=1\r\n\
                    Voter0_Age=40\r\n\
                    Voter0_UniqueId=123456789\r\n\
                    Voter0_Address=1 Long Road\r\n\
                    Voter0_Phone=5551234567\r\n\
                    Voter0_LastName=Smith\r\n\
                    Voter0_FirstName=Ann\r\n\
                    Voter1_FirstName=Half\r\n\
                    Voter1_UniqueId=987654321\r\n";

        let (document, skipped) = decode(text);

        assert_eq!(document.voters.len(), 1);
        assert_eq!(skipped, 1);
        let voter = &document.voters[0];
        assert_eq!(voter.first_name, "Ann");
        assert_eq!(voter.unique_id, 123456789);
        assert!(voter.has_voted);
    }

    #[test]
    fn test_malformed_lines_and_unknown_sections_skipped() {
        let text = "[ELECTION_INFO]\n\
                    Title=Kept\n\
                    this line has no separator\n\
                    [FUTURE_SECTION]\n\
                    Anything=Goes\n\
                    [CANDIDATES]\n\
                    Candidate0_Name=Alice\n\
                    Candidate0_Votes=lots\n\
                    Candidate1_Name=Bob\n\
                    Candidate1_Shoe=42\n";

        let (document, skipped) = decode(text);

        assert_eq!(document.title.as_deref(), Some("Kept"));
        // Alice's bad vote line, Bob's unknown key, and the bare line
        let names: Vec<&str> = document.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(document.candidates[0].votes, 0);
        assert_eq!(document.candidates[1].party, "Independent");
        assert_eq!(skipped, 3);
    }

    #[test]
    fn test_bad_vote_count_keeps_candidate_and_later_indices() {
        let text = "[CANDIDATES]
                    Candidate0_Name=Alice
                    Candidate0_Votes=lots
                    Candidate0_Party=Green
                    Candidate1_Name=Bob
                    Candidate1_Votes=3
";

        let (document, skipped) = decode(text);

        assert_eq!(skipped, 1);
        assert_eq!(document.candidates.len(), 2);
        assert_eq!(document.candidates[0].name, "Alice");
        assert_eq!(document.candidates[0].party, "Green");
        assert_eq!(document.candidates[0].votes, 0);
        assert_eq!(document.candidates[1].name, "Bob");
        assert_eq!(document.candidates[1].votes, 3);
    }

    #[test]
    fn test_values_may_contain_equals_sign() {
        let (document, _) = decode("[ELECTION_INFO]\nTitle=A=B\n");
        assert_eq!(document.title.as_deref(), Some("A=B"));
    }
}
