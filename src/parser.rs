use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use csv::Reader;

use crate::seating::{PairEntry, UserEntry};

/// Loads the approved-pair roster from a CSV file with `pair_id`, `user_id`
/// and `nickname` columns (matched by header name, not position).
pub fn load_roster<P: AsRef<Path>>(
    csv_path: P,
) -> Result<(Vec<PairEntry>, Vec<UserEntry>), Box<dyn std::error::Error>> {
    let reader = Reader::from_path(csv_path)?;
    parse_roster(reader)
}

fn parse_roster<R: Read>(
    mut reader: Reader<R>,
) -> Result<(Vec<PairEntry>, Vec<UserEntry>), Box<dyn std::error::Error>> {
    let headers = reader.headers()?;

    // Find column indices by header content.
    let pair_col = headers
        .iter()
        .position(|h| h.to_lowercase().contains("pair"))
        .unwrap_or(0);
    let id_col = headers
        .iter()
        .position(|h| {
            let h = h.to_lowercase();
            h.contains("id") && !h.contains("pair")
        })
        .unwrap_or(1);
    let nick_col = headers
        .iter()
        .position(|h| {
            let h = h.to_lowercase();
            h.contains("nick") || h.contains("name")
        })
        .unwrap_or(2);

    let mut users: Vec<UserEntry> = Vec::new();
    let mut seen_users: HashSet<String> = HashSet::new();
    let mut pairs: Vec<PairEntry> = Vec::new();

    for result in reader.records() {
        let record = result?;
        let pair_id = record.get(pair_col).unwrap_or("").trim().to_string();
        let user_id = record.get(id_col).unwrap_or("").trim().to_string();
        let nickname = record.get(nick_col).unwrap_or("").trim().to_string();

        // Skip rows missing essentials.
        if pair_id.is_empty() || user_id.is_empty() || nickname.is_empty() {
            continue;
        }

        if seen_users.insert(user_id.clone()) {
            users.push(UserEntry {
                id: user_id.clone(),
                nickname,
            });
        }

        match pairs.iter_mut().find(|p| p.pair_id == pair_id) {
            Some(pair) => pair.members.push(user_id),
            None => pairs.push(PairEntry {
                pair_id,
                members: vec![user_id],
            }),
        }
    }

    Ok((pairs, users))
}

/// Loads the free-text exclusion list; no path means no exclusions.
pub fn load_exclusions(path: Option<&str>) -> std::io::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p),
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> (Vec<PairEntry>, Vec<UserEntry>) {
        let reader = Reader::from_reader(csv.as_bytes());
        parse_roster(reader).unwrap()
    }

    #[test]
    fn loads_pairs_and_users() {
        let csv = "pair_id,user_id,nickname\n\
                   p1,u1,Alice\n\
                   p1,u2,Bob\n\
                   p2,u3,Carol\n\
                   p2,u4,Dave\n";

        let (pairs, users) = parse(csv);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].pair_id, "p1");
        assert_eq!(pairs[0].members, vec!["u1", "u2"]);
        assert_eq!(users.len(), 4);
        assert_eq!(users[2].nickname, "Carol");
    }

    #[test]
    fn skips_incomplete_rows() {
        let csv = "pair_id,user_id,nickname\n\
                   p1,u1,Alice\n\
                   ,u9,NoPair\n\
                   p1,u2,Bob\n";

        let (pairs, users) = parse(csv);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].members.len(), 2);
        assert_eq!(users.len(), 2);
    }

    #[test]
    fn keeps_oversized_pairs_for_downstream_validation() {
        let csv = "pair_id,user_id,nickname\n\
                   p1,u1,Alice\n\
                   p1,u2,Bob\n\
                   p1,u3,Carol\n";

        let (pairs, _) = parse(csv);

        // Arity is validated by the roster expander, which names the pair.
        assert_eq!(pairs[0].members.len(), 3);
    }

    #[test]
    fn matches_headers_by_name() {
        let csv = "Nickname,Team pair,User ID\n\
                   Alice,p1,u1\n\
                   Bob,p1,u2\n";

        let (pairs, users) = parse(csv);

        assert_eq!(pairs[0].pair_id, "p1");
        assert_eq!(users[0].id, "u1");
        assert_eq!(users[0].nickname, "Alice");
    }
}
