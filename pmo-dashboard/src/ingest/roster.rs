//! Analyst roster (`name;stack;squad;functionalRole`)
//!
//! A name may repeat across rows to declare several stacks or roles. Names
//! are merged case-insensitively, keeping the first spelling seen.

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use super::parser::DELIMITER;

/// One analyst as declared in the roster
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RosterEntry {
    pub name: String,
    pub stacks: Vec<String>,
    pub squads: Vec<String>,
    pub roles: Vec<String>,
}

/// Roster entries in first-seen order with a case-insensitive index
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    index: HashMap<String, usize>,
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

impl Roster {
    /// Parse roster text; the first line is a header
    pub fn parse(text: &str) -> Self {
        let mut roster = Roster::default();

        for line in text.lines().skip(1) {
            let fields: Vec<&str> = line
                .trim_end_matches('\r')
                .split(DELIMITER)
                .map(str::trim)
                .collect();

            if fields.len() < 2 || fields[0].is_empty() {
                continue;
            }

            let field = |i: usize| fields.get(i).copied().unwrap_or("");
            roster.declare(field(0), field(1), field(2), field(3));
        }

        debug!(analysts = roster.len(), "Parsed roster");
        roster
    }

    /// Read and parse a roster file; a missing file yields an empty roster
    pub async fn load(path: &Path) -> Self {
        match tokio::fs::read(path).await {
            Ok(bytes) => Self::parse(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                warn!(
                    "Roster file {} unavailable ({}), continuing with no analysts",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Merge one roster row into the entry for `name`
    pub fn declare(&mut self, name: &str, stack: &str, squad: &str, role: &str) {
        let key = name.to_lowercase();
        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                self.entries.push(RosterEntry {
                    name: name.to_string(),
                    ..RosterEntry::default()
                });
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[position];
        push_unique(&mut entry.stacks, stack);
        push_unique(&mut entry.squads, squad);
        push_unique(&mut entry.roles, role);
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&RosterEntry> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&position| &self.entries[position])
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_merges_repeated_names() {
        let text = "nome;stack;squad;funcao\n\
                    Ana;Java;SquadA;Analista Técnico\n\
                    ana;React;SquadA;\n\
                    Bia;Python;SquadB;Analista de Negócio\n\
                    ANA;Java;SquadC;Technical Owner\n";
        let roster = Roster::parse(text);

        assert_eq!(roster.len(), 2);
        let ana = roster.get("ANA").unwrap();
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.stacks, vec!["Java", "React"]);
        assert_eq!(ana.squads, vec!["SquadA", "SquadC"]);
        assert_eq!(ana.roles, vec!["Analista Técnico", "Technical Owner"]);
    }

    #[test]
    fn test_parse_skips_short_and_nameless_rows() {
        let roster = Roster::parse("h\nlonely\n;Java;SquadA;\nCaio;Go\n");
        assert_eq!(roster.len(), 1);
        let caio = roster.get("caio").unwrap();
        assert_eq!(caio.stacks, vec!["Go"]);
        assert!(caio.squads.is_empty());
        assert!(caio.roles.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let roster = Roster::load(Path::new("/nonexistent/roster.csv")).await;
        assert!(roster.is_empty());
    }
}
