//! Column-name normalization applied once per record at ingestion.
//!
//! Sheets are edited by hand, so the same field shows up as `Mail`, `MAIL`
//! or `LinkedIn ` depending on who typed the header. Each section declares
//! alias groups; matching columns are renamed to one canonical name so
//! downstream code reads a single key.

use sheets_api::Record;

use crate::section::Section;

/// A canonical column name and the header spellings that map to it.
pub struct AliasGroup {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

pub const MAIL: &str = "mail";
pub const GITHUB: &str = "github";
pub const LINKEDIN: &str = "linkedin";
pub const ORCID: &str = "ORCID";
pub const GOOGLE_SCHOLAR: &str = "Google Scholar";
pub const SCOPUS: &str = "Scopus";
pub const ABOUT: &str = "About";

const CONTACT_ALIASES: &[AliasGroup] = &[
    AliasGroup {
        canonical: MAIL,
        aliases: &["mail", "Mail", "MAIL"],
    },
    AliasGroup {
        canonical: GITHUB,
        aliases: &["github", "Github", "GITHUB"],
    },
    AliasGroup {
        canonical: LINKEDIN,
        aliases: &["linkedin", "Linkedin", "LinkedIn", "LinkedIn "],
    },
];

const BASIC_INFO_ALIASES: &[AliasGroup] = &[
    AliasGroup {
        canonical: ORCID,
        aliases: &["ORC Id", "ORCID", "orcid", "Orcid"],
    },
    AliasGroup {
        canonical: GOOGLE_SCHOLAR,
        aliases: &["Google Scholar", "Scholar", "GoogleScholar", "google scholar"],
    },
    AliasGroup {
        canonical: SCOPUS,
        aliases: &[
            "scopus",
            "scopus ",
            "Scopus",
            "SCOPUS",
            "Scopus Profile",
            "Scopus ID",
            "Scopus Id",
        ],
    },
    AliasGroup {
        canonical: ABOUT,
        aliases: &["About", "about", "Bio"],
    },
];

/// Alias groups that apply to a section's columns.
pub fn alias_groups(section: Section) -> &'static [AliasGroup] {
    match section {
        Section::ContactMe => CONTACT_ALIASES,
        Section::BasicInfo => BASIC_INFO_ALIASES,
        _ => &[],
    }
}

/// Case- and punctuation-insensitive form of a header.
fn fold(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn find_group<'a>(groups: &'a [AliasGroup], column: &str) -> Option<&'a AliasGroup> {
    let folded = fold(column);
    groups
        .iter()
        .find(|g| g.aliases.iter().any(|alias| fold(alias) == folded))
}

/// Renames aliased columns of one record to their canonical names.
///
/// The first matching column keeps its position; later columns of the same
/// group only fill the value if it is still empty, then are dropped. Cell
/// text is never modified.
pub fn normalize_record(section: Section, record: Record) -> Record {
    let groups = alias_groups(section);
    if groups.is_empty() {
        return record;
    }

    let mut out: Vec<(String, String)> = Vec::with_capacity(record.len());
    for (column, value) in record.into_pairs() {
        let Some(group) = find_group(groups, &column) else {
            out.push((column, value));
            continue;
        };
        match out.iter_mut().find(|(k, _)| k == group.canonical) {
            Some(slot) => {
                if slot.1.is_empty() {
                    slot.1 = value;
                }
            }
            None => out.push((group.canonical.to_string(), value)),
        }
    }
    Record::from_pairs(out)
}

/// Normalizes every record of a section.
pub fn normalize_rows(section: Section, rows: Vec<Record>) -> Vec<Record> {
    rows.into_iter()
        .map(|record| normalize_record(section, record))
        .collect()
}
