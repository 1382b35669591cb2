//! The fixed set of portfolio sections and the registry of their sources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PortfolioError;

/// A logical portfolio section backed by one published sheet.
///
/// Variants are declared in display order; `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    BasicInfo,
    Qualifications,
    Teaching,
    Courses,
    Institutional,
    JournalPublications,
    ConferencePublications,
    Books,
    ResearchProjects,
    Patents,
    Fdp,
    Memberships,
    Responsibilities,
    Mentoring,
    Declaration,
    Awards,
    Extension,
    OnlineProfiles,
    ContactMe,
}

impl Section {
    /// Every section, in display order.
    pub const ALL: [Section; 19] = [
        Section::BasicInfo,
        Section::Qualifications,
        Section::Teaching,
        Section::Courses,
        Section::Institutional,
        Section::JournalPublications,
        Section::ConferencePublications,
        Section::Books,
        Section::ResearchProjects,
        Section::Patents,
        Section::Fdp,
        Section::Memberships,
        Section::Responsibilities,
        Section::Mentoring,
        Section::Declaration,
        Section::Awards,
        Section::Extension,
        Section::OnlineProfiles,
        Section::ContactMe,
    ];

    /// The four sections composed into the research & publications block.
    pub const RESEARCH: [Section; 4] = [
        Section::ResearchProjects,
        Section::JournalPublications,
        Section::ConferencePublications,
        Section::Books,
    ];

    /// camelCase key used in URLs, anchors and config files.
    pub fn key(self) -> &'static str {
        match self {
            Section::BasicInfo => "basicInfo",
            Section::Qualifications => "qualifications",
            Section::Teaching => "teaching",
            Section::Courses => "courses",
            Section::Institutional => "institutional",
            Section::JournalPublications => "journalPublications",
            Section::ConferencePublications => "conferencePublications",
            Section::Books => "books",
            Section::ResearchProjects => "researchProjects",
            Section::Patents => "patents",
            Section::Fdp => "fdp",
            Section::Memberships => "memberships",
            Section::Responsibilities => "responsibilities",
            Section::Mentoring => "mentoring",
            Section::Declaration => "declaration",
            Section::Awards => "awards",
            Section::Extension => "extension",
            Section::OnlineProfiles => "onlineProfiles",
            Section::ContactMe => "contactMe",
        }
    }

    /// Heading shown above the section.
    pub fn title(self) -> &'static str {
        match self {
            Section::BasicInfo => "Basic Information",
            Section::Qualifications => "Academic Qualifications",
            Section::Teaching => "Teaching Experience",
            Section::Courses => "Courses Taught",
            Section::Institutional => "Institutional Contributions",
            Section::JournalPublications
            | Section::ConferencePublications
            | Section::Books
            | Section::ResearchProjects => "Research & Publications",
            Section::Patents => "Patents & Innovations",
            Section::Fdp => "Development Programs",
            Section::Memberships => "Professional Memberships",
            Section::Responsibilities => "Academic Responsibilities",
            Section::Mentoring => "Student Mentoring",
            Section::Declaration => "Declaration",
            Section::Awards => "Awards & Recognitions",
            Section::Extension => "Extension & Outreach",
            Section::OnlineProfiles => "Connect",
            Section::ContactMe => "Contact Me",
        }
    }

    /// Heading used inside the research & publications block.
    pub fn subsection_title(self) -> &'static str {
        match self {
            Section::ResearchProjects => "Research Projects",
            Section::JournalPublications => "Journal Publications",
            Section::ConferencePublications => "Conference Publications",
            Section::Books => "Books Published",
            other => other.title(),
        }
    }

    /// Published sheet id compiled into the default registry.
    pub fn default_sheet_id(self) -> &'static str {
        match self {
            Section::BasicInfo => "1nFYXIts878Su0KgUmQjXTDedjHilToASZ0WQs14eMSw",
            Section::Qualifications => "1kq9TfO8WIFhwN9C66GnWrczi7qgny1VnSH21ERUO-Ck",
            Section::Teaching => "13xcDqjb3H3pi7YxL1xagcitBSKM819YVQygLxA2imao",
            Section::Courses => "1Io_jlOW2DCYUxWAx-ID9DMEKj6spVxC39qHGE9Yr0uI",
            Section::Institutional => "1KxIj7Q56KZSU3Wt3f-jCQta9We5PjLaQRcDToFOUnOw",
            Section::ResearchProjects => "1vhIaWxQyXbHYg3pg64uHRiWjBxjrYUi3nwAqSEvXiNE",
            Section::JournalPublications => "1EhM_CNqgGIOOLE8Jox6au0HoSzNJA_riQntHHc1cnbQ",
            Section::ConferencePublications => "1dns2Fwn4nyn4asyf5id8DLaKFGmMTR6Thi7V8nxQM04",
            // Placeholder until a books sheet is published; fetch degrades to empty.
            Section::Books => "1YOUR_BOOKS_SHEET_ID_HERE",
            Section::Patents => "1cmRioDl_uyQnSMgU6cU1uPGK54xi4jw7S81u2BO-tk8",
            Section::Fdp => "1ghmPWbfuL7LM_ux8yg5dZORrqeNwzRX-rEUS3Uz_bno",
            Section::Memberships => "165e--aCI05iLXFJmZ2-umSkHIe6ujMMURKJKxU0t75o",
            Section::Responsibilities => "17Z9vsZ1TsQqloIokohBOqqvPpiD4DgOgPeSloxaFUZk",
            Section::Mentoring => "1MLhvuSIYKKNbPK8AFRnKO_lr4Y2L9_Nyri8kW7IL0wU",
            Section::Declaration => "1hdeoOOS-ZmN6KtWVmR3_c6TQaktm_2SgwriYEMYUews",
            Section::Awards => "1_4W_it4AOXdi0HuAp6XdXE0Qrf_PnycEbhSJGxJoe6k",
            Section::Extension => "1_5cv4lbOwX6NXfBn5M4JbB7eG5Xy0aW560dv-mKN5pM",
            Section::OnlineProfiles => "1MOkmZqXTPdF74hqTWZrv2PHFUrVHEIRVBCDNzWN_6NU",
            Section::ContactMe => "1fk22ajEN3Gus4AAjNBv-LgFgY2M3CDOcZOCk4vHqvr8",
        }
    }

    /// Sections drawn by a dedicated renderer instead of the generic table.
    pub fn is_specialized(self) -> bool {
        matches!(
            self,
            Section::BasicInfo
                | Section::ContactMe
                | Section::JournalPublications
                | Section::ConferencePublications
                | Section::Books
                | Section::ResearchProjects
        )
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.key() == s)
            .ok_or_else(|| PortfolioError::InvalidInput(format!("unknown section '{}'", s)))
    }
}

/// One registry entry: a section and the sheet it is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    pub section: Section,
    pub sheet_id: String,
}

/// Ordered mapping from section to sheet source.
///
/// The order of entries is the order sections are rendered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self {
            entries: Section::ALL
                .into_iter()
                .map(|section| SourceEntry {
                    section,
                    sheet_id: section.default_sheet_id().to_string(),
                })
                .collect(),
        }
    }
}

impl SourceRegistry {
    /// Builds a registry over an explicit list of entries. Later duplicates
    /// of a section are ignored.
    pub fn new(entries: impl IntoIterator<Item = (Section, String)>) -> Self {
        let mut out: Vec<SourceEntry> = Vec::new();
        for (section, sheet_id) in entries {
            if out.iter().any(|e| e.section == section) {
                tracing::warn!("Duplicate registry entry for {} ignored", section);
                continue;
            }
            out.push(SourceEntry { section, sheet_id });
        }
        Self { entries: out }
    }

    /// Replaces the sheet id of an existing section.
    pub fn with_sheet_id(mut self, section: Section, sheet_id: &str) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.section == section) {
            entry.sheet_id = sheet_id.to_string();
        }
        self
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn sections(&self) -> impl Iterator<Item = Section> + '_ {
        self.entries.iter().map(|e| e.section)
    }

    pub fn sheet_id(&self, section: Section) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.section == section)
            .map(|e| e.sheet_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
