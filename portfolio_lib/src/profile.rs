//! Views for the sections drawn by dedicated renderers: the identity hero,
//! the combined research & publications block, and the contact block.

use std::sync::OnceLock;
use std::time::Instant;

use regex::Regex;
use serde::Serialize;
use sheets_api::Record;

use crate::aggregate::PortfolioData;
use crate::contact::form::{mailto_link, ContactForm, ContactStatus, DISPLAY_WINDOW};
use crate::contact::types::PURPOSES;
use crate::normalize::{ABOUT, GITHUB, GOOGLE_SCHOLAR, LINKEDIN, MAIL, ORCID, SCOPUS};
use crate::render::SectionView;
use crate::section::Section;

const OFFICIAL_EMAIL: &str = "Official Email";

/// Counts shown in the hero. Raw record counts, including blank rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublicationStats {
    pub journals: usize,
    pub conferences: usize,
    pub books: usize,
}

impl PublicationStats {
    pub fn from_data(data: &PortfolioData) -> Self {
        Self {
            journals: data.rows(Section::JournalPublications).len(),
            conferences: data.rows(Section::ConferencePublications).len(),
            books: data.rows(Section::Books).len(),
        }
    }

    pub fn any(&self) -> bool {
        self.journals > 0 || self.conferences > 0 || self.books > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SocialLinks {
    pub mail: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub orcid: Option<String>,
    pub google_scholar: Option<String>,
    pub scopus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkView {
    pub label: &'static str,
    pub href: String,
    /// Opens in a new tab; false for in-page anchors.
    pub external: bool,
}

impl LinkView {
    fn external(label: &'static str, href: String) -> Self {
        Self {
            label,
            href,
            external: true,
        }
    }
}

/// Prefixes `https://` onto values without an http(s) scheme.
fn ensure_scheme(link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{}", link)
    }
}

/// A bare ORCID iD becomes its orcid.org profile URL.
fn orcid_url(value: &str) -> String {
    if value.starts_with("http") {
        ensure_scheme(value)
    } else {
        format!("https://orcid.org/{}", value)
    }
}

impl SocialLinks {
    pub fn from_data(data: &PortfolioData) -> Self {
        let contact = data.first(Section::ContactMe);
        let basic = data.first(Section::BasicInfo);
        let pick = |record: Option<&Record>, column: &str| {
            record
                .and_then(|r| r.non_empty(column))
                .map(str::to_string)
        };
        Self {
            mail: pick(contact, MAIL),
            github: pick(contact, GITHUB),
            linkedin: pick(contact, LINKEDIN),
            orcid: pick(basic, ORCID),
            google_scholar: pick(basic, GOOGLE_SCHOLAR),
            scopus: pick(basic, SCOPUS),
        }
    }

    /// Links in display order. Email always points at the contact form;
    /// the rest appear only when set and are made absolute.
    pub fn to_links(&self) -> Vec<LinkView> {
        let mut links = vec![LinkView {
            label: "Email",
            href: "#contact".to_string(),
            external: false,
        }];
        let profiles = [
            ("GitHub", self.github.as_deref().map(ensure_scheme)),
            ("LinkedIn", self.linkedin.as_deref().map(ensure_scheme)),
            ("ORCID", self.orcid.as_deref().map(orcid_url)),
            ("Google Scholar", self.google_scholar.as_deref().map(ensure_scheme)),
            ("Scopus", self.scopus.as_deref().map(ensure_scheme)),
        ];
        links.extend(
            profiles
                .into_iter()
                .filter_map(|(label, href)| href.map(|href| LinkView::external(label, href))),
        );
        links
    }
}

/// Identity block built from the first `basicInfo` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub full_name: String,
    pub designation: String,
    pub department: String,
    pub institution: Option<String>,
    pub employee_id: Option<String>,
    pub official_email: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub about: Option<String>,
}

impl Identity {
    pub fn from_record(record: &Record) -> Self {
        let opt = |column: &str| record.non_empty(column).map(str::to_string);
        Self {
            full_name: opt("Full Name").unwrap_or_else(|| "Faculty Member".to_string()),
            designation: opt("Designation").unwrap_or_else(|| "Designation".to_string()),
            department: opt("Department").unwrap_or_default(),
            institution: opt("Institution Name"),
            employee_id: opt("Employee ID"),
            official_email: opt(OFFICIAL_EMAIL),
            phone: opt("Phone Number"),
            photo: record.non_empty("Profile Photo Link").map(photo_url),
            about: opt(ABOUT),
        }
    }

    pub fn from_data(data: &PortfolioData) -> Option<Self> {
        data.first(Section::BasicInfo).map(Self::from_record)
    }
}

fn drive_id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [r"/d/([a-zA-Z0-9_-]{25,})", r"[?&]id=([a-zA-Z0-9_-]{25,})"]
            .into_iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::error!("Invalid drive id pattern {}: {}", pattern, e);
                    None
                }
            })
            .collect()
    })
}

/// Rewrites Google Drive share links to the thumbnail endpoint so they can
/// be embedded as images. Other URLs are returned unchanged.
pub fn photo_url(url: &str) -> String {
    if !url.contains("drive.google.com") {
        return url.to_string();
    }
    let id = drive_id_patterns()
        .iter()
        .find_map(|re| re.captures(url).and_then(|c| c.get(1)))
        .map(|m| m.as_str());
    match id {
        Some(id) => format!("https://drive.google.com/thumbnail?id={}&sz=w1000", id),
        None => url.to_string(),
    }
}

/// Hero data passed to the `hero` template.
#[derive(Debug, Clone, Serialize)]
pub struct HeroView {
    #[serde(flatten)]
    pub identity: Identity,
    pub stats: Option<PublicationStats>,
    pub links: Vec<LinkView>,
}

impl HeroView {
    pub fn from_data(data: &PortfolioData) -> Option<Self> {
        let identity = Identity::from_data(data)?;
        let stats = PublicationStats::from_data(data);
        Some(Self {
            identity,
            stats: stats.any().then_some(stats),
            links: SocialLinks::from_data(data).to_links(),
        })
    }
}

/// The combined research & publications block.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchBlock {
    pub subsections: Vec<SectionView>,
}

impl ResearchBlock {
    /// `None` when no research sub-section has a valid record.
    pub fn from_data(data: &PortfolioData) -> Option<Self> {
        let subsections: Vec<SectionView> = Section::RESEARCH
            .into_iter()
            .filter_map(|s| SectionView::build(s.key(), s.subsection_title(), data.rows(s)))
            .collect();
        if subsections.is_empty() {
            None
        } else {
            Some(Self { subsections })
        }
    }
}

/// Recipient of contact-form messages: the contact sheet's mail cell, then
/// the identity's official email, then the configured fallback address.
pub fn target_email(data: Option<&PortfolioData>, fallback: &str) -> String {
    let Some(data) = data else {
        return fallback.to_string();
    };
    data.first(Section::ContactMe)
        .and_then(|r| r.non_empty(MAIL))
        .or_else(|| {
            data.first(Section::BasicInfo)
                .and_then(|r| r.non_empty(OFFICIAL_EMAIL))
        })
        .unwrap_or(fallback)
        .to_string()
}

/// Outcome banner shown above the contact form after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactBanner {
    pub success: bool,
    /// Prefilled `mailto:` link; only set on failure.
    pub mailto: Option<String>,
    pub refresh_secs: u64,
}

impl ContactBanner {
    pub fn success() -> Self {
        Self {
            success: true,
            mailto: None,
            refresh_secs: DISPLAY_WINDOW.as_secs(),
        }
    }

    pub fn failure(target_email: &str, subject: &str, message: &str) -> Self {
        Self {
            success: false,
            mailto: Some(mailto_link(target_email, subject, message)),
            refresh_secs: DISPLAY_WINDOW.as_secs(),
        }
    }

    /// Banner for the form's current outcome; `None` while idle or in flight.
    /// The page refreshes once the outcome's display window runs out.
    pub fn from_form(form: &ContactForm, now: Instant) -> Option<Self> {
        let left = form.time_left(now)?;
        let refresh_secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
        let success = form.status_at(now) == ContactStatus::Success;
        Some(Self {
            success,
            mailto: form.failure_mailto(now).map(str::to_string),
            refresh_secs: refresh_secs.max(1),
        })
    }
}

/// Data for the `contact` template.
#[derive(Debug, Clone, Serialize)]
pub struct ContactBlock {
    pub target_email: String,
    pub purposes: &'static [&'static str],
    pub banner: Option<ContactBanner>,
}

impl ContactBlock {
    pub fn new(data: Option<&PortfolioData>, fallback_email: &str) -> Self {
        Self {
            target_email: target_email(data, fallback_email),
            purposes: &PURPOSES,
            banner: None,
        }
    }

    pub fn with_banner(mut self, banner: Option<ContactBanner>) -> Self {
        self.banner = banner;
        self
    }
}
