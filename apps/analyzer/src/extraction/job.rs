//! ExtractedJob: the structured record produced by analyzing one job description.
//!
//! `None` on an attribute means the extraction service did not produce it. Values
//! such as `SponsorshipStatus::NotMentioned` or `WorkArrangement::Unspecified`
//! mean it was extracted and the posting is silent on the point.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SponsorshipStatus {
    Sponsors,
    DoesNotSponsor,
    NotMentioned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisaSponsorship {
    pub status: SponsorshipStatus,
    pub detail: Option<String>,
}

/// Salary is either a parsed range or the text exactly as the posting wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Salary {
    Structured(SalaryRange),
    Raw { text: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
    /// "hour", "year", ...
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citizenship {
    pub required: bool,
    pub security_clearance: bool,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    EntryLevel,
    MidLevel,
    Senior,
    Executive,
    NotSpecified,
    Other(String),
}

impl ExperienceLevel {
    /// Maps the service's label ("Entry-Level", "Senior", ...) onto a level.
    pub fn from_label(label: &str) -> Self {
        let key: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match key.as_str() {
            "entrylevel" | "entry" | "junior" => ExperienceLevel::EntryLevel,
            "midlevel" | "mid" | "intermediate" => ExperienceLevel::MidLevel,
            "senior" => ExperienceLevel::Senior,
            "executive" => ExperienceLevel::Executive,
            "" | "notspecified" | "unknown" => ExperienceLevel::NotSpecified,
            _ => ExperienceLevel::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ExperienceLevel::EntryLevel => "Entry-Level",
            ExperienceLevel::MidLevel => "Mid-Level",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Executive => "Executive",
            ExperienceLevel::NotSpecified => "Not Specified",
            ExperienceLevel::Other(label) => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub level: ExperienceLevel,
    pub years_min: Option<u32>,
    pub years_max: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkArrangement {
    Remote,
    Hybrid,
    Onsite,
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub arrangement: WorkArrangement,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Role classifier output from the extraction service. Display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleEstimate {
    pub category: String,
    pub confidence: f64, // 0.0-1.0
}

/// Full structured output of one extraction. Never patched after construction;
/// a new analysis builds a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedJob {
    pub visa_sponsorship: Option<VisaSponsorship>,
    pub salary: Option<Salary>,
    pub citizenship: Option<Citizenship>,
    pub experience: Option<Experience>,
    /// As extracted; not normalized.
    pub skills: Vec<String>,
    pub location: Option<Location>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub employment_type: Option<String>,
    pub role: Option<RoleEstimate>,
    pub predicted_skills: Vec<String>,
}
