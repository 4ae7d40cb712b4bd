//! Wire format of the extraction service reply and its mapping into `ExtractedJob`.
//!
//! The reply is read tolerantly: every field may be missing or null, and the
//! flat string forms the service emits today ("Yes", "Madison, WI",
//! "$150,000 - $180,000 per year") are accepted alongside structured objects.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::extraction::job::{
    Citizenship, Experience, ExperienceLevel, ExtractedJob, Location, RoleEstimate, Salary,
    SalaryRange, SponsorshipStatus, VisaSponsorship, WorkArrangement,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServiceJob {
    pub company: Option<String>,
    pub title: Option<String>,
    #[serde(alias = "employment_type", alias = "employmentType")]
    pub job_type: Option<String>,
    pub location: Option<WireLocation>,
    pub salary: Option<WireSalary>,
    pub experience: Option<WireExperience>,
    #[serde(alias = "h1bSponsorship")]
    pub h1b_sponsorship: Option<WireSponsorship>,
    pub citizenship: Option<WireCitizenship>,
    #[serde(alias = "skills")]
    pub skills_extracted: Option<Vec<String>>,
    pub role_category: Option<String>,
    pub role_confidence: Option<f64>,
    pub predicted_top_skills: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireLocation {
    Text(String),
    Structured {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        #[serde(default)]
        city: Option<String>,
        #[serde(default)]
        state: Option<String>,
        #[serde(default)]
        country: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireSalary {
    Text(String),
    Structured {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        currency: Option<String>,
        #[serde(default)]
        period: Option<String>,
        #[serde(default)]
        raw: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireSponsorship {
    Text(String),
    Structured {
        #[serde(default)]
        status: Option<String>,
        #[serde(default, alias = "detail")]
        details: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireExperience {
    pub level: Option<String>,
    #[serde(alias = "yearsMin")]
    pub years_min: Option<u32>,
    #[serde(alias = "yearsMax")]
    pub years_max: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireCitizenship {
    pub required: bool,
    #[serde(alias = "securityClearance")]
    pub security_clearance: bool,
    #[serde(alias = "detail")]
    pub details: Option<String>,
}

impl From<ServiceJob> for ExtractedJob {
    fn from(wire: ServiceJob) -> Self {
        let role = match (non_blank(wire.role_category), wire.role_confidence) {
            (Some(category), Some(confidence)) => Some(RoleEstimate {
                category,
                confidence: confidence.clamp(0.0, 1.0),
            }),
            (Some(category), None) => Some(RoleEstimate {
                category,
                confidence: 0.0,
            }),
            _ => None,
        };

        ExtractedJob {
            visa_sponsorship: wire.h1b_sponsorship.map(map_sponsorship),
            salary: wire.salary.and_then(map_salary),
            citizenship: wire.citizenship.map(|c| Citizenship {
                required: c.required,
                security_clearance: c.security_clearance,
                detail: non_blank(c.details),
            }),
            experience: wire.experience.map(|e| Experience {
                level: e
                    .level
                    .as_deref()
                    .map(ExperienceLevel::from_label)
                    .unwrap_or(ExperienceLevel::NotSpecified),
                years_min: e.years_min,
                years_max: e.years_max,
            }),
            skills: wire.skills_extracted.unwrap_or_default(),
            location: wire.location.and_then(map_location),
            company: specified(wire.company),
            title: specified(wire.title),
            employment_type: specified(wire.job_type),
            role,
            predicted_skills: wire.predicted_top_skills.unwrap_or_default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Like `non_blank`, also dropping the service's "Not Specified" placeholder.
fn specified(value: Option<String>) -> Option<String> {
    non_blank(value).filter(|v| !v.eq_ignore_ascii_case("not specified"))
}

// ────────────────────────────────────────────────────────────────────────────
// Sponsorship
// ────────────────────────────────────────────────────────────────────────────

fn map_sponsorship(wire: WireSponsorship) -> VisaSponsorship {
    let (status, detail) = match wire {
        WireSponsorship::Text(text) => (text, None),
        WireSponsorship::Structured { status, details } => {
            (status.unwrap_or_default(), non_blank(details))
        }
    };

    match parse_sponsorship_status(&status) {
        Some(status) => VisaSponsorship { status, detail },
        // Unrecognized wording is kept as detail rather than guessed at.
        None => VisaSponsorship {
            status: SponsorshipStatus::NotMentioned,
            detail: detail.or_else(|| non_blank(Some(status))),
        },
    }
}

fn parse_sponsorship_status(text: &str) -> Option<SponsorshipStatus> {
    match text.trim().to_lowercase().as_str() {
        "yes" | "true" | "sponsors" => Some(SponsorshipStatus::Sponsors),
        "no" | "false" | "does_not_sponsor" | "does not sponsor" => {
            Some(SponsorshipStatus::DoesNotSponsor)
        }
        "" | "not mentioned" | "not_mentioned" | "unknown" => Some(SponsorshipStatus::NotMentioned),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Location
// ────────────────────────────────────────────────────────────────────────────

fn arrangement_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(remote|hybrid|on-?site|on site|in[- ]office)\b")
            .unwrap_or_else(|_| Regex::new("^$").unwrap())
    })
}

fn map_location(wire: WireLocation) -> Option<Location> {
    match wire {
        WireLocation::Text(text) => parse_location_text(&text),
        WireLocation::Structured {
            kind,
            city,
            state,
            country,
        } => Some(Location {
            arrangement: kind
                .as_deref()
                .and_then(parse_arrangement)
                .unwrap_or(WorkArrangement::Unspecified),
            city: non_blank(city),
            state: non_blank(state),
            country: non_blank(country),
        }),
    }
}

fn parse_arrangement(text: &str) -> Option<WorkArrangement> {
    let lower = text.trim().to_lowercase();
    match lower.replace(['-', ' '], "").as_str() {
        "remote" => Some(WorkArrangement::Remote),
        "hybrid" => Some(WorkArrangement::Hybrid),
        "onsite" | "inoffice" => Some(WorkArrangement::Onsite),
        _ => None,
    }
}

/// "Madison, WI" → city/state; "Remote" → arrangement only;
/// "Hybrid (San Francisco, CA)" → both.
pub fn parse_location_text(text: &str) -> Option<Location> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let pattern = arrangement_pattern();
    let arrangement = pattern
        .find(text)
        .and_then(|m| parse_arrangement(m.as_str()))
        .unwrap_or(WorkArrangement::Unspecified);

    let place = pattern.replace_all(text, "");
    let mut parts = place
        .split(',')
        .map(|p| p.trim_matches(|c: char| c.is_whitespace() || "()-/".contains(c)))
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let city = parts.next();
    let state = parts.next();
    let rest: Vec<String> = parts.collect();
    let country = if rest.is_empty() {
        None
    } else {
        Some(rest.join(", "))
    };

    Some(Location {
        arrangement,
        city,
        state,
        country,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Salary
// ────────────────────────────────────────────────────────────────────────────

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\$)?\s*(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*(k\b)?")
            .unwrap_or_else(|_| Regex::new("^$").unwrap())
    })
}

fn period_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(per\s*hour|/\s*h(?:ou)?r\b|hourly|an\s*hour)|(per\s*year|/\s*y(?:ea)?r\b|annually|annual|a\s*year)|(per\s*month|/\s*mo(?:nth)?\b|monthly)",
        )
        .unwrap_or_else(|_| Regex::new("^$").unwrap())
    })
}

fn map_salary(wire: WireSalary) -> Option<Salary> {
    match wire {
        WireSalary::Text(text) => parse_salary_text(&text),
        WireSalary::Structured {
            min,
            max,
            currency,
            period,
            raw,
        } => {
            if min.is_some() && max.is_some() {
                Some(Salary::Structured(SalaryRange {
                    min,
                    max,
                    currency: non_blank(currency),
                    period: non_blank(period),
                }))
            } else if let Some(text) = non_blank(raw) {
                Some(Salary::Raw { text })
            } else if min.is_some() || max.is_some() {
                Some(Salary::Structured(SalaryRange {
                    min,
                    max,
                    currency: non_blank(currency),
                    period: non_blank(period),
                }))
            } else {
                None
            }
        }
    }
}

/// Parses a dollar range such as "$150,000 - $180,000 per year" or "120k - 150k".
/// Anything without two recognizable amounts is kept as raw text.
pub fn parse_salary_text(text: &str) -> Option<Salary> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut saw_dollar = false;
    let amounts: Vec<f64> = amount_pattern()
        .captures_iter(text)
        .filter_map(|caps| {
            let dollar = caps.get(1).is_some();
            let thousands = caps.get(3).is_some();
            if !dollar && !thousands {
                return None;
            }
            saw_dollar |= dollar;
            let value: f64 = caps.get(2)?.as_str().replace(',', "").parse().ok()?;
            Some(if thousands { value * 1000.0 } else { value })
        })
        .take(2)
        .collect();

    if amounts.len() < 2 {
        return Some(Salary::Raw {
            text: text.to_string(),
        });
    }

    let (min, max) = if amounts[0] <= amounts[1] {
        (amounts[0], amounts[1])
    } else {
        (amounts[1], amounts[0])
    };

    let period = period_pattern().captures(text).and_then(|caps| {
        if caps.get(1).is_some() {
            Some("hour")
        } else if caps.get(2).is_some() {
            Some("year")
        } else if caps.get(3).is_some() {
            Some("month")
        } else {
            None
        }
    });

    Some(Salary::Structured(SalaryRange {
        min: Some(min),
        max: Some(max),
        currency: saw_dollar.then(|| "USD".to_string()),
        period: period.map(str::to_string),
    }))
}
