//! Presentation of a session: the JSON the browser renders.
//!
//! All display wording lives here so every front end shows the same labels.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::extraction::job::{
    Citizenship, Experience, ExtractedJob, Location, RoleEstimate, Salary, SalaryRange,
    SponsorshipStatus, VisaSponsorship, WorkArrangement,
};
use crate::matching::skill_match::{MatchResult, MatchTier};
use crate::session::controller::{AnalysisOutcome, AnalysisSession, AnalysisState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Loading,
    Result,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Success,
    Warning,
    Destructive,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub tone: BadgeTone,
    pub label: String,
}

impl Badge {
    fn new(tone: BadgeTone, label: &str) -> Self {
        Self {
            tone,
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub input: String,
    pub status: SessionStatus,
    pub can_analyze: bool,
    /// Set while Loading, for the elapsed-time indicator.
    pub loading_since: Option<DateTime<Utc>>,
    pub result: Option<ResultView>,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub job: JobView,
    pub skill_match: MatchView,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub title: Option<String>,
    pub company: Option<String>,
    pub sponsorship: Badge,
    pub sponsorship_detail: Option<String>,
    pub salary: String,
    pub citizenship: Badge,
    pub security_clearance: bool,
    pub citizenship_detail: Option<String>,
    pub experience_level: Option<String>,
    pub experience_years: Option<String>,
    pub employment_type: Option<String>,
    pub location: Badge,
    pub place: Option<String>,
    pub skills: Vec<String>,
    pub role: Option<RoleEstimate>,
    pub predicted_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    #[serde(flatten)]
    pub result: MatchResult,
    pub tier: MatchTier,
    pub headline: &'static str,
    /// "3 of 5 skills matched"
    pub summary: String,
    /// Nothing matched but the job lists skills: point the user at the profile editor.
    pub suggest_profile_update: bool,
}

impl SessionView {
    pub fn build(id: Uuid, session: &AnalysisSession) -> Self {
        let mut loading_since = None;
        let (status, result, error) = match session.state() {
            AnalysisState::Idle => (SessionStatus::Idle, None, None),
            AnalysisState::Loading { started_at } => {
                loading_since = Some(*started_at);
                (SessionStatus::Loading, None, None)
            }
            AnalysisState::Result(outcome) => {
                (SessionStatus::Result, Some(ResultView::from(outcome)), None)
            }
            AnalysisState::Failed { message } => {
                (SessionStatus::Failed, None, Some(message.clone()))
            }
        };

        Self {
            id,
            input: session.input().to_string(),
            status,
            can_analyze: session.can_analyze(),
            loading_since,
            result,
            error,
            updated_at: session.updated_at(),
        }
    }
}

impl From<&AnalysisOutcome> for ResultView {
    fn from(outcome: &AnalysisOutcome) -> Self {
        Self {
            job: JobView::from(outcome.job.as_ref()),
            skill_match: MatchView::from(outcome.skill_match.clone()),
            analyzed_at: outcome.analyzed_at,
        }
    }
}

impl From<MatchResult> for MatchView {
    fn from(result: MatchResult) -> Self {
        let tier = MatchTier::from_percentage(result.match_percentage);
        let summary = format!(
            "{} of {} skills matched",
            result.matched_skills.len(),
            result.total()
        );
        let suggest_profile_update =
            result.matched_skills.is_empty() && !result.missing_skills.is_empty();
        Self {
            tier,
            headline: tier.label(),
            summary,
            suggest_profile_update,
            result,
        }
    }
}

impl From<&ExtractedJob> for JobView {
    fn from(job: &ExtractedJob) -> Self {
        let (citizenship, security_clearance, citizenship_detail) =
            citizenship_view(job.citizenship.as_ref());

        Self {
            title: job.title.clone(),
            company: job.company.clone(),
            sponsorship: sponsorship_badge(job.visa_sponsorship.as_ref()),
            sponsorship_detail: job
                .visa_sponsorship
                .as_ref()
                .and_then(|v| v.detail.clone()),
            salary: format_salary(job.salary.as_ref()),
            citizenship,
            security_clearance,
            citizenship_detail,
            experience_level: job
                .experience
                .as_ref()
                .map(|e| e.level.label().to_string()),
            experience_years: job.experience.as_ref().and_then(format_years),
            employment_type: job.employment_type.clone(),
            location: location_badge(job.location.as_ref()),
            place: job.location.as_ref().and_then(format_place),
            skills: job.skills.clone(),
            role: job.role.clone(),
            predicted_skills: job.predicted_skills.clone(),
        }
    }
}

fn sponsorship_badge(visa: Option<&VisaSponsorship>) -> Badge {
    match visa.map(|v| v.status) {
        Some(SponsorshipStatus::Sponsors) => Badge::new(BadgeTone::Success, "Sponsors H1B"),
        Some(SponsorshipStatus::DoesNotSponsor) => {
            Badge::new(BadgeTone::Destructive, "No H1B Sponsorship")
        }
        Some(SponsorshipStatus::NotMentioned) | None => {
            Badge::new(BadgeTone::Muted, "Not Mentioned")
        }
    }
}

fn citizenship_view(citizenship: Option<&Citizenship>) -> (Badge, bool, Option<String>) {
    match citizenship {
        Some(c) if c.required => (
            Badge::new(BadgeTone::Destructive, "US Citizenship Required"),
            c.security_clearance,
            c.detail.clone(),
        ),
        Some(c) => (
            Badge::new(BadgeTone::Success, "No Citizenship Requirement"),
            c.security_clearance,
            c.detail.clone(),
        ),
        None => (Badge::new(BadgeTone::Muted, "Not Specified"), false, None),
    }
}

fn location_badge(location: Option<&Location>) -> Badge {
    match location.map(|l| l.arrangement) {
        Some(WorkArrangement::Remote) => Badge::new(BadgeTone::Success, "Remote"),
        Some(WorkArrangement::Hybrid) => Badge::new(BadgeTone::Warning, "Hybrid"),
        Some(WorkArrangement::Onsite) => Badge::new(BadgeTone::Muted, "On-site"),
        Some(WorkArrangement::Unspecified) | None => Badge::new(BadgeTone::Muted, "Not Specified"),
    }
}

fn format_place(location: &Location) -> Option<String> {
    let parts: Vec<&str> = [&location.city, &location.state, &location.country]
        .into_iter()
        .filter_map(|p| p.as_deref())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn format_years(experience: &Experience) -> Option<String> {
    match (experience.years_min, experience.years_max) {
        (Some(min), Some(max)) => Some(format!("{min}-{max} years")),
        (Some(min), None) => Some(format!("{min}+ years")),
        (None, Some(max)) => Some(format!("Up to {max} years")),
        (None, None) => None,
    }
}

pub fn format_salary(salary: Option<&Salary>) -> String {
    match salary {
        Some(Salary::Structured(range)) => format_range(range),
        Some(Salary::Raw { text }) => text.clone(),
        None => "Not specified".to_string(),
    }
}

fn format_range(range: &SalaryRange) -> String {
    let symbol = currency_symbol(range.currency.as_deref());
    let amounts = match (range.min, range.max) {
        (Some(min), Some(max)) => format!(
            "{symbol}{} - {symbol}{}",
            format_amount(min),
            format_amount(max)
        ),
        (Some(min), None) => format!("From {symbol}{}", format_amount(min)),
        (None, Some(max)) => format!("Up to {symbol}{}", format_amount(max)),
        (None, None) => return "Not specified".to_string(),
    };
    match &range.period {
        Some(period) => format!("{amounts} / {period}"),
        None => amounts,
    }
}

fn currency_symbol(currency: Option<&str>) -> String {
    match currency.map(|c| c.trim().to_uppercase()).as_deref() {
        None | Some("") | Some("USD") | Some("$") => "$".to_string(),
        Some("EUR") | Some("€") => "€".to_string(),
        Some("GBP") | Some("£") => "£".to_string(),
        Some(code) => format!("{code} "),
    }
}

/// 150000 → "150,000"; 47.5 → "47.50".
fn format_amount(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = (cents % 100).abs();

    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        grouped.insert(0, '-');
    }

    if frac == 0 {
        grouped
    } else {
        format!("{grouped}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::job::ExperienceLevel;

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(150_000.0), "150,000");
        assert_eq!(format_amount(1_250_000.0), "1,250,000");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(47.84), "47.84");
    }

    #[test]
    fn test_format_salary_structured_range() {
        let salary = Salary::Structured(SalaryRange {
            min: Some(150_000.0),
            max: Some(200_000.0),
            currency: Some("USD".to_string()),
            period: Some("year".to_string()),
        });
        assert_eq!(format_salary(Some(&salary)), "$150,000 - $200,000 / year");
    }

    #[test]
    fn test_format_salary_raw_and_absent() {
        let raw = Salary::Raw {
            text: "Competitive".to_string(),
        };
        assert_eq!(format_salary(Some(&raw)), "Competitive");
        assert_eq!(format_salary(None), "Not specified");
    }

    #[test]
    fn test_format_years_variants() {
        let exp = |min, max| Experience {
            level: ExperienceLevel::Senior,
            years_min: min,
            years_max: max,
        };
        assert_eq!(format_years(&exp(Some(5), Some(8))).as_deref(), Some("5-8 years"));
        assert_eq!(format_years(&exp(Some(5), None)).as_deref(), Some("5+ years"));
        assert_eq!(format_years(&exp(None, Some(3))).as_deref(), Some("Up to 3 years"));
        assert_eq!(format_years(&exp(None, None)), None);
    }

    #[test]
    fn test_not_extracted_and_silent_render_differently_for_citizenship() {
        let (absent, _, _) = citizenship_view(None);
        assert_eq!(absent.label, "Not Specified");

        let silent = Citizenship::default();
        let (badge, clearance, _) = citizenship_view(Some(&silent));
        assert_eq!(badge.label, "No Citizenship Requirement");
        assert!(!clearance);
    }

    #[test]
    fn test_job_view_badges() {
        let job = ExtractedJob {
            visa_sponsorship: Some(VisaSponsorship {
                status: SponsorshipStatus::DoesNotSponsor,
                detail: None,
            }),
            location: Some(Location {
                arrangement: WorkArrangement::Hybrid,
                city: Some("San Francisco".to_string()),
                state: Some("CA".to_string()),
                country: None,
            }),
            ..ExtractedJob::default()
        };
        let view = JobView::from(&job);
        assert_eq!(view.sponsorship.tone, BadgeTone::Destructive);
        assert_eq!(view.location.label, "Hybrid");
        assert_eq!(view.place.as_deref(), Some("San Francisco, CA"));
        assert_eq!(view.salary, "Not specified");
    }

    #[test]
    fn test_match_view_summary_and_cta() {
        let view = MatchView::from(MatchResult {
            matched_skills: vec![],
            missing_skills: vec!["Rust".to_string(), "Go".to_string()],
            match_percentage: 0,
        });
        assert_eq!(view.summary, "0 of 2 skills matched");
        assert_eq!(view.headline, "Low Match");
        assert!(view.suggest_profile_update);

        let empty = MatchView::from(MatchResult::empty());
        assert!(!empty.suggest_profile_update);
    }

    #[test]
    fn test_session_view_reflects_state() {
        let mut session = AnalysisSession::new();
        session.set_input("text");
        let id = Uuid::new_v4();

        let idle = SessionView::build(id, &session);
        assert_eq!(idle.status, SessionStatus::Idle);
        assert!(idle.can_analyze);
        assert!(idle.loading_since.is_none());

        session.begin_analyze().unwrap();
        let loading = SessionView::build(id, &session);
        assert_eq!(loading.status, SessionStatus::Loading);
        assert!(!loading.can_analyze);
        assert!(loading.result.is_none());
        assert!(loading.loading_since.is_some());
    }
}
