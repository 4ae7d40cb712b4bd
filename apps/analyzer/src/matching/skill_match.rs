//! Skill Match: measures a user's skill profile against a job's extracted skills.
//!
//! Matching is substring containment in either direction after normalization,
//! so "react" covers "react.js" and "react native", and "postgresql" covers "sql".
//! It favours recall; there is no token or edit-distance check.

use serde::{Deserialize, Serialize};

use crate::profile::normalize_skill;

/// Result of matching one profile against one job's skill list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Job skills covered by the profile, in job order and job casing.
    pub matched_skills: Vec<String>,
    /// Job skills not covered, in job order and job casing.
    pub missing_skills: Vec<String>,
    pub match_percentage: u8, // 0-100
}

impl MatchResult {
    pub fn empty() -> Self {
        Self {
            matched_skills: vec![],
            missing_skills: vec![],
            match_percentage: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.matched_skills.len() + self.missing_skills.len()
    }
}

/// Computes matched/missing job skills and the rounded match percentage.
///
/// Both inputs are normalized here regardless of where they came from. Blank
/// entries never match: a blank user skill would otherwise be a substring of
/// every job skill.
pub fn match_skills<U, J>(user_skills: U, job_skills: &[J]) -> MatchResult
where
    U: IntoIterator,
    U::Item: AsRef<str>,
    J: AsRef<str>,
{
    if job_skills.is_empty() {
        return MatchResult::empty();
    }

    let user: Vec<String> = user_skills
        .into_iter()
        .map(|s| normalize_skill(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect();

    let mut matched_skills = Vec::new();
    let mut missing_skills = Vec::new();

    for job_skill in job_skills {
        let original = job_skill.as_ref();
        let normalized = normalize_skill(original);

        let covered = !normalized.is_empty()
            && user
                .iter()
                .any(|u| u.contains(normalized.as_str()) || normalized.contains(u.as_str()));

        if covered {
            matched_skills.push(original.to_string());
        } else {
            missing_skills.push(original.to_string());
        }
    }

    let match_percentage = percentage_half_up(matched_skills.len(), job_skills.len());

    MatchResult {
        matched_skills,
        missing_skills,
        match_percentage,
    }
}

/// round(100 × part / whole), halves rounded up, computed in integers.
fn percentage_half_up(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = (200 * part + whole) / (2 * whole);
    pct.min(100) as u8
}

// ────────────────────────────────────────────────────────────────────────────
// Match tier
// ────────────────────────────────────────────────────────────────────────────

/// Coarse banding of a match percentage, used for the headline of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Great,
    Partial,
    Low,
}

impl MatchTier {
    pub fn from_percentage(pct: u8) -> Self {
        if pct >= 70 {
            MatchTier::Great
        } else if pct >= 40 {
            MatchTier::Partial
        } else {
            MatchTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchTier::Great => "Great Match!",
            MatchTier::Partial => "Partial Match",
            MatchTier::Low => "Low Match",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SkillSet;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reference_scenario_half_match() {
        let result = match_skills(["python", "sql"], &["Python", "AWS", "SQL", "Docker"]);
        assert_eq!(result.matched_skills, skills(&["Python", "SQL"]));
        assert_eq!(result.missing_skills, skills(&["AWS", "Docker"]));
        assert_eq!(result.match_percentage, 50);
    }

    #[test]
    fn test_empty_job_skills_is_zero_not_nan() {
        let result = match_skills(["rust"], &[] as &[&str]);
        assert_eq!(result, MatchResult::empty());
    }

    #[test]
    fn test_empty_user_skills_all_missing_in_order() {
        let job = ["Go", "Kafka", "gRPC"];
        let result = match_skills(Vec::<String>::new(), &job);
        assert_eq!(result.match_percentage, 0);
        assert!(result.matched_skills.is_empty());
        assert_eq!(result.missing_skills, skills(&job));
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let a = match_skills(["  React  "], &["react"]);
        assert_eq!(a.matched_skills, skills(&["react"]));
        assert_eq!(a.match_percentage, 100);

        let b = match_skills(["react"], &["REACT"]);
        assert_eq!(b.matched_skills, skills(&["REACT"]));
        assert_eq!(b.match_percentage, 100);
    }

    #[test]
    fn test_substring_containment_both_directions() {
        let job_longer = match_skills(["react"], &["react native"]);
        assert_eq!(job_longer.matched_skills, skills(&["react native"]));

        let user_longer = match_skills(["react.js"], &["React"]);
        assert_eq!(user_longer.matched_skills, skills(&["React"]));
    }

    #[test]
    fn test_blank_user_skill_matches_nothing() {
        let result = match_skills(["   ", ""], &["Rust", "Go"]);
        assert_eq!(result.match_percentage, 0);
        assert_eq!(result.missing_skills.len(), 2);
    }

    #[test]
    fn test_blank_job_skill_is_missing() {
        let result = match_skills(["rust"], &["Rust", "  "]);
        assert_eq!(result.matched_skills, skills(&["Rust"]));
        assert_eq!(result.missing_skills, skills(&["  "]));
        assert_eq!(result.match_percentage, 50);
    }

    #[test]
    fn test_rounding_is_half_up() {
        // 1/3 → 33.33 → 33
        assert_eq!(match_skills(["a"], &["a", "x", "y"]).match_percentage, 33);
        // 2/3 → 66.67 → 67
        assert_eq!(match_skills(["a", "b"], &["a", "b", "y"]).match_percentage, 67);
        // 1/8 → 12.5 → 13
        let job = ["a", "q", "w", "e", "r", "t", "y", "u"];
        assert_eq!(match_skills(["a"], &job).match_percentage, 13);
    }

    #[test]
    fn test_counts_partition_job_skills() {
        let job = ["Rust", "Tokio", "SQL", "PostgreSQL", "Kubernetes", "rust"];
        let result = match_skills(["rust", "sql"], &job);
        assert_eq!(result.total(), job.len());
        assert!(result.match_percentage <= 100);
        assert_eq!(
            result.matched_skills,
            skills(&["Rust", "SQL", "PostgreSQL", "rust"])
        );
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let profile: SkillSet = ["docker", "aws"].into_iter().collect();
        let job = ["AWS Lambda", "Docker", "Terraform"];
        assert_eq!(match_skills(&profile, &job), match_skills(&profile, &job));
    }

    #[test]
    fn test_full_match_is_100() {
        let result = match_skills(["go"], &["Go", "golang"]);
        assert_eq!(result.match_percentage, 100);
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(MatchTier::from_percentage(100), MatchTier::Great);
        assert_eq!(MatchTier::from_percentage(70), MatchTier::Great);
        assert_eq!(MatchTier::from_percentage(69), MatchTier::Partial);
        assert_eq!(MatchTier::from_percentage(40), MatchTier::Partial);
        assert_eq!(MatchTier::from_percentage(39), MatchTier::Low);
        assert_eq!(MatchTier::from_percentage(0).label(), "Low Match");
    }
}
