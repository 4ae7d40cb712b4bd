use crate::profile::SkillSet;

/// Common skills offered by the profile editor as one-click additions.
pub const SUGGESTED_SKILLS: &[&str] = &[
    "JavaScript",
    "TypeScript",
    "React",
    "Node.js",
    "Python",
    "Java",
    "AWS",
    "Docker",
    "Kubernetes",
    "PostgreSQL",
    "MongoDB",
    "GraphQL",
    "REST API",
    "Git",
    "CI/CD",
    "Agile",
    "Scrum",
    "Machine Learning",
    "Data Analysis",
    "SQL",
    "Linux",
    "Azure",
    "GCP",
    "Terraform",
    "Redis",
    "ElasticSearch",
    "Microservices",
    "System Design",
];

/// Catalogue entries the profile does not already contain, in catalogue order.
pub fn available_suggestions(profile: &SkillSet) -> Vec<&'static str> {
    SUGGESTED_SKILLS
        .iter()
        .copied()
        .filter(|s| !profile.contains(s))
        .collect()
}
