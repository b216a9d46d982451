//! Keyword based skill extraction from repository metadata.
//!
//! Matching is substring based, so short keywords can hit inside longer words
//! ("go" inside "django"). Callers merge the result into declared skills and
//! never remove anything.

use std::collections::BTreeSet;

use super::provider::ProviderRepository;

pub const SKILL_KEYWORDS: &[&str] = &[
    // languages
    "javascript", "typescript", "python", "java", "cpp", "c++", "c#", "csharp", "php", "ruby",
    "go", "rust", "kotlin", "swift", "dart", "scala",
    // web
    "react", "vue", "angular", "nodejs", "node.js", "express", "nestjs", "django", "flask",
    "laravel", "spring", "asp.net", "rails",
    // data stores
    "mysql", "postgresql", "mongodb", "redis", "elasticsearch", "sqlite",
    // cloud and ops
    "docker", "kubernetes", "aws", "azure", "gcp", "terraform", "ansible",
    // mobile
    "android", "ios", "flutter", "react-native", "xamarin",
    // other
    "graphql", "rest", "api", "microservices", "blockchain", "machine-learning",
    "artificial-intelligence", "data-science", "analytics",
];

/// Skills evidenced by the given repositories. Forks are ignored.
pub fn extract_skills(repositories: &[ProviderRepository]) -> BTreeSet<String> {
    let mut skills = BTreeSet::new();

    for repository in repositories.iter().filter(|repository| !repository.fork) {
        if let Some(language) = repository.language.as_deref() {
            let language = language.trim().to_lowercase();
            if !language.is_empty() {
                skills.insert(language);
            }
        }

        for topic in &repository.topics {
            let topic = topic.to_lowercase().replace('-', "");
            if topic.is_empty() {
                continue;
            }
            let known = SKILL_KEYWORDS
                .iter()
                .any(|keyword| topic.contains(keyword) || keyword.contains(topic.as_str()));
            if known {
                skills.insert(topic);
            }
        }

        let text = format!(
            "{} {}",
            repository.name,
            repository.description.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        for keyword in SKILL_KEYWORDS {
            if text.contains(keyword) {
                skills.insert((*keyword).to_string());
            }
        }
    }

    skills
}
