//! Seed data and generated fixtures for load testing

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::model::{now, ImportTodo, Priority};
use crate::validation::validate_import;

const TITLES: &[&str] = &[
    "Finish project documentation",
    "Review frontend code",
    "Set up CI/CD pipeline",
    "Optimize database queries",
    "Update dependencies",
    "Write unit tests",
    "Design user interface",
    "Fix reported bugs",
    "Refactor legacy components",
    "Set up application monitoring",
    "Implement token authentication",
    "Write API documentation",
    "Tune server performance",
    "Configure automatic backups",
    "Implement push notifications",
    "Audit endpoint security",
    "Update responsive layout",
    "Prepare staging environment",
    "Add a caching layer",
    "Build metrics dashboard",
];

const DESCRIPTIONS: &[&str] = &[
    "Write complete technical documentation for the system",
    "Code review of the main components",
    "Run continuous integration on every push",
    "Speed up the most frequent queries",
    "Review and bump every dependency of the project",
    "Cover every API endpoint with tests",
    "Create mockups and wireframes for the web app",
    "Resolve the issues reported by QA",
    "Modernize legacy code",
    "Configure alerts and performance metrics",
    "Implement a secure authentication flow",
    "Document every REST endpoint",
    "Profile and remove bottlenecks",
    "Schedule automatic database backups",
    "Deliver notifications in real time",
    "Check every endpoint for security issues",
    "Improve the experience on mobile devices",
    "Get a test environment ready for the team",
    "Cache hot reads to cut latency",
    "Visualize the key metrics in one place",
];

/// Title/description template with its fixed priority
struct Template {
    title: &'static str,
    description: &'static str,
    priority: Priority,
}

const TEMPLATES: &[Template] = &[
    Template {
        title: "Implement {feature} in {project}",
        description: "Build the {feature} feature with {tech} for the {project} project",
        priority: Priority::Medium,
    },
    Template {
        title: "Fix bug in {component}",
        description: "Resolve the reported problem in {component} that affects users",
        priority: Priority::High,
    },
    Template {
        title: "Improve {feature} performance",
        description: "Make {feature} faster and lighter to cut load times",
        priority: Priority::Medium,
    },
    Template {
        title: "Document {feature}",
        description: "Write technical documentation for {feature} with usage examples",
        priority: Priority::Low,
    },
    Template {
        title: "Configure {tech} in {project}",
        description: "Install and configure {tech} for the {project} project",
        priority: Priority::Medium,
    },
    Template {
        title: "Review {department} code",
        description: "Code review of the work done by the {department} team",
        priority: Priority::High,
    },
    Template {
        title: "Upgrade {tech} to the latest version",
        description: "Move {tech} to its newest release and fix incompatibilities",
        priority: Priority::Low,
    },
    Template {
        title: "Design the {feature} interface",
        description: "Create mockups and prototypes for the new {feature} feature",
        priority: Priority::Medium,
    },
];

const PROJECTS: &[&str] = &[
    "Web App", "Mobile App", "API", "Dashboard", "E-commerce", "Blog", "CRM", "ERP",
];
const TECHNOLOGIES: &[&str] = &[
    "React", "Vue", "Angular", "Node.js", "Python", "Java", "C#", "Rust",
];
const DEPARTMENTS: &[&str] = &["Frontend", "Backend", "DevOps", "QA", "Design", "Product"];
const FEATURES: &[&str] = &[
    "authentication", "dashboard", "reports", "notifications", "chat", "payments",
    "search", "filters", "export", "import", "settings", "profile", "calendar",
    "tasks", "comments", "files", "statistics", "backup",
];
const COMPONENTS: &[&str] = &[
    "header", "sidebar", "modal", "form", "table", "chart", "navigation", "footer",
    "carousel", "dropdown", "tooltip", "accordion",
];

/// Fixture flavor for `todoctl generate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Uniform random data
    #[default]
    Basic,
    /// Templated text, recency-weighted dates, correlated completion
    Realistic,
}

impl Profile {
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, at: DateTime<Utc>) -> ImportTodo {
        match self {
            Profile::Basic => basic(rng, at),
            Profile::Realistic => realistic(rng, at),
        }
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Uniform random todo created within the six months before `at`.
pub fn basic<R: Rng + ?Sized>(rng: &mut R, at: DateTime<Utc>) -> ImportTodo {
    let window = Duration::days(182).num_seconds();
    let created_at = at - Duration::seconds(rng.gen_range(0..=window));
    let since_created = (at - created_at).num_seconds();
    let updated_at = created_at + Duration::seconds(rng.gen_range(0..=since_created));

    ImportTodo {
        title: format!("{} #{}", pick(rng, TITLES), rng.gen_range(0..1000)),
        description: pick(rng, DESCRIPTIONS).to_string(),
        completed: rng.gen_bool(0.4),
        priority: *Priority::ALL.choose(rng).unwrap_or(&Priority::Medium),
        created_at: Some(created_at),
        updated_at: Some(updated_at),
    }
}

/// Days back from `at`: 30% this week, 40% this month, 20% 1-3 months,
/// 10% older.
fn realistic_age<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    let roll: f64 = rng.gen();
    if roll < 0.3 {
        rng.gen_range(0..7)
    } else if roll < 0.7 {
        rng.gen_range(7..30)
    } else if roll < 0.9 {
        rng.gen_range(30..90)
    } else {
        rng.gen_range(90..270)
    }
}

/// Older and higher-priority work is more likely to be done (max 80%).
fn completion_chance(age_days: i64, priority: Priority) -> f64 {
    let mut chance: f64 = 0.3;
    if age_days > 30 {
        chance += 0.3;
    } else if age_days > 7 {
        chance += 0.2;
    }
    match priority {
        Priority::High => chance += 0.2,
        Priority::Low => chance -= 0.1,
        Priority::Medium => {}
    }
    chance.min(0.8)
}

fn fill(template: &str, replacements: &[(&str, &str)]) -> String {
    replacements
        .iter()
        .fold(template.to_string(), |text, (key, value)| {
            text.replace(&format!("{{{}}}", key), value)
        })
}

/// Templated todo with realistic date and completion distribution.
pub fn realistic<R: Rng + ?Sized>(rng: &mut R, at: DateTime<Utc>) -> ImportTodo {
    let template = &TEMPLATES[rng.gen_range(0..TEMPLATES.len())];
    let replacements = [
        ("feature", pick(rng, FEATURES)),
        ("project", pick(rng, PROJECTS)),
        ("tech", pick(rng, TECHNOLOGIES)),
        ("component", pick(rng, COMPONENTS)),
        ("department", pick(rng, DEPARTMENTS)),
    ];

    let age_days = realistic_age(rng);
    let created_at = at - Duration::days(age_days);
    let completed = rng.gen_bool(completion_chance(age_days, template.priority));
    let updated_at = if completed {
        (created_at + Duration::days(rng.gen_range(1..=14))).min(at)
    } else {
        created_at
    };

    ImportTodo {
        title: fill(template.title, &replacements),
        description: fill(template.description, &replacements),
        completed,
        priority: template.priority,
        created_at: Some(created_at),
        updated_at: Some(updated_at),
    }
}

/// Parse a seed file: a JSON array of `{title, description?, completed?,
/// priority?}`. Each record goes through the same field checks as a create
/// request; the first invalid record rejects the whole file. Any other
/// fields (ids, timestamps) are ignored and fresh timestamps are assigned
/// on import.
pub fn parse_seed(raw: &str) -> StoreResult<Vec<ImportTodo>> {
    let records: Vec<Value> =
        serde_json::from_str(raw).map_err(|e| StoreError::json("seed file", e))?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            validate_import(record).map_err(|source| StoreError::InvalidRecord { index, source })
        })
        .collect()
}

/// Read and parse a seed file from disk
pub async fn load_seed_file(path: &Path) -> StoreResult<Vec<ImportTodo>> {
    let raw = tokio::fs::read_to_string(path).await?;
    parse_seed(&raw)
}

/// Generate `count` fixtures stamped relative to the current time
pub fn generate<R: Rng + ?Sized>(rng: &mut R, profile: Profile, count: usize) -> Vec<ImportTodo> {
    let at = now();
    (0..count).map(|_| profile.generate(rng, at)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_timestamps_are_ordered_and_past() {
        let mut rng = StdRng::seed_from_u64(7);
        let at = now();
        for profile in [Profile::Basic, Profile::Realistic] {
            for record in generate(&mut rng, profile, 500) {
                let (created, updated) = record.timestamps(at);
                assert!(updated >= created);
                assert!(updated <= at);
                assert!(!record.title.is_empty());
                assert!(!record.title.contains('{'));
            }
        }
    }

    #[test]
    fn realistic_priorities_follow_templates() {
        let mut rng = StdRng::seed_from_u64(42);
        let records = generate(&mut rng, Profile::Realistic, 200);
        assert!(records
            .iter()
            .filter(|r| r.title.starts_with("Fix bug"))
            .all(|r| r.priority == Priority::High));
    }

    #[test]
    fn completion_chance_is_capped() {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(close(completion_chance(0, Priority::Medium), 0.3));
        assert!(close(completion_chance(100, Priority::High), 0.8));
        assert!(close(completion_chance(10, Priority::Low), 0.4));
    }

    #[test]
    fn fill_replaces_every_placeholder() {
        let text = fill("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
        assert_eq!(text, "x and y and x");
    }

    #[test]
    fn seed_parsing_applies_defaults() {
        let raw = r#"[
            {"id": "1", "title": "Learn Rust", "priority": "high", "createdAt": "2024-01-01T00:00:00.000Z"},
            {"title": "Walk the dog", "completed": true}
        ]"#;
        let records = parse_seed(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].priority, Priority::High);
        assert!(records[0].created_at.is_none());
        assert_eq!(records[1].description, "");
        assert!(records[1].completed);
        assert_eq!(records[1].priority, Priority::Medium);
    }

    #[test]
    fn seed_parsing_rejects_missing_title() {
        let err = parse_seed(r#"[{"description": "no title"}]"#).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { index: 0, .. }));
    }

    #[test]
    fn seed_parsing_rejects_blank_and_overlong_titles() {
        for title in ["", "   "] {
            let raw = serde_json::json!([{ "title": "fine" }, { "title": title }]).to_string();
            match parse_seed(&raw).unwrap_err() {
                StoreError::InvalidRecord { index, source } => {
                    assert_eq!(index, 1);
                    assert!(source.has_field("title"));
                }
                other => panic!("unexpected error {other:?}"),
            }
        }

        let raw = serde_json::json!([{ "title": "x".repeat(201) }]).to_string();
        let err = parse_seed(&raw).unwrap_err();
        assert!(err.to_string().contains("index 0"));
        assert!(err.to_string().contains("at most 200"));
    }

    #[test]
    fn seed_parsing_trims_titles() {
        let records = parse_seed(r#"[{"title": "  padded  "}]"#).unwrap();
        assert_eq!(records[0].title, "padded");
    }

    #[test]
    fn seed_parsing_rejects_non_array() {
        let err = parse_seed(r#"{"title": "x"}"#).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }
}
