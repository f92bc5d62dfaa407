/// Heuristic workflow classifier
///
/// Pure, deterministic mapping from (name, description, FeatureSet) to
/// category, subcategory, tags, department, use cases, difficulty, and a
/// runtime estimate. No side effects, no I/O. Categorization runs an ordered
/// rule table evaluated in priority order; the first matching rule wins.

use crate::catalog::types::{DifficultyLevel, FeatureSet, RawNode, RawWorkflow};
use std::collections::BTreeSet;

/// One declarative categorization rule
///
/// `matches` inspects the lowercased name+description text and the
/// integration set; `subcategory` refines the match with secondary checks.
struct CategoryRule {
    category: &'static str,
    matches: fn(text: &str, integrations: &[String]) -> bool,
    subcategory: fn(text: &str, integrations: &[String]) -> &'static str,
}

/// Ordered categorization rules; priority runs top to bottom
const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: "AI & Machine Learning",
        matches: |text, _| {
            ["ai", "rag", "llm", "gpt", "agent", "langchain"]
                .iter()
                .any(|term| text.contains(term))
        },
        subcategory: |text, _| {
            if text.contains("rag") || text.contains("retrieval") {
                "RAG & Document Processing"
            } else if text.contains("agent") {
                "AI Agents"
            } else {
                "General AI"
            }
        },
    },
    CategoryRule {
        category: "Communication & Messaging",
        matches: |_, integrations| {
            ["gmail", "email", "slack", "telegram", "discord", "whatsapp"]
                .iter()
                .any(|svc| integrations.iter().any(|i| i == svc))
        },
        subcategory: |text, integrations| {
            let has = |svc: &str| integrations.iter().any(|i| i == svc);
            if has("gmail") || text.contains("email") {
                "Email"
            } else if has("slack") {
                "Slack"
            } else if has("telegram") {
                "Telegram"
            } else {
                "General"
            }
        },
    },
    CategoryRule {
        category: "Data & Analytics",
        matches: |text, _| {
            ["data", "analytics", "database", "sql", "etl"]
                .iter()
                .any(|term| text.contains(term))
        },
        subcategory: |_, _| "Data Processing",
    },
    CategoryRule {
        category: "Business & Productivity",
        matches: |text, _| {
            ["business", "productivity", "automation", "workflow"]
                .iter()
                .any(|term| text.contains(term))
        },
        subcategory: |_, _| "Automation",
    },
];

/// Fallback when no rule matches
const DEFAULT_CATEGORY: (&str, &str) = ("Utilities & Tools", "General");

/// Tag keyword groups matched as substrings of name+description
const TAG_KEYWORDS: &[(&str, &[&str])] = &[
    ("ai", &["ai", "artificial intelligence", "machine learning"]),
    ("rag", &["rag", "retrieval", "augmented generation"]),
    ("automation", &["automation", "automate", "automatic"]),
    ("email", &["email", "gmail", "mail"]),
    ("chat", &["chat", "messaging", "conversation"]),
    ("document", &["document", "pdf", "file"]),
    ("data", &["data", "database", "sql"]),
    ("local", &["local", "offline", "self-hosted"]),
];

/// Use-case labels; a label applies when at least 2 of its keywords appear
const USE_CASE_PATTERNS: &[(&str, &[&str])] = &[
    ("Document Q&A", &["document", "q&a", "question", "answer"]),
    ("Email Automation", &["email", "gmail", "automate", "respond"]),
    ("Data Processing", &["data", "process", "transform", "etl"]),
    ("Chat Bot", &["chat", "bot", "conversation", "assistant"]),
    ("Content Generation", &["generate", "create", "content", "write"]),
    ("Research Assistant", &["research", "analyze", "summarize"]),
];

/// Annotation node type scanned for fallback descriptions
const STICKY_NOTE_TYPE: &str = "n8n-nodes-base.stickyNote";

const MAX_TAGS: usize = 10;
const MAX_USE_CASES: usize = 3;
const MAX_INTEGRATION_TAGS: usize = 5;
const MAX_DESCRIPTION_CHARS: usize = 500;
const MIN_STICKY_NOTE_CHARS: usize = 20;

/// Lowercased "name description" text used by all keyword heuristics
pub fn classification_text(name: &str, description: Option<&str>) -> String {
    format!("{} {}", name, description.unwrap_or("")).to_lowercase()
}

/// Determine category and subcategory via the ordered rule table
pub fn categorize(
    name: &str,
    description: Option<&str>,
    features: &FeatureSet,
) -> (String, String) {
    let text = classification_text(name, description);

    for rule in CATEGORY_RULES {
        if (rule.matches)(&text, &features.integrations) {
            let sub = (rule.subcategory)(&text, &features.integrations);
            return (rule.category.to_string(), sub.to_string());
        }
    }

    (DEFAULT_CATEGORY.0.to_string(), DEFAULT_CATEGORY.1.to_string())
}

/// Difficulty from distinct node-type count: <=5 beginner, <=15 intermediate
pub fn determine_difficulty(features: &FeatureSet) -> DifficultyLevel {
    match features.node_types.len() {
        0..=5 => DifficultyLevel::Beginner,
        6..=15 => DifficultyLevel::Intermediate,
        _ => DifficultyLevel::Advanced,
    }
}

/// Runtime estimate text, same thresholds as difficulty
pub fn estimate_runtime(features: &FeatureSet) -> String {
    match features.node_types.len() {
        0..=5 => "< 1 minute".to_string(),
        6..=15 => "1-5 minutes".to_string(),
        _ => "5+ minutes".to_string(),
    }
}

/// Extract tags: embedded workflow tags + keyword matches + top integrations
///
/// Result is deduplicated, sorted ascending, and truncated to 10 entries.
pub fn extract_tags(
    workflow: &RawWorkflow,
    name: &str,
    description: Option<&str>,
    features: &FeatureSet,
) -> Vec<String> {
    let mut tags = BTreeSet::new();

    // Tags embedded in the source document: strings or { "name": ... } objects
    if let Some(embedded) = workflow.tags.as_array() {
        for value in embedded {
            let tag = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Object(obj) => obj
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or("")
                    .to_string(),
                other => other.to_string(),
            };
            if !tag.is_empty() {
                tags.insert(tag);
            }
        }
    }

    let text = classification_text(name, description);
    for (tag, keywords) in TAG_KEYWORDS {
        if keywords.iter().any(|kw| text.contains(kw)) {
            tags.insert((*tag).to_string());
        }
    }

    for integration in features.integrations.iter().take(MAX_INTEGRATION_TAGS) {
        tags.insert(integration.clone());
    }

    tags.into_iter().take(MAX_TAGS).collect()
}

/// Department that would own this workflow, derived from category only
pub fn determine_department(category: &str) -> Option<String> {
    if category.contains("AI") {
        Some("Engineering".to_string())
    } else if category.contains("Communication") {
        Some("Operations".to_string())
    } else if category.contains("Data") {
        Some("Analytics".to_string())
    } else if category.contains("Business") {
        Some("Executive".to_string())
    } else {
        None
    }
}

/// Extract use-case labels in declaration order, capped at 3
///
/// A label applies when at least 2 of its keywords occur in the text.
pub fn extract_use_cases(name: &str, description: Option<&str>) -> Vec<String> {
    let text = classification_text(name, description);

    USE_CASE_PATTERNS
        .iter()
        .filter(|(_, keywords)| keywords.iter().filter(|kw| text.contains(*kw)).count() >= 2)
        .map(|(label, _)| (*label).to_string())
        .take(MAX_USE_CASES)
        .collect()
}

/// Resolve the workflow description, falling back to annotation nodes
///
/// When the document carries no explicit description, the first sticky-note
/// node whose content exceeds 20 characters supplies the first 500 chars.
pub fn extract_description(workflow: &RawWorkflow) -> Option<String> {
    if let Some(desc) = &workflow.description {
        return Some(desc.clone());
    }

    workflow
        .nodes
        .iter()
        .find_map(|node| sticky_note_content(node))
}

fn sticky_note_content(node: &RawNode) -> Option<String> {
    if node.node_type != STICKY_NOTE_TYPE {
        return None;
    }
    let content = node.parameters.get("content")?.as_str()?;
    if content.chars().count() <= MIN_STICKY_NOTE_CHARS {
        return None;
    }
    Some(content.chars().take(MAX_DESCRIPTION_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::analyzer::analyze_nodes;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    fn features_with_integrations(integrations: &[&str]) -> FeatureSet {
        FeatureSet {
            integrations: integrations.iter().map(|s| s.to_string()).collect(),
            ..FeatureSet::default()
        }
    }

    fn features_with_node_types(count: usize) -> FeatureSet {
        FeatureSet {
            node_types: (0..count).map(|i| format!("n8n-nodes-base.node{i:02}")).collect(),
            ..FeatureSet::default()
        }
    }

    #[test]
    fn ai_rules_win_over_later_groups() {
        let features = features_with_integrations(&["slack"]);
        let (cat, sub) = categorize("RAG document pipeline", None, &features);
        assert_eq!(cat, "AI & Machine Learning");
        assert_eq!(sub, "RAG & Document Processing");

        let (cat, sub) = categorize("Support agent", None, &FeatureSet::default());
        assert_eq!(cat, "AI & Machine Learning");
        assert_eq!(sub, "AI Agents");
    }

    #[test]
    fn communication_subcategories_follow_integrations() {
        let features = features_with_integrations(&["slack"]);
        let (cat, sub) = categorize("notify channel", None, &features);
        assert_eq!(cat, "Communication & Messaging");
        assert_eq!(sub, "Slack");

        let features = features_with_integrations(&["telegram"]);
        let (_, sub) = categorize("notify group", None, &features);
        assert_eq!(sub, "Telegram");
    }

    #[test]
    fn default_category_when_nothing_matches() {
        let (cat, sub) = categorize("simple helper", None, &FeatureSet::default());
        assert_eq!(cat, "Utilities & Tools");
        assert_eq!(sub, "General");
    }

    #[test]
    fn difficulty_is_monotonic_in_node_type_count() {
        assert_eq!(
            determine_difficulty(&features_with_node_types(3)),
            DifficultyLevel::Beginner
        );
        assert_eq!(
            determine_difficulty(&features_with_node_types(10)),
            DifficultyLevel::Intermediate
        );
        assert_eq!(
            determine_difficulty(&features_with_node_types(20)),
            DifficultyLevel::Advanced
        );
    }

    #[test]
    fn runtime_estimate_tracks_difficulty_thresholds() {
        assert_eq!(estimate_runtime(&features_with_node_types(3)), "< 1 minute");
        assert_eq!(estimate_runtime(&features_with_node_types(10)), "1-5 minutes");
        assert_eq!(estimate_runtime(&features_with_node_types(20)), "5+ minutes");
    }

    #[test]
    fn tags_are_capped_at_ten_sorted_and_deduplicated() {
        let workflow = RawWorkflow {
            tags: json!(["custom", { "name": "curated" }, "custom"]),
            ..RawWorkflow::default()
        };
        let features = features_with_integrations(&[
            "airtable", "gmail", "http", "postgres", "slack", "telegram",
        ]);
        let tags = extract_tags(
            &workflow,
            "AI email automation for local document data chat",
            None,
            &features,
        );

        assert_eq!(tags.len(), MAX_TAGS);
        let mut sorted = tags.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(tags, sorted);
        // Only the first 5 integrations become tags
        assert!(!tags.contains(&"telegram".to_string()));
    }

    #[test]
    fn departments_follow_category() {
        assert_eq!(
            determine_department("AI & Machine Learning").as_deref(),
            Some("Engineering")
        );
        assert_eq!(
            determine_department("Communication & Messaging").as_deref(),
            Some("Operations")
        );
        assert_eq!(
            determine_department("Data & Analytics").as_deref(),
            Some("Analytics")
        );
        assert_eq!(
            determine_department("Business & Productivity").as_deref(),
            Some("Executive")
        );
        assert_eq!(determine_department("Utilities & Tools"), None);
    }

    #[test]
    fn use_cases_require_two_keyword_hits_and_cap_at_three() {
        // Single keyword hit per group: no use cases
        assert!(extract_use_cases("email helper", None).is_empty());

        // Many groups hit twice; result capped at 3 in declaration order
        let text = "document question answer email automate data process \
                    chat bot generate content";
        let use_cases = extract_use_cases(text, None);
        assert_eq!(
            use_cases,
            vec!["Document Q&A", "Email Automation", "Data Processing"]
        );
    }

    #[test]
    fn description_falls_back_to_long_sticky_notes() {
        let long_note = "This workflow syncs invoices from Gmail into Postgres.";
        let workflow = RawWorkflow {
            nodes: vec![
                RawNode {
                    node_type: STICKY_NOTE_TYPE.to_string(),
                    parameters: json!({ "content": "short" }),
                    credentials: HashMap::new(),
                },
                RawNode {
                    node_type: STICKY_NOTE_TYPE.to_string(),
                    parameters: json!({ "content": long_note }),
                    credentials: HashMap::new(),
                },
            ],
            ..RawWorkflow::default()
        };

        assert_eq!(extract_description(&workflow).as_deref(), Some(long_note));

        let explicit = RawWorkflow {
            description: Some("explicit".to_string()),
            ..workflow
        };
        assert_eq!(extract_description(&explicit).as_deref(), Some("explicit"));
    }

    #[test]
    fn fallback_description_is_truncated_to_500_chars() {
        let long = "x".repeat(800);
        let workflow = RawWorkflow {
            nodes: vec![RawNode {
                node_type: STICKY_NOTE_TYPE.to_string(),
                parameters: json!({ "content": long }),
                credentials: HashMap::new(),
            }],
            ..RawWorkflow::default()
        };
        let desc = extract_description(&workflow).unwrap();
        assert_eq!(desc.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn classification_uses_analyzer_output() {
        let nodes = vec![RawNode {
            node_type: "n8n-nodes-base.gmail".to_string(),
            parameters: json!({}),
            credentials: HashMap::new(),
        }];
        let features = analyze_nodes(&nodes);
        let (cat, sub) = categorize("inbox sorter", None, &features);
        assert_eq!(cat, "Communication & Messaging");
        assert_eq!(sub, "Email");
    }
}
