/// Node analyzer: single-pass feature extraction over a workflow's node list
///
/// Produces the normalized FeatureSet consumed by the classifier and the
/// compatibility scorer. All derived sets are deduplicated and sorted
/// ascending so downstream output is deterministic regardless of node order.

use crate::catalog::types::{FeatureSet, RawNode};
use std::collections::BTreeSet;

/// Node types that indicate local AI usage
///
/// Exact-match catalog; substring checks are deliberately not used here so
/// that e.g. cloud LLM nodes never register as local.
pub const LOCAL_AI_NODES: &[&str] = &[
    "@n8n/n8n-nodes-langchain.agent",
    "@n8n/n8n-nodes-langchain.chainLlm",
    "@n8n/n8n-nodes-langchain.chainSummarization",
    "@n8n/n8n-nodes-langchain.chainRetrievalQa",
    "@n8n/n8n-nodes-langchain.lmChatOllama",
    "@n8n/n8n-nodes-langchain.lmOllama",
    "@n8n/n8n-nodes-langchain.embeddingsOllama",
];

/// Namespace prefix for standard n8n nodes
const BASE_PREFIX: &str = "n8n-nodes-base.";
/// Namespace prefix for LangChain and other scoped n8n packages
const SCOPED_PREFIX: &str = "@n8n/";

/// Analyze workflow nodes and extract the normalized feature set
///
/// Single pass; must not fail on zero nodes (features degrade to
/// all-empty/all-false). Node type strings go into node_types verbatim;
/// integration names and credential types are lowercased.
pub fn analyze_nodes(nodes: &[RawNode]) -> FeatureSet {
    let mut integrations = BTreeSet::new();
    let mut node_types = BTreeSet::new();
    let mut credential_types = BTreeSet::new();
    let mut has_webhook = false;
    let mut has_schedule = false;
    let mut has_local_ai = false;

    for node in nodes {
        let node_type = node.node_type.as_str();
        node_types.insert(node_type.to_string());

        let lower = node_type.to_lowercase();
        if lower.contains("webhook") {
            has_webhook = true;
        }
        if lower.contains("schedule") || lower.contains("cron") {
            has_schedule = true;
        }
        if LOCAL_AI_NODES.contains(&node_type) {
            has_local_ai = true;
        }

        // Derive the integration name from the node type namespace.
        // Unrecognized prefixes yield no integration.
        if let Some(rest) = node_type.strip_prefix(BASE_PREFIX) {
            integrations.insert(rest.to_lowercase());
        } else if node_type.starts_with(SCOPED_PREFIX) {
            if let Some(last) = node_type.rsplit('.').next() {
                if last != node_type {
                    integrations.insert(last.to_lowercase());
                }
            }
        }

        for cred_type in node.credentials.keys() {
            credential_types.insert(cred_type.to_lowercase());
        }
    }

    FeatureSet {
        integrations: integrations.into_iter().collect(),
        node_types: node_types.into_iter().collect(),
        has_webhook,
        has_schedule,
        has_local_ai,
        credential_types: credential_types.into_iter().collect(),
    }
}
