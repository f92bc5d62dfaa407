/// Requirements derivation and offline-compatibility scoring
///
/// Splits credential requirements into local vs external by substring match
/// against the known self-hosted service catalog, then computes the
/// cumulative-penalty compatibility score and status tier.

use crate::catalog::types::{
    Compatibility, CompatibilityStatus, FeatureSet, Requirement, Requirements,
};
use std::collections::BTreeSet;

/// Known self-hosted services available in the local stack
///
/// A credential type belongs to a service iff the service name is a
/// substring of the credential type (credential types arrive lowercased).
pub const LOCAL_SERVICES: &[&str] = &[
    "ollama",
    "postgres",
    "qdrant",
    "supabase",
    "neo4j",
    "langfuse",
    "flowise",
    "redis",
    "minio",
    "clickhouse",
];

/// Minimum engine version attached to every requirements block
const MIN_VERSION: &str = "1.0.0";

/// Derive credential, service, and external-API requirements
pub fn extract_requirements(features: &FeatureSet) -> Requirements {
    let mut credentials = Vec::new();
    let mut services = BTreeSet::new();
    let mut external_apis = BTreeSet::new();

    for cred_type in &features.credential_types {
        let is_local = LOCAL_SERVICES.iter().any(|svc| cred_type.contains(svc));

        credentials.push(Requirement {
            credential_type: cred_type.clone(),
            required: true,
            local: is_local,
            description: None,
        });

        if is_local {
            for svc in LOCAL_SERVICES {
                if cred_type.contains(svc) {
                    services.insert((*svc).to_string());
                }
            }
        } else {
            external_apis.insert(cred_type.clone());
        }
    }

    Requirements {
        credentials,
        services: services.into_iter().collect(),
        external_apis: external_apis.into_iter().collect(),
        min_version: MIN_VERSION.to_string(),
    }
}

/// Compute the compatibility verdict for a workflow
///
/// Cumulative penalties, order matters: start at 1.0; -0.3 if any external
/// API is required; a further -0.3 if local AI is absent AND an external API
/// is required; -0.2 if zero local services are present. Status and
/// pozi_compatible compare against the raw score; the persisted score field
/// is clamped to [0,1] separately by the record builder.
pub fn analyze_compatibility(requirements: &Requirements, features: &FeatureSet) -> Compatibility {
    let local_ai = features.has_local_ai;
    let requires_external_api = !requirements.external_apis.is_empty();
    let works_offline = !requires_external_api;

    let mut score: f64 = 1.0;

    if requires_external_api {
        score -= 0.3;
    }
    if !local_ai && requires_external_api {
        score -= 0.3;
    }
    if requirements.services.is_empty() {
        score -= 0.2;
    }

    let status = if score >= 0.8 {
        CompatibilityStatus::FullyCompatible
    } else if score >= 0.5 {
        CompatibilityStatus::PartiallyCompatible
    } else if requires_external_api {
        CompatibilityStatus::RequiresExternal
    } else {
        CompatibilityStatus::Incompatible
    };

    Compatibility {
        local_ai,
        requires_external_api,
        works_offline,
        pozi_compatible: score >= 0.5,
        status,
        compatibility_score: (score * 100.0).round() / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn features(credential_types: &[&str], has_local_ai: bool) -> FeatureSet {
        FeatureSet {
            credential_types: credential_types.iter().map(|s| s.to_string()).collect(),
            has_local_ai,
            ..FeatureSet::default()
        }
    }

    #[test]
    fn no_credentials_scores_point_eight_fully_compatible() {
        let features = features(&[], false);
        let requirements = extract_requirements(&features);
        let compat = analyze_compatibility(&requirements, &features);

        assert_eq!(compat.compatibility_score, 0.8);
        assert_eq!(compat.status, CompatibilityStatus::FullyCompatible);
        assert!(compat.pozi_compatible);
        assert!(compat.works_offline);
    }

    #[test]
    fn external_only_credential_without_local_ai_requires_external() {
        let features = features(&["openaiapi"], false);
        let requirements = extract_requirements(&features);
        assert_eq!(requirements.external_apis, vec!["openaiapi"]);
        assert!(requirements.services.is_empty());

        let compat = analyze_compatibility(&requirements, &features);
        // 1.0 - 0.3 (external) - 0.3 (no local AI) - 0.2 (no local services)
        assert_eq!(compat.compatibility_score, 0.2);
        assert_eq!(compat.status, CompatibilityStatus::RequiresExternal);
        assert!(!compat.pozi_compatible);
        assert!(!compat.works_offline);
    }

    #[test]
    fn local_credential_maps_to_service() {
        let features = features(&["postgresdb", "ollamaapi"], true);
        let requirements = extract_requirements(&features);

        assert_eq!(requirements.services, vec!["ollama", "postgres"]);
        assert!(requirements.external_apis.is_empty());
        assert_eq!(requirements.credentials.len(), 2);
        assert!(requirements.credentials.iter().all(|c| c.local && c.required));
        assert_eq!(requirements.min_version, "1.0.0");

        let compat = analyze_compatibility(&requirements, &features);
        assert_eq!(compat.compatibility_score, 1.0);
        assert_eq!(compat.status, CompatibilityStatus::FullyCompatible);
    }

    #[test]
    fn external_with_local_ai_and_local_services_is_partial() {
        let features = features(&["openaiapi", "qdrantapi"], true);
        let requirements = extract_requirements(&features);
        assert_eq!(requirements.services, vec!["qdrant"]);
        assert_eq!(requirements.external_apis, vec!["openaiapi"]);

        let compat = analyze_compatibility(&requirements, &features);
        // 1.0 - 0.3 (external); local AI present, services present
        assert_eq!(compat.compatibility_score, 0.7);
        assert_eq!(compat.status, CompatibilityStatus::PartiallyCompatible);
        assert!(compat.pozi_compatible);
    }

    #[test]
    fn local_only_credentials_score_full() {
        let features = features(&["postgresdb"], false);
        let requirements = extract_requirements(&features);
        let compat = analyze_compatibility(&requirements, &features);
        assert_eq!(compat.status, CompatibilityStatus::FullyCompatible);
        assert_eq!(compat.compatibility_score, 1.0);
    }
}
