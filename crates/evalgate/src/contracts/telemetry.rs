use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ALLOWED_PROVIDERS: [&str; 2] = ["custom", "openai"];
pub const ALLOWED_ROUTE_STRATEGIES: [&str; 3] = ["fallback", "single_provider", "weighted"];

/// Per-request routing telemetry emitted by the generation runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeGenerationTelemetry {
    pub request_id: Option<String>,
    pub tenant_id: Option<String>,
    pub requested_provider: Option<String>,
    pub selected_provider: String,
    pub route_strategy: String,
    pub fallback_provider: Option<String>,
    pub fallback_used: bool,
    pub latency_ms: Option<i64>,
    pub prompt_template_version: String,

    #[serde(default)]
    pub route_id: Option<String>,

    #[serde(default)]
    pub model_id: Option<String>,

    #[serde(default)]
    pub model_version_id: Option<String>,
}

fn is_valid_optional_uuid(value: Option<&str>) -> bool {
    value.is_none_or(|raw| Uuid::try_parse(raw).is_ok())
}

fn is_allowed_provider(value: &str) -> bool {
    ALLOWED_PROVIDERS.contains(&value)
}

/// Returns every contract violation; an empty list means the envelope is valid.
#[must_use]
pub fn validate_runtime_generation_telemetry(
    telemetry: &RuntimeGenerationTelemetry,
) -> Vec<String> {
    let mut errors = Vec::new();
    let providers = ALLOWED_PROVIDERS.join(", ");

    if !is_valid_optional_uuid(telemetry.request_id.as_deref()) {
        errors.push("request_id must be a valid UUID when provided".to_string());
    }

    match telemetry.tenant_id.as_deref() {
        None | Some("") => errors.push("tenant_id is required".to_string()),
        Some(raw) if Uuid::try_parse(raw).is_err() => {
            errors.push("tenant_id must be a valid UUID".to_string());
        }
        Some(_) => {}
    }

    if !is_allowed_provider(&telemetry.selected_provider) {
        errors.push(format!("selected_provider must be one of [{providers}]"));
    }

    if let Some(requested) = telemetry.requested_provider.as_deref()
        && !requested.is_empty()
        && !is_allowed_provider(requested)
    {
        errors.push(format!(
            "requested_provider must be one of [{providers}] when provided"
        ));
    }

    if let Some(fallback) = telemetry.fallback_provider.as_deref()
        && !fallback.is_empty()
        && !is_allowed_provider(fallback)
    {
        errors.push(format!(
            "fallback_provider must be one of [{providers}] when provided"
        ));
    }

    if !ALLOWED_ROUTE_STRATEGIES.contains(&telemetry.route_strategy.as_str()) {
        errors.push(format!(
            "route_strategy must be one of [{}]",
            ALLOWED_ROUTE_STRATEGIES.join(", ")
        ));
    }

    if telemetry.fallback_used
        && telemetry
            .fallback_provider
            .as_deref()
            .is_none_or(str::is_empty)
    {
        errors.push("fallback_provider is required when fallback_used=true".to_string());
    }

    if telemetry.latency_ms.is_some_and(|latency| latency < 0) {
        errors.push("latency_ms must be >= 0 when provided".to_string());
    }

    if telemetry.prompt_template_version.is_empty() {
        errors.push("prompt_template_version is required".to_string());
    }

    for (field, value) in [
        ("route_id", &telemetry.route_id),
        ("model_id", &telemetry.model_id),
        ("model_version_id", &telemetry.model_version_id),
    ] {
        if !is_valid_optional_uuid(value.as_deref()) {
            errors.push(format!("{field} must be a valid UUID when provided"));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::{RuntimeGenerationTelemetry, validate_runtime_generation_telemetry};

    fn valid_telemetry() -> RuntimeGenerationTelemetry {
        RuntimeGenerationTelemetry {
            request_id: Some("cb3a5e65-f665-4ed8-9d96-e60359ff3be1".to_string()),
            tenant_id: Some("7d1c2a34-5b6e-4f70-8a91-b2c3d4e5f607".to_string()),
            requested_provider: Some("openai".to_string()),
            selected_provider: "custom".to_string(),
            route_strategy: "fallback".to_string(),
            fallback_provider: Some("custom".to_string()),
            fallback_used: true,
            latency_ms: Some(3200),
            prompt_template_version: "v1".to_string(),
            route_id: None,
            model_id: None,
            model_version_id: None,
        }
    }

    #[test]
    fn valid_telemetry_has_no_errors() {
        assert!(validate_runtime_generation_telemetry(&valid_telemetry()).is_empty());
    }

    #[test]
    fn reports_each_invalid_value() {
        let telemetry = RuntimeGenerationTelemetry {
            request_id: None,
            requested_provider: Some("invalid".to_string()),
            selected_provider: "invalid".to_string(),
            route_strategy: "not_a_strategy".to_string(),
            fallback_provider: None,
            latency_ms: Some(-1),
            prompt_template_version: String::new(),
            ..valid_telemetry()
        };

        let errors = validate_runtime_generation_telemetry(&telemetry);
        assert_eq!(errors.len(), 6, "{errors:?}");
        assert!(errors.iter().any(|error| error.starts_with("selected_provider")));
        assert!(errors.iter().any(|error| error.contains("fallback_used=true")));
    }

    #[test]
    fn tenant_and_optional_ids_must_be_uuids() {
        let telemetry = RuntimeGenerationTelemetry {
            tenant_id: None,
            model_id: Some("gpt-5".to_string()),
            ..valid_telemetry()
        };

        let errors = validate_runtime_generation_telemetry(&telemetry);
        assert_eq!(
            errors,
            vec![
                "tenant_id is required".to_string(),
                "model_id must be a valid UUID when provided".to_string(),
            ]
        );
    }
}
