use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    roles_claim: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,

    // Everything else, including the provider's roles claim
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        roles_claim: String,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            roles_claim,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?
            .claims;

        Ok(AuthenticatedUser {
            roles: roles_from_claims(&claims.extra, &self.roles_claim),
            sub: claims.sub,
        })
    }
}

/// Read roles from `claim`, which may hold a string array or an object with
/// a `roles` array (namespaced custom claims)
fn roles_from_claims(claims: &Map<String, Value>, claim: &str) -> Vec<String> {
    let value = match claims.get(claim) {
        Some(Value::Object(nested)) => nested.get("roles"),
        other => other,
    };

    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_roles_from_flat_claim() {
        let c = claims(json!({ "roles": ["desk_officer", 7, "resident"] }));
        assert_eq!(
            roles_from_claims(&c, "roles"),
            vec!["desk_officer".to_string(), "resident".to_string()]
        );
    }

    #[test]
    fn test_roles_from_namespaced_claim() {
        let c = claims(json!({
            "https://helpdesk.example/claims": { "roles": ["admin"] }
        }));
        assert_eq!(
            roles_from_claims(&c, "https://helpdesk.example/claims"),
            vec!["admin".to_string()]
        );
    }

    #[test]
    fn test_missing_roles_claim_means_no_roles() {
        let c = claims(json!({ "scope": "openid" }));
        assert!(roles_from_claims(&c, "roles").is_empty());
    }
}
