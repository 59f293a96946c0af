//! Authentication utilities: JWT validation and permission checks
//!
//! The worker never issues credentials; it validates tokens minted by the
//! portal's auth service and enforces per-operation permissions (a bulk
//! roster import requires `people.import`).

use anyhow::{anyhow, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Request;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// User role (admin, coordinator, staff)
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Issued at (unix timestamp)
    pub iat: usize,
    /// Expiration (unix timestamp)
    pub exp: usize,
}

/// Authentication result from extract_auth
#[derive(Debug, Clone)]
pub struct AuthInfo {
    pub user_id: Uuid,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthInfo {
    /// Whether the caller holds a permission (or the wildcard)
    pub fn can(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p == "*" || p == permission)
    }
}

/// Generate a JWT access token
pub fn generate_token(
    user_id: Uuid,
    email: &str,
    role: &str,
    permissions: &[String],
    secret: &str,
) -> Result<String> {
    let now = chrono::Utc::now().timestamp() as usize;
    let exp = now + 8 * 60 * 60; // 8 hours (working day)

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        permissions: permissions.to_vec(),
        iat: now,
        exp,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate a JWT token and return claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| anyhow!("Invalid token: {}", e))?;

    Ok(token_data.claims)
}

/// Extract authentication info from a NATS request.
pub fn extract_auth<T>(request: &Request<T>, jwt_secret: &str) -> Result<AuthInfo> {
    let token = request
        .token
        .as_deref()
        .ok_or_else(|| anyhow!("No authentication provided — JWT token is required"))?;

    let claims = validate_token(token, jwt_secret)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|e| anyhow!("Invalid user_id in token: {}", e))?;

    Ok(AuthInfo {
        user_id,
        role: claims.role,
        permissions: claims.permissions,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-at-least-32-bytes-long";

    fn make_request_with_token(token: Option<String>) -> Request<serde_json::Value> {
        Request {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            token,
            payload: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let user_id = Uuid::new_v4();
        let token = generate_token(
            user_id,
            "test@example.com",
            "coordinator",
            &["people.import".to_string()],
            TEST_SECRET,
        )
        .unwrap();

        let claims = validate_token(&token, TEST_SECRET).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, "coordinator");
        assert_eq!(claims.permissions, vec!["people.import".to_string()]);
    }

    #[test]
    fn test_validate_token_wrong_secret() {
        let token = generate_token(Uuid::new_v4(), "test@example.com", "admin", &[], TEST_SECRET)
            .unwrap();
        assert!(validate_token(&token, "wrong-secret").is_err());
    }

    #[test]
    fn test_validate_token_malformed() {
        assert!(validate_token("not.a.valid.token", TEST_SECRET).is_err());
    }

    #[test]
    fn test_extract_auth_with_valid_token() {
        let user_id = Uuid::new_v4();
        let token = generate_token(
            user_id,
            "test@example.com",
            "admin",
            &["*".to_string()],
            TEST_SECRET,
        )
        .unwrap();

        let request = make_request_with_token(Some(token));
        let auth = extract_auth(&request, TEST_SECRET).unwrap();

        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.role, "admin");
    }

    #[test]
    fn test_extract_auth_no_token_fails() {
        let request = make_request_with_token(None);
        assert!(extract_auth(&request, TEST_SECRET).is_err());
    }

    #[test]
    fn test_extract_auth_invalid_token_fails() {
        let request = make_request_with_token(Some("bad-token".to_string()));
        assert!(extract_auth(&request, TEST_SECRET).is_err());
    }

    #[test]
    fn test_can_checks_permission_and_wildcard() {
        let auth = AuthInfo {
            user_id: Uuid::new_v4(),
            role: "coordinator".to_string(),
            permissions: vec!["people.import".to_string()],
        };
        assert!(auth.can("people.import"));
        assert!(!auth.can("people.delete"));

        let admin = AuthInfo {
            user_id: Uuid::new_v4(),
            role: "admin".to_string(),
            permissions: vec!["*".to_string()],
        };
        assert!(admin.can("people.import"));
    }
}
