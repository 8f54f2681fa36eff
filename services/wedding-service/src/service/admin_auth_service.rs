use anyhow::{anyhow, Result};
use authz::JwtValidator;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use common::config::AdminConfig;
use common::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Exchanges the admin password for a signed session token.
pub struct AdminAuthService {
    password_hash: String,
    validator: JwtValidator,
    session_hours: i64,
}

impl AdminAuthService {
    pub fn new(config: &AdminConfig) -> Result<Self> {
        Self::with_cost(config, DEFAULT_COST)
    }

    pub fn with_cost(config: &AdminConfig, cost: u32) -> Result<Self> {
        let password_hash = hash(&config.password, cost)
            .map_err(|e| anyhow!("Failed to hash admin password: {}", e))?;

        Ok(Self {
            password_hash,
            validator: JwtValidator::new(config.jwt_secret.clone()),
            session_hours: config.session_hours,
        })
    }

    pub fn login(&self, password: &str) -> Result<AdminSession, AppError> {
        let password_match = verify(password, &self.password_hash).map_err(|e| {
            tracing::error!(error = %e, "admin password verification failed");
            AppError::Internal
        })?;

        if !password_match {
            tracing::warn!("admin login with wrong password");
            return Err(AppError::Unauthorized);
        }

        let issued = self.validator.issue_admin_token(self.session_hours).map_err(|e| {
            tracing::error!(error = %e, "failed to issue admin session");
            AppError::Internal
        })?;

        tracing::info!(expires_at = %issued.expires_at, "admin session issued");
        Ok(AdminSession {
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AdminConfig {
        AdminConfig {
            password: "let-me-in".to_string(),
            jwt_secret: "session-secret".to_string(),
            session_hours: 12,
        }
    }

    #[test]
    fn correct_password_yields_verifiable_admin_token() {
        let service = AdminAuthService::with_cost(&config(), 4).unwrap();
        let session = service.login("let-me-in").unwrap();

        let claims = JwtValidator::new("session-secret".to_string())
            .verify_token(&session.token)
            .unwrap();
        assert!(claims.is_admin());
        assert_eq!(claims.exp, session.expires_at.timestamp());
    }

    #[test]
    fn wrong_password_is_unauthorized() {
        let service = AdminAuthService::with_cost(&config(), 4).unwrap();
        assert!(matches!(service.login("guess"), Err(AppError::Unauthorized)));
    }
}
