use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use wayfare_core::user::Role;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

/// Verified caller identity, injected into request extensions once the
/// bearer token checks out.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Callers may act on their own records; admins on anyone's.
    pub fn can_act_for(&self, user_id: Uuid) -> bool {
        self.id == user_id || self.is_admin()
    }
}

fn verify_bearer(state: &AppState, req: &Request) -> Result<AuthUser, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            AppError::AuthenticationError("missing or invalid authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::AuthenticationError("missing or invalid authorization header".to_string())
    })?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthenticationError("invalid or expired token".to_string()))?;

    let claims = token_data.claims;
    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::AuthenticationError("invalid token subject".to_string()))?;
    let role = Role::parse(&claims.role)
        .ok_or_else(|| AppError::AuthenticationError("invalid token role".to_string()))?;

    Ok(AuthUser {
        id,
        email: claims.email,
        role,
    })
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = verify_bearer(&state, &req)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = verify_bearer(&state, &req)?;
    if !user.is_admin() {
        return Err(AppError::AuthorizationError("admin access required".to_string()));
    }
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn claims_round_trip() {
        let user_id = Uuid::new_v4();
        let claims = Claims {
            sub: user_id.to_string(),
            email: "ada@example.com".to_string(),
            role: "admin".to_string(),
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, user_id.to_string());
        assert_eq!(decoded.claims.role, "admin");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "ada@example.com".to_string(),
            role: "user".to_string(),
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret-a"),
        )
        .unwrap();

        assert!(decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret-b"),
            &Validation::default(),
        )
        .is_err());
    }

    #[test]
    fn ownership_checks() {
        let id = Uuid::new_v4();
        let user = AuthUser {
            id,
            email: "u@example.com".to_string(),
            role: Role::User,
        };
        assert!(user.can_act_for(id));
        assert!(!user.can_act_for(Uuid::new_v4()));

        let admin = AuthUser {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            role: Role::Admin,
        };
        assert!(admin.can_act_for(Uuid::new_v4()));
    }
}
