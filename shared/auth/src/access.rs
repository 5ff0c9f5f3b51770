use mentorhub_common::{AppError, UserRole};

use crate::jwt::Claims;

/// Capability check applied uniformly by the booking and lifecycle paths
/// instead of comparing role strings inline per handler.
pub fn require_role(claims: &Claims, role: UserRole) -> Result<(), AppError> {
    if claims.role != role {
        return Err(AppError::Authorization(format!(
            "This action requires the {} role",
            role
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorhub_common::JwtConfig;
    use uuid::Uuid;

    fn claims_with_role(role: UserRole) -> Claims {
        let config = JwtConfig {
            secret: "s".into(),
            expiration_hours: 1,
            issuer: "test".into(),
        };
        Claims::new(Uuid::new_v4(), "user@example.com".into(), role, &config)
    }

    #[test]
    fn matching_role_passes() {
        assert!(require_role(&claims_with_role(UserRole::Mentee), UserRole::Mentee).is_ok());
        assert!(require_role(&claims_with_role(UserRole::Mentor), UserRole::Mentor).is_ok());
    }

    #[test]
    fn mismatched_role_is_forbidden() {
        let err = require_role(&claims_with_role(UserRole::Mentor), UserRole::Mentee).unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
