use super::jwt::verify_token;
use crate::error::AppError;

/// The business owner a request acts for. Resolved once from the bearer credential
/// and handed to every core operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub business_owner_id: i64,
}

impl TenantContext {
    pub fn new(business_owner_id: i64) -> Self {
        Self { business_owner_id }
    }
}

/// Resolves a tenant from a raw `Authorization` header value. Fails closed.
pub fn resolve_tenant(authorization: Option<&str>, secret: &str) -> Result<TenantContext, AppError> {
    let header = authorization.ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

    // Expect "Bearer <token>"
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("Invalid Authorization format"))?;

    let claims = verify_token(token, secret)?;
    if claims.sub <= 0 {
        return Err(AppError::unauthorized("Token does not identify a business owner"));
    }

    Ok(TenantContext::new(claims.sub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::sign_token;
    use chrono::Duration;

    #[test]
    fn resolves_tenant_from_bearer_token() {
        let token = sign_token(7, "secret", Duration::hours(1)).unwrap();
        let header = format!("Bearer {token}");
        assert_eq!(resolve_tenant(Some(&header), "secret").unwrap(), TenantContext::new(7));
    }

    #[test]
    fn missing_or_malformed_header_fails_closed() {
        assert!(matches!(resolve_tenant(None, "secret"), Err(AppError::Unauthorized(_))));
        assert!(matches!(resolve_tenant(Some("Basic abc"), "secret"), Err(AppError::Unauthorized(_))));
        assert!(matches!(resolve_tenant(Some("Bearer "), "secret"), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn non_positive_owner_id_is_rejected() {
        let token = sign_token(0, "secret", Duration::hours(1)).unwrap();
        let header = format!("Bearer {token}");
        assert!(matches!(resolve_tenant(Some(&header), "secret"), Err(AppError::Unauthorized(_))));
    }
}
