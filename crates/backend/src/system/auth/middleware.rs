use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};

/// Middleware that requires valid JWT authentication
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Check Bearer prefix
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Validate token
    let claims = super::jwt::validate_token(token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that requires organizer or admin privileges
pub async fn require_organizer(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Check Bearer prefix
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Validate token
    let claims = super::jwt::validate_token(token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Check organizer capability
    if !claims.role.can_organize() {
        return Err(StatusCode::FORBIDDEN);
    }

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that requires admin privileges
pub async fn require_admin(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Check Bearer prefix
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Validate token
    let claims = super::jwt::validate_token(token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Check admin role
    if !claims.role.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db;
    use crate::system::auth::extractor::CurrentUser;
    use crate::system::auth::jwt;
    use axum::http::Request as HttpRequest;
    use axum::{middleware, routing::get, Router};
    use contracts::system::auth::Role;
    use tower::ServiceExt;

    async fn whoami(CurrentUser(claims): CurrentUser) -> String {
        claims.username
    }

    fn guarded_router() -> Router {
        Router::new()
            .route(
                "/auth",
                get(whoami).layer(middleware::from_fn(require_auth)),
            )
            .route(
                "/organizer",
                get(whoami).layer(middleware::from_fn(require_organizer)),
            )
            .route(
                "/admin",
                get(whoami).layer(middleware::from_fn(require_admin)),
            )
    }

    async fn status_of(router: Router, path: &str, token: Option<&str>) -> StatusCode {
        let mut builder = HttpRequest::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).unwrap();
        router.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn missing_or_garbage_token_is_unauthorized() {
        db::init_test_database().await;
        let router = guarded_router();

        assert_eq!(
            status_of(router.clone(), "/auth", None).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(router, "/auth", Some("garbage")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn role_gates_follow_the_hierarchy() {
        db::init_test_database().await;

        let user = jwt::generate_access_token("u1", "plain", Role::User)
            .await
            .unwrap();
        let organizer = jwt::generate_access_token("u2", "org", Role::Organizer)
            .await
            .unwrap();
        let admin = jwt::generate_access_token("u3", "root", Role::Admin)
            .await
            .unwrap();
        let router = guarded_router();

        assert_eq!(
            status_of(router.clone(), "/auth", Some(&user)).await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(router.clone(), "/organizer", Some(&user)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(router.clone(), "/organizer", Some(&organizer)).await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(router.clone(), "/admin", Some(&organizer)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(router, "/admin", Some(&admin)).await,
            StatusCode::OK
        );
    }
}
