//! Sessions and the guard every protected route goes through.
//!
//! Sessions are managed by `tower-sessions` with its in-memory store: the
//! browser only holds the session id cookie, the [`UserIdentity`] lives in
//! server memory and is gone after a restart.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts, response::Redirect};
use tower_sessions::{cookie::SameSite, MemoryStore, Session, SessionManagerLayer};

use crate::user_models::UserIdentity;

pub const SESSION_COOKIE_NAME: &str = "wardrobe_session";

/// Key the authenticated identity is stored under.
pub const SESSION_USER_KEY: &str = "user";

pub fn session_layer(secure: bool) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(secure)
}

/// The logged-in caller. Extracting it is the session check: a request
/// without a live session is redirected to the login page before the
/// handler body runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to("/"))?;

        match session.get::<UserIdentity>(SESSION_USER_KEY).await {
            Ok(Some(identity)) => Ok(CurrentUser(identity)),
            Ok(None) => Err(Redirect::to("/")),
            Err(e) => {
                tracing::warn!(error = %e, path = %parts.uri.path(), "unreadable session");
                Err(Redirect::to("/"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn whoami(CurrentUser(user): CurrentUser) -> String {
        user.username
    }

    async fn sign_in(session: Session) -> StatusCode {
        let identity = UserIdentity {
            user_id: "1".into(),
            username: "ada".into(),
        };
        match session.insert(SESSION_USER_KEY, identity).await {
            Ok(()) => StatusCode::OK,
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn app(secure: bool) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route("/sign-in", get(sign_in))
            .layer(session_layer(secure))
    }

    #[tokio::test]
    async fn no_session_redirects_home() {
        let res = app(false)
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[tokio::test]
    async fn stored_identity_is_extracted() {
        let app = app(false);
        let res = app
            .clone()
            .oneshot(Request::builder().uri("/sign-in").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let set_cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(!set_cookie.contains("Secure"));
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ada");
    }

    #[tokio::test]
    async fn secure_flag_follows_config() {
        let res = app(true)
            .oneshot(Request::builder().uri("/sign-in").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let set_cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Secure"));
    }
}
