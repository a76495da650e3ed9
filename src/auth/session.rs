use actix_web::{
    HttpMessage,
    FromRequest, HttpRequest,
    cookie::{Cookie, SameSite, time::Duration},
    dev::Payload,
    web::Data,
};
use chrono::Utc;
use futures::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::Config,
    error::ApiError,
    model::{role::Role, user::User},
    models::SessionClaims,
};

pub const TOKEN_COOKIE: &str = "token";
pub const ROLE_COOKIE: &str = "role";
pub const USER_NAME_COOKIE: &str = "userName";

/// The signed-in user, as proven by the cookies.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Session {
    #[schema(example = "inventory@plumbx.com")]
    pub email: String,
    #[schema(example = "John Inventory")]
    pub name: String,
    #[schema(example = "inventory", value_type = String)]
    pub role: Role,
}

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

pub fn issue_token(user: &User, secret: &str, ttl: usize) -> Result<String, Error> {
    let claims = SessionClaims {
        sub: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<SessionClaims, Error> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Resolves a session from the raw `token` and `role` cookie values.
///
/// The token must verify and the role cookie must name the same role as the
/// token; anything else is treated as signed out.
pub fn resolve(token: Option<&str>, role: Option<&str>, secret: &str) -> Option<Session> {
    let claims = verify_token(token?, secret).ok()?;
    let role: Role = role?.parse().ok()?;

    if role != claims.role {
        return None;
    }

    Some(Session {
        email: claims.sub,
        name: claims.name,
        role: claims.role,
    })
}

/// Reads the session cookies off a request. Middleware passes
/// `ServiceRequest::request()`.
pub fn from_cookies(req: &HttpRequest, secret: &str) -> Option<Session> {
    let token = req.cookie(TOKEN_COOKIE);
    let role = req.cookie(ROLE_COOKIE);

    resolve(
        token.as_ref().map(|c| c.value()),
        role.as_ref().map(|c| c.value()),
        secret,
    )
}

fn session_cookie(name: &'static str, value: String, ttl: usize) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(ttl as i64))
        .finish()
}

/// `token` (HttpOnly), `role` and `userName`, all living for `ttl` seconds.
pub fn login_cookies(token: String, user: &User, ttl: usize) -> [Cookie<'static>; 3] {
    let mut token = session_cookie(TOKEN_COOKIE, token, ttl);
    token.set_http_only(true);

    [
        token,
        session_cookie(ROLE_COOKIE, user.role.to_string(), ttl),
        session_cookie(USER_NAME_COOKIE, user.name.clone(), ttl),
    ]
}

pub fn logout_cookies() -> [Cookie<'static>; 3] {
    [TOKEN_COOKIE, ROLE_COOKIE, USER_NAME_COOKIE].map(|name| {
        let mut cookie = Cookie::build(name, "").path("/").finish();
        cookie.make_removal();
        cookie
    })
}

impl FromRequest for Session {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // the API guard already resolved it
        if let Some(session) = req.extensions().get::<Session>() {
            return ready(Ok(session.clone()));
        }

        let Some(config) = req.app_data::<Data<Config>>() else {
            return ready(Err(ApiError::Internal));
        };

        ready(
            from_cookies(req, &config.session_secret)
                .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{SECRET, user};

    #[test]
    fn matching_cookies_resolve_the_session() {
        let inventory = user(1, Role::Inventory);
        let token = issue_token(&inventory, SECRET, 60).unwrap();

        let session = resolve(Some(&token), Some("inventory"), SECRET).unwrap();
        assert_eq!(session.email, inventory.email);
        assert_eq!(session.role, Role::Inventory);
    }

    #[test]
    fn forged_role_cookie_is_rejected() {
        let customer = user(1, Role::Customer);
        let token = issue_token(&customer, SECRET, 60).unwrap();

        assert_eq!(resolve(Some(&token), Some("admin"), SECRET), None);
        assert_eq!(resolve(Some(&token), None, SECRET), None);
        assert_eq!(resolve(None, Some("customer"), SECRET), None);
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let finance = user(1, Role::Finance);
        let token = issue_token(&finance, "another-secret-0123456789", 60).unwrap();
        assert_eq!(resolve(Some(&token), Some("finance"), SECRET), None);

        assert_eq!(resolve(Some("not-a-jwt"), Some("finance"), SECRET), None);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let claims = SessionClaims {
            sub: "old@plumbx.com".into(),
            name: "Old".into(),
            role: Role::Delivery,
            exp: now() - 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(resolve(Some(&token), Some("delivery"), SECRET), None);
    }

    #[test]
    fn login_cookies_share_path_and_lifetime() {
        let cookies = login_cookies("jwt".into(), &user(3, Role::Employee), 120);

        let names: Vec<_> = cookies.iter().map(|c| c.name()).collect();
        assert_eq!(names, [TOKEN_COOKIE, ROLE_COOKIE, USER_NAME_COOKIE]);
        assert_eq!(cookies[0].http_only(), Some(true));
        assert_eq!(cookies[1].value(), "employee");
        for cookie in &cookies {
            assert_eq!(cookie.path(), Some("/"));
            assert_eq!(cookie.same_site(), Some(SameSite::Lax));
            assert_eq!(cookie.max_age(), Some(Duration::seconds(120)));
        }
    }
}

#[cfg(test)]
mod extractor_tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn guarded_requests_reuse_the_stored_session() {
        let stored = Session {
            email: "employee4@plumbx.com".into(),
            name: "Jane Employee".into(),
            role: Role::Employee,
        };
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(stored.clone());

        let extracted = Session::extract(&req).await.unwrap();
        assert_eq!(extracted, stored);
    }

    #[actix_web::test]
    async fn without_a_stored_session_the_cookies_decide() {
        let req = TestRequest::default()
            .app_data(Data::new(crate::config::test_config()))
            .to_http_request();

        assert!(matches!(
            Session::extract(&req).await,
            Err(ApiError::Unauthorized(_))
        ));
    }
}
