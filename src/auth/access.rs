//! Page and API access rules.
//!
//! Pure functions of (role, method, path); the middleware in
//! [`crate::auth::middleware`] turns their verdicts into responses.

use actix_web::http::Method;
use url::form_urlencoded;

use crate::model::role::Role;

pub const SIGN_IN_PAGE: &str = "/signin";
pub const REGISTER_PAGE: &str = "/register";

/// Pages anyone may open.
pub const PUBLIC_PAGES: &[&str] = &[SIGN_IN_PAGE, REGISTER_PAGE, "/homepage", "/about", "/contact"];

/// Never gated as pages: API routes, build output and docs.
const PASSTHROUGH_PREFIXES: &[&str] = &["/api", "/_next", "/static", "/swagger-ui", "/api-doc"];

/// `true` when `path` is `prefix` or lies below it.
///
/// `/cart` matches `/cart` and `/cart/42` but not `/cartography`.
pub fn has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Asset or API path the page gate must not touch.
pub fn is_passthrough(path: &str) -> bool {
    if PASSTHROUGH_PREFIXES.iter().any(|p| has_prefix(path, p)) {
        return true;
    }

    // favicon.ico, robots.txt, /fonts/x.woff2 ...
    path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PAGES.iter().any(|page| has_prefix(path, page))
}

pub fn role_allows_page(role: Role, path: &str) -> bool {
    match role.page_prefixes() {
        Some(prefixes) => prefixes.iter().any(|prefix| has_prefix(path, prefix)),
        None => true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAccess {
    Pass,
    /// Unauthenticated; carries the sign-in URL with the callback.
    SignIn(String),
    /// Authenticated but out of bounds; carries the role's home.
    Home(&'static str),
}

/// Decides what happens to a page request. `role` is `None` when no valid
/// session was found.
pub fn decide_page(path: &str, role: Option<Role>) -> PageAccess {
    if is_passthrough(path) {
        return PageAccess::Pass;
    }

    if let Some(role) = role {
        if path == SIGN_IN_PAGE || path == REGISTER_PAGE {
            return PageAccess::Home(role.home());
        }
    }

    if is_public(path) {
        return PageAccess::Pass;
    }

    match role {
        None => PageAccess::SignIn(sign_in_url(path)),
        Some(role) if role_allows_page(role, path) => PageAccess::Pass,
        Some(role) => PageAccess::Home(role.home()),
    }
}

pub fn sign_in_url(callback: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", callback)
        .finish();
    format!("{SIGN_IN_PAGE}?{query}")
}

/// `(role, read/write prefixes, read-only prefixes)`, relative to the API
/// prefix. Admin is handled apart.
const API_GRANTS: &[(Role, &[&str], &[&str])] = &[
    (Role::Inventory, &["/inventory"], &[]),
    (Role::Employee, &["/employees"], &[]),
    (Role::Delivery, &["/delivery"], &["/inventory"]),
    (Role::Finance, &["/finance"], &["/employees"]),
    (Role::Customer, &[], &["/inventory"]),
];

fn is_read(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

/// Whether `role` may call `method route`, where `route` is the request path
/// with the API prefix removed (`/inventory/3`).
pub fn api_allows(role: Role, method: &Method, route: &str) -> bool {
    if role == Role::Admin {
        return true;
    }

    API_GRANTS
        .iter()
        .filter(|(granted, _, _)| *granted == role)
        .any(|(_, read_write, read_only)| {
            read_write.iter().any(|prefix| has_prefix(route, prefix))
                || (is_read(method) && read_only.iter().any(|prefix| has_prefix(route, prefix)))
        })
}
