//! Route table
//!
//! Which routes need an access token, as data. Patterns use the router's
//! own syntax so the gate can look up the matched path directly. A route
//! missing from the table is protected.

use axum::http::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub method: Method,
    pub path: &'static str,
    pub access: Access,
}

const fn public(method: Method, path: &'static str) -> RouteRule {
    RouteRule {
        method,
        path,
        access: Access::Public,
    }
}

const fn protected(method: Method, path: &'static str) -> RouteRule {
    RouteRule {
        method,
        path,
        access: Access::Protected,
    }
}

pub const ROUTE_TABLE: &[RouteRule] = &[
    // users
    public(Method::POST, "/users"),
    public(Method::POST, "/users/login"),
    protected(Method::GET, "/users/{id}"),
    protected(Method::PUT, "/users/{id}"),
    protected(Method::DELETE, "/users/{id}"),
    protected(Method::GET, "/users/{id}/bookings"),
    protected(Method::GET, "/users/{id}/future-bookings"),
    protected(Method::GET, "/users/{id}/rates"),
    // restaurants
    public(Method::POST, "/restaurants"),
    public(Method::POST, "/restaurants/login"),
    protected(Method::GET, "/restaurants"),
    protected(Method::GET, "/restaurants/{id}"),
    protected(Method::PUT, "/restaurants/{id}"),
    protected(Method::DELETE, "/restaurants/{id}"),
    protected(Method::GET, "/restaurants/{id}/bookings"),
    protected(Method::GET, "/restaurants/{id}/active-bookings"),
    protected(Method::GET, "/restaurants/{id}/past-bookings"),
    protected(Method::GET, "/restaurants/{id}/rates"),
    protected(Method::GET, "/restaurants/{id}/average-rating"),
    // bookings
    public(Method::POST, "/bookings"),
    protected(Method::GET, "/bookings/{id}"),
    protected(Method::PUT, "/bookings/{id}"),
    protected(Method::DELETE, "/bookings/{id}"),
    protected(Method::PUT, "/bookings/{id}/cancel"),
    protected(Method::GET, "/bookings/date/{date}"),
    // rates
    protected(Method::POST, "/rates"),
    protected(Method::GET, "/rates/recent"),
    protected(Method::GET, "/rates/{id}"),
    protected(Method::PUT, "/rates/{id}"),
    protected(Method::DELETE, "/rates/{id}"),
    // tokens
    public(Method::POST, "/refresh-token"),
];

pub fn lookup(method: &Method, path: &str) -> Option<&'static RouteRule> {
    ROUTE_TABLE
        .iter()
        .find(|rule| rule.method == *method && rule.path == path)
}

/// Unknown routes fail closed.
pub fn requires_auth(method: &Method, path: &str) -> bool {
    lookup(method, path).map_or(true, |rule| rule.access == Access::Protected)
}
