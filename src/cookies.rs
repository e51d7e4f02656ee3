use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::HttpRequest;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

pub fn remove_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name.to_owned(), "")
        .http_only(true)
        .secure(true)
        .path("/")
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

/// Bearer token from the `Authorization` header, else the access-token cookie.
///
/// A present but non-Bearer `Authorization` header yields `None` without
/// consulting the cookie.
pub fn access_token(req: &HttpRequest) -> Option<String> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let value = value.to_str().ok()?;
        let (scheme, token) = value.trim().split_once(' ')?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return None;
        }
        return Some(token.to_owned());
    }

    req.cookie(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}
