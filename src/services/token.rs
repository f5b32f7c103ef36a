use tower_cookies::Cookies;

pub const TOKEN_COOKIE: &str = "token";

/// Source of the admin bearer token.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    fn auth_token(&self) -> Option<String>;
}

/// Reads the token from the request's `token` cookie.
pub struct CookieTokenStore {
    cookies: Cookies,
}

impl CookieTokenStore {
    pub fn new(cookies: Cookies) -> Self {
        Self { cookies }
    }
}

impl TokenStore for CookieTokenStore {
    fn auth_token(&self) -> Option<String> {
        self.cookies
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    }
}
