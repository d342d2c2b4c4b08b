//! Route guards driven by the stored session and its role claim

use crate::domain::AuthSession;

pub const LOGIN_ROUTE: &str = "/login";
pub const FORBIDDEN_ROUTE: &str = "/forbidden";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteGuard {
    /// Any logged-in user.
    Authenticated,
    /// Logged-in user whose role is one of these.
    RoleRestricted(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(&'static str),
}

impl RouteGuard {
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RouteGuard::RoleRestricted(roles.into_iter().map(Into::into).collect())
    }

    /// A session holding only tokens (OAuth pending) is not yet logged in.
    pub fn evaluate(&self, session: &AuthSession) -> Access {
        let Some(user) = session.user.as_ref() else {
            return Access::Redirect(LOGIN_ROUTE);
        };
        match self {
            RouteGuard::Authenticated => Access::Allow,
            RouteGuard::RoleRestricted(roles) => {
                if roles.iter().any(|r| r == &user.role) {
                    Access::Allow
                } else {
                    tracing::debug!("Role '{}' not in {:?}", user.role, roles);
                    Access::Redirect(FORBIDDEN_ROUTE)
                }
            }
        }
    }
}
