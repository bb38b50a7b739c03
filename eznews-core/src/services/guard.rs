//! Route guards
//!
//! Decide what a protected view should do for the current session. The
//! decision is a pure function of a `SessionSnapshot`.

use crate::domain::SessionSnapshot;

/// Navigation targets a guard can redirect to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Home => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still restoring; show a loading placeholder
    Placeholder,
    Render,
    Redirect(Route),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    Authenticated,
    Admin,
}

impl RouteGuard {
    pub fn evaluate(&self, session: &SessionSnapshot) -> GuardDecision {
        if session.loading {
            return GuardDecision::Placeholder;
        }
        match self {
            RouteGuard::Authenticated if session.is_authenticated() => GuardDecision::Render,
            RouteGuard::Authenticated => GuardDecision::Redirect(Route::Login),
            RouteGuard::Admin if session.is_admin() => GuardDecision::Render,
            RouteGuard::Admin => GuardDecision::Redirect(Route::Home),
        }
    }

    /// Guard protecting `path`, or `None` for public pages
    pub fn for_path(path: &str) -> Option<RouteGuard> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let path = path.trim_end_matches('/');

        if path == "/admin" || path.starts_with("/admin/") {
            Some(RouteGuard::Admin)
        } else if matches!(path, "/profile" | "/bookmarks") {
            Some(RouteGuard::Authenticated)
        } else {
            None
        }
    }
}
