//! Client route table.
//!
//! Pages are addressed by path like a web app. Guarded pages need a session
//! and send signed-out users to `/auth`; `/auth` itself sends signed-in users
//! to `/home`.

use std::fmt;

/// A page of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Auth,
    Home,
    CreateTournament,
    Tournament(String),
    Settings,
    Terms,
    NotFound(String),
}

/// Result of resolving a path against the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Show(Route),
    Redirect(String),
}

/// Redirects are followed at most this many times
const MAX_REDIRECTS: usize = 4;

impl Route {
    /// Match a path to a route, without applying guards
    pub fn parse(path: &str) -> Route {
        let path = path.trim();
        let trimmed = path.trim_matches('/');
        let segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        match segments.as_slice() {
            [] => Route::Landing,
            ["auth"] => Route::Auth,
            ["home"] => Route::Home,
            ["tournament", "create"] => Route::CreateTournament,
            ["tournament", id] if !id.is_empty() => Route::Tournament(id.to_string()),
            ["settings"] => Route::Settings,
            ["terms-and-privacy"] => Route::Terms,
            _ => Route::NotFound(path.to_string()),
        }
    }

    /// Path this route is reached at
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Auth => "/auth".to_string(),
            Route::Home => "/home".to_string(),
            Route::CreateTournament => "/tournament/create".to_string(),
            Route::Tournament(id) => format!("/tournament/{id}"),
            Route::Settings => "/settings".to_string(),
            Route::Terms => "/terms-and-privacy".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Whether the page needs a session
    pub fn is_guarded(&self) -> bool {
        matches!(
            self,
            Route::Home | Route::CreateTournament | Route::Tournament(_) | Route::Settings
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Resolve one navigation step
pub fn resolve(path: &str, authenticated: bool) -> Navigation {
    // Old profile links land on the settings page
    if path.trim().trim_matches('/') == "profile" {
        return Navigation::Redirect("/settings".to_string());
    }

    let route = Route::parse(path);
    if route.is_guarded() && !authenticated {
        return Navigation::Redirect("/auth".to_string());
    }
    if route == Route::Auth && authenticated {
        return Navigation::Redirect("/home".to_string());
    }
    Navigation::Show(route)
}

/// Follow redirects until a page is shown
pub fn navigate(path: &str, authenticated: bool) -> Route {
    let mut current = path.to_string();
    for _ in 0..MAX_REDIRECTS {
        match resolve(&current, authenticated) {
            Navigation::Show(route) => return route,
            Navigation::Redirect(next) => current = next,
        }
    }
    Route::NotFound(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_routes() {
        assert_eq!(Route::parse("/"), Route::Landing);
        assert_eq!(Route::parse(""), Route::Landing);
        assert_eq!(Route::parse("/auth"), Route::Auth);
        assert_eq!(Route::parse("/home/"), Route::Home);
        assert_eq!(Route::parse("settings"), Route::Settings);
        assert_eq!(Route::parse("/tournament/create"), Route::CreateTournament);
        assert_eq!(
            Route::parse("/tournament/abc-123"),
            Route::Tournament("abc-123".to_string())
        );
        assert_eq!(Route::parse("/terms-and-privacy"), Route::Terms);
    }

    #[test]
    fn test_unknown_paths_are_not_found() {
        assert_eq!(
            Route::parse("/nowhere"),
            Route::NotFound("/nowhere".to_string())
        );
        assert!(matches!(Route::parse("/tournament/a/b"), Route::NotFound(_)));
    }

    #[test]
    fn test_guarded_routes_redirect_to_auth() {
        for path in ["/home", "/tournament/create", "/tournament/t1", "/settings"] {
            assert_eq!(
                resolve(path, false),
                Navigation::Redirect("/auth".to_string()),
                "{path}"
            );
            assert!(matches!(resolve(path, true), Navigation::Show(_)), "{path}");
        }
    }

    #[test]
    fn test_auth_redirects_home_with_session() {
        assert_eq!(resolve("/auth", false), Navigation::Show(Route::Auth));
        assert_eq!(navigate("/auth", true), Route::Home);
    }

    #[test]
    fn test_profile_redirects_to_settings() {
        assert_eq!(navigate("/profile", true), Route::Settings);
        // Settings is guarded, so a signed-out user ends on the sign-in page
        assert_eq!(navigate("/profile", false), Route::Auth);
    }

    #[test]
    fn test_public_pages_need_no_session() {
        assert_eq!(navigate("/", false), Route::Landing);
        assert_eq!(navigate("/terms-and-privacy", false), Route::Terms);
    }
}
