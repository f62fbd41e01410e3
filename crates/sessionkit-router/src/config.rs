//! Route table and guard configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RouteMeta
// ---------------------------------------------------------------------------

/// Access classification of a route.
///
/// A route may require a session, require its absence, or neither:
///
/// ```text
/// requires_auth: only reachable with an active session  (e.g. "/")
/// guest_only:    only reachable without one              (e.g. "/login")
/// neither:       always reachable
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub guest_only: bool,
}

impl RouteMeta {
    /// Reachable by anyone.
    pub const PUBLIC: Self = Self {
        requires_auth: false,
        guest_only: false,
    };

    /// Reachable only with an active session.
    pub const REQUIRES_AUTH: Self = Self {
        requires_auth: true,
        guest_only: false,
    };

    /// Reachable only without an active session.
    pub const GUEST_ONLY: Self = Self {
        requires_auth: false,
        guest_only: true,
    };
}

// ---------------------------------------------------------------------------
// Route / RouteTable
// ---------------------------------------------------------------------------

/// A named path and its access rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub meta: RouteMeta,
}

/// The client's routes, matched by exact path.
///
/// Unknown paths go to the fallback target if one is set (the catch-all).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: Vec<Route>,
    fallback: Option<String>,
}

impl RouteTable {
    /// An empty table with no catch-all.
    pub fn new() -> Self {
        Self::default()
    }

    /// The application's routes:
    ///
    /// | Path        | Name     | Access        |
    /// |-------------|----------|---------------|
    /// | `/`         | Home     | requires auth |
    /// | `/login`    | Login    | guest only    |
    /// | `/signup`   | Signup   | guest only    |
    /// | `/info`     | Info     | guest only    |
    /// | `/donation` | Donation | guest only    |
    /// | anything else | redirect to `/` |  |
    pub fn standard() -> Self {
        Self::new()
            .route("/", "Home", RouteMeta::REQUIRES_AUTH)
            .route("/login", "Login", RouteMeta::GUEST_ONLY)
            .route("/signup", "Signup", RouteMeta::GUEST_ONLY)
            .route("/info", "Info", RouteMeta::GUEST_ONLY)
            .route("/donation", "Donation", RouteMeta::GUEST_ONLY)
            .fallback("/")
    }

    /// Adds a route. A later route with the same path replaces the earlier.
    pub fn route(mut self, path: &str, name: &str, meta: RouteMeta) -> Self {
        self.routes.retain(|r| r.path != path);
        self.routes.push(Route {
            path: path.to_owned(),
            name: name.to_owned(),
            meta,
        });
        self
    }

    /// Sets where unknown paths redirect to.
    pub fn fallback(mut self, target: &str) -> Self {
        self.fallback = Some(target.to_owned());
        self
    }

    /// Looks up a route by path. Query string, fragment and a trailing
    /// slash are ignored.
    pub fn find(&self, path: &str) -> Option<&Route> {
        let path = normalize(path);
        self.routes.iter().find(|r| r.path == path)
    }

    /// Looks up a route by name.
    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// The catch-all target, if any.
    pub fn fallback_target(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

/// Strips query, fragment and trailing slashes (keeping the root `/`).
pub(crate) fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

// ---------------------------------------------------------------------------
// GuardConfig
// ---------------------------------------------------------------------------

/// Route guard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// When `false`, every navigation is admitted. For local development
    /// against a backend without auth.
    pub enforce: bool,

    /// Where unauthenticated visitors of protected routes are sent.
    pub login_path: String,

    /// Where authenticated visitors of guest-only routes are sent.
    pub home_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enforce: true,
            login_path: "/login".to_owned(),
            home_path: "/".to_owned(),
        }
    }
}

impl GuardConfig {
    /// A config that admits everything.
    pub fn disabled() -> Self {
        Self {
            enforce: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_classifies_routes() {
        let table = RouteTable::standard();
        assert_eq!(table.find("/").unwrap().meta, RouteMeta::REQUIRES_AUTH);
        assert_eq!(table.find("/login").unwrap().meta, RouteMeta::GUEST_ONLY);
        assert_eq!(table.find("/donation").unwrap().name, "Donation");
        assert_eq!(table.fallback_target(), Some("/"));
    }

    #[test]
    fn test_find_ignores_query_fragment_and_trailing_slash() {
        let table = RouteTable::standard();
        assert_eq!(table.find("/login/").unwrap().name, "Login");
        assert_eq!(table.find("/signup?ref=home").unwrap().name, "Signup");
        assert_eq!(table.find("/info#faq").unwrap().name, "Info");
        assert_eq!(table.find("/?x=1").unwrap().name, "Home");
    }

    #[test]
    fn test_find_unknown_path_is_none() {
        assert!(RouteTable::standard().find("/nowhere").is_none());
    }

    #[test]
    fn test_route_replaces_same_path() {
        let table = RouteTable::new()
            .route("/a", "First", RouteMeta::PUBLIC)
            .route("/a", "Second", RouteMeta::GUEST_ONLY);
        assert_eq!(table.routes().len(), 1);
        assert_eq!(table.find("/a").unwrap().name, "Second");
        assert!(table.by_name("First").is_none());
    }

    #[test]
    fn test_route_meta_deserializes_camel_case() {
        let meta: RouteMeta = serde_json::from_str(r#"{"requiresAuth": true}"#).unwrap();
        assert_eq!(meta, RouteMeta::REQUIRES_AUTH);
    }

    #[test]
    fn test_guard_config_default_enforces() {
        let config = GuardConfig::default();
        assert!(config.enforce);
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.home_path, "/");
        assert!(!GuardConfig::disabled().enforce);
    }
}
