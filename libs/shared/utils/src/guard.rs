use serde::Serialize;
use tracing::debug;

use shared_models::auth::Role;

pub const AUTH_PATH: &str = "/auth";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum RouteDecision {
    Allow,
    Redirect { location: String },
}

impl RouteDecision {
    fn redirect(location: &str) -> Self {
        RouteDecision::Redirect { location: location.to_string() }
    }
}

/// Decide whether a caller with `role` may open `path`.
///
/// Unauthenticated callers are sent to the sign-in page. A signed-in caller
/// asking for another role's dashboard lands on their own root instead.
pub fn resolve_route(role: Option<Role>, path: &str) -> RouteDecision {
    let path = normalize(path);

    if path == "/" || is_under(&path, AUTH_PATH) {
        return RouteDecision::Allow;
    }

    let Some(role) = role else {
        debug!("Unauthenticated access to {}, redirecting to sign-in", path);
        return RouteDecision::redirect(AUTH_PATH);
    };

    if is_under(&path, role.root_path()) {
        return RouteDecision::Allow;
    }

    debug!("{} may not open {}, redirecting to {}", role, path, role.root_path());
    RouteDecision::redirect(role.root_path())
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn is_under(path: &str, root: &str) -> bool {
    path == root || path.strip_prefix(root).is_some_and(|rest| rest.starts_with('/'))
}
