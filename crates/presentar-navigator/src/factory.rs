//! Building routes from names.

use crate::route::Route;
use crate::settings::RouteSettings;

/// Builds the route for a set of settings, or `None` for an unknown name.
pub type RouteFactory = Box<dyn Fn(&RouteSettings) -> Option<Box<dyn Route>>>;

/// Names the initial stack is built from, bottom to top.
///
/// A deep link such as `/inbox/42` expands to every prefix: `/`, `/inbox`,
/// `/inbox/42`. A name without a leading slash is used as is. The root name
/// alone yields nothing; the navigator falls back to `/` when no name
/// produced a route.
#[must_use]
pub fn initial_route_names(initial_route: &str) -> Vec<String> {
    match initial_route.strip_prefix('/') {
        Some("") => Vec::new(),
        Some(path) => {
            let mut names = Vec::with_capacity(path.split('/').count() + 1);
            names.push("/".to_string());
            let mut name = String::new();
            for part in path.split('/') {
                name.push('/');
                name.push_str(part);
                names.push(name.clone());
            }
            names
        }
        None if initial_route.is_empty() => Vec::new(),
        None => vec![initial_route.to_string()],
    }
}
