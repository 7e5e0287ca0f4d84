//! Route identity types.
//!
//! A [`RouteKey`] is the stable, compile-time identity of a destination;
//! a [`Route`] is a key plus the optional arguments a particular visit
//! carries. Keys are plain `&'static str` identifiers so graph lookup is
//! a table access instead of runtime type inspection.

use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a destination within the navigation graph.
///
/// Two routes with the same key resolve to the same graph node regardless
/// of their arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey(&'static str);

impl RouteKey {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Arguments attached to a route instance.
///
/// A sorted map so that two routes built from the same arguments compare
/// and hash identically, independent of insertion order.
pub type RouteArgs = BTreeMap<String, String>;

/// A concrete destination: a [`RouteKey`] plus optional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    key: RouteKey,
    args: RouteArgs,
}

impl Route {
    pub fn new(key: RouteKey) -> Self {
        Self {
            key,
            args: RouteArgs::new(),
        }
    }

    /// Attach an argument, replacing any previous value under the same name.
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    pub fn key(&self) -> RouteKey {
        self.key
    }

    pub fn args(&self) -> &RouteArgs {
        &self.args
    }

    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }
}

impl From<RouteKey> for Route {
    fn from(key: RouteKey) -> Self {
        Route::new(key)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            return write!(f, "{}", self.key);
        }
        write!(f, "{}?", self.key)?;
        for (i, (name, value)) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_with_same_key_and_args_are_equal() {
        let key = RouteKey::new("settings");
        let a = Route::new(key).with_arg("tab", "audio").with_arg("page", "2");
        let b = Route::new(key).with_arg("page", "2").with_arg("tab", "audio");
        assert_eq!(a, b);
    }

    #[test]
    fn routes_with_different_args_are_distinct() {
        let key = RouteKey::new("settings");
        let a = Route::new(key).with_arg("tab", "audio");
        let b = Route::new(key).with_arg("tab", "video");
        assert_ne!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn display_includes_args() {
        let route = Route::new(RouteKey::new("detail")).with_arg("id", "42");
        assert_eq!(route.to_string(), "detail?id=42");
        assert_eq!(Route::new(RouteKey::new("home")).to_string(), "home");
    }
}
