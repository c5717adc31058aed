//! Request classification
//!
//! The route table is an ordered list of `(pattern, policy)` rules evaluated
//! first-match-wins. Classification looks at the path only. A path no rule
//! matches is protected.

use std::fmt;
use std::str::FromStr;

use secweb_shared::config::RouteSettings;

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    PermitAll,
    Authenticated,
}

impl FromStr for AccessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "permit_all" => Ok(AccessPolicy::PermitAll),
            "authenticated" => Ok(AccessPolicy::Authenticated),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Public,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*`, exactly one non-empty segment
    Any,
    /// `**`, zero or more trailing segments
    Rest,
}

/// Ant-style path pattern: literal segments, `*` for one segment, and a
/// trailing `**` for any remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidRoutePattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        if !raw.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if raw.contains('?') || raw.contains('#') {
            return Err(invalid("must not contain a query or fragment"));
        }

        let parts = split_path(raw);
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = match *part {
                "**" if i + 1 == parts.len() => Segment::Rest,
                "**" => return Err(invalid("'**' is only allowed as the last segment")),
                "*" => Segment::Any,
                lit if lit.contains('*') => {
                    return Err(invalid("wildcards must span a whole segment"))
                }
                lit => Segment::Literal(lit.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `/**`
    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.as_slice(), [Segment::Rest])
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts = split_path(path);
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Rest => return true,
                Segment::Any => match parts.get(i) {
                    Some(p) if !p.is_empty() => {}
                    _ => return false,
                },
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return false;
                    }
                }
            }
        }
        parts.len() == self.segments.len()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// `/` has no segments; `/a/b/` is `["a", "b", ""]`.
fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub policy: AccessPolicy,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Builds the table from configured rules. `always_public` paths (login
    /// and logout endpoints) are prepended as exact `permit_all` rules.
    pub fn from_settings(
        routes: &[RouteSettings],
        always_public: &[&str],
    ) -> Result<Self, ConfigurationError> {
        if routes.is_empty() {
            return Err(ConfigurationError::EmptyRouteTable);
        }

        let mut rules = Vec::with_capacity(always_public.len() + routes.len());
        for path in always_public {
            let pattern = PathPattern::parse(path)?;
            if pattern.segments.iter().any(|s| !matches!(s, Segment::Literal(_))) {
                return Err(ConfigurationError::InvalidRoutePattern {
                    pattern: path.to_string(),
                    reason: "endpoint paths must not contain wildcards".to_string(),
                });
            }
            rules.push(RouteRule {
                pattern,
                policy: AccessPolicy::PermitAll,
            });
        }

        let mut catch_all: Option<String> = None;
        for route in routes {
            if let Some(catch_all) = &catch_all {
                return Err(ConfigurationError::UnreachableRoute {
                    pattern: route.pattern.clone(),
                    catch_all: catch_all.clone(),
                });
            }
            let pattern = PathPattern::parse(&route.pattern)?;
            let policy = route.access.parse::<AccessPolicy>().map_err(|access| {
                ConfigurationError::UnknownAccessPolicy {
                    pattern: route.pattern.clone(),
                    access,
                }
            })?;
            if pattern.is_catch_all() {
                catch_all = Some(route.pattern.clone());
            }
            rules.push(RouteRule { pattern, policy });
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn classify(&self, path: &str) -> RequestClass {
        let policy = self
            .rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| rule.policy)
            .unwrap_or(AccessPolicy::Authenticated);
        match policy {
            AccessPolicy::PermitAll => RequestClass::Public,
            AccessPolicy::Authenticated => RequestClass::Protected,
        }
    }
}
