//! # Route Table
//!
//! Static, ordered list of route descriptors and the path patterns they match.
//!
//! Patterns are written the way the views reference them: `/`, `/me/edit`,
//! `/profile/:id`. A segment starting with `:` captures one path segment
//! under that name. Matching ignores trailing slashes, the query string and
//! the fragment; captured values are percent-decoded.
//!
//! ```
//! use core_router::{AccessRequirement, RouteTable};
//!
//! let table = RouteTable::builder()
//!     .route("/", "home", "HomePage", AccessRequirement::RequiresAuthenticated)
//!     .route("/thread/:id", "thread-detail", "ThreadDetailPage", AccessRequirement::RequiresAuthenticated)
//!     .route("/login", "login", "LoginPage", AccessRequirement::RequiresGuest)
//!     .build()
//!     .unwrap();
//!
//! let matched = table.resolve("/thread/7?tab=replies").unwrap();
//! assert_eq!(matched.route.name, "thread-detail");
//! assert_eq!(matched.param("id"), Some("7"));
//! ```

use crate::error::{Result, RouterError};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Who may enter a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessRequirement {
    /// Only with a credential token present
    RequiresAuthenticated,
    /// Only without a credential token (login, registration)
    RequiresGuest,
    /// Anyone
    Unrestricted,
}

impl AccessRequirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessRequirement::RequiresAuthenticated => "requires-authenticated",
            AccessRequirement::RequiresGuest => "requires-guest",
            AccessRequirement::Unrestricted => "unrestricted",
        }
    }
}

impl fmt::Display for AccessRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed route pattern such as `/comments/:threadId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidPattern`] if the pattern does not start with `/`,
    /// has an unnamed or malformed parameter, or repeats a parameter name.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut seen = HashSet::new();
        let mut segments = Vec::new();

        for part in pattern.split('/').filter(|s| !s.is_empty()) {
            match part.strip_prefix(':') {
                Some(name) => {
                    if name.is_empty() {
                        return Err(invalid("parameter name is empty"));
                    }
                    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(invalid("parameter names may only use [A-Za-z0-9_]"));
                    }
                    if !seen.insert(name.to_string()) {
                        return Err(invalid("duplicate parameter name"));
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Names of the parameters, in order of appearance.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a concrete path, returning the captured parameters.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<Cow<'_, str>> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal.as_str() != part.as_ref() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), part.into_owned());
                }
            }
        }

        Some(params)
    }

    /// Build a concrete path, percent-encoding parameter values.
    ///
    /// Returns the name of the first missing parameter on failure.
    fn fill(&self, params: &BTreeMap<String, String>) -> std::result::Result<String, String> {
        if self.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(literal) => path.push_str(literal),
                Segment::Param(name) => match params.get(name) {
                    Some(value) if !value.is_empty() => path.push_str(&urlencoding::encode(value)),
                    _ => return Err(name.clone()),
                },
            }
        }
        Ok(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Strip query and fragment, then yield decoded non-empty segments.
fn split_path(path: &str) -> impl Iterator<Item = Cow<'_, str>> {
    path_only(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::decode(s).unwrap_or(Cow::Borrowed(s)))
}

/// The path portion of a request, without query or fragment.
pub(crate) fn path_only(path: &str) -> &str {
    let end = path.find(&['?', '#'][..]).unwrap_or(path.len());
    &path[..end]
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub pattern: PathPattern,
    /// Stable identifier used for named navigation
    pub name: String,
    /// Identifier of the view the host renders for this route
    pub view: String,
    pub access: AccessRequirement,
}

impl RouteDescriptor {
    pub fn new(
        pattern: &str,
        name: impl Into<String>,
        view: impl Into<String>,
        access: AccessRequirement,
    ) -> Result<Self> {
        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
            name: name.into(),
            view: view.into(),
            access,
        })
    }
}

/// A route resolved against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: RouteDescriptor,
    /// The matched path, without query or fragment
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Ordered, immutable list of routes. The first match wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    /// Build a table from descriptors, rejecting duplicate names.
    pub fn new(routes: Vec<RouteDescriptor>) -> Result<Self> {
        let mut names = HashSet::new();
        for route in &routes {
            if !names.insert(route.name.as_str()) {
                return Err(RouterError::DuplicateRouteName(route.name.clone()));
            }
        }
        Ok(Self { routes })
    }

    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The routes shipped with the Linkup client.
    ///
    /// `/thread/create` is declared before `/thread/:id` so it is never
    /// captured as a thread id.
    pub fn linkup() -> Result<Self> {
        use AccessRequirement::{RequiresAuthenticated as Auth, RequiresGuest as Guest};

        Self::builder()
            .route("/", "home", "HomePage", Auth)
            .route("/me", "my-profile", "MyProfilePage", Auth)
            .route("/me/edit", "edit-profile", "UpdateProfilePage", Auth)
            .route("/profile/:id", "profile", "ProfilePage", Auth)
            .route("/search", "search", "SearchPage", Auth)
            .route("/thread/create", "create-thread", "CreateThreadPage", Auth)
            .route("/thread/:id", "thread-detail", "ThreadDetailPage", Auth)
            .route("/comments/:threadId", "comments", "CommentPage", Auth)
            .route("/login", "login", "LoginPage", Guest)
            .route("/register", "register", "RegisterPage", Guest)
            .route("/email-verified", "email-verified", "EmailVerifiedPage", Guest)
            .build()
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Find the first route matching `path`.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        self.routes.iter().find_map(|route| {
            route.pattern.matches(path).map(|params| RouteMatch {
                route: route.clone(),
                path: path_only(path).to_string(),
                params,
            })
        })
    }

    /// Build the concrete path of a named route.
    ///
    /// ```
    /// use core_router::RouteTable;
    /// use std::collections::BTreeMap;
    ///
    /// let table = RouteTable::linkup().unwrap();
    /// let params = BTreeMap::from([("threadId".to_string(), "99".to_string())]);
    /// assert_eq!(table.href("comments", &params).unwrap(), "/comments/99");
    /// ```
    pub fn href(&self, name: &str, params: &BTreeMap<String, String>) -> Result<String> {
        let route = self
            .get(name)
            .ok_or_else(|| RouterError::UnknownRoute(name.to_string()))?;

        route
            .pattern
            .fill(params)
            .map_err(|param| RouterError::MissingParam {
                route: name.to_string(),
                param,
            })
    }
}

/// Collects route definitions; pattern and name errors surface in `build`.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    entries: Vec<(String, String, String, AccessRequirement)>,
}

impl RouteTableBuilder {
    pub fn route(
        mut self,
        pattern: impl Into<String>,
        name: impl Into<String>,
        view: impl Into<String>,
        access: AccessRequirement,
    ) -> Self {
        self.entries
            .push((pattern.into(), name.into(), view.into(), access));
        self
    }

    pub fn build(self) -> Result<RouteTable> {
        let routes = self
            .entries
            .into_iter()
            .map(|(pattern, name, view, access)| RouteDescriptor::new(&pattern, name, view, access))
            .collect::<Result<Vec<_>>>()?;
        RouteTable::new(routes)
    }
}
