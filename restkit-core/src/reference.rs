//! Resource references: a path, query parameters and an optional fragment.
//!
//! A [`Reference`] is an immutable value. Deriving a narrower reference with
//! [`Reference::with`] always produces a new value:
//!
//! - a relative path is resolved against the current path, an absolute one
//!   replaces it, and dot segments are removed;
//! - parameters are merged, the newer value winning on key collision;
//! - a given fragment replaces the current one.
//!
//! ```rust
//! use restkit_core::reference::{Reference, Scope};
//!
//! let base = Reference::parse("/api/items?limit=10");
//! let item = base.with(&Scope::new().path("items/42").parameter("limit", 1));
//! assert_eq!(item.to_string(), "/api/items/42?limit=1");
//! ```

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use url::form_urlencoded;

/// Query parameters in their original order.
///
/// Repeated names are kept as separate entries and a bare `flag` (no `=`)
/// stays bare when rendered. Setting or merging a name replaces every earlier
/// entry for it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(String, Option<String>)>);

impl Parameters {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        self.set(name.into(), Some(value.to_string()));
    }

    /// Sets `name` as a bare flag, rendered without `=`.
    pub fn insert_flag(&mut self, name: impl Into<String>) {
        self.set(name.into(), None);
    }

    /// Appends an entry without touching earlier ones with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl ToString) {
        self.0.push((name.into(), Some(value.to_string())));
    }

    fn set(&mut self, name: String, value: Option<String>) {
        match self.0.iter().position(|(n, _)| *n == name) {
            Some(index) => {
                self.0[index].1 = value;
                let mut seen = 0;
                self.0.retain(|(n, _)| {
                    if *n != name {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.0.push((name, value)),
        }
    }

    /// Returns the first value for `name`. A bare flag reads as `""`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// Returns every value for `name`, in order.
    pub fn get_all<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a str> + use<'a, 'b> {
        self.0
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Returns `true` when `name` is present, with or without a value.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    /// Number of entries, counting repeated names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref().unwrap_or("")))
    }

    /// Returns a new set holding `self` overridden by `other`.
    ///
    /// Names present in `other` take all of `other`'s entries, placed where
    /// the name first appeared in `self`; new names are appended.
    #[must_use]
    pub fn merge(&self, other: &Parameters) -> Parameters {
        let mut merged = Vec::with_capacity(self.0.len() + other.0.len());
        let mut placed: Vec<&str> = Vec::new();

        for (name, value) in &self.0 {
            if !other.contains(name) {
                merged.push((name.clone(), value.clone()));
            } else if !placed.contains(&name.as_str()) {
                placed.push(name);
                merged.extend(other.0.iter().filter(|(n, _)| n == name).cloned());
            }
        }
        merged.extend(
            other
                .0
                .iter()
                .filter(|(n, _)| !self.contains(n))
                .cloned(),
        );
        Parameters(merged)
    }

    /// Parses a raw query string, keeping order, repeats and bare flags.
    pub fn parse(query: &str) -> Self {
        let entries = query
            .split('&')
            .filter(|piece| !piece.is_empty())
            .filter_map(|piece| {
                let (name, value) = form_urlencoded::parse(piece.as_bytes()).next()?;
                let value = piece.contains('=').then(|| value.into_owned());
                Some((name.into_owned(), value))
            })
            .collect();
        Parameters(entries)
    }

    /// Form-urlencoded rendering, `None` when empty.
    pub fn to_query(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .0
            .iter()
            .map(|(name, value)| {
                let name: String = form_urlencoded::byte_serialize(name.as_bytes()).collect();
                match value {
                    Some(value) => {
                        let value: String =
                            form_urlencoded::byte_serialize(value.as_bytes()).collect();
                        format!("{name}={value}")
                    }
                    None => name,
                }
            })
            .collect();
        Some(pairs.join("&"))
    }
}

impl<N, V> FromIterator<(N, V)> for Parameters
where
    N: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut parameters = Parameters::new();
        parameters.extend(iter);
        parameters
    }
}

impl<N, V> Extend<(N, V)> for Parameters
where
    N: Into<String>,
    V: ToString,
{
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<N, V, const M: usize> From<[(N, V); M]> for Parameters
where
    N: Into<String>,
    V: ToString,
{
    fn from(pairs: [(N, V); M]) -> Self {
        pairs.into_iter().collect()
    }
}

/// The address of a resource relative to its endpoint's origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    path: String,
    parameters: Parameters,
    fragment: Option<String>,
}

impl Default for Reference {
    fn default() -> Self {
        Self {
            path: "/".to_owned(),
            parameters: Parameters::new(),
            fragment: None,
        }
    }
}

impl Reference {
    /// Parses `path[?query][#fragment]`. The query is form-urlencoded; order,
    /// repeated names and bare flags survive a round trip through `Display`.
    pub fn parse(input: &str) -> Self {
        let (rest, fragment) = match input.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_owned())),
            None => (input, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        let parameters = query.map(Parameters::parse).unwrap_or_default();

        Self {
            path: if path.is_empty() {
                "/".to_owned()
            } else {
                path.to_owned()
            },
            parameters,
            fragment,
        }
    }

    /// Path component.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Fragment, without the leading `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Encoded query string, without the leading `?`.
    pub fn query(&self) -> Option<String> {
        self.parameters.to_query()
    }

    /// Derives a new reference narrowed by `scope`.
    #[must_use]
    pub fn with(&self, scope: &Scope) -> Reference {
        let path = match scope.path.as_deref() {
            Some(relative) => expand_path(&self.path, relative),
            None => self.path.clone(),
        };

        Reference {
            path,
            parameters: self.parameters.merge(&scope.parameters),
            fragment: scope.fragment.clone().or_else(|| self.fragment.clone()),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if let Some(query) = self.query() {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

fn expand_path(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_owned();
    }

    let joined = if relative.starts_with('/') {
        relative.to_owned()
    } else {
        match base.rfind('/') {
            Some(index) => format!("{}{}", &base[..=index], relative),
            None => format!("/{relative}"),
        }
    };

    remove_dot_segments(&joined)
}

fn remove_dot_segments(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len() - 1;
    let mut output: Vec<&str> = Vec::with_capacity(segments.len());

    for (index, segment) in segments.iter().enumerate() {
        match *segment {
            "." => {
                if index == last {
                    output.push("");
                }
            }
            ".." => {
                // The leading "" of an absolute path is never popped.
                if output.len() > 1 {
                    output.pop();
                }
                if index == last {
                    output.push("");
                }
            }
            segment => output.push(segment),
        }
    }

    let path = output.join("/");
    if path.is_empty() { "/".to_owned() } else { path }
}

/// Options for deriving a narrower resource or representation.
///
/// Path, parameters and fragment are merged into the parent's [`Reference`];
/// headers are merged into the parent's default headers, the scope's values
/// winning on collision.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub(crate) path: Option<String>,
    pub(crate) parameters: Parameters,
    pub(crate) fragment: Option<String>,
    pub(crate) headers: HeaderMap,
}

impl Scope {
    /// Creates an empty scope. Deriving with it yields an equivalent resource.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `path` against the parent path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Adds one query parameter.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.parameters.insert(name, value);
        self
    }

    /// Adds several query parameters.
    #[must_use]
    pub fn parameters(mut self, parameters: impl Into<Parameters>) -> Self {
        self.parameters = self.parameters.merge(&parameters.into());
        self
    }

    /// Replaces the fragment.
    #[must_use]
    pub fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    /// Sets one header, replacing any earlier value for the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merges a set of headers into this scope.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = crate::transport::merge_headers(&self.headers, &headers);
        self
    }
}

impl From<Parameters> for Scope {
    fn from(parameters: Parameters) -> Self {
        Scope {
            parameters,
            ..Scope::default()
        }
    }
}
