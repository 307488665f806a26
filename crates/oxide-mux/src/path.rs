//! Path pattern compilation and matching.

use regex::Regex;
use tracing::trace;

use crate::error::{MuxError, Result};
use crate::request::Params;

/// Prefix marking a named parameter segment.
pub const PARAM_SIGIL: char = ':';

/// Separates a parameter name from its regex constraint.
pub const CONSTRAINT_DELIMITER: char = '|';

/// Segment text of the trailing wildcard marker.
pub const WILDCARD: &str = "...";

/// A segment in a path pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Binds the path segment under `name`; with a constraint, the segment
    /// must match it in full.
    Param {
        name: String,
        constraint: Option<Regex>,
    },
    /// Matches the remainder of the path, binding nothing.
    Wildcard,
}

/// A compiled route pattern.
///
/// Pattern syntax:
/// - `/users` - Literal path
/// - `/users/:id` - Named parameter
/// - `/users/:id|[0-9]+` - Named parameter constrained by a regex
/// - `/static/...` - Wildcard tail
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The original pattern string.
    pattern: String,
    /// Parsed segments, including the leading empty one.
    segments: Vec<Segment>,
    /// Whether the pattern ends in `/...`.
    wildcard: bool,
}

impl Pattern {
    /// Compiles a pattern string.
    ///
    /// Constraints are compiled here once, so a malformed regex is reported
    /// at registration rather than on the first matching request.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_mux::Pattern;
    ///
    /// let pattern = Pattern::parse("/posts/:id|[0-9]+/comments/:comment").unwrap();
    /// let params = pattern.match_path("/posts/123/comments/456").unwrap();
    /// assert_eq!(params.get("id"), Some("123"));
    /// assert_eq!(params.get("comment"), Some("456"));
    /// assert!(pattern.match_path("/posts/abc/comments/456").is_none());
    /// ```
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| MuxError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("pattern must start with '/'"));
        }

        let parts: Vec<&str> = pattern.split('/').collect();
        let last = parts.len() - 1;
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            if *part == WILDCARD {
                if i != last {
                    return Err(invalid("'...' is only allowed as the final segment"));
                }
                segments.push(Segment::Wildcard);
            } else if let Some(param) = part.strip_prefix(PARAM_SIGIL) {
                segments.push(Self::parse_param(pattern, part, param)?);
            } else {
                segments.push(Segment::Literal((*part).to_string()));
            }
        }

        Ok(Self {
            pattern: pattern.to_string(),
            wildcard: pattern.ends_with("/..."),
            segments,
        })
    }

    fn parse_param(pattern: &str, part: &str, param: &str) -> Result<Segment> {
        let (name, constraint) = match param.split_once(CONSTRAINT_DELIMITER) {
            Some((name, raw)) => {
                let regex = Regex::new(&format!("^(?:{raw})$")).map_err(|source| {
                    MuxError::InvalidConstraint {
                        pattern: pattern.to_string(),
                        segment: part.to_string(),
                        source,
                    }
                })?;
                (name, Some(regex))
            }
            None => (param, None),
        };

        if name.is_empty() {
            return Err(MuxError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: format!("segment {part:?} has an empty parameter name"),
            });
        }

        Ok(Segment::Param {
            name: name.to_string(),
            constraint,
        })
    }

    /// Attempts to match a path against this pattern.
    pub fn match_path(&self, path: &str) -> Option<Params> {
        self.match_segments(&split_path(path))
    }

    /// Attempts to match pre-split path segments against this pattern.
    ///
    /// Returns the bound parameters if the path matches.
    pub fn match_segments(&self, path: &[&str]) -> Option<Params> {
        if !self.wildcard && path.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();

        for (i, segment) in self.segments.iter().enumerate() {
            let value = *path.get(i)?;

            match segment {
                Segment::Wildcard => return Some(params),
                Segment::Param { name, constraint } => {
                    if let Some(regex) = constraint {
                        if !regex.is_match(value) {
                            trace!(pattern = %self.pattern, param = %name, value, "constraint rejected segment");
                            return None;
                        }
                    }
                    params.insert(name.as_str(), value);
                }
                Segment::Literal(literal) => {
                    if literal != value {
                        return None;
                    }
                }
            }
        }

        Some(params)
    }

    /// Returns the original pattern string.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns whether the pattern ends in a wildcard tail.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Returns the compiled segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the declared parameter names, in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Splits a request path on `/`, keeping empty segments.
///
/// `/users/42` becomes `["", "users", "42"]`.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(s: &str) -> Pattern {
        Pattern::parse(s).unwrap()
    }

    #[test]
    fn test_literal_path() {
        let pattern = pattern("/users");
        assert!(pattern.match_path("/users").is_some());
        assert!(pattern.match_path("/users/").is_none());
        assert!(pattern.match_path("/posts").is_none());
        assert!(pattern.match_path("/users/1").is_none());
    }

    #[test]
    fn test_root_path() {
        let pattern = pattern("/");
        assert!(pattern.match_path("/").is_some());
        assert!(pattern.match_path("").is_none());
        assert!(pattern.match_path("/a").is_none());
    }

    #[test]
    fn test_single_param() {
        let pattern = pattern("/users/:id");
        let params = pattern.match_path("/users/123").unwrap();
        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_empty_param_value() {
        let params = pattern("/users/:id").match_path("/users/").unwrap();
        assert_eq!(params.get("id"), Some(""));
    }

    #[test]
    fn test_multiple_params() {
        let pattern = pattern("/posts/:post_id/comments/:comment_id");
        let params = pattern.match_path("/posts/42/comments/7").unwrap();
        assert_eq!(params.get("post_id"), Some("42"));
        assert_eq!(params.get("comment_id"), Some("7"));
        assert_eq!(
            pattern.param_names().collect::<Vec<_>>(),
            vec!["post_id", "comment_id"]
        );
    }

    #[test]
    fn test_constrained_param() {
        let pattern = pattern("/users/:id|^[0-9]+$");
        let params = pattern.match_path("/users/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert!(pattern.match_path("/users/abc").is_none());
    }

    #[test]
    fn test_constraint_must_match_whole_segment() {
        let pattern = pattern("/users/:id|[0-9]+");
        assert!(pattern.match_path("/users/42").is_some());
        assert!(pattern.match_path("/users/4a2").is_none());
    }

    #[test]
    fn test_constraint_may_contain_delimiter() {
        let pattern = pattern("/files/:kind|png|jpg");
        assert!(pattern.match_path("/files/png").is_some());
        assert!(pattern.match_path("/files/jpg").is_some());
        assert!(pattern.match_path("/files/gif").is_none());
    }

    #[test]
    fn test_wildcard_tail() {
        let pattern = pattern("/static/...");
        assert!(pattern.is_wildcard());

        let params = pattern.match_path("/static/css/site.css").unwrap();
        assert!(params.is_empty());
        assert!(pattern.match_path("/static/").is_some());
        assert!(pattern.match_path("/static").is_none());
        assert!(pattern.match_path("/assets/site.css").is_none());
    }

    #[test]
    fn test_wildcard_binds_prefix_params() {
        let pattern = pattern("/users/:id/...");
        let params = pattern.match_path("/users/7/posts/1").unwrap();
        assert_eq!(params.get("id"), Some("7"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            Pattern::parse("users"),
            Err(MuxError::InvalidPattern { .. })
        ));
        assert!(matches!(
            Pattern::parse("/.../users"),
            Err(MuxError::InvalidPattern { .. })
        ));
        assert!(matches!(
            Pattern::parse("/users/:"),
            Err(MuxError::InvalidPattern { .. })
        ));
        assert!(matches!(
            Pattern::parse("/users/:id|[0-9"),
            Err(MuxError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/users/42"), vec!["", "users", "42"]);
        assert_eq!(split_path("/"), vec!["", ""]);
    }
}
