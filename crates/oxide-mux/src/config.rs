//! Router configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::request::Method;

/// Tunable registration and fallback behavior.
///
/// The defaults give the stock behavior: GET routes answer HEAD, OPTIONS is
/// answered automatically, and routes registered without methods answer
/// every standard method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuxConfig {
    /// Register HEAD alongside GET when HEAD is not listed explicitly.
    pub auto_head: bool,
    /// Answer OPTIONS on a known path with the options handler instead of
    /// the method-not-allowed handler.
    pub auto_options: bool,
    /// Methods used when a route is registered without any.
    pub default_methods: Vec<String>,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            auto_head: true,
            auto_options: true,
            default_methods: Method::ALL.iter().map(|m| m.as_str().to_string()).collect(),
        }
    }
}

impl MuxConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// ```
    /// use oxide_mux::MuxConfig;
    ///
    /// let config = MuxConfig::from_json(r#"{"auto_head": false}"#).unwrap();
    /// assert!(!config.auto_head);
    /// assert!(config.auto_options);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MuxError;

    #[test]
    fn test_default_methods() {
        let config = MuxConfig::default();
        assert_eq!(
            config.default_methods,
            vec!["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "CONNECT", "OPTIONS", "TRACE"]
        );
    }

    #[test]
    fn test_from_json() {
        let config =
            MuxConfig::from_json(r#"{"auto_options": false, "default_methods": ["GET"]}"#)
                .unwrap();
        assert!(config.auto_head);
        assert!(!config.auto_options);
        assert_eq!(config.default_methods, vec!["GET"]);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        let err = MuxConfig::from_json(r#"{"auto_head": "yes"}"#).unwrap_err();
        assert!(matches!(err, MuxError::Config(_)));
    }
}
