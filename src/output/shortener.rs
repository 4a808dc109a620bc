//! Replace long, well-known path prefixes with short names.
//!
//! Merged traces repeat SDK and checkout paths on almost every event;
//! substituting them makes the output noticeably smaller and easier to read.

use log::{info, warn};

/// Long-path -> short-name substitutions, kept in registration order
#[derive(Debug, Clone)]
pub struct PathShortener {
    enabled: bool,
    paths: Vec<(String, String)>,
}

impl Default for PathShortener {
    fn default() -> Self {
        Self {
            enabled: true,
            paths: Vec::new(),
        }
    }
}

impl PathShortener {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            paths: Vec::new(),
        }
    }

    /// Register a substitution
    ///
    /// Returns false (and warns) if `long_path` was already registered; the
    /// first registration wins.
    pub fn add(&mut self, long_path: impl Into<String>, short_name: impl Into<String>) -> bool {
        let long_path = long_path.into();
        let short_name = short_name.into();
        if let Some((_, existing)) = self.paths.iter().find(|(path, _)| *path == long_path) {
            warn!(
                "shortened path {} already exists (tried {}, existing {})",
                long_path, short_name, existing
            );
            return false;
        }
        self.paths.push((long_path, short_name));
        true
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Substitutions in effect, in registration order (empty when disabled)
    pub fn paths(&self) -> &[(String, String)] {
        if self.enabled {
            &self.paths
        } else {
            &[]
        }
    }

    /// Apply every substitution to `text` in registration order
    pub fn apply(&self, text: &str) -> String {
        if !self.enabled || self.paths.is_empty() {
            return text.to_string();
        }

        info!("Shortening known paths...");
        let mut result = text.to_string();
        for (long_path, short_name) in &self.paths {
            result = result.replace(long_path.as_str(), short_name);
        }
        info!("Shortened JSON from {} to {} bytes", text.len(), result.len());
        result
    }

    /// Shorten one path, picking the shortest result when several prefixes match
    pub fn shorten_path(&self, path: &str) -> String {
        if !self.enabled {
            return path.to_string();
        }
        self.paths
            .iter()
            .filter_map(|(long_path, short_name)| {
                path.strip_prefix(long_path.as_str())
                    .map(|rest| format!("{short_name}{rest}"))
            })
            .min_by_key(String::len)
            .filter(|candidate| candidate.len() < path.len())
            .unwrap_or_else(|| path.to_string())
    }

    /// Log the substitutions in effect
    pub fn log_paths(&self) {
        if !self.enabled || self.paths.is_empty() {
            return;
        }
        info!("[Paths shortened]");
        for (long_path, short_name) in &self.paths {
            info!("{} -> {}", long_path, short_name);
        }
    }
}
