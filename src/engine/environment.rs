//! Execution environment detection

use std::path::Path;

use serde::Serialize;

/// File the container runtime drops into every container it starts.
pub const CONTAINER_MARKER: &str = "/.dockerenv";

/// Where commands end up running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Already inside a container that has the client tools: run commands directly
    InsideContainer,
    /// On a plain host: pull an image and run each command in a throwaway container
    Host,
}

impl Environment {
    pub fn detect() -> Self {
        Self::detect_at(Path::new(CONTAINER_MARKER))
    }

    /// Detect using an arbitrary marker path. Any failure to stat the
    /// marker counts as "not inside".
    pub fn detect_at(marker: &Path) -> Self {
        if marker.exists() {
            Environment::InsideContainer
        } else {
            Environment::Host
        }
    }

    pub fn is_inside_container(self) -> bool {
        self == Environment::InsideContainer
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::InsideContainer => write!(f, "inside container"),
            Environment::Host => write!(f, "host"),
        }
    }
}
