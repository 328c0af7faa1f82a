//! Executable discovery for socat and kubectl.

use std::path::{Path, PathBuf};

/// Default paths to search for socat.
const SOCAT_PATHS: &[&str] = &[
    "/opt/homebrew/bin/socat", // Apple Silicon
    "/usr/local/bin/socat",    // Intel Mac / Homebrew
    "/usr/bin/socat",          // System
];

/// Default paths to search for kubectl.
const KUBECTL_PATHS: &[&str] = &[
    "/opt/homebrew/bin/kubectl", // Apple Silicon
    "/usr/local/bin/kubectl",    // Intel Mac / Homebrew
    "/usr/bin/kubectl",          // System
];

/// Locations of the external forwarding binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executables {
    pub socat: PathBuf,
    pub kubectl: PathBuf,
}

impl Executables {
    /// Searches the well-known install locations, then `PATH`.
    ///
    /// Falls back to the bare program name so that a missing binary
    /// surfaces as a launch error from the runner.
    pub fn discover() -> Self {
        Self {
            socat: locate("socat", SOCAT_PATHS),
            kubectl: locate("kubectl", KUBECTL_PATHS),
        }
    }

    /// Applies explicit overrides on top of discovery.
    pub fn with_overrides(socat: Option<PathBuf>, kubectl: Option<PathBuf>) -> Self {
        let discovered = Self::discover();
        Self {
            socat: socat.unwrap_or(discovered.socat),
            kubectl: kubectl.unwrap_or(discovered.kubectl),
        }
    }
}

impl Default for Executables {
    fn default() -> Self {
        Self::discover()
    }
}

fn locate(name: &str, paths: &[&str]) -> PathBuf {
    find_executable(paths)
        .or_else(|| find_in_path(name))
        .unwrap_or_else(|| PathBuf::from(name))
}

/// Finds an executable in the given paths.
fn find_executable(paths: &[&str]) -> Option<PathBuf> {
    paths.iter().map(PathBuf::from).find(|p| p.is_file())
}

/// Finds an executable in the directories listed in `PATH`.
fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| Path::new(candidate).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_executable() {
        // Test with a path that should exist on most systems
        let result = find_executable(&["/nonexistent/sh", "/bin/sh"]);
        assert_eq!(result, Some(PathBuf::from("/bin/sh")));

        // Test with a path that shouldn't exist
        let result = find_executable(&["/nonexistent/path"]);
        assert!(result.is_none());
    }

    #[test]
    fn test_locate_falls_back_to_name() {
        let path = locate("definitely-not-a-real-binary-name", &["/nonexistent/path"]);
        assert_eq!(path, PathBuf::from("definitely-not-a-real-binary-name"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let exes = Executables::with_overrides(
            Some(PathBuf::from("/opt/socat")),
            Some(PathBuf::from("/opt/kubectl")),
        );
        assert_eq!(exes.socat, PathBuf::from("/opt/socat"));
        assert_eq!(exes.kubectl, PathBuf::from("/opt/kubectl"));
    }
}
