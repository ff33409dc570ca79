//! Platform shell detection.

use std::path::PathBuf;

/// The user's shell, used to run the test command.
pub fn shell_executable() -> PathBuf {
    if cfg!(target_os = "windows") {
        std::env::var("COMSPEC")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("cmd.exe"))
    } else {
        std::env::var("SHELL")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/bin/sh"))
    }
}

/// Flag that makes [`shell_executable`] run a command string.
///
/// Plain `-c` rather than a login shell: profile scripts often prepend
/// version-manager shims to `PATH`, which would hide the trial environment.
pub fn shell_flag() -> &'static str {
    if cfg!(target_os = "windows") {
        "/C"
    } else {
        "-c"
    }
}

/// Check if running in a CI environment.
///
/// Used to force non-interactive output in `main()`. Checks `CI`,
/// `GITHUB_ACTIONS`, `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "JENKINS_URL"]
        .iter()
        .any(|key| std::env::var_os(key).is_some())
}
