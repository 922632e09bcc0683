//! Version and build information
//!
//! Provides the version string and build metadata (commit SHA, build
//! date, rustc version) embedded by `build.rs`.

/// Get the full version string including build metadata
///
/// Returns format: "crosstag {version} ({commit} {date}) rustc {rustc_version}"
pub fn version() -> String {
    format!(
        "crosstag {} ({} {}) rustc {}",
        package_version(),
        build_commit(),
        build_date(),
        rustc_version()
    )
}

/// Get the package version (e.g., "0.1.0")
pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get the build commit SHA
///
/// Returns "unknown" if not built with commit info
pub fn build_commit() -> &'static str {
    option_env!("CROSSTAG_COMMIT_SHA").unwrap_or("unknown")
}

/// Get the build date
///
/// Returns "unknown" if not built with date info
pub fn build_date() -> &'static str {
    option_env!("CROSSTAG_BUILD_DATE").unwrap_or("unknown")
}

/// Get the Rust compiler version used for the build
///
/// Returns "unknown" if not built with rustc version info
pub fn rustc_version() -> &'static str {
    option_env!("CROSSTAG_RUSTC_VERSION").unwrap_or("unknown")
}
