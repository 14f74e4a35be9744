// error.rs — Error taxonomy for the provisioning pipeline
//
// Every variant here is terminal for a run: nothing is retried and nothing
// is downgraded to a warning. Filter mismatches are not errors at all; they
// are ordinary skips reported in the mutation summary.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required path (project, profile, or certificate) does not exist.
    #[error("{what} path does not exist: {}", .path.display())]
    ConfigurationPathInvalid { what: &'static str, path: PathBuf },

    #[error("trust anchor unavailable: {0}")]
    TrustAnchorUnavailable(String),

    #[error("profile verification failed: {0}")]
    ProfileVerificationFailed(String),

    #[error("decoded profile payload has no usable UUID entry")]
    IdentifierMissing,

    #[error("no provisioning profile path supplied (pass --profile or set {0})")]
    ProfileUnspecified(&'static str),

    #[error("no .xcodeproj bundle found in {}", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("multiple .xcodeproj bundles found in {}; pass --xcodeproj to disambiguate", .0.display())]
    ProjectAmbiguous(PathBuf),

    #[error("project file is not a valid pbxproj plist: {0}")]
    ProjectMalformed(String),

    #[error("invalid filter pattern: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Plist(#[from] plist::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
