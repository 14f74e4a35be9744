// pipeline.rs — Stage sequencing
//
// Resolve project → obtain trust anchor → read profile → verify → decode →
// extract identifier → load project tree → mutate → save. Strictly
// sequential; any failure aborts the run before the single save call at the
// end, so a failed run leaves the on-disk project byte-identical.

use std::fs;
use std::path::{Path, PathBuf};

use crate::anchor::{self, TrustAnchor};
use crate::error::{Error, Result};
use crate::filter::NameFilter;
use crate::mutate::{self, MutationReport};
use crate::profile::ProfilePayload;
use crate::project::{self, ProjectTree};
use crate::verify;

/// Supplies a profile path when none was given explicitly (e.g. published
/// by a prior pipeline stage). Injected by the caller; the pipeline itself
/// reads no ambient state.
pub type ProfilePathProvider = Box<dyn Fn() -> Option<PathBuf>>;

pub struct RunOptions {
    pub xcodeproj: Option<PathBuf>,
    pub profile: Option<PathBuf>,
    pub target_filter: Option<String>,
    pub build_configuration: Option<String>,
    pub certificate: Option<PathBuf>,
    pub default_profile: Option<ProfilePathProvider>,
}

/// Environment variable consulted by the provider wired up in `main`.
pub const PROFILE_PATH_ENV: &str = "PROVISIONING_PROFILE_PATH";

/// Run the whole pipeline once. Returns the mutation report on success.
pub fn run(opts: &RunOptions) -> Result<MutationReport> {
    // 1. Resolve the project bundle.
    let bundle = match &opts.xcodeproj {
        Some(path) => path.clone(),
        None => project::discover(Path::new("."))?,
    };
    eprintln!("[xcprovision] project: {}", bundle.display());

    // Filters are validated up front so a bad pattern fails before any
    // network or file activity.
    let target_filter = NameFilter::parse(opts.target_filter.as_deref())?;
    let config_filter = NameFilter::parse(opts.build_configuration.as_deref())?;

    // 2. Resolve the profile path: explicit flag, else injected provider.
    let profile_path = opts
        .profile
        .clone()
        .or_else(|| opts.default_profile.as_ref().and_then(|provider| provider()))
        .ok_or(Error::ProfileUnspecified(PROFILE_PATH_ENV))?;
    if !profile_path.exists() {
        return Err(Error::ConfigurationPathInvalid {
            what: "profile",
            path: profile_path,
        });
    }

    // 3. Obtain the trust anchor.
    let certificate_path = opts
        .certificate
        .clone()
        .unwrap_or_else(anchor::default_cache_path);
    let trust_anchor = TrustAnchor::obtain(&certificate_path)?;
    eprintln!(
        "[xcprovision] trust anchor: sha256:{}",
        trust_anchor.fingerprint()
    );

    // 4. Read and verify the signed profile.
    let signed = fs::read(&profile_path)?;
    let payload = verify::verify_profile(&signed, &trust_anchor)?;
    eprintln!("[xcprovision] profile signature: OK");

    // 5. Decode and extract the identifier.
    let decoded = ProfilePayload::decode(&payload)?;
    log_profile_details(&decoded);
    let identifier = decoded.identifier()?.to_string();
    eprintln!("[xcprovision] profile UUID: {identifier}");

    // 6. Load, mutate, and persist — one save, at the very end.
    let mut tree = ProjectTree::load(&bundle)?;
    let report = mutate::apply(&mut tree, &identifier, &target_filter, &config_filter)?;
    tree.save()?;
    eprintln!("[xcprovision] saved {}", tree.pbxproj_path().display());

    Ok(report)
}

fn log_profile_details(decoded: &ProfilePayload) {
    if let Some(name) = &decoded.name {
        match &decoded.team_name {
            Some(team) => eprintln!("[xcprovision] profile: {name} (team: {team})"),
            None => eprintln!("[xcprovision] profile: {name}"),
        }
    }
    if let Some(expiration) = decoded.expiration() {
        if decoded.is_expired() {
            eprintln!(
                "[xcprovision] WARNING: profile expired on {}",
                expiration.to_rfc3339()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutate::PROVISIONING_SETTING;
    use crate::project::fixtures::{config_id, write_project};
    use crate::verify::testsupport::{sign_payload, test_authority};
    use std::path::Path;

    const APP: &str = "com.apple.product-type.application";

    struct Setup {
        _dir: tempfile::TempDir,
        bundle: PathBuf,
        certificate: PathBuf,
        profile: PathBuf,
    }

    /// Tempdir with a one-target fixture project, a trust anchor file, and a
    /// profile signed by that anchor carrying `payload`.
    fn setup(payload: &[u8]) -> Setup {
        let dir = tempfile::tempdir().unwrap();
        let bundle = write_project(dir.path(), "App", &[("App", APP, &["Debug", "Release"])]);

        let (cert, key) = test_authority("Pipeline Test Root");
        let certificate = dir.path().join("root.cer");
        fs::write(&certificate, cert.to_der().unwrap()).unwrap();

        let profile = dir.path().join("app.mobileprovision");
        fs::write(&profile, sign_payload(&cert, &key, payload)).unwrap();

        Setup {
            _dir: dir,
            bundle,
            certificate,
            profile,
        }
    }

    fn options(s: &Setup) -> RunOptions {
        RunOptions {
            xcodeproj: Some(s.bundle.clone()),
            profile: Some(s.profile.clone()),
            target_filter: None,
            build_configuration: None,
            certificate: Some(s.certificate.clone()),
            default_profile: None,
        }
    }

    fn payload_with_uuid(uuid: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><dict>
<key>UUID</key><string>{uuid}</string>
<key>Name</key><string>Pipeline Test Profile</string>
</dict></plist>"#
        )
        .into_bytes()
    }

    fn project_bytes(bundle: &Path) -> Vec<u8> {
        fs::read(bundle.join("project.pbxproj")).unwrap()
    }

    #[test]
    fn end_to_end_injects_identifier() {
        let s = setup(&payload_with_uuid("1234-UUID"));
        let report = run(&options(&s)).unwrap();

        assert_eq!(report.targets_matched, 1);
        assert_eq!(report.configurations_updated, 2);

        let tree = ProjectTree::load(&s.bundle).unwrap();
        for config in ["Debug", "Release"] {
            let id = config_id(&tree, "App", config);
            assert_eq!(tree.build_setting(&id, PROVISIONING_SETTING), Some("1234-UUID"));
        }
    }

    #[test]
    fn missing_uuid_aborts_without_touching_project() {
        // Scenario D: decode succeeds, identifier extraction fails, and the
        // on-disk project stays byte-identical.
        let s = setup(
            br#"<?xml version="1.0"?><plist version="1.0"><dict><key>Name</key><string>No UUID</string></dict></plist>"#,
        );
        let before = project_bytes(&s.bundle);

        let err = run(&options(&s)).unwrap_err();
        assert!(matches!(err, Error::IdentifierMissing), "{err}");
        assert_eq!(project_bytes(&s.bundle), before);
    }

    #[test]
    fn tampered_profile_aborts_without_touching_project() {
        let s = setup(&payload_with_uuid("1234-UUID"));
        let before = project_bytes(&s.bundle);

        // Re-sign with an unrelated authority; the cached anchor no longer
        // matches the signer.
        let (other_cert, other_key) = test_authority("Unrelated Root");
        fs::write(
            &s.profile,
            sign_payload(&other_cert, &other_key, &payload_with_uuid("1234-UUID")),
        )
        .unwrap();

        let err = run(&options(&s)).unwrap_err();
        assert!(matches!(err, Error::ProfileVerificationFailed(_)), "{err}");
        assert_eq!(project_bytes(&s.bundle), before);
    }

    #[test]
    fn empty_certificate_file_aborts_without_touching_project() {
        // Scenario C: zero-byte certificate is an explicit fatal error, not
        // a re-fetch.
        let s = setup(&payload_with_uuid("1234-UUID"));
        let before = project_bytes(&s.bundle);
        fs::write(&s.certificate, b"").unwrap();

        let err = run(&options(&s)).unwrap_err();
        assert!(matches!(err, Error::TrustAnchorUnavailable(_)), "{err}");
        assert_eq!(project_bytes(&s.bundle), before);
        assert_eq!(fs::read(&s.certificate).unwrap().len(), 0);
    }

    #[test]
    fn missing_profile_path_is_path_invalid() {
        let s = setup(&payload_with_uuid("1234-UUID"));
        let mut opts = options(&s);
        opts.profile = Some(s.profile.with_extension("missing"));

        let err = run(&opts).unwrap_err();
        assert!(matches!(err, Error::ConfigurationPathInvalid { .. }), "{err}");
    }

    #[test]
    fn no_profile_and_no_provider_is_unspecified() {
        let s = setup(&payload_with_uuid("1234-UUID"));
        let mut opts = options(&s);
        opts.profile = None;

        let err = run(&opts).unwrap_err();
        assert!(matches!(err, Error::ProfileUnspecified(_)), "{err}");
    }

    #[test]
    fn provider_supplies_default_profile_path() {
        let s = setup(&payload_with_uuid("PROVIDED-UUID"));
        let provided = s.profile.clone();
        let mut opts = options(&s);
        opts.profile = None;
        opts.default_profile = Some(Box::new(move || Some(provided.clone())));

        let report = run(&opts).unwrap();
        assert_eq!(report.configurations_updated, 2);

        let tree = ProjectTree::load(&s.bundle).unwrap();
        let id = config_id(&tree, "App", "Debug");
        assert_eq!(tree.build_setting(&id, PROVISIONING_SETTING), Some("PROVIDED-UUID"));
    }

    #[test]
    fn invalid_filter_fails_before_anchor_is_read() {
        let s = setup(&payload_with_uuid("1234-UUID"));
        // Remove the anchor: if filters were parsed later, this run would
        // fail on the certificate instead of the pattern.
        fs::remove_file(&s.certificate).unwrap();
        let mut opts = options(&s);
        opts.certificate = Some(s.certificate.clone());
        opts.target_filter = Some("(unclosed".to_string());

        let err = run(&opts).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)), "{err}");
    }
}
