// cli.rs — Command-line interface definitions (clap derive)
//
// One flat command: xcprovision verifies a signed provisioning profile and
// writes its UUID into the matching build configurations of an Xcode
// project. `--build-configuration-filter` is a deprecated, hidden alias of
// `--target-filter` kept for backward compatibility; it is not extended to
// also feed the configuration filter despite its name.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xcprovision")]
#[command(about = "Inject a verified provisioning profile UUID into Xcode build settings")]
#[command(version)]
pub struct Cli {
    /// Path to the .xcodeproj bundle (default: the only bundle in the
    /// working directory)
    #[arg(long)]
    pub xcodeproj: Option<PathBuf>,

    /// Path to the signed .mobileprovision file (default: the path in
    /// $PROVISIONING_PROFILE_PATH, if set)
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Regex matched against a target's product name or product type;
    /// unmatched targets are skipped whole
    #[arg(long, alias = "build-configuration-filter")]
    pub target_filter: Option<String>,

    /// Regex matched against build configuration names within matched
    /// targets
    #[arg(long)]
    pub build_configuration: Option<String>,

    /// Path to the root certificate used as the trust anchor (default:
    /// AppleIncRootCertificate.cer in the temp directory, fetched once if
    /// absent)
    #[arg(long)]
    pub certificate: Option<PathBuf>,
}
