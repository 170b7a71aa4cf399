//! Legacy binary Word (`.doc`) estimation through Word automation

use std::path::Path;

use super::{Capability, Estimator};
use crate::error::EstimateError;
use crate::models::DocumentType;

/// Asks Word for the document's page statistic.
///
/// Only usable where Word automation exists; the registry swaps this for a
/// zero-count stub everywhere else.
pub struct LegacyWordEstimator;

impl Estimator for LegacyWordEstimator {
    fn document_type(&self) -> DocumentType {
        DocumentType::Doc
    }

    fn requires(&self) -> Option<Capability> {
        Some(Capability::WordAutomation)
    }

    fn estimate(&self, path: &Path) -> Result<u64, EstimateError> {
        automation::page_count(path)
    }
}

#[cfg(windows)]
mod automation {
    use std::path::Path;
    use std::process::Command;

    use crate::error::EstimateError;

    /// wdStatisticPages
    const WD_STATISTIC_PAGES: u32 = 2;

    const ENV_DOC_PATH: &str = "PAGE_TALLY_DOC_PATH";

    pub(super) fn page_count(path: &Path) -> Result<u64, EstimateError> {
        let script = format!(
            "$ErrorActionPreference = 'Stop'; \
             $word = New-Object -ComObject Word.Application; \
             $word.Visible = $false; \
             try {{ \
                 $doc = $word.Documents.Open($env:{env}, $false, $true); \
                 $doc.ComputeStatistics({stat}); \
                 $doc.Close($false) | Out-Null \
             }} finally {{ $word.Quit() | Out-Null }}",
            env = ENV_DOC_PATH,
            stat = WD_STATISTIC_PAGES,
        );

        let output = Command::new("powershell")
            .args(["-NoProfile", "-NonInteractive", "-Command", &script])
            .env(ENV_DOC_PATH, path)
            .output()?;

        if !output.status.success() {
            return Err(EstimateError::Automation(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .rev()
            .find_map(|line| line.trim().parse::<u64>().ok())
            .ok_or_else(|| EstimateError::Automation(format!("unexpected output: {}", stdout.trim())))
    }
}

#[cfg(not(windows))]
mod automation {
    use std::path::Path;

    use super::Capability;
    use crate::error::EstimateError;

    pub(super) fn page_count(_path: &Path) -> Result<u64, EstimateError> {
        Err(EstimateError::CapabilityMissing(
            Capability::WordAutomation.describe(),
        ))
    }
}
