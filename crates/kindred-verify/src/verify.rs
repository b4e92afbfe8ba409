//! Checks that a built `index.html` is the bundled output and not the
//! development entry page.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::error::VerifyError;

/// Development-only references. Any match fails the build.
const DEV_PATTERNS: [(&str, &str); 2] = [
    (r"/src/main\.tsx", "development entrypoint /src/main.tsx"),
    (r"/src/", "source file references /src/"),
];

const ASSET_PATTERNS: [&str; 2] = [r"/assets/", r#"(?i)<script[^>]*type="module"[^>]*>"#];

pub const NO_ASSETS: &str = "index.html does not appear to reference bundled assets";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Report {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Promote every warning to an error.
    pub fn strict(mut self) -> Self {
        self.errors.append(&mut self.warnings);
        self
    }
}

/// Check the HTML text of a built index page.
pub fn check_html(html: &str) -> Result<Report, VerifyError> {
    let mut report = Report::default();

    for (pattern, name) in DEV_PATTERNS {
        if Regex::new(pattern)?.is_match(html) {
            report.errors.push(format!("index.html contains {name}"));
        }
    }

    let mut has_assets = false;
    for pattern in ASSET_PATTERNS {
        if Regex::new(pattern)?.is_match(html) {
            debug!(pattern, "Found bundled asset reference");
            has_assets = true;
            break;
        }
    }
    if !has_assets {
        report.warnings.push(NO_ASSETS.to_string());
    }

    Ok(report)
}

/// Check `<dist>/index.html`.
pub fn verify_dist(dist: &Path) -> Result<Report, VerifyError> {
    let index = dist.join("index.html");
    if !index.is_file() {
        return Err(VerifyError::MissingIndex(index));
    }
    let html = std::fs::read_to_string(&index).map_err(|source| VerifyError::Read {
        path: index.clone(),
        source,
    })?;
    debug!(path = %index.display(), bytes = html.len(), "Read built index");
    check_html(&html)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUILT: &str = r#"<!doctype html>
<html>
  <head>
    <script type="module" crossorigin src="/assets/index-4f2a.js"></script>
  </head>
  <body><div id="root"></div></body>
</html>"#;

    #[test]
    fn test_built_page_passes() {
        let report = check_html(BUILT).unwrap();
        assert!(report.passed());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_dev_entry_fails() {
        let html = r#"<script type="module" src="/src/main.tsx"></script>"#;
        let report = check_html(html).unwrap();
        assert_eq!(report.errors.len(), 2);
        assert!(!report.passed());
    }

    #[test]
    fn test_module_script_counts_as_assets() {
        let html = r#"<SCRIPT defer TYPE="module">boot()</SCRIPT>"#;
        assert!(check_html(html).unwrap().warnings.is_empty());
    }

    #[test]
    fn test_missing_assets_warns_unless_strict() {
        let report = check_html("<html><body>plain</body></html>").unwrap();
        assert!(report.passed());
        assert_eq!(report.warnings, [NO_ASSETS]);

        let strict = report.strict();
        assert!(!strict.passed());
        assert!(strict.warnings.is_empty());
    }

    #[test]
    fn test_verify_dist_reads_index() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            verify_dist(dir.path()),
            Err(VerifyError::MissingIndex(_))
        ));

        std::fs::write(dir.path().join("index.html"), BUILT).unwrap();
        assert!(verify_dist(dir.path()).unwrap().passed());
    }
}
