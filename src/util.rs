use anyhow::{Context, Result};
use sha2::Digest;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Format a sweep value the way it appears in case ids and the summary.
///
/// `f64` display is the shortest round-trip form, so `10.0` prints as `10`
/// and distinct finite values never collide.
pub fn format_value(value: f64) -> String {
    format!("{value}")
}

pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Current epoch time in milliseconds for marker and lock timestamps.
pub fn now_epoch_ms() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("compute timestamp")?
        .as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_value_drops_trailing_zero_fraction() {
        assert_eq!(format_value(10.0), "10");
        assert_eq!(format_value(0.01), "0.01");
        assert_eq!(format_value(6.5), "6.5");
        assert_eq!(format_value(-3.0), "-3");
    }

    #[test]
    fn display_path_strips_base_when_possible() {
        let base = PathBuf::from("/sweep");
        let inside = base.join("case/case.in");
        assert_eq!(display_path(&inside, Some(&base)), "case/case.in");
        assert_eq!(display_path(Path::new("/other/x"), Some(&base)), "/other/x");
        assert_eq!(display_path(&inside, None), "/sweep/case/case.in");
    }

    #[test]
    fn sha256_hex_matches_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
