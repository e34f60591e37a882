use crate::ResolveError;
use std::io::Read;
use tracing::debug;
use whelk_schema::PinnedSource;

/// Fetch a pinned source and verify its blake3 checksum.
///
/// http(s) URLs go over the network; anything else is treated as a local
/// path. A checksum mismatch aborts with expected vs. actual; the pinned
/// value must be updated by hand, there is no automatic recovery.
pub fn fetch_verified(source: &PinnedSource) -> Result<Vec<u8>, ResolveError> {
    let bytes = fetch(source)?;
    verify(source, &bytes)?;
    Ok(bytes)
}

fn fetch(source: &PinnedSource) -> Result<Vec<u8>, ResolveError> {
    if source.url.starts_with("http://") || source.url.starts_with("https://") {
        debug!("fetching {}", source.url);
        let resp = ureq::get(&source.url)
            .call()
            .map_err(|e| ResolveError::Fetch {
                url: source.url.clone(),
                reason: e.to_string(),
            })?;
        let mut reader = resp.into_body().into_reader();
        let mut body = Vec::new();
        reader.read_to_end(&mut body).map_err(|e| ResolveError::Fetch {
            url: source.url.clone(),
            reason: e.to_string(),
        })?;
        Ok(body)
    } else {
        debug!("reading local source {}", source.url);
        Ok(std::fs::read(&source.url)?)
    }
}

fn verify(source: &PinnedSource, bytes: &[u8]) -> Result<(), ResolveError> {
    let actual = blake3::hash(bytes).to_hex().to_string();
    let expected = source.checksum.to_lowercase();
    if actual != expected {
        return Err(ResolveError::ChecksumMismatch {
            url: source.url.clone(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinned(path: &std::path::Path, checksum: String) -> PinnedSource {
        PinnedSource {
            url: path.to_string_lossy().into_owned(),
            checksum,
        }
    }

    #[test]
    fn local_source_with_matching_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pkg.tar.gz");
        std::fs::write(&path, b"artifact bytes").unwrap();

        let checksum = blake3::hash(b"artifact bytes").to_hex().to_string();
        let bytes = fetch_verified(&pinned(&path, checksum)).unwrap();
        assert_eq!(bytes, b"artifact bytes");
    }

    #[test]
    fn checksum_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pkg.tar.gz");
        std::fs::write(&path, b"artifact bytes").unwrap();

        let checksum = blake3::hash(b"artifact bytes")
            .to_hex()
            .to_string()
            .to_uppercase();
        assert!(fetch_verified(&pinned(&path, checksum)).is_ok());
    }

    #[test]
    fn mismatch_reports_expected_and_actual() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pkg.tar.gz");
        std::fs::write(&path, b"tampered bytes").unwrap();

        let expected = "c".repeat(64);
        let err = fetch_verified(&pinned(&path, expected.clone())).unwrap_err();
        match err {
            ResolveError::ChecksumMismatch {
                expected: e,
                actual,
                ..
            } => {
                assert_eq!(e, expected);
                assert_eq!(actual, blake3::hash(b"tampered bytes").to_hex().to_string());
            }
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_local_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let source = pinned(&dir.path().join("absent"), "a".repeat(64));
        assert!(fetch_verified(&source).is_err());
    }
}
