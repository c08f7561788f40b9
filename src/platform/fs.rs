// loginsight - platform/fs.rs
//
// Log file reading. Files are decoded lossily so that a stray invalid byte
// in a log does not make the whole file unreadable.

use crate::util::constants;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Read a whole log file as text.
///
/// Files at or above `LARGE_FILE_THRESHOLD` bytes are memory-mapped; smaller
/// files are read into memory, retrying transient I/O errors with the delays
/// in `READ_RETRY_DELAYS_MS`. Invalid UTF-8 is replaced, never rejected.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let size = std::fs::metadata(path)?.len();

    let content = if size >= constants::LARGE_FILE_THRESHOLD {
        tracing::debug!(file = %path.display(), size, "Memory-mapping large log file");
        read_mapped(path)?
    } else {
        read_with_retry(path)?
    };

    tracing::debug!(file = %path.display(), bytes = content.len(), "Read log file");
    Ok(content)
}

fn read_mapped(path: &Path) -> io::Result<String> {
    let file = std::fs::File::open(path)?;
    // SAFETY: the map is read-only and dropped before returning. A log being
    // truncated by another process while mapped is an accepted risk.
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    Ok(String::from_utf8_lossy(&mmap).into_owned())
}

fn read_with_retry(path: &Path) -> io::Result<String> {
    let mut attempt = 0usize;
    loop {
        match std::fs::read(path) {
            Ok(bytes) => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if is_transient_error(&e) && attempt < constants::READ_RETRY_DELAYS_MS.len() => {
                let delay = constants::READ_RETRY_DELAYS_MS[attempt];
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    delay_ms = delay,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(delay));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// WouldBlock, Interrupted and TimedOut are worth another attempt.
fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "line one\nline two\n").unwrap();
        assert_eq!(read_file_lossy(&path).unwrap(), "line one\nline two\n");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ok \xff\xfe end\n").unwrap();
        let text = read_file_lossy(file.path()).unwrap();
        assert!(text.starts_with("ok "));
        assert!(text.contains('\u{FFFD}'));
        assert!(text.ends_with(" end\n"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file_lossy(&dir.path().join("absent.log")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_transient_kinds() {
        assert!(is_transient_error(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(!is_transient_error(&io::Error::from(io::ErrorKind::NotFound)));
    }
}
