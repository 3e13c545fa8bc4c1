//! Script file decoding
//!
//! This module turns a filesystem entry into the text blob the executor
//! evaluates server-side:
//! - Existence and regular-file checks (violations are per-file errors)
//! - Transparent gzip decompression, detected by filename suffix
//! - Character decoding, either a configured charset or the UTF-8 default
//! - Line assembly with normalized `\n` terminators

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use flate2::read::GzDecoder;
use tracing::{debug, warn};

use crate::error::{ConfigError, Result, ScriptError};

/// Read-only view over a script file on disk.
#[derive(Debug, Clone)]
pub struct ScriptFile {
    /// File name, used for ordering, logging, and outcome reporting
    pub name: String,

    /// Full path to the file
    pub path: PathBuf,
}

impl ScriptFile {
    /// Create a view over the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    /// Whether the file is gzip-compressed, derived from a case-insensitive
    /// `gz` filename suffix.
    pub fn is_compressed(&self) -> bool {
        self.name.to_lowercase().ends_with("gz")
    }
}

/// Decodes script files into evaluable text.
#[derive(Debug)]
pub struct ScriptReader {
    /// Configured charset, or `None` for the UTF-8 default
    encoding: Option<&'static Encoding>,
}

impl ScriptReader {
    /// Create a reader, validating the configured encoding label up front.
    ///
    /// An unknown charset label is a fatal configuration error; `None`
    /// selects the default (UTF-8 with replacement), with a warning that
    /// relying on a default is not deterministic across environments.
    pub fn new(encoding_label: Option<&str>) -> Result<Self> {
        let encoding = match encoding_label.map(str::trim).filter(|l| !l.is_empty()) {
            Some(label) => Some(
                Encoding::for_label(label.as_bytes())
                    .ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))?,
            ),
            None => None,
        };
        Ok(Self { encoding })
    }

    /// Decode a script file into a single text blob.
    ///
    /// Each line is joined with a leading `\n` separator; per-line
    /// leading/trailing whitespace is preserved, only line terminators are
    /// normalized.
    pub fn read(&self, script: &ScriptFile) -> Result<String> {
        if !is_regular_file(&script.path) {
            return Err(ScriptError::NotAFile(script.name.clone()).into());
        }

        let bytes = self.read_bytes(script)?;
        let decoded = self.decode(&bytes);
        Ok(join_lines(&decoded))
    }

    /// Read the raw bytes, decompressing gzip content as it streams in.
    fn read_bytes(&self, script: &ScriptFile) -> Result<Vec<u8>> {
        let file = fs::File::open(&script.path).map_err(|e| ScriptError::Read {
            name: script.name.clone(),
            message: e.to_string(),
        })?;

        let mut stream: Box<dyn Read> = if script.is_compressed() {
            debug!(script = %script.name, "file is gz compressed, using gzip stream");
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let mut bytes = Vec::new();
        stream
            .read_to_end(&mut bytes)
            .map_err(|e| ScriptError::Read {
                name: script.name.clone(),
                message: e.to_string(),
            })?;

        Ok(bytes)
    }

    /// Decode bytes with the configured charset, or UTF-8 when unset.
    /// Malformed sequences become replacement characters in both paths.
    fn decode(&self, bytes: &[u8]) -> String {
        match self.encoding {
            Some(encoding) => {
                debug!(encoding = encoding.name(), "using configured script encoding");
                let (text, _, _) = encoding.decode(bytes);
                text.into_owned()
            }
            None => {
                warn!("no script encoding configured, using UTF-8 default");
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }
}

/// Join lines into one blob with a leading `\n` per line.
///
/// This matches the historical assembly contract: the blob starts with a
/// newline, per-line whitespace is untouched, and `\r\n` terminators come
/// out as a single `\n`.
fn join_lines(text: &str) -> String {
    let mut blob = String::with_capacity(text.len() + 1);
    for line in text.lines() {
        blob.push('\n');
        blob.push_str(line);
    }
    blob
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BatchError;
    use flate2::{Compression, write::GzEncoder};
    use std::io::Write;

    fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> ScriptFile {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        ScriptFile::new(path)
    }

    #[test]
    fn test_compression_detection_is_case_insensitive() {
        assert!(ScriptFile::new("/tmp/a.js.gz").is_compressed());
        assert!(ScriptFile::new("/tmp/a.js.GZ").is_compressed());
        assert!(!ScriptFile::new("/tmp/a.js").is_compressed());
    }

    #[test]
    fn test_unknown_encoding_label_is_config_error() {
        let err = ScriptReader::new(Some("klingon-8")).unwrap_err();
        assert!(matches!(
            err,
            BatchError::Config(ConfigError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_blank_encoding_label_means_default() {
        let reader = ScriptReader::new(Some("  ")).unwrap();
        assert!(reader.encoding.is_none());
    }

    #[test]
    fn test_read_plain_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_fixture(dir.path(), "a.js", b"db.users.insert({});\nprint('ok');");
        let reader = ScriptReader::new(None).unwrap();
        let blob = reader.read(&script).unwrap();
        assert_eq!(blob, "\ndb.users.insert({});\nprint('ok');");
    }

    #[test]
    fn test_per_line_whitespace_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_fixture(dir.path(), "a.js", b"  indented \n\ttabbed\t");
        let reader = ScriptReader::new(None).unwrap();
        assert_eq!(reader.read(&script).unwrap(), "\n  indented \n\ttabbed\t");
    }

    #[test]
    fn test_crlf_normalized_to_lf() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_fixture(dir.path(), "a.js", b"one\r\ntwo\r\nthree");
        let reader = ScriptReader::new(None).unwrap();
        assert_eq!(reader.read(&script).unwrap(), "\none\ntwo\nthree");
    }

    #[test]
    fn test_gzip_round_trip() {
        let original = "db.counters.update({_id: 'n'}, {$inc: {v: 1}});\nprint('done');";
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(original.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let script = write_fixture(dir.path(), "seed.js.gz", &compressed);
        let reader = ScriptReader::new(None).unwrap();
        let blob = reader.read(&script).unwrap();

        // Recovered modulo the leading-newline join.
        assert_eq!(blob, format!("\n{original}"));
        assert!(blob.contains("db.counters.update"));
    }

    #[test]
    fn test_configured_legacy_encoding() {
        // "café" in windows-1252: the e-acute is a single 0xE9 byte.
        let dir = tempfile::tempdir().unwrap();
        let script = write_fixture(dir.path(), "a.js", b"print('caf\xe9');");
        let reader = ScriptReader::new(Some("windows-1252")).unwrap();
        assert_eq!(reader.read(&script).unwrap(), "\nprint('café');");
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let script = ScriptFile::new(dir.path());
        let reader = ScriptReader::new(None).unwrap();
        let err = reader.read(&script).unwrap_err();
        assert!(matches!(
            err,
            BatchError::Script(ScriptError::NotAFile(_))
        ));
    }

    #[test]
    fn test_missing_file_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let script = ScriptFile::new(dir.path().join("gone.js"));
        let reader = ScriptReader::new(None).unwrap();
        assert!(reader.read(&script).is_err());
    }

    #[test]
    fn test_corrupt_gzip_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_fixture(dir.path(), "bad.js.gz", b"not actually gzip");
        let reader = ScriptReader::new(None).unwrap();
        let err = reader.read(&script).unwrap_err();
        assert!(matches!(
            err,
            BatchError::Script(ScriptError::Read { .. })
        ));
    }
}
