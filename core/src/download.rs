//! Downloaded files and where they end up.
//!
//! # Design
//! `FetchClient::parse_download` yields a `Download` (name, content type,
//! bytes). Handing it to the user is the job of a `SaveTarget`;
//! `DirectoryTarget` writes into a directory through a temporary file that is
//! renamed into place, so a partially written file is never visible.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use percent_encoding::percent_decode_str;

/// A fully buffered download ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Destination for downloaded files.
pub trait SaveTarget {
    /// Persist `download` and return where it was written.
    fn save(&self, download: &Download) -> io::Result<PathBuf>;
}

/// Saves downloads into a fixed directory.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveTarget for DirectoryTarget {
    fn save(&self, download: &Download) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let name = sanitize_file_name(&download.file_name).unwrap_or_else(timestamp_name);
        let path = self.dir.join(name);

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&download.bytes)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        tracing::debug!(path = %path.display(), size = download.bytes.len(), "saved download");
        Ok(path)
    }
}

/// Extract the suggested file name from a `Content-Disposition` value.
///
/// `filename*=` (RFC 5987) wins over `filename=`. Either form is
/// percent-decoded.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    for param in split_params(value) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // charset'language'encoded
                let raw = unquote(raw.trim());
                let encoded = raw.splitn(3, '\'').nth(2).unwrap_or(raw.as_str());
                let decoded = decode(encoded);
                if !decoded.is_empty() {
                    return Some(decoded);
                }
            }
            "filename" => {
                let decoded = decode(&unquote(raw.trim()));
                if !decoded.is_empty() {
                    plain.get_or_insert(decoded);
                }
            }
            _ => {}
        }
    }
    plain
}

/// Split a header value on `;`, ignoring separators inside quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(value[start..].trim());
    params
}

/// Strip surrounding quotes and resolve `\x` escapes of a quoted string.
fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').map(|r| r.strip_suffix('"').unwrap_or(r)) else {
        return raw.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            other => out.push(other),
        }
    }
    out
}

/// Reduce `name` to a safe single path component.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }
    Some(cleaned.to_string())
}

/// Milliseconds since the Unix epoch, used when no file name is offered.
pub fn timestamp_name() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string()
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_filename_is_unquoted() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"report.csv\"").as_deref(),
            Some("report.csv")
        );
        assert_eq!(
            filename_from_disposition("attachment;filename=data.bin").as_deref(),
            Some("data.bin")
        );
    }

    #[test]
    fn semicolon_inside_quoted_filename_is_kept() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"Q1; summary.csv\"").as_deref(),
            Some("Q1; summary.csv")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=\"a;b.txt\"; size=3").as_deref(),
            Some("a;b.txt")
        );
    }

    #[test]
    fn escaped_quotes_in_filename_are_resolved() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="say \"hi\"; now.txt""#).as_deref(),
            Some("say \"hi\"; now.txt")
        );
    }

    #[test]
    fn percent_encoded_filename_is_decoded() {
        assert_eq!(
            filename_from_disposition("attachment; filename=%E6%8A%A5%E8%A1%A8.xlsx").as_deref(),
            Some("报表.xlsx")
        );
    }

    #[test]
    fn extended_filename_takes_precedence() {
        let value = "attachment; filename=\"fallback.txt\"; filename*=UTF-8''%E6%96%87%E4%BB%B6.txt";
        assert_eq!(filename_from_disposition(value).as_deref(), Some("文件.txt"));
    }

    #[test]
    fn missing_filename_yields_none() {
        assert!(filename_from_disposition("inline").is_none());
        assert!(filename_from_disposition("attachment; filename=\"\"").is_none());
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_file_name("C:\\tmp\\a.txt").as_deref(), Some("a.txt"));
        assert!(sanitize_file_name("..").is_none());
        assert!(sanitize_file_name("dir/").is_none());
    }

    #[test]
    fn timestamp_name_is_numeric() {
        let name = timestamp_name();
        assert!(!name.is_empty());
        assert!(name.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn directory_target_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = DirectoryTarget::new(dir.path().join("out"));
        let download = Download {
            file_name: "a.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: b"abc".to_vec(),
        };
        let path = target.save(&download).unwrap();
        assert_eq!(path, dir.path().join("out").join("a.txt"));
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn directory_target_falls_back_to_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let target = DirectoryTarget::new(dir.path());
        let download = Download {
            file_name: "../".to_string(),
            content_type: "application/octet-stream".to_string(),
            bytes: vec![1, 2, 3],
        };
        let path = target.save(&download).unwrap();
        assert!(path.starts_with(dir.path()));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.chars().all(|c| c.is_ascii_digit()));
    }
}
