//! Multipart form payloads for uploads.

use std::io;
use std::path::Path;

use uuid::Uuid;

/// One field of a `FormData` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Ordered collection of text fields and files, encoded as
/// `multipart/form-data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: value.into().into_bytes(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            data: data.into(),
        });
        self
    }

    /// Read `path` into a file part named after its final component.
    pub fn file_from_path(self, name: impl Into<String>, path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "blob".to_string());
        Ok(self.file(name, file_name, "application/octet-stream", data))
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Encode with a fresh random boundary. Returns `(content_type, body)`.
    pub fn encode(&self) -> (String, Vec<u8>) {
        let boundary = format!("----FetchFormBoundary{}", Uuid::new_v4().simple());
        let body = self.encode_with_boundary(&boundary);
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    pub fn encode_with_boundary(&self, boundary: &str) -> Vec<u8> {
        let mut body = Vec::new();
        for part in &self.parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", escape(&part.name));
            if let Some(file_name) = &part.file_name {
                disposition.push_str(&format!("; filename=\"{}\"", escape(file_name)));
            }
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"\r\n");
            if let Some(content_type) = &part.content_type {
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(&part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        body
    }
}

fn escape(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_text_and_file_parts() {
        let form = FormData::new()
            .text("title", "report")
            .file("file", "a.txt", "text/plain", b"hello".to_vec());
        let body = String::from_utf8(form.encode_with_boundary("XYZ")).unwrap();
        let expected = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\
            \r\n\
            report\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
            Content-Type: text/plain\r\n\
            \r\n\
            hello\r\n\
            --XYZ--\r\n";
        assert_eq!(body, expected);
    }

    #[test]
    fn quotes_and_newlines_in_names_are_escaped() {
        let form = FormData::new().text("a\"b\r\nc", "v");
        let body = String::from_utf8(form.encode_with_boundary("B")).unwrap();
        assert!(body.contains("name=\"a%22b%0D%0Ac\""));
    }

    #[test]
    fn encode_uses_matching_boundary() {
        let (content_type, body) = FormData::new().text("k", "v").encode();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn file_from_path_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, b"# notes").unwrap();
        let form = FormData::new().file_from_path("upload", &path).unwrap();
        let part = &form.parts()[0];
        assert_eq!(part.file_name.as_deref(), Some("notes.md"));
        assert_eq!(part.data, b"# notes");
    }
}
