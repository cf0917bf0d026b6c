use std::future::Future;
use std::path::Path;

use armory_core::{EntityId, Resource};
use serde_json::Value;

use crate::error::ClientError;

/// A photo file ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for(&file_name);
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    /// Reads a photo from disk.
    pub fn read(path: &Path) -> Result<Self, ClientError> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// The REST collaborator the resource managers talk to.
///
/// Payloads and responses are raw JSON; typing happens in `ResourceManager`.
/// All methods take `&self` so one backend can be shared by every screen.
pub trait Backend: Send + Sync {
    /// `GET /<resource>`
    fn list(
        &self,
        resource: Resource,
    ) -> impl Future<Output = Result<Vec<Value>, ClientError>> + Send;

    /// `POST /<resource>`
    fn create(
        &self,
        resource: Resource,
        payload: &Value,
    ) -> impl Future<Output = Result<Value, ClientError>> + Send;

    /// `PUT /<resource>/{id}`
    fn update(
        &self,
        resource: Resource,
        id: EntityId,
        payload: &Value,
    ) -> impl Future<Output = Result<Value, ClientError>> + Send;

    /// `DELETE /<resource>/{id}`
    fn delete(
        &self,
        resource: Resource,
        id: EntityId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// `POST /upload`, returning the stored relative path.
    fn upload(&self, photo: PhotoFile)
    -> impl Future<Output = Result<String, ClientError>> + Send;

    /// Where a stored photo path can be viewed.
    fn photo_url(&self, path: &str) -> String {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_from_extension() {
        assert_eq!(PhotoFile::new("awp.PNG", vec![]).mime_type, "image/png");
        assert_eq!(PhotoFile::new("a.b.jpeg", vec![]).mime_type, "image/jpeg");
        assert_eq!(PhotoFile::new("noext", vec![]).mime_type, "application/octet-stream");
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let err = PhotoFile::read(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
