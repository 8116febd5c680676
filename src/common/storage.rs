// src/common/storage.rs

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::common::error::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Onde os anexos (certificados GST) ficam guardados.
/// Os caminhos devolvidos são relativos à raiz do store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save(&self, relative_path: &str, bytes: &[u8]) -> Result<(), AppError>;
    async fn load(&self, relative_path: &str) -> Result<Vec<u8>, AppError>;
}

/// Implementação em disco local.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // Recusa caminhos absolutos e "..": tudo tem que ficar debaixo da raiz.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf, AppError> {
        let rel = Path::new(relative_path);
        let safe = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative_path.is_empty() {
            return Err(AppError::InternalServerError(anyhow::anyhow!(
                "caminho de documento inválido: {relative_path}"
            )));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn save(&self, relative_path: &str, bytes: &[u8]) -> Result<(), AppError> {
        let path = self.resolve(relative_path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::info!("📄 Documento salvo em {}", path.display());
        Ok(())
    }

    async fn load(&self, relative_path: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(relative_path)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound("document")),
            Err(e) => Err(e.into()),
        }
    }
}

/// Caminho relativo do certificado GST de um fornecedor/cliente.
pub fn gst_certificate_path(owner: &str, id: uuid::Uuid) -> String {
    format!("gst/{owner}/{id}.pdf")
}

/// Valida um upload de certificado: precisa ser PDF (content-type e assinatura) e caber no limite.
pub fn validate_pdf_upload(
    content_type: Option<&str>,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<(), AppError> {
    if bytes.len() > max_bytes {
        return Err(AppError::UploadTooLarge { limit: max_bytes });
    }
    let is_pdf_type = content_type
        .map(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    if !is_pdf_type || !bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::InvalidUpload("upload_not_pdf"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saves_and_loads_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path());
        let id = uuid::Uuid::new_v4();
        let path = gst_certificate_path("vendors", id);

        store.save(&path, b"%PDF-1.4 teste").await.unwrap();
        let bytes = store.load(&path).await.unwrap();

        assert_eq!(bytes, b"%PDF-1.4 teste");
        assert!(dir.path().join("gst/vendors").join(format!("{id}.pdf")).exists());
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path());
        let err = store.load("gst/customers/nada.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("document")));
    }

    #[tokio::test]
    async fn refuses_paths_outside_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path());
        assert!(store.save("../fora.pdf", b"%PDF-").await.is_err());
        assert!(store.save("/etc/passwd", b"%PDF-").await.is_err());
    }

    #[test]
    fn accepts_only_pdf() {
        assert!(validate_pdf_upload(Some("application/pdf"), b"%PDF-1.7 ...", 1024).is_ok());
        assert!(matches!(
            validate_pdf_upload(Some("image/png"), b"%PDF-1.7", 1024),
            Err(AppError::InvalidUpload("upload_not_pdf"))
        ));
        assert!(matches!(
            validate_pdf_upload(Some("application/pdf"), b"GIF89a", 1024),
            Err(AppError::InvalidUpload("upload_not_pdf"))
        ));
        assert!(validate_pdf_upload(None, b"%PDF-1.7", 1024).is_err());
    }

    #[test]
    fn rejects_files_over_the_limit() {
        let big = vec![b'a'; 11];
        assert!(matches!(
            validate_pdf_upload(Some("application/pdf"), &big, 10),
            Err(AppError::UploadTooLarge { limit: 10 })
        ));
    }
}
