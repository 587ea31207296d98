use crate::api::BooksApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    NoUpload,
    FetchingPresignedUrl,
    UploadingFile,
}

/// Edit page for a single book: attaches a cover image.
pub struct EditBook<A: BooksApi> {
    api: A,
    id_token: String,
    book_id: String,
    upload_state: UploadState,
    alert: Option<String>,
}

impl<A: BooksApi> EditBook<A> {
    pub fn new(api: A, id_token: impl Into<String>, book_id: impl Into<String>) -> Self {
        Self {
            api,
            id_token: id_token.into(),
            book_id: book_id.into(),
            upload_state: UploadState::NoUpload,
            alert: None,
        }
    }

    pub fn upload_state(&self) -> UploadState {
        self.upload_state
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Ask for a signed URL, then send `file` to it.
    pub async fn upload(&mut self, file: Vec<u8>) {
        if file.is_empty() {
            self.alert = Some("File should be selected".to_string());
            return;
        }

        self.upload_state = UploadState::FetchingPresignedUrl;
        let result = match self.api.get_upload_url(&self.id_token, &self.book_id).await {
            Ok(upload_url) => {
                self.upload_state = UploadState::UploadingFile;
                self.api.upload_file(&upload_url, file).await
            }
            Err(e) => Err(e),
        };
        self.upload_state = UploadState::NoUpload;

        self.alert = Some(match result {
            Ok(()) => "File was uploaded!".to_string(),
            Err(e) => {
                tracing::warn!(book_id = %self.book_id, "Could not upload a file: {}", e);
                format!("Could not upload a file: {}", e)
            }
        });
    }
}
