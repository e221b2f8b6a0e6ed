mod upload_image;

pub use upload_image::{UploadCommand, UploadError, UploadImageUseCase, UploadReceipt};
