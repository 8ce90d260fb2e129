//! Business logic services.

pub mod conversion;
pub mod progress_hub;
pub mod stamps;
pub mod storage;
pub mod upload;

pub use conversion::Converter;
pub use progress_hub::{ProgressHub, ProgressSubscription};
pub use stamps::StampGenerator;
pub use storage::StorageLayout;
pub use upload::{receive_upload, ConvertForm, StoredUpload};
