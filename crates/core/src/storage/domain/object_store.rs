use std::path::Path;

use crate::BoxError;

/// Domain interface for the object storage service holding audio and transcripts.
pub trait ObjectStore: Send {
    fn bucket_exists(&self, bucket: &str) -> Result<bool, BoxError>;

    fn object_exists(&self, bucket: &str, object: &str) -> Result<bool, BoxError>;

    /// Download an object's content into an existing local file, replacing its contents.
    fn download_to_file(&self, bucket: &str, object: &str, dest: &Path) -> Result<(), BoxError>;

    /// Create or overwrite `object` in `bucket` with `content`.
    fn upload(&self, bucket: &str, object: &str, content: &str) -> Result<(), BoxError>;
}
