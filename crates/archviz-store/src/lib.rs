//! Content-addressed artifact naming and the filesystem artifact store.

mod fs_store;
mod naming;

pub use archviz_types::{ArtifactStore, StorageError};
pub use fs_store::FsArtifactStore;
pub use naming::{artifact_filename, ARTIFACT_EXTENSION, NAME_HEX_LEN};
