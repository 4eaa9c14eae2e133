pub mod publisher;
pub mod site_directory;
pub mod slug;
pub mod template;

pub use crate::domain::model::{FileChange, PublishedSite, SiteSubmission};
pub use crate::domain::ports::{ContentEntry, EntryKind, HostingApi, Storage, TreeEntry};
pub use crate::utils::error::Result;
