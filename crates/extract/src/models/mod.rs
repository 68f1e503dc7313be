mod id;
mod metadata;

pub use self::id::WorkId;
pub use self::metadata::WorkMetadata;
