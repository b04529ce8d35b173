//! Reusable stages for assembling a publish
//!
//! 1. StaticCollector - Collect a value known up front (or edited in a form)
//! 2. RequiredKeysCheck - Fail when inputs are missing or empty
//! 3. RepeatedNamesCheck - Flag hierarchy paths sharing a short name
//! 4. WhitespaceCheck - Flag padded strings; fixable
//! 5. ManifestExtract - Gather inputs into one manifest object
//! 6. RecordPush - Append the manifest to a version history

pub mod collect;
pub mod manifest;
pub mod push;
pub mod repeated;
pub mod required;
pub mod whitespace;

// Re-export stages
pub use collect::StaticCollector;
pub use manifest::ManifestExtract;
pub use push::RecordPush;
pub use repeated::RepeatedNamesCheck;
pub use required::RequiredKeysCheck;
pub use whitespace::WhitespaceCheck;
