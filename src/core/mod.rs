pub mod package;

pub use package::{ManifestRecord, PackageId};
