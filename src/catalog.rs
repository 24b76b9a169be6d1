mod model;
mod scan;

pub use model::{CatalogError, TrackCatalog};
pub use scan::{SUPPORTED_EXTENSIONS, ScanControl};

#[cfg(test)]
mod tests;
