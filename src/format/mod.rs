//! Sector list documents: the bundled seed dataset and the export file.
//!
//! Both use the same shape:
//!
//! ```json
//! { "list": [ { "name": "...", "color": "green", "frequencyInDays": 7,
//!               "frequencyOffset": 0, "geometry": { "type": "Feature", ... } } ] }
//! ```

mod error;
mod seed;
mod sector_list;

pub use error::FormatError;
pub use seed::{SEED_ID_PREFIX, seed_sectors};
pub use sector_list::{EXPORT_FILENAME, ExportFile, SectorEntry, SectorList, export_file};
