/// Data layer: readers, merging and null handling.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .rowOut
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Cell rows → typed Table
///   └──────────┘
///        │  one Table per file
///        ▼
///   ┌──────────┐
///   │  merge    │  outer union by column name
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  nulls    │  drop / zero / keep
///   └──────────┘
/// ```
pub mod loader;
pub mod merge;
pub mod model;
pub mod nulls;

pub use loader::{load_file, FileFormat};
pub use merge::concat_tables;
pub use model::Table;
pub use nulls::{apply_null_policy, NullPolicy};
