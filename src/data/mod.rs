/// Data layer: core types, loading, and top-N selection.
///
/// Architecture:
/// ```text
///  raw results .csv ──► preprocess ──► bump_data .csv / .json / .parquet
///                                              │
///                                              ▼
///                                        ┌──────────┐
///                                        │  loader   │  parse + coerce → Vec<Observation>
///                                        └──────────┘
///                                              │
///                                              ▼
///                                        ┌──────────┐
///                                        │   rank    │  mean rank → top-N countries
///                                        └──────────┘
///                                              │
///                                              ▼
///                                        ┌────────────┐
///                                        │ BumpDataset │  cached, filtered rows
///                                        └────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod preprocess;
pub mod rank;
