/// Data layer: catalogs, proximity queries, export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (untyped cells)
///   └──────────┘
///        │  validate once: SchemaError / MalformedRowError
///        ▼
///   ┌────────────────┐   ┌────────────────┐
///   │ ResidueCatalog │   │ VariantCatalog │
///   └────────────────┘   └────────────────┘
///        │                     │
///        ▼                     │
///   ┌───────────┐              │
///   │ proximity │ → Vec<Neighbor>
///   └───────────┘              │
///        └──────┬──────────────┘
///               ▼
///   ┌──────────────────┐
///   │ MutationExplorer │  → export (CSV text)
///   └──────────────────┘
/// ```

pub mod error;
pub mod explorer;
pub mod export;
pub mod loader;
pub mod model;
pub mod proximity;
pub mod residue;
pub mod variant;
