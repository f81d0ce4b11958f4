/// Data layer: core types, loading, cleaning and conversion.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .ods
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table (typed columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ cleaning  │  drop duplicate rows, mean-fill numeric gaps
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  select(columns) → projected Table
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  chart    │   │  export   │  Table → CSV / XLSX bytes
///   └──────────┘   └──────────┘
/// ```

pub mod chart;
pub mod cleaning;
pub mod export;
pub mod loader;
pub mod model;
