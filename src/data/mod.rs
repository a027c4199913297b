/// Data layer: core types and text loading.
///
/// Architecture:
/// ```text
///  spectrum.txt        picks.txt
///        │                 │
///        ▼                 ▼
///   ┌────────────────────────────┐
///   │  loader                    │  parse rows → SpectrumGrid / Vec<PickedPoint>
///   └────────────────────────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SpectrumGrid │  S[v][f] + frequency / velocity axes
///   └──────────────┘
/// ```
pub mod loader;
pub mod model;
