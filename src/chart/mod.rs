/// Chart geometry: scales, the declarative scene, and SVG export.
///
/// ```text
///   AppState ──► Scene::build ──► Scene ──┬──► ui::chart  (egui painter)
///                  │                      └──► export::save  (file)
///                  ▼
///         PointScale / RankScale
/// ```

pub mod scale;
pub mod scene;
pub mod export;
