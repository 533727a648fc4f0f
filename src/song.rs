//! Catalog song record shared across the engine.

/// One song served by the catalog service.
///
/// The engine never creates or edits songs; it holds copies handed over by
/// the host (playlist pages, liked-songs view, search results). Identity is
/// the catalog id, which stays stable across queue reordering.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Stable catalog id.
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Track length in seconds.
    pub duration: u32,
    /// Artwork location served by the catalog.
    #[serde(default)]
    pub image_url: String,
    /// Audio stream location served by the catalog.
    #[serde(default)]
    pub audio_url: String,
    /// Catalog creation timestamp, passed through untouched.
    #[serde(default)]
    pub created_at: String,
}
