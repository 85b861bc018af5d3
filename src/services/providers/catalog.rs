/// Spotify-backed catalog provider
///
/// Candidate pool = the listener's saved tracks. The bearer token is an
/// externally-managed credential handed in at construction; this client does
/// not refresh it.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{AudioFeatures, TrackCandidate},
    services::providers::{ensure_success, with_retries, Catalog},
};

pub struct SpotifyCatalog {
    http_client: HttpClient,
    api_url: String,
    api_token: String,
}

impl SpotifyCatalog {
    pub fn new(api_url: String, api_token: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_url,
            api_token,
        })
    }
}

#[async_trait::async_trait]
impl Catalog for SpotifyCatalog {
    async fn list_candidates(&self, limit: usize) -> AppResult<Vec<TrackCandidate>> {
        let url = format!("{}/me/tracks", self.api_url);
        let url = url.as_str();
        let client = &self.http_client;
        let token = self.api_token.as_str();

        let page: SavedTracksPage =
            with_retries("catalog track listing", move || async move {
                let response = client
                    .get(url)
                    .bearer_auth(token)
                    .query(&[("limit", limit)])
                    .send()
                    .await?;

                let response = ensure_success(response, "Catalog API").await?;
                Ok(response.json().await?)
            })
            .await?;

        let candidates: Vec<TrackCandidate> = page
            .items
            .into_iter()
            .filter_map(|item| item.track)
            .map(TrackCandidate::from)
            .collect();

        tracing::info!(
            requested = limit,
            returned = candidates.len(),
            "Candidate pool listed"
        );

        Ok(candidates)
    }

    async fn audio_features(&self, track_id: &str) -> AppResult<AudioFeatures> {
        let url = format!("{}/audio-features/{}", self.api_url, track_id);
        let url = url.as_str();
        let client = &self.http_client;
        let token = self.api_token.as_str();

        let features: AudioFeatures = with_retries("audio feature fetch", move || async move {
            let response = client.get(url).bearer_auth(token).send().await?;
            let response = ensure_success(response, "Catalog API").await?;
            Ok(response.json().await?)
        })
        .await?;

        tracing::debug!(
            track_id = %track_id,
            energy = features.energy,
            tempo = features.tempo,
            "Audio features fetched"
        );

        Ok(features)
    }

    async fn enqueue(&self, track_id: &str) -> AppResult<()> {
        // Sent once: a retried append could enqueue the track twice
        let url = format!("{}/me/player/queue", self.api_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_token)
            .query(&[("uri", format!("spotify:track:{}", track_id))])
            .send()
            .await?;

        ensure_success(response, "Catalog API").await?;

        tracing::info!(track_id = %track_id, "Track appended to playback queue");

        Ok(())
    }
}

/// Saved-tracks envelope from GET /me/tracks
#[derive(Debug, Deserialize)]
struct SavedTracksPage {
    #[serde(default)]
    items: Vec<SavedTrackItem>,
}

#[derive(Debug, Deserialize)]
struct SavedTrackItem {
    /// Null for tracks no longer in the catalog
    #[serde(default)]
    track: Option<ApiTrack>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiTrack {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    #[serde(default)]
    explicit: bool,
    #[serde(default)]
    album: Option<ApiAlbum>,
    #[serde(default)]
    popularity: u8,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiAlbum {
    #[serde(default)]
    release_date: Option<String>,
}

impl From<ApiTrack> for TrackCandidate {
    fn from(track: ApiTrack) -> Self {
        // Release dates come in "YYYY", "YYYY-MM" or "YYYY-MM-DD" precision;
        // the year prefix is enough
        let release_year = track
            .album
            .and_then(|album| album.release_date)
            .and_then(|date| date.get(..4).and_then(|year| year.parse().ok()));

        let primary_artist = track
            .artists
            .into_iter()
            .next()
            .map(|artist| artist.name)
            .unwrap_or_default();

        Self {
            id: track.id,
            name: track.name,
            primary_artist,
            explicit: track.explicit,
            release_year,
            popularity: track.popularity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_track_to_candidate() {
        let json = r#"{
            "id": "3n3Ppam7vgaVa1iaRUc9Lp",
            "name": "Mr. Brightside",
            "artists": [{ "name": "The Killers" }, { "name": "Someone Else" }],
            "explicit": false,
            "album": { "release_date": "2004-06-15" },
            "popularity": 77
        }"#;

        let api_track: ApiTrack = serde_json::from_str(json).unwrap();
        let candidate = TrackCandidate::from(api_track);

        assert_eq!(candidate.id, "3n3Ppam7vgaVa1iaRUc9Lp");
        assert_eq!(candidate.primary_artist, "The Killers");
        assert_eq!(candidate.release_year, Some(2004));
        assert_eq!(candidate.popularity, 77);
        assert!(!candidate.explicit);
    }

    #[test]
    fn test_year_only_release_date() {
        let json = r#"{
            "id": "t1",
            "name": "Old Song",
            "artists": [{ "name": "Artist" }],
            "album": { "release_date": "1973" }
        }"#;

        let candidate = TrackCandidate::from(serde_json::from_str::<ApiTrack>(json).unwrap());
        assert_eq!(candidate.release_year, Some(1973));
    }

    #[test]
    fn test_missing_album_yields_no_release_year() {
        let json = r#"{ "id": "t1", "name": "Song", "artists": [{ "name": "A" }] }"#;

        let candidate = TrackCandidate::from(serde_json::from_str::<ApiTrack>(json).unwrap());
        assert_eq!(candidate.release_year, None);
    }

    #[test]
    fn test_unparseable_release_date_yields_no_release_year() {
        let json = r#"{
            "id": "t1",
            "name": "Song",
            "artists": [{ "name": "A" }],
            "album": { "release_date": "n/a" }
        }"#;

        let candidate = TrackCandidate::from(serde_json::from_str::<ApiTrack>(json).unwrap());
        assert_eq!(candidate.release_year, None);
    }

    #[test]
    fn test_saved_tracks_page_drops_null_tracks() {
        let json = r#"{
            "items": [
                { "track": { "id": "t1", "name": "Kept", "artists": [{ "name": "A" }] } },
                { "track": null },
                {}
            ]
        }"#;

        let page: SavedTracksPage = serde_json::from_str(json).unwrap();
        let candidates: Vec<TrackCandidate> = page
            .items
            .into_iter()
            .filter_map(|item| item.track)
            .map(TrackCandidate::from)
            .collect();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Kept");
    }
}
