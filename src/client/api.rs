//! Lyrics API client implementation.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::models::*;

/// API client errors.
#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Client for the song search, lyrics, summary and rating API.
#[derive(Debug, Clone)]
pub struct LyricsApiClient {
    /// HTTP client
    client: Client,

    /// Base server URL, without a trailing slash
    base_url: String,
}

impl LyricsApiClient {
    /// Create a new API client.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lyricscope/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL for an endpoint with percent-encoded query parameters.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/{}", self.base_url, endpoint);

        if !params.is_empty() {
            let query_parts: Vec<String> = params
                .iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
                .collect();
            url.push('?');
            url.push_str(&query_parts.join("&"));
        }

        url
    }

    /// Make a GET request to an endpoint.
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiClientError> {
        let url = self.build_url(endpoint, params);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        Self::parse(response).await
    }

    /// Make a POST request with a JSON body to an endpoint.
    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &SongRequest<'_>,
    ) -> Result<T, ApiClientError> {
        let url = self.build_url(endpoint, &[]);
        tracing::debug!("POST {} {:?}", url, body);

        let response = self.client.post(&url).json(body).send().await?;
        Self::parse(response).await
    }

    /// Check the status and decode the body of a response.
    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiClientError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or_else(|_| text.chars().take(200).collect());
            return Err(ApiClientError::Status { status, message });
        }

        serde_json::from_str(&text).map_err(|e| {
            ApiClientError::InvalidResponse(format!(
                "Failed to parse response: {}. Body: {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// Search for songs matching a free-text query.
    pub async fn search(&self, query: &str) -> Result<Vec<Song>, ApiClientError> {
        self.get("search", &[("q", query)]).await
    }

    /// Get the lyrics for a song.
    pub async fn lyrics(&self, artist: &str, song: &str) -> Result<String, ApiClientError> {
        let response: LyricsResponse = self
            .get("lyrics", &[("artist", artist), ("song", song)])
            .await?;
        Ok(response.lyrics)
    }

    /// Get an AI-generated summary of a song's lyrics.
    pub async fn song_summary(&self, artist: &str, song: &str) -> Result<String, ApiClientError> {
        let response: SummaryResponse = self
            .post("song-summary", &SongRequest { artist, song })
            .await?;
        Ok(response.summary)
    }

    /// Get an AI-generated content rating of a song's lyrics.
    pub async fn song_rating(&self, artist: &str, song: &str) -> Result<String, ApiClientError> {
        let response: RatingResponse = self
            .post("song-rating", &SongRequest { artist, song })
            .await?;
        Ok(response.rating)
    }

    /// Fetch raw bytes from an absolute URL (used for thumbnails).
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiClientError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiClientError::Status {
                status,
                message: String::from("thumbnail request failed"),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LyricsApiClient {
        LyricsApiClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_url_encodes_spaces_as_percent20() {
        let client =
            LyricsApiClient::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        let url = client.build_url(
            "lyrics",
            &[("artist", "Queen"), ("song", "Bohemian Rhapsody")],
        );
        assert_eq!(
            url,
            "http://localhost:5000/lyrics?artist=Queen&song=Bohemian%20Rhapsody"
        );
    }

    #[test]
    fn test_build_url_without_params() {
        let client = LyricsApiClient::new("http://localhost:5000", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.build_url("song-summary", &[]),
            "http://localhost:5000/song-summary"
        );
    }

    #[tokio::test]
    async fn test_search_returns_songs_in_backend_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Bohemian"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 2, "title": "Zebra", "artist": "B", "thumbnail": null},
                {"id": 1, "title": "Alpha", "artist": "A", "thumbnail": "url"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let songs = client_for(&server).search("Bohemian").await.unwrap();
        let ids: Vec<i64> = songs.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_lyrics_request_uses_percent_encoded_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lyrics"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"lyrics": "Is this the real life..."})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let lyrics = client_for(&server)
            .lyrics("Queen", "Bohemian Rhapsody")
            .await
            .unwrap();
        assert_eq!(lyrics, "Is this the real life...");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].url.query(),
            Some("artist=Queen&song=Bohemian%20Rhapsody")
        );
    }

    #[tokio::test]
    async fn test_lyrics_not_found_surfaces_backend_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lyrics"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "Lyrics not found"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .lyrics("Nobody", "Nothing")
            .await
            .unwrap_err();
        match err {
            ApiClientError::Status { status, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "Lyrics not found");
            }
            other => panic!("expected Status error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_summary_and_rating_post_same_payload() {
        let server = MockServer::start().await;
        let payload = json!({"artist": "Queen", "song": "Bohemian Rhapsody"});

        Mock::given(method("POST"))
            .and(path("/song-summary"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "A tale"})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/song-rating"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rating": "T for Teen"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let summary = client
            .song_summary("Queen", "Bohemian Rhapsody")
            .await
            .unwrap();
        let rating = client
            .song_rating("Queen", "Bohemian Rhapsody")
            .await
            .unwrap();

        assert_eq!(summary, "A tale");
        assert_eq!(rating, "T for Teen");
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("x").await.unwrap_err();
        assert!(matches!(err, ApiClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/thumb.png"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = format!("{}/thumb.png", server.uri());
        assert!(client_for(&server).fetch_bytes(&url).await.is_err());
    }
}
