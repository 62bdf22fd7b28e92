use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

pub const DEFAULT_FEATURED_URL: &str = "https://api.twitch.tv/kraken/streams/featured?limit=1";

pub type FeaturedResult<T> = core::result::Result<T, FeaturedErr>;

#[derive(Debug, Error)]
pub enum FeaturedErr {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("featured lookup returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed featured response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected exactly one featured stream, found {0}")]
    NotExactlyOne(usize),

    #[error("featured stream has an empty channel name")]
    EmptyChannel,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedResponse {
    #[serde(default)]
    pub featured: Vec<FeaturedEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedEntry {
    pub stream: FeaturedStream,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedStream {
    pub channel: FeaturedChannel,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedChannel {
    pub name: String,
}

/// Looks up the channel to join from the featured-streams endpoint
///
/// Anything other than exactly one featured entry is an error; this is a single startup call
/// and is never retried.
#[instrument(skip(client_id))]
pub async fn first_featured_channel(url: &str, client_id: Option<&str>) -> FeaturedResult<String> {
    let mut request = reqwest::Client::new()
        .get(url)
        .header(reqwest::header::ACCEPT, "application/vnd.twitchtv.v5+json");

    if let Some(id) = client_id {
        request = request.header("Client-ID", reqwest::header::HeaderValue::from_str(id)?);
    }

    let res = request.send().await?;
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        tracing::error!(code = %status, "non-2xx featured response");
        return Err(FeaturedErr::Status { status, body });
    }

    parse_featured(&body)
}

/// Extracts the single featured channel name from a response body
pub fn parse_featured(body: &str) -> FeaturedResult<String> {
    let response: FeaturedResponse = serde_json::from_str(body)?;

    let [entry] = <[FeaturedEntry; 1]>::try_from(response.featured)
        .map_err(|entries| FeaturedErr::NotExactlyOne(entries.len()))?;

    let name = entry.stream.channel.name.trim().to_lowercase();
    if name.is_empty() {
        return Err(FeaturedErr::EmptyChannel);
    }

    tracing::debug!(channel = %name, "featured channel resolved");
    Ok(name)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn featured_body(names: &[&str]) -> serde_json::Value {
        let featured: Vec<_> = names
            .iter()
            .map(|name| json!({ "stream": { "channel": { "name": name, "display_name": name } } }))
            .collect();

        json!({ "featured": featured })
    }

    #[test]
    fn test_parse_single_entry() {
        let body = featured_body(&["SomeStreamer"]).to_string();
        assert_eq!(parse_featured(&body).unwrap(), "somestreamer");
    }

    #[test]
    fn test_parse_wrong_counts() {
        let none = featured_body(&[]).to_string();
        assert!(matches!(parse_featured(&none), Err(FeaturedErr::NotExactlyOne(0))));

        let two = featured_body(&["a", "b"]).to_string();
        assert!(matches!(parse_featured(&two), Err(FeaturedErr::NotExactlyOne(2))));

        assert!(matches!(parse_featured("{}"), Err(FeaturedErr::NotExactlyOne(0))));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_featured("<html>"), Err(FeaturedErr::Json(_))));
        assert!(matches!(
            parse_featured(r#"{"featured":[{"stream":{}}]}"#),
            Err(FeaturedErr::Json(_))
        ));

        let blank = featured_body(&["  "]).to_string();
        assert!(matches!(parse_featured(&blank), Err(FeaturedErr::EmptyChannel)));
    }

    #[tokio::test]
    async fn test_lookup_against_mock() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/kraken/streams/featured"))
            .and(header("Client-ID", "test-client"))
            .respond_with(ResponseTemplate::new(200).set_body_json(featured_body(&["plss"])))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/kraken/streams/featured?limit=1", server.uri());
        let channel = first_featured_channel(&url, Some("test-client")).await.unwrap();

        assert_eq!(channel, "plss");
    }

    #[tokio::test]
    async fn test_lookup_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(410).set_body_string("gone"))
            .mount(&server)
            .await;

        let err = first_featured_channel(&server.uri(), None).await.unwrap_err();
        match err {
            FeaturedErr::Status { status, body } => {
                assert_eq!(status.as_u16(), 410);
                assert_eq!(body, "gone");
            }
            other => panic!("expected a status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_ambiguous() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(featured_body(&["a", "b", "c"])))
            .mount(&server)
            .await;

        let err = first_featured_channel(&server.uri(), None).await.unwrap_err();
        assert!(matches!(err, FeaturedErr::NotExactlyOne(3)));
    }
}
