use async_trait::async_trait;
use serde::Deserialize;

use super::{Availability, AvailabilityProbe};
use crate::platform::YOUTUBE_WATCH_URL;

const OEMBED_URL: &str = "https://www.youtube.com/oembed";

/// Availability check through YouTube's public oEmbed endpoint
pub struct OEmbedProbe {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    author_name: Option<String>,
}

impl OEmbedProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_endpoint(client, OEMBED_URL)
    }

    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn lookup_url(&self, video_id: &str) -> String {
        let watch_url = format!("{}{}", YOUTUBE_WATCH_URL, video_id);
        format!(
            "{}?url={}&format=json",
            self.endpoint,
            urlencoding::encode(&watch_url)
        )
    }
}

#[async_trait]
impl AvailabilityProbe for OEmbedProbe {
    async fn check(&self, video_id: &str) -> Availability {
        let response = match self.client.get(self.lookup_url(video_id)).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Could not check video availability: {}", e.without_url());
                return Availability::Unknown;
            }
        };

        let status = response.status();
        if status.is_success() {
            let info = response.json::<OEmbedResponse>().await.ok();
            let title = info.as_ref().and_then(|i| i.title.clone());
            tracing::debug!(
                "Video title: {}, author: {}",
                title.as_deref().unwrap_or("N/A"),
                info.as_ref()
                    .and_then(|i| i.author_name.as_deref())
                    .unwrap_or("N/A")
            );
            return Availability::Available { title };
        }

        // oEmbed answers 401 for private/embedding-disabled videos and 404
        // (sometimes 400) for removed ones.
        if status.is_client_error() && status.as_u16() != 429 {
            tracing::info!("Video {} unavailable (status: {})", video_id, status);
            Availability::Unavailable
        } else {
            tracing::warn!("Availability check inconclusive (status: {})", status);
            Availability::Unknown
        }
    }
}
