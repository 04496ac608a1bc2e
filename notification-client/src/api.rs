use async_trait::async_trait;
use landwarn_core::{ApiError, CoreError, NotificationRecord};
use reqwest::{Client, Method, Response};
use std::time::Duration;
use tracing::{debug, error, info};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where a polling loop gets its notification feed from. The production
/// implementation talks HTTP; tests substitute scripted feeds.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Returns the server's notification list for `user_id`, newest first,
    /// in the order the server sent it.
    async fn fetch(&self, user_id: &str) -> Result<Vec<NotificationRecord>, CoreError>;
}

/// HTTP client for the alert server. Owns its `reqwest::Client`; hosts that
/// already have one can pass it in instead of building a second pool.
#[derive(Debug, Clone)]
pub struct HttpNotificationSource {
    http_client: Client,
    base_url: String,
    user_agent: String,
}

impl HttpNotificationSource {
    pub fn new(base_url: &str, user_agent: String) -> Self {
        Self::with_timeout(base_url, user_agent, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, user_agent: String, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url: normalize_base_url(base_url),
            user_agent,
        }
    }

    pub fn from_client(http_client: Client, base_url: &str, user_agent: String) -> Self {
        Self {
            http_client,
            base_url: normalize_base_url(base_url),
            user_agent,
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn request(&self, method: Method, endpoint: &str) -> Result<Response, CoreError> {
        let url = self.endpoint_url(endpoint);
        debug!("Alert server request: {} {}", method, url);

        let response = match self.http_client.request(method.clone(), &url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::Api(ApiError::RequestTimeout));
                }
                if e.is_connect() {
                    return Err(CoreError::Api(ApiError::EndpointUnavailable {
                        endpoint: endpoint.to_string(),
                    }));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status {} for {}", status, endpoint);
        if status.is_server_error() {
            Err(CoreError::Api(ApiError::ServerError {
                status_code: status.as_u16(),
            }))
        } else {
            Err(CoreError::Api(ApiError::UnexpectedStatus {
                status_code: status.as_u16(),
            }))
        }
    }

    /// Flags one notification as read on the server. The polling loop never
    /// calls this; dedup is keyed on ids, not read flags.
    pub async fn mark_read(&self, notification_id: &str) -> Result<(), CoreError> {
        let endpoint = format!("api/notifications/{}/read", notification_id);
        match self.request(Method::PUT, &endpoint).await {
            Ok(_) => {
                debug!("Marked notification {} read", notification_id);
                Ok(())
            }
            Err(CoreError::Api(ApiError::UnexpectedStatus { status_code: 404 })) => {
                Err(CoreError::Api(ApiError::NotificationNotFound {
                    notification_id: notification_id.to_string(),
                }))
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl NotificationSource for HttpNotificationSource {
    async fn fetch(&self, user_id: &str) -> Result<Vec<NotificationRecord>, CoreError> {
        let endpoint = format!("api/notifications/{}", user_id);
        let response = self.request(Method::GET, &endpoint).await?;

        let records: Vec<NotificationRecord> = response.json().await.map_err(|e| {
            error!("Failed to parse notification feed: {}", e);
            CoreError::Api(ApiError::InvalidResponse {
                details: "Failed to parse notification feed".to_string(),
            })
        })?;

        info!(
            "Retrieved {} notifications for user {}",
            records.len(),
            user_id
        );
        Ok(records)
    }
}

fn normalize_base_url(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    }
}
