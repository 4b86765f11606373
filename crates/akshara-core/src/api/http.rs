use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Backend, ClientError, TaskId, TaskStatus};
use crate::language::Language;

#[derive(Serialize)]
struct MessageRequest<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    content: &'a str,
    #[serde(rename = "isUser")]
    is_user: bool,
    #[serde(rename = "targetLang")]
    target_lang: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    response: String,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    target_lang: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

#[derive(Serialize)]
struct RecordRequest<'a> {
    #[serde(rename = "targetLang")]
    target_lang: &'a str,
}

#[derive(Deserialize)]
struct RecordResponse {
    task_id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    transcription: Option<String>,
    #[serde(default)]
    translation: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

const STATUS_ENDPOINT: &str = "/check_status";

/// reqwest-backed client for the translation backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Status URL with the task id pushed as one encoded path segment.
    fn status_url(&self, task_id: &TaskId) -> Result<Url, ClientError> {
        let base = format!("{}{}", self.base_url, STATUS_ENDPOINT);
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: base.clone(),
            reason,
        };

        let mut url = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .push(task_id.as_str());
        Ok(url)
    }

    async fn post_json<B, T>(&self, endpoint: &'static str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "POST");

        let response = self.client.post(&url).json(body).send().await?;
        read_json(endpoint, response).await
    }
}

/// Decode a success body against its schema.
async fn read_json<T: DeserializeOwned>(endpoint: &'static str, response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| ClientError::Malformed {
        endpoint,
        reason: e.to_string(),
    })
}

/// The status endpoint answers 202/404/500 with a status body, so the body
/// is decoded regardless of the HTTP code.
pub(crate) fn parse_status(http_status: u16, body: &str) -> Result<TaskStatus, ClientError> {
    let parsed: StatusResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) if (200..300).contains(&http_status) => {
            return Err(ClientError::Malformed {
                endpoint: STATUS_ENDPOINT,
                reason: e.to_string(),
            })
        }
        Err(_) => {
            return Err(ClientError::Status {
                status: http_status,
                body: body.to_string(),
            })
        }
    };

    match parsed.status.as_str() {
        "pending" | "processing" => Ok(TaskStatus::Pending),
        "completed" => match parsed.transcription {
            Some(transcription) => Ok(TaskStatus::Completed {
                transcription,
                translation: parsed.translation,
            }),
            None => Err(ClientError::Malformed {
                endpoint: STATUS_ENDPOINT,
                reason: "completed status without transcription".to_string(),
            }),
        },
        "failed" | "not_found" => Ok(TaskStatus::Failed { error: parsed.error }),
        other => Err(ClientError::Malformed {
            endpoint: STATUS_ENDPOINT,
            reason: format!("unknown status '{}'", other),
        }),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send_text(&self, content: &str, target: Language) -> Result<String, ClientError> {
        let request = MessageRequest {
            kind: "text",
            content,
            is_user: true,
            target_lang: target.code(),
        };
        let reply: MessageResponse = self.post_json("/message", &request).await?;
        Ok(reply.response)
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String, ClientError> {
        let request = TranslateRequest {
            text,
            target_lang: target.code(),
        };
        let reply: TranslateResponse = self.post_json("/translate", &request).await?;
        Ok(reply.translated_text)
    }

    async fn start_recording(&self, target: Language) -> Result<TaskId, ClientError> {
        let request = RecordRequest {
            target_lang: target.code(),
        };
        let reply: RecordResponse = self.post_json("/record", &request).await?;
        Ok(TaskId::new(reply.task_id))
    }

    async fn check_status(&self, task_id: &TaskId) -> Result<TaskStatus, ClientError> {
        let url = self.status_url(task_id)?;
        debug!(%url, "GET");

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_status(status, &body)
    }
}
