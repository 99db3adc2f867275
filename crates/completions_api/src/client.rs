use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response};

use crate::config::CompletionsApiConfig;
use crate::error::{parse_error_message, CompletionsApiError};
use crate::events::{CompletionStreamEvent, FinishReason};
use crate::payload::ChatCompletionsRequest;
use crate::sse::SseStreamParser;
use crate::url::normalize_completions_url;

#[derive(Debug)]
pub struct CompletionsApiClient {
    http: Client,
    config: CompletionsApiConfig,
}

#[derive(Debug, Clone)]
pub struct StreamResult {
    pub events: Vec<CompletionStreamEvent>,
    pub finish: Option<FinishReason>,
}

impl CompletionsApiClient {
    pub fn new(config: CompletionsApiConfig) -> Result<Self, CompletionsApiError> {
        if config.api_key.trim().is_empty() {
            return Err(CompletionsApiError::MissingApiKey);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(CompletionsApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CompletionsApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_completions_url(&self.config.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, CompletionsApiError> {
        let mut headers = HeaderMap::new();

        let bearer = format!("Bearer {}", self.config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|_| CompletionsApiError::InvalidHeader("authorization".to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        if let Some(user_agent) = self.config.user_agent.as_deref() {
            headers.insert(
                USER_AGENT,
                HeaderValue::from_str(user_agent)
                    .map_err(|_| CompletionsApiError::InvalidHeader("user-agent".to_string()))?,
            );
        }

        for (key, value) in &self.config.extra_headers {
            headers.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                    CompletionsApiError::InvalidHeader(format!("invalid header key: {key}"))
                })?,
                HeaderValue::from_str(value).map_err(|_| {
                    CompletionsApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }

        Ok(headers)
    }

    pub fn build_request(
        &self,
        request: &ChatCompletionsRequest,
    ) -> Result<reqwest::RequestBuilder, CompletionsApiError> {
        let headers = self.build_headers()?;
        let mut payload = request.clone();
        payload.stream = true;

        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(&payload))
    }

    /// Sends the request exactly once; a failed call is the caller's record,
    /// never a retry loop.
    pub async fn send(
        &self,
        request: &ChatCompletionsRequest,
    ) -> Result<Response, CompletionsApiError> {
        let response = self.build_request(request)?.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        Err(CompletionsApiError::Status(
            status,
            parse_error_message(status, &body),
        ))
    }

    /// Streams the response body through the SSE parser, handing each
    /// normalized event to `on_event` and returning the finish reason.
    pub async fn stream_with_handler<F>(
        &self,
        request: &ChatCompletionsRequest,
        mut on_event: F,
    ) -> Result<Option<FinishReason>, CompletionsApiError>
    where
        F: FnMut(CompletionStreamEvent),
    {
        let response = self.send(request).await?;
        let mut bytes = response.bytes_stream();
        let mut parser = SseStreamParser::default();
        let mut finish = None;

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(CompletionsApiError::from)?;
            for event in parser.feed(&chunk) {
                process_stream_event(event, &mut finish, &mut on_event)?;
            }
        }

        Ok(finish)
    }

    pub async fn stream(
        &self,
        request: &ChatCompletionsRequest,
    ) -> Result<StreamResult, CompletionsApiError> {
        let mut events = Vec::new();
        let finish = self
            .stream_with_handler(request, |event| {
                events.push(event);
            })
            .await?;

        Ok(StreamResult { events, finish })
    }
}

fn process_stream_event<F>(
    event: CompletionStreamEvent,
    finish: &mut Option<FinishReason>,
    on_event: &mut F,
) -> Result<(), CompletionsApiError>
where
    F: FnMut(CompletionStreamEvent),
{
    if let CompletionStreamEvent::Error { code, message } = &event {
        return Err(CompletionsApiError::StreamFailed {
            code: code.clone(),
            message: message
                .clone()
                .or_else(|| code.clone())
                .unwrap_or_else(|| "completion stream reported an error".to_owned()),
        });
    }

    if let CompletionStreamEvent::Completed { finish_reason } = &event {
        *finish = finish_reason.or(*finish);
    }

    on_event(event);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::CompletionsApiConfig;
    use crate::events::{CompletionStreamEvent, FinishReason};
    use crate::payload::{ChatCompletionsRequest, RequestMessage};
    use crate::sse::SseStreamParser;

    use super::{process_stream_event, CompletionsApiClient};

    fn client() -> CompletionsApiClient {
        CompletionsApiClient::new(CompletionsApiConfig::new("sk-test"))
            .expect("client builds with a key")
    }

    #[test]
    fn empty_api_key_is_rejected_at_construction() {
        let error = CompletionsApiClient::new(CompletionsApiConfig::default())
            .map(|_| ())
            .expect_err("missing key should fail");

        assert_eq!(error.to_string(), "API key is required");
    }

    #[test]
    fn headers_carry_bearer_auth_and_event_stream_accept() {
        let headers = client().build_headers().expect("headers build");

        assert_eq!(
            headers.get("authorization").map(|value| value.as_bytes()),
            Some("Bearer sk-test".as_bytes())
        );
        assert_eq!(
            headers.get("accept").map(|value| value.as_bytes()),
            Some("text/event-stream".as_bytes())
        );
    }

    #[test]
    fn build_request_targets_the_normalized_endpoint() {
        let client = client();
        assert_eq!(
            client.normalized_endpoint(),
            "https://api.deepseek.com/chat/completions"
        );

        let request = ChatCompletionsRequest::new(
            "deepseek-chat",
            vec![RequestMessage::new("user", "hi")],
        );
        client
            .build_request(&request)
            .expect("request builder assembles");
    }

    #[test]
    fn process_stream_event_tracks_finish_and_forwards_in_order() {
        let frames = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"A\"},\"finish_reason\":null}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"B\"},\"finish_reason\":null}]}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        );
        let parsed = SseStreamParser::parse_frames(frames);

        let mut finish = None;
        let mut observed = Vec::new();
        for event in parsed {
            process_stream_event(event, &mut finish, &mut |event| observed.push(event))
                .expect("content and completion events process");
        }

        assert_eq!(finish, Some(FinishReason::Stop));
        assert_eq!(
            observed,
            vec![
                CompletionStreamEvent::ContentDelta {
                    delta: "A".to_string(),
                },
                CompletionStreamEvent::ContentDelta {
                    delta: "B".to_string(),
                },
                CompletionStreamEvent::Completed {
                    finish_reason: Some(FinishReason::Stop),
                },
            ]
        );
    }

    #[test]
    fn process_stream_event_surfaces_error_payloads() {
        let mut finish = None;
        let error = process_stream_event(
            CompletionStreamEvent::Error {
                code: Some("insufficient_quota".to_string()),
                message: Some("quota exhausted".to_string()),
            },
            &mut finish,
            &mut |_| panic!("error events must not be forwarded"),
        )
        .expect_err("error event should fail the stream");

        assert_eq!(
            error.to_string(),
            "stream failed (insufficient_quota): quota exhausted"
        );
    }
}
