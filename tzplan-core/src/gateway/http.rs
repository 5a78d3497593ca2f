//! HTTP implementation of [`Gateway`] over `reqwest`.

use std::borrow::Cow;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{Gateway, GatewayResult};
use crate::config::ClientConfig;
use crate::error::GatewayError;
use crate::model::{ChangeLogEntry, Event, EventPayload, NewProfile, Profile, TimezoneUpdate};

#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
}

/// Error bodies the backend sends; either key may carry the message.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    error: Option<String>,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self::with_client(http, &config.api_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        HttpGateway {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + Sync)>,
    ) -> GatewayResult<T> {
        tracing::debug!(%method, path, "request");

        let mut request = self.http.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = check_response(request.send().await?).await?;
        decode(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        self.call(Method::GET, path, None::<&()>).await
    }
}

/// Turn a non-2xx response into [`GatewayError::Http`], preferring the
/// message from a JSON error body over the raw text.
pub(crate) async fn check_response(resp: reqwest::Response) -> GatewayResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = match resp.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, %status, "could not read error body");
            String::new()
        }
    };
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|e| e.message.or(e.error))
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body
            }
        });

    Err(GatewayError::Http {
        status: status.as_u16(),
        message,
    })
}

/// Percent-encode an id for use as one path segment.
fn segment(id: &str) -> GatewayResult<Cow<'_, str>> {
    match id {
        "" | "." | ".." => Err(GatewayError::InvalidId(id.to_string())),
        _ => Ok(urlencoding::encode(id)),
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> GatewayResult<T> {
    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))
}

impl Gateway for HttpGateway {
    async fn list_profiles(&self) -> GatewayResult<Vec<Profile>> {
        self.get("/profiles").await
    }

    async fn get_profile(&self, id: &str) -> GatewayResult<Profile> {
        self.get(&format!("/profiles/{}", segment(id)?)).await
    }

    async fn create_profile(&self, profile: &NewProfile) -> GatewayResult<Profile> {
        self.call(Method::POST, "/profiles", Some(profile)).await
    }

    async fn update_profile_timezone(&self, id: &str, timezone: &str) -> GatewayResult<Profile> {
        let body = TimezoneUpdate {
            timezone: timezone.to_string(),
        };
        self.call(Method::PATCH, &format!("/profiles/{}/timezone", segment(id)?), Some(&body))
            .await
    }

    async fn list_events(&self) -> GatewayResult<Vec<Event>> {
        self.get("/events").await
    }

    async fn list_events_for_profile(&self, profile_id: &str) -> GatewayResult<Vec<Event>> {
        self.get(&format!("/events/profile/{}", segment(profile_id)?))
            .await
    }

    async fn create_event(&self, event: &EventPayload) -> GatewayResult<Event> {
        self.call(Method::POST, "/events", Some(event)).await
    }

    async fn update_event(&self, id: &str, event: &EventPayload) -> GatewayResult<Event> {
        self.call(Method::PUT, &format!("/events/{}", segment(id)?), Some(event))
            .await
    }

    async fn delete_event(&self, id: &str) -> GatewayResult<()> {
        let path = format!("/events/{}", segment(id)?);
        tracing::debug!(method = %Method::DELETE, path = %path, "request");

        let resp = self
            .http
            .delete(self.url(&path))
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }

    async fn list_event_logs(&self, event_id: &str) -> GatewayResult<Vec<ChangeLogEntry>> {
        self.get(&format!("/logs/event/{}", segment(event_id)?))
            .await
    }

    async fn list_logs(&self) -> GatewayResult<Vec<ChangeLogEntry>> {
        self.get("/logs").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn success_passes_through() {
        let resp = mock_response(200, "[]");
        assert!(check_response(resp).await.is_ok());
    }

    #[tokio::test]
    async fn error_message_from_json_body() {
        let resp = mock_response(400, r#"{"message": "End date must be after start date"}"#);
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Http { status: 400, ref message } if message == "End date must be after start date"
        ));
    }

    #[tokio::test]
    async fn error_key_is_also_accepted() {
        let resp = mock_response(404, r#"{"error": "Event not found"}"#);
        let err = check_response(resp).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "Request failed with status code 404: Event not found"
        );
    }

    #[tokio::test]
    async fn plain_text_and_empty_bodies() {
        let err = check_response(mock_response(502, "upstream down")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Http { ref message, .. } if message == "upstream down"));

        let err = check_response(mock_response(500, "")).await.unwrap_err();
        assert!(
            matches!(err, GatewayError::Http { ref message, .. } if message == "Internal Server Error")
        );
    }

    #[tokio::test]
    async fn decode_failure_is_reported() {
        let resp = mock_response(200, r#"{"not": "a list"}"#);
        let err = decode::<Vec<Profile>>(resp).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn decodes_profiles() {
        let resp = mock_response(
            200,
            r#"[{"_id": "p1", "name": "Ada", "timezone": "Europe/London"}]"#,
        );
        let profiles: Vec<Profile> = decode(resp).await.unwrap();
        assert_eq!(profiles, vec![Profile::new("p1", "Ada", "Europe/London")]);
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let gw = HttpGateway::with_client(reqwest::Client::new(), "http://localhost:5000/api/");
        assert_eq!(gw.url("/events"), "http://localhost:5000/api/events");
    }

    #[test]
    fn ids_are_encoded_as_one_segment() {
        assert_eq!(
            segment("x/../../profiles/p1").unwrap(),
            "x%2F..%2F..%2Fprofiles%2Fp1"
        );
        assert_eq!(segment("a?b#c").unwrap(), "a%3Fb%23c");
        assert_eq!(segment("66a0f3c2e1").unwrap(), "66a0f3c2e1");
    }

    #[test]
    fn dot_segments_are_rejected() {
        for id in ["", ".", ".."] {
            let err = segment(id).unwrap_err();
            assert!(matches!(err, GatewayError::InvalidId(_)));
            assert_eq!(err.status(), None);
        }
    }

    /// What the server saw of a request.
    #[derive(Debug)]
    struct Recorded {
        method: String,
        path: String,
        body: Option<Value>,
    }

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.trim()
                    .eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse().unwrap())
            })
            .unwrap_or(0)
    }

    /// Accept one connection, answer it with `reply` as JSON, and hand back
    /// the request it carried.
    async fn serve_once(reply: &str) -> (HttpGateway, JoinHandle<Recorded>) {
        let reply = reply.to_string();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let head_len = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed mid-request");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = header_end(&buf) {
                    break end + 4;
                }
            };
            let head = String::from_utf8_lossy(&buf[..head_len]).to_string();
            let total = head_len + content_length(&head);
            while buf.len() < total {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed mid-body");
                buf.extend_from_slice(&chunk[..n]);
            }

            let mut request_line = head.lines().next().unwrap().split_whitespace();
            let method = request_line.next().unwrap().to_string();
            let path = request_line.next().unwrap().to_string();
            let body = &buf[head_len..total];
            let body = (!body.is_empty()).then(|| serde_json::from_slice(body).unwrap());

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                reply.len(),
                reply
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            Recorded { method, path, body }
        });

        let gateway = HttpGateway::with_client(reqwest::Client::new(), &format!("http://{addr}/api"));
        (gateway, server)
    }

    const PROFILE: &str = r#"{"_id": "p1", "name": "Ada", "timezone": "Asia/Tokyo"}"#;
    const EVENT: &str = r#"{"_id": "e1", "title": "Standup", "profiles": ["p1"], "timezone": "America/New_York", "startDate": "2024-06-01T13:00:00.000Z", "endDate": "2024-06-01T13:30:00.000Z"}"#;

    fn payload() -> EventPayload {
        EventPayload {
            title: "Standup".into(),
            description: String::new(),
            profiles: vec!["p1".into()],
            timezone: "America/New_York".into(),
            start_date: Utc.with_ymd_and_hms(2024, 6, 1, 13, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 1, 13, 30, 0).unwrap(),
        }
    }

    fn payload_json() -> Value {
        json!({
            "title": "Standup",
            "description": "",
            "profiles": ["p1"],
            "timezone": "America/New_York",
            "startDate": "2024-06-01T13:00:00.000Z",
            "endDate": "2024-06-01T13:30:00.000Z",
        })
    }

    #[tokio::test]
    async fn list_profiles_request() {
        let (gw, server) = serve_once("[]").await;
        assert!(gw.list_profiles().await.unwrap().is_empty());

        let req = server.await.unwrap();
        assert_eq!((req.method.as_str(), req.path.as_str()), ("GET", "/api/profiles"));
        assert_eq!(req.body, None);
    }

    #[tokio::test]
    async fn get_profile_request() {
        let (gw, server) = serve_once(PROFILE).await;
        let profile = gw.get_profile("p1").await.unwrap();
        assert_eq!(profile.name, "Ada");

        let req = server.await.unwrap();
        assert_eq!((req.method.as_str(), req.path.as_str()), ("GET", "/api/profiles/p1"));
    }

    #[tokio::test]
    async fn get_profile_keeps_id_in_its_segment() {
        let (gw, server) = serve_once(PROFILE).await;
        gw.get_profile("x/../../events").await.unwrap();

        let req = server.await.unwrap();
        assert_eq!(req.path, "/api/profiles/x%2F..%2F..%2Fevents");
    }

    #[tokio::test]
    async fn create_profile_request() {
        let (gw, server) = serve_once(PROFILE).await;
        let body = NewProfile {
            name: "Ada".into(),
            timezone: "Asia/Tokyo".into(),
        };
        gw.create_profile(&body).await.unwrap();

        let req = server.await.unwrap();
        assert_eq!((req.method.as_str(), req.path.as_str()), ("POST", "/api/profiles"));
        assert_eq!(req.body, Some(json!({"name": "Ada", "timezone": "Asia/Tokyo"})));
    }

    #[tokio::test]
    async fn update_profile_timezone_request() {
        let (gw, server) = serve_once(PROFILE).await;
        let profile = gw.update_profile_timezone("p1", "Asia/Tokyo").await.unwrap();
        assert_eq!(profile.timezone, "Asia/Tokyo");

        let req = server.await.unwrap();
        assert_eq!(
            (req.method.as_str(), req.path.as_str()),
            ("PATCH", "/api/profiles/p1/timezone")
        );
        assert_eq!(req.body, Some(json!({"timezone": "Asia/Tokyo"})));
    }

    #[tokio::test]
    async fn list_events_request() {
        let (gw, server) = serve_once("[]").await;
        gw.list_events().await.unwrap();

        let req = server.await.unwrap();
        assert_eq!((req.method.as_str(), req.path.as_str()), ("GET", "/api/events"));
    }

    #[tokio::test]
    async fn list_events_for_profile_request() {
        let (gw, server) = serve_once(&format!("[{EVENT}]")).await;
        let events = gw.list_events_for_profile("p1").await.unwrap();
        assert_eq!(events.len(), 1);

        let req = server.await.unwrap();
        assert_eq!(
            (req.method.as_str(), req.path.as_str()),
            ("GET", "/api/events/profile/p1")
        );
    }

    #[tokio::test]
    async fn create_event_request() {
        let (gw, server) = serve_once(EVENT).await;
        let event = gw.create_event(&payload()).await.unwrap();
        assert_eq!(event.id, "e1");

        let req = server.await.unwrap();
        assert_eq!((req.method.as_str(), req.path.as_str()), ("POST", "/api/events"));
        assert_eq!(req.body, Some(payload_json()));
    }

    #[tokio::test]
    async fn update_event_request() {
        let (gw, server) = serve_once(EVENT).await;
        gw.update_event("e1", &payload()).await.unwrap();

        let req = server.await.unwrap();
        assert_eq!((req.method.as_str(), req.path.as_str()), ("PUT", "/api/events/e1"));
        assert_eq!(req.body, Some(payload_json()));
    }

    #[tokio::test]
    async fn delete_event_request() {
        let (gw, server) = serve_once("{}").await;
        gw.delete_event("a?b#c").await.unwrap();

        let req = server.await.unwrap();
        assert_eq!(
            (req.method.as_str(), req.path.as_str()),
            ("DELETE", "/api/events/a%3Fb%23c")
        );
        assert_eq!(req.body, None);
    }

    #[tokio::test]
    async fn list_event_logs_request() {
        let (gw, server) = serve_once("[]").await;
        gw.list_event_logs("e1").await.unwrap();

        let req = server.await.unwrap();
        assert_eq!((req.method.as_str(), req.path.as_str()), ("GET", "/api/logs/event/e1"));
    }

    #[tokio::test]
    async fn list_logs_request() {
        let (gw, server) = serve_once("[]").await;
        gw.list_logs().await.unwrap();

        let req = server.await.unwrap();
        assert_eq!((req.method.as_str(), req.path.as_str()), ("GET", "/api/logs"));
    }

    #[tokio::test]
    async fn dot_ids_never_reach_the_server() {
        let gw = HttpGateway::with_client(reqwest::Client::new(), "http://127.0.0.1:9/api");
        let err = gw.update_event("..", &payload()).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidId(ref id) if id == ".."));
    }
}
