use reqwest::StatusCode;

use kommentar_core::{ActionHash, CommentStore, FetchError, Link};

use crate::protocol::{ZomeCallRequest, DEFAULT_ROLE_NAME};

/// Comment store backed by an HTTP gateway that forwards zome calls.
pub struct HttpCommentStore {
    client: reqwest::Client,
    endpoint: String,
    role_name: String,
}

impl HttpCommentStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            role_name: DEFAULT_ROLE_NAME.to_string(),
        }
    }

    pub fn with_role_name(mut self, role_name: impl Into<String>) -> Self {
        self.role_name = role_name.into();
        self
    }

    fn zome_call_url(&self) -> String {
        format!("{}/zome_call", self.endpoint.trim_end_matches('/'))
    }
}

impl CommentStore for HttpCommentStore {
    async fn get_comments_for_post(&self, post_hash: &ActionHash) -> Result<Vec<Link>, FetchError> {
        let request = ZomeCallRequest::get_comments_for_post(&*self.role_name, post_hash.clone());

        let response = self
            .client
            .post(self.zome_call_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(post_hash.clone()));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            return Err(FetchError::Zome {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Vec<Link>>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as HttpStatus, routing::post, Json, Router};

    fn h(n: u8) -> ActionHash {
        ActionHash::fake(n)
    }

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn gateway_with(status: HttpStatus, body: &'static str) -> HttpCommentStore {
        let router = Router::new().route("/zome_call", post(move || async move { (status, body) }));
        HttpCommentStore::new(serve(router).await)
    }

    #[test]
    fn test_zome_call_url_trims_slash() {
        let store = HttpCommentStore::new("http://localhost:8888/");
        assert_eq!(store.zome_call_url(), "http://localhost:8888/zome_call");
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_network_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let store = HttpCommentStore::new("http://127.0.0.1:9").with_role_name("forum");

        let err = store
            .get_comments_for_post(&ActionHash::fake(1))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn test_success_returns_links() {
        async fn zome_call(
            Json(call): Json<ZomeCallRequest<ActionHash>>,
        ) -> Result<Json<Vec<Link>>, HttpStatus> {
            if call.zome_name != "posts" || call.fn_name != "get_comments_for_post" {
                return Err(HttpStatus::BAD_REQUEST);
            }
            Ok(Json(vec![
                Link::new(call.payload.clone(), ActionHash::fake(10)),
                Link::new(call.payload, ActionHash::fake(11)),
            ]))
        }
        let router = Router::new().route("/zome_call", post(zome_call));
        let store = HttpCommentStore::new(serve(router).await);

        let links = store.get_comments_for_post(&h(1)).await.unwrap();

        let targets: Vec<_> = links.iter().map(|l| l.target.clone()).collect();
        assert_eq!(targets, vec![h(10), h(11)]);
        assert!(links.iter().all(|l| l.base == h(1)));
    }

    #[tokio::test]
    async fn test_role_name_is_sent() {
        async fn zome_call(Json(call): Json<ZomeCallRequest<ActionHash>>) -> HttpStatus {
            if call.role_name == "forum-test" {
                HttpStatus::OK
            } else {
                HttpStatus::FORBIDDEN
            }
        }
        let router = Router::new().route("/zome_call", post(zome_call));
        let url = serve(router).await;

        let err = HttpCommentStore::new(url.clone())
            .get_comments_for_post(&h(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Zome { status: 403, .. }));

        // 200 with an empty body does not decode as a list.
        let err = HttpCommentStore::new(url)
            .with_role_name("forum-test")
            .get_comments_for_post(&h(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_not_found_maps_to_post() {
        let store = gateway_with(HttpStatus::NOT_FOUND, "no such post").await;

        let err = store.get_comments_for_post(&h(1)).await.unwrap_err();

        assert_eq!(err, FetchError::NotFound(h(1)));
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let store = gateway_with(HttpStatus::INTERNAL_SERVER_ERROR, "source chain error").await;

        let err = store.get_comments_for_post(&h(1)).await.unwrap_err();

        assert_eq!(
            err,
            FetchError::Zome {
                status: 500,
                message: "source chain error".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let store = gateway_with(HttpStatus::OK, "{\"links\": 3}").await;

        let err = store.get_comments_for_post(&h(1)).await.unwrap_err();

        assert!(matches!(err, FetchError::Decode(_)));
    }
}
