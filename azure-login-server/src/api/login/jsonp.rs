use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Keeps only the characters allowed in a JSONP callback name.
/// Returns `None` when nothing usable is left.
pub fn sanitize_callback(raw: &str) -> Option<String> {
    let name: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '[' | ']'))
        .collect();
    (!name.is_empty()).then_some(name)
}

/// A JSON body delivered as a script callback when the caller names one,
/// and as plain JSON otherwise. Always answered with 200.
pub struct Jsonp<T> {
    pub callback: Option<String>,
    pub body: T,
}

impl<T: Serialize> Jsonp<T> {
    pub fn new(callback: Option<&str>, body: T) -> Self {
        Self {
            callback: callback.and_then(sanitize_callback),
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for Jsonp<T> {
    fn into_response(self) -> Response {
        let json = match serde_json::to_string(&self.body) {
            Ok(json) => json,
            Err(err) => {
                log::error!("Failed to serialize response body: {}", err);
                r#"{"error":"Internal serialization error"}"#.to_string()
            }
        };

        match self.callback {
            Some(callback) => {
                // Line and paragraph separators are valid JSON but end a JS statement
                let json = json.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029");
                let script = format!(
                    "/**/ typeof {cb} === 'function' && {cb}({json});",
                    cb = callback,
                    json = json
                );
                (
                    StatusCode::OK,
                    [
                        (
                            header::CONTENT_TYPE,
                            HeaderValue::from_static("text/javascript; charset=utf-8"),
                        ),
                        (
                            header::X_CONTENT_TYPE_OPTIONS,
                            HeaderValue::from_static("nosniff"),
                        ),
                    ],
                    script,
                )
                    .into_response()
            }
            None => (
                StatusCode::OK,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                json,
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_of(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_sanitize_callback() {
        assert_eq!(sanitize_callback("cb"), Some("cb".to_string()));
        assert_eq!(
            sanitize_callback("window.handlers[0]"),
            Some("window.handlers[0]".to_string())
        );
        assert_eq!(
            sanitize_callback("alert(1);//"),
            Some("alert1".to_string())
        );
        assert_eq!(sanitize_callback("();"), None);
        assert_eq!(sanitize_callback(""), None);
    }

    #[tokio::test]
    async fn test_jsonp_wrapping() {
        let response = Jsonp::new(Some("signIn"), json!({ "token": "abc" })).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/javascript; charset=utf-8"
        );
        assert_eq!(
            body_of(response).await,
            r#"/**/ typeof signIn === 'function' && signIn({"token":"abc"});"#
        );
    }

    #[tokio::test]
    async fn test_plain_json_without_callback() {
        let response = Jsonp::new(None, json!({ "error": "nope" })).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_of(response).await, r#"{"error":"nope"}"#);
    }

    #[tokio::test]
    async fn test_line_separators_escaped() {
        let response =
            Jsonp::new(Some("cb"), json!({ "error": "a\u{2028}b\u{2029}c" })).into_response();

        assert_eq!(
            body_of(response).await,
            r#"/**/ typeof cb === 'function' && cb({"error":"a\u2028b\u2029c"});"#
        );
    }
}
