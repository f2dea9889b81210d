use lambda_http::{http::StatusCode, Body, Error, Response};
use serde_json::{json, Value};

/// Build the response envelope every handler returns: a status code, open
/// CORS headers, JSON content type and a JSON-encoded body.
pub fn json_response(status: StatusCode, body: &Value) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::from(body.to_string()))
        .map_err(Box::new)?)
}

/// Identity gateway failure envelope: `{success, message, code}`.
pub fn failure(status: StatusCode, message: &str, code: &str) -> Result<Response<Body>, Error> {
    json_response(
        status,
        &json!({
            "success": false,
            "message": message,
            "code": code,
        }),
    )
}

/// CORS preflight response.
pub fn preflight(methods: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", methods)
        .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
        .body(Body::Empty)
        .map_err(Box::new)?)
}

pub fn body_text(body: &Body) -> &str {
    match body {
        Body::Text(text) => text,
        Body::Binary(bytes) => std::str::from_utf8(bytes).unwrap_or(""),
        Body::Empty => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_response_sets_cors_and_content_type() {
        let resp = json_response(StatusCode::OK, &json!({"ok": true})).unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(resp.headers()["Content-Type"], "application/json");
        assert_eq!(
            std::str::from_utf8(&resp.body().to_vec()).unwrap(),
            r#"{"ok":true}"#
        );
    }

    #[test]
    fn failure_envelope_shape() {
        let resp = failure(
            StatusCode::UNAUTHORIZED,
            "Incorrect username or password",
            "NotAuthorizedException",
        )
        .unwrap();
        assert_eq!(resp.status(), 401);
        let body: Value =
            serde_json::from_slice(&resp.body().to_vec()).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "NotAuthorizedException");
    }

    #[test]
    fn body_text_handles_all_variants() {
        assert_eq!(body_text(&Body::Empty), "");
        assert_eq!(body_text(&Body::Text("hi".to_string())), "hi");
        assert_eq!(body_text(&Body::Binary(b"raw".to_vec())), "raw");
    }
}
