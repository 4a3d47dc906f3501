use super::{encode, BackendClient, ClientError, RouteRequest};
use reqwest::Method;
use serde_json::Value;

const ROUTE_ENDPOINT: &str = "/request/route/";

impl BackendClient {
    /// Send a question to the router on behalf of `username`.
    ///
    /// The answer lives at `data.message` in the response body. A body that
    /// declares `status: "error"` fails as an application error; a body
    /// without the nested message fails as a malformed response.
    pub async fn route_question(
        &self,
        username: &str,
        question: &str,
    ) -> Result<String, ClientError> {
        let payload = encode(&RouteRequest {
            username: username.to_string(),
            question: question.to_string(),
        })?;
        let body = self
            .send_json(Method::POST, ROUTE_ENDPOINT, Some(&payload))
            .await?;
        extract_answer(&body)
    }

    /// Like [`route_question`](Self::route_question), but failures come back
    /// as a readable sentence so a transcript can show them in place of an
    /// answer.
    pub async fn pass_question_to_router(&self, username: &str, question: &str) -> String {
        match self.route_question(username, question).await {
            Ok(answer) => answer,
            Err(e) if e.is_application() => format!("Couldn't get answer: {}", e),
            Err(e) => format!("An error occurred while handling request: {}", e),
        }
    }
}

fn extract_answer(body: &Value) -> Result<String, ClientError> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("router reported an error");
        return Err(ClientError::Application(message.to_string()));
    }

    body.get("data")
        .and_then(|data| data.get("message"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ClientError::Malformed("router response has no data.message".to_string()))
}
