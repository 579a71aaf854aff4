//! HTTP delivery of contact submissions.

use std::time::Duration;

use reqwest::{header, StatusCode, Url};

use super::contact::ContactPayload;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("no contact endpoint configured")]
    NotConfigured,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("endpoint answered {0}")]
    Status(StatusCode),
}

/// Sends one JSON POST per submission.  No retries: the visitor resubmits.
#[derive(Debug, Clone)]
pub struct ContactClient {
    http: reqwest::Client,
    endpoint: Option<Url>,
}

impl ContactClient {
    pub fn new(endpoint: Option<Url>, timeout: Duration) -> Result<Self, ContactError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("locus-site/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub async fn submit(&self, payload: &ContactPayload) -> Result<(), ContactError> {
        let Some(endpoint) = self.endpoint.clone() else {
            return Err(ContactError::NotConfigured);
        };

        tracing::info!(endpoint = %endpoint, "sending contact submission");
        let response = self
            .http
            .post(endpoint)
            .header(header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ContactError::Status(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contact::{ContactForm, Field, SubmitAction, SubmitState, MSG_NETWORK};
    use wiremock::matchers::{body_json, header as header_is, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ContactClient {
        let url = Url::parse(&format!("{}/contact", server.uri())).unwrap();
        ContactClient::new(Some(url), DEFAULT_TIMEOUT).unwrap()
    }

    async fn submit_form(form: &mut ContactForm, client: &ContactClient) -> SubmitAction {
        let action = form.begin_submit(client.is_configured());
        if let SubmitAction::Send(payload) = &action {
            let result = client.submit(payload).await;
            form.finish_submit(result);
        }
        action
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing_then_one_post_once_fixed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contact"))
            .and(header_is("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "organization": "",
                "message": "Hello",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server);

        let mut form = ContactForm::default();
        form.set(Field::Email, "a@b");
        assert_eq!(submit_form(&mut form, &client).await, SubmitAction::Rejected);
        assert_eq!(form.errors().len(), 3);
        assert!(server.received_requests().await.unwrap().is_empty());

        form.set(Field::Name, "Ada");
        form.set(Field::Email, "ada@example.com");
        form.set(Field::Message, "Hello");
        assert!(matches!(submit_form(&mut form, &client).await, SubmitAction::Send(_)));
        assert_eq!(form.state(), &SubmitState::Success);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_success_status_maps_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server);

        let payload = ContactPayload {
            name: "n".into(),
            email: "n@x.io".into(),
            organization: String::new(),
            message: "m".into(),
        };
        let err = client.submit(&payload).await.unwrap_err();
        assert!(matches!(err, ContactError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        // Bind then drop a listener so the port is closed.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = Url::parse(&format!("http://127.0.0.1:{port}/contact")).unwrap();
        let client = ContactClient::new(Some(url), Duration::from_secs(2)).unwrap();

        let mut form = ContactForm::default();
        form.set(Field::Name, "Ada");
        form.set(Field::Email, "ada@example.com");
        form.set(Field::Message, "Hello");
        submit_form(&mut form, &client).await;
        assert_eq!(form.state(), &SubmitState::Error(MSG_NETWORK.into()));
    }

    #[tokio::test]
    async fn unconfigured_client_refuses() {
        let client = ContactClient::new(None, DEFAULT_TIMEOUT).unwrap();
        let payload = ContactPayload {
            name: "n".into(),
            email: "n@x.io".into(),
            organization: String::new(),
            message: "m".into(),
        };
        assert!(matches!(
            client.submit(&payload).await,
            Err(ContactError::NotConfigured)
        ));
    }
}
