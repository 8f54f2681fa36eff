// SendGrid v3 mail client
use std::time::Duration;

use anyhow::Result;
use common::retry::is_retryable_status;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SendGrid returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("SendGrid request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl EmailError {
    /// Throttling, server errors and dropped connections are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            EmailError::Rejected { status, .. } => is_retryable_status(*status),
            EmailError::Transport(e) => e.is_connect() || e.is_timeout(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Clone)]
pub struct SendGridClient {
    api_key: String,
    api_url: String,
    from_email: String,
    from_name: String,
    client: reqwest::Client,
}

impl SendGridClient {
    pub fn new(
        api_key: String,
        api_url: String,
        from_email: String,
        from_name: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            api_url,
            from_email,
            from_name,
            client,
        })
    }

    pub async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let payload = json!({
            "personalizations": [{
                "to": [{ "email": email.to_email, "name": email.to_name }],
                "subject": email.subject,
            }],
            "from": { "email": self.from_email, "name": self.from_name },
            "content": [
                { "type": "text/plain", "value": email.text },
                { "type": "text/html", "value": email.html },
            ],
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected { status, body });
        }

        Ok(())
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML body for an announcement. Subject and message are escaped and
/// message line breaks become `<br>`.
pub fn render_html(subject: &str, message: &str, website_url: &str) -> String {
    let subject = escape_html(subject);
    let body = escape_html(message).replace("\r\n", "\n").replace('\n', "<br>");
    let website_url = escape_html(website_url);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{subject}</title>
</head>
<body style="font-family: Georgia, serif; line-height: 1.6; color: #333; margin: 0; padding: 0; background-color: #f9f9f9;">
    <div style="max-width: 600px; margin: 0 auto; background: white; border-radius: 12px; overflow: hidden;">
        <div style="background: #c8a951; color: white; text-align: center; padding: 30px 20px;">
            <h1 style="margin: 0; font-size: 28px; font-weight: normal;">Wedding Update</h1>
        </div>
        <div style="padding: 30px 20px;">
            <h2 style="color: #c8a951; font-size: 22px; margin: 0 0 20px 0; font-weight: normal;">{subject}</h2>
            <div style="font-size: 16px; line-height: 1.7; color: #555; margin-bottom: 25px;">{body}</div>
            <div style="text-align: center; margin: 30px 0;">
                <a href="{website_url}" style="display: inline-block; background: #c8a951; color: white; text-decoration: none; padding: 12px 30px; border-radius: 25px;">Visit Wedding Website</a>
            </div>
        </div>
        <div style="background: #f8f8f8; padding: 20px; text-align: center; border-top: 1px solid #eee;">
            <p style="margin: 0; font-size: 14px; color: #666;">If you have any questions, please reply to this email.</p>
        </div>
    </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SendGridClient {
        SendGridClient::new(
            "test-key".to_string(),
            format!("{}/v3/mail/send", server.uri()),
            "hello@example.com".to_string(),
            "The Couple".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to_email: "ada@example.com".to_string(),
            to_name: "Ada".to_string(),
            subject: "Schedule".to_string(),
            text: "See you at 4pm".to_string(),
            html: "<p>See you at 4pm</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn posts_sendgrid_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "personalizations": [{
                    "to": [{ "email": "ada@example.com", "name": "Ada" }],
                    "subject": "Schedule"
                }],
                "from": { "email": "hello@example.com", "name": "The Couple" },
                "content": [
                    { "type": "text/plain", "value": "See you at 4pm" },
                    { "type": "text/html", "value": "<p>See you at 4pm</p>" }
                ]
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).send(&email()).await.unwrap();
    }

    #[tokio::test]
    async fn rejection_carries_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad from address"))
            .mount(&server)
            .await;

        let err = client(&server).send(&email()).await.unwrap_err();
        match &err {
            EmailError::Rejected { status, body } => {
                assert_eq!(*status, 400);
                assert_eq!(body, "bad from address");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn server_errors_are_transient() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server).send(&email()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn html_escapes_message_and_keeps_line_breaks() {
        let html = render_html("Dinner <update>", "Line one\nLine & two", "https://example.com");
        assert!(html.contains("Dinner &lt;update&gt;"));
        assert!(html.contains("Line one<br>Line &amp; two"));
        assert!(!html.contains("<update>"));
    }
}
