use common::config::MailConfig;
use common::retry::{retry, RetryPolicy};
use common::AppError;

use super::store_error;
use crate::clients::{render_html, EmailError, OutgoingEmail, SendGridClient};
use crate::domain::validation::required;
use crate::domain::{
    DeliveryStatus, NotificationReport, NotificationRequest, Recipient, DEFAULT_NOTIFICATION_TYPE,
};
use crate::repo::NotificationStore;

pub const MISSING_NOTIFICATION_FIELDS: &str =
    "Missing required fields: recipient_ids, message, and subject are required";
pub const NO_RECIPIENTS: &str = "No valid attending recipients found for the provided IDs";
pub const MAIL_NOT_CONFIGURED: &str =
    "SendGrid API key not configured. Please set SENDGRID_API_KEY environment variable.";

struct Announcement<'a> {
    subject: &'a str,
    message: &'a str,
    kind: &'a str,
    html: String,
}

/// Emails announcements to attending guests and records each delivery.
pub struct NotificationService<S> {
    store: S,
    mailer: Option<SendGridClient>,
    website_url: String,
    retry: RetryPolicy,
}

impl<S: NotificationStore> NotificationService<S> {
    pub fn new(store: S, mailer: Option<SendGridClient>, mail: &MailConfig) -> Self {
        Self::with_retry(store, mailer, mail, RetryPolicy::default())
    }

    pub fn with_retry(
        store: S,
        mailer: Option<SendGridClient>,
        mail: &MailConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            mailer,
            website_url: mail.website_url.clone(),
            retry,
        }
    }

    pub async fn send(&self, request: &NotificationRequest) -> Result<NotificationReport, AppError> {
        let (Some(subject), Some(message)) = (required(&request.subject), required(&request.message)) else {
            return Err(AppError::validation(MISSING_NOTIFICATION_FIELDS));
        };
        if request.recipient_ids.is_empty() {
            return Err(AppError::validation(MISSING_NOTIFICATION_FIELDS));
        }

        let Some(mailer) = self.mailer.as_ref() else {
            tracing::error!("notification requested without a SendGrid API key");
            return Err(AppError::Unavailable(MAIL_NOT_CONFIGURED.to_string()));
        };

        let recipients = self
            .store
            .attending_recipients(&request.recipient_ids)
            .await
            .map_err(|e| store_error("load notification recipients", e))?;
        if recipients.is_empty() {
            return Err(AppError::validation(NO_RECIPIENTS));
        }

        let announcement = Announcement {
            subject,
            message,
            kind: required(&request.notification_type).unwrap_or(DEFAULT_NOTIFICATION_TYPE),
            html: render_html(subject, message, &self.website_url),
        };

        let mut sent = 0;
        let mut errors = Vec::new();
        for recipient in &recipients {
            match self.deliver(mailer, recipient, &announcement).await {
                Ok(()) => sent += 1,
                Err(e) => errors.push(e),
            }
        }

        tracing::info!(
            sent,
            failed = errors.len(),
            total = recipients.len(),
            kind = announcement.kind,
            "notification batch finished"
        );
        Ok(NotificationReport::new(recipients, sent, errors))
    }

    async fn deliver(
        &self,
        mailer: &SendGridClient,
        recipient: &Recipient,
        announcement: &Announcement<'_>,
    ) -> Result<(), String> {
        let notification_id = self
            .store
            .create_notification(
                recipient,
                announcement.subject,
                announcement.message,
                announcement.kind,
            )
            .await
            .map_err(|e| {
                tracing::error!(rsvp_id = recipient.id, error = %e, "failed to record notification");
                format!("Failed to record notification for {}", recipient.email)
            })?;

        let email = OutgoingEmail {
            to_email: recipient.email.clone(),
            to_name: recipient.name.clone(),
            subject: announcement.subject.to_string(),
            text: format!(
                "{}\n\nVisit the wedding website: {}",
                announcement.message, self.website_url
            ),
            html: announcement.html.clone(),
        };

        let email = &email;
        let outcome = retry(&self.retry, EmailError::is_transient, move || mailer.send(email)).await;

        let status = match outcome {
            Ok(()) => DeliveryStatus::Sent,
            Err(_) => DeliveryStatus::Failed,
        };
        if let Err(e) = self.store.set_notification_status(notification_id, status).await {
            tracing::error!(notification_id, error = %e, "failed to update notification status");
        }

        match outcome {
            Ok(()) => {
                if let Err(e) = self.store.mark_notified(recipient.id).await {
                    tracing::error!(rsvp_id = recipient.id, error = %e, "failed to flag rsvp as notified");
                }
                tracing::info!(rsvp_id = recipient.id, notification_id, "notification sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(rsvp_id = recipient.id, notification_id, error = %e, "notification failed");
                Err(format!("Failed to send to {}: {}", recipient.email, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::domain::RsvpRequest;
    use crate::repo::memory::MemoryStore;
    use crate::service::RsvpService;

    fn mail_config() -> MailConfig {
        MailConfig {
            sendgrid_api_key: Some("test-key".to_string()),
            api_url: String::new(),
            from_email: "hello@example.com".to_string(),
            from_name: "The Couple".to_string(),
            website_url: "https://wedding.example.com".to_string(),
        }
    }

    fn mailer(server: &MockServer) -> SendGridClient {
        SendGridClient::new(
            "test-key".to_string(),
            format!("{}/v3/mail/send", server.uri()),
            "hello@example.com".to_string(),
            "The Couple".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn service(store: &MemoryStore, mailer: Option<SendGridClient>) -> NotificationService<MemoryStore> {
        NotificationService::with_retry(store.clone(), mailer, &mail_config(), RetryPolicy::immediate(2))
    }

    async fn rsvp(store: &MemoryStore, name: &str, email: &str, attendance: &str) -> i32 {
        let request = RsvpRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            attendance: Some(attendance.into()),
            ..RsvpRequest::default()
        };
        RsvpService::new(store.clone()).submit(&request).await.unwrap().rsvp.id
    }

    fn request(ids: Vec<i32>) -> NotificationRequest {
        NotificationRequest {
            recipient_ids: ids,
            subject: Some("Schedule".into()),
            message: Some("Ceremony starts at 4pm".into()),
            notification_type: None,
        }
    }

    fn to(email: &str) -> serde_json::Value {
        json!({ "personalizations": [{ "to": [{ "email": email }] }] })
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let store = MemoryStore::new();
        let mut req = request(vec![1]);
        req.subject = Some("  ".into());

        let err = service(&store, None).send(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == MISSING_NOTIFICATION_FIELDS));

        let err = service(&store, None).send(&request(vec![])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == MISSING_NOTIFICATION_FIELDS));
    }

    #[tokio::test]
    async fn unconfigured_mailer_is_unavailable_before_touching_store() {
        let store = MemoryStore::new();
        let err = service(&store, None).send(&request(vec![1])).await.unwrap_err();

        assert!(matches!(err, AppError::Unavailable(ref m) if m == MAIL_NOT_CONFIGURED));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn declined_guests_are_not_recipients() {
        let server = MockServer::start().await;
        let store = MemoryStore::new();
        let declined = rsvp(&store, "Grace Hopper", "grace@example.com", "no").await;

        let err = service(&store, Some(mailer(&server)))
            .send(&request(vec![declined, 999]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == NO_RECIPIENTS));
        assert!(store.notifications().is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn each_delivery_is_recorded_and_only_successes_are_flagged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(to("ada@example.com")))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(to("grace@example.com")))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid recipient"))
            .mount(&server)
            .await;

        let store = MemoryStore::new();
        let ada = rsvp(&store, "Ada Lovelace", "ada@example.com", "yes").await;
        let grace = rsvp(&store, "Grace Hopper", "grace@example.com", "yes").await;

        let report = service(&store, Some(mailer(&server)))
            .send(&request(vec![ada, grace]))
            .await
            .unwrap();

        assert!(report.success);
        assert_eq!(report.sent_count, 1);
        assert_eq!(report.total_recipients, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Failed to send to grace@example.com"));

        let statuses: Vec<(i32, DeliveryStatus)> = store
            .notifications()
            .into_iter()
            .map(|n| (n.rsvp_id, n.status))
            .collect();
        assert_eq!(statuses, [(ada, DeliveryStatus::Sent), (grace, DeliveryStatus::Failed)]);
        let recorded = store.notifications();
        assert_eq!(recorded[1].email, "grace@example.com");
        assert!(recorded.iter().all(|n| n.notification_type == DEFAULT_NOTIFICATION_TYPE));

        assert!(store.was_notified(ada));
        assert!(!store.was_notified(grace));
    }

    #[tokio::test]
    async fn provider_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let store = MemoryStore::new();
        let ada = rsvp(&store, "Ada Lovelace", "ada@example.com", "yes").await;

        let report = service(&store, Some(mailer(&server)))
            .send(&request(vec![ada]))
            .await
            .unwrap();

        assert_eq!(report.sent_count, 1);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
        assert_eq!(store.notifications()[0].status, DeliveryStatus::Sent);
    }
}
