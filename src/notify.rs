//! Notifier - Dispatch asincrono delle mail di invito
//!
//! Le mail non sono un servizio interno: vengono delegate via webhook a un
//! endpoint esterno con payload `{recipient_email, circle_id, invite_code}`.
//! I fallimenti sono raccolti e riportati al client come successo parziale,
//! mai propagati come errore della creazione del circle.

use serde::Serialize;
use tracing::{debug, instrument, warn};

#[derive(Serialize)]
struct InvitationPayload<'a> {
    recipient_email: &'a str,
    circle_id: i32,
    invite_code: &'a str,
}

pub struct Notifier {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl Notifier {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Invia una singola mail di invito tramite il webhook configurato.
    /// Ritorna Err con il motivo del fallimento; il chiamante decide come riportarlo.
    #[instrument(skip(self), fields(circle_id = %circle_id))]
    pub async fn send_invitation(
        &self,
        recipient_email: &str,
        circle_id: i32,
        invite_code: &str,
    ) -> Result<(), String> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            warn!("Invitation webhook not configured, dropping invitation email");
            return Err("notification endpoint not configured".to_string());
        };

        debug!("Sending invitation email via webhook");

        let payload = InvitationPayload {
            recipient_email,
            circle_id,
            invite_code,
        };

        let response = self
            .client
            .post(endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!("Invitation webhook request failed: {}", e);
                e.to_string()
            })?;

        if !response.status().is_success() {
            warn!("Invitation webhook returned status {}", response.status());
            return Err(format!("webhook returned {}", response.status()));
        }

        debug!("Invitation email dispatched");
        Ok(())
    }
}
