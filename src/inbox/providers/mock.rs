// src/inbox/providers/mock.rs
//! Deterministic mock source used for development and demos: returns the same
//! three French mails on every fetch. Dedup upstream keeps the working set
//! free of duplicates across repeated fetches.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::inbox::types::{IncomingMail, MailPlatform, MailSource};

pub struct MockMailSource;

impl MockMailSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockMailSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailSource for MockMailSource {
    async fn fetch_latest(&self) -> Result<Vec<IncomingMail>> {
        let now = Utc::now();
        Ok(vec![
            IncomingMail {
                id: "email_001".into(),
                sender: "sophie.lemaire@example.com".to_string(),
                sender_name: "Sophie Lemaire".to_string(),
                subject: "Réservation chambre double - Février".to_string(),
                body: "Bonjour,\nJe souhaite réserver une chambre double pour le 25 et 26 février.\nNous sommes 2 personnes.\nQuel est le tarif ?\n\nCordialement,\nSophie Lemaire".to_string(),
                received_at: now - Duration::minutes(30),
                platform: MailPlatform::Gmail,
            },
            IncomingMail {
                id: "email_002".into(),
                sender: "pierre.martin@techsolutions.com".to_string(),
                sender_name: "Pierre Martin".to_string(),
                subject: "Organisation Séminaire Annuel".to_string(),
                body: "Bonjour,\nJe souhaiterais organiser un séminaire pour mon équipe début mars.\nNous sommes environ 20 personnes.\nPouvez-vous me faire un devis ?\n\nBien à vous,\nPierre Martin\nTechSolutions".to_string(),
                received_at: now - Duration::hours(2),
                platform: MailPlatform::Outlook,
            },
            IncomingMail {
                id: "email_003".into(),
                sender: "noreply@booking.com".to_string(),
                sender_name: "Booking.com".to_string(),
                subject: "Confirmation de réservation #12345".to_string(),
                body: "Ceci est une confirmation automatique de votre réservation.\nNuméro de référence: 12345\nClient: Jean Dupont\nDates: 12-14 Mars".to_string(),
                received_at: now - Duration::hours(5),
                platform: MailPlatform::Gmail,
            },
        ])
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_source_is_stable_across_fetches() {
        let src = MockMailSource::new();
        let a = src.fetch_latest().await.unwrap();
        let b = src.fetch_latest().await.unwrap();
        assert_eq!(a.len(), 3);
        let ids_a: Vec<_> = a.iter().map(|m| m.id.clone()).collect();
        let ids_b: Vec<_> = b.iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids_a, ids_b);
    }
}
