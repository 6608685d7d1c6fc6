//! Transactional email over AWS SES
//!
//! Booking emails are best-effort: callers log failures and carry on.

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use shared::models::{Booking, BookingStatus};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Rendered plain-text email
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

#[derive(Clone)]
pub struct EmailService {
    /// `None` when sending is disabled; messages are only logged
    ses: Option<SesClient>,
    from: String,
    admin_to: String,
    site_url: String,
}

impl EmailService {
    pub fn new(ses: Option<SesClient>, from: String, admin_to: String, site_url: String) -> Self {
        Self {
            ses,
            from,
            admin_to,
            site_url,
        }
    }

    /// Logging-only service
    #[cfg(test)]
    pub fn disabled(site_url: impl Into<String>) -> Self {
        Self::new(
            None,
            "noreply@localhost".into(),
            "admin@localhost".into(),
            site_url.into(),
        )
    }

    async fn send(&self, to: &str, message: EmailMessage) -> Result<(), BoxError> {
        let Some(ses) = &self.ses else {
            tracing::info!(to = to, subject = %message.subject, "Email sending disabled, skipped");
            return Ok(());
        };

        let subject = Content::builder().data(message.subject).build()?;
        let body = Body::builder()
            .text(Content::builder().data(message.body).build()?)
            .build();
        let message = Message::builder().subject(subject).body(body).build();

        ses.send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await?;

        Ok(())
    }

    pub async fn send_customer_confirmation(
        &self,
        booking: &Booking,
        tour_title: &str,
    ) -> Result<(), BoxError> {
        self.send(
            &booking.email,
            customer_confirmation(booking, tour_title, &self.site_url),
        )
        .await?;
        tracing::info!(reference = %booking.reference_code, "Booking confirmation sent");
        Ok(())
    }

    pub async fn send_admin_notification(
        &self,
        booking: &Booking,
        tour_title: &str,
    ) -> Result<(), BoxError> {
        self.send(
            &self.admin_to,
            admin_notification(booking, tour_title, &self.site_url),
        )
        .await?;
        tracing::info!(reference = %booking.reference_code, "Admin booking notification sent");
        Ok(())
    }

    pub async fn send_status_update(
        &self,
        booking: &Booking,
        tour_title: &str,
    ) -> Result<(), BoxError> {
        self.send(&booking.email, status_update(booking, tour_title, &self.site_url))
            .await?;
        tracing::info!(
            reference = %booking.reference_code,
            status = booking.status.as_str(),
            "Booking status email sent"
        );
        Ok(())
    }

    /// Fire the customer and admin emails concurrently. Failures are logged only.
    pub async fn send_booking_emails(&self, booking: &Booking, tour_title: &str) {
        let (customer, admin) = tokio::join!(
            self.send_customer_confirmation(booking, tour_title),
            self.send_admin_notification(booking, tour_title),
        );
        if let Err(e) = customer {
            tracing::warn!(reference = %booking.reference_code, error = %e, "Failed to send booking confirmation");
        }
        if let Err(e) = admin {
            tracing::warn!(reference = %booking.reference_code, error = %e, "Failed to send admin notification");
        }
    }
}

fn format_money(amount: f64, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}

fn party_line(booking: &Booking) -> String {
    if booking.children > 0 {
        format!("{} adult(s), {} child(ren)", booking.guests, booking.children)
    } else {
        format!("{} adult(s)", booking.guests)
    }
}

fn travel_date_line(booking: &Booking) -> String {
    booking
        .travel_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "to be arranged".into())
}

pub fn customer_confirmation(booking: &Booking, tour_title: &str, site_url: &str) -> EmailMessage {
    EmailMessage {
        subject: format!("Booking received: {} ({})", tour_title, booking.reference_code),
        body: format!(
            "Hi {name},\n\n\
             Thank you for your booking. We will contact you shortly to confirm.\n\n\
             Reference: {reference}\n\
             Tour: {tour_title}\n\
             Travel date: {date}\n\
             Guests: {party}\n\
             Total: {total}\n\n\
             Look up your booking any time at {site_url}/booking/lookup?reference={reference}\n",
            name = booking.name,
            reference = booking.reference_code,
            date = travel_date_line(booking),
            party = party_line(booking),
            total = format_money(booking.total_price, &booking.currency),
        ),
    }
}

pub fn admin_notification(booking: &Booking, tour_title: &str, site_url: &str) -> EmailMessage {
    EmailMessage {
        subject: format!("New booking {} for {}", booking.reference_code, tour_title),
        body: format!(
            "New booking received.\n\n\
             Reference: {reference}\n\
             Tour: {tour_title} (#{tour_id})\n\
             Customer: {name} <{email}>\n\
             Phone: {phone}\n\
             Preferred contact: {contact:?}\n\
             Travel date: {date}\n\
             Guests: {party}\n\
             Total: {total}\n\
             Special requests: {requests}\n\n\
             Manage: {site_url}/admin/bookings/{id}\n",
            reference = booking.reference_code,
            tour_id = booking.tour_id,
            name = booking.name,
            email = booking.email,
            phone = booking.phone.as_deref().unwrap_or("-"),
            contact = booking.contact_method,
            date = travel_date_line(booking),
            party = party_line(booking),
            total = format_money(booking.total_price, &booking.currency),
            requests = booking.special_requests.as_deref().unwrap_or("-"),
            id = booking.id,
        ),
    }
}

pub fn status_update(booking: &Booking, tour_title: &str, site_url: &str) -> EmailMessage {
    let headline = match booking.status {
        BookingStatus::Confirmed => "Your booking is confirmed.",
        BookingStatus::Cancelled => "Your booking has been cancelled.",
        BookingStatus::Pending => "Your booking is pending review.",
    };
    let note = booking
        .admin_note
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(|n| format!("Note from our team: {n}\n\n"))
        .unwrap_or_default();

    EmailMessage {
        subject: format!(
            "Booking {} {}",
            booking.reference_code,
            booking.status.as_str()
        ),
        body: format!(
            "Hi {name},\n\n\
             {headline}\n\n\
             Reference: {reference}\n\
             Tour: {tour_title}\n\
             Travel date: {date}\n\
             Total: {total}\n\n\
             {note}\
             Details: {site_url}/booking/lookup?reference={reference}\n",
            name = booking.name,
            reference = booking.reference_code,
            date = travel_date_line(booking),
            total = format_money(booking.total_price, &booking.currency),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ContactMethod;

    fn booking() -> Booking {
        Booking {
            id: 42,
            tour_id: 7,
            user_id: None,
            reference_code: "BK-250314-7KQ2M".into(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            phone: Some("+66 81 234 5678".into()),
            contact_method: ContactMethod::Whatsapp,
            guests: 2,
            children: 1,
            travel_date: chrono::NaiveDate::from_ymd_opt(2025, 4, 13),
            special_requests: None,
            total_price: 4500.0,
            currency: "THB".into(),
            status: BookingStatus::Pending,
            admin_note: None,
            created_at: 0,
            updated_at: 0,
            tour_title: None,
        }
    }

    #[test]
    fn test_customer_confirmation() {
        let msg = customer_confirmation(&booking(), "Phi Phi Islands", "https://tours.example");
        assert!(msg.subject.contains("BK-250314-7KQ2M"));
        assert!(msg.body.contains("Hi Ana"));
        assert!(msg.body.contains("4500.00 THB"));
        assert!(msg.body.contains("2 adult(s), 1 child(ren)"));
        assert!(msg.body.contains("2025-04-13"));
        assert!(msg
            .body
            .contains("https://tours.example/booking/lookup?reference=BK-250314-7KQ2M"));
    }

    #[test]
    fn test_admin_notification() {
        let msg = admin_notification(&booking(), "Phi Phi Islands", "https://tours.example");
        assert!(msg.body.contains("ana@example.com"));
        assert!(msg.body.contains("Whatsapp"));
        assert!(msg.body.contains("Special requests: -"));
        assert!(msg.body.contains("/admin/bookings/42"));
    }

    #[test]
    fn test_status_update_includes_note() {
        let mut b = booking();
        b.status = BookingStatus::Confirmed;
        b.admin_note = Some("Pickup at 7:30 from your hotel".into());
        let msg = status_update(&b, "Phi Phi Islands", "https://tours.example");
        assert!(msg.subject.ends_with("confirmed"));
        assert!(msg.body.contains("Your booking is confirmed."));
        assert!(msg.body.contains("Pickup at 7:30"));

        b.admin_note = Some("   ".into());
        let msg = status_update(&b, "Phi Phi Islands", "https://tours.example");
        assert!(!msg.body.contains("Note from our team"));
    }

    #[tokio::test]
    async fn test_disabled_service_never_fails() {
        let service = EmailService::disabled("https://tours.example");
        service.send_booking_emails(&booking(), "Phi Phi Islands").await;
        assert!(service
            .send_status_update(&booking(), "Phi Phi Islands")
            .await
            .is_ok());
    }
}
