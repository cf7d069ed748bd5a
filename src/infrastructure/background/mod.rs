//! Background recording sessions

mod inhibit;
mod noop;

pub use inhibit::InhibitBackgroundSession;
pub use noop::NoopBackgroundSession;

use tokio::time::Duration;

use crate::application::ports::{BackgroundSession, Notifier};

/// Create the background session for the configured mode
pub fn create_background_session(
    enabled: bool,
    wake_lock_minutes: u64,
    notifier: Option<Box<dyn Notifier>>,
) -> Box<dyn BackgroundSession> {
    if !enabled {
        return Box::new(NoopBackgroundSession::new());
    }

    let ceiling = Duration::from_secs(wake_lock_minutes.saturating_mul(60));
    let session = InhibitBackgroundSession::new(ceiling);
    match notifier {
        Some(notifier) => Box::new(session.with_notifier(notifier)),
        None => Box::new(session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_mode_holds_nothing() {
        let mut session = create_background_session(false, 10, None);
        session.activate().await.unwrap();
        assert!(session.is_active());
        session.deactivate().await.unwrap();
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn huge_ceiling_does_not_overflow() {
        let session = create_background_session(true, u64::MAX / 30, None);
        assert!(!session.is_active());
    }
}
