//! Microphone permission gate

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::events::PendingStart;

use super::ports::{MicrophonePermission, PermissionStatus};

/// Answer to an OS permission prompt, together with the start it guards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionOutcome {
    pub granted: bool,
    pub pending: PendingStart,
}

/// A permission prompt waiting for the user.
/// The owner drives it to completion and feeds the outcome back through
/// [`PermissionGate::prompt_resolved`].
pub type PermissionPrompt = Pin<Box<dyn Future<Output = PermissionOutcome> + Send>>;

/// What to do with a start request
pub enum GateDecision {
    /// Permission is held; start recording now
    Granted(PendingStart),
    /// Permission is refused; cancel the start
    Denied(PendingStart),
    /// The user is being asked
    Prompting(PermissionPrompt),
    /// Another prompt is already on screen; the request is dropped
    Busy,
}

impl std::fmt::Debug for GateDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Granted(p) => f.debug_tuple("Granted").field(p).finish(),
            Self::Denied(p) => f.debug_tuple("Denied").field(p).finish(),
            Self::Prompting(_) => f.write_str("Prompting"),
            Self::Busy => f.write_str("Busy"),
        }
    }
}

/// Checks the microphone permission before idle -> recording
pub struct PermissionGate<P>
where
    P: MicrophonePermission + 'static,
{
    permission: Arc<P>,
    prompt_pending: bool,
}

impl<P> PermissionGate<P>
where
    P: MicrophonePermission + 'static,
{
    pub fn new(permission: P) -> Self {
        Self {
            permission: Arc::new(permission),
            prompt_pending: false,
        }
    }

    /// Whether a prompt is on screen
    pub fn is_prompt_pending(&self) -> bool {
        self.prompt_pending
    }

    /// Decide whether `pending` may start.
    ///
    /// A status query error counts as a denial.
    pub async fn request_start_permission(&mut self, pending: PendingStart) -> GateDecision {
        if self.prompt_pending {
            info!(id = ?pending.id, "Start rejected: permission prompt already pending");
            return GateDecision::Busy;
        }

        let status = match self.permission.status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Permission query failed; treating as denied");
                return GateDecision::Denied(pending);
            }
        };
        debug!(%status, "Microphone permission");

        match status {
            PermissionStatus::Granted => GateDecision::Granted(pending),
            PermissionStatus::Denied => GateDecision::Denied(pending),
            PermissionStatus::Undetermined => {
                self.prompt_pending = true;
                let permission = Arc::clone(&self.permission);
                GateDecision::Prompting(Box::pin(async move {
                    let granted = match permission.request().await {
                        Ok(granted) => granted,
                        Err(e) => {
                            warn!(error = %e, "Permission prompt failed; treating as denied");
                            false
                        }
                    };
                    PermissionOutcome { granted, pending }
                }))
            }
        }
    }

    /// Consume the outcome of a prompt started by `request_start_permission`
    pub fn prompt_resolved(&mut self, outcome: PermissionOutcome) -> GateDecision {
        self.prompt_pending = false;
        if outcome.granted {
            info!("Microphone permission granted");
            GateDecision::Granted(outcome.pending)
        } else {
            info!("Microphone permission denied");
            GateDecision::Denied(outcome.pending)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::PermissionError;
    use async_trait::async_trait;

    struct FixedPermission {
        status: Result<PermissionStatus, PermissionError>,
        answer: bool,
    }

    #[async_trait]
    impl MicrophonePermission for FixedPermission {
        async fn status(&self) -> Result<PermissionStatus, PermissionError> {
            self.status.clone()
        }

        async fn request(&self) -> Result<bool, PermissionError> {
            Ok(self.answer)
        }
    }

    fn gate(status: PermissionStatus, answer: bool) -> PermissionGate<FixedPermission> {
        PermissionGate::new(FixedPermission {
            status: Ok(status),
            answer,
        })
    }

    fn pending() -> PendingStart {
        PendingStart::new(Some("abc".into()), None)
    }

    #[tokio::test]
    async fn granted_decides_without_prompt() {
        let mut gate = gate(PermissionStatus::Granted, false);
        match gate.request_start_permission(pending()).await {
            GateDecision::Granted(p) => assert_eq!(p.id.as_deref(), Some("abc")),
            other => panic!("unexpected decision: {:?}", other),
        }
        assert!(!gate.is_prompt_pending());
    }

    #[tokio::test]
    async fn denied_carries_pending() {
        let mut gate = gate(PermissionStatus::Denied, true);
        match gate.request_start_permission(pending()).await {
            GateDecision::Denied(p) => assert_eq!(p.id.as_deref(), Some("abc")),
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[tokio::test]
    async fn query_error_is_denial() {
        let mut gate = PermissionGate::new(FixedPermission {
            status: Err(PermissionError::QueryFailed("no backend".into())),
            answer: true,
        });
        assert!(matches!(
            gate.request_start_permission(pending()).await,
            GateDecision::Denied(_)
        ));
    }

    #[tokio::test]
    async fn undetermined_prompts_then_grants() {
        let mut gate = gate(PermissionStatus::Undetermined, true);
        let prompt = match gate.request_start_permission(pending()).await {
            GateDecision::Prompting(prompt) => prompt,
            other => panic!("unexpected decision: {:?}", other),
        };
        assert!(gate.is_prompt_pending());

        let outcome = prompt.await;
        assert!(outcome.granted);
        assert!(matches!(gate.prompt_resolved(outcome), GateDecision::Granted(_)));
        assert!(!gate.is_prompt_pending());
    }

    #[tokio::test]
    async fn prompt_refusal_denies() {
        let mut gate = gate(PermissionStatus::Undetermined, false);
        let GateDecision::Prompting(prompt) = gate.request_start_permission(pending()).await else {
            panic!("expected a prompt");
        };
        let outcome = prompt.await;
        match gate.prompt_resolved(outcome) {
            GateDecision::Denied(p) => assert_eq!(p.id.as_deref(), Some("abc")),
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[tokio::test]
    async fn second_request_while_prompting_is_busy() {
        let mut gate = gate(PermissionStatus::Undetermined, true);
        let _prompt = gate.request_start_permission(pending()).await;
        assert!(matches!(
            gate.request_start_permission(pending()).await,
            GateDecision::Busy
        ));
    }

    /// Status that only answers after yielding to the scheduler
    struct YieldingPermission;

    #[async_trait]
    impl MicrophonePermission for YieldingPermission {
        async fn status(&self) -> Result<PermissionStatus, PermissionError> {
            tokio::task::yield_now().await;
            Ok(PermissionStatus::Granted)
        }

        async fn request(&self) -> Result<bool, PermissionError> {
            Ok(true)
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn status_query_does_not_hold_the_runtime() {
        let ran = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = std::sync::Arc::clone(&ran);
        let other = tokio::spawn(async move {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        });

        let mut gate = PermissionGate::new(YieldingPermission);
        let decision = gate.request_start_permission(pending()).await;

        assert!(matches!(decision, GateDecision::Granted(_)));
        assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
        other.await.unwrap();
    }
}
