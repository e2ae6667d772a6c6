use crate::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningState {
    Decoding,
    Ready,
    Signing,
    Succeeded,
    Failed,
    Cancelled,
}

impl SigningState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAction {
    DecodeSucceeded,
    DecodeFailed,
    Confirm,
    SignSucceeded,
    SignFailed,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: SigningState,
    pub to: SigningState,
    pub reason: &'static str,
}

pub fn signing_transition(
    from: SigningState,
    action: SigningAction,
) -> Result<(SigningState, StateTransition), PortError> {
    use SigningAction as A;
    use SigningState as S;

    let (to, reason) = match (from, action) {
        (S::Decoding, A::DecodeSucceeded) => (S::Ready, "decoded"),
        (S::Decoding, A::DecodeFailed) => (S::Failed, "decode_failed"),
        (S::Ready, A::Confirm) => (S::Signing, "user_confirmed"),
        (S::Signing, A::SignSucceeded) => (S::Succeeded, "signed"),
        (S::Signing, A::SignFailed) => (S::Failed, "sign_failed"),
        (S::Decoding | S::Ready, A::Cancel) => (S::Cancelled, "user_cancelled"),
        _ => {
            return Err(PortError::Validation(format!(
                "illegal signing transition: {from:?} --{action:?}"
            )))
        }
    };
    Ok((to, StateTransition { from, to, reason }))
}
