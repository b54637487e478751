//! Per-visit in-flight slot.
//!
//! A visit admits one guarded action at a time. Claiming the slot yields an
//! [`InFlightToken`]; dropping the token frees the slot. The token lives
//! inside the action's future, so the slot is released when the action
//! settles and also when the caller drops the future half-way.

use crate::visit::ActionKind;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub(crate) struct InFlightSlot {
    current: Mutex<Option<ActionKind>>,
}

impl InFlightSlot {
    fn lock(&self) -> MutexGuard<'_, Option<ActionKind>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the slot for `action`, or report the action already holding it.
    pub(crate) fn try_claim(&self, action: ActionKind) -> Result<InFlightToken<'_>, ActionKind> {
        let mut current = self.lock();
        if let Some(pending) = *current {
            return Err(pending);
        }
        *current = Some(action);
        Ok(InFlightToken { slot: self })
    }

    pub(crate) fn current(&self) -> Option<ActionKind> {
        *self.lock()
    }
}

/// Proof that the holder owns a visit's in-flight slot.
#[derive(Debug)]
pub(crate) struct InFlightToken<'a> {
    slot: &'a InFlightSlot,
}

impl Drop for InFlightToken<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_sees_the_pending_action() {
        let slot = InFlightSlot::default();
        let _token = slot.try_claim(ActionKind::CheckIn).unwrap();

        assert_eq!(slot.current(), Some(ActionKind::CheckIn));
        assert_eq!(
            slot.try_claim(ActionKind::Cancel).unwrap_err(),
            ActionKind::CheckIn
        );
    }

    #[test]
    fn dropping_the_token_frees_the_slot() {
        let slot = InFlightSlot::default();
        {
            let _token = slot.try_claim(ActionKind::CheckOut).unwrap();
        }
        assert_eq!(slot.current(), None);
        assert!(slot.try_claim(ActionKind::CheckOut).is_ok());
    }
}
