use stockpin_channel::UserId;
use stockpin_ledger::LedgerStore;
use tokio::sync::Mutex;

use crate::auth::AdminGate;

/// Runs the order and restock workflows against one ledger.
pub struct Dispenser<L> {
    pub(crate) ledger: L,
    pub(crate) gate: AdminGate,
    /// Held from fetch to commit by every workflow.
    pub(crate) guard: Mutex<()>,
}

impl<L: LedgerStore> Dispenser<L> {
    pub fn new(ledger: L, admin: UserId) -> Self {
        Self {
            ledger,
            gate: AdminGate::new(admin),
            guard: Mutex::new(()),
        }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.gate.permits(user)
    }
}
