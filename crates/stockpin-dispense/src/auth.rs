use stockpin_channel::UserId;

/// Authorization for administrative operations: one configured identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdminGate {
    admin: UserId,
}

impl AdminGate {
    pub fn new(admin: UserId) -> Self {
        Self { admin }
    }

    pub fn permits(&self, user: UserId) -> bool {
        user == self.admin
    }
}
