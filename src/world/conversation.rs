use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// An in-progress dialogue (NPC talk, trade prompt). Whoever drives it polls
/// [`Conversation::is_cancelled`] between steps; logout and movement cancel it.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: Uuid,
    partner: String,
    cancelled: Arc<AtomicBool>,
}

impl Conversation {
    pub fn new(partner: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            partner: partner.to_string(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn partner(&self) -> &str {
        &self.partner
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
