//! Benchmark utilities.

use apo_codec::impl_record;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// A representative record payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event identifier.
    pub id: u64,
    /// Free-form label.
    pub label: String,
    /// Opaque body.
    pub body: Vec<u8>,
    /// Parent event, if any.
    pub parent: Option<u64>,
}

impl_record!(Event {
    id,
    label,
    body,
    parent
});

/// Generate random bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate a random alphanumeric label.
pub fn random_label(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate events with bodies of the specified size.
pub fn generate_events(count: usize, body_size: usize) -> Vec<Event> {
    let mut rng = rand::thread_rng();
    (0..count as u64)
        .map(|id| Event {
            id,
            label: random_label(12),
            body: random_data(body_size),
            parent: rng.gen_bool(0.5).then(|| id.saturating_sub(1)),
        })
        .collect()
}
