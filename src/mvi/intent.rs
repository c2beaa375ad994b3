//! Base trait for intents.

/// Marker trait for intent objects.
///
/// Intents represent events arriving at the coordinator: keypresses,
/// playback transitions, shutdown requests.
pub trait Intent: Send + 'static {}
