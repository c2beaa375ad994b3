//! Reducer-style state machine primitives.
//!
//! ```text
//! Intent ──→ Reducer ──→ State
//!    ↑                     │
//!    └─────────────────────┘
//! ```
//!
//! - **State**: value describing where a lifecycle currently is
//! - **Intent**: something that happened (an input, a playback transition)
//! - **Reducer**: pure function producing the next state

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::MachineState;
