//! Base trait for machine state.

/// Marker trait for state objects.
///
/// States should be:
/// - Cloneable, so a transition can be compared with what came before
/// - Self-contained (everything the next transition needs)
/// - Comparable (PartialEq for asserting transitions)
pub trait MachineState: Clone + PartialEq + Default + Send + 'static {}
