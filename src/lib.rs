//! graspworld: a schema-based model of primate reach-grasp-eat behavior.
//!
//! The world is a small 2D workspace (food, mouth, paw, a tube that can hold
//! the food). Behavior is a fixed repertoire of guarded production rules
//! ("schemas"): each schema has a pure geometric precondition over the world
//! state and an effect that mutates it and emits a reward. An agent drives
//! one schema per step; the resulting (before, after, action, reward)
//! transitions feed an external mirror-system classifier.

#[path = "core/position.rs"]
pub mod position;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/environment.rs"]
pub mod environment;

#[path = "core/schema.rs"]
pub mod schema;

#[path = "core/agent.rs"]
pub mod agent;

// Transition records and on-disk containers need serde.
#[cfg(feature = "serde")]
#[path = "core/dataset.rs"]
pub mod dataset;
