//! # certify-state — State Primitives
//!
//! The building blocks the managers keep their durable state in.
//!
//! - **Tables** (`store.rs`): one keyed table per entity type (profiles by
//!   id, anchors by address, courses by id, nonces by attester, ...). Tables
//!   are plain values; a manager keeps all of its tables behind one lock so
//!   an operation mutates them together or not at all.
//!
//! - **Roles** (`roles.rs`): the `RoleStore` capability. Administrative
//!   privilege and per-profile membership are both role grants; there is no
//!   separate membership table.
//!
//! - **Events** (`events.rs`): append-only, sequenced, timestamped records
//!   in call order.
//!
//! - **Treasury** (`treasury.rs`): the external holder of native and token
//!   balances, and the full-balance sweep used by fund recovery.

pub mod events;
pub mod roles;
pub mod store;
pub mod treasury;

pub use events::{EventLog, EventRecord};
pub use roles::{RoleId, RoleStore, RoleTable};
pub use store::Table;
pub use treasury::{sweep, Asset, InMemoryTreasury, Treasury};
