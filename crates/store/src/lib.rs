//! In-process state for the ordering assistant: customer profiles, live carts and the order
//! ledger. Everything lives for the lifetime of the process.

pub mod repositories;

pub use repositories::{
    CartStore, InMemoryCartStore, InMemoryOrderLedger, InMemoryProfileStore, OrderLedger,
    ProfileStore, StoreError,
};
