//! Subscriber and subscription contracts.
//!
//! ## Contents
//! - [`StreamSubscriber`], [`SingleSubscriber`], [`CompletionSubscriber`] callbacks per source variant
//! - [`Subscription`] (`request` + `cancel`) and [`Cancellable`] (`cancel`) handles
//! - [`Lifecycle`] and [`Demand`] building blocks for custom sources
//!
//! ## Handle per variant
//! ```text
//! Stream<T>   ──on_subscribe(SubscriptionRef)──► StreamSubscriber<T>
//! Single<T>   ──on_subscribe(CancellableRef)───► SingleSubscriber<T>
//! Completion  ──on_subscribe(CancellableRef)───► CompletionSubscriber
//! ```

mod contract;
mod lifecycle;

pub use contract::{
    Cancellable, CancellableRef, CompletionSubscriber, EmptySubscription, SingleSubscriber,
    StreamSubscriber, Subscription, SubscriptionRef,
};
pub use lifecycle::{Demand, Lifecycle};

pub(crate) use contract::{CancelOnly, CancelVia};
