#![forbid(unsafe_code)]

//! Feed reconciliation and animation orchestration for a live card wall.
//!
//! The runtime turns the `cardwall-core` data model into a running engine:
//! a pure reducer ([`WallModel`]) advanced one [`Msg`] at a time, with
//! every side effect ([`Effect`]) executed by the surrounding machinery.
//! Two drivers share the reducer:
//!
//! - [`Engine`] - the live one: fetches on worker threads, one-shot timer
//!   threads, declaratively reconciled interval/push subscriptions, all
//!   funnelled into one message channel.
//! - [`WallSimulator`] - the deterministic one: virtual clock, inspectable
//!   pending fetches, scripted interleavings. The integration tests live
//!   on it.
//!
//! Backends plug in through the [`Persistence`] and [`AssetLoader`] traits;
//! [`InMemoryPersistence`] ships for tests and demos.

pub mod arrival;
pub mod cancellation;
pub mod carousel;
pub mod effect;
pub mod engine;
pub mod memory;
pub mod model;
pub mod msg;
pub mod pagination;
pub mod persistence;
pub mod simulator;
pub mod splitter;
pub mod subscription;
mod timer;

pub use arrival::ArrivalQueue;
pub use cancellation::{CancellationSource, CancellationToken};
pub use carousel::{Advance, CarouselScheduler};
pub use effect::Effect;
pub use engine::{Engine, WallHandle};
pub use memory::InMemoryPersistence;
pub use model::{WallModel, WallSnapshot};
pub use msg::{Msg, TimerKind};
pub use pagination::PaginationLoader;
pub use persistence::{AssetLoader, InsertCallback, NullAssetLoader, Persistence, Unsubscribe};
pub use simulator::{FetchRequest, WallSimulator};
pub use splitter::ViewportSplitter;
pub use subscription::{Every, PushFeed, SubId, Subscription};
