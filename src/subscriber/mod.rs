//! Subscribers and the default projection routine.

mod subscriber;

pub use subscriber::{project, Projection, Subscriber, SubscriberRecord, SubscriptionId};
