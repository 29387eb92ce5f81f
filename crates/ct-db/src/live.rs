//! Live tracker snapshots.
//!
//! Every write publishes a full, immutable snapshot of the owner's trackers
//! to that owner's subscriptions. Consumers replace their state wholesale on
//! each snapshot, so each owner has one `watch` channel that only ever holds
//! the newest snapshot. A [`Subscription`] is cancelled by calling
//! [`Subscription::unsubscribe`] or by dropping it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ct_core::{OwnerId, Tracker};
use tokio::sync::watch;

/// One owner's trackers at a point in time, ordered by creation.
pub type Snapshot = Arc<[Tracker]>;

/// Per-owner snapshot channels.
#[derive(Default, Clone)]
pub(crate) struct SnapshotHub {
    channels: Arc<Mutex<HashMap<OwnerId, watch::Sender<Snapshot>>>>,
}

type Channels = HashMap<OwnerId, watch::Sender<Snapshot>>;

impl SnapshotHub {
    fn lock(&self) -> MutexGuard<'_, Channels> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(&self, owner: OwnerId, initial: Snapshot) -> Subscription {
        let mut channels = self.lock();
        let receiver = match channels.get(&owner) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = watch::channel(Arc::clone(&initial));
                channels.insert(owner.clone(), sender);
                receiver
            }
        };
        tracing::debug!(owner = %owner, "subscribed");

        Subscription {
            owner,
            receiver,
            current: initial,
        }
    }

    /// Distinct owners with at least one live subscription.
    ///
    /// Channels whose subscriptions are all gone are dropped here.
    pub(crate) fn owners(&self) -> Vec<OwnerId> {
        let mut channels = self.lock();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        let mut owners: Vec<OwnerId> = channels.keys().cloned().collect();
        owners.sort();
        owners
    }

    pub(crate) fn has_subscribers(&self, owner: &OwnerId) -> bool {
        self.lock()
            .get(owner)
            .is_some_and(|sender| sender.receiver_count() > 0)
    }

    /// Replaces the latest snapshot for `owner`. Returns how many
    /// subscriptions will see it.
    pub(crate) fn publish(&self, owner: &OwnerId, snapshot: &Snapshot) -> usize {
        let mut channels = self.lock();
        let Some(sender) = channels.get(owner) else {
            return 0;
        };
        let receivers = sender.receiver_count();
        if receivers == 0 {
            tracing::debug!(owner = %owner, "dropping channel without subscribers");
            channels.remove(owner);
            return 0;
        }
        sender.send_replace(Arc::clone(snapshot));
        receivers
    }
}

/// A cancellable stream of snapshots for one owner.
pub struct Subscription {
    owner: OwnerId,
    receiver: watch::Receiver<Snapshot>,
    current: Snapshot,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("owner", &self.owner)
            .field("trackers", &self.current.len())
            .finish_non_exhaustive()
    }
}

impl Subscription {
    pub const fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// The most recently received snapshot.
    pub const fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Takes the newest published snapshot, if there is one this
    /// subscription has not seen yet.
    ///
    /// Returns `true` if anything new arrived.
    pub fn poll(&mut self) -> bool {
        if !self.receiver.has_changed().unwrap_or(false) {
            return false;
        }
        self.current = Arc::clone(&self.receiver.borrow_and_update());
        true
    }

    /// Stops delivery. Later publications never reach this subscription.
    pub fn unsubscribe(self) {
        tracing::debug!(owner = %self.owner, "unsubscribed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(id: &str) -> OwnerId {
        OwnerId::new(id).unwrap()
    }

    fn empty() -> Snapshot {
        Arc::from(Vec::new())
    }

    #[test]
    fn publish_reaches_only_matching_owner() {
        let hub = SnapshotHub::default();
        let mut alice = hub.register(owner("alice"), empty());
        let mut bob = hub.register(owner("bob"), empty());

        assert_eq!(hub.publish(&owner("alice"), &empty()), 1);
        assert!(alice.poll());
        assert!(!alice.poll());
        assert!(!bob.poll());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let hub = SnapshotHub::default();
        let sub = hub.register(owner("alice"), empty());
        assert!(hub.has_subscribers(&owner("alice")));

        sub.unsubscribe();
        assert!(!hub.has_subscribers(&owner("alice")));
        assert_eq!(hub.publish(&owner("alice"), &empty()), 0);
        assert!(hub.owners().is_empty());
    }

    #[test]
    fn owners_are_distinct() {
        let hub = SnapshotHub::default();
        let _a1 = hub.register(owner("alice"), empty());
        let _a2 = hub.register(owner("alice"), empty());
        let _b = hub.register(owner("bob"), empty());

        assert_eq!(hub.owners(), vec![owner("alice"), owner("bob")]);
        assert_eq!(hub.publish(&owner("alice"), &empty()), 2);
    }

    #[test]
    fn unpolled_subscription_keeps_only_newest_snapshot() {
        let hub = SnapshotHub::default();
        let mut sub = hub.register(owner("alice"), empty());

        let published: Vec<Snapshot> = (0..1000).map(|_| empty()).collect();
        for snapshot in &published {
            hub.publish(&owner("alice"), snapshot);
        }
        let retained = published[..999]
            .iter()
            .filter(|snapshot| Arc::strong_count(snapshot) > 1)
            .count();
        assert_eq!(retained, 0);

        assert!(sub.poll());
        assert!(Arc::ptr_eq(sub.current(), &published[999]));
    }

    #[test]
    fn subscription_outliving_hub_drops_cleanly() {
        let hub = SnapshotHub::default();
        let mut sub = hub.register(owner("alice"), empty());
        drop(hub);
        assert!(!sub.poll());
        drop(sub);
    }
}
