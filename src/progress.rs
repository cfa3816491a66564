use std::sync::Mutex;

use tokio::sync::mpsc;

/// Snapshot of install progress. `max == 0` means indeterminate. Each
/// snapshot supersedes the previous one; observers do not need history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub current: u64,
    pub max: u64,
    pub label: String,
}

/// Everything the launcher reports to its observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LauncherEvent {
    Progress(ProgressState),
    Busy(bool),
}

/// One notification from the installer. The install contract exposes three
/// independent kinds (status text, current value, maximum) rather than a
/// combined struct; [`ProgressCoalescer`] folds them back together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallEvent {
    StatusChanged(String),
    ProgressChanged(u64),
    MaxChanged(u64),
}

/// Folds [`InstallEvent`]s into [`ProgressState`] snapshots. A label-only
/// update keeps the last seen current/max values, and vice versa.
#[derive(Debug, Default)]
pub struct ProgressCoalescer {
    state: ProgressState,
}

impl ProgressCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: InstallEvent) -> ProgressState {
        match event {
            InstallEvent::StatusChanged(label) => self.state.label = label,
            InstallEvent::ProgressChanged(current) => self.state.current = current,
            InstallEvent::MaxChanged(max) => self.state.max = max,
        }
        self.state.clone()
    }
}

/// Token returned by [`ProgressChannel::subscribe`], used to detach.
#[derive(Debug, PartialEq, Eq)]
pub struct SubscriptionHandle(u64);

struct Registry {
    next_id: u64,
    subscribers: Vec<(u64, mpsc::UnboundedSender<LauncherEvent>)>,
}

/// Fan-out conduit between the launch worker and any number of observers.
///
/// Emission never blocks: events go out over unbounded channels, and with no
/// subscribers attached they are simply dropped. Observers attached later only
/// see events from their attach point forward. Each observer receives events
/// in emission order.
pub struct ProgressChannel {
    registry: Mutex<Registry>,
}

impl ProgressChannel {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                next_id: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Attach an observer. Delivery happens over the returned channel, so
    /// observer code never runs under the registry lock and may call
    /// `subscribe`/`unsubscribe` freely while handling an event.
    pub fn subscribe(&self) -> (SubscriptionHandle, mpsc::UnboundedReceiver<LauncherEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.registry.lock().unwrap();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push((id, tx));
        (SubscriptionHandle(id), rx)
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut registry = self.registry.lock().unwrap();
        registry.subscribers.retain(|(id, _)| *id != handle.0);
    }

    pub fn emit_progress(&self, state: ProgressState) {
        self.emit(LauncherEvent::Progress(state));
    }

    pub fn emit_busy(&self, active: bool) {
        self.emit(LauncherEvent::Busy(active));
    }

    fn emit(&self, event: LauncherEvent) {
        let mut registry = self.registry.lock().unwrap();
        // Dropped receivers are pruned here rather than on unsubscribe,
        // so an observer that just goes away does not leak a sender.
        registry
            .subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }
}

impl Default for ProgressChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coalescer_retains_other_fields() {
        let mut coalescer = ProgressCoalescer::new();

        let state = coalescer.apply(InstallEvent::StatusChanged("Downloading".to_string()));
        assert_eq!(state.label, "Downloading");
        assert_eq!((state.current, state.max), (0, 0));

        let state = coalescer.apply(InstallEvent::MaxChanged(100));
        assert_eq!(state.label, "Downloading");
        assert_eq!((state.current, state.max), (0, 100));

        let state = coalescer.apply(InstallEvent::ProgressChanged(42));
        assert_eq!(state.label, "Downloading");
        assert_eq!((state.current, state.max), (42, 100));

        // A label change must not reset the numeric fields.
        let state = coalescer.apply(InstallEvent::StatusChanged("Verifying".to_string()));
        assert_eq!(state.label, "Verifying");
        assert_eq!((state.current, state.max), (42, 100));
    }

    #[tokio::test]
    async fn test_events_arrive_in_emission_order() {
        let channel = ProgressChannel::new();
        let (_handle, mut rx) = channel.subscribe();

        channel.emit_busy(true);
        for i in 1..=3 {
            channel.emit_progress(ProgressState {
                current: i,
                max: 3,
                label: String::new(),
            });
        }
        channel.emit_busy(false);

        assert_eq!(rx.recv().await, Some(LauncherEvent::Busy(true)));
        for i in 1..=3 {
            match rx.recv().await {
                Some(LauncherEvent::Progress(state)) => assert_eq!(state.current, i),
                other => panic!("unexpected event: {:?}", other),
            }
        }
        assert_eq!(rx.recv().await, Some(LauncherEvent::Busy(false)));
    }

    #[tokio::test]
    async fn test_no_buffering_before_subscribe() {
        let channel = ProgressChannel::new();
        channel.emit_busy(true);

        let (_handle, mut rx) = channel.subscribe();
        channel.emit_busy(false);

        // Only the post-subscribe event is visible.
        assert_eq!(rx.recv().await, Some(LauncherEvent::Busy(false)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let channel = ProgressChannel::new();
        let (handle, mut rx) = channel.subscribe();

        channel.emit_busy(true);
        channel.unsubscribe(handle);
        channel.emit_busy(false);

        assert_eq!(rx.recv().await, Some(LauncherEvent::Busy(true)));
        assert_eq!(rx.recv().await, None);
    }
}
