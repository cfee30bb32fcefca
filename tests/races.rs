mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use common::{offload_pool, Detail, Event, EventTx, ManualSingle, Probe, Recorder};
use sigflow::{ExecutorRef, SignalError, SignalKind, Single, Stream, StreamSubscriber, SubscriptionRef};

#[test]
fn test_cancel_racing_terminal_yields_one_outcome() {
    let executor: ExecutorRef = offload_pool();

    for _ in 0..200 {
        let (mut probe, tx) = Probe::new();
        let source = ManualSingle::new(tx.clone());
        let (recorder, handle) = Recorder::new(tx, 0);
        Single::new(source.clone())
            .publish_on(Arc::clone(&executor))
            .subscribe(recorder);
        probe.take(2);

        let barrier = Arc::new(Barrier::new(2));
        let gate = Arc::clone(&barrier);
        let terminal = thread::spawn(move || {
            gate.wait();
            source.succeed(1)
        });
        barrier.wait();
        handle.cancel();
        let succeeded = terminal.join().expect("terminal thread");

        // The cancel always reaches the source; the success only if it won.
        let events = probe.take(if succeeded { 2 } else { 1 });
        probe.assert_quiet();
        assert_eq!(
            events.iter().filter(|event| event.kind == SignalKind::Cancel).count(),
            1,
            "{events:?}"
        );
        let terminals: Vec<&Event> = events.iter().filter(|event| event.kind.is_terminal()).collect();
        if succeeded {
            assert_eq!(terminals.len(), 1, "terminal lost: {events:?}");
            assert_eq!(terminals[0].detail, Detail::Value(1));
        } else {
            assert!(terminals.is_empty(), "terminal after cancel: {events:?}");
        }
    }
}

/// Checks order and non-overlap of `on_next`, reports the terminal to the probe.
struct Sequencer {
    expected: i32,
    busy: Arc<AtomicBool>,
    tx: EventTx,
    subscription: Arc<parking_lot::Mutex<Option<SubscriptionRef>>>,
}

impl StreamSubscriber<i32> for Sequencer {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        *self.subscription.lock() = Some(subscription);
        let _ = self.tx.send(Event::here(SignalKind::OnSubscribe, Detail::None));
    }

    fn on_next(&mut self, item: i32) {
        assert!(!self.busy.swap(true, Ordering::SeqCst), "overlapping on_next");
        assert_eq!(item, self.expected, "out of order");
        self.expected += 1;
        thread::yield_now();
        self.busy.store(false, Ordering::SeqCst);
    }

    fn on_complete(&mut self) {
        let detail = Detail::Value(self.expected);
        let _ = self.tx.send(Event::here(SignalKind::OnComplete, detail));
    }

    fn on_error(&mut self, error: SignalError) {
        let _ = self.tx.send(Event::here(SignalKind::OnError, Detail::Error(error)));
    }
}

#[test]
fn test_publish_on_keeps_elements_ordered_under_concurrent_requests() {
    let executor: ExecutorRef = offload_pool();
    let (mut probe, tx) = Probe::new();
    let subscription = Arc::new(parking_lot::Mutex::new(None));

    Stream::from_iter(0..1000)
        .publish_on(executor)
        .subscribe(Sequencer {
            expected: 0,
            busy: Arc::new(AtomicBool::new(false)),
            tx,
            subscription: Arc::clone(&subscription),
        });
    assert_eq!(probe.next().kind, SignalKind::OnSubscribe);

    let handle: SubscriptionRef = subscription.lock().clone().expect("subscribed");
    let requesters: Vec<_> = (0..4)
        .map(|_| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                for _ in 0..250 {
                    handle.request(1);
                }
            })
        })
        .collect();
    for requester in requesters {
        requester.join().expect("requester");
    }

    let terminal = probe.next();
    assert_eq!(terminal.kind, SignalKind::OnComplete);
    assert_eq!(terminal.detail, Detail::Value(1000));
    probe.assert_quiet();
}
