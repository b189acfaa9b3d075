use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use handoff_channel::{
    CancellationToken, CloseError, RecvError, RecvTimeoutError, SendError, SendTimeoutError,
    TryRecvError, TrySendError, bounded,
};
use pretty_assertions::assert_eq;

const SETTLE: Duration = Duration::from_millis(50);

#[test_log::test]
fn send_blocks_at_capacity_until_a_value_is_received() {
    let (tx, rx) = bounded(2);
    tx.send(0).unwrap();
    tx.send(1).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let blocked = {
        let tx = tx.clone();
        let done = done.clone();
        thread::spawn(move || {
            tx.send(2).unwrap();
            done.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(SETTLE);
    assert!(!done.load(Ordering::SeqCst));
    assert_eq!(tx.len(), 2);

    assert_eq!(rx.recv(), Ok(0));
    blocked.join().unwrap();

    assert!(done.load(Ordering::SeqCst));
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![1, 2]);
}

#[test_log::test]
fn capacity_three_scenario_drains_two_three_four() {
    let (tx, rx) = bounded(3);

    for i in 1..=3 {
        tx.try_send(i).unwrap();
    }
    assert_eq!(tx.try_send(4), Err(TrySendError::Full(4)));

    let pending = {
        let tx = tx.clone();
        thread::spawn(move || tx.send(4))
    };

    thread::sleep(SETTLE);
    assert!(!pending.is_finished());

    assert_eq!(rx.recv(), Ok(1));
    pending.join().unwrap().unwrap();

    tx.close().unwrap();
    assert_eq!(rx.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
}

#[test_log::test]
fn close_allows_exactly_the_buffered_values_to_drain() {
    let (tx, rx) = bounded(8);

    for i in 0..5 {
        tx.send(i).unwrap();
    }
    tx.close().unwrap();

    for i in 0..5 {
        assert_eq!(rx.recv(), Ok(i));
    }
    assert_eq!(rx.recv(), Err(RecvError::Closed));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Closed));
}

#[test_log::test]
fn send_after_close_fails_and_keeps_buffered_values() {
    let (tx, rx) = bounded(4);

    tx.send("a").unwrap();
    tx.send("b").unwrap();
    tx.close().unwrap();

    let err = tx.send("c").unwrap_err();
    assert!(err.is_closed());
    assert_eq!(err.into_inner(), "c");
    assert_eq!(tx.try_send("d"), Err(TrySendError::Closed("d")));

    assert_eq!(rx.len(), 2);
    assert_eq!(rx.iter().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test_log::test]
fn closing_twice_is_rejected_without_changing_state() {
    let (tx, rx) = bounded(2);

    tx.send(10).unwrap();
    tx.close().unwrap();

    assert_eq!(tx.close(), Err(CloseError::AlreadyClosed));
    assert!(rx.is_closed());
    assert_eq!(rx.recv(), Ok(10));
    assert_eq!(rx.recv(), Err(RecvError::Closed));
}

#[test_log::test]
fn close_wakes_blocked_receivers() {
    let (tx, rx) = bounded::<u8>(1);

    let receivers: Vec<_> = (0..3)
        .map(|_| {
            let rx = rx.clone();
            thread::spawn(move || rx.recv())
        })
        .collect();

    thread::sleep(SETTLE);
    tx.close().unwrap();

    for receiver in receivers {
        assert_eq!(receiver.join().unwrap(), Err(RecvError::Closed));
    }
}

#[test_log::test]
fn close_fails_blocked_senders_with_their_value() {
    let (tx, rx) = bounded(1);
    tx.send(1).unwrap();

    let blocked = {
        let tx = tx.clone();
        thread::spawn(move || tx.send(2))
    };

    thread::sleep(SETTLE);
    tx.close().unwrap();

    assert_eq!(blocked.join().unwrap(), Err(SendError::Closed(2)));
    assert_eq!(rx.iter().collect::<Vec<_>>(), vec![1]);
}

#[test_log::test]
fn dropping_every_sender_closes_the_queue() {
    let (tx, rx) = bounded(2);
    let tx2 = tx.clone();

    tx.send(1).unwrap();
    drop(tx);
    assert!(!rx.is_closed());

    tx2.send(2).unwrap();
    drop(tx2);

    assert!(rx.is_closed());
    assert_eq!(rx.iter().collect::<Vec<_>>(), vec![1, 2]);
}

#[test_log::test]
fn dropping_every_receiver_disconnects_the_queue() {
    let (tx, rx) = bounded(2);

    drop(rx);

    assert!(tx.is_disconnected());
    assert_eq!(tx.send(5), Err(SendError::Disconnected(5)));
    assert_eq!(tx.try_send(6), Err(TrySendError::Disconnected(6)));
}

#[test_log::test]
fn concurrent_handoff_delivers_every_value_exactly_once() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 4;
    const PER_PRODUCER: usize = 500;

    let (tx, rx) = bounded::<(usize, usize)>(8);

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let rx = rx.clone();
            thread::spawn(move || rx.iter().collect::<Vec<_>>())
        })
        .collect();
    drop(rx);

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let tx = tx.clone();
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    tx.send((producer, seq)).unwrap();
                }
            })
        })
        .collect();
    drop(tx);

    for producer in producers {
        producer.join().unwrap();
    }

    let mut all = vec![];
    for consumer in consumers {
        let received = consumer.join().unwrap();

        let mut last_seen: BTreeMap<usize, usize> = BTreeMap::new();
        for &(producer, seq) in &received {
            if let Some(&last) = last_seen.get(&producer) {
                assert!(seq > last, "producer {producer} out of order: {last} then {seq}");
            }
            last_seen.insert(producer, seq);
        }

        all.extend(received);
    }

    all.sort_unstable();
    let expected: Vec<_> = (0..PRODUCERS)
        .flat_map(|producer| (0..PER_PRODUCER).map(move |seq| (producer, seq)))
        .collect();

    assert_eq!(all, expected);
}

#[test_log::test]
fn rendezvous_send_waits_for_a_receiver() {
    let (tx, rx) = bounded(0);
    let done = Arc::new(AtomicBool::new(false));

    let sender = {
        let done = done.clone();
        thread::spawn(move || {
            tx.send(99).unwrap();
            done.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(SETTLE);
    assert!(!done.load(Ordering::SeqCst));
    assert_eq!(rx.len(), 0);

    assert_eq!(rx.recv(), Ok(99));
    sender.join().unwrap();
    assert!(done.load(Ordering::SeqCst));
}

#[test_log::test]
fn rendezvous_try_send_needs_a_blocked_receiver() {
    let (tx, rx) = bounded(0);

    assert_eq!(tx.try_send(1), Err(TrySendError::Full(1)));

    let receiver = thread::spawn(move || rx.recv());

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match tx.try_send(2) {
            Ok(()) => break,
            Err(TrySendError::Full(_)) if Instant::now() < deadline => {
                thread::sleep(Duration::from_millis(1));
            }
            Err(e) => panic!("unexpected try_send failure: {e}"),
        }
    }

    assert_eq!(receiver.join().unwrap(), Ok(2));
}

#[test_log::test]
fn rendezvous_send_timeout_withdraws_the_offer() {
    let (tx, rx) = bounded(0);

    let err = tx.send_timeout(7, Duration::from_millis(20)).unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.into_inner(), 7);

    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

    let sender = thread::spawn(move || tx.send(8));
    assert_eq!(rx.recv(), Ok(8));
    sender.join().unwrap().unwrap();
}

#[test_log::test]
fn send_timeout_on_full_queue_returns_the_value() {
    let (tx, _rx) = bounded(1);
    tx.send(1).unwrap();

    let started = Instant::now();
    let result = tx.send_timeout(2, Duration::from_millis(30));

    assert_eq!(result, Err(SendTimeoutError::Timeout(2)));
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test_log::test]
fn recv_timeout_on_empty_queue() {
    let (_tx, rx) = bounded::<u8>(1);

    let started = Instant::now();
    assert_eq!(
        rx.recv_timeout(Duration::from_millis(30)),
        Err(RecvTimeoutError::Timeout)
    );
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test_log::test]
fn recv_deadline_receives_value_sent_in_time() {
    let (tx, rx) = bounded(1);

    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        tx.send('x').unwrap();
    });

    assert_eq!(
        rx.recv_deadline(Instant::now() + Duration::from_secs(5)),
        Ok('x')
    );
    sender.join().unwrap();
}

#[test_log::test]
fn cancellation_wakes_blocked_operations() {
    let (tx, rx) = bounded::<u32>(1);
    tx.send(0).unwrap();
    let (_other_tx, empty_rx) = bounded::<u32>(1);
    let token = CancellationToken::new();

    let sender = {
        let tx = tx.clone();
        let token = token.clone();
        thread::spawn(move || tx.send_cancellable(1, &token))
    };
    let receiver = {
        let token = token.clone();
        thread::spawn(move || empty_rx.recv_cancellable(&token))
    };

    thread::sleep(SETTLE);
    token.cancel();

    assert_eq!(sender.join().unwrap(), Err(SendTimeoutError::Cancelled(1)));
    assert_eq!(receiver.join().unwrap(), Err(RecvTimeoutError::Cancelled));
    assert_eq!(rx.recv(), Ok(0));
}

#[test_log::test]
fn cancelled_token_fails_fast_only_when_blocking_is_needed() {
    let (tx, rx) = bounded(1);
    let token = CancellationToken::new();
    token.cancel();

    tx.send_cancellable(1, &token).unwrap();
    assert_eq!(tx.send_cancellable(2, &token), Err(SendTimeoutError::Cancelled(2)));

    assert_eq!(rx.recv_cancellable(&token), Ok(1));
    assert_eq!(rx.recv_cancellable(&token), Err(RecvTimeoutError::Cancelled));
}

#[test_log::test]
fn receiver_into_iter_ends_when_closed() {
    let (tx, rx) = bounded(2);

    let producer = thread::spawn(move || {
        for word in ["one", "two", "three"] {
            tx.send(word.to_string()).unwrap();
        }
    });

    let words: Vec<String> = rx.into_iter().collect();
    producer.join().unwrap();

    assert_eq!(words, vec!["one", "two", "three"]);
}
