//! Consuming session events from other threads.
//!
//! The session stays on the test thread; streams and waits run on spawned
//! threads against a clone of its bus.

mod common;

use common::session;
use opentui_mouse::{
    CancellationToken, Error, EventStream, MouseAction, MouseButton, StreamOptions,
    wait_for_event,
};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const SGR_CLICK: &[u8] = b"\x1b[<0;5;5M\x1b[<0;5;5m";

/// Spin until the bus has `count` listeners.
fn await_listeners(bus: &opentui_mouse::EventBus, count: usize) {
    for _ in 0..500 {
        if bus.listener_count() == count {
            return;
        }
        thread::sleep(Duration::from_millis(2));
    }
    panic!("bus never reached {count} listeners");
}

#[test]
fn stream_receives_session_events_on_another_thread() {
    common::init_logging();
    let (mut session, _input, _terminal, _layout) = session();
    session.enable().unwrap();

    let stream = EventStream::subscribe(session.bus(), StreamOptions::default());
    let reader = thread::spawn(move || {
        stream
            .take(3)
            .map(|e| (e.action, e.button, e.x, e.y))
            .collect::<Vec<_>>()
    });

    assert_eq!(session.feed(SGR_CLICK), 3);
    let seen = reader.join().unwrap();
    assert_eq!(
        seen,
        vec![
            (MouseAction::Press, MouseButton::Left, 5, 5),
            (MouseAction::Release, MouseButton::Left, 5, 5),
            (MouseAction::Click, MouseButton::Left, 5, 5),
        ]
    );
    // Dropping the stream on the reader thread unsubscribed it
    assert_eq!(session.bus().listener_count(), 0);
}

#[test]
fn cancellation_wakes_a_blocked_reader_and_unsubscribes() {
    let (mut session, _input, _terminal, _layout) = session();
    session.enable().unwrap();

    let token = CancellationToken::new();
    let mut stream =
        EventStream::subscribe(session.bus(), StreamOptions::default()).with_cancellation(&token);
    let (started_tx, started_rx) = mpsc::channel();
    let reader = thread::spawn(move || {
        started_tx.send(()).unwrap();
        let result = stream.recv();
        (result, stream.is_subscribed())
    });

    started_rx.recv().unwrap();
    thread::sleep(Duration::from_millis(20));
    token.cancel();

    let (result, subscribed) = reader.join().unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(!subscribed);
    assert_eq!(session.bus().listener_count(), 0);

    // Later input reaches nobody
    assert_eq!(session.feed(SGR_CLICK), 3);
}

#[test]
fn wait_for_event_returns_matching_action() {
    let (mut session, _input, _terminal, _layout) = session();
    session.enable().unwrap();

    let bus = session.bus().clone();
    let waiter = thread::spawn(move || {
        wait_for_event(&bus, Some(MouseAction::Click), Some(Duration::from_secs(5)), None)
    });

    await_listeners(session.bus(), 1);
    session.feed(SGR_CLICK);

    let click = waiter.join().unwrap().unwrap();
    assert_eq!(click.action, MouseAction::Click);
    assert_eq!((click.x, click.y), (5, 5));
    assert_eq!(session.bus().listener_count(), 0);
}

#[test]
fn wait_for_event_times_out_and_removes_listener() {
    let (mut session, _input, _terminal, _layout) = session();
    session.enable().unwrap();

    let bus = session.bus().clone();
    let waiter = thread::spawn(move || {
        wait_for_event(&bus, Some(MouseAction::Wheel), Some(Duration::from_millis(30)), None)
    });

    await_listeners(session.bus(), 1);
    // A click is not a wheel event
    session.feed(SGR_CLICK);

    let result = waiter.join().unwrap();
    assert!(matches!(result, Err(Error::TimedOut)));
    assert!(result.unwrap_err().is_cancellation());
    assert_eq!(session.bus().listener_count(), 0);
}

#[test]
fn wait_for_event_with_cancelled_token_fails_immediately() {
    let (session, _input, _terminal, _layout) = session();
    let token = CancellationToken::new();
    token.cancel();

    let result = wait_for_event(session.bus(), None, None, Some(&token));
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(session.bus().listener_count(), 0);
}

#[test]
fn destroy_closes_open_streams() {
    let (mut session, _input, _terminal, _layout) = session();
    session.enable().unwrap();

    let mut stream = EventStream::subscribe(session.bus(), StreamOptions::default());
    session.feed(b"\x1b[<35;2;2M");
    session.destroy().unwrap();

    // Queued events drain before the close is reported
    let moved = stream.recv().unwrap();
    assert_eq!(moved.action, MouseAction::Move);
    assert!(matches!(stream.recv(), Err(Error::Closed)));
    assert!(!stream.is_subscribed());
}

#[test]
fn destroy_wakes_a_blocked_reader() {
    let (mut session, _input, _terminal, _layout) = session();
    session.enable().unwrap();

    let mut stream = EventStream::subscribe(session.bus(), StreamOptions::default());
    let reader = thread::spawn(move || stream.recv());

    thread::sleep(Duration::from_millis(20));
    session.destroy().unwrap();

    assert!(matches!(reader.join().unwrap(), Err(Error::Closed)));
}

#[test]
fn latest_only_stream_keeps_newest_motion() {
    let (mut session, _input, _terminal, _layout) = session();
    session.enable().unwrap();

    let mut stream = EventStream::for_actions(
        session.bus(),
        &[MouseAction::Move],
        StreamOptions::latest_only(),
    );
    session.feed(b"\x1b[<35;1;1M\x1b[<35;2;1M\x1b[<35;3;1M\x1b[<0;3;1M");

    assert_eq!(stream.len(), 1);
    assert_eq!(stream.dropped(), 2);
    assert_eq!(stream.try_recv().unwrap().map(|e| e.x), Some(3));
    assert_eq!(stream.try_recv().unwrap(), None);
}
