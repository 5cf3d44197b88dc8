// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event relay specs
//!
//! Verify a registered interceptor relays a whole build's events to the
//! orchestrator's listeners, in order, with event content intact.

use crate::prelude::*;

#[test]
fn full_build_reaches_every_listener_in_order() {
    init_tracing();
    let log = CallLog::new();
    let fake = orchestrator(&["console", "junit"], &log);
    let dispatcher = bootstrap(&fake.descriptor(), &ChannelSlot::new()).unwrap();
    let lifecycle = build_lifecycle();

    for (method, event) in &lifecycle {
        method.invoke(&dispatcher, event).unwrap();
    }

    let expected: Vec<(String, ListenerMethod, BuildEvent)> = lifecycle
        .iter()
        .flat_map(|(method, event)| {
            ["console", "junit"].map(|label| (label.to_string(), *method, event.clone()))
        })
        .collect();
    let received: Vec<(String, ListenerMethod, BuildEvent)> =
        log.calls().into_iter().map(|c| (c.listener, c.method, c.event)).collect();
    assert_eq!(received, expected);
}

#[test]
fn rejected_event_skips_later_listeners_only_for_that_event() {
    init_tracing();
    let log = CallLog::new();
    let fake = FakeOrchestrator::start(vec![
        RecordingListener::new("console", &log).shared(),
        RecordingListener::failing("gate", &log, ListenerMethod::TaskFinished).shared(),
        RecordingListener::new("junit", &log).shared(),
    ])
    .unwrap();
    let dispatcher = bootstrap(&fake.descriptor(), &ChannelSlot::new()).unwrap();
    let event = sample_event("core").with_task("javac");

    let err = dispatcher.task_finished(&event).unwrap_err();
    dispatcher.target_finished(&event).unwrap();

    assert!(matches!(err, ListenerError::Remote(ref m) if m.contains("gate rejected")), "got {err:?}");
    assert_eq!(
        log.sequence(),
        vec![
            ("console".to_string(), ListenerMethod::TaskFinished),
            ("gate".to_string(), ListenerMethod::TaskFinished),
            ("console".to_string(), ListenerMethod::TargetFinished),
            ("gate".to_string(), ListenerMethod::TargetFinished),
            ("junit".to_string(), ListenerMethod::TargetFinished),
        ]
    );
}

#[test]
#[serial]
fn register_attaches_dispatcher_to_the_host() {
    init_tracing();
    let log = CallLog::new();
    let fake = orchestrator(&["console"], &log);
    let mut host: Vec<Arc<dyn BuildListener>> = Vec::new();

    let dispatcher = with_connector(Some(&fake.connector_value()), || register(&mut host)).unwrap();

    assert_eq!(host.len(), 1);
    assert_eq!(dispatcher.listener_count(), 1);
    assert!(process_channel().is_some_and(|c| !c.is_closed()));

    for (method, event) in build_lifecycle() {
        method.invoke(host[0].as_ref(), &event).unwrap();
    }
    assert_eq!(log.len(), 7);
}
