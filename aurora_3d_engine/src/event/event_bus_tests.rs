/// Tests for EventBus
///
/// These tests validate subscription, fan-out, ordering, and pruning of
/// dropped subscribers.

use super::*;

// ============================================================================
// Tests: Subscription
// ============================================================================

#[test]
fn test_event_bus_new_has_no_subscribers() {
    let bus = EventBus::new();
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn test_subscribe_registers_subscriber() {
    let bus = EventBus::new();
    let _rx = bus.subscribe();
    assert_eq!(bus.subscriber_count(), 1);
}

#[test]
fn test_events_before_subscription_are_not_delivered() {
    let bus = EventBus::new();
    bus.publish(EngineEvent::SceneTransition);

    let rx = bus.subscribe();
    assert!(rx.drain().is_empty());
}

// ============================================================================
// Tests: Publish
// ============================================================================

#[test]
fn test_publish_fans_out_to_all_subscribers() {
    let bus = EventBus::new();
    let rx_a = bus.subscribe();
    let rx_b = bus.subscribe();

    bus.publish(EngineEvent::Resized { width: 1280, height: 720 });

    assert_eq!(rx_a.drain(), vec![EngineEvent::Resized { width: 1280, height: 720 }]);
    assert_eq!(rx_b.drain(), vec![EngineEvent::Resized { width: 1280, height: 720 }]);
}

#[test]
fn test_drain_preserves_publish_order() {
    let bus = EventBus::new();
    let rx = bus.subscribe();

    bus.publish(EngineEvent::SceneTransition);
    bus.publish(EngineEvent::Resized { width: 10, height: 20 });

    assert_eq!(rx.pending(), 2);
    assert_eq!(rx.try_recv(), Some(EngineEvent::SceneTransition));
    assert_eq!(rx.try_recv(), Some(EngineEvent::Resized { width: 10, height: 20 }));
    assert_eq!(rx.try_recv(), None);
}

#[test]
fn test_drain_empties_queue() {
    let bus = EventBus::new();
    let rx = bus.subscribe();
    bus.publish(EngineEvent::SceneTransition);

    assert_eq!(rx.drain().len(), 1);
    assert!(rx.drain().is_empty());
}

// ============================================================================
// Tests: Pruning
// ============================================================================

#[test]
fn test_dropped_subscriber_is_pruned_on_publish() {
    let bus = EventBus::new();
    let rx_kept = bus.subscribe();
    {
        let _rx_dropped = bus.subscribe();
    }
    assert_eq!(bus.subscriber_count(), 2);

    bus.publish(EngineEvent::SceneTransition);

    assert_eq!(bus.subscriber_count(), 1);
    assert_eq!(rx_kept.drain().len(), 1);
}
