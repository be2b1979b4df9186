// tests/relay_core.rs

use critpath::relay::messages::{INVALID_MESSAGE, NOT_JOINED};
use critpath::relay::{ClientMessage, ConnectionState, Delivery, RelayCore, ServerEvent};
use critpath::types::ConnectionId;
use critpath_test_utils::init_tracing;
use serde_json::json;

fn recipients(deliveries: &[Delivery]) -> Vec<ConnectionId> {
    deliveries.iter().map(|d| d.to).collect()
}

/// Core with users 1 and 2 connected and both in project 7.
fn two_in_project_seven() -> (RelayCore, ConnectionId, ConnectionId) {
    let mut core = RelayCore::new();
    let (a, _) = core.connect(Some(1), None);
    let (b, _) = core.connect(Some(2), None);
    core.join(a, 7);
    core.join(b, 7);
    (core, a, b)
}

#[test]
fn connect_greets_with_client_id() {
    init_tracing();
    let mut core = RelayCore::new();

    let (a, step) = core.connect(Some(1), None);

    assert_eq!(
        step.deliveries,
        vec![Delivery {
            to: a,
            event: ServerEvent::ConnectionEstablished {
                client_id: a.to_string()
            },
        }]
    );
    assert_eq!(core.registry().state_of(a), Some(ConnectionState::Connecting));
    assert!(step.inbound.is_none());
}

#[test]
fn connection_ids_are_unique() {
    let mut core = RelayCore::new();
    let (a, _) = core.connect(None, None);
    let (b, _) = core.connect(None, None);

    assert_ne!(a, b);
    assert_eq!(core.registry().connection_count(), 2);
}

#[test]
fn task_update_reaches_peers_but_not_sender() {
    let (mut core, a, b) = two_in_project_seven();
    let payload = json!({"type": "task_update", "task": {"id": 3, "name": "Build"}}).to_string();

    let step = core.handle_inbound(a, &payload);

    assert_eq!(
        step.deliveries,
        vec![Delivery {
            to: b,
            event: ServerEvent::TaskUpdated {
                task: json!({"id": 3, "name": "Build"}),
                updated_by: Some(1),
            },
        }]
    );

    let inbound = step.inbound.unwrap();
    assert_eq!(inbound.connection, a);
    assert_eq!(inbound.project, Some(7));
    assert_eq!(inbound.user_id, Some(1));
    assert_eq!(inbound.message.kind(), "task_update");
}

#[test]
fn resource_assignment_is_fanned_out() {
    let (mut core, a, b) = two_in_project_seven();
    let (c, _) = core.connect(Some(3), Some(7));
    let payload = json!({
        "type": "resource_assignment",
        "assignment": {"taskId": 3, "resourceId": 11}
    })
    .to_string();

    let step = core.handle_inbound(b, &payload);

    assert_eq!(recipients(&step.deliveries), vec![a, c]);
    assert!(step
        .deliveries
        .iter()
        .all(|d| d.event.kind() == "resource_assigned"));
}

#[test]
fn join_notifies_existing_members_only() {
    let mut core = RelayCore::new();
    let (a, _) = core.connect(Some(1), None);
    let (b, _) = core.connect(Some(2), None);

    let first = core.join(a, 7);
    assert!(first.deliveries.is_empty());

    let second = core.join(b, 7);
    assert_eq!(
        second.deliveries,
        vec![Delivery {
            to: a,
            event: ServerEvent::UserJoined { user_id: Some(2) },
        }]
    );
    assert_eq!(core.registry().members(7), vec![a, b]);
}

#[test]
fn repeated_join_is_a_no_op() {
    let (mut core, a, _) = two_in_project_seven();

    let step = core.join(a, 7);

    assert!(step.deliveries.is_empty());
    assert_eq!(core.registry().members(7).len(), 2);
}

#[test]
fn join_via_message_is_surfaced() {
    let mut core = RelayCore::new();
    let (a, _) = core.connect(Some(1), None);

    let step = core.handle_inbound(a, r#"{"type":"join_project","projectId":7}"#);

    assert_eq!(core.registry().project_of(a), Some(7));
    assert_eq!(
        step.inbound.map(|m| m.message),
        Some(ClientMessage::JoinProject { project_id: 7 })
    );
}

#[test]
fn connect_with_project_joins_immediately() {
    let (mut core, a, b) = two_in_project_seven();

    let (c, step) = core.connect(Some(3), Some(7));

    assert_eq!(step.deliveries[0].to, c);
    assert_eq!(step.deliveries[0].event.kind(), "connection_established");
    assert_eq!(recipients(&step.deliveries[1..]), vec![a, b]);
    assert!(step.deliveries[1..]
        .iter()
        .all(|d| d.event == ServerEvent::UserJoined { user_id: Some(3) }));
    assert_eq!(core.registry().state_of(c), Some(ConnectionState::Joined(7)));
}

#[test]
fn rejoin_moves_connection_between_rooms() {
    let (mut core, a, b) = two_in_project_seven();
    let (c, _) = core.connect(Some(3), Some(8));

    let step = core.join(a, 8);
    assert_eq!(recipients(&step.deliveries), vec![c]);
    assert_eq!(core.registry().members(7), vec![b]);
    assert_eq!(core.registry().members(8), vec![a, c]);

    let update = json!({"type": "task_update", "task": {"id": 1}}).to_string();
    let step = core.handle_inbound(a, &update);
    assert_eq!(recipients(&step.deliveries), vec![c]);
}

#[test]
fn malformed_payloads_are_answered_to_sender_only() {
    let (mut core, a, _) = two_in_project_seven();
    let expected = vec![Delivery {
        to: a,
        event: ServerEvent::error(INVALID_MESSAGE),
    }];

    for payload in [
        "not json",
        r#"{"type":"dance"}"#,
        r#"{"type":"join_project"}"#,
        r#"{"task":{"id":1}}"#,
    ] {
        let step = core.handle_inbound(a, payload);
        assert_eq!(step.deliveries, expected, "payload {payload}");
        assert!(step.inbound.is_none());
    }
    assert_eq!(core.registry().project_of(a), Some(7));
}

#[test]
fn update_before_join_is_refused() {
    let (mut core, _, _) = two_in_project_seven();
    let (c, _) = core.connect(Some(3), None);

    let step = core.handle_inbound(c, r#"{"type":"task_update","task":{}}"#);

    assert_eq!(
        step.deliveries,
        vec![Delivery {
            to: c,
            event: ServerEvent::error(NOT_JOINED),
        }]
    );
    assert!(step.inbound.is_none());
}

#[test]
fn leave_tells_remaining_members() {
    let (mut core, a, b) = two_in_project_seven();

    let step = core.leave(b);

    assert_eq!(
        step.deliveries,
        vec![Delivery {
            to: a,
            event: ServerEvent::UserLeft { user_id: Some(2) },
        }]
    );
    assert_eq!(core.registry().members(7), vec![a]);
    assert!(!core.registry().contains(b));

    assert!(core.leave(b).deliveries.is_empty());
}

#[test]
fn last_member_leaving_drops_the_room() {
    let mut core = RelayCore::new();
    let (a, _) = core.connect(None, Some(7));
    assert_eq!(core.registry().room_count(), 1);

    let step = core.leave(a);

    assert!(step.deliveries.is_empty());
    assert_eq!(core.registry().room_count(), 0);
}

#[test]
fn messages_from_unknown_connections_are_ignored() {
    let mut core = RelayCore::new();

    let step = core.handle_inbound(ConnectionId(99), r#"{"type":"join_project","projectId":1}"#);

    assert!(step.deliveries.is_empty());
    assert!(step.inbound.is_none());
    assert_eq!(core.registry().room_count(), 0);
}

#[test]
fn events_use_camel_case_wire_names() {
    let event = ServerEvent::TaskUpdated {
        task: json!({"id": 1}),
        updated_by: Some(4),
    };

    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({"type": "task_updated", "task": {"id": 1}, "updatedBy": 4})
    );
    assert_eq!(
        serde_json::to_value(ServerEvent::ConnectionEstablished {
            client_id: "conn-1".into()
        })
        .unwrap(),
        json!({"type": "connection_established", "clientId": "conn-1"})
    );
}
