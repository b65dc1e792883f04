/// Integration tests for the byte layout of cell messages
/// and for rejection of malformed input.

use synclink_serde::SerdeErr;
use synclink_shared::{SyncConfig, SyncError, SyncLink, SyncLinks, SyncObject};
use synclink_test::{apply_delta, apply_full, assert_members, take_delta, take_full, TestHost};

#[test]
fn delta_layout_with_every_operation() {
    let host = TestHost::new();
    let a = host.spawn_replicated(1, 1);
    let b = host.spawn_replicated(2, 300);
    let mut links = SyncLinks::new();
    links.attach_host(host.handle());
    links.set_authority(true);

    links.add(&a).unwrap();
    links.add(&b).unwrap();
    links.remove(&a).unwrap();
    links.clear().unwrap();

    assert_eq!(
        take_delta(&mut links),
        vec![4, 0, 1, 0, 0xAC, 0x02, 2, 1, 1]
    );
    // an empty log still writes its count
    assert_eq!(take_delta(&mut links), vec![0]);
}

#[test]
fn full_layout() {
    let host = TestHost::new();
    let a = host.spawn_replicated(1, 7);
    let mut links = SyncLinks::new();
    links.attach_host(host.handle());
    links.set_authority(true);
    links.add(&a).unwrap();

    assert_eq!(take_full(&links), vec![1, 7, 1]);
    links.flush();
    assert_eq!(take_full(&links), vec![1, 7, 0]);

    let empty: SyncLink<synclink_test::TestEntity> = SyncLink::new();
    assert_eq!(take_full(&empty), vec![0]);
}

#[test]
fn unknown_operation_rejects_whole_batch() {
    let remote = TestHost::new();
    let a = remote.spawn_replicated(101, 1);
    remote.spawn_replicated(102, 2);
    let mut replica = SyncLinks::new();
    replica.attach_host(remote.handle());
    apply_delta(&mut replica, &[1, 0, 1]).unwrap();
    replica.take_events();

    // a valid ADD followed by an unknown code
    let result = apply_delta(&mut replica, &[2, 0, 2, 9]);

    assert_eq!(result, Err(SyncError::UnknownOperation { code: 9 }));
    assert_members!(replica, [a]);
    assert!(replica.take_events().is_empty());
}

#[test]
fn truncated_delta_is_rejected() {
    let remote = TestHost::new();
    let mut replica = SyncLinks::new();
    replica.attach_host(remote.handle());

    let result = apply_delta(&mut replica, &[2, 0, 1]);

    assert!(matches!(
        result,
        Err(SyncError::Serde(SerdeErr::UnexpectedEnd { .. }))
    ));
    assert_eq!(replica.pending_len(), 0);
}

#[test]
fn truncated_snapshot_leaves_state_untouched() {
    let remote = TestHost::new();
    let a = remote.spawn_replicated(101, 1);
    let mut replica = SyncLinks::new();
    replica.attach_host(remote.handle());
    apply_delta(&mut replica, &[1, 0, 1]).unwrap();

    // two members announced, one present, no trailing count
    assert!(apply_full(&mut replica, &[2, 1]).is_err());

    assert_members!(replica, [a]);
    assert_eq!(replica.pending_skip_count(), 0);
}

#[test]
fn oversized_batch_is_rejected() {
    let remote = TestHost::new();
    let mut replica = SyncLinks::with_config(SyncConfig {
        max_batch_len: 2,
        ..SyncConfig::default()
    });
    replica.attach_host(remote.handle());

    assert_eq!(
        apply_delta(&mut replica, &[3, 1, 1, 1]),
        Err(SyncError::BatchTooLarge { count: 3, limit: 2 })
    );
    assert_eq!(
        apply_full(&mut replica, &[0, 3]),
        Err(SyncError::BatchTooLarge { count: 3, limit: 2 })
    );
    assert_eq!(replica.pending_skip_count(), 0);
}

#[test]
fn overlong_identifier_is_rejected() {
    let remote = TestHost::new();
    let mut replica = SyncLink::new();
    replica.attach_host(remote.handle());

    let result = apply_delta(&mut replica, &[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);

    assert!(matches!(
        result,
        Err(SyncError::Serde(SerdeErr::VarIntOverflow { .. }))
    ));
    assert_eq!(replica.net_entity(), None);
}

#[test]
fn empty_scalar_message_is_rejected() {
    let mut replica: SyncLink<synclink_test::TestEntity> = SyncLink::new();

    assert!(apply_full(&mut replica, &[]).is_err());
}
