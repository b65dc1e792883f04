/// Integration tests for owner teardown and pooled respawn
/// Destroying the entity that embeds a cell cancels every wait and drops
/// every lifecycle subscription the cell held.

use synclink_shared::{LinkEvent, LinksEvent, SyncLink, SyncLinks, SyncObject};
use synclink_test::{apply_delta, assert_members, assert_unsubscribed, tick, TestHost};

#[test]
fn owner_destroyed_while_link_resolving() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();

    let remote = TestHost::new();
    let owner = remote.spawn_replicated(1, 50);
    let mut replica = SyncLink::new();
    replica.attach_host(remote.handle());
    replica.observe_owner(owner).unwrap();

    apply_delta(&mut replica, &[10]).unwrap();
    assert!(replica.is_resolving());

    remote.destroy(owner);
    replica.update();
    assert!(!replica.is_resolving());

    // the entity arrives after the owner is gone and must be ignored
    let target = remote.spawn_replicated(101, 10);
    tick(&mut replica, 3);

    assert_eq!(replica.get(), None);
    assert!(replica.take_events().is_empty());
    assert_unsubscribed!(remote, target);
}

#[test]
fn owner_destroyed_releases_link_target() {
    let remote = TestHost::new();
    let owner = remote.spawn_replicated(1, 50);
    let target = remote.spawn_replicated(101, 10);
    let mut replica = SyncLink::new();
    replica.attach_host(remote.handle());
    replica.observe_owner(owner).unwrap();
    apply_delta(&mut replica, &[10]).unwrap();
    assert_eq!(remote.subscriber_count(target), 1);

    remote.destroy(owner);
    replica.update();

    assert_eq!(replica.get(), None);
    assert_unsubscribed!(remote, target);
}

#[test]
fn torn_down_link_ignores_later_identifiers() {
    let remote = TestHost::new();
    let owner = remote.spawn_replicated(1, 50);
    let target = remote.spawn_replicated(101, 10);
    let mut replica = SyncLink::new();
    replica.attach_host(remote.handle());
    replica.observe_owner(owner).unwrap();

    remote.destroy(owner);
    replica.update();
    apply_delta(&mut replica, &[10]).unwrap();
    tick(&mut replica, 2);

    assert_eq!(replica.get(), None);
    assert_unsubscribed!(remote, target);
}

#[test]
fn owner_destroyed_while_links_resolving() {
    let remote = TestHost::new();
    let owner = remote.spawn_replicated(1, 50);
    let member = remote.spawn_replicated(101, 1);
    let mut replica = SyncLinks::new();
    replica.attach_host(remote.handle());
    replica.observe_owner(owner).unwrap();

    apply_delta(&mut replica, &[2, 0, 1, 0, 2]).unwrap();
    assert_members!(replica, [member]);
    assert_eq!(replica.pending_len(), 1);

    remote.destroy(owner);
    replica.update();

    assert!(replica.is_empty());
    assert_eq!(replica.pending_len(), 0);
    assert_unsubscribed!(remote, member);

    let late = remote.spawn_replicated(102, 2);
    tick(&mut replica, 3);
    assert!(replica.is_empty());
    assert_unsubscribed!(remote, late);
}

#[test]
fn authority_teardown_drops_change_log() {
    let host = TestHost::new();
    let owner = host.spawn_replicated(1, 50);
    let member = host.spawn_replicated(2, 1);
    let mut links = SyncLinks::new();
    links.attach_host(host.handle());
    links.set_authority(true);
    links.observe_owner(owner).unwrap();
    links.add(&member).unwrap();

    host.destroy(owner);
    links.update();

    assert!(!links.is_dirty());
    assert!(links.is_empty());
    assert_unsubscribed!(host, member);
}

#[test]
fn teardown_twice_is_harmless() {
    let remote = TestHost::new();
    let mut link = SyncLink::new();
    link.attach_host(remote.handle());
    apply_delta(&mut link, &[10]).unwrap();

    link.teardown();
    link.teardown();

    let mut links = SyncLinks::new();
    links.attach_host(remote.handle());
    apply_delta(&mut links, &[1, 0, 10]).unwrap();

    links.teardown();
    links.teardown();
    assert_eq!(links.pending_len(), 0);
}

/// A pooled owner that comes back resets its cells, which then work as new
#[test]
fn respawned_owner_resets_link() {
    let remote = TestHost::new();
    let owner = remote.spawn_replicated(1, 50);
    let target = remote.spawn_replicated(101, 10);
    let mut replica = SyncLink::new();
    replica.attach_host(remote.handle());
    replica.observe_owner(owner).unwrap();
    apply_delta(&mut replica, &[10]).unwrap();
    replica.take_events();

    remote.despawn(owner);
    replica.update();
    assert_eq!(replica.get(), None);

    remote.spawn_replicated(1, 51);
    replica.update();
    assert_eq!(replica.net_entity(), None);

    apply_delta(&mut replica, &[10]).unwrap();
    assert_eq!(replica.get(), Some(target));
    assert_eq!(replica.take_events(), vec![LinkEvent::Changed(Some(target))]);

    // the fresh owner watch still works
    remote.destroy(owner);
    replica.update();
    assert_eq!(replica.get(), None);
}

#[test]
fn respawn_without_intermediate_tick_resets_links() {
    let remote = TestHost::new();
    let owner = remote.spawn_replicated(1, 50);
    let member = remote.spawn_replicated(101, 1);
    let mut replica = SyncLinks::new();
    replica.attach_host(remote.handle());
    replica.observe_owner(owner).unwrap();
    apply_delta(&mut replica, &[1, 0, 1]).unwrap();
    apply_delta(&mut replica, &[1, 0, 9]).unwrap();
    replica.take_events();

    remote.despawn(owner);
    remote.spawn(1);
    replica.update();

    assert!(replica.is_empty());
    assert_eq!(replica.pending_len(), 0);
    assert_eq!(replica.pending_skip_count(), 0);
    assert_unsubscribed!(remote, member);

    apply_delta(&mut replica, &[1, 0, 1]).unwrap();
    assert_members!(replica, [member]);
    assert_eq!(
        replica.take_events(),
        vec![LinksEvent::Added(member), LinksEvent::Changed]
    );
}
