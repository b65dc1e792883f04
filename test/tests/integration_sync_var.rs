/// Integration tests for value cells, driven the way a host drives a
/// component made of several cells behind `dyn SyncObject`.

use std::sync::{Arc, Mutex};

use synclink_shared::{NetworkClock, SyncObject, SyncVar, SyncVarPredictive, VarEvent};
use synclink_test::{apply_full, sync_delta, take_full};

struct ManualClock(Mutex<f64>);

impl NetworkClock for ManualClock {
    fn now(&self) -> f64 {
        *self.0.lock().unwrap()
    }
}

#[test]
fn mixed_cells_sync_through_trait_objects() {
    let mut name = SyncVar::new(String::from("scout"));
    let mut hp = SyncVar::new(100u32);
    name.set_authority(true);
    hp.set_authority(true);
    hp.set(75).unwrap();

    let mut remote_name = SyncVar::new(String::new());
    let mut remote_hp = SyncVar::new(0u32);

    {
        let senders: [&mut dyn SyncObject; 2] = [&mut name, &mut hp];
        let receivers: [&mut dyn SyncObject; 2] = [&mut remote_name, &mut remote_hp];
        for (sender, receiver) in senders.into_iter().zip(receivers) {
            // a joining replica gets everything, dirty or not
            apply_full(receiver, &take_full(&*sender)).unwrap();
            sender.flush();
        }
    }

    assert_eq!(remote_name.get(), "scout");
    assert_eq!(*remote_hp.get(), 75);
    assert_eq!(remote_hp.take_events(), vec![VarEvent::Changed(75)]);

    hp.set(60).unwrap();
    sync_delta(&mut name, &mut remote_name);
    sync_delta(&mut hp, &mut remote_hp);

    assert_eq!(*remote_hp.get(), 60);
    assert_eq!(remote_name.take_events().len(), 1, "only the join changed the name");
}

#[test]
fn predictive_replica_extrapolates_between_updates() {
    let clock = Arc::new(ManualClock(Mutex::new(0.0)));

    let mut host: SyncVarPredictive<f64> = SyncVarPredictive::new(0.0);
    host.set_authority(true);

    let mut replica: SyncVarPredictive<f64> = SyncVarPredictive::new(0.0);
    replica.attach_clock(clock.clone());
    replica.set_prediction(|angle, elapsed| angle + 90.0 * elapsed);

    host.set(45.0).unwrap();
    *clock.0.lock().unwrap() = 2.0;
    sync_delta(&mut host, &mut replica);

    assert_eq!(replica.last_update(), 2.0);
    assert_eq!(replica.value(), 45.0);

    *clock.0.lock().unwrap() = 3.0;
    assert_eq!(replica.value(), 135.0);
    assert_eq!(*replica.last_synced_value(), 45.0);
    assert_eq!(host.value(), 45.0);

    replica.reset();
    assert_eq!(*replica.last_synced_value(), 0.0);
    assert_eq!(replica.last_update(), 0.0);
}
