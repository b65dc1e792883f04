use std::sync::Arc;

use synclink_serde::{ByteReader, ByteWrite, Serde};

use super::{event::VarEvent, sync_object::SyncObject, SyncError};

/// Extrapolates a value from the last synced one and the seconds elapsed
/// since it arrived.
pub type Predict<T> = Box<dyn Fn(&T, f64) -> T + Send + Sync>;

/// Source of network time, in seconds.
pub trait NetworkClock: Send + Sync {
    fn now(&self) -> f64;
}

/// A replicated value that replicas predict between updates.
///
/// The authority reads and writes the value directly. A replica reads the
/// prediction computed from the last synced value and the time since it
/// was received; without a prediction function or clock it reads the last
/// synced value.
pub struct SyncVarPredictive<T: Serde> {
    initial: T,
    synced: T,
    last_update: f64,
    authority: bool,
    dirty: bool,
    prediction: Option<Predict<T>>,
    clock: Option<Arc<dyn NetworkClock>>,
    events: Vec<VarEvent<T>>,
}

impl<T: Serde> SyncVarPredictive<T> {
    pub fn new(value: T) -> Self {
        Self {
            initial: value.clone(),
            synced: value,
            last_update: 0.0,
            authority: false,
            dirty: false,
            prediction: None,
            clock: None,
            events: Vec::new(),
        }
    }

    pub fn set_prediction<F>(&mut self, predict: F)
    where
        F: Fn(&T, f64) -> T + Send + Sync + 'static,
    {
        self.prediction = Some(Box::new(predict));
    }

    pub fn attach_clock(&mut self, clock: Arc<dyn NetworkClock>) {
        self.clock = Some(clock);
    }

    pub fn value(&self) -> T {
        if self.authority {
            return self.synced.clone();
        }
        match (&self.prediction, &self.clock) {
            (Some(predict), Some(clock)) => predict(&self.synced, clock.now() - self.last_update),
            _ => self.synced.clone(),
        }
    }

    pub fn last_synced_value(&self) -> &T {
        &self.synced
    }

    /// Network time at which the last synced value arrived
    pub fn last_update(&self) -> f64 {
        self.last_update
    }

    /// Authority only. Setting an equal value is a no-op.
    pub fn set(&mut self, value: T) -> Result<(), SyncError> {
        if !self.authority {
            return Err(SyncError::NotAuthoritative { operation: "set" });
        }
        if value == self.synced {
            return Ok(());
        }
        self.synced = value.clone();
        self.dirty = true;
        self.events.push(VarEvent::Changed(value));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<VarEvent<T>> {
        std::mem::take(&mut self.events)
    }

    fn now(&self) -> f64 {
        self.clock.as_ref().map_or(0.0, |clock| clock.now())
    }
}

impl<T: Serde> SyncObject for SyncVarPredictive<T> {
    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn flush(&mut self) {
        self.dirty = false;
    }

    fn reset(&mut self) {
        self.synced = self.initial.clone();
        self.last_update = 0.0;
        self.dirty = false;
    }

    fn has_authority(&self) -> bool {
        self.authority
    }

    fn set_authority(&mut self, authority: bool) {
        self.authority = authority;
    }

    fn serialize_full(&self, writer: &mut dyn ByteWrite) {
        self.synced.ser(writer);
    }

    fn serialize_delta(&self, writer: &mut dyn ByteWrite) {
        self.serialize_full(writer);
    }

    fn deserialize_full(&mut self, reader: &mut ByteReader) -> Result<(), SyncError> {
        let value = T::de(reader)?;
        if value == self.synced {
            return Ok(());
        }
        self.synced = value.clone();
        self.last_update = self.now();
        self.events.push(VarEvent::Changed(value));
        Ok(())
    }

    fn deserialize_delta(&mut self, reader: &mut ByteReader) -> Result<(), SyncError> {
        self.deserialize_full(reader)
    }
}
