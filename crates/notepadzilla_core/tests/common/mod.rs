#![allow(dead_code)]

use notepadzilla_core::{
    CoreConfig, KeyValueStore, KvNoteRepository, ManualClock, MemoryKeyValueStore,
    SessionController, StorageError, StorageResult,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const T0: i64 = 1_700_000_000_000;

/// Memory store whose writes can be made to fail, globally or per key.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryKeyValueStore,
    fail_all_writes: AtomicBool,
    failing_key: Mutex<Option<String>>,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_all_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes_to(&self, key: Option<&str>) {
        *self.failing_key.lock().unwrap() = key.map(str::to_string);
    }

    fn should_fail(&self, key: &str) -> bool {
        self.fail_all_writes.load(Ordering::SeqCst)
            || self.failing_key.lock().unwrap().as_deref() == Some(key)
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.should_fail(key) {
            return Err(StorageError::Unavailable("injected write failure".to_string()));
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key)
    }
}

pub type TestController = SessionController<KvNoteRepository<Arc<FlakyStore>>, ManualClock>;

pub fn open_controller(store: &Arc<FlakyStore>, clock: &ManualClock) -> TestController {
    SessionController::open(
        KvNoteRepository::new(Arc::clone(store)),
        clock.clone(),
        &CoreConfig::default(),
    )
}
