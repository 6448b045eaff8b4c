//! In-memory [`ConfigPort`] for tests.

use super::ConfigPort;
use crate::error::{CronError, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemoryConfig {
    values: RefCell<HashMap<(String, String), String>>,
    writes: RefCell<Vec<(String, String, String)>>,
    accesses: Cell<usize>,
    broken: Cell<bool>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, section: &str, key: &str, value: &str) -> Self {
        self.values
            .borrow_mut()
            .insert((section.to_string(), key.to_string()), value.to_string());
        self
    }

    /// Make every subsequent call fail like a broken `puppet` binary.
    pub fn break_access(&self) {
        self.broken.set(true);
    }

    pub fn value(&self, section: &str, key: &str) -> Option<String> {
        self.values
            .borrow()
            .get(&(section.to_string(), key.to_string()))
            .cloned()
    }

    pub fn writes(&self) -> Vec<(String, String, String)> {
        self.writes.borrow().clone()
    }

    /// Number of get and set calls made so far.
    pub fn accesses(&self) -> usize {
        self.accesses.get()
    }

    fn touch(&self) -> Result<()> {
        self.accesses.set(self.accesses.get() + 1);
        if self.broken.get() {
            return Err(CronError::ConfigAccess("puppet config is broken".to_string()));
        }
        Ok(())
    }
}

impl ConfigPort for MemoryConfig {
    fn get(&self, section: &str, key: &str) -> Result<String> {
        self.touch()?;
        Ok(self.value(section, key).unwrap_or_default())
    }

    fn set(&self, section: &str, key: &str, value: &str) -> Result<()> {
        self.touch()?;
        self.writes.borrow_mut().push((
            section.to_string(),
            key.to_string(),
            value.to_string(),
        ));
        self.values
            .borrow_mut()
            .insert((section.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}
