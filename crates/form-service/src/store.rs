use std::collections::BTreeMap;

use form_spec::FormDefinition;
use parking_lot::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("form '{0}' already exists")]
    Duplicate(String),
    #[error("form '{0}' does not exist")]
    Missing(String),
}

/// Persistence for form definitions.
pub trait FormStore {
    fn insert(&self, form: FormDefinition) -> Result<(), StoreError>;
    /// Replaces the stored form with the same id.
    fn update(&self, form: FormDefinition) -> Result<(), StoreError>;
    fn get(&self, id: &str) -> Result<Option<FormDefinition>, StoreError>;
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FormDefinition>, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryFormStore {
    forms: RwLock<BTreeMap<String, FormDefinition>>,
}

impl InMemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FormStore for InMemoryFormStore {
    fn insert(&self, form: FormDefinition) -> Result<(), StoreError> {
        let mut forms = self.forms.write();
        if forms.contains_key(&form.id) {
            return Err(StoreError::Duplicate(form.id));
        }
        forms.insert(form.id.clone(), form);
        Ok(())
    }

    fn update(&self, form: FormDefinition) -> Result<(), StoreError> {
        let mut forms = self.forms.write();
        match forms.get_mut(&form.id) {
            Some(slot) => {
                *slot = form;
                Ok(())
            }
            None => Err(StoreError::Missing(form.id)),
        }
    }

    fn get(&self, id: &str) -> Result<Option<FormDefinition>, StoreError> {
        Ok(self.forms.read().get(id).cloned())
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FormDefinition>, StoreError> {
        Ok(self
            .forms
            .read()
            .values()
            .filter(|form| form.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
