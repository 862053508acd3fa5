use crate::db::{load_json, SharedStorage, MODULE_VISIBILITY_KEY};
use crate::error::Result;
use crate::models::{ModuleId, ModuleVisibility};

pub struct ModuleVisibilityStore {
    storage: SharedStorage,
    visibility: ModuleVisibility,
}

impl ModuleVisibilityStore {
    /// Every catalog module starts visible; persisted flags are merged on top.
    pub fn load(storage: SharedStorage, module_ids: &[ModuleId]) -> Self {
        let mut visibility: ModuleVisibility = module_ids.iter().map(|id| (*id, true)).collect();
        match load_json::<ModuleVisibility>(storage.as_ref(), MODULE_VISIBILITY_KEY) {
            Ok(Some(saved)) => visibility.extend(saved),
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to load module visibility settings: {}", e),
        }
        Self {
            storage,
            visibility,
        }
    }

    pub fn get(&self, module_id: ModuleId) -> bool {
        self.visibility.get(&module_id).copied().unwrap_or(true)
    }

    pub fn toggle(&mut self, module_id: ModuleId) -> Result<bool> {
        let visible = !self.get(module_id);
        let mut next = self.visibility.clone();
        next.insert(module_id, visible);
        self.storage
            .set_item(MODULE_VISIBILITY_KEY, &serde_json::to_string(&next)?)?;
        self.visibility = next;
        tracing::debug!("Module {} visibility set to {}", module_id, visible);
        Ok(visible)
    }

    pub fn all(&self) -> &ModuleVisibility {
        &self.visibility
    }
}
