//! Input source exposed as a select

use std::sync::Arc;
use tracing::{info, warn};

use display_state::InputSource;

use super::{Entity, EntityContext, EntityInfo, EntityKind, StateUpdates};
use crate::source::SourceCatalog;

/// Select whose options are the configured sources
///
/// Options and the current selection always come from the catalog's current
/// map, so a configuration update shows up without recreating the entity.
#[derive(Debug, Clone)]
pub struct SelectEntity {
    context: Arc<EntityContext>,
    info: EntityInfo,
    catalog: SourceCatalog,
}

impl SelectEntity {
    pub fn new(context: Arc<EntityContext>, catalog: SourceCatalog) -> Self {
        let device_info = context.device_info();
        let info = EntityInfo::new(
            EntityKind::Select,
            format!("{}_input_source_select", device_info.unique_id()),
            format!("{} Input Source", context.name()),
            device_info.clone(),
        );

        Self {
            context,
            info,
            catalog,
        }
    }

    pub fn options(&self) -> Vec<String> {
        self.catalog.current().forward_labels().to_vec()
    }

    /// Option matching the device's current source code, if configured
    pub fn current_option(&self) -> Option<String> {
        let code = self.context.device().get::<InputSource>();
        self.catalog
            .current()
            .reverse_lookup(code.code())
            .map(str::to_string)
    }

    /// Switch to the source behind an option; unknown options are ignored
    pub async fn select_option(&self, option: &str) -> bool {
        let code = match self.catalog.current().label_to_code(option) {
            Some(code) => code.to_string(),
            None => {
                warn!("Unknown source option {:?} for {}", option, self.context.name());
                return false;
            }
        };

        let switched = self.context.device().set(InputSource::new(code.as_str())).await;
        if switched {
            info!("Switched {} to source {}", self.context.name(), code);
        }
        switched
    }
}

impl Entity for SelectEntity {
    fn info(&self) -> &EntityInfo {
        &self.info
    }

    fn context(&self) -> &EntityContext {
        &self.context
    }

    fn state(&self) -> serde_json::Value {
        serde_json::json!({
            "state": self.current_option(),
            "options": self.options(),
        })
    }

    fn updates(&self) -> StateUpdates {
        StateUpdates::new(self.context.device(), Some(self.catalog.subscribe()))
    }
}
