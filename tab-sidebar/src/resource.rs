use lifeline::impl_storage_clone;
use std::{fmt, sync::Arc};
use tab_sidebar_api::api::TabApi;

/// The browser's tab-management service, shared by every task on the bus
#[derive(Clone)]
pub struct TabApiResource(pub Arc<dyn TabApi>);

impl fmt::Debug for TabApiResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TabApiResource")
    }
}

impl_storage_clone!(TabApiResource);
