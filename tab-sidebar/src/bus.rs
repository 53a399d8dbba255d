use crate::{
    message::{
        dispatch::{ActionOutcome, DispatchRequest},
        registry::RegistryRecv,
        sidebar::{SidebarOptions, SidebarRecv, SidebarShutdown},
    },
    prelude::*,
    resource::TabApiResource,
    state::view::SidebarView,
};
use postage::{broadcast, mpsc, watch};

lifeline_bus!(pub struct SidebarBus);

impl Message<SidebarBus> for RegistryRecv {
    type Channel = mpsc::Sender<Self>;
}

impl Message<SidebarBus> for SidebarRecv {
    type Channel = mpsc::Sender<Self>;
}

impl Message<SidebarBus> for DispatchRequest {
    type Channel = mpsc::Sender<Self>;
}

impl Message<SidebarBus> for ActionOutcome {
    type Channel = broadcast::Sender<Self>;
}

impl Message<SidebarBus> for Option<SidebarView> {
    type Channel = watch::Sender<Self>;
}

impl Message<SidebarBus> for SidebarShutdown {
    type Channel = mpsc::Sender<Self>;
}

impl Resource<SidebarBus> for SidebarOptions {}
impl Resource<SidebarBus> for TabApiResource {}
