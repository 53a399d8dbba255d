pub use crate::bus::SidebarBus;
pub use lifeline::{lifeline_bus, Bus, Lifeline, Message, Resource, Service, Task};
pub use log::{debug, error, info, trace, warn};
pub use postage::{sink::Sink, stream::Stream};
