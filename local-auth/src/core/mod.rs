pub mod api;
pub mod capability;
pub mod ceremony;
pub mod mediator;
