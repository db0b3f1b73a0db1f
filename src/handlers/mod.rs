pub mod auth_handlers;
pub mod contact_handlers;
pub mod dashboard;
pub mod event_handlers;
pub mod roster_handlers;
pub mod signup_handlers;
