pub mod contact;
pub mod event;
pub mod no_show;
pub mod organizer;
pub mod role;
pub mod signup;
