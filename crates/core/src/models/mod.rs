pub mod campaign;
pub mod company;
pub mod contact;
pub mod email;
pub mod oauth;
pub mod template;
pub mod time_slot;
