pub mod campaign;
pub mod campaign_company;
pub mod company;
pub mod oauth_token;
pub mod template;
pub mod time_slot;
