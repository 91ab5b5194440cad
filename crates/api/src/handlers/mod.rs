pub mod auth;
pub mod calendar;
pub mod campaigns;
pub mod email;
pub mod placeholders;
pub mod scraper;
