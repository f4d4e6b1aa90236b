pub mod health;
pub mod items;
pub mod request_id;
