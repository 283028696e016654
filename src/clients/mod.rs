pub mod health;
pub mod store;
pub mod vapid;
pub mod webpush;
