pub mod broadcast;
pub mod health;
pub mod payload;
pub mod response;
pub mod subscription;
