pub mod category;
pub mod setting;
pub mod subscription;
