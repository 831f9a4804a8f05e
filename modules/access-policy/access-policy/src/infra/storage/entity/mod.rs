pub mod subscription;
pub mod trial;
