pub mod debug;
pub mod extract;
pub mod letterbox;
pub mod video;
