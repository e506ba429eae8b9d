//! 视图模型层：宿主边界桥接

pub mod bridge;
