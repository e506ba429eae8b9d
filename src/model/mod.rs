//! 数据模型层：字段模型与表单同步引擎

pub mod field_model;
pub mod form_core;
pub mod performance;
