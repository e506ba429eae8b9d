//! JSON表单同步引擎
//!
//! 把任意JSON对象呈现为带标签的可编辑字段列表，并把用户编辑按推断类型
//! 回写到JSON对象；仅真实变更触发宿主通知

pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use model::field_model::{classify, title_case, EditValue, FieldKind};
pub use model::form_core::{
    filter_keys, ConfigSnapshot, EditEvent, EditEventKind, EditOutcome, FieldDescriptor,
    FormEngine, FormError, RefreshResult, RenderPlan,
};
pub use vm::bridge::{FormHost, FormOutputs, FormStyle, FormView, HostParams};
