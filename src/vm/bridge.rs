//! VM桥接层：宿主协作方边界（配置参数、输出读取与变更通知）
//!
//! 对应外部宿主的生命周期 init → update_view → get_outputs，
//! 引擎本身不感知任何具体UI技术

use serde::Deserialize;

use crate::model::field_model::{EditValue, FieldKind};
use crate::model::form_core::{ConfigSnapshot, EditOutcome, FormEngine, FormError, RenderPlan};

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_LOADED: &str = "表单加载完成";
pub const STATUS_COPIED: &str = "已复制到剪贴板";
pub const STATUS_SAVED: &str = "保存成功";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";
pub const PLACEHOLDER_NO_DATA: &str = "未提供JSON数据";
pub const PLACEHOLDER_INVALID_JSON: &str = "JSON格式无效";

/// 开关型参数的"开启"取值
pub const FLAG_ON: &str = "1";

const DEFAULT_FONT_SIZE: f64 = 15.0;
const DEFAULT_MARGIN: f64 = 30.0;
const DEFAULT_BACKGROUND: &str = "white";
const DEFAULT_FOREGROUND: &str = "black";

/// 宿主每次刷新提供的原始参数（与外部配置绑定，全部可缺省）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostParams {
    pub json_input: String,
    /// 逗号分隔的键允许列表
    pub selected_properties: String,
    pub background_color: String,
    pub input_color: String,
    pub heading_color: String,
    pub value_color: String,
    pub headings_font_size: Option<f64>,
    pub values_font_size: Option<f64>,
    pub margins: Option<f64>,
    /// "1" 表示启用阴影
    pub shadows: String,
    /// "1" 表示启用复制动作
    pub enable_copy: String,
    /// 重置标记，取值变化触发重新初始化
    pub reset: String,
}

/// 解析后的展示样式（缺省值已补齐）
#[derive(Debug, Clone, PartialEq)]
pub struct FormStyle {
    pub background_color: String,
    pub input_color: String,
    pub heading_color: String,
    pub value_color: String,
    pub headings_font_size: f64,
    pub values_font_size: f64,
    pub margins: f64,
    pub shadows: bool,
    pub enable_copy: bool,
}

impl FormStyle {
    pub fn from_params(params: &HostParams) -> Self {
        Self {
            background_color: color_or(&params.background_color, DEFAULT_BACKGROUND),
            input_color: color_or(&params.input_color, DEFAULT_BACKGROUND),
            heading_color: color_or(&params.heading_color, DEFAULT_FOREGROUND),
            value_color: color_or(&params.value_color, DEFAULT_FOREGROUND),
            headings_font_size: params.headings_font_size.unwrap_or(DEFAULT_FONT_SIZE),
            values_font_size: params.values_font_size.unwrap_or(DEFAULT_FONT_SIZE),
            margins: params.margins.unwrap_or(DEFAULT_MARGIN),
            shadows: params.shadows == FLAG_ON,
            enable_copy: params.enable_copy == FLAG_ON,
        }
    }
}

fn color_or(raw: &str, default: &str) -> String {
    if raw.trim().is_empty() {
        default.to_string()
    } else {
        raw.to_string()
    }
}

/// 一次刷新的完整视图：样式与渲染计划
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub style: FormStyle,
    pub body: RenderPlan,
}

impl FormView {
    /// 占位状态的用户可见文案；字段列表状态返回None
    pub fn placeholder(&self) -> Option<&'static str> {
        match self.body {
            RenderPlan::NoData => Some(PLACEHOLDER_NO_DATA),
            RenderPlan::InvalidJson => Some(PLACEHOLDER_INVALID_JSON),
            RenderPlan::Fields(_) => None,
        }
    }
}

/// 宿主按需读取的输出
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormOutputs {
    pub json_output: String,
    pub event_kind: String,
    pub event_key: String,
    pub event_value: String,
}

/// 表单宿主：持有引擎与通知回调，对接外部生命周期
pub struct FormHost {
    engine: FormEngine,
    params: HostParams,
    notify: Box<dyn FnMut()>,
}

impl FormHost {
    /// 初始化：执行首次加载并通知一次输出变更
    pub fn new(params: HostParams, notify: Box<dyn FnMut()>) -> (Self, FormView) {
        let mut host = Self {
            engine: FormEngine::default(),
            params,
            notify,
        };
        let snapshot = host.snapshot();
        let result = host.engine.refresh(&snapshot);
        let view = FormView {
            style: FormStyle::from_params(&host.params),
            body: result.plan,
        };
        (host.notify)();
        (host, view)
    }

    /// 外部刷新：以新参数重建视图；仅当重置标记触发重新加载时通知
    pub fn update_view(&mut self, params: HostParams) -> FormView {
        self.params = params;
        let snapshot = self.snapshot();
        let result = self.engine.refresh(&snapshot);
        if result.reloaded {
            (self.notify)();
        }
        FormView {
            style: FormStyle::from_params(&self.params),
            body: result.plan,
        }
    }

    /// 字段编辑入口：真实变更时通知宿主；失败走日志通道，不中断
    pub fn apply_edit(
        &mut self,
        key: &str,
        raw: &EditValue,
        kind: FieldKind,
    ) -> Result<EditOutcome, FormError> {
        match self.engine.apply_edit(key, raw, kind) {
            Ok(EditOutcome::Changed) => {
                (self.notify)();
                Ok(EditOutcome::Changed)
            }
            Ok(EditOutcome::Unchanged) => Ok(EditOutcome::Unchanged),
            Err(e) => {
                tracing::error!("编辑合并失败: {}", e);
                Err(e)
            }
        }
    }

    /// 复制当前规范文本到剪贴板（受enable_copy开关控制）。
    /// 返回是否实际执行了复制
    pub fn request_copy(&mut self) -> bool {
        if self.params.enable_copy != FLAG_ON {
            tracing::info!("复制功能未启用，忽略请求");
            return false;
        }
        match self.engine.request_copy() {
            Ok(()) => {
                (self.notify)();
                true
            }
            Err(e) => {
                tracing::error!("复制到剪贴板失败: {}", e);
                false
            }
        }
    }

    /// 读取当前输出：规范JSON文本与最近一次事件
    pub fn get_outputs(&self) -> FormOutputs {
        let mut outputs = FormOutputs {
            json_output: self.engine.canonical_text().unwrap_or_default().to_string(),
            ..FormOutputs::default()
        };
        if let Some(event) = self.engine.last_event() {
            outputs.event_kind = event.kind.as_str().to_string();
            outputs.event_key = event.key.clone();
            outputs.event_value = event.value.clone();
        }
        outputs
    }

    fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            json_text: self.params.json_input.clone(),
            selected_properties: self.params.selected_properties.clone(),
            reset_marker: self.params.reset.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_host(json: &str) -> (FormHost, FormView, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let probe = count.clone();
        let params = HostParams {
            json_input: json.to_string(),
            enable_copy: FLAG_ON.to_string(),
            ..HostParams::default()
        };
        let (host, view) = FormHost::new(params, Box::new(move || probe.set(probe.get() + 1)));
        (host, view, count)
    }

    #[test]
    fn test_style_defaults() {
        let style = FormStyle::from_params(&HostParams::default());
        assert_eq!(style.background_color, "white");
        assert_eq!(style.headings_font_size, 15.0);
        assert_eq!(style.values_font_size, 15.0);
        assert_eq!(style.margins, 30.0);
        assert!(!style.shadows);
        assert!(!style.enable_copy, "复制开关默认关闭");
    }

    #[test]
    fn test_style_flag_parsing() {
        let params = HostParams {
            shadows: "1".to_string(),
            enable_copy: "0".to_string(),
            ..HostParams::default()
        };
        let style = FormStyle::from_params(&params);
        assert!(style.shadows);
        assert!(!style.enable_copy);
    }

    #[test]
    fn test_params_deserialization_defaults() {
        let params: HostParams =
            serde_json::from_str(r#"{"selected_properties":"a,b","margins":12}"#).expect("参数解析失败");
        assert_eq!(params.selected_properties, "a,b");
        assert_eq!(params.margins, Some(12.0));
        assert!(params.json_input.is_empty(), "缺省字段应为空");
    }

    #[test]
    fn test_init_notifies_once() {
        let (_host, view, count) = counting_host(r#"{"a":1}"#);
        assert_eq!(count.get(), 1, "初始化应通知一次");
        assert!(view.placeholder().is_none());
    }

    #[test]
    fn test_edit_notifies_only_on_real_change() {
        let (mut host, _view, count) = counting_host(r#"{"active":false}"#);
        host.apply_edit("active", &EditValue::Toggle(true), FieldKind::Boolean)
            .expect("编辑应成功");
        assert_eq!(count.get(), 2, "真实变更应触发通知");
        host.apply_edit("active", &EditValue::Toggle(true), FieldKind::Boolean)
            .expect("编辑应成功");
        assert_eq!(count.get(), 2, "等值编辑不得重复通知");
    }

    #[test]
    fn test_outputs_after_edit() {
        let (mut host, _view, _count) = counting_host(r#"{"count":1}"#);
        host.apply_edit("count", &EditValue::Text("42".into()), FieldKind::Number)
            .expect("编辑应成功");
        let outputs = host.get_outputs();
        assert_eq!(outputs.json_output, r#"{"count":42}"#);
        assert_eq!(outputs.event_kind, "ValueChanged");
        assert_eq!(outputs.event_key, "count");
        assert_eq!(outputs.event_value, "42");
    }

    #[test]
    fn test_copy_disabled_is_ignored() {
        let count = Rc::new(Cell::new(0));
        let probe = count.clone();
        let params = HostParams {
            json_input: r#"{"a":1}"#.to_string(),
            ..HostParams::default()
        };
        let (mut host, _view) = FormHost::new(params, Box::new(move || probe.set(probe.get() + 1)));
        assert!(!host.request_copy(), "开关关闭时应忽略复制请求");
        assert_eq!(count.get(), 1, "被忽略的复制不应通知");
    }

    #[test]
    fn test_update_view_placeholders() {
        let (mut host, _view, _count) = counting_host(r#"{"a":1}"#);
        // 重置标记变化且新文本无效：呈现占位
        let params = HostParams {
            json_input: "{bad".to_string(),
            reset: "r2".to_string(),
            ..HostParams::default()
        };
        let view = host.update_view(params);
        assert_eq!(view.placeholder(), Some(PLACEHOLDER_INVALID_JSON));
    }

    #[test]
    fn test_update_view_filter_without_reload() {
        let (mut host, _view, count) = counting_host(r#"{"a":1,"b":2,"c":3}"#);
        let params = HostParams {
            json_input: r#"{"a":1,"b":2,"c":3}"#.to_string(),
            selected_properties: "c, a".to_string(),
            enable_copy: FLAG_ON.to_string(),
            ..HostParams::default()
        };
        let view = host.update_view(params);
        assert_eq!(count.get(), 1, "仅过滤变化不应触发通知");
        match view.body {
            RenderPlan::Fields(fields) => {
                let keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
                assert_eq!(keys, vec!["a", "c"]);
            }
            other => panic!("期望字段列表，实际为 {:?}", other),
        }
    }
}
