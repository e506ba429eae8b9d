//! 表单核心（Form Core）：持有规范JSON文本与解析后的有序映射，
//! 负责键过滤、渲染计划生成、编辑合并与"真实变更"判定

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::field_model::{
    classify, display_string, from_edit_value, title_case, to_edit_value, EditValue, FieldKind,
};
use crate::utils::clipboard::{copy_to_clipboard, ClipboardError};

/// 过滤串的保留占位值，含义为"展示全部键"
pub const FILTER_ALL_SENTINEL: &str = "val";

#[derive(Error, Debug)]
pub enum FormError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("剪贴板失败: {0}")]
    Clipboard(#[from] ClipboardError),
    #[error("状态错误: {0}")]
    State(String),
}

/// 生命周期事件类型（扩展输出用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEventKind {
    FormLoaded,
    FormReset,
    ValueChanged,
    JsonCopied,
}

impl EditEventKind {
    /// 输出给宿主的事件名
    pub fn as_str(self) -> &'static str {
        match self {
            EditEventKind::FormLoaded => "FormLoaded",
            EditEventKind::FormReset => "FormReset",
            EditEventKind::ValueChanged => "ValueChanged",
            EditEventKind::JsonCopied => "JsonCopied",
        }
    }
}

/// 最近一次生命周期事件。单槽保存：宿主两次读取输出之间发生多次编辑时，
/// 只有最后一次被保留
#[derive(Debug, Clone, PartialEq)]
pub struct EditEvent {
    pub kind: EditEventKind,
    /// 被编辑的键，非编辑类事件为空串
    pub key: String,
    /// 新值的字符串形式，非编辑类事件为空串
    pub value: String,
}

/// 渲染计划：占位状态或有序字段列表
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPlan {
    /// 未提供JSON文本
    NoData,
    /// JSON解析失败（或顶层不是对象）
    InvalidJson,
    Fields(Vec<FieldDescriptor>),
}

impl RenderPlan {
    pub fn field_count(&self) -> usize {
        match self {
            RenderPlan::Fields(fields) => fields.len(),
            _ => 0,
        }
    }
}

/// 单个字段的渲染描述。每次渲染重新构建，不跨渲染保存
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub key: String,
    pub kind: FieldKind,
    /// 标题样式的展示标签
    pub label: String,
    /// 原始JSON值
    pub raw_value: Value,
    /// 输入控件使用的编辑值
    pub edit_value: EditValue,
}

/// 编辑合并结果：规范文本是否发生真实变更
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Changed,
    Unchanged,
}

/// 宿主每次刷新提供的配置快照（引擎关心的部分）
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    pub json_text: String,
    /// 逗号分隔的键允许列表，空白或"val"表示全部
    pub selected_properties: String,
    /// 重置标记：取值发生变化（而非其内容）触发重新初始化
    pub reset_marker: String,
}

/// refresh的结果：渲染计划，以及本次是否发生了（重新）加载
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshResult {
    pub plan: RenderPlan,
    pub reloaded: bool,
}

/// 同步引擎：JSON对象 ↔ 可编辑字段列表的双向同步
#[derive(Debug, Default)]
pub struct FormEngine {
    /// 规范JSON文本。成功编辑后恒等于parsed的序列化结果
    text: Option<String>,
    parsed: Option<Map<String, Value>>,
    /// 最近一次加载是否解析失败（仅影响渲染占位，不保留失效文本）
    parse_failed: bool,
    last_event: Option<EditEvent>,
    last_reset_marker: Option<String>,
}

impl FormEngine {
    /// 解析JSON文本并生成渲染计划。解析失败不向外抛出，以占位状态呈现；
    /// 此前的有效文档保留不动
    pub fn load(&mut self, raw_text: &str, filter_spec: &str) -> RenderPlan {
        self.record_event(EditEventKind::FormLoaded, "", "");
        if raw_text.trim().is_empty() {
            self.text = None;
            self.parsed = None;
            self.parse_failed = false;
            return RenderPlan::NoData;
        }
        match serde_json::from_str::<Value>(raw_text) {
            Ok(Value::Object(map)) => {
                tracing::info!("表单加载完成，共 {} 个键", map.len());
                self.text = Some(raw_text.to_string());
                self.parsed = Some(map);
                self.parse_failed = false;
                self.render(filter_spec)
            }
            Ok(_) => {
                tracing::warn!("顶层JSON不是对象，无法生成表单");
                self.parse_failed = true;
                RenderPlan::InvalidJson
            }
            Err(e) => {
                tracing::warn!("JSON解析失败: {}", e);
                self.parse_failed = true;
                RenderPlan::InvalidJson
            }
        }
    }

    /// 按当前文档与过滤串生成渲染计划（不改变状态）
    pub fn render(&self, filter_spec: &str) -> RenderPlan {
        match &self.parsed {
            Some(map) => RenderPlan::Fields(build_fields(map, filter_spec)),
            None if self.parse_failed => RenderPlan::InvalidJson,
            None => RenderPlan::NoData,
        }
    }

    /// 宿主刷新入口：首次调用执行加载，重置标记变化时重新初始化，
    /// 否则按新过滤串重渲染（不重新读取JSON文本）
    pub fn refresh(&mut self, snapshot: &ConfigSnapshot) -> RefreshResult {
        let first = self.last_reset_marker.is_none();
        let marker_changed =
            !first && self.last_reset_marker.as_deref() != Some(snapshot.reset_marker.as_str());
        if first || marker_changed {
            if marker_changed {
                tracing::info!("重置标记变化，重新初始化表单");
            }
            self.last_reset_marker = Some(snapshot.reset_marker.clone());
            let plan = self.load(&snapshot.json_text, &snapshot.selected_properties);
            if marker_changed {
                self.record_event(EditEventKind::FormReset, "", "");
            }
            return RefreshResult { plan, reloaded: true };
        }
        RefreshResult {
            plan: self.render(&snapshot.selected_properties),
            reloaded: false,
        }
    }

    /// 合并一次编辑：按字段类型转换后写入副本，整体重新序列化并与规范文本
    /// 逐字节比较。相同则不提交任何状态（防抖保证）；不同则原子替换并记录
    /// ValueChanged事件
    pub fn apply_edit(
        &mut self,
        key: &str,
        raw: &EditValue,
        kind: FieldKind,
    ) -> Result<EditOutcome, FormError> {
        let current = self
            .parsed
            .as_ref()
            .ok_or_else(|| FormError::State("表单尚未加载".into()))?;
        let coerced = from_edit_value(raw, kind);
        let mut next = current.clone();
        next.insert(key.to_string(), coerced.clone());
        let next_text = serde_json::to_string(&next)?;
        if self.text.as_deref() == Some(next_text.as_str()) {
            return Ok(EditOutcome::Unchanged);
        }
        let value_text = display_string(&coerced);
        self.parsed = Some(next);
        self.text = Some(next_text);
        self.record_event(EditEventKind::ValueChanged, key, &value_text);
        tracing::info!("字段 {} 已更新", key);
        Ok(EditOutcome::Changed)
    }

    /// 把当前规范文本导出到系统剪贴板，成功后记录JsonCopied事件。
    /// 失败不影响文档状态
    pub fn request_copy(&mut self) -> Result<(), FormError> {
        let text = self.text.clone().unwrap_or_default();
        copy_to_clipboard(&text)?;
        self.record_event(EditEventKind::JsonCopied, "", "");
        tracing::info!("规范文本已复制到剪贴板，共 {} 字节", text.len());
        Ok(())
    }

    /// 当前规范JSON文本；尚未加载（或首次加载即失败）时为None
    pub fn canonical_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// 解析后的文档（有序映射）
    pub fn document(&self) -> Option<&Map<String, Value>> {
        self.parsed.as_ref()
    }

    /// 最近一次生命周期事件（非消耗读取）
    pub fn last_event(&self) -> Option<&EditEvent> {
        self.last_event.as_ref()
    }

    fn record_event(&mut self, kind: EditEventKind, key: &str, value: &str) {
        self.last_event = Some(EditEvent {
            kind,
            key: key.to_string(),
            value: value.to_string(),
        });
    }
}

/// 键过滤：空白或保留占位"val"表示全部；否则按逗号拆分、逐项去空白，
/// 输出保持all_keys自身的顺序（与过滤串中的顺序无关）
pub fn filter_keys(all_keys: &[String], filter_spec: &str) -> Vec<String> {
    let spec = filter_spec.trim();
    if spec.is_empty() || spec == FILTER_ALL_SENTINEL {
        return all_keys.to_vec();
    }
    let wanted: Vec<&str> = spec.split(',').map(str::trim).collect();
    all_keys
        .iter()
        .filter(|key| wanted.contains(&key.as_str()))
        .cloned()
        .collect()
}

/// 依据过滤串从文档构建有序字段列表
fn build_fields(map: &Map<String, Value>, filter_spec: &str) -> Vec<FieldDescriptor> {
    let all_keys: Vec<String> = map.keys().cloned().collect();
    filter_keys(&all_keys, filter_spec)
        .into_iter()
        .filter_map(|key| {
            map.get(&key).map(|value| {
                let kind = classify(value);
                FieldDescriptor {
                    label: title_case(&key),
                    kind,
                    raw_value: value.clone(),
                    edit_value: to_edit_value(value, kind),
                    key,
                }
            })
        })
        .collect()
}
