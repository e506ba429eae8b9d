//! 字段模型（Field Model）：按运行时JSON值推断输入控件类型，并提供显示与回写的双向转换

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// 字段类型（决定输入控件与字符串↔值的转换规则）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Boolean,
    Number,
    Date,
    Text,
}

/// 输入控件可直接使用的编辑值
#[derive(Debug, Clone, PartialEq)]
pub enum EditValue {
    /// 文本框内容（Number/Date/Text字段）
    Text(String),
    /// 勾选状态（Boolean字段）
    Toggle(bool),
}

/// 推断字段类型。检查顺序为固定契约：布尔 → 数字 → 日期 → 文本，
/// 布尔值不做日期检查，原生数字也不做日期检查
pub fn classify(value: &Value) -> FieldKind {
    match value {
        Value::Bool(_) => FieldKind::Boolean,
        Value::Number(_) => FieldKind::Number,
        other => {
            if parse_date_local(&display_string(other)).is_some() {
                FieldKind::Date
            } else {
                FieldKind::Text
            }
        }
    }
}

/// 值的显示字符串：字符串取原文（不带引号），null为"null"，
/// 嵌套对象/数组仅按紧凑JSON串展示
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

/// 尝试把字符串解析为日历日期。带时区偏移的输入先换算到本地时区再取日；
/// 无偏移的输入按本地挂钟时间处理
pub fn parse_date_local(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
        return Some(d);
    }
    None
}

/// 以年、1基补零月、补零日构造 `YYYY-MM-DD`
pub fn format_ymd(d: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())
}

/// 生成输入控件的编辑值
pub fn to_edit_value(value: &Value, kind: FieldKind) -> EditValue {
    match kind {
        FieldKind::Boolean => EditValue::Toggle(value.as_bool().unwrap_or(false)),
        FieldKind::Date => {
            let text = display_string(value);
            match parse_date_local(&text) {
                Some(d) => EditValue::Text(format_ymd(d)),
                None => EditValue::Text(text),
            }
        }
        FieldKind::Number | FieldKind::Text => EditValue::Text(display_string(value)),
    }
}

/// 把编辑值按字段类型转换回JSON值
pub fn from_edit_value(raw: &EditValue, kind: FieldKind) -> Value {
    match (kind, raw) {
        (FieldKind::Boolean, EditValue::Toggle(checked)) => Value::Bool(*checked),
        (FieldKind::Number, EditValue::Text(s)) => coerce_number(s),
        // 日期编辑串原样存储，不回转为原值格式
        (_, EditValue::Text(s)) => Value::String(s.clone()),
        (_, EditValue::Toggle(checked)) => Value::Bool(*checked),
    }
}

/// 数字转换：整数优先，`42` 不得序列化为 `42.0`；
/// 解析失败时按原始字符串存储（沿用既有回退行为）
fn coerce_number(s: &str) -> Value {
    let t = s.trim();
    if let Ok(i) = t.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(u) = t.parse::<u64>() {
        return Value::Number(u.into());
    }
    if let Ok(f) = t.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(s.to_string())
}

/// 键名转标题样式：词首大写、词内到下一处空白整体小写；
/// 仅按空白切词，下划线、连字符等不拆分
pub fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_uppercase());
            while let Some(&next) = chars.peek() {
                if next.is_whitespace() {
                    break;
                }
                chars.next();
                out.push(next.to_ascii_lowercase());
            }
        } else {
            out.push(c);
        }
    }
    out
}
