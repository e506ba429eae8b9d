//! IO helper: raw text read/write for JSON documents

use std::{fs, path::Path};

use crate::model::form_core::FormError;

/// 读取JSON文本文件。不在此处解析：解析交由表单引擎，便于呈现占位状态
pub fn read_text_file(p: &Path) -> Result<String, FormError> {
    Ok(fs::read_to_string(p)?)
}

/// 将规范JSON文本写回文件
pub fn write_text_file(p: &Path, text: &str) -> Result<(), FormError> {
    Ok(fs::write(p, text)?)
}
