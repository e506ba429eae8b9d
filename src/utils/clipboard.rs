//! Clipboard  cross-platform clipboard helpers

use thiserror::Error;

/// 剪贴板访问错误（非致命：调用方记录日志后继续）
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("剪贴板不可用: {0}")]
    Unavailable(String),
    #[error("剪贴板写入失败: {0}")]
    Write(String),
    #[error("剪贴板读取失败: {0}")]
    Read(String),
}

/// 将文本复制到系统剪贴板。无图形环境时返回Unavailable
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    use copypasta::{ClipboardContext, ClipboardProvider};
    let mut ctx = ClipboardContext::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
    ctx.set_contents(text.to_string())
        .map_err(|e| ClipboardError::Write(e.to_string()))
}

/// 从系统剪贴板读取文本（用于复制结果校验）
#[cfg(test)]
pub fn get_clipboard_contents() -> Result<String, ClipboardError> {
    use copypasta::{ClipboardContext, ClipboardProvider};
    let mut ctx = ClipboardContext::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
    ctx.get_contents().map_err(|e| ClipboardError::Read(e.to_string()))
}

/// 剪贴板测试串行锁：系统剪贴板是全局资源，相关测试不可并发
#[cfg(test)]
pub static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
