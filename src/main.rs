//! 程序入口：初始化日志，加载JSON数据文件并启动终端表单交互

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing_subscriber::fmt::SubscriberBuilder;

use json_biaodan::utils::fs::{read_text_file, write_text_file};
use json_biaodan::vm::bridge::{FLAG_ON, STATUS_COPIED, STATUS_ERROR_PREFIX, STATUS_READY, STATUS_SAVED};
use json_biaodan::{EditOutcome, EditValue, FieldKind, FormHost, FormView, HostParams, RenderPlan};

fn main() -> Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let mut args = env::args().skip(1);
    let data_path = match args.next() {
        Some(p) => PathBuf::from(p),
        None => bail!("用法: json_biaodan <数据文件.json> [参数文件.json]"),
    };
    let params_path = args.next().map(PathBuf::from);

    let mut params = load_params(params_path.as_deref())?;
    params.json_input = read_text_file(&data_path)
        .with_context(|| format!("读取数据文件失败: {}", data_path.display()))?;

    let (mut host, view) = FormHost::new(
        params.clone(),
        Box::new(|| {
            tracing::info!("输出已变更，宿主可重新读取");
        }),
    );
    println!("{}", STATUS_READY);
    println!("命令: key=value 编辑 | show 重新渲染 | copy 复制 | save <路径> 保存 | quit 退出");
    print_view(&view);

    // 终端交互循环：所有操作在单线程事件序列上依次完成
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        if line == "show" {
            let view = host.update_view(params.clone());
            print_view(&view);
            continue;
        }
        if line == "copy" {
            if host.request_copy() {
                println!("{}", STATUS_COPIED);
            }
            continue;
        }
        if let Some(path) = line.strip_prefix("save ") {
            save_outputs(&host, Path::new(path.trim()))?;
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            handle_edit(&mut host, &params, key.trim(), value.trim());
            continue;
        }
        println!("未识别的命令: {}", line);
    }
    Ok(())
}

/// 读取宿主参数文件；未提供时使用演示默认（启用复制）
fn load_params(path: Option<&Path>) -> Result<HostParams> {
    match path {
        Some(p) => {
            let text = read_text_file(p)
                .with_context(|| format!("读取参数文件失败: {}", p.display()))?;
            let params: HostParams =
                serde_json::from_str(&text).context("参数文件不是有效JSON")?;
            Ok(params)
        }
        None => Ok(HostParams {
            enable_copy: FLAG_ON.to_string(),
            ..HostParams::default()
        }),
    }
}

/// 打印当前视图：占位文案或逐字段的标签/类型/编辑值
fn print_view(view: &FormView) {
    if let Some(message) = view.placeholder() {
        println!("{}", message);
        return;
    }
    let RenderPlan::Fields(fields) = &view.body else {
        return;
    };
    println!(
        "(背景 {} / 标题字号 {} / 值字号 {} / 边距 {})",
        view.style.background_color,
        view.style.headings_font_size,
        view.style.values_font_size,
        view.style.margins
    );
    for field in fields {
        let shown = match &field.edit_value {
            EditValue::Text(text) => text.clone(),
            EditValue::Toggle(checked) => {
                if *checked {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
        };
        println!("{} [{:?}]: {}", field.label, field.kind, shown);
    }
}

/// 处理一次 key=value 编辑：按当前渲染计划确定字段类型后提交引擎
fn handle_edit(host: &mut FormHost, params: &HostParams, key: &str, value: &str) {
    let view = host.update_view(params.clone());
    let RenderPlan::Fields(fields) = view.body else {
        println!("当前无可编辑字段");
        return;
    };
    let Some(field) = fields.iter().find(|f| f.key == key) else {
        println!("未找到字段: {}", key);
        return;
    };
    let raw = match field.kind {
        FieldKind::Boolean => match value {
            "true" | "1" => EditValue::Toggle(true),
            "false" | "0" => EditValue::Toggle(false),
            other => {
                println!("布尔字段请输入 true/false，收到: {}", other);
                return;
            }
        },
        _ => EditValue::Text(value.to_string()),
    };
    match host.apply_edit(key, &raw, field.kind) {
        Ok(EditOutcome::Changed) => {
            let outputs = host.get_outputs();
            println!("已更新: {}", outputs.json_output);
        }
        Ok(EditOutcome::Unchanged) => println!("值未变化"),
        Err(e) => println!("{}{}", STATUS_ERROR_PREFIX, e),
    }
}

/// 把当前规范JSON文本写回文件（演示宿主的持久化动作）
fn save_outputs(host: &FormHost, path: &Path) -> Result<()> {
    let outputs = host.get_outputs();
    write_text_file(path, &outputs.json_output)
        .with_context(|| format!("写入失败: {}", path.display()))?;
    println!("{}: {}", STATUS_SAVED, path.display());
    Ok(())
}
