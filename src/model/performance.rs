//! 性能基准模块
//!
//! 用于测试大体量扁平JSON的解析与渲染计划构建开销

use std::time::Instant;

use serde_json::{json, Map, Value};

use crate::model::form_core::FormEngine;

/// 性能测试结果
#[derive(Debug)]
pub struct PerformanceResult {
    pub operation: String,
    pub duration_ms: u128,
    pub success: bool,
    pub details: String,
}

impl PerformanceResult {
    pub fn new(operation: &str, duration_ms: u128, success: bool, details: &str) -> Self {
        Self {
            operation: operation.to_string(),
            duration_ms,
            success,
            details: details.to_string(),
        }
    }
}

/// 生成大体量扁平测试对象（混合布尔/数字/日期串/文本/null字段）
pub fn generate_large_form_json(width: usize) -> Value {
    let mut obj = Map::new();
    for i in 0..width {
        let key = format!("field_{}", i);
        let value = match i % 5 {
            0 => json!(format!("文本值_{}", i)),
            1 => json!(i as i64),
            2 => json!(i % 2 == 0),
            3 => json!(format!("2024-03-{:02}", i % 28 + 1)),
            _ => json!(null),
        };
        obj.insert(key, value);
    }
    Value::Object(obj)
}

/// 测试JSON解析性能
pub fn benchmark_json_parsing(json_str: &str) -> PerformanceResult {
    let start = Instant::now();
    let parse_result = serde_json::from_str::<Value>(json_str);
    let duration = start.elapsed();

    match parse_result {
        Ok(_) => PerformanceResult::new(
            "JSON解析",
            duration.as_millis(),
            true,
            &format!("解析了 {} 字节的JSON", json_str.len()),
        ),
        Err(e) => PerformanceResult::new(
            "JSON解析",
            duration.as_millis(),
            false,
            &format!("解析失败: {}", e),
        ),
    }
}

/// 测试渲染计划构建性能（含逐字段类型推断）
pub fn benchmark_render_plan(json_str: &str) -> PerformanceResult {
    let mut engine = FormEngine::default();
    let start = Instant::now();
    let plan = engine.load(json_str, "");
    let duration = start.elapsed();

    let count = plan.field_count();
    PerformanceResult::new(
        "渲染计划构建",
        duration.as_millis(),
        count > 0,
        &format!("构建了 {} 个字段", count),
    )
}

/// 运行综合性能测试
pub fn run_performance_suite() -> Vec<PerformanceResult> {
    let mut results = Vec::new();

    for width in [100, 1000, 5000] {
        let json_data = generate_large_form_json(width);

        let start = Instant::now();
        let json_str = serde_json::to_string(&json_data).unwrap_or_default();
        results.push(PerformanceResult::new(
            &format!("JSON序列化({}字段)", width),
            start.elapsed().as_millis(),
            !json_str.is_empty(),
            &format!("序列化了 {} 字节", json_str.len()),
        ));

        results.push(benchmark_json_parsing(&json_str));
        results.push(benchmark_render_plan(&json_str));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_large_form_json() {
        let json = generate_large_form_json(10);
        let obj = json.as_object().expect("应生成对象");
        assert_eq!(obj.len(), 10);
        assert!(obj.contains_key("field_0"));
    }

    #[test]
    fn test_performance_smoke() {
        let json = generate_large_form_json(500);
        let json_str = serde_json::to_string(&json).expect("序列化失败");

        let parse_result = benchmark_json_parsing(&json_str);
        assert!(parse_result.success);
        assert!(parse_result.duration_ms < 1000, "解析应在1秒内完成");

        let plan_result = benchmark_render_plan(&json_str);
        assert!(plan_result.success);
        assert!(plan_result.duration_ms < 1000, "渲染计划构建应在1秒内完成");
    }

    #[test]
    fn test_run_performance_suite() {
        let results = run_performance_suite();
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.success), "综合性能测试应全部成功");
    }
}
