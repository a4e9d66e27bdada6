// ==========================================
// 选课与学业档案引擎 - CSV 文件解析器
// ==========================================
// 输出: 每行一个 表头 → 值 映射（已 trim，空白行跳过）
// 行号: 保留 CSV 读取器给出的文件行号，空白行跳过后依然对应原文件
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 原始行（表头 → 值）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub line: usize, // 文件行号（表头为第 1 行）
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new(line: usize, fields: HashMap<String, String>) -> Self {
        Self { line, fields }
    }

    pub fn get(&self, column: &str) -> Option<&String> {
        self.fields.get(column)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 解析 CSV 文件
    pub fn parse_file(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        // 检查文件存在
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = file_path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(file_path)?;
        self.parse_reader(file)
    }

    /// 从任意 Reader 解析（首行为表头，表头统一小写）
    pub fn parse_reader<R: Read>(&self, source: R) -> ImportResult<Vec<RawRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(source);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawRecord::new(line, row_map));
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "Student_ID,course_id,grade").unwrap();
        writeln!(temp_file, "S1, C1 ,A").unwrap();
        writeln!(temp_file, "S2,C1,B-").unwrap();

        let records = CsvParser.parse_file(temp_file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("student_id"), Some(&"S1".to_string()));
        assert_eq!(records[0].get("course_id"), Some(&"C1".to_string()));
        assert_eq!(records[1].get("grade"), Some(&"B-".to_string()));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_file(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let data = "student_id,grade\nS1,A\n,\nS2,B\n";
        let records = CsvParser.parse_reader(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        // 跳过空白行后仍保留原文件行号
        assert_eq!(records[0].line, 2);
        assert_eq!(records[1].line, 4);
    }
}
