// ==========================================
// 选课与学业档案引擎 - CSV 成绩批量导入
// ==========================================
// 输入列: student_id, course_id, section_id, grade, semester, year
// 红线: 每行经由成绩台账独立登记（各自一个事务，各自触发 GPA 重算）
// 红线: 行级失败记入报告后继续，文件级失败整体中止
// ==========================================

use crate::api::TranscriptApi;
use crate::domain::student::Actor;
use crate::domain::types::Semester;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, RawRecord};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 必需列
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "student_id",
    "course_id",
    "section_id",
    "grade",
    "semester",
    "year",
];

// ==========================================
// 导入结果
// ==========================================

/// 单行成绩（已完成类型转换）
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRow {
    pub student_id: String,
    pub course_id: String,
    pub section_id: String,
    pub grade: String,
    pub semester: Semester,
    pub year: i32,
}

/// 单行处理结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowOutcome {
    Imported { row: usize, transcript_id: String },
    Failed { row: usize, reason: String },
}

/// 导入报告
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradeImportReport {
    pub total_rows: usize,
    pub imported: usize,
    pub failed: usize,
    pub outcomes: Vec<RowOutcome>,
}

impl GradeImportReport {
    fn push(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Imported { .. } => self.imported += 1,
            RowOutcome::Failed { .. } => self.failed += 1,
        }
        self.total_rows += 1;
        self.outcomes.push(outcome);
    }
}

// ==========================================
// GradeImporter - 成绩导入器
// ==========================================
pub struct GradeImporter {
    transcript_api: Arc<TranscriptApi>,
    parser: CsvParser,
}

impl GradeImporter {
    pub fn new(transcript_api: Arc<TranscriptApi>) -> Self {
        Self {
            transcript_api,
            parser: CsvParser,
        }
    }

    /// 从 CSV 文件导入
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn import_file(&self, file_path: &Path, actor: &Actor) -> ImportResult<GradeImportReport> {
        let records = self.parser.parse_file(file_path)?;
        self.import_records(&records, actor)
    }

    /// 从 Reader 导入
    pub fn import_reader<R: Read>(
        &self,
        source: R,
        actor: &Actor,
    ) -> ImportResult<GradeImportReport> {
        let records = self.parser.parse_reader(source)?;
        self.import_records(&records, actor)
    }

    /// 逐行登记
    ///
    /// # 返回
    /// - Ok(GradeImportReport): 每行结果（行号为文件行号，表头为第 1 行）
    /// - Err(MissingColumn): 表头缺少必需列
    pub fn import_records(
        &self,
        records: &[RawRecord],
        actor: &Actor,
    ) -> ImportResult<GradeImportReport> {
        if let Some(first) = records.first() {
            for column in REQUIRED_COLUMNS {
                if !first.contains_key(column) {
                    return Err(ImportError::MissingColumn(column.to_string()));
                }
            }
        }

        let mut report = GradeImportReport::default();
        for raw in records {
            let row = raw.line;
            let outcome = match map_row(raw) {
                Ok(parsed) => self.post_row(row, &parsed, actor),
                Err(e) => RowOutcome::Failed {
                    row,
                    reason: e.to_string(),
                },
            };
            if let RowOutcome::Failed { reason, .. } = &outcome {
                warn!(row, reason = %reason, "成绩行导入失败");
            }
            report.push(outcome);
        }

        info!(
            total = report.total_rows,
            imported = report.imported,
            failed = report.failed,
            "成绩导入完成"
        );
        Ok(report)
    }

    fn post_row(&self, row: usize, parsed: &GradeRow, actor: &Actor) -> RowOutcome {
        match self.transcript_api.create_transcript(
            &parsed.student_id,
            &parsed.course_id,
            &parsed.section_id,
            &parsed.grade,
            parsed.semester,
            parsed.year,
            actor,
        ) {
            Ok(t) => RowOutcome::Imported {
                row,
                transcript_id: t.transcript_id,
            },
            Err(e) => RowOutcome::Failed {
                row,
                reason: e.to_string(),
            },
        }
    }
}

/// 原始行 → GradeRow
pub fn map_row(raw: &RawRecord) -> ImportResult<GradeRow> {
    let row = raw.line;
    let field = |name: &str| -> ImportResult<String> {
        match raw.get(name) {
            Some(v) if !v.is_empty() => Ok(v.clone()),
            _ => Err(ImportError::FieldMissing {
                row,
                field: name.to_string(),
            }),
        }
    };

    let semester_raw = field("semester")?;
    let semester =
        Semester::from_str(&semester_raw).ok_or_else(|| ImportError::TypeConversionError {
            row,
            field: "semester".to_string(),
            message: format!("未知学期: {}", semester_raw),
        })?;

    let year_raw = field("year")?;
    let year = year_raw
        .parse::<i32>()
        .map_err(|e| ImportError::TypeConversionError {
            row,
            field: "year".to_string(),
            message: e.to_string(),
        })?;

    Ok(GradeRow {
        student_id: field("student_id")?,
        course_id: field("course_id")?,
        section_id: field("section_id")?,
        grade: field("grade")?,
        semester,
        year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn raw(line: usize, pairs: &[(&str, &str)]) -> RawRecord {
        let fields = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        RawRecord::new(line, fields)
    }

    #[test]
    fn test_map_row_ok() {
        let r = raw(2, &[
            ("student_id", "S1"),
            ("course_id", "C1"),
            ("section_id", "SEC1"),
            ("grade", "b+"),
            ("semester", "fall"),
            ("year", "2026"),
        ]);
        let row = map_row(&r).unwrap();
        assert_eq!(row.semester, Semester::Fall);
        assert_eq!(row.year, 2026);
        assert_eq!(row.grade, "b+");
    }

    #[test]
    fn test_map_row_errors() {
        let r = raw(3, &[
            ("student_id", "S1"),
            ("course_id", "C1"),
            ("section_id", "SEC1"),
            ("grade", "A"),
            ("semester", "winter"),
            ("year", "2026"),
        ]);
        assert!(matches!(
            map_row(&r),
            Err(ImportError::TypeConversionError { row: 3, .. })
        ));

        let r = raw(4, &[("student_id", ""), ("semester", "FALL"), ("year", "x")]);
        assert!(matches!(map_row(&r), Err(ImportError::TypeConversionError { .. })));

        let r = raw(5, &[("student_id", ""), ("semester", "FALL"), ("year", "2026")]);
        assert!(matches!(map_row(&r), Err(ImportError::FieldMissing { row: 5, .. })));
    }
}
