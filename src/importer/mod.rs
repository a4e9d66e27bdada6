// ==========================================
// 选课与学业档案引擎 - 导入层
// ==========================================
// 职责: 外部成绩文件导入，逐行经由成绩台账登记
// 支持: CSV
// ==========================================

pub mod error;
pub mod file_parser;
pub mod grade_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, RawRecord};
pub use grade_importer::{GradeImportReport, GradeImporter, GradeRow, RowOutcome};
