// ==========================================
// 选课与学业档案引擎 - 领域类型定义
// ==========================================
// 职责: 学期、选课状态、课程类型等枚举
// 存储: 统一以 SCREAMING_SNAKE_CASE 字符串落库
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 学期 (Semester)
// ==========================================
// 顺序: 同一自然年内 Spring < Summer < Fall
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Semester {
    Spring, // 春季
    Summer, // 夏季
    Fall,   // 秋季
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Semester {
    /// 数据库存储值
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Semester::Spring => "SPRING",
            Semester::Summer => "SUMMER",
            Semester::Fall => "FALL",
        }
    }

    /// 从字符串解析（大小写不敏感）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SPRING" => Some(Semester::Spring),
            "SUMMER" => Some(Semester::Summer),
            "FALL" | "AUTUMN" => Some(Semester::Fall),
            _ => None,
        }
    }
}

// ==========================================
// 选课状态 (Enrollment Status)
// ==========================================
// 状态机: Enrolled → Dropped / Enrolled → Completed
// 红线: Dropped / Completed 为终态，重新选课必须新建记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Enrolled,  // 在读
    Dropped,   // 已退课
    Completed, // 已结课（成绩已登记）
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl EnrollmentStatus {
    /// 数据库存储值
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Enrolled => "ENROLLED",
            EnrollmentStatus::Dropped => "DROPPED",
            EnrollmentStatus::Completed => "COMPLETED",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ENROLLED" => Some(EnrollmentStatus::Enrolled),
            "DROPPED" => Some(EnrollmentStatus::Dropped),
            "COMPLETED" => Some(EnrollmentStatus::Completed),
            _ => None,
        }
    }

    /// 是否为在读（活跃）状态
    pub fn is_active(&self) -> bool {
        matches!(self, EnrollmentStatus::Enrolled)
    }

    /// 状态转换是否合法
    pub fn can_transition_to(&self, next: EnrollmentStatus) -> bool {
        matches!(
            (self, next),
            (EnrollmentStatus::Enrolled, EnrollmentStatus::Dropped)
                | (EnrollmentStatus::Enrolled, EnrollmentStatus::Completed)
        )
    }
}

// ==========================================
// 课程类型 (Course Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseType {
    Core,             // 公共核心
    Major,            // 专业课
    Elective,         // 选修
    GeneralEducation, // 通识
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl CourseType {
    /// 数据库存储值
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CourseType::Core => "CORE",
            CourseType::Major => "MAJOR",
            CourseType::Elective => "ELECTIVE",
            CourseType::GeneralEducation => "GENERAL_EDUCATION",
        }
    }

    /// 从字符串解析，未知值回退为 Elective
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "CORE" => CourseType::Core,
            "MAJOR" => CourseType::Major,
            "GENERAL_EDUCATION" | "GENERAL" => CourseType::GeneralEducation,
            _ => CourseType::Elective, // 默认值
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semester_order_within_year() {
        assert!(Semester::Spring < Semester::Summer);
        assert!(Semester::Summer < Semester::Fall);
        assert_eq!(Semester::from_str(" fall "), Some(Semester::Fall));
        assert_eq!(Semester::from_str("winter"), None);
    }

    #[test]
    fn test_enrollment_status_transitions() {
        use EnrollmentStatus::*;
        assert!(Enrolled.can_transition_to(Dropped));
        assert!(Enrolled.can_transition_to(Completed));
        assert!(!Dropped.can_transition_to(Enrolled));
        assert!(!Completed.can_transition_to(Enrolled));
        assert!(!Completed.can_transition_to(Dropped));
        assert!(!Enrolled.can_transition_to(Enrolled));
    }

    #[test]
    fn test_status_db_round_trip() {
        for s in [
            EnrollmentStatus::Enrolled,
            EnrollmentStatus::Dropped,
            EnrollmentStatus::Completed,
        ] {
            assert_eq!(EnrollmentStatus::from_str(s.to_db_str()), Some(s));
        }
        assert_eq!(CourseType::from_str("unknown"), CourseType::Elective);
    }
}
