// ==========================================
// 选课与学业档案引擎 - 成绩政策
// ==========================================
// 职责: 成绩字母 ⇄ 绩点映射，合法性 / 可识别 / 计入GPA / 及格 判定
// 红线: 纯函数，无状态，不访问数据库
// 约束: 所有比较均先 trim 再忽略大小写
// ==========================================

/// 计入 GPA 的字母成绩表（标准 11 档）
const GPA_GRADES: [(&str, f64); 11] = [
    ("A", 4.0),
    ("A-", 3.7),
    ("B+", 3.3),
    ("B", 3.0),
    ("B-", 2.7),
    ("C+", 2.3),
    ("C", 2.0),
    ("C-", 1.7),
    ("D+", 1.3),
    ("D", 1.0),
    ("F", 0.0),
];

/// 不计入 GPA 的成绩代码
const NON_GPA_GRADES: [&str; 5] = ["W", "P", "NP", "TR", "T"];

/// 及格（获得学分）的非 GPA 代码
const PASSING_NON_GPA_GRADES: [&str; 3] = ["P", "TR", "T"];

/// 及格线（D 及以上）
pub const PASSING_POINTS: f64 = 1.0;

fn normalize(grade: &str) -> String {
    grade.trim().to_uppercase()
}

fn lookup_points(grade: &str) -> Option<f64> {
    let g = normalize(grade);
    GPA_GRADES
        .iter()
        .find(|(letter, _)| *letter == g)
        .map(|(_, points)| *points)
}

/// 成绩 → 绩点
///
/// 不计入 GPA 的成绩（含未知字符串）一律返回 0.0
pub fn grade_points(grade: &str) -> f64 {
    lookup_points(grade).unwrap_or(0.0)
}

/// 是否为可登记的成绩（仅 GPA 字母集合）
pub fn is_valid_grade(grade: &str) -> bool {
    lookup_points(grade).is_some()
}

/// 是否为可识别的成绩（GPA 字母 + W/P/NP/TR/T）
pub fn is_recognized_grade(grade: &str) -> bool {
    is_valid_grade(grade) || NON_GPA_GRADES.contains(&normalize(grade).as_str())
}

/// 是否计入 GPA
pub fn counts_toward_gpa(grade: &str) -> bool {
    is_valid_grade(grade)
}

/// 是否及格
///
/// - P / TR / T 及格；NP / W 不及格
/// - 字母成绩绩点 ≥ 1.0 及格
pub fn is_passing(grade: &str) -> bool {
    let g = normalize(grade);
    if PASSING_NON_GPA_GRADES.contains(&g.as_str()) {
        return true;
    }
    match lookup_points(&g) {
        Some(points) => points >= PASSING_POINTS,
        None => false,
    }
}

/// 规范化存储形式（trim + 大写）
pub fn canonical(grade: &str) -> String {
    normalize(grade)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_points_table() {
        assert_eq!(grade_points("A"), 4.0);
        assert_eq!(grade_points("a-"), 3.7);
        assert_eq!(grade_points(" B+ "), 3.3);
        assert_eq!(grade_points("B-"), 2.7);
        assert_eq!(grade_points("D"), 1.0);
        assert_eq!(grade_points("F"), 0.0);
        assert_eq!(grade_points("W"), 0.0);
        assert_eq!(grade_points("Z"), 0.0);
    }

    #[test]
    fn test_valid_and_recognized() {
        assert!(is_valid_grade("c+"));
        assert!(!is_valid_grade("P"));
        assert!(!is_valid_grade("A+"));
        assert!(!is_valid_grade(""));

        assert!(is_recognized_grade("np"));
        assert!(is_recognized_grade("TR"));
        assert!(is_recognized_grade("F"));
        assert!(!is_recognized_grade("X"));

        assert!(counts_toward_gpa("F"));
        assert!(!counts_toward_gpa("W"));
    }

    #[test]
    fn test_passing_rules() {
        assert!(is_passing("P"));
        assert!(is_passing(" tr"));
        assert!(is_passing("T"));
        assert!(!is_passing("NP"));
        assert!(!is_passing("W"));
        assert!(is_passing("D"));
        assert!(is_passing("D+"));
        assert!(!is_passing("F"));
        assert!(!is_passing("garbage"));
    }
}
