// ==========================================
// 选课与学业档案引擎 - GPA 计算引擎
// ==========================================
// 职责: 学分加权 GPA、已获学分、按学期分组
// 红线: Engine 不拼 SQL；输入为成绩记录切片，输出为纯值
// ==========================================
// 口径:
// - GPA = round(Σ(绩点 × 学分) / Σ学分, 2)，仅统计计入 GPA 的成绩（F 以 0.0 计入）
// - W / P / NP / TR / T 分子分母均不计
// - 已获学分 = 及格成绩的学分之和
// ==========================================

use crate::domain::student::GpaSnapshot;
use crate::domain::transcript::{SemesterTranscript, Transcript};
use crate::domain::types::Semester;
use crate::engine::grade_policy;
use std::collections::BTreeMap;

/// 四舍五入到两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 学分加权 GPA（两位小数）
///
/// 无计入 GPA 的记录时返回 0.0
pub fn weighted_gpa<'a, I>(rows: I) -> f64
where
    I: IntoIterator<Item = &'a Transcript>,
{
    let (quality_points, credits) = rows
        .into_iter()
        .filter(|t| grade_policy::counts_toward_gpa(&t.grade))
        .fold((0.0_f64, 0_i32), |(qp, cr), t| {
            (qp + t.quality_points(), cr + t.credit_hours)
        });

    if credits <= 0 {
        return 0.0;
    }
    round2(quality_points / f64::from(credits))
}

/// 已获学分（仅及格记录）
pub fn completed_credits(rows: &[Transcript]) -> i32 {
    rows.iter()
        .filter(|t| grade_policy::is_passing(&t.grade))
        .map(|t| t.credit_hours)
        .sum()
}

/// 全量重算学生派生字段
///
/// 作为成绩台账写事务的重算闭包使用
pub fn snapshot(rows: &[Transcript]) -> GpaSnapshot {
    if rows.is_empty() {
        return GpaSnapshot::zero();
    }
    GpaSnapshot {
        gpa: weighted_gpa(rows),
        completed_credits: completed_credits(rows),
    }
}

/// 指定学期的 GPA，无记录返回 0.0
pub fn semester_gpa(rows: &[Transcript], semester: Semester, year: i32) -> f64 {
    weighted_gpa(
        rows.iter()
            .filter(|t| t.semester == semester && t.year == year),
    )
}

/// 按 (学年, 学期) 分组，最近学期在前
pub fn group_by_semester(rows: &[Transcript]) -> Vec<SemesterTranscript> {
    let mut groups: BTreeMap<(i32, Semester), Vec<Transcript>> = BTreeMap::new();
    for t in rows {
        groups.entry((t.year, t.semester)).or_default().push(t.clone());
    }

    groups
        .into_iter()
        .rev()
        .map(|((year, semester), records)| SemesterTranscript {
            semester,
            year,
            semester_gpa: weighted_gpa(&records),
            credit_hours: records.iter().map(|t| t.credit_hours).sum(),
            records,
        })
        .collect()
}

/// 完成百分比（两位小数），要求学分为 0 时返回 0.0
pub fn completion_percentage(completed: i32, required: i32) -> f64 {
    if required <= 0 {
        return 0.0;
    }
    round2(100.0 * f64::from(completed) / f64::from(required))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn t(course: &str, grade: &str, credits: i32, semester: Semester, year: i32) -> Transcript {
        Transcript {
            transcript_id: format!("T-{}", course),
            student_id: "S1".to_string(),
            course_id: course.to_string(),
            section_id: format!("SEC-{}", course),
            grade: grade.to_string(),
            grade_points: grade_policy::grade_points(grade),
            credit_hours: credits,
            semester,
            year,
            completed_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_weighted_gpa_example() {
        let rows = vec![
            t("C1", "A", 3, Semester::Fall, 2025),
            t("C2", "B-", 4, Semester::Fall, 2025),
        ];
        // (4.0×3 + 2.7×4) / 7 = 22.8 / 7
        let snap = snapshot(&rows);
        assert_eq!(snap.gpa, 3.26);
        assert_eq!(snap.completed_credits, 7);
    }

    #[test]
    fn test_failed_counts_withdrawn_excluded() {
        let rows = vec![
            t("C1", "F", 3, Semester::Fall, 2025),
            t("C2", "B", 3, Semester::Fall, 2025),
            t("C3", "W", 3, Semester::Fall, 2025),
        ];
        let snap = snapshot(&rows);
        assert_eq!(snap.completed_credits, 3);
        assert_eq!(snap.gpa, 1.50);
    }

    #[test]
    fn test_pass_only_rows_give_zero_gpa_but_credits() {
        let rows = vec![t("C1", "P", 3, Semester::Spring, 2025)];
        let snap = snapshot(&rows);
        assert_eq!(snap.gpa, 0.0);
        assert_eq!(snap.completed_credits, 3);
        assert_eq!(snapshot(&[]), GpaSnapshot::zero());
    }

    #[test]
    fn test_removing_row_equals_never_added() {
        let base = vec![
            t("C1", "A", 3, Semester::Fall, 2025),
            t("C2", "C+", 4, Semester::Spring, 2026),
        ];
        let mut with_extra = base.clone();
        with_extra.push(t("C3", "D", 2, Semester::Spring, 2026));
        with_extra.retain(|r| r.course_id != "C3");
        assert_eq!(snapshot(&with_extra), snapshot(&base));
    }

    #[test]
    fn test_group_by_semester_most_recent_first() {
        let rows = vec![
            t("C1", "A", 3, Semester::Fall, 2025),
            t("C2", "B", 3, Semester::Spring, 2026),
            t("C3", "C", 3, Semester::Fall, 2026),
            t("C4", "A", 3, Semester::Fall, 2026),
        ];
        let groups = group_by_semester(&rows);
        let keys: Vec<_> = groups.iter().map(|g| (g.year, g.semester)).collect();
        assert_eq!(
            keys,
            vec![
                (2026, Semester::Fall),
                (2026, Semester::Spring),
                (2025, Semester::Fall)
            ]
        );
        assert_eq!(groups[0].semester_gpa, 3.0);
        assert_eq!(groups[0].credit_hours, 6);

        assert_eq!(semester_gpa(&rows, Semester::Spring, 2026), 3.0);
        assert_eq!(semester_gpa(&rows, Semester::Summer, 2026), 0.0);
    }

    #[test]
    fn test_completion_percentage_guards_zero() {
        assert_eq!(completion_percentage(30, 0), 0.0);
        assert_eq!(completion_percentage(40, 120), 33.33);
    }
}
