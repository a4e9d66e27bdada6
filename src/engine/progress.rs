// ==========================================
// 选课与学业档案引擎 - 学业进度引擎
// ==========================================
// 职责: 将成绩与在读课程对照培养方案，生成进度报告
// 红线: 每门方案课程恰好落入一个分桶（Completed / InProgress / Remaining）
// 红线: 无培养方案 / 无成绩 / 无在读课程 一律降级为零值，不报错
// ==========================================

use crate::domain::academic_plan::{
    AcademicPlan, AcademicPlanCourse, AcademicProgress, ProgressBucket, ProgressCourse,
    MAJOR_NOT_ASSIGNED,
};
use crate::domain::student::Student;
use crate::domain::transcript::Transcript;
use crate::engine::gpa::completion_percentage;
use crate::engine::grade_policy;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// 默认每学年可修学分
pub const DEFAULT_CREDITS_PER_YEAR: i32 = 30;

// ==========================================
// ProgressEngine - 学业进度引擎
// ==========================================
pub struct ProgressEngine {
    credits_per_year: i32,
}

impl ProgressEngine {
    /// 创建进度引擎
    ///
    /// # 参数
    /// - `credits_per_year`: 每学年学分（≤0 时回退默认值）
    pub fn new(credits_per_year: i32) -> Self {
        let credits_per_year = if credits_per_year > 0 {
            credits_per_year
        } else {
            DEFAULT_CREDITS_PER_YEAR
        };
        Self { credits_per_year }
    }

    /// 生成学业进度报告
    ///
    /// # 参数
    /// - `student`: 学生档案（提供姓名与缓存 GPA）
    /// - `plan`: 培养方案（None 表示未分配）
    /// - `transcripts`: 学生全部成绩（时间顺序）
    /// - `in_progress_course_ids`: 在读（ENROLLED）选课对应的课程ID
    /// - `current_year`: 当前年份
    #[instrument(skip_all, fields(student_id = %student.student_id))]
    pub fn build_report(
        &self,
        student: &Student,
        plan: Option<&AcademicPlan>,
        transcripts: &[Transcript],
        in_progress_course_ids: &HashSet<String>,
        current_year: i32,
    ) -> AcademicProgress {
        let plan = match plan {
            Some(p) => p,
            None => return Self::unassigned(student, current_year),
        };

        let completed_grades = passing_grades_by_course(transcripts);

        let mut completed_courses = Vec::new();
        let mut in_progress_courses = Vec::new();
        let mut remaining_courses = Vec::new();

        for course in sorted_plan_courses(plan) {
            match classify(&course.course_id, &completed_grades, in_progress_course_ids) {
                ProgressBucket::Completed => {
                    let grade = completed_grades.get(&course.course_id).cloned();
                    completed_courses.push(to_progress_course(course, grade));
                }
                ProgressBucket::InProgress => {
                    in_progress_courses.push(to_progress_course(course, None))
                }
                ProgressBucket::Remaining => {
                    remaining_courses.push(to_progress_course(course, None))
                }
            }
        }

        let total = plan.total_credits_required;
        let credits_completed: i32 = completed_courses.iter().map(|c| c.credit_hours).sum();
        let credits_remaining = (total - credits_completed).max(0);

        tracing::debug!(
            completed = completed_courses.len(),
            in_progress = in_progress_courses.len(),
            remaining = remaining_courses.len(),
            "进度分桶完成"
        );

        AcademicProgress {
            student_id: student.student_id.clone(),
            student_name: student.full_name.clone(),
            major_name: plan.major_name.clone(),
            total_credits_required: total,
            credits_completed,
            credits_remaining,
            progress_percentage: completion_percentage(credits_completed, total),
            expected_graduation_year: self
                .expected_graduation_year(current_year, credits_remaining),
            current_gpa: student.gpa,
            completed_courses,
            in_progress_courses,
            remaining_courses,
        }
    }

    /// 预计毕业年份 = 当前年份 + ceil(剩余学分 / 每学年学分)
    pub fn expected_graduation_year(&self, current_year: i32, credits_remaining: i32) -> i32 {
        let remaining = credits_remaining.max(0);
        let years = (remaining + self.credits_per_year - 1) / self.credits_per_year;
        current_year + years
    }

    fn unassigned(student: &Student, current_year: i32) -> AcademicProgress {
        AcademicProgress {
            student_id: student.student_id.clone(),
            student_name: student.full_name.clone(),
            major_name: MAJOR_NOT_ASSIGNED.to_string(),
            total_credits_required: 0,
            credits_completed: 0,
            credits_remaining: 0,
            progress_percentage: 0.0,
            expected_graduation_year: current_year,
            current_gpa: student.gpa,
            completed_courses: Vec::new(),
            in_progress_courses: Vec::new(),
            remaining_courses: Vec::new(),
        }
    }
}

impl Default for ProgressEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CREDITS_PER_YEAR)
    }
}

/// 单门课程分桶：Completed 优先于 InProgress
pub fn classify(
    course_id: &str,
    completed: &HashMap<String, String>,
    in_progress: &HashSet<String>,
) -> ProgressBucket {
    if completed.contains_key(course_id) {
        ProgressBucket::Completed
    } else if in_progress.contains(course_id) {
        ProgressBucket::InProgress
    } else {
        ProgressBucket::Remaining
    }
}

// 同一课程多次及格取最后一条
fn passing_grades_by_course(transcripts: &[Transcript]) -> HashMap<String, String> {
    transcripts
        .iter()
        .filter(|t| grade_policy::is_passing(&t.grade))
        .map(|t| (t.course_id.clone(), t.grade.clone()))
        .collect()
}

fn sorted_plan_courses(plan: &AcademicPlan) -> Vec<&AcademicPlanCourse> {
    let mut courses: Vec<&AcademicPlanCourse> = plan.courses.iter().collect();
    courses.sort_by(|a, b| {
        (a.recommended_year, a.recommended_semester, &a.course_code)
            .cmp(&(b.recommended_year, b.recommended_semester, &b.course_code))
    });
    courses
}

fn to_progress_course(course: &AcademicPlanCourse, grade: Option<String>) -> ProgressCourse {
    ProgressCourse {
        course_id: course.course_id.clone(),
        course_code: course.course_code.clone(),
        course_title: course.course_title.clone(),
        credit_hours: course.credit_hours,
        is_required: course.is_required,
        recommended_year: course.recommended_year,
        recommended_semester: course.recommended_semester,
        course_type: course.course_type,
        grade,
    }
}
