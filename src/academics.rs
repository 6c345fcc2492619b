// 🧮 Academic Arithmetic - grade points and credit-weighted GPA
//
// Scale: integer grade points 0..=4 per course, cumulative GPA kept as a
// fixed-point integer scaled by GPA_SCALE.

use crate::entities::AcademicRecord;

/// Lowest grade that earns credit and avoids an academic warning.
pub const PASSING_GRADE: u32 = 60;

/// Fixed-point factor for the stored GPA (350 == 3.50).
pub const GPA_SCALE: u32 = 100;

/// Lower grade bound of each band, highest band first.
const GRADE_BANDS: [(u32, u32); 4] = [(90, 4), (80, 3), (70, 2), (60, 1)];

/// Map a 0..=100 grade to grade points (A=4, B=3, C=2, D=1, F=0).
pub fn grade_to_points(grade: u32) -> u32 {
    GRADE_BANDS
        .iter()
        .find(|(floor, _)| grade >= *floor)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

pub fn is_passing(grade: u32) -> bool {
    grade >= PASSING_GRADE
}

/// Grade points of one completed course together with its credit weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedPoints {
    pub grade_points: u32,
    pub credits: u32,
}

/// Credit-weighted mean of grade points, scaled by `GPA_SCALE` and rounded
/// down. Zero when nothing has been completed.
pub fn cumulative_gpa(completed: &[WeightedPoints]) -> u32 {
    let (weighted, credits) = completed.iter().fold((0u64, 0u64), |(w, c), item| {
        (
            w + u64::from(item.grade_points) * u64::from(item.credits),
            c + u64::from(item.credits),
        )
    });

    if credits == 0 {
        return 0;
    }

    // Bounded by 4 * GPA_SCALE, always fits
    (weighted * u64::from(GPA_SCALE) / credits) as u32
}

/// Fold one grade submission into a student's academic record.
///
/// `completed` must be the student's full set of live grade records *after*
/// the submission has been applied; the GPA is recomputed from it rather
/// than updated incrementally. Honors are carried over untouched.
pub fn recompute_academic_record(
    student_id: u32,
    prior: Option<&AcademicRecord>,
    course_credits: u32,
    new_grade: u32,
    completed: &[WeightedPoints],
) -> AcademicRecord {
    let base = prior
        .cloned()
        .unwrap_or_else(|| AcademicRecord::empty(student_id));

    let passing = is_passing(new_grade);

    AcademicRecord {
        student_id,
        cumulative_gpa: cumulative_gpa(completed),
        total_attempted_credits: base.total_attempted_credits + course_credits,
        total_earned_credits: if passing {
            base.total_earned_credits + course_credits
        } else {
            base.total_earned_credits
        },
        honors: base.honors,
        academic_warnings: if passing {
            base.academic_warnings
        } else {
            base.academic_warnings + 1
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bands() {
        assert_eq!(grade_to_points(100), 4);
        assert_eq!(grade_to_points(90), 4);
        assert_eq!(grade_to_points(89), 3);
        assert_eq!(grade_to_points(80), 3);
        assert_eq!(grade_to_points(79), 2);
        assert_eq!(grade_to_points(70), 2);
        assert_eq!(grade_to_points(69), 1);
        assert_eq!(grade_to_points(60), 1);
        assert_eq!(grade_to_points(59), 0);
        assert_eq!(grade_to_points(0), 0);
    }

    #[test]
    fn test_grade_points_monotonic() {
        let mut previous = grade_to_points(0);
        for grade in 1..=100 {
            let points = grade_to_points(grade);
            assert!(points >= previous, "points dropped at grade {}", grade);
            previous = points;
        }
    }

    #[test]
    fn test_cumulative_gpa_weighting() {
        assert_eq!(cumulative_gpa(&[]), 0);

        // 3 credits of A, 4 credits of F: 12 / 7 = 1.714...
        let gpa = cumulative_gpa(&[
            WeightedPoints { grade_points: 4, credits: 3 },
            WeightedPoints { grade_points: 0, credits: 4 },
        ]);
        assert_eq!(gpa, 171);

        let straight_b = cumulative_gpa(&[
            WeightedPoints { grade_points: 3, credits: 1 },
            WeightedPoints { grade_points: 3, credits: 6 },
        ]);
        assert_eq!(straight_b, 300);
    }

    #[test]
    fn test_recompute_from_nothing() {
        let completed = [WeightedPoints { grade_points: 4, credits: 3 }];
        let record = recompute_academic_record(1001, None, 3, 95, &completed);

        assert_eq!(record.total_attempted_credits, 3);
        assert_eq!(record.total_earned_credits, 3);
        assert_eq!(record.academic_warnings, 0);
        assert_eq!(record.cumulative_gpa, 400);
    }

    #[test]
    fn test_recompute_failing_submission() {
        let mut prior = AcademicRecord::empty(1001);
        prior.total_attempted_credits = 3;
        prior.total_earned_credits = 3;
        prior.honors = vec!["Dean's List".to_string()];

        let completed = [
            WeightedPoints { grade_points: 4, credits: 3 },
            WeightedPoints { grade_points: 0, credits: 4 },
        ];
        let record = recompute_academic_record(1001, Some(&prior), 4, 55, &completed);

        assert_eq!(record.total_attempted_credits, 7);
        assert_eq!(record.total_earned_credits, 3);
        assert_eq!(record.academic_warnings, 1);
        assert_eq!(record.honors, vec!["Dean's List".to_string()]);
        assert_eq!(record.cumulative_gpa, 171);
    }
}
