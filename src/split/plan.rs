use serde::Serialize;

use super::error::SplitError;

/// Remainders shorter than this are float noise, not a real tail segment.
pub const REMAINDER_EPSILON: f64 = 1e-6;

/// Shortest segment length a rule may use (1 ms, the timestamp resolution).
pub const MIN_SEGMENT_SECONDS: f64 = 0.001;

/// Upper bound on parts in a single plan.
pub const MAX_SEGMENTS: usize = 100_000;

pub const FINAL_SEGMENT_LABEL: &str = "End Video";

/// Chooses the segment length for a given total duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRule {
    /// Durations strictly above this use `long_segment`.
    pub threshold_seconds: f64,
    pub long_segment: f64,
    pub short_segment: f64,
}

impl Default for SegmentRule {
    fn default() -> Self {
        Self {
            threshold_seconds: 15.0 * 60.0,
            long_segment: 60.0,
            short_segment: 45.0,
        }
    }
}

impl SegmentRule {
    pub fn segment_length_for(&self, duration: f64) -> f64 {
        if duration > self.threshold_seconds {
            self.long_segment
        } else {
            self.short_segment
        }
    }

    fn validate(&self) -> Result<(), SplitError> {
        for (name, value) in [
            ("long segment length", self.long_segment),
            ("short segment length", self.short_segment),
        ] {
            if !value.is_finite() || value < MIN_SEGMENT_SECONDS {
                return Err(SplitError::InvalidArgument(format!(
                    "{name} must be at least {MIN_SEGMENT_SECONDS} seconds (got {value})"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Full,
    Remainder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// 1-based part number.
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub label: String,
    pub kind: SegmentKind,
}

impl Segment {
    fn full(index: usize, start: f64, end: f64) -> Self {
        Self {
            index,
            start,
            end,
            label: format!("Part {index}"),
            kind: SegmentKind::Full,
        }
    }

    fn remainder(index: usize, start: f64, end: f64) -> Self {
        Self {
            index,
            start,
            end,
            label: FINAL_SEGMENT_LABEL.to_string(),
            kind: SegmentKind::Remainder,
        }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn file_name(&self) -> String {
        format!("part{}.mp4", self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    pub duration: f64,
    pub segment_length: f64,
    pub full_segments: usize,
    pub remainder: f64,
    pub segments: Vec<Segment>,
}

impl SegmentPlan {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_remainder(&self) -> bool {
        self.segments
            .last()
            .is_some_and(|segment| segment.kind == SegmentKind::Remainder)
    }
}

/// Split `duration` seconds into consecutive parts according to `rule`.
pub fn plan_segments(duration: f64, rule: &SegmentRule) -> Result<SegmentPlan, SplitError> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(SplitError::InvalidArgument(format!(
            "video duration must be positive (got {duration})"
        )));
    }
    rule.validate()?;

    let segment_length = rule.segment_length_for(duration);
    let segment_count = (duration / segment_length).ceil();
    if segment_count > MAX_SEGMENTS as f64 {
        return Err(SplitError::InvalidArgument(format!(
            "{duration} seconds in {segment_length}-second segments would need {segment_count} parts (limit {MAX_SEGMENTS})"
        )));
    }
    let full_segments = (duration / segment_length).floor() as usize;
    let remainder = duration - full_segments as f64 * segment_length;

    let mut segments: Vec<Segment> = (1..=full_segments)
        .map(|index| {
            Segment::full(
                index,
                (index - 1) as f64 * segment_length,
                index as f64 * segment_length,
            )
        })
        .collect();

    if remainder > REMAINDER_EPSILON {
        segments.push(Segment::remainder(
            full_segments + 1,
            full_segments as f64 * segment_length,
            duration,
        ));
    } else if let Some(last) = segments.last_mut() {
        // Exact multiple: pin the boundary so float drift never leaks past it.
        last.end = duration;
    } else {
        segments.push(Segment::remainder(1, 0.0, duration));
    }

    Ok(SegmentPlan {
        duration,
        segment_length,
        full_segments,
        remainder: remainder.max(0.0),
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(duration: f64) -> SegmentPlan {
        plan_segments(duration, &SegmentRule::default()).unwrap()
    }

    fn assert_contiguous(plan: &SegmentPlan) {
        let mut cursor = 0.0;
        for (i, segment) in plan.segments.iter().enumerate() {
            assert_eq!(segment.index, i + 1);
            assert_eq!(segment.start, cursor, "gap before part {}", segment.index);
            assert!(segment.end > segment.start);
            cursor = segment.end;
        }
        assert_eq!(cursor, plan.duration);
    }

    #[test]
    fn fifteen_minutes_uses_short_segments() {
        let plan = plan(900.0);
        assert_eq!(plan.segment_length, 45.0);
        assert_eq!(plan.full_segments, 20);
        assert_eq!(plan.remainder, 0.0);
        assert_eq!(plan.len(), 20);
        assert!(!plan.has_remainder());
        assert!(plan.segments.iter().all(|s| s.label != FINAL_SEGMENT_LABEL));
        assert_eq!(plan.segments[19].label, "Part 20");
        assert_contiguous(&plan);
    }

    #[test]
    fn just_over_fifteen_minutes_uses_minute_segments() {
        let plan = plan(901.0);
        assert_eq!(plan.segment_length, 60.0);
        assert_eq!(plan.full_segments, 15);
        assert_eq!(plan.remainder, 1.0);
        assert_eq!(plan.len(), 16);

        let last = plan.segments.last().unwrap();
        assert_eq!(last.label, "End Video");
        assert_eq!(last.kind, SegmentKind::Remainder);
        assert_eq!((last.start, last.end), (900.0, 901.0));
        assert_eq!(last.file_name(), "part16.mp4");
        assert_contiguous(&plan);
    }

    #[test]
    fn shorter_than_one_segment_is_single_tail() {
        let plan = plan(44.0);
        assert_eq!(plan.segment_length, 45.0);
        assert_eq!(plan.full_segments, 0);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.segments[0].label, "End Video");
        assert_eq!((plan.segments[0].start, plan.segments[0].end), (0.0, 44.0));
        assert_eq!(plan.segments[0].file_name(), "part1.mp4");
    }

    #[test]
    fn full_segment_labels_and_names() {
        let plan = plan(100.0);
        let labels: Vec<&str> = plan.segments.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Part 1", "Part 2", "End Video"]);
        assert_eq!(plan.segments[1].file_name(), "part2.mp4");
        assert_eq!(plan.segments[1].length(), 45.0);
        assert!((plan.segments[2].length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn fractional_durations_stay_contiguous() {
        for duration in [0.5, 45.000_000_1, 123.456, 899.999, 1234.5678, 7261.3] {
            let plan = plan(duration);
            assert!(!plan.is_empty());
            assert_contiguous(&plan);
            let total: f64 = plan.segments.iter().map(Segment::length).sum();
            assert!((total - duration).abs() < 1e-6);
        }
    }

    #[test]
    fn near_zero_remainder_is_dropped() {
        let plan = plan(90.000_000_000_1);
        assert_eq!(plan.len(), 2);
        assert!(!plan.has_remainder());
        assert_contiguous(&plan);
    }

    #[test]
    fn tiny_positive_duration_still_has_one_segment() {
        let plan = plan(1e-9);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.segments[0].end, 1e-9);
    }

    #[test]
    fn rejects_non_positive_duration() {
        for duration in [0.0, -5.0, f64::NAN] {
            assert!(matches!(
                plan_segments(duration, &SegmentRule::default()),
                Err(SplitError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn rejects_zero_length_rule() {
        let rule = SegmentRule {
            short_segment: 0.0,
            ..SegmentRule::default()
        };
        assert!(plan_segments(30.0, &rule).is_err());
    }

    #[test]
    fn rejects_sub_millisecond_rule() {
        let rule = SegmentRule {
            short_segment: 1e-300,
            ..SegmentRule::default()
        };
        assert!(matches!(
            plan_segments(10.0, &rule),
            Err(SplitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_plans_with_too_many_parts() {
        let rule = SegmentRule {
            long_segment: MIN_SEGMENT_SECONDS,
            ..SegmentRule::default()
        };
        let err = plan_segments(3600.0, &rule).unwrap_err();
        assert!(matches!(err, SplitError::InvalidArgument(_)));
        assert!(err.to_string().contains("limit 100000"));

        let plan = plan_segments(100.0, &SegmentRule { short_segment: 0.5, ..rule }).unwrap();
        assert_eq!(plan.len(), 200);
        assert_contiguous(&plan);
    }

    #[test]
    fn custom_rule_is_honored() {
        let rule = SegmentRule {
            threshold_seconds: 60.0,
            long_segment: 30.0,
            short_segment: 10.0,
        };
        assert_eq!(plan_segments(60.0, &rule).unwrap().segment_length, 10.0);
        let plan = plan_segments(61.0, &rule).unwrap();
        assert_eq!(plan.segment_length, 30.0);
        assert_eq!(plan.len(), 3);
    }
}
