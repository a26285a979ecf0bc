use framecue_processing_core::cursor_activity::CursorActivityDetector;
use framecue_processing_core::intervals::{clamp_to_range, complement, is_merge_clean, merge};
use framecue_processing_core::keystroke::KeystrokeBuilder;
use framecue_processing_core::visibility::visibility_at;
use framecue_project_model::event::{
    ButtonState, MouseButton, PointerSample, RawInputEvent, WheelDirection,
};
use framecue_project_model::interval::{DisplayInterval, Span, TimeRange};
use framecue_project_model::timeline::KeystrokeMode;
use proptest::prelude::*;

fn range_strategy() -> impl Strategy<Value = TimeRange> {
    (-5.0f64..50.0, 0.0f64..8.0).prop_map(|(start, len)| TimeRange::new(start, start + len))
}

fn ranges_strategy() -> impl Strategy<Value = Vec<TimeRange>> {
    prop::collection::vec(range_strategy(), 0..24)
}

fn pointer_strategy() -> impl Strategy<Value = Vec<PointerSample>> {
    prop::collection::vec(
        (0.0f64..20.0, 0.0f64..1920.0, 0.0f64..1080.0, prop::bool::weighted(0.05)),
        0..300,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(t, x, y, clicked)| PointerSample {
                is_clicked: clicked,
                ..PointerSample::new(t, x, y)
            })
            .collect()
    })
}

fn raw_input_strategy() -> impl Strategy<Value = Vec<RawInputEvent>> {
    let event = (0.0f64..20.0, 0u8..6, 0usize..4).prop_map(|(t, kind, key)| {
        let name = ["KeyA", "KeyB", "Enter", "ShiftLeft"][key];
        match kind {
            0 => RawInputEvent::key_down(t, name),
            1 => RawInputEvent::key_up(t, name),
            2 => RawInputEvent::key_tap(t, name),
            3 => RawInputEvent::mouse_down(t, MouseButton::Left),
            4 => RawInputEvent::mouse_up(t, MouseButton::Left),
            _ => RawInputEvent::wheel(t, WheelDirection::Down),
        }
    });
    prop::collection::vec(event, 0..60)
}

proptest! {
    #[test]
    fn merge_is_idempotent(ranges in ranges_strategy(), tol in 0.0f64..1.0) {
        let once = merge(&ranges, tol);
        let twice = merge(&once, tol);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merge_output_is_clean(ranges in ranges_strategy(), tol in 0.0f64..1.0) {
        let merged = merge(&ranges, tol);
        prop_assert!(is_merge_clean(&merged, tol));
    }

    #[test]
    fn clamp_stays_in_range(ranges in ranges_strategy(), duration in 0.0f64..40.0) {
        let clamped = clamp_to_range(&ranges, 0.0, duration);
        prop_assert!(is_merge_clean(&clamped, 0.0));
        for iv in &clamped {
            prop_assert!(iv.start_secs >= 0.0 && iv.end_secs <= duration);
            prop_assert!(iv.duration_secs() > 0.001);
        }
    }

    #[test]
    fn complement_and_cover_partition_the_range(ranges in ranges_strategy()) {
        let whole = TimeRange::new(0.0, 40.0);
        let covered: f64 = clamp_to_range(&ranges, 0.0, 40.0).iter().map(Span::duration_secs).sum();
        let gaps: f64 = complement(whole, &ranges).iter().map(Span::duration_secs).sum();
        // Slivers under a millisecond are dropped by the clamp.
        prop_assert!((covered + gaps - 40.0).abs() < 0.001 * (ranges.len() as f64 + 1.0));
    }

    #[test]
    fn cursor_windows_are_clean(samples in pointer_strategy(), duration in 0.5f64..20.0) {
        let detector = CursorActivityDetector::with_defaults();
        let intervals = detector.detect(&samples, duration, None);
        let gap = detector.config().min_gap_to_merge_secs;
        prop_assert!(is_merge_clean(&intervals, gap));
        for iv in &intervals {
            prop_assert!(iv.start_secs >= 0.0 && iv.end_secs <= duration);
        }
    }

    #[test]
    fn keystroke_windows_are_clean(
        raw in raw_input_strategy(),
        duration in 0.5f64..20.0,
        delay in -2.0f64..2.0,
        mouse in any::<bool>(),
    ) {
        let builder = KeystrokeBuilder::with_defaults();
        let events = builder.build_events(&raw);
        for event in &events {
            prop_assert!(event.end_secs >= event.start_secs);
        }

        let mode = if mouse { KeystrokeMode::KeyboardMouse } else { KeystrokeMode::Keyboard };
        for w in builder.effective_windows(&events, mode).windows(2) {
            prop_assert!(w[0].end_secs <= w[1].start_secs);
        }

        let intervals = builder.generate_segments(&events, mode, duration, delay);
        prop_assert!(is_merge_clean(&intervals, builder.config().merge_gap_secs));
        for iv in &intervals {
            prop_assert!(iv.start_secs >= 0.0 && iv.end_secs <= duration);
        }
    }

    #[test]
    fn visibility_is_total_and_repeatable(
        ranges in ranges_strategy(),
        time in prop_oneof![
            -100.0f64..100.0,
            Just(f64::NAN),
            Just(f64::INFINITY),
            Just(f64::NEG_INFINITY),
        ],
        shape in 0u8..3,
    ) {
        let intervals: Vec<DisplayInterval> = merge(&ranges, 0.0)
            .into_iter()
            .map(DisplayInterval::from)
            .collect();
        let list = match shape {
            0 => None,
            1 => Some(&intervals[..0]),
            _ => Some(&intervals[..]),
        };

        let a = visibility_at(time, list);
        let b = visibility_at(time, list);
        prop_assert!(a.opacity >= 0.0 && a.opacity <= 1.0);
        prop_assert!(a.scale >= 0.5 && a.scale <= 1.0);
        prop_assert_eq!(a.opacity.to_bits(), b.opacity.to_bits());
        prop_assert_eq!(a.scale.to_bits(), b.scale.to_bits());
    }
}

#[test]
fn keystroke_direction_without_key_is_ignored() {
    let builder = KeystrokeBuilder::with_defaults();
    let raw = RawInputEvent {
        kind: framecue_project_model::event::RawInputKind::Keyboard {
            key: None,
            vk_code: None,
        },
        ..RawInputEvent::key_down(1.0, "KeyA")
    };
    assert!(builder.build_events(&[raw]).is_empty());
    assert_eq!(
        RawInputEvent::vk(0.0, 0x41, Some(ButtonState::Down)).direction,
        Some(ButtonState::Down)
    );
}
