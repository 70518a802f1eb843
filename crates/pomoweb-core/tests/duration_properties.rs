//! Property tests for duration computation and start/pause stability.

use chrono::{Duration, TimeZone, Utc};
use pomoweb_core::{CycleEngine, ManualTicker, Mode, Settings};
use proptest::prelude::*;

fn settings_strategy() -> impl Strategy<Value = Settings> {
    (
        -10_000i64..10_000,
        -10_000i64..10_000,
        -10_000i64..10_000,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(pomodoro, short_break, long_break, breaks, pomodoros, sound)| Settings {
            pomodoro,
            short_break,
            long_break,
            auto_start_breaks: breaks,
            auto_start_pomodoros: pomodoros,
            sound_enabled: sound,
        })
}

proptest! {
    #[test]
    fn duration_is_minutes_times_sixty_clamped(settings in settings_strategy()) {
        for mode in Mode::ALL {
            let minutes = settings.minutes_for(mode);
            let expected = if minutes <= 0 { 1 } else { minutes as u64 * 60 };
            prop_assert_eq!(settings.duration_for(mode), expected);
        }
    }

    #[test]
    fn start_then_immediate_pause_keeps_remaining(
        settings in settings_strategy(),
        mode_index in 0usize..3,
        elapsed_ms in 0i64..400,
    ) {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let mut engine = CycleEngine::new(settings, ManualTicker::new());
        engine.select_mode_at(Mode::ALL[mode_index], now);
        let before = engine.state().remaining_seconds;

        engine.start_at(now);
        engine.pause_at(now + Duration::milliseconds(elapsed_ms));
        prop_assert_eq!(engine.state().remaining_seconds, before);
        prop_assert!(!engine.state().running);
    }

    #[test]
    fn remaining_never_exceeds_mode_duration(
        settings in settings_strategy(),
        ticks in proptest::collection::vec(0i64..5_000, 1..20),
    ) {
        let mut now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let mut engine = CycleEngine::new(settings, ManualTicker::new());
        engine.start_at(now);
        for step in ticks {
            now += Duration::seconds(step);
            engine.tick_at(now);
            if !engine.state().running {
                engine.start_at(now);
            }
            let state = engine.state();
            prop_assert!(state.remaining_seconds <= engine.duration_for(state.mode));
        }
    }
}
