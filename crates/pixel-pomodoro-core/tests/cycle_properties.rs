//! Property tests for the session state machine.

use pixel_pomodoro_core::{Event, Phase, SessionConfig, SessionState, SessionStateMachine};
use proptest::prelude::*;

fn count_boundaries(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::PhaseBoundary { .. }))
        .count()
}

proptest! {
    #[test]
    fn exactly_one_advance_after_duration_ticks(
        work in 1u64..600,
        short in 1u64..120,
        long in 1u64..300,
        every in 1u64..8,
    ) {
        let mut machine = SessionStateMachine::new(SessionConfig::new(work, short, long, every).unwrap());
        machine.start();

        let mut events = Vec::new();
        for _ in 0..work - 1 {
            events.extend(machine.on_tick());
        }
        prop_assert_eq!(count_boundaries(&events), 0);
        prop_assert_eq!(machine.state().remaining_secs, 1);

        let last = machine.on_tick();
        let reached_zero = matches!(last.first(), Some(Event::DisplayUpdated { remaining_secs: 0, .. }));
        prop_assert!(reached_zero);
        prop_assert_eq!(count_boundaries(&last), 1);
        prop_assert!(!machine.is_running());
    }

    #[test]
    fn long_break_exactly_on_cadence_multiples(every in 1u64..6, rounds in 1u64..13) {
        let mut machine = SessionStateMachine::new(SessionConfig::new(1, 1, 1, every).unwrap());
        for round in 1..=rounds {
            machine.start();
            machine.on_tick();
            let expected = if round % every == 0 { Phase::LongBreak } else { Phase::ShortBreak };
            prop_assert_eq!(machine.state().phase, expected);
            prop_assert_eq!(machine.state().completed_work_sessions, round);
            machine.start();
            machine.on_tick();
            prop_assert_eq!(machine.state().phase, Phase::Work);
        }
    }

    #[test]
    fn reset_always_restores_initial_state(work in 1u64..50, ticks in 0u64..200, starts in 0usize..5) {
        let mut machine = SessionStateMachine::new(SessionConfig::new(work, 3, 7, 4).unwrap());
        for _ in 0..starts {
            machine.start();
            for _ in 0..ticks {
                machine.on_tick();
            }
        }
        machine.reset();
        prop_assert_eq!(
            *machine.state(),
            SessionState {
                phase: Phase::Work,
                remaining_secs: work,
                completed_work_sessions: 0,
                running: false,
            }
        );
    }

    #[test]
    fn remaining_never_exceeds_phase_duration(ticks in 0u64..400) {
        let config = SessionConfig::new(7, 3, 11, 3).unwrap().with_auto_resume(true);
        let mut machine = SessionStateMachine::new(config);
        machine.start();
        for _ in 0..ticks {
            machine.on_tick();
            let state = machine.state();
            prop_assert!(state.remaining_secs >= 1);
            prop_assert!(state.remaining_secs <= config.duration_of(state.phase));
        }
    }
}
