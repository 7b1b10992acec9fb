use chrono::{Duration, TimeZone, Utc};
use common::{Bar, Direction};
use proptest::prelude::*;
use strategy::{compute_indicators, ConsensusEngine};

/// Random-walk bars with positive prices and a valid high/low envelope.
fn bars_from(steps: &[(f64, f64, f64)]) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut close = 100.0;
    steps
        .iter()
        .enumerate()
        .map(|(i, &(step, wick, volume))| {
            let open = close;
            close = (close * (1.0 + step)).max(1.0);
            Bar {
                timestamp: start + Duration::minutes(15 * i as i64),
                open,
                high: open.max(close) * (1.0 + wick),
                low: open.min(close) * (1.0 - wick),
                close,
                volume,
            }
        })
        .collect()
}

fn steps(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec((-0.03f64..0.03, 0.0005f64..0.02, 10.0f64..10_000.0), len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Every decision over a random series is well formed.
    #[test]
    fn decisions_are_well_formed(steps in steps(200..320)) {
        let bars = bars_from(&steps);
        let frame = compute_indicators(&bars);
        prop_assert!(frame.len() <= bars.len() - 199);

        let engine = ConsensusEngine::default();
        for index in 0..frame.len() {
            let decision = engine.decide(&frame, index);
            prop_assert!((0.0..=1.0).contains(&decision.confidence));
            match decision.direction {
                Direction::Hold => {
                    prop_assert!(decision.stop_loss.is_none());
                    prop_assert!(decision.take_profit.is_none());
                    prop_assert!(decision.contributing_strategy_names.is_empty());
                }
                _ => {
                    prop_assert!(decision.confidence > engine.threshold());
                    prop_assert!(decision.stop_loss.is_some());
                    prop_assert!(decision.take_profit.is_some());
                    prop_assert!(!decision.contributing_strategy_names.is_empty());
                }
            }
        }
    }

    /// Short histories never produce a frame, so every decision is Hold/0.
    #[test]
    fn short_history_holds(steps in steps(1..200)) {
        let frame = compute_indicators(&bars_from(&steps));
        prop_assert!(frame.is_empty());
        let decision = ConsensusEngine::default().decide(&frame, 0);
        prop_assert_eq!(decision.direction, Direction::Hold);
        prop_assert_eq!(decision.confidence, 0.0);
    }
}
