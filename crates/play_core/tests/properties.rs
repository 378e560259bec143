use play_core::{
    ConfigurationStore, DefensiveArchetype, GameSituation, OffensiveArchetype, PlayCallEngine, PlayType,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn situation() -> impl Strategy<Value = GameSituation> {
    (1u8..=4, 0i32..=30, 0i32..=100, 1u8..=5, 0u32..=900, -40i32..=40).prop_map(
        |(down, ytg, fp, quarter, time, diff)| {
            GameSituation::new(down, ytg, fp).with_clock(quarter, time).with_score(diff)
        },
    )
}

fn archetypes() -> impl Strategy<Value = (OffensiveArchetype, DefensiveArchetype)> {
    (0usize..6, 0usize..6).prop_map(|(o, d)| (OffensiveArchetype::ALL[o], DefensiveArchetype::ALL[d]))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_distribution_is_normalized_and_bounded(s in situation(), (offense, defense) in archetypes()) {
        let engine = PlayCallEngine::new(ConfigurationStore::nfl_default()).unwrap();
        let bounds = &engine.config().limits.probability;
        let eval = engine.evaluate(&s, offense, defense).unwrap();

        prop_assert!(!eval.distribution.is_empty());
        prop_assert!((eval.distribution.total() - 1.0).abs() <= bounds.sum_epsilon, "{}", eval.distribution);
        for (play, p) in eval.distribution.iter() {
            prop_assert!(
                p >= bounds.min_probability - 1e-12 && p <= bounds.max_probability + 1e-12,
                "{} = {} in {}", play, p, eval.distribution
            );
        }
        if s.down < 4 {
            prop_assert!(!eval.distribution.contains(PlayType::Punt));
        }
    }

    #[test]
    fn prop_no_punt_in_safety_zone(
        s in situation(),
        (offense, defense) in archetypes(),
        fp in 0i32..=5,
        seed in any::<u64>(),
    ) {
        let engine = PlayCallEngine::new(ConfigurationStore::nfl_default()).unwrap();
        let mut situation = s;
        situation.field_position = fp;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let decision = engine.decide(&situation, offense, defense, &mut rng).unwrap();

        prop_assert_eq!(decision.evaluation.probability(PlayType::Punt), 0.0);
        prop_assert_ne!(decision.play, PlayType::Punt);
    }

    #[test]
    fn prop_same_seed_same_decision(s in situation(), (offense, defense) in archetypes(), seed in any::<u64>()) {
        let engine = PlayCallEngine::new(ConfigurationStore::nfl_default()).unwrap();
        let first = engine.decide(&s, offense, defense, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        let second = engine.decide(&s, offense, defense, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_final_play_kick_stays_at_max(
        (down, ytg) in (1u8..=4, 0i32..=30),
        fp in 67i32..=100,
        diff in -3i32..=0,
        quarter in 4u8..=5,
        time in 0u32..=5,
        (offense, defense) in archetypes(),
    ) {
        let engine = PlayCallEngine::new(ConfigurationStore::nfl_default()).unwrap();
        let max = engine.config().limits.probability.max_probability;
        let s = GameSituation::new(down, ytg, fp).with_clock(quarter, time).with_score(diff);
        let eval = engine.evaluate(&s, offense, defense).unwrap();

        prop_assert!(!eval.fallback_used);
        prop_assert!((eval.probability(PlayType::FieldGoal) - max).abs() < 1e-9, "{}", eval.distribution);
        prop_assert_eq!(eval.probability(PlayType::Punt), 0.0);
    }
}
