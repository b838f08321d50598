//! Test suite for the lookup-table heuristic.

use super::*;
use crate::grid::{Grid, Location};
use crate::model::{Action, History, PursuitModel};
use crate::objects::{EnemyObject, NonInvolvedObject, SelfObject};
use crate::scenario::{ConfigError, RewardTable, ScenarioBuilder};
use crate::state::{DetailedState, ObsId, StateId};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn model_with(enemies: usize, non_involved: usize, grid: u32, target: Location) -> PursuitModel {
    let mut builder =
        ScenarioBuilder::new(grid, target).self_object(SelfObject::default(), vec![0]);
    for e in 0..enemies {
        builder = builder.enemy(EnemyObject::default(), vec![5 + e as Location]);
    }
    for _ in 0..non_involved {
        builder = builder.non_involved(NonInvolvedObject::default(), vec![10]);
    }
    PursuitModel::new(builder.build().unwrap())
}

fn key(model: &PursuitModel, locs: &[Location]) -> StateId {
    StateId(model.codec().encode(locs))
}

fn belief(locs: &[Location]) -> DetailedState {
    DetailedState::from_locations(locs.to_vec())
}

#[cfg(test)]
mod max_reward {
    use super::*;

    #[test]
    fn test_first_max_wins() {
        assert_eq!(find_max_reward(&[5.0, 5.0, 3.0]), Some((0, 5.0)));
        assert_eq!(find_max_reward(&[-1.0, 2.0, 2.0]), Some((1, 2.0)));
    }

    #[test]
    fn test_empty_and_nan() {
        assert_eq!(find_max_reward(&[]), None);
        assert_eq!(find_max_reward(&[f64::NAN, -3.0]), Some((1, -3.0)));
        assert_eq!(find_max_reward(&[-3.0, f64::NAN, -1.0]), Some((2, -1.0)));
    }
}

#[cfg(test)]
mod estimator {
    use super::*;

    #[test]
    fn test_full_mode_hit() {
        let m = model_with(1, 0, 4, 15);
        let mut lut = Lut::new(4, m.num_actions());
        lut.insert(key(&m, &[0, 5]), vec![1.0, 2.0, 3.0]).unwrap();
        let est = RewardEstimator::new(CalculationMode::Full, lut, &m).unwrap();
        assert_eq!(est.estimate(&m, &belief(&[0, 5])), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_lut_grid_must_fit_location_width() {
        let m = model_with(1, 0, 4, 15);
        let lut = Lut::new(16, m.num_actions());
        let err = RewardEstimator::new(CalculationMode::Full, lut, &m).unwrap_err();
        assert_eq!(
            err,
            ConfigError::LocationWidthOverflow {
                size: 16,
                max_location: 257,
                bits: 8,
            }
        );
        let lut = Lut::new(15, m.num_actions());
        assert!(RewardEstimator::new(CalculationMode::Full, lut, &m).is_ok());
    }

    #[test]
    fn test_miss_is_uniform_loss() {
        let m = model_with(1, 0, 4, 15);
        let lut = Lut::new(4, m.num_actions());
        let est = RewardEstimator::new(CalculationMode::Full, lut, &m).unwrap();
        assert_eq!(est.estimate(&m, &belief(&[0, 5])), vec![-100.0; 3]);
    }

    #[test]
    fn test_miss_marks_illegal_actions_when_worse_than_loss() {
        let config = ScenarioBuilder::new(4, 15)
            .self_object(SelfObject::default(), vec![0])
            .enemy(EnemyObject::default(), vec![5])
            .rewards(RewardTable {
                illegal_move: -200.0,
                ..RewardTable::default()
            })
            .build()
            .unwrap();
        let m = PursuitModel::new(config);
        let dead = m.grid().dead();
        let est = RewardEstimator::disabled();
        assert_eq!(
            est.estimate(&m, &belief(&[0, dead])),
            vec![-100.0, -200.0, -200.0]
        );
    }

    #[test]
    fn test_without_non_involved_drops_bystanders() {
        let m = model_with(1, 1, 4, 15);
        let mut lut = Lut::new(4, m.num_actions());
        lut.insert(key(&m, &[0, 5]), vec![4.0, 5.0, 6.0]).unwrap();
        let est = RewardEstimator::new(CalculationMode::WithoutNonInvolved, lut, &m).unwrap();
        assert_eq!(est.estimate(&m, &belief(&[0, 5, 10])), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_enemy_only_uses_nearest_living_enemy() {
        let m = model_with(2, 0, 4, 15);
        let mut lut = Lut::new(4, 3);
        // self at 0, enemy #2 at 1 is closer than enemy #1 at 10
        lut.insert(key(&m, &[0, 1]), vec![7.0, 8.0, 9.0]).unwrap();
        let est = RewardEstimator::new(CalculationMode::EnemyOnly, lut, &m).unwrap();
        assert_eq!(
            est.estimate(&m, &belief(&[0, 10, 1])),
            vec![7.0, -100.0, -100.0, 8.0, 9.0]
        );
    }

    #[test]
    fn test_lut_width_is_validated() {
        let m = model_with(1, 0, 4, 15);
        let err = RewardEstimator::new(CalculationMode::Full, Lut::new(4, 2), &m).unwrap_err();
        assert_eq!(
            err,
            ConfigError::LutWidthMismatch {
                mode: "full",
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_two_enemy_mode_needs_two_enemies() {
        let m = model_with(1, 0, 4, 15);
        let err = RewardEstimator::new(CalculationMode::TwoEnemyCombination, Lut::new(4, 3), &m)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EnemyCountMismatch {
                required: 2,
                found: 1,
                ..
            }
        ));
        let none = model_with(0, 0, 4, 15);
        assert!(RewardEstimator::new(CalculationMode::EnemyOnly, Lut::new(4, 1), &none).is_err());
    }

    #[test]
    fn test_two_enemy_mode_looks_up_each_enemy() {
        let m = model_with(2, 0, 4, 15);
        let mut lut = Lut::new(4, 3);
        lut.insert(key(&m, &[0, 5]), vec![1.0, 2.0, 3.0]).unwrap();
        lut.insert(key(&m, &[0, 6]), vec![11.0, 12.0, 13.0]).unwrap();
        let est = RewardEstimator::new(CalculationMode::TwoEnemyCombination, lut, &m).unwrap();
        assert_eq!(
            est.estimate(&m, &belief(&[0, 5, 6])),
            vec![6.0, 2.0, 3.0, 12.0, 13.0]
        );
        // one side missing falls back to the miss vector
        assert_eq!(est.estimate(&m, &belief(&[0, 5, 7])), vec![-100.0; 5]);
    }
}

#[cfg(test)]
mod combination {
    use super::*;

    const R1: [f64; 3] = [1.0, 2.0, 3.0];
    const R2: [f64; 3] = [10.0, 20.0, 30.0];

    #[test]
    fn test_first_enemy_dead_takes_second_enemy_rewards() {
        let m = model_with(2, 0, 4, 15);
        let dead = m.grid().dead();
        let min = RewardTable::default().min();
        let combined = RewardEstimator::combine_two_enemies(&m, &belief(&[0, dead, 6]), &R1, &R2);
        assert_eq!(combined, vec![R2[0], min, min, R2[1], R2[2]]);
    }

    #[test]
    fn test_both_alive_averages_basic_actions() {
        let m = model_with(2, 0, 4, 15);
        let combined = RewardEstimator::combine_two_enemies(&m, &belief(&[0, 5, 6]), &R1, &R2);
        assert_eq!(combined, vec![5.5, 2.0, 3.0, 20.0, 30.0]);
    }

    #[test]
    fn test_both_dead() {
        let m = model_with(2, 0, 4, 15);
        let dead = m.grid().dead();
        let min = RewardTable::default().min();
        let combined =
            RewardEstimator::combine_two_enemies(&m, &belief(&[0, dead, dead]), &R1, &R2);
        assert_eq!(combined, vec![5.5, min, min, min, min]);
    }
}

#[cfg(test)]
mod scaling {
    use super::*;

    #[test]
    fn test_scales_down_by_floor() {
        let m = model_with(1, 0, 8, 63);
        let to = Grid::new(4);
        let scaled = RewardEstimator::scale_state(&m, &belief(&[9, 63]), &to);
        assert_eq!(scaled.locations(), &[0, 15]);
        let dead = m.grid().dead();
        let scaled = RewardEstimator::scale_state(&m, &belief(&[9, dead]), &to);
        assert_eq!(scaled.locations(), &[0, to.dead()]);
    }

    #[test]
    fn test_shifts_along_x_when_self_lands_on_target() {
        let m = model_with(1, 0, 8, 63);
        let to = Grid::new(4);
        // self (6,7) -> (3,3) is the scaled target; x <= y so shift along x
        let scaled = RewardEstimator::scale_state(&m, &belief(&[62, 18]), &to);
        assert_eq!(scaled.locations(), &[14, 4]);
        // an object in column 0 falls off the grid
        let scaled = RewardEstimator::scale_state(&m, &belief(&[62, 8]), &to);
        assert_eq!(scaled.locations(), &[14, to.dead()]);
    }

    #[test]
    fn test_shifts_along_y_when_x_exceeds_y() {
        let m = model_with(1, 0, 8, 63);
        let to = Grid::new(4);
        // self (7,6) -> (3,3); enemy (2,2) -> (1,1) -> (1,0)
        let scaled = RewardEstimator::scale_state(&m, &belief(&[55, 18]), &to);
        assert_eq!(scaled.locations(), &[11, 1]);
    }

    #[test]
    fn test_self_really_at_target_is_not_shifted() {
        let m = model_with(1, 0, 8, 63);
        let to = Grid::new(4);
        let scaled = RewardEstimator::scale_state(&m, &belief(&[63, 18]), &to);
        assert_eq!(scaled.locations(), &[15, 5]);
    }
}

#[cfg(test)]
mod prior {
    use super::*;

    fn history(m: &PursuitModel, locs: &[Location]) -> History {
        let mut h = History::new();
        h.push(Action::MoveToTarget, ObsId(m.codec().encode(locs)));
        h
    }

    #[test]
    fn test_chooses_table_argmax() {
        let m = model_with(1, 0, 4, 15);
        let mut lut = Lut::new(4, 3);
        lut.insert(key(&m, &[0, 5]), vec![1.0, 9.0, 9.0]).unwrap();
        let prior = PreferredActionPrior::new(
            RewardEstimator::new(CalculationMode::Full, lut, &m).unwrap(),
        );
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            prior.choose(&m, &history(&m, &[0, 5]), &mut rng),
            (Action::Attack(0), 9.0)
        );
    }

    #[test]
    fn test_disabled_picks_legal_action() {
        let m = model_with(1, 0, 4, 15);
        let prior = PreferredActionPrior::new(RewardEstimator::disabled());
        let unseen = m.grid().non_observed();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let (action, value) = prior.choose(&m, &history(&m, &[0, unseen]), &mut rng);
            assert_eq!(action, Action::MoveToTarget);
            assert_eq!(value, -100.0);
        }
        let (action, _) = prior.choose(&m, &history(&m, &[0, 5]), &mut rng);
        assert!(m.actions().encode(action).is_some());
    }

    #[test]
    fn test_empty_history_falls_back_to_random_legal() {
        let m = model_with(1, 0, 4, 15);
        let prior = PreferredActionPrior::new(
            RewardEstimator::new(CalculationMode::Full, Lut::new(4, 3), &m).unwrap(),
        );
        let (action, _) = prior.choose(&m, &History::new(), &mut StdRng::seed_from_u64(1));
        assert_eq!(action, Action::MoveToTarget);
    }
}
