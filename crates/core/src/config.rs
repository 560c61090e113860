//! Match rules and AI tuning constants.
//! This module exists so every hand-tuned number lives behind a named, overridable field.
//! It does not own scenario loading or any per-tick derived state.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Difficulty;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub arena: ArenaConfig,
    pub ai: AiTuning,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arena.validate()?;
        self.ai.validate()
    }
}

/// Rules of the arena shared by every agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub cols: usize,
    pub rows: usize,
    pub bomb_timer_ms: u64,
    pub explosion_duration_ms: u64,
    pub initial_move_cooldown_ms: u64,
    pub min_move_cooldown_ms: u64,
    pub speed_pickup_step_ms: u64,
    pub initial_explosion_range: u32,
    pub initial_max_bombs: u32,
    /// Time after placement during which a landmine still flashes for everyone.
    pub landmine_reveal_ms: u64,
    pub rocket_step_ms: u64,
    pub rocket_pickup_count: u32,
    pub landmine_pickup_count: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            cols: 19,
            rows: 15,
            bomb_timer_ms: 3000,
            explosion_duration_ms: 500,
            initial_move_cooldown_ms: 200,
            min_move_cooldown_ms: 80,
            speed_pickup_step_ms: 40,
            initial_explosion_range: 1,
            initial_max_bombs: 1,
            landmine_reveal_ms: 2000,
            rocket_step_ms: 100,
            rocket_pickup_count: 2,
            landmine_pickup_count: 1,
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols < 3 || self.rows < 3 {
            return Err(ConfigError::ArenaTooSmall { cols: self.cols, rows: self.rows });
        }
        if self.bomb_timer_ms == 0 {
            return Err(ConfigError::ZeroBombTimer);
        }
        if self.rocket_step_ms == 0 {
            return Err(ConfigError::ZeroRocketStep);
        }
        if self.min_move_cooldown_ms > self.initial_move_cooldown_ms {
            return Err(ConfigError::CooldownFloorAboveInitial {
                min_ms: self.min_move_cooldown_ms,
                initial_ms: self.initial_move_cooldown_ms,
            });
        }
        Ok(())
    }
}

/// Thresholds, buffers and weights used by the threat model, the pathfinder and the
/// strategy tiers. Values come from play-testing and are treated as configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    // Pathfinding.
    pub reaction_time_ms: u64,
    pub static_risk_ceiling: f32,
    pub risk_cost_scale: f32,
    pub occupied_cell_penalty: f32,
    pub soft_wall_step_cost: f32,
    pub safety_buffer_ms: u64,
    pub crowded_safety_buffer_ms: u64,
    pub crowded_agent_count: usize,
    pub path_cache_ttl_ms: u64,
    pub path_cache_max_distance: u32,

    // Threat model.
    pub legacy_danger_threshold: f32,
    pub min_bomb_risk: f32,
    pub mine_sensing_radius: u32,
    pub rocket_assumed_cells_per_sec: f32,
    pub rocket_projection_cells: u32,
    pub rocket_window_lead_ms: u64,
    pub rocket_window_tail_ms: u64,

    // Influence field.
    pub power_up_strength: f32,
    pub power_up_contest_bonus: f32,
    pub power_up_contest_distance: u32,
    pub power_up_radius: u32,
    pub opponent_strength: f32,
    pub trapped_opponent_bonus: f32,
    pub opponent_radius: u32,
    pub rocket_lane_length: u32,
    pub rocket_lane_strength: f32,
    pub bomb_repulsion_strength: f32,
    pub chokepoint_strength: f32,
    pub chokepoint_radius: u32,
    pub ambush_distance: u32,

    // Bomb placement safety.
    pub easy_bomb_buffer_ms: u64,
    pub normal_bomb_buffer_ms: u64,
    pub hard_bomb_buffer_ms: u64,
    pub extra_bomb_buffer_ms: u64,
    pub early_match_buffer_ms: u64,
    pub early_match_window_ms: u64,

    // Tier behaviour.
    pub easy_escape_risk: f32,
    pub normal_escape_risk: f32,
    pub hard_escape_risk: f32,
    pub easy_idle_chance: f64,
    pub easy_demolish_chance: f64,
    pub easy_stand_still_chance: f64,
    pub normal_attack_chance: f64,
    pub normal_repeat_bomb_chance: f64,
    pub normal_stand_still_chance: f64,
    pub normal_rocket_range: u32,
    pub normal_trapped_exits: usize,
    pub hard_attack_chance: f64,
    pub hard_repeat_bomb_chance: f64,
    pub hard_stand_still_chance: f64,
    pub hard_rocket_range: u32,
    pub hard_trapped_exits: usize,
    pub hard_scan_radius: u32,
    pub hard_risk_penalty: f32,
    pub hard_distance_penalty: f32,
    pub hard_idle_bonus: f32,
    pub hard_hysteresis: f32,
    pub hard_mine_target_distance: u32,
    pub hard_prediction_steps: u32,
    pub normal_prediction_steps: u32,

    // Think cadence.
    pub easy_think_interval_ms: u64,
    pub normal_think_interval_ms: u64,
    pub hard_think_interval_ms: u64,
    pub min_think_interval_ms: u64,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            reaction_time_ms: 150,
            static_risk_ceiling: 0.8,
            risk_cost_scale: 10.0,
            occupied_cell_penalty: 15.0,
            soft_wall_step_cost: 10.0,
            safety_buffer_ms: 350,
            crowded_safety_buffer_ms: 500,
            crowded_agent_count: 2,
            path_cache_ttl_ms: 500,
            path_cache_max_distance: 5,

            legacy_danger_threshold: 0.5,
            min_bomb_risk: 0.6,
            mine_sensing_radius: 3,
            rocket_assumed_cells_per_sec: 5.0,
            rocket_projection_cells: 5,
            rocket_window_lead_ms: 100,
            rocket_window_tail_ms: 500,

            power_up_strength: 2.0,
            power_up_contest_bonus: 1.5,
            power_up_contest_distance: 4,
            power_up_radius: 6,
            opponent_strength: 1.5,
            trapped_opponent_bonus: 3.0,
            opponent_radius: 4,
            rocket_lane_length: 8,
            rocket_lane_strength: -4.0,
            bomb_repulsion_strength: -0.5,
            chokepoint_strength: 2.0,
            chokepoint_radius: 2,
            ambush_distance: 3,

            easy_bomb_buffer_ms: 400,
            normal_bomb_buffer_ms: 800,
            hard_bomb_buffer_ms: 1200,
            extra_bomb_buffer_ms: 300,
            early_match_buffer_ms: 500,
            early_match_window_ms: 10_000,

            easy_escape_risk: 0.05,
            normal_escape_risk: 0.2,
            hard_escape_risk: 0.0,
            easy_idle_chance: 0.85,
            easy_demolish_chance: 0.15,
            easy_stand_still_chance: 0.5,
            normal_attack_chance: 0.8,
            normal_repeat_bomb_chance: 0.35,
            normal_stand_still_chance: 0.3,
            normal_rocket_range: 6,
            normal_trapped_exits: 2,
            hard_attack_chance: 0.95,
            hard_repeat_bomb_chance: 0.3,
            hard_stand_still_chance: 0.4,
            hard_rocket_range: 10,
            hard_trapped_exits: 1,
            hard_scan_radius: 3,
            hard_risk_penalty: 1000.0,
            hard_distance_penalty: 0.3,
            hard_idle_bonus: 0.5,
            hard_hysteresis: 0.4,
            hard_mine_target_distance: 5,
            hard_prediction_steps: 2,
            normal_prediction_steps: 1,

            easy_think_interval_ms: 200,
            normal_think_interval_ms: 100,
            hard_think_interval_ms: 50,
            min_think_interval_ms: 25,
        }
    }
}

impl AiTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("easy_idle_chance", self.easy_idle_chance),
            ("easy_demolish_chance", self.easy_demolish_chance),
            ("easy_stand_still_chance", self.easy_stand_still_chance),
            ("normal_attack_chance", self.normal_attack_chance),
            ("normal_repeat_bomb_chance", self.normal_repeat_bomb_chance),
            ("normal_stand_still_chance", self.normal_stand_still_chance),
            ("hard_attack_chance", self.hard_attack_chance),
            ("hard_repeat_bomb_chance", self.hard_repeat_bomb_chance),
            ("hard_stand_still_chance", self.hard_stand_still_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { name, value });
            }
        }
        Ok(())
    }

    pub fn bomb_buffer_ms(&self, difficulty: Difficulty) -> u64 {
        match difficulty {
            Difficulty::Easy => self.easy_bomb_buffer_ms,
            Difficulty::Normal => self.normal_bomb_buffer_ms,
            Difficulty::Hard => self.hard_bomb_buffer_ms,
        }
    }

    pub fn think_interval_ms(&self, difficulty: Difficulty) -> u64 {
        match difficulty {
            Difficulty::Easy => self.easy_think_interval_ms,
            Difficulty::Normal => self.normal_think_interval_ms,
            Difficulty::Hard => self.hard_think_interval_ms,
        }
    }

    pub fn trapped_exit_limit(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Hard => self.hard_trapped_exits,
            Difficulty::Easy | Difficulty::Normal => self.normal_trapped_exits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn hard_tier_demands_the_largest_bomb_margin() {
        let tuning = AiTuning::default();
        let buffer = |tier| tuning.bomb_buffer_ms(tier);
        assert!(buffer(Difficulty::Hard) > buffer(Difficulty::Normal));
        assert!(buffer(Difficulty::Normal) > buffer(Difficulty::Easy));
    }

    #[test]
    fn rejects_a_cooldown_floor_above_the_initial_cooldown() {
        let arena = ArenaConfig { min_move_cooldown_ms: 300, ..ArenaConfig::default() };
        assert_eq!(
            arena.validate(),
            Err(ConfigError::CooldownFloorAboveInitial { min_ms: 300, initial_ms: 200 })
        );
    }

    #[test]
    fn rejects_probabilities_outside_unit_interval() {
        let ai = AiTuning { easy_idle_chance: 1.5, ..AiTuning::default() };
        assert!(matches!(
            ai.validate(),
            Err(ConfigError::ProbabilityOutOfRange { name: "easy_idle_chance", .. })
        ));
    }

    #[test]
    fn partial_json_overrides_keep_remaining_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"arena":{"cols":11},"ai":{"reaction_time_ms":90}}"#)
                .expect("partial config should parse");
        assert_eq!(config.arena.cols, 11);
        assert_eq!(config.arena.rows, 15);
        assert_eq!(config.ai.reaction_time_ms, 90);
        assert_eq!(config.ai.safety_buffer_ms, 350);
    }
}
