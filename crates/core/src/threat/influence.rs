use crate::config::Config;
use crate::state::{Agent, World};
use crate::types::{AgentId, Pos, Weapon, manhattan};

use super::{Field, find_chokepoints};

/// Signed attraction (positive) and repulsion (negative) per cell.
pub type InfluenceMap = Field<f32>;

/// Builds the positioning field for `asker`.
///
/// `is_trapped` decides whether an opponent counts as cornered; the caller supplies it
/// because the judgement depends on the asking tier.
pub fn influence_map(
    world: &World,
    config: &Config,
    asker: AgentId,
    is_trapped: &dyn Fn(&Agent) -> bool,
) -> InfluenceMap {
    let ai = &config.ai;
    let mut map = Field::filled(world.grid.width, world.grid.height, 0.0);
    let Some(me) = world.agent(asker) else {
        return map;
    };

    for power_up in &world.power_ups {
        let my_distance = manhattan(me.pos, power_up.pos);
        let contested = world
            .opponents_of(asker)
            .filter(|other| {
                let theirs = manhattan(other.pos, power_up.pos);
                theirs < my_distance && theirs <= ai.power_up_contest_distance
            })
            .count();
        let strength = ai.power_up_strength + ai.power_up_contest_bonus * contested as f32;
        add_radial(&mut map, power_up.pos, strength, ai.power_up_radius);
    }

    for other in world.opponents_of(asker) {
        let mut strength = ai.opponent_strength;
        if is_trapped(other) {
            strength += ai.trapped_opponent_bonus;
        }
        add_radial(&mut map, other.pos, strength, ai.opponent_radius);
        if other.effective_weapon() == Weapon::Rocket {
            add_lane(world, &mut map, other, ai.rocket_lane_strength, ai.rocket_lane_length);
        }
    }

    for bomb in world.bombs.iter().filter(|bomb| bomb.owner != Some(asker)) {
        add_radial(&mut map, bomb.pos, ai.bomb_repulsion_strength, bomb.range + 1);
    }

    if me.effective_weapon() == Weapon::Landmine {
        for choke in find_chokepoints(&world.grid) {
            let ambush = world
                .opponents_of(asker)
                .any(|other| manhattan(other.pos, choke) <= ai.ambush_distance);
            if ambush {
                add_radial(&mut map, choke, ai.chokepoint_strength, ai.chokepoint_radius);
            }
        }
    }
    map
}

/// Adds `strength` at `center`, decaying linearly to zero at Manhattan `radius`.
fn add_radial(map: &mut InfluenceMap, center: Pos, strength: f32, radius: u32) {
    if radius == 0 {
        return;
    }
    let r = radius as i32;
    for dy in -r..=r {
        for dx in -r..=r {
            let pos = center.offset(dx, dy);
            let dist = manhattan(center, pos);
            if dist >= radius {
                continue;
            }
            map.add(pos, strength * (1.0 - dist as f32 / radius as f32));
        }
    }
}

/// Adds a fading lane ahead of `shooter` along its facing until the first non-floor cell.
fn add_lane(world: &World, map: &mut InfluenceMap, shooter: &Agent, strength: f32, length: u32) {
    let mut pos = shooter.pos;
    for i in 1..=length {
        pos = pos.step(shooter.facing);
        if !world.grid.is_floor(pos) {
            break;
        }
        map.add(pos, strength * (1.0 - i as f32 / length as f32));
    }
}
