use bomber_core::ai::{has_clear_shot, is_bomb_useful, is_target_trapped};
use bomber_core::threat::{danger_map, risk_map};
use bomber_core::{
    Agent, AgentCommands, AgentId, AiProfile, Bomb, BombUse, Brain, Config, Decision, Difficulty,
    Direction, Grid, Landmine, Personality, Pos, RandomSource, Scenario, ScriptedRandom,
    SeededRandom, Weapon, World, think,
};

#[derive(Debug, Default)]
struct Recorder {
    moves: Vec<(i32, i32)>,
    actions: usize,
}

impl AgentCommands for Recorder {
    fn attempt_move(&mut self, dx: i32, dy: i32) -> bool {
        self.moves.push((dx, dy));
        true
    }

    fn perform_action(&mut self) -> bool {
        self.actions += 1;
        true
    }
}

fn at(x: i32, y: i32) -> Pos {
    Pos { y, x }
}

fn world(rows: &[&str]) -> World {
    let mut world = World::new(Grid::from_ascii(rows).expect("grid"));
    world.now_ms = 60_000;
    world
}

fn add(world: &mut World, pos: Pos, difficulty: Option<Difficulty>) -> AgentId {
    let profile =
        difficulty.map(|difficulty| AiProfile { difficulty, personality: Personality::Balanced });
    world.add_agent(Agent::new(pos, &Config::default().arena, profile))
}

fn think_once(world: &World, me: AgentId, rng: &mut dyn RandomSource) -> (Decision, Recorder) {
    let config = Config::default();
    let profile = world.agents[me].profile.expect("computer agent");
    let mut brain = Brain::new(profile, &config.ai);
    let mut commands = Recorder::default();
    let decision = think(&mut brain, world, me, &config, rng, &mut commands).expect("think");
    (decision, commands)
}

#[test]
fn scenario_a_bomb_about_to_blow_marks_its_row_and_the_agent_steps_off_it() {
    let mut world = world(&[".....", ".....", ".....", ".....", "....."]);
    let me = add(&mut world, at(0, 0), Some(Difficulty::Normal));
    world.bombs.push(Bomb {
        pos: at(2, 0),
        owner: None,
        range: 2,
        placed_at_ms: Some(world.now_ms - 2_950),
    });

    let danger = danger_map(&world, &Config::default(), Some(me));
    for x in 0..5 {
        assert_eq!(danger.get(at(x, 0)), Some(&true), "({x}, 0) is in the blast row");
    }
    assert_eq!(danger.get(at(0, 1)), Some(&false));
    assert_eq!(danger.get(at(0, 2)), Some(&false));

    let (decision, commands) = think_once(&world, me, &mut ScriptedRandom::constant(0.5));
    assert_eq!(decision, Decision::Escape);
    assert_eq!(commands.moves, vec![(0, 1)], "the only way off row 0 is down");
}

#[test]
fn scenario_b_bomb_usefulness_depends_on_wall_distance() {
    let mut near = world(&[".....", ".....", "...*.", ".....", "....."]);
    let me = add(&mut near, at(2, 2), Some(Difficulty::Normal));
    assert!(is_bomb_useful(&near, &near.agents[me], BombUse::Wall));

    let mut far = world(&[".....", ".....", "....*", ".....", "....."]);
    let me = add(&mut far, at(2, 2), Some(Difficulty::Normal));
    assert!(!is_bomb_useful(&far, &far.agents[me], BombUse::Wall));
}

#[test]
fn scenario_c_hard_tier_fires_a_rocket_down_a_clear_row() {
    let mut world = world(&[".......", ".......", "......."]);
    let me = add(&mut world, at(0, 1), Some(Difficulty::Hard));
    let target = add(&mut world, at(5, 1), None);
    let attacker = &mut world.agents[me];
    attacker.active_weapon = Weapon::Rocket;
    attacker.rockets = 2;
    attacker.facing = Direction::Right;

    assert!(has_clear_shot(&world, at(0, 1), world.agents[target].pos));
    let (decision, commands) = think_once(&world, me, &mut ScriptedRandom::constant(0.0));
    assert_eq!(decision, Decision::Attack(Weapon::Rocket));
    assert_eq!(commands.actions, 1);
}

#[test]
fn scenario_d_repeat_bomb_placement_fires_less_often() {
    let mut world = world(&[".......", ".......", ".......", ".......", "......."]);
    let me = add(&mut world, at(3, 1), Some(Difficulty::Normal));
    add(&mut world, at(3, 3), None);
    world.agents[me].explosion_range = 2;
    world.agents[me].max_bombs = 2;

    let trials = 400;
    let count_bombs = |world: &World| {
        let mut rng = SeededRandom::new(11);
        (0..trials)
            .filter(|_| think_once(world, me, &mut rng).0 == Decision::Attack(Weapon::Bomb))
            .count()
    };
    let first = count_bombs(&world);

    world.agents[me].active_bombs = 1;
    world.bombs.push(Bomb {
        pos: at(6, 4),
        owner: Some(me),
        range: 1,
        placed_at_ms: Some(world.now_ms),
    });
    let repeat = count_bombs(&world);

    assert!(first > trials / 2, "first placements fire most of the time, got {first}");
    assert!(repeat < first / 2, "repeat placements are throttled, got {repeat} vs {first}");
}

#[test]
fn scenario_e_one_exit_means_trapped() {
    let mut world = world(&["#####", "#...#", "###.#", "#...#", "#####"]);
    let cornered = add(&mut world, at(1, 1), None);
    let free = add(&mut world, at(2, 3), None);
    let config = Config::default();
    for tier in [Difficulty::Normal, Difficulty::Hard] {
        assert!(is_target_trapped(&world, &config, &world.agents[cornered], tier));
    }
    assert!(!is_target_trapped(&world, &config, &world.agents[free], Difficulty::Hard));
}

#[test]
fn unarmed_mines_never_threaten_their_owner() {
    let mut world = world(&["....."]);
    let owner = add(&mut world, at(0, 0), Some(Difficulty::Normal));
    let stranger = add(&mut world, at(4, 0), Some(Difficulty::Normal));
    world.landmines.push(Landmine {
        pos: at(2, 0),
        owner: Some(owner),
        armed: false,
        placed_at_ms: Some(0),
    });
    let config = Config::default();

    assert_eq!(risk_map(&world, &config, Some(owner)).risk_at(at(2, 0)), 0.0);
    assert_eq!(risk_map(&world, &config, Some(stranger)).risk_at(at(2, 0)), 0.0, "hidden by now");

    world.landmines[0].placed_at_ms = Some(world.now_ms - 100);
    assert_eq!(risk_map(&world, &config, Some(owner)).risk_at(at(2, 0)), 0.0);
    assert_eq!(risk_map(&world, &config, Some(stranger)).risk_at(at(2, 0)), 1.0, "still flashing");
}

#[test]
fn scenario_files_drive_the_same_decisions() {
    let scenario = Scenario::from_json(
        r#"{
            "now_ms": 60000,
            "grid": [".......", ".......", "......."],
            "agents": [
                { "x": 0, "y": 1, "profile": { "difficulty": "hard" }, "facing": "right",
                  "weapon": "rocket", "rockets": 2 },
                { "x": 5, "y": 1 }
            ]
        }"#,
    )
    .expect("scenario json");
    let loaded = scenario.into_world().expect("scenario world");
    let (decision, commands) =
        think_once(&loaded.world, loaded.agents[0], &mut ScriptedRandom::constant(0.0));
    assert_eq!(decision, Decision::Attack(Weapon::Rocket));
    assert_eq!(commands.actions, 1);
}
