//! End-to-end race scenarios driven through the public API

use swim_race::config::SimConfig;
use swim_race::game::{Camera, Entrant, Key, Race, RaceEvent, RacePhase, SwimmerStatus};
use swim_race::replay::{ReplayScript, ScriptedKey};

fn reference_race() -> Race {
    Race::new(SimConfig::default(), Entrant::default_roster()).unwrap()
}

fn assert_invariants(race: &Race) {
    let config = race.config();
    for s in race.swimmers() {
        assert!((0.0..=1.0).contains(&s.stamina), "stamina {}", s.stamina);
        assert!((0.0..=1.0).contains(&s.fatigue), "fatigue {}", s.fatigue);
        assert!((0.0..=config.max_breath_time).contains(&s.breath));
        assert!((0.0..=config.finish_line()).contains(&s.position));
    }
}

#[test]
fn test_invariants_hold_under_mixed_play() {
    let mut race = reference_race();
    let keys = ['a', 'd', 'a', 'a', 's', 'j', 'l', 'k', 'w', 'i', 'l', 'l'];
    let mut t = 0.0f32;

    for frame in 0..3000 {
        // bursts of mashing alternate with well-paced strokes
        let gap = if (frame / 200) % 2 == 0 { 0.1 } else { 0.5 };
        if frame % 6 == 0 {
            race.handle_key(Key(keys[(frame / 6) % keys.len()]), t);
            t += gap;
        }
        race.tick(1.0 / 60.0);
        assert_invariants(&race);
        if race.is_over() {
            break;
        }
    }
}

#[test]
fn test_finish_then_frozen_race() {
    let mut race = reference_race();
    let finish = race.config().finish_line();
    race.swimmers_mut()[0].position = finish - 1.0;
    race.swimmers_mut()[0].velocity = 50.0;
    race.swimmers_mut()[1].breath = 3.0;

    let events = race.tick(0.1);
    assert!(events.contains(&RaceEvent::PhaseChanged(RacePhase::Won {
        winner: 0,
        name: "Red".to_string()
    })));
    assert_eq!(race.swimmers()[0].position, finish);

    let blue_breath = race.swimmers()[1].breath;
    let blue_position = race.swimmers()[1].position;
    for _ in 0..50 {
        race.tick(0.1);
    }
    assert_eq!(race.swimmers()[1].breath, blue_breath);
    assert_eq!(race.swimmers()[1].position, blue_position);
    assert!(race.swimmers()[1].is_swimming());
}

#[test]
fn test_drowned_swimmer_keeps_sinking_while_race_continues() {
    let mut race = reference_race();
    race.swimmers_mut()[0].breath = 0.05;
    race.tick(0.1);

    let drowned = race.swimmers()[0].clone();
    assert_eq!(drowned.breath, 0.0);

    race.handle_key(Key('a'), 1.0);
    race.handle_key(Key('w'), 1.5);
    race.tick(0.1);
    race.tick(0.1);

    let now = &race.swimmers()[0];
    assert_eq!(now.position, drowned.position);
    assert_eq!(now.velocity, 0.0);
    assert_eq!(now.stamina, drowned.stamina);
    assert_eq!(now.fatigue, drowned.fatigue);
    assert_eq!(now.breath, 0.0);
    match now.status {
        SwimmerStatus::Drowned { sink_offset } => assert!((sink_offset - 4.0).abs() < 1e-4),
        other => panic!("expected drowned, got {other:?}"),
    }
    assert_eq!(race.phase(), &RacePhase::Playing);
}

#[test]
fn test_camera_keeps_leader_in_view() {
    let config = SimConfig {
        screen_width: 500.0,
        ..SimConfig::default()
    };
    let camera = Camera::new(&config);
    let offset = camera.offset([100.0, 300.0]);

    assert!(offset <= 0.0);
    assert!(-offset <= camera.max_scroll());
    let leader_on_screen = 300.0 + offset;
    assert!(leader_on_screen >= 0.0 && leader_on_screen <= config.screen_width);
}

#[test]
fn test_alternating_rhythm_beats_single_arm() {
    let paced = |left: char, right: char| -> f32 {
        let mut events: Vec<ScriptedKey> = (1..=70)
            .map(|k| ScriptedKey {
                at: 0.5 * k as f32,
                key: Key(if k % 2 == 0 { left } else { right }),
            })
            .collect();
        events.extend((0..8).map(|j| ScriptedKey {
            at: 4.25 + 4.0 * j as f32,
            key: Key('w'),
        }));
        events.sort_by(|a, b| a.at.total_cmp(&b.at));

        let script = ReplayScript {
            frame_dt: 1.0 / 60.0,
            duration: 40.0,
            config: None,
            roster: Some(vec![Entrant::default_roster().remove(0)]),
            events,
        };
        let outcome = script.run().unwrap();
        outcome.summary.results[0]
            .finish_time
            .expect("paced swimmer should finish")
    };

    let alternating = paced('a', 'd');
    let single_arm = paced('a', 'a');
    assert!(alternating < single_arm);
}
