use world_of_bits_core::{CellCoord, CellRect, Token};
use world_of_bits_system_spawning::{hash_cell, Config, Purpose, Spawning};

const SEED: u64 = 0x5eed_cafe_f00d_0001;

fn source() -> Spawning {
    Spawning::new(Config::new(SEED, 0.1, 4))
}

#[test]
fn repeated_queries_agree() {
    let first = source();
    let second = source();
    let cells = CellRect::around(CellCoord::new(-7, 11), 12);

    for cell in cells.iter() {
        let expected = first.spawn(cell);
        assert_eq!(first.spawn(cell), expected, "source changed its answer for {cell}");
        assert_eq!(second.spawn(cell), expected, "independent sources disagree at {cell}");
        assert_eq!(first.presence(cell), expected.is_some());
    }
}

#[test]
fn spawn_values_are_repeatable_and_bounded() {
    let first = source();
    let second = source();
    let tiers: Vec<_> = [1, 2, 4, 8]
        .into_iter()
        .filter_map(Token::from_value)
        .collect();
    let corners = [
        CellCoord::new(i32::MIN, i32::MIN),
        CellCoord::new(i32::MIN, i32::MAX),
        CellCoord::new(i32::MAX, i32::MIN),
        CellCoord::new(i32::MAX, i32::MAX),
    ];

    for cell in corners.into_iter().chain(CellRect::around(CellCoord::new(5, -5), 10).iter()) {
        let value = first.value(cell);
        assert_eq!(first.value(cell), value, "source changed its value for {cell}");
        assert_eq!(second.value(cell), value, "independent sources disagree at {cell}");
        assert!(tiers.contains(&value), "value {value} outside the tiers at {cell}");
        if first.presence(cell) {
            assert_eq!(first.spawn(cell), Some(value));
        } else {
            assert_eq!(first.spawn(cell), None);
        }
    }
}

#[test]
fn query_order_does_not_matter() {
    let spawning = source();
    let cells: Vec<_> = CellRect::around(CellCoord::new(0, 0), 6).iter().collect();
    let forward: Vec<_> = cells.iter().map(|cell| spawning.spawn(*cell)).collect();
    let mut backward: Vec<_> = cells.iter().rev().map(|cell| spawning.spawn(*cell)).collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[test]
fn different_seeds_produce_different_layouts() {
    let first = source();
    let second = Spawning::new(Config::new(SEED ^ 1, 0.1, 4));
    let cells = CellRect::around(CellCoord::new(0, 0), 20);
    let differing = cells
        .iter()
        .filter(|cell| first.spawn(*cell) != second.spawn(*cell))
        .count();
    assert!(differing > 0, "seed must influence the layout");
}

#[test]
fn samples_stay_in_unit_interval() {
    let spawning = source();
    let corners = [
        CellCoord::new(i32::MIN, i32::MIN),
        CellCoord::new(i32::MAX, i32::MAX),
        CellCoord::new(i32::MIN, i32::MAX),
        CellCoord::new(0, 0),
    ];
    for cell in corners {
        for purpose in [Purpose::Presence, Purpose::Value] {
            let sample = spawning.sample(cell, purpose);
            assert!((0.0..1.0).contains(&sample), "sample {sample} out of range at {cell}");
        }
    }
}

#[test]
fn presence_rate_tracks_probability() {
    let spawning = source();
    let cells = CellRect::around(CellCoord::new(369_979, -1_220_571), 49);
    let total = cells.cell_count() as f64;
    let spawned = cells.iter().filter(|cell| spawning.presence(*cell)).count() as f64;
    let rate = spawned / total;
    assert!((0.08..0.12).contains(&rate), "spawn rate {rate} far from 0.1");
}

#[test]
fn spawned_values_cover_the_four_tiers() {
    let spawning = source();
    let cells = CellRect::around(CellCoord::new(0, 0), 40);
    let mut seen = [false; 4];
    for cell in cells.iter() {
        if let Some(token) = spawning.spawn(cell) {
            assert!(token.exponent() < 4, "unexpected spawn value {token}");
            seen[usize::from(token.exponent())] = true;
        }
    }
    assert_eq!(seen, [true; 4]);
}

#[test]
fn documented_thresholds_pick_presence_and_value() {
    let config = Config::new(SEED, 0.1, 4);
    assert_eq!(config.token_from_samples(0.05, 0.8), Token::from_value(8));
    assert_eq!(config.token_from_samples(0.1, 0.8), None);
    assert_eq!(config.token_from_samples(0.0, 0.3), Token::from_value(2));
}

#[test]
fn purposes_draw_independent_hashes() {
    let cell = CellCoord::new(3, 4);
    assert_ne!(
        hash_cell(SEED, cell, Purpose::Presence),
        hash_cell(SEED, cell, Purpose::Value)
    );
    assert_ne!(
        hash_cell(SEED, CellCoord::new(3, 4), Purpose::Presence),
        hash_cell(SEED, CellCoord::new(4, 3), Purpose::Presence)
    );
}
