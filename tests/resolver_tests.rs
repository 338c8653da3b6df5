//! Tests for the tree expansion.

use pretty_assertions::assert_eq;
use prodchain::catalog::Catalog;
use prodchain::error::ResolveError;
use prodchain::models::{Building, Recipe};
use prodchain::resolver::{round_up_ratio, InputFlow, Overproduction, ResolveOptions, Resolver};

fn assert_rate(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// `X` from raw `Y` in a smelter, `Z` from `X` in a constructor.
fn xyz_catalog() -> Catalog {
    Catalog::new(vec![
        Recipe::new(Building::Smelter, "X", 30.0).with_input("Y", 30.0),
        Recipe::new(Building::Constructor, "Z", 10.0).with_input("X", 20.0),
    ])
    .expect("valid catalog")
}

/// `R` needs `P` and `Q`, both made from `X`.
fn sibling_catalog(q_demand: f64) -> Catalog {
    Catalog::new(vec![
        Recipe::new(Building::Assembler, "R", 10.0)
            .with_input("P", 10.0)
            .with_input("Q", 10.0),
        Recipe::new(Building::Constructor, "P", 10.0).with_input("X", 10.0),
        Recipe::new(Building::Constructor, "Q", 10.0).with_input("X", q_demand),
        Recipe::new(Building::Smelter, "X", 30.0).with_input("Y", 30.0),
    ])
    .expect("valid catalog")
}

fn plain() -> ResolveOptions {
    ResolveOptions::default()
}

#[test]
fn test_single_recipe_at_nominal_rate() {
    let catalog = xyz_catalog();
    let resolution = Resolver::new(&catalog, plain()).resolve("X", 30.0).expect("resolves");

    assert_eq!(resolution.tree.ratio, 1.0);
    assert_eq!(resolution.ledger.building_count(Building::Smelter), 1.0);
    assert_eq!(resolution.ledger.consumed("Y"), 30.0);
    assert_eq!(resolution.ledger.produced("X"), 30.0);

    let netted = resolution.ledger.netted();
    assert_eq!(netted.consumed_items().collect::<Vec<_>>(), [("Y", 30.0)]);
    assert_eq!(netted.produced_items().collect::<Vec<_>>(), [("X", 30.0)]);
}

#[test]
fn test_two_level_chain_nets_intermediate() {
    let catalog = xyz_catalog();
    let resolution = Resolver::new(&catalog, plain()).resolve("Z", 10.0).expect("resolves");
    let ledger = &resolution.ledger;

    assert_rate(ledger.consumed("X"), 20.0);
    assert_rate(ledger.consumed("Y"), 20.0);
    assert_rate(ledger.produced("X"), 20.0);
    assert_rate(ledger.produced("Z"), 10.0);
    assert_rate(ledger.building_count(Building::Smelter), 20.0 / 30.0);

    let netted = ledger.netted();
    assert!(!netted.is_consumed("X"));
    assert!(!netted.is_produced("X"));
    assert_eq!(netted.consumed_items().count(), 1);
    assert_rate(netted.consumed("Y"), 20.0);
    assert_eq!(netted.produced_items().count(), 1);
    assert_rate(netted.produced("Z"), 10.0);
}

#[test]
fn test_tree_records_each_invocation() {
    let catalog = xyz_catalog();
    let tree = Resolver::new(&catalog, plain())
        .resolve("Z", 10.0)
        .expect("resolves")
        .tree;

    assert_eq!(tree.item, "Z");
    assert_eq!(tree.depth, 0);
    assert_eq!(tree.inputs.len(), 1);
    match &tree.inputs[0] {
        InputFlow::Produced { item, rate, reused, node, alternates } => {
            assert_eq!(item, "X");
            assert_rate(*rate, 20.0);
            assert_eq!(*reused, 0.0);
            assert!(alternates.is_empty());
            assert_eq!(node.depth, 1);
            assert_rate(node.requested_rate, 20.0);
            assert_rate(node.ratio, 20.0 / 30.0);
            assert_eq!(
                node.inputs,
                vec![InputFlow::Raw {
                    item: "Y".to_string(),
                    rate: node.ratio * 30.0,
                }]
            );
        }
        other => panic!("expected produced input, got {:?}", other),
    }
}

#[test]
fn test_building_usage_adds_up_across_the_tree() {
    let catalog = Catalog::new(vec![
        Recipe::new(Building::Constructor, "wire", 30.0).with_input("copper ingot", 15.0),
        Recipe::new(Building::Constructor, "cable", 30.0).with_input("wire", 60.0),
        Recipe::new(Building::Smelter, "copper ingot", 30.0).with_input("copper ore", 30.0),
    ])
    .expect("valid catalog");

    for rate in [15.0, 30.0, 45.0, 7.5] {
        let ledger = Resolver::new(&catalog, plain())
            .resolve("cable", rate)
            .expect("resolves")
            .ledger;
        let cable_ratio = rate / 30.0;
        let wire_ratio = cable_ratio * 60.0 / 30.0;
        assert_rate(ledger.building_count(Building::Constructor), cable_ratio + wire_ratio);
        assert_rate(ledger.building_count(Building::Smelter), wire_ratio * 15.0 / 30.0);
    }
}

#[test]
fn test_only_default_alternate_feeds_demand() {
    let catalog = Catalog::new(vec![
        Recipe::new(Building::Constructor, "Z", 10.0).with_input("X", 20.0),
        Recipe::new(Building::Smelter, "X", 30.0).with_input("Y", 30.0),
        Recipe::new(Building::Foundry, "X", 30.0).with_input("W", 15.0),
    ])
    .expect("valid catalog");

    let ledger = Resolver::new(&catalog, plain())
        .resolve("Z", 10.0)
        .expect("resolves")
        .ledger;
    assert!(ledger.is_consumed("Y"));
    assert!(!ledger.is_consumed("W"));
    assert_eq!(ledger.building_count(Building::Foundry), 0.0);
}

#[test]
fn test_resolve_root_alternate() {
    let catalog = Catalog::new(vec![
        Recipe::new(Building::Smelter, "X", 30.0).with_input("Y", 30.0),
        Recipe::new(Building::Foundry, "X", 30.0).with_input("W", 15.0),
    ])
    .expect("valid catalog");

    let alternate = catalog.alternate("X", 1).expect("alternate exists");
    let ledger = Resolver::new(&catalog, plain())
        .resolve_recipe(alternate, 60.0)
        .expect("resolves")
        .ledger;
    assert_eq!(ledger.consumed("W"), 30.0);
    assert_eq!(ledger.building_count(Building::Foundry), 2.0);
}

#[test]
fn test_overproduction_rounds_up() {
    let catalog = xyz_catalog();
    let resolution = Resolver::new(&catalog, ResolveOptions::overproducing())
        .resolve("X", 35.0)
        .expect("resolves");

    assert_eq!(resolution.tree.requested_rate, 35.0);
    assert_eq!(
        resolution.tree.overproduced,
        Some(Overproduction {
            ratio: 2.0,
            rate: 60.0
        })
    );
    assert_eq!(resolution.tree.produced_rate(), 60.0);
    assert_eq!(resolution.ledger.produced("X"), 60.0);
    assert_eq!(resolution.ledger.consumed("Y"), 60.0);
    assert_eq!(resolution.ledger.building_count(Building::Smelter), 2.0);
}

#[test]
fn test_overproduction_keeps_whole_ratios() {
    let catalog = xyz_catalog();
    let resolution = Resolver::new(&catalog, ResolveOptions::overproducing())
        .resolve("X", 60.0)
        .expect("resolves");

    assert_eq!(resolution.tree.overproduced, None);
    assert_eq!(resolution.tree.applied_ratio(), 2.0);
    assert_eq!(resolution.ledger.produced("X"), 60.0);
}

#[test]
fn test_overproduction_never_produces_less() {
    let catalog = xyz_catalog();
    let resolver = Resolver::new(&catalog, ResolveOptions::overproducing());

    for rate in [0.5, 10.0, 29.9, 30.0, 30.1, 45.0, 90.0, 100.0 / 3.0] {
        let tree = resolver.resolve("X", rate).expect("resolves").tree;
        assert!(tree.produced_rate() >= rate, "{} produced for {}", tree.produced_rate(), rate);
        let whole = (rate / 30.0).fract() == 0.0;
        assert_eq!(tree.overproduced.is_none(), whole, "rate {}", rate);
    }
}

#[test]
fn test_overproduction_scales_inputs_by_rounded_ratio() {
    let catalog = xyz_catalog();
    let ledger = Resolver::new(&catalog, ResolveOptions::overproducing())
        .resolve("Z", 15.0)
        .expect("resolves")
        .ledger;

    // Z runs at 2x, so X is asked for 40 and rounds to 2 smelters.
    assert_eq!(ledger.building_count(Building::Constructor), 2.0);
    assert_eq!(ledger.consumed("X"), 40.0);
    assert_eq!(ledger.produced("X"), 60.0);
    assert_eq!(ledger.building_count(Building::Smelter), 2.0);
}

#[test]
fn test_round_up_ratio_ignores_float_noise() {
    assert_eq!(round_up_ratio(2.0000000000000004), 2.0);
    assert_eq!(round_up_ratio(1.9999999999999998), 2.0);
    assert_eq!(round_up_ratio(1.2), 2.0);
    assert_eq!(round_up_ratio(0.01), 1.0);
}

#[test]
fn test_surplus_covers_sibling_demand() {
    let catalog = sibling_catalog(10.0);
    let resolution = Resolver::new(&catalog, ResolveOptions::overproducing())
        .resolve("R", 10.0)
        .expect("resolves");

    // P rounds X up to a whole smelter (30/min); Q takes its 10 from the leftover.
    let ledger = &resolution.ledger;
    assert_eq!(ledger.building_count(Building::Smelter), 1.0);
    assert_eq!(ledger.produced("X"), 30.0);
    assert_eq!(ledger.consumed("X"), 20.0);
    assert_eq!(ledger.consumed("Y"), 30.0);

    match &resolution.tree.inputs[1] {
        InputFlow::Produced { item, node, .. } => {
            assert_eq!(item, "Q");
            assert_eq!(
                node.inputs,
                vec![InputFlow::Surplus {
                    item: "X".to_string(),
                    rate: 10.0,
                }]
            );
        }
        other => panic!("expected produced input, got {:?}", other),
    }

    let netted = ledger.netted();
    assert_eq!(netted.consumed_items().collect::<Vec<_>>(), [("Y", 30.0)]);
    assert_eq!(netted.produced_items().collect::<Vec<_>>(), [("R", 10.0), ("X", 10.0)]);
}

#[test]
fn test_surplus_partially_covers_sibling_demand() {
    let catalog = sibling_catalog(25.0);
    let resolution = Resolver::new(&catalog, ResolveOptions::overproducing())
        .resolve("R", 10.0)
        .expect("resolves");

    match &resolution.tree.inputs[1] {
        InputFlow::Produced { node, .. } => match &node.inputs[0] {
            InputFlow::Produced { item, rate, reused, node, .. } => {
                assert_eq!(item, "X");
                assert_eq!(*rate, 25.0);
                assert_eq!(*reused, 20.0);
                assert_eq!(node.requested_rate, 5.0);
                assert_eq!(node.produced_rate(), 30.0);
            }
            other => panic!("expected produced input, got {:?}", other),
        },
        other => panic!("expected produced input, got {:?}", other),
    }

    let ledger = &resolution.ledger;
    assert_eq!(ledger.building_count(Building::Smelter), 2.0);
    assert_eq!(ledger.produced("X"), 60.0);
    assert_eq!(ledger.consumed("X"), 35.0);
    assert_eq!(ledger.netted().produced("X"), 25.0);
}

#[test]
fn test_reuse_can_be_disabled() {
    let catalog = sibling_catalog(10.0);
    let options = ResolveOptions {
        reuse_surplus: false,
        ..ResolveOptions::overproducing()
    };
    let ledger = Resolver::new(&catalog, options)
        .resolve("R", 10.0)
        .expect("resolves")
        .ledger;

    assert_eq!(ledger.building_count(Building::Smelter), 2.0);
    assert_eq!(ledger.consumed("Y"), 60.0);
}

#[test]
fn test_reuse_needs_overproduction() {
    let options = ResolveOptions {
        reuse_surplus: true,
        ..ResolveOptions::default()
    };
    assert!(!options.reuses_surplus());
    assert!(ResolveOptions::overproducing().reuses_surplus());
}

#[test]
fn test_byproduct_surplus_is_reused() {
    let catalog = Catalog::new(vec![
        Recipe::new(Building::Assembler, "top", 10.0)
            .with_input("main", 10.0)
            .with_input("side", 5.0),
        Recipe::new(Building::Refinery, "main", 10.0)
            .with_input("ore", 10.0)
            .with_extra_output("side", 5.0),
        Recipe::new(Building::Constructor, "side", 5.0).with_input("ore", 5.0),
    ])
    .expect("valid catalog");

    let reused = Resolver::new(&catalog, ResolveOptions::overproducing())
        .resolve("top", 10.0)
        .expect("resolves")
        .ledger;
    assert_eq!(reused.building_count(Building::Constructor), 0.0);
    assert_eq!(reused.netted().consumed_items().collect::<Vec<_>>(), [("ore", 10.0)]);

    let plain = Resolver::new(&catalog, plain())
        .resolve("top", 10.0)
        .expect("resolves")
        .ledger;
    assert_eq!(plain.building_count(Building::Constructor), 1.0);
    assert_eq!(plain.netted().consumed("ore"), 15.0);
}

#[test]
fn test_alternates_are_costed_in_isolation() {
    let catalog = Catalog::new(vec![
        Recipe::new(Building::Constructor, "Z", 10.0).with_input("X", 20.0),
        Recipe::new(Building::Smelter, "X", 30.0).with_input("Y", 30.0),
        Recipe::new(Building::Foundry, "X", 30.0).with_input("W", 15.0),
    ])
    .expect("valid catalog");

    let without = Resolver::new(&catalog, plain()).resolve("Z", 10.0).expect("resolves");
    let options = ResolveOptions {
        alternates: true,
        ..ResolveOptions::default()
    };
    let with = Resolver::new(&catalog, options).resolve("Z", 10.0).expect("resolves");

    assert_eq!(with.ledger, without.ledger);

    match &with.tree.inputs[0] {
        InputFlow::Produced { alternates, .. } => {
            assert_eq!(alternates.len(), 1);
            let alternate = &alternates[0];
            assert_eq!(alternate.node.building, Building::Foundry);
            assert_eq!(alternate.node.depth, 2);
            assert_rate(alternate.node.requested_rate, 20.0);
            assert_rate(alternate.ledger.consumed("W"), 10.0);
            assert!(!alternate.ledger.is_consumed("Y"));
            assert_rate(alternate.ledger.produced("X"), 20.0);
        }
        other => panic!("expected produced input, got {:?}", other),
    }
}

#[test]
fn test_unknown_item_is_not_found() {
    let catalog = xyz_catalog();
    let result = Resolver::new(&catalog, plain()).resolve("Q", 10.0);
    assert_eq!(
        result.map(|_| ()),
        Err(ResolveError::NotFound {
            query: "Q".to_string()
        })
    );
}

#[test]
fn test_rate_must_be_positive() {
    let catalog = xyz_catalog();
    let resolver = Resolver::new(&catalog, plain());

    for rate in [0.0, -5.0, f64::INFINITY] {
        assert!(matches!(
            resolver.resolve("X", rate),
            Err(ResolveError::InvalidRate { .. })
        ));
    }
    assert!(matches!(
        resolver.resolve("X", f64::NAN),
        Err(ResolveError::InvalidRate { .. })
    ));
}

#[test]
fn test_cycle_is_detected() {
    let catalog = Catalog::new(vec![
        Recipe::new(Building::Refinery, "P", 10.0).with_input("Q", 10.0),
        Recipe::new(Building::Refinery, "Q", 10.0)
            .with_input("P", 5.0)
            .with_input("water", 5.0),
    ])
    .expect("valid catalog");

    for options in [plain(), ResolveOptions::overproducing()] {
        let result = Resolver::new(&catalog, options).resolve("P", 10.0);
        assert_eq!(
            result.map(|_| ()),
            Err(ResolveError::CycleDetected {
                item: "P".to_string(),
                path: vec!["P".to_string(), "Q".to_string(), "P".to_string()],
            })
        );
    }
}

#[test]
fn test_self_loop_is_not_covered_by_own_output() {
    let catalog = Catalog::new(vec![Recipe::new(Building::Refinery, "P", 10.0)
        .with_input("P", 5.0)
        .with_input("water", 5.0)])
    .expect("valid catalog");

    for options in [plain(), ResolveOptions::overproducing()] {
        let result = Resolver::new(&catalog, options).resolve("P", 10.0);
        assert_eq!(
            result.map(|_| ()),
            Err(ResolveError::CycleDetected {
                item: "P".to_string(),
                path: vec!["P".to_string(), "P".to_string()],
            })
        );
    }
}

#[test]
fn test_builtin_catalog_resolves_every_item() {
    let catalog = Catalog::builtin().expect("Failed to load built-in catalog");
    let options = ResolveOptions {
        alternates: true,
        ..ResolveOptions::overproducing()
    };

    for resolver in [Resolver::new(&catalog, plain()), Resolver::new(&catalog, options)] {
        for recipe in catalog.recipes() {
            let resolution = resolver
                .resolve_recipe(recipe, recipe.output.rate)
                .unwrap_or_else(|e| panic!("{}: {}", recipe.output.name, e));
            assert!(
                resolution.ledger.produced(&recipe.output.name) + 1e-9 >= recipe.output.rate,
                "{} underproduced",
                recipe.output.name
            );
        }
    }
}
