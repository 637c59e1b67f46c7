use ai_core::{FactRegistry, KindFacts, State, TagRegistry};
use ai_goap::{
    CatalogContext, CatalogDef, CatalogError, Interaction, InteractionTemplate, MateDef,
    RecipeDef, ResourceDef, Step, StepCatalog, StepKey, StockpileDef, UsableDef,
};

fn full_def() -> CatalogDef {
    CatalogDef {
        resources: vec![ResourceDef {
            kind: "Tree".into(),
            drop: "Stick".into(),
            yield_count: 2,
        }],
        pickups: vec!["Stone".into()],
        usables: vec![UsableDef {
            kind: "Bed".into(),
            relieves: "IsSleepy".into(),
        }],
        recipes: vec![RecipeDef {
            output: "Bed".into(),
            input: "Stick".into(),
        }],
        stockpile: Some(StockpileDef {
            kind: "Stockpile".into(),
            stores: vec!["Stick".into(), "Stone".into()],
        }),
        mate: Some(MateDef {
            partner: "Villager".into(),
            relieves: "WantsMate".into(),
        }),
        idle_fact: Some("IsIdle".into()),
        ..Default::default()
    }
}

#[test]
fn steps_are_generated_per_category() {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let catalog = StepCatalog::build(&facts, &tags, &full_def()).unwrap();

    let names: Vec<&str> = catalog.steps().iter().map(|s| &*s.name).collect();
    for expected in [
        "MoveTo(Tree)",
        "MoveTo(Stick)",
        "MoveTo(Stone)",
        "MoveTo(Bed)",
        "MoveTo(Stockpile)",
        "MoveTo(Villager)",
        "PickUp(Stick)",
        "PickUp(Stone)",
        "Drop(Stick)",
        "Drop(Stone)",
        "Chop(Tree)",
        "Build(Bed)",
        "Deposit(Stick)",
        "Deposit(Stone)",
        "Retrieve(Stick)",
        "Retrieve(Stone)",
        "Use(Bed)",
        "Mate(Villager)",
        "Wait",
    ] {
        assert!(names.contains(&expected), "missing {expected} in {names:?}");
    }
    assert_eq!(catalog.len(), names.len());

    let kinds: Vec<&str> = catalog.kinds().iter().map(|k| &*k.name).collect();
    assert_eq!(
        kinds,
        vec!["Tree", "Stick", "Stone", "Bed", "Stockpile", "Villager"]
    );
}

#[test]
fn chop_yields_configured_amount() {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let catalog = StepCatalog::build(&facts, &tags, &full_def()).unwrap();
    let tree = KindFacts::intern(&facts, &tags, "Tree");
    let stick = KindFacts::intern(&facts, &tags, "Stick");

    let chop = catalog.find("Chop(Tree)").unwrap();
    assert_eq!(chop.spec.interaction, Interaction::Chop);
    assert_eq!(chop.spec.item, Some(stick.tag));
    assert_eq!(chop.spec.amount, 2);

    let near_tree = State::new().with(tree.near, true);
    assert!(chop.is_applicable(&near_tree));
    let after = chop.apply(&near_tree);
    assert_eq!(after.get_bool(stick.world_has), Some(true));
    assert_eq!(after.get_int(stick.available), Some(2));
}

#[test]
fn deposit_then_retrieve_round_trips_through_the_stockpile() {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let catalog = StepCatalog::build(&facts, &tags, &full_def()).unwrap();
    let pile = KindFacts::intern(&facts, &tags, "Stockpile");
    let stone = KindFacts::intern(&facts, &tags, "Stone");

    let state = State::new()
        .with(pile.near, true)
        .with(stone.holding, true)
        .with(facts.get_id("HandsEmpty"), false);
    let deposited = catalog.find("Deposit(Stone)").unwrap().apply(&state);
    assert_eq!(deposited.get_bool(stone.holding), Some(false));
    assert_eq!(deposited.get_int(stone.stockpile_count), Some(1));

    let retrieve = catalog.find("Retrieve(Stone)").unwrap();
    assert!(retrieve.is_applicable(&deposited));
    let back = retrieve.apply(&deposited);
    assert_eq!(back.get_bool(stone.holding), Some(true));
    assert_eq!(back.get_int(stone.stockpile_count), Some(0));
}

#[test]
fn one_item_at_a_time() {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let catalog = StepCatalog::build(&facts, &tags, &full_def()).unwrap();
    let stick = KindFacts::intern(&facts, &tags, "Stick");
    let stone = KindFacts::intern(&facts, &tags, "Stone");
    let pile = KindFacts::intern(&facts, &tags, "Stockpile");
    let hands = facts.get_id("HandsEmpty");

    let carrying = State::new()
        .with(stick.holding, true)
        .with(hands, false)
        .with(stone.world_has, true)
        .with(stone.near, true)
        .with(pile.near, true)
        .with(stone.stored, true);
    assert!(!catalog.find("PickUp(Stone)").unwrap().is_applicable(&carrying));
    assert!(!catalog.find("Retrieve(Stone)").unwrap().is_applicable(&carrying));

    let dropped = catalog.find("Drop(Stick)").unwrap().apply(&carrying);
    assert_eq!(dropped.get_bool(hands), Some(true));
    assert_eq!(dropped.get_bool(stick.holding), Some(false));
    assert_eq!(dropped.get_bool(stick.near), Some(true));
    assert_eq!(dropped.get_int(stick.available), Some(1));

    let picked = catalog.find("PickUp(Stone)").unwrap();
    assert!(picked.is_applicable(&dropped));
    assert_eq!(picked.apply(&dropped).get_bool(hands), Some(false));
}

#[test]
fn planner_puts_down_the_carried_item_first() {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let mut def = full_def();
    def.edibles.push(ai_goap::EdibleDef {
        kind: "Berry".into(),
        relieves: "IsHungry".into(),
    });
    let catalog = StepCatalog::build(&facts, &tags, &def).unwrap();
    let stick = KindFacts::intern(&facts, &tags, "Stick");
    let berry = KindFacts::intern(&facts, &tags, "Berry");
    let hungry = facts.get_id("IsHungry");

    let start = State::new()
        .with(hungry, true)
        .with(stick.holding, true)
        .with(facts.get_id("HandsEmpty"), false)
        .with(berry.world_has, true)
        .with(berry.distance, 3.0_f32);
    let plan = catalog
        .planner(Default::default())
        .plan(&start, &State::new().with(hungry, false))
        .unwrap();

    let kinds: Vec<Interaction> = plan.steps.iter().map(|s| s.interaction).collect();
    let drop_at = kinds.iter().position(|&i| i == Interaction::Drop).unwrap();
    let pick_at = kinds.iter().position(|&i| i == Interaction::PickUp).unwrap();
    assert!(drop_at < pick_at, "{kinds:?}");
    assert_eq!(plan.steps[drop_at].item, Some(stick.tag));
    assert_eq!(kinds.last(), Some(&Interaction::Consume));
}

#[test]
fn moving_leaves_other_places_behind() {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let catalog = StepCatalog::build(&facts, &tags, &full_def()).unwrap();
    let pile = KindFacts::intern(&facts, &tags, "Stockpile");
    let tree = KindFacts::intern(&facts, &tags, "Tree");
    let stone = KindFacts::intern(&facts, &tags, "Stone");

    let at_pile = State::new()
        .with(pile.near, true)
        .with(tree.near, true)
        .with(stone.world_has, true);
    let walked = catalog.find("MoveTo(Stone)").unwrap().apply(&at_pile);

    assert_eq!(walked.get_bool(stone.near), Some(true));
    assert_eq!(walked.get_bool(pile.near), Some(false));
    assert_eq!(walked.get_bool(tree.near), Some(false));
    assert!(!catalog.find("Deposit(Stone)").unwrap().is_applicable(
        &walked.clone().with(stone.holding, true)
    ));
}

#[test]
fn empty_definition_is_rejected() {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let err = StepCatalog::build(&facts, &tags, &CatalogDef::default()).unwrap_err();
    assert_eq!(err, CatalogError::Empty);
}

#[test]
fn recipe_input_must_be_carried() {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let def = CatalogDef {
        recipes: vec![RecipeDef {
            output: "Bed".into(),
            input: "Plank".into(),
        }],
        ..Default::default()
    };
    let err = StepCatalog::build(&facts, &tags, &def).unwrap_err();
    assert_eq!(
        err,
        CatalogError::NotCarried {
            context: "recipe input",
            kind: "Plank".into()
        }
    );
}

#[test]
fn negative_costs_are_rejected() {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let mut def = full_def();
    def.costs.chop = -1.0;
    assert_eq!(
        StepCatalog::build(&facts, &tags, &def).unwrap_err(),
        CatalogError::InvalidCost("chop")
    );
}

struct SwimTemplate;

impl InteractionTemplate for SwimTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::Use
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        let lake = ctx.kind("Lake");
        out.push(
            Step::new("Swim(Lake)", StepKey::new(Interaction::Use, lake.tag))
                .requires(lake.near, true)
                .sets(ctx.fact("IsDirty"), false),
        );
        Ok(())
    }
}

#[test]
fn custom_templates_plug_in_without_planner_changes() {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let def = CatalogDef::default();
    let catalog = StepCatalog::build_with(&facts, &tags, &def, &[&SwimTemplate]).unwrap();
    let lake = KindFacts::intern(&facts, &tags, "Lake");
    let dirty = facts.get_id("IsDirty");

    let plan = catalog
        .planner(Default::default())
        .plan(
            &State::new().with(lake.near, true).with(dirty, true),
            &State::new().with(dirty, false),
        )
        .unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.steps[0].target, Some(lake.tag));
}

#[test]
fn duplicate_step_names_are_rejected() {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let err = StepCatalog::build_with(
        &facts,
        &tags,
        &CatalogDef::default(),
        &[&SwimTemplate, &SwimTemplate],
    )
    .unwrap_err();
    assert_eq!(err, CatalogError::DuplicateStep("Swim(Lake)".into()));
}
