//! The default life-sim category set.

use ai_goap::{
    CatalogDef, CostTable, EdibleDef, MateDef, RecipeDef, ResourceDef, StockpileDef, UsableDef,
};

pub const HUNGER: &str = "IsHungry";
pub const SLEEPINESS: &str = "IsSleepy";
pub const MATING_URGE: &str = "WantsMate";
pub const IDLE: &str = "IsIdle";

/// Trees drop sticks, sticks build beds, beds relieve sleepiness, berries relieve hunger, and
/// villagers pair up. Sticks and berries can be kept in a stockpile.
pub fn default_catalog() -> CatalogDef {
    CatalogDef {
        resources: vec![ResourceDef {
            kind: "Tree".into(),
            drop: "Stick".into(),
            yield_count: 1,
        }],
        pickups: Vec::new(),
        edibles: vec![EdibleDef {
            kind: "Berry".into(),
            relieves: HUNGER.into(),
        }],
        usables: vec![UsableDef {
            kind: "Bed".into(),
            relieves: SLEEPINESS.into(),
        }],
        recipes: vec![RecipeDef {
            output: "Bed".into(),
            input: "Stick".into(),
        }],
        stockpile: Some(StockpileDef {
            kind: "Stockpile".into(),
            stores: vec!["Stick".into(), "Berry".into()],
        }),
        mate: Some(MateDef {
            partner: "Villager".into(),
            relieves: MATING_URGE.into(),
        }),
        idle_fact: Some(IDLE.into()),
        costs: CostTable::default(),
    }
}

/// Every drive fact the definition relieves, in first-mention order.
pub fn drives(def: &CatalogDef) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    let named = def
        .edibles
        .iter()
        .map(|e| e.relieves.as_str())
        .chain(def.usables.iter().map(|u| u.relieves.as_str()))
        .chain(def.mate.iter().map(|m| m.relieves.as_str()));
    for drive in named {
        if !out.contains(&drive) {
            out.push(drive);
        }
    }
    out
}

/// Categories that can matter for relieving `drive`: the direct sources plus everything upstream
/// through recipes, resource drops and the stockpile.
pub fn relevant_kinds<'a>(def: &'a CatalogDef, drive: &str) -> Vec<&'a str> {
    let mut out: Vec<&'a str> = def
        .edibles
        .iter()
        .filter(|e| e.relieves == drive)
        .map(|e| e.kind.as_str())
        .chain(
            def.usables
                .iter()
                .filter(|u| u.relieves == drive)
                .map(|u| u.kind.as_str()),
        )
        .chain(
            def.mate
                .iter()
                .filter(|m| m.relieves == drive)
                .map(|m| m.partner.as_str()),
        )
        .collect();

    loop {
        let before = out.len();
        for recipe in &def.recipes {
            if out.contains(&recipe.output.as_str()) && !out.contains(&recipe.input.as_str()) {
                out.push(&recipe.input);
            }
        }
        for resource in &def.resources {
            if out.contains(&resource.drop.as_str()) && !out.contains(&resource.kind.as_str()) {
                out.push(&resource.kind);
            }
        }
        if let Some(stockpile) = &def.stockpile {
            let stores_relevant = stockpile.stores.iter().any(|s| out.contains(&s.as_str()));
            if stores_relevant && !out.contains(&stockpile.kind.as_str()) {
                out.push(&stockpile.kind);
            }
        }
        if out.len() == before {
            return out;
        }
    }
}
