//! Berry mix planner for the donut-crafting minigame: decides whether a donut
//! recipe is craftable from the berries in your bag and, if so, proposes an
//! economy mix (common berries) and a luxury mix (rare berries).

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::ops::Index;
use std::path::{Path, PathBuf};

use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Total berries a single donut can hold. Fixed by the game, not by us.
pub const SLOT_CAP: u32 = 8;

/// The five flavor axes every berry contributes to and every recipe
/// thresholds on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Sweet,
    Spicy,
    Sour,
    Bitter,
    Fresh,
}

impl Flavor {
    pub const ALL: [Self; 5] = [Self::Sweet, Self::Spicy, Self::Sour, Self::Bitter, Self::Fresh];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Sweet => "Sweet",
            Self::Spicy => "Spicy",
            Self::Sour => "Sour",
            Self::Bitter => "Bitter",
            Self::Fresh => "Fresh",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Five flavor values in `Flavor::ALL` order: a berry's contributions, or the
/// minimums a recipe demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlavorProfile([u32; 5]);

impl FlavorProfile {
    pub const fn new(sweet: u32, spicy: u32, sour: u32, bitter: u32, fresh: u32) -> Self {
        Self([sweet, spicy, sour, bitter, fresh])
    }

    pub fn is_zero(self) -> bool {
        self.0.iter().all(|&value| value == 0)
    }
}

impl Index<Flavor> for FlavorProfile {
    type Output = u32;

    fn index(&self, flavor: Flavor) -> &Self::Output {
        &self.0[flavor as usize]
    }
}

/// One catalog berry. The two auxiliary scalars (`level_boost`, `calories`)
/// only feed the reported totals; they never constrain a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Berry {
    pub name: &'static str,
    pub flavors: FlavorProfile,
    pub level_boost: u32,
    pub calories: u32,
}

impl Berry {
    const fn new(
        name: &'static str,
        sweet: u32,
        spicy: u32,
        sour: u32,
        bitter: u32,
        fresh: u32,
        level_boost: u32,
        calories: u32,
    ) -> Self {
        Self {
            name,
            flavors: FlavorProfile::new(sweet, spicy, sour, bitter, fresh),
            level_boost,
            calories,
        }
    }
}

/// The in-game berry table, in bag order: commonest first. Row order is
/// load-bearing, because the solver weights berry `i` by its 1-based
/// position; reordering rows changes what counts as cheap or fancy.
///
/// Columns: name, Sweet, Spicy, Sour, Bitter, Fresh, Lv. Boost, Calories.
pub static CATALOG: [Berry; 33] = [
    Berry::new("Hyper Cheri", 0, 40, 0, 0, 5, 5, 80),
    Berry::new("Hyper Chesto", 0, 0, 0, 0, 40, 3, 100),
    Berry::new("Hyper Pecha", 40, 0, 0, 0, 0, 2, 100),
    Berry::new("Hyper Rawst", 0, 0, 0, 40, 0, 3, 110),
    Berry::new("Hyper Aspear", 0, 0, 40, 0, 0, 4, 90),
    Berry::new("Hyper Oran", 10, 20, 15, 15, 0, 6, 90),
    Berry::new("Hyper Persim", 0, 15, 15, 10, 20, 4, 110),
    Berry::new("Hyper Lum", 20, 15, 10, 0, 15, 3, 110),
    Berry::new("Hyper Sitrus", 15, 10, 0, 20, 15, 4, 120),
    Berry::new("Hyper Pomeg", 30, 35, 0, 0, 5, 7, 140),
    Berry::new("Hyper Kelpsy", 5, 0, 0, 30, 35, 5, 160),
    Berry::new("Hyper Qualot", 35, 0, 30, 5, 0, 4, 160),
    Berry::new("Hyper Hondew", 0, 5, 35, 0, 30, 6, 150),
    Berry::new("Hyper Grepa", 0, 60, 25, 0, 5, 8, 140),
    Berry::new("Hyper Tamato", 5, 25, 0, 0, 40, 6, 180),
    Berry::new("Hyper Occa", 60, 0, 0, 5, 25, 5, 180),
    Berry::new("Hyper Passho", 25, 0, 5, 60, 0, 6, 200),
    Berry::new("Hyper Wacan", 0, 5, 60, 25, 0, 7, 160),
    Berry::new("Hyper Rindo", 15, 55, 0, 5, 25, 9, 210),
    Berry::new("Hyper Yache", 25, 0, 5, 15, 55, 7, 250),
    Berry::new("Hyper Chople", 55, 5, 15, 25, 0, 6, 250),
    Berry::new("Hyper Kebia", 0, 15, 25, 55, 5, 7, 270),
    Berry::new("Hyper Shuca", 5, 25, 55, 0, 15, 8, 230),
    Berry::new("Hyper Coba", 10, 95, 0, 10, 5, 10, 240),
    Berry::new("Hyper Payapa", 5, 0, 10, 10, 95, 8, 300),
    Berry::new("Hyper Tanga", 95, 10, 10, 5, 0, 7, 300),
    Berry::new("Hyper Charti", 0, 10, 5, 95, 10, 8, 330),
    Berry::new("Hyper Kasib", 10, 5, 95, 0, 10, 9, 270),
    Berry::new("Hyper Haban", 85, 0, 0, 0, 65, 8, 370),
    Berry::new("Hyper Colbur", 0, 0, 65, 0, 85, 9, 370),
    Berry::new("Hyper Babiri", 0, 0, 65, 85, 0, 9, 400),
    Berry::new("Hyper Chilan", 0, 85, 0, 65, 0, 9, 370),
    Berry::new("Hyper Roseli", 0, 65, 85, 0, 0, 10, 340),
];

/// A craftable donut: its display name and the flavor minimums it demands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Donut {
    pub name: &'static str,
    pub targets: FlavorProfile,
}

pub static DONUTS: [Donut; 5] = [
    Donut {
        name: "Darkrai (Bad Dream Cruller)",
        targets: FlavorProfile::new(310, 100, 310, 40, 40),
    },
    Donut {
        name: "Groudon (Omega Old-Fashioned)",
        targets: FlavorProfile::new(260, 160, 160, 20, 260),
    },
    Donut {
        name: "Kyogre (Alpha Old-Fashioned)",
        targets: FlavorProfile::new(50, 50, 210, 180, 370),
    },
    Donut {
        name: "Rayquaza (Delta Old-Fashioned)",
        targets: FlavorProfile::new(120, 40, 340, 40, 390),
    },
    Donut {
        name: "Zeraora (Plasma-Glazed)",
        targets: FlavorProfile::new(40, 200, 400, 280, 40),
    },
];

/// Case-insensitive donut lookup: exact name first, then a substring match
/// that is accepted only when it singles out one donut.
pub fn find_donut(query: &str) -> Option<&'static Donut> {
    let trimmed = query.trim();
    if let Some(exact) = DONUTS
        .iter()
        .find(|donut| donut.name.eq_ignore_ascii_case(trimmed))
    {
        return Some(exact);
    }
    if trimmed.is_empty() {
        return None;
    }

    let needle = trimmed.to_ascii_lowercase();
    let mut matches = DONUTS
        .iter()
        .filter(|donut| donut.name.to_ascii_lowercase().contains(&needle));
    match (matches.next(), matches.next()) {
        (Some(donut), None) => Some(donut),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid inventory file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("unknown berries in inventory: {0}. Names must match the in-game berry names exactly, like \"Hyper Pecha\"")]
    UnknownBerries(String),
}

/// The berries in the player's bag. This is the only mutable solver input;
/// anything absent from it counts as zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Inventory {
    #[serde(default)]
    berries: HashMap<String, u32>,
}

impl Inventory {
    /// Reads an inventory file. A missing file is not an error: the bag is
    /// simply empty, which makes every positive target infeasible. Unknown
    /// berry names and negative quantities are rejected before any solve.
    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        if !path.exists() {
            warn!(path = %path.display(), "inventory file not found; treating the bag as empty");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| InventoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let inventory: Self = toml::from_str(&raw).map_err(|source| InventoryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        inventory.validate(&CATALOG)?;
        Ok(inventory)
    }

    /// Every inventory key must name a catalog berry; a typo would otherwise
    /// silently count as an empty slot.
    pub fn validate(&self, catalog: &[Berry]) -> Result<(), InventoryError> {
        let mut unknown: Vec<&str> = self
            .berries
            .keys()
            .filter(|name| !catalog.iter().any(|berry| berry.name == name.as_str()))
            .map(String::as_str)
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            unknown.sort_unstable();
            Err(InventoryError::UnknownBerries(unknown.join(", ")))
        }
    }

    pub fn quantity(&self, name: &str) -> u32 {
        self.berries.get(name).copied().unwrap_or(0)
    }

    pub fn set(&mut self, name: impl Into<String>, quantity: u32) {
        self.berries.insert(name.into(), quantity);
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Inventory {
    fn from_iter<T: IntoIterator<Item = (S, u32)>>(iter: T) -> Self {
        Self {
            berries: iter
                .into_iter()
                .map(|(name, quantity)| (name.into(), quantity))
                .collect(),
        }
    }
}

/// Which end of the position-weighted objective to chase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Cheapest mix: favors common berries from the top of the catalog.
    Minimize,
    /// Priciest mix: favors rare berries from the bottom of the catalog.
    Maximize,
}

/// One line of a mix: a berry, its 1-based catalog position (the per-unit
/// objective weight), and how many to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub berry: Berry,
    pub position: u32,
    pub count: u32,
}

/// A solved berry selection, in catalog order. Only berries with a positive
/// count appear; totals are plain sums over the picks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mix {
    pub picks: Vec<Pick>,
}

impl Mix {
    pub fn slots(&self) -> u32 {
        self.picks.iter().map(|pick| pick.count).sum()
    }

    pub fn calories(&self) -> u32 {
        self.picks
            .iter()
            .map(|pick| pick.count * pick.berry.calories)
            .sum()
    }

    pub fn level_boost(&self) -> u32 {
        self.picks
            .iter()
            .map(|pick| pick.count * pick.berry.level_boost)
            .sum()
    }

    /// The objective value this mix scored: Σ position × count.
    pub fn position_weight(&self) -> u32 {
        self.picks
            .iter()
            .map(|pick| pick.count * pick.position)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn count_of(&self, name: &str) -> u32 {
        self.picks
            .iter()
            .find(|pick| pick.berry.name == name)
            .map_or(0, |pick| pick.count)
    }
}

/// What a solve produced. Infeasibility is an answer, not an error: the
/// caller renders "not possible", never a partial mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Mix(Mix),
    Infeasible,
}

impl Outcome {
    pub fn mix(&self) -> Option<&Mix> {
        match self {
            Self::Mix(mix) => Some(mix),
            Self::Infeasible => None,
        }
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible)
    }
}

/// Internal solver failure. The slot cap bounds the objective in both
/// directions, so either variant points at a modeling bug, not at bad input.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("solver reported an unbounded objective")]
    Unbounded,
    #[error("solver failure: {0}")]
    Solver(String),
}

/// Picks the optimal berry counts for one donut target.
///
/// Builds one bounded integer variable per in-stock berry, one `>=` row per
/// nonzero flavor target plus the slot-cap row, and minimizes or maximizes
/// the position-weighted count sum. Exact and deterministic: identical
/// inputs always produce the same objective value and verdict.
pub fn solve(
    catalog: &[Berry],
    inventory: &Inventory,
    target: &FlavorProfile,
    direction: Direction,
) -> Result<Outcome, SolveError> {
    let mut vars = ProblemVariables::new();
    let mut entries: Vec<(usize, Variable)> = Vec::with_capacity(catalog.len());
    for (index, berry) in catalog.iter().enumerate() {
        let available = inventory.quantity(berry.name);
        // Out-of-stock berries stay out of the model; their count is zero.
        if available == 0 {
            continue;
        }
        let var = vars.add(variable().integer().min(0).max(f64::from(available)));
        entries.push((index, var));
    }

    if entries.is_empty() {
        return Ok(if target.is_zero() {
            Outcome::Mix(Mix::default())
        } else {
            Outcome::Infeasible
        });
    }

    // A flavor no in-stock berry contributes to can never reach a positive
    // target, and the model would carry an all-zero row.
    for flavor in Flavor::ALL {
        if target[flavor] > 0
            && !entries
                .iter()
                .any(|&(index, _)| catalog[index].flavors[flavor] > 0)
        {
            debug!(%flavor, "no in-stock berry contributes to this flavor");
            return Ok(Outcome::Infeasible);
        }
    }

    // Catalog position (1-based) is the cost of spending one berry.
    let objective: Expression = entries
        .iter()
        .map(|&(index, var)| (index as f64 + 1.0) * var)
        .sum();
    let unsolved = match direction {
        Direction::Minimize => vars.minimise(objective),
        Direction::Maximize => vars.maximise(objective),
    };
    let mut model = unsolved.using(microlp);

    for flavor in Flavor::ALL {
        // Counts are nonnegative, so a zero floor is already met.
        if target[flavor] == 0 {
            continue;
        }
        let total: Expression = entries
            .iter()
            .map(|&(index, var)| f64::from(catalog[index].flavors[flavor]) * var)
            .sum();
        let required = f64::from(target[flavor]);
        model = model.with(constraint!(total >= required));
    }

    let slots: Expression = entries.iter().map(|&(_, var)| 1.0 * var).sum();
    let cap = f64::from(SLOT_CAP);
    model = model.with(constraint!(slots <= cap));

    debug!(variables = entries.len(), ?direction, "solving mix model");
    match model.solve() {
        Ok(solution) => {
            let picks = entries
                .iter()
                .filter_map(|&(index, var)| {
                    let count = solution.value(var).round() as u32;
                    (count > 0).then(|| Pick {
                        berry: catalog[index].clone(),
                        position: index as u32 + 1,
                        count,
                    })
                })
                .collect();
            Ok(Outcome::Mix(Mix { picks }))
        }
        Err(ResolutionError::Infeasible) => Ok(Outcome::Infeasible),
        Err(ResolutionError::Unbounded) => Err(SolveError::Unbounded),
        Err(other) => Err(SolveError::Solver(other.to_string())),
    }
}
