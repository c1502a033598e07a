use crate::model_params::ParameterSet;
use crate::types::{PositionGroup, ResolvedPlayer, TeamTacticalProfile};

/// Unit average used when a subset has nobody to average.
pub const EMPTY_UNIT_SKILL: f64 = 70.0;

const HALFBACK_SHIRTS: [u32; 2] = [9, 10];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitAverages {
    pub pack: f64,
    pub control: f64,
    pub strike: f64,
}

impl UnitAverages {
    pub fn weighted(&self, params: &ParameterSet) -> f64 {
        self.pack * params.weight_pack
            + self.control * params.weight_control
            + self.strike * params.weight_strike
    }
}

/// Pack / control / strike averages for one subset (starters or bench).
pub fn unit_averages(subset: &[&ResolvedPlayer]) -> UnitAverages {
    let backs: Vec<&ResolvedPlayer> = subset
        .iter()
        .copied()
        .filter(|p| p.position_group == PositionGroup::Backs)
        .collect();

    let pack = mean_skill(
        subset
            .iter()
            .copied()
            .filter(|p| p.position_group == PositionGroup::Forwards),
    );

    let halfbacks = mean_skill(backs.iter().copied().filter(|p| is_halfback(p)));
    let strike_runners = mean_skill(backs.iter().copied().filter(|p| !is_halfback(p)));
    let all_backs = mean_skill(backs.iter().copied());

    // Without shirt numbers nobody is a halfback, so both fall through to
    // the all-backs average.
    let control = halfbacks.or(all_backs);
    let strike = strike_runners.or(all_backs);

    UnitAverages {
        pack: pack.unwrap_or(EMPTY_UNIT_SKILL),
        control: control.unwrap_or(EMPTY_UNIT_SKILL),
        strike: strike.unwrap_or(EMPTY_UNIT_SKILL),
    }
}

/// Aggregates one team's players into its tactical profile, or `None` when
/// the team has no players at all.
pub fn team_profile(
    players: &[ResolvedPlayer],
    team: &str,
    params: &ParameterSet,
) -> Option<TeamTacticalProfile> {
    let squad: Vec<&ResolvedPlayer> = players.iter().filter(|p| p.country == team).collect();
    if squad.is_empty() {
        return None;
    }

    let (starters, bench): (Vec<&ResolvedPlayer>, Vec<&ResolvedPlayer>) =
        squad.into_iter().partition(|p| p.starting);
    let xv = unit_averages(&starters);
    let bn = unit_averages(&bench);

    let total_score =
        xv.weighted(params) * params.weight_starters + bn.weighted(params) * params.weight_bench;

    Some(TeamTacticalProfile {
        total_score,
        pack_score_starters: xv.pack,
        pack_score_bench: bn.pack,
    })
}

fn is_halfback(p: &ResolvedPlayer) -> bool {
    p.shirt_number.is_some_and(|n| HALFBACK_SHIRTS.contains(&n))
}

fn mean_skill<'a>(players: impl Iterator<Item = &'a ResolvedPlayer>) -> Option<f64> {
    let (sum, n) = players.fold((0.0_f64, 0usize), |(sum, n), p| (sum + p.skill, n + 1));
    (n > 0).then(|| sum / n as f64)
}
