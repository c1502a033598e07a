use std::collections::BTreeMap;

use log::warn;

use crate::lineup::{MatchLineup, Side};
use crate::player_ratings::RatingTable;
use crate::types::{LineupEntry, PositionGroup, ResolvedPlayer};

pub const STARTERS_PER_TEAM: usize = 15;

/// Lineup entry that had no rating record and got an imputed skill.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedPlayer {
    pub team: String,
    pub player_name: String,
    pub shirt_number: u32,
    pub imputed_skill: f64,
    pub inferred_position: PositionGroup,
}

#[derive(Debug, Clone, Default)]
pub struct SquadBuild {
    pub players: Vec<ResolvedPlayer>,
    pub unresolved: Vec<UnresolvedPlayer>,
    pub skipped_rows: usize,
}

impl SquadBuild {
    pub fn team_players<'a>(
        &'a self,
        team: &str,
    ) -> impl Iterator<Item = &'a ResolvedPlayer> + use<'a> {
        let team = team.to_string();
        self.players.iter().filter(move |p| p.country == team)
    }
}

/// Resolves both sides of a team sheet against the rating table.
///
/// Fallback skills are computed once per team up front. Unmatched players are
/// logged and listed in [`SquadBuild::unresolved`]; they never fail the build.
pub fn build_match_squads(lineup: &MatchLineup, table: &RatingTable) -> SquadBuild {
    let mut build = SquadBuild {
        skipped_rows: lineup.skipped_rows,
        ..SquadBuild::default()
    };

    for side in [Side::Team1, Side::Team2] {
        let team = lineup.team(side);
        let fallback = table.fallback_skill(team);
        for entry in lineup.entries(side) {
            let player = resolve_entry(&entry, team, table, fallback, &mut build.unresolved);
            build.players.push(player);
        }
    }
    build
}

fn resolve_entry(
    entry: &LineupEntry,
    team: &str,
    table: &RatingTable,
    fallback_skill: f64,
    unresolved: &mut Vec<UnresolvedPlayer>,
) -> ResolvedPlayer {
    if let Some(record) = table.resolve(&entry.player_name, team) {
        return ResolvedPlayer {
            country: team.to_string(),
            name: record.name.clone(),
            position_group: record.position_group,
            skill: record.skill,
            starting: entry.is_starting,
            shirt_number: Some(entry.shirt_number),
        };
    }

    let position_group = PositionGroup::from_shirt_number(entry.shirt_number);
    warn!(
        "missing data for {} ({team}), using skill {fallback_skill:.1}",
        entry.player_name
    );
    unresolved.push(UnresolvedPlayer {
        team: team.to_string(),
        player_name: entry.player_name.clone(),
        shirt_number: entry.shirt_number,
        imputed_skill: fallback_skill,
        inferred_position: position_group,
    });
    ResolvedPlayer {
        country: team.to_string(),
        name: entry.player_name.clone(),
        position_group,
        skill: fallback_skill,
        starting: entry.is_starting,
        shirt_number: Some(entry.shirt_number),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamValidation {
    pub team: String,
    pub players: usize,
    pub starters: usize,
    pub duplicate_shirts: Vec<u32>,
}

impl TeamValidation {
    pub fn is_valid(&self) -> bool {
        self.starters == STARTERS_PER_TEAM && self.duplicate_shirts.is_empty()
    }
}

/// Lineup sanity checks: starter count and duplicate shirt numbers per team.
/// Anomalies are reported, never fatal.
pub fn validate_squads(players: &[ResolvedPlayer]) -> Vec<TeamValidation> {
    let mut order: Vec<&str> = Vec::new();
    for p in players {
        if !order.contains(&p.country.as_str()) {
            order.push(&p.country);
        }
    }

    let mut out = Vec::with_capacity(order.len());
    for team in order {
        let squad: Vec<&ResolvedPlayer> = players.iter().filter(|p| p.country == team).collect();
        let starters = squad.iter().filter(|p| p.starting).count();

        let mut shirt_counts: BTreeMap<u32, usize> = BTreeMap::new();
        for n in squad.iter().filter_map(|p| p.shirt_number) {
            *shirt_counts.entry(n).or_default() += 1;
        }
        let duplicate_shirts: Vec<u32> = shirt_counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(n, _)| n)
            .collect();

        if starters != STARTERS_PER_TEAM {
            warn!("{team} does not have {STARTERS_PER_TEAM} starting players: has {starters}");
        }
        if !duplicate_shirts.is_empty() {
            warn!("{team} has duplicate shirt numbers: {duplicate_shirts:?}");
        }

        out.push(TeamValidation {
            team: team.to_string(),
            players: squad.len(),
            starters,
            duplicate_shirts,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::LineupRow;
    use crate::types::PlayerRecord;

    fn record(name: &str, country: &str, group: PositionGroup, skill: f64) -> PlayerRecord {
        PlayerRecord {
            name: name.to_string(),
            country: country.to_string(),
            position_group: group,
            skill,
            shirt_number: None,
        }
    }

    fn row(n: u32, t1: Option<&str>, t2: Option<&str>) -> LineupRow {
        LineupRow {
            shirt_number: n,
            team1_player: t1.map(str::to_string),
            team2_player: t2.map(str::to_string),
        }
    }

    #[test]
    fn matched_players_keep_table_data() {
        let table = RatingTable::from_records(vec![record(
            "Antoine Dupont",
            "France",
            PositionGroup::Backs,
            95.0,
        )]);
        let lineup = MatchLineup::new(
            "France",
            "Ireland",
            vec![row(9, Some("antoine dupont"), None)],
        );
        let build = build_match_squads(&lineup, &table);
        assert_eq!(build.players.len(), 1);
        let p = &build.players[0];
        assert_eq!(p.name, "Antoine Dupont");
        assert_eq!(p.skill, 95.0);
        assert!(p.starting);
        assert!(build.unresolved.is_empty());
    }

    #[test]
    fn unmatched_players_get_quartile_skill_and_shirt_position() {
        let table = RatingTable::from_records(vec![
            record("Alpha One", "Italy", PositionGroup::Backs, 70.0),
            record("Bravo Two", "Italy", PositionGroup::Backs, 80.0),
            record("Charlie Three", "Italy", PositionGroup::Forwards, 90.0),
        ]);
        let lineup = MatchLineup::new(
            "Italy",
            "Scotland",
            vec![
                row(3, Some("Unknown Prop"), Some("Unknown Scot")),
                row(12, Some("Unknown Centre"), None),
                row(18, Some("Unknown Sub"), None),
            ],
        );
        let build = build_match_squads(&lineup, &table);
        assert_eq!(build.unresolved.len(), 4);

        let italy: Vec<&ResolvedPlayer> = build.team_players("Italy").collect();
        for p in &italy {
            assert!((p.skill - 75.0).abs() < 1e-12);
        }
        assert_eq!(italy[0].position_group, PositionGroup::Forwards);
        assert_eq!(italy[1].position_group, PositionGroup::Backs);
        assert_eq!(italy[2].position_group, PositionGroup::Forwards);
        assert!(!italy[2].starting);

        let scot: Vec<&ResolvedPlayer> = build.team_players("Scotland").collect();
        assert_eq!(scot[0].skill, crate::player_ratings::DEFAULT_FALLBACK_SKILL);
    }

    #[test]
    fn validation_flags_short_lineups_and_duplicates() {
        let mut players = Vec::new();
        for n in 1..=15u32 {
            players.push(ResolvedPlayer {
                country: "Wales".to_string(),
                name: format!("W{n}"),
                position_group: PositionGroup::from_shirt_number(n),
                skill: 70.0,
                starting: true,
                shirt_number: Some(n),
            });
        }
        for n in [1u32, 1, 2] {
            players.push(ResolvedPlayer {
                country: "France".to_string(),
                name: format!("F{n}"),
                position_group: PositionGroup::Forwards,
                skill: 80.0,
                starting: true,
                shirt_number: Some(n),
            });
        }

        let report = validate_squads(&players);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].team, "Wales");
        assert!(report[0].is_valid());
        assert_eq!(report[1].starters, 3);
        assert_eq!(report[1].duplicate_shirts, vec![1]);
        assert!(!report[1].is_valid());
    }
}
