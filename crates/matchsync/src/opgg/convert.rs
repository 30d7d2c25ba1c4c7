//! Conversion from OP.GG match records to canonical matches.

use std::collections::HashMap;

use chrono::Utc;

use super::types::{OpggMatch, OpggParticipant};
use crate::catalog::{champion_label, queue_label};
use crate::provider::{CanonicalMatch, Participant, RiotId};

/// Queue id for an OP.GG `game_type`; unknown types map to 0 (custom).
pub fn queue_id_for_game_type(game_type: &str) -> i64 {
    match game_type {
        "SOLORANKED" => 420,
        "FLEXRANKED" => 440,
        "NORMAL" => 400,
        "ARAM" => 450,
        "URF" => 900,
        "CLASH" => 700,
        "BOT" => 830,
        _ => 0,
    }
}

/// Normalize one OP.GG match. `champions` is the payload's champion id map.
pub fn to_canonical_match(record: OpggMatch, champions: &HashMap<String, String>) -> CanonicalMatch {
    let queue_id = queue_id_for_game_type(&record.game_type);
    let participants = record
        .participants
        .iter()
        .map(|p| to_participant(p, champions))
        .collect();

    CanonicalMatch::new(
        record.id,
        queue_id,
        queue_label(queue_id),
        record.game_type,
        record.created_at.with_timezone(&Utc),
        record.game_length_second,
        participants,
    )
}

fn to_participant(p: &OpggParticipant, champions: &HashMap<String, String>) -> Participant {
    let riot_id = RiotId::parse(&format!("{}#{}", p.summoner.game_name, p.summoner.tagline));
    let puuid = p.summoner.puuid.as_deref().filter(|s| !s.is_empty());
    let (id, display_name) = Participant::identity(puuid, riot_id.as_ref(), &p.summoner.game_name);

    let champion = champions
        .get(&p.champion_id.to_string())
        .cloned()
        .unwrap_or_else(|| champion_label(p.champion_id));

    Participant {
        id,
        display_name,
        puuid: puuid.map(str::to_string),
        riot_id,
        champion,
        team_id: if p.team_key == "BLUE" { 100 } else { 200 },
        win: p.stats.result == "WIN",
        kills: p.stats.kill,
        deaths: p.stats.death,
        assists: p.stats.assist,
        minions: p.stats.minion_kill,
        gold: p.stats.gold_earned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(game_type: &str) -> OpggMatch {
        serde_json::from_value(serde_json::json!({
            "id": "opgg-match-1",
            "created_at": "2024-06-10T21:00:00+09:00",
            "game_map": "SUMMONERS_RIFT",
            "game_type": game_type,
            "game_length_second": 1650,
            "participants": [{
                "summoner": {"puuid": "puuid-me", "game_name": "Me", "tagline": "EUW"},
                "champion_id": 103,
                "team_key": "RED",
                "position": "MID",
                "stats": {
                    "kill": 4, "death": 4, "assist": 4,
                    "minion_kill": 150, "gold_earned": 9000, "result": "WIN"
                }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn game_types_map_to_queue_ids() {
        assert_eq!(queue_id_for_game_type("SOLORANKED"), 420);
        assert_eq!(queue_id_for_game_type("ARAM"), 450);
        assert_eq!(queue_id_for_game_type("BOT"), 830);
        assert_eq!(queue_id_for_game_type("CUSTOM"), 0);
        assert_eq!(queue_id_for_game_type("SOMETHING_NEW"), 0);
    }

    #[test]
    fn created_at_is_the_end_in_utc() {
        let m = to_canonical_match(record("FLEXRANKED"), &HashMap::new());
        assert_eq!(m.end_time, Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap());
        assert_eq!(m.start_time, Utc.with_ymd_and_hms(2024, 6, 10, 11, 32, 30).unwrap());
        assert_eq!(m.queue_id, 440);
        assert_eq!(m.queue_label, "Ranked Flex");
        assert_eq!(m.game_mode, "FLEXRANKED");
    }

    #[test]
    fn participant_keys_on_puuid_and_uses_payload_champion_names() {
        let champions = HashMap::from([("103".to_string(), "Ahri (payload)".to_string())]);
        let m = to_canonical_match(record("ARAM"), &champions);
        let p = &m.participants[0];

        assert_eq!(p.id, "puuid-me");
        assert_eq!(p.display_name, "Me#EUW");
        assert_eq!(p.champion, "Ahri (payload)");
        assert_eq!(p.team_id, 200);
        assert!(p.win);

        let m = to_canonical_match(record("ARAM"), &HashMap::new());
        assert_eq!(m.participants[0].champion, "Ahri");
    }
}
