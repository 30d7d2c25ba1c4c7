//! Conversion from League client games to canonical matches.

use chrono::Duration;

use super::types::{LcuGame, LcuParticipant, LcuParticipantIdentity};
use crate::catalog::{champion_label, queue_info};
use crate::provider::{CanonicalMatch, Participant, RiotId};

/// Match id in the match-v5 format: `{platform_id}_{gameId}`.
pub fn match_id(platform_id: &str, game_id: u64) -> String {
    format!("{platform_id}_{game_id}")
}

/// Normalize one client game. The recorded end is creation plus duration.
pub fn to_canonical_match(game: LcuGame, platform_id: &str) -> CanonicalMatch {
    let end = i64::try_from(game.game_duration)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|d| game.game_creation_date.checked_add_signed(d))
        .unwrap_or(game.game_creation_date);

    let queue_label = match queue_info(game.queue_id) {
        Some(info) => info.description.to_string(),
        None if !game.game_mode.is_empty() => game.game_mode.clone(),
        None => format!("Queue {}", game.queue_id),
    };

    let participants = game
        .participant_identities
        .iter()
        .filter_map(|identity| {
            game.participants
                .iter()
                .find(|p| p.participant_id == identity.participant_id)
                .map(|stats| to_participant(identity, stats))
        })
        .collect();

    CanonicalMatch::new(
        match_id(platform_id, game.game_id),
        game.queue_id,
        queue_label,
        game.game_mode,
        end,
        game.game_duration,
        participants,
    )
}

fn to_participant(identity: &LcuParticipantIdentity, p: &LcuParticipant) -> Participant {
    let player = &identity.player;
    let riot_id = RiotId::parse(&format!("{}#{}", player.game_name, player.tag_line));
    let puuid = player.puuid.as_deref().filter(|s| !s.is_empty());
    let (id, display_name) = Participant::identity(puuid, riot_id.as_ref(), &player.summoner_name);

    Participant {
        id,
        display_name,
        puuid: puuid.map(str::to_string),
        riot_id,
        champion: champion_label(p.champion_id),
        team_id: p.team_id,
        win: p.stats.win,
        kills: p.stats.kills,
        deaths: p.stats.deaths,
        assists: p.stats.assists,
        minions: p.stats.total_minions_killed + p.stats.neutral_minions_killed,
        gold: p.stats.gold_earned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn game(queue_id: i64, game_mode: &str) -> LcuGame {
        serde_json::from_value(serde_json::json!({
            "gameId": 3456789012u64,
            "gameCreationDate": "2024-06-10T19:30:00.000Z",
            "gameDuration": 1860,
            "gameMode": game_mode,
            "queueId": queue_id,
            "participantIdentities": [
                {"participantId": 1, "player": {"puuid": "p-me", "gameName": "Me", "tagLine": "EUNE", "summonerName": ""}},
                {"participantId": 2, "player": {"puuid": "p-you", "gameName": "You", "tagLine": "EUNE"}},
                {"participantId": 3, "player": {"gameName": "Ghost", "tagLine": "EUNE"}}
            ],
            "participants": [
                {"participantId": 2, "championId": 22, "teamId": 200, "stats": {"kills": 1, "deaths": 5, "assists": 2, "win": false}},
                {"participantId": 1, "championId": 103, "teamId": 100, "stats": {"kills": 9, "deaths": 3, "assists": 7, "win": true, "totalMinionsKilled": 190, "goldEarned": 13000}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn builds_platform_match_id_and_times_from_creation() {
        let m = to_canonical_match(game(420, "CLASSIC"), "EUN1");
        assert_eq!(m.match_id, "EUN1_3456789012");
        assert_eq!(m.start_time, Utc.with_ymd_and_hms(2024, 6, 10, 19, 30, 0).unwrap());
        assert_eq!(m.end_time, Utc.with_ymd_and_hms(2024, 6, 10, 20, 1, 0).unwrap());
        assert_eq!(m.queue_label, "Ranked Solo/Duo");
    }

    #[test]
    fn joins_participants_by_id() {
        let m = to_canonical_match(game(450, "ARAM"), "EUN1");
        assert_eq!(m.participants.len(), 2);

        let me = m
            .find_participant(&crate::provider::PlayerIdentity::from_riot_id(RiotId::new("me", "eune")))
            .expect("player present");
        assert_eq!(me.champion, "Ahri");
        assert_eq!((me.kills, me.deaths, me.assists), (9, 3, 7));
        assert!(me.win);
    }

    #[test]
    fn unknown_queue_falls_back_to_game_mode() {
        let m = to_canonical_match(game(3100, "SWIFTPLAY"), "EUW1");
        assert_eq!(m.queue_label, "SWIFTPLAY");

        let m = to_canonical_match(game(3100, ""), "EUW1");
        assert_eq!(m.queue_label, "Queue 3100");
    }
}
