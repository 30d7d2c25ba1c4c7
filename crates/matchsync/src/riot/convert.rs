//! Conversion from Riot match-v5 records to canonical matches.

use chrono::{DateTime, Duration};

use super::types::{RiotMatch, RiotParticipant};
use crate::catalog::{champion_label, queue_label};
use crate::provider::{CanonicalMatch, Participant, ProviderError, Result, RiotId};

/// Normalize a match-v5 record.
///
/// # Errors
///
/// Returns [`ProviderError::Malformed`] when the record carries neither an
/// end nor a start timestamp.
pub fn to_canonical_match(record: RiotMatch) -> Result<CanonicalMatch> {
    let RiotMatch { metadata, info } = record;

    let end = match (info.game_end_timestamp, info.game_start_timestamp) {
        (Some(end_ms), _) => DateTime::from_timestamp_millis(end_ms),
        (None, Some(start_ms)) => DateTime::from_timestamp_millis(start_ms)
            .and_then(|s| {
                let duration = i64::try_from(info.game_duration).ok().and_then(Duration::try_seconds)?;
                s.checked_add_signed(duration)
            }),
        (None, None) => None,
    }
    .ok_or_else(|| ProviderError::malformed(&metadata.match_id, "no usable game timestamp"))?;

    let participants = info.participants.iter().map(to_participant).collect();

    Ok(CanonicalMatch::new(
        metadata.match_id,
        info.queue_id,
        queue_label(info.queue_id),
        info.game_mode,
        end,
        info.game_duration,
        participants,
    ))
}

fn to_participant(p: &RiotParticipant) -> Participant {
    let riot_id = match (&p.riot_id_game_name, &p.riot_id_tagline) {
        (Some(name), Some(tag)) if !name.is_empty() && !tag.is_empty() => {
            Some(RiotId::new(name, tag))
        }
        _ => None,
    };
    let puuid = Some(p.puuid.as_str()).filter(|s| !s.is_empty());
    let (id, display_name) = Participant::identity(puuid, riot_id.as_ref(), &p.summoner_name);

    let champion = if p.champion_name.is_empty() {
        champion_label(p.champion_id)
    } else {
        p.champion_name.clone()
    };

    Participant {
        id,
        display_name,
        puuid: puuid.map(str::to_string),
        riot_id,
        champion,
        team_id: p.team_id,
        win: p.win,
        kills: p.kills,
        deaths: p.deaths,
        assists: p.assists,
        minions: p.total_minions_killed + p.neutral_minions_killed,
        gold: p.gold_earned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(end_ms: Option<i64>, start_ms: Option<i64>) -> RiotMatch {
        serde_json::from_value(serde_json::json!({
            "metadata": {"matchId": "EUW1_100", "participants": ["puuid-me"]},
            "info": {
                "gameDuration": 1800,
                "gameEndTimestamp": end_ms,
                "gameStartTimestamp": start_ms,
                "gameMode": "CLASSIC",
                "gameType": "MATCHED_GAME",
                "queueId": 420,
                "participants": [{
                    "puuid": "puuid-me",
                    "summonerName": "",
                    "riotIdGameName": "Me",
                    "riotIdTagline": "EUW",
                    "championId": 103,
                    "championName": "",
                    "teamId": 100,
                    "win": true,
                    "kills": 10,
                    "deaths": 1,
                    "assists": 5,
                    "totalMinionsKilled": 200,
                    "neutralMinionsKilled": 12,
                    "goldEarned": 14000
                }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn converts_end_duration_queue_and_participant() {
        let end = Utc.with_ymd_and_hms(2024, 6, 10, 20, 0, 0).unwrap();
        let m = to_canonical_match(record(Some(end.timestamp_millis()), None)).unwrap();

        assert_eq!(m.match_id, "EUW1_100");
        assert_eq!(m.end_time, end);
        assert_eq!(m.start_time, end - Duration::seconds(1800));
        assert_eq!(m.queue_label, "Ranked Solo/Duo");
        assert_eq!(m.game_mode, "CLASSIC");

        let p = &m.participants[0];
        assert_eq!(p.id, "puuid-me");
        assert_eq!(p.display_name, "Me#EUW");
        assert_eq!(p.champion, "Ahri");
        assert_eq!(p.minions, 212);
    }

    #[test]
    fn falls_back_to_start_plus_duration() {
        let start = Utc.with_ymd_and_hms(2024, 6, 10, 19, 30, 0).unwrap();
        let m = to_canonical_match(record(None, Some(start.timestamp_millis()))).unwrap();
        assert_eq!(m.start_time, start);
        assert_eq!(m.end_time, start + Duration::seconds(1800));
    }

    #[test]
    fn missing_timestamps_are_malformed() {
        let err = to_canonical_match(record(None, None)).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { ref match_id, .. } if match_id == "EUW1_100"));
    }
}
