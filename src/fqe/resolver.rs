use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument};

use super::{FqeApi, FqeError, Player, PlayerSearchResult, RatingEntry, SearchQuery, TimeControl};

static MEMBER_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a href="index\.php\?Id=(\d+)">(.*?)</a>"#).expect("member link pattern is valid")
});

/// What a lookup ended up with, before it is turned into a reply.
#[derive(Debug)]
pub enum Resolution {
    /// Neither a name nor an id was given, nothing was requested.
    MissingOptions,
    NoMatches,
    /// Exactly one member matched the search, ratings were fetched for it.
    Single {
        found: PlayerSearchResult,
        rating: Result<Player, FqeError>,
    },
    /// Ambiguous search, the user has to refine it.
    Multiple(Vec<PlayerSearchResult>),
    /// Id-only lookup, the search page was skipped.
    Direct {
        member_id: u32,
        rating: Result<Player, FqeError>,
    },
}

/// Resolves a lookup to zero, one or several members.
///
/// Only a failed member search is returned as an error. Rating failures are
/// carried inside the resolution so the reply can still show who was found.
#[instrument(skip(api))]
pub async fn resolve<A>(api: &A, query: &SearchQuery) -> Result<Resolution, FqeError>
where
    A: FqeApi + Sync,
{
    if query.is_empty() {
        return Ok(Resolution::MissingOptions);
    }

    if !query.has_name() {
        if let Some(member_id) = query.member_id {
            let rating = fetch_player(api, member_id).await;
            return Ok(Resolution::Direct { member_id, rating });
        }
    }

    let page = api.search_members(query).await?;
    let mut found = parse_search_results(&page)?;
    info!(matches = found.len(), "member search done");

    let resolution = match found.len() {
        0 => Resolution::NoMatches,
        1 => {
            let found = found.remove(0);
            let rating = fetch_player(api, found.member_id).await;
            Resolution::Single { found, rating }
        }
        _ => Resolution::Multiple(found),
    };
    Ok(resolution)
}

/// Fetches the three rating histories of a member.
///
/// A transport failure on any time control fails the whole fetch. A payload
/// that does not decode only drops its own time control.
pub async fn fetch_player<A>(api: &A, member_id: u32) -> Result<Player, FqeError>
where
    A: FqeApi + Sync,
{
    let [lente, semi_rapide, rapide] = TimeControl::ALL;
    let payloads = tokio::try_join!(
        api.rating_payload(member_id, lente),
        api.rating_payload(member_id, semi_rapide),
        api.rating_payload(member_id, rapide),
    )?;

    let mut player = Player::new(member_id);
    let (lente_body, semi_rapide_body, rapide_body) = payloads;
    for (time_control, body) in TimeControl::ALL
        .into_iter()
        .zip([lente_body, semi_rapide_body, rapide_body])
    {
        match serde_json::from_str::<Vec<RatingEntry>>(&body) {
            Ok(entries) => player.ratings.push((time_control, entries)),
            Err(e) => debug!(member_id, %time_control, "skipping undecodable ratings: {}", e),
        }
    }

    Ok(player)
}

/// Scrapes the member links off a search result page, in document order.
pub fn parse_search_results(html: &str) -> Result<Vec<PlayerSearchResult>, FqeError> {
    MEMBER_LINK
        .captures_iter(html)
        .map(|captures| {
            let member_id = captures[1]
                .parse::<u32>()
                .map_err(|source| FqeError::InvalidSearchId { source })?;
            Ok(PlayerSearchResult {
                name: captures[2].to_string(),
                member_id,
            })
        })
        .collect()
}
