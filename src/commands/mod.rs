use crate::fqe::{self, render, FqeApi, SearchQuery};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

const REPLY_FILE_NAME: &str = "elo.txt";

/// Ping Pong Test!
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say("Pong!").await?;
    Ok(())
}

/// Retrieve a player's ELO, at least 1 option is required
#[poise::command(slash_command, guild_only)]
pub async fn elo(
    ctx: Context<'_>,
    #[description = "Prenom/First name"] firstname: Option<String>,
    #[description = "Nom/Last name"] lastname: Option<String>,
    #[description = "Matricule/ID FQE"]
    #[min = 1]
    id: Option<u32>,
) -> Result<(), Error> {
    let query = SearchQuery::new(firstname, lastname, id);

    // three FQE round trips can outlast the interaction deadline
    if !query.is_empty() {
        ctx.defer().await?;
    }

    let response = lookup_reply(&ctx.data().fqe, &query).await;
    ctx.send(into_reply(response)).await?;
    Ok(())
}

/// Wraps reply text, moving it into an attached file when it is too long for a message.
fn into_reply(text: String) -> poise::CreateReply {
    if render::fits_in_message(&text) {
        return poise::CreateReply::default().content(text);
    }

    let lines = text.lines().count();
    tracing::info!(lines, "reply too long for a message, attaching it");
    poise::CreateReply::default()
        .content(format!(
            "The result has {} lines, see the attached `{}`.",
            lines, REPLY_FILE_NAME
        ))
        .attachment(serenity::CreateAttachment::bytes(text.into_bytes(), REPLY_FILE_NAME))
}

/// Resolves a query and renders the reply, logging failures on the way.
async fn lookup_reply<A>(api: &A, query: &SearchQuery) -> String
where
    A: FqeApi + Sync,
{
    let outcome = fqe::resolve(api, query).await;

    match &outcome {
        Err(e) => tracing::warn!(?query, "member search failed: {:?}", e),
        Ok(fqe::Resolution::Single { rating: Err(e), .. })
        | Ok(fqe::Resolution::Direct { rating: Err(e), .. }) => {
            tracing::warn!(?query, "rating fetch failed: {:?}", e)
        }
        Ok(_) => {}
    }

    render::render_lookup(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fqe::resolver::tests::FakeFqe;
    use crate::fqe::TimeControl;

    #[tokio::test]
    async fn test_no_options() {
        let api = FakeFqe::with_search_page(r#"<a href="index.php?Id=42">Jane Doe</a>"#);
        let reply = lookup_reply(&api, &SearchQuery::new(None, None, None)).await;

        assert_eq!(reply, "At least one option is required!");
        assert!(api.searches.lock().unwrap().is_empty());
        assert!(api.rating_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_match_reply() {
        let api = FakeFqe::with_search_page(r#"<a href="index.php?Id=42">Jane Doe</a>"#)
            .rating(
                TimeControl::Lente,
                r#"[{"Quand":"2020-01-01","Cote":1500},{"Quand":"2021-01-01","Cote":1550}]"#,
            )
            .rating(TimeControl::SemiRapide, "[]")
            .rating(TimeControl::Rapide, "[]");
        let query = SearchQuery::new(Some("Jane".into()), Some("Doe".into()), None);

        let reply = lookup_reply(&api, &query).await;

        assert_eq!(
            reply,
            "Name: Jane Doe\nID: 42\n\nFQE rating:\nLente: 1550 (2021-01-01)\nSemi-rapide: ?\nRapide: ?"
        );
    }

    #[tokio::test]
    async fn test_undecodable_time_controls_show_unknown() {
        let api = FakeFqe::default()
            .rating(TimeControl::Lente, r#"[{"Quand":"2021-01-01","Cote":1550}]"#)
            .rating(TimeControl::SemiRapide, "<html>erreur</html>")
            .rating(TimeControl::Rapide, "not json");
        let reply = lookup_reply(&api, &SearchQuery::new(None, None, Some(42))).await;

        assert_eq!(
            reply,
            "ID: 42\n\nFQE rating:\nLente: 1550 (2021-01-01)\nSemi-rapide: ?\nRapide: ?"
        );
    }

    #[test]
    fn test_short_reply_is_inline() {
        let reply = into_reply("Pong!".to_string());
        assert_eq!(reply.content.as_deref(), Some("Pong!"));
        assert!(reply.attachments.is_empty());
    }

    #[tokio::test]
    async fn test_long_match_list_is_attached() {
        let page: String = (0..120)
            .map(|i| format!(r#"<a href="index.php?Id={}">Tremblay, Jean-Francois {}</a>"#, 100_000 + i, i))
            .collect();
        let api = FakeFqe::with_search_page(&page);

        let text = lookup_reply(&api, &SearchQuery::new(None, Some("Tremblay".into()), None)).await;
        assert!(text.contains("Tremblay, Jean-Francois 119, 100119"));

        let reply = into_reply(text);
        assert_eq!(
            reply.content.as_deref(),
            Some("The result has 121 lines, see the attached `elo.txt`.")
        );
        assert_eq!(reply.attachments.len(), 1);
        assert!(api.rating_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_player_reply() {
        let api = FakeFqe::default();
        let reply = lookup_reply(&api, &SearchQuery::new(None, None, Some(1))).await;

        assert_eq!(
            reply,
            "ID: 1\n\nFQE rating:\nPlayer is either invalid or has no ELOs"
        );
    }

    #[tokio::test]
    async fn test_bad_search_reply() {
        let api = FakeFqe::with_search_page(r#"<a href="index.php?Id=123456789012">Bad</a>"#);
        let reply = lookup_reply(&api, &SearchQuery::new(None, Some("Bad".into()), None)).await;

        assert_eq!(reply, "Failed to search for player: invalid ID in search results");
        assert!(api.rating_calls.lock().unwrap().is_empty());
    }
}
