use super::{FqeError, Player, PlayerSearchResult, Resolution, TimeControl};

pub const MISSING_OPTIONS: &str = "At least one option is required!";
pub const NO_MATCHES: &str = "No players found! :(";
pub const NO_RATINGS: &str = "Player is either invalid or has no ELOs";

/// Discord rejects message contents longer than this many characters.
pub const MESSAGE_LIMIT: usize = 2000;

pub fn fits_in_message(text: &str) -> bool {
    text.chars().count() <= MESSAGE_LIMIT
}

/// Rating block of a player, one line per time control in declared order.
///
/// A time control that is missing or has no history yet shows as `?`.
pub fn render_player(player: &Player) -> String {
    if player.ratings.is_empty() {
        return NO_RATINGS.to_string();
    }

    TimeControl::ALL
        .iter()
        .map(|&time_control| match player.current(time_control) {
            Some(current) => format!("{}: {} ({})", time_control, current.value, current.date),
            None => format!("{}: ?", time_control),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_rating(rating: &Result<Player, FqeError>) -> String {
    match rating {
        Ok(player) => render_player(player),
        Err(e) => format!("Error getting player ELO info: {}", e),
    }
}

pub fn render_matches(found: &[PlayerSearchResult]) -> String {
    let lines = found
        .iter()
        .map(|p| format!("{}, {}", p.name, p.member_id))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Found players:\n{}", lines)
}

/// Full reply text of an `elo` invocation.
pub fn render_lookup(outcome: &Result<Resolution, FqeError>) -> String {
    let resolution = match outcome {
        Ok(resolution) => resolution,
        Err(e) => return format!("Failed to search for player: {}", e),
    };

    match resolution {
        Resolution::MissingOptions => MISSING_OPTIONS.to_string(),
        Resolution::NoMatches => NO_MATCHES.to_string(),
        Resolution::Single { found, rating } => format!(
            "Name: {}\nID: {}\n\nFQE rating:\n{}",
            found.name,
            found.member_id,
            render_rating(rating)
        ),
        Resolution::Multiple(found) => render_matches(found),
        Resolution::Direct { member_id, rating } => {
            format!("ID: {}\n\nFQE rating:\n{}", member_id, render_rating(rating))
        }
    }
}
