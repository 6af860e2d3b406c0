use serde::Deserialize;
use std::fmt;

pub mod client;
pub mod render;
pub mod resolver;

pub use client::{FqeApi, FqeClient};
pub use resolver::{resolve, Resolution};

/// Errors surfaced to the user when talking to the FQE site.
///
/// The display text is what ends up in the chat reply, the source is only logged.
#[derive(thiserror::Error, Debug)]
pub enum FqeError {
    /// Connection, TLS or timeout failure while sending the request.
    #[error("request failed")]
    Request {
        #[source]
        source: reqwest::Error,
    },

    /// The response started but its body could not be read.
    #[error("error reading response body")]
    ResponseBody {
        #[source]
        source: reqwest::Error,
    },

    /// A search result link carried an id that is not a valid member id.
    #[error("invalid ID in search results")]
    InvalidSearchId {
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Arguments of a member lookup, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub first_name: String,
    pub last_name: String,
    pub member_id: Option<u32>,
}

impl SearchQuery {
    pub fn new(first_name: Option<String>, last_name: Option<String>, member_id: Option<u32>) -> Self {
        Self {
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            member_id: member_id.filter(|id| *id != 0),
        }
    }

    pub fn has_name(&self) -> bool {
        !self.first_name.is_empty() || !self.last_name.is_empty()
    }

    /// True when nothing usable was supplied.
    pub fn is_empty(&self) -> bool {
        !self.has_name() && self.member_id.is_none()
    }

    /// Form fields of the member search, only the supplied ones.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if !self.first_name.is_empty() {
            fields.push(("FName", self.first_name.clone()));
        }
        if !self.last_name.is_empty() {
            fields.push(("Name", self.last_name.clone()));
        }
        if let Some(id) = self.member_id {
            fields.push(("Matricule", id.to_string()));
        }
        fields
    }
}

/// One row of the member search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSearchResult {
    pub name: String,
    pub member_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeControl {
    Lente,
    SemiRapide,
    Rapide,
}

impl TimeControl {
    /// Declared order, also the order ratings are rendered in.
    pub const ALL: [TimeControl; 3] = [
        TimeControl::Lente,
        TimeControl::SemiRapide,
        TimeControl::Rapide,
    ];

    /// Value of the `c` query parameter on the rating endpoint.
    pub fn code(self) -> u8 {
        match self {
            TimeControl::Lente => 1,
            TimeControl::SemiRapide => 2,
            TimeControl::Rapide => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeControl::Lente => "Lente",
            TimeControl::SemiRapide => "Semi-rapide",
            TimeControl::Rapide => "Rapide",
        }
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A rating snapshot as served by `json-cote.php`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RatingEntry {
    #[serde(rename = "Quand")]
    pub date: String,
    #[serde(rename = "Cote")]
    pub value: i32,
}

/// Rating history of a member, one sequence per time control that decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Player {
    pub member_id: u32,
    pub ratings: Vec<(TimeControl, Vec<RatingEntry>)>,
}

impl Player {
    pub fn new(member_id: u32) -> Self {
        Self {
            member_id,
            ratings: Vec::new(),
        }
    }

    pub fn ratings_for(&self, time_control: TimeControl) -> Option<&[RatingEntry]> {
        self.ratings
            .iter()
            .find(|(tc, _)| *tc == time_control)
            .map(|(_, entries)| entries.as_slice())
    }

    /// Most recent rating of a time control, the last entry of its history.
    pub fn current(&self, time_control: TimeControl) -> Option<&RatingEntry> {
        self.ratings_for(time_control).and_then(|entries| entries.last())
    }
}
