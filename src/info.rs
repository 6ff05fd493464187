use std::collections::HashMap;
use std::fmt;

use crate::parse::ByteCursor;

/// Which team a player record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerTeam {
    Spec,
    Red,
    Blue,
    Unknown,
}

impl PlayerTeam {
    /// Map an on-wire team tag byte. Total: every byte lands somewhere,
    /// and anything the table does not name is [PlayerTeam::Unknown].
    pub fn from_tag(tag: u8) -> PlayerTeam {
        match tag {
            0x00 => PlayerTeam::Spec,
            0x20 => PlayerTeam::Red,
            0x40 => PlayerTeam::Blue,
            _ => PlayerTeam::Unknown,
        }
    }
}

impl fmt::Display for PlayerTeam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerTeam::Spec => "spec",
            PlayerTeam::Red => "red",
            PlayerTeam::Blue => "blue",
            PlayerTeam::Unknown => "-",
        };
        write!(f, "{name}")
    }
}

/// One player as listed in the players section, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    /// Player name, color escapes stripped
    pub name: String,
    /// Current score
    pub score: i32,
    /// Ping as the server reports it
    pub ping: i32,
    /// Team mapped from the wire tag
    pub team: PlayerTeam,
    /// Server-side player id
    pub id: i32,
}

impl PlayerInfo {
    /// Bytes to skip at the head of the players section.
    const SECTION_HEADER: usize = 4;

    /// Parse a players section into records, preserving wire order.
    ///
    /// The section is self-delimiting: records are read until the buffer
    /// runs out, never counted. A truncated trailing record decodes to
    /// sentinel fields instead of failing.
    pub fn parse_list(data: &[u8]) -> Vec<PlayerInfo> {
        let mut cursor = ByteCursor::new(data);
        cursor.seek(Self::SECTION_HEADER);

        let mut players = Vec::new();
        while !cursor.is_eof() {
            let name = cursor.read_string();
            let ping = cursor.read_i32();
            let score = cursor.read_i32();
            let team = PlayerTeam::from_tag(cursor.read_u8(4));
            let id = cursor.read_i32();

            players.push(PlayerInfo {
                name,
                score,
                ping,
                team,
                id,
            });
        }

        players
    }
}

/// Server information as obtained by [query](crate::query::query).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// Server hostname
    pub name: String,
    /// Current map
    pub map: String,
    /// Game type, e.g. "xDeathMatch"
    pub game_type: String,
    /// Current players
    pub cur_players: i32,
    /// Max players
    pub max_players: i32,
    /// Mutators and settings, keyed by setting name
    pub settings: HashMap<String, String>,
}

impl ServerInfo {
    /// Bytes to skip at the head of the basic info section (a server id
    /// block this client has no use for).
    const SECTION_HEADER: usize = 13;

    /// Parse the basic info and settings sections into a [ServerInfo].
    ///
    /// Pure over its buffers and never fails: empty or truncated sections
    /// leave the matching fields at "" / -1, and the settings map stops
    /// where the pairs run out. A later duplicate key overwrites the
    /// earlier value.
    pub fn parse(basic: &[u8], settings: &[u8]) -> ServerInfo {
        let mut cursor = ByteCursor::new(basic);
        cursor.seek(Self::SECTION_HEADER);

        let name = cursor.read_string();
        let map = cursor.read_string();
        let game_type = cursor.read_string();
        let cur_players = cursor.read_i32();
        let max_players = cursor.read_i32();

        let mut cursor = ByteCursor::new(settings);
        let mut pairs = HashMap::new();
        while !cursor.is_eof() {
            let before = cursor.pos();
            let key = cursor.read_string();
            let value = cursor.read_string();
            if cursor.pos() == before {
                // a stray trailing byte cannot start a string; stop here
                break;
            }
            pairs.insert(key, value);
        }

        ServerInfo {
            name,
            map,
            game_type,
            cur_players,
            max_players,
            settings: pairs,
        }
    }
}
