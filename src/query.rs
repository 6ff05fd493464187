use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;

use crate::error::UtQueryError;
use crate::info::{PlayerInfo, ServerInfo};
use crate::packet::{RequestKind, RequestPacket, ResponsePacket, SectionTag, MAX_DATAGRAM_SIZE};

/// How long a [QuerySession] waits on each receive before giving up.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Datagram transport a [QuerySession] runs over.
///
/// [UdpSocket] is the real one; tests script their own.
#[async_trait]
pub trait Transport {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize>;
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}

#[async_trait]
impl Transport for UdpSocket {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, target).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).await
    }
}

/// One status exchange against a single server.
#[derive(Debug, Clone, Copy)]
pub struct QuerySession {
    target: SocketAddr,
    recv_timeout: Duration,
}

impl QuerySession {
    pub fn new(target: SocketAddr) -> Self {
        QuerySession {
            target,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
        }
    }

    pub fn with_timeout(target: SocketAddr, recv_timeout: Duration) -> Self {
        QuerySession {
            target,
            recv_timeout,
        }
    }

    /// Runs the exchange: sends both probes, then collects response
    /// datagrams until the basic info section closes the exchange.
    ///
    /// Datagrams that fail to unpack are discarded and do not count
    /// toward the response; a timeout with nothing accepted is
    /// [NoResponse](UtQueryError::NoResponse), after a partial response
    /// it is [Incomplete](UtQueryError::Incomplete). Sections split
    /// across datagrams are concatenated in arrival order.
    pub async fn run<T: Transport + ?Sized>(
        &self,
        transport: &T,
    ) -> Result<(ServerInfo, Vec<PlayerInfo>), UtQueryError> {
        for kind in [RequestKind::FullStatus, RequestKind::BasicInfo] {
            let probe = RequestPacket::new(kind);
            transport
                .send_to(&probe.pack(), self.target)
                .await
                .map_err(UtQueryError::SendError)?;
        }

        let mut basic: Vec<u8> = Vec::new();
        let mut settings: Vec<u8> = Vec::new();
        let mut players: Vec<u8> = Vec::new();
        let mut accepted: usize = 0;

        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        loop {
            let received = timeout(self.recv_timeout, transport.recv_from(&mut buf)).await;
            let (len, _) = match received {
                Ok(result) => result.map_err(UtQueryError::ReceiveError)?,
                Err(_) if accepted == 0 => {
                    return Err(UtQueryError::NoResponse(self.recv_timeout))
                }
                Err(_) => {
                    return Err(UtQueryError::Incomplete {
                        datagrams: accepted,
                    })
                }
            };

            let packet = match ResponsePacket::unpack(&buf[..len]) {
                Ok(packet) => packet,
                Err(err) => {
                    debug!("discarding datagram from {}: {err}", self.target);
                    continue;
                }
            };

            accepted += 1;
            debug!(
                "accepted {:?} section, {} byte(s)",
                packet.tag(),
                packet.payload().len()
            );
            match packet.tag() {
                SectionTag::Settings => settings.extend_from_slice(packet.payload()),
                SectionTag::Players => players.extend_from_slice(packet.payload()),
                SectionTag::BasicInfo => {
                    basic.extend_from_slice(packet.payload());
                    break;
                }
            }
        }

        Ok((
            ServerInfo::parse(&basic, &settings),
            PlayerInfo::parse_list(&players),
        ))
    }
}

/// Queries a UT2004 server at `host` (the game port + 1) for its status.
///
/// Resolves the host, binds an ephemeral local socket and runs one
/// [QuerySession] over it with `timeout_dur` as the receive window.
pub async fn query(
    host: &str,
    timeout_dur: Option<Duration>,
) -> Result<(ServerInfo, Vec<PlayerInfo>), UtQueryError> {
    let target: SocketAddr = lookup_host(host)
        .await
        .map_err(UtQueryError::UnreachableHost)?
        .next()
        .ok_or_else(|| UtQueryError::InvalidHost(host.to_owned()))?;

    // just arbitrarily bind any port, doesn't matter really
    let sock: UdpSocket = UdpSocket::bind("0.0.0.0:0")
        .await
        .map_err(UtQueryError::FailedPortBind)?;

    let session = match timeout_dur {
        Some(dur) => QuerySession::with_timeout(target, dur),
        None => QuerySession::new(target),
    };
    session.run(&sock).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::info::PlayerTeam;
    use crate::packet::PACKET_PREAMBLE;

    /// Feeds a fixed script of datagrams to a session, then goes silent.
    struct ScriptedTransport {
        incoming: Mutex<VecDeque<Vec<u8>>>,
        sent: Mutex<Vec<Vec<u8>>>,
    }

    impl ScriptedTransport {
        fn new(datagrams: &[Vec<u8>]) -> Self {
            ScriptedTransport {
                incoming: Mutex::new(datagrams.iter().cloned().collect()),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send_to(&self, buf: &[u8], _target: SocketAddr) -> io::Result<usize> {
            self.sent.lock().unwrap().push(buf.to_vec());
            Ok(buf.len())
        }

        async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
            let next = self.incoming.lock().unwrap().pop_front();
            match next {
                Some(datagram) => {
                    buf[..datagram.len()].copy_from_slice(&datagram);
                    Ok((datagram.len(), target_addr()))
                }
                // script exhausted: stay quiet until the session times out
                None => std::future::pending().await,
            }
        }
    }

    fn target_addr() -> SocketAddr {
        "127.0.0.1:7778".parse().unwrap()
    }

    fn short_session() -> QuerySession {
        QuerySession::with_timeout(target_addr(), Duration::from_millis(50))
    }

    fn datagram(tag: SectionTag, payload: &[u8]) -> Vec<u8> {
        let mut out = PACKET_PREAMBLE.to_vec();
        out.push(tag.to_byte());
        out.extend_from_slice(payload);
        out
    }

    fn wire_string(s: &str) -> Vec<u8> {
        let mut out = vec![s.len() as u8 + 1];
        out.extend_from_slice(s.as_bytes());
        out.push(0);
        out
    }

    fn basic_payload(name: &str, map: &str, game_type: &str, cur: i32, max: i32) -> Vec<u8> {
        let mut out = vec![0u8; 13];
        out.extend(wire_string(name));
        out.extend(wire_string(map));
        out.extend(wire_string(game_type));
        out.extend(cur.to_le_bytes());
        out.extend(max.to_le_bytes());
        out
    }

    fn player_record(name: &str, ping: i32, score: i32, team: u8, id: i32) -> Vec<u8> {
        let mut out = wire_string(name);
        out.extend(ping.to_le_bytes());
        out.extend(score.to_le_bytes());
        out.extend([0x00, 0x00, 0x00, team]);
        out.extend(id.to_le_bytes());
        out
    }

    #[tokio::test]
    async fn session_sends_both_probes_then_assembles_sections() {
        let mut players_payload = vec![0u8; 4];
        players_payload.extend(player_record("Alpha", 40, 7, 0x20, 1));

        let mut settings_payload = wire_string("GoalScore");
        settings_payload.extend(wire_string("0"));

        let transport = ScriptedTransport::new(&[
            datagram(SectionTag::Players, &players_payload),
            datagram(SectionTag::Settings, &settings_payload),
            datagram(
                SectionTag::BasicInfo,
                &basic_payload("Arena", "DM-Deck", "DeathMatch", 1, 16),
            ),
        ]);

        let (info, players) = short_session().run(&transport).await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![
                vec![0x80, 0x00, 0x00, 0x00, 0x03],
                vec![0x80, 0x00, 0x00, 0x00, 0x00],
            ]
        );

        assert_eq!(info.name, "Arena");
        assert_eq!(info.map, "DM-Deck");
        assert_eq!(info.game_type, "DeathMatch");
        assert_eq!(info.cur_players, 1);
        assert_eq!(info.max_players, 16);
        assert_eq!(info.settings["GoalScore"], "0");

        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Alpha");
        assert_eq!(players[0].team, PlayerTeam::Red);
    }

    #[tokio::test]
    async fn junk_datagrams_are_discarded_without_ending_the_exchange() {
        let mut unknown_tag = PACKET_PREAMBLE.to_vec();
        unknown_tag.extend([0x09, 0xaa, 0xbb]);

        let transport = ScriptedTransport::new(&[
            vec![0x80, 0x00],
            unknown_tag,
            datagram(
                SectionTag::BasicInfo,
                &basic_payload("Arena", "DM-Deck", "DeathMatch", 0, 16),
            ),
        ]);

        let (info, players) = short_session().run(&transport).await.unwrap();
        assert_eq!(info.name, "Arena");
        assert!(players.is_empty());
    }

    #[tokio::test]
    async fn silent_server_is_reported_as_no_response() {
        let transport = ScriptedTransport::new(&[]);

        let err = short_session().run(&transport).await.unwrap_err();
        assert!(matches!(err, UtQueryError::NoResponse(_)));
    }

    #[tokio::test]
    async fn partial_response_is_reported_as_incomplete() {
        let mut players_payload = vec![0u8; 4];
        players_payload.extend(player_record("Alpha", 40, 7, 0x20, 1));

        // the short datagram is discarded, so it must not count
        let transport = ScriptedTransport::new(&[
            vec![0x80, 0x00],
            datagram(SectionTag::Players, &players_payload),
        ]);

        let err = short_session().run(&transport).await.unwrap_err();
        assert!(matches!(err, UtQueryError::Incomplete { datagrams: 1 }));
    }

    #[tokio::test]
    async fn split_players_section_is_reassembled_across_datagrams() {
        let mut players_payload = vec![0u8; 4];
        players_payload.extend(player_record("Alpha", 40, 7, 0x20, 1));
        players_payload.extend(player_record("Beta", 85, -3, 0x40, 2));

        // split mid-record: reassembly must not care where the cut lands
        let (head, tail) = players_payload.split_at(13);
        let transport = ScriptedTransport::new(&[
            datagram(SectionTag::Players, head),
            datagram(SectionTag::Players, tail),
            datagram(
                SectionTag::BasicInfo,
                &basic_payload("Arena", "DM-Deck", "DeathMatch", 2, 16),
            ),
        ]);

        let (_, players) = short_session().run(&transport).await.unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Alpha");
        assert_eq!(players[1].name, "Beta");
        assert_eq!(players[1].team, PlayerTeam::Blue);
    }
}
