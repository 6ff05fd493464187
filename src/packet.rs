use crate::error::UtQueryError;

/// Fixed four-byte preamble opening every query datagram in both directions.
pub const PACKET_PREAMBLE: [u8; 4] = [0x80, 0x00, 0x00, 0x00];

/// Receive window for one response datagram. Servers keep their sections
/// well inside this.
pub const MAX_DATAGRAM_SIZE: usize = 4096;

/// The two probes a query exchange opens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Ask for the full status: settings and player sections.
    FullStatus,
    /// Ask for basic server info. Its response also ends the exchange.
    BasicInfo,
}

/// For packing a [RequestKind] into a probe in [RequestPacket::pack].
impl RequestKind {
    pub fn to_byte(&self) -> u8 {
        match self {
            RequestKind::FullStatus => 0x03,
            RequestKind::BasicInfo => 0x00,
        }
    }
}

/// One of the two fixed 5-byte probe datagrams that start an exchange.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestPacket {
    kind: RequestKind,
}

impl RequestPacket {
    pub fn new(kind: RequestKind) -> Self {
        RequestPacket { kind }
    }

    /// Serializes the probe into its wire bytes.
    pub fn pack(&self) -> Vec<u8> {
        // packet structure: preamble, request kind. that's the whole probe
        let mut payload: Vec<u8> = Vec::with_capacity(PACKET_PREAMBLE.len() + 1);
        payload.extend_from_slice(&PACKET_PREAMBLE);
        payload.push(self.kind.to_byte());
        payload
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// Identifies the semantic content of one response datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionTag {
    /// Server name, map, game type and player counts. The server sends this
    /// section last, so it terminates the exchange.
    BasicInfo,
    /// Mutators and other server settings, as key/value string pairs.
    Settings,
    /// One record per connected player.
    Players,
}

/// Convert a tag byte into a [SectionTag].
impl TryFrom<u8> for SectionTag {
    type Error = UtQueryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(SectionTag::BasicInfo),
            0x01 => Ok(SectionTag::Settings),
            0x02 => Ok(SectionTag::Players),
            n => Err(UtQueryError::UnknownSectionTag(n)),
        }
    }
}

/// For stamping a [SectionTag] into a response header.
impl SectionTag {
    pub fn to_byte(&self) -> u8 {
        match self {
            SectionTag::BasicInfo => 0x00,
            SectionTag::Settings => 0x01,
            SectionTag::Players => 0x02,
        }
    }
}

/// A response datagram split into its section tag and payload.
#[derive(Debug, PartialEq, Eq)]
pub struct ResponsePacket {
    tag: SectionTag,
    payload: Vec<u8>,
}

impl ResponsePacket {
    /// Preamble plus tag byte.
    pub const HEADER_LEN: usize = 5;
    const TAG_OFFSET: usize = 4;

    /// Deserializes an incoming datagram, splitting the section tag from
    /// the payload.
    ///
    /// Datagrams shorter than the header or carrying an unknown tag are
    /// rejected for the caller to discard. The preamble bytes themselves
    /// are not inspected; servers in the wild are not consistent about
    /// them.
    pub fn unpack(datagram: &[u8]) -> Result<Self, UtQueryError> {
        if datagram.len() < Self::HEADER_LEN {
            return Err(UtQueryError::ShortDatagram(datagram.len()));
        }

        let tag: SectionTag = datagram[Self::TAG_OFFSET].try_into()?;

        Ok(ResponsePacket {
            tag,
            payload: datagram[Self::HEADER_LEN..].to_vec(),
        })
    }

    pub fn tag(&self) -> SectionTag {
        self.tag
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
