use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use thiserror::Error;

use crate::SDPParseError::MalformedAttribute;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SDPParseError {
    #[error("line is not of the form <type>=<value>")]
    MalformedSDPLine,
    #[error("malformed attribute line")]
    MalformedAttribute,
    #[error("malformed media descriptor")]
    MalformedMediaDescriptor,
    #[error("unsupported media type")]
    UnsupportedMediaType,
    #[error("unsupported media protocol")]
    UnsupportedMediaProtocol,
    #[error("no media section found")]
    MissingMediaSection,
    #[error("no video media section found")]
    MissingVideoSection,
    #[error("no FID group found")]
    MissingFIDGroup,
    #[error("no cname found for SSRC {0}")]
    MissingCName(u32),
    #[error("no msid found for SSRC {0}")]
    MissingMSID(u32),
    #[error("no DTLS fingerprint found")]
    MissingFingerprint,
    #[error("no ICE credentials found")]
    MissingICECredentials,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SDPLine {
    ProtocolVersion(String),
    Originator(Originator),
    SessionName(String),
    SessionTime(SessionTime),
    ConnectionData(ConnectionData),
    Attribute(Attribute),
    MediaDescription(MediaDescription),
}

#[derive(Debug, PartialEq, Clone)]
pub struct ConnectionData {
    pub ip: IpAddr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Unrecognized(String),
    MediaID(MediaID),
    ICEUsername(ICEUsername),
    ICEPassword(ICEPassword),
    Fingerprint(Fingerprint),
    MediaGroup(MediaGroup),
    MediaStreamID(MediaStreamID),
    MSIDSemantic(String),
    MediaSSRC(MediaSSRC),
    SSRCGroup(SSRCGroup),
    RTCP(RTCPAddress),
    RTCPMux,
    RTCPReducedSize,
    RTPMap(RTPMap),
    FMTP(FMTP),
    Feedback(Feedback),
    ExtMap(ExtMap),
    Setup(Setup),
    Candidate(String),
}

#[derive(Debug, PartialEq, Clone)]
pub struct MediaDescription {
    pub media_type: MediaType,
    pub transport_port: u16,
    pub transport_protocol: MediaTransportProtocol,
    pub media_format_description: Vec<u8>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum MediaType {
    Video,
    Audio,
}

#[derive(Debug, PartialEq, Clone)]
pub enum MediaTransportProtocol {
    DtlsSrtp,
    Savpf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Originator {
    pub username: String,
    pub session_id: String,
    pub session_version: String,
    pub ip_addr: IpAddr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionTime {
    pub start_time: usize,
    pub end_time: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MediaID {
    pub id: String,
}

/// `a=msid:<stream id> [<track id>]`
#[derive(Clone, Debug, PartialEq)]
pub struct MediaStreamID {
    pub stream_id: String,
    pub track_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    pub hash_function: HashFunction,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HashFunction {
    SHA1,
    SHA256,
    SHA384,
    SHA512,
    Other(String),
}

/// `a=rtcp-fb:<pt> <value>`, a `None` payload type is the `*` wildcard.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub payload_type: Option<u8>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaSSRC {
    pub ssrc: u32,
    pub source_attribute: SourceAttribute,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceAttribute {
    CName(String),
    MSID(String),
    Other { name: String, value: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SSRCGroup {
    pub semantics: GroupSemantics,
    pub ssrcs: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupSemantics {
    /// Retransmission pairing, `<media> <rtx>`
    FID,
    /// Simulcast layers of one source
    SIM,
    Other(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Setup {
    ActivePassive,
    Active,
    Passive,
    HoldConnection,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MediaGroup {
    Bundle(Vec<String>),
    LipSync(Vec<String>),
    Other(String, Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RTCPAddress {
    pub port: u16,
    pub connection_data: Option<ConnectionData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RTPMap {
    pub payload_number: u8,
    pub encoding_name: String,
    pub clock_rate: u32,
    pub channels: Option<u8>,
}

/// Format parameters are kept as written so they survive a rewrite unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct FMTP {
    pub payload_number: u8,
    pub format_parameters: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtMap {
    pub id: u16,
    pub direction: Option<String>,
    pub uri: String,
    pub extension_attributes: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ICEUsername {
    pub username: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ICEPassword {
    pub password: String,
}

impl SSRCGroup {
    /// The `(media, rtx)` pair of an FID group.
    pub fn fid_pair(&self) -> Option<(u32, u32)> {
        match (&self.semantics, self.ssrcs.as_slice()) {
            (GroupSemantics::FID, [media, rtx]) => Some((*media, *rtx)),
            _ => None,
        }
    }
}

impl From<SDPLine> for String {
    fn from(value: SDPLine) -> Self {
        match value {
            SDPLine::ProtocolVersion(proto) => format!("v={}", proto),
            SDPLine::Originator(originator) => String::from(originator),
            SDPLine::SessionName(session_name) => format!("s={}", session_name),
            SDPLine::SessionTime(session_time) => String::from(session_time),
            SDPLine::ConnectionData(connection_data) => {
                format!("c={}", String::from(connection_data))
            }
            SDPLine::Attribute(attr) => String::from(attr),
            SDPLine::MediaDescription(media_description) => String::from(media_description),
        }
    }
}

impl From<ConnectionData> for String {
    fn from(value: ConnectionData) -> Self {
        let ip_family = match &value.ip {
            IpAddr::V4(_) => "IP4",
            IpAddr::V6(_) => "IP6",
        };
        format!("IN {} {}", ip_family, value.ip)
    }
}

impl From<Attribute> for String {
    fn from(value: Attribute) -> Self {
        let attribute = match value {
            Attribute::Unrecognized(raw) => raw,
            Attribute::RTCPMux => "rtcp-mux".to_string(),
            Attribute::RTCPReducedSize => "rtcp-rsize".to_string(),
            Attribute::MediaID(attr) => String::from(attr),
            Attribute::ICEUsername(attr) => String::from(attr),
            Attribute::ICEPassword(attr) => String::from(attr),
            Attribute::Fingerprint(attr) => String::from(attr),
            Attribute::MediaGroup(attr) => String::from(attr),
            Attribute::MediaStreamID(attr) => String::from(attr),
            Attribute::MSIDSemantic(semantic) => format!("msid-semantic:{}", semantic),
            Attribute::MediaSSRC(attr) => String::from(attr),
            Attribute::SSRCGroup(attr) => String::from(attr),
            Attribute::RTCP(attr) => String::from(attr),
            Attribute::RTPMap(attr) => String::from(attr),
            Attribute::FMTP(attr) => String::from(attr),
            Attribute::Feedback(attr) => String::from(attr),
            Attribute::ExtMap(attr) => String::from(attr),
            Attribute::Setup(attr) => String::from(attr),
            Attribute::Candidate(candidate) => format!("candidate:{}", candidate),
        };
        format!("a={attribute}")
    }
}

impl From<Feedback> for String {
    fn from(value: Feedback) -> Self {
        match value.payload_type {
            Some(payload_type) => format!("rtcp-fb:{} {}", payload_type, value.value),
            None => format!("rtcp-fb:* {}", value.value),
        }
    }
}

impl From<SessionTime> for String {
    fn from(value: SessionTime) -> Self {
        format!("t={} {}", value.start_time, value.end_time)
    }
}

impl From<ICEUsername> for String {
    fn from(value: ICEUsername) -> Self {
        format!("ice-ufrag:{}", value.username)
    }
}

impl From<ICEPassword> for String {
    fn from(value: ICEPassword) -> Self {
        format!("ice-pwd:{}", value.password)
    }
}

impl From<Originator> for String {
    fn from(value: Originator) -> Self {
        let ip_version = match value.ip_addr {
            IpAddr::V4(_) => "IP4",
            IpAddr::V6(_) => "IP6",
        };
        format!(
            "o={} {} {} IN {} {}",
            value.username, value.session_id, value.session_version, ip_version, value.ip_addr
        )
    }
}

impl From<Setup> for String {
    fn from(value: Setup) -> Self {
        match value {
            Setup::ActivePassive => "setup:actpass".to_string(),
            Setup::Active => "setup:active".to_string(),
            Setup::Passive => "setup:passive".to_string(),
            Setup::HoldConnection => "setup:holdconn".to_string(),
        }
    }
}

impl From<MediaType> for String {
    fn from(value: MediaType) -> Self {
        match value {
            MediaType::Video => "video".to_string(),
            MediaType::Audio => "audio".to_string(),
        }
    }
}

impl From<MediaTransportProtocol> for String {
    fn from(value: MediaTransportProtocol) -> Self {
        match value {
            MediaTransportProtocol::DtlsSrtp => "UDP/TLS/RTP/SAVPF".to_string(),
            MediaTransportProtocol::Savpf => "RTP/SAVPF".to_string(),
        }
    }
}

impl From<MediaDescription> for String {
    fn from(value: MediaDescription) -> Self {
        let media_payloads = value
            .media_format_description
            .into_iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "m={} {} {} {}",
            String::from(value.media_type),
            value.transport_port,
            String::from(value.transport_protocol),
            media_payloads
        )
    }
}

impl From<MediaID> for String {
    fn from(value: MediaID) -> Self {
        format!("mid:{}", value.id)
    }
}

impl From<MediaStreamID> for String {
    fn from(value: MediaStreamID) -> Self {
        match value.track_id {
            Some(track_id) => format!("msid:{} {}", value.stream_id, track_id),
            None => format!("msid:{}", value.stream_id),
        }
    }
}

impl From<MediaGroup> for String {
    fn from(value: MediaGroup) -> Self {
        match value {
            MediaGroup::Bundle(groups) => {
                format!("group:BUNDLE {}", groups.join(" "))
            }
            MediaGroup::LipSync(groups) => {
                format!("group:LS {}", groups.join(" "))
            }
            MediaGroup::Other(semantics, groups) => {
                format!("group:{} {}", semantics, groups.join(" "))
            }
        }
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        format!(
            "fingerprint:{} {}",
            String::from(value.hash_function),
            value.hash
        )
    }
}

impl From<HashFunction> for String {
    fn from(value: HashFunction) -> Self {
        match value {
            HashFunction::SHA1 => "sha-1".to_string(),
            HashFunction::SHA256 => "sha-256".to_string(),
            HashFunction::SHA384 => "sha-384".to_string(),
            HashFunction::SHA512 => "sha-512".to_string(),
            HashFunction::Other(name) => name,
        }
    }
}

impl From<RTPMap> for String {
    fn from(value: RTPMap) -> Self {
        match value.channels {
            Some(channels) if channels != 1 => format!(
                "rtpmap:{} {}/{}/{}",
                value.payload_number, value.encoding_name, value.clock_rate, channels
            ),
            _ => format!(
                "rtpmap:{} {}/{}",
                value.payload_number, value.encoding_name, value.clock_rate
            ),
        }
    }
}

impl From<MediaSSRC> for String {
    fn from(value: MediaSSRC) -> Self {
        format!(
            "ssrc:{} {}",
            value.ssrc,
            String::from(value.source_attribute)
        )
    }
}

impl From<SourceAttribute> for String {
    fn from(value: SourceAttribute) -> Self {
        match value {
            SourceAttribute::CName(cname) => format!("cname:{}", cname),
            SourceAttribute::MSID(msid) => format!("msid:{}", msid),
            SourceAttribute::Other { name, value: None } => name,
            SourceAttribute::Other {
                name,
                value: Some(value),
            } => format!("{}:{}", name, value),
        }
    }
}

impl From<SSRCGroup> for String {
    fn from(value: SSRCGroup) -> Self {
        let semantics = match value.semantics {
            GroupSemantics::FID => "FID".to_string(),
            GroupSemantics::SIM => "SIM".to_string(),
            GroupSemantics::Other(semantics) => semantics,
        };
        let ssrcs = value
            .ssrcs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        format!("ssrc-group:{} {}", semantics, ssrcs)
    }
}

impl From<RTCPAddress> for String {
    fn from(value: RTCPAddress) -> Self {
        match value.connection_data {
            Some(connection_data) => {
                format!("rtcp:{} {}", value.port, String::from(connection_data))
            }
            None => format!("rtcp:{}", value.port),
        }
    }
}

impl From<FMTP> for String {
    fn from(value: FMTP) -> Self {
        format!("fmtp:{} {}", value.payload_number, value.format_parameters)
    }
}

impl From<ExtMap> for String {
    fn from(value: ExtMap) -> Self {
        let id = match value.direction {
            Some(direction) => format!("{}/{}", value.id, direction),
            None => value.id.to_string(),
        };
        match value.extension_attributes {
            Some(attributes) => format!("extmap:{} {} {}", id, value.uri, attributes),
            None => format!("extmap:{} {}", id, value.uri),
        }
    }
}

impl TryFrom<&str> for Attribute {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value.split_once("a=").ok_or(MalformedAttribute)?;
        let key = value.split(':').next().ok_or(MalformedAttribute)?;

        match key {
            "ice-ufrag" => Ok(Attribute::ICEUsername(ICEUsername::try_from(value)?)),
            "ice-pwd" => Ok(Attribute::ICEPassword(ICEPassword::try_from(value)?)),
            "fingerprint" => Ok(Attribute::Fingerprint(Fingerprint::try_from(value)?)),
            "candidate" => {
                let (_, candidate) = value.split_once("candidate:").ok_or(MalformedAttribute)?;
                Ok(Attribute::Candidate(candidate.to_string()))
            }
            "ssrc" => Ok(Attribute::MediaSSRC(MediaSSRC::try_from(value)?)),
            "ssrc-group" => Ok(Attribute::SSRCGroup(SSRCGroup::try_from(value)?)),
            "mid" => Ok(Attribute::MediaID(MediaID::try_from(value)?)),
            "msid" => Ok(Attribute::MediaStreamID(MediaStreamID::try_from(value)?)),
            "msid-semantic" => {
                let (_, semantic) = value.split_once(':').ok_or(MalformedAttribute)?;
                Ok(Attribute::MSIDSemantic(semantic.trim().to_string()))
            }
            "group" => Ok(Attribute::MediaGroup(MediaGroup::try_from(value)?)),
            "rtcp" => Ok(Attribute::RTCP(RTCPAddress::try_from(value)?)),
            "rtpmap" => Ok(Attribute::RTPMap(RTPMap::try_from(value)?)),
            "fmtp" => Ok(Attribute::FMTP(FMTP::try_from(value)?)),
            "rtcp-fb" => Ok(Attribute::Feedback(Feedback::try_from(value)?)),
            "extmap" => Ok(Attribute::ExtMap(ExtMap::try_from(value)?)),
            "rtcp-mux" => Ok(Attribute::RTCPMux),
            "rtcp-rsize" => Ok(Attribute::RTCPReducedSize),
            "setup" => Ok(Attribute::Setup(Setup::try_from(value)?)),
            _ => Ok(Attribute::Unrecognized(value.to_string())),
        }
    }
}

impl TryFrom<&str> for MediaDescription {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("m=")
            .ok_or(Self::Error::MalformedSDPLine)?;
        let mut split = value.split(' ');

        let media_type = split
            .next()
            .ok_or(SDPParseError::MalformedMediaDescriptor)
            .and_then(MediaType::try_from)?;

        let transport_port = split
            .next()
            .and_then(|port| port.parse::<u16>().ok())
            .ok_or(SDPParseError::MalformedMediaDescriptor)?;

        let transport_protocol = split
            .next()
            .ok_or(SDPParseError::MalformedMediaDescriptor)
            .and_then(MediaTransportProtocol::try_from)?;

        let media_format_description = split
            .take_while(|format| !format.is_empty())
            .map(|format| format.parse::<u8>().ok())
            .collect::<Option<Vec<u8>>>()
            .ok_or(SDPParseError::MalformedMediaDescriptor)?;

        Ok(MediaDescription {
            transport_port,
            media_type,
            media_format_description,
            transport_protocol,
        })
    }
}

impl TryFrom<&str> for ConnectionData {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut split = value.split(' ');

        let network_type_matches = split
            .next()
            .ok_or(Self::Error::MalformedSDPLine)?
            .eq_ignore_ascii_case("in");

        if !network_type_matches {
            return Err(Self::Error::MalformedSDPLine);
        }

        let ip = split
            .next()
            .and_then(|address_type| match address_type {
                "IP4" => {
                    let ip = Ipv4Addr::from_str(split.next()?).ok()?;
                    Some(IpAddr::V4(ip))
                }
                "IP6" => {
                    let ip = Ipv6Addr::from_str(split.next()?).ok()?;
                    Some(IpAddr::V6(ip))
                }
                _ => None,
            })
            .ok_or(Self::Error::MalformedSDPLine)?;

        Ok(Self { ip })
    }
}

impl TryFrom<&str> for MediaType {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            _ => Err(Self::Error::UnsupportedMediaType),
        }
    }
}

impl TryFrom<&str> for MediaTransportProtocol {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "UDP/TLS/RTP/SAVPF" => Ok(Self::DtlsSrtp),
            "RTP/SAVPF" => Ok(Self::Savpf),
            _ => Err(Self::Error::UnsupportedMediaProtocol),
        }
    }
}

impl TryFrom<&str> for MediaID {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("mid:")
            .ok_or(Self::Error::MalformedAttribute)?;
        Ok(Self {
            id: value.to_string(),
        })
    }
}

impl TryFrom<&str> for MediaStreamID {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("msid:")
            .ok_or(Self::Error::MalformedAttribute)?;
        let stream_and_track = match value.split_once(' ') {
            Some((stream_id, track_id)) => Self {
                stream_id: stream_id.to_string(),
                track_id: Some(track_id.to_string()),
            },
            None => Self {
                stream_id: value.to_string(),
                track_id: None,
            },
        };
        Ok(stream_and_track)
    }
}

impl TryFrom<&str> for MediaGroup {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("group:")
            .ok_or(Self::Error::MalformedAttribute)?;

        let (group_type, group_values) = value
            .split_once(' ')
            .ok_or(Self::Error::MalformedAttribute)?;

        let group_values = group_values
            .split(' ')
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        match group_type {
            "BUNDLE" => Ok(MediaGroup::Bundle(group_values)),
            "LS" => Ok(MediaGroup::LipSync(group_values)),
            "" => Err(Self::Error::MalformedAttribute),
            semantics => Ok(MediaGroup::Other(semantics.to_string(), group_values)),
        }
    }
}

impl TryFrom<&str> for Fingerprint {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("fingerprint:")
            .ok_or(Self::Error::MalformedAttribute)?;
        let (hash_function, hash) = value
            .split_once(' ')
            .ok_or(SDPParseError::MalformedAttribute)?;

        Ok(Fingerprint {
            hash_function: HashFunction::from(hash_function),
            hash: hash.to_string(),
        })
    }
}

impl From<&str> for HashFunction {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "sha-1" => HashFunction::SHA1,
            "sha-256" => HashFunction::SHA256,
            "sha-384" => HashFunction::SHA384,
            "sha-512" => HashFunction::SHA512,
            _ => HashFunction::Other(value.to_string()),
        }
    }
}

impl TryFrom<&str> for Feedback {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("rtcp-fb:")
            .ok_or(Self::Error::MalformedAttribute)?;
        let (payload_type, feedback) = value
            .split_once(' ')
            .ok_or(SDPParseError::MalformedAttribute)?;

        let payload_type = match payload_type {
            "*" => None,
            payload_type => Some(
                payload_type
                    .parse::<u8>()
                    .or(Err(SDPParseError::MalformedAttribute))?,
            ),
        };

        Ok(Feedback {
            payload_type,
            value: feedback.to_string(),
        })
    }
}

impl TryFrom<&str> for RTPMap {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("rtpmap:")
            .ok_or(Self::Error::MalformedAttribute)?;
        let (payload_number, codec) = value
            .split_once(' ')
            .ok_or(SDPParseError::MalformedAttribute)?;

        let payload_number = payload_number
            .parse::<u8>()
            .map_err(|_| SDPParseError::MalformedAttribute)?;

        let mut codec = codec.split('/');
        let encoding_name = codec.next().ok_or(MalformedAttribute)?.to_string();
        let clock_rate = codec
            .next()
            .ok_or(MalformedAttribute)?
            .parse::<u32>()
            .map_err(|_| MalformedAttribute)?;
        let channels = codec
            .next()
            .map(|channels| channels.parse::<u8>().map_err(|_| MalformedAttribute))
            .transpose()?;

        Ok(RTPMap {
            payload_number,
            encoding_name,
            clock_rate,
            channels,
        })
    }
}

impl TryFrom<&str> for MediaSSRC {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("ssrc:")
            .ok_or(Self::Error::MalformedAttribute)?;

        let (ssrc, attribute) = value
            .split_once(' ')
            .ok_or(SDPParseError::MalformedAttribute)?;

        let ssrc = ssrc
            .parse::<u32>()
            .map_err(|_| Self::Error::MalformedAttribute)?;

        Ok(MediaSSRC {
            ssrc,
            source_attribute: SourceAttribute::from(attribute),
        })
    }
}

impl From<&str> for SourceAttribute {
    fn from(value: &str) -> Self {
        match value.split_once(':') {
            Some(("cname", cname)) => Self::CName(cname.to_string()),
            Some(("msid", msid)) => Self::MSID(msid.to_string()),
            Some((name, value)) => Self::Other {
                name: name.to_string(),
                value: Some(value.to_string()),
            },
            None => Self::Other {
                name: value.to_string(),
                value: None,
            },
        }
    }
}

impl TryFrom<&str> for SSRCGroup {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("ssrc-group:")
            .ok_or(Self::Error::MalformedAttribute)?;

        let (semantics, ssrcs) = value
            .split_once(' ')
            .ok_or(SDPParseError::MalformedAttribute)?;

        let semantics = match semantics {
            "FID" => GroupSemantics::FID,
            "SIM" => GroupSemantics::SIM,
            other => GroupSemantics::Other(other.to_string()),
        };

        let ssrcs = ssrcs
            .split(' ')
            .filter(|ssrc| !ssrc.is_empty())
            .map(|ssrc| ssrc.parse::<u32>().map_err(|_| MalformedAttribute))
            .collect::<Result<Vec<u32>, _>>()?;

        if ssrcs.is_empty() {
            return Err(MalformedAttribute);
        }

        Ok(SSRCGroup { semantics, ssrcs })
    }
}

impl TryFrom<&str> for RTCPAddress {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("rtcp:")
            .ok_or(Self::Error::MalformedAttribute)?;
        let (port, connection_data) = match value.split_once(' ') {
            Some((port, connection_data)) => (port, Some(connection_data)),
            None => (value, None),
        };

        Ok(RTCPAddress {
            port: port.parse::<u16>().map_err(|_| MalformedAttribute)?,
            connection_data: connection_data.map(ConnectionData::try_from).transpose()?,
        })
    }
}

impl TryFrom<&str> for Setup {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("setup:")
            .ok_or(Self::Error::MalformedAttribute)?;

        match value {
            "actpass" => Ok(Self::ActivePassive),
            "active" => Ok(Self::Active),
            "passive" => Ok(Self::Passive),
            "holdconn" => Ok(Self::HoldConnection),
            _ => Err(Self::Error::MalformedAttribute),
        }
    }
}

impl TryFrom<&str> for FMTP {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("fmtp:")
            .ok_or(Self::Error::MalformedAttribute)?;
        let (payload_number, format_parameters) = value
            .split_once(' ')
            .ok_or(SDPParseError::MalformedAttribute)?;

        let payload_number = payload_number
            .parse::<u8>()
            .map_err(|_| SDPParseError::MalformedAttribute)?;

        Ok(FMTP {
            payload_number,
            format_parameters: format_parameters.to_string(),
        })
    }
}

impl TryFrom<&str> for ExtMap {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("extmap:")
            .ok_or(Self::Error::MalformedAttribute)?;
        let mut split = value.splitn(3, ' ');

        let id = split.next().ok_or(MalformedAttribute)?;
        let (id, direction) = match id.split_once('/') {
            Some((id, direction)) => (id, Some(direction.to_string())),
            None => (id, None),
        };
        let id = id.parse::<u16>().map_err(|_| MalformedAttribute)?;
        let uri = split.next().ok_or(MalformedAttribute)?.to_string();
        let extension_attributes = split.next().map(ToString::to_string);

        Ok(ExtMap {
            id,
            direction,
            uri,
            extension_attributes,
        })
    }
}

impl TryFrom<&str> for ICEUsername {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("ice-ufrag:")
            .ok_or(Self::Error::MalformedAttribute)?;
        Ok(ICEUsername {
            username: value.to_string(),
        })
    }
}

impl TryFrom<&str> for ICEPassword {
    type Error = SDPParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (_, value) = value
            .split_once("ice-pwd:")
            .ok_or(Self::Error::MalformedAttribute)?;
        Ok(ICEPassword {
            password: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::line_parsers::{
        Attribute, ExtMap, Feedback, GroupSemantics, MediaGroup, MediaSSRC, RTCPAddress, RTPMap,
        SSRCGroup, SourceAttribute,
    };

    #[test]
    fn parses_ssrc_msid_with_embedded_space() {
        let ssrc = MediaSSRC::try_from("a=ssrc:1001 msid:stream track").expect("Should parse");

        assert_eq!(ssrc.ssrc, 1001);
        assert_eq!(
            ssrc.source_attribute,
            SourceAttribute::MSID("stream track".to_string())
        );
        assert_eq!(String::from(ssrc), "ssrc:1001 msid:stream track");
    }

    #[test]
    fn rejects_ssrc_without_attribute() {
        MediaSSRC::try_from("a=ssrc:1001").expect_err("Should reject bare SSRC");
    }

    #[test]
    fn parses_fid_group_pair() {
        let group = SSRCGroup::try_from("a=ssrc-group:FID 1001 1002").expect("Should parse");

        assert_eq!(group.semantics, GroupSemantics::FID);
        assert_eq!(group.fid_pair(), Some((1001, 1002)));
    }

    #[test]
    fn sim_group_has_no_fid_pair() {
        let group = SSRCGroup::try_from("a=ssrc-group:SIM 1001 1003").expect("Should parse");

        assert_eq!(group.semantics, GroupSemantics::SIM);
        assert_eq!(group.fid_pair(), None);
    }

    #[test]
    fn rtpmap_drops_single_channel_count() {
        let opus = RTPMap::try_from("a=rtpmap:111 opus/48000/2").expect("Should parse");
        let event = RTPMap::try_from("a=rtpmap:101 telephone-event/8000/1").expect("Should parse");

        assert_eq!(String::from(opus), "rtpmap:111 opus/48000/2");
        assert_eq!(String::from(event), "rtpmap:101 telephone-event/8000");
    }

    #[test]
    fn parses_extmap_with_direction() {
        let extmap =
            ExtMap::try_from("a=extmap:2/recvonly urn:ietf:params:rtp-hdrext:csrc-audio-level")
                .expect("Should parse");

        assert_eq!(extmap.id, 2);
        assert_eq!(extmap.direction.as_deref(), Some("recvonly"));
        assert_eq!(extmap.uri, "urn:ietf:params:rtp-hdrext:csrc-audio-level");
        assert_eq!(
            String::from(extmap),
            "extmap:2/recvonly urn:ietf:params:rtp-hdrext:csrc-audio-level"
        );
    }

    #[test]
    fn parses_wildcard_feedback() {
        let feedback = Feedback::try_from("a=rtcp-fb:* nack").expect("Should parse");

        assert_eq!(feedback.payload_type, None);
        assert_eq!(String::from(feedback), "rtcp-fb:* nack");
    }

    #[test]
    fn keeps_unrecognized_attributes_verbatim() {
        let attribute = Attribute::try_from("a=extmap-allow-mixed").expect("Should parse");

        assert_eq!(
            attribute,
            Attribute::Unrecognized("extmap-allow-mixed".to_string())
        );
        assert_eq!(String::from(attribute), "a=extmap-allow-mixed");
    }

    #[test]
    fn parses_rtcp_port_without_address() {
        let rtcp = RTCPAddress::try_from("a=rtcp:9").expect("Should parse");

        assert_eq!(rtcp.port, 9);
        assert_eq!(rtcp.connection_data, None);
        assert_eq!(String::from(rtcp), "rtcp:9");
    }

    #[test]
    fn parses_rtcp_port_with_address() {
        let rtcp = RTCPAddress::try_from("a=rtcp:9 IN IP4 0.0.0.0").expect("Should parse");

        assert_eq!(rtcp.port, 9);
        assert!(rtcp.connection_data.is_some());
        assert_eq!(String::from(rtcp), "rtcp:9 IN IP4 0.0.0.0");
    }

    #[test]
    fn keeps_unknown_group_semantics() {
        let group = MediaGroup::try_from("a=group:FEC 0 1").expect("Should parse");

        assert_eq!(
            group,
            MediaGroup::Other("FEC".to_string(), vec!["0".to_string(), "1".to_string()])
        );
        assert_eq!(String::from(group), "group:FEC 0 1");
    }
}
