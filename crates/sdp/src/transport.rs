use crate::line_parsers::{Attribute, Fingerprint, ICEPassword, ICEUsername, SDPParseError};
use crate::sections::parse_attributes;

#[derive(Debug, Clone, PartialEq)]
pub struct DTLSParameters {
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ICEParameters {
    pub username: ICEUsername,
    pub password: ICEPassword,
}

impl DTLSParameters {
    /// Media level fingerprint wins over the session level one.
    pub fn from_sections(media: &str, session: &str) -> Result<Self, SDPParseError> {
        let fingerprint = section_attributes(media, session)?
            .into_iter()
            .find_map(|attr| match attr {
                Attribute::Fingerprint(fingerprint) => Some(fingerprint),
                _ => None,
            })
            .ok_or(SDPParseError::MissingFingerprint)?;

        Ok(DTLSParameters { fingerprint })
    }
}

impl ICEParameters {
    pub fn from_sections(media: &str, session: &str) -> Result<Self, SDPParseError> {
        let attributes = section_attributes(media, session)?;

        let username = attributes
            .iter()
            .find_map(|attr| match attr {
                Attribute::ICEUsername(username) => Some(username.clone()),
                _ => None,
            })
            .ok_or(SDPParseError::MissingICECredentials)?;
        let password = attributes
            .iter()
            .find_map(|attr| match attr {
                Attribute::ICEPassword(password) => Some(password.clone()),
                _ => None,
            })
            .ok_or(SDPParseError::MissingICECredentials)?;

        Ok(ICEParameters { username, password })
    }
}

fn section_attributes(media: &str, session: &str) -> Result<Vec<Attribute>, SDPParseError> {
    let mut attributes = parse_attributes(media)?;
    attributes.extend(parse_attributes(session)?);
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use crate::line_parsers::{HashFunction, SDPParseError};
    use crate::transport::{DTLSParameters, ICEParameters};

    const SESSION: &str = "v=0\r\na=fingerprint:sha-256 AA:BB\r\na=ice-ufrag:session\r\na=ice-pwd:sessionpwd\r\n";

    #[test]
    fn prefers_media_level_credentials() {
        let media = "m=video 9 UDP/TLS/RTP/SAVPF 96\r\na=ice-ufrag:media\r\na=ice-pwd:mediapwd\r\n";

        let ice = ICEParameters::from_sections(media, SESSION).expect("Should find credentials");

        assert_eq!(ice.username.username, "media");
        assert_eq!(ice.password.password, "mediapwd");
    }

    #[test]
    fn falls_back_to_session_fingerprint() {
        let media = "m=video 9 UDP/TLS/RTP/SAVPF 96\r\na=mid:0\r\n";

        let dtls = DTLSParameters::from_sections(media, SESSION).expect("Should find fingerprint");

        assert_eq!(dtls.fingerprint.hash_function, HashFunction::SHA256);
        assert_eq!(dtls.fingerprint.hash, "AA:BB");
    }

    #[test]
    fn reports_missing_credentials() {
        let media = "m=video 9 UDP/TLS/RTP/SAVPF 96\r\n";

        let result = ICEParameters::from_sections(media, "v=0\r\n");

        assert_eq!(result, Err(SDPParseError::MissingICECredentials));
    }
}
