use crate::line_parsers::{Attribute, SDPLine, SDPParseError};

const MEDIA_LINE_PREFIX: &str = "m=";
const LINE_TERMINATOR: &str = "\r\n";

/// An SDP document cut into its session part and one entry per `m=` section.
/// Every section is stored with `\r\n` terminated lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Sections {
    pub session: String,
    pub media: Vec<String>,
}

impl From<&str> for Sections {
    fn from(value: &str) -> Self {
        let mut session = vec![];
        let mut media: Vec<Vec<&str>> = vec![];

        for line in split_lines(value) {
            if line.starts_with(MEDIA_LINE_PREFIX) {
                media.push(vec![line]);
            } else if let Some(section) = media.last_mut() {
                section.push(line);
            } else {
                session.push(line);
            }
        }

        Sections {
            session: join_lines(session),
            media: media.into_iter().map(join_lines).collect(),
        }
    }
}

impl From<Sections> for String {
    fn from(value: Sections) -> Self {
        let mut sdp = value.session;
        value
            .media
            .iter()
            .for_each(|section| sdp.push_str(section));
        sdp
    }
}

/// Non-empty lines of a section without their terminators.
pub fn split_lines(section: &str) -> Vec<&str> {
    section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn match_prefix<'a>(section: &'a str, prefix: &str) -> Vec<&'a str> {
    split_lines(section)
        .into_iter()
        .filter(|line| line.starts_with(prefix))
        .collect()
}

pub fn join_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter().fold(String::new(), |mut section, line| {
        section.push_str(line.as_ref());
        section.push_str(LINE_TERMINATOR);
        section
    })
}

pub fn write_lines(lines: Vec<SDPLine>) -> String {
    join_lines(lines.into_iter().map(String::from))
}

/// Parses every `a=` line of a section. Unknown attribute kinds are kept as
/// [`Attribute::Unrecognized`].
pub fn parse_attributes(section: &str) -> Result<Vec<Attribute>, SDPParseError> {
    split_lines(section)
        .into_iter()
        .filter(|line| line.starts_with("a="))
        .map(Attribute::try_from)
        .collect()
}
