//! Parsing of single `tar -tv` listing lines
//!
//! A GNU tar listing line looks like:
//!
//! ```text
//! -rw-r--r-- alice/staff    1024 2024-01-01 12:00 var/log.txt
//! lrwxrwxrwx alice/staff       0 2024-01-01 12:00 var/cur -> log.txt
//! ```
//!
//! Only the type character, the size column and the path are needed to build the
//! tree; the date and time columns are kept as an optional modification time.

use chrono::{NaiveDate, NaiveTime};

use crate::error::RecordError;

/// Columns in the GNU layout: mode, owner/group, size, date, time, path.
const FIELD_COUNT: usize = 6;

/// Columns when owner and group are printed separately.
const SPLIT_OWNER_FIELD_COUNT: usize = FIELD_COUNT + 1;

const SYMLINK_SEPARATOR: &str = " -> ";
const HARDLINK_SEPARATOR: &str = " link to ";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// What kind of filesystem object a listing line describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    /// Character/block device or FIFO.
    Special,
}

impl EntryKind {
    fn from_type_char(c: char) -> Self {
        match c {
            'd' => EntryKind::Directory,
            'l' => EntryKind::Symlink,
            'c' | 'b' | 'p' => EntryKind::Special,
            _ => EntryKind::File,
        }
    }

    /// Regular files are the only kind ncdu counts as "regular".
    pub fn is_regular(self) -> bool {
        matches!(self, EntryKind::File)
    }
}

/// One parsed listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Root-relative path split on `/`. A trailing empty segment marks a directory;
    /// `[""]` is the archive root itself.
    pub segments: Vec<String>,
    pub size: u64,
    pub kind: EntryKind,
    /// Modification time in seconds since the epoch, if the date columns parsed.
    pub mtime: Option<i64>,
}

impl PathEntry {
    /// The path joined back together, used in log lines and error messages.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// True when the entry names the archive root (`./` or `/`).
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1 && self.segments[0].is_empty()
    }
}

/// Parse one listing line.
///
/// Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<PathEntry>, RecordError> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let wide = split_fields(line, SPLIT_OWNER_FIELD_COUNT);
    let (fields, count) = if has_split_owner(&wide) {
        (wide, SPLIT_OWNER_FIELD_COUNT)
    } else {
        (split_fields(line, FIELD_COUNT), FIELD_COUNT)
    };

    if fields.len() < count {
        return Err(RecordError::TooFewFields {
            expected: count,
            found: fields.len(),
        });
    }

    let type_char = fields[0].chars().next().unwrap_or('-');
    let size_field = fields[count - 4];
    let size = parse_size(size_field, type_char)
        .ok_or_else(|| RecordError::InvalidSize(size_field.to_string()))?;
    let mtime = parse_mtime(fields[count - 3], fields[count - 2]);

    let raw_path = fields[count - 1];
    let mut kind = EntryKind::from_type_char(type_char);
    let name = match kind {
        EntryKind::Symlink => strip_link_target(raw_path, SYMLINK_SEPARATOR),
        EntryKind::File if type_char == 'h' => strip_link_target(raw_path, HARDLINK_SEPARATOR),
        _ => raw_path,
    };
    if name.ends_with('/') {
        kind = EntryKind::Directory;
    }

    let mut segments: Vec<String> = name
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(unescape)
        .collect();
    if segments.is_empty() {
        kind = EntryKind::Directory;
    }
    if kind == EntryKind::Directory {
        segments.push(String::new());
    }

    Ok(Some(PathEntry {
        segments,
        size,
        kind,
        mtime,
    }))
}

/// Split into at most `max` whitespace-delimited fields; the last field is the
/// untouched remainder of the line.
fn split_fields(line: &str, max: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(max);
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        if fields.len() + 1 == max {
            fields.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }

    fields
}

/// GNU tar joins owner and group with `/`. Some listings print them as two columns,
/// which moves every later column one to the right. The date column is the only one
/// with a fixed shape, so its position decides the layout.
fn has_split_owner(fields: &[&str]) -> bool {
    fields.len() == SPLIT_OWNER_FIELD_COUNT
        && !is_date(fields[FIELD_COUNT - 3])
        && is_date(fields[SPLIT_OWNER_FIELD_COUNT - 3])
}

fn is_date(field: &str) -> bool {
    NaiveDate::parse_from_str(field, DATE_FORMAT).is_ok()
}

fn parse_size(field: &str, type_char: char) -> Option<u64> {
    if let Ok(size) = field.parse::<u64>() {
        return Some(size);
    }
    // Devices print "major,minor" in the size column.
    if matches!(type_char, 'c' | 'b') {
        let (major, minor) = field.split_once(',')?;
        if major.parse::<u64>().is_ok() && minor.parse::<u64>().is_ok() {
            return Some(0);
        }
    }
    None
}

fn parse_mtime(date: &str, time: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    let time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())?;
    Some(date.and_time(time).and_utc().timestamp())
}

/// Keep only the link name, dropping everything from the first separator onward.
fn strip_link_target<'a>(path: &'a str, separator: &str) -> &'a str {
    match path.find(separator) {
        Some(idx) => &path[..idx],
        None => path,
    }
}

/// Decode the escapes GNU tar uses for unprintable bytes in names.
fn unescape(segment: &str) -> String {
    if !segment.contains('\\') {
        return segment.to_string();
    }

    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let simple = match bytes[i + 1] {
            b'\\' => Some(b'\\'),
            b'a' => Some(0x07),
            b'b' => Some(0x08),
            b'f' => Some(0x0c),
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            b'v' => Some(0x0b),
            b'?' => Some(0x7f),
            _ => None,
        };
        if let Some(byte) = simple {
            out.push(byte);
            i += 2;
            continue;
        }

        let digits = bytes[i + 1..]
            .iter()
            .take(3)
            .take_while(|b| (b'0'..=b'7').contains(*b))
            .count();
        let value = bytes[i + 1..i + 1 + digits]
            .iter()
            .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
        match u8::try_from(value) {
            Ok(byte) if digits > 0 => {
                out.push(byte);
                i += 1 + digits;
            }
            _ => {
                out.push(b'\\');
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}
