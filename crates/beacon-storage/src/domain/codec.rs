//! # Entity Codec
//!
//! Encodes beacons, comments and users to the flat field/value hashes the
//! store holds, and decodes them back.
//!
//! ## Encodings
//!
//! - ID-valued fields (`poster`, `parent`, user `id`) and comment-list
//!   entries: ASCII digits in the configured radix.
//! - Counters (`hearts`, `flags`, user counters): decimal ASCII, always.
//!   The store increments them in place and only understands decimal.
//! - Timestamps: decimal seconds since the Unix epoch.
//! - Geotag: 16 bytes, latitude then longitude, each an f64 little-endian.
//!
//! Decoding is all-or-nothing: a malformed field fails the whole entity.

use beacon_types::{Beacon, Comment, Geotag, PostId, PostKind, Timestamp, User, UserId};
use std::collections::HashMap;
use thiserror::Error;

/// Hash field names. Part of the on-store contract.
pub mod fields {
    pub const IMAGE: &str = "img";
    pub const THUMBNAIL: &str = "thumb";
    pub const LOCATION: &str = "loc";
    pub const POSTER: &str = "poster";
    pub const DESCRIPTION: &str = "desc";
    pub const TEXT: &str = "text";
    pub const HEARTS: &str = "hearts";
    pub const FLAGS: &str = "flags";
    pub const TIME: &str = "time";
    pub const KIND: &str = "type";
    pub const PARENT: &str = "parent";

    pub const USER_ID: &str = "id";
    pub const USERNAME: &str = "username";
    pub const CREATED: &str = "created";
    pub const FLAGS_RECEIVED: &str = "flags-rec";
    pub const FLAGS_SUBMITTED: &str = "flags-sub";
    pub const HEARTS_RECEIVED: &str = "hearts-rec";
    pub const HEARTS_SUBMITTED: &str = "hearts-sub";
    pub const AUTH: &str = "auth";
    pub const EMAIL: &str = "email";
}

/// A decoded hash, as returned by the store.
pub type FieldMap = HashMap<String, Vec<u8>>;

/// An encoded hash, ready to be written.
pub type FieldList = Vec<(&'static str, Vec<u8>)>;

/// Size of an encoded geotag.
pub const GEOTAG_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a valid integer: {value:?}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field `{0}` is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("geotag must be {GEOTAG_LEN} bytes, got {0}")]
    InvalidGeotagLength(usize),

    #[error("unknown post type {0:?}")]
    UnknownKind(String),

    #[error("expected a {expected} record, found a {found}")]
    KindMismatch { expected: PostKind, found: PostKind },
}

/// Formats and parses unsigned integers in a fixed radix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntCodec {
    radix: u32,
}

impl IntCodec {
    pub const DECIMAL: IntCodec = IntCodec { radix: 10 };

    /// `radix` must be within 2..=36; `StorageConfig::validate` enforces it.
    pub const fn new(radix: u32) -> Self {
        Self { radix }
    }

    pub const fn radix(&self) -> u32 {
        self.radix
    }

    /// Lowercase digits, no prefix, no padding.
    pub fn format(&self, value: u64) -> String {
        if self.radix == 10 {
            return value.to_string();
        }
        if value == 0 {
            return "0".to_string();
        }
        let mut digits = Vec::new();
        let mut rest = value;
        while rest > 0 {
            let digit = (rest % self.radix as u64) as u32;
            digits.push(std::char::from_digit(digit, self.radix).unwrap_or('0'));
            rest /= self.radix as u64;
        }
        digits.iter().rev().collect()
    }

    pub fn parse(&self, text: &str) -> Option<u64> {
        if text.is_empty() || text.starts_with('+') {
            return None;
        }
        u64::from_str_radix(text, self.radix).ok()
    }
}

impl Default for IntCodec {
    fn default() -> Self {
        Self::DECIMAL
    }
}

pub fn encode_geotag(tag: &Geotag) -> [u8; GEOTAG_LEN] {
    let mut out = [0u8; GEOTAG_LEN];
    out[..8].copy_from_slice(&tag.latitude.to_le_bytes());
    out[8..].copy_from_slice(&tag.longitude.to_le_bytes());
    out
}

pub fn decode_geotag(bytes: &[u8]) -> Result<Geotag, DecodeError> {
    if bytes.len() != GEOTAG_LEN {
        return Err(DecodeError::InvalidGeotagLength(bytes.len()));
    }
    let mut lat = [0u8; 8];
    let mut lon = [0u8; 8];
    lat.copy_from_slice(&bytes[..8]);
    lon.copy_from_slice(&bytes[8..]);
    Ok(Geotag::new(f64::from_le_bytes(lat), f64::from_le_bytes(lon)))
}

/// A post record decoded by its `type` discriminator.
#[derive(Debug, Clone, PartialEq)]
pub enum PostRecord {
    Beacon(Beacon),
    Comment(Comment),
}

impl PostRecord {
    pub fn kind(&self) -> PostKind {
        match self {
            PostRecord::Beacon(_) => PostKind::Beacon,
            PostRecord::Comment(_) => PostKind::Comment,
        }
    }
}

/// Entity <-> hash codec, parameterized by the ID radix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCodec {
    ids: IntCodec,
}

impl EntityCodec {
    pub fn new(radix: u32) -> Self {
        Self {
            ids: IntCodec::new(radix),
        }
    }

    pub fn ids(&self) -> IntCodec {
        self.ids
    }

    // =========================================================================
    // ENCODE
    // =========================================================================

    /// The beacon's `id` and `comments` are not part of its hash.
    pub fn encode_beacon(&self, beacon: &Beacon) -> FieldList {
        vec![
            (fields::IMAGE, beacon.image.clone()),
            (fields::THUMBNAIL, beacon.thumbnail.clone()),
            (fields::LOCATION, encode_geotag(&beacon.location).to_vec()),
            (fields::POSTER, self.ids.format(beacon.poster_id).into_bytes()),
            (fields::DESCRIPTION, beacon.description.clone().into_bytes()),
            (fields::HEARTS, beacon.hearts.to_string().into_bytes()),
            (fields::FLAGS, beacon.flags.to_string().into_bytes()),
            (fields::TIME, beacon.created_at.to_string().into_bytes()),
            (fields::KIND, PostKind::Beacon.as_str().as_bytes().to_vec()),
        ]
    }

    pub fn encode_comment(&self, comment: &Comment) -> FieldList {
        vec![
            (fields::POSTER, self.ids.format(comment.poster_id).into_bytes()),
            (fields::PARENT, self.ids.format(comment.beacon_id).into_bytes()),
            (fields::TEXT, comment.text.clone().into_bytes()),
            (fields::HEARTS, comment.hearts.to_string().into_bytes()),
            (fields::FLAGS, comment.flags.to_string().into_bytes()),
            (fields::TIME, comment.created_at.to_string().into_bytes()),
            (fields::KIND, PostKind::Comment.as_str().as_bytes().to_vec()),
        ]
    }

    pub fn encode_user(&self, user: &User) -> FieldList {
        vec![
            (fields::USER_ID, self.ids.format(user.id).into_bytes()),
            (fields::USERNAME, user.username.clone().into_bytes()),
            (fields::CREATED, user.account_created.to_string().into_bytes()),
            (fields::FLAGS_RECEIVED, user.flags_received.to_string().into_bytes()),
            (fields::FLAGS_SUBMITTED, user.flags_submitted.to_string().into_bytes()),
            (fields::HEARTS_RECEIVED, user.hearts_received.to_string().into_bytes()),
            (fields::HEARTS_SUBMITTED, user.hearts_submitted.to_string().into_bytes()),
            (fields::AUTH, user.auth_secret.clone()),
            (fields::EMAIL, user.email.clone().into_bytes()),
        ]
    }

    // =========================================================================
    // DECODE
    // =========================================================================

    /// Read the `type` discriminator.
    pub fn decode_kind(&self, map: &FieldMap) -> Result<PostKind, DecodeError> {
        let tag = text(map, fields::KIND)?;
        PostKind::parse(&tag).ok_or(DecodeError::UnknownKind(tag))
    }

    /// Dispatch on the discriminator to the matching typed decoder.
    pub fn decode_post(&self, id: PostId, map: &FieldMap) -> Result<PostRecord, DecodeError> {
        match self.decode_kind(map)? {
            PostKind::Beacon => self.beacon_fields(id, map).map(PostRecord::Beacon),
            PostKind::Comment => self.comment_fields(id, map).map(PostRecord::Comment),
        }
    }

    pub fn decode_beacon(&self, id: PostId, map: &FieldMap) -> Result<Beacon, DecodeError> {
        expect_kind(self.decode_kind(map)?, PostKind::Beacon)?;
        self.beacon_fields(id, map)
    }

    pub fn decode_comment(&self, id: PostId, map: &FieldMap) -> Result<Comment, DecodeError> {
        expect_kind(self.decode_kind(map)?, PostKind::Comment)?;
        self.comment_fields(id, map)
    }

    pub fn decode_user(&self, map: &FieldMap) -> Result<User, DecodeError> {
        Ok(User {
            id: self.id_field(map, fields::USER_ID)?,
            username: text(map, fields::USERNAME)?,
            email: text(map, fields::EMAIL)?,
            auth_secret: raw(map, fields::AUTH)?.to_vec(),
            account_created: timestamp(map, fields::CREATED)?,
            hearts_received: counter(map, fields::HEARTS_RECEIVED)?,
            flags_received: counter(map, fields::FLAGS_RECEIVED)?,
            hearts_submitted: counter(map, fields::HEARTS_SUBMITTED)?,
            flags_submitted: counter(map, fields::FLAGS_SUBMITTED)?,
        })
    }

    /// Decode one comment-list entry.
    pub fn decode_list_id(&self, entry: &[u8]) -> Result<PostId, DecodeError> {
        let value = std::str::from_utf8(entry).map_err(|_| DecodeError::InvalidUtf8("list"))?;
        self.ids
            .parse(value)
            .ok_or_else(|| DecodeError::InvalidInteger {
                field: "list",
                value: value.to_string(),
            })
    }

    pub fn encode_list_id(&self, id: PostId) -> Vec<u8> {
        self.ids.format(id).into_bytes()
    }

    fn beacon_fields(&self, id: PostId, map: &FieldMap) -> Result<Beacon, DecodeError> {
        Ok(Beacon {
            id,
            image: raw(map, fields::IMAGE)?.to_vec(),
            // Records written before thumbnails existed have no `thumb`.
            thumbnail: map.get(fields::THUMBNAIL).cloned().unwrap_or_default(),
            location: decode_geotag(raw(map, fields::LOCATION)?)?,
            poster_id: self.id_field(map, fields::POSTER)?,
            description: text(map, fields::DESCRIPTION)?,
            hearts: counter(map, fields::HEARTS)?,
            flags: counter(map, fields::FLAGS)?,
            created_at: timestamp(map, fields::TIME)?,
            comments: Vec::new(),
        })
    }

    fn comment_fields(&self, id: PostId, map: &FieldMap) -> Result<Comment, DecodeError> {
        Ok(Comment {
            id,
            poster_id: self.id_field(map, fields::POSTER)?,
            beacon_id: self.id_field(map, fields::PARENT)?,
            text: text(map, fields::TEXT)?,
            hearts: counter(map, fields::HEARTS)?,
            flags: counter(map, fields::FLAGS)?,
            created_at: timestamp(map, fields::TIME)?,
        })
    }

    fn id_field(&self, map: &FieldMap, field: &'static str) -> Result<UserId, DecodeError> {
        let value = text(map, field)?;
        self.ids
            .parse(&value)
            .ok_or(DecodeError::InvalidInteger { field, value })
    }
}

fn expect_kind(found: PostKind, expected: PostKind) -> Result<(), DecodeError> {
    if found == expected {
        Ok(())
    } else {
        Err(DecodeError::KindMismatch { expected, found })
    }
}

fn raw<'a>(map: &'a FieldMap, field: &'static str) -> Result<&'a [u8], DecodeError> {
    map.get(field)
        .map(Vec::as_slice)
        .ok_or(DecodeError::MissingField(field))
}

fn text(map: &FieldMap, field: &'static str) -> Result<String, DecodeError> {
    let bytes = raw(map, field)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8(field))
}

fn decimal<T: std::str::FromStr>(map: &FieldMap, field: &'static str) -> Result<T, DecodeError> {
    let value = text(map, field)?;
    if value.starts_with('+') {
        return Err(DecodeError::InvalidInteger { field, value });
    }
    value
        .parse()
        .map_err(|_| DecodeError::InvalidInteger { field, value })
}

/// Negative counters fail here: a counter below zero is corruption.
fn counter(map: &FieldMap, field: &'static str) -> Result<u32, DecodeError> {
    decimal(map, field)
}

fn timestamp(map: &FieldMap, field: &'static str) -> Result<Timestamp, DecodeError> {
    decimal(map, field)
}
